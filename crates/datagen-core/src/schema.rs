//! Schema definitions for schema-datagen.
//!
//! A schema is a tree of [`SchemaNode`]s. Each node is tagged by its
//! [`NodeKind`], targets a [`ValueType`], and compound nodes carry the
//! construction capability that assembles their children.
//!
//! ## YAML form
//!
//! ```yaml
//! version: 1
//! seed: 42
//! options:
//!   max_collection_size: 10
//! root:
//!   kind: class
//!   target: { type: record, name: Order }
//!   members:
//!     - name: id
//!       kind: signed_int
//!       target: i64
//!     - name: tags
//!       kind: array
//!       element: { kind: string_escaped }
//! ```
//!
//! Construction capabilities cannot be expressed in YAML; nodes loaded from a
//! file use the default constructors and can be customised afterwards through
//! the `with_*_constructor` builders.

use crate::construct::{
    default_entries, default_nullable, default_record, default_sequence, default_tuple,
    EntryConstructor, MemberConstructor, NullableConstructor, SequenceConstructor,
};
use crate::options::GenerationOptions;
use crate::types::ValueType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for schema operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Error reading schema file
    #[error("Failed to read schema file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Node kind cannot produce values of its target type
    #[error("Schema node '{path}' of kind {kind} cannot target {target}")]
    ContractMismatch {
        path: String,
        kind: &'static str,
        target: ValueType,
    },

    /// Custom node names a strategy nobody registered
    #[error(
        "Schema node '{path}' uses unregistered custom strategy '{strategy}' (registered: {registered:?})"
    )]
    UnknownCustomStrategy {
        path: String,
        strategy: String,
        registered: Vec<String>,
    },

    /// Generation option out of range
    #[error("Invalid generation option: {0}")]
    InvalidOption(String),

    /// Schema document version not understood
    #[error("Unsupported schema version: {0}")]
    UnsupportedVersion(u32),
}

// ============================================================================
// Schema Nodes
// ============================================================================

/// Classification of a schema node, with kind-specific metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// Signed integer over the target's full range
    SignedInt,

    /// Unsigned integer over the target's full range
    UnsignedInt,

    /// Floating point value
    Real,

    /// Boolean value
    Bool,

    /// String that needs no escaping by the encoder
    StringRaw,

    /// String the encoder escapes
    StringEscaped,

    /// Value that is either empty or a wrapped value
    Nullable {
        /// Node generating the present value
        wrapped: Box<SchemaNode>,
        #[serde(skip, default = "default_nullable")]
        constructor: Arc<dyn NullableConstructor>,
    },

    /// Homogeneous sequence
    Array {
        /// Node generating each element
        element: Box<SchemaNode>,
        /// Element count bound; falls back to the generation options
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_size: Option<usize>,
        #[serde(skip, default = "default_sequence")]
        constructor: Arc<dyn SequenceConstructor>,
    },

    /// Key/value collection
    KeyValue {
        /// Node generating each key
        key: Box<SchemaNode>,
        /// Node generating each value
        value: Box<SchemaNode>,
        /// Entry count bound; falls back to the generation options
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_size: Option<usize>,
        #[serde(skip, default = "default_entries")]
        constructor: Arc<dyn EntryConstructor>,
    },

    /// Record with named members
    Class {
        /// Members in declared order
        members: Vec<SchemaNode>,
        #[serde(skip, default = "default_record")]
        constructor: Arc<dyn MemberConstructor>,
    },

    /// Positional members
    Tuple {
        /// Members in declared order
        members: Vec<SchemaNode>,
        #[serde(skip, default = "default_tuple")]
        constructor: Arc<dyn MemberConstructor>,
    },

    /// Value produced by a registered custom strategy
    Custom {
        /// Registered strategy name
        strategy: String,
    },
}

impl NodeKind {
    /// Kind name as written in YAML.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SignedInt => "signed_int",
            Self::UnsignedInt => "unsigned_int",
            Self::Real => "real",
            Self::Bool => "bool",
            Self::StringRaw => "string_raw",
            Self::StringEscaped => "string_escaped",
            Self::Nullable { .. } => "nullable",
            Self::Array { .. } => "array",
            Self::KeyValue { .. } => "key_value",
            Self::Class { .. } => "class",
            Self::Tuple { .. } => "tuple",
            Self::Custom { .. } => "custom",
        }
    }

    /// Check whether this kind can produce values of `target`.
    ///
    /// Compound kinds also require the target's component types to agree with
    /// the targets of their child nodes. A nullable never wraps another
    /// nullable: the inner empty form would read as the outer one.
    pub fn accepts(&self, target: &ValueType) -> bool {
        match (self, target) {
            (Self::SignedInt, t) => t.is_signed_int(),
            (Self::UnsignedInt, t) => t.is_unsigned_int(),
            (Self::Real, t) => t.is_float(),
            (Self::Bool, ValueType::Bool) => true,
            (Self::StringRaw | Self::StringEscaped, ValueType::String) => true,
            (Self::Nullable { wrapped, .. }, ValueType::Optional { inner }) => {
                !matches!(wrapped.kind, Self::Nullable { .. })
                    && !matches!(**inner, ValueType::Optional { .. })
                    && inner.is_compatible_with(&wrapped.resolved_target())
            }
            (Self::Array { element, .. }, ValueType::Array { element: ty }) => {
                ty.is_compatible_with(&element.resolved_target())
            }
            (
                Self::KeyValue { key, value, .. },
                ValueType::Map {
                    key: key_ty,
                    value: value_ty,
                },
            ) => {
                key_ty.is_compatible_with(&key.resolved_target())
                    && value_ty.is_compatible_with(&value.resolved_target())
            }
            (Self::Class { .. }, ValueType::Record { .. }) => true,
            (Self::Tuple { members, .. }, ValueType::Tuple { elements }) => {
                members.len() == elements.len()
                    && members
                        .iter()
                        .zip(elements)
                        .all(|(member, ty)| ty.is_compatible_with(&member.resolved_target()))
            }
            (Self::Custom { .. }, _) => true,
            _ => false,
        }
    }
}

/// A declarative descriptor of one generated value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Member identifier when this node is a class member
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Declared target type; derived from the kind when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ValueType>,

    /// Node classification
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl SchemaNode {
    /// Create an unnamed node of the given kind with a derived target.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            target: None,
            kind,
        }
    }

    /// Signed integer node targeting `target` (e.g. `ValueType::Int32`).
    pub fn signed(target: ValueType) -> Self {
        Self::new(NodeKind::SignedInt).with_target(target)
    }

    /// Unsigned integer node targeting `target`.
    pub fn unsigned(target: ValueType) -> Self {
        Self::new(NodeKind::UnsignedInt).with_target(target)
    }

    /// Floating point node targeting `target`.
    pub fn real(target: ValueType) -> Self {
        Self::new(NodeKind::Real).with_target(target)
    }

    /// Boolean node.
    pub fn boolean() -> Self {
        Self::new(NodeKind::Bool)
    }

    /// Escaped string node.
    pub fn string() -> Self {
        Self::new(NodeKind::StringEscaped)
    }

    /// Raw string node.
    pub fn string_raw() -> Self {
        Self::new(NodeKind::StringRaw)
    }

    /// Nullable node wrapping `wrapped`.
    pub fn nullable(wrapped: SchemaNode) -> Self {
        Self::new(NodeKind::Nullable {
            wrapped: Box::new(wrapped),
            constructor: default_nullable(),
        })
    }

    /// Array node over `element`.
    pub fn array(element: SchemaNode) -> Self {
        Self::new(NodeKind::Array {
            element: Box::new(element),
            max_size: None,
            constructor: default_sequence(),
        })
    }

    /// Key/value node over `key` and `value`.
    pub fn key_value(key: SchemaNode, value: SchemaNode) -> Self {
        Self::new(NodeKind::KeyValue {
            key: Box::new(key),
            value: Box::new(value),
            max_size: None,
            constructor: default_entries(),
        })
    }

    /// Record node named `record` with the given members.
    pub fn class(record: impl Into<String>, members: Vec<SchemaNode>) -> Self {
        Self::new(NodeKind::Class {
            members,
            constructor: default_record(),
        })
        .with_target(ValueType::record(record))
    }

    /// Tuple node with the given members.
    pub fn tuple(members: Vec<SchemaNode>) -> Self {
        Self::new(NodeKind::Tuple {
            members,
            constructor: default_tuple(),
        })
    }

    /// Custom node resolved against the strategy registry.
    pub fn custom(strategy: impl Into<String>, target: ValueType) -> Self {
        Self::new(NodeKind::Custom {
            strategy: strategy.into(),
        })
        .with_target(target)
    }

    /// Set the member identifier.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declare the target type explicitly.
    pub fn with_target(mut self, target: ValueType) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the collection size bound of an array or key/value node.
    /// Other kinds are returned unchanged.
    pub fn with_max_size(mut self, bound: usize) -> Self {
        match &mut self.kind {
            NodeKind::Array { max_size, .. } | NodeKind::KeyValue { max_size, .. } => {
                *max_size = Some(bound);
            }
            _ => {}
        }
        self
    }

    /// Replace the constructor of an array node.
    pub fn with_sequence_constructor(mut self, ctor: Arc<dyn SequenceConstructor>) -> Self {
        if let NodeKind::Array { constructor, .. } = &mut self.kind {
            *constructor = ctor;
        }
        self
    }

    /// Replace the constructor of a key/value node.
    pub fn with_entry_constructor(mut self, ctor: Arc<dyn EntryConstructor>) -> Self {
        if let NodeKind::KeyValue { constructor, .. } = &mut self.kind {
            *constructor = ctor;
        }
        self
    }

    /// Replace the constructor of a class or tuple node.
    pub fn with_member_constructor(mut self, ctor: Arc<dyn MemberConstructor>) -> Self {
        match &mut self.kind {
            NodeKind::Class { constructor, .. } | NodeKind::Tuple { constructor, .. } => {
                *constructor = ctor;
            }
            _ => {}
        }
        self
    }

    /// Replace the constructor of a nullable node.
    pub fn with_nullable_constructor(mut self, ctor: Arc<dyn NullableConstructor>) -> Self {
        if let NodeKind::Nullable { constructor, .. } = &mut self.kind {
            *constructor = ctor;
        }
        self
    }

    /// Declared target, or the default target of the node's kind.
    pub fn resolved_target(&self) -> ValueType {
        if let Some(target) = &self.target {
            return target.clone();
        }
        match &self.kind {
            NodeKind::SignedInt => ValueType::Int64,
            NodeKind::UnsignedInt => ValueType::UInt64,
            NodeKind::Real => ValueType::Float64,
            NodeKind::Bool => ValueType::Bool,
            NodeKind::StringRaw | NodeKind::StringEscaped => ValueType::String,
            NodeKind::Nullable { wrapped, .. } => ValueType::optional(wrapped.resolved_target()),
            NodeKind::Array { element, .. } => ValueType::array(element.resolved_target()),
            NodeKind::KeyValue { key, value, .. } => {
                ValueType::map(key.resolved_target(), value.resolved_target())
            }
            NodeKind::Class { .. } => ValueType::record(""),
            NodeKind::Tuple { members, .. } => ValueType::Tuple {
                elements: members.iter().map(SchemaNode::resolved_target).collect(),
            },
            NodeKind::Custom { strategy } => ValueType::Custom {
                name: strategy.clone(),
            },
        }
    }

    /// Direct children in generation order.
    pub fn children(&self) -> Vec<&SchemaNode> {
        match &self.kind {
            NodeKind::Nullable { wrapped, .. } => vec![wrapped.as_ref()],
            NodeKind::Array { element, .. } => vec![element.as_ref()],
            NodeKind::KeyValue { key, value, .. } => vec![key.as_ref(), value.as_ref()],
            NodeKind::Class { members, .. } | NodeKind::Tuple { members, .. } => {
                members.iter().collect()
            }
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// Schema Documents
// ============================================================================

fn default_version() -> u32 {
    1
}

/// A schema loaded from YAML, with its seed and generation options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Schema version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Seed used when the caller does not supply one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Distribution parameters
    #[serde(default)]
    pub options: GenerationOptions,

    /// Root node
    pub root: SchemaNode,
}

impl SchemaDocument {
    /// Wrap a root node with default version and options.
    pub fn new(root: SchemaNode) -> Self {
        Self {
            version: default_version(),
            seed: None,
            options: GenerationOptions::default(),
            root,
        }
    }

    /// Load schema from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse schema from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let document: SchemaDocument = serde_yaml::from_str(yaml)?;
        if document.version != 1 {
            return Err(SchemaError::UnsupportedVersion(document.version));
        }
        document.options.validate()?;
        Ok(document)
    }
}

// ============================================================================
// Tests
// ============================================================================
