//! Compiles a schema tree into a [`BoundGenerator`] tree.
//!
//! Binding happens once per schema. It checks that every node's kind can
//! produce its target type and resolves custom strategies, so generation
//! itself never has to reject a node.

use crate::context::PathSegment;
use crate::registry::{CustomGenerator, CustomRegistry};
use datagen_core::{
    EntryConstructor, MemberConstructor, NodeKind, NullableConstructor, SchemaError, SchemaNode,
    SequenceConstructor, ValueType,
};
use std::sync::Arc;
use tracing::debug;

/// Integer width of a bound integer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

/// Width of a bound floating point node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatWidth {
    F32,
    F64,
}

/// Members of a bound class or tuple node.
#[derive(Debug, Clone)]
pub struct BoundMembers {
    pub(crate) nodes: Vec<BoundGenerator>,
    pub(crate) names: Vec<Option<String>>,
    pub(crate) segments: Vec<PathSegment>,
    pub(crate) constructor: Arc<dyn MemberConstructor>,
}

/// A schema node compiled into its kind-specific generator.
#[derive(Debug, Clone)]
pub enum BoundGenerator {
    SignedInt(IntWidth),
    UnsignedInt(IntWidth),
    Real(FloatWidth),
    Bool,
    /// Raw and escaped strings generate alike; encoders read the schema node
    String,
    Nullable {
        wrapped: Box<BoundGenerator>,
        constructor: Arc<dyn NullableConstructor>,
    },
    Array {
        element: Box<BoundGenerator>,
        max_size: Option<usize>,
        constructor: Arc<dyn SequenceConstructor>,
    },
    KeyValue {
        key: Box<BoundGenerator>,
        value: Box<BoundGenerator>,
        max_size: Option<usize>,
        constructor: Arc<dyn EntryConstructor>,
    },
    Class(BoundMembers),
    Tuple(BoundMembers),
    Custom {
        strategy: Arc<dyn CustomGenerator>,
        name: String,
        target: ValueType,
    },
}

/// Bind `node` and everything below it.
pub fn bind(node: &SchemaNode, registry: &CustomRegistry) -> Result<BoundGenerator, SchemaError> {
    let bound = bind_at(node, registry, "$")?;
    debug!(
        target_type = %node.resolved_target(),
        kind = node.kind.label(),
        "Bound schema"
    );
    Ok(bound)
}

fn bind_at(
    node: &SchemaNode,
    registry: &CustomRegistry,
    path: &str,
) -> Result<BoundGenerator, SchemaError> {
    let target = node.resolved_target();
    if !node.kind.accepts(&target) {
        return Err(SchemaError::ContractMismatch {
            path: path.to_string(),
            kind: node.kind.label(),
            target,
        });
    }

    let bound = match &node.kind {
        NodeKind::SignedInt | NodeKind::UnsignedInt => {
            let width = match target {
                ValueType::Int8 | ValueType::UInt8 => IntWidth::W8,
                ValueType::Int16 | ValueType::UInt16 => IntWidth::W16,
                ValueType::Int32 | ValueType::UInt32 => IntWidth::W32,
                _ => IntWidth::W64,
            };
            if matches!(node.kind, NodeKind::SignedInt) {
                BoundGenerator::SignedInt(width)
            } else {
                BoundGenerator::UnsignedInt(width)
            }
        }
        NodeKind::Real => match target {
            ValueType::Float32 => BoundGenerator::Real(FloatWidth::F32),
            _ => BoundGenerator::Real(FloatWidth::F64),
        },
        NodeKind::Bool => BoundGenerator::Bool,
        NodeKind::StringRaw | NodeKind::StringEscaped => BoundGenerator::String,
        NodeKind::Nullable {
            wrapped,
            constructor,
        } => BoundGenerator::Nullable {
            wrapped: Box::new(bind_at(wrapped, registry, &format!("{path}?"))?),
            constructor: Arc::clone(constructor),
        },
        NodeKind::Array {
            element,
            max_size,
            constructor,
        } => BoundGenerator::Array {
            element: Box::new(bind_at(element, registry, &format!("{path}[*]"))?),
            max_size: *max_size,
            constructor: Arc::clone(constructor),
        },
        NodeKind::KeyValue {
            key,
            value,
            max_size,
            constructor,
        } => BoundGenerator::KeyValue {
            key: Box::new(bind_at(key, registry, &format!("{path}[*].key"))?),
            value: Box::new(bind_at(value, registry, &format!("{path}[*].value"))?),
            max_size: *max_size,
            constructor: Arc::clone(constructor),
        },
        NodeKind::Class {
            members,
            constructor,
        } => BoundGenerator::Class(bind_members(members, constructor, registry, path, true)?),
        NodeKind::Tuple {
            members,
            constructor,
        } => BoundGenerator::Tuple(bind_members(members, constructor, registry, path, false)?),
        NodeKind::Custom { strategy } => {
            let resolved =
                registry
                    .get(strategy)
                    .ok_or_else(|| SchemaError::UnknownCustomStrategy {
                        path: path.to_string(),
                        strategy: strategy.clone(),
                        registered: registry.names().into_iter().map(String::from).collect(),
                    })?;
            BoundGenerator::Custom {
                strategy: resolved,
                name: strategy.clone(),
                target,
            }
        }
    };
    Ok(bound)
}

fn bind_members(
    members: &[SchemaNode],
    constructor: &Arc<dyn MemberConstructor>,
    registry: &CustomRegistry,
    path: &str,
    named: bool,
) -> Result<BoundMembers, SchemaError> {
    let mut nodes = Vec::with_capacity(members.len());
    let mut names = Vec::with_capacity(members.len());
    let mut segments = Vec::with_capacity(members.len());

    for (index, member) in members.iter().enumerate() {
        let segment = match (&member.name, named) {
            (Some(name), true) => PathSegment::Field(Arc::from(name.as_str())),
            _ => PathSegment::Index(index),
        };
        nodes.push(bind_at(member, registry, &format!("{path}{segment}"))?);
        names.push(if named { member.name.clone() } else { None });
        segments.push(segment);
    }

    Ok(BoundMembers {
        nodes,
        names,
        segments,
        constructor: Arc::clone(constructor),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_scalar_widths() {
        let registry = CustomRegistry::new();
        let bound = bind(&SchemaNode::signed(ValueType::Int16), &registry).unwrap();
        assert!(matches!(bound, BoundGenerator::SignedInt(IntWidth::W16)));

        let bound = bind(&SchemaNode::unsigned(ValueType::UInt8), &registry).unwrap();
        assert!(matches!(bound, BoundGenerator::UnsignedInt(IntWidth::W8)));

        let bound = bind(&SchemaNode::real(ValueType::Float32), &registry).unwrap();
        assert!(matches!(bound, BoundGenerator::Real(FloatWidth::F32)));

        let bound = bind(&SchemaNode::new(NodeKind::SignedInt), &registry).unwrap();
        assert!(matches!(bound, BoundGenerator::SignedInt(IntWidth::W64)));

        for node in [SchemaNode::string(), SchemaNode::string_raw()] {
            assert!(matches!(bind(&node, &registry).unwrap(), BoundGenerator::String));
        }
    }

    #[test]
    fn test_contract_mismatch_reports_path() {
        let schema = SchemaNode::class(
            "Order",
            vec![
                SchemaNode::signed(ValueType::Int64).named("id"),
                SchemaNode::array(SchemaNode::real(ValueType::Int32)).named("prices"),
            ],
        );
        let err = bind(&schema, &CustomRegistry::new()).unwrap_err();
        match err {
            SchemaError::ContractMismatch { path, kind, target } => {
                assert_eq!(path, "$.prices[*]");
                assert_eq!(kind, "real");
                assert_eq!(target, ValueType::Int32);
            }
            other => panic!("Expected ContractMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_declared_collection_target_must_match_children() {
        let schema = SchemaNode::array(SchemaNode::boolean())
            .with_target(ValueType::array(ValueType::String));
        let err = bind(&schema, &CustomRegistry::new()).unwrap_err();
        assert!(matches!(err, SchemaError::ContractMismatch { kind: "array", .. }));
    }

    #[test]
    fn test_unknown_custom_strategy() {
        let schema = SchemaNode::tuple(vec![
            SchemaNode::boolean(),
            SchemaNode::custom("geohash", ValueType::String),
        ]);
        let err = bind(&schema, &CustomRegistry::new()).unwrap_err();
        match err {
            SchemaError::UnknownCustomStrategy {
                path,
                strategy,
                registered,
            } => {
                assert_eq!(path, "$[1]");
                assert_eq!(strategy, "geohash");
                assert!(registered.is_empty());
            }
            other => panic!("Expected UnknownCustomStrategy, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_strategy_lists_registered() {
        #[derive(Debug)]
        struct Zero;

        impl CustomGenerator for Zero {
            fn generate(
                &self,
                _rng: &mut dyn rand::RngCore,
                _target: &ValueType,
            ) -> Result<datagen_core::GeneratedValue, datagen_core::ConstructError> {
                Ok(datagen_core::GeneratedValue::Int32(0))
            }
        }

        let mut registry = CustomRegistry::new();
        registry.register("zip_code", Zero).register("color", Zero);
        let err = bind(&SchemaNode::custom("phone", ValueType::Int32), &registry).unwrap_err();
        assert!(matches!(
            &err,
            SchemaError::UnknownCustomStrategy { registered, .. }
                if registered == &["color".to_string(), "zip_code".to_string()]
        ));
        assert!(err.to_string().contains(r#"["color", "zip_code"]"#));
    }

    #[test]
    fn test_nested_nullable_rejected() {
        let schema = SchemaNode::class(
            "Profile",
            vec![SchemaNode::nullable(SchemaNode::nullable(SchemaNode::string())).named("nick")],
        );
        let err = bind(&schema, &CustomRegistry::new()).unwrap_err();
        match err {
            SchemaError::ContractMismatch { path, kind, .. } => {
                assert_eq!(path, "$.nick");
                assert_eq!(kind, "nullable");
            }
            other => panic!("Expected ContractMismatch, got {other:?}"),
        }

        let flat = SchemaNode::nullable(SchemaNode::class(
            "Inner",
            vec![SchemaNode::nullable(SchemaNode::boolean()).named("flag")],
        ));
        assert!(bind(&flat, &CustomRegistry::new()).is_ok());
    }

    #[test]
    fn test_class_member_segments() {
        let schema = SchemaNode::class(
            "",
            vec![
                SchemaNode::boolean().named("flag"),
                SchemaNode::string(),
            ],
        );
        let BoundGenerator::Class(members) = bind(&schema, &CustomRegistry::new()).unwrap() else {
            panic!("Expected class");
        };
        assert_eq!(
            members.segments,
            vec![PathSegment::Field(Arc::from("flag")), PathSegment::Index(1)]
        );
        assert_eq!(members.names, vec![Some("flag".to_string()), None]);
    }
}
