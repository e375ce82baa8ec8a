//! JSON Lines output for generated values.

use datagen_engine::{DataGenerator, GeneratorError};
use json_types::EncodeError;
use rand::rngs::StdRng;
use rand::Rng;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// Default buffer size for JSONL writing.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Errors that can occur while writing generated values.
#[derive(Error, Debug)]
pub enum JsonlError {
    /// Data generator error.
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    /// Value could not be encoded against its schema.
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Metrics from a populate operation.
#[derive(Debug, Clone, Default)]
pub struct PopulateMetrics {
    /// Number of values written.
    pub rows_written: u64,
    /// Total time taken.
    pub total_duration: Duration,
    /// Time spent generating data.
    pub generation_duration: Duration,
    /// Time spent encoding and writing data.
    pub write_duration: Duration,
    /// Bytes handed to the writer.
    pub bytes_written: u64,
}

impl PopulateMetrics {
    /// Calculate rows per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.rows_written as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.bytes_written as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Counts bytes passing through to the inner writer.
struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Writes generated values as JSON, one value per line.
pub struct JsonlPopulator<R = StdRng> {
    generator: DataGenerator<R>,
    pretty: bool,
}

impl<R: Rng> JsonlPopulator<R> {
    /// Create a populator drawing values from `generator`.
    pub fn new(generator: DataGenerator<R>) -> Self {
        Self {
            generator,
            pretty: false,
        }
    }

    /// Pretty-print each value. The output is then no longer line-delimited.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Get a reference to the generator.
    pub fn generator(&self) -> &DataGenerator<R> {
        &self.generator
    }

    /// Generate `count` values into `output`.
    pub fn populate<W: Write>(
        &mut self,
        output: W,
        count: u64,
    ) -> Result<PopulateMetrics, JsonlError> {
        let start_time = Instant::now();
        let mut metrics = PopulateMetrics::default();

        // Fail on contract errors before anything is written
        self.generator.bind().map_err(GeneratorError::from)?;

        let mut writer = CountingWriter {
            inner: BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, output),
            count: 0,
        };

        let mut generation_time = Duration::ZERO;
        let mut write_time = Duration::ZERO;

        for _ in 0..count {
            let gen_start = Instant::now();
            let value = self.generator.generate()?;
            generation_time += gen_start.elapsed();

            let write_start = Instant::now();
            let json = json_types::encode(&value, self.generator.schema())?;
            if self.pretty {
                serde_json::to_writer_pretty(&mut writer, &json)?;
            } else {
                serde_json::to_writer(&mut writer, &json)?;
            }
            writeln!(writer)?;
            write_time += write_start.elapsed();

            metrics.rows_written += 1;

            if metrics.rows_written % 10000 == 0 {
                debug!("Written {} values", metrics.rows_written);
            }
        }

        writer.flush()?;

        metrics.bytes_written = writer.count;
        metrics.total_duration = start_time.elapsed();
        metrics.generation_duration = generation_time;
        metrics.write_duration = write_time;

        info!(
            "JSONL generation complete: {} values, {} bytes in {:?} ({:.2} values/sec)",
            metrics.rows_written,
            metrics.bytes_written,
            metrics.total_duration,
            metrics.rows_per_second()
        );

        Ok(metrics)
    }

    /// Generate `count` values into a new file at `output_path`.
    pub fn populate_file<P: AsRef<Path>>(
        &mut self,
        output_path: P,
        count: u64,
    ) -> Result<PopulateMetrics, JsonlError> {
        let output_path = output_path.as_ref();
        info!(
            "Generating JSONL file '{}' with {} values",
            output_path.display(),
            count
        );
        let file = File::create(output_path)?;
        self.populate(file, count)
    }

    /// Append `count` values to the file at `output_path`, creating it if needed.
    ///
    /// Generation continues from the generator's current state.
    pub fn populate_append<P: AsRef<Path>>(
        &mut self,
        output_path: P,
        count: u64,
    ) -> Result<PopulateMetrics, JsonlError> {
        let output_path = output_path.as_ref();
        info!(
            "Appending {} values to JSONL file '{}' after {} generated",
            count,
            output_path.display(),
            self.generator.generated_count()
        );
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(output_path)?;
        self.populate(file, count)
    }
}
