//! Model bundle persistence
//!
//! The trained pipeline plus its column lists and holdout metrics are
//! serialized with bincode inside a small envelope carrying magic bytes, a
//! format version and an FNV-1a checksum, so a corrupted or foreign file
//! fails loading instead of deserializing into garbage.

use crate::error::{ChurnError, Result};
use crate::pipeline::ChurnPipeline;
use crate::training::EvalMetrics;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Magic bytes of churn model files
const MAGIC: [u8; 4] = *b"CHRN";
/// Current envelope format version
const FORMAT_VERSION: u32 = 1;

/// Descriptive metadata stored alongside the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleMetadata {
    pub crate_version: String,
    pub trained_at: String,
    pub n_train: usize,
    pub n_test: usize,
}

impl BundleMetadata {
    pub fn new(n_train: usize, n_test: usize) -> Self {
        Self {
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            trained_at: chrono::Utc::now().to_rfc3339(),
            n_train,
            n_test,
        }
    }
}

/// Everything the inference surface needs, created once by the trainer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub pipeline: ChurnPipeline,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub metrics: EvalMetrics,
    pub metadata: BundleMetadata,
}

/// On-disk envelope around the serialized bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    magic: [u8; 4],
    format_version: u32,
    payload: Vec<u8>,
    checksum: u64,
}

/// FNV-1a over the payload bytes.
fn fnv1a(data: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 14695981039346656037;
    const FNV_PRIME: u64 = 1099511628211;

    let mut hash = FNV_OFFSET;
    for byte in data {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

impl ModelBundle {
    pub fn new(pipeline: ChurnPipeline, metrics: EvalMetrics, metadata: BundleMetadata) -> Self {
        let numeric_columns = pipeline.numeric_columns().to_vec();
        let categorical_columns = pipeline.categorical_columns().to_vec();
        Self {
            pipeline,
            numeric_columns,
            categorical_columns,
            metrics,
            metadata,
        }
    }

    /// Write the bundle to `path`, creating parent directories and
    /// overwriting any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let payload = bincode::serialize(self)
            .map_err(|e| ChurnError::SerializationError(format!("failed to serialize: {e}")))?;
        let envelope = Envelope {
            magic: MAGIC,
            format_version: FORMAT_VERSION,
            checksum: fnv1a(&payload),
            payload,
        };

        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        bincode::serialize_into(writer, &envelope)
            .map_err(|e| ChurnError::SerializationError(format!("failed to write: {e}")))?;

        Ok(())
    }

    /// Read a bundle back, verifying magic, version and checksum.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let envelope: Envelope = bincode::deserialize(&bytes)
            .map_err(|e| ChurnError::SerializationError(format!("failed to deserialize: {e}")))?;

        if envelope.magic != MAGIC {
            return Err(ChurnError::SerializationError(
                "not a churn model file (bad magic)".to_string(),
            ));
        }
        if envelope.format_version != FORMAT_VERSION {
            return Err(ChurnError::SerializationError(format!(
                "unsupported model format version {}",
                envelope.format_version
            )));
        }
        if fnv1a(&envelope.payload) != envelope.checksum {
            return Err(ChurnError::SerializationError(
                "checksum verification failed, file may be corrupted".to_string(),
            ));
        }

        bincode::deserialize(&envelope.payload)
            .map_err(|e| ChurnError::SerializationError(format!("failed to deserialize: {e}")))
    }
}

// Used by the integration suite to exercise corruption handling.
#[doc(hidden)]
pub fn corrupt_for_tests(path: &Path) -> Result<()> {
    let mut bytes = std::fs::read(path)?;
    // Flip a byte well past the envelope header.
    let idx = bytes.len() / 2;
    bytes[idx] ^= 0xFF;
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    Ok(())
}
