//! Atomic persistence for model bundles.
//!
//! A bundle is written as a small header (magic bytes plus a format
//! version) followed by the bincode payload, through a write-to-temp-then-
//! rename so a partial or torn file is never visible to readers. Loading
//! distinguishes a missing artifact (service not yet trained) from a
//! corrupt or version-incompatible one.

use atomicwrites::{AllowOverwrite, AtomicFile};
use scorecast_core::ModelBundle;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const MAGIC: &[u8; 4] = b"SCST";
pub const FORMAT_VERSION: u32 = 1;
const BUNDLE_FILE: &str = "model.bundle";

pub type Result<T> = std::result::Result<T, ArtifactError>;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("No artifact at {0}")]
    NotFound(PathBuf),

    #[error("Artifact format version mismatch: expected {expected}, found {found}")]
    Incompatible { expected: u32, found: u32 },

    #[error("Corrupt artifact: {0}")]
    Corrupt(String),

    #[error("Encoding error: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArtifactError {
    /// A missing artifact means "not yet trained" and leaves the service
    /// in a not-ready state; everything else is a real fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ArtifactError::NotFound(_))
    }
}

/// Filesystem store for one model bundle.
pub struct ArtifactStore {
    bundle_path: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            bundle_path: data_dir.as_ref().join(BUNDLE_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.bundle_path
    }

    pub fn exists(&self) -> bool {
        self.bundle_path.exists()
    }

    /// Serialize and atomically replace the stored bundle.
    pub fn save(&self, bundle: &ModelBundle) -> Result<()> {
        let payload =
            bincode::serialize(bundle).map_err(|e| ArtifactError::Encode(e.to_string()))?;

        let file = AtomicFile::new(&self.bundle_path, AllowOverwrite);
        file.write(|f| {
            f.write_all(MAGIC)?;
            f.write_all(&FORMAT_VERSION.to_le_bytes())?;
            f.write_all(&payload)
        })
        .map_err(|e| match e {
            atomicwrites::Error::Internal(io) | atomicwrites::Error::User(io) => {
                ArtifactError::Io(io)
            }
        })?;

        info!(
            path = %self.bundle_path.display(),
            bytes = payload.len(),
            bundle_id = %bundle.id,
            "artifact saved"
        );
        Ok(())
    }

    /// Read back the stored bundle.
    pub fn load(&self) -> Result<ModelBundle> {
        let data = std::fs::read(&self.bundle_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ArtifactError::NotFound(self.bundle_path.clone())
            } else {
                ArtifactError::Io(e)
            }
        })?;

        if data.len() < 8 || &data[..4] != MAGIC {
            return Err(ArtifactError::Corrupt(
                "missing or truncated header".to_string(),
            ));
        }
        let found = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        if found != FORMAT_VERSION {
            return Err(ArtifactError::Incompatible {
                expected: FORMAT_VERSION,
                found,
            });
        }

        bincode::deserialize(&data[8..]).map_err(|e| ArtifactError::Corrupt(e.to_string()))
    }
}
