//! Durable storage for the lexical index.
//!
//! The snapshot is serialized with bincode and framed with a magic header,
//! a format version, and a CRC32 checksum over the payload. A missing or
//! corrupt file is never fatal: [`IndexStore::load`] reports it as
//! `Ok(None)` with a logged warning and the engine starts empty.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::{Result, SagittaError};
use crate::lexical::index::LexicalSnapshot;

const MAGIC: &[u8; 4] = b"SGIX";
const FORMAT_VERSION: u8 = 1;

/// File-backed store for a [`LexicalSnapshot`].
#[derive(Debug, Clone)]
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        IndexStore { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a persisted index file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Persist a snapshot, replacing any previous file.
    ///
    /// Writes to a sibling temp file first and renames it into place so a
    /// crash mid-write cannot leave a torn index on disk.
    pub fn save(&self, snapshot: &LexicalSnapshot) -> Result<()> {
        let payload = bincode::serialize(snapshot)
            .map_err(|e| SagittaError::serialization(format!("encode lexical index: {e}")))?;
        let checksum = crc32fast::hash(&payload);

        let mut buf = Vec::with_capacity(payload.len() + 17);
        buf.extend_from_slice(MAGIC);
        buf.push(FORMAT_VERSION);
        buf.extend_from_slice(&(payload.len() as u64).to_le_bytes());
        buf.extend_from_slice(&payload);
        buf.extend_from_slice(&checksum.to_le_bytes());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &buf)?;
        fs::rename(&tmp, &self.path)?;

        info!(
            "persisted lexical index ({} chunks, {} bytes) to {}",
            snapshot.len(),
            buf.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Load the persisted snapshot, if any.
    ///
    /// Returns `Ok(None)` when the file is missing, truncated, has a
    /// checksum mismatch, or fails to decode. Only unexpected I/O failures
    /// (e.g. permissions) surface as errors.
    pub fn load(&self) -> Result<Option<LexicalSnapshot>> {
        if !self.path.exists() {
            info!("no persisted lexical index at {}", self.path.display());
            return Ok(None);
        }

        let bytes = fs::read(&self.path)?;
        match self.decode(&bytes) {
            Some(snapshot) => {
                info!(
                    "loaded persisted lexical index ({} chunks) from {}",
                    snapshot.len(),
                    self.path.display()
                );
                Ok(Some(snapshot))
            }
            None => {
                warn!(
                    "persisted lexical index at {} is corrupt; starting with an empty index",
                    self.path.display()
                );
                Ok(None)
            }
        }
    }

    fn decode(&self, bytes: &[u8]) -> Option<LexicalSnapshot> {
        if bytes.len() < 17 || &bytes[0..4] != MAGIC || bytes[4] != FORMAT_VERSION {
            return None;
        }

        let len = usize::try_from(u64::from_le_bytes(bytes[5..13].try_into().ok()?)).ok()?;
        if bytes.len().checked_sub(17)? != len {
            return None;
        }

        let payload = &bytes[13..13 + len];
        let stored = u32::from_le_bytes(bytes[13 + len..17 + len].try_into().ok()?);
        if crc32fast::hash(payload) != stored {
            return None;
        }

        bincode::deserialize(payload).ok()
    }
}
