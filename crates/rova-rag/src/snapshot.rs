//! On-disk snapshot of a built index

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::warn;

use rova_core::{Error, Result, VectorDocument};

/// File name of the snapshot inside the persist directory
pub const SNAPSHOT_FILE: &str = "index.json";

/// Bumped whenever the snapshot layout changes
pub const FORMAT_VERSION: u32 = 1;

/// Hex MD5 digest of the document bytes
pub fn document_hash(bytes: &[u8]) -> String {
    format!("{:x}", md5::compute(bytes))
}

/// Everything needed to restore an index without calling the embedder again
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub format_version: u32,
    pub source: String,
    pub document_hash: String,
    pub embedding_model: String,
    pub dimension: usize,
    pub created_at: DateTime<Utc>,
    pub entries: Vec<VectorDocument>,
}

impl IndexSnapshot {
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(SNAPSHOT_FILE)
    }

    /// Read the snapshot in `dir`.
    ///
    /// `Ok(None)` when there is nothing usable: no file yet, a file that does
    /// not parse, or one written in another format version. The caller then
    /// rebuilds and overwrites it. Only I/O failures are errors.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = Self::path_in(dir);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: Value = match serde_json::from_slice(&bytes) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable index snapshot");
                return Ok(None);
            }
        };

        let version = raw.get("format_version").and_then(Value::as_u64);
        if version != Some(u64::from(FORMAT_VERSION)) {
            warn!(
                path = %path.display(),
                found = ?version,
                expected = FORMAT_VERSION,
                "Ignoring snapshot with unknown format"
            );
            return Ok(None);
        }

        match serde_json::from_value(raw) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring malformed index snapshot");
                Ok(None)
            }
        }
    }

    /// True when every entry carries an embedding of the recorded dimension.
    pub fn is_consistent(&self) -> bool {
        !self.entries.is_empty()
            && self.dimension > 0
            && self.entries.iter().all(|entry| {
                entry.embedding.as_ref().map(Vec::len) == Some(self.dimension)
            })
    }

    /// Write the snapshot atomically: a reader sees the old file or the new one, never half.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = Self::path_in(dir);

        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer(&mut writer, self)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| Error::Io(e.error))?;

        Ok(path)
    }
}
