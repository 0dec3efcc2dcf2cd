use epub_triptych::{ProgressStore, StoredValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

const STORE_SCHEMA_VERSION: u8 = 1;
const DEFAULT_MAX_FILE_BYTES: usize = 64 * 1024;
static STORE_WRITE_NONCE: AtomicUsize = AtomicUsize::new(0);

/// Failures while loading or writing the store file.
#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Json(serde_json::Error),
    TooLarge { actual: u64, limit: usize },
    SchemaVersion(u8),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "store I/O error: {}", err),
            StoreError::Json(err) => write!(f, "store JSON error: {}", err),
            StoreError::TooLarge { actual, limit } => {
                write!(f, "store file too large ({} > {} bytes)", actual, limit)
            }
            StoreError::SchemaVersion(version) => {
                write!(f, "unsupported store schema version {}", version)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err),
            StoreError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Json(err)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PersistedValue {
    Int(i64),
    Double(f64),
}

impl From<StoredValue> for PersistedValue {
    fn from(value: StoredValue) -> Self {
        match value {
            StoredValue::Int(v) => PersistedValue::Int(v),
            StoredValue::Double(v) => PersistedValue::Double(v),
        }
    }
}

impl From<PersistedValue> for StoredValue {
    fn from(value: PersistedValue) -> Self {
        match value {
            PersistedValue::Int(v) => StoredValue::Int(v),
            PersistedValue::Double(v) => StoredValue::Double(v),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedStoreEnvelope {
    version: u8,
    values: BTreeMap<String, PersistedValue>,
}

/// Reading positions kept in one JSON file.
///
/// Values are cached in memory and written through on every `set` via a
/// temporary file renamed over the target, so a crash mid-write keeps the
/// previous file. Write failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct FileProgressStore {
    path: PathBuf,
    max_file_bytes: usize,
    values: BTreeMap<String, StoredValue>,
}

impl FileProgressStore {
    /// Open the store at `path`; a missing file starts empty.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read, is larger than the
    /// default cap, or does not hold a supported envelope.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with_max_file_bytes(path, DEFAULT_MAX_FILE_BYTES)
    }

    /// Same as [`FileProgressStore::open`] with an explicit size cap.
    ///
    /// Values of `0` are treated as `1` to keep the cap explicit.
    ///
    /// # Errors
    ///
    /// See [`FileProgressStore::open`].
    pub fn open_with_max_file_bytes(
        path: impl Into<PathBuf>,
        max_file_bytes: usize,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        let max_file_bytes = max_file_bytes.max(1);
        let values = match load_values(&path, max_file_bytes) {
            Ok(values) => values,
            Err(StoreError::Io(err)) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err),
        };
        log::debug!("opened progress store {} ({} keys)", path.display(), values.len());
        Ok(Self {
            path,
            max_file_bytes,
            values,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_file_bytes(&self) -> usize {
        self.max_file_bytes
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Write the current values to disk.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors or when the encoded file would exceed the cap.
    pub fn flush(&self) -> Result<(), StoreError> {
        let Some(parent) = self.path.parent() else {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "store path has no parent directory",
            )));
        };
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }

        let envelope = PersistedStoreEnvelope {
            version: STORE_SCHEMA_VERSION,
            values: self
                .values
                .iter()
                .map(|(key, value)| (key.clone(), PersistedValue::from(*value)))
                .collect(),
        };
        let payload = serde_json::to_vec(&envelope)?;
        if payload.len() > self.max_file_bytes {
            return Err(StoreError::TooLarge {
                actual: payload.len() as u64,
                limit: self.max_file_bytes,
            });
        }

        let nonce = STORE_WRITE_NONCE.fetch_add(1, Ordering::Relaxed);
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store.json".into());
        let temp_path = self.path.with_file_name(format!(
            "{}.tmp-{}-{}",
            file_name,
            std::process::id(),
            nonce
        ));

        let result = write_file(&temp_path, &payload).and_then(|()| {
            fs::rename(&temp_path, &self.path)?;
            Ok(())
        });
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }
}

fn write_file(path: &Path, payload: &[u8]) -> Result<(), StoreError> {
    let file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(payload)?;
    writer.flush()?;
    let file = writer.into_inner().map_err(|err| err.into_error())?;
    file.sync_all()?;
    Ok(())
}

fn load_values(path: &Path, max_file_bytes: usize) -> Result<BTreeMap<String, StoredValue>, StoreError> {
    let len = fs::metadata(path)?.len();
    if len > max_file_bytes as u64 {
        return Err(StoreError::TooLarge {
            actual: len,
            limit: max_file_bytes,
        });
    }
    let file = File::open(path)?;
    let mut reader = file.take(max_file_bytes as u64 + 1);
    let mut payload = Vec::with_capacity(len as usize);
    reader.read_to_end(&mut payload)?;
    if payload.len() > max_file_bytes {
        return Err(StoreError::TooLarge {
            actual: payload.len() as u64,
            limit: max_file_bytes,
        });
    }
    let envelope: PersistedStoreEnvelope = serde_json::from_slice(&payload)?;
    if envelope.version != STORE_SCHEMA_VERSION {
        return Err(StoreError::SchemaVersion(envelope.version));
    }
    Ok(envelope
        .values
        .into_iter()
        .map(|(key, value)| (key, StoredValue::from(value)))
        .collect())
}

impl ProgressStore for FileProgressStore {
    fn get(&self, key: &str) -> Option<StoredValue> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: StoredValue) {
        let previous = self.values.insert(key.into(), value);
        if let Err(err) = self.flush() {
            log::warn!("failed to persist {} to {}: {}", key, self.path.display(), err);
            match previous {
                Some(previous) => self.values.insert(key.into(), previous),
                None => self.values.remove(key),
            };
        }
    }
}
