use std::path::{Path, PathBuf};

use anyhow::Context as _;
use derive_more::derive::{Display, Error};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{port::StateStore, state::EnergyState};

pub const STORAGE_VERSION: u32 = 1;
pub const STORAGE_MINOR_VERSION: u32 = 1;

#[derive(Debug, Display, Error)]
pub enum StorageError {
    #[display("storage file {} is not valid JSON: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("storage file {} has no data.totals object", path.display())]
    MissingTotals { path: PathBuf },
}

/// Envelope of a Home Assistant `.storage` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageDocument<T> {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor_version: Option<u32>,
    pub key: String,
    pub data: T,
}

impl<T> StorageDocument<T> {
    pub fn new(key: impl Into<String>, data: T) -> Self {
        Self {
            version: STORAGE_VERSION,
            minor_version: Some(STORAGE_MINOR_VERSION),
            key: key.into(),
            data,
        }
    }
}

/// Reads a storage document as raw JSON and checks it carries a `data.totals` object.
pub async fn read_document(path: &Path) -> anyhow::Result<Value> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Error reading storage file {}", path.display()))?;

    let document = parse_document(path, &content)?;
    Ok(document)
}

pub fn parse_document(path: &Path, content: &str) -> Result<Value, StorageError> {
    let document: Value = serde_json::from_str(content).map_err(|source| StorageError::InvalidJson {
        path: path.to_owned(),
        source,
    })?;

    if !document.pointer("/data/totals").is_some_and(Value::is_object) {
        return Err(StorageError::MissingTotals { path: path.to_owned() });
    }

    Ok(document)
}

/// Writes the content to a sibling temp file and renames it over the target.
pub async fn write_atomic(path: &Path, content: &[u8]) -> anyhow::Result<()> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Storage path {} has no file name", path.display()))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Error creating directory {}", parent.display()))?;
    }

    tokio::fs::write(&tmp_path, content)
        .await
        .with_context(|| format!("Error writing temp file {}", tmp_path.display()))?;

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e).with_context(|| format!("Error replacing {}", path.display()));
    }

    Ok(())
}

pub fn to_pretty_json<T: Serialize>(value: &T) -> anyhow::Result<Vec<u8>> {
    let mut content = serde_json::to_vec_pretty(value)?;
    content.push(b'\n');
    Ok(content)
}

/// Energy state kept in a single JSON storage document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    key: String,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }
}

impl StateStore for JsonFileStore {
    async fn load(&self) -> anyhow::Result<Option<EnergyState>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("Error reading {}", self.path.display())),
        };

        let document: StorageDocument<EnergyState> = serde_json::from_str(&content)
            .with_context(|| format!("Error parsing storage document {}", self.path.display()))?;

        if document.key != self.key {
            tracing::warn!(
                "Storage document {} has key {}, expected {}",
                self.path.display(),
                document.key,
                self.key
            );
        }

        Ok(Some(document.data))
    }

    async fn save(&self, state: &EnergyState) -> anyhow::Result<()> {
        let document = StorageDocument::new(self.key.as_str(), state);
        let content = to_pretty_json(&document)?;

        write_atomic(&self.path, &content).await
    }
}
