use std::fs;
use std::path::{Path, PathBuf};

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::domain::{ObservationId, ProductId, SourceProductId};
use crate::error::HiriseError;

/// Local filesystem layout under one explicit data root:
/// `labels/` for RDR labels, one directory per observation for raw EDR
/// channel files, `browse/` for EXTRAS artifacts, and `metadata/` sidecars
/// recording where each file came from.
#[derive(Debug, Clone)]
pub struct Store {
    data_root: Utf8PathBuf,
}

impl Store {
    pub fn new() -> Result<Self, HiriseError> {
        let data_root = BaseDirs::new()
            .and_then(|dirs| {
                Utf8PathBuf::from_path_buf(dirs.home_dir().join("data").join("hirise")).ok()
            })
            .ok_or_else(|| HiriseError::Filesystem("unable to resolve data root".to_string()))?;
        Ok(Self { data_root })
    }

    pub fn with_root(data_root: Utf8PathBuf) -> Self {
        Self { data_root }
    }

    pub fn data_root(&self) -> &Utf8Path {
        &self.data_root
    }

    pub fn labels_dir(&self) -> Utf8PathBuf {
        self.data_root.join("labels")
    }

    pub fn label_path(&self, product: &ProductId) -> Utf8PathBuf {
        self.labels_dir().join(product.label_filename())
    }

    pub fn observation_dir(&self, observation: &ObservationId) -> Utf8PathBuf {
        self.data_root.join(observation.to_string())
    }

    pub fn source_product_path(&self, source: &SourceProductId) -> Utf8PathBuf {
        self.observation_dir(source.observation()).join(source.filename())
    }

    pub fn browse_dir(&self) -> Utf8PathBuf {
        self.data_root.join("browse")
    }

    pub fn browse_path(&self, filename: &str) -> Utf8PathBuf {
        self.browse_dir().join(filename)
    }

    pub fn metadata_path(&self, id: &str) -> Utf8PathBuf {
        self.data_root.join("metadata").join(format!("{id}.json"))
    }

    pub fn ensure_data_root(&self) -> Result<(), HiriseError> {
        fs::create_dir_all(self.data_root.as_std_path())
            .map_err(|err| HiriseError::Filesystem(err.to_string()))
    }

    pub fn ensure_parent(path: &Utf8Path) -> Result<(), HiriseError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent.as_std_path())
                .map_err(|err| HiriseError::Filesystem(err.to_string()))?;
        }
        Ok(())
    }

    pub fn exists(path: &Utf8Path) -> bool {
        path.as_std_path().exists()
    }

    pub fn write_metadata(path: &Utf8Path, metadata: &Metadata) -> Result<(), HiriseError> {
        Self::ensure_parent(path)?;
        let parent = path
            .parent()
            .ok_or_else(|| HiriseError::Filesystem("invalid metadata path".to_string()))?;
        let content = serde_json::to_vec_pretty(metadata)
            .map_err(|err| HiriseError::Filesystem(err.to_string()))?;
        let temp = tempfile::Builder::new()
            .prefix("hirise-dl-meta")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| HiriseError::Filesystem(err.to_string()))?;
        fs::write(temp.path(), &content).map_err(|err| HiriseError::Filesystem(err.to_string()))?;
        if path.as_std_path().exists() {
            fs::remove_file(path.as_std_path())
                .map_err(|err| HiriseError::Filesystem(err.to_string()))?;
        }
        temp.persist(path.as_std_path())
            .map_err(|err| HiriseError::Filesystem(err.to_string()))?;
        Ok(())
    }

    pub fn list_metadata(&self) -> Result<Vec<Metadata>, HiriseError> {
        let metadata_root = self.data_root.join("metadata");
        if !metadata_root.as_std_path().exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for path in walk_dir(metadata_root.as_std_path())? {
            if path.is_file() && path.extension().map(|ext| ext == "json").unwrap_or(false) {
                let content = fs::read_to_string(&path)
                    .map_err(|err| HiriseError::Filesystem(err.to_string()))?;
                let metadata: Metadata = serde_json::from_str(&content)
                    .map_err(|err| HiriseError::Filesystem(err.to_string()))?;
                entries.push(metadata);
            }
        }
        Ok(entries)
    }
}

/// Sidecar record written next to every completed download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub id: String,
    pub artifact: Option<String>,
    pub url: String,
    pub downloaded_at: String,
    pub tool: String,
    pub resolved_path: String,
}

fn walk_dir(root: &Path) -> Result<Vec<PathBuf>, HiriseError> {
    let mut items = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(path) = stack.pop() {
        let entries =
            fs::read_dir(&path).map_err(|err| HiriseError::Filesystem(err.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|err| HiriseError::Filesystem(err.to_string()))?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path.clone());
            }
            items.push(path);
        }
    }
    Ok(items)
}
