//! Mapping repository for persisting and reusing reviewed mappings.
//!
//! Reviewed mappings are stored as JSON files named
//! `{LAYOUT}_{SOURCE}.json`, so re-running a layout against a source file
//! that was already reviewed can pick up the earlier decisions.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use claims_model::MappingConfig;

/// Directory of stored mapping configurations.
#[derive(Debug, Clone)]
pub struct MappingRepository {
    base_dir: PathBuf,
}

/// Metadata about a stored mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingMetadata {
    pub layout_name: String,
    pub source_name: String,
    pub file_path: PathBuf,
    pub mapping_count: usize,
    pub unmapped_count: usize,
    pub saved_at: Option<String>,
}

/// Mapping config with repository metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMappingConfig {
    #[serde(flatten)]
    pub config: MappingConfig,
    /// RFC 3339 timestamp of when this mapping was saved.
    pub saved_at: Option<String>,
    pub description: Option<String>,
    /// Version of the mapping format.
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl StoredMappingConfig {
    pub fn new(config: MappingConfig) -> Self {
        Self {
            config,
            saved_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
            description: None,
            version: default_version(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl MappingRepository {
    /// Opens a repository at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).with_context(|| {
            format!(
                "Failed to create mapping repository: {}",
                base_dir.display()
            )
        })?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Saves a mapping, replacing any earlier one for the same layout and source.
    pub fn save(&self, config: &MappingConfig) -> Result<PathBuf> {
        self.save_stored(&StoredMappingConfig::new(config.clone()))
    }

    pub fn save_stored(&self, stored: &StoredMappingConfig) -> Result<PathBuf> {
        let filename =
            mapping_filename(&stored.config.layout_name, &stored.config.source_name);
        let path = self.base_dir.join(&filename);
        let json = serde_json::to_string_pretty(stored)
            .with_context(|| format!("Failed to serialize mapping for {filename}"))?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write mapping to {}", path.display()))?;
        debug!(path = %path.display(), "saved mapping");
        Ok(path)
    }

    /// Loads the mapping for a layout and source, if one was saved.
    pub fn load(&self, layout_name: &str, source_name: &str) -> Result<Option<MappingConfig>> {
        Ok(self
            .load_stored(layout_name, source_name)?
            .map(|stored| stored.config))
    }

    pub fn load_stored(
        &self,
        layout_name: &str,
        source_name: &str,
    ) -> Result<Option<StoredMappingConfig>> {
        let path = self.base_dir.join(mapping_filename(layout_name, source_name));
        if !path.exists() {
            return Ok(None);
        }
        read_stored(&path).map(Some)
    }

    /// All mappings saved for one layout, keyed by source name.
    pub fn load_layout_mappings(
        &self,
        layout_name: &str,
    ) -> Result<BTreeMap<String, MappingConfig>> {
        let prefix = format!("{}_", normalize_id(layout_name));
        let mut mappings = BTreeMap::new();
        for path in self.json_files()? {
            let matches_prefix = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(&prefix));
            if !matches_prefix {
                continue;
            }
            if let Ok(stored) = read_stored(&path) {
                mappings.insert(stored.config.source_name.clone(), stored.config);
            }
        }
        Ok(mappings)
    }

    /// Lists every readable mapping, ordered by layout then source.
    ///
    /// Files that do not parse as stored mappings are skipped.
    pub fn list(&self) -> Result<Vec<MappingMetadata>> {
        let mut metadata = Vec::new();
        for path in self.json_files()? {
            let Ok(stored) = read_stored(&path) else {
                debug!(path = %path.display(), "skipping unreadable mapping file");
                continue;
            };
            metadata.push(MappingMetadata {
                layout_name: stored.config.layout_name.clone(),
                source_name: stored.config.source_name.clone(),
                file_path: path,
                mapping_count: stored.config.mappings.len(),
                unmapped_count: stored.config.unmapped_fields.len(),
                saved_at: stored.saved_at,
            });
        }
        metadata.sort_by(|a, b| {
            a.layout_name
                .cmp(&b.layout_name)
                .then_with(|| a.source_name.cmp(&b.source_name))
        });
        Ok(metadata)
    }

    /// Deletes a mapping. Returns `false` when nothing was stored.
    pub fn delete(&self, layout_name: &str, source_name: &str) -> Result<bool> {
        let path = self.base_dir.join(mapping_filename(layout_name, source_name));
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete mapping: {}", path.display()))?;
        Ok(true)
    }

    pub fn exists(&self, layout_name: &str, source_name: &str) -> bool {
        self.base_dir
            .join(mapping_filename(layout_name, source_name))
            .exists()
    }

    fn json_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.base_dir)
            .with_context(|| format!("Failed to read repository: {}", self.base_dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        Ok(files)
    }
}

fn read_stored(path: &Path) -> Result<StoredMappingConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read mapping from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse mapping from {}", path.display()))
}

fn mapping_filename(layout_name: &str, source_name: &str) -> String {
    format!(
        "{}_{}.json",
        normalize_id(layout_name),
        normalize_id(source_name)
    )
}

/// Uppercases and replaces anything but letters and digits with `_`.
pub fn normalize_id(id: &str) -> String {
    id.trim()
        .to_uppercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
