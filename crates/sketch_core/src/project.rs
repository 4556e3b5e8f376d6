//! Project record persistence.
//!
//! The record is the sole unit of persistence and export: three source strings
//! plus the asset descriptors, saved as one JSON object. Asset names map
//! deterministically (BTreeMap), so loading a record and saving it again
//! reproduces the file byte for byte.

use crate::asset::{AssetKind, AssetRegistry};
use crate::editor::EditorPanes;
use crate::error::SketchResult;
use crate::program::Sources;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Persisted form of one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Data URI or external URL.
    pub url: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
}

/// The flat project record: `{start, update, draw, assets}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub start: String,
    pub update: String,
    pub draw: String,
    pub assets: BTreeMap<String, AssetDescriptor>,
}

impl ProjectRecord {
    /// Snapshot of the current editor panes and asset registry.
    pub fn from_parts(sources: &Sources, registry: &AssetRegistry) -> Self {
        let assets = registry
            .iter()
            .map(|entry| {
                (
                    entry.name.clone(),
                    AssetDescriptor {
                        url: entry.url.clone(),
                        kind: entry.kind,
                    },
                )
            })
            .collect();
        Self {
            start: sources.start.clone(),
            update: sources.update.clone(),
            draw: sources.draw.clone(),
            assets,
        }
    }

    pub fn sources(&self) -> Sources {
        Sources::new(&self.start, &self.update, &self.draw)
    }

    /// Applies the record to editor panes and a registry. The registry should
    /// be empty (a fresh project load); descriptors re-register by URL and
    /// resolve on the next `resolve_loads`.
    pub fn apply(&self, panes: &mut EditorPanes, registry: &mut AssetRegistry) -> SketchResult<()> {
        panes.set_sources(&self.sources());
        for (name, descriptor) in &self.assets {
            registry.register_url(name, descriptor.kind, &descriptor.url)?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ProjectIoError> {
        serde_json::to_string_pretty(self).map_err(ProjectIoError::Json)
    }

    pub fn from_json(json: &str) -> Result<Self, ProjectIoError> {
        serde_json::from_str(json).map_err(ProjectIoError::Json)
    }
}

/// Errors from project file I/O.
#[derive(Debug)]
pub enum ProjectIoError {
    /// File system error.
    Io(std::io::Error),
    /// JSON (de)serialization error.
    Json(serde_json::Error),
}

impl fmt::Display for ProjectIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectIoError::Io(e) => write!(f, "IO error: {}", e),
            ProjectIoError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for ProjectIoError {}

impl From<std::io::Error> for ProjectIoError {
    fn from(e: std::io::Error) -> Self {
        ProjectIoError::Io(e)
    }
}

/// Saves a record as pretty-printed JSON.
pub fn save_project<P: AsRef<Path>>(record: &ProjectRecord, path: P) -> Result<(), ProjectIoError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, record).map_err(ProjectIoError::Json)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Loads a record from a JSON file.
pub fn load_project<P: AsRef<Path>>(path: P) -> Result<ProjectRecord, ProjectIoError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(ProjectIoError::Json)
}
