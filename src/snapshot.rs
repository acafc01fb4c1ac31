//! Loading element tree snapshots
//!
//! A snapshot is a single root [`ElementSpec`] serialized as JSON or YAML:
//!
//! ```json
//! {
//!   "id": 1,
//!   "controlType": "Spreadsheet",
//!   "patterns": ["Spreadsheet", "Grid"],
//!   "children": [
//!     { "id": 2, "controlType": "DataItem", "patterns": ["SpreadsheetItem"],
//!       "properties": { "Name": "A1" } }
//!   ]
//! }
//! ```

use crate::element::{ElementId, ElementSpec, ElementTree};
use std::path::Path;
use thiserror::Error;

/// Snapshot loading error
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown snapshot format: {0}")]
    UnsupportedFormat(String),

    #[error("Duplicate element id {0} in snapshot")]
    DuplicateElementId(ElementId),
}

/// Load a snapshot file, picking the parser by extension
pub fn load(path: &Path) -> Result<ElementTree, SnapshotError> {
    let content = std::fs::read_to_string(path)?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let tree = match ext {
        "json" => from_json_str(&content)?,
        "yaml" | "yml" => from_yaml_str(&content)?,
        _ => return Err(SnapshotError::UnsupportedFormat(ext.to_string())),
    };

    log::debug!(
        "Loaded snapshot {} with {} elements",
        path.display(),
        tree.len()
    );
    Ok(tree)
}

pub fn from_json_str(content: &str) -> Result<ElementTree, SnapshotError> {
    let spec: ElementSpec = serde_json::from_str(content)?;
    ElementTree::from_spec(spec)
}

pub fn from_yaml_str(content: &str) -> Result<ElementTree, SnapshotError> {
    let spec: ElementSpec = serde_yaml::from_str(content)?;
    ElementTree::from_spec(spec)
}
