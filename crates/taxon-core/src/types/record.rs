//! Input records produced by the upstream document-analysis pipeline
//!
//! A batch is a flat list of clustering nodes linked by `parent_index`.
//! Only the fields the taxonomy builder needs are typed; everything else
//! the ingestion pipeline attaches (page, text, layout type) is carried
//! through untouched in [`InputRecord::extra`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parent index used by the ingestion pipeline for "no parent".
pub const DEFAULT_ROOT_SENTINEL: i64 = -1;

/// One node of the upstream clustering tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Batch-unique identity assigned by the ingestion pipeline.
    pub index: i64,

    /// Index of the parent record; `None` or the root sentinel attach
    /// directly under the taxonomy root.
    #[serde(default, alias = "index_parent")]
    pub parent_index: Option<i64>,

    /// Intended class name, derived upstream (usually an extracted keyword).
    #[serde(default, alias = "class_name", alias = "key_word")]
    pub name: String,

    /// Summary text used for the `summary` annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarized_paragraph: Option<String>,

    /// Ingestion-specific fields, opaque to this crate.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InputRecord {
    pub fn new(index: i64, parent_index: Option<i64>, name: impl Into<String>) -> Self {
        Self {
            index,
            parent_index,
            name: name.into(),
            summarized_paragraph: None,
            extra: Map::new(),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summarized_paragraph = Some(summary.into());
        self
    }

    /// Summary text, treating an empty string as absent.
    pub fn summary(&self) -> Option<&str> {
        self.summarized_paragraph
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }
}

/// Accepted shapes of a record file.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordFile {
    Bare(Vec<InputRecord>),
    Wrapped {
        #[serde(alias = "all_paragraphs")]
        nodes: Vec<InputRecord>,
    },
}

/// Parse a record batch from JSON.
///
/// Accepts a bare array of records, or an object holding the array under
/// `nodes` (or `all_paragraphs`, the key the PDF processor emits).
pub fn parse_records(json: &str) -> serde_json::Result<Vec<InputRecord>> {
    let file: RecordFile = serde_json::from_str(json)?;
    Ok(match file {
        RecordFile::Bare(records) => records,
        RecordFile::Wrapped { nodes } => nodes,
    })
}
