//! Taxonomy construction settings

use serde::{Deserialize, Serialize};

/// Construction pass configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Name of the taxonomy root class.
    pub root_class: String,
    /// `parent_index` value meaning "no parent".
    pub root_parent_sentinel: i64,
    /// Prefix of generated ontology IRIs.
    pub iri_base: String,
    pub max_name_len: usize,
    /// Request an embedding for every summary.
    pub embeddings_enabled: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root_class: "Thing".to_string(),
            root_parent_sentinel: -1,
            iri_base: "http://www.semanticweb.org/MINDMAP_CLUSTER".to_string(),
            max_name_len: 200,
            embeddings_enabled: true,
        }
    }
}
