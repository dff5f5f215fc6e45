//! Taxonomy node types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable store-assigned identifier of a taxonomy node.
pub type NodeId = i64;

/// Handle to a node that exists in a taxonomy store.
///
/// Names are unique for the lifetime of a store and never change after
/// creation, so a `NodeRef` stays valid for the whole construction pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: NodeId,
    pub name: String,
}

impl NodeRef {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A materialized taxonomy node as read back from a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyNode {
    pub id: NodeId,
    pub name: String,
    /// `None` only for the taxonomy root.
    pub parent: Option<String>,
    /// Annotation field name to value.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl TaxonomyNode {
    pub fn node_ref(&self) -> NodeRef {
        NodeRef::new(self.id, self.name.clone())
    }

    pub fn annotation(&self, field: &str) -> Option<&str> {
        self.annotations.get(field).map(String::as_str)
    }

    pub fn summary(&self) -> Option<&str> {
        self.annotation(AnnotationField::Summary.as_str())
    }

    pub fn summary_embedding(&self) -> Option<&str> {
        self.annotation(AnnotationField::SummaryEmbedding.as_str())
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Annotation fields written by the taxonomy builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationField {
    /// Human-readable summary of the node's source text
    Summary,
    /// Serialized embedding of the summary
    SummaryEmbedding,
}

impl AnnotationField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::SummaryEmbedding => "summary_embedding",
        }
    }
}

impl fmt::Display for AnnotationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_accessors() {
        let mut node = TaxonomyNode {
            id: 7,
            name: "Kings".to_string(),
            parent: Some("Thing".to_string()),
            annotations: BTreeMap::new(),
        };
        assert_eq!(node.summary(), None);

        node.annotations
            .insert("summary".to_string(), "Text A".to_string());
        assert_eq!(node.summary(), Some("Text A"));
        assert_eq!(node.summary_embedding(), None);
        assert!(!node.is_root());
        assert_eq!(node.node_ref(), NodeRef::new(7, "Kings"));
    }

    #[test]
    fn test_field_names() {
        assert_eq!(AnnotationField::Summary.as_str(), "summary");
        assert_eq!(
            AnnotationField::SummaryEmbedding.to_string(),
            "summary_embedding"
        );
    }
}
