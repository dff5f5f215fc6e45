//! Build options, results and errors

use super::registry::TaxonomyNodeRegistry;
use super::sanitize::MAX_NAME_LEN;
use crate::traits::StorageError;
use crate::types::DEFAULT_ROOT_SENTINEL;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Knobs for a construction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// `parent_index` value meaning "attach under the root".
    pub root_parent_sentinel: i64,
    /// Character limit for sanitized class names.
    pub max_name_len: usize,
    /// Upper bound on a single embedding call. `None` waits indefinitely.
    pub embedding_timeout: Option<Duration>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            root_parent_sentinel: DEFAULT_ROOT_SENTINEL,
            max_name_len: MAX_NAME_LEN,
            embedding_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Counters collected during a construction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub records_total: usize,
    pub nodes_created: usize,
    /// Nodes whose final name differs from the sanitized candidate.
    pub renamed: usize,
    /// Records attached under the root because their parent was unresolved.
    pub root_fallbacks: usize,
    pub summaries_set: usize,
    pub embeddings_set: usize,
    pub embedding_failures: usize,
    pub annotation_failures: usize,
    /// Records dropped because their index was already processed.
    pub skipped_duplicates: usize,
    /// Deepest level reached, with direct children of the root at depth 1.
    pub max_depth: usize,
}

impl BuildReport {
    /// Records that were neither created nor skipped as duplicates.
    pub fn unprocessed(&self) -> usize {
        self.records_total
            .saturating_sub(self.nodes_created + self.skipped_duplicates)
    }
}

/// Result of a finished (or aborted) construction pass.
#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    pub registry: TaxonomyNodeRegistry,
    pub report: BuildReport,
}

/// Fatal construction errors.
///
/// Annotation and embedding failures are not fatal; they are logged and
/// counted in the [`BuildReport`].
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The store failed while checking or creating a node. `partial` holds
    /// everything created up to that point.
    #[error("Taxonomy store failed while building: {source}")]
    Store {
        #[source]
        source: StorageError,
        partial: Box<BuildOutcome>,
    },

    #[error("Failed to prepare taxonomy root '{name}': {source}")]
    Root {
        name: String,
        #[source]
        source: StorageError,
    },
}

impl BuildError {
    /// Work completed before the failure, if any.
    pub fn partial(&self) -> Option<&BuildOutcome> {
        match self {
            Self::Store { partial, .. } => Some(partial),
            Self::Root { .. } => None,
        }
    }

    pub fn storage_error(&self) -> &StorageError {
        match self {
            Self::Store { source, .. } | Self::Root { source, .. } => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = BuildOptions::default();
        assert_eq!(options.root_parent_sentinel, -1);
        assert_eq!(options.max_name_len, 200);
    }

    #[test]
    fn test_unprocessed() {
        let report = BuildReport {
            records_total: 7,
            nodes_created: 4,
            skipped_duplicates: 1,
            ..Default::default()
        };
        assert_eq!(report.unprocessed(), 2);
        assert_eq!(BuildReport::default().unprocessed(), 0);
    }

    #[test]
    fn test_report_serializes() {
        let json = serde_json::to_value(BuildReport::default()).unwrap();
        assert_eq!(json["nodes_created"], 0);
        assert_eq!(json["root_fallbacks"], 0);
    }

    #[test]
    fn test_error_exposes_partial() {
        let err = BuildError::Store {
            source: StorageError::QuotaExceeded { limit: 1 },
            partial: Box::default(),
        };
        assert!(err.partial().is_some());
        assert!(matches!(
            err.storage_error(),
            StorageError::QuotaExceeded { .. }
        ));
    }
}
