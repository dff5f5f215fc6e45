//! Parent-index grouping
//!
//! Groups a flat record batch by parent so the builder can walk it as a
//! tree. Group order follows input order. Only the first record carrying a
//! given `index` joins a group; later ones are set aside as duplicates.

use crate::types::InputRecord;
use std::collections::HashMap;

/// Key of a parent group: the taxonomy root or a record index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParentKey {
    Root,
    Index(i64),
}

impl ParentKey {
    /// Classify a `parent_index` value. `None` and the sentinel mean root.
    pub fn of(parent_index: Option<i64>, root_sentinel: i64) -> Self {
        match parent_index {
            None => Self::Root,
            Some(p) if p == root_sentinel => Self::Root,
            Some(p) => Self::Index(p),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }
}

impl std::fmt::Display for ParentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Index(i) => write!(f, "{}", i),
        }
    }
}

/// A record batch grouped by parent key.
#[derive(Debug, Clone)]
pub struct RecordTree<'a> {
    records: &'a [InputRecord],
    groups: HashMap<ParentKey, Vec<&'a InputRecord>>,
    by_index: HashMap<i64, &'a InputRecord>,
    duplicates: Vec<&'a InputRecord>,
    root_sentinel: i64,
}

/// Group `records` by parent key.
///
/// Records with the same parent keep their relative input order. When two
/// records share an `index` the first one wins and the rest are listed by
/// [`RecordTree::duplicates`].
pub fn group_by_parent(records: &[InputRecord], root_sentinel: i64) -> RecordTree<'_> {
    let mut groups: HashMap<ParentKey, Vec<&InputRecord>> = HashMap::new();
    let mut by_index = HashMap::with_capacity(records.len());
    let mut duplicates = Vec::new();

    for record in records {
        if by_index.contains_key(&record.index) {
            duplicates.push(record);
            continue;
        }
        by_index.insert(record.index, record);
        groups
            .entry(ParentKey::of(record.parent_index, root_sentinel))
            .or_default()
            .push(record);
    }

    RecordTree {
        records,
        groups,
        by_index,
        duplicates,
        root_sentinel,
    }
}

impl<'a> RecordTree<'a> {
    /// Records whose parent key is `key`, in input order.
    pub fn children(&self, key: ParentKey) -> &[&'a InputRecord] {
        self.groups.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent_key(&self, record: &InputRecord) -> ParentKey {
        ParentKey::of(record.parent_index, self.root_sentinel)
    }

    /// First record carrying `index`.
    pub fn record(&self, index: i64) -> Option<&'a InputRecord> {
        self.by_index.get(&index).copied()
    }

    /// Records whose `index` was already taken by an earlier record.
    pub fn duplicates(&self) -> &[&'a InputRecord] {
        &self.duplicates
    }

    /// The full batch, in input order.
    pub fn records(&self) -> &'a [InputRecord] {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
