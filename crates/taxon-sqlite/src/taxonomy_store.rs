//! TaxonomyStore implementation for SQLite
//!
//! Classes live in `classes` with a self-referencing `parent_id`. Annotation
//! values are keyed by `(class_id, property)` so a write replaces the
//! previous value. Writes go through [`SqlitePool::write`], so each trait
//! call is one transaction.

use crate::config::SqliteConfig;
use crate::connection::{DbStats, SqlitePool};
use crate::error::{SqliteError, SqliteResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use taxon_core::{
    AnnotationField, NodeRef, StorageError, StorageResult, TaxonomyNode, TaxonomyReader,
    TaxonomyStore,
};
use tracing::{debug, info};

const META_ONTOLOGY_IRI: &str = "ontology_iri";
const META_CREATED_AT: &str = "created_at";

const NODE_SELECT: &str = "SELECT c.id, c.name, p.name FROM classes c \
                           LEFT JOIN classes p ON p.id = c.parent_id";

/// New ontology IRI: `{base}_{uuid without hyphens}`.
pub fn generate_ontology_iri(base: &str) -> String {
    format!("{}_{}", base, uuid::Uuid::new_v4().simple())
}

/// Summary figures for a stored taxonomy
#[derive(Debug, Clone, Serialize)]
pub struct TaxonomyStats {
    pub ontology_iri: Option<String>,
    pub created_at: Option<String>,
    pub class_count: usize,
    /// Classes without a parent
    pub root_count: usize,
    pub summary_count: usize,
    pub embedding_count: usize,
    pub annotation_fields: Vec<String>,
    pub max_depth: usize,
    pub db: DbStats,
}

/// SQLite implementation of [`TaxonomyStore`] and [`TaxonomyReader`]
#[derive(Clone)]
pub struct SqliteTaxonomyStore {
    pool: SqlitePool,
}

impl SqliteTaxonomyStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) a database file with default settings.
    pub fn open(path: impl AsRef<Path>) -> SqliteResult<Self> {
        Ok(Self::new(SqlitePool::open(&SqliteConfig::new(path))?))
    }

    /// In-memory store for tests.
    pub fn memory() -> SqliteResult<Self> {
        Ok(Self::new(SqlitePool::memory()?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn read<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> SqliteResult<T> + Send + 'static,
        T: Send + 'static,
    {
        Ok(self.pool.read(f).await?)
    }

    async fn write<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> SqliteResult<T> + Send + 'static,
        T: Send + 'static,
    {
        Ok(self.pool.write(f).await?)
    }

    pub async fn ontology_iri(&self) -> StorageResult<Option<String>> {
        self.read(|conn| get_meta(conn, META_ONTOLOGY_IRI)).await
    }

    pub async fn set_ontology_iri(&self, iri: &str) -> StorageResult<()> {
        let iri = iri.to_string();
        self.write(move |tx| stamp_ontology(tx, &iri)).await
    }

    /// Return the stored IRI, generating one from `base` on first use.
    pub async fn ensure_ontology_iri(&self, base: &str) -> StorageResult<String> {
        let candidate = generate_ontology_iri(base);
        let (iri, assigned) = self
            .write(move |tx| match get_meta(tx, META_ONTOLOGY_IRI)? {
                Some(existing) => Ok((existing, false)),
                None => {
                    stamp_ontology(tx, &candidate)?;
                    Ok((candidate, true))
                }
            })
            .await?;
        if assigned {
            info!(iri = %iri, "Assigned ontology IRI");
        }
        Ok(iri)
    }

    pub async fn stats(&self) -> StorageResult<TaxonomyStats> {
        let db = self.pool.stats().await?;

        self.read(move |conn| {
            let count = |sql: &str, field: Option<&str>| -> SqliteResult<usize> {
                let n: i64 = match field {
                    Some(f) => conn.query_row(sql, [f], |row| row.get(0))?,
                    None => conn.query_row(sql, [], |row| row.get(0))?,
                };
                Ok(n as usize)
            };
            let by_field = "SELECT COUNT(*) FROM annotations WHERE property = ?1";

            // Depth of the deepest class below a root (roots are depth 0).
            let max_depth: Option<i64> = conn.query_row(
                "WITH RECURSIVE walk(id, depth) AS (
                     SELECT id, 0 FROM classes WHERE parent_id IS NULL
                     UNION ALL
                     SELECT c.id, w.depth + 1 FROM classes c JOIN walk w ON c.parent_id = w.id
                 )
                 SELECT MAX(depth) FROM walk",
                [],
                |row| row.get(0),
            )?;

            Ok(TaxonomyStats {
                ontology_iri: get_meta(conn, META_ONTOLOGY_IRI)?,
                created_at: get_meta(conn, META_CREATED_AT)?,
                class_count: count("SELECT COUNT(*) FROM classes", None)?,
                root_count: count("SELECT COUNT(*) FROM classes WHERE parent_id IS NULL", None)?,
                summary_count: count(by_field, Some(AnnotationField::Summary.as_str()))?,
                embedding_count: count(by_field, Some(AnnotationField::SummaryEmbedding.as_str()))?,
                annotation_fields: annotation_fields(conn)?,
                max_depth: max_depth.unwrap_or(0) as usize,
                db,
            })
        })
        .await
    }
}

fn get_meta(conn: &Connection, key: &str) -> SqliteResult<Option<String>> {
    Ok(conn
        .query_row(
            "SELECT value FROM ontology_meta WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()?)
}

fn set_meta(conn: &Connection, key: &str, value: &str) -> SqliteResult<()> {
    conn.execute(
        "INSERT INTO ontology_meta (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

/// Set the IRI, and the creation time if this is the first stamp.
fn stamp_ontology(conn: &Connection, iri: &str) -> SqliteResult<()> {
    set_meta(conn, META_ONTOLOGY_IRI, iri)?;
    if get_meta(conn, META_CREATED_AT)?.is_none() {
        set_meta(conn, META_CREATED_AT, &chrono::Utc::now().to_rfc3339())?;
    }
    Ok(())
}

fn class_id(conn: &Connection, name: &str) -> SqliteResult<Option<i64>> {
    Ok(conn
        .query_row("SELECT id FROM classes WHERE name = ?1", [name], |row| {
            row.get(0)
        })
        .optional()?)
}

fn annotation_fields(conn: &Connection) -> SqliteResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM annotation_properties ORDER BY rowid")?;
    let fields = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(fields)
}

/// Load nodes matching `filter` (a SQL fragment over aliases `c` and `p`),
/// with their annotations, in creation order.
fn query_nodes<P: rusqlite::Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> SqliteResult<Vec<TaxonomyNode>> {
    let sql = format!("{} {} ORDER BY c.id", NODE_SELECT, filter);
    let mut stmt = conn.prepare(&sql)?;
    let mut nodes = stmt
        .query_map(params, |row| {
            Ok(TaxonomyNode {
                id: row.get(0)?,
                name: row.get(1)?,
                parent: row.get(2)?,
                annotations: BTreeMap::new(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut annotations =
        conn.prepare_cached("SELECT property, value FROM annotations WHERE class_id = ?1")?;
    for node in nodes.iter_mut() {
        let rows = annotations.query_map([node.id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (field, value) = row?;
            node.annotations.insert(field, value);
        }
    }

    Ok(nodes)
}

#[async_trait]
impl TaxonomyStore for SqliteTaxonomyStore {
    async fn ensure_root(&self, name: &str) -> StorageResult<NodeRef> {
        let name = name.to_string();
        self.write(move |tx| {
            let existing: Option<(i64, Option<i64>)> = tx
                .query_row(
                    "SELECT id, parent_id FROM classes WHERE name = ?1",
                    [&name],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            match existing {
                Some((id, None)) => Ok(NodeRef::new(id, name)),
                // A nested class cannot double as a root.
                Some((_, Some(_))) => Err(SqliteError::Conflict(name)),
                None => {
                    tx.execute("INSERT INTO classes (name, parent_id) VALUES (?1, NULL)", [&name])?;
                    info!(name = %name, "Created root class");
                    Ok(NodeRef::new(tx.last_insert_rowid(), name))
                }
            }
        })
        .await
    }

    async fn node_exists(&self, name: &str) -> StorageResult<bool> {
        let name = name.to_string();
        self.read(move |conn| Ok(class_id(conn, &name)?.is_some()))
            .await
    }

    async fn create_node(&self, name: &str, parent_name: &str) -> StorageResult<NodeRef> {
        let name = name.to_string();
        let parent_name = parent_name.to_string();

        self.write(move |tx| {
            let parent_id = class_id(tx, &parent_name)?
                .ok_or_else(|| SqliteError::NotFound(parent_name.clone()))?;
            if class_id(tx, &name)?.is_some() {
                return Err(SqliteError::Conflict(name));
            }

            tx.execute(
                "INSERT INTO classes (name, parent_id) VALUES (?1, ?2)",
                params![name, parent_id],
            )?;
            let id = tx.last_insert_rowid();
            debug!(id, name = %name, parent = %parent_name, "Inserted class");
            Ok(NodeRef::new(id, name))
        })
        .await
    }

    async fn declare_annotation_field(&self, field: &str) -> StorageResult<()> {
        let field = field.to_string();
        self.write(move |tx| {
            tx.execute(
                "INSERT OR IGNORE INTO annotation_properties (name) VALUES (?1)",
                [&field],
            )?;
            Ok(())
        })
        .await
    }

    async fn set_annotation(&self, node: &NodeRef, field: &str, value: &str) -> StorageResult<()> {
        let name = node.name.clone();
        let field = field.to_string();
        let value = value.to_string();

        self.write(move |tx| {
            let declared: Option<String> = tx
                .query_row(
                    "SELECT name FROM annotation_properties WHERE name = ?1",
                    [&field],
                    |row| row.get(0),
                )
                .optional()?;
            if declared.is_none() {
                return Err(SqliteError::InvalidOperation(format!(
                    "annotation field '{}' is not declared",
                    field
                )));
            }

            let id = class_id(tx, &name)?.ok_or_else(|| SqliteError::NotFound(name.clone()))?;
            tx.execute(
                "INSERT INTO annotations (class_id, property, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(class_id, property) DO UPDATE SET
                     value = excluded.value,
                     updated_at = datetime('now')",
                params![id, field, value],
            )?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl TaxonomyReader for SqliteTaxonomyStore {
    async fn get_node(&self, name: &str) -> StorageResult<Option<TaxonomyNode>> {
        let name = name.to_string();
        self.read(move |conn| {
            Ok(query_nodes(conn, "WHERE c.name = ?1", [&name])?
                .into_iter()
                .next())
        })
        .await
    }

    async fn children(&self, name: &str) -> StorageResult<Vec<TaxonomyNode>> {
        let name = name.to_string();
        self.read(move |conn| query_nodes(conn, "WHERE p.name = ?1", [&name]))
            .await
    }

    async fn list_nodes(&self) -> StorageResult<Vec<TaxonomyNode>> {
        self.read(|conn| query_nodes(conn, "", [])).await
    }

    async fn annotation_fields(&self) -> StorageResult<Vec<String>> {
        self.read(annotation_fields).await
    }

    async fn nodes_with_annotation(&self, field: &str) -> StorageResult<Vec<TaxonomyNode>> {
        let field = field.to_string();
        self.read(move |conn| {
            query_nodes(
                conn,
                "WHERE c.id IN (SELECT class_id FROM annotations WHERE property = ?1)",
                [&field],
            )
        })
        .await
    }

    async fn node_count(&self) -> StorageResult<usize> {
        self.read(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM classes", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }
}
