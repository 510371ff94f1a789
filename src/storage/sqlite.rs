//! SQLite storage backend for the lineage catalog

use super::traits::{LineageStore, OpenStore, StorageError, StorageResult};
use crate::graph::{Edge, EntityId, EntityReference, LineageDetails};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// SQLite-backed lineage catalog
///
/// One table of entities and one of lineage edges keyed by (from, to).
/// Thread-safe via internal mutex on the connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Initialize the database schema
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- Enable WAL mode for concurrent reads during writes
            PRAGMA journal_mode = WAL;

            CREATE TABLE IF NOT EXISTS entities (
                id TEXT PRIMARY KEY,
                entity_type TEXT NOT NULL,
                fqn TEXT NOT NULL,
                reference_json TEXT NOT NULL,
                UNIQUE (entity_type, fqn)
            );

            CREATE TABLE IF NOT EXISTS lineage (
                from_id TEXT NOT NULL,
                to_id TEXT NOT NULL,
                description TEXT,
                details_json TEXT,
                PRIMARY KEY (from_id, to_id),
                FOREIGN KEY (from_id) REFERENCES entities(id) ON DELETE CASCADE,
                FOREIGN KEY (to_id) REFERENCES entities(id) ON DELETE CASCADE
            );

            -- Upstream lookups go by target
            CREATE INDEX IF NOT EXISTS idx_lineage_to
                ON lineage(to_id);
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deserialize an edge from database columns
    fn row_to_edge(
        from_id: String,
        to_id: String,
        description: Option<String>,
        details_json: Option<String>,
    ) -> StorageResult<Edge> {
        let lineage_details = details_json
            .map(|json| serde_json::from_str::<LineageDetails>(&json))
            .transpose()?;
        Ok(Edge {
            from_entity: EntityId::from_string(from_id),
            to_entity: EntityId::from_string(to_id),
            description,
            lineage_details,
        })
    }

    fn query_edges(&self, sql: &str, id: &EntityId) -> StorageResult<Vec<Edge>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![id.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut edges = Vec::new();
        for row in rows {
            let (from_id, to_id, description, details) = row?;
            edges.push(Self::row_to_edge(from_id, to_id, description, details)?);
        }
        Ok(edges)
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl LineageStore for SqliteStore {
    // === Entity Operations ===

    fn save_entity(&self, entity: &EntityReference) -> StorageResult<()> {
        let reference_json = serde_json::to_string(entity)?;
        self.conn().execute(
            r#"
            INSERT INTO entities (id, entity_type, fqn, reference_json)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                entity_type = excluded.entity_type,
                fqn = excluded.fqn,
                reference_json = excluded.reference_json
            "#,
            params![
                entity.id.as_str(),
                entity.entity_type,
                entity.fully_qualified_name,
                reference_json,
            ],
        )?;
        Ok(())
    }

    fn load_entity(&self, id: &EntityId) -> StorageResult<Option<EntityReference>> {
        let json: Option<String> = self
            .conn()
            .query_row(
                "SELECT reference_json FROM entities WHERE id = ?1",
                params![id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(json.map(|j| serde_json::from_str(&j)).transpose()?)
    }

    fn find_entity_by_name(&self, entity_type: &str, fqn: &str) -> StorageResult<Option<EntityReference>> {
        let json: Option<String> = self
            .conn()
            .query_row(
                "SELECT reference_json FROM entities WHERE entity_type = ?1 AND fqn = ?2",
                params![entity_type, fqn],
                |row| row.get(0),
            )
            .optional()?;
        Ok(json.map(|j| serde_json::from_str(&j)).transpose()?)
    }

    fn list_entities(&self) -> StorageResult<Vec<EntityReference>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT reference_json FROM entities ORDER BY fqn, entity_type")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut entities = Vec::new();
        for row in rows {
            entities.push(serde_json::from_str(&row?)?);
        }
        Ok(entities)
    }

    fn delete_entity(&self, id: &EntityId) -> StorageResult<bool> {
        let deleted = self
            .conn()
            .execute("DELETE FROM entities WHERE id = ?1", params![id.as_str()])?;
        Ok(deleted > 0)
    }

    // === Lineage Operations ===

    fn add_lineage(&self, edge: &Edge) -> StorageResult<()> {
        let edge = self.resolve_edge(edge)?;
        let details_json = edge
            .lineage_details
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn().execute(
            r#"
            INSERT INTO lineage (from_id, to_id, description, details_json)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(from_id, to_id) DO UPDATE SET
                description = excluded.description,
                details_json = excluded.details_json
            "#,
            params![
                edge.from_entity.as_str(),
                edge.to_entity.as_str(),
                edge.description,
                details_json,
            ],
        )?;
        Ok(())
    }

    fn delete_lineage(&self, from: &EntityId, to: &EntityId) -> StorageResult<bool> {
        for id in [from, to] {
            if self.load_entity(id)?.is_none() {
                return Err(StorageError::EntityNotFound(id.to_string()));
            }
        }
        let deleted = self.conn().execute(
            "DELETE FROM lineage WHERE from_id = ?1 AND to_id = ?2",
            params![from.as_str(), to.as_str()],
        )?;
        Ok(deleted > 0)
    }

    fn upstream_edges_of(&self, id: &EntityId) -> StorageResult<Vec<Edge>> {
        self.query_edges(
            "SELECT from_id, to_id, description, details_json
             FROM lineage WHERE to_id = ?1 ORDER BY from_id",
            id,
        )
    }

    fn downstream_edges_of(&self, id: &EntityId) -> StorageResult<Vec<Edge>> {
        self.query_edges(
            "SELECT from_id, to_id, description, details_json
             FROM lineage WHERE from_id = ?1 ORDER BY to_id",
            id,
        )
    }
}
