use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;
use thiserror::Error;

use crate::backend::{FetchError, LookupBackend, LookupRequest, SearchError, SearchRequest};
use crate::model::Record;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid seed data: {0}")]
    Seed(#[from] serde_json::Error),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS record (
        id TEXT PRIMARY KEY,
        object_name TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS record_field (
        record_id TEXT NOT NULL REFERENCES record(id),
        field TEXT NOT NULL,
        value TEXT NOT NULL,
        PRIMARY KEY (record_id, field)
    );
    CREATE INDEX IF NOT EXISTS record_object_idx ON record(object_name);
";

/// One seeded record: object name, id and raw field values.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SeedRecord {
    pub object: String,
    pub id: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

/// Local record directory backed by SQLite. Records belong to an object and
/// carry arbitrary named fields; searches read the title from the primary
/// field and the subtitle from the optional secondary field.
pub struct RecordStore {
    db: Connection,
    id_prefix: String,
}

impl RecordStore {
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    fn from_connection(db: Connection) -> Result<Self, StoreError> {
        db.execute_batch(SCHEMA)?;
        Ok(Self {
            db,
            id_prefix: "rec".to_string(),
        })
    }

    pub fn with_id_prefix(mut self, prefix: &str) -> Self {
        self.id_prefix = prefix.to_string();
        self
    }

    pub fn insert_record(
        &self,
        object_name: &str,
        id: &str,
        fields: &BTreeMap<String, String>,
    ) -> Result<(), StoreError> {
        if id.trim().is_empty() {
            return Err(StoreError::InvalidRecord("record id is empty".into()));
        }
        if object_name.trim().is_empty() {
            return Err(StoreError::InvalidRecord(format!(
                "record {id} has no object name"
            )));
        }

        self.db.execute(
            "INSERT INTO record (id, object_name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET object_name=excluded.object_name",
            params![id, object_name],
        )?;
        for (field, value) in fields {
            self.db.execute(
                "INSERT INTO record_field (record_id, field, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(record_id, field) DO UPDATE SET value=excluded.value",
                params![id, field, value],
            )?;
        }
        Ok(())
    }

    /// Inserts a record under a freshly generated id and returns that id.
    pub fn create_record(
        &self,
        object_name: &str,
        fields: &BTreeMap<String, String>,
    ) -> Result<String, StoreError> {
        let mut next: i64 = self
            .db
            .query_row("SELECT COALESCE(MAX(rowid), 0) + 1 FROM record", [], |row| row.get(0))?;
        let id = loop {
            let candidate = format!("{}-{next:06}", self.id_prefix);
            let taken: bool = self.db.query_row(
                "SELECT EXISTS(SELECT 1 FROM record WHERE id = ?1)",
                params![candidate],
                |row| row.get(0),
            )?;
            if !taken {
                break candidate;
            }
            next += 1;
        };
        self.insert_record(object_name, &id, fields)?;
        Ok(id)
    }

    pub fn get_record(
        &self,
        object_name: &str,
        id: &str,
        primary_field: &str,
        secondary_field: Option<&str>,
    ) -> Result<Option<Record>, StoreError> {
        let mut stmt = self.db.prepare(
            "SELECT r.id, p.value, s.value FROM record r
             LEFT JOIN record_field p ON p.record_id = r.id AND p.field = ?3
             LEFT JOIN record_field s ON s.record_id = r.id AND s.field = ?4
             WHERE r.object_name = ?1 AND r.id = ?2",
        )?;
        let record = stmt
            .query_row(params![object_name, id, primary_field, secondary_field], row_to_record)
            .optional()?;
        Ok(record)
    }

    /// All records of `object_name` that have the primary field, minus
    /// `exclude_ids`, in insertion order.
    pub fn list_records(
        &self,
        object_name: &str,
        primary_field: &str,
        secondary_field: Option<&str>,
        exclude_ids: &[String],
    ) -> Result<Vec<Record>, StoreError> {
        let mut stmt = self.db.prepare(
            "SELECT r.id, p.value, s.value FROM record r
             JOIN record_field p ON p.record_id = r.id AND p.field = ?2
             LEFT JOIN record_field s ON s.record_id = r.id AND s.field = ?3
             WHERE r.object_name = ?1
             ORDER BY r.rowid",
        )?;
        let rows = stmt.query_map(params![object_name, primary_field, secondary_field], row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            let record = row?;
            if !exclude_ids.iter().any(|id| id == &record.id) {
                records.push(record);
            }
        }
        Ok(records)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .db
            .query_row("SELECT COUNT(*) FROM record", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Loads a JSON array of [`SeedRecord`]s. Returns the number inserted.
    pub fn seed_from_json(&self, raw: &str) -> Result<usize, StoreError> {
        let seeds: Vec<SeedRecord> = serde_json::from_str(raw)?;
        for seed in &seeds {
            self.insert_record(&seed.object, &seed.id, &seed.fields)?;
        }
        Ok(seeds.len())
    }

    pub fn seed_from_file(&self, path: &Path) -> Result<usize, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        self.seed_from_json(&raw)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
    let id: String = row.get(0)?;
    let title: Option<String> = row.get(1)?;
    Ok(Record {
        title: title.unwrap_or_else(|| id.clone()),
        id,
        subtitle: row.get(2)?,
        icon: None,
    })
}

impl LookupBackend for RecordStore {
    fn search(&self, request: &SearchRequest) -> Result<Vec<Record>, SearchError> {
        let candidates = self
            .list_records(
                &request.object_name,
                &request.primary_field,
                request.secondary_field.as_deref(),
                &request.exclude_ids,
            )
            .map_err(|error| SearchError::Server(error.to_string()))?;
        Ok(crate::search::rank(
            candidates,
            &request.query,
            request.max_results,
        ))
    }

    fn fetch_record_by_lookup(&self, request: &LookupRequest) -> Result<Record, FetchError> {
        self.get_record(
            &request.object_name,
            &request.record_id,
            &request.primary_field,
            request.secondary_field.as_deref(),
        )
        .map_err(|error| FetchError::Server(error.to_string()))?
        .ok_or_else(|| FetchError::NotFound(request.record_id.clone()))
    }
}
