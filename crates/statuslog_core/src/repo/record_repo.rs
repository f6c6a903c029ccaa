//! Record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist records (`records`) and their field values (`record_fields`).
//! - Provide the record and field mutation API of the note store.
//!
//! # Invariants
//! - Record ids are non-empty and unique.
//! - Multi-row writes run in one transaction.
//! - `list_records` returns records in creation order.

use crate::db::DbError;
use crate::model::record::{RecordId, TrackedRecord};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Record store error.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(RecordId),
    AlreadyExists(RecordId),
    InvalidInput(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::AlreadyExists(id) => write!(f, "record already exists: {id}"),
            Self::InvalidInput(message) => write!(f, "invalid record input: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Record and field mutation API of the note store.
pub trait RecordStore {
    /// Creates a record with initial field values.
    fn create_note(&self, id: &str, values: &BTreeMap<String, String>) -> RepoResult<TrackedRecord>;
    /// Replaces all field values of one existing record.
    fn update_record(&self, record: &TrackedRecord) -> RepoResult<()>;
    /// Replaces field values of several records; all or nothing.
    fn update_records(&self, records: &[TrackedRecord]) -> RepoResult<()>;
    fn delete_record(&self, id: &str) -> RepoResult<()>;
    /// Adds a field to every record that lacks it.
    fn add_field(&self, name: &str, default_value: &str) -> RepoResult<()>;
    /// Renames a field on every record; an existing target value is replaced.
    fn rename_field(&self, from: &str, to: &str) -> RepoResult<()>;
    /// Removes a field from every record.
    fn delete_field(&self, name: &str) -> RepoResult<()>;
    fn get_record(&self, id: &str) -> RepoResult<Option<TrackedRecord>>;
    fn list_records(&self) -> RepoResult<Vec<TrackedRecord>>;
}

/// SQLite-backed record store.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn create_note(&self, id: &str, values: &BTreeMap<String, String>) -> RepoResult<TrackedRecord> {
        validate_id(id)?;
        validate_field_names(values)?;
        if record_exists(self.conn, id)? {
            return Err(RepoError::AlreadyExists(id.to_string()));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("INSERT INTO records (id) VALUES (?1);", [id])?;
        insert_fields(&tx, id, values)?;
        tx.commit()?;

        Ok(TrackedRecord {
            id: id.to_string(),
            values: values.clone(),
        })
    }

    fn update_record(&self, record: &TrackedRecord) -> RepoResult<()> {
        self.update_records(std::slice::from_ref(record))
    }

    fn update_records(&self, records: &[TrackedRecord]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for record in records {
            validate_field_names(&record.values)?;
            let changed = tx.execute(
                "UPDATE records
                 SET updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                [record.id.as_str()],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound(record.id.clone()));
            }

            tx.execute(
                "DELETE FROM record_fields WHERE record_id = ?1;",
                [record.id.as_str()],
            )?;
            insert_fields(&tx, &record.id, &record.values)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_record(&self, id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM records WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn add_field(&self, name: &str, default_value: &str) -> RepoResult<()> {
        validate_field_name(name)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO record_fields (record_id, name, value)
             SELECT id, ?1, ?2 FROM records;",
            params![name, default_value],
        )?;
        Ok(())
    }

    fn rename_field(&self, from: &str, to: &str) -> RepoResult<()> {
        validate_field_name(from)?;
        validate_field_name(to)?;
        if from == to {
            return Ok(());
        }
        self.conn.execute(
            "UPDATE OR REPLACE record_fields SET name = ?2 WHERE name = ?1;",
            params![from, to],
        )?;
        Ok(())
    }

    fn delete_field(&self, name: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM record_fields WHERE name = ?1;", [name])?;
        Ok(())
    }

    fn get_record(&self, id: &str) -> RepoResult<Option<TrackedRecord>> {
        if !record_exists(self.conn, id)? {
            return Ok(None);
        }

        let mut stmt = self.conn.prepare(
            "SELECT name, value FROM record_fields WHERE record_id = ?1 ORDER BY name ASC;",
        )?;
        let values = stmt
            .query_map([id], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Some(TrackedRecord {
            id: id.to_string(),
            values,
        }))
    }

    fn list_records(&self) -> RepoResult<Vec<TrackedRecord>> {
        let mut ids_stmt = self
            .conn
            .prepare("SELECT id FROM records ORDER BY rowid ASC;")?;
        let ids = ids_stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut fields_stmt = self
            .conn
            .prepare("SELECT record_id, name, value FROM record_fields;")?;
        let mut rows = fields_stmt.query([])?;
        let mut values_by_id: HashMap<String, BTreeMap<String, String>> = HashMap::new();
        while let Some(row) = rows.next()? {
            values_by_id
                .entry(row.get("record_id")?)
                .or_default()
                .insert(row.get("name")?, row.get("value")?);
        }

        Ok(ids
            .into_iter()
            .map(|id| {
                let values = values_by_id.remove(&id).unwrap_or_default();
                TrackedRecord { id, values }
            })
            .collect())
    }
}

fn record_exists(conn: &Connection, id: &str) -> RepoResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM records WHERE id = ?1;", [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn insert_fields(
    tx: &Transaction<'_>,
    id: &str,
    values: &BTreeMap<String, String>,
) -> RepoResult<()> {
    let mut stmt =
        tx.prepare_cached("INSERT INTO record_fields (record_id, name, value) VALUES (?1, ?2, ?3);")?;
    for (name, value) in values {
        stmt.execute(params![id, name, value])?;
    }
    Ok(())
}

fn validate_id(id: &str) -> RepoResult<()> {
    if id.trim().is_empty() {
        return Err(RepoError::InvalidInput("record id must not be blank".to_string()));
    }
    Ok(())
}

fn validate_field_name(name: &str) -> RepoResult<()> {
    if name.trim().is_empty() {
        return Err(RepoError::InvalidInput("field name must not be blank".to_string()));
    }
    Ok(())
}

fn validate_field_names(values: &BTreeMap<String, String>) -> RepoResult<()> {
    values.keys().try_for_each(|name| validate_field_name(name))
}
