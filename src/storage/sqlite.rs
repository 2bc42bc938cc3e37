//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::analyzer::Headings;
use crate::state::JobState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{AnalysisPatch, UrlFilter, UrlRecord};
use crate::AnalyzerError;
use chrono::Utc;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

const RECORD_COLUMNS: &str = "id, url, title, status, status_code, meta_title, meta_description,
     html_version, h1_tags, h2_tags, h3_tags, h4_tags, h5_tags, h6_tags, image_count,
     link_count, internal_links, external_links, broken_link_count, broken_links_list,
     has_login_form, form_count, load_time, page_size, analyzed_at, error_message,
     created_at, updated_at";

const TAG_COLUMNS: [&str; 6] = [
    "h1_tags", "h2_tags", "h3_tags", "h4_tags", "h5_tags", "h6_tags",
];

const COUNT_COLUMNS: [&str; 6] = [
    "h1_count", "h2_count", "h3_count", "h4_count", "h5_count", "h6_count",
];

/// Column index of `h1_tags` in `RECORD_COLUMNS`
const FIRST_TAG_INDEX: usize = 8;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(AnalyzerError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, AnalyzerError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, AnalyzerError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn find_id(&self, url: &str) -> StorageResult<Option<i64>> {
        let id = self
            .conn
            .query_row("SELECT id FROM urls WHERE url = ?1", params![url], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(id)
    }
}

impl Storage for SqliteStorage {
    // ===== URL Management =====

    fn insert_url(&mut self, url: &str, title: &str) -> StorageResult<i64> {
        if self.find_id(url)?.is_some() {
            return Err(StorageError::Duplicate(url.to_string()));
        }

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO urls (url, title, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
            params![url, title, JobState::Pending.to_db_string(), now],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn insert_or_get_url(&mut self, url: &str, title: &str) -> StorageResult<i64> {
        match self.find_id(url)? {
            Some(id) => Ok(id),
            None => self.insert_url(url, title),
        }
    }

    fn get_url(&self, id: i64) -> StorageResult<UrlRecord> {
        let sql = format!("SELECT {} FROM urls WHERE id = ?1", RECORD_COLUMNS);
        self.conn
            .query_row(&sql, params![id], map_record)
            .optional()?
            .ok_or(StorageError::NotFound(id))
    }

    fn get_url_by_address(&self, url: &str) -> StorageResult<Option<UrlRecord>> {
        let sql = format!("SELECT {} FROM urls WHERE url = ?1", RECORD_COLUMNS);
        let record = self
            .conn
            .query_row(&sql, params![url], map_record)
            .optional()?;
        Ok(record)
    }

    fn list_urls(&self, filter: &UrlFilter) -> StorageResult<Vec<UrlRecord>> {
        let mut clauses = Vec::new();
        let mut values = Vec::new();

        if let Some(status) = filter.status {
            clauses.push("status = ?");
            values.push(Value::Text(status.to_db_string().to_string()));
        }

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            // LIKE is case-insensitive for ASCII in SQLite
            clauses.push("(url LIKE ? OR title LIKE ?)");
            let pattern = format!("%{}%", search);
            values.push(Value::Text(pattern.clone()));
            values.push(Value::Text(pattern));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT {} FROM urls{} ORDER BY id",
            RECORD_COLUMNS, where_clause
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(values), map_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn delete_url(&mut self, id: i64) -> StorageResult<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM urls WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }

    // ===== Analysis Results =====

    fn update_status(&mut self, id: i64, status: JobState) -> StorageResult<()> {
        self.apply_patch(id, &AnalysisPatch::status(status))
    }

    fn apply_patch(&mut self, id: i64, patch: &AnalysisPatch) -> StorageResult<()> {
        let mut assignments = patch_assignments(patch)?;
        assignments.push(("updated_at", Value::Text(Utc::now().to_rfc3339())));

        let set_clause = assignments
            .iter()
            .map(|(column, _)| format!("{} = ?", column))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE urls SET {} WHERE id = ?", set_clause);

        let mut values: Vec<Value> = assignments.into_iter().map(|(_, value)| value).collect();
        values.push(Value::Integer(id));

        let tx = self.conn.transaction()?;
        let updated = tx.execute(&sql, params_from_iter(values))?;
        if updated == 0 {
            return Err(StorageError::NotFound(id));
        }
        tx.commit()?;

        Ok(())
    }

    // ===== Statistics =====

    fn count_by_status(&self, status: JobState) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM urls WHERE status = ?1",
            params![status.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_total(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM urls", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Converts the set fields of a patch into column assignments
fn patch_assignments(patch: &AnalysisPatch) -> StorageResult<Vec<(&'static str, Value)>> {
    let mut set = Vec::new();

    if let Some(status) = patch.status {
        set.push(("status", Value::Text(status.to_db_string().to_string())));
    }
    if let Some(code) = patch.status_code {
        set.push(("status_code", Value::Integer(i64::from(code))));
    }
    if let Some(version) = &patch.html_version {
        set.push(("html_version", Value::Text(version.clone())));
    }
    if let Some(title) = &patch.meta_title {
        set.push(("meta_title", Value::Text(title.clone())));
    }
    if let Some(description) = &patch.meta_description {
        set.push(("meta_description", Value::Text(description.clone())));
    }
    if let Some(headings) = &patch.headings {
        for level in 1..=6 {
            set.push((TAG_COLUMNS[level - 1], Value::Text(to_json(headings.tags(level))?)));
            set.push((COUNT_COLUMNS[level - 1], count_value(headings.count(level))));
        }
    }
    if let Some(count) = patch.image_count {
        set.push(("image_count", count_value(count)));
    }
    if let Some(count) = patch.link_count {
        set.push(("link_count", count_value(count)));
    }
    if let Some(count) = patch.internal_links {
        set.push(("internal_links", count_value(count)));
    }
    if let Some(count) = patch.external_links {
        set.push(("external_links", count_value(count)));
    }
    if let Some(links) = &patch.broken_links {
        set.push(("broken_links_list", Value::Text(to_json(links)?)));
        set.push(("broken_link_count", count_value(links.len())));
    }
    if let Some(has_login) = patch.has_login_form {
        set.push(("has_login_form", Value::Integer(i64::from(has_login))));
    }
    if let Some(count) = patch.form_count {
        set.push(("form_count", count_value(count)));
    }
    if let Some(seconds) = patch.load_time_seconds {
        set.push(("load_time", Value::Real(seconds)));
    }
    if let Some(bytes) = patch.page_size_bytes {
        set.push(("page_size", Value::Integer(bytes as i64)));
    }
    if let Some(at) = patch.analyzed_at {
        set.push(("analyzed_at", Value::Text(at.to_rfc3339())));
    }
    if let Some(message) = &patch.error_message {
        let value = match message {
            Some(message) => Value::Text(message.clone()),
            None => Value::Null,
        };
        set.push(("error_message", value));
    }

    Ok(set)
}

fn count_value(count: usize) -> Value {
    Value::Integer(count as i64)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> StorageResult<String> {
    serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn from_json<T: DeserializeOwned>(index: usize, json: &str) -> rusqlite::Result<T> {
    serde_json::from_str(json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

fn get_count(row: &Row<'_>, index: usize) -> rusqlite::Result<u64> {
    row.get::<_, i64>(index).map(|n| n.max(0) as u64)
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<UrlRecord> {
    let mut headings = Headings::default();
    for level in 1..=6 {
        let index = FIRST_TAG_INDEX + level - 1;
        let tags: Vec<String> = from_json(index, &row.get::<_, String>(index)?)?;
        for tag in tags {
            headings.push(level, &tag);
        }
    }

    Ok(UrlRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        status: JobState::from_db_string(&row.get::<_, String>(3)?).unwrap_or(JobState::Pending),
        status_code: row.get(4)?,
        meta_title: row.get(5)?,
        meta_description: row.get(6)?,
        html_version: row.get(7)?,
        headings,
        image_count: get_count(row, 14)?,
        link_count: get_count(row, 15)?,
        internal_links: get_count(row, 16)?,
        external_links: get_count(row, 17)?,
        broken_link_count: get_count(row, 18)?,
        broken_links: from_json(19, &row.get::<_, String>(19)?)?,
        has_login_form: row.get(20)?,
        form_count: get_count(row, 21)?,
        load_time_seconds: row.get(22)?,
        page_size_bytes: get_count(row, 23)?,
        analyzed_at: row.get(24)?,
        error_message: row.get(25)?,
        created_at: row.get(26)?,
        updated_at: row.get(27)?,
    })
}
