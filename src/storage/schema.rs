//! Database schema definitions
//!
//! This module contains the SQL schema for the Page-Lens database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Stored URLs and the latest analysis of each
CREATE TABLE IF NOT EXISTS urls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'pending',
    status_code INTEGER NOT NULL DEFAULT 0,

    meta_title TEXT NOT NULL DEFAULT '',
    meta_description TEXT NOT NULL DEFAULT '',
    html_version TEXT NOT NULL DEFAULT '',

    -- Heading texts as JSON arrays, counts kept for queries
    h1_tags TEXT NOT NULL DEFAULT '[]',
    h2_tags TEXT NOT NULL DEFAULT '[]',
    h3_tags TEXT NOT NULL DEFAULT '[]',
    h4_tags TEXT NOT NULL DEFAULT '[]',
    h5_tags TEXT NOT NULL DEFAULT '[]',
    h6_tags TEXT NOT NULL DEFAULT '[]',
    h1_count INTEGER NOT NULL DEFAULT 0,
    h2_count INTEGER NOT NULL DEFAULT 0,
    h3_count INTEGER NOT NULL DEFAULT 0,
    h4_count INTEGER NOT NULL DEFAULT 0,
    h5_count INTEGER NOT NULL DEFAULT 0,
    h6_count INTEGER NOT NULL DEFAULT 0,

    image_count INTEGER NOT NULL DEFAULT 0,
    link_count INTEGER NOT NULL DEFAULT 0,
    internal_links INTEGER NOT NULL DEFAULT 0,
    external_links INTEGER NOT NULL DEFAULT 0,
    broken_link_count INTEGER NOT NULL DEFAULT 0,
    broken_links_list TEXT NOT NULL DEFAULT '[]',

    has_login_form INTEGER NOT NULL DEFAULT 0,
    form_count INTEGER NOT NULL DEFAULT 0,

    load_time REAL NOT NULL DEFAULT 0,
    page_size INTEGER NOT NULL DEFAULT 0,

    analyzed_at TEXT,
    error_message TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_urls_status ON urls(status);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
