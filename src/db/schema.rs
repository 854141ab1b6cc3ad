//! Schema history for the activity table. `PRAGMA user_version` records the
//! installed version; upgrades apply stepwise so a database created by any
//! earlier build comes forward without losing rows.

pub const SCHEMA_VERSION: i32 = 2;

/// Version 1: the initial layout, one row per closed segment.
pub const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS window_activity (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    exe TEXT,
    pid INTEGER,
    path TEXT,
    start_time TEXT NOT NULL,
    start_date TEXT NOT NULL,
    active_time REAL NOT NULL
);
";

/// Version 2: derived program name and the tracking session id. Rows written
/// by version 1 keep NULL in both columns.
pub const SCHEMA_V2: &str = "
ALTER TABLE window_activity ADD COLUMN program_name TEXT;
ALTER TABLE window_activity ADD COLUMN session_id TEXT;
";
