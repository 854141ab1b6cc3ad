use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use rusqlite::{params, Connection};
use tokio::sync::{mpsc, Mutex};

use super::models::StoredSegment;
use super::schema::{SCHEMA_V1, SCHEMA_V2, SCHEMA_VERSION};
use crate::segmenter::ClosedSegment;

/// Append-only store for closed segments, one SQLite connection.
pub struct ActivityStore {
    conn: Connection,
}

impl ActivityStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {:?}", path))?;
        migrate(&conn)?;
        Ok(Self { conn })
    }

    pub fn insert_segment(&self, segment: &ClosedSegment) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO window_activity
                 (title, exe, pid, path, start_time, start_date, active_time, program_name, session_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    segment.window_title,
                    segment.app_name,
                    segment.process_id,
                    segment.app_path,
                    segment.started_at.time().format("%H:%M:%S").to_string(),
                    segment.started_at.date_naive(),
                    segment.duration_secs,
                    segment.program_name,
                    segment.session_id,
                ],
            )
            .with_context(|| format!("failed to store segment {:?}", segment.window_title))?;
        Ok(())
    }

    pub fn fetch_all(&self) -> Result<Vec<StoredSegment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, exe, pid, path, start_time, start_date, active_time,
                    program_name, session_id
             FROM window_activity ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredSegment {
                id: row.get(0)?,
                title: row.get(1)?,
                exe: row.get(2)?,
                pid: row.get(3)?,
                path: row.get(4)?,
                start_time: row.get(5)?,
                start_date: row.get(6)?,
                active_time: row.get(7)?,
                program_name: row.get(8)?,
                session_id: row.get(9)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to read window_activity rows")
    }
}

fn migrate(conn: &Connection) -> Result<()> {
    let version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .context("failed to read schema version")?;

    if version < 1 {
        conn.execute_batch(SCHEMA_V1).context("schema v1 failed")?;
    }
    if version < 2 {
        conn.execute_batch(SCHEMA_V2).context("schema v2 failed")?;
    }
    if version < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)
            .context("failed to record schema version")?;
        info!("Database migrated from version {} to {}", version, SCHEMA_VERSION);
    }
    Ok(())
}

/// Drains the channel and appends every closed segment. A storage failure is
/// fatal: the error propagates and the process exits with a diagnostic.
pub async fn store_segments(
    store: Arc<Mutex<ActivityStore>>,
    mut rx: mpsc::UnboundedReceiver<ClosedSegment>,
) -> Result<()> {
    while let Some(segment) = rx.recv().await {
        let store = store.lock().await;
        store.insert_segment(&segment)?;
        info!(
            "Stored segment: {} ({:.2}s)",
            segment.window_title, segment.duration_secs
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveDate, NaiveTime, TimeZone};
    use tempfile::tempdir;

    fn closed_segment(title: &str) -> ClosedSegment {
        ClosedSegment {
            session_id: "session-1".to_string(),
            window_title: title.to_string(),
            app_name: Some("code.exe".to_string()),
            process_id: Some(4242),
            app_path: Some("C:\\work".to_string()),
            program_name: crate::segmenter::program_name(title),
            started_at: Local.with_ymd_and_hms(2024, 1, 15, 14, 30, 5).unwrap(),
            duration_secs: 12.34,
        }
    }

    #[test]
    fn open_creates_a_versioned_schema() {
        let dir = tempdir().unwrap();
        let store = ActivityStore::open(&dir.path().join("test.db")).unwrap();

        let version: i32 = store
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);

        let tables: i32 = store
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='window_activity'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn insert_and_fetch_round_trip() {
        let dir = tempdir().unwrap();
        let store = ActivityStore::open(&dir.path().join("test.db")).unwrap();

        store
            .insert_segment(&closed_segment("main.rs - Visual Studio Code"))
            .unwrap();

        let rows = store.fetch_all().unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.title, "main.rs - Visual Studio Code");
        assert_eq!(row.exe.as_deref(), Some("code.exe"));
        assert_eq!(row.pid, Some(4242));
        assert_eq!(row.path.as_deref(), Some("C:\\work"));
        assert_eq!(row.start_time, NaiveTime::from_hms_opt(14, 30, 5).unwrap());
        assert_eq!(row.start_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(row.active_time, 12.34);
        assert_eq!(row.program_name.as_deref(), Some("Visual Studio Code"));
        assert_eq!(row.session_id.as_deref(), Some("session-1"));
    }

    #[test]
    fn legacy_version_1_rows_survive_the_upgrade() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        // A database as version 1 left it: no program_name, no session_id.
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute_batch(SCHEMA_V1).unwrap();
            conn.pragma_update(None, "user_version", 1).unwrap();
            conn.execute(
                "INSERT INTO window_activity
                 (title, exe, pid, path, start_time, start_date, active_time)
                 VALUES ('old - App', 'app.exe', 7, '/home', '09:00:00', '2023-06-01', 3.5)",
                [],
            )
            .unwrap();
        }

        let store = ActivityStore::open(&db_path).unwrap();
        let rows = store.fetch_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "old - App");
        assert_eq!(rows[0].program_name, None);
        assert_eq!(rows[0].session_id, None);

        // New rows land in the same table with the new columns filled.
        store.insert_segment(&closed_segment("new - App")).unwrap();
        let rows = store.fetch_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].program_name.as_deref(), Some("App"));
    }

    #[test]
    fn migrations_are_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        {
            let store = ActivityStore::open(&db_path).unwrap();
            store.insert_segment(&closed_segment("A")).unwrap();
        }
        let store = ActivityStore::open(&db_path).unwrap();
        assert_eq!(store.fetch_all().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn writer_drains_the_channel_and_exits() {
        let dir = tempdir().unwrap();
        let store = Arc::new(Mutex::new(
            ActivityStore::open(&dir.path().join("test.db")).unwrap(),
        ));

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(closed_segment("A")).unwrap();
        tx.send(closed_segment("B")).unwrap();
        drop(tx);

        store_segments(Arc::clone(&store), rx).await.unwrap();
        assert_eq!(store.lock().await.fetch_all().unwrap().len(), 2);
    }
}
