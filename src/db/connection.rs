use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::error::StoreError;

/// Open the SQLite file at `path`, creating its parent directory first.
/// Failing to open the file is the one fatal store error, so it surfaces as
/// [`StoreError::Open`] rather than a plain context string.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
    }

    Connection::open(path).map_err(|source| {
        StoreError::Open {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

/// Bring the schema to `version`. A fresh file (stored version 0) gets the
/// table created; an older file is upgraded destructively; a newer file is
/// left alone.
pub fn prepare_schema(conn: &Connection, version: i64) -> Result<()> {
    let stored = schema_version(conn)?;

    if stored == 0 {
        on_create(conn)?;
        set_schema_version(conn, version)?;
        info!(version, "created blogposts table");
    } else if version > stored {
        on_upgrade(conn, stored, version)?;
    } else if version < stored {
        warn!(
            stored,
            requested = version,
            "database schema is newer than requested, leaving it untouched"
        );
    }

    Ok(())
}

/// Create the single `blogposts` table.
pub fn on_create(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS blogposts (
            id INTEGER PRIMARY KEY,
            title TEXT
        )",
        [],
    )
    .context("failed to create blogposts table")?;
    Ok(())
}

/// Drop and recreate the table when `new_version` is higher than
/// `old_version`. Every stored row is lost; there is no data migration.
/// Requests that do not raise the version change nothing.
pub fn on_upgrade(conn: &Connection, old_version: i64, new_version: i64) -> Result<()> {
    if new_version <= old_version {
        return Ok(());
    }

    conn.execute("DROP TABLE IF EXISTS blogposts", [])
        .context("failed to drop blogposts table")?;
    on_create(conn)?;
    set_schema_version(conn, new_version)?;

    warn!(
        old_version,
        new_version, "upgraded blogposts schema, existing posts were dropped"
    );
    Ok(())
}

/// Read the version tag stored in the database header.
pub fn schema_version(conn: &Connection) -> Result<i64> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .context("failed to read schema version")
}

fn set_schema_version(conn: &Connection, version: i64) -> Result<()> {
    conn.pragma_update(None, "user_version", version)
        .context("failed to write schema version")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'blogposts'",
            [],
            |row| row.get::<_, i64>(0),
        )
        .unwrap()
            == 1
    }

    fn row_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM blogposts", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn fresh_database_gets_table_and_version() {
        let conn = Connection::open_in_memory().unwrap();
        prepare_schema(&conn, 1).unwrap();

        assert!(table_exists(&conn));
        assert_eq!(schema_version(&conn).unwrap(), 1);
    }

    #[test]
    fn upgrade_drops_existing_rows() {
        let conn = Connection::open_in_memory().unwrap();
        prepare_schema(&conn, 1).unwrap();
        conn.execute("INSERT INTO blogposts (id, title) VALUES (0, 'Hello')", [])
            .unwrap();

        prepare_schema(&conn, 2).unwrap();

        assert!(table_exists(&conn));
        assert_eq!(row_count(&conn), 0);
        assert_eq!(schema_version(&conn).unwrap(), 2);
    }

    #[test]
    fn same_or_lower_version_keeps_rows() {
        let conn = Connection::open_in_memory().unwrap();
        prepare_schema(&conn, 2).unwrap();
        conn.execute("INSERT INTO blogposts (id, title) VALUES (0, 'Hello')", [])
            .unwrap();

        prepare_schema(&conn, 2).unwrap();
        prepare_schema(&conn, 1).unwrap();
        on_upgrade(&conn, 2, 2).unwrap();

        assert_eq!(row_count(&conn), 1);
        assert_eq!(schema_version(&conn).unwrap(), 2);
    }
}
