use anyhow::{Context, Result};
use directories::ProjectDirs;
use rusqlite::{Connection, OptionalExtension};
use std::path::PathBuf;

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "devportal").context("Could not determine data directory")
}

/// Returns the devportal data directory, creating it if needed.
/// Location: `~/.local/share/devportal` (XDG-compliant)
pub fn data_dir() -> Result<PathBuf> {
    let dirs = project_dirs()?;
    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.to_path_buf())
}

/// Returns the path of the configuration file.
/// Location: `~/.config/devportal/config.json` (XDG-compliant). The file is optional.
pub fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.json"))
}

/// Open the volatile session database.
///
/// Always in-memory: nothing written here outlives the process, which is
/// the lifetime of a "session" for the playground.
pub fn open_session_db() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("Failed to open session database")?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS session_storage (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );",
    )?;
    Ok(conn)
}

/// Tab-scoped key/value storage backed by the in-memory session database.
pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    pub fn open() -> Result<Self> {
        Ok(Self {
            conn: open_session_db()?,
        })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM session_storage WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO session_storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                            updated_at = CURRENT_TIMESTAMP",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM session_storage WHERE key = ?1",
            rusqlite::params![key],
        )?;
        Ok(())
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM session_storage", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
