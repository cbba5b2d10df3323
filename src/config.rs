//! Runtime configuration. Paths default to a hidden folder under the user's
//! home directory and can be overridden through environment variables.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

use crate::error::StoreError;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".blog-posts";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "BlogPost.sqlite";
/// Log file written next to the database unless overridden.
const LOG_FILE_NAME: &str = "blog-posts.log";

pub const DB_PATH_VAR: &str = "BLOG_POSTS_DB";
pub const LOG_PATH_VAR: &str = "BLOG_POSTS_LOG";
pub const SCHEMA_VERSION_VAR: &str = "BLOG_POSTS_SCHEMA_VERSION";

/// Schema version this build expects. Raising it wipes the table on the next
/// open.
pub const DATABASE_VERSION: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub schema_version: i64,
}

impl AppConfig {
    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve the configuration from an arbitrary key lookup. Split out from
    /// [`AppConfig::from_env`] so tests do not have to mutate the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = match non_empty(lookup(DB_PATH_VAR)) {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        let log_path = match non_empty(lookup(LOG_PATH_VAR)) {
            Some(path) => PathBuf::from(path),
            None => sibling(&db_path, LOG_FILE_NAME),
        };

        let schema_version = match non_empty(lookup(SCHEMA_VERSION_VAR)) {
            Some(raw) => parse_version(&raw)?,
            None => DATABASE_VERSION,
        };

        Ok(Self {
            db_path,
            log_path,
            schema_version,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_version(raw: &str) -> Result<i64> {
    match raw.parse::<i64>() {
        Ok(version) => check_schema_version(version),
        Err(_) => Err(invalid_version(raw)),
    }
}

/// Schema versions start at 1. Zero is what SQLite reports for a fresh file,
/// and anything below it would make the next regular open look like an
/// upgrade.
pub fn check_schema_version(version: i64) -> Result<i64> {
    if version > 0 {
        Ok(version)
    } else {
        Err(invalid_version(&version.to_string()))
    }
}

fn invalid_version(raw: &str) -> anyhow::Error {
    StoreError::InvalidConfig {
        key: SCHEMA_VERSION_VAR,
        value: raw.to_string(),
    }
    .into()
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

fn sibling(path: &Path, file_name: &str) -> PathBuf {
    match path.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn overrides_are_honored() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (DB_PATH_VAR, "/tmp/posts/test.sqlite"),
            (SCHEMA_VERSION_VAR, "3"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/posts/test.sqlite"));
        assert_eq!(config.log_path, PathBuf::from("/tmp/posts/blog-posts.log"));
        assert_eq!(config.schema_version, 3);
    }

    #[test]
    fn explicit_log_path_wins() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (DB_PATH_VAR, "/tmp/posts/test.sqlite"),
            (LOG_PATH_VAR, "/var/log/posts.log"),
        ]))
        .unwrap();

        assert_eq!(config.log_path, PathBuf::from("/var/log/posts.log"));
        assert_eq!(config.schema_version, DATABASE_VERSION);
    }

    #[test]
    fn rejects_non_numeric_schema_version() {
        let err = AppConfig::from_lookup(lookup_from(&[
            (DB_PATH_VAR, "/tmp/posts/test.sqlite"),
            (SCHEMA_VERSION_VAR, "two"),
        ]))
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_zero_schema_version() {
        let result = AppConfig::from_lookup(lookup_from(&[
            (DB_PATH_VAR, "/tmp/posts/test.sqlite"),
            (SCHEMA_VERSION_VAR, "0"),
        ]));
        assert!(result.is_err());
    }
}
