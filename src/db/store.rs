//! The shared blog post store. One instance is opened at startup and handed
//! to every consumer behind an `Arc`; a single mutex serializes every read and
//! write, including the next-row-id counter.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::debug;

use crate::config::{check_schema_version, AppConfig, DATABASE_VERSION};
use crate::error::StoreError;
use crate::models::{BlogPost, UNKNOWN_ID};

use super::blog_posts::{
    count_blog_posts, delete_blog_post_row, fetch_blog_post, fetch_blog_posts, insert_blog_post,
    next_row_id, update_blog_post_title,
};
use super::connection::{on_upgrade, open_database, prepare_schema, schema_version};

/// Cloneable handle passed to the worker and anything else that needs the
/// store.
pub type StoreHandle = Arc<BlogPostStore>;

pub struct BlogPostStore {
    state: Mutex<StoreState>,
}

struct StoreState {
    conn: Connection,
    next_row_id: i64,
}

impl StoreState {
    fn contains(&self, post: &BlogPost) -> Result<bool> {
        Ok(self.find_row_id(post)? != UNKNOWN_ID)
    }

    fn find_row_id(&self, post: &BlogPost) -> Result<i64> {
        let found = fetch_blog_posts(&self.conn)?
            .into_iter()
            .find(|stored| stored == post)
            .map(|stored| stored.id);
        Ok(found.unwrap_or(UNKNOWN_ID))
    }
}

impl BlogPostStore {
    /// Open the database described by `config`, creating or upgrading the
    /// schema as needed.
    pub fn open(config: &AppConfig) -> Result<Self> {
        Self::open_with_version(&config.db_path, config.schema_version)
    }

    pub fn open_with_version(path: &Path, version: i64) -> Result<Self> {
        check_schema_version(version)?;
        let conn = open_database(path)?;
        Self::from_connection(conn, version)
    }

    /// Private in-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: ":memory:".into(),
            source,
        })?;
        Self::from_connection(conn, DATABASE_VERSION)
    }

    fn from_connection(conn: Connection, version: i64) -> Result<Self> {
        prepare_schema(&conn, version)?;
        let next_row_id = next_row_id(&conn)?;
        debug!(next_row_id, "blog post store ready");

        Ok(Self {
            state: Mutex::new(StoreState { conn, next_row_id }),
        })
    }

    pub fn into_handle(self) -> StoreHandle {
        Arc::new(self)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|_| StoreError::Poisoned.into())
    }

    /// Insert `post` unless a post with the same title (ignoring case) is
    /// already stored. The caller's id is ignored; the stored copy gets the
    /// next id from the internal counter and is returned. A duplicate yields
    /// `None` and leaves the table untouched.
    pub fn add_blog_post(&self, post: &BlogPost) -> Result<Option<BlogPost>> {
        let mut state = self.lock()?;

        if state.contains(post)? {
            debug!(title = %post.title, "skipping duplicate blog post");
            return Ok(None);
        }

        let id = state.next_row_id;
        insert_blog_post(&state.conn, id, &post.title)?;
        state.next_row_id += 1;
        debug!(id, title = %post.title, "inserted blog post");

        Ok(Some(BlogPost::new(id, post.title.clone())))
    }

    pub fn get_all_blog_posts(&self) -> Result<Vec<BlogPost>> {
        let state = self.lock()?;
        fetch_blog_posts(&state.conn)
    }

    pub fn get_blog_post(&self, id: i64) -> Result<Option<BlogPost>> {
        let state = self.lock()?;
        fetch_blog_post(&state.conn, id)
    }

    /// Overwrite the title of the row identified by `post.id`. An id with no
    /// row is a no-op that reports zero rows.
    pub fn update_blog_post(&self, post: &BlogPost) -> Result<usize> {
        let state = self.lock()?;
        let updated = update_blog_post_title(&state.conn, post.id, &post.title)?;
        debug!(id = post.id, updated, "updated blog post");
        Ok(updated)
    }

    /// Delete the row for `post`. A post with an unknown id is first resolved
    /// by title; when no stored title matches, nothing is deleted.
    pub fn delete_blog_post(&self, post: &BlogPost) -> Result<usize> {
        let state = self.lock()?;

        let id = if post.is_persisted() {
            post.id
        } else {
            state.find_row_id(post)?
        };

        if id == UNKNOWN_ID {
            debug!(title = %post.title, "no stored blog post to delete");
            return Ok(0);
        }

        let deleted = delete_blog_post_row(&state.conn, id)?;
        debug!(id, deleted, "deleted blog post");
        Ok(deleted)
    }

    pub fn get_blog_posts_count(&self) -> Result<i64> {
        let state = self.lock()?;
        count_blog_posts(&state.conn)
    }

    /// Linear scan for a stored post whose title matches ignoring case.
    pub fn is_blog_post_in_database(&self, post: &BlogPost) -> Result<bool> {
        let state = self.lock()?;
        state.contains(post)
    }

    /// Linear scan for the row id of a post whose title matches ignoring case.
    /// Returns [`UNKNOWN_ID`] when nothing matches.
    pub fn find_blog_post_row_id(&self, post: &BlogPost) -> Result<i64> {
        let state = self.lock()?;
        state.find_row_id(post)
    }

    pub fn schema_version(&self) -> Result<i64> {
        let state = self.lock()?;
        schema_version(&state.conn)
    }

    /// Raise the schema to `new_version` on a live store. Destructive: the
    /// table is dropped and recreated, and ids restart at 0.
    pub fn upgrade_schema(&self, new_version: i64) -> Result<()> {
        check_schema_version(new_version)?;
        let mut state = self.lock()?;
        let old_version = schema_version(&state.conn)?;
        on_upgrade(&state.conn, old_version, new_version)?;
        state.next_row_id = next_row_id(&state.conn).context("failed to reset row counter")?;
        Ok(())
    }
}
