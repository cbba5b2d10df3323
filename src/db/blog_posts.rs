use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::BlogPost;

fn blog_post_from_row(row: &Row<'_>) -> rusqlite::Result<BlogPost> {
    Ok(BlogPost {
        id: row.get(0)?,
        title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
    })
}

/// Retrieve every post in primary-key order, which is also insertion order
/// because ids are handed out by a monotonically increasing counter.
pub fn fetch_blog_posts(conn: &Connection) -> Result<Vec<BlogPost>> {
    let mut stmt = conn
        .prepare("SELECT id, title FROM blogposts ORDER BY id")
        .context("failed to prepare blog post query")?;

    let posts = stmt
        .query_map([], blog_post_from_row)
        .context("failed to load blog posts")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect blog posts")?;

    Ok(posts)
}

/// Look up a single post by id.
pub fn fetch_blog_post(conn: &Connection, id: i64) -> Result<Option<BlogPost>> {
    conn.query_row(
        "SELECT id, title FROM blogposts WHERE id = ?1 LIMIT 1",
        params![id],
        blog_post_from_row,
    )
    .optional()
    .context("failed to load blog post")
}

/// Insert a row with an explicit id. Callers are responsible for picking an
/// id that is not already taken.
pub fn insert_blog_post(conn: &Connection, id: i64, title: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO blogposts (id, title) VALUES (?1, ?2)",
        params![id, title],
    )
    .context("failed to insert blog post")?;
    Ok(())
}

/// Overwrite the title of row `id`. Returns the number of rows touched, which
/// is zero when the id does not exist.
pub fn update_blog_post_title(conn: &Connection, id: i64, title: &str) -> Result<usize> {
    conn.execute(
        "UPDATE blogposts SET title = ?1 WHERE id = ?2",
        params![title, id],
    )
    .context("failed to update blog post")
}

/// Remove row `id`. Returns the number of rows deleted.
pub fn delete_blog_post_row(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM blogposts WHERE id = ?1", params![id])
        .context("failed to delete blog post")
}

pub fn count_blog_posts(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(id) FROM blogposts", [], |row| row.get(0))
        .context("failed to count blog posts")
}

/// The id the next insert should use: one past the largest stored id, or 0
/// for an empty table.
pub fn next_row_id(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(id) + 1, 0) FROM blogposts",
        [],
        |row| row.get(0),
    )
    .context("failed to read highest blog post id")
}
