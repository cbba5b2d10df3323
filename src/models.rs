//! Domain model mirroring the `blogposts` table. `BlogPost` stays a light
//! value holder; the store and the list screen pass it around by value or by
//! reference and never attach behavior beyond title comparison.

use std::fmt;

/// Id carried by a post that has not been stored yet, or whose row id the
/// caller never looked up.
pub const UNKNOWN_ID: i64 = -1;

#[derive(Debug, Clone)]
/// A single blog post. Two posts are the same logical entity when their titles
/// match ignoring case, regardless of id.
pub struct BlogPost {
    /// Primary key in the `blogposts` table, or [`UNKNOWN_ID`].
    pub id: i64,
    /// Title shown in the list and used for duplicate detection.
    pub title: String,
}

impl BlogPost {
    /// Build a post from raw title text. The id stays unknown until the store
    /// assigns one.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            id: UNKNOWN_ID,
            title: title.into(),
        }
    }

    /// Build a post from a stored row.
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Whether the post carries a real row id.
    pub fn is_persisted(&self) -> bool {
        self.id != UNKNOWN_ID
    }

    /// Case-insensitive title comparison backing `PartialEq`.
    pub fn same_title(&self, other: &BlogPost) -> bool {
        titles_match(&self.title, &other.title)
    }
}

impl Default for BlogPost {
    fn default() -> Self {
        Self::with_title(String::new())
    }
}

impl PartialEq for BlogPost {
    fn eq(&self, other: &Self) -> bool {
        self.same_title(other)
    }
}

impl Eq for BlogPost {}

impl fmt::Display for BlogPost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Compare two titles ignoring case, char by char so multi-byte titles fold
/// the same way on both sides.
fn titles_match(left: &str, right: &str) -> bool {
    left.chars()
        .flat_map(char::to_lowercase)
        .eq(right.chars().flat_map(char::to_lowercase))
}
