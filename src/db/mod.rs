//! Persistence layer split across logical submodules: schema lifecycle, one
//! function per query, and the locked store that ties them together.

mod blog_posts;
mod connection;
mod store;

pub use blog_posts::{
    count_blog_posts, delete_blog_post_row, fetch_blog_post, fetch_blog_posts, insert_blog_post,
    next_row_id, update_blog_post_title,
};
pub use connection::{on_create, on_upgrade, open_database, prepare_schema, schema_version};
pub use store::{BlogPostStore, StoreHandle};
