//! Terminal front-end: a single screen with a title input, the list of stored
//! posts and a status footer. All store access goes through the background
//! worker so the draw loop never blocks on SQLite.

mod app;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
