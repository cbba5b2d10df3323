//! Binary entry point: resolve configuration, open the shared store, start the
//! background worker and drive the list screen until the user exits.
use blog_post_store::{logging, run_app, App, AppConfig, BlogPostStore, StoreHandle, StoreWorker};
use tracing::info;

/// Returning a `Result` bubbles fatal startup problems (an unreadable database
/// file, a bad environment override) up to the terminal.
fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    logging::init(&config.log_path)?;
    info!(db = %config.db_path.display(), version = config.schema_version, "starting");

    let store = BlogPostStore::open(&config)?.into_handle();
    let worker = StoreWorker::spawn(StoreHandle::clone(&store))?;

    let mut app = App::new(worker);
    run_app(&mut app)
}
