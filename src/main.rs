// src/main.rs
//
// Local bootstrap: SQLite-backed store, anonymous session, sample data,
// then the initial load. Prints the resulting snapshot as JSON.

use std::sync::Arc;

use anyhow::Context;

use kuro::application::commands::{get_diagnostics, load_initial_data};
use kuro::application::state::AppState;
use kuro::config::CoreConfig;
use kuro::db::create_connection_pool;
use kuro::session::AnonymousSession;
use kuro::store::SqliteDocumentStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. INFRASTRUCTURE
    let config = CoreConfig::from_env();
    let pool = Arc::new(create_connection_pool(&config).context("opening database")?);
    let store = Arc::new(SqliteDocumentStore::open(pool.clone()).context("initializing schema")?);

    // 2. SESSION
    let session = Arc::new(AnonymousSession::persistent(
        config.resolve_session_path().context("locating session file")?,
    ));
    session.sign_in().context("signing in")?;

    // 3. APPLICATION STATE
    let state = AppState::new(store, session, config).with_pool(pool);

    // 4. SAMPLE DATA (idempotent)
    let report = state
        .seed_service
        .seed_sample_data()
        .await
        .context("seeding sample catalog")?;
    log::info!("Seed report: {:?}", report);

    // 5. INITIAL LOAD
    let snapshot = load_initial_data(&state).await.map_err(anyhow::Error::msg)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    let diagnostics = get_diagnostics(&state).await.map_err(anyhow::Error::msg)?;
    log::info!(
        "Store reachable: {}, {} items, {} lists, {} dropped records",
        diagnostics.store_reachable,
        diagnostics.item_count,
        diagnostics.list_count,
        diagnostics.dropped_records
    );

    Ok(())
}
