//! Shibu Kuttan · Learning Activity Engine
//!
//! - Activity generators, session scoring, progress store and badges
//! - JSON-lines protocol on stdin/stdout for the presentation layer
//! - Progress persisted as one JSON record on local disk
//!
//! Important env variables:
//!   SHIBU_CONFIG_PATH : path to TOML config (timing, messages, storage, extra words)
//!   SHIBU_DATA_DIR    : directory of the progress record (default: platform data dir)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod achievements;
mod boards;
mod config;
mod console;
mod domain;
mod events;
mod generator;
mod logic;
mod progress;
mod protocol;
mod scheduler;
mod scorer;
mod seeds;
mod state;
mod store;
mod telemetry;
mod util;

use tracing::{info, instrument};

use crate::state::AppState;
use crate::store::{FileSlot, MemorySlot, ProgressSlot, ProgressStore};

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    // TOML config is optional; every field has a default.
    let cfg = config::load_engine_config_from_env().unwrap_or_default();

    let slot: Box<dyn ProgressSlot> = if cfg.storage.ephemeral {
        info!(target: "shibu_engine", "Guest mode: progress kept in memory");
        Box::new(MemorySlot::new())
    } else {
        let slot = FileSlot::new(cfg.progress_path());
        info!(target: "shibu_engine", path = %slot.path().display(), "Progress record");
        Box::new(slot)
    };
    let store = ProgressStore::open(slot);

    let state = AppState::new(&cfg, store);
    console::run_stdio(state).await?;
    Ok(())
}
