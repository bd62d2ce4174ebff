use std::sync::Arc;

use chrono::Utc;

use crate::config::Config;
use crate::farm::{generate_farm, Farm, FarmRegistry};
use crate::store::ReadingStore;
use crate::ws::WsManager;

// ---

/// Shared handles passed to every route, the feed loop and the socket tasks.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ReadingStore>,
    pub farm: Arc<FarmRegistry>,
    pub ws: Arc<WsManager>,
    pub config: Arc<Config>,
}

impl AppState {
    // ---
    /// Lay out a fresh farm according to the configured layout.
    pub fn new(config: Config) -> Self {
        let farm = generate_farm(&mut rand::thread_rng(), config.farm_layout(), Utc::now());
        Self::with_farm(config, farm)
    }

    pub fn with_farm(config: Config, farm: Farm) -> Self {
        AppState {
            store: Arc::new(ReadingStore::new()),
            farm: Arc::new(FarmRegistry::new(farm)),
            ws: Arc::new(WsManager::new()),
            config: Arc::new(config),
        }
    }
}
