use std::sync::Arc;

use tracing::info;

use crate::{
    config::{Config, StoreBackend},
    store::{
        GuestDirectory, Registry,
        memory::MemoryStore,
        redis::{RedisStore, init_redis},
    },
};

/// Built once at startup and handed to every handler by reference. Handlers see
/// the store only through the trait objects here, never a concrete client.
pub struct AppState {
    pub config: Config,
    pub directory: Arc<dyn GuestDirectory>,
    pub registry: Arc<dyn Registry>,
}

impl AppState {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let (directory, registry): (Arc<dyn GuestDirectory>, Arc<dyn Registry>) =
            match config.store {
                StoreBackend::Redis => {
                    let store = Arc::new(RedisStore::new(init_redis(&config.redis_url).await));
                    (store.clone(), store)
                }
                StoreBackend::Memory => {
                    info!("Using in-memory store; data will not survive a restart");
                    let store = Arc::new(MemoryStore::new());
                    (store.clone(), store)
                }
            };

        Arc::new(Self {
            config,
            directory,
            registry,
        })
    }
}
