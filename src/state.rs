use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{CredentialVerifier, IdentityGateway, RemoteVerifier};
use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryTrailStore, PgTrailStore, TrailStore};
use crate::services::TrailService;

/// Shared handles passed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn TrailStore>,
    pub identity: IdentityGateway,
    pub trails: TrailService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn TrailStore>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        let identity = IdentityGateway::new(verifier, store.clone());
        let trails = TrailService::new(store.clone(), config.api.clone());
        Self {
            config: Arc::new(config),
            store,
            identity,
            trails,
        }
    }

    /// Wire up the configured store and the remote identity verifier.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn TrailStore> = match config.database.url {
            Some(_) => {
                let pool = DatabaseManager::connect(&config.database).await?;
                if config.database.auto_migrate {
                    DatabaseManager::migrate(&pool).await?;
                }
                Arc::new(PgTrailStore::new(pool))
            }
            None => {
                warn!("DATABASE_URL not set, trails are kept in memory and lost on restart");
                Arc::new(MemoryTrailStore::new())
            }
        };

        let verifier = RemoteVerifier::new(&config.auth)?;
        info!("Verifying credentials against {}", verifier.url());

        Ok(Self::new(config, store, Arc::new(verifier)))
    }
}
