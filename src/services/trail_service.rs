use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::ApiConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::{Trail, User};
use crate::database::store::TrailStore;
use crate::services::pagination::{Page, PageParams, PageRequest};
use crate::services::validation;
use crate::types::TrailPayload;

#[derive(Debug, thiserror::Error)]
pub enum TrailError {
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },
    #[error("Trail '{0}' not found")]
    NotFound(String),
    #[error("Trail '{0}' belongs to another user")]
    Forbidden(String),
    /// A multi-table write failed and was rolled back.
    #[error("{0}")]
    WriteFailed(String),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Trail CRUD on top of a [`TrailStore`], enforcing validation and ownership.
#[derive(Clone)]
pub struct TrailService {
    store: Arc<dyn TrailStore>,
    api: ApiConfig,
}

impl TrailService {
    pub fn new(store: Arc<dyn TrailStore>, api: ApiConfig) -> Self {
        Self { store, api }
    }

    pub async fn list(&self, params: &PageParams) -> Result<Page<Trail>, TrailError> {
        let request = PageRequest::from_params(params, &self.api)?;
        let total = self.store.count_trails().await?;
        let trails = self.store.list_trails(request.limit(), request.offset()).await?;
        Ok(Page::new(request, total, trails))
    }

    pub async fn get(&self, name: &str) -> Result<Trail, TrailError> {
        self.store
            .find_trail_by_name(name)
            .await?
            .ok_or_else(|| TrailError::NotFound(name.to_string()))
    }

    pub async fn create(&self, owner: &User, payload: TrailPayload) -> Result<Trail, TrailError> {
        let new_trail = validation::new_trail(payload)?;
        let trail = self
            .store
            .create_trail(owner.user_id, &new_trail)
            .await
            .map_err(|e| write_failed("create", &new_trail.name, e))?;

        info!("User {} created trail '{}' ({})", owner.email, trail.record.name, trail.trail_id());
        Ok(trail)
    }

    pub async fn update(&self, caller: &User, name: &str, payload: TrailPayload) -> Result<Trail, TrailError> {
        let existing = self.owned_trail(caller, name).await?;
        let changes = validation::trail_changes(payload)?;

        let trail = self
            .store
            .update_trail(existing.trail_id(), &changes)
            .await
            .map_err(|e| write_failed("update", name, e))?;

        info!("User {} updated trail '{}' ({})", caller.email, trail.record.name, trail.trail_id());
        Ok(trail)
    }

    pub async fn delete(&self, caller: &User, name: &str) -> Result<(), TrailError> {
        let existing = self.owned_trail(caller, name).await?;
        self.store
            .delete_trail(existing.trail_id())
            .await
            .map_err(|e| write_failed("delete", name, e))?;

        info!("User {} deleted trail '{}' ({})", caller.email, name, existing.trail_id());
        Ok(())
    }

    /// Fetch a trail and check that `caller` owns it.
    async fn owned_trail(&self, caller: &User, name: &str) -> Result<Trail, TrailError> {
        let trail = self.get(name).await?;
        if !trail.is_owned_by(caller.user_id) {
            warn!(
                "User {} ({}) attempted to modify trail '{}' owned by user {}",
                caller.email,
                caller.user_id,
                name,
                trail.owner_id()
            );
            return Err(TrailError::Forbidden(name.to_string()));
        }
        Ok(trail)
    }
}

fn write_failed(op: &str, name: &str, err: DatabaseError) -> TrailError {
    match err {
        DatabaseError::NotFound(_) => TrailError::NotFound(name.to_string()),
        other => {
            error!("Failed to {} trail '{}', transaction rolled back: {}", op, name, other);
            TrailError::WriteFailed(other.to_string())
        }
    }
}
