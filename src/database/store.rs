use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewTrail, Trail, TrailChanges, User};

/// Persistence boundary for users and trails.
///
/// Every mutating method is atomic: either all of its table writes land or
/// none do.
#[async_trait]
pub trait TrailStore: Send + Sync {
    /// Look up a user by email, inserting a row on first sight.
    async fn find_or_create_user(&self, email: &str) -> Result<User, DatabaseError>;

    async fn count_trails(&self) -> Result<i64, DatabaseError>;

    /// Trails ordered by `TrailId` ascending.
    async fn list_trails(&self, limit: i64, offset: i64) -> Result<Vec<Trail>, DatabaseError>;

    async fn find_trail_by_name(&self, name: &str) -> Result<Option<Trail>, DatabaseError>;

    async fn create_trail(&self, owner_id: i32, trail: &NewTrail) -> Result<Trail, DatabaseError>;

    async fn update_trail(&self, trail_id: i32, changes: &TrailChanges) -> Result<Trail, DatabaseError>;

    async fn delete_trail(&self, trail_id: i32) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
