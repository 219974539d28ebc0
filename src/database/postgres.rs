use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, warn};

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Location, NewLocation, NewPoint, NewTrail, Trail, TrailChanges, TrailPoint, TrailRecord, User};
use crate::database::store::TrailStore;

const TRAIL_COLUMNS: &str = "trail_id, user_id, location_id, name, difficulty, rating, length, \
                             elevation_gain, route_type, completion_time, description";

/// Postgres-backed store. Tables live in the `cw2` schema.
#[derive(Clone)]
pub struct PgTrailStore {
    pool: PgPool,
}

impl PgTrailStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn hydrate(conn: &mut PgConnection, record: TrailRecord) -> Result<Trail, DatabaseError> {
        let location = sqlx::query_as::<_, Location>(
            "SELECT location_id, city, county, country FROM cw2.locations WHERE location_id = $1",
        )
        .bind(record.location_id)
        .fetch_one(&mut *conn)
        .await?;

        let points = sqlx::query_as::<_, TrailPoint>(
            "SELECT tp.sequence_number, p.point_id, p.latitude, p.longitude, p.description
             FROM cw2.trail_points tp
             JOIN cw2.points p ON p.point_id = tp.point_id
             WHERE tp.trail_id = $1
             ORDER BY tp.sequence_number",
        )
        .bind(record.trail_id)
        .fetch_all(&mut *conn)
        .await?;

        let tags = sqlx::query_scalar::<_, String>(
            "SELECT t.name
             FROM cw2.trail_tags tt
             JOIN cw2.tags t ON t.tag_id = tt.tag_id
             WHERE tt.trail_id = $1
             ORDER BY t.name",
        )
        .bind(record.trail_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(Trail {
            record,
            location,
            points,
            tags,
        })
    }

    async fn insert_location(conn: &mut PgConnection, location: &NewLocation) -> Result<i32, DatabaseError> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO cw2.locations (city, county, country) VALUES ($1, $2, $3) RETURNING location_id",
        )
        .bind(&location.city)
        .bind(&location.county)
        .bind(&location.country)
        .fetch_one(&mut *conn)
        .await
        .map_err(DatabaseError::from_write)?;
        Ok(id)
    }

    /// Insert points and link them with dense sequence numbers starting at 1.
    async fn insert_points(conn: &mut PgConnection, trail_id: i32, points: &[NewPoint]) -> Result<(), DatabaseError> {
        for (sequence_number, point) in (1..).zip(points) {
            let point_id = sqlx::query_scalar::<_, i32>(
                "INSERT INTO cw2.points (latitude, longitude, description) VALUES ($1, $2, $3) RETURNING point_id",
            )
            .bind(point.latitude)
            .bind(point.longitude)
            .bind(&point.description)
            .fetch_one(&mut *conn)
            .await
            .map_err(DatabaseError::from_write)?;

            sqlx::query("INSERT INTO cw2.trail_points (trail_id, point_id, sequence_number) VALUES ($1, $2, $3)")
                .bind(trail_id)
                .bind(point_id)
                .bind(sequence_number)
                .execute(&mut *conn)
                .await
                .map_err(DatabaseError::from_write)?;
        }
        Ok(())
    }

    async fn link_tags(conn: &mut PgConnection, trail_id: i32, tags: &[String]) -> Result<(), DatabaseError> {
        for name in tags {
            let tag_id = sqlx::query_scalar::<_, i32>(
                "INSERT INTO cw2.tags (name) VALUES ($1)
                 ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                 RETURNING tag_id",
            )
            .bind(name)
            .fetch_one(&mut *conn)
            .await
            .map_err(DatabaseError::from_write)?;

            sqlx::query("INSERT INTO cw2.trail_tags (trail_id, tag_id) VALUES ($1, $2)")
                .bind(trail_id)
                .bind(tag_id)
                .execute(&mut *conn)
                .await
                .map_err(DatabaseError::from_write)?;
        }
        Ok(())
    }

    async fn write_create(conn: &mut PgConnection, owner_id: i32, trail: &NewTrail) -> Result<Trail, DatabaseError> {
        let location_id = Self::insert_location(conn, &trail.location).await?;

        let record = sqlx::query_as::<_, TrailRecord>(&format!(
            "INSERT INTO cw2.trails
                (user_id, location_id, name, difficulty, rating, length,
                 elevation_gain, route_type, completion_time, description)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {}",
            TRAIL_COLUMNS
        ))
        .bind(owner_id)
        .bind(location_id)
        .bind(&trail.name)
        .bind(&trail.difficulty)
        .bind(trail.rating)
        .bind(trail.length)
        .bind(trail.elevation_gain)
        .bind(&trail.route_type)
        .bind(trail.completion_time)
        .bind(&trail.description)
        .fetch_one(&mut *conn)
        .await
        .map_err(DatabaseError::from_write)?;

        Self::insert_points(conn, record.trail_id, &trail.points).await?;
        Self::link_tags(conn, record.trail_id, &trail.tags).await?;
        Self::hydrate(conn, record).await
    }

    async fn write_update(conn: &mut PgConnection, trail_id: i32, changes: &TrailChanges) -> Result<Trail, DatabaseError> {
        let mut record = sqlx::query_as::<_, TrailRecord>(&format!(
            "SELECT {} FROM cw2.trails WHERE trail_id = $1 FOR UPDATE",
            TRAIL_COLUMNS
        ))
        .bind(trail_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("trail {}", trail_id)))?;

        changes.apply_to(&mut record);

        // A new location row replaces the old one, which is left orphaned
        if let Some(location) = &changes.location {
            record.location_id = Self::insert_location(conn, location).await?;
        }

        sqlx::query(
            "UPDATE cw2.trails
             SET location_id = $2, name = $3, difficulty = $4, rating = $5, length = $6,
                 elevation_gain = $7, route_type = $8, completion_time = $9, description = $10
             WHERE trail_id = $1",
        )
        .bind(record.trail_id)
        .bind(record.location_id)
        .bind(&record.name)
        .bind(&record.difficulty)
        .bind(record.rating)
        .bind(record.length)
        .bind(record.elevation_gain)
        .bind(&record.route_type)
        .bind(record.completion_time)
        .bind(&record.description)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::from_write)?;

        if let Some(points) = &changes.points {
            sqlx::query("DELETE FROM cw2.trail_points WHERE trail_id = $1")
                .bind(trail_id)
                .execute(&mut *conn)
                .await?;
            Self::insert_points(conn, trail_id, points).await?;
        }

        if let Some(tags) = &changes.tags {
            sqlx::query("DELETE FROM cw2.trail_tags WHERE trail_id = $1")
                .bind(trail_id)
                .execute(&mut *conn)
                .await?;
            Self::link_tags(conn, trail_id, tags).await?;
        }

        Self::hydrate(conn, record).await
    }

    async fn write_delete(conn: &mut PgConnection, trail_id: i32) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM cw2.trail_points WHERE trail_id = $1")
            .bind(trail_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM cw2.trail_tags WHERE trail_id = $1")
            .bind(trail_id)
            .execute(&mut *conn)
            .await?;
        let result = sqlx::query("DELETE FROM cw2.trails WHERE trail_id = $1")
            .bind(trail_id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("trail {}", trail_id)));
        }
        Ok(())
    }
}

/// Run `$write` inside a transaction, committing on success and rolling back
/// on any error.
macro_rules! transactional {
    ($pool:expr, $op:literal, |$conn:ident| $write:expr) => {{
        let mut tx = $pool.begin().await?;
        let $conn: &mut PgConnection = &mut *tx;
        let result = $write.await;
        match result {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("{} rollback failed: {}", $op, rollback_err);
                }
                debug!("{} rolled back: {}", $op, err);
                Err(err)
            }
        }
    }};
}

#[async_trait]
impl TrailStore for PgTrailStore {
    async fn find_or_create_user(&self, email: &str) -> Result<User, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO cw2.users (email) VALUES ($1)
             ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
             RETURNING user_id, email",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn count_trails(&self) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cw2.trails")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list_trails(&self, limit: i64, offset: i64) -> Result<Vec<Trail>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let records = sqlx::query_as::<_, TrailRecord>(&format!(
            "SELECT {} FROM cw2.trails ORDER BY trail_id ASC LIMIT $1 OFFSET $2",
            TRAIL_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?;

        let mut trails = Vec::with_capacity(records.len());
        for record in records {
            trails.push(Self::hydrate(&mut *conn, record).await?);
        }
        Ok(trails)
    }

    async fn find_trail_by_name(&self, name: &str) -> Result<Option<Trail>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let record = sqlx::query_as::<_, TrailRecord>(&format!(
            "SELECT {} FROM cw2.trails WHERE name = $1",
            TRAIL_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        match record {
            Some(record) => Ok(Some(Self::hydrate(&mut *conn, record).await?)),
            None => Ok(None),
        }
    }

    async fn create_trail(&self, owner_id: i32, trail: &NewTrail) -> Result<Trail, DatabaseError> {
        transactional!(self.pool, "create_trail", |conn| Self::write_create(conn, owner_id, trail))
    }

    async fn update_trail(&self, trail_id: i32, changes: &TrailChanges) -> Result<Trail, DatabaseError> {
        transactional!(self.pool, "update_trail", |conn| Self::write_update(conn, trail_id, changes))
    }

    async fn delete_trail(&self, trail_id: i32) -> Result<(), DatabaseError> {
        transactional!(self.pool, "delete_trail", |conn| Self::write_delete(conn, trail_id))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
