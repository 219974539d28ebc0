use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{Location, NewLocation, NewPoint, NewTrail, Trail, TrailChanges, TrailPoint, TrailRecord, User};
use crate::database::store::TrailStore;

#[derive(Debug, Clone)]
struct PointRow {
    latitude: f64,
    longitude: f64,
    description: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct TrailPointRow {
    trail_id: i32,
    point_id: i32,
    sequence_number: i32,
}

/// Per-table serial counters, mirroring Postgres `SERIAL` columns.
#[derive(Debug, Clone, Default)]
struct Serials {
    user: i32,
    location: i32,
    point: i32,
    tag: i32,
    trail: i32,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    serials: Serials,
    users: BTreeMap<i32, User>,
    locations: BTreeMap<i32, Location>,
    points: BTreeMap<i32, PointRow>,
    tags: BTreeMap<i32, String>,
    trails: BTreeMap<i32, TrailRecord>,
    trail_points: Vec<TrailPointRow>,
    trail_tags: Vec<(i32, i32)>,
}

impl Tables {
    fn hydrate(&self, record: &TrailRecord) -> Result<Trail, DatabaseError> {
        let location = self
            .locations
            .get(&record.location_id)
            .cloned()
            .ok_or_else(|| DatabaseError::QueryError(format!("location {} is missing", record.location_id)))?;

        let mut links: Vec<TrailPointRow> = self
            .trail_points
            .iter()
            .filter(|link| link.trail_id == record.trail_id)
            .copied()
            .collect();
        links.sort_by_key(|link| link.sequence_number);

        let mut points = Vec::with_capacity(links.len());
        for link in links {
            let row = self
                .points
                .get(&link.point_id)
                .ok_or_else(|| DatabaseError::QueryError(format!("point {} is missing", link.point_id)))?;
            points.push(TrailPoint {
                sequence_number: link.sequence_number,
                point_id: link.point_id,
                latitude: row.latitude,
                longitude: row.longitude,
                description: row.description.clone(),
            });
        }

        let mut tags: Vec<String> = self
            .trail_tags
            .iter()
            .filter(|(trail_id, _)| *trail_id == record.trail_id)
            .filter_map(|(_, tag_id)| self.tags.get(tag_id).cloned())
            .collect();
        tags.sort();

        Ok(Trail {
            record: record.clone(),
            location,
            points,
            tags,
        })
    }

    fn ensure_unique_name(&self, name: &str, except: Option<i32>) -> Result<(), DatabaseError> {
        let taken = self
            .trails
            .values()
            .any(|trail| trail.name == name && Some(trail.trail_id) != except);
        if taken {
            return Err(DatabaseError::Conflict(format!(
                "duplicate key value violates unique constraint \"trails_name_key\": Name={}",
                name
            )));
        }
        Ok(())
    }

    fn insert_location(&mut self, location: &NewLocation) -> i32 {
        self.serials.location += 1;
        let location_id = self.serials.location;
        self.locations.insert(
            location_id,
            Location {
                location_id,
                city: location.city.clone(),
                county: location.county.clone(),
                country: location.country.clone(),
            },
        );
        location_id
    }

    fn insert_points(&mut self, trail_id: i32, points: &[NewPoint]) {
        for (sequence_number, point) in (1..).zip(points) {
            self.serials.point += 1;
            let point_id = self.serials.point;
            self.points.insert(
                point_id,
                PointRow {
                    latitude: point.latitude,
                    longitude: point.longitude,
                    description: point.description.clone(),
                },
            );
            self.trail_points.push(TrailPointRow {
                trail_id,
                point_id,
                sequence_number,
            });
        }
    }

    fn link_tags(&mut self, trail_id: i32, tags: &[String]) {
        for name in tags {
            let existing = self.tags.iter().find(|(_, tag)| *tag == name).map(|(id, _)| *id);
            let tag_id = match existing {
                Some(id) => id,
                None => {
                    self.serials.tag += 1;
                    self.tags.insert(self.serials.tag, name.clone());
                    self.serials.tag
                }
            };
            if !self.trail_tags.contains(&(trail_id, tag_id)) {
                self.trail_tags.push((trail_id, tag_id));
            }
        }
    }

    fn create(&mut self, owner_id: i32, trail: &NewTrail) -> Result<Trail, DatabaseError> {
        if !self.users.contains_key(&owner_id) {
            return Err(DatabaseError::QueryError(format!("user {} does not exist", owner_id)));
        }
        self.ensure_unique_name(&trail.name, None)?;

        let location_id = self.insert_location(&trail.location);
        self.serials.trail += 1;
        let record = TrailRecord {
            trail_id: self.serials.trail,
            user_id: owner_id,
            location_id,
            name: trail.name.clone(),
            difficulty: trail.difficulty.clone(),
            rating: trail.rating,
            length: trail.length,
            elevation_gain: trail.elevation_gain,
            route_type: trail.route_type.clone(),
            completion_time: trail.completion_time,
            description: trail.description.clone(),
        };
        self.trails.insert(record.trail_id, record.clone());
        self.insert_points(record.trail_id, &trail.points);
        self.link_tags(record.trail_id, &trail.tags);
        self.hydrate(&record)
    }

    fn update(&mut self, trail_id: i32, changes: &TrailChanges) -> Result<Trail, DatabaseError> {
        let mut record = self
            .trails
            .get(&trail_id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("trail {}", trail_id)))?;

        changes.apply_to(&mut record);
        self.ensure_unique_name(&record.name, Some(trail_id))?;

        if let Some(location) = &changes.location {
            record.location_id = self.insert_location(location);
        }
        self.trails.insert(trail_id, record.clone());

        if let Some(points) = &changes.points {
            self.trail_points.retain(|link| link.trail_id != trail_id);
            self.insert_points(trail_id, points);
        }
        if let Some(tags) = &changes.tags {
            self.trail_tags.retain(|(id, _)| *id != trail_id);
            self.link_tags(trail_id, tags);
        }

        self.hydrate(&record)
    }

    fn delete(&mut self, trail_id: i32) -> Result<(), DatabaseError> {
        self.trail_points.retain(|link| link.trail_id != trail_id);
        self.trail_tags.retain(|(id, _)| *id != trail_id);
        self.trails
            .remove(&trail_id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("trail {}", trail_id)))
    }
}

/// In-process store used when no database is configured.
///
/// Writers operate on a scratch copy of the tables which replaces the live
/// copy only when the whole write succeeds.
#[derive(Debug, Default)]
pub struct MemoryTrailStore {
    tables: RwLock<Tables>,
}

impl MemoryTrailStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn write<T>(&self, op: impl FnOnce(&mut Tables) -> Result<T, DatabaseError>) -> Result<T, DatabaseError> {
        let mut live = self.tables.write().await;
        let mut scratch = live.clone();
        let value = op(&mut scratch)?;
        *live = scratch;
        Ok(value)
    }
}

#[async_trait]
impl TrailStore for MemoryTrailStore {
    async fn find_or_create_user(&self, email: &str) -> Result<User, DatabaseError> {
        let known = self.tables.read().await.users.values().find(|user| user.email == email).cloned();
        if let Some(user) = known {
            return Ok(user);
        }

        self.write(|tables| {
            if let Some(user) = tables.users.values().find(|user| user.email == email) {
                return Ok(user.clone());
            }
            tables.serials.user += 1;
            let user = User {
                user_id: tables.serials.user,
                email: email.to_string(),
            };
            tables.users.insert(user.user_id, user.clone());
            Ok(user)
        })
        .await
    }

    async fn count_trails(&self) -> Result<i64, DatabaseError> {
        Ok(self.tables.read().await.trails.len() as i64)
    }

    async fn list_trails(&self, limit: i64, offset: i64) -> Result<Vec<Trail>, DatabaseError> {
        let tables = self.tables.read().await;
        let skip = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        tables
            .trails
            .values()
            .skip(skip)
            .take(take)
            .map(|record| tables.hydrate(record))
            .collect()
    }

    async fn find_trail_by_name(&self, name: &str) -> Result<Option<Trail>, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .trails
            .values()
            .find(|record| record.name == name)
            .map(|record| tables.hydrate(record))
            .transpose()
    }

    async fn create_trail(&self, owner_id: i32, trail: &NewTrail) -> Result<Trail, DatabaseError> {
        self.write(|tables| tables.create(owner_id, trail)).await
    }

    async fn update_trail(&self, trail_id: i32, changes: &TrailChanges) -> Result<Trail, DatabaseError> {
        self.write(|tables| tables.update(trail_id, changes)).await
    }

    async fn delete_trail(&self, trail_id: i32) -> Result<(), DatabaseError> {
        self.write(|tables| tables.delete(trail_id)).await
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
