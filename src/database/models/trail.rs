use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_DESCRIPTION: &str = "No description provided.";

/// Row of the `trails` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct TrailRecord {
    pub trail_id: i32,
    pub user_id: i32,
    pub location_id: i32,
    pub name: String,
    pub difficulty: String,
    pub rating: Decimal,
    pub length: Decimal,
    pub elevation_gain: i16,
    pub route_type: String,
    pub completion_time: Option<i32>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Location {
    pub location_id: i32,
    pub city: String,
    pub county: String,
    pub country: String,
}

/// A waypoint as linked to a trail, carrying its position in the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct TrailPoint {
    pub sequence_number: i32,
    pub point_id: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
}

/// A trail together with its location, ordered route and tag names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Trail {
    #[serde(flatten)]
    pub record: TrailRecord,
    pub location: Location,
    pub points: Vec<TrailPoint>,
    pub tags: Vec<String>,
}

impl Trail {
    pub fn trail_id(&self) -> i32 {
        self.record.trail_id
    }

    pub fn owner_id(&self) -> i32 {
        self.record.user_id
    }

    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.record.user_id == user_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLocation {
    pub city: String,
    pub county: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
}

/// Validated input for creating a trail.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrail {
    pub name: String,
    pub difficulty: String,
    pub rating: Decimal,
    pub length: Decimal,
    pub elevation_gain: i16,
    pub route_type: String,
    pub completion_time: Option<i32>,
    pub description: String,
    pub location: NewLocation,
    pub points: Vec<NewPoint>,
    pub tags: Vec<String>,
}

/// Validated partial update. `None` leaves the stored value untouched.
///
/// `completion_time` is doubly optional because the column is nullable:
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrailChanges {
    pub name: Option<String>,
    pub difficulty: Option<String>,
    pub rating: Option<Decimal>,
    pub length: Option<Decimal>,
    pub elevation_gain: Option<i16>,
    pub route_type: Option<String>,
    pub completion_time: Option<Option<i32>>,
    pub description: Option<String>,
    pub location: Option<NewLocation>,
    pub points: Option<Vec<NewPoint>>,
    pub tags: Option<Vec<String>>,
}

impl TrailChanges {
    /// Apply the scalar fields onto an existing record.
    pub fn apply_to(&self, record: &mut TrailRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(difficulty) = &self.difficulty {
            record.difficulty = difficulty.clone();
        }
        if let Some(rating) = self.rating {
            record.rating = rating;
        }
        if let Some(length) = self.length {
            record.length = length;
        }
        if let Some(elevation_gain) = self.elevation_gain {
            record.elevation_gain = elevation_gain;
        }
        if let Some(route_type) = &self.route_type {
            record.route_type = route_type.clone();
        }
        if let Some(completion_time) = self.completion_time {
            record.completion_time = completion_time;
        }
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
    }
}
