use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::database::models::trail::DEFAULT_DESCRIPTION;
use crate::database::models::{NewLocation, NewPoint, NewTrail, TrailChanges};
use crate::services::trail_service::TrailError;
use crate::types::{LocationPayload, PointPayload, TrailPayload};

const NAME_MAX: usize = 150;
const DIFFICULTY_MAX: usize = 25;
const ROUTE_TYPE_MAX: usize = 25;
const DESCRIPTION_MAX: usize = 2000;
const PLACE_MAX: usize = 100;
const POINT_DESCRIPTION_MAX: usize = 255;
const TAG_MAX: usize = 50;

/// NUMERIC(2,1)
const RATING_MAX: Decimal = Decimal::from_parts(99, 0, 0, false, 1);
/// NUMERIC(5,1)
const LENGTH_MAX: Decimal = Decimal::from_parts(99_999, 0, 0, false, 1);

/// Collects per-field messages so a single response reports every problem.
#[derive(Debug, Default)]
struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    fn finish<T>(self, value: T) -> Result<T, TrailError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(self.into_error())
        }
    }

    fn into_error(self) -> TrailError {
        TrailError::Validation {
            message: "Trail payload failed validation".to_string(),
            field_errors: self.0,
        }
    }

    fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, "This field is required");
        }
        value
    }

    fn text(&mut self, field: &str, value: String, max: usize) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.add(field, "Must not be empty");
            return None;
        }
        if trimmed.chars().count() > max {
            self.add(field, format!("Must be at most {} characters", max));
            return None;
        }
        Some(trimmed.to_string())
    }

    /// Round to one decimal place, the scale of the backing columns.
    fn tenths(&mut self, field: &str, value: Decimal, max: Decimal) -> Option<Decimal> {
        let rounded = value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            self.add(field, "Must not be negative");
            return None;
        }
        if rounded > max {
            self.add(field, format!("Must be at most {}", max));
            return None;
        }
        Some(rounded)
    }

    fn elevation_gain(&mut self, field: &str, value: i64) -> Option<i16> {
        match i16::try_from(value) {
            Ok(v) if v >= 0 => Some(v),
            _ => {
                self.add(field, format!("Must be between 0 and {}", i16::MAX));
                None
            }
        }
    }

    fn completion_time(&mut self, field: &str, value: Option<i64>) -> Option<Option<i32>> {
        match value.map(i32::try_from) {
            None => Some(None),
            Some(Ok(v)) if v >= 0 => Some(Some(v)),
            Some(_) => {
                self.add(field, format!("Must be between 0 and {}", i32::MAX));
                None
            }
        }
    }

    fn description(&mut self, field: &str, value: String) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Some(DEFAULT_DESCRIPTION.to_string());
        }
        if trimmed.chars().count() > DESCRIPTION_MAX {
            self.add(field, format!("Must be at most {} characters", DESCRIPTION_MAX));
            return None;
        }
        Some(trimmed.to_string())
    }

    fn location(&mut self, payload: LocationPayload) -> Option<NewLocation> {
        let city = self.required("Location.City", payload.city).and_then(|v| self.text("Location.City", v, PLACE_MAX));
        let county = self
            .required("Location.County", payload.county)
            .and_then(|v| self.text("Location.County", v, PLACE_MAX));
        let country = self
            .required("Location.Country", payload.country)
            .and_then(|v| self.text("Location.Country", v, PLACE_MAX));
        Some(NewLocation {
            city: city?,
            county: county?,
            country: country?,
        })
    }

    fn points(&mut self, payload: Vec<PointPayload>) -> Option<Vec<NewPoint>> {
        if payload.is_empty() {
            self.add("Points", "A trail requires at least one Point");
            return None;
        }

        let mut points = Vec::with_capacity(payload.len());
        let mut valid = true;
        for (index, point) in payload.into_iter().enumerate() {
            let prefix = format!("Points[{}]", index);
            let latitude = self.coordinate(&format!("{}.Latitude", prefix), point.latitude, 90.0);
            let longitude = self.coordinate(&format!("{}.Longitude", prefix), point.longitude, 180.0);
            let description = match point.description {
                Some(text) if text.trim().is_empty() => Some(None),
                Some(text) if text.trim().chars().count() > POINT_DESCRIPTION_MAX => {
                    self.add(
                        format!("{}.Description", prefix),
                        format!("Must be at most {} characters", POINT_DESCRIPTION_MAX),
                    );
                    None
                }
                Some(text) => Some(Some(text.trim().to_string())),
                None => Some(None),
            };
            match (latitude, longitude, description) {
                (Some(latitude), Some(longitude), Some(description)) => points.push(NewPoint {
                    latitude,
                    longitude,
                    description,
                }),
                _ => valid = false,
            }
        }
        valid.then_some(points)
    }

    fn coordinate(&mut self, field: &str, value: Option<f64>, bound: f64) -> Option<f64> {
        let value = self.required(field, value)?;
        if !value.is_finite() || value < -bound || value > bound {
            self.add(field, format!("Must be between -{} and {}", bound, bound));
            return None;
        }
        Some(value)
    }

    /// Trimmed, de-duplicated tag names in first-seen order.
    fn tags(&mut self, payload: Vec<String>) -> Option<Vec<String>> {
        let mut tags: Vec<String> = Vec::with_capacity(payload.len());
        let mut valid = true;
        for (index, tag) in payload.into_iter().enumerate() {
            match self.text(&format!("Tags[{}]", index), tag, TAG_MAX) {
                Some(tag) if !tags.contains(&tag) => tags.push(tag),
                Some(_) => {}
                None => valid = false,
            }
        }
        valid.then_some(tags)
    }
}

/// Validate a create payload. Location and at least one Point are mandatory.
pub fn new_trail(payload: TrailPayload) -> Result<NewTrail, TrailError> {
    let mut errors = FieldErrors::default();

    let name = errors.required("Name", payload.name).and_then(|v| errors.text("Name", v, NAME_MAX));
    let difficulty = errors
        .required("Difficulty", payload.difficulty)
        .and_then(|v| errors.text("Difficulty", v, DIFFICULTY_MAX));
    let rating = errors
        .required("Rating", payload.rating)
        .and_then(|v| errors.tenths("Rating", v, RATING_MAX));
    let length = errors
        .required("Length", payload.length)
        .and_then(|v| errors.tenths("Length", v, LENGTH_MAX));
    let elevation_gain = errors
        .required("ElevationGain", payload.elevation_gain)
        .and_then(|v| errors.elevation_gain("ElevationGain", v));
    let route_type = errors
        .required("RouteType", payload.route_type)
        .and_then(|v| errors.text("RouteType", v, ROUTE_TYPE_MAX));
    let completion_time = errors.completion_time("CompletionTime", payload.completion_time.flatten());
    let description = match payload.description {
        Some(text) => errors.description("Description", text),
        None => Some(DEFAULT_DESCRIPTION.to_string()),
    };

    let location = match payload.location {
        Some(location) => errors.location(location),
        None => {
            errors.add("Location", "A trail requires a Location");
            None
        }
    };
    let points = match payload.points {
        Some(points) => errors.points(points),
        None => {
            errors.add("Points", "A trail requires at least one Point");
            None
        }
    };
    let tags = errors.tags(payload.tags.unwrap_or_default());

    match (
        name,
        difficulty,
        rating,
        length,
        elevation_gain,
        route_type,
        completion_time,
        description,
        location,
        points,
        tags,
    ) {
        (
            Some(name),
            Some(difficulty),
            Some(rating),
            Some(length),
            Some(elevation_gain),
            Some(route_type),
            Some(completion_time),
            Some(description),
            Some(location),
            Some(points),
            Some(tags),
        ) => errors.finish(NewTrail {
            name,
            difficulty,
            rating,
            length,
            elevation_gain,
            route_type,
            completion_time,
            description,
            location,
            points,
            tags,
        }),
        // Every rejected field has recorded a message
        _ => Err(errors.into_error()),
    }
}

/// Validate an update payload. Only present fields are checked and applied.
pub fn trail_changes(payload: TrailPayload) -> Result<TrailChanges, TrailError> {
    let mut errors = FieldErrors::default();

    let changes = TrailChanges {
        name: payload.name.and_then(|v| errors.text("Name", v, NAME_MAX)),
        difficulty: payload.difficulty.and_then(|v| errors.text("Difficulty", v, DIFFICULTY_MAX)),
        rating: payload.rating.and_then(|v| errors.tenths("Rating", v, RATING_MAX)),
        length: payload.length.and_then(|v| errors.tenths("Length", v, LENGTH_MAX)),
        elevation_gain: payload.elevation_gain.and_then(|v| errors.elevation_gain("ElevationGain", v)),
        route_type: payload.route_type.and_then(|v| errors.text("RouteType", v, ROUTE_TYPE_MAX)),
        completion_time: payload
            .completion_time
            .and_then(|v| errors.completion_time("CompletionTime", v)),
        description: payload.description.and_then(|v| errors.description("Description", v)),
        location: payload.location.and_then(|v| errors.location(v)),
        points: payload.points.and_then(|v| errors.points(v)),
        tags: payload.tags.and_then(|v| errors.tags(v)),
    };

    errors.finish(changes)
}
