//! Request payloads shared by the HTTP surface and the service layer.
//!
//! Field names follow the PascalCase wire format used by the API. Fields are
//! optional at this level so that missing values surface as validation errors
//! with a field name rather than as opaque JSON rejections.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Credentials forwarded to the identity service.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// Only a JSON object counts as credentials. Non-string `Email` or
    /// `Password` values are treated as absent.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let field = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            email: field("Email"),
            password: field("Password"),
        })
    }
}

/// The part of a mutating request body read by the authentication layer.
///
/// `Credentials` stays untyped here so that a malformed value is reported as
/// missing credentials rather than as a JSON syntax error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CredentialsEnvelope {
    #[serde(default)]
    pub credentials: Option<Value>,
}

impl CredentialsEnvelope {
    pub fn credentials(&self) -> Option<Credentials> {
        self.credentials.as_ref().and_then(Credentials::from_json)
    }
}

/// Body of create and update requests: `{"Credentials": ..., "Trail": ...}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrailRequest<T> {
    pub trail: Option<T>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocationPayload {
    pub city: Option<String>,
    pub county: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PointPayload {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
}

/// Trail fields as submitted for create and update.
///
/// For create, every required column must be present; for update, only the
/// fields present are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrailPayload {
    pub name: Option<String>,
    pub difficulty: Option<String>,
    pub rating: Option<Decimal>,
    pub length: Option<Decimal>,
    pub elevation_gain: Option<i64>,
    pub route_type: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub completion_time: Option<Option<i64>>,
    pub description: Option<String>,
    pub location: Option<LocationPayload>,
    pub points: Option<Vec<PointPayload>>,
    pub tags: Option<Vec<String>>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key (`None`).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn completion_time_tracks_null_versus_absent() {
        let absent: TrailPayload = serde_json::from_value(json!({ "Name": "x" })).unwrap();
        assert_eq!(absent.completion_time, None);

        let null: TrailPayload = serde_json::from_value(json!({ "CompletionTime": null })).unwrap();
        assert_eq!(null.completion_time, Some(None));

        let set: TrailPayload = serde_json::from_value(json!({ "CompletionTime": 90 })).unwrap();
        assert_eq!(set.completion_time, Some(Some(90)));
    }

    #[test]
    fn decimals_accept_json_numbers() {
        let payload: TrailPayload = serde_json::from_value(json!({ "Rating": 4.5, "Length": 12 })).unwrap();
        assert_eq!(payload.rating, Some(Decimal::new(45, 1)));
        assert_eq!(payload.length, Some(Decimal::new(12, 0)));
    }

    #[test]
    fn envelope_ignores_other_keys() {
        let envelope: CredentialsEnvelope = serde_json::from_value(json!({
            "Credentials": { "Email": "a@b.c", "Password": "pw" },
            "Trail": { "Name": "x" }
        }))
        .unwrap();
        let credentials = envelope.credentials().unwrap();
        assert_eq!(credentials.email.as_deref(), Some("a@b.c"));
        assert_eq!(credentials.password.as_deref(), Some("pw"));
    }

    #[test]
    fn credentials_must_be_an_object_of_strings() {
        for value in [json!("x"), json!(["a@b.c", "pw"]), json!(null), json!(42)] {
            let envelope: CredentialsEnvelope = serde_json::from_value(json!({ "Credentials": value })).unwrap();
            assert!(envelope.credentials().is_none(), "{} should not be credentials", value);
        }

        let envelope: CredentialsEnvelope =
            serde_json::from_value(json!({ "Credentials": { "Email": 5, "Password": "pw" } })).unwrap();
        let credentials = envelope.credentials().unwrap();
        assert_eq!(credentials.email, None);
        assert_eq!(credentials.password.as_deref(), Some("pw"));
    }
}
