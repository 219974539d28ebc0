// handlers/trails/create.rs - POST /api/trails handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use crate::database::models::Trail;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::types::{TrailPayload, TrailRequest};

/**
 * POST /api/trails - Create a trail owned by the authenticated caller
 *
 * Expected Input:
 * ```json
 * {
 *   "Credentials": { "Email": "string", "Password": "string" },
 *   "Trail": {
 *     "Name": "string", "Difficulty": "string", "Rating": 4.5, "Length": 12.3,
 *     "ElevationGain": 120, "RouteType": "string", "CompletionTime": 180,
 *     "Description": "string",
 *     "Location": { "City": "string", "County": "string", "Country": "string" },
 *     "Points": [ { "Latitude": 50.1, "Longitude": -4.1, "Description": "string" } ],
 *     "Tags": [ "string" ]
 *   }
 * }
 * ```
 *
 * Location and at least one Point are required. Returns 201 with the trail.
 */
pub async fn trail_create(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    body: Result<Json<TrailRequest<TrailPayload>>, JsonRejection>,
) -> ApiResult<Trail> {
    let Json(request) = body?;
    let payload = request.trail.ok_or_else(|| ApiError::bad_request("Trail is required"))?;

    let trail = state.trails.create(&user, payload).await?;
    Ok(ApiResponse::created(trail))
}
