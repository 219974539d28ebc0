// handlers/trails/update.rs - PUT /api/trails/:name handler

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};

use crate::database::models::Trail;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::types::{TrailPayload, TrailRequest};

/**
 * PUT /api/trails/:name - Partially update a trail owned by the caller
 *
 * Same body shape as create, with every `Trail` field optional. Scalar fields
 * present in the payload are overwritten. `Location` creates a new location
 * row. `Points` (non-empty) and `Tags` replace the existing links wholesale.
 *
 * 403 when the caller does not own the trail; 400 with the store's message
 * when the write is rolled back.
 */
pub async fn trail_update(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    body: Result<Json<TrailRequest<TrailPayload>>, JsonRejection>,
) -> ApiResult<Trail> {
    let Json(request) = body?;
    let payload = request.trail.ok_or_else(|| ApiError::bad_request("Trail is required"))?;

    let trail = state.trails.update(&user, &name, payload).await?;
    Ok(ApiResponse::success(trail))
}
