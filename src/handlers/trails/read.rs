// handlers/trails/read.rs - GET /api/trails/:name handler

use axum::extract::{Path, State};

use crate::database::models::Trail;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/trails/:name - Exact-match lookup, 404 when absent
pub async fn trail_read(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Trail> {
    let trail = state.trails.get(&name).await?;
    Ok(ApiResponse::success(trail))
}
