// handlers/trails/list.rs - GET /api/trails handler

use axum::extract::{Query, State};

use crate::database::models::Trail;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{Page, PageParams};
use crate::state::AppState;

/**
 * GET /api/trails?page=1&per_page=10 - List trails ordered by TrailId
 *
 * `page` and `per_page` default to 1 and the configured page size, must both
 * be at least 1, and `per_page` is capped at the configured maximum (100).
 *
 * Response:
 * ```json
 * {
 *   "success": true,
 *   "data": { "page": 1, "per_page": 10, "total": 42, "total_pages": 5, "trails": [ ... ] }
 * }
 * ```
 */
pub async fn trail_list(State(state): State<AppState>, Query(params): Query<PageParams>) -> ApiResult<Page<Trail>> {
    let page = state.trails.list(&params).await?;
    Ok(ApiResponse::success(page))
}
