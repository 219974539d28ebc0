// handlers/trails/delete.rs - DELETE /api/trails/:name handler

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// DELETE /api/trails/:name - Remove a trail owned by the caller, 204 on success
pub async fn trail_delete(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> ApiResult<()> {
    state.trails.delete(&user, &name).await?;
    Ok(ApiResponse::no_content())
}
