/// Platform endpoints
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::api::{response::ApiResponse, validate_request};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::services::platform::PlatformDto;

/// Build platform routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/platforms", get(list_platforms).put(update_platform))
        .route("/api/platforms/:id", get(get_platform))
}

/// List all platforms
async fn list_platforms(
    State(ctx): State<AppContext>,
) -> AppResult<Json<ApiResponse<Vec<PlatformDto>>>> {
    let platforms = ctx.platform_service.list_platforms().await?;
    Ok(Json(ApiResponse::ok(platforms)))
}

/// Get a platform by id
async fn get_platform(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PlatformDto>>> {
    let platform = ctx.platform_service.get_platform(id).await?;
    Ok(Json(ApiResponse::ok(platform)))
}

/// Update a platform and return the committed view
async fn update_platform(
    State(ctx): State<AppContext>,
    Json(dto): Json<PlatformDto>,
) -> AppResult<Json<ApiResponse<PlatformDto>>> {
    validate_request(&dto)?;

    let updated = ctx.platform_service.update_platform(&dto).await?;
    Ok(Json(ApiResponse::ok(updated)))
}
