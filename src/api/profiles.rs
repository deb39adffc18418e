/// Profile endpoints
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::{response::ApiResponse, validate_request};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::services::profile::{CreateProfileRequest, ProfileDto, UpdateProfileRequest};

/// Build profile routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/profiles", post(create_profile).put(update_profile))
        .route("/api/profiles/:id", get(get_profile))
}

/// Create a profile referencing an existing platform
async fn create_profile(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateProfileRequest>,
) -> AppResult<Json<ApiResponse<ProfileDto>>> {
    validate_request(&req)?;

    let profile = ctx.profile_service.create_profile(&req).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

/// Get a profile with its platform
async fn get_profile(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProfileDto>>> {
    let profile = ctx.profile_service.get_profile(id).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

/// Update a profile and return the committed view
async fn update_profile(
    State(ctx): State<AppContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<ProfileDto>>> {
    validate_request(&req)?;

    let profile = ctx.profile_service.update_profile(&req).await?;
    Ok(Json(ApiResponse::ok(profile)))
}
