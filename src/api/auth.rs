/// Authentication endpoints
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::account::UserView;
use crate::api::{response::ApiResponse, validate_request};
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::services::auth::{
    LoginRequest, PasswordForgotRequest, PasswordResetRequest, RegisterRequest,
};
use crate::token::AuthToken;

/// Build authentication routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/users/:id", get(get_user))
        .route("/api/auth/users/:id/confirm", get(confirm))
        .route("/api/auth/login", post(login))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password", post(reset_password))
}

/// Register a new user
async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<Uuid>>> {
    validate_request(&req)?;

    let user_id = ctx.auth_service.register(&req).await?;

    Ok(Json(ApiResponse::success(
        user_id,
        "User is registered successfully. Please confirm email.",
    )))
}

/// Get the public view of a user
async fn get_user(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UserView>>> {
    let user = ctx.auth_service.get_user(id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

#[derive(Debug, Deserialize)]
struct ConfirmQuery {
    token: String,
}

/// Validate the emailed token and confirm the user
async fn confirm(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
    Query(query): Query<ConfirmQuery>,
) -> Response {
    match ctx.auth_service.confirm_user(id, &query.token).await {
        Ok(()) => Json(ApiResponse::success((), "User is confirmed.")).into_response(),
        // An invalid token on this route is a 404, like a missing user.
        Err(AppError::TokenInvalid(message)) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(
                vec![message],
                "Failed to confirm user.",
            )),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

/// Log in and receive a bearer token
async fn login(State(ctx): State<AppContext>, Json(req): Json<LoginRequest>) -> Response {
    if let Err(err) = validate_request(&req) {
        return err.into_response();
    }

    match ctx.auth_service.login(&req).await {
        Ok(Some(token)) => {
            Json(ApiResponse::<AuthToken>::success(token, "Login successful.")).into_response()
        }
        Ok(None) => AppError::Authentication.into_response(),
        Err(err) => err.into_response(),
    }
}

/// Request a password reset link by email
async fn forgot_password(
    State(ctx): State<AppContext>,
    Json(req): Json<PasswordForgotRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    validate_request(&req)?;

    ctx.auth_service.request_password_reset(&req).await?;

    Ok(Json(ApiResponse::success(
        (),
        "Password reset succeeded. Recovery instructions were sent to your email.",
    )))
}

#[derive(Debug, Deserialize)]
struct ResetQuery {
    token: String,
}

/// Apply a new password using the emailed token
async fn reset_password(
    State(ctx): State<AppContext>,
    Query(query): Query<ResetQuery>,
    Json(req): Json<PasswordResetRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    validate_request(&req)?;

    ctx.auth_service
        .process_password_reset(&req, &query.token)
        .await?;

    Ok(Json(ApiResponse::success(
        (),
        "Password reset succeeded. Please continue to login using your new credentials.",
    )))
}
