/// Route-level tests exercising the router, extractors and status mapping
mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;
use uuid::Uuid;

use common::test_context;
use shareon::server::build_router;

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn health_endpoint_responds() {
    let (ctx, _mailer) = test_context().await;
    let router = build_router(ctx);

    let response = router.oneshot(get_request("/health")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (ctx, _mailer) = test_context().await;
    let router = build_router(ctx);

    let response = router
        .oneshot(get_request("/api/nonsense"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_with_bad_invite_is_bad_request() {
    let (ctx, _mailer) = test_context().await;
    let router = build_router(ctx);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            serde_json::json!({
                "email": "a@b.com",
                "password": "Secret1!",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "inviteCode": "WRONG_CODE"
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_with_invalid_email_is_bad_request() {
    let (ctx, _mailer) = test_context().await;
    let router = build_router(ctx);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            serde_json::json!({
                "email": "not-an-email",
                "password": "Secret1!",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "inviteCode": "VALID_CODE"
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_then_fetch_user() {
    let (ctx, _mailer) = test_context().await;
    let router = build_router(ctx.clone());

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            serde_json::json!({
                "email": "a@b.com",
                "password": "Secret1!",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "inviteCode": "VALID_CODE"
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let user = ctx
        .credentials
        .find_by_email("a@b.com")
        .await
        .expect("lookup")
        .expect("user exists");

    let response = router
        .oneshot(get_request(&format!("/api/auth/users/{}", user.id)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_with_unknown_user_is_unauthorized() {
    let (ctx, _mailer) = test_context().await;
    let router = build_router(ctx);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({
                "email": "nobody@b.com",
                "password": "Secret1!"
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn confirm_with_bad_token_is_not_found() {
    let (ctx, _mailer) = test_context().await;
    let router = build_router(ctx.clone());

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            serde_json::json!({
                "email": "a@b.com",
                "password": "Secret1!",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "inviteCode": "VALID_CODE"
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let user = ctx
        .credentials
        .find_by_email("a@b.com")
        .await
        .expect("lookup")
        .expect("user exists");

    let response = router
        .oneshot(get_request(&format!(
            "/api/auth/users/{}/confirm?token=bogus",
            user.id
        )))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_platform_is_not_found() {
    let (ctx, _mailer) = test_context().await;
    let router = build_router(ctx);

    let response = router
        .oneshot(get_request(&format!("/api/platforms/{}", Uuid::new_v4())))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn platform_list_is_ok_when_empty() {
    let (ctx, _mailer) = test_context().await;
    let router = build_router(ctx);

    let response = router
        .oneshot(get_request("/api/platforms"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn profile_create_with_missing_platform_is_not_found() {
    let (ctx, _mailer) = test_context().await;
    let router = build_router(ctx);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/profiles",
            serde_json::json!({
                "platformId": Uuid::new_v4(),
                "profileHandle": "ghost",
                "platformUserId": null,
                "token": "access-token"
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
