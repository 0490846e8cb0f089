use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{Value, json};
use userdesk_core::api::routes::{HEALTH, v1};
use userdesk_core::domain::users::User;

#[path = "support/mod.rs"]
mod support;
use support::{PASSWORD, bearer, build_test_app};

#[tokio::test]
async fn health_is_public() -> Result<()> {
    let app = build_test_app()?;
    let response = app.server.get(HEALTH).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    Ok(())
}

#[tokio::test]
async fn missing_token_is_unauthorized() -> Result<()> {
    let app = build_test_app()?;
    let response = app.server.get(v1::auth::users::CURRENT).await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let body: Value = response.json();
    assert_eq!(body["error"]["status"], 401);
    Ok(())
}

#[tokio::test]
async fn malformed_token_is_unauthorized() -> Result<()> {
    let app = build_test_app()?;

    let response = app
        .server
        .patch(v1::auth::users::CURRENT)
        .add_header("Authorization", bearer("not-a-jwt"))
        .json(&json!({ "first_name": "Mallory" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let basic = app
        .server
        .get(v1::auth::users::CURRENT)
        .add_header("Authorization", "Basic YW5uOnNlY3JldA==")
        .await;
    basic.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_for_unknown_user_is_unauthorized() -> Result<()> {
    let app = build_test_app()?;
    let ghost = User::new("ghost@example.com");

    let response = app
        .server
        .get(v1::auth::users::CURRENT)
        .add_header("Authorization", bearer(&app.token_for(&ghost)?))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn login_issues_usable_token() -> Result<()> {
    let app = build_test_app()?;
    let user = app.seed_user("ann@example.com", false).await?;

    let login = app
        .server
        .post(v1::auth::JWT_CREATE)
        .json(&json!({ "email": "ANN@example.com", "password": PASSWORD }))
        .await;
    login.assert_status_ok();

    let body: Value = login.json();
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 900);
    let token = body["access_token"].as_str().expect("access_token present");

    let me = app
        .server
        .get(v1::auth::users::CURRENT)
        .add_header("Authorization", bearer(token))
        .await;
    me.assert_status_ok();
    let me_body: Value = me.json();
    assert_eq!(me_body["id"], json!(user.id));
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_rejected() -> Result<()> {
    let app = build_test_app()?;
    app.seed_user("ann@example.com", false).await?;

    let response = app
        .server
        .post(v1::auth::JWT_CREATE)
        .json(&json!({ "email": "ann@example.com", "password": "wrong" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let unknown = app
        .server
        .post(v1::auth::JWT_CREATE)
        .json(&json!({ "email": "nobody@example.com", "password": PASSWORD }))
        .await;
    unknown.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn deactivated_user_loses_access() -> Result<()> {
    let app = build_test_app()?;
    let admin = app.seed_user("admin@example.com", true).await?;
    let token = app.token_for(&admin)?;

    app.server
        .patch(v1::auth::users::CURRENT)
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "is_active": false }))
        .await
        .assert_status_ok();

    let response = app
        .server
        .get(v1::auth::users::CURRENT)
        .add_header("Authorization", bearer(&token))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let login = app
        .server
        .post(v1::auth::JWT_CREATE)
        .json(&json!({ "email": "admin@example.com", "password": PASSWORD }))
        .await;
    login.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn login_accepts_trailing_slash() -> Result<()> {
    let app = build_test_app()?;
    app.seed_user("ann@example.com", false).await?;

    let response = app
        .server
        .post(v1::auth::JWT_CREATE_SLASH)
        .json(&json!({ "email": "ann@example.com", "password": PASSWORD }))
        .await;
    response.assert_status_ok();
    Ok(())
}

#[tokio::test]
async fn login_body_errors_use_error_envelope() -> Result<()> {
    let app = build_test_app()?;

    let missing = app
        .server
        .post(v1::auth::JWT_CREATE)
        .json(&json!({ "email": "ann@example.com" }))
        .await;
    missing.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = missing.json();
    assert_eq!(body["error"]["status"], 422);
    assert!(
        body["error"]["message"]
            .as_str()
            .is_some_and(|message| message.contains("password"))
    );

    let malformed = app
        .server
        .post(v1::auth::JWT_CREATE)
        .content_type("application/json")
        .bytes("{\"email\":".into())
        .await;
    malformed.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = malformed.json();
    assert_eq!(body["error"]["status"], 400);
    Ok(())
}
