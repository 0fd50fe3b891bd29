use std::sync::Arc;

use actix_web::http::{header, StatusCode};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use chrono::{Duration, Utc};
use serde_json::json;
use timetrack::auth::{
    RegisterResponse, SigningKeys, TokenKind, TokenPair, TokenService, REFRESH_TOKEN_HEADER,
};
use timetrack::routes;
use timetrack::store::MemoryStore;
use timetrack::TaskRepository;

fn app_state() -> (web::Data<TaskRepository>, web::Data<TokenService>) {
    (
        web::Data::new(TaskRepository::new(Arc::new(MemoryStore::new()))),
        web::Data::new(TokenService::new(SigningKeys::new(
            "integration-access",
            "integration-refresh",
        ))),
    )
}

fn assert_close(actual: chrono::DateTime<Utc>, expected: chrono::DateTime<Utc>) {
    let drift = (actual - expected).num_seconds().abs();
    assert!(drift <= 60, "expected {} ≈ {}", actual, expected);
}

#[test_log::test(actix_rt::test)]
async fn test_register_login_and_refresh_flow() {
    let (repo, tokens) = app_state();
    let app = test::init_service(
        App::new()
            .app_data(repo)
            .app_data(tokens.clone())
            .wrap(Logger::default())
            .service(web::scope("/api").configure(routes::config)),
    )
    .await;

    // Register
    let register_payload = json!({
        "name": "Integration User",
        "email": "integration@example.com",
        "password": "Password123!"
    });
    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(&register_payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    assert_eq!(
        status,
        StatusCode::CREATED,
        "Registration failed. Body: {:?}",
        String::from_utf8_lossy(&body)
    );
    let registered: RegisterResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(registered.user.name, "Integration User");
    let raw: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(raw["user"].get("password_hash").is_none());

    // Registering the same email again fails
    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(&register_payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Email already registered" }));
    assert!(body.get("tokens").is_none());

    // Login with the right password
    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({
            "email": "integration@example.com",
            "password": "Password123!"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let pair: TokenPair = test::read_body_json(resp).await;

    assert!(!pair.access_token.is_empty());
    assert!(!pair.refresh_token.is_empty());
    let now = Utc::now();
    assert_close(pair.access_token_expired_at, now + Duration::hours(1));
    assert_close(pair.refresh_token_expired_at, now + Duration::hours(24));

    let claims = tokens
        .verify_token(&pair.access_token, TokenKind::Access)
        .unwrap();
    assert_eq!(claims.sub, registered.user.id);
    assert_eq!(claims.name, "Integration User");

    // Refresh mints a new pair
    let req = test::TestRequest::post()
        .uri("/api/refresh")
        .insert_header((REFRESH_TOKEN_HEADER, pair.refresh_token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let refreshed: TokenPair = test::read_body_json(resp).await;

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header((
            header::AUTHORIZATION,
            format!("Bearer {}", refreshed.access_token),
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // An access token is not a refresh token
    let req = test::TestRequest::post()
        .uri("/api/refresh")
        .insert_header((REFRESH_TOKEN_HEADER, pair.access_token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // ...and a refresh token cannot authorize task operations
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header((
            header::AUTHORIZATION,
            format!("Bearer {}", pair.refresh_token),
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_login_failures_are_indistinguishable() {
    let (repo, tokens) = app_state();
    let app = test::init_service(
        App::new()
            .app_data(repo)
            .app_data(tokens)
            .service(web::scope("/api").configure(routes::config)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "correct-horse"
        }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let mut bodies = Vec::new();
    for (email, password) in [
        ("ada@example.com", "wrong-horse"),
        ("nobody@example.com", "correct-horse"),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "email": email, "password": password }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body.get("access_token").is_none());
        bodies.push(body);
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[actix_rt::test]
async fn test_status_needs_no_token() {
    let (repo, tokens) = app_state();
    let app = test::init_service(
        App::new()
            .app_data(repo)
            .app_data(tokens)
            .service(web::scope("/api").configure(routes::config)),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/status").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "ok");
}
