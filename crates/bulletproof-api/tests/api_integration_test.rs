//! Integration tests for the HTTP API

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use bulletproof_api::{models::*, ApiServer, ApiServerConfig};
use bulletproof_auth::{Role, SessionKeys};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt; // For `oneshot` method

/// Helper to create an in-memory database with migrations applied
async fn create_test_db() -> DatabaseConnection {
    let db = bulletproof_db::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    bulletproof_db::migrate(&db)
        .await
        .expect("Failed to run migrations");

    db
}

async fn create_test_app() -> Router {
    let db = create_test_db().await;
    let sessions = SessionKeys::new(b"test-session-secret", chrono::Duration::hours(1));
    let config = ApiServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        enable_cors: false,
        cors_origins: None,
    };

    ApiServer::new(config, db, sessions, false).build_router()
}

struct TestResponse {
    status: StatusCode,
    set_cookie: Option<String>,
    body: Value,
}

impl TestResponse {
    /// `name=value` part of the Set-Cookie header, ready to send back
    fn session(&self) -> String {
        let cookie = self.set_cookie.as_deref().expect("no Set-Cookie header");
        cookie.split(';').next().unwrap().to_string()
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    session: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(cookie) = session {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes))
        })
    };

    TestResponse {
        status,
        set_cookie,
        body,
    }
}

/// Registers a user and returns (session cookie, user)
async fn register(app: &Router, email: &str, team: Value) -> (String, User) {
    let mut body = json!({
        "email": email,
        "firstName": "Test",
        "lastName": "User",
        "password": "password123",
    });
    for (key, value) in team.as_object().unwrap() {
        body[key] = value.clone();
    }

    let response = send(app, "POST", "/api/auth/register", None, Some(body)).await;
    assert_eq!(
        response.status,
        StatusCode::CREATED,
        "register failed: {}",
        response.body
    );

    let auth: AuthResponse = serde_json::from_value(response.body.clone()).unwrap();
    (response.session(), auth.user)
}

async fn create_discussion(app: &Router, session: &str, title: &str) -> Discussion {
    let response = send(
        app,
        "POST",
        "/api/discussions",
        Some(session),
        Some(json!({ "title": title, "body": "Let's talk" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    serde_json::from_value(response.body).unwrap()
}

async fn create_comment(app: &Router, session: &str, discussion_id: uuid::Uuid) -> Comment {
    let response = send(
        app,
        "POST",
        "/api/comments",
        Some(session),
        Some(json!({ "discussionId": discussion_id, "body": "Nice" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    serde_json::from_value(response.body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app().await;

    let response = send(&app, "GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
}

#[tokio::test]
async fn test_register_new_team_makes_admin() {
    let app = create_test_app().await;

    let (_, user) = register(&app, "ada@example.com", json!({ "teamName": "Acme" })).await;
    assert_eq!(user.role, Role::Admin);

    let teams = send(&app, "GET", "/api/teams", None, None).await;
    assert_eq!(teams.status, StatusCode::OK);
    assert_eq!(teams.body["data"][0]["name"], "Acme");
    assert_eq!(teams.body["data"][0]["id"], json!(user.team_id));
}

#[tokio::test]
async fn test_register_sets_http_only_session_cookie() {
    let app = create_test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "ada@example.com",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "password": "engine",
            "teamName": "Acme"
        })),
    )
    .await;

    let cookie = response.set_cookie.unwrap();
    assert!(cookie.starts_with("bulletproof_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
    assert!(!cookie.contains("Secure"));
    assert!(response.body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_existing_team_makes_user() {
    let app = create_test_app().await;

    let (_, admin) = register(&app, "admin@example.com", json!({ "teamName": "Acme" })).await;
    let (_, member) = register(&app, "member@example.com", json!({ "teamId": admin.team_id })).await;

    assert_eq!(member.role, Role::User);
    assert_eq!(member.team_id, admin.team_id);
}

#[tokio::test]
async fn test_register_without_team_is_rejected() {
    let app = create_test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "ada@example.com",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "password": "engine"
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["statusCode"], 400);
    assert_eq!(
        response.body["data"]["_schema"][0],
        "Either teamId or teamName is required"
    );
    assert!(response.set_cookie.is_none());
}

#[tokio::test]
async fn test_register_unknown_team_is_a_field_error() {
    let app = create_test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "ada@example.com",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "password": "engine",
            "teamId": uuid::Uuid::new_v4()
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["data"]["teamId"][0], "Team not found");
}

#[tokio::test]
async fn test_register_validation_reports_fields() {
    let app = create_test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "not-an-email",
            "firstName": "",
            "lastName": "Lovelace",
            "password": "1234",
            "teamName": "Acme"
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let data = &response.body["data"];
    assert!(data.get("email").is_some());
    assert!(data.get("firstName").is_some());
    assert!(data.get("password").is_some());
    assert!(data.get("lastName").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = create_test_app().await;

    register(&app, "dup@example.com", json!({ "teamName": "Acme" })).await;

    let response = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "DUP@example.com",
            "firstName": "Other",
            "lastName": "Person",
            "password": "password123",
            "teamName": "Globex"
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["data"]["email"][0], "The email is already in use");

    // The second team must not have been created
    let teams = send(&app, "GET", "/api/teams", None, None).await;
    assert_eq!(teams.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_register_duplicate_team_name() {
    let app = create_test_app().await;

    register(&app, "a@example.com", json!({ "teamName": "Acme" })).await;

    let response = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "b@example.com",
            "firstName": "B",
            "lastName": "B",
            "password": "password123",
            "teamName": "Acme"
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["data"].get("teamName").is_some());
}

#[tokio::test]
async fn test_register_rejects_whitespace_only_names() {
    let app = create_test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "ada@example.com",
            "firstName": "   ",
            "lastName": "  ",
            "password": "engine",
            "teamName": "Acme"
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["data"]["firstName"][0], "Required");
    assert_eq!(response.body["data"]["lastName"][0], "Required");
    assert!(response.set_cookie.is_none());

    let response = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "ada@example.com",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "password": "engine",
            "teamName": "   "
        })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["data"]["teamName"][0],
        "Team name must be 1-100 characters"
    );

    // Neither attempt may leave a team behind
    let teams = send(&app, "GET", "/api/teams", None, None).await;
    assert!(teams.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_register_team_name_is_trimmed() {
    let app = create_test_app().await;

    register(&app, "a@example.com", json!({ "teamName": "  Acme  " })).await;

    let teams = send(&app, "GET", "/api/teams", None, None).await;
    assert_eq!(teams.body["data"][0]["name"], "Acme");

    // Same name once trimmed
    let response = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "b@example.com",
            "firstName": "B",
            "lastName": "B",
            "password": "password123",
            "teamName": "Acme "
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["data"]["teamName"][0],
        "The team name is already taken"
    );
}

#[tokio::test]
async fn test_register_team_id_ignores_empty_team_name() {
    let app = create_test_app().await;

    let (_, admin) = register(&app, "admin@example.com", json!({ "teamName": "Acme" })).await;
    let (_, member) = register(
        &app,
        "member@example.com",
        json!({ "teamId": admin.team_id, "teamName": "" }),
    )
    .await;

    assert_eq!(member.role, Role::User);
    assert_eq!(member.team_id, admin.team_id);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = create_test_app().await;

    register(&app, "ada@example.com", json!({ "teamName": "Acme" })).await;

    let response = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "wrong-password" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["statusCode"], 401);
    assert_eq!(response.body["statusMessage"], "Invalid username or password");
    assert!(response.set_cookie.is_none());
}

#[tokio::test]
async fn test_login_unknown_email_same_message() {
    let app = create_test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ghost@example.com", "password": "password123" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["statusMessage"], "Invalid username or password");
}

#[tokio::test]
async fn test_login_and_me() {
    let app = create_test_app().await;

    let (_, user) = register(&app, "ada@example.com", json!({ "teamName": "Acme" })).await;

    let login = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);

    let me = send(&app, "GET", "/api/auth/me", Some(&login.session()), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["id"], json!(user.id));
    assert_eq!(me.body["role"], "ADMIN");
    assert_eq!(me.body["teamId"], json!(user.team_id));
}

#[tokio::test]
async fn test_me_requires_session() {
    let app = create_test_app().await;

    let response = send(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["statusCode"], 401);

    let response = send(
        &app,
        "GET",
        "/api/auth/me",
        Some("bulletproof_session=not-a-jwt"),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_token_is_accepted() {
    let app = create_test_app().await;

    let (session, _) = register(&app, "ada@example.com", json!({ "teamName": "Acme" })).await;
    let token = session.trim_start_matches("bulletproof_session=");

    let request = Request::builder()
        .uri("/api/profile")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = create_test_app().await;

    let response = send(&app, "POST", "/api/auth/logout", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "success": true }));
    assert!(response.set_cookie.unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn test_update_profile_reissues_session() {
    let app = create_test_app().await;

    let (session, _) = register(&app, "ada@example.com", json!({ "teamName": "Acme" })).await;

    let response = send(
        &app,
        "PATCH",
        "/api/profile",
        Some(&session),
        Some(json!({ "firstName": "Augusta", "bio": "Analyst" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["firstName"], "Augusta");
    assert_eq!(response.body["user"]["bio"], "Analyst");

    let me = send(&app, "GET", "/api/auth/me", Some(&response.session()), None).await;
    assert_eq!(me.body["firstName"], "Augusta");

    // Empty bio clears it
    let cleared = send(
        &app,
        "PATCH",
        "/api/profile",
        Some(&session),
        Some(json!({ "bio": "" })),
    )
    .await;
    assert!(cleared.body["user"].get("bio").is_none());
}

#[tokio::test]
async fn test_update_profile_rejects_taken_email() {
    let app = create_test_app().await;

    let (session, _) = register(&app, "ada@example.com", json!({ "teamName": "Acme" })).await;
    register(&app, "bob@example.com", json!({ "teamName": "Globex" })).await;

    let response = send(
        &app,
        "PATCH",
        "/api/profile",
        Some(&session),
        Some(json!({ "email": "bob@example.com" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["data"]["email"][0], "The email is already in use");
}

#[tokio::test]
async fn test_update_profile_rejects_blank_names() {
    let app = create_test_app().await;

    let (session, _) = register(&app, "ada@example.com", json!({ "teamName": "Acme" })).await;

    let response = send(
        &app,
        "PATCH",
        "/api/profile",
        Some(&session),
        Some(json!({ "firstName": " ", "lastName": "\t" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["data"]["firstName"][0], "Required");
    assert_eq!(response.body["data"]["lastName"][0], "Required");

    let profile = send(&app, "GET", "/api/profile", Some(&session), None).await;
    assert_eq!(profile.body["firstName"], "Test");
}

#[tokio::test]
async fn test_users_list_is_admin_only() {
    let app = create_test_app().await;

    let (admin_session, admin) =
        register(&app, "admin@example.com", json!({ "teamName": "Acme" })).await;
    let (user_session, _) =
        register(&app, "user@example.com", json!({ "teamId": admin.team_id })).await;
    register(&app, "other@example.com", json!({ "teamName": "Globex" })).await;

    let response = send(&app, "GET", "/api/users", Some(&user_session), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["statusCode"], 403);

    let response = send(&app, "GET", "/api/users", Some(&admin_session), None).await;
    assert_eq!(response.status, StatusCode::OK);
    let list: UserList = serde_json::from_value(response.body).unwrap();
    assert_eq!(list.data.len(), 2);
    assert!(list.data.iter().all(|u| u.team_id == admin.team_id));
}

#[tokio::test]
async fn test_get_user_of_other_team_is_not_found() {
    let app = create_test_app().await;

    let (session, _) = register(&app, "a@example.com", json!({ "teamName": "Acme" })).await;
    let (_, stranger) = register(&app, "b@example.com", json!({ "teamName": "Globex" })).await;

    let uri = format!("/api/users/{}", stranger.id);
    let response = send(&app, "GET", &uri, Some(&session), None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user_rules() {
    let app = create_test_app().await;

    let (admin_session, admin) =
        register(&app, "admin@example.com", json!({ "teamName": "Acme" })).await;
    let (user_session, member) =
        register(&app, "user@example.com", json!({ "teamId": admin.team_id })).await;

    // USER cannot delete
    let uri = format!("/api/users/{}", admin.id);
    let response = send(&app, "DELETE", &uri, Some(&user_session), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    // ADMIN cannot delete themselves
    let response = send(&app, "DELETE", &uri, Some(&admin_session), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // ADMIN deletes a member; their session stops working
    let uri = format!("/api/users/{}", member.id);
    let response = send(&app, "DELETE", &uri, Some(&admin_session), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "success": true }));

    let response = send(&app, "GET", "/api/auth/me", Some(&user_session), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_path_id_is_bad_request() {
    let app = create_test_app().await;

    let (session, _) = register(&app, "a@example.com", json!({ "teamName": "Acme" })).await;
    let response = send(&app, "GET", "/api/discussions/not-a-uuid", Some(&session), None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["data"].get("id").is_some());
}

#[tokio::test]
async fn test_user_cannot_create_discussion() {
    let app = create_test_app().await;

    let (_, admin) = register(&app, "admin@example.com", json!({ "teamName": "Acme" })).await;
    let (user_session, _) =
        register(&app, "user@example.com", json!({ "teamId": admin.team_id })).await;

    // The role check runs before the body is validated
    let response = send(
        &app,
        "POST",
        "/api/discussions",
        Some(&user_session),
        Some(json!({ "title": "" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_discussion_lifecycle() {
    let app = create_test_app().await;

    let (session, admin) = register(&app, "admin@example.com", json!({ "teamName": "Acme" })).await;

    let invalid = send(
        &app,
        "POST",
        "/api/discussions",
        Some(&session),
        Some(json!({ "title": "", "body": "x" })),
    )
    .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert!(invalid.body["data"].get("title").is_some());

    let blank = send(
        &app,
        "POST",
        "/api/discussions",
        Some(&session),
        Some(json!({ "title": "   ", "body": "x" })),
    )
    .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.body["data"]["title"][0], "Required");

    let discussion = create_discussion(&app, &session, "Roadmap").await;
    assert_eq!(discussion.team_id, admin.team_id);
    assert_eq!(discussion.author.as_ref().unwrap().id, admin.id);

    let uri = format!("/api/discussions/{}", discussion.id);

    let fetched = send(&app, "GET", &uri, Some(&session), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["title"], "Roadmap");
    assert_eq!(fetched.body["author"]["email"], "admin@example.com");

    let updated = send(
        &app,
        "PATCH",
        &uri,
        Some(&session),
        Some(json!({ "title": "Roadmap 2" })),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["title"], "Roadmap 2");
    assert_eq!(updated.body["body"], "Let's talk");

    let blank = send(
        &app,
        "PATCH",
        &uri,
        Some(&session),
        Some(json!({ "title": "  " })),
    )
    .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.body["data"]["title"][0], "Required");

    let deleted = send(&app, "DELETE", &uri, Some(&session), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body, json!({ "success": true }));

    let gone = send(&app, "GET", &uri, Some(&session), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["statusMessage"], "Discussion not found");
}

#[tokio::test]
async fn test_user_cannot_update_or_delete_discussion() {
    let app = create_test_app().await;

    let (admin_session, admin) =
        register(&app, "admin@example.com", json!({ "teamName": "Acme" })).await;
    let (user_session, _) =
        register(&app, "user@example.com", json!({ "teamId": admin.team_id })).await;

    let discussion = create_discussion(&app, &admin_session, "Roadmap").await;
    let uri = format!("/api/discussions/{}", discussion.id);

    let response = send(
        &app,
        "PATCH",
        &uri,
        Some(&user_session),
        Some(json!({ "title": "Hijacked" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = send(&app, "DELETE", &uri, Some(&user_session), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    // Members can still read it
    let response = send(&app, "GET", &uri, Some(&user_session), None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_discussion_pagination() {
    let app = create_test_app().await;

    let (session, _) = register(&app, "admin@example.com", json!({ "teamName": "Acme" })).await;
    for i in 0..3 {
        create_discussion(&app, &session, &format!("Topic {i}")).await;
    }

    let response = send(
        &app,
        "GET",
        "/api/discussions?page=2&perPage=2",
        Some(&session),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let list: DiscussionList = serde_json::from_value(response.body).unwrap();
    assert_eq!(list.data.len(), 1);
    assert_eq!(
        list.meta,
        PageMeta {
            page: 2,
            total: 3,
            total_pages: 2
        }
    );
    assert!(list.data[0].author.is_some());
}

#[tokio::test]
async fn test_cross_team_access_is_not_found() {
    let app = create_test_app().await;

    let (acme_admin, acme) = register(&app, "a@example.com", json!({ "teamName": "Acme" })).await;
    let (globex_admin, globex) =
        register(&app, "g@example.com", json!({ "teamName": "Globex" })).await;
    let (globex_user, _) =
        register(&app, "gu@example.com", json!({ "teamId": globex.team_id })).await;

    let discussion = create_discussion(&app, &acme_admin, "Private").await;
    let comment = create_comment(&app, &acme_admin, discussion.id).await;
    assert_ne!(acme.team_id, globex.team_id);

    let discussion_uri = format!("/api/discussions/{}", discussion.id);
    let comment_uri = format!("/api/comments/{}", comment.id);

    for session in [&globex_admin, &globex_user] {
        let response = send(&app, "GET", &discussion_uri, Some(session), None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);

        let response = send(
            &app,
            "PATCH",
            &discussion_uri,
            Some(session),
            Some(json!({ "title": "x" })),
        )
        .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);

        let response = send(&app, "DELETE", &discussion_uri, Some(session), None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);

        let response = send(&app, "DELETE", &comment_uri, Some(session), None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);

        let list_uri = format!("/api/comments?discussionId={}", discussion.id);
        let response = send(&app, "GET", &list_uri, Some(session), None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    // Still there for its own team
    let response = send(&app, "GET", &discussion_uri, Some(&acme_admin), None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_comment_delete_by_non_author_user_is_forbidden() {
    let app = create_test_app().await;

    let (admin_session, admin) =
        register(&app, "admin@example.com", json!({ "teamName": "Acme" })).await;
    let (author_session, _) =
        register(&app, "author@example.com", json!({ "teamId": admin.team_id })).await;
    let (other_session, _) =
        register(&app, "other@example.com", json!({ "teamId": admin.team_id })).await;

    let discussion = create_discussion(&app, &admin_session, "Roadmap").await;
    let comment = create_comment(&app, &author_session, discussion.id).await;
    let uri = format!("/api/comments/{}", comment.id);

    let response = send(&app, "DELETE", &uri, Some(&other_session), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["statusCode"], 403);

    let response = send(&app, "DELETE", &uri, Some(&author_session), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "success": true }));
}

#[tokio::test]
async fn test_admin_can_delete_any_comment() {
    let app = create_test_app().await;

    let (admin_session, admin) =
        register(&app, "admin@example.com", json!({ "teamName": "Acme" })).await;
    let (user_session, _) =
        register(&app, "user@example.com", json!({ "teamId": admin.team_id })).await;

    let discussion = create_discussion(&app, &admin_session, "Roadmap").await;
    let comment = create_comment(&app, &user_session, discussion.id).await;

    let uri = format!("/api/comments/{}", comment.id);
    let response = send(&app, "DELETE", &uri, Some(&admin_session), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "success": true }));

    let response = send(&app, "DELETE", &uri, Some(&admin_session), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comment_listing() {
    let app = create_test_app().await;

    let (admin_session, admin) =
        register(&app, "admin@example.com", json!({ "teamName": "Acme" })).await;
    let (user_session, _) =
        register(&app, "user@example.com", json!({ "teamId": admin.team_id })).await;

    let discussion = create_discussion(&app, &admin_session, "Roadmap").await;
    let first = create_comment(&app, &user_session, discussion.id).await;
    create_comment(&app, &admin_session, discussion.id).await;

    let uri = format!("/api/comments?discussionId={}", discussion.id);
    let response = send(&app, "GET", &uri, Some(&user_session), None).await;
    assert_eq!(response.status, StatusCode::OK);

    let list: CommentList = serde_json::from_value(response.body).unwrap();
    assert_eq!(list.meta.total, 2);
    assert_eq!(list.data[0].id, first.id);
    assert_eq!(
        list.data[0].author.as_ref().unwrap().email,
        "user@example.com"
    );

    // discussionId is required
    let response = send(&app, "GET", "/api/comments", Some(&user_session), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_comment_on_missing_discussion() {
    let app = create_test_app().await;

    let (session, _) = register(&app, "a@example.com", json!({ "teamName": "Acme" })).await;

    let response = send(
        &app,
        "POST",
        "/api/comments",
        Some(&session),
        Some(json!({ "discussionId": uuid::Uuid::new_v4(), "body": "Hello?" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = create_test_app().await;

    let request = Request::builder()
        .uri("/api/auth/login")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(body.status_code, 400);
    assert!(body.data.unwrap().get("_schema").is_some());
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = create_test_app().await;

    let response = send(&app, "GET", "/api/openapi.json", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["paths"].get("/api/auth/register").is_some());

    // Path ids are documented as UUIDs
    for (path, method) in [
        ("/api/users/{id}", "delete"),
        ("/api/discussions/{id}", "patch"),
        ("/api/comments/{id}", "delete"),
    ] {
        let param = &response.body["paths"][path][method]["parameters"][0];
        assert_eq!(param["name"], "id");
        assert_eq!(param["schema"]["format"], "uuid", "{path}");
    }
}
