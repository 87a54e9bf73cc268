//! Handler tests over in-memory state.

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::{App, test, web};
use serde_json::{Value, json};
use uuid::Uuid;

use gazette_infra::database::memory::{
    InMemoryPostRepository, InMemoryStore, InMemoryUserRepository,
};
use gazette_infra::{Argon2PasswordService, JwtConfig, JwtTokenService, LocalImageStore};

use crate::config::AppConfig;
use crate::state::AppState;

const BOUNDARY: &str = "gazette-test-boundary";

fn test_config(upload_dir: PathBuf) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: None,
        upload_dir,
        max_image_bytes: 1024 * 1024,
    }
}

fn test_state(config: &AppConfig) -> AppState {
    let store = InMemoryStore::new();
    AppState {
        users: Arc::new(InMemoryUserRepository::new(store.clone())),
        posts: Arc::new(InMemoryPostRepository::new(store)),
        images: Arc::new(LocalImageStore::new(&config.upload_dir, "/uploads")),
        tokens: Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
            issuer: "gazette-test".to_string(),
        })),
        passwords: Arc::new(Argon2PasswordService::new()),
    }
}

fn fresh_upload_dir() -> PathBuf {
    std::env::temp_dir().join(format!("gazette-test-{}", Uuid::new_v4()))
}

/// A multipart body with the given text fields and an optional image part.
fn multipart_body(
    fields: &[(&str, &str)],
    image: Option<(&str, &str, &[u8])>,
) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (
        format!("multipart/form-data; boundary={BOUNDARY}"),
        body,
    )
}

fn png_image() -> (&'static str, &'static str, &'static [u8]) {
    ("cover.png", "image/png", &[0x89, 0x50, 0x4e, 0x47])
}

macro_rules! init_app {
    ($state:expr, $config:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::Data::new($config))
                .configure(super::configure_routes),
        )
        .await
    };
}

/// Register an account through the API and return its bearer token.
macro_rules! register {
    ($app:expr, $name:expr, $email:expr, $role:expr) => {{
        let mut payload = json!({
            "name": $name,
            "email": $email,
            "password": "password123",
        });
        if let Some(role) = $role {
            payload["role"] = json!(role);
        }
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), 201, "registration should succeed");
        let body: Value = test::read_body_json(resp).await;
        body["access_token"].as_str().unwrap().to_string()
    }};
}

/// Submit a valid pending post and return its id.
macro_rules! submit_post {
    ($app:expr, $token:expr, $title:expr) => {{
        let (content_type, body) = multipart_body(
            &[
                ("title", $title),
                ("content", "<p>Ownership and borrowing.</p>"),
                ("category", "IT"),
                ("tags", "rust,systems"),
            ],
            Some(png_image()),
        );
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(("authorization", format!("Bearer {}", $token)))
            .insert_header(("content-type", content_type))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), 201, "submission should succeed");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["status"], "pending");
        body["data"]["id"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn register_login_and_duplicate_email() {
    let config = test_config(fresh_upload_dir());
    let state = test_state(&config);
    let app = init_app!(state, config);

    let token = register!(app, "Ada", "ada@example.com", None::<&str>);
    assert!(!token.is_empty());

    // Second registration with the same email conflicts.
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "name": "Imposter",
            "email": "ada@example.com",
            "password": "password123",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);

    // Wrong password is an authentication failure.
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "ada@example.com", "password": "wrong-password"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    // Correct password logs in and echoes the identity.
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "ada@example.com", "password": "password123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["token_type"], "Bearer");
}

#[actix_web::test]
async fn registration_validation_lists_every_field() {
    let config = test_config(fresh_upload_dir());
    let state = test_state(&config);
    let app = init_app!(state, config);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({"name": "", "email": "nope", "password": "123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);

    let body: Value = test::read_body_json(resp).await;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "email", "password"]);
}

#[actix_web::test]
async fn submission_requires_credentials() {
    let config = test_config(fresh_upload_dir());
    let state = test_state(&config);
    let app = init_app!(state, config);

    let (content_type, body) = multipart_body(&[("title", "No token")], Some(png_image()));
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn submission_validation_names_every_violated_field() {
    let config = test_config(fresh_upload_dir());
    let state = test_state(&config);
    let app = init_app!(state, config);

    let token = register!(app, "Ada", "ada@example.com", None::<&str>);

    // Missing title and an out-of-range category, valid image.
    let (content_type, body) = multipart_body(
        &[("content", "body"), ("category", "Other")],
        Some(png_image()),
    );
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("authorization", format!("Bearer {token}")))
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);

    let body: Value = test::read_body_json(resp).await;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"category"));
}

#[actix_web::test]
async fn non_image_upload_is_rejected() {
    let config = test_config(fresh_upload_dir());
    let state = test_state(&config);
    let app = init_app!(state, config);

    let token = register!(app, "Ada", "ada@example.com", None::<&str>);

    let (content_type, body) = multipart_body(
        &[("title", "t"), ("content", "c"), ("category", "IT")],
        Some(("cover.gif", "image/gif", b"GIF89a")),
    );
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("authorization", format!("Bearer {token}")))
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"][0]["field"], "image");
}

#[actix_web::test]
async fn moderation_flow_controls_visibility() {
    let config = test_config(fresh_upload_dir());
    let state = test_state(&config);
    let app = init_app!(state, config);

    let admin = register!(app, "Moderator", "admin@example.com", Some("admin"));
    let author = register!(app, "Author", "author@example.com", None::<&str>);
    let outsider = register!(app, "Outsider", "outsider@example.com", None::<&str>);

    let post_id = submit_post!(app, author, "Intro to Rust");

    // Nothing pending is publicly listed.
    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["total_pages"], 0);

    // Non-admins cannot moderate.
    for token in [&author, &outsider] {
        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{post_id}/approve"))
            .insert_header(("authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
    }

    // Admin approval, twice - the second call is a no-op success.
    for _ in 0..2 {
        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{post_id}/approve"))
            .insert_header(("authorization", format!("Bearer {admin}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }

    // The approved post is now publicly listed with its owner annotation.
    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["title"], "Intro to Rust");
    assert_eq!(body["items"][0]["status"], "approved");
    assert_eq!(body["items"][0]["owner"]["email"], "author@example.com");
    assert_eq!(body["total_pages"], 1);

    // A non-owner, non-admin edit is denied and changes nothing.
    let (content_type, body) = multipart_body(&[("title", "Hack")], None);
    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{post_id}"))
        .insert_header(("authorization", format!("Bearer {outsider}")))
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{post_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Intro to Rust");

    // The owner's own edit succeeds and does not reset the status.
    let (content_type, body) = multipart_body(&[("title", "Intro to Rust, revised")], None);
    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{post_id}"))
        .insert_header(("authorization", format!("Bearer {author}")))
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Intro to Rust, revised");
    assert_eq!(body["status"], "approved");

    // The moderation queue shows owner details; it is admin-only.
    let req = test::TestRequest::get()
        .uri("/api/posts/admin/all")
        .insert_header(("authorization", format!("Bearer {admin}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"][0]["owner"]["role"], "user");

    let req = test::TestRequest::get()
        .uri("/api/posts/admin/all")
        .insert_header(("authorization", format!("Bearer {author}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    // Deletion is admin-only and permanent.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{post_id}"))
        .insert_header(("authorization", format!("Bearer {outsider}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{post_id}"))
        .insert_header(("authorization", format!("Bearer {admin}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{post_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn pending_posts_are_fetchable_by_direct_link() {
    let config = test_config(fresh_upload_dir());
    let state = test_state(&config);
    let app = init_app!(state, config);

    let author = register!(app, "Author", "author@example.com", None::<&str>);
    let post_id = submit_post!(app, author, "Unreviewed");

    // The detail view is status-blind by design.
    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{post_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "pending");
}

#[actix_web::test]
async fn unknown_post_is_not_found() {
    let config = test_config(fresh_upload_dir());
    let state = test_state(&config);
    let app = init_app!(state, config);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn purge_is_admin_only() {
    let config = test_config(fresh_upload_dir());
    let state = test_state(&config);
    let app = init_app!(state, config);

    let admin = register!(app, "Moderator", "admin@example.com", Some("admin"));
    let author = register!(app, "Author", "author@example.com", None::<&str>);
    submit_post!(app, author, "Doomed");

    let req = test::TestRequest::delete()
        .uri("/api/posts/purge")
        .insert_header(("authorization", format!("Bearer {author}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    let req = test::TestRequest::delete()
        .uri("/api/posts/purge")
        .insert_header(("authorization", format!("Bearer {admin}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri("/api/posts/admin/all")
        .insert_header(("authorization", format!("Bearer {admin}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}
