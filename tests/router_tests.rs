// tests/router_tests.rs
mod common;
use common::*;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use glow_back::models::{PRODUCTS, Role, USERS};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn send(router: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_and_readiness() {
    let app = TestApp::new();
    let (status, body) = send(app.router(), get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    app.store.set_available(false);
    let (status, _) = send(app.router(), get("/health/ready", None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn storefront_reads_products_by_slug() {
    let app = TestApp::new();
    seed_product(app.store.as_ref(), "p1", "Glow Serum", "glow-serum").await;

    let (status, body) = send(app.router(), get("/products", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(app.router(), get("/products/glow-serum", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], "p1");

    let (status, body) = send(app.router(), get("/products/missing", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
async fn admin_routes_require_admin_token() {
    let app = TestApp::new();
    let (status, _) = send(app.router(), get("/admin/products", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user_token = app.token_for("u1", Role::User);
    let (status, body) = send(app.router(), get("/admin/products", Some(&user_token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");

    let admin_token = app.admin_token().await;
    let (status, _) = send(app.router(), get("/admin/products", Some(&admin_token))).await;
    assert_eq!(status, StatusCode::OK);

    let stale_claim = app.token_for("ghost", Role::Admin);
    let (status, _) = send(app.router(), get("/admin/products", Some(&stale_claim))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn demoted_or_removed_admin_loses_access() {
    let app = TestApp::new();
    let token = app.admin_token().await;
    seed_user(app.store.as_ref(), "boss", "admin").await;
    seed_user(app.store.as_ref(), "lead", "admin").await;
    let boss_token = app.token_for("boss", Role::Admin);
    let lead_token = app.token_for("lead", Role::Admin);

    let (status, _) = send(app.router(), get("/admin/users", Some(&boss_token))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        app.router(),
        json_request("PUT", "/admin/users/lead", Some(&token), json!({ "role": "user" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(app.router(), get("/admin/users", Some(&lead_token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");

    let delete = Request::builder()
        .method("DELETE")
        .uri("/admin/users/boss")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app.router(), delete).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(app.router(), get("/admin/users", Some(&boss_token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn product_form_validation_over_http() {
    let app = TestApp::new();
    let token = app.admin_token().await;
    let mut payload = json!({
        "name": "Hydrating Night Cream",
        "sku": "HNC-1",
        "price": 0,
        "category": "moisturizers",
        "tags": ["night", "hydrating"],
    });

    let (status, body) = send(
        app.router(),
        json_request("POST", "/admin/products", Some(&token), payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["price"], "Valid price is required");
    assert_eq!(app.store.len(PRODUCTS), 0);

    payload["price"] = json!("24.90");
    let (status, body) = send(
        app.router(),
        json_request("POST", "/admin/products", Some(&token), payload),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["redirect"], "/admin/products");
    assert_eq!(body["data"]["product"]["slug"], "hydrating-night-cream");
    assert_eq!(body["data"]["product"]["tags"], "night,hydrating");
    assert!(app.state.pages.is_stale("/products/hydrating-night-cream"));

    let (status, _) = send(
        app.router(),
        get("/products/hydrating-night-cream", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_product_field_is_rejected() {
    let app = TestApp::new();
    let (status, body) = send(
        app.router(),
        json_request(
            "POST",
            "/admin/products",
            Some(&app.admin_token().await),
            json!({ "colour": "red" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown product field: colour");
}

#[tokio::test]
async fn update_and_delete_by_id() {
    let app = TestApp::new();
    let token = app.admin_token().await;
    seed_product(app.store.as_ref(), "p1", "Cream", "cream").await;
    seed_product(app.store.as_ref(), "p2", "Toner", "toner").await;

    let (status, body) = send(
        app.router(),
        json_request(
            "PUT",
            "/admin/products/p1",
            Some(&token),
            json!({ "name": "Rich Cream", "regenerate_slug": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["product"]["slug"], "rich-cream");

    let (status, _) = send(
        app.router(),
        json_request("PUT", "/admin/products/ghost", Some(&token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let delete = Request::builder()
        .method("POST")
        .uri("/admin/products/delete")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("id=p2"))
        .unwrap();
    let (status, _) = send(app.router(), delete).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store.len(PRODUCTS), 1);

    let delete = Request::builder()
        .method("DELETE")
        .uri("/admin/products/p2")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app.router(), delete).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn media_url_lists_are_stored_whole() {
    let app = TestApp::new();
    let token = app.admin_token().await;
    seed_product(app.store.as_ref(), "p1", "Cream", "cream").await;

    let (status, body) = send(
        app.router(),
        json_request(
            "PUT",
            "/admin/products/p1",
            Some(&token),
            json!({
                "images": [
                    "https://cdn.example.com/w_300,h_200/front.png",
                    "https://cdn.example.com/back.png",
                ],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["product"]["images"],
        json!([
            "https://cdn.example.com/w_300,h_200/front.png",
            "https://cdn.example.com/back.png",
        ])
    );
}

#[tokio::test]
async fn stats_endpoints_fail_closed() {
    let app = TestApp::new();
    let token = app.admin_token().await;
    seed_product(app.store.as_ref(), "p1", "Cream", "cream").await;

    let (status, body) = send(app.router(), get("/admin/stats/products", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["lowStock"], 0);

    app.store.set_collection_available(PRODUCTS, false);
    let (status, body) = send(
        app.router(),
        get("/admin/stats/products/growth", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch product growth data");
}

#[tokio::test]
async fn admin_user_deletion_reports_retained_account() {
    let app = TestApp::new();
    seed_user(app.store.as_ref(), "u1", "user").await;

    let delete = Request::builder()
        .method("DELETE")
        .uri("/admin/users/u1")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.admin_token().await))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app.router(), delete).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["identity_account_retained"], true);
    assert_eq!(app.store.len(USERS), 1);
}

#[tokio::test]
async fn register_profile_and_self_delete() {
    let app = TestApp::new();
    let (status, body) = send(
        app.router(),
        json_request(
            "POST",
            "/auth/register",
            None,
            json!({ "name": "Mia", "email": "mia@example.com", "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = send(app.router(), get("/profile", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "mia@example.com");
    assert_eq!(body["data"]["profile"]["status"], "active");

    let (status, body) = send(
        app.router(),
        json_request("DELETE", "/profile", Some(&token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password is required to delete your account");

    let (status, _) = send(
        app.router(),
        json_request("DELETE", "/profile", Some(&token), json!({ "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.identity.account_count(), 0);
    assert_eq!(app.store.len(USERS), 0);
}

#[tokio::test]
async fn login_errors_use_provider_messages() {
    let app = TestApp::new();
    let (status, body) = send(
        app.router(),
        json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "email": "nobody@example.com", "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["error"],
        "No account exists with this email. Please register first."
    );
}

#[tokio::test]
async fn media_upload_over_multipart() {
    let app = TestApp::new();
    let boundary = "glowboundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nNight Cream\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"front.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"clip.mp4\"\r\nContent-Type: video/mp4\r\n\r\nMP4DATA\r\n\
         --{b}--\r\n",
        b = boundary
    );
    let req = Request::builder()
        .method("POST")
        .uri("/admin/products/media")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.admin_token().await))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(app.router(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["images"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["videos"].as_array().unwrap().len(), 1);
    assert_eq!(app.objects.attempts().len(), 2);
}
