// tests/repository_tests.rs
mod common;
use common::*;

use glow_back::{
    models::{DeleteTarget, PRODUCTS, ProductPatch, Role, UserStatus},
    queries::{product_queries, user_queries},
    services::page_cache::{ADMIN_PRODUCTS, ADMIN_USERS, PageCache},
    session::{Session, SessionUser},
    store::MemoryDocumentStore,
};
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::HashMap;

#[tokio::test]
async fn listed_products_default_missing_fields() {
    setup_tracing();
    let store = MemoryDocumentStore::new();
    seed_raw_product(&store, "bare", json!({ "name": "Bare" })).await;
    seed_raw_product(
        &store,
        "odd",
        json!({ "name": "Odd", "price": "19.90", "quantity": "7", "discount": null, "tags": "a, b" }),
    )
    .await;

    let products = product_queries::list_products(&store).await.unwrap();
    assert_eq!(products.len(), 2);

    let bare = &products[0].draft;
    assert_eq!(bare.quantity, 0);
    assert_eq!(bare.price, Decimal::ZERO);
    assert_eq!(bare.discount, Decimal::ZERO);
    assert_eq!(bare.min_stock_level, 0);
    assert_eq!(bare.max_stock_level, 0);
    assert_eq!(bare.sku, "");
    assert!(bare.images.is_empty());

    let odd = &products[1].draft;
    assert_eq!(odd.price, Decimal::new(1990, 2));
    assert_eq!(odd.quantity, 7);
    assert_eq!(odd.tags.encode(), "a,b");
}

#[tokio::test]
async fn list_fails_whole_when_store_is_down() {
    let store = MemoryDocumentStore::new();
    seed_product(&store, "p1", "Serum", "serum").await;
    store.set_available(false);

    let err = product_queries::list_products(&store).await.unwrap_err();
    assert_eq!(err.user_message(), "Failed to fetch products");
}

#[tokio::test]
async fn slug_lookup_returns_first_match_in_store_order() {
    let store = MemoryDocumentStore::new();
    seed_product(&store, "p1", "Toner", "toner").await;
    seed_product(&store, "p2", "Cream", "cream").await;
    seed_product(&store, "p3", "Cream Copy", "cream").await;

    let found = product_queries::find_by_slug(&store, "cream").await.unwrap();
    assert_eq!(found.id, "p2");

    let missing = product_queries::find_by_slug(&store, "mask").await.unwrap_err();
    assert!(missing.is_not_found());
}

#[tokio::test]
async fn update_of_missing_product_is_not_found() {
    let store = MemoryDocumentStore::new();
    let pages = PageCache::new();
    let err = product_queries::update_product(&store, &pages, "ghost", ProductPatch::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(pages.take_stale().is_empty());
}

#[tokio::test]
async fn slug_change_invalidates_old_and_new_pages() {
    let store = MemoryDocumentStore::new();
    let pages = PageCache::new();
    seed_product(&store, "p1", "Cream", "cream").await;

    let patch = ProductPatch {
        slug: Some("rich-cream".to_string()),
        ..Default::default()
    };
    let updated = product_queries::update_product(&store, &pages, "p1", patch)
        .await
        .unwrap();
    assert_eq!(updated.draft.slug, "rich-cream");
    assert_eq!(updated.draft.name, "Cream");

    assert!(pages.is_stale(ADMIN_PRODUCTS));
    assert!(pages.is_stale("/products/cream"));
    assert!(pages.is_stale("/products/rich-cream"));
    assert!(pages.is_stale("/admin/products/rich-cream"));
}

#[tokio::test]
async fn deleting_missing_id_leaves_collection_untouched() {
    let store = MemoryDocumentStore::new();
    let pages = PageCache::new();
    seed_product(&store, "p1", "A", "a").await;
    seed_product(&store, "p2", "B", "b").await;

    let err = product_queries::delete_product(&store, &pages, &DeleteTarget::from("nope"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(store.len(PRODUCTS), 2);

    let form = HashMap::from([("id".to_string(), "p1".to_string())]);
    product_queries::delete_product(&store, &pages, &DeleteTarget::Form(form))
        .await
        .unwrap();
    let left = product_queries::list_products(&store).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, "p2");
}

#[tokio::test]
async fn delete_without_id_is_rejected() {
    let store = MemoryDocumentStore::new();
    let err = product_queries::delete_product(
        &store,
        &PageCache::new(),
        &DeleteTarget::Form(HashMap::new()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.user_message(), "No product ID provided");
}

#[tokio::test]
async fn legacy_active_role_reads_as_active_user() {
    let store = MemoryDocumentStore::new();
    seed_user(&store, "u1", "active").await;
    seed_user(&store, "u2", "admin").await;

    let users = user_queries::list_users(&store).await.unwrap();
    assert_eq!(users[0].role, Role::User);
    assert_eq!(users[0].status, UserStatus::Active);
    assert_eq!(users[1].role, Role::Admin);
}

#[tokio::test]
async fn admin_deletion_keeps_identity_account() {
    let app = TestApp::new();
    let session = Session::new();
    let auth = app
        .state
        .auth_service()
        .register(&session, "Ana", "ana@example.com", "secret1")
        .await
        .unwrap();

    let deletion = user_queries::delete_user(
        app.store.as_ref(),
        &app.state.pages,
        &DeleteTarget::from(auth.uid.as_str()),
    )
    .await
    .unwrap();

    assert!(deletion.identity_account_retained);
    assert!(app.identity.deleted_accounts().is_empty());
    assert_eq!(app.identity.account_count(), 1);
    assert!(app.state.pages.is_stale(ADMIN_USERS));
    assert!(
        user_queries::find_by_id(app.store.as_ref(), &auth.uid)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn self_deletion_removes_identity_account() {
    let app = TestApp::new();
    let session = Session::new();
    let auth = app
        .state
        .auth_service()
        .register(&session, "Ben", "ben@example.com", "secret1")
        .await
        .unwrap();

    let restored = Session::restore(SessionUser {
        uid: auth.uid.clone(),
        email: auth.email.clone(),
        display_name: auth.name.clone(),
        role: auth.role,
        methods: session.current().unwrap().methods,
    });
    app.state
        .auth_service()
        .delete_own_account(&restored, Some("secret1"))
        .await
        .unwrap();

    assert_eq!(app.identity.deleted_accounts(), vec![auth.uid]);
    assert_eq!(app.identity.account_count(), 0);
    assert!(!restored.is_signed_in());
}
