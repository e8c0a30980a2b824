mod admin;
mod google_auth;
mod health;
mod login;
mod products;
mod profile;
mod register;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::{
    AppState,
    middleware::{admin_middleware, auth_middleware},
};

pub fn create_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/products", get(products::list_products))
        .route("/products/{slug}", get(products::get_product_by_slug))
        .route("/auth/register", post(register::register_user))
        .route("/auth/login", post(login::login_user))
        .route("/auth/google", post(google_auth::google_auth));

    let profile_routes = Router::new()
        .route(
            "/profile",
            get(profile::get_profile).delete(profile::delete_profile),
        )
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route(
            "/admin/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route("/admin/products/delete", post(admin::delete_product_form))
        .route("/admin/products/media", post(admin::upload_product_media))
        .route(
            "/admin/products/{id}",
            get(admin::get_product)
                .put(admin::update_product)
                .delete(admin::delete_product),
        )
        .route("/admin/stats/products", get(admin::product_stats))
        .route("/admin/stats/products/growth", get(admin::product_growth))
        .route("/admin/stats/users", get(admin::user_stats))
        .route("/admin/stats/users/growth", get(admin::user_growth))
        .route(
            "/admin/users",
            get(admin::list_users).post(admin::create_user),
        )
        .route("/admin/users/delete", post(admin::delete_user_form))
        .route(
            "/admin/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route_layer(from_fn_with_state(state, admin_middleware));

    Router::new()
        .merge(public_routes)
        .merge(profile_routes)
        .merge(admin_routes)
}
