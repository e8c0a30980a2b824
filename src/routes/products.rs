use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    error::Result,
    models::{ActionResponse, Product},
    queries::product_queries,
};

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ActionResponse<Vec<Product>>>> {
    let products = product_queries::list_products(state.store.as_ref()).await?;

    Ok(Json(ActionResponse::ok(products)))
}

pub async fn get_product_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ActionResponse<Product>>> {
    let product = product_queries::find_by_slug(state.store.as_ref(), &slug).await?;

    Ok(Json(ActionResponse::ok(product)))
}
