use crate::{
    error::{AppError, Result},
    models::{DeleteTarget, PRODUCTS, Product, ProductDraft, ProductPatch},
    services::page_cache::PageCache,
    store::DocumentStore,
};

pub async fn list_products(store: &dyn DocumentStore) -> Result<Vec<Product>> {
    let docs = store
        .list(PRODUCTS)
        .await
        .map_err(|e| AppError::store("Failed to fetch products", e))?;

    Ok(docs.iter().map(Product::from_document).collect())
}

pub async fn find_by_id(store: &dyn DocumentStore, id: &str) -> Result<Option<Product>> {
    let doc = store
        .get(PRODUCTS, id)
        .await
        .map_err(|e| AppError::store("Failed to fetch product", e))?;

    Ok(doc.as_ref().map(Product::from_document))
}

pub async fn get_product(store: &dyn DocumentStore, id: &str) -> Result<Product> {
    find_by_id(store, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// Linear scan over the whole collection; the first product in store order
/// whose slug matches wins.
pub async fn find_by_slug(store: &dyn DocumentStore, slug: &str) -> Result<Product> {
    let docs = store
        .list(PRODUCTS)
        .await
        .map_err(|e| AppError::store("Failed to fetch product", e))?;

    docs.iter()
        .map(Product::from_document)
        .find(|product| product.draft.slug == slug)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

pub async fn create_product(
    store: &dyn DocumentStore,
    pages: &PageCache,
    draft: ProductDraft,
) -> Result<Product> {
    let id = store
        .insert(PRODUCTS, draft.to_fields())
        .await
        .map_err(|e| AppError::store("Failed to create product", e))?;

    tracing::info!("Created product {} ({})", id, draft.slug);

    pages.invalidate_product_lists();
    pages.invalidate_product(&draft.slug);

    Ok(Product { id, draft })
}

pub async fn update_product(
    store: &dyn DocumentStore,
    pages: &PageCache,
    id: &str,
    patch: ProductPatch,
) -> Result<Product> {
    let existing = store
        .get(PRODUCTS, id)
        .await
        .map_err(|e| AppError::store("Failed to update product", e))?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    let old_slug = Product::from_document(&existing).draft.slug;

    store
        .merge(PRODUCTS, id, patch.to_fields())
        .await
        .map_err(|e| AppError::store("Failed to update product", e))?;

    pages.invalidate_product_lists();
    pages.invalidate_product(&old_slug);
    if let Some(ref new_slug) = patch.slug {
        if *new_slug != old_slug {
            tracing::info!("Product {} slug changed: {} -> {}", id, old_slug, new_slug);
            pages.invalidate_product(new_slug);
        }
    }

    get_product(store, id).await
}

pub async fn delete_product(
    store: &dyn DocumentStore,
    pages: &PageCache,
    target: &DeleteTarget,
) -> Result<()> {
    let id = target
        .resolve_id()
        .ok_or_else(|| AppError::BadRequest("No product ID provided".to_string()))?;

    let existing = store
        .get(PRODUCTS, id)
        .await
        .map_err(|e| AppError::store("Failed to delete product", e))?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    store
        .delete(PRODUCTS, id)
        .await
        .map_err(|e| AppError::store("Failed to delete product", e))?;

    tracing::info!("Deleted product {}", id);

    pages.invalidate_product_lists();
    pages.invalidate_product(&Product::from_document(&existing).draft.slug);

    Ok(())
}
