use std::collections::HashMap;

use axum::{
    Form, Json,
    extract::{Multipart, Path, State},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    AppState,
    error::{AppError, Result},
    forms::{ProductField, ProductForm, SubmitOutcome},
    models::{
        ActionResponse, DeleteTarget, MonthlyUsers, NewUser, Product, ProductGrowth,
        ProductStats, User, UserRequest, UserStats,
    },
    queries::{
        product_queries,
        user_queries::{self, AdminDeletion},
    },
    services::{
        media_service::{self, MediaFile, UploadProgress},
        stats_service,
    },
};

/// Body key asking an edit to re-derive the slug from the name.
const REGENERATE_SLUG: &str = "regenerate_slug";

#[derive(Debug, Serialize)]
pub struct SavedProduct {
    pub product: Product,
    pub redirect: String,
}

#[derive(Debug, Serialize)]
pub struct UploadedMedia {
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub progress: Vec<UploadProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

//PRODUCT ROUTES
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ActionResponse<Vec<Product>>>> {
    let products = product_queries::list_products(state.store.as_ref()).await?;

    Ok(Json(ActionResponse::ok(products)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse<Product>>> {
    let product = product_queries::get_product(state.store.as_ref(), &id).await?;

    Ok(Json(ActionResponse::ok(product)))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<ActionResponse<SavedProduct>>> {
    let mut form = ProductForm::create();
    apply_fields(&mut form, &payload)?;

    let outcome = form.submit(state.store.as_ref(), &state.pages).await;

    Ok(Json(ActionResponse::ok(saved(outcome)?)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<ActionResponse<SavedProduct>>> {
    let product = product_queries::get_product(state.store.as_ref(), &id).await?;

    let mut form = ProductForm::edit(product);
    apply_fields(&mut form, &payload)?;
    if payload.get(REGENERATE_SLUG).and_then(Value::as_bool) == Some(true) {
        form.regenerate_slug();
    }

    let outcome = form.submit(state.store.as_ref(), &state.pages).await;

    Ok(Json(ActionResponse::ok(saved(outcome)?)))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse<()>>> {
    product_queries::delete_product(state.store.as_ref(), &state.pages, &DeleteTarget::Id(id))
        .await?;

    Ok(Json(ActionResponse::done()))
}

pub async fn delete_product_form(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Json<ActionResponse<()>>> {
    product_queries::delete_product(
        state.store.as_ref(),
        &state.pages,
        &DeleteTarget::Form(fields),
    )
    .await?;

    Ok(Json(ActionResponse::done()))
}

/// Multipart body: a `name` text part followed by the files, uploaded in
/// the order they appear. A failure after some files went through still
/// returns the attached URLs alongside the error.
pub async fn upload_product_media(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ActionResponse<UploadedMedia>>> {
    let mut form = ProductForm::create();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let part_name = field.name().unwrap_or_default().to_string();

        if part_name == "name" {
            let name = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid product name: {}", e)))?;
            form.set_field(ProductField::Name, &name);
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read {}: {}", file_name, e)))?;

        files.push(MediaFile {
            file_name,
            content_type,
            bytes,
        });
    }

    let mut progress = Vec::new();
    let result = media_service::upload_media(state.objects.as_ref(), &mut form, files, |p| {
        progress.push(p)
    })
    .await;

    let error = match result {
        Ok(_) => None,
        Err(e) if progress.is_empty() => return Err(e),
        Err(e) => Some(e.user_message()),
    };

    Ok(Json(ActionResponse::ok(UploadedMedia {
        images: form.images().to_vec(),
        videos: form.videos().to_vec(),
        progress,
        error,
    })))
}

//STATS ROUTES
pub async fn product_stats(
    State(state): State<AppState>,
) -> Result<Json<ActionResponse<ProductStats>>> {
    let stats = stats_service::load_product_stats(state.store.as_ref()).await?;

    Ok(Json(ActionResponse::ok(stats)))
}

pub async fn product_growth(
    State(state): State<AppState>,
) -> Result<Json<ActionResponse<ProductGrowth>>> {
    let growth = stats_service::load_product_growth(state.store.as_ref()).await?;

    Ok(Json(ActionResponse::ok(growth)))
}

pub async fn user_stats(State(state): State<AppState>) -> Result<Json<ActionResponse<UserStats>>> {
    let stats = stats_service::load_user_stats(state.store.as_ref()).await?;

    Ok(Json(ActionResponse::ok(stats)))
}

pub async fn user_growth(
    State(state): State<AppState>,
) -> Result<Json<ActionResponse<Vec<MonthlyUsers>>>> {
    let growth = stats_service::load_user_growth(state.store.as_ref()).await?;

    Ok(Json(ActionResponse::ok(growth)))
}

//USER ROUTES
pub async fn list_users(State(state): State<AppState>) -> Result<Json<ActionResponse<Vec<User>>>> {
    let users = user_queries::list_users(state.store.as_ref()).await?;

    Ok(Json(ActionResponse::ok(users)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse<User>>> {
    let user = user_queries::get_user(state.store.as_ref(), &id).await?;

    Ok(Json(ActionResponse::ok(user)))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> Result<Json<ActionResponse<User>>> {
    if payload.name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(AppError::BadRequest("Name and email are required".to_string()));
    }

    let user = user_queries::create_user(state.store.as_ref(), &state.pages, &payload).await?;

    Ok(Json(ActionResponse::ok(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UserRequest>,
) -> Result<Json<ActionResponse<User>>> {
    let user = user_queries::update_user(state.store.as_ref(), &state.pages, &id, &payload).await?;

    Ok(Json(ActionResponse::ok(user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse<AdminDeletion>>> {
    let deletion =
        user_queries::delete_user(state.store.as_ref(), &state.pages, &DeleteTarget::Id(id))
            .await?;

    Ok(Json(ActionResponse::ok(deletion)))
}

pub async fn delete_user_form(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Json<ActionResponse<AdminDeletion>>> {
    let deletion = user_queries::delete_user(
        state.store.as_ref(),
        &state.pages,
        &DeleteTarget::Form(fields),
    )
    .await?;

    Ok(Json(ActionResponse::ok(deletion)))
}

fn apply_fields(form: &mut ProductForm, payload: &Map<String, Value>) -> Result<()> {
    for (key, value) in payload {
        if key == "id" || key == REGENERATE_SLUG {
            continue;
        }
        let field: ProductField = key.parse()?;
        match value {
            Value::Array(items) => form.set_list(field, items.iter().map(input_text).collect()),
            other => form.set_field(field, &input_text(other)),
        }
    }
    Ok(())
}

/// The text a form input would hold for a scalar JSON value.
fn input_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn saved(outcome: SubmitOutcome) -> Result<SavedProduct> {
    match outcome {
        SubmitOutcome::Saved { product, redirect } => Ok(SavedProduct { product, redirect }),
        SubmitOutcome::Invalid(errors) => Err(AppError::Validation(errors)),
        SubmitOutcome::Failed(message) => Err(AppError::Store(message)),
    }
}
