//! Create/edit controller for products.
//!
//! The form owns a `ProductDraft`, applies raw input to it, validates on
//! submit and dispatches to the product repository. Failed validation keeps
//! the form editable with every violated rule reported at once.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;

use crate::{
    error::AppError,
    forms::FieldErrors,
    models::{
        LabelSet, Product, ProductDraft, ProductPatch,
        document::{parse_decimal, parse_number},
    },
    queries::product_queries,
    services::page_cache::{ADMIN_PRODUCTS, PageCache},
    store::DocumentStore,
    utils::slug::slugify,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductField {
    Slug,
    Name,
    Sku,
    Barcode,
    Description,
    ShortDescription,
    Price,
    CostPrice,
    WholesalePrice,
    Category,
    SubCategory,
    Brand,
    Manufacturer,
    Volume,
    Weight,
    Dimensions,
    MinStockLevel,
    MaxStockLevel,
    Quantity,
    Discount,
    TaxRate,
    ShippingClass,
    SkinType,
    Benefits,
    Ingredients,
    ExpiryDate,
    ManufacturingDate,
    Warranty,
    Badge,
    MetaTitle,
    MetaDescription,
    MetaKeywords,
    Tags,
    Images,
    Videos,
}

const ALL_FIELDS: [ProductField; 35] = [
    ProductField::Slug,
    ProductField::Name,
    ProductField::Sku,
    ProductField::Barcode,
    ProductField::Description,
    ProductField::ShortDescription,
    ProductField::Price,
    ProductField::CostPrice,
    ProductField::WholesalePrice,
    ProductField::Category,
    ProductField::SubCategory,
    ProductField::Brand,
    ProductField::Manufacturer,
    ProductField::Volume,
    ProductField::Weight,
    ProductField::Dimensions,
    ProductField::MinStockLevel,
    ProductField::MaxStockLevel,
    ProductField::Quantity,
    ProductField::Discount,
    ProductField::TaxRate,
    ProductField::ShippingClass,
    ProductField::SkinType,
    ProductField::Benefits,
    ProductField::Ingredients,
    ProductField::ExpiryDate,
    ProductField::ManufacturingDate,
    ProductField::Warranty,
    ProductField::Badge,
    ProductField::MetaTitle,
    ProductField::MetaDescription,
    ProductField::MetaKeywords,
    ProductField::Tags,
    ProductField::Images,
    ProductField::Videos,
];

impl ProductField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductField::Slug => "slug",
            ProductField::Name => "name",
            ProductField::Sku => "sku",
            ProductField::Barcode => "barcode",
            ProductField::Description => "description",
            ProductField::ShortDescription => "short_description",
            ProductField::Price => "price",
            ProductField::CostPrice => "cost_price",
            ProductField::WholesalePrice => "wholesale_price",
            ProductField::Category => "category",
            ProductField::SubCategory => "sub_category",
            ProductField::Brand => "brand",
            ProductField::Manufacturer => "manufacturer",
            ProductField::Volume => "volume",
            ProductField::Weight => "weight",
            ProductField::Dimensions => "dimensions",
            ProductField::MinStockLevel => "min_stock_level",
            ProductField::MaxStockLevel => "max_stock_level",
            ProductField::Quantity => "quantity",
            ProductField::Discount => "discount",
            ProductField::TaxRate => "tax_rate",
            ProductField::ShippingClass => "shipping_class",
            ProductField::SkinType => "skin_type",
            ProductField::Benefits => "benefits",
            ProductField::Ingredients => "ingredients",
            ProductField::ExpiryDate => "expiry_date",
            ProductField::ManufacturingDate => "manufacturing_date",
            ProductField::Warranty => "warranty",
            ProductField::Badge => "badge",
            ProductField::MetaTitle => "meta_title",
            ProductField::MetaDescription => "meta_description",
            ProductField::MetaKeywords => "meta_keywords",
            ProductField::Tags => "tags",
            ProductField::Images => "images",
            ProductField::Videos => "videos",
        }
    }

    /// Fields whose input is coerced to a number.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ProductField::Price
                | ProductField::CostPrice
                | ProductField::WholesalePrice
                | ProductField::Volume
                | ProductField::Weight
                | ProductField::MinStockLevel
                | ProductField::MaxStockLevel
                | ProductField::Quantity
                | ProductField::Discount
        )
    }

    pub fn is_label_set(&self) -> bool {
        matches!(
            self,
            ProductField::SkinType
                | ProductField::Benefits
                | ProductField::Ingredients
                | ProductField::Tags
        )
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_FIELDS
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown product field: {}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Editing,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Invalid(FieldErrors),
    Failed(String),
    Saved { product: Product, redirect: String },
}

#[derive(Debug, Clone)]
pub struct ProductForm {
    mode: FormMode,
    state: FormState,
    draft: ProductDraft,
    errors: FieldErrors,
}

impl ProductForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            state: FormState::Idle,
            draft: ProductDraft::default(),
            errors: FieldErrors::new(),
        }
    }

    pub fn edit(product: Product) -> Self {
        Self {
            mode: FormMode::Edit(product.id),
            state: FormState::Idle,
            draft: product.draft,
            errors: FieldErrors::new(),
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn draft(&self) -> &ProductDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn images(&self) -> &[String] {
        &self.draft.images
    }

    pub fn videos(&self) -> &[String] {
        &self.draft.videos
    }

    pub(crate) fn attach_image(&mut self, url: String) {
        self.touch();
        self.draft.images.push(url);
    }

    pub(crate) fn attach_video(&mut self, url: String) {
        self.touch();
        self.draft.videos.push(url);
    }

    pub(crate) fn detach_image(&mut self, index: usize) -> Option<String> {
        self.touch();
        (index < self.draft.images.len()).then(|| self.draft.images.remove(index))
    }

    pub(crate) fn detach_video(&mut self, index: usize) -> Option<String> {
        self.touch();
        (index < self.draft.videos.len()).then(|| self.draft.videos.remove(index))
    }

    /// Applies raw input to one field and clears that field's error.
    ///
    /// Numeric fields parse leniently (malformed input becomes `0`, stock
    /// counts truncate). Label sets take comma-separated input and media
    /// lists one URL per line. In create mode a non-empty name also
    /// re-derives the slug.
    pub fn set_field(&mut self, field: ProductField, value: &str) {
        self.touch();
        self.errors.remove(field.as_str());

        let d = &mut self.draft;
        match field {
            ProductField::Slug => d.slug = value.to_string(),
            ProductField::Name => {
                d.name = value.to_string();
                if self.mode == FormMode::Create && !value.trim().is_empty() {
                    d.slug = slugify(value);
                }
            }
            ProductField::Sku => d.sku = value.to_string(),
            ProductField::Barcode => d.barcode = value.to_string(),
            ProductField::Description => d.description = value.to_string(),
            ProductField::ShortDescription => d.short_description = value.to_string(),
            ProductField::Price => d.price = parse_decimal(value),
            ProductField::CostPrice => d.cost_price = parse_decimal(value),
            ProductField::WholesalePrice => d.wholesale_price = parse_decimal(value),
            ProductField::Category => d.category = value.to_string(),
            ProductField::SubCategory => d.sub_category = value.to_string(),
            ProductField::Brand => d.brand = value.to_string(),
            ProductField::Manufacturer => d.manufacturer = value.to_string(),
            ProductField::Volume => d.volume = parse_number(value),
            ProductField::Weight => d.weight = parse_number(value),
            ProductField::Dimensions => d.dimensions = value.to_string(),
            ProductField::MinStockLevel => d.min_stock_level = parse_count(value),
            ProductField::MaxStockLevel => d.max_stock_level = parse_count(value),
            ProductField::Quantity => d.quantity = parse_count(value),
            ProductField::Discount => d.discount = parse_decimal(value),
            ProductField::TaxRate => d.tax_rate = value.to_string(),
            ProductField::ShippingClass => d.shipping_class = value.to_string(),
            ProductField::SkinType => d.skin_type = LabelSet::parse(value),
            ProductField::Benefits => d.benefits = LabelSet::parse(value),
            ProductField::Ingredients => d.ingredients = LabelSet::parse(value),
            ProductField::ExpiryDate => d.expiry_date = value.to_string(),
            ProductField::ManufacturingDate => d.manufacturing_date = value.to_string(),
            ProductField::Warranty => d.warranty = value.to_string(),
            ProductField::Badge => d.badge = value.to_string(),
            ProductField::MetaTitle => d.meta_title = value.to_string(),
            ProductField::MetaDescription => d.meta_description = value.to_string(),
            ProductField::MetaKeywords => d.meta_keywords = value.to_string(),
            ProductField::Tags => d.tags = LabelSet::parse(value),
            ProductField::Images => d.images = url_lines(value),
            ProductField::Videos => d.videos = url_lines(value),
        }
    }

    /// Sets a field from a list of entries. Media fields keep each entry
    /// whole and in order; scalar fields receive the entries comma-joined.
    pub fn set_list(&mut self, field: ProductField, entries: Vec<String>) {
        let entries: Vec<String> = entries
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();

        if !matches!(field, ProductField::Images | ProductField::Videos) && !field.is_label_set() {
            return self.set_field(field, &entries.join(","));
        }

        self.touch();
        self.errors.remove(field.as_str());
        match field {
            ProductField::Images => self.draft.images = entries,
            ProductField::Videos => self.draft.videos = entries,
            _ => {
                if let Some(set) = self.label_set_mut(field) {
                    *set = LabelSet::new();
                    for entry in &entries {
                        set.insert(entry);
                    }
                }
            }
        }
    }

    /// Adds one entry to a label-set field. Returns whether it was added.
    pub fn add_label(&mut self, field: ProductField, label: &str) -> bool {
        let added = match self.label_set_mut(field) {
            Some(set) => set.insert(label),
            None => return false,
        };
        if added {
            self.touch();
            self.errors.remove(field.as_str());
        }
        added
    }

    pub fn remove_label(&mut self, field: ProductField, index: usize) -> Option<String> {
        let removed = self.label_set_mut(field)?.remove_at(index);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    /// Re-derives the slug from the current name. Edit mode never does this
    /// implicitly since it changes the product's public URL.
    pub fn regenerate_slug(&mut self) {
        self.touch();
        self.draft.slug = slugify(&self.draft.name);
        self.errors.remove(ProductField::Slug.as_str());
    }

    /// Runs every rule and records all violations.
    pub fn validate(&mut self) -> bool {
        self.state = FormState::Validating;
        self.errors = validate_draft(&self.draft);
        self.errors.is_empty()
    }

    pub async fn submit(&mut self, store: &dyn DocumentStore, pages: &PageCache) -> SubmitOutcome {
        if !self.validate() {
            self.state = FormState::Editing;
            return SubmitOutcome::Invalid(self.errors.clone());
        }

        self.state = FormState::Submitting;

        let result = match &self.mode {
            FormMode::Create => {
                product_queries::create_product(store, pages, self.draft.clone()).await
            }
            FormMode::Edit(id) => {
                let patch = ProductPatch::from(self.draft.clone());
                product_queries::update_product(store, pages, id, patch).await
            }
        };

        match result {
            Ok(product) => {
                self.state = FormState::Succeeded;
                if self.mode == FormMode::Create {
                    self.mode = FormMode::Edit(product.id.clone());
                }
                SubmitOutcome::Saved {
                    product,
                    redirect: ADMIN_PRODUCTS.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!("Product form submission failed: {}", e);
                self.state = FormState::Failed;
                SubmitOutcome::Failed(e.user_message())
            }
        }
    }

    fn touch(&mut self) {
        if self.state != FormState::Submitting {
            self.state = FormState::Editing;
        }
    }

    fn label_set_mut(&mut self, field: ProductField) -> Option<&mut LabelSet> {
        match field {
            ProductField::SkinType => Some(&mut self.draft.skin_type),
            ProductField::Benefits => Some(&mut self.draft.benefits),
            ProductField::Ingredients => Some(&mut self.draft.ingredients),
            ProductField::Tags => Some(&mut self.draft.tags),
            _ => None,
        }
    }
}

pub fn validate_draft(draft: &ProductDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if draft.name.trim().is_empty() {
        errors.insert("name".to_string(), "Product name is required".to_string());
    }
    if draft.sku.trim().is_empty() {
        errors.insert("sku".to_string(), "SKU is required".to_string());
    }
    if draft.price <= Decimal::ZERO {
        errors.insert("price".to_string(), "Valid price is required".to_string());
    }
    if draft.category.trim().is_empty() {
        errors.insert("category".to_string(), "Category is required".to_string());
    }
    if draft.min_stock_level > draft.max_stock_level {
        errors.insert(
            "min_stock_level".to_string(),
            "Minimum stock cannot exceed maximum stock".to_string(),
        );
    }

    errors
}

fn parse_count(input: &str) -> i64 {
    parse_number(input).trunc() as i64
}

/// Media URLs may contain commas, so text input holds one URL per line.
fn url_lines(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
