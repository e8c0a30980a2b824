use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    models::{LabelSet, document::*},
    store::{Document, Fields},
};

pub const PRODUCTS: &str = "products";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(flatten)]
    pub draft: ProductDraft,
}

/// Every product attribute except the store-assigned id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    pub slug: String,
    pub name: String,
    pub sku: String,
    pub barcode: String,
    pub description: String,
    pub short_description: String,
    pub price: Decimal,
    pub cost_price: Decimal,
    pub wholesale_price: Decimal,
    pub category: String,
    pub sub_category: String,
    pub brand: String,
    pub manufacturer: String,
    pub volume: f64,
    pub weight: f64,
    pub dimensions: String,
    pub min_stock_level: i64,
    pub max_stock_level: i64,
    pub quantity: i64,
    pub discount: Decimal,
    pub tax_rate: String,
    pub shipping_class: String,
    pub skin_type: LabelSet,
    pub benefits: LabelSet,
    pub ingredients: LabelSet,
    pub expiry_date: String,
    pub manufacturing_date: String,
    pub warranty: String,
    pub badge: String,
    pub meta_title: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub tags: LabelSet,
    pub images: Vec<String>,
    pub videos: Vec<String>,
}

/// Partial update; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wholesale_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stock_level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_stock_level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skin_type: Option<LabelSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefits: Option<LabelSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<LabelSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturing_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warranty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<LabelSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<String>>,
}

impl Product {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            draft: ProductDraft::from_fields(&doc.data),
        }
    }

    /// First image is the primary picture, the second the hover preview.
    pub fn primary_image(&self) -> Option<&str> {
        self.draft.images.first().map(String::as_str)
    }

    pub fn hover_image(&self) -> Option<&str> {
        self.draft.images.get(1).map(String::as_str)
    }
}

impl ProductDraft {
    pub fn from_fields(data: &Fields) -> Self {
        Self {
            slug: string_field(data, "slug"),
            name: string_field(data, "name"),
            sku: string_field(data, "sku"),
            barcode: string_field(data, "barcode"),
            description: string_field(data, "description"),
            short_description: string_field(data, "short_description"),
            price: decimal_field(data, "price"),
            cost_price: decimal_field(data, "cost_price"),
            wholesale_price: decimal_field(data, "wholesale_price"),
            category: string_field(data, "category"),
            sub_category: string_field(data, "sub_category"),
            brand: string_field(data, "brand"),
            manufacturer: string_field(data, "manufacturer"),
            volume: number_field(data, "volume"),
            weight: number_field(data, "weight"),
            dimensions: string_field(data, "dimensions"),
            min_stock_level: integer_field(data, "min_stock_level"),
            max_stock_level: integer_field(data, "max_stock_level"),
            quantity: integer_field(data, "quantity"),
            discount: decimal_field(data, "discount"),
            tax_rate: string_field(data, "tax_rate"),
            shipping_class: string_field(data, "shipping_class"),
            skin_type: LabelSet::parse(&string_field(data, "skin_type")),
            benefits: LabelSet::parse(&string_field(data, "benefits")),
            ingredients: LabelSet::parse(&string_field(data, "ingredients")),
            expiry_date: string_field(data, "expiry_date"),
            manufacturing_date: string_field(data, "manufacturing_date"),
            warranty: string_field(data, "warranty"),
            badge: string_field(data, "badge"),
            meta_title: string_field(data, "meta_title"),
            meta_description: string_field(data, "meta_description"),
            meta_keywords: string_field(data, "meta_keywords"),
            tags: LabelSet::parse(&string_field(data, "tags")),
            images: string_list(data, "images"),
            videos: string_list(data, "videos"),
        }
    }

    pub fn to_fields(&self) -> Fields {
        to_fields(self)
    }
}

impl ProductPatch {
    pub fn to_fields(&self) -> Fields {
        to_fields(self)
    }
}

impl From<ProductDraft> for ProductPatch {
    fn from(d: ProductDraft) -> Self {
        Self {
            slug: Some(d.slug),
            name: Some(d.name),
            sku: Some(d.sku),
            barcode: Some(d.barcode),
            description: Some(d.description),
            short_description: Some(d.short_description),
            price: Some(d.price),
            cost_price: Some(d.cost_price),
            wholesale_price: Some(d.wholesale_price),
            category: Some(d.category),
            sub_category: Some(d.sub_category),
            brand: Some(d.brand),
            manufacturer: Some(d.manufacturer),
            volume: Some(d.volume),
            weight: Some(d.weight),
            dimensions: Some(d.dimensions),
            min_stock_level: Some(d.min_stock_level),
            max_stock_level: Some(d.max_stock_level),
            quantity: Some(d.quantity),
            discount: Some(d.discount),
            tax_rate: Some(d.tax_rate),
            shipping_class: Some(d.shipping_class),
            skin_type: Some(d.skin_type),
            benefits: Some(d.benefits),
            ingredients: Some(d.ingredients),
            expiry_date: Some(d.expiry_date),
            manufacturing_date: Some(d.manufacturing_date),
            warranty: Some(d.warranty),
            badge: Some(d.badge),
            meta_title: Some(d.meta_title),
            meta_description: Some(d.meta_description),
            meta_keywords: Some(d.meta_keywords),
            tags: Some(d.tags),
            images: Some(d.images),
            videos: Some(d.videos),
        }
    }
}

fn to_fields<T: Serialize>(value: &T) -> Fields {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Fields::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn label_sets_are_comma_joined_at_the_storage_boundary() {
        let mut draft = ProductDraft::default();
        draft.tags = LabelSet::parse("vegan,spf");
        let fields = draft.to_fields();
        assert_eq!(fields["tags"], json!("vegan,spf"));
        assert_eq!(ProductDraft::from_fields(&fields).tags, draft.tags);
    }

    #[test]
    fn patch_serializes_only_supplied_fields() {
        let patch = ProductPatch {
            quantity: Some(4),
            ..Default::default()
        };
        let fields = patch.to_fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["quantity"], json!(4));
    }

    #[test]
    fn image_order_is_significant() {
        let product = Product {
            id: "p1".to_string(),
            draft: ProductDraft {
                images: vec!["front.png".to_string(), "back.png".to_string()],
                ..Default::default()
            },
        };
        assert_eq!(product.primary_image(), Some("front.png"));
        assert_eq!(product.hover_image(), Some("back.png"));
    }
}
