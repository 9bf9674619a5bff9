// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use validator::Validate;

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    Display,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProductStatus {
    Draft,
    Live,
    Archived,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub mrp: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub selling_price: f64,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    pub status: ProductStatus,
    #[serde(default)]
    pub box_number: Option<String>,
    #[serde(default)]
    pub flagged: bool,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub product_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prompt {
    pub id: i64,
    pub name: String,
    pub text: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// Katalog PDF generowany po stronie serwera.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub product_count: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Zamówienie ze sklepu (kwoty przychodzą jako tekst).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub financial_status: Option<String>,
    #[serde(default)]
    pub fulfillment_status: Option<String>,
    pub total_price: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub line_items: Vec<OrderLineItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLineItem {
    #[serde(default)]
    pub sku: Option<String>,
    pub title: String,
    pub quantity: i64,
    pub price: String,
}

/// Oferta z kanału Amazon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelListing {
    pub asin: String,
    pub sku: String,
    pub title: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Surowe zdjęcie czekające na klasyfikację.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawImage {
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub box_number: Option<String>,
    #[serde(default)]
    pub classified: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// --- STRUKTURY PAYLOAD ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct CreateProductPayload {
    #[validate(length(min = 1, max = 64, message = "SKU jest wymagane"))]
    pub sku: String,

    #[validate(length(min = 1, max = 255, message = "Nazwa produktu jest wymagana"))]
    pub name: String,

    #[validate(length(min = 1, message = "Kategoria jest wymagana"))]
    pub category: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[validate(range(min = 0.0, message = "Cena nie może być ujemna"))]
    pub mrp: f64,

    #[validate(range(min = 0.0, max = 100.0, message = "Rabat musi mieścić się w 0-100"))]
    pub discount: f64,

    pub selling_price: f64,

    #[validate(range(min = 0, message = "Stan magazynowy nie może być ujemny"))]
    pub stock_quantity: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_number: Option<String>,

    #[validate(length(min = 1, message = "Wymagane jest co najmniej jedno zdjęcie"))]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct BulkProductsPayload {
    #[validate(length(min = 1, message = "Lista produktów jest pusta"), nested)]
    pub products: Vec<CreateProductPayload>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BulkCreateResult {
    pub created: i64,
    #[serde(default)]
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateStatusPayload {
    pub status: ProductStatus,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct UpdateStockPayload {
    pub in_stock: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "Stan magazynowy nie może być ujemny"))]
    pub stock_quantity: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct CategoryPayload {
    #[validate(length(min = 1, max = 100, message = "Nazwa kategorii jest wymagana"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct PromptPayload {
    #[validate(length(min = 1, max = 100, message = "Nazwa promptu jest wymagana"))]
    pub name: String,
    #[validate(length(min = 1, message = "Treść promptu jest wymagana"))]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct GenerateImagePayload {
    pub prompt_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Niepoprawny adres zdjęcia źródłowego"))]
    pub source_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct PresignedUrlRequest {
    #[validate(length(min = 1, message = "Nazwa pliku jest wymagana"))]
    pub filename: String,
    #[validate(length(min = 1, message = "Typ zawartości jest wymagany"))]
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignedUrlResponse {
    pub upload_url: String,
    pub public_url: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn product_status_parses_case_insensitively() {
        assert_eq!(ProductStatus::from_str("LIVE").unwrap(), ProductStatus::Live);
        assert_eq!(ProductStatus::Archived.to_string(), "archived");
        assert_eq!(
            serde_json::to_string(&ProductStatus::Draft).unwrap(),
            "\"draft\""
        );
    }

    #[test]
    fn every_status_matches_its_wire_form() {
        for status in ProductStatus::iter() {
            let wire = serde_json::to_value(status).unwrap();
            assert_eq!(wire.as_str(), Some(status.as_ref()));
            assert_eq!(ProductStatus::from_str(status.as_ref()).unwrap(), status);
        }
    }

    #[test]
    fn product_tolerates_missing_optional_fields() {
        let json = r#"{"id": 7, "sku": "SKU-7", "name": "Lampa", "category": "Dom",
                       "mrp": 120.5, "status": "live"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 7);
        assert!(!product.in_stock);
        assert!(product.tags.is_empty());
        assert_eq!(product.box_number, None);
    }

    #[test]
    fn bulk_payload_validates_each_product() {
        let bad = CreateProductPayload {
            sku: String::new(),
            name: "Kubek".to_string(),
            category: "Kuchnia".to_string(),
            description: None,
            tags: vec![],
            mrp: 10.0,
            discount: 0.0,
            selling_price: 10.0,
            stock_quantity: 1,
            box_number: None,
            images: vec!["https://cdn.example/kubek.jpg".to_string()],
        };
        let payload = BulkProductsPayload {
            products: vec![bad],
        };
        assert!(payload.validate().is_err());

        let empty = BulkProductsPayload { products: vec![] };
        assert!(empty.validate().is_err());
    }
}
