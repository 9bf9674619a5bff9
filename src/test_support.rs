// src/test_support.rs
//
// Atrapa serwera API (axum) uruchamiana na losowym porcie w testach.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::client::HubClient;
use crate::config::HubConfig;
use crate::models::{Product, ProductStatus};

/// Uruchamia router i zwraca adres bazowy, np. `http://127.0.0.1:41234`.
pub async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("nie można powiązać portu testowego");
    let addr = listener.local_addr().expect("brak adresu lokalnego");
    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .await
            .expect("atrapa serwera przestała działać");
    });
    format!("http://{}", addr)
}

pub async fn client_for(router: Router) -> HubClient {
    let base_url = spawn(router).await;
    HubClient::new(&HubConfig::for_base_url(base_url)).expect("klient HTTP")
}

pub fn envelope(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

pub fn offset_envelope(data: Value, page: u32, pages: u32, per_page: u32, total: u64) -> Value {
    json!({
        "success": true,
        "data": data,
        "pagination": { "page": page, "pages": pages, "per_page": per_page, "total": total }
    })
}

pub fn failure(message: &str) -> Value {
    json!({ "success": false, "message": message })
}

pub fn sample_product(id: i64, in_stock: bool) -> Product {
    Product {
        id,
        sku: format!("SKU-{:03}", id),
        name: format!("Produkt {}", id),
        description: None,
        category: "Dom".to_string(),
        tags: vec![],
        mrp: 100.0,
        discount: 10.0,
        selling_price: 90.0,
        in_stock,
        stock_quantity: Some(if in_stock { 5 } else { 0 }),
        status: ProductStatus::Live,
        box_number: Some(format!("B-{}", id % 4)),
        flagged: false,
        images: vec![],
        created_at: None,
        updated_at: None,
    }
}

/// Statyczny katalog: co trzeci produkt jest niedostępny.
pub fn catalog(count: i64) -> Vec<Product> {
    (1..=count).map(|id| sample_product(id, id % 3 != 0)).collect()
}

/// Przełączniki atrapy listy produktów.
#[derive(Clone, Default)]
pub struct ProductsBackend {
    /// Gdy ustawione, serwer odpowiada 503.
    pub outage: Arc<AtomicBool>,
    /// Liczba obsłużonych żądań.
    pub hits: Arc<AtomicUsize>,
}

/// `GET /api/products` ze stronicowaniem i filtrami `status` / `exclude_out_of_stock`.
pub fn products_router(products: Vec<Product>, backend: ProductsBackend) -> Router {
    let products = Arc::new(products);
    Router::new().route(
        "/api/products",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let products = products.clone();
            let backend = backend.clone();
            async move {
                backend.hits.fetch_add(1, Ordering::SeqCst);
                if backend.outage.load(Ordering::SeqCst) {
                    return (
                        StatusCode::SERVICE_UNAVAILABLE,
                        Json(failure("Serwis chwilowo niedostępny")),
                    );
                }
                (StatusCode::OK, Json(page_of_products(&products, &params)))
            }
        }),
    )
}

fn page_of_products(products: &[Product], params: &HashMap<String, String>) -> Value {
    let number = |key: &str, default: usize| {
        params
            .get(key)
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(default)
            .max(1)
    };
    let page = number("page", 1);
    let per_page = number("per_page", 10);
    let exclude = params
        .get("exclude_out_of_stock")
        .is_some_and(|v| v == "true");
    let status = params.get("status");

    let filtered: Vec<&Product> = products
        .iter()
        .filter(|p| !exclude || p.in_stock)
        .filter(|p| status.is_none_or(|s| p.status.to_string() == *s))
        .collect();
    let total = filtered.len();
    let pages = total.div_ceil(per_page).max(1);
    let items: Vec<&Product> = filtered
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    offset_envelope(
        json!(items),
        page as u32,
        pages as u32,
        per_page as u32,
        total as u64,
    )
}
