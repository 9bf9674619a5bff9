// src/client.rs

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::HubConfig;
use crate::errors::HubError;
use crate::filters::ProductQuery;
use crate::models::*;
use crate::response::{ApiResponse, Pagination};

/// Klient REST API zaplecza. Nie trzyma stanu per wywołujący,
/// więc klony można bezpiecznie używać równolegle.
#[derive(Debug, Clone)]
pub struct HubClient {
    http: Client,
    base_url: String,
    api_token: Option<String>,
}

#[derive(Serialize)]
struct PageParams {
    page: u32,
    per_page: u32,
}

#[derive(Serialize)]
struct CursorParams<'a> {
    limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_info: Option<&'a str>,
}

impl HubClient {
    pub fn new(config: &HubConfig) -> Result<Self, HubError> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("catalog-hub/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HubClient {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Surowy klient HTTP do żądań poza API (np. PUT na adres podpisany).
    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, url);
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiResponse<T>, HubError> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!("Błąd sieci podczas komunikacji z API: {}", e);
            HubError::Transport(e)
        })?;

        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            tracing::warn!("API zwróciło 404 dla {}", url);
            return Err(HubError::NotFound);
        }
        if !status.is_success() {
            tracing::error!("Błąd API {}: Status={}, Treść={}", url, status, body);
            // Serwer zwykle opakowuje błąd w kopertę z komunikatem.
            if let Ok(ApiResponse {
                message: Some(message),
                ..
            }) = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
            {
                return Err(HubError::Server { message });
            }
            return Err(HubError::Status { status, body });
        }

        tracing::debug!("API {} odpowiedziało statusem {}", url, status);
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Błąd deserializacji odpowiedzi z {}: {}", url, e);
            HubError::Decode(e)
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, HubError> {
        self.send(self.request(Method::GET, path)).await?.into_data()
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, HubError> {
        self.send(self.request(method, path).json(body))
            .await?
            .into_data()
    }

    // --- PRODUKTY ---

    pub async fn list_products(
        &self,
        page: u32,
        per_page: u32,
        query: &ProductQuery,
    ) -> Result<(Vec<Product>, Option<Pagination>), HubError> {
        tracing::debug!("GET /api/products strona={} filtry={:?}", page, query);
        let builder = self
            .request(Method::GET, "/api/products")
            .query(&PageParams { page, per_page })
            .query(query);
        self.send(builder).await?.into_page()
    }

    pub async fn search_products_by_sku(&self, sku: &str) -> Result<Vec<Product>, HubError> {
        let builder = self
            .request(Method::GET, "/api/products/search")
            .query(&[("sku", sku)]);
        self.send(builder).await?.into_data()
    }

    pub async fn get_product(&self, id: i64) -> Result<Product, HubError> {
        self.get(&format!("/api/products/{}", id)).await
    }

    pub async fn create_product(
        &self,
        payload: &CreateProductPayload,
    ) -> Result<Product, HubError> {
        self.send_json(Method::POST, "/api/products", payload).await
    }

    pub async fn update_product_status(
        &self,
        id: i64,
        status: ProductStatus,
    ) -> Result<Product, HubError> {
        self.send_json(
            Method::PUT,
            &format!("/api/products/{}/status", id),
            &UpdateStatusPayload { status },
        )
        .await
    }

    pub async fn update_product_stock(
        &self,
        id: i64,
        payload: &UpdateStockPayload,
    ) -> Result<Product, HubError> {
        self.send_json(Method::PUT, &format!("/api/products/{}/stock", id), payload)
            .await
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), HubError> {
        self.send::<serde_json::Value>(
            self.request(Method::DELETE, &format!("/api/products/{}", id)),
        )
        .await?
        .into_unit()
    }

    pub async fn bulk_create_products(
        &self,
        payload: &BulkProductsPayload,
    ) -> Result<BulkCreateResult, HubError> {
        self.send_json(Method::POST, "/api/products/bulk", payload)
            .await
    }

    pub async fn generate_product_image(
        &self,
        id: i64,
        payload: &GenerateImagePayload,
    ) -> Result<GeneratedImage, HubError> {
        self.send_json(
            Method::POST,
            &format!("/api/products/{}/generate-image", id),
            payload,
        )
        .await
    }

    // --- KATEGORIE ---

    pub async fn list_categories(&self) -> Result<Vec<Category>, HubError> {
        self.get("/api/categories").await
    }

    pub async fn create_category(&self, payload: &CategoryPayload) -> Result<Category, HubError> {
        self.send_json(Method::POST, "/api/categories", payload).await
    }

    pub async fn update_category(
        &self,
        id: i64,
        payload: &CategoryPayload,
    ) -> Result<Category, HubError> {
        self.send_json(Method::PUT, &format!("/api/categories/{}", id), payload)
            .await
    }

    // --- PROMPTY ---

    pub async fn list_prompts(&self) -> Result<Vec<Prompt>, HubError> {
        self.get("/api/prompts").await
    }

    pub async fn create_prompt(&self, payload: &PromptPayload) -> Result<Prompt, HubError> {
        self.send_json(Method::POST, "/api/prompts", payload).await
    }

    pub async fn update_prompt(
        &self,
        id: i64,
        payload: &PromptPayload,
    ) -> Result<Prompt, HubError> {
        self.send_json(Method::PUT, &format!("/api/prompts/{}", id), payload)
            .await
    }

    pub async fn delete_prompt(&self, id: i64) -> Result<(), HubError> {
        self.send::<serde_json::Value>(
            self.request(Method::DELETE, &format!("/api/prompts/{}", id)),
        )
        .await?
        .into_unit()
    }

    // --- KATALOGI PDF ---

    pub async fn list_catalogs(&self) -> Result<Vec<Catalog>, HubError> {
        self.get("/api/catalogs").await
    }

    pub async fn refresh_catalog(&self, id: i64) -> Result<Catalog, HubError> {
        self.send(self.request(Method::POST, &format!("/api/catalogs/{}/refresh", id)))
            .await?
            .into_data()
    }

    // --- WYSYŁKA ZDJĘĆ ---

    pub async fn request_presigned_url(
        &self,
        request: &PresignedUrlRequest,
    ) -> Result<PresignedUrlResponse, HubError> {
        self.send_json(Method::POST, "/api/presigned-url", request)
            .await
    }

    // --- LISTY STRONICOWANE ---

    pub async fn list_channel_listings(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<ChannelListing>, Option<Pagination>), HubError> {
        let builder = self
            .request(Method::GET, "/api/channel-listings")
            .query(&PageParams { page, per_page });
        self.send(builder).await?.into_page()
    }

    pub async fn list_raw_images(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<RawImage>, Option<Pagination>), HubError> {
        let builder = self
            .request(Method::GET, "/api/raw-images")
            .query(&PageParams { page, per_page });
        self.send(builder).await?.into_page()
    }

    pub async fn list_orders(
        &self,
        page_info: Option<&str>,
        limit: u32,
    ) -> Result<(Vec<Order>, Option<Pagination>), HubError> {
        let builder = self
            .request(Method::GET, "/api/orders")
            .query(&CursorParams { limit, page_info });
        self.send(builder).await?.into_page()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{FilterEvent, FilterState, SortKey, SortOrder};
    use crate::test_support::{self, envelope, failure, offset_envelope, sample_product};
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::{delete, get, put};
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::time::Duration;

    #[tokio::test]
    async fn list_products_sends_paging_and_filter_parameters() {
        let router = Router::new().route(
            "/api/products",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                // Odsyłamy parametry w nazwie produktu, żeby je sprawdzić po stronie klienta.
                let mut keys: Vec<String> =
                    params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                keys.sort();
                let mut product = sample_product(1, true);
                product.name = keys.join("&");
                Json(offset_envelope(json!([product]), 1, 3, 10, 25))
            }),
        );
        let client = test_support::client_for(router).await;

        let query = FilterState::default()
            .apply(FilterEvent::StatusChanged(Some(ProductStatus::Live)))
            .apply(FilterEvent::ExcludeOutOfStockChanged(true))
            .apply(FilterEvent::SortChanged(SortKey::Price, SortOrder::Desc))
            .to_query();
        let (products, pagination) = client.list_products(1, 10, &query).await.unwrap();

        assert_eq!(
            products[0].name,
            "exclude_out_of_stock=true&page=1&per_page=10&sort_by=price&sort_order=desc&status=live"
        );
        assert!(matches!(pagination, Some(Pagination::Offset(ref p)) if p.pages == 3));
    }

    #[tokio::test]
    async fn sends_bearer_token_when_configured() {
        let router = Router::new().route(
            "/api/categories",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(envelope(json!([{ "id": 1, "name": auth }])))
            }),
        );
        let base_url = test_support::spawn(router).await;
        let mut config = HubConfig::for_base_url(base_url);
        config.api_token = Some("sekret".to_string());
        let client = HubClient::new(&config).unwrap();

        let categories = client.list_categories().await.unwrap();
        assert_eq!(categories[0].name, "Bearer sekret");
    }

    #[tokio::test]
    async fn maps_failures_to_error_variants() {
        let router = Router::new()
            .route(
                "/api/products/{id}",
                get(|Path(id): Path<i64>| async move {
                    if id == 404 {
                        (AxumStatus::NOT_FOUND, Json(failure("brak")))
                    } else {
                        (AxumStatus::OK, Json(failure("Produkt zablokowany")))
                    }
                }),
            )
            .route(
                "/api/prompts/{id}",
                delete(|| async {
                    (
                        AxumStatus::INTERNAL_SERVER_ERROR,
                        "upstream exploded".to_string(),
                    )
                }),
            )
            .route(
                "/api/products/{id}/status",
                put(|| async {
                    (
                        AxumStatus::CONFLICT,
                        Json(failure("Produkt bez zdjęć nie może być opublikowany")),
                    )
                }),
            );
        let client = test_support::client_for(router).await;

        assert!(matches!(client.get_product(404).await, Err(HubError::NotFound)));
        match client.get_product(1).await {
            Err(HubError::Server { message }) => assert_eq!(message, "Produkt zablokowany"),
            other => panic!("nieoczekiwany wynik: {:?}", other),
        }
        match client.delete_prompt(3).await {
            Err(HubError::Status { status, body }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("nieoczekiwany wynik: {:?}", other),
        }
        match client.update_product_status(5, ProductStatus::Live).await {
            Err(HubError::Server { message }) => {
                assert!(message.contains("bez zdjęć"))
            }
            other => panic!("nieoczekiwany wynik: {:?}", other),
        }
    }

    #[tokio::test]
    async fn orders_use_cursor_parameters() {
        let router = Router::new().route(
            "/api/orders",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let info = params.get("page_info").cloned();
                Json(json!({
                    "success": true,
                    "data": [{ "id": 1, "name": "#1001", "total_price": "10.00",
                               "email": info }],
                    "pagination": { "has_next": false, "has_previous": true,
                                    "next_page_info": null, "previous_page_info": "p1" }
                }))
            }),
        );
        let client = test_support::client_for(router).await;

        let (orders, pagination) = client.list_orders(Some("c2"), 50).await.unwrap();
        assert_eq!(orders[0].email.as_deref(), Some("c2"));
        assert!(matches!(pagination, Some(Pagination::Cursor(ref c)) if c.has_previous));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        let mut config = HubConfig::for_base_url("http://127.0.0.1:9");
        config.http_timeout = Duration::from_secs(2);
        let client = HubClient::new(&config).unwrap();
        let err = client.list_catalogs().await.unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Network);
    }

    #[tokio::test]
    async fn search_by_sku_passes_query() {
        let router = Router::new().route(
            "/api/products/search",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let sku = params.get("sku").cloned().unwrap_or_default();
                let mut product = sample_product(9, true);
                product.sku = sku;
                Json::<Value>(envelope(json!([product])))
            }),
        );
        let client = test_support::client_for(router).await;
        let found = client.search_products_by_sku("AB 12/3").await.unwrap();
        assert_eq!(found[0].sku, "AB 12/3");
    }
}
