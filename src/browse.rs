// src/browse.rs

use std::sync::Arc;

use crate::client::HubClient;
use crate::config::HubConfig;
use crate::controller::{LoadOutcome, LoadState, PagedListController};
use crate::errors::HubError;
use crate::filters::{FilterEvent, FilterState};
use crate::models::{Product, ProductStatus};
use crate::paging::ProductPagingSource;
use crate::repository::ProductRepository;

/// Stan ekranu przeglądania produktów: lista, filtry, komunikat błędu.
/// Błędy sieci i serwera trafiają do `error`, nigdy dalej.
pub struct ProductBrowser {
    controller: PagedListController<ProductPagingSource>,
    products: ProductRepository,
    error: Option<String>,
    is_busy: bool,
}

impl ProductBrowser {
    pub fn new(client: HubClient, config: &HubConfig, filters: FilterState) -> Self {
        let source = ProductPagingSource::new(client.clone(), config.products_page_size);
        ProductBrowser {
            controller: PagedListController::new(Arc::new(source), filters),
            products: ProductRepository::new(client, config.cache_ttl),
            error: None,
            is_busy: false,
        }
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.controller.items()
    }

    /// Bezwzględna pozycja pierwszego załadowanego produktu. Po odświeżeniu
    /// wokół kotwicy lista nie musi zaczynać się od zera.
    pub fn leading_offset(&self) -> usize {
        self.controller.leading_offset()
    }

    /// Produkt pod bezwzględną pozycją, w tych samych współrzędnych co `refresh`.
    pub fn item(&self, position: usize) -> Option<&Product> {
        self.controller.item(position)
    }

    pub fn len(&self) -> usize {
        self.controller.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controller.is_empty()
    }

    pub fn total(&self) -> Option<u64> {
        self.controller.total()
    }

    pub fn filters(&self) -> &FilterState {
        self.controller.filters()
    }

    pub fn state(&self) -> &LoadState {
        self.controller.state()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy || self.controller.is_loading()
    }

    pub fn has_more(&self) -> bool {
        self.controller.has_more_forward()
    }

    /// Pierwsza strona przy wejściu na ekran.
    pub async fn open(&mut self) {
        let outcome = self.controller.refresh(None).await;
        self.absorb(outcome);
    }

    /// Odświeżenie "pociągnij w dół". `position` to bezwzględna pozycja
    /// produktu na ekranie; po odświeżeniu `item(position)` wskazuje ten sam produkt.
    pub async fn refresh(&mut self, position: Option<usize>) {
        let outcome = self.controller.refresh(position).await;
        self.absorb(outcome);
    }

    pub async fn apply_filter(&mut self, event: FilterEvent) {
        if let Some(outcome) = self.controller.update_filters(event).await {
            self.absorb(outcome);
        }
    }

    pub async fn load_more(&mut self) {
        if let Some(outcome) = self.controller.load_more().await {
            self.absorb(outcome);
        }
    }

    pub async fn retry(&mut self) {
        match self.controller.retry().await {
            Some(outcome) => self.absorb(outcome),
            // Nie ma czego ponawiać (np. filtry zmieniły się w międzyczasie).
            None if self.controller.pages().is_empty() => self.open().await,
            None => {}
        }
    }

    /// Zmiana statusu, a po jej zakończeniu odświeżenie listy.
    pub async fn update_status(&mut self, id: i64, status: ProductStatus) {
        let products = self.products.clone();
        let result = self.mutate(products.update_status(id, status)).await;
        if let Some(product) = result {
            tracing::info!("Produkt {} ma teraz status {}", product.id, product.status);
            self.refresh(None).await;
        }
    }

    /// Przełączenie dostępności, a po jej zakończeniu odświeżenie listy.
    pub async fn toggle_stock(&mut self, id: i64, in_stock: bool) {
        let quantity = if in_stock { None } else { Some(0) };
        let products = self.products.clone();
        let result = self
            .mutate(products.update_stock(id, in_stock, quantity))
            .await;
        if let Some(product) = result {
            tracing::info!("Produkt {}: dostępność = {}", product.id, product.in_stock);
            self.refresh(None).await;
        }
    }

    async fn mutate<T>(
        &mut self,
        operation: impl Future<Output = Result<T, HubError>>,
    ) -> Option<T> {
        self.is_busy = true;
        let result = operation.await;
        self.is_busy = false;
        match result {
            Ok(value) => {
                self.error = None;
                Some(value)
            }
            Err(e) => {
                tracing::error!("Operacja na produkcie nie powiodła się: {}", e);
                self.error = Some(e.user_message());
                None
            }
        }
    }

    fn absorb(&mut self, outcome: LoadOutcome) {
        match outcome {
            LoadOutcome::Applied { .. } => self.error = None,
            LoadOutcome::Stale => {}
            LoadOutcome::Failed(e) => self.error = Some(e.user_message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, ProductsBackend, catalog, products_router, sample_product};
    use axum::Json;
    use axum::extract::Path;
    use axum::routing::put;
    use serde_json::{Value, json};
    use std::sync::atomic::Ordering;

    async fn browser(products: Vec<Product>, backend: ProductsBackend, page_size: u32) -> ProductBrowser {
        let router = products_router(products, backend)
            .route(
                "/api/products/{id}/status",
                put(|Path(id): Path<i64>, Json(body): Json<Value>| async move {
                    let mut product = sample_product(id, true);
                    product.status = serde_json::from_value(body["status"].clone())
                        .unwrap_or(ProductStatus::Draft);
                    Json(test_support::envelope(json!(product)))
                }),
            );
        let base = test_support::spawn(router).await;
        let mut config = HubConfig::for_base_url(base);
        config.products_page_size = page_size;
        let client = HubClient::new(&config).unwrap();
        ProductBrowser::new(client, &config, FilterState::default())
    }

    #[tokio::test]
    async fn outage_surfaces_as_error_and_retry_recovers() {
        let backend = ProductsBackend::default();
        backend.outage.store(true, Ordering::SeqCst);
        let mut browser = browser(catalog(25), backend.clone(), 10).await;

        browser.open().await;
        assert!(browser.is_empty());
        assert_eq!(browser.error(), Some("Serwis chwilowo niedostępny"));
        assert!(!browser.is_busy());

        backend.outage.store(false, Ordering::SeqCst);
        browser.retry().await;
        assert_eq!(browser.error(), None);
        assert_eq!(browser.len(), 10);
        assert_eq!(browser.total(), Some(25));

        browser.load_more().await;
        browser.load_more().await;
        assert_eq!(browser.len(), 25);
        assert!(!browser.has_more());
    }

    #[tokio::test]
    async fn pull_to_refresh_keeps_product_under_position() {
        let mut browser = browser(catalog(60), ProductsBackend::default(), 10).await;
        browser.open().await;
        browser.load_more().await;
        browser.load_more().await;
        let position = 25;
        let anchored = browser.item(position).map(|p| p.id);
        assert_eq!(anchored, Some(26));

        browser.refresh(Some(position)).await;
        assert_eq!(browser.error(), None);
        assert_eq!(browser.leading_offset(), 20);
        assert_eq!(browser.item(position).map(|p| p.id), anchored);
        assert_eq!(browser.item(19), None);
    }

    #[tokio::test]
    async fn filter_toggle_reloads_from_first_page() {
        let mut browser = browser(catalog(12), ProductsBackend::default(), 50).await;
        browser.open().await;
        assert_eq!(browser.len(), 12);

        browser
            .apply_filter(FilterEvent::ExcludeOutOfStockChanged(true))
            .await;
        assert_eq!(browser.len(), 8);
        assert!(browser.products().all(|p| p.in_stock));
        assert!(browser.filters().exclude_out_of_stock);

        browser
            .apply_filter(FilterEvent::ExcludeOutOfStockChanged(false))
            .await;
        assert_eq!(browser.len(), 12);
    }

    #[tokio::test]
    async fn status_update_refreshes_after_completion() {
        let backend = ProductsBackend::default();
        let mut browser = browser(catalog(5), backend.clone(), 20).await;
        browser.open().await;
        let before = backend.hits.load(Ordering::SeqCst);

        browser.update_status(2, ProductStatus::Archived).await;
        assert_eq!(browser.error(), None);
        assert_eq!(backend.hits.load(Ordering::SeqCst), before + 1);
    }

    #[tokio::test]
    async fn failed_mutation_sets_error_without_refresh() {
        let backend = ProductsBackend::default();
        let mut browser = browser(catalog(5), backend.clone(), 20).await;
        browser.open().await;
        let before = backend.hits.load(Ordering::SeqCst);

        // Brak trasy /stock w atrapie: 404.
        browser.toggle_stock(3, false).await;
        assert_eq!(browser.error(), Some("Nie znaleziono zasobu"));
        assert_eq!(backend.hits.load(Ordering::SeqCst), before);
        assert_eq!(browser.len(), 5);

        browser.dismiss_error();
        assert_eq!(browser.error(), None);
    }
}
