// src/repository.rs

use std::time::Duration;

use moka::future::Cache;
use rust_decimal::Decimal;
use validator::Validate;

use crate::client::HubClient;
use crate::errors::HubError;
use crate::models::*;
use crate::pagination::{PageResult, TokenScheme, clamp_page_size};
use crate::pricing::{selling_price, to_f64};

const CATEGORY_LIST_KEY: &str = "all";

/// Dane formularza nowego produktu, już po parsowaniu pól liczbowych.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub mrp: Decimal,
    pub discount: Decimal,
    pub stock_quantity: i64,
    pub box_number: Option<String>,
    pub images: Vec<String>,
}

impl NewProduct {
    /// Payload z ceną sprzedaży wyliczoną z MRP i rabatu.
    pub fn into_payload(self) -> CreateProductPayload {
        let price = selling_price(self.mrp, self.discount);
        CreateProductPayload {
            sku: self.sku.trim().to_string(),
            name: self.name.trim().to_string(),
            category: self.category,
            description: self.description.filter(|d| !d.trim().is_empty()),
            tags: self.tags,
            mrp: to_f64(self.mrp),
            discount: to_f64(self.discount),
            selling_price: to_f64(price),
            stock_quantity: self.stock_quantity,
            box_number: self.box_number.filter(|b| !b.trim().is_empty()),
            images: self.images,
        }
    }
}

#[derive(Clone)]
pub struct ProductRepository {
    client: HubClient,
    product_cache: Cache<i64, Product>,
}

impl ProductRepository {
    pub fn new(client: HubClient, ttl: Duration) -> Self {
        ProductRepository {
            client,
            product_cache: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, id: i64) -> Result<Product, HubError> {
        // KROK 1: Sprawdź cache
        if let Some(product) = self.product_cache.get(&id).await {
            tracing::debug!("Cache HIT dla produktu o ID: {}", id);
            return Ok(product);
        }

        // KROK 2: Pobierz z API i zapamiętaj
        tracing::debug!("Cache MISS dla produktu o ID: {}. Pobieranie z API.", id);
        let product = self.client.get_product(id).await?;
        self.product_cache.insert(id, product.clone()).await;
        Ok(product)
    }

    pub async fn search_by_sku(&self, sku: &str) -> Result<Vec<Product>, HubError> {
        let sku = sku.trim();
        if sku.is_empty() {
            return Err(HubError::invalid_field("sku", "podaj SKU do wyszukania"));
        }
        self.client.search_products_by_sku(sku).await
    }

    pub async fn create(&self, product: NewProduct) -> Result<Product, HubError> {
        let payload = product.into_payload();
        payload.validate()?;
        let created = self.client.create_product(&payload).await?;
        tracing::info!("Utworzono produkt {} (SKU {})", created.id, created.sku);
        self.product_cache.insert(created.id, created.clone()).await;
        Ok(created)
    }

    pub async fn bulk_create(
        &self,
        products: Vec<NewProduct>,
    ) -> Result<BulkCreateResult, HubError> {
        let payload = BulkProductsPayload {
            products: products.into_iter().map(NewProduct::into_payload).collect(),
        };
        payload.validate()?;
        let result = self.client.bulk_create_products(&payload).await?;
        if !result.failed.is_empty() {
            tracing::warn!(
                "Import zbiorczy: utworzono {}, odrzucono {:?}",
                result.created,
                result.failed
            );
        }
        Ok(result)
    }

    pub async fn update_status(
        &self,
        id: i64,
        status: ProductStatus,
    ) -> Result<Product, HubError> {
        let updated = self.client.update_product_status(id, status).await?;
        self.product_cache.insert(id, updated.clone()).await;
        Ok(updated)
    }

    pub async fn update_stock(
        &self,
        id: i64,
        in_stock: bool,
        stock_quantity: Option<i64>,
    ) -> Result<Product, HubError> {
        let payload = UpdateStockPayload {
            in_stock,
            stock_quantity,
        };
        payload.validate()?;
        let updated = self.client.update_product_stock(id, &payload).await?;
        self.product_cache.insert(id, updated.clone()).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), HubError> {
        self.client.delete_product(id).await?;
        self.product_cache.invalidate(&id).await;
        tracing::info!("Usunięto produkt {}", id);
        Ok(())
    }

    pub async fn generate_image(
        &self,
        id: i64,
        prompt_id: i64,
        source_image_url: Option<String>,
    ) -> Result<String, HubError> {
        let payload = GenerateImagePayload {
            prompt_id,
            source_image_url,
        };
        payload.validate()?;
        let generated = self.client.generate_product_image(id, &payload).await?;
        // Produkt dostał nowe zdjęcie, więc wersja w cache jest nieaktualna.
        self.product_cache.invalidate(&id).await;
        Ok(generated.image_url)
    }
}

#[derive(Clone)]
pub struct CategoryRepository {
    client: HubClient,
    category_list_cache: Cache<&'static str, Vec<Category>>,
}

impl CategoryRepository {
    pub fn new(client: HubClient, ttl: Duration) -> Self {
        CategoryRepository {
            client,
            category_list_cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// Lista kategorii z cache, a przy braku z API.
    pub async fn list(&self) -> Result<Vec<Category>, HubError> {
        if let Some(cached) = self.category_list_cache.get(&CATEGORY_LIST_KEY).await {
            tracing::debug!("Cache HIT dla listy kategorii");
            return Ok(cached);
        }
        tracing::debug!("Cache MISS dla listy kategorii. Pobieranie z API.");
        let categories = self.client.list_categories().await?;
        self.category_list_cache
            .insert(CATEGORY_LIST_KEY, categories.clone())
            .await;
        Ok(categories)
    }

    pub async fn create(&self, payload: CategoryPayload) -> Result<Category, HubError> {
        payload.validate()?;
        let category = self.client.create_category(&payload).await?;
        self.category_list_cache.invalidate_all();
        Ok(category)
    }

    pub async fn update(&self, id: i64, payload: CategoryPayload) -> Result<Category, HubError> {
        payload.validate()?;
        let category = self.client.update_category(id, &payload).await?;
        self.category_list_cache.invalidate_all();
        Ok(category)
    }
}

#[derive(Debug, Clone)]
pub struct PromptRepository {
    client: HubClient,
}

impl PromptRepository {
    pub fn new(client: HubClient) -> Self {
        PromptRepository { client }
    }

    pub async fn list(&self) -> Result<Vec<Prompt>, HubError> {
        self.client.list_prompts().await
    }

    pub async fn create(&self, payload: PromptPayload) -> Result<Prompt, HubError> {
        payload.validate()?;
        self.client.create_prompt(&payload).await
    }

    pub async fn update(&self, id: i64, payload: PromptPayload) -> Result<Prompt, HubError> {
        payload.validate()?;
        self.client.update_prompt(id, &payload).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), HubError> {
        self.client.delete_prompt(id).await
    }
}

#[derive(Debug, Clone)]
pub struct CatalogRepository {
    client: HubClient,
}

impl CatalogRepository {
    pub fn new(client: HubClient) -> Self {
        CatalogRepository { client }
    }

    pub async fn list(&self) -> Result<Vec<Catalog>, HubError> {
        self.client.list_catalogs().await
    }

    pub async fn refresh(&self, id: i64) -> Result<Catalog, HubError> {
        tracing::info!("Zlecono odświeżenie katalogu PDF {}", id);
        self.client.refresh_catalog(id).await
    }
}

#[derive(Debug, Clone)]
pub struct OrderRepository {
    client: HubClient,
    page_size: u32,
}

impl OrderRepository {
    pub fn new(client: HubClient, page_size: u32) -> Self {
        OrderRepository {
            client,
            page_size: clamp_page_size(page_size),
        }
    }

    /// Najnowsze zamówienia; kolejne strony tylko przez kursor.
    pub async fn first_page(&self) -> Result<PageResult<Order>, HubError> {
        let (orders, pagination) = self.client.list_orders(None, self.page_size).await?;
        PageResult::from_pagination(orders, pagination.as_ref(), TokenScheme::Cursor)
    }
}
