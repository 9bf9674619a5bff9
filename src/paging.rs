// src/paging.rs

use async_trait::async_trait;

use crate::client::HubClient;
use crate::errors::HubError;
use crate::models::{ChannelListing, Order, Product, RawImage};
use crate::pagination::{
    LoadedPage, PageRequest, PageResult, PageToken, TokenScheme, clamp_page_size,
    closest_page_to,
};

/// Most między API stronicowanym a listą doładowywaną przy przewijaniu.
#[async_trait]
pub trait PagingSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    /// Schemat adresowania stron; stały dla całego źródła.
    fn scheme(&self) -> TokenScheme;

    fn page_size(&self) -> u32;

    async fn load_page(&self, request: &PageRequest)
    -> Result<PageResult<Self::Item>, HubError>;

    /// Od której strony zacząć pełne odświeżenie listy. `anchor` to indeks
    /// w `pages` (od pierwszej załadowanej strony), nie pozycja bezwzględna.
    fn refresh_key(
        &self,
        pages: &[LoadedPage<Self::Item>],
        anchor: Option<usize>,
    ) -> Option<PageToken> {
        anchored_refresh_key(self.scheme(), pages, anchor)
    }
}

/// Strona sąsiadująca z elementem pod kotwicą: `prev + 1`, inaczej `next - 1`.
/// Kursora nie da się przesunąć, więc dla kursorów zwracamy token,
/// który wyprodukował stronę z kotwicą.
pub fn anchored_refresh_key<T>(
    scheme: TokenScheme,
    pages: &[LoadedPage<T>],
    anchor: Option<usize>,
) -> Option<PageToken> {
    let page = closest_page_to(pages, anchor?)?;
    match scheme {
        TokenScheme::Numbered => {
            let from_prev = page
                .prev
                .as_ref()
                .and_then(PageToken::page_number)
                .map(|n| PageToken::Page(n + 1));
            let from_next = || {
                page.next
                    .as_ref()
                    .and_then(PageToken::page_number)
                    .filter(|n| *n > 1)
                    .map(|n| PageToken::Page(n - 1))
            };
            from_prev.or_else(from_next).or_else(|| page.key.clone())
        }
        TokenScheme::Cursor => page.key.clone(),
    }
}

// --- PRODUKTY ---

#[derive(Debug, Clone)]
pub struct ProductPagingSource {
    client: HubClient,
    page_size: u32,
}

impl ProductPagingSource {
    pub fn new(client: HubClient, page_size: u32) -> Self {
        ProductPagingSource {
            client,
            page_size: clamp_page_size(page_size),
        }
    }
}

#[async_trait]
impl PagingSource for ProductPagingSource {
    type Item = Product;

    fn scheme(&self) -> TokenScheme {
        TokenScheme::Numbered
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }

    async fn load_page(&self, request: &PageRequest) -> Result<PageResult<Product>, HubError> {
        request.filters.validate()?;
        let page = request.page_number()?;
        let (products, pagination) = self
            .client
            .list_products(page, request.page_size, &request.filters.to_query())
            .await?;

        let mut result =
            PageResult::from_pagination(products, pagination.as_ref(), TokenScheme::Numbered)?;
        // Serwer rozstrzyga o dopasowaniu; lokalnie pilnujemy tylko stanu magazynu.
        let before = result.items.len();
        result.items.retain(|p| !request.filters.hides_out_of_stock(p));
        if result.items.len() != before {
            tracing::warn!(
                "Serwer zwrócił {} niedostępnych produktów mimo exclude_out_of_stock na stronie {}; pominięto",
                before - result.items.len(),
                page
            );
        }
        let unexpected = result
            .items
            .iter()
            .filter(|p| !request.filters.admits(p))
            .count();
        if unexpected > 0 {
            tracing::debug!(
                "Strona {}: {} produktów nie pasuje do lokalnej oceny filtrów; zostawiono wg serwera",
                page,
                unexpected
            );
        }
        tracing::debug!(
            "Strona produktów {} załadowana: {} pozycji, następna: {:?}",
            page,
            result.items.len(),
            result.next
        );
        Ok(result)
    }
}

// --- OFERTY AMAZON ---

#[derive(Debug, Clone)]
pub struct ChannelListingPagingSource {
    client: HubClient,
    page_size: u32,
}

impl ChannelListingPagingSource {
    pub fn new(client: HubClient, page_size: u32) -> Self {
        ChannelListingPagingSource {
            client,
            page_size: clamp_page_size(page_size),
        }
    }
}

#[async_trait]
impl PagingSource for ChannelListingPagingSource {
    type Item = ChannelListing;

    fn scheme(&self) -> TokenScheme {
        TokenScheme::Numbered
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }

    async fn load_page(
        &self,
        request: &PageRequest,
    ) -> Result<PageResult<ChannelListing>, HubError> {
        let page = request.page_number()?;
        let (listings, pagination) = self
            .client
            .list_channel_listings(page, request.page_size)
            .await?;
        PageResult::from_pagination(listings, pagination.as_ref(), TokenScheme::Numbered)
    }
}

// --- SUROWE ZDJĘCIA ---

#[derive(Debug, Clone)]
pub struct RawImagePagingSource {
    client: HubClient,
    page_size: u32,
}

impl RawImagePagingSource {
    pub fn new(client: HubClient, page_size: u32) -> Self {
        RawImagePagingSource {
            client,
            page_size: clamp_page_size(page_size),
        }
    }
}

#[async_trait]
impl PagingSource for RawImagePagingSource {
    type Item = RawImage;

    fn scheme(&self) -> TokenScheme {
        TokenScheme::Numbered
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }

    async fn load_page(&self, request: &PageRequest) -> Result<PageResult<RawImage>, HubError> {
        let page = request.page_number()?;
        let (images, pagination) = self.client.list_raw_images(page, request.page_size).await?;
        PageResult::from_pagination(images, pagination.as_ref(), TokenScheme::Numbered)
    }
}

// --- ZAMÓWIENIA (kursory) ---

#[derive(Debug, Clone)]
pub struct OrderPagingSource {
    client: HubClient,
    page_size: u32,
}

impl OrderPagingSource {
    pub fn new(client: HubClient, page_size: u32) -> Self {
        OrderPagingSource {
            client,
            page_size: clamp_page_size(page_size),
        }
    }
}

#[async_trait]
impl PagingSource for OrderPagingSource {
    type Item = Order;

    fn scheme(&self) -> TokenScheme {
        TokenScheme::Cursor
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }

    async fn load_page(&self, request: &PageRequest) -> Result<PageResult<Order>, HubError> {
        let cursor = request.cursor()?;
        let (orders, pagination) = self.client.list_orders(cursor, request.page_size).await?;
        let result = PageResult::from_pagination(orders, pagination.as_ref(), TokenScheme::Cursor)?;
        tracing::debug!(
            "Strona zamówień załadowana: {} pozycji, kursor następnej: {:?}",
            result.items.len(),
            result.next
        );
        Ok(result)
    }
}
