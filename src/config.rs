// src/config.rs

use std::env;
use std::time::Duration;

use crate::errors::HubError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PRODUCTS_PAGE_SIZE: u32 = 20;
const DEFAULT_ORDERS_PAGE_SIZE: u32 = 50;
const DEFAULT_LISTINGS_PAGE_SIZE: u32 = 20;
const DEFAULT_RAW_IMAGES_PAGE_SIZE: u32 = 30;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_LOCAL_DB_URL: &str = "sqlite://catalog_hub.db";

#[derive(Debug, Clone)]
pub struct HubConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub http_timeout: Duration,
    pub products_page_size: u32,
    pub orders_page_size: u32,
    pub listings_page_size: u32,
    pub raw_images_page_size: u32,
    pub local_db_url: String,
    pub cache_ttl: Duration,
}

impl HubConfig {
    /// Konfiguracja ze zmiennych środowiskowych (po `dotenvy::dotenv()`).
    pub fn from_env() -> Result<Self, HubError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Wersja z dowolnym źródłem wartości, np. mapą w testach.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HubError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("HUB_API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| HubError::Config("HUB_API_BASE_URL must be set".to_string()))?;
        url::Url::parse(&api_base_url).map_err(|e| {
            HubError::Config(format!("HUB_API_BASE_URL nie jest poprawnym adresem: {}", e))
        })?;

        let api_token = lookup("HUB_API_TOKEN").filter(|v| !v.trim().is_empty());

        let timeout_secs = parse_number(&lookup, "HUB_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let products_page_size = parse_number(
            &lookup,
            "HUB_PRODUCTS_PAGE_SIZE",
            DEFAULT_PRODUCTS_PAGE_SIZE,
        )?;
        let orders_page_size =
            parse_number(&lookup, "HUB_ORDERS_PAGE_SIZE", DEFAULT_ORDERS_PAGE_SIZE)?;
        let listings_page_size = parse_number(
            &lookup,
            "HUB_LISTINGS_PAGE_SIZE",
            DEFAULT_LISTINGS_PAGE_SIZE,
        )?;
        let raw_images_page_size = parse_number(
            &lookup,
            "HUB_RAW_IMAGES_PAGE_SIZE",
            DEFAULT_RAW_IMAGES_PAGE_SIZE,
        )?;
        let cache_ttl_secs = parse_number(&lookup, "HUB_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;

        let local_db_url =
            lookup("HUB_LOCAL_DB_URL").unwrap_or_else(|| DEFAULT_LOCAL_DB_URL.to_string());

        Ok(HubConfig {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_token,
            http_timeout: Duration::from_secs(timeout_secs),
            products_page_size,
            orders_page_size,
            listings_page_size,
            raw_images_page_size,
            local_db_url,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
        })
    }

    /// Minimalna konfiguracja wskazująca na podany serwer.
    pub fn for_base_url(api_base_url: impl Into<String>) -> Self {
        let api_base_url: String = api_base_url.into();
        HubConfig {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_token: None,
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            products_page_size: DEFAULT_PRODUCTS_PAGE_SIZE,
            orders_page_size: DEFAULT_ORDERS_PAGE_SIZE,
            listings_page_size: DEFAULT_LISTINGS_PAGE_SIZE,
            raw_images_page_size: DEFAULT_RAW_IMAGES_PAGE_SIZE,
            local_db_url: DEFAULT_LOCAL_DB_URL.to_string(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

fn parse_number<F, N>(lookup: &F, key: &str, default: N) -> Result<N, HubError>
where
    F: Fn(&str) -> Option<String>,
    N: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<N>()
            .map_err(|_| HubError::Config(format!("{} must be a valid number", key))),
        None => Ok(default),
    }
}
