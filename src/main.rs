// src/main.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_hub_client::filters::{FilterEvent, FilterState};
use catalog_hub_client::local_store::LocalStore;
use catalog_hub_client::models::ProductStatus;
use catalog_hub_client::{HubClient, HubConfig, ProductBrowser};

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Inicjalizacja systemu logowania (tracing)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_hub_client=debug,catalog_hub=debug".into()), // np. RUST_LOG=info
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Inicjalizacja klienta katalogu...");

    // --- Konfiguracja ---
    let config = match HubConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Niepoprawna konfiguracja: {}", err);
            std::process::exit(1);
        }
    };

    let client = match HubClient::new(&config) {
        Ok(client) => client,
        Err(err) => {
            tracing::error!("Nie można utworzyć klienta HTTP: {}", err);
            std::process::exit(1);
        }
    };
    tracing::info!("API: {}", client.base_url());

    // --- Lokalna baza (niekrytyczna) ---
    match LocalStore::open(&config.local_db_url).await {
        Ok(store) => match store.theme().await {
            Ok(theme) => tracing::info!("Motyw interfejsu: {}", theme),
            Err(err) => tracing::warn!("Nie odczytano motywu: {}", err),
        },
        Err(err) => tracing::warn!("Lokalna baza niedostępna: {}", err),
    }

    // --- Filtry startowe ---
    let mut filters = FilterState::default();
    if let Ok(raw) = env::var("HUB_FILTER_STATUS") {
        match ProductStatus::from_str(raw.trim()) {
            Ok(status) => filters = filters.apply(FilterEvent::StatusChanged(Some(status))),
            Err(_) => tracing::warn!("Nieznany status '{}', pomijam filtr", raw),
        }
    }
    if let Ok(raw) = env::var("HUB_FILTER_EXCLUDE_OOS") {
        let exclude = matches!(raw.trim(), "1" | "true" | "yes");
        filters = filters.apply(FilterEvent::ExcludeOutOfStockChanged(exclude));
    }

    // --- Pierwsza strona produktów ---
    let mut browser = ProductBrowser::new(client, &config, filters);
    browser.open().await;
    if let Some(message) = browser.error() {
        tracing::error!("Nie udało się pobrać produktów: {}", message);
        std::process::exit(1);
    }

    tracing::info!(
        "Załadowano {} produktów (łącznie: {:?})",
        browser.len(),
        browser.total()
    );
    for product in browser.products() {
        tracing::info!(
            "{} | {} | {} | {:.2} | dostępny: {}",
            product.sku,
            product.name,
            product.status,
            product.selling_price,
            product.in_stock
        );
    }
}
