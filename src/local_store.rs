// src/local_store.rs

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::errors::HubError;

const THEME_KEY: &str = "theme";

/// Zdjęcie zrobione na urządzeniu, zanim trafiło do katalogu.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RawProduct {
    pub id: String,
    pub image_uri: String,
    pub created_at: DateTime<Utc>,
}

impl RawProduct {
    pub fn new(image_uri: impl Into<String>) -> Self {
        RawProduct {
            id: Uuid::new_v4().to_string(),
            image_uri: image_uri.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Lokalna baza SQLite: surowe zdjęcia i preferencje użytkownika.
#[derive(Debug, Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    pub async fn open(database_url: &str) -> Result<Self, HubError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Baza w pamięci istnieje tylko w obrębie jednego połączenia.
        let in_memory = database_url.contains(":memory:");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(4)
                .acquire_timeout(Duration::from_secs(5))
        };
        let pool = pool_options.connect_with(options).await?;

        let store = LocalStore { pool };
        store.migrate().await?;
        tracing::info!("Otwarto lokalną bazę danych: {}", database_url);
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), HubError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS raw_products (
                id TEXT PRIMARY KEY,
                image_uri TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // --- SUROWE ZDJĘCIA ---

    pub async fn insert_raw_product(&self, product: &RawProduct) -> Result<(), HubError> {
        sqlx::query("INSERT INTO raw_products (id, image_uri, created_at) VALUES (?, ?, ?)")
            .bind(&product.id)
            .bind(&product.image_uri)
            .bind(product.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Od najnowszych.
    pub async fn list_raw_products(&self) -> Result<Vec<RawProduct>, HubError> {
        let rows = sqlx::query_as::<_, RawProduct>(
            "SELECT id, image_uri, created_at FROM raw_products ORDER BY created_at DESC, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Zwraca `true`, jeśli rekord istniał.
    pub async fn delete_raw_product(&self, id: &str) -> Result<bool, HubError> {
        let result = sqlx::query("DELETE FROM raw_products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn clear_raw_products(&self) -> Result<u64, HubError> {
        let result = sqlx::query("DELETE FROM raw_products")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Zapis "najlepszej staranności": błąd bazy jest logowany i pomijany.
    pub async fn remember_raw_product(&self, image_uri: &str) -> Option<RawProduct> {
        let product = RawProduct::new(image_uri);
        match self.insert_raw_product(&product).await {
            Ok(()) => Some(product),
            Err(e) => {
                tracing::warn!("Nie zapisano lokalnie zdjęcia '{}': {}", image_uri, e);
                None
            }
        }
    }

    // --- PREFERENCJE ---

    pub async fn preference(&self, key: &str) -> Result<Option<String>, HubError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM preferences WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    pub async fn set_preference(&self, key: &str, value: &str) -> Result<(), HubError> {
        sqlx::query(
            "INSERT INTO preferences (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Nieznana wartość w bazie jest traktowana jak brak ustawienia.
    pub async fn theme(&self) -> Result<Theme, HubError> {
        let stored = self.preference(THEME_KEY).await?;
        Ok(stored
            .and_then(|value| Theme::from_str(&value).ok())
            .unwrap_or_default())
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<(), HubError> {
        self.set_preference(THEME_KEY, theme.as_ref()).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
