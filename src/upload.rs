// src/upload.rs

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use reqwest::header::CONTENT_TYPE;
use validator::Validate;

use crate::client::HubClient;
use crate::errors::HubError;
use crate::models::PresignedUrlRequest;

/// Adres do jednorazowego zapisu w magazynie obiektów i publiczny adres pliku.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTarget {
    pub upload_url: String,
    pub public_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl UploadTarget {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Plik przygotowany do wysłania.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

/// Typ MIME na podstawie rozszerzenia pliku.
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Dwuetapowa wysyłka zdjęć: podpisany adres z API, potem bezpośredni PUT.
#[derive(Debug, Clone)]
pub struct ImageUploader {
    client: HubClient,
}

impl ImageUploader {
    pub fn new(client: HubClient) -> Self {
        ImageUploader { client }
    }

    pub async fn request_upload_target(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<UploadTarget, HubError> {
        let request = PresignedUrlRequest {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
        };
        request.validate()?;

        let response = self
            .client
            .request_presigned_url(&request)
            .await
            .map_err(|e| {
                tracing::error!("Nie udało się uzyskać podpisanego adresu dla '{}': {}", filename, e);
                HubError::UploadTarget(e.to_string())
            })?;

        let expires_at = response.expires_at.or_else(|| {
            response
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs))
        });
        tracing::debug!(
            "Podpisany adres dla '{}' ważny do {:?}",
            filename,
            expires_at
        );
        Ok(UploadTarget {
            upload_url: response.upload_url,
            public_url: response.public_url,
            expires_at,
        })
    }

    /// Bezpośredni PUT do magazynu. `content_type` musi być identyczny
    /// z zadeklarowanym przy uzyskiwaniu adresu.
    pub async fn put_bytes(
        &self,
        upload_url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), HubError> {
        let size = bytes.len();
        let response = self
            .client
            .http()
            .put(upload_url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Błąd sieci podczas wysyłania pliku do magazynu: {}", e);
                HubError::Transport(e)
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("Wysłano {} bajtów do magazynu (status {})", size, status);
            return Ok(());
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Brak treści błędu".to_string());
        tracing::error!(
            "Błąd wysyłania do magazynu: Status={}, Treść={}",
            status,
            body
        );
        Err(HubError::Transfer { status, body })
    }

    /// Zwraca publiczny adres tylko wtedy, gdy oba etapy się powiodły.
    pub async fn upload_image(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Option<String> {
        let target = match self.request_upload_target(filename, content_type).await {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!("Wysyłka '{}' przerwana: {}", filename, e);
                return None;
            }
        };
        match self.put_bytes(&target.upload_url, bytes, content_type).await {
            Ok(()) => Some(target.public_url),
            Err(e) => {
                tracing::warn!("Wysyłka '{}' nieudana: {}", filename, e);
                None
            }
        }
    }

    /// Niezależne wysyłki kilku plików; wynik w kolejności wejścia.
    pub async fn upload_many(&self, files: Vec<PendingUpload>) -> Vec<Option<String>> {
        let uploads = files.into_iter().map(|file| async move {
            self.upload_image(file.bytes, &file.filename, &file.content_type)
                .await
        });
        join_all(uploads).await
    }
}
