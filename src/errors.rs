// src/errors.rs

use reqwest::StatusCode;
use thiserror::Error;
use validator::ValidationErrors;

/// Klasy błędów widoczne dla warstwy stanu (ekranów).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Brak połączenia, timeout, błąd transportu.
    Network,
    /// Serwer (API albo magazyn plików) odpowiedział `success: false`
    /// albo nieoczekiwanym statusem.
    Server,
    /// Błędne dane wpisane lokalnie, wykryte przed wysłaniem żądania.
    Validation,
    /// Lokalna baza danych.
    Storage,
}

#[derive(Debug, Error)]
pub enum HubError {
    #[error("Błąd sieci: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serwer zgłosił błąd: {message}")]
    Server { message: String },

    #[error("Nieoczekiwany status odpowiedzi {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Nie znaleziono zasobu")]
    NotFound,

    #[error("Błędy walidacji")]
    ValidationError(#[from] ValidationErrors),

    #[error("Nieprawidłowa wartość pola '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Błąd lokalnej bazy danych: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Nie można przetworzyć odpowiedzi: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Pomieszane schematy stronicowania: oczekiwano {expected}, otrzymano {found}")]
    MixedPagingScheme { expected: String, found: String },

    #[error("Nie udało się uzyskać adresu do wysyłki: {0}")]
    UploadTarget(String),

    #[error("Błąd przesyłania pliku (status: {status}): {body}")]
    Transfer { status: StatusCode, body: String },

    #[error("Błąd konfiguracji: {0}")]
    Config(String),
}

pub type HubResult<T> = Result<T, HubError>;

impl HubError {
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        HubError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            HubError::Transport(_) => ErrorKind::Network,
            HubError::Server { .. }
            | HubError::Transfer { .. }
            | HubError::Status { .. }
            | HubError::NotFound
            | HubError::Decode(_)
            | HubError::MixedPagingScheme { .. }
            | HubError::UploadTarget(_) => ErrorKind::Server,
            HubError::ValidationError(_) | HubError::InvalidField { .. } | HubError::Config(_) => {
                ErrorKind::Validation
            }
            HubError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Tekst, który trafia do pola `error` stanu ekranu.
    pub fn user_message(&self) -> String {
        match self {
            HubError::Transport(e) if e.is_timeout() => {
                "Serwer nie odpowiedział na czas. Spróbuj ponownie.".to_string()
            }
            HubError::Transport(_) => "Brak połączenia z serwerem. Spróbuj ponownie.".to_string(),
            HubError::Server { message } => message.clone(),
            HubError::Status { status, .. } => {
                format!("Serwer zwrócił błąd (status: {}).", status)
            }
            HubError::NotFound => "Nie znaleziono zasobu".to_string(),
            HubError::ValidationError(errors) => {
                let mut messages = Vec::new();
                for (field, field_errors) in errors.field_errors() {
                    for error in field_errors {
                        let msg = error.message.as_ref().map_or_else(
                            || format!("Pole '{}' jest nieprawidłowe", field),
                            |m| format!("Pole '{}': {}", field, m),
                        );
                        messages.push(msg);
                    }
                }
                messages.sort();
                messages.join("; ")
            }
            HubError::InvalidField { field, message } => format!("Pole '{}': {}", field, message),
            HubError::Storage(e) => {
                tracing::error!("Błąd lokalnej bazy danych: {:?}", e);
                "Błąd zapisu danych lokalnych".to_string()
            }
            HubError::Decode(_) | HubError::MixedPagingScheme { .. } => {
                "Nie można przetworzyć odpowiedzi serwera".to_string()
            }
            HubError::UploadTarget(_) | HubError::Transfer { .. } => {
                "Nie udało się wysłać obrazu".to_string()
            }
            HubError::Config(message) => message.clone(),
        }
    }
}
