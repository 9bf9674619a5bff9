// src/response.rs

use serde::{Deserialize, Serialize};

use crate::errors::HubError;

/// Wspólna koperta wszystkich odpowiedzi API:
/// `{success, message?, data, pagination?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetPagination {
    pub page: u32,
    pub pages: u32,
    pub per_page: u32,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorPagination {
    pub has_next: bool,
    pub has_previous: bool,
    #[serde(default)]
    pub next_page_info: Option<String>,
    #[serde(default)]
    pub previous_page_info: Option<String>,
}

/// Dwa warianty metadanych stronicowania zwracane przez serwer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pagination {
    Offset(OffsetPagination),
    Cursor(CursorPagination),
}

impl<T> ApiResponse<T> {
    fn check(&self) -> Result<(), HubError> {
        if self.success {
            return Ok(());
        }
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| "Nieznany błąd serwera".to_string());
        tracing::warn!("Serwer zwrócił success=false: {}", message);
        Err(HubError::Server { message })
    }

    /// Zwraca `data` albo błąd serwera.
    pub fn into_data(self) -> Result<T, HubError> {
        self.check()?;
        self.data.ok_or_else(|| HubError::Server {
            message: "Odpowiedź serwera nie zawiera danych".to_string(),
        })
    }

    /// Dla odpowiedzi bez treści (np. DELETE) wystarczy `success: true`.
    pub fn into_unit(self) -> Result<(), HubError> {
        self.check()
    }

    pub fn into_page(self) -> Result<(T, Option<Pagination>), HubError> {
        self.check()?;
        let pagination = self.pagination;
        let data = self.data.ok_or_else(|| HubError::Server {
            message: "Odpowiedź serwera nie zawiera danych".to_string(),
        })?;
        Ok((data, pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_offset_and_cursor_pagination() {
        let offset: ApiResponse<Vec<u32>> = serde_json::from_str(
            r#"{"success": true, "data": [1, 2],
                "pagination": {"page": 2, "pages": 5, "per_page": 2, "total": 10}}"#,
        )
        .unwrap();
        assert!(matches!(
            offset.pagination,
            Some(Pagination::Offset(OffsetPagination { page: 2, pages: 5, .. }))
        ));

        let cursor: ApiResponse<Vec<u32>> = serde_json::from_str(
            r#"{"success": true, "data": [],
                "pagination": {"has_next": true, "has_previous": false,
                               "next_page_info": "eyJsYXN0X2lkIjo0fQ", "previous_page_info": null}}"#,
        )
        .unwrap();
        match cursor.pagination {
            Some(Pagination::Cursor(c)) => {
                assert!(c.has_next);
                assert_eq!(c.next_page_info.as_deref(), Some("eyJsYXN0X2lkIjo0fQ"));
            }
            other => panic!("oczekiwano kursora, otrzymano {:?}", other),
        }
    }

    #[test]
    fn success_false_becomes_server_error() {
        let response: ApiResponse<Vec<u32>> =
            serde_json::from_str(r#"{"success": false, "message": "SKU już istnieje"}"#).unwrap();
        match response.into_data() {
            Err(HubError::Server { message }) => assert_eq!(message, "SKU już istnieje"),
            other => panic!("nieoczekiwany wynik: {:?}", other),
        }
    }

    #[test]
    fn unit_responses_need_no_data() {
        let response: ApiResponse<serde_json::Value> =
            serde_json::from_str(r#"{"success": true, "message": "Usunięto"}"#).unwrap();
        assert!(response.into_unit().is_ok());
    }
}
