// src/pagination.rs
use std::fmt;

use crate::errors::HubError;
use crate::filters::FilterState;
use crate::response::{CursorPagination, OffsetPagination, Pagination};

pub const MAX_PAGE_SIZE: u32 = 100;

/// Adres strony: numer (od 1) albo nieprzezroczysty kursor serwera.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageToken {
    Page(u32),
    Cursor(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScheme {
    Numbered,
    Cursor,
}

impl fmt::Display for TokenScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenScheme::Numbered => write!(f, "numer strony"),
            TokenScheme::Cursor => write!(f, "kursor"),
        }
    }
}

impl PageToken {
    pub fn scheme(&self) -> TokenScheme {
        match self {
            PageToken::Page(_) => TokenScheme::Numbered,
            PageToken::Cursor(_) => TokenScheme::Cursor,
        }
    }

    pub fn page_number(&self) -> Option<u32> {
        match self {
            PageToken::Page(n) => Some(*n),
            PageToken::Cursor(_) => None,
        }
    }

    pub fn cursor(&self) -> Option<&str> {
        match self {
            PageToken::Page(_) => None,
            PageToken::Cursor(c) => Some(c),
        }
    }
}

/// Jedno żądanie strony. Tworzone na nowo dla każdego pobrania.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub token: Option<PageToken>,
    pub page_size: u32,
    pub filters: FilterState,
}

impl PageRequest {
    pub fn new(token: Option<PageToken>, page_size: u32, filters: FilterState) -> Self {
        PageRequest {
            token,
            page_size: clamp_page_size(page_size),
            filters,
        }
    }

    /// Numer strony do wysłania; brak tokenu oznacza pierwszą stronę.
    pub fn page_number(&self) -> Result<u32, HubError> {
        match &self.token {
            None => Ok(1),
            Some(PageToken::Page(n)) => Ok((*n).max(1)),
            Some(other) => Err(mixed(TokenScheme::Numbered, other.scheme())),
        }
    }

    /// Kursor do wysłania; brak tokenu oznacza pierwszą stronę.
    pub fn cursor(&self) -> Result<Option<&str>, HubError> {
        match &self.token {
            None => Ok(None),
            Some(PageToken::Cursor(c)) => Ok(Some(c)),
            Some(other) => Err(mixed(TokenScheme::Cursor, other.scheme())),
        }
    }
}

pub fn clamp_page_size(size: u32) -> u32 {
    size.clamp(1, MAX_PAGE_SIZE)
}

fn mixed(expected: TokenScheme, found: TokenScheme) -> HubError {
    HubError::MixedPagingScheme {
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

/// Pojedyncza pobrana strona.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub prev: Option<PageToken>,
    pub next: Option<PageToken>,
    pub total: Option<u64>,
}

impl<T> PageResult<T> {
    pub fn has_more_forward(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_more_backward(&self) -> bool {
        self.prev.is_some()
    }

    pub fn from_offset(items: Vec<T>, meta: &OffsetPagination) -> Self {
        let page = meta.page.max(1);
        PageResult {
            items,
            prev: (page > 1).then(|| PageToken::Page(page - 1)),
            next: (page < meta.pages).then(|| PageToken::Page(page + 1)),
            total: meta.total,
        }
    }

    pub fn from_cursor(items: Vec<T>, meta: &CursorPagination) -> Self {
        let token = |has: bool, info: &Option<String>| {
            info.as_ref()
                .filter(|i| has && !i.is_empty())
                .map(|i| PageToken::Cursor(i.clone()))
        };
        PageResult {
            items,
            prev: token(meta.has_previous, &meta.previous_page_info),
            next: token(meta.has_next, &meta.next_page_info),
            total: None,
        }
    }

    /// Buduje wynik z metadanych koperty, pilnując oczekiwanego schematu.
    pub fn from_pagination(
        items: Vec<T>,
        pagination: Option<&Pagination>,
        scheme: TokenScheme,
    ) -> Result<Self, HubError> {
        match (pagination, scheme) {
            (Some(Pagination::Offset(meta)), TokenScheme::Numbered) => {
                Ok(Self::from_offset(items, meta))
            }
            (Some(Pagination::Cursor(meta)), TokenScheme::Cursor) => {
                Ok(Self::from_cursor(items, meta))
            }
            (Some(Pagination::Offset(_)), TokenScheme::Cursor) => {
                Err(mixed(TokenScheme::Cursor, TokenScheme::Numbered))
            }
            (Some(Pagination::Cursor(_)), TokenScheme::Numbered) => {
                Err(mixed(TokenScheme::Numbered, TokenScheme::Cursor))
            }
            // Brak metadanych: wszystko zmieściło się na jednej stronie.
            (None, _) => Ok(PageResult {
                total: Some(items.len() as u64),
                items,
                prev: None,
                next: None,
            }),
        }
    }

    /// Sprawdza, czy tokeny wyniku należą do schematu źródła.
    pub fn ensure_scheme(&self, scheme: TokenScheme) -> Result<(), HubError> {
        for token in [&self.prev, &self.next].into_iter().flatten() {
            if token.scheme() != scheme {
                return Err(mixed(scheme, token.scheme()));
            }
        }
        Ok(())
    }
}

/// Strona już dołączona do listy, razem z tokenem, który ją wyprodukował.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPage<T> {
    pub key: Option<PageToken>,
    pub items: Vec<T>,
    pub prev: Option<PageToken>,
    pub next: Option<PageToken>,
}

impl<T> LoadedPage<T> {
    pub fn new(key: Option<PageToken>, result: PageResult<T>) -> Self {
        LoadedPage {
            key,
            items: result.items,
            prev: result.prev,
            next: result.next,
        }
    }
}

/// Indeks strony zawierającej element `anchor` (albo najbliższej mu)
/// razem z liczbą elementów na stronach przed nią.
pub fn closest_page_index<T>(pages: &[LoadedPage<T>], anchor: usize) -> Option<(usize, usize)> {
    let mut offset = 0usize;
    let mut last_non_empty = None;
    for (index, page) in pages.iter().enumerate() {
        if page.items.is_empty() {
            continue;
        }
        if anchor < offset + page.items.len() {
            return Some((index, offset));
        }
        last_non_empty = Some((index, offset));
        offset += page.items.len();
    }
    last_non_empty.or_else(|| (!pages.is_empty()).then_some((0, 0)))
}

pub fn closest_page_to<T>(pages: &[LoadedPage<T>], anchor: usize) -> Option<&LoadedPage<T>> {
    closest_page_index(pages, anchor).map(|(index, _)| &pages[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(key: Option<u32>, items: Vec<u32>, prev: Option<u32>, next: Option<u32>) -> LoadedPage<u32> {
        LoadedPage {
            key: key.map(PageToken::Page),
            items,
            prev: prev.map(PageToken::Page),
            next: next.map(PageToken::Page),
        }
    }

    #[test]
    fn offset_metadata_maps_to_neighbouring_pages() {
        let meta = OffsetPagination {
            page: 2,
            pages: 3,
            per_page: 10,
            total: Some(25),
        };
        let result = PageResult::from_offset(vec![1, 2], &meta);
        assert_eq!(result.prev, Some(PageToken::Page(1)));
        assert_eq!(result.next, Some(PageToken::Page(3)));
        assert_eq!(result.total, Some(25));

        let last = OffsetPagination { page: 3, ..meta };
        assert!(!PageResult::from_offset(vec![1], &last).has_more_forward());
    }

    #[test]
    fn cursor_flags_win_over_stale_page_info() {
        let meta = CursorPagination {
            has_next: false,
            has_previous: true,
            next_page_info: Some("nieaktualny".to_string()),
            previous_page_info: Some("abc".to_string()),
        };
        let result = PageResult::from_cursor(Vec::<u32>::new(), &meta);
        assert_eq!(result.next, None);
        assert_eq!(result.prev, Some(PageToken::Cursor("abc".to_string())));
    }

    #[test]
    fn mismatched_envelope_is_rejected() {
        let meta = Pagination::Offset(OffsetPagination {
            page: 1,
            pages: 2,
            per_page: 10,
            total: None,
        });
        let err = PageResult::from_pagination(vec![1u32], Some(&meta), TokenScheme::Cursor)
            .unwrap_err();
        assert!(matches!(err, HubError::MixedPagingScheme { .. }));
    }

    #[test]
    fn request_refuses_foreign_token() {
        let request = PageRequest::new(
            Some(PageToken::Cursor("x".to_string())),
            500,
            FilterState::default(),
        );
        assert_eq!(request.page_size, MAX_PAGE_SIZE);
        assert!(request.page_number().is_err());
        assert_eq!(request.cursor().unwrap(), Some("x"));
    }

    #[test]
    fn finds_page_holding_anchor() {
        let pages = vec![
            page(None, vec![1, 2, 3], None, Some(2)),
            page(Some(2), vec![4, 5, 6], Some(1), Some(3)),
        ];
        assert_eq!(closest_page_to(&pages, 0).unwrap().key, None);
        assert_eq!(closest_page_to(&pages, 4).unwrap().key, Some(PageToken::Page(2)));
        assert_eq!(closest_page_to(&pages, 99).unwrap().key, Some(PageToken::Page(2)));
        assert!(closest_page_to::<u32>(&[], 0).is_none());
        assert_eq!(closest_page_index(&pages, 4), Some((1, 3)));
        assert_eq!(closest_page_index(&pages, 99), Some((1, 3)));
    }
}
