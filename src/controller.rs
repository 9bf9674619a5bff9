// src/controller.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::HubError;
use crate::filters::{FilterEvent, FilterState};
use crate::pagination::{LoadedPage, PageRequest, PageResult, PageToken, closest_page_index};
use crate::paging::PagingSource;

static NEXT_CONTROLLER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadDirection {
    Refresh,
    Append,
    Prepend,
}

/// Idle → Loading(kierunek) → {Loaded | Errored}; z Loaded/Errored można
/// zacząć kolejne pobranie.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading(LoadDirection),
    Loaded,
    Errored {
        direction: LoadDirection,
        message: String,
    },
}

/// Zlecenie pobrania jednej strony, wydane przez konkretny kontroler
/// dla konkretnej generacji filtrów.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    controller_id: u64,
    generation: u64,
    direction: LoadDirection,
    request: PageRequest,
    leading_offset: usize,
}

impl LoadTicket {
    pub fn request(&self) -> &PageRequest {
        &self.request
    }

    pub fn direction(&self) -> LoadDirection {
        self.direction
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    Applied {
        direction: LoadDirection,
        count: usize,
    },
    /// Wynik dla nieaktualnych filtrów albo innego kontrolera; odrzucony.
    Stale,
    Failed(HubError),
}

/// Jedno pobranie strony dla zlecenia; można je uruchomić w osobnym zadaniu.
pub async fn fetch_page<S: PagingSource>(
    source: &S,
    ticket: &LoadTicket,
) -> Result<PageResult<S::Item>, HubError> {
    source.load_page(&ticket.request).await
}

/// Lista doładowywana stronami dla jednego źródła i jednego zestawu filtrów.
///
/// Wszystkie pozycje przyjmowane przez kontroler (`item`, `refresh_key`,
/// `begin_refresh`, `refresh`) są bezwzględne: liczone od początku pełnej
/// listy serwera, więc pierwszy załadowany element ma pozycję
/// `leading_offset()`. Indeks w załadowanych stronach, którego używa
/// `PagingSource::refresh_key`, powstaje wyłącznie w `loaded_index`.
pub struct PagedListController<S: PagingSource> {
    id: u64,
    source: Arc<S>,
    filters: FilterState,
    pages: Vec<LoadedPage<S::Item>>,
    leading_offset: usize,
    total: Option<u64>,
    generation: u64,
    state: LoadState,
    failed: Option<LoadTicket>,
}

impl<S: PagingSource> PagedListController<S> {
    pub fn new(source: Arc<S>, filters: FilterState) -> Self {
        PagedListController {
            id: NEXT_CONTROLLER_ID.fetch_add(1, Ordering::Relaxed),
            source,
            filters,
            pages: Vec::new(),
            leading_offset: 0,
            total: None,
            generation: 0,
            state: LoadState::Idle,
            failed: None,
        }
    }

    pub fn source(&self) -> Arc<S> {
        self.source.clone()
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading(_))
    }

    pub fn pages(&self) -> &[LoadedPage<S::Item>] {
        &self.pages
    }

    pub fn items(&self) -> impl Iterator<Item = &S::Item> {
        self.pages.iter().flat_map(|p| p.items.iter())
    }

    pub fn len(&self) -> usize {
        self.pages.iter().map(|p| p.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bezwzględna pozycja pierwszego załadowanego elementu.
    pub fn leading_offset(&self) -> usize {
        self.leading_offset
    }

    /// Element pod bezwzględną pozycją listy (uwzględnia `leading_offset`).
    pub fn item(&self, position: usize) -> Option<&S::Item> {
        let relative = position.checked_sub(self.leading_offset)?;
        self.items().nth(relative)
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn has_more_forward(&self) -> bool {
        self.pages.last().is_some_and(|p| p.next.is_some())
    }

    pub fn has_more_backward(&self) -> bool {
        self.pages.first().is_some_and(|p| p.prev.is_some())
    }

    /// Bezwzględna pozycja przeliczona na indeks w załadowanych stronach,
    /// w jakim pracuje `PagingSource::refresh_key`.
    fn loaded_index(&self, position: usize) -> usize {
        position.saturating_sub(self.leading_offset)
    }

    /// Token, od którego zacznie się pełne odświeżenie wokół `position`.
    pub fn refresh_key(&self, position: Option<usize>) -> Option<PageToken> {
        let anchor = position.map(|p| self.loaded_index(p));
        self.source.refresh_key(&self.pages, anchor)
    }

    fn ticket(&mut self, direction: LoadDirection, token: Option<PageToken>) -> LoadTicket {
        self.state = LoadState::Loading(direction);
        LoadTicket {
            controller_id: self.id,
            generation: self.generation,
            direction,
            request: PageRequest::new(token, self.source.page_size(), self.filters.clone()),
            leading_offset: self.leading_offset,
        }
    }

    /// Pełne odświeżenie. Zastępuje każde trwające pobranie.
    /// `position` to bezwzględna pozycja, przy której stoi użytkownik.
    pub fn begin_refresh(&mut self, position: Option<usize>) -> LoadTicket {
        let key = self.refresh_key(position);
        let leading_offset = match (position, &key) {
            (Some(position), Some(_)) => closest_page_index(&self.pages, self.loaded_index(position))
                .map_or(0, |(_, before)| self.leading_offset + before),
            _ => 0,
        };
        self.generation += 1;
        self.failed = None;
        tracing::debug!(
            "Kontroler {}: odświeżenie od {:?} (generacja {})",
            self.id,
            key,
            self.generation
        );
        let mut ticket = self.ticket(LoadDirection::Refresh, key);
        ticket.leading_offset = leading_offset;
        ticket
    }

    /// Doładowanie w przód lub wstecz. `None`, gdy trwa inne pobranie
    /// albo kierunek jest wyczerpany.
    pub fn begin(&mut self, direction: LoadDirection) -> Option<LoadTicket> {
        if self.is_loading() {
            tracing::debug!("Kontroler {}: pobranie już trwa, pomijam", self.id);
            return None;
        }
        let token = match direction {
            LoadDirection::Refresh => return Some(self.begin_refresh(None)),
            LoadDirection::Append => self.pages.last()?.next.clone()?,
            LoadDirection::Prepend => self.pages.first()?.prev.clone()?,
        };
        Some(self.ticket(direction, Some(token)))
    }

    /// Ponowienie ostatniego nieudanego pobrania z tymi samymi argumentami.
    pub fn begin_retry(&mut self) -> Option<LoadTicket> {
        if !matches!(self.state, LoadState::Errored { .. }) {
            return None;
        }
        let ticket = self.failed.take()?;
        if ticket.generation != self.generation {
            return None;
        }
        self.state = LoadState::Loading(ticket.direction);
        Some(ticket)
    }

    /// Nowe filtry: lista jest czyszczona od razu, a wynik każdego
    /// trwającego pobrania zostanie odrzucony.
    pub fn set_filters(&mut self, filters: FilterState) -> Option<LoadTicket> {
        if filters == self.filters {
            return None;
        }
        self.filters = filters;
        self.pages.clear();
        self.leading_offset = 0;
        self.total = None;
        self.generation += 1;
        self.failed = None;
        tracing::info!(
            "Kontroler {}: zmiana filtrów, generacja {}",
            self.id,
            self.generation
        );
        Some(self.ticket(LoadDirection::Refresh, None))
    }

    pub fn apply_filter(&mut self, event: FilterEvent) -> Option<LoadTicket> {
        let next = self.filters.clone().apply(event);
        self.set_filters(next)
    }

    /// Dołącza wynik zlecenia do listy, o ile zlecenie jest nadal aktualne.
    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        result: Result<PageResult<S::Item>, HubError>,
    ) -> LoadOutcome {
        if ticket.controller_id != self.id
            || ticket.generation != self.generation
            || self.state != LoadState::Loading(ticket.direction)
        {
            tracing::debug!(
                "Kontroler {}: odrzucono nieaktualny wynik (generacja {} != {})",
                self.id,
                ticket.generation,
                self.generation
            );
            return LoadOutcome::Stale;
        }

        let page = match result.and_then(|page| {
            page.ensure_scheme(self.source.scheme())?;
            Ok(page)
        }) {
            Ok(page) => page,
            Err(error) => {
                tracing::warn!(
                    "Kontroler {}: błąd ładowania strony {:?}: {}",
                    self.id,
                    ticket.request.token,
                    error
                );
                self.state = LoadState::Errored {
                    direction: ticket.direction,
                    message: error.user_message(),
                };
                self.failed = Some(ticket);
                return LoadOutcome::Failed(error);
            }
        };

        let count = page.items.len();
        if page.total.is_some() {
            self.total = page.total;
        }
        let direction = ticket.direction;
        let loaded = LoadedPage::new(ticket.request.token, page);
        match direction {
            LoadDirection::Refresh => {
                self.pages = vec![loaded];
                self.leading_offset = ticket.leading_offset;
            }
            LoadDirection::Append => self.pages.push(loaded),
            LoadDirection::Prepend => {
                self.leading_offset = self.leading_offset.saturating_sub(count);
                self.pages.insert(0, loaded);
            }
        }
        self.state = LoadState::Loaded;
        self.failed = None;
        tracing::debug!(
            "Kontroler {}: {:?} +{} pozycji (razem {})",
            self.id,
            direction,
            count,
            self.len()
        );
        LoadOutcome::Applied { direction, count }
    }

    async fn run(&mut self, ticket: LoadTicket) -> LoadOutcome {
        let source = self.source.clone();
        let result = fetch_page(source.as_ref(), &ticket).await;
        self.complete(ticket, result)
    }

    pub async fn refresh(&mut self, position: Option<usize>) -> LoadOutcome {
        let ticket = self.begin_refresh(position);
        self.run(ticket).await
    }

    pub async fn load_more(&mut self) -> Option<LoadOutcome> {
        let ticket = self.begin(LoadDirection::Append)?;
        Some(self.run(ticket).await)
    }

    pub async fn load_previous(&mut self) -> Option<LoadOutcome> {
        let ticket = self.begin(LoadDirection::Prepend)?;
        Some(self.run(ticket).await)
    }

    pub async fn retry(&mut self) -> Option<LoadOutcome> {
        let ticket = self.begin_retry()?;
        Some(self.run(ticket).await)
    }

    pub async fn update_filters(&mut self, event: FilterEvent) -> Option<LoadOutcome> {
        let ticket = self.apply_filter(event)?;
        Some(self.run(ticket).await)
    }
}
