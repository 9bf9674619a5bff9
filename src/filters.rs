// src/filters.rs
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::errors::HubError;
use crate::models::{Product, ProductStatus};

pub const ALL_CATEGORIES: &str = "all";
const MIN_DISCOUNT: f64 = 0.0;
const MAX_DISCOUNT: f64 = 100.0;

/// Flaga trójstanowa: ustawiona, wyłączona albo bez znaczenia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TriState {
    #[default]
    Unset,
    Yes,
    No,
}

impl TriState {
    pub fn as_bool(self) -> Option<bool> {
        match self {
            TriState::Unset => None,
            TriState::Yes => Some(true),
            TriState::No => Some(false),
        }
    }

    pub fn matches(self, value: bool) -> bool {
        match self {
            TriState::Unset => true,
            TriState::Yes => value,
            TriState::No => !value,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    Price,
    Discount,
    Stock,
    CreatedAt,
    UpdatedAt,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Przedział domknięty; brak granicy oznacza brak ograniczenia.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        NumericRange { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    fn is_inverted(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if min > max)
    }

    fn has_non_finite_bound(&self) -> bool {
        [self.min, self.max]
            .into_iter()
            .flatten()
            .any(|bound| !bound.is_finite())
    }
}

/// Pełny zestaw filtrów i sortowania listy produktów w danej chwili.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub category: String,
    pub tags: BTreeSet<String>,
    pub price: NumericRange,
    pub discount: NumericRange,
    pub exclude_out_of_stock: bool,
    pub box_number: String,
    pub flagged: TriState,
    pub status: Option<ProductStatus>,
    pub sort_by: SortKey,
    pub order: SortOrder,
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState {
            category: ALL_CATEGORIES.to_string(),
            tags: BTreeSet::new(),
            price: NumericRange::default(),
            discount: NumericRange::default(),
            exclude_out_of_stock: false,
            box_number: String::new(),
            flagged: TriState::Unset,
            status: None,
            sort_by: SortKey::default(),
            order: SortOrder::default(),
        }
    }
}

/// Zdarzenia użytkownika zmieniające filtry.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEvent {
    CategorySelected(String),
    TagToggled(String),
    TagsCleared,
    PriceRangeChanged(NumericRange),
    DiscountRangeChanged(NumericRange),
    ExcludeOutOfStockChanged(bool),
    BoxNumberChanged(String),
    FlaggedChanged(TriState),
    StatusChanged(Option<ProductStatus>),
    SortChanged(SortKey, SortOrder),
    Reset,
}

impl FilterState {
    /// Nowy stan = f(stary stan, zdarzenie).
    pub fn apply(self, event: FilterEvent) -> FilterState {
        let mut next = self;
        match event {
            FilterEvent::CategorySelected(category) => {
                let category = category.trim();
                next.category = if category.is_empty() {
                    ALL_CATEGORIES.to_string()
                } else {
                    category.to_string()
                };
            }
            FilterEvent::TagToggled(tag) => {
                let tag = tag.trim().to_string();
                if !tag.is_empty() && !next.tags.remove(&tag) {
                    next.tags.insert(tag);
                }
            }
            FilterEvent::TagsCleared => next.tags.clear(),
            FilterEvent::PriceRangeChanged(range) => next.price = range,
            FilterEvent::DiscountRangeChanged(range) => next.discount = range,
            FilterEvent::ExcludeOutOfStockChanged(exclude) => next.exclude_out_of_stock = exclude,
            FilterEvent::BoxNumberChanged(text) => next.box_number = text.trim().to_string(),
            FilterEvent::FlaggedChanged(flagged) => next.flagged = flagged,
            FilterEvent::StatusChanged(status) => next.status = status,
            FilterEvent::SortChanged(sort_by, order) => {
                next.sort_by = sort_by;
                next.order = order;
            }
            FilterEvent::Reset => next = FilterState::default(),
        }
        next
    }

    pub fn is_all_categories(&self) -> bool {
        self.category.eq_ignore_ascii_case(ALL_CATEGORIES)
    }

    /// Sprawdzenie przed wysłaniem zapytania.
    pub fn validate(&self) -> Result<(), HubError> {
        if self.price.has_non_finite_bound() {
            return Err(HubError::invalid_field("price", "cena musi być liczbą"));
        }
        if self.discount.has_non_finite_bound() {
            return Err(HubError::invalid_field("discount", "rabat musi być liczbą"));
        }
        if self.price.is_inverted() {
            return Err(HubError::invalid_field(
                "price",
                "cena minimalna jest większa od maksymalnej",
            ));
        }
        if self.price.min.is_some_and(|v| v < 0.0) {
            return Err(HubError::invalid_field("price", "cena nie może być ujemna"));
        }
        if self.discount.is_inverted() {
            return Err(HubError::invalid_field(
                "discount",
                "rabat minimalny jest większy od maksymalnego",
            ));
        }
        let out_of_bounds = |v: f64| !(MIN_DISCOUNT..=MAX_DISCOUNT).contains(&v);
        if self.discount.min.is_some_and(out_of_bounds) || self.discount.max.is_some_and(out_of_bounds)
        {
            return Err(HubError::invalid_field(
                "discount",
                "rabat musi mieścić się w 0-100",
            ));
        }
        Ok(())
    }

    pub fn to_query(&self) -> ProductQuery {
        ProductQuery {
            category: (!self.is_all_categories()).then(|| self.category.clone()),
            tags: (!self.tags.is_empty())
                .then(|| self.tags.iter().cloned().collect::<Vec<_>>().join(",")),
            min_price: self.price.min,
            max_price: self.price.max,
            min_discount: self.discount.min,
            max_discount: self.discount.max,
            exclude_out_of_stock: self.exclude_out_of_stock.then_some(true),
            box_number: (!self.box_number.is_empty()).then(|| self.box_number.clone()),
            flagged: self.flagged.as_bool(),
            status: self.status,
            sort_by: self.sort_by,
            sort_order: self.order,
        }
    }

    /// Produkt niedostępny przy włączonym `exclude_out_of_stock`. To jedyny
    /// filtr egzekwowany lokalnie na stronie zwróconej przez serwer.
    pub fn hides_out_of_stock(&self, product: &Product) -> bool {
        self.exclude_out_of_stock && !product.in_stock
    }

    /// Lokalna ocena filtrów, wyłącznie diagnostyczna: o dopasowaniu
    /// rozstrzyga serwer. Tagi pomija.
    pub fn admits(&self, product: &Product) -> bool {
        if self.exclude_out_of_stock && !product.in_stock {
            return false;
        }
        if !self.flagged.matches(product.flagged) {
            return false;
        }
        if !self.is_all_categories() && !product.category.eq_ignore_ascii_case(&self.category) {
            return false;
        }
        if self.status.is_some_and(|status| status != product.status) {
            return false;
        }
        let effective_price = if product.selling_price > 0.0 {
            product.selling_price
        } else {
            product.mrp
        };
        if !self.price.contains(effective_price) || !self.discount.contains(product.discount) {
            return false;
        }
        if !self.box_number.is_empty() {
            let wanted = self.box_number.to_lowercase();
            let matches_box = product
                .box_number
                .as_deref()
                .is_some_and(|b| b.to_lowercase().contains(&wanted));
            if !matches_box {
                return false;
            }
        }
        true
    }
}

/// Parametry zapytania `GET /api/products` (bez numeru strony).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_out_of_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flagged: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}
