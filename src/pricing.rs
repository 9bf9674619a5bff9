// src/pricing.rs

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::HubError;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Cena sprzedaży = MRP * (100 - rabat) / 100, zaokrąglona "połówkę w górę"
/// do 2 miejsc po przecinku.
pub fn selling_price(mrp: Decimal, discount_percent: Decimal) -> Decimal {
    let mut price = (mrp * (HUNDRED - discount_percent) / HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    price.rescale(2);
    price
}

/// Parsuje kwotę wpisaną przez użytkownika (dopuszcza przecinek dziesiętny).
pub fn parse_amount(field: &str, text: &str) -> Result<Decimal, HubError> {
    let value = parse_decimal(field, text)?;
    if value.is_sign_negative() {
        return Err(HubError::invalid_field(field, "kwota nie może być ujemna"));
    }
    Ok(value)
}

/// Parsuje rabat procentowy z przedziału 0-100.
pub fn parse_discount(field: &str, text: &str) -> Result<Decimal, HubError> {
    if text.trim().is_empty() {
        return Ok(Decimal::ZERO);
    }
    let value = parse_decimal(field, text)?;
    if value < Decimal::ZERO || value > HUNDRED {
        return Err(HubError::invalid_field(field, "rabat musi mieścić się w 0-100"));
    }
    Ok(value)
}

fn parse_decimal(field: &str, text: &str) -> Result<Decimal, HubError> {
    let normalized = text.trim().replace(',', ".");
    if normalized.is_empty() {
        return Err(HubError::invalid_field(field, "pole jest wymagane"));
    }
    Decimal::from_str(&normalized)
        .map_err(|_| HubError::invalid_field(field, "wartość musi być liczbą"))
}

pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn ten_percent_off_one_thousand() {
        let price = selling_price(dec("1000"), dec("10"));
        assert_eq!(price, dec("900.00"));
        assert_eq!(price.to_string(), "900.00");
    }

    #[test]
    fn thirty_three_percent_off_999_99() {
        assert_eq!(selling_price(dec("999.99"), dec("33")), dec("669.99"));
    }

    #[test]
    fn rounds_half_up() {
        // 0.05 * 0.5 = 0.025 -> 0.03
        assert_eq!(selling_price(dec("0.05"), dec("50")), dec("0.03"));
        assert_eq!(selling_price(dec("19.99"), dec("0")), dec("19.99"));
    }

    #[test]
    fn rejects_malformed_input_before_any_request() {
        assert!(matches!(
            parse_amount("mrp", "12a"),
            Err(HubError::InvalidField { ref field, .. }) if field == "mrp"
        ));
        assert!(parse_amount("mrp", "  ").is_err());
        assert!(parse_amount("mrp", "-5").is_err());
        assert_eq!(parse_amount("mrp", " 12,50 ").unwrap(), dec("12.50"));

        assert!(parse_discount("discount", "101").is_err());
        assert_eq!(parse_discount("discount", "").unwrap(), Decimal::ZERO);
    }
}
