//! Price Fixtures

use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};

use crate::{attributes::PriceModifier, fixtures::FixtureError, pricing::round_to_currency};

/// Parse a price string (e.g., "24.99 EUR") into money.
///
/// Any ISO 4217 currency code is accepted. Amounts with more decimals than the
/// currency has minor units are rounded half away from zero.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if the
/// amount is not a decimal number, or if the currency code is not recognized.
pub fn parse_price(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = iso::find(currency_code)
        .ok_or_else(|| FixtureError::UnknownCurrency((*currency_code).to_string()))?;

    round_to_currency(amount, currency).map_err(|_err| FixtureError::InvalidPrice(s.to_string()))
}

/// Parse a price modifier string.
///
/// Accepts two formats:
/// - Percentage format: "10%" adds 10% of the running price
/// - Flat format: "+5.00", "5" or "-2.50" adds that amount
///
/// # Errors
///
/// Returns an error if the number cannot be parsed.
pub fn parse_modifier(s: &str) -> Result<PriceModifier, FixtureError> {
    let trimmed = s.trim();

    let (number, percentage) = match trimmed.strip_suffix('%') {
        Some(percent_str) => (percent_str.trim(), true),
        None => (trimmed, false),
    };

    let value = number
        .strip_prefix('+')
        .unwrap_or(number)
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidModifier(s.to_string()))?;

    Ok(if percentage {
        PriceModifier::Percentage(value)
    } else {
        PriceModifier::Flat(value)
    })
}
