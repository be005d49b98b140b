use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;
use validator::ValidationError;

lazy_static! {
    // Prices are stored as DECIMAL(10, 2): at most 8 integer digits and 2 decimals.
    static ref PRICE_PATTERN: Regex =
        Regex::new(r"^\d{1,8}(?:[.,]\d{1,2})?$").expect("price pattern is valid");
}

/// Raw text that could not be turned into the value a field expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field}: '{value}'")]
pub struct InputError {
    pub field: &'static str,
    pub value: String,
}

impl InputError {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Parse a unit price as painted by the catalog, accepting either `.` or `,`
/// as the decimal separator (`"10.50"`, `"10,50"`).
pub fn parse_price(text: &str) -> Result<Decimal, InputError> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();

    if !PRICE_PATTERN.is_match(trimmed) {
        return Err(InputError::new("price", text));
    }

    Decimal::from_str(&trimmed.replace(',', ".")).map_err(|_| InputError::new("price", text))
}

/// Check an amount loaded from the catalog against the limits typed prices
/// get: not negative, at most 8 integer digits and 2 decimals.
pub fn check_amount(amount: Decimal) -> Result<Decimal, InputError> {
    parse_price(&amount.normalize().to_string())
}

/// Price text as the server's decimal field expects it: no `$`, `.` as the
/// separator. Unparseable text is passed through trimmed for validation to
/// report.
pub fn normalize_price_text(text: &str) -> String {
    parse_price(text)
        .map(|price| price.to_string())
        .unwrap_or_else(|_| text.trim().to_string())
}

/// Parse a requested quantity. Zero and negative values are valid input here;
/// the managers decide what they mean.
pub fn parse_quantity(text: &str) -> Result<i64, InputError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| InputError::new("quantity", text))
}

pub fn parse_stock(text: &str) -> Result<u32, InputError> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| InputError::new("stock", text))
}

/// `validator` hook rejecting whitespace-only values.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

pub fn validate_price_text(value: &str) -> Result<(), ValidationError> {
    parse_price(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("price"))
}

pub fn validate_stock_text(value: &str) -> Result<(), ValidationError> {
    parse_stock(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("stock"))
}
