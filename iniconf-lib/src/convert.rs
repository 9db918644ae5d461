//! String coercions behind the typed getters and setters.
//!
//! Parsing is strict: the whole value must be a number, so `"30abc"` is rejected rather than read as `30`.

use std::num::IntErrorKind;

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionError {
    #[error("not a valid number")]
    InvalidFormat,
    #[error("number out of range")]
    OutOfRange,
}

pub fn parse_int(text: &str) -> Result<i64, ConversionError> {
    text.parse::<i64>().map_err(|error| match error.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ConversionError::OutOfRange,
        _ => ConversionError::InvalidFormat,
    })
}

/// Overflow to infinity and underflow of a non-zero literal to zero are `OutOfRange`.
pub fn parse_double(text: &str) -> Result<f64, ConversionError> {
    let value = text.parse::<f64>().map_err(|_| ConversionError::InvalidFormat)?;

    if value.is_infinite() && !is_infinity_literal(text) {
        return Err(ConversionError::OutOfRange);
    }
    if value == 0.0 && has_nonzero_mantissa(text) {
        return Err(ConversionError::OutOfRange);
    }

    Ok(value)
}

pub fn parse_bool(text: &str) -> bool {
    ["true", "t", "1"].iter().any(|truthy| text.eq_ignore_ascii_case(truthy))
}

pub fn bool_to_string(value: bool) -> String {
    let text = if value { "true" } else { "false" };
    text.to_string()
}

pub fn int_to_string(value: i64) -> String {
    value.to_string()
}

pub fn double_to_string(value: f64) -> String {
    value.to_string()
}

fn is_infinity_literal(text: &str) -> bool {
    let unsigned = text.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

fn has_nonzero_mantissa(text: &str) -> bool {
    text.chars()
        .take_while(|c| !matches!(c, 'e' | 'E'))
        .any(|c| matches!(c, '1'..='9'))
}
