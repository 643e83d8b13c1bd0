//! Numeric argument parsing for the `write` verb.
//!
//! A `0x`/`0X` prefix selects hexadecimal, anything else is decimal. The
//! lenient parser mirrors C `strtoul`: it consumes the longest valid digit
//! prefix, yields 0 when nothing parses, and saturates on overflow. The strict
//! parser rejects all of those cases instead.

use crate::error::ParseValueError;

fn split_radix(token: &str) -> (&str, u32) {
    match token.get(..2) {
        Some("0x" | "0X") => (&token[2..], 16),
        _ => (token, 10),
    }
}

/// Parses `token` the lenient way; malformed input becomes 0.
///
/// The radix is chosen from the raw token, so only an unsigned `0x`/`0X`
/// token is hexadecimal. Decimal tokens accept a leading `+`, and a leading
/// `-` negates modulo 2^32, matching `strtoul` on a 32-bit target.
#[must_use]
pub fn parse_value(token: &str) -> u32 {
    let (digits, radix) = split_radix(token);
    let (sign_negative, digits) = match (radix, digits.as_bytes().first()) {
        (10, Some(b'-')) => (true, &digits[1..]),
        (10, Some(b'+')) => (false, &digits[1..]),
        _ => (false, digits),
    };

    let mut value: u32 = 0;
    let mut saturated = false;
    for digit in digits.chars().map_while(|c| c.to_digit(radix)) {
        match value.checked_mul(radix).and_then(|v| v.checked_add(digit)) {
            Some(next) => value = next,
            None => {
                saturated = true;
                break;
            }
        }
    }

    if saturated {
        u32::MAX
    } else if sign_negative {
        value.wrapping_neg()
    } else {
        value
    }
}

/// Parses `token` strictly.
///
/// # Errors
///
/// Returns [`ParseValueError`] when digits are missing, a character is not
/// valid for the radix, or the value exceeds `u32::MAX`.
pub fn parse_value_strict(token: &str) -> Result<u32, ParseValueError> {
    let (digits, radix) = split_radix(token);
    if digits.is_empty() {
        return Err(ParseValueError::Empty(token.to_string()));
    }
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(ParseValueError::InvalidDigit(token.to_string()));
    }
    u32::from_str_radix(digits, radix).map_err(|_| ParseValueError::Overflow(token.to_string()))
}
