//! Quantity parsing
//!
//! Reads a numeric magnitude and a unit word from the start of free text
//! such as "1 1/2 cups milk" or "2 large eggs".

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::units::Unit;

/// Leading magnitude: mixed number, fraction, decimal (dot or comma) or integer.
/// Alternatives are ordered so "1 1/2" wins over "1".
const MAGNITUDE: &str = r"\d+(?:\s+|-)\d+/\d+|\d+/\d+|\d+(?:[.,]\d+)?|[.,]\d+";

static LEADING_MAGNITUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*({MAGNITUDE})")).expect("leading magnitude pattern is valid")
});

static MIXED_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)(?:\s+|-)(\d+)/(\d+)$").expect("mixed number pattern is valid")
});

static FRACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)/(\d+)$").expect("fraction pattern is valid"));

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+(?:[.,]\d+)?|[.,]\d+)$").expect("decimal pattern is valid"));

/// Optional size word, then the unit word
static UNIT_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\s*(?:extra[\s-]?large|large|medium|small|xl)\b)?\s*([a-z]+)\b\.?")
        .expect("unit word pattern is valid")
});

/// A number found at the start of a string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeadingNumber {
    pub value: f64,
    /// Byte offset just past the number
    pub end: usize,
}

/// Result of [`parse_quantity_unit`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQuantity {
    pub magnitude: f64,
    /// `None` when the word after the number is not in the recognized vocabulary
    pub unit: Option<Unit>,
    /// Text after the number and unit
    pub rest: String,
}

/// Parse a magnitude token.
///
/// Accepts integers, decimals with a dot or comma separator, fractions
/// ("3/4") and mixed numbers ("1 1/2", "1-1/2"). A zero denominator or any
/// other malformed token yields `None`.
pub fn parse_magnitude(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    if let Some(caps) = MIXED_NUMBER.captures(token) {
        let whole: f64 = caps[1].parse().ok()?;
        return divide(&caps[2], &caps[3]).map(|frac| whole + frac);
    }

    if let Some(caps) = FRACTION.captures(token) {
        return divide(&caps[1], &caps[2]);
    }

    if DECIMAL.is_match(token) {
        return token.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite());
    }

    None
}

fn divide(numerator: &str, denominator: &str) -> Option<f64> {
    let num: f64 = numerator.parse().ok()?;
    let den: f64 = denominator.parse().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

/// Read the magnitude at the very start of `text`, if any.
pub fn leading_magnitude(text: &str) -> Option<LeadingNumber> {
    let caps = LEADING_MAGNITUDE.captures(text)?;
    let token = caps.get(1)?;
    let value = parse_magnitude(token.as_str())?;
    Some(LeadingNumber {
        value,
        end: token.end(),
    })
}

/// Scan `text` for a leading magnitude followed by an optional unit word.
///
/// Returns `None` only when no leading number exists. A number followed by
/// an unrecognized word comes back with `unit: None`, which callers treat
/// the same as "no usable quantity".
pub fn parse_quantity_unit(text: &str) -> Option<ParsedQuantity> {
    let number = leading_magnitude(text)?;
    let after = &text[number.end..];

    let (unit, rest) = match UNIT_WORD.captures(after) {
        Some(caps) => match caps.get(1).and_then(|w| Unit::from_word(w.as_str())) {
            Some(unit) => {
                let consumed = caps.get(0).map_or(0, |m| m.end());
                (Some(unit), &after[consumed..])
            }
            None => (None, after),
        },
        None => (None, after),
    };

    Some(ParsedQuantity {
        magnitude: number.value,
        unit,
        rest: rest.trim().to_string(),
    })
}
