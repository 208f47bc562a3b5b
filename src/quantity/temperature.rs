//! Temperature rewriting in free text

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::models::TempUnit;

/// `<number>[°][degrees] <C|F|Celsius|Fahrenheit>`. Single letters must be
/// uppercase so "2 c flour" is left alone.
/// A bare C or F also needs a degree sign, the word "degrees", or a number of
/// at least two digits: "1 C sugar" is a cup.
static TEMPERATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d+(?:[.,]\d+)?)(\s*)(°\s*)?((?i:degrees?)\s*)?((?i:celsius|fahrenheit)|[CF])\b",
    )
    .expect("temperature pattern is valid")
});

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    (c * 9.0 / 5.0 + 32.0).round()
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    ((f - 32.0) * 5.0 / 9.0).round()
}

/// Rewrite every temperature in `text` into `target`.
///
/// Matches already in the target scale are left untouched. Spacing, the
/// degree sign and the word "degrees" are kept, and a long unit name stays
/// long ("350 degrees Fahrenheit" becomes "177 degrees Celsius").
pub fn convert_temperature_in_text(text: &str, target: TempUnit) -> String {
    TEMPERATURE
        .replace_all(text, |caps: &Captures| {
            let unit = &caps[5];
            let source = if unit.starts_with(['c', 'C']) {
                TempUnit::C
            } else {
                TempUnit::F
            };
            let marked = caps.get(3).is_some() || caps.get(4).is_some();
            if unit.len() == 1 && !marked && !has_two_digit_whole_part(&caps[1]) {
                return caps[0].to_string();
            }
            let Some(value) = caps[1].replace(',', ".").parse::<f64>().ok() else {
                return caps[0].to_string();
            };
            if source == target {
                return caps[0].to_string();
            }

            let converted = match target {
                TempUnit::F => celsius_to_fahrenheit(value),
                TempUnit::C => fahrenheit_to_celsius(value),
            };
            let label = if unit.len() == 1 {
                target.symbol()
            } else {
                target.long_name()
            };
            format!(
                "{}{}{}{}{}",
                converted,
                &caps[2],
                caps.get(3).map_or("", |m| m.as_str()),
                caps.get(4).map_or("", |m| m.as_str()),
                label
            )
        })
        .into_owned()
}

fn has_two_digit_whole_part(number: &str) -> bool {
    number
        .split(['.', ','])
        .next()
        .is_some_and(|whole| whole.len() >= 2)
}
