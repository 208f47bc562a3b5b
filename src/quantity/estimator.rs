//! Gram estimation
//!
//! Turns a free-text quantity ("2 large eggs", "1 14.5 oz can") and an
//! ingredient name into grams. Strategies run in a fixed order and the first
//! positive result wins. Zero means "could not estimate".

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::parser::{leading_magnitude, parse_magnitude, parse_quantity_unit};
use super::tables::ConversionTables;
use super::text::{clean_line, decode_entities, normalize_whitespace};
use super::units::{SizeHint, Unit, G_PER_OZ};

/// Grams in a pinch of salt
pub const PINCH_SALT_G: f64 = 0.36;
/// Grams in a pinch of anything else
pub const PINCH_G: f64 = 0.2;

static PINCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bpinch(?:es)?\b").expect("pinch pattern is valid"));

static CAN_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcan(?:s|ned)?\b").expect("can pattern is valid"));

static OUNCES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\s+\d+/\d+|/\d+|\.\d+)?)\s*(?:-|\s)?(?:ounces?|oz)\b")
        .expect("ounce pattern is valid")
});

/// Words between the number and the volume unit the density fallback skips
/// ("1 heaping cup", "2 level tbsp")
const DENSITY_UNIT_LOOKAHEAD: usize = 4;

/// One heuristic in the cascade
pub struct Strategy {
    pub name: &'static str,
    estimate: fn(&str, &str, &ConversionTables) -> Option<f64>,
}

impl Strategy {
    pub fn run(&self, text: &str, name: &str, tables: &ConversionTables) -> Option<f64> {
        (self.estimate)(text, name, tables).filter(|g| g.is_finite() && *g > 0.0)
    }
}

/// The estimation cascade, in evaluation order
pub const CASCADE: [Strategy; 5] = [
    Strategy {
        name: "pinch",
        estimate: pinch,
    },
    Strategy {
        name: "canned",
        estimate: canned,
    },
    Strategy {
        name: "whole_unit",
        estimate: whole_unit,
    },
    Strategy {
        name: "smart_unit",
        estimate: smart_unit,
    },
    Strategy {
        name: "density",
        estimate: density_fallback,
    },
];

/// Estimated grams plus the strategy that produced them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub grams: f64,
    /// `None` when every strategy declined
    pub strategy: Option<&'static str>,
}

/// Run the cascade and report which strategy answered
pub fn estimate(quantity_text: &str, ingredient_name: &str, tables: &ConversionTables) -> Estimate {
    let text = clean_line(&decode_entities(quantity_text));
    let name = normalize_whitespace(&decode_entities(ingredient_name));

    for strategy in &CASCADE {
        if let Some(grams) = strategy.run(&text, &name, tables) {
            tracing::debug!(
                "Estimated {} g for '{}' ('{}') via {}",
                grams,
                name,
                text,
                strategy.name
            );
            return Estimate {
                grams,
                strategy: Some(strategy.name),
            };
        }
    }

    tracing::debug!("No estimate for '{}' ('{}')", name, text);
    Estimate {
        grams: 0.0,
        strategy: None,
    }
}

/// Grams for a free-text quantity, or 0 when nothing applies
pub fn estimate_grams(
    quantity_text: &str,
    ingredient_name: &str,
    tables: &ConversionTables,
) -> f64 {
    estimate(quantity_text, ingredient_name, tables).grams
}

/// Count in front of the text, when it is a positive number
fn leading_count(text: &str) -> Option<f64> {
    leading_magnitude(text)
        .map(|n| n.value)
        .filter(|v| *v > 0.0)
}

fn pinch(text: &str, name: &str, _tables: &ConversionTables) -> Option<f64> {
    if !PINCH.is_match(text) {
        return None;
    }
    let per_pinch = if name.to_lowercase().contains("salt") {
        PINCH_SALT_G
    } else {
        PINCH_G
    };
    Some(per_pinch * leading_count(text).unwrap_or(1.0))
}

fn canned(text: &str, _name: &str, tables: &ConversionTables) -> Option<f64> {
    if !CAN_WORD.is_match(text) {
        return None;
    }
    let caps = OUNCES.captures(text)?;
    let figure = caps.get(1)?;
    let ounces = parse_magnitude(figure.as_str())?;
    let per_can = tables.snap_to_package((ounces * G_PER_OZ).round());

    // "2 (15 oz) cans" multiplies; in "15 oz can" the leading number is the size
    let count = leading_magnitude(text)
        .filter(|n| n.end <= figure.start())
        .map_or(1.0, |n| n.value);
    Some(per_can * count)
}

fn whole_unit(text: &str, name: &str, tables: &ConversionTables) -> Option<f64> {
    let count = leading_count(text)?;
    // "1 tbsp tomato paste" is a measured amount, not one tomato
    if let Some(Unit::Volume(_) | Unit::Mass(_) | Unit::Can) =
        parse_quantity_unit(text).and_then(|q| q.unit)
    {
        return None;
    }
    let key = tables.resolve_whole_unit_key(text, name)?;
    let weights = tables.whole_unit(&key)?;
    Some((count * weights.grams_for(SizeHint::detect(text))).round())
}

fn smart_unit(text: &str, name: &str, tables: &ConversionTables) -> Option<f64> {
    let parsed = parse_quantity_unit(text)?;
    if parsed.magnitude <= 0.0 {
        return None;
    }
    let grams = match parsed.unit? {
        Unit::Count(key) => {
            let weights = tables.whole_unit(key)?;
            parsed.magnitude * weights.grams_for(SizeHint::detect(text))
        }
        Unit::Mass(unit) => unit.to_grams(parsed.magnitude),
        Unit::Volume(unit) => unit.to_cups(parsed.magnitude) * tables.grams_per_cup(name),
        Unit::Can => return None,
    };
    Some(grams.round())
}

fn density_fallback(text: &str, name: &str, tables: &ConversionTables) -> Option<f64> {
    let number = leading_magnitude(text)?;
    let unit = text[number.end..]
        .split_whitespace()
        .take(DENSITY_UNIT_LOOKAHEAD)
        .find_map(|word| match Unit::from_word(word.trim_matches(|c: char| !c.is_alphanumeric())) {
            Some(Unit::Volume(v)) => Some(v),
            _ => None,
        })?;
    Some((unit.to_cups(number.value) * tables.grams_per_cup(name)).round())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> ConversionTables {
        ConversionTables::builtin()
    }

    #[test]
    fn test_large_eggs() {
        assert_eq!(estimate_grams("2 large eggs", "egg", &tables()), 114.0);
    }

    #[test]
    fn test_canned_tomatoes_snap() {
        let t = tables();
        assert_eq!(estimate_grams("1 14.5 oz can diced tomatoes", "diced tomatoes", &t), 411.0);
        assert_eq!(estimate_grams("15 oz can chickpeas", "chickpeas", &t), 425.0);
        assert_eq!(estimate_grams("2 (15 oz) cans black beans", "black beans", &t), 850.0);
        assert_eq!(estimate_grams("1 13.5-ounce can coconut milk", "coconut milk", &t), 383.0);
    }

    #[test]
    fn test_pinch() {
        let t = tables();
        assert_eq!(estimate_grams("a pinch of salt", "salt", &t), 0.36);
        assert_eq!(estimate_grams("pinch", "nutmeg", &t), 0.2);
        assert_eq!(estimate_grams("2 pinches", "sea salt", &t), 0.72);
    }

    #[test]
    fn test_whole_units() {
        let t = tables();
        assert_eq!(estimate_grams("3 bananas", "banana", &t), 354.0);
        assert_eq!(estimate_grams("3 cloves", "garlic", &t), 15.0);
        assert_eq!(estimate_grams("1 small onion", "onion", &t), 70.0);
        assert_eq!(estimate_grams("1/2", "lemon", &t), 42.0);
    }

    #[test]
    fn test_measured_amount_is_not_a_count() {
        let e = estimate("1 tbsp", "tomato paste", &tables());
        assert_eq!(e.grams, 15.0);
        assert_eq!(e.strategy, Some("smart_unit"));
        let onion = estimate("1 cup", "onion", &tables());
        assert_eq!(onion.strategy, Some("smart_unit"));
        assert_eq!(onion.grams, 240.0);
        assert_eq!(estimate_grams("2 eggs", "eggs", &tables()), 114.0);
    }

    #[test]
    fn test_smart_units() {
        let t = tables();
        assert_eq!(estimate_grams("1 1/2 cups", "all-purpose flour", &t), 180.0);
        assert_eq!(estimate_grams("8 oz", "cream cheese", &t), 227.0);
        assert_eq!(estimate_grams("1 lb", "ground beef", &t), 454.0);
        assert_eq!(estimate_grams("2 tsp", "water", &t), 10.0);
    }

    #[test]
    fn test_density_fallback_skips_adjectives() {
        let e = estimate("1 heaping cup", "sugar", &tables());
        assert_eq!(e.grams, 200.0);
        assert_eq!(e.strategy, Some("density"));
    }

    #[test]
    fn test_unlisted_ingredient_uses_default_density() {
        let t = ConversionTables::empty();
        assert_eq!(estimate_grams("1 cup", "mystery broth", &t), 240.0);
    }

    #[test]
    fn test_unparseable_is_zero() {
        let t = tables();
        assert_eq!(estimate("salt to taste", "salt", &t).strategy, None);
        assert_eq!(estimate_grams("salt to taste", "salt", &t), 0.0);
        assert_eq!(estimate_grams("3 sprigs", "thyme", &t), 0.0);
        assert_eq!(estimate_grams("1/0 cup", "flour", &t), 0.0);
        assert_eq!(estimate_grams("", "", &t), 0.0);
    }

    #[test]
    fn test_input_is_cleaned() {
        let t = tables();
        assert_eq!(estimate_grams("1½ cups", "all-purpose flour", &t), 180.0);
        assert_eq!(estimate_grams("2\u{00A0}large eggs", "egg", &t), 114.0);
        assert_eq!(estimate_grams("&frac12; cup", "butter", &t), 114.0);
    }
}
