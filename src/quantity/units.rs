//! Unit types and conversion constants
//!
//! The recognized unit vocabulary is a closed set. The parser resolves a unit
//! word to one of these variants once, and every later stage matches on the
//! variant instead of comparing strings.

use serde::{Deserialize, Serialize};

// ============================================================================
// Conversion Constants
// ============================================================================

/// Grams per ounce
pub const G_PER_OZ: f64 = 28.3495;
/// Grams per pound
pub const G_PER_LB: f64 = 453.592;
/// Grams per kilogram
pub const G_PER_KG: f64 = 1000.0;

/// Tablespoons per cup
pub const TBSP_PER_CUP: f64 = 16.0;
/// Teaspoons per cup
pub const TSP_PER_CUP: f64 = 48.0;
/// Teaspoons per tablespoon
pub const TSP_PER_TBSP: f64 = 3.0;

/// Milliliters per cup used for redisplay. Recipe cups, not the 236.588 ml US cup.
pub const ML_PER_CUP: f64 = 240.0;

/// Grams per cup assumed when an ingredient has no density entry
pub const DEFAULT_GRAMS_PER_CUP: f64 = 240.0;

// ============================================================================
// Unit Enums
// ============================================================================

/// Kitchen volume unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeUnit {
    Cup,
    Tbsp,
    Tsp,
}

impl VolumeUnit {
    /// How many of this unit make one cup
    pub fn per_cup(self) -> f64 {
        match self {
            VolumeUnit::Cup => 1.0,
            VolumeUnit::Tbsp => TBSP_PER_CUP,
            VolumeUnit::Tsp => TSP_PER_CUP,
        }
    }

    /// Convert an amount of this unit to cups
    pub fn to_cups(self, amount: f64) -> f64 {
        amount / self.per_cup()
    }

    /// Display abbreviation
    pub fn label(self) -> &'static str {
        match self {
            VolumeUnit::Cup => "cup",
            VolumeUnit::Tbsp => "tbsp",
            VolumeUnit::Tsp => "tsp",
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        match word {
            "cup" | "cups" | "c" => Some(VolumeUnit::Cup),
            "tbsp" | "tbsps" | "tbs" | "tablespoon" | "tablespoons" => Some(VolumeUnit::Tbsp),
            "tsp" | "tsps" | "teaspoon" | "teaspoons" => Some(VolumeUnit::Tsp),
            _ => None,
        }
    }
}

/// Mass unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MassUnit {
    Gram,
    Kilogram,
    Ounce,
    Pound,
}

impl MassUnit {
    pub fn grams_per_unit(self) -> f64 {
        match self {
            MassUnit::Gram => 1.0,
            MassUnit::Kilogram => G_PER_KG,
            MassUnit::Ounce => G_PER_OZ,
            MassUnit::Pound => G_PER_LB,
        }
    }

    pub fn to_grams(self, amount: f64) -> f64 {
        amount * self.grams_per_unit()
    }

    fn from_word(word: &str) -> Option<Self> {
        match word {
            "g" | "gram" | "grams" => Some(MassUnit::Gram),
            "kg" | "kgs" | "kilogram" | "kilograms" => Some(MassUnit::Kilogram),
            "oz" | "ounce" | "ounces" => Some(MassUnit::Ounce),
            "lb" | "lbs" | "pound" | "pounds" => Some(MassUnit::Pound),
            _ => None,
        }
    }
}

/// A recognized unit word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "unit", rename_all = "lowercase")]
pub enum Unit {
    Volume(VolumeUnit),
    Mass(MassUnit),
    /// Countable food noun; carries the whole-unit table key
    Count(&'static str),
    /// Packaged can
    Can,
}

impl Unit {
    /// Resolve a lowercase unit word. Unknown words are not units.
    pub fn from_word(word: &str) -> Option<Self> {
        let word = word.trim().trim_end_matches('.').to_lowercase();
        if let Some(v) = VolumeUnit::from_word(&word) {
            return Some(Unit::Volume(v));
        }
        if let Some(m) = MassUnit::from_word(&word) {
            return Some(Unit::Mass(m));
        }
        if word == "can" || word == "cans" {
            return Some(Unit::Can);
        }
        count_noun_key(&word).map(Unit::Count)
    }

    pub fn is_volume(&self) -> bool {
        matches!(self, Unit::Volume(_))
    }

    pub fn is_mass(&self) -> bool {
        matches!(self, Unit::Mass(_))
    }
}

/// Map a count noun (singular or plural) to its whole-unit table key
pub fn count_noun_key(word: &str) -> Option<&'static str> {
    match word {
        "egg" | "eggs" => Some("egg"),
        "banana" | "bananas" => Some("banana"),
        "apple" | "apples" => Some("apple"),
        "onion" | "onions" => Some("onion"),
        "carrot" | "carrots" => Some("carrot"),
        "clove" | "cloves" | "garlic" => Some("garlic clove"),
        "tomato" | "tomatoes" => Some("tomato"),
        "pepper" | "peppers" => Some("bell pepper"),
        "potato" | "potatoes" => Some("potato"),
        "lime" | "limes" => Some("lime"),
        "lemon" | "lemons" => Some("lemon"),
        "orange" | "oranges" => Some("orange"),
        _ => None,
    }
}

/// Size hint used to pick a per-unit weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeHint {
    Small,
    Medium,
    Large,
    Xl,
}

impl SizeHint {
    /// Detect a size word anywhere in the text. `None` when the text names
    /// no size; callers then use the row's default weight.
    pub fn detect(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        if lower.contains("extra large") || lower.contains("extra-large") {
            Some(SizeHint::Xl)
        } else if lower.contains("large") {
            Some(SizeHint::Large)
        } else if lower.contains("small") {
            Some(SizeHint::Small)
        } else if lower.contains("medium") {
            Some(SizeHint::Medium)
        } else {
            None
        }
    }
}
