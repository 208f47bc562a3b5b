//! Ingredient model
//!
//! One recipe line with its canonical gram quantity, the original free-text
//! amount and optional substitutions.

use serde::{Deserialize, Deserializer, Serialize};

use crate::quantity::parser::parse_magnitude;
use crate::quantity::text::clean_line;

/// A substitute for an ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substitution {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Substitute-to-original mass multiplier
    #[serde(default = "default_ratio", deserialize_with = "lenient_ratio")]
    pub ratio: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub science_note: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ww_points: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_ratio() -> f64 {
    1.0
}

impl Substitution {
    /// Grams of the substitute replacing `original_grams` of the ingredient
    pub fn substitute_grams(&self, original_grams: f64) -> f64 {
        original_grams * self.ratio
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.trim().eq_ignore_ascii_case(tag))
    }
}

/// A recipe ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Canonical mass in grams; 0 when unknown
    #[serde(default, deserialize_with = "lenient_f64")]
    pub qty_g: f64,
    /// Original free-text amount ("2 cups", "3 medium")
    #[serde(default, deserialize_with = "lenient_string")]
    pub vol_est: String,
    /// Role in the recipe ("structure", "leavening")
    #[serde(default, deserialize_with = "lenient_string")]
    pub function: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ww_points: f64,
    #[serde(default)]
    pub substitutions: Vec<Substitution>,
    /// True when `qty_g` came from the estimator instead of the document
    #[serde(default)]
    pub estimated: bool,
    /// Fixed amounts that do not follow the serving count (a pinch of salt)
    #[serde(default)]
    pub no_scale: bool,
}

/// Which substitution kinds to suggest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionModes {
    #[serde(default)]
    pub vegetarian: bool,
    #[serde(default)]
    pub weight_conscious: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Vegetarian,
    WeightConscious,
}

impl SuggestionKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            SuggestionKind::Vegetarian => "Vegetarian",
            SuggestionKind::WeightConscious => "Weight Watchers",
        }
    }
}

/// A substitution hint shown next to an ingredient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub substitute: String,
    pub text: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, qty_g: f64) -> Self {
        Self {
            name: name.into(),
            qty_g,
            vol_est: String::new(),
            function: String::new(),
            ww_points: 0.0,
            substitutions: Vec::new(),
            estimated: false,
            no_scale: false,
        }
    }

    pub fn with_vol_est(mut self, vol_est: impl Into<String>) -> Self {
        self.vol_est = vol_est.into();
        self
    }

    /// Shape one scraped `recipeIngredient` string. Name and amount both hold
    /// the cleaned line until the import pipeline separates them.
    pub fn from_scraped_line(raw: &str) -> Self {
        let line = clean_line(raw);
        Self::new(line.clone(), 0.0).with_vol_est(line)
    }

    /// Whether a usable canonical mass is present
    pub fn has_quantity(&self) -> bool {
        self.qty_g.is_finite() && self.qty_g > 0.0
    }

    /// First substitution tagged `veg` or `vegetarian`
    pub fn vegetarian_substitution(&self) -> Option<&Substitution> {
        self.substitutions
            .iter()
            .find(|s| s.has_tag("veg") || s.has_tag("vegetarian"))
    }

    /// First substitution tagged `ww`
    pub fn weight_conscious_substitution(&self) -> Option<&Substitution> {
        self.substitutions.iter().find(|s| s.has_tag("ww"))
    }

    /// Suggest a substitute for the enabled modes, vegetarian first.
    /// Never swaps the ingredient itself.
    pub fn suggestion(&self, modes: SuggestionModes) -> Option<Suggestion> {
        let vegetarian = modes
            .vegetarian
            .then(|| self.vegetarian_substitution())
            .flatten()
            .map(|s| (SuggestionKind::Vegetarian, s));
        let weight_conscious = || {
            modes
                .weight_conscious
                .then(|| self.weight_conscious_substitution())
                .flatten()
                .map(|s| (SuggestionKind::WeightConscious, s))
        };

        let (kind, sub) = vegetarian.or_else(weight_conscious)?;
        let text = if sub.science_note.trim().is_empty() {
            format!("{}: {}", kind.display_name(), sub.name)
        } else {
            format!("{}: {} - {}", kind.display_name(), sub.name, sub.science_note)
        };
        Some(Suggestion {
            kind,
            substitute: sub.name.clone(),
            text,
        })
    }
}

// ============================================================================
// Lenient field readers
// ============================================================================
//
// Hand-written and scraped documents put numbers in quotes, leave fields
// empty (`ww_points: `) or write amounts as bare numbers (`vol_est: 2`).

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
    Flag(bool),
    Empty(()),
}

/// Number, numeric string or empty; anything unreadable becomes 0
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Number(n) if n.is_finite() => n,
        Loose::Text(s) => parse_magnitude(&s).unwrap_or(0.0),
        _ => 0.0,
    })
}

fn lenient_ratio<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let ratio = lenient_f64(deserializer)?;
    Ok(if ratio > 0.0 { ratio } else { default_ratio() })
}

/// String, number or empty; numbers keep their shortest spelling
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Text(s) => s,
        Loose::Number(n) => n.to_string(),
        Loose::Flag(b) => b.to_string(),
        Loose::Empty(()) => String::new(),
    })
}
