//! Data models
//!
//! Rust structs for recipe documents and the preferences used to display them.

mod ingredient;
mod nutrition;
mod preferences;
mod recipe;

pub(crate) use ingredient::lenient_f64;
pub use ingredient::{Ingredient, Substitution, Suggestion, SuggestionKind, SuggestionModes};
pub use nutrition::Nutrition;
pub use preferences::{DisplayPreferences, TempUnit, UnitSystem, VolumeStyle, WeightUnit};
pub use recipe::{
    parse_base_servings, parse_document, validate_document, Backup, ImportError, ImportReport,
    ImportResult, Recipe, RecipeFormat, RecipeMeta, ValidationIssue, ValidationReport,
};
