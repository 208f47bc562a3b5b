//! Nutrition calculation module
//!
//! Handles the per-100 g lookup table and recipe aggregation.

pub mod calculator;
pub mod table;

pub use calculator::RecipeNutrition;
pub use table::{GlossaryEntry, GlossaryFile, NutritionRow, NutritionTable};
