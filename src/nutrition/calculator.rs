//! Nutrition for ingredients and whole recipes

use serde::Serialize;

use super::table::NutritionTable;
use crate::models::{Ingredient, Nutrition};
use crate::quantity::scaler::Servings;

/// Recipe totals and the share of one serving
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RecipeNutrition {
    pub total: Nutrition,
    pub per_serving: Nutrition,
}

impl NutritionTable {
    /// Nutrition for `grams` of an ingredient, rounded for display.
    ///
    /// Returns `None` when the table has no entry or there is no mass.
    pub fn ingredient_nutrition(&self, name: &str, grams: f64) -> Option<Nutrition> {
        let Some(per_100g) = self.lookup(name) else {
            tracing::warn!(
                "No nutrition entry for '{}' (from '{}')",
                self.canonical_key(name),
                name
            );
            return None;
        };
        if !grams.is_finite() || grams <= 0.0 {
            return None;
        }
        Some(per_100g.scale(grams / 100.0).rounded())
    }

    /// Sum the scaled ingredients and split the total over the target servings
    pub fn recipe_nutrition(
        &self,
        ingredients: &[Ingredient],
        servings: Servings,
    ) -> RecipeNutrition {
        let total: Nutrition = ingredients
            .iter()
            .filter(|ing| ing.has_quantity())
            .filter_map(|ing| {
                let grams = servings.apply(ing.qty_g, ing.no_scale);
                self.ingredient_nutrition(&ing.name, grams)
            })
            .sum();

        let portions = if servings.target.is_finite() && servings.target > 0.0 {
            servings.target
        } else {
            1.0
        };
        RecipeNutrition {
            total: total.rounded(),
            per_serving: total.scale(1.0 / portions).rounded(),
        }
    }
}
