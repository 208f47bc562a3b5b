//! Recipe MCP Tools
//!
//! Tools for importing, validating and displaying recipe documents.

use serde::Serialize;

use crate::models::{
    parse_document, validate_document, DisplayPreferences, Nutrition, Recipe, RecipeFormat,
    Suggestion, SuggestionModes, ValidationReport,
};
use crate::nutrition::{NutritionTable, RecipeNutrition};
use crate::quantity::{
    adjust_servings, convert_temperature_in_text, format_quantity, ConversionTables, Servings,
};

/// Response for import_recipe
#[derive(Debug, Serialize)]
pub struct ImportRecipeResponse {
    pub id: String,
    pub name: String,
    pub base_servings: f64,
    pub ingredient_count: usize,
    /// Ingredients still without a gram weight; they will not scale
    pub missing: Vec<String>,
    pub estimated: Vec<String>,
    pub recipe: Recipe,
    /// Normalized recipe in the YAML document format
    pub yaml: String,
}

/// How a recipe should be displayed
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayOptions {
    /// Requested servings; the recipe's own count when `None`
    pub servings: Option<f64>,
    pub preferences: DisplayPreferences,
    pub precision: bool,
    pub suggestions: SuggestionModes,
}

/// One displayed ingredient
#[derive(Debug, Serialize)]
pub struct IngredientLine {
    pub name: String,
    pub amount: String,
    /// "<amount> <name>"
    pub line: String,
    pub scaled_g: f64,
    pub estimated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
}

/// Response for display_recipe
#[derive(Debug, Serialize)]
pub struct RecipeDisplay {
    pub id: String,
    pub name: String,
    pub source: String,
    pub base_servings: f64,
    pub servings: f64,
    pub ingredients: Vec<IngredientLine>,
    pub steps: Vec<String>,
    pub science_notes: Vec<String>,
    /// Present when nutrition data is loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<RecipeNutrition>,
    pub share_text: String,
}

// ============================================================================
// Recipe Tools
// ============================================================================

/// Parse and normalize a recipe document
pub fn import_recipe(
    tables: &ConversionTables,
    text: &str,
    format: RecipeFormat,
) -> Result<ImportRecipeResponse, String> {
    if text.trim().is_empty() {
        return Err("Recipe text cannot be empty".to_string());
    }

    let report = Recipe::import(text, format, tables)
        .map_err(|e| format!("Failed to import recipe: {}", e))?;
    let yaml = report
        .recipe
        .to_yaml()
        .map_err(|e| format!("Failed to serialize recipe: {}", e))?;

    Ok(ImportRecipeResponse {
        id: report.recipe.id.clone(),
        name: report.recipe.meta.name.clone(),
        base_servings: report.recipe.meta.base_servings,
        ingredient_count: report.recipe.ingredients.len(),
        missing: report.missing,
        estimated: report.estimated,
        recipe: report.recipe,
        yaml,
    })
}

/// Check a recipe document without changing it
pub fn validate_recipe(text: &str, format: RecipeFormat) -> Result<ValidationReport, String> {
    let doc = parse_document(text, format).map_err(|e| format!("Failed to parse recipe: {}", e))?;
    Ok(validate_document(&doc))
}

/// Import a recipe document and render it for the requested servings
pub fn display_recipe(
    tables: &ConversionTables,
    nutrition: &NutritionTable,
    text: &str,
    format: RecipeFormat,
    options: DisplayOptions,
) -> Result<RecipeDisplay, String> {
    let report = Recipe::import(text, format, tables)
        .map_err(|e| format!("Failed to import recipe: {}", e))?;
    Ok(render_recipe(tables, nutrition, &report.recipe, options))
}

/// Render an already-imported recipe
pub fn render_recipe(
    tables: &ConversionTables,
    nutrition: &NutritionTable,
    recipe: &Recipe,
    options: DisplayOptions,
) -> RecipeDisplay {
    let base = recipe.meta.base_servings;
    let target = adjust_servings(options.servings.unwrap_or(base));
    let servings = Servings::new(base, target);
    let prefs = &options.preferences;
    let with_nutrition = !nutrition.is_empty();

    let ingredients: Vec<IngredientLine> = recipe
        .ingredients
        .iter()
        .map(|ing| {
            let amount = format_quantity(ing, servings, prefs, options.precision, tables);
            let scaled_g = if ing.has_quantity() {
                servings.apply(ing.qty_g, ing.no_scale)
            } else {
                0.0
            };
            let nutrition = (with_nutrition && scaled_g > 0.0)
                .then(|| nutrition.ingredient_nutrition(&ing.name, scaled_g))
                .flatten();
            IngredientLine {
                line: format!("{} {}", amount, ing.name).trim().to_string(),
                name: ing.name.clone(),
                amount,
                scaled_g,
                estimated: ing.estimated,
                nutrition,
                suggestion: ing.suggestion(options.suggestions),
            }
        })
        .collect();

    let steps: Vec<String> = recipe
        .steps
        .iter()
        .map(|step| convert_temperature_in_text(step, prefs.temp_unit))
        .collect();

    let summary = with_nutrition.then(|| nutrition.recipe_nutrition(&recipe.ingredients, servings));
    let share_text = share_text(&recipe.meta.name, &recipe.meta.source, &ingredients, &steps);

    RecipeDisplay {
        id: recipe.id.clone(),
        name: recipe.meta.name.clone(),
        source: recipe.meta.source.clone(),
        base_servings: base,
        servings: target,
        ingredients,
        steps,
        science_notes: recipe.science_notes.clone(),
        nutrition: summary,
        share_text,
    }
}

/// Plain-text block for pasting into a message
fn share_text(
    name: &str,
    source: &str,
    ingredients: &[IngredientLine],
    steps: &[String],
) -> String {
    let ingredients = ingredients
        .iter()
        .map(|ing| format!("• {}", ing.line))
        .collect::<Vec<_>>()
        .join("\n");
    let steps = steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{}\n\nIngredients:\n{}\n\nSteps:\n{}\n\nRecipe from: {}",
        name, ingredients, steps, source
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TempUnit, UnitSystem, VolumeStyle, WeightUnit};

    const BANANA_BREAD: &str = r#"
meta:
  name: Banana Bread
  source: https://example.com/banana-bread
  base_servings: "8 servings"
ingredients:
  - name: all-purpose flour
    qty_g: 250
    vol_est: 2 cups
  - name: ripe bananas
    vol_est: 3 medium
  - name: salt
    qty_g: 6
    vol_est: 1 tsp
    no_scale: true
  - name: butter
    qty_g: 113
    substitutions:
      - name: coconut oil
        ratio: 0.8
        science_note: solid fat keeps the crumb tender
        tags: [veg]
steps:
  - Preheat the oven to 350°F.
  - text: Mash the bananas.
"#;

    fn cups_prefs() -> DisplayPreferences {
        DisplayPreferences {
            weight_unit: WeightUnit::Oz,
            volume_unit: VolumeStyle::Cups,
            temp_unit: TempUnit::C,
            system: UnitSystem::Auto,
            decimal_comma: false,
        }
    }

    #[test]
    fn test_import_recipe_reports_estimates() {
        let tables = ConversionTables::builtin();
        let r = import_recipe(&tables, BANANA_BREAD, RecipeFormat::Auto).unwrap();
        assert_eq!(r.id, "banana-bread");
        assert_eq!(r.base_servings, 8.0);
        assert_eq!(r.ingredient_count, 4);
        assert_eq!(r.estimated, vec!["ripe bananas (354 g estimated)".to_string()]);
        assert!(r.missing.is_empty());
        assert!(r.yaml.contains("banana-bread"));
    }

    #[test]
    fn test_import_recipe_errors() {
        let tables = ConversionTables::builtin();
        assert!(import_recipe(&tables, "   ", RecipeFormat::Auto).is_err());
        let err = import_recipe(&tables, "meta:\n  name: x\n", RecipeFormat::Yaml).unwrap_err();
        assert!(err.contains("ingredients"));
    }

    #[test]
    fn test_validate_recipe() {
        let report = validate_recipe(BANANA_BREAD, RecipeFormat::Yaml).unwrap();
        assert!(!report.is_valid());
        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"meta.base_servings"));
        assert!(fields.contains(&"ingredients[1].qty_g"));
        assert!(fields.contains(&"steps[1]"));

        let strict = r#"{"meta": {"name": "Toast", "base_servings": 1},
            "ingredients": [{"name": "bread", "qty_g": 30}, {"name": "butter", "qty_g": 5}],
            "steps": ["Toast the bread.", "Spread the butter."],
            "science_notes": ["Browning is the Maillard reaction."]}"#;
        let report = validate_recipe(strict, RecipeFormat::Auto).unwrap();
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());

        assert!(validate_recipe("{not json", RecipeFormat::Json).is_err());
    }

    #[test]
    fn test_display_recipe_scales_and_converts() {
        let tables = ConversionTables::builtin();
        let options = DisplayOptions {
            servings: Some(16.0),
            preferences: cups_prefs(),
            precision: false,
            suggestions: SuggestionModes {
                vegetarian: true,
                weight_conscious: false,
            },
        };
        let d = display_recipe(&tables, &NutritionTable::new(), BANANA_BREAD, RecipeFormat::Auto, options)
            .unwrap();
        assert_eq!(d.servings, 16.0);
        assert_eq!(d.ingredients[1].amount, "6 bananas");
        assert_eq!(d.ingredients[1].line, "6 bananas ripe bananas");
        assert!(d.ingredients[1].estimated);
        assert_eq!(d.ingredients[2].amount, "1 tsp");
        assert_eq!(d.ingredients[2].scaled_g, 6.0);
        assert_eq!(
            d.ingredients[3].suggestion.as_ref().map(|s| s.substitute.as_str()),
            Some("coconut oil")
        );
        assert_eq!(d.steps[0], "Preheat the oven to 177°C.");
        assert!(d.nutrition.is_none());
    }

    #[test]
    fn test_share_text_layout() {
        let tables = ConversionTables::builtin();
        let options = DisplayOptions {
            preferences: cups_prefs(),
            ..DisplayOptions::default()
        };
        let d = display_recipe(&tables, &NutritionTable::new(), BANANA_BREAD, RecipeFormat::Auto, options)
            .unwrap();
        assert!(d.share_text.starts_with("Banana Bread\n\nIngredients:\n• "));
        assert!(d.share_text.contains("\n• 3 bananas ripe bananas\n"));
        assert!(d.share_text.contains("Steps:\n1. Preheat the oven to 177°C.\n2. Mash the bananas."));
        assert!(d.share_text.ends_with("\n\nRecipe from: https://example.com/banana-bread"));
    }

    #[test]
    fn test_display_with_nutrition() {
        let tables = ConversionTables::builtin();
        let mut nutrition = NutritionTable::new();
        nutrition.insert(
            "all-purpose flour",
            Nutrition {
                calories: 364.0,
                protein: 10.3,
                fat: 1.0,
                carbs: 76.3,
                fiber: 2.7,
            },
        );
        let options = DisplayOptions {
            servings: Some(4.0),
            preferences: cups_prefs(),
            ..DisplayOptions::default()
        };
        let d = display_recipe(&tables, &nutrition, BANANA_BREAD, RecipeFormat::Auto, options).unwrap();
        let flour = d.ingredients[0].nutrition.unwrap();
        assert_eq!(flour.calories, 455.0);
        let summary = d.nutrition.unwrap();
        assert_eq!(summary.total.calories, 455.0);
        assert_eq!(summary.per_serving.calories, 114.0);
    }
}
