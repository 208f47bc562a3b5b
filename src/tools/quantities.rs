//! Quantity MCP Tools
//!
//! Single-amount operations: normalize, parse, estimate, scale, format and
//! temperature conversion.

use serde::Serialize;

use crate::models::{DisplayPreferences, Ingredient, TempUnit};
use crate::quantity::{
    self, convert_temperature_in_text, decode_entities, fractions_to_ascii, normalize_whitespace,
    parse_quantity_unit, strip_leading_quantity, ConversionTables, Servings, Unit,
};
use crate::region::{Region, RegionDetector};

/// Response for normalize_ingredient
#[derive(Debug, Serialize)]
pub struct NormalizeIngredientResponse {
    pub input: String,
    pub whitespace_normalized: String,
    pub entities_decoded: String,
    pub fractions_ascii: String,
    /// Ingredient name with the leading amount removed
    pub name: String,
}

/// Response for parse_quantity
#[derive(Debug, Serialize)]
pub struct ParseQuantityResponse {
    pub found: bool,
    pub magnitude: Option<f64>,
    pub unit: Option<Unit>,
    pub rest: Option<String>,
}

/// Response for estimate_grams
#[derive(Debug, Serialize)]
pub struct EstimateGramsResponse {
    pub quantity_text: String,
    pub name: String,
    pub grams: f64,
    pub strategy: Option<&'static str>,
}

/// Response for scale_quantity
#[derive(Debug, Serialize)]
pub struct ScaleQuantityResponse {
    pub qty_g: f64,
    pub scaled_g: f64,
    pub ratio: f64,
}

/// Response for format_quantity
#[derive(Debug, Serialize)]
pub struct FormatQuantityResponse {
    pub name: String,
    pub scaled_g: f64,
    pub amount: String,
}

/// Response for convert_temperature
#[derive(Debug, Serialize)]
pub struct ConvertTemperatureResponse {
    pub text: String,
    pub target: TempUnit,
}

/// Response for default_preferences
#[derive(Debug, Serialize)]
pub struct DefaultPreferencesResponse {
    pub region: Region,
    pub preferences: DisplayPreferences,
}

// ============================================================================
// Quantity Tools
// ============================================================================

/// Run each normalization step on a raw ingredient line
pub fn normalize_ingredient(text: &str) -> NormalizeIngredientResponse {
    let whitespace_normalized = normalize_whitespace(text);
    let entities_decoded = decode_entities(&whitespace_normalized);
    let fractions_ascii = fractions_to_ascii(&entities_decoded);
    let name = strip_leading_quantity(&normalize_whitespace(&fractions_ascii));

    NormalizeIngredientResponse {
        input: text.to_string(),
        whitespace_normalized,
        entities_decoded,
        fractions_ascii,
        name,
    }
}

/// Split a quantity into magnitude, unit and remainder
pub fn parse_quantity(text: &str) -> ParseQuantityResponse {
    let cleaned = quantity::clean_line(&decode_entities(text));
    match parse_quantity_unit(&cleaned) {
        Some(parsed) => ParseQuantityResponse {
            found: true,
            magnitude: Some(parsed.magnitude),
            unit: parsed.unit,
            rest: Some(parsed.rest),
        },
        None => ParseQuantityResponse {
            found: false,
            magnitude: None,
            unit: None,
            rest: None,
        },
    }
}

/// Estimate grams for a free-text amount
pub fn estimate_grams(
    tables: &ConversionTables,
    quantity_text: &str,
    name: &str,
) -> EstimateGramsResponse {
    let estimate = quantity::estimate(quantity_text, name, tables);
    EstimateGramsResponse {
        quantity_text: quantity_text.to_string(),
        name: name.to_string(),
        grams: estimate.grams,
        strategy: estimate.strategy,
    }
}

/// Scale canonical grams between serving counts
pub fn scale_quantity(
    qty_g: f64,
    base_servings: f64,
    target_servings: f64,
    no_scale: bool,
) -> Result<ScaleQuantityResponse, String> {
    if !qty_g.is_finite() || qty_g < 0.0 {
        return Err("qty_g must be a non-negative number".to_string());
    }
    if !target_servings.is_finite() || target_servings < 0.0 {
        return Err("target_servings must be a non-negative number".to_string());
    }

    let servings = Servings::new(base_servings, target_servings);
    Ok(ScaleQuantityResponse {
        qty_g,
        scaled_g: servings.apply(qty_g, no_scale),
        ratio: if no_scale { 1.0 } else { servings.ratio() },
    })
}

/// Render one ingredient for the requested servings
pub fn format_quantity(
    tables: &ConversionTables,
    ingredient: &Ingredient,
    servings: Servings,
    prefs: &DisplayPreferences,
    precision: bool,
) -> Result<FormatQuantityResponse, String> {
    if !servings.target.is_finite() || servings.target <= 0.0 {
        return Err("target_servings must be a positive number".to_string());
    }
    let scaled_g = if ingredient.has_quantity() {
        servings.apply(ingredient.qty_g, ingredient.no_scale)
    } else {
        0.0
    };
    Ok(FormatQuantityResponse {
        name: ingredient.name.clone(),
        scaled_g,
        amount: quantity::format_quantity(ingredient, servings, prefs, precision, tables),
    })
}

/// Rewrite temperatures in a text to the target scale ("C" or "F")
pub fn convert_temperature(text: &str, target: &str) -> Result<ConvertTemperatureResponse, String> {
    let target = TempUnit::from_str(target)
        .ok_or_else(|| format!("Unknown temperature unit '{}'. Use C or F.", target))?;
    Ok(ConvertTemperatureResponse {
        text: convert_temperature_in_text(text, target),
        target,
    })
}

/// Region-derived display preferences
pub fn default_preferences(detector: &dyn RegionDetector) -> DefaultPreferencesResponse {
    let region = detector.detect();
    let preferences = region.default_preferences();
    DefaultPreferencesResponse { region, preferences }
}
