//! Cookbook MCP Server Implementation
//!
//! Implements the MCP server with all cookbook tools.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::{Config, LoadedData};
use crate::models::{
    DisplayPreferences, Ingredient, RecipeFormat, SuggestionModes, TempUnit, UnitSystem,
    VolumeStyle, WeightUnit,
};
use crate::nutrition::NutritionTable;
use crate::quantity::{ConversionTables, Servings};
use crate::region::{FixedRegion, Region};
use crate::tools::quantities;
use crate::tools::recipes::{self, DisplayOptions};
use crate::tools::status::{StatusTracker, TableSizes};

/// Cookbook MCP Service
#[derive(Clone)]
pub struct CookbookService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    tables: Arc<ConversionTables>,
    nutrition: Arc<NutritionTable>,
    region: Region,
    preferences: DisplayPreferences,
    tool_router: ToolRouter<CookbookService>,
}

impl CookbookService {
    pub fn new(config: &Config, data: LoadedData) -> Self {
        let region = config.region_detector().detect();
        let preferences = region.default_preferences();
        tracing::info!(
            "Region {}: {} / {} / {}",
            region.code(),
            preferences.weight_unit.as_str(),
            preferences.volume_unit.as_str(),
            preferences.temp_unit.symbol()
        );

        let sizes = TableSizes::of(&data.tables, &data.nutrition);
        let tracker = StatusTracker::new(
            config.data_dir.clone(),
            data.sources,
            region.code().to_string(),
            sizes,
        );

        Self {
            status_tracker: Arc::new(Mutex::new(tracker)),
            tables: Arc::new(data.tables),
            nutrition: Arc::new(data.nutrition),
            region,
            preferences,
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Quantity Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TextParams {
    pub text: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EstimateGramsParams {
    /// Free-text amount, e.g. "2 cups" or "3 medium"
    pub quantity_text: String,
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ScaleQuantityParams {
    pub qty_g: f64,
    pub base_servings: f64,
    pub target_servings: f64,
    #[serde(default)]
    pub no_scale: bool,
}

/// Per-request overrides; unset fields keep the regional defaults
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct PreferencesParams {
    /// "g" or "oz"
    pub weight_unit: Option<String>,
    /// "ml" or "cups"
    pub volume_unit: Option<String>,
    /// "C" or "F"
    pub temp_unit: Option<String>,
    /// "auto", "metric" or "imperial"
    pub system: Option<String>,
    pub decimal_comma: Option<bool>,
}

impl PreferencesParams {
    fn resolve(&self, defaults: DisplayPreferences) -> Result<DisplayPreferences, String> {
        let mut prefs = defaults;
        if let Some(s) = &self.weight_unit {
            prefs.weight_unit =
                WeightUnit::from_str(s).ok_or_else(|| format!("Unknown weight unit '{}'", s))?;
        }
        if let Some(s) = &self.volume_unit {
            prefs.volume_unit =
                VolumeStyle::from_str(s).ok_or_else(|| format!("Unknown volume unit '{}'", s))?;
        }
        if let Some(s) = &self.temp_unit {
            prefs.temp_unit = TempUnit::from_str(s)
                .ok_or_else(|| format!("Unknown temperature unit '{}'", s))?;
        }
        if let Some(s) = &self.system {
            prefs.system =
                UnitSystem::from_str(s).ok_or_else(|| format!("Unknown unit system '{}'", s))?;
        }
        if let Some(comma) = self.decimal_comma {
            prefs.decimal_comma = comma;
        }
        Ok(prefs)
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FormatQuantityParams {
    pub name: String,
    #[serde(default)]
    pub qty_g: f64,
    #[serde(default)]
    pub vol_est: String,
    #[serde(default)]
    pub no_scale: bool,
    #[serde(default = "default_servings")]
    pub base_servings: f64,
    pub target_servings: Option<f64>,
    #[serde(default)]
    pub precision: bool,
    #[serde(default)]
    pub preferences: PreferencesParams,
}

fn default_servings() -> f64 { 1.0 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertTemperatureParams {
    pub text: String,
    /// "C" or "F"
    pub target: String,
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecipeTextParams {
    /// Recipe document as YAML or JSON
    pub text: String,
    /// "auto" (default), "yaml" or "json"
    pub format: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DisplayRecipeParams {
    pub text: String,
    pub format: Option<String>,
    pub servings: Option<f64>,
    #[serde(default)]
    pub precision: bool,
    #[serde(default)]
    pub vegetarian: bool,
    #[serde(default)]
    pub weight_conscious: bool,
    #[serde(default)]
    pub preferences: PreferencesParams,
}

fn parse_format(format: Option<&str>) -> Result<RecipeFormat, McpError> {
    let format = format.unwrap_or_default();
    RecipeFormat::from_str(format).ok_or_else(|| {
        McpError::invalid_params(
            format!("Unknown format '{}'. Use auto, yaml or json.", format),
            None,
        )
    })
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl CookbookService {
    // --- Status ---

    #[tool(description = "Get the current status of the cookbook service including build info, loaded tables, and process information")]
    async fn cookbook_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        json_result(&status)
    }

    #[tool(description = "Get instructions for importing, scaling and displaying recipes. Call this when starting a cooking session or when unsure how to use the cookbook tools.")]
    fn usage_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::USAGE_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(USAGE_INSTRUCTIONS)]))
    }

    // --- Quantities ---

    #[tool(description = "Clean a scraped ingredient line: collapse whitespace, decode HTML entities, convert unicode fractions, and strip the leading amount to get the name")]
    fn normalize_ingredient(&self, Parameters(p): Parameters<TextParams>) -> Result<CallToolResult, McpError> {
        json_result(&quantities::normalize_ingredient(&p.text))
    }

    #[tool(description = "Split a quantity like '1 1/2 cups flour' into magnitude, unit and remaining text")]
    fn parse_quantity(&self, Parameters(p): Parameters<TextParams>) -> Result<CallToolResult, McpError> {
        json_result(&quantities::parse_quantity(&p.text))
    }

    #[tool(description = "Estimate grams for a free-text amount and ingredient name. Returns 0 with a null strategy when no estimate is possible.")]
    fn estimate_grams(&self, Parameters(p): Parameters<EstimateGramsParams>) -> Result<CallToolResult, McpError> {
        json_result(&quantities::estimate_grams(&self.tables, &p.quantity_text, &p.name))
    }

    #[tool(description = "Scale a gram quantity from base servings to target servings")]
    fn scale_quantity(&self, Parameters(p): Parameters<ScaleQuantityParams>) -> Result<CallToolResult, McpError> {
        let result =
            quantities::scale_quantity(p.qty_g, p.base_servings, p.target_servings, p.no_scale)
                .map_err(|e| McpError::invalid_params(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Render one ingredient's amount for the target servings using display preferences (counts, spoons, cups, ml, g or oz)")]
    fn format_quantity(&self, Parameters(p): Parameters<FormatQuantityParams>) -> Result<CallToolResult, McpError> {
        let prefs = p
            .preferences
            .resolve(self.preferences)
            .map_err(|e| McpError::invalid_params(e, None))?;
        let mut ingredient = Ingredient::new(p.name, p.qty_g).with_vol_est(p.vol_est);
        ingredient.no_scale = p.no_scale;
        let servings = Servings::new(p.base_servings, p.target_servings.unwrap_or(p.base_servings));
        let result =
            quantities::format_quantity(&self.tables, &ingredient, servings, &prefs, p.precision)
                .map_err(|e| McpError::invalid_params(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Convert every temperature in a text to Celsius (C) or Fahrenheit (F)")]
    fn convert_temperature(&self, Parameters(p): Parameters<ConvertTemperatureParams>) -> Result<CallToolResult, McpError> {
        let result = quantities::convert_temperature(&p.text, &p.target)
            .map_err(|e| McpError::invalid_params(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get the default display preferences for the server's region")]
    fn default_preferences(&self) -> Result<CallToolResult, McpError> {
        json_result(&quantities::default_preferences(&FixedRegion(self.region.clone())))
    }

    // --- Recipes ---

    #[tool(description = "Import a recipe document (YAML or JSON): normalize names, estimate missing grams, drop duplicate ingredients. Returns the normalized recipe and YAML.")]
    fn import_recipe(&self, Parameters(p): Parameters<RecipeTextParams>) -> Result<CallToolResult, McpError> {
        let format = parse_format(p.format.as_deref())?;
        let result = recipes::import_recipe(&self.tables, &p.text, format)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Validate a recipe document against the recipe schema. Reports errors and warnings without changing anything.")]
    fn validate_recipe(&self, Parameters(p): Parameters<RecipeTextParams>) -> Result<CallToolResult, McpError> {
        let format = parse_format(p.format.as_deref())?;
        let result = recipes::validate_recipe(&p.text, format)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Display a recipe for a number of servings: formatted ingredient lines, steps with converted temperatures, nutrition, substitution suggestions and share text")]
    fn display_recipe(&self, Parameters(p): Parameters<DisplayRecipeParams>) -> Result<CallToolResult, McpError> {
        let format = parse_format(p.format.as_deref())?;
        let preferences = p
            .preferences
            .resolve(self.preferences)
            .map_err(|e| McpError::invalid_params(e, None))?;
        let options = DisplayOptions {
            servings: p.servings,
            preferences,
            precision: p.precision,
            suggestions: SuggestionModes {
                vegetarian: p.vegetarian,
                weight_conscious: p.weight_conscious,
            },
        };
        let result =
            recipes::display_recipe(&self.tables, &self.nutrition, &p.text, format, options)
                .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

#[tool_handler]
impl ServerHandler for CookbookService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "cookbook".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Science Cookbook".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Science Cookbook - recipe import, scaling and unit conversion. Every ingredient amount is canonical grams. \
                 IMPORTANT: Call usage_instructions before working with recipes. \
                 Recipes: import_recipe, validate_recipe, display_recipe. \
                 Amounts: normalize_ingredient, parse_quantity, estimate_grams, scale_quantity, format_quantity. \
                 Other: convert_temperature, default_preferences, cookbook_status."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_override_defaults() {
        let params = PreferencesParams {
            volume_unit: Some("cups".into()),
            temp_unit: Some("F".into()),
            ..PreferencesParams::default()
        };
        let prefs = params.resolve(DisplayPreferences::default()).unwrap();
        assert_eq!(prefs.volume_unit, VolumeStyle::Cups);
        assert_eq!(prefs.temp_unit, TempUnit::F);
        assert_eq!(prefs.weight_unit, WeightUnit::G);

        let bad = PreferencesParams {
            system: Some("nautical".into()),
            ..PreferencesParams::default()
        };
        assert!(bad.resolve(DisplayPreferences::default()).is_err());
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format(None).unwrap(), RecipeFormat::Auto);
        assert_eq!(parse_format(Some("JSON")).unwrap(), RecipeFormat::Json);
        assert!(parse_format(Some("toml")).is_err());
    }
}
