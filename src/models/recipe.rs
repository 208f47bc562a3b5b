//! Recipe model
//!
//! A recipe document as pasted (YAML or JSON) or scraped, and the import
//! pipeline that normalizes it: clean names, estimate missing grams, drop
//! duplicate ingredients.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::ingredient::{lenient_string, Ingredient};
use crate::quantity::estimator::estimate_grams;
use crate::quantity::tables::ConversionTables;
use crate::quantity::text::{
    clean_line, decode_entities, normalize_whitespace, slugify, strip_leading_quantity,
};

/// Backup document format version
pub const BACKUP_VERSION: &str = "1.0";

/// Recipe import error types
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Recipe document is missing '{0}'")]
    MissingSection(&'static str),
}

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;

/// Input document format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeFormat {
    /// JSON when the text starts with `{`, otherwise YAML
    #[default]
    Auto,
    Yaml,
    Json,
}

impl RecipeFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "auto" => Some(RecipeFormat::Auto),
            "yaml" | "yml" => Some(RecipeFormat::Yaml),
            "json" => Some(RecipeFormat::Json),
            _ => None,
        }
    }
}

/// Recipe metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeMeta {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "source_field")]
    pub source: String,
    #[serde(default = "default_servings", deserialize_with = "servings_field")]
    pub base_servings: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub prep_time: String,
}

fn default_servings() -> f64 {
    1.0
}

/// A normalized recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub meta: RecipeMeta,
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub science_notes: Vec<String>,
    #[serde(default)]
    pub history: Vec<Value>,
}

/// Document shape before normalization. Sections are optional so that their
/// absence can be reported instead of failing deserialization.
#[derive(Debug, Deserialize)]
struct RawRecipe {
    meta: Option<RecipeMeta>,
    ingredients: Option<Vec<Ingredient>>,
    #[serde(default)]
    steps: Option<Vec<Value>>,
    #[serde(default)]
    science_notes: Option<Vec<Value>>,
    #[serde(default)]
    history: Option<Vec<Value>>,
}

/// Outcome of an import
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub recipe: Recipe,
    /// Ingredients still without a gram weight; they will not scale
    pub missing: Vec<String>,
    /// "<name> (<grams> g estimated)" for every estimated ingredient
    pub estimated: Vec<String>,
}

/// Parse recipe text into a generic document tree
pub fn parse_document(text: &str, format: RecipeFormat) -> ImportResult<Value> {
    let use_json = match format {
        RecipeFormat::Json => true,
        RecipeFormat::Yaml => false,
        RecipeFormat::Auto => text.trim_start().starts_with('{'),
    };
    if use_json {
        Ok(serde_json::from_str(text)?)
    } else {
        Ok(serde_yaml::from_str(text)?)
    }
}

impl Recipe {
    /// Parse and normalize a recipe document
    pub fn import(
        text: &str,
        format: RecipeFormat,
        tables: &ConversionTables,
    ) -> ImportResult<ImportReport> {
        let doc = parse_document(text, format)?;
        Self::import_value(doc, tables)
    }

    /// Normalize an already-parsed document tree
    pub fn import_value(doc: Value, tables: &ConversionTables) -> ImportResult<ImportReport> {
        let has_section = |key: &str| doc.get(key).is_some_and(|v| !v.is_null());
        if !has_section("meta") {
            return Err(ImportError::MissingSection("meta"));
        }
        if !has_section("ingredients") {
            return Err(ImportError::MissingSection("ingredients"));
        }

        let raw: RawRecipe = serde_json::from_value(doc)?;
        let mut meta = raw.meta.ok_or(ImportError::MissingSection("meta"))?;
        let ingredients = raw
            .ingredients
            .ok_or(ImportError::MissingSection("ingredients"))?;

        meta.name = normalize_whitespace(&decode_entities(&meta.name));
        meta.source = meta.source.trim().to_string();

        let mut seen = HashSet::new();
        let ingredients: Vec<Ingredient> = ingredients
            .into_iter()
            .map(|ing| normalize_ingredient(ing, tables))
            .filter(|ing| seen.insert(ing.name.to_lowercase()))
            .collect();

        let steps = raw
            .steps
            .unwrap_or_default()
            .into_iter()
            .filter_map(|step| {
                let text = match step {
                    Value::String(s) => s,
                    Value::Object(map) => match map.get("text") {
                        Some(Value::String(s)) => s.clone(),
                        _ => return None,
                    },
                    Value::Null => return None,
                    other => other.to_string(),
                };
                let text = decode_entities(&text).trim().to_string();
                (!text.is_empty()).then_some(text)
            })
            .collect();

        let science_notes = raw
            .science_notes
            .unwrap_or_default()
            .into_iter()
            .filter_map(|note| match note {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                _ => None,
            })
            .collect();

        let recipe = Recipe {
            id: slugify(&meta.name),
            meta,
            ingredients,
            steps,
            science_notes,
            history: raw.history.unwrap_or_default(),
        };

        let missing: Vec<String> = recipe
            .ingredients
            .iter()
            .filter(|ing| !ing.has_quantity())
            .map(|ing| ing.name.clone())
            .collect();
        if !missing.is_empty() {
            tracing::warn!(
                "Recipe '{}': {} ingredient(s) still missing grams and will not scale: {}",
                recipe.id,
                missing.len(),
                missing.join(", ")
            );
        }

        let estimated: Vec<String> = recipe
            .ingredients
            .iter()
            .filter(|ing| ing.estimated)
            .map(|ing| format!("{} ({} g estimated)", ing.name, ing.qty_g))
            .collect();
        if !estimated.is_empty() {
            tracing::info!("Recipe '{}': estimated qty_g for {:?}", recipe.id, estimated);
        }

        Ok(ImportReport {
            recipe,
            missing,
            estimated,
        })
    }

    /// Build and import a document from strings scraped out of recipe markup
    /// (`name`, `url`, `recipeYield`, `recipeIngredient`, `recipeInstructions`).
    /// Identical ingredient lines are kept once.
    pub fn from_scraped(
        name: &str,
        source: &str,
        recipe_yield: &str,
        ingredient_lines: &[String],
        steps: &[String],
        tables: &ConversionTables,
    ) -> ImportResult<ImportReport> {
        let mut seen = HashSet::new();
        let ingredients: Vec<Ingredient> = ingredient_lines
            .iter()
            .map(|line| Ingredient::from_scraped_line(line))
            .filter(|ing| !ing.name.is_empty() && seen.insert(ing.name.clone()))
            .collect();
        let steps: Vec<String> = steps
            .iter()
            .map(|s| clean_line(s))
            .filter(|s| !s.is_empty())
            .collect();

        let name = if name.trim().is_empty() { "Unknown Recipe" } else { name };
        let recipe_yield = if recipe_yield.trim().is_empty() { "1" } else { recipe_yield };

        let doc = serde_json::json!({
            "meta": {
                "name": name,
                "source": source,
                "base_servings": recipe_yield,
                "prep_time": "",
            },
            "ingredients": ingredients,
            "steps": steps,
            "history": [],
        });
        Self::import_value(doc, tables)
    }

    /// Serialize back to the YAML document format
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Clean the name, keep the original amount, and estimate grams when the
/// document does not give a usable weight.
fn normalize_ingredient(mut ing: Ingredient, tables: &ConversionTables) -> Ingredient {
    let raw_name = normalize_whitespace(&ing.name);
    ing.name = strip_leading_quantity(&raw_name);
    ing.vol_est = normalize_whitespace(&ing.vol_est);
    if ing.vol_est.is_empty() && ing.name != raw_name {
        // "2 large eggs" given as the name carries the amount itself
        ing.vol_est = raw_name;
    }

    if !ing.has_quantity() {
        ing.qty_g = 0.0;
        let grams = estimate_grams(&ing.vol_est, &ing.name, tables);
        if grams > 0.0 {
            ing.qty_g = grams;
            ing.estimated = true;
        }
    }
    ing
}

// ============================================================================
// Meta field readers
// ============================================================================

/// `source` is a URL string or a JSON-LD object with `url` or `@id`
fn source_field<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Object(map) => ["url", "@id"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    })
}

fn servings_field<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite() && *v > 0.0).unwrap_or(1.0),
        Value::String(s) => parse_base_servings(&s),
        Value::Array(items) => items
            .first()
            .map(|v| match v {
                Value::String(s) => parse_base_servings(s),
                other => parse_base_servings(&other.to_string()),
            })
            .unwrap_or(1.0),
        _ => 1.0,
    })
}

/// Servings from text such as "8 servings" or "4, 6": first token, digits and
/// dots only. Anything not positive becomes 1.
pub fn parse_base_servings(text: &str) -> f64 {
    let first = text
        .trim()
        .split([' ', ','])
        .next()
        .unwrap_or_default();
    let numeric: String = first
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    numeric
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(1.0)
}

// ============================================================================
// Validation
// ============================================================================

/// One validation finding, addressed by field path ("ingredients[2].qty_g")
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    fn warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }
}

const REQUIRED_SECTIONS: &[&str] = &["meta", "ingredients", "steps"];
const REQUIRED_META_FIELDS: &[&str] = &["name", "base_servings"];
const REQUIRED_INGREDIENT_FIELDS: &[&str] = &["name", "qty_g"];

/// Check a document against the recipe schema without modifying it.
/// Stricter than import: numbers must be numbers and steps must be strings.
pub fn validate_document(doc: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();

    for section in REQUIRED_SECTIONS {
        if doc.get(section).is_none() {
            report.error(*section, "Missing required field");
        }
    }

    if let Some(meta) = doc.get("meta") {
        for field in REQUIRED_META_FIELDS {
            if meta.get(field).is_none() {
                report.error(format!("meta.{}", field), "Missing required field");
            }
        }
        if let Some(servings) = meta.get("base_servings") {
            if !servings.as_f64().is_some_and(|v| v > 0.0) {
                report.error(
                    "meta.base_servings",
                    format!("Must be a positive number, got: {}", servings),
                );
            }
        }
    }

    match doc.get("ingredients") {
        Some(Value::Array(ingredients)) => {
            validate_ingredients(ingredients, &mut report);
            if ingredients.len() < 2 {
                report.warning(
                    "ingredients",
                    format!("Recipe has fewer than 2 ingredients ({})", ingredients.len()),
                );
            }
        }
        Some(other) => report.error(
            "ingredients",
            format!("Must be an array, got: {}", type_name(other)),
        ),
        None => {}
    }

    match doc.get("steps") {
        Some(Value::Array(steps)) => {
            if steps.is_empty() {
                report.error("steps", "Must have at least one step");
            }
            for (idx, step) in steps.iter().enumerate() {
                if !step.as_str().is_some_and(|s| !s.trim().is_empty()) {
                    report.error(format!("steps[{}]", idx), "Step must be a non-empty string");
                }
            }
        }
        Some(other) => {
            report.error("steps", format!("Must be an array, got: {}", type_name(other)))
        }
        None => {}
    }

    match doc.get("science_notes") {
        Some(Value::Array(notes)) if !notes.is_empty() => {
            for (idx, note) in notes.iter().enumerate() {
                if !note.as_str().is_some_and(|s| !s.trim().is_empty()) {
                    report.error(
                        format!("science_notes[{}]", idx),
                        "Note must be a non-empty string",
                    );
                }
            }
        }
        _ => report.warning("science_notes", "No science notes provided"),
    }

    report
}

fn validate_ingredients(ingredients: &[Value], report: &mut ValidationReport) {
    let mut names = HashSet::new();
    for (idx, ing) in ingredients.iter().enumerate() {
        let id = format!("ingredients[{}]", idx);

        for field in REQUIRED_INGREDIENT_FIELDS {
            if ing.get(field).is_none() {
                report.error(format!("{}.{}", id, field), "Missing required field");
            }
        }

        if let Some(qty) = ing.get("qty_g") {
            if !qty.as_f64().is_some_and(|v| v >= 0.0) {
                report.error(
                    format!("{}.qty_g", id),
                    format!("Must be a non-negative number, got: {}", qty),
                );
            }
        }

        let name = ing.get("name").and_then(Value::as_str).unwrap_or_default();
        let key = name.trim().to_lowercase();
        if !key.is_empty() && !names.insert(key) {
            report.warning(format!("{}.name", id), format!("Duplicate ingredient: \"{}\"", name));
        }

        if let Some(Value::Array(subs)) = ing.get("substitutions") {
            for (sub_idx, sub) in subs.iter().enumerate() {
                let sub_id = format!("{}.substitutions[{}]", id, sub_idx);
                if !sub.get("name").and_then(Value::as_str).is_some_and(|s| !s.trim().is_empty()) {
                    report.error(format!("{}.name", sub_id), "Missing name");
                }
                if !sub.get("ratio").and_then(Value::as_f64).is_some_and(|r| r > 0.0) {
                    let got = sub.get("ratio").map_or("missing".to_string(), Value::to_string);
                    report.error(
                        format!("{}.ratio", sub_id),
                        format!("Must be a positive number, got: {}", got),
                    );
                }
                if !sub
                    .get("science_note")
                    .and_then(Value::as_str)
                    .is_some_and(|s| !s.trim().is_empty())
                {
                    report.warning(
                        format!("{}.science_note", sub_id),
                        "Missing science explanation",
                    );
                }
            }
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Backup
// ============================================================================

/// Export document holding every recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backup {
    pub version: String,
    /// RFC 3339 export time
    pub exported: String,
    pub count: usize,
    pub recipes: Vec<Recipe>,
}

impl Backup {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self {
            version: BACKUP_VERSION.to_string(),
            exported: chrono::Utc::now().to_rfc3339(),
            count: recipes.len(),
            recipes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANANA_BREAD: &str = r#"
meta:
  name: "Banana Bread &amp; Walnuts"
  source:
    "@id": https://example.com/banana
  base_servings: "8 servings"
  prep_time: 15 min
ingredients:
  - name: all-purpose flour
    qty_g: 250
    vol_est: 2 cups
    function: structure
    ww_points: 24
    substitutions:
      - name: whole wheat flour
        ratio: 1.0
        science_note: More bran; add 10g water
        ww_points: 23
        tags: [ww]
  - name: "3 ripe bananas"
    qty_g: 0
    vol_est: 3 medium
  - name: large eggs
    vol_est: "2 large eggs"
  - name: All-Purpose Flour
    qty_g: 100
  - name: thyme
    vol_est: 3 sprigs
steps:
  - Preheat oven to 175C.
  - text: "Mash bananas &amp; sugar."
  - ""
science_notes:
  - Overripe bananas are sweeter.
"#;

    #[test]
    fn test_import_pipeline() {
        let tables = ConversionTables::builtin();
        let report = Recipe::import(BANANA_BREAD, RecipeFormat::Auto, &tables).unwrap();
        let recipe = &report.recipe;

        assert_eq!(recipe.id, "banana-bread-walnuts");
        assert_eq!(recipe.meta.name, "Banana Bread & Walnuts");
        assert_eq!(recipe.meta.source, "https://example.com/banana");
        assert_eq!(recipe.meta.base_servings, 8.0);

        let names: Vec<&str> = recipe.ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["all-purpose flour", "ripe bananas", "large eggs", "thyme"]);

        let bananas = &recipe.ingredients[1];
        assert_eq!(bananas.qty_g, 354.0);
        assert!(bananas.estimated);
        let eggs = &recipe.ingredients[2];
        assert_eq!(eggs.qty_g, 114.0);
        assert_eq!(eggs.vol_est, "2 large eggs");

        assert_eq!(report.missing, ["thyme"]);
        assert_eq!(
            report.estimated,
            ["ripe bananas (354 g estimated)", "large eggs (114 g estimated)"]
        );
        assert_eq!(recipe.steps, ["Preheat oven to 175C.", "Mash bananas & sugar."]);
        assert_eq!(recipe.science_notes.len(), 1);
    }

    #[test]
    fn test_import_json_and_missing_sections() {
        let tables = ConversionTables::builtin();
        let json = r#"{"meta":{"name":"Toast","base_servings":0},"ingredients":[{"name":"bread","qty_g":60}],"steps":["Toast it."]}"#;
        let report = Recipe::import(json, RecipeFormat::Auto, &tables).unwrap();
        assert_eq!(report.recipe.meta.base_servings, 1.0);
        assert!(report.missing.is_empty());

        let err = Recipe::import("meta:\n  name: x\n", RecipeFormat::Yaml, &tables).unwrap_err();
        assert!(matches!(err, ImportError::MissingSection("ingredients")));
        let err = Recipe::import("ingredients: []\n", RecipeFormat::Yaml, &tables).unwrap_err();
        assert!(matches!(err, ImportError::MissingSection("meta")));
        assert!(matches!(
            Recipe::import("{not json", RecipeFormat::Auto, &tables),
            Err(ImportError::Json(_))
        ));
    }

    #[test]
    fn test_from_scraped() {
        let tables = ConversionTables::builtin();
        let lines = vec![
            "2 cups all-purpose flour".to_string(),
            "2\u{00A0}cups all-purpose flour".to_string(),
            "1½ tsp salt".to_string(),
        ];
        let steps = vec!["  Mix.  ".to_string(), " ".to_string()];
        let report =
            Recipe::from_scraped("Bread", "https://example.com", "4, 6", &lines, &steps, &tables).unwrap();
        let r = &report.recipe;
        assert_eq!(r.meta.base_servings, 4.0);
        assert_eq!(r.ingredients.len(), 2);
        assert_eq!(r.ingredients[0].name, "all-purpose flour");
        assert_eq!(r.ingredients[0].vol_est, "2 cups all-purpose flour");
        assert_eq!(r.ingredients[0].qty_g, 240.0);
        assert_eq!(r.ingredients[1].name, "salt");
        assert_eq!(r.steps, ["Mix."]);
    }

    #[test]
    fn test_parse_base_servings() {
        assert_eq!(parse_base_servings("8 servings"), 8.0);
        assert_eq!(parse_base_servings("4, 6"), 4.0);
        assert_eq!(parse_base_servings("serves"), 1.0);
        assert_eq!(parse_base_servings("0"), 1.0);
        assert_eq!(parse_base_servings("12pcs"), 12.0);
    }

    #[test]
    fn test_validate_document() {
        let doc: Value = serde_yaml::from_str(
            r#"
meta:
  name: Bad
  base_servings: "four"
ingredients:
  - name: flour
    qty_g: -5
    substitutions:
      - ratio: 0
  - name: Flour
    qty_g: 10
steps: []
"#,
        )
        .unwrap();
        let report = validate_document(&doc);
        assert!(!report.is_valid());
        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"meta.base_servings"));
        assert!(fields.contains(&"ingredients[0].qty_g"));
        assert!(fields.contains(&"ingredients[0].substitutions[0].name"));
        assert!(fields.contains(&"ingredients[0].substitutions[0].ratio"));
        assert!(fields.contains(&"steps"));
        let warnings: Vec<&str> = report.warnings.iter().map(|w| w.field.as_str()).collect();
        assert!(warnings.contains(&"ingredients[1].name"));
        assert!(warnings.contains(&"ingredients[0].substitutions[0].science_note"));
        assert!(warnings.contains(&"science_notes"));
    }

    #[test]
    fn test_validate_clean_document() {
        let doc = parse_document(BANANA_BREAD, RecipeFormat::Yaml).unwrap();
        let report = validate_document(&doc);
        // import accepts all of these; validation does not
        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "meta.base_servings",
                "ingredients[2].qty_g",
                "ingredients[4].qty_g",
                "steps[1]",
                "steps[2]"
            ]
        );
    }

    #[test]
    fn test_backup() {
        let backup = Backup::new(Vec::new());
        assert_eq!(backup.version, "1.0");
        assert_eq!(backup.count, 0);
        assert!(chrono::DateTime::parse_from_rfc3339(&backup.exported).is_ok());
    }
}
