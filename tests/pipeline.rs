//! End-to-end: import, estimate, scale, format, and read the output back.

use cookbook::config::{Config, SourceStatus};
use cookbook::models::{
    DisplayPreferences, Recipe, RecipeFormat, TempUnit, UnitSystem, VolumeStyle, WeightUnit,
};
use cookbook::nutrition::NutritionTable;
use cookbook::quantity::{estimate_grams, ConversionTables};
use cookbook::tools::recipes::{render_recipe, DisplayOptions};

const DAL: &str = r#"
meta:
  name: Weeknight Dal
  source: https://example.com/dal
  base_servings: 4
ingredients:
  - name: red lentils
    vol_est: 1 cup
  - name: diced tomatoes
    vol_est: 1 (14.5 oz) can
  - name: onion
    vol_est: 1 large
  - name: garlic
    vol_est: 3 cloves
  - name: coconut milk (canned)
    qty_g: 400
  - name: salt
    qty_g: 6
    vol_est: 1 tsp
    no_scale: true
steps:
  - Rinse the lentils.
  - Simmer at 95°C for 20 minutes.
science_notes:
  - Red lentils have no seed coat, so they collapse into a puree.
"#;

fn cups_prefs() -> DisplayPreferences {
    DisplayPreferences {
        weight_unit: WeightUnit::Oz,
        volume_unit: VolumeStyle::Cups,
        temp_unit: TempUnit::F,
        system: UnitSystem::Auto,
        decimal_comma: false,
    }
}

#[test]
fn import_estimates_missing_grams() {
    let tables = ConversionTables::builtin();
    let report = Recipe::import(DAL, RecipeFormat::Auto, &tables).unwrap();
    let grams: Vec<f64> = report.recipe.ingredients.iter().map(|i| i.qty_g).collect();
    assert_eq!(grams, vec![192.0, 411.0, 200.0, 15.0, 400.0, 6.0]);
    assert!(report.missing.is_empty());
    assert_eq!(report.estimated.len(), 4);
    assert!(report.estimated.contains(&"red lentils (192 g estimated)".to_string()));
}

#[test]
fn scaled_display_reads_back_to_the_same_grams() {
    let tables = ConversionTables::builtin();
    let recipe = Recipe::import(DAL, RecipeFormat::Auto, &tables).unwrap().recipe;
    let options = DisplayOptions {
        servings: Some(8.0),
        preferences: cups_prefs(),
        ..DisplayOptions::default()
    };
    let display = render_recipe(&tables, &NutritionTable::new(), &recipe, options);

    assert_eq!(display.ingredients[0].amount, "2 cups");
    assert_eq!(display.ingredients[3].amount, "6 garlic cloves");
    assert_eq!(display.ingredients[4].amount, "3 1/2 cups");
    assert_eq!(display.ingredients[5].amount, "1 tsp");
    assert_eq!(display.steps[1], "Simmer at 203°F for 20 minutes.");

    for idx in [0, 3, 4] {
        let line = &display.ingredients[idx];
        let reparsed = estimate_grams(&line.amount, &line.name, &tables);
        let drift = (reparsed - line.scaled_g).abs() / line.scaled_g;
        assert!(
            drift < 0.05,
            "{}: {} g shown as '{}' reads back as {} g",
            line.name,
            line.scaled_g,
            line.amount,
            reparsed
        );
    }
}

#[test]
fn precision_mode_shows_weights() {
    let tables = ConversionTables::builtin();
    let recipe = Recipe::import(DAL, RecipeFormat::Auto, &tables).unwrap().recipe;
    let options = DisplayOptions {
        precision: true,
        ..DisplayOptions::default()
    };
    let display = render_recipe(&tables, &NutritionTable::new(), &recipe, options);
    assert_eq!(display.servings, 4.0);
    assert_eq!(display.ingredients[0].amount, "192 g");
    assert_eq!(display.ingredients[1].amount, "411 g");
    assert_eq!(display.steps[1], "Simmer at 95°C for 20 minutes.");
}

#[test]
fn scraped_lines_flow_through_import() {
    let tables = ConversionTables::builtin();
    let lines = vec![
        "1 ½ cups flour".to_string(),
        "2 large eggs".to_string(),
        "2 large eggs".to_string(),
        "1 cup milk".to_string(),
    ];
    let steps = vec!["Whisk everything.".to_string(), "  ".to_string()];
    let report = Recipe::from_scraped(
        "Pancakes",
        "https://example.com/pancakes",
        "4 servings",
        &lines,
        &steps,
        &tables,
    )
    .unwrap();
    let recipe = report.recipe;

    assert_eq!(recipe.id, "pancakes");
    assert_eq!(recipe.meta.base_servings, 4.0);
    assert_eq!(recipe.steps, vec!["Whisk everything.".to_string()]);
    let names: Vec<&str> = recipe.ingredients.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["flour", "large eggs", "milk"]);
    let grams: Vec<f64> = recipe.ingredients.iter().map(|i| i.qty_g).collect();
    assert_eq!(grams, vec![180.0, 114.0, 245.0]);
    assert!(recipe.ingredients.iter().all(|i| i.estimated));
}

#[test]
fn shipped_data_files_load() {
    let config = Config::with_data_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));
    let data = config.load_data();
    for source in &data.sources {
        assert_eq!(source.status, SourceStatus::Loaded, "{}", source.file);
    }
    assert_eq!(data.tables.density_for("chopped walnuts"), Some(117.0));
    assert!(data.tables.whole_unit("zucchini").is_some());
    assert_eq!(data.nutrition.lookup("AP flour").map(|n| n.calories), Some(364.0));
    assert_eq!(data.nutrition.lookup("ripe bananas").map(|n| n.calories), Some(89.0));
}
