//! Redisplay formatting
//!
//! Renders a canonical gram quantity in the unit a cook expects to read:
//! a count of whole items, a spoon measure, cups, ml/L, or an exact weight.

use crate::models::{DisplayPreferences, Ingredient, UnitSystem, VolumeStyle, WeightUnit};

use super::scaler::Servings;
use super::tables::{ConversionTables, DisplayPref};
use super::units::{VolumeUnit, G_PER_OZ, ML_PER_CUP, TBSP_PER_CUP, TSP_PER_CUP, TSP_PER_TBSP};

/// Quarter of a unit, the coarsest snapping step for spoons and cups
const QUARTER: f64 = 0.25;

/// Teaspoons at which a teaspoon preference switches to cups
const TSP_TO_CUP_THRESHOLD: f64 = 12.0;
/// Teaspoons at which a teaspoon preference switches to tablespoons
const TSP_TO_TBSP_THRESHOLD: f64 = 4.0;
/// Tablespoons at which a tablespoon preference switches to cups
const TBSP_TO_CUP_THRESHOLD: f64 = 4.0;

/// Round to the nearest multiple of `step`, never below `min`.
/// Non-finite input becomes 0.
pub fn round_to_step(value: f64, step: f64, min: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    ((value / step).round() * step).max(min)
}

/// Render a magnitude as whole number plus quarter fraction: "2 1/4", "3/4", "2".
/// Anything that snaps to zero (or is not a positive number) renders as "0".
pub fn to_quarter_fraction(value: f64) -> String {
    if !value.is_finite() || value <= 0.0 {
        return "0".to_string();
    }
    let quarters = (value * 4.0).round() as u64;
    let whole = quarters / 4;
    let frac = match quarters % 4 {
        1 => Some("1/4"),
        2 => Some("1/2"),
        3 => Some("3/4"),
        _ => None,
    };
    match (whole, frac) {
        (0, None) => "0".to_string(),
        (0, Some(f)) => f.to_string(),
        (w, None) => w.to_string(),
        (w, Some(f)) => format!("{} {}", w, f),
    }
}

/// Fixed-point rendering with trailing zeros removed
pub fn format_decimal(value: f64, places: usize, decimal_comma: bool) -> String {
    let mut s = format!("{:.*}", places, value);
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if decimal_comma {
        s = s.replace('.', ",");
    }
    s
}

fn cup_label(cups: f64) -> &'static str {
    if cups > 1.0 {
        "cups"
    } else {
        "cup"
    }
}

/// Grams to cups, tablespoons or teaspoons, whichever is the largest unit
/// giving at least one, snapped to quarters.
pub fn grams_to_spoons_or_cups(grams: f64, grams_per_cup: f64) -> String {
    let cups = grams / grams_per_cup;
    if cups >= 1.0 {
        let cups = round_to_step(cups, QUARTER, QUARTER);
        return format!("{} {}", to_quarter_fraction(cups), cup_label(cups));
    }
    let tbsp = cups * TBSP_PER_CUP;
    if tbsp >= 1.0 {
        let tbsp = round_to_step(tbsp, QUARTER, QUARTER);
        return format!("{} {}", to_quarter_fraction(tbsp), VolumeUnit::Tbsp.label());
    }
    let tsp = round_to_step(tbsp * TSP_PER_TBSP, QUARTER, QUARTER);
    format!("{} {}", to_quarter_fraction(tsp), VolumeUnit::Tsp.label())
}

/// Grams to ml, or L from one liter up
pub fn grams_to_ml(grams: f64, grams_per_cup: f64, decimal_comma: bool) -> String {
    let ml = grams / grams_per_cup * ML_PER_CUP;
    if ml >= 1000.0 {
        let liters = round_to_step(ml, 5.0, 5.0) / 1000.0;
        return format!("{} L", format_decimal(liters, 2, decimal_comma));
    }
    if ml >= 100.0 {
        return format!("{} ml", format_decimal(round_to_step(ml, 5.0, 5.0), 0, decimal_comma));
    }
    if ml >= 10.0 {
        return format!("{} ml", format_decimal(round_to_step(ml, 1.0, 1.0), 0, decimal_comma));
    }
    format!("{} ml", format_decimal(round_to_step(ml, 0.5, 0.5), 1, decimal_comma))
}

/// Exact weight with magnitude-dependent granularity
pub fn format_precise_weight(grams: f64, unit: WeightUnit, decimal_comma: bool) -> String {
    match unit {
        WeightUnit::Oz => {
            let oz = grams / G_PER_OZ;
            let (rounded, places) = if oz >= 8.0 {
                (round_to_step(oz, 0.1, 0.0), 1)
            } else if oz >= 1.0 {
                (round_to_step(oz, 0.05, 0.0), 2)
            } else {
                (round_to_step(oz, 0.01, 0.01), 2)
            };
            format!("{} oz", format_decimal(rounded, places, decimal_comma))
        }
        WeightUnit::G => {
            let (rounded, places) = if grams >= 100.0 {
                (round_to_step(grams, 1.0, 0.0), 0)
            } else if grams >= 10.0 {
                (round_to_step(grams, 0.5, 0.0), 1)
            } else {
                (round_to_step(grams, 0.1, 0.1), 1)
            };
            format!("{} g", format_decimal(rounded, places, decimal_comma))
        }
    }
}

/// Spoon measure for an ingredient with a display preference, moving up to
/// tablespoons or cups once the spoon count gets unwieldy.
pub fn format_display_pref(grams: f64, pref: DisplayPref) -> String {
    let units = round_to_step(grams / pref.grams_per_unit, QUARTER, QUARTER);
    let cups = |per_cup: f64| {
        let cups = round_to_step(units / per_cup, QUARTER, QUARTER);
        format!("{} {}", to_quarter_fraction(cups), cup_label(cups))
    };
    match pref.unit {
        VolumeUnit::Tsp if units >= TSP_TO_CUP_THRESHOLD => cups(TSP_PER_CUP),
        VolumeUnit::Tsp if units >= TSP_TO_TBSP_THRESHOLD => {
            let tbsp = round_to_step(units / TSP_PER_TBSP, QUARTER, QUARTER);
            format!("{} {}", to_quarter_fraction(tbsp), VolumeUnit::Tbsp.label())
        }
        VolumeUnit::Tbsp if units >= TBSP_TO_CUP_THRESHOLD => cups(TBSP_PER_CUP),
        VolumeUnit::Cup => format!("{} {}", to_quarter_fraction(units), cup_label(units)),
        unit => format!("{} {}", to_quarter_fraction(units), unit.label()),
    }
}

/// Count of whole items ("3 bananas"), when the ingredient is a countable food
pub fn format_whole_units(grams: f64, name: &str, tables: &ConversionTables) -> Option<String> {
    let key = tables.whole_unit_display_key(name)?;
    let per_item = tables.whole_unit(&key)?.default;
    if per_item <= 0.0 {
        return None;
    }
    let count = (grams / per_item * 4.0).round() / 4.0;
    if count <= 0.0 {
        return None;
    }
    let label = if count >= 2.0 {
        tables.whole_unit_plural(&key)
    } else {
        key
    };
    Some(format!("{} {}", to_quarter_fraction(count), label))
}

fn format_volume(
    grams: f64,
    name: &str,
    prefs: &DisplayPreferences,
    tables: &ConversionTables,
) -> String {
    let grams_per_cup = tables.grams_per_cup(name);
    match prefs.effective_volume_unit() {
        VolumeStyle::Ml => grams_to_ml(grams, grams_per_cup, prefs.decimal_comma),
        VolumeStyle::Cups => grams_to_spoons_or_cups(grams, grams_per_cup),
    }
}

/// Render an ingredient's amount for the requested servings.
///
/// Precedence: whole-item count (outside precision mode), volume for liquids
/// under the auto system, the ingredient's spoon preference, exact weight in
/// precision mode, the stored free text when there is no mass, and finally
/// the preferred volume style.
pub fn format_quantity(
    ingredient: &Ingredient,
    servings: Servings,
    prefs: &DisplayPreferences,
    precision: bool,
    tables: &ConversionTables,
) -> String {
    if !ingredient.has_quantity() {
        return ingredient.vol_est.clone();
    }
    let grams = servings.apply(ingredient.qty_g, ingredient.no_scale);
    let name = ingredient.name.trim();

    if !precision {
        if let Some(count) = format_whole_units(grams, name, tables) {
            return count;
        }
    }

    if prefs.system == UnitSystem::Auto && tables.is_volume_preferred(name) {
        return format_volume(grams, name, prefs, tables);
    }

    if let Some(pref) = tables.display_pref(name) {
        return format_display_pref(grams, pref);
    }

    if precision {
        return format_precise_weight(grams, prefs.effective_weight_unit(), prefs.decimal_comma);
    }

    format_volume(grams, name, prefs, tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TempUnit;

    fn cups_prefs() -> DisplayPreferences {
        DisplayPreferences {
            weight_unit: WeightUnit::Oz,
            volume_unit: VolumeStyle::Cups,
            temp_unit: TempUnit::F,
            system: UnitSystem::Auto,
            decimal_comma: false,
        }
    }

    fn unscaled() -> Servings {
        Servings::unscaled(8.0)
    }

    #[test]
    fn test_quarter_fraction() {
        assert_eq!(to_quarter_fraction(0.0), "0");
        assert_eq!(to_quarter_fraction(0.1), "0");
        assert_eq!(to_quarter_fraction(0.25), "1/4");
        assert_eq!(to_quarter_fraction(2.0833), "2");
        assert_eq!(to_quarter_fraction(2.3), "2 1/4");
        assert_eq!(to_quarter_fraction(1.5), "1 1/2");
        assert_eq!(to_quarter_fraction(0.74), "3/4");
        assert_eq!(to_quarter_fraction(-1.0), "0");
        assert_eq!(to_quarter_fraction(f64::NAN), "0");
    }

    #[test]
    fn test_flour_in_cups() {
        let t = ConversionTables::builtin();
        let flour = Ingredient::new("all-purpose flour", 250.0);
        assert_eq!(format_quantity(&flour, unscaled(), &cups_prefs(), false, &t), "2 cups");
    }

    #[test]
    fn test_whole_units() {
        let t = ConversionTables::builtin();
        let bananas = Ingredient::new("banana", 354.0);
        assert_eq!(format_quantity(&bananas, unscaled(), &cups_prefs(), false, &t), "3 bananas");
        let halved = Servings::new(8.0, 4.0);
        assert_eq!(format_quantity(&bananas, halved, &cups_prefs(), false, &t), "1 1/2 banana");
        let garlic = Ingredient::new("garlic", 15.0);
        assert_eq!(format_quantity(&garlic, unscaled(), &cups_prefs(), false, &t), "3 garlic cloves");
    }

    #[test]
    fn test_counts_read_back_unchanged() {
        use crate::quantity::estimator::estimate_grams;

        let t = ConversionTables::builtin();
        for (text, name, shown) in [
            ("3 bananas", "banana", "3 bananas"),
            ("2 eggs", "eggs", "2 eggs"),
            ("2 large eggs", "eggs", "2 eggs"),
            ("4 cloves", "garlic", "4 garlic cloves"),
        ] {
            let grams = estimate_grams(text, name, &t);
            assert_eq!(format_whole_units(grams, name, &t).as_deref(), Some(shown), "{}", text);
        }
    }

    #[test]
    fn test_precision_skips_whole_units() {
        let t = ConversionTables::builtin();
        let bananas = Ingredient::new("banana", 354.0);
        let mut prefs = cups_prefs();
        prefs.weight_unit = WeightUnit::G;
        assert_eq!(format_quantity(&bananas, unscaled(), &prefs, true, &t), "354 g");
        prefs.weight_unit = WeightUnit::Oz;
        assert_eq!(format_quantity(&bananas, unscaled(), &prefs, true, &t), "12.5 oz");
    }

    #[test]
    fn test_volume_preferred_liquids() {
        let t = ConversionTables::builtin();
        let milk = Ingredient::new("milk", 245.0);
        assert_eq!(format_quantity(&milk, unscaled(), &cups_prefs(), false, &t), "1 cup");
        let mut metric = cups_prefs();
        metric.volume_unit = VolumeStyle::Ml;
        assert_eq!(format_quantity(&milk, unscaled(), &metric, false, &t), "240 ml");
        let broth = Ingredient::new("chicken broth", 1000.0);
        assert_eq!(format_quantity(&broth, unscaled(), &metric, false, &t), "1 L");
    }

    #[test]
    fn test_display_prefs() {
        let t = ConversionTables::builtin();
        let p = &cups_prefs();
        let s = unscaled();
        assert_eq!(format_quantity(&Ingredient::new("salt", 6.0), s, p, false, &t), "1 tsp");
        assert_eq!(format_quantity(&Ingredient::new("salt", 0.36), s, p, false, &t), "1/4 tsp");
        assert_eq!(format_quantity(&Ingredient::new("baking soda", 30.0), s, p, false, &t), "2 tbsp");
        assert_eq!(format_quantity(&Ingredient::new("salt", 72.0), s, p, false, &t), "1/4 cup");
        assert_eq!(format_quantity(&Ingredient::new("honey", 21.0), s, p, false, &t), "1 tbsp");
        assert_eq!(format_quantity(&Ingredient::new("honey", 336.0), s, p, false, &t), "1 cup");
    }

    #[test]
    fn test_precise_weights() {
        assert_eq!(format_precise_weight(12.34, WeightUnit::G, false), "12.5 g");
        assert_eq!(format_precise_weight(4.04, WeightUnit::G, false), "4 g");
        assert_eq!(format_precise_weight(0.01, WeightUnit::G, false), "0.1 g");
        assert_eq!(format_precise_weight(150.4, WeightUnit::G, true), "150 g");
        assert_eq!(format_precise_weight(12.34, WeightUnit::G, true), "12,5 g");
        assert_eq!(format_precise_weight(56.699, WeightUnit::Oz, false), "2 oz");
        assert_eq!(format_precise_weight(10.0, WeightUnit::Oz, false), "0.35 oz");
    }

    #[test]
    fn test_ml_steps() {
        assert_eq!(grams_to_ml(123.0, 240.0, false), "125 ml");
        assert_eq!(grams_to_ml(12.4, 240.0, false), "12 ml");
        assert_eq!(grams_to_ml(2.3, 240.0, false), "2.5 ml");
        assert_eq!(grams_to_ml(1250.0, 240.0, true), "1,25 L");
    }

    #[test]
    fn test_spoons() {
        assert_eq!(grams_to_spoons_or_cups(30.0, 240.0), "2 tbsp");
        assert_eq!(grams_to_spoons_or_cups(2.5, 240.0), "1/2 tsp");
        assert_eq!(grams_to_spoons_or_cups(0.0, 240.0), "1/4 tsp");
    }

    #[test]
    fn test_missing_quantity_uses_free_text() {
        let t = ConversionTables::builtin();
        let thyme = Ingredient::new("thyme", 0.0).with_vol_est("3 sprigs,  leaves only");
        assert_eq!(
            format_quantity(&thyme, unscaled(), &cups_prefs(), true, &t),
            "3 sprigs,  leaves only"
        );
    }

    #[test]
    fn test_no_scale() {
        let t = ConversionTables::builtin();
        let mut salt = Ingredient::new("salt", 6.0);
        salt.no_scale = true;
        let doubled = Servings::new(4.0, 8.0);
        assert_eq!(format_quantity(&salt, doubled, &cups_prefs(), false, &t), "1 tsp");
    }

    #[test]
    fn test_metric_system_forces_ml_and_grams() {
        let t = ConversionTables::builtin();
        let mut prefs = cups_prefs();
        prefs.system = UnitSystem::Metric;
        let flour = Ingredient::new("all-purpose flour", 120.0);
        assert_eq!(format_quantity(&flour, unscaled(), &prefs, false, &t), "240 ml");
        assert_eq!(format_quantity(&flour, unscaled(), &prefs, true, &t), "120 g");
    }
}
