//! Cookbook Status Tool
//!
//! Provides runtime status information about the cookbook service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::config::DataSource;
use crate::nutrition::NutritionTable;
use crate::quantity::ConversionTables;

/// Usage guide for AI assistants
pub const USAGE_INSTRUCTIONS: &str = r#"
# Science Cookbook Usage Instructions

This guide explains how to work with recipes and ingredient amounts using the cookbook tools.

## Overview

Every ingredient carries one canonical amount: **grams** (`qty_g`). Everything else is derived:
1. **Import** - recipe text (YAML or JSON) is normalized and missing grams are estimated
2. **Scale** - grams are multiplied by `target_servings / base_servings`
3. **Display** - scaled grams are rendered as counts, spoons, cups, ml, g or oz

The free-text amount (`vol_est`, e.g. "2 cups") is kept only as a hint. It is never scaled.

---

## Importing a Recipe

**Tool:** `import_recipe`

```yaml
meta:
  name: Banana Bread
  source: https://example.com/banana-bread
  base_servings: 8
ingredients:
  - name: all-purpose flour
    qty_g: 250
    vol_est: 2 cups
  - name: ripe bananas
    vol_est: 3 medium
steps:
  - Preheat the oven to 350°F.
  - Mash the bananas.
```

- `format` is `auto` (default), `yaml` or `json`. Auto picks JSON when the text starts with `{`.
- Ingredients without `qty_g` are estimated from `vol_est` and flagged `estimated: true`.
- The response lists `missing` (still 0 g, will not scale) and `estimated` ingredients.
- Duplicate ingredient names are dropped; the first one wins.

Run `validate_recipe` first when a document is hand-written. It reports errors and warnings
without changing anything.

---

## Displaying a Recipe

**Tool:** `display_recipe`

| Parameter | Meaning |
|-----------|---------|
| `text` | Recipe document |
| `servings` | Target servings (clamped: below 1 → 1, 50 and up → nearest 10) |
| `preferences` | Display preferences (omit for the server's regional defaults) |
| `precision` | Show exact weights instead of counts and cups |
| `vegetarian` / `weight_conscious` | Show substitution suggestions |

The response has one line per ingredient, steps with temperatures converted to the preferred
scale, a nutrition summary when nutrition data is loaded, and a plain-text `share_text` block.

### Display preferences

```json
{"weight_unit": "g", "volume_unit": "ml", "temp_unit": "C", "system": "auto", "decimal_comma": false}
```

- `weight_unit`: `g` or `oz` (precision mode)
- `volume_unit`: `ml` or `cups`
- `temp_unit`: `C` or `F`
- `system`: `auto`, `metric` (always g/ml) or `imperial` (always oz/cups)

Call `default_preferences` to get the defaults for the server's region.

---

## Working with Single Amounts

| Tool | Use |
|------|-----|
| `normalize_ingredient` | Clean a scraped line (spaces, entities, fractions) and strip the leading amount |
| `parse_quantity` | Split "1 1/2 cups flour" into magnitude, unit and remainder |
| `estimate_grams` | Grams for a free-text amount, with the strategy that produced them |
| `scale_quantity` | `qty_g × target / base` |
| `format_quantity` | Render one ingredient for given servings and preferences |
| `convert_temperature` | Rewrite every temperature in a text to C or F |

### Estimation order

`estimate_grams` tries these in order and stops at the first positive result:
1. **pinch** - "a pinch of salt" (0.36 g for salt, 0.2 g otherwise)
2. **canned** - "1 (14.5 oz) can" (snapped to known can sizes)
3. **whole_unit** - "3 medium bananas", "2 large eggs", "4 cloves garlic"
4. **smart_unit** - "2 cups", "1 tbsp", "8 oz", "1 lb"
5. **density** - a volume unit anywhere in the text

A result of `0` with `strategy: null` means the amount could not be estimated. Ask the user
for a weight rather than guessing.

---

## Notes

- Temperatures in steps are converted; ingredient text is not.
- Ingredients with `no_scale: true` keep their amount at every serving count.
- Substitutions are suggestions only; the ingredient list is never changed.
- Nutrition values are per 100 g in `nutrition.yaml` and shown scaled to the target servings.
"#;

/// Sizes of the tables loaded at startup
#[derive(Debug, Clone, Serialize)]
pub struct TableSizes {
    pub densities: usize,
    pub whole_units: usize,
    pub packaged_units: usize,
    pub display_prefs: usize,
    pub aliases: usize,
    pub nutrition_entries: usize,
    pub glossary_entries: usize,
}

impl TableSizes {
    pub fn of(tables: &ConversionTables, nutrition: &NutritionTable) -> Self {
        Self {
            densities: tables.density_per_cup.len(),
            whole_units: tables.whole_unit_weights.len(),
            packaged_units: tables.packaged_unit_weights.len(),
            display_prefs: tables.display_prefs.len(),
            aliases: tables.aliases.len(),
            nutrition_entries: nutrition.len(),
            glossary_entries: nutrition.glossary_len(),
        }
    }
}

/// Runtime status of the cookbook service
#[derive(Debug, Clone, Serialize)]
pub struct CookbookStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Data information
    pub data_dir: String,
    pub data_files: Vec<DataSource>,
    pub region: String,
    pub tables: TableSizes,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    data_dir: PathBuf,
    data_files: Vec<DataSource>,
    region: String,
    tables: TableSizes,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(
        data_dir: PathBuf,
        data_files: Vec<DataSource>,
        region: String,
        tables: TableSizes,
    ) -> Self {
        Self {
            start_time: Instant::now(),
            data_dir,
            data_files,
            region,
            tables,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> CookbookStatus {
        let build_info = BuildInfo::current();

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        CookbookStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            data_dir: self.data_dir.display().to_string(),
            data_files: self.data_files.clone(),
            region: self.region.clone(),
            tables: self.tables.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reports_tables_and_process() {
        let tables = ConversionTables::builtin();
        let sizes = TableSizes::of(&tables, &NutritionTable::new());
        assert_eq!(sizes.densities, tables.density_per_cup.len());
        assert_eq!(sizes.nutrition_entries, 0);

        let tracker = StatusTracker::new(PathBuf::from("/tmp/data"), Vec::new(), "US".into(), sizes);
        let status = tracker.get_status();
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.region, "US");
        assert_eq!(status.data_dir, "/tmp/data");
        assert_eq!(status.tables.packaged_units, 3);
    }
}
