//! Nutrition lookup table
//!
//! Per-100 g values keyed by normalized ingredient name, with a glossary that
//! maps name variations ("AP flour", "plain flour") to one canonical entry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{lenient_f64, Nutrition};
use crate::quantity::text::normalize_key;

/// One row of a nutrition data file, values per 100 g
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NutritionRow {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub calories_kcal: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub protein_g: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fat_g: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub carbs_g: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fiber_g: f64,
}

impl NutritionRow {
    fn key(&self) -> String {
        let label = self
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.id.as_deref())
            .unwrap_or_default();
        normalize_key(label)
    }

    fn nutrition(&self) -> Nutrition {
        Nutrition {
            calories: self.calories_kcal,
            protein: self.protein_g,
            fat: self.fat_g,
            carbs: self.carbs_g,
            fiber: self.fiber_g,
        }
    }
}

/// Name variations for one canonical ingredient
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlossaryEntry {
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub canonical: String,
}

/// Glossary data file: `{glossary: [{names: [..], canonical: ..}]}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlossaryFile {
    #[serde(default)]
    pub glossary: Vec<GlossaryEntry>,
}

impl GlossaryFile {
    /// (variation, canonical) name pairs, for feeding the conversion alias map
    pub fn alias_pairs(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.glossary
            .iter()
            .filter(|e| !e.canonical.trim().is_empty())
            .flat_map(|e| e.names.iter().map(move |n| (n.clone(), e.canonical.clone())))
    }
}

/// Per-100 g nutrition keyed by normalized name
#[derive(Debug, Clone, Default)]
pub struct NutritionTable {
    per_100g: HashMap<String, Nutrition>,
    glossary: HashMap<String, String>,
}

impl NutritionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from data-file rows; rows without a name or id are skipped
    pub fn from_rows(rows: Vec<NutritionRow>) -> Self {
        let mut table = Self::new();
        for row in rows {
            let key = row.key();
            if key.is_empty() {
                continue;
            }
            table.per_100g.insert(key, row.nutrition());
        }
        table
    }

    /// Add or replace one entry
    pub fn insert(&mut self, name: &str, per_100g: Nutrition) {
        let key = normalize_key(name);
        if !key.is_empty() {
            self.per_100g.insert(key, per_100g);
        }
    }

    pub fn add_glossary(&mut self, glossary: &GlossaryFile) {
        for (name, canonical) in glossary.alias_pairs() {
            let key = normalize_key(&name);
            let canonical = normalize_key(&canonical);
            if !key.is_empty() && !canonical.is_empty() {
                self.glossary.insert(key, canonical);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.per_100g.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_100g.is_empty()
    }

    pub fn glossary_len(&self) -> usize {
        self.glossary.len()
    }

    /// Normalized key after glossary canonicalisation
    pub fn canonical_key(&self, name: &str) -> String {
        let key = normalize_key(name);
        self.glossary.get(&key).cloned().unwrap_or(key)
    }

    /// Per-100 g values for an ingredient name
    pub fn lookup(&self, name: &str) -> Option<&Nutrition> {
        self.per_100g.get(&self.canonical_key(name))
    }
}
