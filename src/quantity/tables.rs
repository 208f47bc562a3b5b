//! Conversion tables
//!
//! Density, whole-unit weights, packaged sizes, display preferences and
//! aliases. The tables are built once, optionally overlaid from a data file,
//! and then shared read-only by the estimator and the formatter.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::units::{count_noun_key, SizeHint, VolumeUnit, DEFAULT_GRAMS_PER_CUP};

/// Packaged weights within this many grams of a raw conversion snap to it
pub const PACKAGE_SNAP_TOLERANCE_G: f64 = 5.0;

/// Per-item gram weights for a countable ingredient, by size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WholeUnitWeights {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xl: Option<f64>,
    pub default: f64,
    /// Display plural; "<key>s" when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,
}

impl WholeUnitWeights {
    fn sized(small: Option<f64>, medium: f64, large: Option<f64>, default: f64) -> Self {
        Self {
            small,
            medium: Some(medium),
            large,
            xl: None,
            default,
            plural: None,
        }
    }

    fn with_plural(mut self, plural: &str) -> Self {
        self.plural = Some(plural.to_string());
        self
    }

    fn with_xl(mut self, xl: f64) -> Self {
        self.xl = Some(xl);
        self
    }

    /// Grams for one item of the given size. No size, or a size the row
    /// does not list, gives the default weight, which is also the weight
    /// the formatter counts in.
    pub fn grams_for(&self, size: Option<SizeHint>) -> f64 {
        let sized = match size {
            Some(SizeHint::Small) => self.small,
            Some(SizeHint::Medium) => self.medium,
            Some(SizeHint::Large) => self.large,
            Some(SizeHint::Xl) => self.xl,
            None => None,
        };
        sized.unwrap_or(self.default)
    }
}

/// Preferred small-volume unit for an ingredient (salt in teaspoons)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayPref {
    pub unit: VolumeUnit,
    pub grams_per_unit: f64,
}

/// Partial tables read from a data file; entries replace or extend built-ins
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TablesOverlay {
    pub density_per_cup: HashMap<String, f64>,
    pub whole_unit_weights: HashMap<String, WholeUnitWeights>,
    pub packaged_unit_weights: BTreeMap<String, f64>,
    pub display_prefs: HashMap<String, DisplayPref>,
    pub aliases: HashMap<String, String>,
    pub volume_preferred: Vec<String>,
}

/// Lookup tables shared by the estimator and the formatter
#[derive(Debug, Clone, Serialize)]
pub struct ConversionTables {
    pub density_per_cup: HashMap<String, f64>,
    pub whole_unit_weights: HashMap<String, WholeUnitWeights>,
    pub packaged_unit_weights: BTreeMap<String, f64>,
    pub display_prefs: HashMap<String, DisplayPref>,
    pub aliases: HashMap<String, String>,
    pub volume_preferred: HashSet<String>,
}

/// Substring tokens that identify a whole-unit key, checked in order.
/// "garlic" comes first so "garlic clove" never resolves to "clove" spices.
const WHOLE_UNIT_TOKENS: &[(&str, &[&str])] = &[
    ("garlic clove", &["garlic clove", "garlic"]),
    ("onion", &["onion"]),
    ("carrot", &["carrot"]),
    ("egg", &["egg"]),
    ("banana", &["banana"]),
    ("apple", &["apple"]),
    ("tomato", &["tomato"]),
    ("bell pepper", &["bell pepper", "pepper"]),
    ("potato", &["potato"]),
    ("lime", &["lime"]),
    ("lemon", &["lemon"]),
    ("orange", &["orange"]),
];

/// Words that mark a processed form of a countable food ("lemon juice",
/// "tomato paste"); such ingredients are never shown as a count.
const PROCESSED_FORMS: &[&str] = &[
    "juice", "zest", "paste", "sauce", "powder", "puree", "purée", "canned", "diced", "crushed",
    "dried", "extract", "broth", "stock", "jam", "chips", "flakes", "ketchup", "oil", "milk",
    "vinegar", "flour", "sugar", "syrup", "salt", "whites", "yolks",
];

/// Last words that mark a pourable ingredient
const VOLUME_KEYWORDS: &[&str] = &["broth", "stock", "juice", "vinegar", "oil", "milk", "water"];

impl Default for ConversionTables {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ConversionTables {
    /// Tables with no rows at all, for tests that build fixtures by hand
    pub fn empty() -> Self {
        Self {
            density_per_cup: HashMap::new(),
            whole_unit_weights: HashMap::new(),
            packaged_unit_weights: BTreeMap::new(),
            display_prefs: HashMap::new(),
            aliases: HashMap::new(),
            volume_preferred: HashSet::new(),
        }
    }

    /// Built-in kitchen data
    pub fn builtin() -> Self {
        let mut t = Self::empty();

        for (name, grams) in [
            ("all-purpose flour", 120.0),
            ("whole wheat flour", 120.0),
            ("bread flour", 127.0),
            ("cake flour", 114.0),
            ("almond flour", 96.0),
            ("brown sugar", 200.0),
            ("granulated sugar", 200.0),
            ("powdered sugar", 120.0),
            ("greek yogurt", 245.0),
            ("butter", 227.0),
            ("milk", 245.0),
            ("heavy cream", 238.0),
            ("sour cream", 242.0),
            ("water", 240.0),
            ("oil (neutral)", 218.0),
            ("vegetable oil", 218.0),
            ("coconut oil", 218.0),
            ("olive oil", 218.0),
            ("honey", 340.0),
            ("maple syrup", 320.0),
            ("coconut milk", 226.0),
            ("coconut milk (canned)", 226.0),
            ("diced tomatoes", 240.0),
            ("tomatoes", 240.0),
            ("broth", 240.0),
            ("stock", 240.0),
            ("lentils", 192.0),
            ("red lentils", 192.0),
            ("rolled oats", 80.0),
            ("cocoa powder", 86.0),
            ("peanut butter", 258.0),
            ("rice", 185.0),
        ] {
            t.density_per_cup.insert(name.to_string(), grams);
        }

        let whole = [
            ("egg", WholeUnitWeights::sized(Some(43.0), 50.0, Some(57.0), 57.0).with_xl(64.0)),
            ("banana", WholeUnitWeights::sized(Some(101.0), 118.0, Some(136.0), 118.0)),
            ("apple", WholeUnitWeights::sized(Some(149.0), 182.0, Some(223.0), 182.0)),
            ("onion", WholeUnitWeights::sized(Some(70.0), 150.0, Some(200.0), 150.0)),
            ("carrot", WholeUnitWeights::sized(Some(60.0), 120.0, Some(180.0), 120.0)),
            (
                "garlic clove",
                WholeUnitWeights::sized(Some(3.0), 5.0, Some(7.0), 5.0).with_plural("garlic cloves"),
            ),
            (
                "tomato",
                WholeUnitWeights::sized(Some(100.0), 150.0, Some(250.0), 150.0).with_plural("tomatoes"),
            ),
            ("bell pepper", WholeUnitWeights::sized(Some(119.0), 149.0, Some(186.0), 149.0)),
            (
                "potato",
                WholeUnitWeights::sized(Some(150.0), 300.0, Some(400.0), 300.0).with_plural("potatoes"),
            ),
            ("lime", WholeUnitWeights::sized(None, 52.0, None, 52.0)),
            ("lemon", WholeUnitWeights::sized(None, 84.0, None, 84.0)),
            ("orange", WholeUnitWeights::sized(None, 184.0, None, 184.0)),
        ];
        for (key, weights) in whole {
            t.whole_unit_weights.insert(key.to_string(), weights);
        }

        for (id, grams) in [("can_14_5_oz", 411.0), ("can_15_oz", 425.0), ("can_13_5_oz", 383.0)] {
            t.packaged_unit_weights.insert(id.to_string(), grams);
        }

        for (name, unit, grams_per_unit) in [
            ("salt", VolumeUnit::Tsp, 6.0),
            ("sea salt", VolumeUnit::Tsp, 6.0),
            ("baking soda", VolumeUnit::Tsp, 5.0),
            ("baking powder", VolumeUnit::Tsp, 5.0),
            ("vanilla extract", VolumeUnit::Tsp, 5.0),
            ("almond extract", VolumeUnit::Tsp, 5.0),
            ("lemon juice", VolumeUnit::Tbsp, 15.0),
            ("lime juice", VolumeUnit::Tbsp, 15.0),
            ("orange juice", VolumeUnit::Tbsp, 15.0),
            ("soy sauce", VolumeUnit::Tbsp, 18.0),
            ("vinegar", VolumeUnit::Tbsp, 15.0),
            ("honey", VolumeUnit::Tbsp, 21.0),
            ("maple syrup", VolumeUnit::Tbsp, 20.0),
            ("molasses", VolumeUnit::Tbsp, 20.0),
            ("peanut butter", VolumeUnit::Tbsp, 16.0),
            ("tahini", VolumeUnit::Tbsp, 15.0),
            ("cinnamon", VolumeUnit::Tsp, 2.6),
            ("nutmeg", VolumeUnit::Tsp, 2.2),
            ("ginger", VolumeUnit::Tsp, 2.0),
            ("cayenne", VolumeUnit::Tsp, 2.0),
            ("paprika", VolumeUnit::Tsp, 2.0),
            ("black pepper", VolumeUnit::Tsp, 2.0),
            ("pepper", VolumeUnit::Tsp, 2.0),
        ] {
            t.display_prefs.insert(name.to_string(), DisplayPref { unit, grams_per_unit });
        }

        for (alias, canonical) in [
            ("flour", "all-purpose flour"),
            ("plain flour", "all-purpose flour"),
            ("ap flour", "all-purpose flour"),
            ("sugar", "granulated sugar"),
            ("white sugar", "granulated sugar"),
            ("caster sugar", "granulated sugar"),
            ("icing sugar", "powdered sugar"),
            ("kosher salt", "salt"),
            ("table salt", "salt"),
            ("extra virgin olive oil", "olive oil"),
            ("evoo", "olive oil"),
            ("canola oil", "vegetable oil"),
            ("neutral oil", "oil (neutral)"),
            ("unsalted butter", "butter"),
            ("salted butter", "butter"),
            ("greek yoghurt", "greek yogurt"),
            ("canned coconut milk", "coconut milk (canned)"),
            ("chicken broth", "broth"),
            ("vegetable broth", "broth"),
            ("chicken stock", "stock"),
            ("vegetable stock", "stock"),
            ("tamari", "soy sauce"),
            ("vanilla", "vanilla extract"),
            ("pure vanilla extract", "vanilla extract"),
            ("bicarbonate of soda", "baking soda"),
            ("ground cinnamon", "cinnamon"),
            ("ground nutmeg", "nutmeg"),
            ("ground ginger", "ginger"),
            ("smoked paprika", "paprika"),
            ("cayenne pepper", "cayenne"),
            ("ground black pepper", "black pepper"),
            ("freshly ground black pepper", "black pepper"),
            ("garlic", "garlic clove"),
            ("garlic cloves", "garlic clove"),
            ("cloves garlic", "garlic clove"),
            ("eggs", "egg"),
            ("large egg", "egg"),
            ("large eggs", "egg"),
            ("ripe banana", "banana"),
            ("ripe bananas", "banana"),
            ("bananas", "banana"),
        ] {
            t.aliases.insert(alias.to_string(), canonical.to_string());
        }

        for name in [
            "water",
            "milk",
            "olive oil",
            "vegetable oil",
            "oil (neutral)",
            "broth",
            "stock",
            "lemon juice",
            "lime juice",
            "orange juice",
            "vinegar",
            "soy sauce",
            "coconut milk",
            "coconut milk (canned)",
        ] {
            t.volume_preferred.insert(name.to_string());
        }

        t
    }

    /// Replace or extend rows from an overlay. Keys are lowercased.
    pub fn apply(&mut self, overlay: TablesOverlay) {
        for (k, v) in overlay.density_per_cup {
            self.density_per_cup.insert(k.to_lowercase(), v);
        }
        for (k, v) in overlay.whole_unit_weights {
            self.whole_unit_weights.insert(k.to_lowercase(), v);
        }
        self.packaged_unit_weights.extend(overlay.packaged_unit_weights);
        for (k, v) in overlay.display_prefs {
            self.display_prefs.insert(k.to_lowercase(), v);
        }
        self.add_aliases(overlay.aliases);
        self.volume_preferred
            .extend(overlay.volume_preferred.into_iter().map(|n| n.to_lowercase()));
    }

    /// Register name variations that map to a canonical ingredient name
    pub fn add_aliases<I>(&mut self, aliases: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (alias, canonical) in aliases {
            let alias = alias.trim().to_lowercase();
            let canonical = canonical.trim().to_lowercase();
            if !alias.is_empty() && !canonical.is_empty() && alias != canonical {
                self.aliases.insert(alias, canonical);
            }
        }
    }

    /// Lowercase name resolved through the alias map
    pub fn canonical_name(&self, name: &str) -> String {
        let lower = name.trim().to_lowercase();
        match self.aliases.get(&lower) {
            Some(canonical) => canonical.clone(),
            None => lower,
        }
    }

    /// Grams per cup for an ingredient, if any row matches.
    ///
    /// Tries the exact name, then its alias, then a table key contained in
    /// the name ("sifted all-purpose flour").
    pub fn density_for(&self, name: &str) -> Option<f64> {
        let lower = name.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }
        if let Some(&d) = self.density_per_cup.get(&lower) {
            return Some(d);
        }
        if let Some(&d) = self.density_per_cup.get(&self.canonical_name(&lower)) {
            return Some(d);
        }
        // Prefer the key that ends the name ("rice milk" is milk), then the
        // longest, then the alphabetically first so hash order never decides.
        self.density_per_cup
            .iter()
            .filter(|(key, _)| lower.contains(key.as_str()))
            .max_by(|(a, _), (b, _)| {
                lower
                    .ends_with(a.as_str())
                    .cmp(&lower.ends_with(b.as_str()))
                    .then_with(|| a.len().cmp(&b.len()))
                    .then_with(|| b.cmp(a))
            })
            .map(|(_, &d)| d)
    }

    /// Grams per cup, defaulting to water-like density for unlisted ingredients
    pub fn grams_per_cup(&self, name: &str) -> f64 {
        self.density_for(name).unwrap_or_else(|| {
            tracing::debug!("No density for '{}', assuming {} g/cup", name, DEFAULT_GRAMS_PER_CUP);
            DEFAULT_GRAMS_PER_CUP
        })
    }

    /// Display preference for the exact name or its alias
    pub fn display_pref(&self, name: &str) -> Option<DisplayPref> {
        let lower = name.trim().to_lowercase();
        self.display_prefs
            .get(&lower)
            .or_else(|| self.display_prefs.get(&self.canonical_name(&lower)))
            .copied()
    }

    pub fn whole_unit(&self, key: &str) -> Option<&WholeUnitWeights> {
        self.whole_unit_weights.get(key)
    }

    /// Resolve a whole-unit key by substring match over the quantity text and
    /// the ingredient name together. Used while estimating grams.
    pub fn resolve_whole_unit_key(&self, quantity_text: &str, name: &str) -> Option<String> {
        let haystack = format!("{} {}", quantity_text, name).to_lowercase();
        let builtin = WHOLE_UNIT_TOKENS
            .iter()
            .find(|(_, tokens)| tokens.iter().any(|tok| mentions(&haystack, tok)))
            .map(|(key, _)| key.to_string());
        let resolved = builtin.or_else(|| {
            let mut extra: Vec<&String> = self
                .whole_unit_weights
                .keys()
                .filter(|key| mentions(&haystack, key))
                .collect();
            extra.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
            extra.first().map(|key| key.to_string())
        });
        resolved.filter(|key| self.whole_unit_weights.contains_key(key))
    }

    /// Whole-unit key for redisplaying an ingredient as a count, or `None`
    /// when the ingredient should be shown by weight or volume.
    ///
    /// Stricter than [`Self::resolve_whole_unit_key`]: the name, its alias or
    /// its last word must be the countable noun, and processed forms and
    /// ingredients with a display preference are excluded.
    pub fn whole_unit_display_key(&self, name: &str) -> Option<String> {
        let lower = name.trim().to_lowercase();
        if lower.is_empty() || self.display_pref(&lower).is_some() {
            return None;
        }
        if lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| PROCESSED_FORMS.contains(&word))
        {
            return None;
        }

        let canonical = self.canonical_name(&lower);
        if self.whole_unit_weights.contains_key(&canonical) {
            return Some(canonical);
        }

        let last = lower.split_whitespace().last()?;
        let key = count_noun_key(last)?;
        if key == "bell pepper" && !lower.contains("bell") {
            return None;
        }
        self.whole_unit_weights
            .contains_key(key)
            .then(|| key.to_string())
    }

    /// Display plural for a whole-unit key
    pub fn whole_unit_plural(&self, key: &str) -> String {
        self.whole_unit_weights
            .get(key)
            .and_then(|w| w.plural.clone())
            .unwrap_or_else(|| format!("{}s", key))
    }

    /// Whether the ingredient reads better as a volume (liquids, oils, broths)
    pub fn is_volume_preferred(&self, name: &str) -> bool {
        let lower = name.trim().to_lowercase();
        if self.volume_preferred.contains(&lower)
            || self.volume_preferred.contains(&self.canonical_name(&lower))
        {
            return true;
        }
        lower.contains("soy sauce")
            || lower
                .split_whitespace()
                .last()
                .is_some_and(|word| VOLUME_KEYWORDS.contains(&word))
    }

    /// Snap a raw gram weight to the nearest packaged size within tolerance
    pub fn snap_to_package(&self, grams: f64) -> f64 {
        self.packaged_unit_weights
            .values()
            .map(|&pkg| (pkg, (pkg - grams).abs()))
            .filter(|&(_, diff)| diff <= PACKAGE_SNAP_TOLERANCE_G)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(grams, |(pkg, _)| pkg)
    }
}

/// Whether `token` appears in `haystack` as a whole word, allowing a plural
/// "s"/"es" suffix ("eggs" mentions egg, "eggplant" does not).
fn mentions(haystack: &str, token: &str) -> bool {
    haystack.match_indices(token).any(|(start, _)| {
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphabetic());
        let after = &haystack[start + token.len()..];
        let after = after
            .strip_prefix("es")
            .or_else(|| after.strip_prefix('s'))
            .filter(|rest| !rest.starts_with(char::is_alphabetic))
            .unwrap_or(after);
        before_ok && !after.starts_with(char::is_alphabetic)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_lookup() {
        let t = ConversionTables::builtin();
        assert_eq!(t.density_for("All-Purpose Flour"), Some(120.0));
        assert_eq!(t.density_for("flour"), Some(120.0));
        assert_eq!(t.density_for("sifted bread flour"), Some(127.0));
        assert_eq!(t.density_for("saffron"), None);
        assert_eq!(t.grams_per_cup("saffron"), DEFAULT_GRAMS_PER_CUP);
    }

    #[test]
    fn test_density_lookup_prefers_head_noun() {
        for _ in 0..32 {
            let t = ConversionTables::builtin();
            assert_eq!(t.density_for("rice milk"), Some(245.0));
            assert_eq!(t.density_for("milk rice"), Some(185.0));
        }
    }

    #[test]
    fn test_density_lookup_equal_keys_is_stable() {
        let mut t = ConversionTables::empty();
        t.density_per_cup.insert("oat".into(), 90.0);
        t.density_per_cup.insert("nut".into(), 120.0);
        // neither key ends the name and both are three letters
        assert_eq!(t.density_for("nut and oat bar"), Some(120.0));
    }

    #[test]
    fn test_overlay_whole_units_resolve_stably() {
        let mut t = ConversionTables::empty();
        let plum = WholeUnitWeights::sized(None, 66.0, None, 66.0);
        let kiwi = WholeUnitWeights::sized(None, 75.0, None, 75.0);
        t.whole_unit_weights.insert("plum".into(), plum);
        t.whole_unit_weights.insert("kiwi".into(), kiwi);
        for _ in 0..16 {
            assert_eq!(t.resolve_whole_unit_key("2", "plum and kiwi").as_deref(), Some("kiwi"));
        }
    }

    #[test]
    fn test_whole_unit_weights_by_size() {
        let t = ConversionTables::builtin();
        let egg = t.whole_unit("egg").unwrap();
        assert_eq!(egg.grams_for(Some(SizeHint::Large)), 57.0);
        assert_eq!(egg.grams_for(Some(SizeHint::Xl)), 64.0);
        assert_eq!(egg.grams_for(Some(SizeHint::Medium)), 50.0);
        assert_eq!(egg.grams_for(None), 57.0);
        let lime = t.whole_unit("lime").unwrap();
        assert_eq!(lime.grams_for(Some(SizeHint::Large)), 52.0);
    }

    #[test]
    fn test_resolve_whole_unit_key() {
        let t = ConversionTables::builtin();
        assert_eq!(t.resolve_whole_unit_key("3 cloves", "garlic").as_deref(), Some("garlic clove"));
        assert_eq!(t.resolve_whole_unit_key("2 large", "eggs").as_deref(), Some("egg"));
        assert_eq!(t.resolve_whole_unit_key("1 cup", "flour"), None);
        assert_eq!(t.resolve_whole_unit_key("2", "eggplants"), None);
        assert_eq!(t.resolve_whole_unit_key("3", "tomatoes").as_deref(), Some("tomato"));
    }

    #[test]
    fn test_whole_unit_display_key() {
        let t = ConversionTables::builtin();
        assert_eq!(t.whole_unit_display_key("ripe banana").as_deref(), Some("banana"));
        assert_eq!(t.whole_unit_display_key("large eggs").as_deref(), Some("egg"));
        assert_eq!(t.whole_unit_display_key("garlic").as_deref(), Some("garlic clove"));
        assert_eq!(t.whole_unit_display_key("red bell pepper").as_deref(), Some("bell pepper"));
        assert_eq!(t.whole_unit_display_key("black pepper"), None);
        assert_eq!(t.whole_unit_display_key("lemon juice"), None);
        assert_eq!(t.whole_unit_display_key("diced tomatoes"), None);
        assert_eq!(t.whole_unit_display_key("all-purpose flour"), None);
    }

    #[test]
    fn test_volume_preferred() {
        let t = ConversionTables::builtin();
        assert!(t.is_volume_preferred("olive oil"));
        assert!(t.is_volume_preferred("chicken broth"));
        assert!(t.is_volume_preferred("apple cider vinegar"));
        assert!(t.is_volume_preferred("low sodium soy sauce"));
        assert!(!t.is_volume_preferred("butter"));
    }

    #[test]
    fn test_snap_to_package() {
        let t = ConversionTables::builtin();
        assert_eq!(t.snap_to_package(411.0), 411.0);
        assert_eq!(t.snap_to_package(423.0), 425.0);
        assert_eq!(t.snap_to_package(386.0), 383.0);
        assert_eq!(t.snap_to_package(300.0), 300.0);
    }

    #[test]
    fn test_overlay_and_aliases() {
        let mut t = ConversionTables::empty();
        let overlay: TablesOverlay = serde_yaml::from_str(
            "density_per_cup:\n  Spelt Flour: 110\naliases:\n  spelt: spelt flour\nvolume_preferred: [Kombucha]\n",
        )
        .unwrap();
        t.apply(overlay);
        assert_eq!(t.density_for("spelt"), Some(110.0));
        assert!(t.is_volume_preferred("kombucha"));
        assert_eq!(t.canonical_name("Spelt"), "spelt flour");
    }
}
