//! Display preferences
//!
//! Which units amounts and temperatures are shown in. Derived once from the
//! region, then overridable per request. Never persisted here.

use serde::{Deserialize, Serialize};

/// Weight unit for precise amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    G,
    Oz,
}

impl WeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::G => "g",
            WeightUnit::Oz => "oz",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "g" | "gram" | "grams" => Some(WeightUnit::G),
            "oz" | "ounce" | "ounces" => Some(WeightUnit::Oz),
            _ => None,
        }
    }
}

/// Volume style for everyday amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeStyle {
    /// ml, or L from one liter up
    Ml,
    /// cups, tablespoons and teaspoons
    Cups,
}

impl VolumeStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeStyle::Ml => "ml",
            VolumeStyle::Cups => "cups",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ml" | "metric" => Some(VolumeStyle::Ml),
            "cups" | "cup" => Some(VolumeStyle::Cups),
            _ => None,
        }
    }
}

/// Temperature scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TempUnit {
    #[serde(alias = "c", alias = "celsius", alias = "Celsius")]
    C,
    #[serde(alias = "f", alias = "fahrenheit", alias = "Fahrenheit")]
    F,
}

impl TempUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TempUnit::C => "C",
            TempUnit::F => "F",
        }
    }

    pub fn long_name(&self) -> &'static str {
        match self {
            TempUnit::C => "Celsius",
            TempUnit::F => "Fahrenheit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "c" | "celsius" => Some(TempUnit::C),
            "f" | "fahrenheit" => Some(TempUnit::F),
            _ => None,
        }
    }
}

/// Unit system override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Use the individual weight and volume preferences, and let liquids show as volumes
    #[default]
    Auto,
    /// Always grams and ml
    Metric,
    /// Always ounces and cups
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Auto => "auto",
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Some(UnitSystem::Auto),
            "metric" => Some(UnitSystem::Metric),
            "imperial" => Some(UnitSystem::Imperial),
            _ => None,
        }
    }
}

/// How amounts are rendered for one user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayPreferences {
    pub weight_unit: WeightUnit,
    pub volume_unit: VolumeStyle,
    pub temp_unit: TempUnit,
    #[serde(default)]
    pub system: UnitSystem,
    /// Render decimals as "2,5" instead of "2.5"
    #[serde(default)]
    pub decimal_comma: bool,
}

impl Default for DisplayPreferences {
    fn default() -> Self {
        Self {
            weight_unit: WeightUnit::G,
            volume_unit: VolumeStyle::Ml,
            temp_unit: TempUnit::C,
            system: UnitSystem::Auto,
            decimal_comma: false,
        }
    }
}

impl DisplayPreferences {
    /// Weight unit after applying the system override
    pub fn effective_weight_unit(&self) -> WeightUnit {
        match self.system {
            UnitSystem::Auto => self.weight_unit,
            UnitSystem::Metric => WeightUnit::G,
            UnitSystem::Imperial => WeightUnit::Oz,
        }
    }

    /// Volume style after applying the system override
    pub fn effective_volume_unit(&self) -> VolumeStyle {
        match self.system {
            UnitSystem::Auto => self.volume_unit,
            UnitSystem::Metric => VolumeStyle::Ml,
            UnitSystem::Imperial => VolumeStyle::Cups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_override() {
        let mut prefs = DisplayPreferences {
            weight_unit: WeightUnit::Oz,
            volume_unit: VolumeStyle::Cups,
            temp_unit: TempUnit::F,
            system: UnitSystem::Auto,
            decimal_comma: false,
        };
        assert_eq!(prefs.effective_weight_unit(), WeightUnit::Oz);
        prefs.system = UnitSystem::Metric;
        assert_eq!(prefs.effective_weight_unit(), WeightUnit::G);
        assert_eq!(prefs.effective_volume_unit(), VolumeStyle::Ml);
    }

    #[test]
    fn test_deserialize_short_form() {
        let prefs: DisplayPreferences = serde_json::from_str(
            r#"{"weight_unit":"oz","volume_unit":"cups","temp_unit":"F"}"#,
        )
        .unwrap();
        assert_eq!(prefs.system, UnitSystem::Auto);
        assert_eq!(prefs.temp_unit, TempUnit::F);
        assert!(!prefs.decimal_comma);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(WeightUnit::from_str("Ounces"), Some(WeightUnit::Oz));
        assert_eq!(VolumeStyle::from_str(" ml "), Some(VolumeStyle::Ml));
        assert_eq!(UnitSystem::from_str("IMPERIAL"), Some(UnitSystem::Imperial));
        assert_eq!(TempUnit::from_str("celsius"), Some(TempUnit::C));
        assert_eq!(UnitSystem::from_str("kelvin"), None);
    }
}
