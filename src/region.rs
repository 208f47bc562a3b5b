//! Region detection
//!
//! Default display preferences depend on where the cook is. The region comes
//! from a [`RegionDetector`] so tests and the `COOKBOOK_REGION` override can
//! substitute a fixed answer.

use serde::Serialize;

use crate::models::{DisplayPreferences, TempUnit, UnitSystem, VolumeStyle, WeightUnit};

/// Locale variables consulted in order
const LOCALE_VARS: &[&str] = &["LC_ALL", "LC_MESSAGES", "LANG"];

/// Regions whose defaults are listed explicitly; any other code gets the EU defaults
const METRIC_REGIONS: &[&str] = &["CA", "GB", "UK", "AU", "NZ", "EU", "DEFAULT"];

/// Regions that write decimals with a point
const DECIMAL_POINT_REGIONS: &[&str] = &["US", "GB", "UK", "AU", "NZ", "CA", "DEFAULT"];

/// Upper-case region code: a two-letter country, "EU" or "DEFAULT"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Region(String);

impl Region {
    pub const DEFAULT: &'static str = "DEFAULT";

    pub fn new(code: &str) -> Self {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            Self::fallback()
        } else {
            Self(code)
        }
    }

    /// Region used when nothing can be detected
    pub fn fallback() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// Region part of a locale tag: "en_US.UTF-8" and "en-US" give "US",
    /// a bare "fr" gives "FR". Tags without a two-letter part give `None`.
    pub fn from_locale_tag(tag: &str) -> Option<Self> {
        let tag = tag.split(['.', '@']).next().unwrap_or_default().to_uppercase();
        let mut parts = tag.split(['-', '_']);
        let first = parts.next().unwrap_or_default();
        let candidate = parts.next().filter(|p| !p.is_empty()).unwrap_or(first);
        (candidate.len() == 2 && candidate.chars().all(|c| c.is_ascii_alphabetic()))
            .then(|| Self(candidate.to_string()))
    }

    pub fn uses_decimal_comma(&self) -> bool {
        !DECIMAL_POINT_REGIONS.contains(&self.code())
    }

    /// Starting preferences for this region
    pub fn default_preferences(&self) -> DisplayPreferences {
        let us = self.code() == "US";
        if !us && !METRIC_REGIONS.contains(&self.code()) {
            tracing::debug!("No defaults for region {}, using EU", self.code());
        }
        DisplayPreferences {
            weight_unit: if us { WeightUnit::Oz } else { WeightUnit::G },
            volume_unit: if us { VolumeStyle::Cups } else { VolumeStyle::Ml },
            temp_unit: if us { TempUnit::F } else { TempUnit::C },
            system: UnitSystem::Auto,
            decimal_comma: self.uses_decimal_comma(),
        }
    }
}

/// Capability for finding the user's region
pub trait RegionDetector {
    fn detect(&self) -> Region;
}

/// Reads `LC_ALL`, `LC_MESSAGES` and `LANG`, then falls back to a `TZ` of
/// `Europe/...` for "EU".
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvRegionDetector;

impl RegionDetector for EnvRegionDetector {
    fn detect(&self) -> Region {
        detect_with(|key| std::env::var(key).ok())
    }
}

/// Always answers the same region
#[derive(Debug, Clone)]
pub struct FixedRegion(pub Region);

impl RegionDetector for FixedRegion {
    fn detect(&self) -> Region {
        self.0.clone()
    }
}

/// Detection over an arbitrary variable lookup
fn detect_with<F>(lookup: F) -> Region
where
    F: Fn(&str) -> Option<String>,
{
    let from_locale = LOCALE_VARS
        .iter()
        .filter_map(|key| lookup(key))
        .find_map(|tag| Region::from_locale_tag(&tag));
    if let Some(region) = from_locale {
        return region;
    }

    let europe = lookup("TZ").is_some_and(|tz| {
        tz.trim_start_matches(':')
            .to_lowercase()
            .starts_with("europe/")
    });
    if europe {
        Region::new("EU")
    } else {
        Region::fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_locale_tags() {
        assert_eq!(Region::from_locale_tag("en_US.UTF-8"), Some(Region::new("US")));
        assert_eq!(Region::from_locale_tag("de-DE"), Some(Region::new("DE")));
        assert_eq!(Region::from_locale_tag("fr"), Some(Region::new("FR")));
        assert_eq!(Region::from_locale_tag("C.UTF-8"), None);
        assert_eq!(Region::from_locale_tag("POSIX"), None);
        assert_eq!(Region::from_locale_tag(""), None);
    }

    #[test]
    fn test_detection_order() {
        let r = detect_with(env(&[("LC_ALL", "C"), ("LANG", "en_GB.UTF-8")]));
        assert_eq!(r.code(), "GB");
        let r = detect_with(env(&[("LANG", "C.UTF-8"), ("TZ", "Europe/Berlin")]));
        assert_eq!(r.code(), "EU");
        let r = detect_with(env(&[("TZ", "America/Chicago")]));
        assert_eq!(r.code(), "DEFAULT");
    }

    #[test]
    fn test_region_defaults() {
        let us = Region::new("us").default_preferences();
        assert_eq!(us.weight_unit, WeightUnit::Oz);
        assert_eq!(us.volume_unit, VolumeStyle::Cups);
        assert_eq!(us.temp_unit, TempUnit::F);
        assert!(!us.decimal_comma);

        let gb = Region::new("GB").default_preferences();
        assert_eq!(gb.weight_unit, WeightUnit::G);
        assert!(!gb.decimal_comma);

        let de = FixedRegion(Region::new("DE")).detect().default_preferences();
        assert_eq!(de.volume_unit, VolumeStyle::Ml);
        assert_eq!(de.temp_unit, TempUnit::C);
        assert!(de.decimal_comma);

        assert_eq!(Region::new(" ").code(), Region::DEFAULT);
    }
}
