//! Configuration
//!
//! Environment-driven settings and the optional data files that extend the
//! built-in tables. Data files never block startup: a missing file falls back
//! to the built-ins, a malformed one is logged and skipped.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::nutrition::{GlossaryFile, NutritionRow, NutritionTable};
use crate::quantity::tables::{ConversionTables, TablesOverlay};
use crate::region::{EnvRegionDetector, FixedRegion, Region, RegionDetector};

/// Directory of data files
pub const DATA_DIR_VAR: &str = "COOKBOOK_DATA_DIR";
/// Region code overriding detection
pub const REGION_VAR: &str = "COOKBOOK_REGION";

pub const TABLES_FILE: &str = "conversion-tables.yaml";
pub const GLOSSARY_FILE: &str = "ingredients-glossary.yaml";
pub const NUTRITION_FILE: &str = "nutrition.yaml";

/// Data file error types
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Result type for data file operations
pub type DataResult<T> = Result<T, DataError>;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub region_override: Option<String>,
}

/// How one data file was handled
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "detail")]
pub enum SourceStatus {
    Loaded,
    Missing,
    Invalid(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct DataSource {
    pub file: String,
    #[serde(flatten)]
    pub status: SourceStatus,
}

/// Tables ready for serving
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub tables: ConversionTables,
    pub nutrition: NutritionTable,
    pub sources: Vec<DataSource>,
}

impl Config {
    /// Read configuration from the environment
    pub fn from_env() -> Self {
        let data_dir = std::env::var(DATA_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());
        let region_override = std::env::var(REGION_VAR)
            .ok()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        Self {
            data_dir,
            region_override,
        }
    }

    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            region_override: None,
        }
    }

    /// Region source: the override when set, otherwise the environment
    pub fn region_detector(&self) -> Box<dyn RegionDetector + Send + Sync> {
        match &self.region_override {
            Some(code) => Box::new(FixedRegion(Region::new(code))),
            None => Box::new(EnvRegionDetector),
        }
    }

    /// Built-in tables extended by whatever data files are present
    pub fn load_data(&self) -> LoadedData {
        let mut sources = Vec::new();
        let mut tables = ConversionTables::builtin();

        if let Some(overlay) = self.load_optional::<TablesOverlay>(TABLES_FILE, &mut sources) {
            tables.apply(overlay);
        }

        let glossary = self
            .load_optional::<GlossaryFile>(GLOSSARY_FILE, &mut sources)
            .unwrap_or_default();
        tables.add_aliases(glossary.alias_pairs());

        let mut nutrition = self
            .load_optional::<Vec<NutritionRow>>(NUTRITION_FILE, &mut sources)
            .map(NutritionTable::from_rows)
            .unwrap_or_default();
        nutrition.add_glossary(&glossary);

        tracing::info!(
            "Loaded {} densities, {} aliases, {} nutrition entries from {}",
            tables.density_per_cup.len(),
            tables.aliases.len(),
            nutrition.len(),
            self.data_dir.display()
        );

        LoadedData {
            tables,
            nutrition,
            sources,
        }
    }

    fn load_optional<T: DeserializeOwned>(
        &self,
        file: &str,
        sources: &mut Vec<DataSource>,
    ) -> Option<T> {
        let path = self.data_dir.join(file);
        let (value, status) = match read_yaml::<T>(&path) {
            Ok(Some(value)) => (Some(value), SourceStatus::Loaded),
            Ok(None) => {
                tracing::debug!("No {} in {}, using built-ins", file, self.data_dir.display());
                (None, SourceStatus::Missing)
            }
            Err(e) => {
                tracing::warn!("Skipping data file: {}", e);
                (None, SourceStatus::Invalid(e.to_string()))
            }
        };
        sources.push(DataSource {
            file: file.to_string(),
            status,
        });
        value
    }
}

/// Read a YAML file; a file that does not exist is `Ok(None)`
pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> DataResult<Option<T>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(DataError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_yaml::from_str(&text)
        .map(Some)
        .map_err(|source| DataError::Yaml {
            path: path.to_path_buf(),
            source,
        })
}

/// `<project root>/data`, found from the executable location
fn default_data_dir() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }

    path.push("data");
    path
}
