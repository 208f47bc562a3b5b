//! Ingredient quantity engine
//!
//! Free-text amounts go in, canonical grams come out, and grams go back out
//! as something a cook can measure. Every function here is pure and never
//! fails; "no quantity" is `None` or 0.

pub mod estimator;
pub mod formatter;
pub mod parser;
pub mod scaler;
pub mod tables;
pub mod temperature;
pub mod text;
pub mod units;

pub use estimator::{estimate, estimate_grams, Estimate};
pub use formatter::{format_quantity, to_quarter_fraction};
pub use parser::{parse_magnitude, parse_quantity_unit, ParsedQuantity};
pub use scaler::{adjust_servings, scale, Servings};
pub use tables::{ConversionTables, TablesOverlay};
pub use temperature::convert_temperature_in_text;
pub use text::{
    clean_line, decode_entities, fractions_to_ascii, normalize_key, normalize_whitespace, slugify,
    strip_leading_quantity,
};
pub use units::{MassUnit, Unit, VolumeUnit};
