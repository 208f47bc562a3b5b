//! Utility to validate and import recipe files
//!
//! Usage: recipe_check [--backup <out.json>] <recipe.yaml>...
//!
//! Prints a JSON report per file and exits non-zero when any file has errors.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use cookbook::config::Config;
use cookbook::models::{
    parse_document, validate_document, Backup, Recipe, RecipeFormat, ValidationIssue,
};
use cookbook::quantity::ConversionTables;

#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    valid: bool,
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    import: Option<ImportSummary>,
}

#[derive(Debug, Serialize)]
struct ImportSummary {
    id: String,
    ingredients: usize,
    missing: Vec<String>,
    estimated: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    files: usize,
    failed: usize,
    reports: Vec<FileReport>,
}

struct Args {
    backup: Option<PathBuf>,
    files: Vec<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut backup = None;
    let mut files = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--backup" => {
                let path = args.next().ok_or("--backup needs an output path")?;
                backup = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                return Err("Usage: recipe_check [--backup <out.json>] <recipe.yaml>...".to_string())
            }
            _ => files.push(PathBuf::from(arg)),
        }
    }
    if files.is_empty() {
        return Err("Usage: recipe_check [--backup <out.json>] <recipe.yaml>...".to_string());
    }
    Ok(Args { backup, files })
}

fn format_for(path: &Path) -> RecipeFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => RecipeFormat::Json,
        Some("yaml") | Some("yml") => RecipeFormat::Yaml,
        _ => RecipeFormat::Auto,
    }
}

fn check_file(path: &Path, tables: &ConversionTables) -> (FileReport, Option<Recipe>) {
    let file = path.display().to_string();
    let failed = |message: String| FileReport {
        file: file.clone(),
        valid: false,
        errors: vec![ValidationIssue {
            field: String::new(),
            message,
        }],
        warnings: Vec::new(),
        import: None,
    };

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => return (failed(format!("Failed to read file: {}", e)), None),
    };
    let doc = match parse_document(&text, format_for(path)) {
        Ok(doc) => doc,
        Err(e) => return (failed(e.to_string()), None),
    };

    let validation = validate_document(&doc);
    let imported = Recipe::import_value(doc, tables);
    let (import, recipe, mut errors) = match imported {
        Ok(report) => (
            Some(ImportSummary {
                id: report.recipe.id.clone(),
                ingredients: report.recipe.ingredients.len(),
                missing: report.missing,
                estimated: report.estimated,
            }),
            Some(report.recipe),
            validation.errors,
        ),
        Err(e) => {
            let mut errors = validation.errors;
            errors.push(ValidationIssue {
                field: String::new(),
                message: e.to_string(),
            });
            (None, None, errors)
        }
    };
    errors.dedup();

    let report = FileReport {
        file,
        valid: errors.is_empty(),
        errors,
        warnings: validation.warnings,
        import,
    };
    (report, recipe)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cookbook=warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(usage) => {
            eprintln!("{}", usage);
            std::process::exit(2);
        }
    };

    let data = Config::from_env().load_data();

    let mut reports = Vec::new();
    let mut recipes = Vec::new();
    for path in &args.files {
        let (report, recipe) = check_file(path, &data.tables);
        reports.push(report);
        recipes.extend(recipe);
    }

    let failed = reports.iter().filter(|r| !r.valid).count();
    let summary = CheckReport {
        files: reports.len(),
        failed,
        reports,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(path) = &args.backup {
        let backup = Backup::new(recipes);
        std::fs::write(path, serde_json::to_string_pretty(&backup)?)?;
        eprintln!("Wrote backup of {} recipe(s) to {}", backup.count, path.display());
    }

    if failed > 0 {
        eprintln!("{} of {} file(s) failed validation", failed, summary.files);
        std::process::exit(1);
    }
    Ok(())
}
