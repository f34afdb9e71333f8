//! Configuration validation command
//!
//! Loads each file through the full pipeline and reports the outcome.

use std::path::Path;

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLoader, LoadResult};
use crate::error::{ConfigError, ManhuntError, Severity, ValidationIssue};

#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

/// Validate configuration files without running a match.
///
/// Every file is checked and reported; the first failure is returned.
///
/// # Errors
///
/// Returns the first configuration or I/O error encountered, or a
/// validation error when `--strict` is set and a file has warnings.
pub fn run(args: &ValidateArgs) -> Result<(), ManhuntError> {
    let loader = ConfigLoader::default();
    let mut first_error: Option<ManhuntError> = None;
    let mut reports = Vec::with_capacity(args.files.len());

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating configuration");
        let outcome = check(&loader, path, args.strict);
        let report = report_for(path, &outcome);

        if args.format == OutputFormat::Human {
            print_human(&report);
        }
        reports.push(report);

        if let Err(e) = outcome {
            first_error.get_or_insert(e);
        } else {
            tracing::info!(file = %path.display(), "configuration valid");
        }
    }

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    first_error.map_or(Ok(()), Err)
}

fn check(loader: &ConfigLoader, path: &Path, strict: bool) -> Result<LoadResult, ManhuntError> {
    let result = loader.load(path)?;
    for warning in &result.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }

    if strict && !result.warnings.is_empty() {
        let errors = result
            .warnings
            .iter()
            .map(|w| ValidationIssue {
                path: w.location.clone().unwrap_or_default(),
                message: w.message.clone(),
                severity: Severity::Warning,
            })
            .collect();
        return Err(ConfigError::ValidationError {
            path: path.display().to_string(),
            errors,
        }
        .into());
    }
    Ok(result)
}

fn report_for(path: &Path, outcome: &Result<LoadResult, ManhuntError>) -> FileReport {
    let file = path.display().to_string();
    match outcome {
        Ok(result) => FileReport {
            file,
            valid: true,
            errors: Vec::new(),
            warnings: result
                .warnings
                .iter()
                .map(|w| match &w.location {
                    Some(loc) => format!("{} at {loc}", w.message),
                    None => w.message.clone(),
                })
                .collect(),
        },
        Err(ManhuntError::Config(ConfigError::ValidationError { errors, .. })) => FileReport {
            file,
            valid: false,
            errors: errors.iter().map(ToString::to_string).collect(),
            warnings: Vec::new(),
        },
        Err(e) => FileReport {
            file,
            valid: false,
            errors: vec![e.to_string()],
            warnings: Vec::new(),
        },
    }
}

fn print_human(report: &FileReport) {
    if report.valid {
        println!("{}: ok", report.file);
    } else {
        println!("{}: invalid", report.file);
    }
    for error in &report.errors {
        println!("  {error}");
    }
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn yaml(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn valid_file_passes() {
        let file = yaml("players:\n  min-players: 3\n");
        let args = ValidateArgs {
            files: vec![file.path().to_path_buf()],
            format: OutputFormat::Json,
            strict: false,
        };
        assert!(run(&args).is_ok());
    }

    #[test]
    fn strict_turns_warnings_into_errors() {
        let file = yaml("victory:\n  triggers: []\n");
        let lenient = ValidateArgs {
            files: vec![file.path().to_path_buf()],
            format: OutputFormat::Json,
            strict: false,
        };
        assert!(run(&lenient).is_ok());

        let strict = ValidateArgs {
            strict: true,
            ..lenient
        };
        let err = run(&strict).unwrap_err();
        assert!(matches!(
            err,
            ManhuntError::Config(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn reports_every_file_and_returns_first_error() {
        let good = yaml("");
        let bad = yaml("players:\n  min-players: 1\n");
        let args = ValidateArgs {
            files: vec![
                good.path().to_path_buf(),
                bad.path().to_path_buf(),
                "/nonexistent/match.yaml".into(),
            ],
            format: OutputFormat::Human,
            strict: false,
        };
        let err = run(&args).unwrap_err();
        assert!(matches!(
            err,
            ManhuntError::Config(ConfigError::ValidationError { .. })
        ));
    }
}
