//! `validate` command: check configuration files without running a reveal.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLoader, LoaderOptions};
use crate::error::{ConfigError, FlashRevealError, ValidationIssue};

/// Outcome for one file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    /// File checked.
    pub file: String,
    /// Whether the file passes (warnings count against it in strict mode).
    pub valid: bool,
    /// Errors, including load failures.
    pub errors: Vec<String>,
    /// Non-fatal findings.
    pub warnings: Vec<String>,
}

/// Validate every file, print a report, and fail if any file was rejected.
///
/// Environment overrides are ignored so the files are checked as written.
///
/// # Errors
///
/// Returns [`ConfigError::FilesRejected`] if at least one file fails.
pub fn run(args: &ValidateArgs) -> Result<(), FlashRevealError> {
    let loader = ConfigLoader::new(LoaderOptions {
        ignore_env: true,
        ..LoaderOptions::default()
    });

    let reports: Vec<FileReport> = args
        .files
        .iter()
        .map(|path| check_file(&loader, path, args.strict))
        .collect();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_reports(&mut out, &reports, args.format)?;

    let failed = reports.iter().filter(|r| !r.valid).count();
    if failed > 0 {
        return Err(ConfigError::FilesRejected {
            failed,
            total: reports.len(),
        }
        .into());
    }
    Ok(())
}

/// Loads and validates one file.
#[must_use]
pub fn check_file(loader: &ConfigLoader, path: &Path, strict: bool) -> FileReport {
    let file = path.display().to_string();
    tracing::info!(file = %file, "validating configuration");

    match loader.load(path) {
        Ok(loaded) => {
            let warnings = render_issues(&loaded.warnings);
            FileReport {
                valid: !(strict && !warnings.is_empty()),
                file,
                errors: Vec::new(),
                warnings,
            }
        }
        Err(ConfigError::ValidationError { errors, .. }) => FileReport {
            file,
            valid: false,
            errors: render_issues(&errors),
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

fn render_issues(issues: &[ValidationIssue]) -> Vec<String> {
    issues.iter().map(ToString::to_string).collect()
}

fn write_reports(
    out: &mut impl Write,
    reports: &[FileReport],
    format: OutputFormat,
) -> Result<(), FlashRevealError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, reports)?;
            writeln!(out)?;
        }
        OutputFormat::Human => {
            for report in reports {
                let mark = if report.valid { "ok" } else { "FAILED" };
                writeln!(out, "{}: {mark}", report.file)?;
                for line in report.errors.iter().chain(&report.warnings) {
                    writeln!(out, "  {line}")?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    fn yaml_file(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn loader() -> ConfigLoader {
        ConfigLoader::new(LoaderOptions {
            ignore_env: true,
            ..LoaderOptions::default()
        })
    }

    #[test]
    fn test_valid_file() {
        let f = yaml_file("flash_interval_ms: 80\n");
        let report = check_file(&loader(), f.path(), false);
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_every_error_reported() {
        let f = yaml_file("flash_interval_ms: 0\nparticle_count: 0\n");
        let report = check_file(&loader(), f.path(), false);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn test_strict_rejects_warnings() {
        let f = yaml_file("labels:\n  a: SAME\n  b: SAME\n");
        assert!(check_file(&loader(), f.path(), false).valid);
        let report = check_file(&loader(), f.path(), true);
        assert!(!report.valid);
        assert!(!report.warnings.is_empty());
    }

    #[test]
    fn test_missing_file_reported() {
        let report = check_file(&loader(), Path::new("/nonexistent/reveal.yaml"), false);
        assert!(!report.valid);
        assert!(report.errors[0].contains("file not found"));
    }

    #[test]
    fn test_human_report() {
        let reports = vec![FileReport {
            file: "a.yaml".to_string(),
            valid: false,
            errors: vec!["error: bad at x".to_string()],
            warnings: Vec::new(),
        }];
        let mut buf = Vec::new();
        write_reports(&mut buf, &reports, OutputFormat::Human).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a.yaml: FAILED\n  error: bad at x\n");
    }
}
