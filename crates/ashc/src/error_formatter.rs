//! Unified error formatting for the Ash compiler CLI
//!
//! Routes parse and check errors through the shared `ErrorReporter` so
//! every diagnostic shows the offending line with a caret.

use std::path::Path;

use ash_parser::ParseError;
use ash_types::{error_report::ErrorReporter, CheckError};

fn filename(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("unknown")
}

/// Format a check error with source context
pub fn format_check_error(error: &CheckError, source: &str, path: &Path) -> String {
    let reporter = ErrorReporter::new(source).with_filename(filename(path));
    reporter.format_error(
        error.error_code(),
        &error.to_string(),
        error.span(),
        &error.to_string(),
        error.help().as_deref(),
        &error.secondary_spans(),
    )
}

/// Format a parse error with source context
pub fn format_parse_error(error: &ParseError, source: &str, path: &Path) -> String {
    let reporter = ErrorReporter::new(source).with_filename(filename(path));
    reporter.format_error(
        error.error_code(),
        &error.to_string(),
        error.span(),
        &error.to_string(),
        None,
        &[],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn check_error_includes_code_and_line() {
        let source = "struct P { x: int }\nfn main() -> unit { let a = nope; }";
        let program = ash_parser::parse(source).unwrap();
        let err = ash_types::Checker::new()
            .check_program(&program)
            .unwrap_err();

        let path = PathBuf::from("demo.ash");
        let out = format_check_error(&err, source, &path);

        assert!(out.contains("A007"));
        assert!(out.contains("Undefined variable"));
        assert!(out.contains("demo.ash:2:"));
        assert!(out.contains("^"));
    }

    #[test]
    fn parse_error_includes_code() {
        let source = "fn main() -> unit { let a = 1 }";
        let err = ash_parser::parse(source).unwrap_err();

        let path = PathBuf::from("demo.ash");
        let out = format_parse_error(&err, source, &path);

        assert!(out.contains("P001"));
        assert!(out.contains("Unexpected token"));
    }

    #[test]
    fn filename_fallback() {
        assert_eq!(filename(&PathBuf::from("")), "unknown");
        assert_eq!(filename(&PathBuf::from("/a/b/x.ash")), "x.ash");
    }
}
