//! Error reporting utilities for the Ash compiler
//!
//! Formats errors with source context: a header with the error code, the
//! offending line, and a caret run under the offending column.

use colored::Colorize;
use ash_ast::Span;

/// Error reporter that formats errors with source context
pub struct ErrorReporter<'a> {
    source: &'a str,
    filename: Option<&'a str>,
}

impl<'a> ErrorReporter<'a> {
    /// Create a new error reporter
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            filename: None,
        }
    }

    /// Set the filename for error messages
    pub fn with_filename(mut self, filename: &'a str) -> Self {
        self.filename = Some(filename);
        self
    }

    /// Format an error with source context
    pub fn format_error(
        &self,
        error_code: &str,
        title: &str,
        span: Option<Span>,
        message: &str,
        help: Option<&str>,
        secondary_spans: &[(Span, String)],
    ) -> String {
        let mut output = String::new();

        // Error header: error[A001]: Title
        output.push_str(&format!(
            "{}{}{}{} {}\n",
            "error".red().bold(),
            "[".bold(),
            error_code.yellow().bold(),
            "]".bold(),
            title.bold()
        ));

        if let Some(span) = span {
            if let Some(line_text) = self.line_text(span) {
                let location = if let Some(filename) = self.filename {
                    format!("{}:{}:{}", filename, span.line, span.column)
                } else {
                    format!("line {}:{}", span.line, span.column)
                };
                output.push_str(&format!("  {} {}\n", "-->".cyan().bold(), location));
                output.push_str(&format!("   {}\n", "|".cyan().bold()));

                output.push_str(&format!(
                    " {} {} {}\n",
                    format!("{:>3}", span.line).cyan().bold(),
                    "|".cyan().bold(),
                    line_text
                ));

                let caret_len = span.end.saturating_sub(span.start).max(1);
                output.push_str(&format!(
                    "   {} {}{} {}\n",
                    "|".cyan().bold(),
                    " ".repeat(span.column.saturating_sub(1) as usize),
                    "^".repeat(caret_len).red().bold(),
                    message.red()
                ));
            } else {
                output.push_str(&format!("  {} {}\n", "note:".cyan().bold(), message));
            }
        } else {
            output.push_str(&format!("  {} {}\n", "note:".cyan().bold(), message));
        }

        if let Some(help_text) = help {
            output.push_str(&format!(
                "   {} {}\n",
                "=".cyan().bold(),
                format!("help: {}", help_text).cyan()
            ));
        }

        for (sec_span, label) in secondary_spans {
            if let Some(line_text) = self.line_text(*sec_span) {
                let location = if let Some(filename) = self.filename {
                    format!("{}:{}:{}", filename, sec_span.line, sec_span.column)
                } else {
                    format!("line {}:{}", sec_span.line, sec_span.column)
                };
                output.push_str(&format!("  {} {}\n", "-->".cyan().bold(), location));
                output.push_str(&format!(
                    " {} {} {}\n",
                    format!("{:>3}", sec_span.line).cyan().bold(),
                    "|".cyan().bold(),
                    line_text
                ));
                let caret_len = sec_span.end.saturating_sub(sec_span.start).max(1);
                output.push_str(&format!(
                    "   {} {}{} {}\n",
                    "|".cyan().bold(),
                    " ".repeat(sec_span.column.saturating_sub(1) as usize),
                    "^".repeat(caret_len).blue().bold(),
                    label.blue()
                ));
            }
        }

        output
    }

    /// Extract the source line a span starts on
    fn line_text(&self, span: Span) -> Option<String> {
        if span.start > self.source.len() {
            return None;
        }
        let line_start = span.start.saturating_sub(span.column.saturating_sub(1) as usize);
        let line_end = self.source[line_start..]
            .find('\n')
            .map(|pos| line_start + pos)
            .unwrap_or(self.source.len());
        Some(self.source[line_start..line_end].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_reporter() {
        let source = "fn main() -> unit {\n    let p2 = p;\n}";
        let reporter = ErrorReporter::new(source).with_filename("test.ash");

        // points at `p` on line 2
        let span = Span::new(2, 14, 33, 34);
        let output = reporter.format_error(
            "A009",
            "Use of moved value: 'p'",
            Some(span),
            "value used here after move",
            Some("bind the value to a new name before the move"),
            &[],
        );

        assert!(output.contains("error"));
        assert!(output.contains("A009"));
        assert!(output.contains("Use of moved value"));
        assert!(output.contains("test.ash:2:14"));
        assert!(output.contains("^"));
    }

    #[test]
    fn test_error_without_span() {
        let source = "fn main() -> unit {}";
        let reporter = ErrorReporter::new(source);

        let output = reporter.format_error(
            "A028",
            "No 'main' function",
            None,
            "the program has no entry point",
            None,
            &[],
        );

        assert!(output.contains("error"));
        assert!(output.contains("A028"));
        assert!(output.contains("note:"));
    }

    #[test]
    fn test_caret_column() {
        let source = "let x = moved_value;";
        let reporter = ErrorReporter::new(source);

        let span = Span::new(1, 9, 8, 19);
        let output = reporter.format_error("A009", "title", Some(span), "msg", None, &[]);

        // The caret line aligns under column 9 and spans the identifier
        let caret_line = output
            .lines()
            .find(|l| l.contains("^"))
            .expect("caret line present");
        assert!(caret_line.contains(&"^".repeat(11)));
    }
}
