//! Ash Compiler CLI
//!
//! The `ashc` command compiles Ash source files to C++ translation units
//! backed by the external conservative mark-and-sweep allocator.

mod error_formatter;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

use ash_codegen::CppGenerator;
use ash_lexer::tokenize;
use ash_parser::parse;
use ash_types::Checker;

#[derive(Parser)]
#[command(name = "ashc")]
#[command(author = "Ash Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Ash compiler - linear ownership with an opt-in managed heap")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input source file (.ash)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (default: input with .cpp extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show tokens (lexer output)
    #[arg(long, global = true)]
    show_tokens: bool,

    /// Show AST (parser output)
    #[arg(long, global = true)]
    show_ast: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an Ash source file to C++
    Build {
        /// Input source file
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Type-check an Ash source file without emitting anything
    Check {
        /// Input source file
        input: PathBuf,
    },
}

struct Options {
    show_tokens: bool,
    show_ast: bool,
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let opts = Options {
        show_tokens: cli.show_tokens,
        show_ast: cli.show_ast,
        verbose: cli.verbose,
    };

    let result = match cli.command {
        Some(Commands::Build { input, output }) => build(&input, output, &opts),
        Some(Commands::Check { input }) => check(&input, &opts),
        None => match cli.input {
            Some(input) => build(&input, cli.output, &opts),
            None => {
                eprintln!("{} no input file; try 'ashc --help'", "error:".red().bold());
                exit(1);
            }
        },
    };

    if let Err(message) = result {
        eprintln!("{}", message);
        exit(1);
    }
}

/// Run the front-end: read, tokenize, parse, check.
fn front_end(input: &Path, opts: &Options) -> Result<ash_types::TypedProgram, String> {
    let source = fs::read_to_string(input)
        .map_err(|e| format!("{} cannot read {}: {}", "error:".red().bold(), input.display(), e))?;

    if opts.show_tokens {
        match tokenize(&source) {
            Ok(tokens) => {
                for token in &tokens {
                    println!("{:?}", token.token);
                }
            }
            Err(e) => println!("{} {}", "lex error:".red(), e),
        }
    }

    let program = parse(&source)
        .map_err(|e| error_formatter::format_parse_error(&e, &source, input))?;

    if opts.show_ast {
        println!("{:#?}", program);
    }

    let typed = Checker::new()
        .check_program(&program)
        .map_err(|e| error_formatter::format_check_error(&e, &source, input))?;

    if opts.verbose {
        println!(
            "{} {} ({} structs, {} resources, {} functions)",
            "checked".green().bold(),
            input.display(),
            typed.structs.len(),
            typed.resources.len(),
            typed.functions.len()
        );
    }

    Ok(typed)
}

fn check(input: &Path, opts: &Options) -> Result<(), String> {
    front_end(input, opts)?;
    println!("{} {}", "ok".green().bold(), input.display());
    Ok(())
}

fn build(input: &Path, output: Option<PathBuf>, opts: &Options) -> Result<(), String> {
    let typed = front_end(input, opts)?;

    let cpp = CppGenerator::new()
        .generate(&typed)
        .map_err(|e| format!("{} {}", "codegen error:".red().bold(), e))?;

    let out_path = output.unwrap_or_else(|| input.with_extension("cpp"));
    fs::write(&out_path, cpp).map_err(|e| {
        format!(
            "{} cannot write {}: {}",
            "error:".red().bold(),
            out_path.display(),
            e
        )
    })?;

    println!(
        "{} {} -> {}",
        "compiled".green().bold(),
        input.display(),
        out_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(source: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.ash");
        fs::write(&path, source).unwrap();
        (dir, path)
    }

    fn quiet() -> Options {
        Options {
            show_tokens: false,
            show_ast: false,
            verbose: false,
        }
    }

    #[test]
    fn build_writes_cpp_next_to_input() {
        let (dir, path) = write_temp("fn main() -> unit { let a = 1; }");
        build(&path, None, &quiet()).unwrap();

        let out = dir.path().join("prog.cpp");
        let cpp = fs::read_to_string(out).unwrap();
        assert!(cpp.contains("void ash_main()"));
    }

    #[test]
    fn build_honors_output_path() {
        let (dir, path) = write_temp("fn main() -> unit {}");
        let out = dir.path().join("custom.cpp");
        build(&path, Some(out.clone()), &quiet()).unwrap();
        assert!(out.exists());
    }

    #[test]
    fn check_reports_ownership_error() {
        let source = r#"
            struct P { v: int }
            fn main() -> unit {
                let p = P { v: 1 };
                let a = p;
                let b = p;
            }
        "#;
        let (_dir, path) = write_temp(source);
        let err = check(&path, &quiet()).unwrap_err();
        assert!(err.contains("Use of moved value"));
        assert!(err.contains("prog.ash"));
    }

    #[test]
    fn check_reports_parse_error() {
        let (_dir, path) = write_temp("fn main() -> unit { let a = 1 }");
        let err = check(&path, &quiet()).unwrap_err();
        assert!(err.contains("Unexpected token"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = check(Path::new("/no/such/file.ash"), &quiet()).unwrap_err();
        assert!(err.contains("cannot read"));
    }
}
