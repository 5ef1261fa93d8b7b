use clap::{Arg, ArgAction, ArgMatches, Command};
use docmark::config::{self, ConfigSource};
use docmark::convert::{ConversionReport, Converter};
use docmark::extract::{DispatchExtractor, Extractor};
use docmark::markdown::{parse, Block};
use docmark::{DocmarkError, Engine};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Debug)]
enum AppError {
    SourceNotFound(PathBuf),
    ConfigError(DocmarkError),
    ConversionError(DocmarkError),
    DumpError(std::io::Error),
    ValidationFailed(usize),
}

/// Verbosity level for output
#[derive(Debug, Clone, Copy, PartialEq)]
enum Verbosity {
    Quiet,   // No output except errors
    Normal,  // Standard output
    Verbose, // Detailed output
}

impl Verbosity {
    fn from_matches(matches: &ArgMatches) -> Self {
        if matches.get_flag("quiet") {
            Verbosity::Quiet
        } else if matches.get_flag("verbose") {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    /// Default `RUST_LOG` filter for this level.
    fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "debug",
        }
    }
}

fn build_cli() -> Command {
    Command::new("docmark")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert documents to Markdown and PDF, with right-to-left text support")
        .after_help(
            "EXAMPLES:\n  \
            docmark                              # convert every file in ./input/\n  \
            docmark report.docx                  # convert a single file into ./output/\n  \
            docmark docs/ -o exports             # custom output directory\n  \
            docmark notes.md --no-pdf            # Markdown only\n  \
            docmark notes.md --dry-run --verbose # only run the pre-flight checks\n",
        )
        .arg(
            Arg::new("source")
                .value_name("SOURCE")
                .default_value("input")
                .help("File or directory to convert"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .default_value("output")
                .help("Output directory"),
        )
        .arg(
            Arg::new("no-pdf")
                .long("no-pdf")
                .help("Generate Markdown only; skip PDF")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (default: ./docmark.toml, then the user config directory)"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Extract and validate input without writing any file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dump-blocks")
                .long("dump-blocks")
                .value_name("FILE")
                .help("Write the parsed block structure of a single input as JSON"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Show detailed output including validation warnings")
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress all output except errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
        .arg(
            Arg::new("get-default-configuration")
                .long("get-default-configuration")
                .help("Print a default docmark.toml to stdout and exit")
                .action(ArgAction::SetTrue),
        )
}

/// Configuration file to load, if any.
///
/// Priority order:
/// 1. `--config` when given
/// 2. `docmark.toml` in the current directory
/// 3. `docmark/config.toml` in the user configuration directory
fn get_config_path(matches: &ArgMatches) -> Option<String> {
    if let Some(config_file) = matches.get_one::<String>("config") {
        return Some(config_file.to_string());
    }
    config::find_config_file().map(|p| p.to_string_lossy().into_owned())
}

fn print_report(report: &ConversionReport, verbosity: Verbosity) {
    if let Some(e) = &report.error {
        error!("[X] {}", e);
        return;
    }
    for warning in &report.warnings {
        warn!("{}", warning);
    }
    if verbosity == Verbosity::Quiet {
        return;
    }
    if let Some(md) = &report.md_path {
        println!("  Markdown -> {}", md.display());
    }
    if let Some(pdf) = &report.pdf_path {
        println!("  PDF      -> {}", pdf.display());
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Extracts and validates without writing; returns the number of problems found.
/// A file that cannot be extracted counts as one problem and the run continues.
fn dry_run(
    engine: &Engine,
    extractor: &DispatchExtractor,
    files: &[PathBuf],
    verbosity: Verbosity,
) -> Result<usize, AppError> {
    let mut total = 0;
    for src in files {
        let markdown = match extractor.extract(src) {
            Ok(markdown) => markdown,
            Err(e) => {
                error!("[X] {}", e);
                total += 1;
                continue;
            }
        };
        let warnings = engine.validate(&markdown);
        if verbosity == Verbosity::Verbose {
            info!("Pre-flight validation of {}", src.display());
        }
        for warning in &warnings {
            warn!("{}: {}", file_name(src), warning);
        }
        total += warnings.len();
    }
    if verbosity != Verbosity::Quiet {
        println!("✓ Dry-run validation complete. No files written.");
        if total == 0 {
            println!("✓ No issues detected.");
        } else {
            println!("⚠️  {} warning(s) found.", total);
        }
    }
    Ok(total)
}

fn dump_blocks(
    extractor: &DispatchExtractor,
    src: &Path,
    target: &str,
) -> Result<(), AppError> {
    let markdown = extractor
        .extract(src)
        .map_err(AppError::ConversionError)?;
    let blocks: Vec<Block> = parse(&markdown).collect();
    Block::save_to_json_file(&blocks, target).map_err(AppError::DumpError)?;
    info!("Wrote {} block(s) to {}", blocks.len(), target);
    Ok(())
}

fn run(matches: ArgMatches) -> Result<(), AppError> {
    let verbosity = Verbosity::from_matches(&matches);
    let generate_pdf = !matches.get_flag("no-pdf");

    let source = PathBuf::from(
        matches
            .get_one::<String>("source")
            .map(String::as_str)
            .unwrap_or("input"),
    );
    let out_dir = PathBuf::from(
        matches
            .get_one::<String>("output")
            .map(String::as_str)
            .unwrap_or("output"),
    );
    if !source.exists() {
        return Err(AppError::SourceNotFound(source));
    }

    let config_path = get_config_path(&matches);
    let config_source = match &config_path {
        Some(path) => {
            debug!("Using configuration {}", path);
            ConfigSource::File(path.as_str())
        }
        None => ConfigSource::Default,
    };
    let config = config::load_config_from_source(config_source).map_err(AppError::ConfigError)?;
    let engine = Engine::from_config(&config);
    let extractor = DispatchExtractor::new(config.extractor_program.clone());

    let files = if source.is_dir() {
        docmark::convert::list_files(&source).map_err(AppError::ConversionError)?
    } else {
        vec![source.clone()]
    };

    if let Some(target) = matches.get_one::<String>("dump-blocks") {
        if source.is_dir() {
            warn!("--dump-blocks needs a single input file; ignored for {}", source.display());
        } else {
            dump_blocks(&extractor, &source, target)?;
        }
    }

    if matches.get_flag("dry-run") {
        let warnings = dry_run(&engine, &extractor, &files, verbosity)?;
        if verbosity == Verbosity::Quiet && warnings > 0 {
            return Err(AppError::ValidationFailed(warnings));
        }
        return Ok(());
    }

    let converter = Converter::new(&engine, extractor);

    if source.is_dir() {
        let reports = converter
            .convert_directory(&source, &out_dir, generate_pdf)
            .map_err(AppError::ConversionError)?;
        if reports.is_empty() && verbosity != Verbosity::Quiet {
            println!(
                "No files found in {}. Place documents there and re-run.",
                source.display()
            );
        }
        for report in &reports {
            if verbosity != Verbosity::Quiet {
                println!("\nConverting: {}", file_name(&report.source));
            }
            print_report(report, verbosity);
        }
        return Ok(());
    }

    if verbosity != Verbosity::Quiet {
        println!("\nConverting: {}", file_name(&source));
    }
    let report = converter.convert_file(&source, &out_dir, generate_pdf);
    if let Some(e) = report.error {
        return Err(AppError::ConversionError(e));
    }
    print_report(&report, verbosity);
    Ok(())
}

fn main() {
    let matches = build_cli().get_matches();

    // Print a default configuration TOML and exit if requested
    if matches.get_flag("get-default-configuration") {
        println!("{}", config::default_config_toml());
        process::exit(0);
    }

    let verbosity = Verbosity::from_matches(&matches);
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(verbosity.log_filter()),
    )
    .format_timestamp_millis()
    .init();

    if let Err(e) = run(matches) {
        match e {
            AppError::SourceNotFound(path) => {
                error!("[X] Source not found: {}", path.display())
            }
            AppError::ConfigError(e) => error!("[X] {}", e),
            AppError::ConversionError(e) => error!("[X] Conversion error: {}", e),
            AppError::DumpError(e) => error!("[X] Could not write block dump: {}", e),
            AppError::ValidationFailed(n) => error!("[X] {} validation warning(s)", n),
        }
        process::exit(1);
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let matches = build_cli().get_matches_from(vec!["docmark"]);
        assert_eq!(matches.get_one::<String>("source").unwrap(), "input");
        assert_eq!(matches.get_one::<String>("output").unwrap(), "output");
        assert!(!matches.get_flag("no-pdf"));
        assert_eq!(Verbosity::from_matches(&matches), Verbosity::Normal);
    }

    #[test]
    fn test_verbosity_flags() {
        let matches = build_cli().get_matches_from(vec!["docmark", "-v"]);
        assert_eq!(Verbosity::from_matches(&matches).log_filter(), "debug");
        let matches = build_cli().get_matches_from(vec!["docmark", "--quiet"]);
        assert_eq!(Verbosity::from_matches(&matches).log_filter(), "error");
        assert!(build_cli()
            .try_get_matches_from(vec!["docmark", "-v", "-q"])
            .is_err());
    }

    #[test]
    fn test_explicit_config_wins() {
        let matches = build_cli().get_matches_from(vec!["docmark", "--config", "custom.toml"]);
        assert_eq!(get_config_path(&matches), Some("custom.toml".to_string()));
    }

    #[test]
    fn test_run_missing_source() {
        let matches =
            build_cli().get_matches_from(vec!["docmark", "definitely/missing/source.docx"]);
        assert!(matches!(run(matches), Err(AppError::SourceNotFound(_))));
    }

    #[test]
    fn test_run_converts_markdown_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("doc.md");
        fs::write(&src, "# Small\n\ntext").unwrap();
        let out = dir.path().join("out");
        let matches = build_cli().get_matches_from(vec![
            "docmark",
            src.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "-q",
        ]);
        assert!(run(matches).is_ok());
        assert!(out.join("doc.md").exists());
        assert!(out.join("doc.pdf").exists());
    }

    #[test]
    fn test_run_converts_directory() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        fs::create_dir(&input).unwrap();
        fs::write(input.join("a.md"), "# A").unwrap();
        fs::write(input.join("b.txt"), "B").unwrap();
        let out = dir.path().join("out");
        let matches = build_cli().get_matches_from(vec![
            "docmark",
            input.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--no-pdf",
            "-q",
        ]);
        assert!(run(matches).is_ok());
        assert!(out.join("a.md").exists());
        assert!(out.join("b.md").exists());
        assert!(!out.join("a.pdf").exists());
    }

    #[test]
    fn test_dry_run_continues_past_failed_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("a.docx");
        fs::write(&broken, "junk").unwrap();
        let good = dir.path().join("b.md");
        fs::write(&good, "# Fine").unwrap();

        let engine = Engine::new(
            docmark::fonts::FontBook::builtin(),
            docmark::styling::RenderStyle::default(),
            docmark::bidi::Reorderer::default(),
        );
        let extractor = DispatchExtractor::new("definitely-not-an-installed-converter");
        let problems = dry_run(&engine, &extractor, &[broken, good], Verbosity::Quiet).unwrap();
        assert_eq!(problems, 1);
    }

    #[test]
    fn test_run_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("doc.md");
        fs::write(&src, "# Small").unwrap();
        let out = dir.path().join("out");
        let matches = build_cli().get_matches_from(vec![
            "docmark",
            src.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--dry-run",
        ]);
        assert!(run(matches).is_ok());
        assert!(!out.exists());
    }
}
