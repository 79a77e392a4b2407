//! tokenlens command line.
//!
//! ```text
//! tokenlens extract scan.json --css app.css --config tokenlens.yaml --pretty
//! tokenlens color "#5167fc80" "oklch(62% 0.2 260)"
//! tokenlens vars theme.css --theme dark --strict
//! ```
//!
//! Output is JSON on stdout; logs go to stderr (see `TOKENLENS_LOG`).

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokenlens::{init_tracing, load_stylesheet, ExtractionConfig, Extractor, ScanInput};
use tokenlens_core::{canonicalize, resolve, ColorValue, ResolvedVariable, ThemeContext};

/// Extract design tokens from a page's styling surface
#[derive(Parser)]
#[command(name = "tokenlens")]
#[command(version)]
#[command(about = "Extract design tokens from a page's styling surface")]
struct Cli {
    /// Log pipeline decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the token model from a scan document
    Extract(ExtractArgs),

    /// Canonicalize CSS color values (one JSON object per line)
    Color(ColorArgs),

    /// Resolve the custom properties of a stylesheet
    Vars(VarsArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// Scan document (JSON)
    #[arg(value_name = "SCAN")]
    scan: PathBuf,

    /// Extra stylesheets to scan for custom properties
    #[arg(long = "css", value_name = "FILE")]
    css: Vec<PathBuf>,

    /// Extraction configuration (YAML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct ColorArgs {
    /// Color values, e.g. "#5167fc", "hsl(230 97% 65%)", "rebeccapurple"
    #[arg(value_name = "VALUE", required = true)]
    values: Vec<String>,
}

#[derive(Args)]
struct VarsArgs {
    /// Stylesheet to scan
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Only show values for this theme (light values fill gaps)
    #[arg(long, value_name = "THEME")]
    theme: Option<String>,

    /// Fail on the first rule that cannot be parsed instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Extraction configuration (YAML), for scan settings
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct ColorLine<'a> {
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    css: Option<String>,
    color: Option<ColorValue>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Extract(args) => run_extract(args),
        Commands::Color(args) => run_color(args),
        Commands::Vars(args) => run_vars(args),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ExtractionConfig> {
    match path {
        Some(path) => ExtractionConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display())),
        None => Ok(ExtractionConfig::default()),
    }
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    let mut input = ScanInput::load(&args.scan)
        .with_context(|| format!("loading scan document {}", args.scan.display()))?;

    for path in &args.css {
        let css = std::fs::read_to_string(path)
            .with_context(|| format!("reading stylesheet {}", path.display()))?;
        input.stylesheets.push(css);
    }

    let model = Extractor::new(config).extract(&input);
    let json = if args.pretty {
        serde_json::to_string_pretty(&model)?
    } else {
        serde_json::to_string(&model)?
    };
    println!("{}", json);
    Ok(())
}

fn run_color(args: ColorArgs) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for value in &args.values {
        let color = canonicalize(value);
        let line = ColorLine {
            input: value,
            hex: color.as_ref().map(ColorValue::to_hex),
            css: color.as_ref().map(ColorValue::to_css),
            color,
        };
        writeln!(out, "{}", serde_json::to_string(&line)?)?;
    }
    Ok(())
}

fn run_vars(args: VarsArgs) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    let report = load_stylesheet(&args.file, &config.scan, args.strict)
        .with_context(|| format!("scanning {}", args.file.display()))?;
    if report.skipped_rules() > 0 {
        tracing::warn!(skipped = report.skipped_rules(), "some rules could not be parsed");
    }
    let table = resolve(&report.declarations);

    let json = match args.theme {
        Some(theme) => {
            let theme = ThemeContext::from(theme.as_str());
            let values: BTreeMap<&str, &ResolvedVariable> = table.for_theme(&theme).collect();
            serde_json::to_string_pretty(&values)?
        }
        None => serde_json::to_string_pretty(&table)?,
    };
    println!("{}", json);
    Ok(())
}
