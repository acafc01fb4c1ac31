//! a11y-rules CLI - Accessibility rule scanner
//!
//! Scans an element tree snapshot (JSON or YAML) with the built-in rules.

use a11y_rules::config::{ColorMode, Config, OutputFormat};
use a11y_rules::engine::Engine;
use a11y_rules::evaluation::EvaluationCode;
use a11y_rules::output::{JsonFormatter, OutputFormatter, TextFormatter};
use a11y_rules::registry::RuleRegistry;
use a11y_rules::rule::{Rule, RuleMetadata};
use a11y_rules::{snapshot, ElementId};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "a11y-rules",
    version,
    about = "Accessibility rule scanner",
    long_about = "Evaluates accessibility rules against UI element tree snapshots."
)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an element tree snapshot
    Scan(ScanArgs),

    /// List available rules
    Rules {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Show detailed information about a rule
    Explain {
        /// Rule ID to explain
        rule_id: String,
    },
}

#[derive(clap::Args)]
struct ScanArgs {
    /// Snapshot file (.json, .yaml, .yml)
    snapshot: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Only enable specific rules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    select: Option<Vec<String>>,

    /// Disable specific rules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    disable: Option<Vec<String>>,

    /// Select rules by id prefix
    #[arg(long, value_delimiter = ',')]
    extend: Option<Vec<String>>,

    /// Ignore rules by id prefix
    #[arg(long, value_delimiter = ',')]
    ignore: Option<Vec<String>>,

    /// Evaluate a single element and report every rule, NotApplicable included
    #[arg(long)]
    element: Option<u64>,

    /// Also report passing results
    #[arg(long)]
    all: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Show per-rule timing statistics
    #[arg(long)]
    timing: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn severity_str(rule: &Rule) -> colored::ColoredString {
    let s = rule.severity.to_string();
    match rule.severity.failing_code() {
        EvaluationCode::Error => s.red(),
        EvaluationCode::Fail => s.red(),
        _ => s.yellow(),
    }
}

fn print_rule(rule: &Rule) {
    println!("  {} [{}]", rule.id.cyan(), severity_str(rule));
    println!("    {}", rule.description);
    if let Some(criterion) = rule.criterion {
        println!("    {}", criterion.to_string().dimmed());
    }
}

fn explain_rule(rule: &Rule) {
    println!("{}", "Rule Details".bold());
    println!();
    println!("  {}: {}", "ID".bold(), rule.id.cyan());
    println!("  {}: {}", "Name".bold(), rule.name);
    println!("  {}: {}", "Severity".bold(), severity_str(rule));
    if let Some(criterion) = rule.criterion {
        println!("  {}: {}", "Criterion".bold(), criterion);
    }

    println!();
    println!("  {}", "Description".bold());
    println!("  {}", rule.description);

    println!();
    println!("  {}: {}", "Applies to".bold(), rule.applicability);
    println!("  {}: {}", "Verdict".bold(), rule.verdict);

    if let Some(help) = &rule.help {
        println!();
        println!("  {}", "Help".bold());
        println!("  {}", help);
    }
    if !rule.tags.is_empty() {
        println!();
        println!("  {}: {}", "Tags".bold(), rule.tags.join(", "));
    }
}

fn load_config(args: &ScanArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_default().unwrap_or_else(|e| {
            log::warn!("Ignoring default configuration: {}", e);
            Config::default()
        }),
    };

    config.merge_cli(
        args.format.map(OutputFormat::from),
        args.verbose.then_some(true),
        args.jobs,
        args.disable.clone(),
        args.select.clone(),
    );
    if let Some(prefixes) = &args.extend {
        config.add_extend_prefixes(prefixes.clone());
    }
    if let Some(prefixes) = &args.ignore {
        config.add_ignore_prefixes(prefixes.clone());
    }

    Ok(config)
}

fn formatter(config: &Config, show_passes: bool) -> Box<dyn OutputFormatter> {
    match config.output.format {
        OutputFormat::Text => Box::new(TextFormatter {
            colored: config.output.color != ColorMode::Never,
            show_passes,
            show_help: true,
            show_stats: config.output.statistics,
        }),
        OutputFormat::Json => Box::new(JsonFormatter::new().pretty()),
    }
}

fn scan(args: ScanArgs, no_color: bool) -> Result<i32> {
    let mut config = load_config(&args)?;
    if no_color {
        config.output.color = ColorMode::Never;
    }
    match config.output.color {
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Auto => {}
    }

    let tree = snapshot::load(&args.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", args.snapshot.display()))?;
    let registry = Arc::new(RuleRegistry::builtin()?);
    let show_passes = args.all || config.output.verbose;
    let formatter = formatter(&config, show_passes);
    let engine = Engine::new(Arc::clone(&registry), config);

    if let Some(id) = args.element {
        let results = engine.evaluate_element(&tree, ElementId(id))?;
        print!("{}", formatter.format_results(&results, &registry));
        let worst = results.iter().map(|r| r.code).max();
        return Ok(match worst {
            Some(code) if code.is_blocking() => 2,
            Some(code) if code.is_finding() => 1,
            _ => 0,
        });
    }

    let result = engine.scan(&tree);
    print!("{}", formatter.format(&result, &registry));
    if args.timing {
        eprintln!("{}", result.format_timings());
    }

    Ok(result.exit_code())
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Scan(args) => scan(args, cli.no_color),

        Commands::Rules { format } => {
            let registry = RuleRegistry::builtin()?;
            match format {
                Format::Json => {
                    let rules: Vec<RuleMetadata> =
                        registry.all().iter().map(Rule::metadata).collect();
                    println!("{}", serde_json::to_string_pretty(&rules)?);
                }
                Format::Text => {
                    println!("{} ({} rules)", "Built-in rules".bold(), registry.len());
                    for rule in registry.all() {
                        print_rule(rule);
                    }
                }
            }
            Ok(0)
        }

        Commands::Explain { rule_id } => {
            let registry = RuleRegistry::builtin()?;
            match registry.lookup(&rule_id) {
                Ok(rule) => {
                    explain_rule(rule);
                    Ok(0)
                }
                Err(e) => {
                    eprintln!("{}: {}", "error".red().bold(), e);
                    eprintln!();
                    eprintln!("Use {} to see all available rules", "a11y-rules rules".cyan());
                    Ok(1)
                }
            }
        }
    }
}

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            1
        }
    };

    std::process::exit(exit_code);
}
