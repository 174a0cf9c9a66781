//! Convex Guardian CLI - Command-line interface for TypeScript configuration checks
//!
//! CDD Principle: Application Layer - CLI coordinates user interactions with domain services
//! - Translates user commands to domain operations
//! - Handles external concerns like file I/O, process exit codes, and terminal output
//! - Provides clean separation between user interface and business logic

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use convex_guardian::{
    ConfigTarget, ConvexGuardian, GuardianConfig, OutputFormat, ReportFormatter, ReportOptions,
    Severity,
};
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Convex Guardian - TypeScript configuration checks for Convex projects
#[derive(Parser)]
#[command(name = "convex-guardian")]
#[command(version = "0.1.0")]
#[command(about = "Evaluate TypeScript configurations against Convex rules")]
#[command(long_about = "Convex Guardian extracts configuration rules from a Convex MDC guidelines document and evaluates every tsconfig file of a project against them. Designed for local use and CI/CD integration.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log line format written to stderr
    #[arg(long, value_enum, global = true, default_value = "text")]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a project's TypeScript configuration files
    Check(CheckArgs),

    /// List the rules extracted from the rules document
    Rules {
        #[command(flatten)]
        source: RulesSource,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormatArg,
    },

    /// Explain what a specific rule checks
    Explain {
        /// Rule ID to explain
        rule_id: String,

        #[command(flatten)]
        source: RulesSource,
    },

    /// Validate configuration file
    ValidateConfig {
        /// Configuration file to validate
        config_file: Option<PathBuf>,

        /// Print the effective configuration as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

/// Where the rules come from
#[derive(Args, Clone)]
struct RulesSource {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    project_dir: PathBuf,

    /// Path to the MDC rules document (default: auto-detect)
    #[arg(short, long)]
    rules_file: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct CheckArgs {
    #[command(flatten)]
    source: RulesSource,

    /// Evaluate only these configuration files instead of discovering them
    #[arg(long = "file", action = clap::ArgAction::Append)]
    files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormatArg,

    /// Minimum severity level to display
    #[arg(long, value_enum)]
    min_severity: Option<SeverityArg>,
}

#[derive(Copy, Clone, ValueEnum, PartialEq)]
enum OutputFormatArg {
    Human,
    Json,
    Github,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Github => OutputFormat::GitHub,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum, PartialEq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, ValueEnum)]
enum SeverityArg {
    Info,
    Warning,
    Error,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Info => Severity::Info,
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Error => Severity::Error,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_format);

    match run_command(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}

fn run_command(cli: Cli) -> anyhow::Result<i32> {
    let use_colors = !cli.no_color;

    match cli.command {
        Commands::Check(args) => run_check(args, cli.config, cli.verbose, use_colors),
        Commands::Rules { source, format } => run_list_rules(&source, cli.config, format, use_colors),
        Commands::Explain { rule_id, source } => run_explain(&rule_id, &source, cli.config, use_colors),
        Commands::ValidateConfig { config_file, json } => {
            run_validate_config(config_file.or(cli.config), json)
        }
    }
}

fn run_check(
    args: CheckArgs,
    config_path: Option<PathBuf>,
    verbose: bool,
    use_colors: bool,
) -> anyhow::Result<i32> {
    let project_dir = &args.source.project_dir;
    let format: OutputFormat = args.format.into();

    let guardian = load_guardian(&args.source, config_path)?;
    let formatter = ReportFormatter::new(ReportOptions {
        use_colors,
        min_severity: args.min_severity.map(Severity::from),
        passed_rules_limit: guardian.config().report.passed_rules_limit,
        ..Default::default()
    });

    if verbose && format == OutputFormat::Human {
        println!("{}", formatter.format_rules(guardian.rules(), OutputFormat::Human)?);
    }

    let targets = if args.files.is_empty() {
        guardian.discover_targets(project_dir)?
    } else {
        args.files.into_iter().map(ConfigTarget::from_path).collect()
    };
    tracing::info!("Evaluating {} configuration files", targets.len());

    let report = guardian.evaluate_targets(&targets);
    formatter.write_report(&report, format, io::stdout())?;
    if format == OutputFormat::Json {
        println!();
    }

    if report.has_errors() {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn run_list_rules(
    source: &RulesSource,
    config_path: Option<PathBuf>,
    format: OutputFormatArg,
    use_colors: bool,
) -> anyhow::Result<i32> {
    let guardian = load_guardian(source, config_path)?;
    let formatter = ReportFormatter::new(ReportOptions { use_colors, ..Default::default() });

    println!("{}", formatter.format_rules(guardian.rules(), format.into())?);
    Ok(0)
}

fn run_explain(
    rule_id: &str,
    source: &RulesSource,
    config_path: Option<PathBuf>,
    use_colors: bool,
) -> anyhow::Result<i32> {
    let guardian = load_guardian(source, config_path)?;
    let formatter = ReportFormatter::new(ReportOptions { use_colors, ..Default::default() });

    if let Some(rule) = guardian.rules().get(rule_id) {
        print!("{}", formatter.format_rule_details(rule));
        return Ok(0);
    }

    eprintln!("❌ Rule '{rule_id}' not found");
    println!();
    println!("Available rules:");
    for rule in guardian.rules() {
        println!("  - {}", rule.id);
    }

    Ok(1)
}

fn run_validate_config(config_path: Option<PathBuf>, json: bool) -> anyhow::Result<i32> {
    let config_path = config_path
        .or_else(|| GuardianConfig::find_config_file("."))
        .unwrap_or_else(|| PathBuf::from("convex_guardian.yaml"));

    if json {
        return match GuardianConfig::load_from_file(&config_path) {
            Ok(config) => {
                println!("{}", config.to_json()?);
                Ok(0)
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {e}");
                Ok(1)
            }
        };
    }

    println!("Validating configuration: {}", config_path.display());

    match GuardianConfig::load_from_file(&config_path) {
        Ok(config) => {
            println!("✅ Configuration is valid");

            println!("📊 Configuration summary:");
            println!("  Rules file search paths: {}", config.rules_file.search_paths.len());
            println!("  Standard configs: {}", config.discovery.standard_configs.len());
            println!("  File pattern: {}", config.discovery.file_pattern);
            println!("  Excluded directories: {}", config.discovery.exclude_dirs.join(", "));
            println!(
                "  Rule policy: {} disabled, {} severity overrides, {} custom",
                config.rules.disabled.len(),
                config.rules.severity_overrides.len(),
                config.rules.custom.len()
            );

            Ok(0)
        }
        Err(e) => {
            eprintln!("❌ Configuration validation failed: {e}");
            Ok(1)
        }
    }
}

/// Load the tool configuration: explicit path, else the project's own file, else defaults
fn load_config(config_path: Option<&Path>, project_dir: &Path) -> anyhow::Result<GuardianConfig> {
    let config = match config_path {
        Some(path) => GuardianConfig::load_from_file(path)?,
        None => GuardianConfig::discover(project_dir)?,
    };
    Ok(config)
}

fn load_guardian(source: &RulesSource, config_path: Option<PathBuf>) -> anyhow::Result<ConvexGuardian> {
    let project_dir = &source.project_dir;
    if !project_dir.is_dir() {
        bail!("Project directory not found: {}", project_dir.display());
    }

    let config = load_config(config_path.as_deref(), project_dir)?;

    let guardian = match &source.rules_file {
        Some(rules_file) => {
            if !rules_file.is_file() {
                bail!("Rules file not found: {}", rules_file.display());
            }
            ConvexGuardian::from_rules_file(rules_file, config)
                .with_context(|| format!("Failed to load rules from {}", rules_file.display()))?
        }
        None => ConvexGuardian::locate(project_dir, config)
            .context("Please specify the rules file with --rules-file")?,
    };

    Ok(guardian)
}

fn init_logging(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
