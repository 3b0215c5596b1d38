use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use storelint::{
    config::{Config, CONFIG_FILE_NAME},
    engine::ValidationEngine,
    model::{Severity, ValidationReport},
    output::{format_report_to_string, print_report, OutputFormat},
    rules::{load_custom_rules, RuleRegistry},
};
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const CRITICAL_FINDING: u8 = 2;
    pub const HIGH_FINDING: u8 = 3;
    pub const MEDIUM_FINDING: u8 = 4;
    pub const LOW_FINDING: u8 = 5;
    pub const INFO_FINDING: u8 = 6;
}

#[derive(Parser)]
#[command(name = "storelint")]
#[command(
    author,
    version,
    about = "Validate app packages against marketplace review rules"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an app bundle or archive
    Validate {
        /// Path to a .app bundle directory or .ipa archive
        package: PathBuf,

        /// Path to a JSON listing metadata document
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Path to a config file (default: storelint.toml in cwd)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format (text, json, junit)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Run only these rules (comma-separated names)
        #[arg(long, value_delimiter = ',')]
        only: Option<Vec<String>>,

        /// Skip these rules (comma-separated names)
        #[arg(long, value_delimiter = ',')]
        skip: Vec<String>,

        /// Load custom rule definitions from these files
        #[arg(long = "rule-file")]
        rule_files: Vec<PathBuf>,

        /// Exit with error if findings at or above this severity are present
        #[arg(long)]
        fail_on: Option<String>,

        /// Enable debug-level logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// List available rules
    ListRules,

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            package,
            metadata,
            config,
            format,
            output,
            only,
            skip,
            rule_files,
            fail_on,
            verbose,
        } => {
            let config = Config::load(config.as_deref())?;
            init_tracing(verbose || config.output.verbose);

            let format_str = format.unwrap_or_else(|| config.output.format.clone());
            let format = OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?;

            let fail_on = match fail_on {
                Some(name) => Some(Severity::from_str(&name).map_err(|e| anyhow::anyhow!(e))?),
                None => config.fail_on,
            };

            let registry = build_registry(&config, only.as_deref(), &skip, &rule_files);

            run_validate(
                registry,
                package,
                metadata,
                format,
                output,
                fail_on,
                config.output.color,
            )
            .await
        }
        Commands::ListRules => {
            init_tracing(false);
            list_rules();
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            init_tracing(false);
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Assembles the rule set: built-ins, then custom definitions (which may
/// supersede built-ins by name), then the configured filters.
fn build_registry(
    config: &Config,
    only: Option<&[String]>,
    skip: &[String],
    rule_files: &[PathBuf],
) -> RuleRegistry {
    let mut registry = RuleRegistry::with_builtins();

    let mut definition_paths = config.custom_rules.clone();
    definition_paths.extend(rule_files.iter().cloned());
    for rule in load_custom_rules(&definition_paths) {
        registry.register(Box::new(rule));
    }

    registry.filter(&config.suppressed_rules(), only, skip);
    registry
}

async fn run_validate(
    registry: RuleRegistry,
    package: PathBuf,
    metadata: Option<PathBuf>,
    format: OutputFormat,
    output_file: Option<PathBuf>,
    fail_on: Option<Severity>,
    color: bool,
) -> Result<u8> {
    let is_interactive = format == OutputFormat::Text && output_file.is_none();

    let progress = if is_interactive {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Validating {}...", package.display()));
        Some(pb)
    } else {
        None
    };

    let engine = ValidationEngine::new(registry);
    let report = engine.run(&package, metadata.as_deref()).await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if let Some(path) = output_file {
        let rendered = format_report_to_string(&report, format)?;
        std::fs::write(&path, rendered)?;
        println!("Report written to: {}", path.display());
    } else {
        print_report(&report, format, color)?;
    }

    Ok(determine_exit_code(&report, fail_on))
}

/// Maps the report to an exit code. A run that never executed any rule yet
/// produced findings failed before rule execution and is a plain error.
fn determine_exit_code(report: &ValidationReport, fail_on: Option<Severity>) -> u8 {
    if report.summary.executed.is_empty() && !report.results.is_empty() {
        return exit_codes::ERROR;
    }

    let threshold = match fail_on {
        Some(threshold) => threshold,
        None => return exit_codes::SUCCESS,
    };

    let worst = report
        .results
        .iter()
        .map(|f| f.severity)
        .filter(|s| *s >= threshold)
        .max();

    match worst {
        Some(Severity::Critical) => exit_codes::CRITICAL_FINDING,
        Some(Severity::High) => exit_codes::HIGH_FINDING,
        Some(Severity::Medium) => exit_codes::MEDIUM_FINDING,
        Some(Severity::Low) => exit_codes::LOW_FINDING,
        Some(Severity::Info) => exit_codes::INFO_FINDING,
        None => exit_codes::SUCCESS,
    }
}

fn list_rules() {
    println!("Available rules:");
    println!();

    for rule in RuleRegistry::with_builtins().iter() {
        println!("  {:<18} {}", rule.name(), rule.description());
    }

    println!();
    println!("Custom rules can be added with --rule-file or the custom_rules config key.");
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        std::fs::write(&config_path, Config::generate_default_config())?;
        println!("Created config file at: {}", config_path.display());
        return Ok(());
    }

    // Show current config
    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'storelint config --init' to create one.");
    }

    Ok(())
}
