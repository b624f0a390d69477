//! Domain Avail CLI Application
//!
//! A command-line interface for checking which candidate domain names are
//! still free at the registrar. Every stage of the run is printed as it
//! happens and the available names are written to an output file.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use domain_avail_lib::{
    load_env_config, parse_timeout_string, run_pipeline, ConfigManager, FileConfig, Progress,
    RunConfig,
};
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use ui::ConsoleReporter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for domain-avail
#[derive(Parser, Debug)]
#[command(name = "domain-avail")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check domain availability against a registrar API")]
#[command(
    long_about = "Check domain availability against a registrar API.\n\nNames come from the command line or a YAML input file mapping each TLD to a list of names. Available domains are written one per line to the output file."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Base names to check under the default TLD
    #[arg(value_name = "NAMES", help_heading = "Input")]
    pub names: Vec<String>,

    /// TLD for names given as arguments (default: in.th)
    #[arg(short = 't', long = "tld", value_name = "TLD", help_heading = "Input")]
    pub tld: Option<String>,

    /// YAML input file, read when no names are given
    #[arg(short = 'f', long = "file", value_name = "FILE", help_heading = "Input")]
    pub file: Option<String>,

    /// Write available domains to this file
    #[arg(short = 'o', long = "output", value_name = "FILE", help_heading = "Output")]
    pub output: Option<String>,

    /// Directory for the generated output file (default: res)
    #[arg(long = "output-dir", value_name = "DIR", help_heading = "Output")]
    pub output_dir: Option<String>,

    /// Names per registrar request (1-100, default: 5)
    #[arg(long = "chunk-size", value_name = "N", help_heading = "Requests")]
    pub chunk_size: Option<usize>,

    /// Retries per registrar request (0-20, default: 8)
    #[arg(long = "retry", value_name = "N", help_heading = "Requests")]
    pub retry: Option<u32>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    init_logging(args.verbose);

    if let Err(e) = run_availability_check(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if let Some(chunk_size) = args.chunk_size {
        if chunk_size == 0 || chunk_size > 100 {
            return Err("Chunk size must be between 1 and 100".to_string());
        }
    }

    if let Some(retry) = args.retry {
        if retry > 20 {
            return Err("Retry must be at most 20".to_string());
        }
    }

    if let Some(tld) = &args.tld {
        let tld = tld.trim().trim_start_matches('.');
        if tld.is_empty() || tld.contains(' ') {
            return Err(format!("Invalid TLD '{}'", tld));
        }
    }

    Ok(())
}

/// Log to stderr so stdout only carries progress lines.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run_availability_check(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&args)?;
    tracing::debug!(?config, "resolved configuration");

    let mut progress = Progress::new(ConsoleReporter);
    progress.begin();
    let result = run_pipeline(&mut progress, &config, args.names).await;
    progress.end();

    let summary = result?;
    tracing::info!(
        checked = summary.domains_checked,
        available = summary.available.len(),
        output = %summary.output.display(),
        "run complete"
    );

    Ok(())
}

fn build_config(args: &Args) -> Result<RunConfig, Box<dyn std::error::Error>> {
    let mut config = RunConfig::default();

    let config_manager = ConfigManager::new(args.verbose);

    // Step 1: Explicit config file, or automatic discovery
    if let Some(explicit_config_path) = &args.config {
        tracing::debug!(path = %explicit_config_path, "using explicit config file");

        let file_config = config_manager
            .load_file(explicit_config_path)
            .map_err(|e| {
                format!(
                    "Failed to load config file '{}': {}",
                    explicit_config_path, e
                )
            })?;

        config = merge_file_config_into_run_config(config, file_config);
    } else {
        match config_manager.discover_and_load() {
            Ok(file_config) => {
                config = merge_file_config_into_run_config(config, file_config);
            }
            Err(e) => tracing::warn!(error = %e, "config discovery failed"),
        }
    }

    // Step 2: Apply environment variables (DA_*)
    config = apply_environment_config(config);

    // Step 3: Apply CLI arguments (highest precedence)
    config = apply_cli_args_to_config(config, args);

    Ok(config)
}

fn merge_file_config_into_run_config(mut config: RunConfig, file_config: FileConfig) -> RunConfig {
    if let Some(defaults) = file_config.defaults {
        if let Some(tld) = defaults.tld {
            config = config.with_default_tld(tld);
        }
        if let Some(input) = defaults.input {
            config = config.with_input_file(input);
        }
        if let Some(output_dir) = defaults.output_dir {
            config = config.with_output_dir(output_dir);
        }
        if let Some(chunk_size) = defaults.chunk_size {
            config = config.with_chunk_size(chunk_size);
        }
        if let Some(retry) = defaults.retry {
            config = config.with_fetch_retry(retry);
        }
    }

    if let Some(api) = file_config.api {
        if let Some(base_url) = api.base_url {
            config.api.base_url = base_url;
        }
        if let Some(preset) = api.preset {
            config.api.preset = preset;
        }
        if let Some(enable_aftermarket) = api.enable_aftermarket {
            config.api.enable_aftermarket = enable_aftermarket;
        }
        if let Some(timeout) = api.timeout.as_deref().and_then(parse_timeout_string) {
            config.api.timeout = Duration::from_secs(timeout);
        }
    }

    config
}

/// Apply `DA_*` environment variables.
///
/// Uses the library's load_env_config() for validation.
fn apply_environment_config(mut config: RunConfig) -> RunConfig {
    let env_config = load_env_config();

    if let Some(tld) = env_config.tld {
        config = config.with_default_tld(tld);
    }
    if let Some(input) = env_config.input {
        config = config.with_input_file(input);
    }
    if let Some(output_dir) = env_config.output_dir {
        config = config.with_output_dir(output_dir);
    }
    if let Some(chunk_size) = env_config.chunk_size {
        config = config.with_chunk_size(chunk_size);
    }
    if let Some(retry) = env_config.retry {
        config = config.with_fetch_retry(retry);
    }
    if let Some(base_url) = env_config.base_url {
        config.api.base_url = base_url;
    }
    if let Some(timeout) = env_config.timeout.as_deref().and_then(parse_timeout_string) {
        config.api.timeout = Duration::from_secs(timeout);
    }

    config
}

/// Apply CLI arguments to config (highest precedence).
fn apply_cli_args_to_config(mut config: RunConfig, args: &Args) -> RunConfig {
    if let Some(tld) = &args.tld {
        config = config.with_default_tld(tld.trim().trim_start_matches('.'));
    }
    if let Some(file) = &args.file {
        config = config.with_input_file(file);
    }
    if let Some(output_dir) = &args.output_dir {
        config = config.with_output_dir(output_dir);
    }
    if let Some(output) = &args.output {
        config = config.with_output_file(output);
    }
    if let Some(chunk_size) = args.chunk_size {
        config = config.with_chunk_size(chunk_size);
    }
    if let Some(retry) = args.retry {
        config = config.with_fetch_retry(retry);
    }

    config
}
