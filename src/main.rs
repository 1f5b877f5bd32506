use clap::{Parser, ValueEnum};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use env_logger::Env;
use log::{info, LevelFilter};
use std::path::PathBuf;

use fleetplan::config_loader;
use fleetplan::orchestrator::{self, ManifestFormat};

/// Deterministic subnet, address and firewall planning for simulated device fleets
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the fleet configuration YAML file
    #[arg(short, long, required_unless_present = "example_config")]
    config: Option<PathBuf>,

    /// Output directory for the provisioning manifest and inventory
    #[arg(short, long, default_value = "plan_output")]
    output: PathBuf,

    /// Provisioning manifest format
    #[arg(long, value_enum, default_value_t = FormatArg::Yaml)]
    format: FormatArg,

    /// Allocate and verify, print a summary, write nothing
    #[arg(long)]
    dry_run: bool,

    /// Print an example configuration and exit
    #[arg(long)]
    example_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Yaml,
    Json,
}

impl From<FormatArg> for ManifestFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Yaml => ManifestFormat::Yaml,
            FormatArg::Json => ManifestFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    if args.example_config {
        print!("{}", config_loader::example_config_yaml()?);
        return Ok(());
    }

    let config_path = args
        .config
        .ok_or_else(|| eyre!("--config is required"))?;

    // Initialize logging before anything is loaded
    let env_override = init_logging();

    info!("Starting fleetplan");
    info!("Configuration file: {:?}", config_path);

    let config = config_loader::load_config(&config_path)?;

    // RUST_LOG wins over the file's log level
    if !env_override {
        log::set_max_level(parse_log_level(config.log_level()));
    }

    let plan = orchestrator::build_plan(&config)?;

    if args.dry_run {
        println!("{}", orchestrator::summarize(&plan));
        info!("Dry run: nothing written");
        return Ok(());
    }

    info!("Output directory: {:?}", args.output);
    let outputs = orchestrator::write_plan(&plan, &args.output, args.format.into())?;

    info!("{}", orchestrator::summarize(&plan));
    info!("Provisioning manifest ready at {:?}", outputs.manifest);
    info!("Connection guide ready at {:?}", outputs.connections);
    Ok(())
}

/// Install the logger at `info` until the configured level is known.
///
/// Returns whether RUST_LOG is set, in which case its filter stays in charge.
fn init_logging() -> bool {
    let env_override = std::env::var_os(env_logger::DEFAULT_FILTER_ENV).is_some();

    // The logger itself passes everything; `log::set_max_level` does the filtering.
    env_logger::Builder::from_env(Env::default().default_filter_or("trace")).init();

    if !env_override {
        log::set_max_level(LevelFilter::Info);
    }
    env_override
}

fn parse_log_level(level: &str) -> LevelFilter {
    level.parse().unwrap_or(LevelFilter::Info)
}
