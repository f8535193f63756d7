//! StagePulse - client funnel reports for marketing agencies
//!
//! A CLI tool that loads a snapshot of clients and monthly stage
//! records, aggregates the funnel metrics and writes a dashboard report.
//!
//! Exit codes:
//!   0 - Success (no alerts at the --fail-on level, or no --fail-on set)
//!   1 - Runtime error (bad data file, unknown client, write failure, etc.)
//!   2 - Alerts raised at or above the --fail-on level

mod analysis;
mod cli;
mod config;
mod models;
mod report;
mod store;

use analysis::Status;
use anyhow::{bail, Context, Result};
use cli::{Args, FailOnLevel, OutputFormat};
use config::{Config, CONFIG_FILE};
use models::{Client, StageRecord};
use report::{Report, ReportMetadata};
use std::path::{Path, PathBuf};
use std::time::Instant;
use store::{DataStore, JsonFileStore};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration first: its verbose setting decides the log level
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(&args, &config);

    info!("StagePulse v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    source.log();

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .stagepulse.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the data file, display and projection settings.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the requested command. Returns the exit code (0 or 2).
async fn run(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    let mut store = JsonFileStore::open(&config.general.data)
        .await
        .with_context(|| format!("Failed to load data file {}", config.general.data))?;

    // Data entry commands write the snapshot back and exit
    if let Some(ref path) = args.record {
        return save_record(&mut store, path).await;
    }
    if let Some(ref id) = args.delete_record {
        store
            .delete::<StageRecord>(id)
            .with_context(|| format!("Failed to delete stage record {}", id))?;
        store.save().await.context("Failed to save data file")?;
        println!("🗑️  Deleted stage record {}", id);
        return Ok(0);
    }

    if args.list {
        print_client_list(&store);
        return Ok(0);
    }

    let snapshot = store.snapshot();
    let display = config.display.clone().with_overrides(&snapshot.settings);
    let metadata = ReportMetadata::new(&config.general.data, snapshot, display);

    // Build the report
    let report = match args.client {
        Some(ref key) => {
            let Some(client) = report::find_client(snapshot, key) else {
                bail!("No client matches '{}'. Use --list to see all clients.", key);
            };
            println!(
                "📊 Building report for {} ({})",
                client.name,
                report::stage_title(args.stage.unwrap_or(client.current_stage))
            );
            Report::Client(Box::new(report::build_client_report(
                snapshot, client, args.stage, &config, metadata,
            )))
        }
        None => {
            let squad = args.squad.as_deref();
            let Some(portfolio) = report::build_portfolio_report(snapshot, squad, metadata) else {
                bail!("No squad matches '{}'", squad.unwrap_or_default());
            };
            println!("📊 Building portfolio report: {}", portfolio.scope);
            Report::Portfolio(portfolio)
        }
    };

    // Generate and save the report
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    let output_path = Path::new(&config.general.output);
    std::fs::write(output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    let alerts = report.alerts();
    let count = |level: Status| alerts.iter().filter(|a| a.level == level).count();

    println!("\n📋 Summary:");
    match report {
        Report::Client(ref r) => {
            println!(
                "   Accumulated: {:.2} invested, {:.0} leads, {:.0} sales",
                r.accumulated.investment, r.accumulated.leads, r.accumulated.sales
            );
            if r.projection.projection.is_none() {
                println!("   Projection: not enough history");
            }
        }
        Report::Portfolio(ref r) => {
            println!(
                "   Clients: {} | Leads: {:.0} | Sales: {:.0} | Conversion: {:.1}%",
                r.clients.len(),
                r.funnel.leads,
                r.funnel.sales,
                r.conversion_rate
            );
        }
    }
    println!(
        "   Alerts: {} {} | {} {}",
        Status::Danger.emoji(),
        count(Status::Danger),
        Status::Warning.emoji(),
        count(Status::Warning)
    );
    println!("   Duration: {:.2}s", start_time.elapsed().as_secs_f64());
    println!("\n✅ Report saved to: {}", output_path.display());

    // Check --fail-on threshold
    if let Some(fail_level) = args.fail_on {
        let threshold = fail_on_to_status(fail_level);
        if alerts.iter().any(|a| a.level >= threshold) {
            eprintln!(
                "\n⛔ Alerts raised at or above {:?} level. Failing (exit code 2).",
                fail_level
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Handle --record: upsert a stage record from a JSON file.
async fn save_record(store: &mut JsonFileStore, path: &Path) -> Result<i32> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read record file {}", path.display()))?;
    let record: StageRecord = serde_json::from_str(&content)
        .with_context(|| format!("Invalid stage record in {}", path.display()))?;

    if store.get::<Client>(&record.client_id).is_none() {
        warn!("Record references unknown client '{}'", record.client_id);
    }

    let saved = store::upsert_stage_record(store, record).context("Failed to save stage record")?;
    store.save().await.context("Failed to save data file")?;

    println!(
        "💾 Saved stage {} record {} for {} ({})",
        saved.stage(),
        saved.id,
        saved.client_id,
        saved.month
    );
    Ok(0)
}

/// Handle --list: print every client with its stage and status.
fn print_client_list(store: &JsonFileStore) {
    let clients = store.list::<Client>();
    if clients.is_empty() {
        println!("No clients in {}", store.path().display());
        return;
    }

    println!("\n👥 Clients ({}):\n", clients.len());
    for client in &clients {
        let records = store.filter::<StageRecord, _>(|r| r.client_id == client.id);
        println!(
            "   {} {} [{}] - stage {}: {} ({} records)",
            client.status.emoji(),
            client.name,
            client.id,
            client.current_stage,
            analysis::stage_name(client.current_stage),
            records.len()
        );
    }
}

/// Convert FailOnLevel to Status for comparison.
fn fail_on_to_status(level: FailOnLevel) -> Status {
    match level {
        FailOnLevel::Warning => Status::Warning,
        FailOnLevel::Danger => Status::Danger,
    }
}

/// Where the configuration came from, logged once logging is up.
enum ConfigSource {
    Explicit(PathBuf),
    Default,
    Builtin,
    Invalid(String),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::Default => info!("Loaded default config from {}", CONFIG_FILE),
            ConfigSource::Builtin => debug!("No config file found, using defaults"),
            ConfigSource::Invalid(e) => warn!("Failed to load config: {}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::Default)),
        Ok(None) => Ok((Config::default(), ConfigSource::Builtin)),
        Err(e) => Ok((Config::default(), ConfigSource::Invalid(format!("{:#}", e)))),
    }
}
