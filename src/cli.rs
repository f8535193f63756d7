//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// StagePulse - client funnel reports for marketing agencies
///
/// Reads a snapshot of clients and monthly stage records, aggregates the
/// funnel metrics and writes a Markdown or JSON dashboard report.
///
/// Examples:
///   stagepulse --data agency.json
///   stagepulse --data agency.json --client client-fitlife --increase 30
///   stagepulse --data agency.json --squad Alpha --format json -o alpha.json
///   stagepulse --data agency.json --record march.json
///   stagepulse --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Data snapshot file (JSON)
    ///
    /// Defaults to the [general] data entry of the config, or stagepulse.json.
    #[arg(short, long, value_name = "FILE", env = "STAGEPULSE_DATA")]
    pub data: Option<PathBuf>,

    /// Client to report on, by id or name
    ///
    /// Without it a portfolio report over all clients is generated.
    #[arg(long, value_name = "CLIENT")]
    pub client: Option<String>,

    /// Stage to report on (defaults to the client's current stage)
    #[arg(long, value_name = "STAGE", value_parser = clap::value_parser!(u8).range(1..=6))]
    pub stage: Option<u8>,

    /// Restrict the portfolio report to one squad (by id or name)
    #[arg(long, value_name = "SQUAD", conflicts_with = "client")]
    pub squad: Option<String>,

    /// Simulated investment increase for the projection, in percent
    #[arg(long, value_name = "PCT")]
    pub increase: Option<f64>,

    /// Months of history averaged for the projection
    #[arg(long, value_name = "MONTHS")]
    pub window: Option<usize>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .stagepulse.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Fail if alerts at or above this level are raised
    ///
    /// Exit code 2 when the threshold is reached. Values: warning, danger
    #[arg(long, value_name = "LEVEL")]
    pub fail_on: Option<FailOnLevel>,

    /// List clients with their stage and status, then exit
    #[arg(long)]
    pub list: bool,

    /// Save a stage record from a JSON file into the data snapshot
    ///
    /// A record for the same client, stage and month is replaced.
    #[arg(long, value_name = "FILE", conflicts_with = "delete_record")]
    pub record: Option<PathBuf>,

    /// Delete a stage record by id from the data snapshot
    #[arg(long, value_name = "ID")]
    pub delete_record: Option<String>,

    /// Generate a default .stagepulse.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Alert level for --fail-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum FailOnLevel {
    Warning,
    Danger,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(increase) = self.increase {
            if !(0.0..=100.0).contains(&increase) {
                return Err("Investment increase must be between 0 and 100 percent".to_string());
            }
        }

        if self.window == Some(0) {
            return Err("Projection window must be at least 1 month".to_string());
        }

        if self.stage.is_some() && self.client.is_none() {
            return Err("--stage requires --client".to_string());
        }

        if let Some(ref record) = self.record {
            if !record.is_file() {
                return Err(format!("Record file does not exist: {}", record.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `[general] verbose` config entry; `--quiet`
    /// still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            data: Some(PathBuf::from("agency.json")),
            client: None,
            stage: None,
            squad: None,
            increase: None,
            window: None,
            output: None,
            format: OutputFormat::Markdown,
            config: None,
            verbose: false,
            quiet: false,
            fail_on: None,
            list: false,
            record: None,
            delete_record: None,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_accepts_defaults() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_increase_range() {
        let mut args = make_args();
        args.increase = Some(150.0);
        assert!(args.validate().is_err());

        args.increase = Some(0.0);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_window() {
        let mut args = make_args();
        args.window = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_stage_requires_client() {
        let mut args = make_args();
        args.stage = Some(3);
        assert!(args.validate().is_err());

        args.client = Some("client-fitlife".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "stagepulse",
            "--client",
            "c1",
            "--stage",
            "3",
            "--format",
            "json",
            "--fail-on",
            "danger",
        ])
        .unwrap();

        assert_eq!(args.stage, Some(3));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.fail_on, Some(FailOnLevel::Danger));
        assert!(Args::try_parse_from(["stagepulse", "--stage", "9"]).is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_level_from_config_verbose() {
        let mut args = make_args();
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
