//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.stagepulse.toml` files, and folding persisted display settings
//! into a typed struct once per run.

use crate::models::Setting;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".stagepulse.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Display settings (theme, language, chart type).
    #[serde(default)]
    pub display: DisplaySettings,

    /// Projection settings.
    #[serde(default)]
    pub projection: ProjectionConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Data snapshot file.
    #[serde(default = "default_data")]
    pub data: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            data: default_data(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "stagepulse_report.md".to_string()
}

fn default_data() -> String {
    "stagepulse.json".to_string()
}

/// Chart style used by dashboards rendering the report data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Bar,
    Area,
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "line" => Ok(ChartType::Line),
            "bar" => Ok(ChartType::Bar),
            "area" => Ok(ChartType::Area),
            other => Err(format!("unknown chart type '{}'", other)),
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartType::Line => write!(f, "line"),
            ChartType::Bar => write!(f, "bar"),
            ChartType::Area => write!(f, "area"),
        }
    }
}

/// Theme, language and chart preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_theme_color")]
    pub theme_color: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub chart_type: ChartType,

    #[serde(default)]
    pub logo_url: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            theme_color: default_theme_color(),
            language: default_language(),
            chart_type: ChartType::default(),
            logo_url: String::new(),
        }
    }
}

fn default_theme_color() -> String {
    "purple".to_string()
}

fn default_language() -> String {
    "pt-BR".to_string()
}

impl DisplaySettings {
    /// Apply persisted key/value settings on top of these values.
    ///
    /// Unknown keys are skipped; an invalid chart type keeps the current one.
    pub fn with_overrides(mut self, settings: &[Setting]) -> Self {
        for setting in settings {
            let value = setting.setting_value.trim();
            match setting.setting_key.as_str() {
                "theme_color" => self.theme_color = value.to_string(),
                "language" => self.language = value.to_string(),
                "logo_url" => self.logo_url = value.to_string(),
                "chart_type" => match value.parse() {
                    Ok(chart_type) => self.chart_type = chart_type,
                    Err(e) => warn!("Ignoring chart_type setting: {}", e),
                },
                other => debug!("Ignoring unknown setting '{}'", other),
            }
        }
        self
    }
}

/// Projection simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Months of history averaged for the baseline.
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Simulated investment increase, in percent.
    #[serde(default = "default_increase_percent")]
    pub increase_percent: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            increase_percent: default_increase_percent(),
        }
    }
}

fn default_window_size() -> usize {
    crate::analysis::DEFAULT_WINDOW
}

fn default_increase_percent() -> f64 {
    20.0
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the alerts section.
    #[serde(default = "default_true")]
    pub include_alerts: bool,

    /// Include month-by-month history tables.
    #[serde(default = "default_true")]
    pub include_history: bool,

    /// Include stage objectives.
    #[serde(default = "default_true")]
    pub include_objectives: bool,

    /// Compare the client against its sector.
    #[serde(default = "default_true")]
    pub include_sector_benchmark: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_alerts: true,
            include_history: true,
            include_objectives: true,
            include_sector_benchmark: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided values override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(ref data) = args.data {
            self.general.data = data.display().to_string();
        }
        if let Some(window) = args.window {
            self.projection.window_size = window;
        }
        if let Some(increase) = args.increase {
            self.projection.increase_percent = increase;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(key: &str, value: &str) -> Setting {
        Setting {
            id: String::new(),
            setting_key: key.to_string(),
            setting_value: value.to_string(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.display.theme_color, "purple");
        assert_eq!(config.display.language, "pt-BR");
        assert_eq!(config.display.chart_type, ChartType::Line);
        assert_eq!(config.projection.window_size, 3);
        assert_eq!(config.projection.increase_percent, 20.0);
        assert!(config.report.include_alerts);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "march.md"
verbose = true

[display]
chart_type = "area"

[projection]
window_size = 6
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "march.md");
        assert_eq!(config.general.data, "stagepulse.json");
        assert!(config.general.verbose);
        assert_eq!(config.display.chart_type, ChartType::Area);
        assert_eq!(config.display.theme_color, "purple");
        assert_eq!(config.projection.window_size, 6);
        assert_eq!(config.projection.increase_percent, 20.0);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[display]"));
        assert!(toml_str.contains("[projection]"));
        assert!(toml_str.contains("[report]"));
    }

    #[test]
    fn test_display_overrides() {
        let display = DisplaySettings::default().with_overrides(&[
            setting("chart_type", "Bar"),
            setting("language", "en-US"),
            setting("theme_color", "green"),
            setting("sidebar", "collapsed"),
        ]);

        assert_eq!(display.chart_type, ChartType::Bar);
        assert_eq!(display.language, "en-US");
        assert_eq!(display.theme_color, "green");
    }

    #[test]
    fn test_invalid_chart_type_keeps_current() {
        let display = DisplaySettings::default().with_overrides(&[setting("chart_type", "pie")]);
        assert_eq!(display.chart_type, ChartType::Line);
    }
}
