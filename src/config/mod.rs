//! Settings for the inkpress CLI, layered as default file → local file →
//! `--config-file` → `INKPRESS__*` environment → command-line flags.

mod cli;

use std::{num::NonZeroUsize, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::domain::summary::DEFAULT_SUMMARY_LENGTH;

pub use cli::{
    CliArgs, Command, LoggingOverrides, OutputFormat, RenderArgs, SummaryArgs, ValidateArgs,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "inkpress";
const ENV_PREFIX: &str = "INKPRESS";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub render: RenderSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Site root for autolinks, without a trailing slash. Empty yields
    /// root-relative links.
    pub base_url: String,
    pub summary_max_length: NonZeroUsize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Merge every configuration layer for `cli` and validate the result.
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_logging_overrides(&cli.logging);
    match &cli.command {
        Command::Render(args) => raw.apply_render_overrides(args),
        Command::Summary(args) => raw.apply_summary_overrides(args),
        Command::Validate(_) => {}
    }

    Settings::from_raw(raw)
}

/// Parse the process arguments and resolve settings for them.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    render: RawRenderSettings,
}

impl RawSettings {
    fn apply_logging_overrides(&mut self, overrides: &LoggingOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }

    fn apply_render_overrides(&mut self, args: &RenderArgs) {
        if let Some(base_url) = args.base_url.as_ref() {
            self.render.base_url = Some(base_url.clone());
        }
    }

    fn apply_summary_overrides(&mut self, args: &SummaryArgs) {
        if let Some(max_length) = args.max_length {
            self.render.summary_max_length = Some(max_length);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings { logging, render } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            render: build_render_settings(render)?,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_render_settings(render: RawRenderSettings) -> Result<RenderSettings, LoadError> {
    let base_url = render
        .base_url
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .unwrap_or_default();
    if !base_url.is_empty()
        && !(base_url.starts_with("http://")
            || base_url.starts_with("https://")
            || base_url.starts_with('/'))
    {
        return Err(LoadError::invalid(
            "render.base_url",
            "must be an http(s) URL or a root-relative path",
        ));
    }

    let max_length = match render.summary_max_length {
        Some(value) => usize::try_from(value).map_err(|_| {
            LoadError::invalid(
                "render.summary_max_length",
                "value exceeds supported range for usize",
            )
        })?,
        None => DEFAULT_SUMMARY_LENGTH,
    };
    let summary_max_length = NonZeroUsize::new(max_length).ok_or_else(|| {
        LoadError::invalid("render.summary_max_length", "must be greater than zero")
    })?;

    Ok(RenderSettings {
        base_url,
        summary_max_length,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    base_url: Option<String>,
    summary_max_length: Option<u64>,
}
