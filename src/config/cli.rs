use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the inkpress binary.
#[derive(Debug, Parser)]
#[command(
    name = "inkpress",
    version,
    about = "Render writeup Markdown into sanitized HTML"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "INKPRESS_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub logging: LoggingOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render a Markdown file to HTML.
    Render(RenderArgs),
    /// Check a Markdown file against the content rules.
    Validate(ValidateArgs),
    /// Print a plain-text summary of a Markdown file.
    Summary(SummaryArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct LoggingOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// Markdown file to render; `-` reads standard input.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Override the site root used for `[[ctf:…]]` and `[[writeup:…]]` links.
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,
}

#[derive(Debug, Args, Clone)]
pub struct ValidateArgs {
    /// Markdown file to check; `-` reads standard input.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    /// Markdown file to summarise; `-` reads standard input.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Override the maximum summary length in characters.
    #[arg(long = "max-length", value_name = "CHARS")]
    pub max_length: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Sanitized HTML only.
    #[default]
    Html,
    /// The full render result as JSON.
    Json,
}
