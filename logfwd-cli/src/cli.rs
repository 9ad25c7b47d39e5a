//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::fmt;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// logfwd -- forward log lines as schema-encoded containers.
///
/// Use `logfwd <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "logfwd", version, about, long_about = None)]
pub struct Cli {
    /// Path to the logfwd.toml configuration file.
    ///
    /// When omitted, `logfwd.toml` in the working directory is used if present,
    /// otherwise built-in defaults plus `LOGFWD_*` environment overrides.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Override log format.
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Report output format.
    #[arg(long, global = true, default_value = "text")]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported report output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Supported log formats (logs always go to stderr).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// JSON lines.
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Pretty => f.write_str("pretty"),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serialize log lines and write them as length-delimited frames.
    Send(SendArgs),

    /// Print the contents of a frame stream.
    Inspect(InspectArgs),

    /// Load a schema configuration and report how lines would be handled.
    Check(CheckArgs),
}

/// Mismatch policy as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MismatchArg {
    /// Send the original line when it cannot be encoded.
    Fallback,
    /// Reject the line.
    Fail,
}

// ---- send ----

/// Serialize lines from stdin (or a single message) and emit frames.
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Send a single message instead of reading stdin.
    #[arg(short, long)]
    pub message: Option<String>,

    /// Schema configuration file (relative paths resolve against the config dir).
    #[arg(short, long)]
    pub schema: Option<String>,

    /// Destination in `topic[:partition]` form.
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Message key.
    #[arg(short, long)]
    pub key: Option<String>,

    /// Frame output path (`-` for stdout).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Treat unparseable field values as line failures.
    #[arg(long)]
    pub strict: bool,

    /// What to do with lines that cannot be encoded.
    #[arg(long)]
    pub on_mismatch: Option<MismatchArg>,
}

// ---- inspect ----

/// Decode a frame stream produced by `send`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Frame stream file (`-` for stdin).
    pub path: String,
}

// ---- check ----

/// Validate a schema configuration file.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema configuration file (relative paths resolve against the config dir).
    pub path: String,

    /// Sample line to run through the configured engine.
    #[arg(long)]
    pub sample: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_send_defaults() {
        let cli = Cli::try_parse_from(["logfwd", "send"]).expect("parse succeeded");
        assert!(cli.config.is_none(), "config should default to None");
        assert_eq!(cli.output_format, OutputFormat::Text);
        match cli.command {
            Commands::Send(args) => {
                assert!(args.message.is_none());
                assert!(args.schema.is_none());
                assert!(!args.strict, "strict should default to false");
                assert!(args.on_mismatch.is_none());
            }
            _ => panic!("expected Send command"),
        }
    }

    #[test]
    fn test_cli_parse_send_full() {
        let cli = Cli::try_parse_from([
            "logfwd",
            "send",
            "-m",
            "200 GET",
            "--schema",
            "access.avsc",
            "--topic",
            "access:3",
            "--key",
            "web-01",
            "--output",
            "/tmp/frames.bin",
            "--strict",
            "--on-mismatch",
            "fail",
        ])
        .expect("parse succeeded");
        match cli.command {
            Commands::Send(args) => {
                assert_eq!(args.message.as_deref(), Some("200 GET"));
                assert_eq!(args.schema.as_deref(), Some("access.avsc"));
                assert_eq!(args.topic.as_deref(), Some("access:3"));
                assert_eq!(args.key.as_deref(), Some("web-01"));
                assert_eq!(args.output.as_deref(), Some("/tmp/frames.bin"));
                assert!(args.strict);
                assert_eq!(args.on_mismatch, Some(MismatchArg::Fail));
            }
            _ => panic!("expected Send command"),
        }
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "logfwd",
            "inspect",
            "frames.bin",
            "--output-format",
            "json",
            "--log-format",
            "pretty",
            "-c",
            "/etc/logfwd/logfwd.toml",
        ])
        .expect("parse succeeded");
        assert_eq!(cli.output_format, OutputFormat::Json);
        assert_eq!(cli.log_format, Some(LogFormat::Pretty));
        assert_eq!(
            cli.config,
            Some(PathBuf::from("/etc/logfwd/logfwd.toml"))
        );
        match cli.command {
            Commands::Inspect(args) => assert_eq!(args.path, "frames.bin"),
            _ => panic!("expected Inspect command"),
        }
    }

    #[test]
    fn test_cli_parse_check_with_sample() {
        let cli = Cli::try_parse_from(["logfwd", "check", "access.avsc", "--sample", "200 GET"])
            .expect("parse succeeded");
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.path, "access.avsc");
                assert_eq!(args.sample.as_deref(), Some("200 GET"));
            }
            _ => panic!("expected Check command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_mismatch_policy() {
        let result = Cli::try_parse_from(["logfwd", "send", "--on-mismatch", "drop"]);
        assert!(result.is_err(), "unknown policy should be rejected");
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["logfwd"]).is_err());
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_format_display() {
        assert_eq!(LogFormat::Json.to_string(), "json");
        assert_eq!(LogFormat::Pretty.to_string(), "pretty");
    }
}
