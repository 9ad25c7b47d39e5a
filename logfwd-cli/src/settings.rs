//! Effective configuration for a CLI run
//!
//! Resolution order: explicit `--config` file, then `logfwd.toml` in the
//! working directory, then built-in defaults. `LOGFWD_*` environment
//! overrides apply in every case; `--log-level` / `--log-format` apply last.

use std::path::{Path, PathBuf};

use tracing::debug;

use logfwd_core::config::LogfwdConfig;

use crate::cli::Cli;
use crate::error::CliError;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "logfwd.toml";

/// Load the effective configuration for `cli`.
///
/// # Errors
///
/// Returns `CliError::Core` when an explicit config file is missing or
/// malformed, and `CliError::Config` when a flag override is invalid.
pub async fn load(cli: &Cli) -> Result<LogfwdConfig, CliError> {
    let mut config = match config_path(cli.config.as_deref()) {
        Some(path) => LogfwdConfig::load(&path).await?,
        None => {
            let mut config = LogfwdConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            config
        }
    };

    apply_flag_overrides(&mut config, cli)?;
    Ok(config)
}

/// Config file to load, if any.
fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.is_file() {
        debug!(path = %local.display(), "using config from working directory");
        Some(local)
    } else {
        None
    }
}

/// Apply `--log-level` / `--log-format` on top of the loaded config.
pub fn apply_flag_overrides(config: &mut LogfwdConfig, cli: &Cli) -> Result<(), CliError> {
    if let Some(level) = &cli.log_level {
        config.general.log_level = level.to_lowercase();
    }
    if let Some(format) = cli.log_format {
        config.general.log_format = format.to_string();
    }
    config
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn flag_overrides_replace_general_section() {
        let cli = Cli::parse_from([
            "logfwd",
            "--log-level",
            "DEBUG",
            "--log-format",
            "pretty",
            "inspect",
            "-",
        ]);
        let mut config = LogfwdConfig::default();
        apply_flag_overrides(&mut config, &cli).unwrap();

        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.log_format, "pretty");
    }

    #[test]
    fn invalid_log_level_flag_is_config_error() {
        let cli = Cli::parse_from(["logfwd", "--log-level", "loud", "inspect", "-"]);
        let mut config = LogfwdConfig::default();
        let err = apply_flag_overrides(&mut config, &cli).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn explicit_path_wins() {
        let path = config_path(Some(Path::new("/tmp/custom.toml")));
        assert_eq!(path, Some(PathBuf::from("/tmp/custom.toml")));
    }

    #[tokio::test]
    async fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logfwd.toml");
        std::fs::write(
            &path,
            "[transport]\ntopic = \"access:3\"\n\n[serializer]\non_mismatch = \"fail\"\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "logfwd",
            "--config",
            path.to_str().unwrap(),
            "inspect",
            "-",
        ]);
        let config = load(&cli).await.unwrap();
        assert_eq!(config.transport.topic, "access:3");
        assert_eq!(config.serializer.on_mismatch, "fail");
    }

    #[tokio::test]
    async fn missing_explicit_file_is_config_error() {
        let cli = Cli::parse_from([
            "logfwd",
            "--config",
            "/nonexistent/logfwd.toml",
            "inspect",
            "-",
        ]);
        let err = load(&cli).await.unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
