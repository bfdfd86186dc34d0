//! Resolve client configuration from a YAML file, `RAMP_*` variables and
//! command-line flags, in that order of increasing precedence.

use crate::error::CliResult;
use clap::Args;
use ramp_client::{RampClient, RampConfig, RampEnvironment};
use std::path::PathBuf;

/// Flags shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// YAML configuration file
    #[arg(long, global = true, env = "RAMP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Use the Ramp sandbox (demo-api.ramp.com)
    #[arg(long, global = true)]
    pub sandbox: bool,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Enable debug logging (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Configuration after file, environment, and flag overrides.
    pub fn load_config(&self) -> CliResult<RampConfig> {
        let mut config = match &self.config {
            Some(path) => RampConfig::from_file(path)?,
            None => RampConfig::from_env()?,
        };
        self.apply_flags(&mut config);
        Ok(config)
    }

    fn apply_flags(&self, config: &mut RampConfig) {
        if self.sandbox {
            config.environment = RampEnvironment::Sandbox;
        }
        if let Some(url) = &self.base_url {
            config.base_url = Some(url.clone());
        }
    }

    pub fn client(&self) -> CliResult<RampClient> {
        let config = self.load_config()?;
        tracing::debug!(base_url = %config.resolved_base_url(), "Using Ramp API");
        Ok(RampClient::new(&config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "environment: production").unwrap();
        writeln!(file, "access_token: file-token").unwrap();

        let args = GlobalArgs {
            config: Some(file.path().to_path_buf()),
            sandbox: true,
            base_url: None,
            verbose: false,
        };
        let config = args.load_config().unwrap();
        assert_eq!(config.environment, RampEnvironment::Sandbox);
        assert_eq!(
            config.resolved_base_url(),
            "https://demo-api.ramp.com/developer/v1"
        );
    }

    #[test]
    fn test_base_url_flag_wins_over_environment() {
        let mut config = RampConfig::default();
        let args = GlobalArgs {
            sandbox: true,
            base_url: Some("http://localhost:8080/developer/v1/".to_string()),
            ..GlobalArgs::default()
        };
        args.apply_flags(&mut config);
        assert_eq!(
            config.resolved_base_url(),
            "http://localhost:8080/developer/v1"
        );
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        let args = GlobalArgs {
            config: Some(PathBuf::from("/nonexistent/ramp.yaml")),
            ..GlobalArgs::default()
        };
        let err = args.load_config().unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
