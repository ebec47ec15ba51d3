//! # vhr-cli -- Command-line front end
//!
//! ## Subcommands
//!
//! - `vhr validate <VIN>` -- print the normalized VIN or the rejection.
//! - `vhr status <JOB_ID>` -- query a job once and print the status as JSON.
//! - `vhr generate <VIN>` -- run the full generation, streaming progress to
//!   stderr and printing the report as JSON on stdout. Ctrl-C cancels.
//!
//! Backend connection flags fall back to `VHR_API_URL`, `VHR_API_TOKEN`
//! and `VHR_TIMEOUT_SECS`.

pub mod generate;
pub mod status;
pub mod validate;

use clap::Args;
use vhr_client::config::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use vhr_client::ReportApiConfig;

/// Exit code for a run interrupted by Ctrl-C.
pub const EXIT_CANCELLED: u8 = 130;

/// Backend connection options shared by networked subcommands.
#[derive(Args, Debug, Clone)]
pub struct ApiArgs {
    /// Base URL of the report backend.
    #[arg(long, env = "VHR_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Bearer token attached to every request.
    #[arg(long, env = "VHR_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "VHR_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl ApiArgs {
    pub fn client_config(&self) -> anyhow::Result<ReportApiConfig> {
        let mut config = ReportApiConfig::new(&self.api_url)?;
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            config = config.with_token(token);
        }
        config.timeout_secs = self.timeout_secs;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(api_url: &str, token: Option<&str>) -> ApiArgs {
        ApiArgs {
            api_url: api_url.into(),
            token: token.map(str::to_string),
            timeout_secs: 15,
        }
    }

    #[test]
    fn builds_client_config() {
        let config = args("https://reports.example.com", Some("t0k3n"))
            .client_config()
            .unwrap();
        assert_eq!(config.base_url.as_str(), "https://reports.example.com/");
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.api_token.as_deref().map(String::as_str), Some("t0k3n"));
    }

    #[test]
    fn empty_token_is_ignored() {
        let config = args("http://localhost:8000", Some("")).client_config().unwrap();
        assert!(config.api_token.is_none());
    }

    #[test]
    fn bad_url_is_an_error() {
        assert!(args("localhost", None).client_config().is_err());
    }
}
