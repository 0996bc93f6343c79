//! Validated runtime configuration

use crate::cli::{Cli, Command};
use reqwest::Url;
use simdash_core::error::{Result, SimdashError};
use simdash_core::types::ProviderId;
use std::time::Duration;

/// Refresh interval used when no `watch` command sets one
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Settings derived from the command line and environment
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub api_url: Url,
    pub pricing_url: Url,
    pub provider: ProviderId,
    pub offline: bool,
    pub timeout: Option<Duration>,
    pub interval: Duration,
    pub json: bool,
}

impl DashboardConfig {
    /// Validate CLI values
    ///
    /// # Errors
    ///
    /// Returns [`SimdashError::Config`] for a URL that does not parse or is
    /// not http(s), an empty provider id, or a zero timeout or interval.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let api_url = parse_url("--api-url", &cli.api_url)?;
        let pricing_url = parse_url("--pricing-url", &cli.pricing_url)?;

        let provider = cli.provider.trim();
        if provider.is_empty() {
            return Err(SimdashError::Config(
                "--provider must not be empty".to_string(),
            ));
        }

        let timeout = match cli.timeout {
            Some(0) => {
                return Err(SimdashError::Config(
                    "--timeout must be at least 1 second".to_string(),
                ));
            }
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        let interval = match &cli.command {
            Some(Command::Watch(args)) if args.interval == 0 => {
                return Err(SimdashError::Config(
                    "--interval must be at least 1 second".to_string(),
                ));
            }
            Some(Command::Watch(args)) => Duration::from_secs(args.interval),
            _ => DEFAULT_INTERVAL,
        };

        Ok(Self {
            api_url,
            pricing_url,
            provider: ProviderId::new(provider),
            offline: cli.offline,
            timeout,
            interval,
            json: cli.json,
        })
    }
}

fn parse_url(flag: &str, raw: &str) -> Result<Url> {
    let url =
        Url::parse(raw).map_err(|e| SimdashError::Config(format!("{flag} '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SimdashError::Config(format!(
            "{flag} '{raw}': unsupported scheme {other}"
        ))),
    }
}

/// Whether table output should be colored
///
/// Off when `NO_COLOR` is set (any value) or stdout is not a terminal.
pub fn color_enabled(no_color_set: bool, stdout_is_terminal: bool) -> bool {
    !no_color_set && stdout_is_terminal
}
