//! CLI interface for simdash
//!
//! Global flags configure the backend connection and output; each
//! subcommand is one way of looking at the simulation.
//!
//! # Example
//!
//! ```bash
//! # Run a simulation with 4 datacenters and show the dashboard
//! simdash run --datacenters 4
//!
//! # Live dashboard priced for GCP, refreshed every 10 seconds
//! simdash --provider gcp watch --interval 10
//!
//! # Resolved provider rates as JSON
//! simdash pricing --json
//! ```

use clap::{Args, Parser, Subcommand};
use simdash_core::types::RunParams;
use simdash_http::{DEFAULT_API_URL, DEFAULT_PRICING_URL};

/// Terminal dashboard for cloud simulation runs
#[derive(Parser, Debug, Clone)]
#[command(name = "simdash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the simulation API
    #[arg(long, env = "SIMDASH_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// URL of the provider pricing catalog
    #[arg(long, env = "SIMDASH_PRICING_URL", default_value = DEFAULT_PRICING_URL, global = true)]
    pub pricing_url: String,

    /// Provider used for cost estimation (aws, azure, gcp, ibm, or any catalog id)
    #[arg(long, short = 'p', env = "SIMDASH_PROVIDER", default_value = "aws", global = true)]
    pub provider: String,

    /// Skip the pricing catalog and use built-in default rates
    #[arg(long, global = true)]
    pub offline: bool,

    /// Request timeout in seconds (no timeout when omitted)
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Only show warnings and errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Subcommand to execute (defaults to `show`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Simulation size parameters
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    /// Number of datacenters
    #[arg(long, default_value_t = 3)]
    pub datacenters: u32,

    /// Hosts in each datacenter
    #[arg(long, default_value_t = 5)]
    pub hosts_per_datacenter: u32,

    /// Number of virtual machines
    #[arg(long, default_value_t = 15)]
    pub vms: u32,

    /// Number of cloudlets
    #[arg(long, default_value_t = 30)]
    pub cloudlets: u32,
}

impl From<&RunArgs> for RunParams {
    fn from(args: &RunArgs) -> Self {
        Self {
            datacenters: args.datacenters,
            hosts_per_datacenter: args.hosts_per_datacenter,
            vms: args.vms,
            cloudlets: args.cloudlets,
        }
    }
}

/// Arguments for the live dashboard
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct WatchArgs {
    /// Refresh interval in seconds
    #[arg(long, default_value_t = 5)]
    pub interval: u64,

    /// Parameters used by the `run` input command
    #[command(flatten)]
    pub run: RunArgs,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a simulation, then fetch and show the dashboard
    Run(RunArgs),
    /// Fetch and show the dashboard for the last run
    Show,
    /// Live dashboard with periodic refresh and interactive commands
    Watch(WatchArgs),
    /// Show resolved provider rates and where each came from
    Pricing,
    /// Show the VM table
    Vms,
}
