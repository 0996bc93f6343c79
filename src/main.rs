//! simdash - Terminal dashboard and cost estimator for cloud simulation runs

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use simdash::{
    cli::{Cli, Command},
    config::{DashboardConfig, color_enabled},
    exit_code,
    live_monitor::LiveMonitor,
    synchronizer::ViewSynchronizer,
};
use simdash_core::{Result, SimulationApi, SyncOutcome, types::RunParams};
use simdash_http::HttpSimulationApi;
use simdash_pricing::{PricingFetcher, PricingTable, default_rates};
use simdash_terminal::{FramePresenter, OutputFormatter, get_formatter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Dashboard = ViewSynchronizer<HttpSimulationApi, FramePresenter>;

fn build_dashboard(
    api: Arc<HttpSimulationApi>,
    config: &DashboardConfig,
) -> Result<(Dashboard, Arc<FramePresenter>)> {
    let presenter = Arc::new(FramePresenter::new());
    let synchronizer = ViewSynchronizer::new(
        api,
        Arc::clone(&presenter),
        PricingTable::new(default_rates()?),
        config.provider.clone(),
    )
    .with_pricing_fetcher(PricingFetcher::new(config.offline));
    Ok((synchronizer, presenter))
}

fn print_frame(presenter: &FramePresenter, formatter: &dyn OutputFormatter, outcome: &SyncOutcome) {
    if outcome.is_stale() {
        warn!("Dashboard may be stale: {}", outcome);
    }
    println!("{}", formatter.format_frame(&presenter.snapshot()));
}

fn run_spinner(params: &RunParams) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")
    {
        pb.set_style(style);
    }
    pb.set_message(format!(
        "Running simulation ({} datacenters, {} VMs, {} cloudlets)",
        params.datacenters, params.vms, params.cloudlets
    ));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. The --quiet flag overrides RUST_LOG.
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("warn")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new("simdash=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("simdash=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = DashboardConfig::from_cli(&cli)?;
    let stdout_is_terminal = is_terminal::is_terminal(std::io::stdout());
    let colored_output = color_enabled(std::env::var_os("NO_COLOR").is_some(), stdout_is_terminal);
    let formatter = get_formatter(config.json, colored_output);

    let api = Arc::new(HttpSimulationApi::new(
        config.api_url.clone(),
        config.pricing_url.clone(),
        config.timeout,
    )?);
    info!("Using simulation API at {}", config.api_url);

    match cli.command.clone().unwrap_or(Command::Show) {
        Command::Show => {
            let (synchronizer, presenter) = build_dashboard(api, &config)?;
            let outcome = synchronizer.start().await;
            print_frame(&presenter, formatter.as_ref(), &outcome);
            if let Some(code) = exit_code(&outcome) {
                std::process::exit(code);
            }
        }

        Command::Run(args) => {
            let params = RunParams::from(&args);
            let (synchronizer, presenter) = build_dashboard(api, &config)?;
            synchronizer.load_pricing().await?;

            let spinner = (!config.json && stdout_is_terminal).then(|| run_spinner(&params));
            let outcome = synchronizer.run_simulation(params).await;
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }

            print_frame(&presenter, formatter.as_ref(), &outcome);
            if let Some(code) = exit_code(&outcome) {
                std::process::exit(code);
            }
        }

        Command::Watch(args) => {
            info!("Starting live monitoring mode");
            let (synchronizer, presenter) = build_dashboard(api, &config)?;
            let monitor = LiveMonitor::new(
                Arc::new(synchronizer),
                presenter,
                formatter,
                config.json,
                config.interval,
                RunParams::from(&args.run),
            );
            monitor.run().await?;
        }

        Command::Pricing => {
            let loaded = PricingFetcher::new(config.offline).load(api.as_ref()).await?;
            if loaded.fell_back() {
                warn!("Pricing catalog unavailable, showing embedded defaults");
            }
            println!("{}", formatter.format_pricing(&loaded.table.entries()));
        }

        Command::Vms => {
            let vms = api.vm_stats().await?;
            info!("Loaded {} VMs", vms.len());
            println!("{}", formatter.format_vms(&vms));
        }
    }

    Ok(())
}
