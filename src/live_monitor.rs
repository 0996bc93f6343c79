//! Live dashboard
//!
//! Refreshes on a fixed interval and accepts line commands on stdin:
//!
//! | input | action |
//! |---|---|
//! | `run` | trigger a simulation run, then refresh |
//! | `provider <id>` | switch the priced provider (cost view only) |
//! | `refresh` | refetch statistics |
//! | `pricing reload` | refetch the pricing catalog |
//! | `quit` | exit |
//!
//! Triggers run as spawned tasks so a slow backend never blocks input. Their
//! outcomes come back over a channel and each one redraws the screen.

use crate::synchronizer::ViewSynchronizer;
use chrono::Local;
use console::Term;
use simdash_core::api::SimulationApi;
use simdash_core::error::{Result, SimdashError};
use simdash_core::presenter::SyncOutcome;
use simdash_core::types::{ProviderId, RunParams};
use simdash_terminal::{FramePresenter, OutputFormatter};
use std::io;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, warn};

const COMMAND_HELP: &str = "Commands: run | provider <id> | refresh | pricing reload | quit";

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorCommand {
    Run,
    Provider(ProviderId),
    Refresh,
    ReloadPricing,
    Quit,
}

impl FromStr for MonitorCommand {
    type Err = SimdashError;

    fn from_str(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            ["run"] => Ok(Self::Run),
            ["refresh"] => Ok(Self::Refresh),
            ["quit"] | ["exit"] | ["q"] => Ok(Self::Quit),
            ["pricing", "reload"] => Ok(Self::ReloadPricing),
            ["provider", id] => Ok(Self::Provider(ProviderId::new(*id))),
            ["provider"] => Err(SimdashError::InvalidArgument(
                "provider needs an id, e.g. `provider gcp`".to_string(),
            )),
            _ => Err(SimdashError::InvalidArgument(format!(
                "unknown command '{}'",
                line.trim()
            ))),
        }
    }
}

/// What one stdin read asks the monitor to do
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Closed,
    Blank,
    Command(MonitorCommand),
    /// Unusable line; keep reading
    Rejected(String),
    /// stdin failed; stop reading it
    Lost(String),
}

impl Input {
    fn from_read(read: io::Result<Option<String>>) -> Self {
        match read {
            Ok(None) => Self::Closed,
            Ok(Some(line)) if line.trim().is_empty() => Self::Blank,
            Ok(Some(line)) => match line.parse::<MonitorCommand>() {
                Ok(command) => Self::Command(command),
                Err(e) => Self::Rejected(e.to_string()),
            },
            // The offending bytes are consumed, so the next line is readable
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                Self::Rejected(format!("could not read input: {e}"))
            }
            Err(e) => Self::Lost(format!("stdin unavailable: {e}")),
        }
    }
}

/// Live monitoring state
pub struct LiveMonitor<A> {
    synchronizer: Arc<ViewSynchronizer<A, FramePresenter>>,
    presenter: Arc<FramePresenter>,
    formatter: Box<dyn OutputFormatter>,
    json_output: bool,
    interval: Duration,
    run_params: RunParams,
}

impl<A> LiveMonitor<A>
where
    A: SimulationApi + 'static,
{
    pub fn new(
        synchronizer: Arc<ViewSynchronizer<A, FramePresenter>>,
        presenter: Arc<FramePresenter>,
        formatter: Box<dyn OutputFormatter>,
        json_output: bool,
        interval: Duration,
        run_params: RunParams,
    ) -> Self {
        Self {
            synchronizer,
            presenter,
            formatter,
            json_output,
            interval,
            run_params,
        }
    }

    /// Start the live monitoring loop
    pub async fn run(self) -> Result<()> {
        let (tx, mut rx) = mpsc::channel::<SyncOutcome>(16);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Pricing first, then the first fetch
        let synchronizer = Arc::clone(&self.synchronizer);
        let startup_tx = tx.clone();
        tokio::spawn(async move {
            let _ = startup_tx.send(synchronizer.start().await).await;
        });

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.spawn_trigger(MonitorCommand::Refresh, &tx);
                }
                Some(outcome) = rx.recv() => {
                    debug!("Trigger finished: {}", outcome);
                    self.redraw(None)?;
                }
                line = lines.next_line(), if stdin_open => {
                    match Input::from_read(line) {
                        Input::Closed => {
                            debug!("stdin closed, interval refresh only");
                            stdin_open = false;
                        }
                        Input::Blank => {}
                        Input::Command(MonitorCommand::Quit) => break,
                        Input::Command(command) => self.spawn_trigger(command, &tx),
                        Input::Rejected(notice) => {
                            warn!("{}", notice);
                            self.redraw(Some(&notice))?;
                        }
                        Input::Lost(notice) => {
                            warn!("{}, interval refresh only", notice);
                            stdin_open = false;
                            self.redraw(Some(&notice))?;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    break;
                }
            }
        }

        if !self.json_output {
            println!("\nExiting live monitoring mode...");
        }
        Ok(())
    }

    fn spawn_trigger(&self, command: MonitorCommand, tx: &mpsc::Sender<SyncOutcome>) {
        let synchronizer = Arc::clone(&self.synchronizer);
        let tx = tx.clone();
        let params = self.run_params;
        debug!("Spawning trigger: {:?}", command);

        tokio::spawn(async move {
            let outcome = match command {
                MonitorCommand::Run => synchronizer.run_simulation(params).await,
                MonitorCommand::Provider(id) => synchronizer.select_provider(id).await,
                MonitorCommand::Refresh => synchronizer.refresh().await,
                MonitorCommand::ReloadPricing => synchronizer.reload_pricing().await,
                MonitorCommand::Quit => return,
            };
            // The receiver is gone once the monitor exits
            let _ = tx.send(outcome).await;
        });
    }

    fn redraw(&self, notice: Option<&str>) -> Result<()> {
        let frame = self.presenter.snapshot();

        if self.json_output {
            println!("{}", self.formatter.format_frame(&frame));
            return Ok(());
        }

        Term::stdout().clear_screen()?;
        println!(
            "Live Monitoring - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        println!("{COMMAND_HELP}");
        if let Some(notice) = notice {
            println!("! {notice}");
        }
        println!();
        print!("{}", self.formatter.format_frame(&frame));
        Ok(())
    }
}
