//! Fixed-interval broadcast cycle.
//!
//! Each cycle fetches and evaluates every tracked instrument, replaces the
//! cache with the resulting batch and fans it out to subscribers. A failure
//! on one instrument is logged and leaves that instrument out of the batch;
//! it never aborts the cycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use signal_core::error::{DataSourceError, SignalError};
use signal_core::traits::{MarketDataSource, SignalRule};
use signal_core::types::{InstrumentSymbol, Signal, SignalsBatch};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::hub::SignalHub;
use crate::shutdown::{ShutdownListener, ShutdownSignal};

/// Scheduler settings.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Instruments evaluated every cycle
    pub instruments: Vec<InstrumentSymbol>,
    /// Time between cycle starts
    pub interval: Duration,
    /// Run a cycle immediately instead of waiting one interval
    pub run_on_start: bool,
    /// Instruments fetched at the same time; 1 fetches sequentially
    pub max_concurrent_fetches: usize,
    /// Per-instrument fetch deadline
    pub fetch_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            instruments: ["EURUSD", "GBPUSD", "XAUUSD"]
                .into_iter()
                .map(InstrumentSymbol::new)
                .collect(),
            interval: Duration::from_secs(300),
            run_on_start: true,
            max_concurrent_fetches: 1,
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

/// Where the scheduler loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// Waiting for the next tick
    Waiting,
    /// A cycle is in progress
    Running,
    /// The loop has exited
    Stopped,
}

/// Outcome of one cycle.
#[derive(Debug)]
pub struct CycleReport {
    /// Instruments that produced a signal
    pub evaluated: usize,
    /// Instruments left out of the batch, with the reason
    pub failures: Vec<(InstrumentSymbol, SignalError)>,
    /// Subscribers the batch was sent to
    pub subscribers_reached: usize,
    pub elapsed: Duration,
    /// The published batch, now also the cache contents
    pub batch: Arc<SignalsBatch>,
}

/// Drives fetch, evaluate and publish on a fixed timer.
pub struct BroadcastScheduler {
    config: SchedulerConfig,
    source: Arc<dyn MarketDataSource>,
    rule: Arc<dyn SignalRule>,
    hub: Arc<SignalHub>,
}

impl BroadcastScheduler {
    /// Create a scheduler.
    ///
    /// Fails when no instruments are configured or the interval, timeout or
    /// concurrency is zero.
    pub fn new(
        config: SchedulerConfig,
        source: Arc<dyn MarketDataSource>,
        rule: Arc<dyn SignalRule>,
        hub: Arc<SignalHub>,
    ) -> Result<Self, SignalError> {
        if config.instruments.is_empty() {
            return Err(SignalError::Config(
                "At least one instrument must be tracked".into(),
            ));
        }
        if config.interval.is_zero() {
            return Err(SignalError::Config(
                "Cycle interval must be greater than 0".into(),
            ));
        }
        if config.fetch_timeout.is_zero() {
            return Err(SignalError::Config(
                "Fetch timeout must be greater than 0".into(),
            ));
        }
        if config.max_concurrent_fetches == 0 {
            return Err(SignalError::Config(
                "Max concurrent fetches must be greater than 0".into(),
            ));
        }

        Ok(Self {
            config,
            source,
            rule,
            hub,
        })
    }

    /// Run one cycle over every tracked instrument and publish the batch.
    ///
    /// If the returned future is dropped before completion nothing is
    /// published and the cache keeps its previous contents.
    pub async fn run_cycle(&self) -> CycleReport {
        let started = Instant::now();

        let outcomes: Vec<(InstrumentSymbol, Result<Signal, SignalError>)> =
            stream::iter(self.config.instruments.iter().cloned())
                .map(|symbol| async move {
                    let outcome = self.evaluate_instrument(&symbol).await;
                    (symbol, outcome)
                })
                .buffer_unordered(self.config.max_concurrent_fetches)
                .collect()
                .await;

        let mut batch = SignalsBatch::new();
        let mut failures = Vec::new();

        for (symbol, outcome) in outcomes {
            match outcome {
                Ok(signal) => {
                    batch.insert(symbol, signal);
                }
                Err(err) if err.is_insufficient_data() => {
                    warn!(
                        symbol = %symbol,
                        error = %err,
                        "Not enough history, skipping instrument"
                    );
                    failures.push((symbol, err));
                }
                Err(err) => {
                    error!(symbol = %symbol, error = %err, "Failed to evaluate instrument");
                    failures.push((symbol, err));
                }
            }
        }

        // No awaits past this point: the batch is published whole or not at all.
        let batch = Arc::new(batch);
        let subscribers_reached = self.hub.publish_shared(Arc::clone(&batch));

        let report = CycleReport {
            evaluated: batch.len(),
            failures,
            subscribers_reached,
            elapsed: started.elapsed(),
            batch,
        };

        info!(
            evaluated = report.evaluated,
            failed = report.failures.len(),
            subscribers = report.subscribers_reached,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Broadcast cycle complete"
        );

        report
    }

    /// Fetch and evaluate a single instrument.
    pub async fn evaluate_instrument(
        &self,
        symbol: &InstrumentSymbol,
    ) -> Result<Signal, SignalError> {
        debug!(
            symbol = %symbol,
            stage = "fetching",
            source = self.source.name(),
            "Fetching history"
        );

        let history = tokio::time::timeout(
            self.config.fetch_timeout,
            self.source.fetch_daily_history(symbol),
        )
        .await
        .map_err(|_| DataSourceError::Timeout {
            secs: self.config.fetch_timeout.as_secs(),
        })??;

        let required = self.rule.min_history();
        if !self.rule.has_enough_history(history.len()) {
            return Err(SignalError::InsufficientData {
                required,
                available: history.len(),
            });
        }

        debug!(
            symbol = %symbol,
            stage = "computing",
            bars = history.len(),
            rule = self.rule.name(),
            "Computing signal"
        );
        let signal = self.rule.evaluate(&history, Utc::now())?;
        debug!(symbol = %symbol, stage = "evaluated", kind = %signal.kind, "Evaluated");

        Ok(signal)
    }

    /// Spawn the timer loop.
    pub fn start(self: Arc<Self>) -> SchedulerHandle {
        let shutdown = ShutdownSignal::new();
        let listener = shutdown.listener();
        let (phase_tx, phase_rx) = watch::channel(SchedulerPhase::Waiting);

        let task = tokio::spawn(self.run(listener, phase_tx));

        SchedulerHandle {
            shutdown,
            phase: phase_rx,
            task,
        }
    }

    async fn run(
        self: Arc<Self>,
        mut shutdown: ShutdownListener,
        phase: watch::Sender<SchedulerPhase>,
    ) {
        let first_tick = if self.config.run_on_start {
            Instant::now()
        } else {
            Instant::now() + self.config.interval
        };
        let mut ticker = interval_at(first_tick, self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            instruments = self.config.instruments.len(),
            interval_secs = self.config.interval.as_secs(),
            "Broadcast scheduler started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                _ = ticker.tick() => {}
            }

            phase.send_replace(SchedulerPhase::Running);

            tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    warn!("Shutdown during cycle, abandoning it without publishing");
                    break;
                }
                _ = self.run_cycle() => {}
            }

            phase.send_replace(SchedulerPhase::Waiting);
        }

        phase.send_replace(SchedulerPhase::Stopped);
        info!("Broadcast scheduler stopped");
    }
}

/// Control handle for a running scheduler loop.
pub struct SchedulerHandle {
    shutdown: ShutdownSignal,
    phase: watch::Receiver<SchedulerPhase>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn phase(&self) -> SchedulerPhase {
        *self.phase.borrow()
    }

    /// Receiver notified on every phase transition.
    pub fn watch_phase(&self) -> watch::Receiver<SchedulerPhase> {
        self.phase.clone()
    }

    /// Stop the timer, abandon any in-flight cycle and wait for the loop to
    /// exit.
    pub async fn stop(self) {
        self.shutdown.trigger();
        if let Err(e) = self.task.await {
            error!(error = %e, "Scheduler task ended abnormally");
        }
    }
}
