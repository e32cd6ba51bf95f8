//! The running service: one tick timer and the pipelines it drives.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use handpad_controller::Controller;
use handpad_errors::Result;
use handpad_scheduler::{JitterMetrics, SchedulerResult, TickTimer};
use tracing::{info, warn};

use crate::context::ServiceContext;
use crate::pipeline::Pipeline;

/// How often the service looks for controllers that went away.
const REAP_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct HandpadService {
    ctx: ServiceContext,
    timer: TickTimer,
    pipelines: Vec<Pipeline>,
}

impl HandpadService {
    pub fn new(ctx: ServiceContext) -> Self {
        let timer = TickTimer::new(ctx.config().tick, Arc::clone(ctx.tick_bus()));
        Self {
            ctx,
            timer,
            pipelines: Vec::new(),
        }
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    pub fn pipelines(&self) -> &[Pipeline] {
        &self.pipelines
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Wire `controller` to a new target using the configured layout.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::attach`].
    pub fn attach(&mut self, controller: Controller) -> Result<()> {
        let config = self.ctx.config();
        let layout = config.effective_layout();
        let pipeline = Pipeline::attach(&self.ctx, controller, config.target, &layout)?;
        self.pipelines.push(pipeline);
        Ok(())
    }

    /// Start ticking.
    ///
    /// # Errors
    ///
    /// The timer is already running or its thread could not be spawned.
    pub fn start(&mut self) -> SchedulerResult {
        self.timer.start()
    }

    /// Detach pipelines whose controller is gone. Returns how many went.
    pub fn reap_disconnected(&mut self) -> usize {
        let gone = self.take_disconnected();
        let count = gone.len();
        detach_all(gone);
        count
    }

    fn take_disconnected(&mut self) -> Vec<Pipeline> {
        let (gone, kept) = std::mem::take(&mut self.pipelines)
            .into_iter()
            .partition(Pipeline::is_disconnected);
        self.pipelines = kept;
        for pipeline in &gone {
            warn!(pipeline = %pipeline.name(), "controller removed");
        }
        gone
    }

    /// Stop ticking and detach every pipeline.
    pub fn stop(&mut self) -> Option<JitterMetrics> {
        let metrics = self.timer.stop();
        detach_all(std::mem::take(&mut self.pipelines));
        metrics
    }

    /// Tick until `shutdown` resolves, reaping removed controllers on the
    /// way, then stop.
    ///
    /// Detaching joins rumble workers, so it runs on the blocking pool
    /// rather than on the runtime thread.
    ///
    /// # Errors
    ///
    /// See [`HandpadService::start`].
    pub async fn run_until(&mut self, shutdown: impl Future<Output = ()>) -> SchedulerResult {
        self.start()?;
        info!(pipelines = self.pipelines.len(), "service running");

        tokio::pin!(shutdown);
        let mut reap = tokio::time::interval(REAP_INTERVAL);
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = reap.tick() => {
                    let gone = self.take_disconnected();
                    if !gone.is_empty() {
                        detach_off_runtime(gone).await;
                    }
                }
            }
        }

        self.timer.stop();
        detach_off_runtime(std::mem::take(&mut self.pipelines)).await;
        info!("service stopped");
        Ok(())
    }
}

fn detach_all(pipelines: Vec<Pipeline>) {
    for mut pipeline in pipelines {
        pipeline.detach();
    }
}

async fn detach_off_runtime(pipelines: Vec<Pipeline>) {
    if let Err(e) = tokio::task::spawn_blocking(move || detach_all(pipelines)).await {
        warn!(error = %e, "pipeline teardown task failed");
    }
}

impl Drop for HandpadService {
    fn drop(&mut self) {
        self.stop();
    }
}
