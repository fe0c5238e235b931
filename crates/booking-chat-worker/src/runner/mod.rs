//! Job runner
//!
//! Polls the queue for due jobs and runs each on its own task, at most
//! `concurrency` at a time. Every claimed job ends in exactly one of
//! complete, retry or bury.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use booking_chat_cache::{QueuedJob, RedisResult, RedisTaskQueue};
use booking_chat_common::WorkerConfig;
use booking_chat_core::DomainError;
use booking_chat_service::{
    ChatService, ClosePurgeJob, RetryDecision, RetryPolicy, ServiceContext, ServiceError,
    ServiceResult, CLOSE_PURGE_JOB,
};
use tokio::sync::Semaphore;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

/// Extra lease on top of the attempt timeout so a slow attempt is not
/// claimed twice
const LEASE_GRACE: Duration = Duration::from_secs(30);

/// Threads re-enqueued per stalled-closure sweep
const STALL_SWEEP_BATCH: i64 = 100;

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub poll_interval: Duration,
    pub concurrency: usize,
    /// Upper bound on one attempt of one job
    pub attempt_timeout: Duration,
    /// Age after which a `closing` thread counts as stalled
    pub stall_after: Duration,
}

impl RunnerConfig {
    pub fn from_config(config: &WorkerConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            concurrency: config.concurrency.max(1),
            attempt_timeout: config.attempt_timeout(),
            stall_after: Duration::from_secs(config.stall_after_secs),
        }
    }

    /// How long a claimed job stays invisible to other workers
    pub fn lease(&self) -> Duration {
        self.attempt_timeout + LEASE_GRACE
    }

    /// Stalled closures are looked for a few times per stall window
    pub fn sweep_interval(&self) -> Duration {
        (self.stall_after / 4).max(Duration::from_secs(1))
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            concurrency: 4,
            attempt_timeout: Duration::from_secs(120),
            stall_after: Duration::from_secs(900),
        }
    }
}

/// What to do with a job after an attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Complete,
    Retry { delay: Duration, error: String },
    Bury { error: String, exhausted: bool },
}

/// Decide the fate of a job from the result of its `attempt`-th run
pub fn settle(policy: &RetryPolicy, attempt: u32, result: &ServiceResult<()>) -> Settlement {
    match result {
        Ok(()) => Settlement::Complete,
        Err(err) => match policy.decide(attempt, err) {
            RetryDecision::RetryAfter(delay) => Settlement::Retry {
                delay,
                error: err.to_string(),
            },
            RetryDecision::GiveUp { exhausted } => Settlement::Bury {
                error: err.to_string(),
                exhausted,
            },
        },
    }
}

/// Run one job by name
pub async fn dispatch(ctx: &ServiceContext, job: &QueuedJob) -> ServiceResult<()> {
    match job.name.as_str() {
        CLOSE_PURGE_JOB => {
            let outcome = ClosePurgeJob::new(ctx).handle(&job.payload).await?;
            debug!(key = %job.key, ?outcome, "Close purge finished");
            Ok(())
        }
        other => Err(ServiceError::internal(format!("no handler for job {other}"))),
    }
}

pub struct JobRunner {
    ctx: Arc<ServiceContext>,
    queue: RedisTaskQueue,
    policy: RetryPolicy,
    config: RunnerConfig,
    permits: Arc<Semaphore>,
}

impl JobRunner {
    pub fn new(
        ctx: Arc<ServiceContext>,
        queue: RedisTaskQueue,
        policy: RetryPolicy,
        config: RunnerConfig,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.concurrency));
        Self {
            ctx,
            queue,
            policy,
            config,
            permits,
        }
    }

    /// Poll and sweep until `shutdown` resolves, then wait for in-flight jobs
    pub async fn run_until(self: Arc<Self>, shutdown: impl Future<Output = ()>) {
        info!(
            concurrency = self.config.concurrency,
            poll_ms = self.config.poll_interval.as_millis() as u64,
            "Job runner started"
        );

        let mut poll = interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sweep = interval(self.config.sweep_interval());
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = poll.tick() => {
                    if let Err(e) = self.poll_once().await {
                        warn!(error = %e, "Job poll failed");
                    }
                }
                _ = sweep.tick() => self.sweep_stalled().await,
            }
        }

        info!("Job runner stopping; waiting for in-flight jobs");
        let all = u32::try_from(self.config.concurrency).unwrap_or(u32::MAX);
        match self.permits.acquire_many(all).await {
            Ok(_) => info!("Job runner stopped"),
            Err(e) => error!(error = %e, "Job permits closed before drain"),
        }
    }

    /// Claim as many due jobs as there are free slots and start them
    async fn poll_once(self: &Arc<Self>) -> RedisResult<usize> {
        let free = self.permits.available_permits();
        if free == 0 {
            return Ok(0);
        }

        let jobs = self.queue.claim_due(free, self.config.lease()).await?;
        let claimed = jobs.len();
        for job in jobs {
            let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
                break;
            };
            let runner = Arc::clone(self);
            tokio::spawn(async move {
                runner.execute(job).await;
                drop(permit);
            });
        }
        Ok(claimed)
    }

    #[instrument(skip(self, job), fields(key = %job.key, job = %job.name, attempt = job.current_attempt()))]
    async fn execute(&self, job: QueuedJob) {
        let attempt = job.current_attempt();
        let result =
            match tokio::time::timeout(self.config.attempt_timeout, dispatch(&self.ctx, &job))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(DomainError::Timeout(format!("job attempt {attempt}")).into()),
            };

        let settlement = settle(&self.policy, attempt, &result);
        let applied = match &settlement {
            Settlement::Complete => self.queue.complete(&job).await,
            Settlement::Retry { delay, error } => {
                warn!(
                    error = %error,
                    retry_in_secs = delay.as_secs(),
                    "Job attempt failed; retrying"
                );
                self.queue.retry(&job, *delay, error).await
            }
            Settlement::Bury { error, exhausted } => {
                error!(
                    alert = true,
                    error = %error,
                    exhausted,
                    payload = %job.payload,
                    "Job dead-lettered"
                );
                self.queue.bury(&job, error).await
            }
        };

        // The lease runs out and the job is claimed again
        if let Err(e) = applied {
            error!(error = %e, ?settlement, "Failed to record job result");
        }
    }

    async fn sweep_stalled(&self) {
        let service = ChatService::new(&self.ctx);
        match service
            .requeue_stalled_closures(self.config.stall_after, STALL_SWEEP_BATCH)
            .await
        {
            Ok(0) => {}
            Ok(scheduled) => info!(scheduled, "Stalled closures re-enqueued"),
            Err(e) => warn!(error = %e, "Stalled closure sweep failed"),
        }
    }
}
