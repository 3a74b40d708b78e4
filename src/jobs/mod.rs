//! Background task queue with a fixed worker pool.
//!
//! Units of work are re-runnable closures. A unit failing with a retryable
//! [`AppError`] is retried with exponential backoff; anything else, or an
//! exhausted retry budget, is reported to the registered failure handlers.

use futures::FutureExt;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::JobsConfig;
use crate::error::AppError;

pub type JobFuture = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send>>;
type JobUnit = Arc<dyn Fn() -> JobFuture + Send + Sync>;
pub type FailureHandler = Arc<dyn Fn(&JobFailure) + Send + Sync>;

/// A job that exhausted its attempts or failed permanently
#[derive(Debug)]
pub struct JobFailure {
    pub name: String,
    pub attempts: u32,
    pub error: AppError,
}

struct Job {
    name: String,
    unit: JobUnit,
}

#[derive(Debug, Default)]
struct Counters {
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    retries: AtomicUsize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStats {
    pub succeeded: usize,
    pub failed: usize,
    pub retries: usize,
}

/// `base * 2^attempt`, capped at the configured maximum
pub fn backoff_delay(config: &JobsConfig, attempt: u32) -> Duration {
    let delay_ms = config
        .base_backoff_ms
        .saturating_mul(2u64.saturating_pow(attempt));
    let cap_ms = config.max_backoff_seconds.saturating_mul(1000);
    Duration::from_millis(delay_ms.min(cap_ms))
}

/// Scales a delay by a random factor in 0.8..=1.2 so retries spread out
fn with_jitter(delay: Duration, rng: &mut SmallRng) -> Duration {
    delay.mul_f64(rng.random_range(0.8..=1.2))
}

struct Worker {
    id: usize,
    config: JobsConfig,
    receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
    handlers: Arc<RwLock<Vec<FailureHandler>>>,
    counters: Arc<Counters>,
}

impl Worker {
    async fn run(self) {
        let mut rng = SmallRng::from_os_rng();
        loop {
            let job = self.receiver.lock().await.recv().await;
            let Some(job) = job else {
                debug!("Worker {} stopping", self.id);
                break;
            };
            self.execute(job, &mut rng).await;
        }
    }

    async fn execute(&self, job: Job, rng: &mut SmallRng) {
        let mut attempt: u32 = 0;
        loop {
            let outcome = AssertUnwindSafe((job.unit)()).catch_unwind().await;
            let result = outcome
                .unwrap_or_else(|_| Err(AppError::job_failed(&job.name, "unit of work panicked")));

            match result {
                Ok(()) => {
                    debug!("Job '{}' succeeded on attempt {}", job.name, attempt + 1);
                    self.counters.succeeded.fetch_add(1, Ordering::Relaxed);
                    return;
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = with_jitter(backoff_delay(&self.config, attempt), rng);
                    warn!(
                        "Job '{}' failed on attempt {}, retrying in {:?}: {}",
                        job.name,
                        attempt + 1,
                        delay,
                        e
                    );
                    self.counters.retries.fetch_add(1, Ordering::Relaxed);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!("Job '{}' failed after {} attempts: {}", job.name, attempt + 1, e);
                    self.counters.failed.fetch_add(1, Ordering::Relaxed);
                    let failure = JobFailure {
                        name: job.name.clone(),
                        attempts: attempt + 1,
                        error: e,
                    };
                    let handlers = self
                        .handlers
                        .read()
                        .unwrap_or_else(PoisonError::into_inner)
                        .clone();
                    for handler in handlers {
                        handler(&failure);
                    }
                    return;
                }
            }
        }
    }
}

pub struct TaskQueue {
    sender: Option<mpsc::Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    handlers: Arc<RwLock<Vec<FailureHandler>>>,
    counters: Arc<Counters>,
}

impl TaskQueue {
    /// Spawns the worker pool. Must be called inside a tokio runtime.
    pub fn new(config: JobsConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let handlers: Arc<RwLock<Vec<FailureHandler>>> = Arc::default();
        let counters = Arc::new(Counters::default());

        let workers = (0..config.workers.max(1))
            .map(|id| {
                let worker = Worker {
                    id,
                    config: config.clone(),
                    receiver: receiver.clone(),
                    handlers: handlers.clone(),
                    counters: counters.clone(),
                };
                tokio::spawn(worker.run())
            })
            .collect::<Vec<_>>();
        info!("Started task queue with {} workers", workers.len());

        Self {
            sender: Some(sender),
            workers,
            handlers,
            counters,
        }
    }

    /// Queues a unit of work. Waits while the queue is full.
    pub async fn enqueue<F, Fut>(&self, name: impl Into<String>, unit: F) -> Result<(), AppError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), AppError>> + Send + 'static,
    {
        let name = name.into();
        let Some(sender) = &self.sender else {
            return Err(AppError::job_failed(name, "task queue is shut down"));
        };
        let unit: JobUnit = Arc::new(move || Box::pin(unit()) as JobFuture);
        sender
            .send(Job {
                name: name.clone(),
                unit,
            })
            .await
            .map_err(|_| AppError::job_failed(name, "task queue is closed"))
    }

    /// Registers a handler called once per permanently failed job
    pub fn on_failure<H>(&self, handler: H)
    where
        H: Fn(&JobFailure) + Send + Sync + 'static,
    {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(handler));
    }

    pub fn stats(&self) -> JobStats {
        JobStats {
            succeeded: self.counters.succeeded.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            retries: self.counters.retries.load(Ordering::Relaxed),
        }
    }

    /// Stops accepting work, drains queued jobs and waits for the workers.
    pub async fn shutdown(mut self) -> JobStats {
        self.sender.take();
        for worker in self.workers.drain(..) {
            if let Err(e) = worker.await {
                error!("Task queue worker ended abnormally: {e}");
            }
        }
        let stats = self.stats();
        info!(
            "Task queue stopped: succeeded={}, failed={}, retries={}",
            stats.succeeded, stats.failed, stats.retries
        );
        stats
    }
}
