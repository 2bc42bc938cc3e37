//! Bounded analysis pool
//!
//! Jobs are spawned immediately but only `max_concurrent` of them hold a
//! permit and run at any time. Every job owns its own result; the pool only
//! keeps a handle to read it back.

use crate::analyzer::{AnalysisResult, Analyzer};
use crate::config::Config;
use crate::state::JobState;
use crate::storage::{AnalysisPatch, Storage};
use crate::url::parse_target;
use crate::AnalyzerError;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{watch, Semaphore};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Storage backend shared between the pool and its jobs
pub type SharedStorage = Arc<Mutex<dyn Storage + Send>>;

/// Identifier of a submitted analysis job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

struct JobEntry {
    target: Url,
    state: JobState,
    record_id: Option<i64>,
    done: watch::Receiver<Option<AnalysisResult>>,
}

type JobTable = Arc<Mutex<HashMap<JobId, JobEntry>>>;

/// Bounded pool of concurrent analyses
///
/// # Example
///
/// ```no_run
/// use page_lens::{AnalysisPool, Config};
///
/// # async fn run() -> page_lens::Result<()> {
/// let pool = AnalysisPool::from_config(&Config::default())?;
/// let id = pool.submit("https://example.com/")?;
/// if let Some(result) = pool.wait(id).await {
///     println!("{} links", result.total_link_count);
/// }
/// # Ok(())
/// # }
/// ```
pub struct AnalysisPool {
    analyzer: Arc<Analyzer>,
    semaphore: Arc<Semaphore>,
    jobs: JobTable,
    next_id: AtomicU64,
    cancel: CancellationToken,
    storage: Option<SharedStorage>,
}

impl AnalysisPool {
    /// Creates a pool running at most `max_concurrent` analyses at once
    pub fn new(analyzer: Arc<Analyzer>, max_concurrent: usize) -> Self {
        Self {
            analyzer,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            jobs: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            cancel: CancellationToken::new(),
            storage: None,
        }
    }

    /// Creates a pool and its analyzer from the configuration
    pub fn from_config(config: &Config) -> Result<Self, AnalyzerError> {
        let analyzer = Arc::new(Analyzer::new(config)?);
        Ok(Self::new(analyzer, config.analyzer.max_concurrent_analyses))
    }

    /// Persists job status transitions and results through `storage`
    pub fn with_storage(mut self, storage: SharedStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Submits an analysis of `target`
    ///
    /// The target is validated before anything is queued. With storage
    /// attached, the URL record is created if needed and reset to `pending`.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Returns
    ///
    /// * `Ok(JobId)` - The job was queued
    /// * `Err(AnalyzerError::InvalidUrl)` - The target is malformed
    /// * `Err(AnalyzerError::Storage)` - The URL record could not be written
    pub fn submit(&self, target: &str) -> Result<JobId, AnalyzerError> {
        let url = parse_target(target)?;

        let record_id = match &self.storage {
            Some(storage) => {
                let mut storage = lock(storage);
                let id = storage.insert_or_get_url(url.as_str(), "")?;
                storage.update_status(id, JobState::Pending)?;
                Some(id)
            }
            None => None,
        };

        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (done_tx, done_rx) = watch::channel(None);

        lock(&self.jobs).insert(
            id,
            JobEntry {
                target: url.clone(),
                state: JobState::Pending,
                record_id,
                done: done_rx,
            },
        );

        tracing::debug!("Queued {} for {}", id, url);

        let job = Job {
            id,
            url,
            record_id,
            analyzer: Arc::clone(&self.analyzer),
            semaphore: Arc::clone(&self.semaphore),
            jobs: Arc::clone(&self.jobs),
            cancel: self.cancel.clone(),
            storage: self.storage.clone(),
        };

        tokio::spawn(async move {
            let result = job.run().await;
            // Receivers may all be gone; the result is still in the table
            let _ = done_tx.send(Some(result));
        });

        Ok(id)
    }

    /// Returns the current state of a job
    pub fn status(&self, id: JobId) -> Option<JobState> {
        lock(&self.jobs).get(&id).map(|entry| entry.state)
    }

    /// Returns the target URL of a job
    pub fn target(&self, id: JobId) -> Option<Url> {
        lock(&self.jobs).get(&id).map(|entry| entry.target.clone())
    }

    /// Returns the stored URL record of a job, when storage is attached
    pub fn record_id(&self, id: JobId) -> Option<i64> {
        lock(&self.jobs).get(&id).and_then(|entry| entry.record_id)
    }

    /// Waits for a job to finish and returns its result
    ///
    /// Returns None for unknown jobs or jobs whose task died.
    pub async fn wait(&self, id: JobId) -> Option<AnalysisResult> {
        let mut done = lock(&self.jobs).get(&id)?.done.clone();
        let result = done.wait_for(Option::is_some).await.ok()?;
        result.clone()
    }

    /// Removes a finished job from the pool and returns its result
    ///
    /// Returns None, leaving the job in place, while it is still queued or
    /// running.
    pub fn take(&self, id: JobId) -> Option<AnalysisResult> {
        let mut jobs = lock(&self.jobs);
        if jobs.get(&id)?.done.borrow().is_none() {
            return None;
        }

        let entry = jobs.remove(&id)?;
        let result = entry.done.borrow().clone();
        result
    }

    /// Waits for every submitted job and drains them from the pool
    ///
    /// Results come back in submission order.
    pub async fn wait_all(&self) -> Vec<(JobId, AnalysisResult)> {
        let mut ids: Vec<JobId> = lock(&self.jobs).keys().copied().collect();
        ids.sort();

        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            if self.wait(id).await.is_none() {
                continue;
            }
            if let Some(result) = self.take(id) {
                results.push((id, result));
            }
        }
        results
    }

    /// Cancels every queued and running job
    ///
    /// Running jobs keep whatever they already computed; queued jobs finish
    /// as cancelled without making any request.
    pub fn cancel_all(&self) {
        tracing::info!("Cancelling all analyses");
        self.cancel.cancel();
    }

    /// Returns the number of submitted jobs
    pub fn len(&self) -> usize {
        lock(&self.jobs).len()
    }

    /// Returns true if no job was submitted
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything a spawned job needs, detached from the pool
struct Job {
    id: JobId,
    url: Url,
    record_id: Option<i64>,
    analyzer: Arc<Analyzer>,
    semaphore: Arc<Semaphore>,
    jobs: JobTable,
    cancel: CancellationToken,
    storage: Option<SharedStorage>,
}

impl Job {
    async fn run(self) -> AnalysisResult {
        let permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            permit = Arc::clone(&self.semaphore).acquire_owned() => permit.ok(),
        };

        let result = match permit {
            Some(_permit) => {
                self.transition(JobState::Analyzing);
                self.persist(&AnalysisPatch::status(JobState::Analyzing));
                self.analyzer.analyze_url(&self.url, &self.cancel).await
            }
            None => AnalysisResult::failed(
                AnalyzerError::Cancelled {
                    url: self.url.to_string(),
                }
                .to_string(),
            ),
        };

        let state = JobState::for_result(&result);
        self.persist(&AnalysisPatch::from_result(&result));
        self.transition(state);

        tracing::debug!("{} finished as {}", self.id, state);
        result
    }

    fn transition(&self, next: JobState) {
        let mut jobs = lock(&self.jobs);
        if let Some(entry) = jobs.get_mut(&self.id) {
            if entry.state.can_transition_to(next) {
                entry.state = next;
            } else {
                tracing::warn!(
                    "Ignoring invalid transition {} -> {} for {}",
                    entry.state,
                    next,
                    self.id
                );
            }
        }
    }

    fn persist(&self, patch: &AnalysisPatch) {
        let (Some(storage), Some(record_id)) = (&self.storage, self.record_id) else {
            return;
        };

        if let Err(e) = lock(storage).apply_patch(record_id, patch) {
            tracing::warn!("Failed to store analysis of {}: {}", self.url, e);
        }
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
