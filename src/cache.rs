//! In-memory forecast cache with a freshness policy.
//!
//! Readers get the current snapshot without blocking. Every read may kick
//! off a background refresh; all refreshes, triggered or explicit, go
//! through one single-writer routine guarded by `refresh_lock`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{Mutex, OwnedMutexGuard, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

use crate::config::CacheConfig;
use crate::models::ForecastResult;
use crate::weather::{FetchRequest, ForecastFetcher};

/// Shortest tick the background loop runs with
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Thresholds deciding when the cache goes back to the fetcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// No new attempt while the last one is younger than this
    pub debounce: Duration,
    /// A successful forecast older than this is refetched
    pub stale_after: Duration,
    /// Tick interval of the background loop
    pub poll_interval: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

impl From<&CacheConfig> for RefreshPolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            debounce: config.debounce(),
            stale_after: config.stale_after(),
            poll_interval: config.poll_interval(),
        }
    }
}

impl RefreshPolicy {
    #[must_use]
    pub fn should_refresh(&self, state: &CacheState, now: Instant) -> bool {
        if let Some(attempt) = state.last_attempt {
            if now.saturating_duration_since(attempt) < self.debounce {
                return false;
            }
        }

        match state.result {
            ForecastResult::NotPresent | ForecastResult::Error(_) => true,
            ForecastResult::Present(_) => state
                .last_update
                .is_none_or(|update| now.saturating_duration_since(update) > self.stale_after),
        }
    }
}

/// Snapshot of what the cache holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheState {
    pub result: ForecastResult,
    /// Start of the last refresh that produced a forecast
    pub last_update: Option<Instant>,
    /// Start of the last refresh, whatever its outcome
    pub last_attempt: Option<Instant>,
}

impl CacheState {
    /// Record the outcome of a refresh that started at `started`
    pub fn apply(&mut self, result: ForecastResult, started: Instant) {
        if result.is_present() {
            self.last_update = Some(self.last_update.map_or(started, |prev| prev.max(started)));
        }
        self.last_attempt = Some(self.last_attempt.map_or(started, |prev| prev.max(started)));
        self.result = result;
    }
}

struct Inner {
    fetcher: Arc<dyn ForecastFetcher>,
    request: RwLock<FetchRequest>,
    policy: RefreshPolicy,
    state: RwLock<CacheState>,
    refresh_lock: Arc<Mutex<()>>,
    consumers: AtomicUsize,
    updates: watch::Sender<ForecastResult>,
    runtime: Handle,
}

impl Inner {
    fn read_state(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_request(&self) -> FetchRequest {
        self.request
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fetch and publish. Callers must hold `refresh_lock`.
    #[tracing::instrument(name = "refresh_forecast", level = "debug", skip_all)]
    fn run_refresh(&self) -> ForecastResult {
        let started = Instant::now();
        let request = self.current_request();

        let result = match panic::catch_unwind(AssertUnwindSafe(|| self.fetcher.fetch(&request))) {
            Ok(outcome) => ForecastResult::from_fetch(outcome, request.hours),
            Err(payload) => ForecastResult::Error(format!(
                "Forecast fetcher panicked: {}",
                panic_message(&*payload)
            )),
        };

        match &result {
            ForecastResult::Present(samples) => {
                info!("Forecast refreshed with {} hourly samples", samples.len());
            }
            ForecastResult::Error(message) => warn!("Forecast refresh failed: {}", message),
            ForecastResult::NotPresent => {}
        }

        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(result.clone(), started);
        self.updates.send_replace(result.clone());
        result
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Shared handle to the forecast cache. Cloning is cheap.
#[derive(Clone)]
pub struct ForecastCache {
    inner: Arc<Inner>,
}

impl ForecastCache {
    /// Create a cache bound to the current tokio runtime
    pub fn new(
        fetcher: Arc<dyn ForecastFetcher>,
        request: FetchRequest,
        policy: RefreshPolicy,
    ) -> crate::Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            crate::WeatherBarError::config(format!("Forecast cache needs a tokio runtime: {e}"))
        })?;
        Ok(Self::with_handle(fetcher, request, policy, runtime))
    }

    /// Create a cache that schedules its work on `runtime`
    #[must_use]
    pub fn with_handle(
        fetcher: Arc<dyn ForecastFetcher>,
        request: FetchRequest,
        policy: RefreshPolicy,
        runtime: Handle,
    ) -> Self {
        let (updates, _) = watch::channel(ForecastResult::NotPresent);
        Self {
            inner: Arc::new(Inner {
                fetcher,
                request: RwLock::new(request),
                policy,
                state: RwLock::new(CacheState::default()),
                refresh_lock: Arc::new(Mutex::new(())),
                consumers: AtomicUsize::new(0),
                updates,
                runtime,
            }),
        }
    }

    /// Current forecast. Never blocks; may schedule a background refresh.
    #[must_use]
    pub fn get_cached(&self) -> ForecastResult {
        let snapshot = self.inner.read_state().result.clone();
        let _ = self.refresh_if_stale();
        snapshot
    }

    /// Schedule a refresh when the policy asks for one.
    ///
    /// Returns `None` when the cache is fresh, debounced, or another
    /// refresh is already running.
    pub fn refresh_if_stale(&self) -> Option<JoinHandle<()>> {
        if !self.is_refresh_due() {
            return None;
        }

        let Ok(guard) = Arc::clone(&self.inner.refresh_lock).try_lock_owned() else {
            trace!("Refresh already in flight, dropping trigger");
            return None;
        };

        // A refresh may have finished between the check and taking the lock
        if !self.is_refresh_due() {
            return None;
        }

        debug!("Scheduling forecast refresh");
        let inner = Arc::clone(&self.inner);
        Some(self.inner.runtime.spawn_blocking(move || {
            let _guard = guard;
            inner.run_refresh();
        }))
    }

    /// Fetch now, regardless of freshness, and return the new result.
    ///
    /// Waits for an in-flight refresh to finish first so the fetch sees the
    /// latest request.
    pub async fn refresh(&self) -> ForecastResult {
        let guard = Arc::clone(&self.inner.refresh_lock).lock_owned().await;
        self.spawn_refresh(guard).await
    }

    /// Replace the fetch parameters and refetch immediately.
    ///
    /// An invalid request is rejected and leaves the cache untouched.
    pub async fn update_request(&self, request: FetchRequest) -> crate::Result<ForecastResult> {
        request.validate()?;
        let guard = Arc::clone(&self.inner.refresh_lock).lock_owned().await;
        info!(
            "Forecast settings changed to ({:.4}, {:.4}), {} hours",
            request.latitude, request.longitude, request.hours
        );
        *self
            .inner
            .request
            .write()
            .unwrap_or_else(PoisonError::into_inner) = request;
        Ok(self.spawn_refresh(guard).await)
    }

    async fn spawn_refresh(&self, guard: OwnedMutexGuard<()>) -> ForecastResult {
        let inner = Arc::clone(&self.inner);
        let task = self.inner.runtime.spawn_blocking(move || {
            let _guard = guard;
            inner.run_refresh()
        });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!("Forecast refresh task failed: {}", e);
                self.state().result
            }
        }
    }

    fn is_refresh_due(&self) -> bool {
        let now = Instant::now();
        self.inner
            .policy
            .should_refresh(&self.inner.read_state(), now)
    }

    /// Copy of the full cache state
    #[must_use]
    pub fn state(&self) -> CacheState {
        self.inner.read_state().clone()
    }

    #[must_use]
    pub fn request(&self) -> FetchRequest {
        self.inner.current_request()
    }

    #[must_use]
    pub fn policy(&self) -> RefreshPolicy {
        self.inner.policy
    }

    /// Receive every result the cache publishes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ForecastResult> {
        self.inner.updates.subscribe()
    }

    /// Register a display consumer; the background loop only works while
    /// at least one guard is alive.
    #[must_use]
    pub fn attach_consumer(&self) -> ConsumerGuard {
        let previous = self.inner.consumers.fetch_add(1, Ordering::SeqCst);
        debug!("Consumer attached ({} active)", previous + 1);
        ConsumerGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    #[must_use]
    pub fn has_consumer(&self) -> bool {
        self.inner.consumers.load(Ordering::SeqCst) > 0
    }

    /// Start the background refresh loop
    pub fn spawn_poller(&self) -> JoinHandle<()> {
        let cache = self.clone();
        let interval = self.inner.policy.poll_interval.max(MIN_POLL_INTERVAL);
        info!("Starting forecast poller (interval: {:?})", interval);

        self.inner.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if cache.has_consumer() {
                    let _ = cache.refresh_if_stale();
                } else {
                    trace!("No consumer attached, skipping tick");
                }
            }
        })
    }
}

/// Keeps a display consumer registered until dropped
pub struct ConsumerGuard {
    inner: Arc<Inner>,
}

impl Drop for ConsumerGuard {
    fn drop(&mut self) {
        let previous = self.inner.consumers.fetch_sub(1, Ordering::SeqCst);
        debug!("Consumer detached ({} active)", previous.saturating_sub(1));
    }
}
