use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};
use uuid::Uuid;

use mediqueue_common::QueueSnapshot;

use super::error::{InitError, RefreshError};
use super::progress::{ProgressView, derive_progress};
use crate::api::SnapshotSource;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// What the rendering layer sees. Replaced as a whole on every publication.
#[derive(Debug, Clone, Default)]
pub struct QueueViewState {
    /// `None` until the first successful refresh
    pub progress: Option<Arc<ProgressView>>,
    /// Most recent reportable error; cleared by the next success
    pub error: Option<RefreshError>,
    pub last_updated: Option<DateTime<Utc>>,
    /// Sequence number of the refresh that produced this state
    pub sequence: u64,
}

struct Inner {
    source: Arc<dyn SnapshotSource>,
    /// Unset before `initialize`; `Some(None)` after an empty id was supplied
    appointment_id: OnceLock<Option<String>>,
    issued: AtomicU64,
    disposed: AtomicBool,
    state: RwLock<QueueViewState>,
    session: Uuid,
}

impl Inner {
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    async fn refresh(&self) -> Result<ProgressView, RefreshError> {
        if self.is_disposed() {
            return Err(RefreshError::Disposed);
        }
        let appointment_id = match self.appointment_id.get() {
            None => return Err(RefreshError::NotInitialized),
            Some(None) => return Err(RefreshError::MissingIdentifier),
            Some(Some(id)) => id,
        };

        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(session = %self.session, seq, "Fetching queue status for appointment {}", appointment_id);

        let outcome = match self.source.fetch_queue_status(appointment_id).await {
            Ok(payload) => QueueSnapshot::try_from(payload)
                .map(|snapshot| derive_progress(&snapshot))
                .map_err(RefreshError::from),
            Err(e) => Err(RefreshError::from(e)),
        };

        self.publish(seq, outcome).await
    }

    async fn publish(
        &self,
        seq: u64,
        outcome: Result<ProgressView, RefreshError>,
    ) -> Result<ProgressView, RefreshError> {
        let mut state = self.state.write().await;

        // Checked under the write lock so publications are totally ordered
        if self.is_disposed() {
            debug!(session = %self.session, seq, "Dropping response that arrived after dispose");
            return Err(RefreshError::Disposed);
        }
        if seq <= state.sequence {
            debug!(
                session = %self.session,
                seq,
                published = state.sequence,
                "Dropping stale queue status response"
            );
            return Err(RefreshError::Superseded { seq });
        }

        let next = match &outcome {
            Ok(view) => {
                debug!(
                    session = %self.session,
                    seq,
                    "Queue position {}/{} ({:.0}%)",
                    view.position_from_front,
                    view.total_in_queue,
                    view.percent_complete
                );
                QueueViewState {
                    progress: Some(Arc::new(view.clone())),
                    error: None,
                    last_updated: Some(Utc::now()),
                    sequence: seq,
                }
            }
            Err(err) => {
                warn!(session = %self.session, seq, "Queue status refresh failed: {}", err);
                QueueViewState {
                    progress: state.progress.clone(),
                    error: Some(err.clone()),
                    last_updated: state.last_updated,
                    sequence: seq,
                }
            }
        };
        *state = next;

        outcome
    }
}

/// Keeps one patient's queue position up to date by polling a
/// [`SnapshotSource`].
///
/// `initialize` starts tracking and arms the poll timer, `dispose` (or
/// dropping the view model) stops it. Responses are published in issue
/// order: a response older than what is already displayed is discarded.
pub struct QueueStatusViewModel {
    inner: Arc<Inner>,
    poll_interval: Duration,
    ticker: OnceLock<AbortHandle>,
}

impl QueueStatusViewModel {
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                appointment_id: OnceLock::new(),
                issued: AtomicU64::new(0),
                disposed: AtomicBool::new(false),
                state: RwLock::new(QueueViewState::default()),
                session: Uuid::now_v7(),
            }),
            poll_interval: DEFAULT_POLL_INTERVAL,
            ticker: OnceLock::new(),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        if poll_interval.is_zero() {
            warn!("Poll interval must be positive, keeping {:?}", self.poll_interval);
        } else {
            self.poll_interval = poll_interval;
        }
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// The tracked appointment, once `initialize` has accepted one
    pub fn appointment_id(&self) -> Option<&str> {
        self.inner.appointment_id.get().and_then(|id| id.as_deref())
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// Start tracking `appointment_id`.
    ///
    /// Runs one refresh right away (its outcome lands in [`Self::state`]),
    /// then refreshes every poll interval until disposed. An empty id is
    /// terminal: it is recorded as the current error and nothing is fetched.
    pub async fn initialize(&self, appointment_id: &str) -> Result<(), InitError> {
        if self.inner.is_disposed() {
            return Err(InitError::Disposed);
        }

        // Blank ids are rejected, any other id is passed on untouched
        let blank = appointment_id.trim().is_empty();
        let requested = (!blank).then(|| appointment_id.to_string());
        if self.inner.appointment_id.set(requested).is_err() {
            return Err(match self.inner.appointment_id.get() {
                Some(Some(current)) => InitError::AlreadyInitialized(current.clone()),
                _ => InitError::MissingIdentifier,
            });
        }

        if blank {
            warn!(session = %self.inner.session, "No appointment id provided, queue tracking not started");
            let mut state = self.inner.state.write().await;
            let next = QueueViewState {
                error: Some(RefreshError::MissingIdentifier),
                ..state.clone()
            };
            *state = next;
            return Err(InitError::MissingIdentifier);
        }

        info!(
            session = %self.inner.session,
            "Tracking queue status for appointment {} (every {}s)",
            appointment_id,
            self.poll_interval.as_secs_f64()
        );

        if let Err(e) = self.inner.refresh().await {
            debug!(session = %self.inner.session, "Initial queue refresh did not publish: {}", e);
        }

        if self.inner.is_disposed() {
            return Err(InitError::Disposed);
        }

        let handle = spawn_ticker(self.inner.clone(), self.poll_interval);
        let _ = self.ticker.set(handle.abort_handle());
        // dispose() may have run between the check above and storing the handle
        if self.inner.is_disposed() {
            handle.abort();
        }

        Ok(())
    }

    /// Fetch, validate and publish a fresh snapshot now.
    ///
    /// Reportable failures are also recorded in [`Self::state`], with the
    /// previously published progress left in place.
    pub async fn refresh(&self) -> Result<ProgressView, RefreshError> {
        self.inner.refresh().await
    }

    /// Stop polling. Responses still in flight are discarded when they land.
    ///
    /// Does nothing before `initialize` or when already disposed.
    pub fn dispose(&self) {
        if self.inner.appointment_id.get().is_none() {
            return;
        }
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(ticker) = self.ticker.get() {
            ticker.abort();
        }
        info!(session = %self.inner.session, "Queue tracking stopped");
    }

    /// Consistent copy of the current display state
    pub async fn state(&self) -> QueueViewState {
        self.inner.state.read().await.clone()
    }

    pub async fn progress(&self) -> Option<Arc<ProgressView>> {
        self.inner.state.read().await.progress.clone()
    }
}

impl Drop for QueueStatusViewModel {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Tick every `period`, starting one period from now. Each tick refreshes
/// in its own task so a hung fetch never holds back the next tick.
fn spawn_ticker(inner: Arc<Inner>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if inner.is_disposed() {
                break;
            }

            let inner = inner.clone();
            tokio::spawn(async move {
                if let Err(e) = inner.refresh().await {
                    debug!(session = %inner.session, "Scheduled queue refresh did not publish: {}", e);
                }
            });
        }
    })
}
