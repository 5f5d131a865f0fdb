// ── Polled collection store ──
//
// Each `PollStore` holds the latest snapshot of one admin collection
// (devices, subdevices, services) plus a health flag describing how that
// snapshot was obtained. A background task owned by `Hub` drives it:
// fetch, replace wholesale, notify. A failed poll keeps the previous
// snapshot and flips health to `Stale`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::stream::SnapshotStream;

// ── Health ─────────────────────────────────────────────────────────

/// Why the last poll failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollErrorKind {
    /// Network-level failure (connect, timeout, TLS).
    Transport,
    /// The backend answered with a non-2xx status.
    Http(u16),
    /// The response body did not decode.
    Decode,
}

/// A failed poll attempt, kept alongside the retained snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollError {
    pub kind: PollErrorKind,
    pub message: String,
}

impl PollError {
    pub fn new(kind: PollErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<&hubctl_api::Error> for PollError {
    fn from(err: &hubctl_api::Error) -> Self {
        let kind = match err {
            hubctl_api::Error::Status { status, .. } => PollErrorKind::Http(*status),
            hubctl_api::Error::Deserialization { .. } => PollErrorKind::Decode,
            _ => PollErrorKind::Transport,
        };
        Self::new(kind, err.to_string())
    }
}

/// Freshness of a store's snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PollHealth {
    /// No poll has completed yet; the snapshot is the empty placeholder.
    #[default]
    Pending,
    /// The snapshot came from the most recent poll.
    Fresh { at: DateTime<Utc> },
    /// The most recent poll failed; the snapshot is from `as_of`.
    Stale {
        error: PollError,
        /// When the retained snapshot was fetched. `None` if no poll
        /// ever succeeded.
        as_of: Option<DateTime<Utc>>,
    },
}

impl PollHealth {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh { .. })
    }

    /// Timestamp of the last successful poll, if any.
    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Pending => None,
            Self::Fresh { at } => Some(*at),
            Self::Stale { as_of, .. } => *as_of,
        }
    }
}

// ── Store ──────────────────────────────────────────────────────────

/// Reactive holder for one polled collection.
///
/// Reads are wait-free snapshot clones. The driving task replaces the
/// snapshot wholesale and subscribers observe each replacement through a
/// [`SnapshotStream`]; there is no per-entity diffing.
pub struct PollStore<T> {
    name: &'static str,
    snapshot: watch::Sender<Arc<Vec<T>>>,
    health: watch::Sender<PollHealth>,
    fast_holds: Arc<watch::Sender<usize>>,
    refresh: watch::Sender<u64>,
}

impl<T: Clone> PollStore<T> {
    pub(crate) fn new(name: &'static str) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        let (health, _) = watch::channel(PollHealth::Pending);
        let (fast_holds, _) = watch::channel(0);
        let (refresh, _) = watch::channel(0);
        Self {
            name,
            snapshot,
            health,
            fast_holds: Arc::new(fast_holds),
            refresh,
        }
    }

    /// Collection name, used in log lines.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The current snapshot.
    pub fn current(&self) -> Arc<Vec<T>> {
        self.snapshot.borrow().clone()
    }

    /// Number of entities in the current snapshot.
    pub fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.borrow().is_empty()
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> SnapshotStream<T> {
        SnapshotStream::new(self.snapshot.subscribe())
    }

    /// Freshness of the current snapshot.
    pub fn health(&self) -> PollHealth {
        self.health.borrow().clone()
    }

    /// Subscribe to health transitions.
    pub fn subscribe_health(&self) -> watch::Receiver<PollHealth> {
        self.health.subscribe()
    }

    /// Hold the store at its fast polling cadence.
    ///
    /// While at least one hold is alive the driving task polls at its
    /// fast interval instead of the base one. Dropping the hold releases
    /// it. Interactive consumers grab one of these while a human is
    /// actually looking at the data.
    pub fn hold_fast_poll(&self) -> FastPollHold {
        self.fast_holds.send_modify(|holds| *holds += 1);
        FastPollHold {
            holds: Arc::clone(&self.fast_holds),
        }
    }

    /// Ask the driving task to poll now instead of waiting out the tick.
    ///
    /// No-op when periodic polling is disabled.
    pub fn request_refresh(&self) {
        self.refresh.send_modify(|n| *n = n.wrapping_add(1));
    }

    // ── Mutation entry points (crate-internal) ───────────────────────

    /// Replace the snapshot wholesale and mark the store fresh.
    pub(crate) fn apply(&self, items: Vec<T>) {
        self.snapshot.send_modify(|snap| *snap = Arc::new(items));
        self.health
            .send_modify(|h| *h = PollHealth::Fresh { at: Utc::now() });
    }

    /// Keep the previous snapshot, record the failure.
    pub(crate) fn record_failure(&self, error: PollError) {
        self.health.send_modify(|h| {
            let as_of = h.last_success();
            *h = PollHealth::Stale { error, as_of };
        });
    }

    /// Replace the first entity matching `predicate`, leaving the rest of
    /// the snapshot untouched. Returns `false` when nothing matched, in
    /// which case subscribers are not notified.
    pub(crate) fn patch_where(&self, predicate: impl Fn(&T) -> bool, replacement: T) -> bool {
        self.snapshot.send_if_modified(|snap| {
            let Some(idx) = snap.iter().position(|item| predicate(item)) else {
                return false;
            };
            let mut items: Vec<T> = snap.as_ref().clone();
            items[idx] = replacement;
            *snap = Arc::new(items);
            true
        })
    }

    pub(crate) fn subscribe_fast_holds(&self) -> watch::Receiver<usize> {
        self.fast_holds.subscribe()
    }

    pub(crate) fn subscribe_refresh(&self) -> watch::Receiver<u64> {
        self.refresh.subscribe()
    }
}

/// RAII guard holding a store at its fast polling cadence.
///
/// Created by [`PollStore::hold_fast_poll`]; the store returns to its
/// base cadence once every outstanding hold has dropped.
#[must_use = "dropping the hold immediately reverts to the base cadence"]
pub struct FastPollHold {
    holds: Arc<watch::Sender<usize>>,
}

impl Drop for FastPollHold {
    fn drop(&mut self) {
        self.holds.send_modify(|holds| *holds = holds.saturating_sub(1));
    }
}

// ── Driving task ───────────────────────────────────────────────────

/// Periodic poll loop for one store.
///
/// `Hub` spawns one of these per collection when periodic polling is
/// enabled. The loop owns the cadence (base vs fast), honors on-demand
/// refresh requests, and drops a still-running fetch whenever the next
/// tick overtakes it -- a hung request can never publish over newer data.
pub(crate) async fn poll_task<T, F, Fut>(
    store: Arc<PollStore<T>>,
    fetch: F,
    base: Duration,
    fast: Duration,
    cancel: CancellationToken,
) where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Vec<T>, hubctl_api::Error>> + Send + 'static,
{
    let mut fast_holds = store.subscribe_fast_holds();
    let mut refresh = store.subscribe_refresh();

    let fast_active = *fast_holds.borrow_and_update() > 0;
    let mut interval = tokio::time::interval(if fast_active { fast } else { base });
    interval.tick().await; // consume the immediate first tick

    let mut in_flight: Option<Pin<Box<Fut>>> = None;

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                debug!(store = store.name(), "poll task stopping");
                break;
            }

            _ = interval.tick() => {
                if in_flight.is_some() {
                    debug!(store = store.name(), "next poll due, dropping in-flight fetch");
                }
                in_flight = Some(Box::pin(fetch()));
            }

            changed = refresh.changed() => {
                if changed.is_err() {
                    break;
                }
                debug!(store = store.name(), "refresh requested");
                in_flight = Some(Box::pin(fetch()));
                interval.reset();
            }

            changed = fast_holds.changed() => {
                if changed.is_err() {
                    break;
                }
                let engaged = *fast_holds.borrow_and_update() > 0;
                if engaged {
                    // New interval ticks immediately on the next pass,
                    // then settles into the fast cadence.
                    interval = tokio::time::interval(fast);
                } else {
                    interval = tokio::time::interval(base);
                    interval.reset(); // skip the immediate tick
                }
                debug!(store = store.name(), fast = engaged, "poll cadence changed");
            }

            result = poll_in_flight(&mut in_flight), if in_flight.is_some() => {
                match result {
                    Ok(items) => {
                        debug!(store = store.name(), count = items.len(), "poll complete");
                        store.apply(items);
                    }
                    Err(e) => {
                        warn!(store = store.name(), error = %e, "poll failed, keeping previous snapshot");
                        store.record_failure(PollError::from(&e));
                    }
                }
            }
        }
    }
}

/// Drive the in-flight fetch to completion and clear the slot.
///
/// Pending forever when the slot is empty; the caller's branch
/// precondition keeps it from being polled in that state.
async fn poll_in_flight<Fut: Future>(slot: &mut Option<Pin<Box<Fut>>>) -> Fut::Output {
    match slot.as_mut() {
        Some(fut) => {
            let output = fut.as_mut().await;
            *slot = None;
            output
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    type BoxedFetch = Pin<Box<dyn Future<Output = Result<Vec<String>, hubctl_api::Error>> + Send>>;

    fn store() -> Arc<PollStore<String>> {
        Arc::new(PollStore::new("test"))
    }

    /// Fetcher that returns `["run-N"]` for call N.
    fn counting_fetcher(calls: Arc<AtomicUsize>) -> impl Fn() -> BoxedFetch + Send + 'static {
        move || {
            let calls = Arc::clone(&calls);
            Box::pin(async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![format!("run-{n}")])
            })
        }
    }

    // ── Snapshot semantics ───────────────────────────────────────────

    #[test]
    fn apply_replaces_snapshot_wholesale() {
        let store: PollStore<String> = PollStore::new("test");
        store.apply(vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(*store.current(), vec!["a".to_owned(), "b".to_owned()]);

        store.apply(vec!["c".to_owned()]);
        assert_eq!(*store.current(), vec!["c".to_owned()]);
        assert!(store.health().is_fresh());
    }

    #[test]
    fn failure_keeps_previous_snapshot() {
        let store: PollStore<String> = PollStore::new("test");
        store.apply(vec!["a".to_owned()]);
        let fetched_at = store.health().last_success().unwrap();

        store.record_failure(PollError::new(PollErrorKind::Http(500), "boom"));
        assert_eq!(*store.current(), vec!["a".to_owned()]);
        match store.health() {
            PollHealth::Stale { error, as_of } => {
                assert_eq!(error.kind, PollErrorKind::Http(500));
                assert_eq!(as_of, Some(fetched_at));
            }
            other => panic!("expected stale health, got: {other:?}"),
        }
    }

    #[test]
    fn failure_before_first_success_has_no_as_of() {
        let store: PollStore<String> = PollStore::new("test");
        store.record_failure(PollError::new(PollErrorKind::Transport, "refused"));
        match store.health() {
            PollHealth::Stale { as_of: None, .. } => {}
            other => panic!("expected stale with no as_of, got: {other:?}"),
        }
    }

    #[test]
    fn patch_replaces_only_the_matching_entity() {
        let store: PollStore<String> = PollStore::new("test");
        store.apply(vec!["a".to_owned(), "b".to_owned(), "c".to_owned()]);

        assert!(store.patch_where(|s| s == "b", "B".to_owned()));
        assert_eq!(
            *store.current(),
            vec!["a".to_owned(), "B".to_owned(), "c".to_owned()],
            "order preserved, neighbors untouched"
        );

        assert!(!store.patch_where(|s| s == "zz", "Z".to_owned()));
    }

    #[tokio::test]
    async fn subscribers_observe_each_replacement() {
        let store: PollStore<String> = PollStore::new("test");
        let mut stream = store.subscribe();
        assert!(stream.current().is_empty());

        store.apply(vec!["a".to_owned()]);
        let snapshot = stream.changed().await.unwrap();
        assert_eq!(*snapshot, vec!["a".to_owned()]);
    }

    // ── Poll loop ────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn polls_on_the_base_cadence() {
        let store = store();
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_task(
            Arc::clone(&store),
            counting_fetcher(Arc::clone(&calls)),
            Duration::from_secs(10),
            Duration::from_secs(2),
            cancel.clone(),
        ));

        let mut stream = store.subscribe();
        // The first poll lands a full period in: the immediate tick is
        // consumed because the owner already fetched eagerly.
        let first = tokio::time::timeout(Duration::from_secs(11), stream.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*first, vec!["run-0".to_owned()]);

        let second = tokio::time::timeout(Duration::from_secs(11), stream.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*second, vec!["run-1".to_owned()]);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn tick_overtakes_slow_fetch() {
        // Call 0 sleeps 15s before returning ["slow"]; every later call
        // returns immediately. With a 10s cadence the second tick lands
        // while call 0 is still sleeping, so "slow" must never publish.
        let store = store();
        let calls = Arc::new(AtomicUsize::new(0));
        let task_calls = Arc::clone(&calls);
        let cancel = CancellationToken::new();
        tokio::spawn(poll_task(
            Arc::clone(&store),
            move || {
                let calls = Arc::clone(&task_calls);
                Box::pin(async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    if n == 0 {
                        tokio::time::sleep(Duration::from_secs(15)).await;
                        Ok(vec!["slow".to_owned()])
                    } else {
                        Ok::<_, hubctl_api::Error>(vec![format!("fast-{n}")])
                    }
                }) as BoxedFetch
            },
            Duration::from_secs(10),
            Duration::from_secs(2),
            cancel.clone(),
        ));

        let mut stream = store.subscribe();
        let first = stream.changed().await.unwrap();
        assert_eq!(*first, vec!["fast-1".to_owned()]);

        // The abandoned fetch would have resolved at t=25s; run past that
        // point (but short of the next tick) and verify it was dropped
        // rather than applied.
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(*store.current(), vec!["fast-1".to_owned()]);
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_request_polls_immediately() {
        let store = store();
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        tokio::spawn(poll_task(
            Arc::clone(&store),
            counting_fetcher(Arc::clone(&calls)),
            Duration::from_secs(1000),
            Duration::from_secs(2),
            cancel.clone(),
        ));
        // Let the task reach its select loop.
        tokio::time::sleep(Duration::from_secs(1)).await;

        let mut stream = store.subscribe();
        store.request_refresh();
        let snapshot = tokio::time::timeout(Duration::from_secs(5), stream.changed())
            .await
            .expect("refresh should not wait for the next tick")
            .unwrap();
        assert_eq!(*snapshot, vec!["run-0".to_owned()]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn fast_hold_tightens_cadence_until_released() {
        let store = store();
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        tokio::spawn(poll_task(
            Arc::clone(&store),
            counting_fetcher(Arc::clone(&calls)),
            Duration::from_secs(60),
            Duration::from_secs(2),
            cancel.clone(),
        ));

        let hold = store.hold_fast_poll();
        let mut stream = store.subscribe();
        // Three polls in well under the 60s base cadence.
        for _ in 0..3 {
            tokio::time::timeout(Duration::from_secs(3), stream.changed())
                .await
                .expect("fast poll due")
                .unwrap();
        }

        drop(hold);
        // Back on the base cadence: quiet for at least the fast interval's
        // next several multiples.
        let quiet = tokio::time::timeout(Duration::from_secs(10), stream.changed()).await;
        assert!(quiet.is_err(), "no polls expected right after release");
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn failed_poll_records_stale_then_recovers() {
        // Call 0 succeeds, call 1 fails with a 503, call 2 succeeds.
        let store = store();
        let calls = Arc::new(AtomicUsize::new(0));
        let task_calls = Arc::clone(&calls);
        let cancel = CancellationToken::new();
        tokio::spawn(poll_task(
            Arc::clone(&store),
            move || {
                let calls = Arc::clone(&task_calls);
                Box::pin(async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    if n == 1 {
                        Err(hubctl_api::Error::Status {
                            status: 503,
                            message: "unavailable".to_owned(),
                        })
                    } else {
                        Ok(vec![format!("run-{n}")])
                    }
                }) as BoxedFetch
            },
            Duration::from_secs(10),
            Duration::from_secs(2),
            cancel.clone(),
        ));

        let mut stream = store.subscribe();
        let first = stream.changed().await.unwrap();
        assert_eq!(*first, vec!["run-0".to_owned()]);

        let mut health = store.subscribe_health();
        loop {
            health.changed().await.unwrap();
            let stale = matches!(&*health.borrow_and_update(), PollHealth::Stale { .. });
            if stale {
                break;
            }
        }
        match store.health() {
            PollHealth::Stale { error, as_of } => {
                assert_eq!(error.kind, PollErrorKind::Http(503));
                assert!(as_of.is_some(), "first poll succeeded earlier");
            }
            other => panic!("expected stale health, got: {other:?}"),
        }
        assert_eq!(
            *store.current(),
            vec!["run-0".to_owned()],
            "failed poll keeps the old snapshot"
        );

        let recovered = stream.changed().await.unwrap();
        assert_eq!(*recovered, vec!["run-2".to_owned()]);
        assert!(store.health().is_fresh());
        cancel.cancel();
    }
}
