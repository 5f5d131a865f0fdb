// ── Service log feeds ──
//
// On-demand polled feeds of supervisor log lines, one per service name.
// A feed exists only while at least one `LogTail` handle is alive; the
// last handle to drop cancels the feed's task and forgets the entry, so
// an idle session stops hitting the log endpoint entirely.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::poll::{PollError, PollHealth};

/// Boxed fetch future producing one raw batch of log lines.
pub(crate) type LinesFuture =
    Pin<Box<dyn Future<Output = Result<Vec<String>, hubctl_api::Error>> + Send>>;

/// Shared fetch closure; each feed calls it with its own service name.
pub(crate) type LogFetcher = Arc<dyn Fn(String) -> LinesFuture + Send + Sync>;

struct LogFeed {
    lines: Arc<watch::Sender<Arc<Vec<String>>>>,
    health: Arc<watch::Sender<PollHealth>>,
    cancel: CancellationToken,
    tails: usize,
}

/// Registry of live log feeds, keyed by service name.
pub struct LogStore {
    feeds: Arc<DashMap<String, LogFeed>>,
    fetch: LogFetcher,
    period: Duration,
    cancel: CancellationToken,
}

impl LogStore {
    pub(crate) fn new(fetch: LogFetcher, period: Duration, cancel: CancellationToken) -> Self {
        Self {
            feeds: Arc::new(DashMap::new()),
            fetch,
            period,
            cancel,
        }
    }

    /// Number of live feeds (one per distinct tailed service).
    pub fn active_feeds(&self) -> usize {
        self.feeds.len()
    }

    /// Drop every feed entry during hub shutdown.
    ///
    /// The tasks are already cancelled through the parent token; dropping
    /// the map's sender halves lets outstanding tails observe the end of
    /// their feed instead of waiting on a channel nobody writes to.
    pub(crate) fn clear(&self) {
        self.feeds.clear();
    }

    /// Tail the log of `service`, starting its feed on first use.
    ///
    /// The feed fetches immediately, then on the store's period; lines
    /// are newest-first. Concurrent tails of the same service share one
    /// feed and one fetch schedule. Must be called within a Tokio runtime.
    pub fn tail(&self, service: &str) -> LogTail {
        let mut entry = self
            .feeds
            .entry(service.to_owned())
            .or_insert_with(|| self.start_feed(service));
        // A feed whose last tail just dropped can still be in the map with
        // its task cancelled; restart it rather than handing out a dead feed.
        if entry.tails == 0 && entry.cancel.is_cancelled() {
            *entry = self.start_feed(service);
        }
        entry.tails += 1;

        LogTail {
            service: service.to_owned(),
            current: entry.lines.borrow().clone(),
            receiver: entry.lines.subscribe(),
            health: entry.health.subscribe(),
            feeds: Arc::clone(&self.feeds),
        }
    }

    fn start_feed(&self, service: &str) -> LogFeed {
        let (lines_tx, _) = watch::channel(Arc::new(Vec::new()));
        let (health_tx, _) = watch::channel(PollHealth::Pending);
        let lines = Arc::new(lines_tx);
        let health = Arc::new(health_tx);
        let cancel = self.cancel.child_token();

        debug!(service, "starting log feed");
        tokio::spawn(feed_task(
            service.to_owned(),
            self.fetch.clone(),
            Arc::clone(&lines),
            Arc::clone(&health),
            self.period,
            cancel.clone(),
        ));

        LogFeed {
            lines,
            health,
            cancel,
            tails: 0,
        }
    }
}

/// Poll loop for one service's log feed.
///
/// Fetches immediately, then on the period. A zero period means fetch
/// once and idle until teardown.
async fn feed_task(
    service: String,
    fetch: LogFetcher,
    lines: Arc<watch::Sender<Arc<Vec<String>>>>,
    health: Arc<watch::Sender<PollHealth>>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = (!period.is_zero()).then(|| tokio::time::interval(period));
    if let Some(interval) = interval.as_mut() {
        // The loop below starts with a fetch, which covers the immediate tick.
        interval.tick().await;
    }

    loop {
        let batch = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = fetch(service.clone()) => result,
        };
        apply_batch(&service, &lines, &health, batch);

        match interval.as_mut() {
            Some(interval) => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = interval.tick() => {}
                }
            }
            None => {
                cancel.cancelled().await;
                break;
            }
        }
    }
    debug!(service, "log feed stopped");
}

/// Publish one fetched batch: reverse to newest-first, update health.
fn apply_batch(
    service: &str,
    lines: &watch::Sender<Arc<Vec<String>>>,
    health: &watch::Sender<PollHealth>,
    result: Result<Vec<String>, hubctl_api::Error>,
) {
    match result {
        Ok(mut batch) => {
            batch.reverse(); // the backend emits oldest-first
            lines.send_modify(|snap| *snap = Arc::new(batch));
            health.send_modify(|h| *h = PollHealth::Fresh { at: chrono::Utc::now() });
        }
        Err(e) => {
            warn!(service, error = %e, "log fetch failed, keeping previous batch");
            health.send_modify(|h| {
                let as_of = h.last_success();
                *h = PollHealth::Stale {
                    error: PollError::from(&e),
                    as_of,
                };
            });
        }
    }
}

/// Handle on one service's live log feed.
///
/// Holding a tail keeps the feed polling; dropping the last tail for a
/// service cancels its task and forgets the feed. Batches are
/// newest-first: index 0 is the most recent line.
pub struct LogTail {
    service: String,
    current: Arc<Vec<String>>,
    receiver: watch::Receiver<Arc<Vec<String>>>,
    health: watch::Receiver<PollHealth>,
    feeds: Arc<DashMap<String, LogFeed>>,
}

impl LogTail {
    /// The tailed service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The most recent batch this tail has observed (newest line first).
    pub fn current(&self) -> Arc<Vec<String>> {
        Arc::clone(&self.current)
    }

    /// Freshness of the feed.
    pub fn health(&self) -> PollHealth {
        self.health.borrow().clone()
    }

    /// Wait for the next poll outcome: a fresh batch, or the error that
    /// left the previous batch in place.
    ///
    /// Returns `None` if the feed is gone (hub shut down mid-tail).
    pub async fn next(&mut self) -> Option<Result<Arc<Vec<String>>, PollError>> {
        loop {
            tokio::select! {
                changed = self.receiver.changed() => {
                    changed.ok()?;
                    self.current = self.receiver.borrow_and_update().clone();
                    return Some(Ok(Arc::clone(&self.current)));
                }
                changed = self.health.changed() => {
                    changed.ok()?;
                    let stale = match &*self.health.borrow_and_update() {
                        PollHealth::Stale { error, .. } => Some(error.clone()),
                        PollHealth::Pending | PollHealth::Fresh { .. } => None,
                    };
                    if let Some(error) = stale {
                        return Some(Err(error));
                    }
                    // A Fresh transition rides along with the batch itself;
                    // loop and pick it up from the lines channel.
                }
            }
        }
    }
}

impl Drop for LogTail {
    fn drop(&mut self) {
        let mut teardown = false;
        if let Some(mut feed) = self.feeds.get_mut(&self.service) {
            feed.tails = feed.tails.saturating_sub(1);
            if feed.tails == 0 {
                feed.cancel.cancel();
                teardown = true;
            }
        }
        if teardown {
            // The guard from above is gone; safe to touch the shard again.
            self.feeds.remove_if(&self.service, |_, feed| feed.tails == 0);
            debug!(service = %self.service, "log feed released");
        }
    }
}
