// ── Reactive snapshot streams ──
//
// Wraps a `watch::Receiver` of whole-collection snapshots with a small
// convenience API: grab the current value, await the next replacement,
// or convert into a `futures_core::Stream` for combinator-style
// consumers.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A live view of one polled collection.
///
/// Every poll cycle replaces the snapshot wholesale; [`changed`] resolves
/// once per replacement with the new value. Intermediate snapshots may be
/// skipped if the consumer lags -- the latest one always wins.
///
/// [`changed`]: SnapshotStream::changed
pub struct SnapshotStream<T> {
    current: Arc<Vec<T>>,
    receiver: watch::Receiver<Arc<Vec<T>>>,
}

impl<T> SnapshotStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<Arc<Vec<T>>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The most recent snapshot this stream has observed.
    pub fn current(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.current)
    }

    /// Wait for the next snapshot replacement.
    ///
    /// Returns `None` once the producing store has shut down.
    pub async fn changed(&mut self) -> Option<Arc<Vec<T>>> {
        self.receiver.changed().await.ok()?;
        self.current = self.receiver.borrow_and_update().clone();
        Some(Arc::clone(&self.current))
    }

    /// The newest value in the channel without waiting. May be ahead of
    /// what [`changed`](Self::changed) last returned.
    pub fn latest(&self) -> Arc<Vec<T>> {
        self.receiver.borrow().clone()
    }
}

impl<T: Send + Sync + 'static> SnapshotStream<T> {
    /// Convert into a [`futures_core::Stream`] of snapshots.
    pub fn into_stream(self) -> SnapshotWatchStream<T> {
        SnapshotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter over a snapshot watch channel.
pub struct SnapshotWatchStream<T: Send + Sync + 'static> {
    inner: WatchStream<Arc<Vec<T>>>,
}

impl<T: Send + Sync + 'static> futures_core::Stream for SnapshotWatchStream<T> {
    type Item = Arc<Vec<T>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().inner).poll_next(cx)
    }
}
