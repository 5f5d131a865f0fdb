// ── Reactive stores ──
//
// Polled collection snapshots and on-demand log feeds, with push-based
// change notification over `watch` channels.

mod logs;
mod poll;

pub use logs::{LogStore, LogTail};
pub use poll::{FastPollHold, PollError, PollErrorKind, PollHealth, PollStore};

pub(crate) use logs::{LinesFuture, LogFetcher};
pub(crate) use poll::poll_task;
