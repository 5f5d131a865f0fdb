// hubctl-core: Reactive data layer between hubctl-api and consumers (CLI).
//
// The admin API speaks in raw wire records; this crate turns them into
// typed domain models, keeps them fresh in watchable stores, and wraps
// the whole thing in a `Hub` session with explicit lifecycle.

pub mod config;
pub mod convert;
pub mod error;
pub mod hub;
pub mod model;
pub mod store;
pub mod stream;

// ── Primary re-exports ──

pub use config::{HubConfig, TlsVerification};
pub use error::CoreError;
pub use hub::{ApplyPolicy, Hub};
pub use model::{Account, Device, OnlineStatus, ServiceState, ServiceStatus, Subdevice};
pub use store::{FastPollHold, LogStore, LogTail, PollError, PollErrorKind, PollHealth, PollStore};
pub use stream::SnapshotStream;

// Command verbs and the account update body cross the API boundary
// unchanged, so consumers get them from here.
pub use hubctl_api::models::{AccountUpdate, ServiceCommand};
