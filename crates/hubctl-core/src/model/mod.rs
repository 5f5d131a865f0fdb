// ── Hub domain model ──
//
// Canonical representations of hub entities. These normalize the admin
// API's wire quirks (integer status codes, stringly-typed timestamps,
// `fmware_version` spellings) into clean typed values that consumers
// depend on.

pub mod account;
pub mod device;
pub mod service;
pub mod subdevice;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use hubctl_core::model::*` gives you everything.

pub use account::Account;
pub use device::{Device, OnlineStatus};
pub use service::{ServiceState, ServiceStatus};
pub use subdevice::Subdevice;
