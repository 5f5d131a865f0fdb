// ── Service domain types ──

use serde::{Deserialize, Serialize};

/// Supervisor state of a managed backend service.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[non_exhaustive]
pub enum ServiceState {
    Running,
    Stopped,
    /// Exited and not being restarted by the supervisor.
    Down,
    #[default]
    Unknown,
}

impl ServiceState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// A supervised backend service (e.g. `MQTT Service`, `Local Agent`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub name: String,
    pub state: ServiceState,
    pub pid: Option<i64>,
    /// Exit code of the last run, for services that have stopped.
    pub exit_code: Option<i64>,
    /// Human description; absent on older backends.
    pub description: Option<String>,
}
