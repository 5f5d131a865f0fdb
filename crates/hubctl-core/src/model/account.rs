// ── Account domain types ──

use serde::{Deserialize, Serialize};

/// The broker account the hub's devices authenticate against.
///
/// The password is write-only on the wire and never appears here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    pub user_id: Option<i64>,
    /// Key devices use to sign in to the local MQTT broker.
    pub mqtt_key: Option<String>,
    /// Whether the hub bridges traffic to the vendor cloud alongside
    /// local control. Absent from older backends.
    pub meross_link: Option<bool>,
}
