// ── Subdevice domain types ──

use serde::{Deserialize, Serialize};

/// A sensor or valve paired through a hub device rather than directly
/// to the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subdevice {
    pub id: String,
    /// Hardware identifier, when it differs from `id`.
    pub true_id: Option<String>,
    /// Hardware type string (e.g. `ms100`, `mts100v3`).
    pub kind: Option<String>,
    pub vendor: Option<String>,
    /// User-assigned name.
    pub name: Option<String>,
    /// UUID of the hub device this subdevice hangs off.
    pub hub_uuid: Option<String>,
}

impl Subdevice {
    /// Best available display name: the user-assigned name, else the
    /// hardware type, else the id.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.kind.as_deref())
            .unwrap_or(&self.id)
    }
}
