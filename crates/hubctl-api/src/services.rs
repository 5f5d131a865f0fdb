// Admin API service endpoints
//
// The hub runs its broker pieces (MQTT, local agent, API) under a process
// supervisor; these endpoints surface supervision state, tail logs, and
// drive start/stop/restart.

use tracing::debug;

use crate::client::AdminClient;
use crate::error::Error;
use crate::models::{ServiceCommand, ServiceRecord};

impl AdminClient {
    /// List supervised services with their run state.
    ///
    /// `GET /_admin_/services`
    pub async fn list_services(&self) -> Result<Vec<ServiceRecord>, Error> {
        let url = self.admin_url("services");
        debug!("listing services");
        self.get(url).await
    }

    /// Fetch the log lines of a service, in backend order (oldest first).
    ///
    /// `GET /_admin_/services/{name}/log`
    pub async fn service_log(&self, name: &str) -> Result<Vec<String>, Error> {
        let url = self.admin_url(&format!("services/{name}/log"));
        debug!(name, "fetching service log");
        self.get(url).await
    }

    /// Execute a command on a service, returning the supervisor's verdict.
    ///
    /// `POST /_admin_/services/{name}/execute/{command}`
    ///
    /// The command segment is rendered lowercase; the backend matches
    /// `restart` case-sensitively and rejects anything else with 400.
    pub async fn execute_service_command(
        &self,
        name: &str,
        command: ServiceCommand,
    ) -> Result<bool, Error> {
        let url = self.admin_url(&format!("services/{name}/execute/{command}"));
        debug!(name, %command, "executing service command");
        self.post(url).await
    }
}
