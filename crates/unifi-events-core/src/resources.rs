// Convenience calls for common controller endpoints. All of them go
// through the guarded gateway and return the raw response body.

use serde_json::Value;

use unifi_events_api::Method;

use crate::client::EventClient;
use crate::error::CoreError;

impl EventClient {
    /// Active clients on the site (`stat/sta`).
    pub async fn list_clients(&self) -> Result<Value, CoreError> {
        self.get("stat/sta").await
    }

    /// One known client by MAC (`stat/user/{mac}`).
    pub async fn get_client(&self, mac: &str) -> Result<Value, CoreError> {
        let mac = mac.trim().to_ascii_lowercase();
        if mac.is_empty() {
            return Err(CoreError::Config {
                message: "client MAC address is required".into(),
            });
        }
        self.get(&format!("stat/user/{mac}")).await
    }

    /// Sites visible to the logged-in admin (`api/self/sites`).
    pub async fn list_sites(&self) -> Result<Value, CoreError> {
        self.request_controller(Method::GET, "self/sites", None)
            .await
    }

    /// Per-site health and counters (`api/stat/sites`). Needs a
    /// super-admin account.
    pub async fn site_stats(&self) -> Result<Value, CoreError> {
        self.request_controller(Method::GET, "stat/sites", None)
            .await
    }
}
