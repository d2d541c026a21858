// ── Session-guarded requests ──
//
// Every REST call goes through `guarded`: probe the session, log in
// again if the probe fails, then send exactly once. A failed re-login
// fails the call without sending it.

use serde_json::Value;
use tracing::debug;
use url::Url;

use unifi_events_api::Method;

use crate::client::{EventClient, LoginAttempt};
use crate::error::CoreError;

impl EventClient {
    /// Site-scoped request: `{base}/api/s/{site}/{path}`.
    ///
    /// Returns the full response body, envelope included.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, CoreError> {
        let url = self.inner.session.site_url(path)?;
        self.guarded(method, url, body).await
    }

    /// Controller-level request: `{base}/api/{path}`.
    pub async fn request_controller(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, CoreError> {
        let url = self.inner.session.api_url(path)?;
        self.guarded(method, url, body).await
    }

    pub async fn get(&self, path: &str) -> Result<Value, CoreError> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, CoreError> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, CoreError> {
        self.request(Method::DELETE, path, None).await
    }

    async fn guarded(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Value, CoreError> {
        let session = &self.inner.session;

        if let Err(e) = session.check_session().await {
            debug!(error = %e, "session probe failed, logging in again");
            if let Err(login_err) = self.login(LoginAttempt::Normal).await {
                return Err(CoreError::Reauthentication {
                    message: login_err.to_string(),
                });
            }
        }

        Ok(session.send(method, url, body).await?)
    }
}

// ── Response helpers ─────────────────────────────────────────────────

/// The `data` array of a `{ meta, data }` envelope; empty if absent.
pub fn data_of(body: &Value) -> &[Value] {
    body.get("data")
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}
