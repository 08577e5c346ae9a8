// Control HTTP client
//
// Wraps `reqwest::Client` with appliance-specific URL construction and
// response parsing. Both endpoints are simple POSTs; the bodies come
// from the codec so the wire shapes live in one place.

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::codec::{self, ControlCommand, SystemOp};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Response body of `POST /status`.
#[derive(Debug, Deserialize)]
struct ArmedAck {
    armed: bool,
}

/// HTTP client for the appliance control endpoints.
///
/// A failed call never implies a state change on the appliance --
/// callers must treat errors as "no evidence" and leave their own view
/// untouched.
pub struct ControlClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ControlClient {
    /// Create a control client from a `TransportConfig`.
    ///
    /// `base_url` is the appliance root, e.g. `http://alarm.local:8080`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a control client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The appliance base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Arm or disarm the alarm.
    ///
    /// `POST /status` with `{"armed": <bool>}`. The synchronous response
    /// carries the authoritative armed flag, which is returned to the
    /// caller for reconciliation.
    pub async fn set_armed(&self, armed: bool) -> Result<bool, Error> {
        let url = self.endpoint("/status")?;
        debug!(armed, %url, "POST /status");

        let body = codec::encode_command(&ControlCommand::SetArmed(armed));
        let resp = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::ControlApi {
                message: format!("HTTP {status}: {}", preview(&body)),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let ack: ArmedAck = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })?;
        Ok(ack.armed)
    }

    /// Run a system-level operation (shutdown, reboot, check-updates).
    ///
    /// `POST /system` with `{"operation": ...}`. The appliance replies
    /// with a short opaque body (e.g. `"rebooting"`) which is surfaced
    /// as-is -- system operations never affect armed/door state.
    pub async fn system_operation(&self, op: SystemOp) -> Result<String, Error> {
        let url = self.endpoint("/system")?;
        debug!(operation = %op, %url, "POST /system");

        let body = codec::encode_command(&ControlCommand::System(op));
        let resp = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::ControlApi {
                message: format!("HTTP {status}: {}", preview(&body)),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        debug!(operation = %op, response = %body, "system operation acknowledged");
        Ok(body)
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }
}

/// Truncate a response body for error messages.
fn preview(body: &str) -> &str {
    &body[..body.len().min(200)]
}
