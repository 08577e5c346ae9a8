use thiserror::Error;

/// Top-level error type for the `doorlink-api` crate.
///
/// Covers both API surfaces: the HTTP control endpoints and the
/// WebSocket push channel. `doorlink-core` maps these into
/// user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Appliance URL uses a scheme the push channel cannot map to ws/wss.
    #[error("Unsupported URL scheme for push channel: {scheme}")]
    UnsupportedScheme { scheme: String },

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Control API ─────────────────────────────────────────────────
    /// The control endpoint rejected the request or returned a
    /// non-success status.
    #[error("Control API error: {message}")]
    ControlApi { message: String },

    // ── Push channel ────────────────────────────────────────────────
    /// WebSocket connection failed or dropped with an error.
    #[error("Push channel failed: {0}")]
    ChannelConnect(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::ChannelConnect(_) => true,
            _ => false,
        }
    }
}
