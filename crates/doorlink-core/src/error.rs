use thiserror::Error;

/// Error type for the core layer.
///
/// Transport and protocol failures bubble up from `doorlink-api`
/// unchanged; the CLI maps them into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Failure from the control API or push channel.
    #[error(transparent)]
    Api(#[from] doorlink_api::Error),
}

impl CoreError {
    /// Returns `true` if this is a transient error worth retrying
    /// (manually -- commands are never retried automatically).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api(e) => e.is_transient(),
        }
    }
}
