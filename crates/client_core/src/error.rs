use shared::error::ApiError;
use thiserror::Error;

/// Outcome of a fetch that did not produce data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Superseded by a newer request or the controller was unmounted. Never
    /// shown to the user.
    #[error("request cancelled")]
    Cancelled,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}
