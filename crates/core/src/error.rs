/// Result alias that carries the custom [`ButtonError`] type.
pub type Result<T> = std::result::Result<T, ButtonError>;

/// Common error type for the core crate.
///
/// Refused playback is deliberately absent: a muted or busy gate is a normal
/// outcome and is reported as `None` by [`crate::PlaybackGate::try_play`].
#[derive(Debug, thiserror::Error)]
pub enum ButtonError {
    /// A display element the feature depends on was never provided.
    #[error("required display element `{0}` is missing")]
    ConfigurationMissing(&'static str),
    /// Navigation targeted an index outside of the active catalog.
    #[error("index {index} is out of range for a catalog of {len} items")]
    InvalidIndex { index: usize, len: usize },
    /// The audio backend rejected a playback request.
    #[error("playback of `{url}` failed: {reason}")]
    PlaybackFailure { url: String, reason: String },
    /// A catalog (or level) without any items.
    #[error("catalog `{0}` contains no items")]
    EmptyCatalog(String),
    /// A level name that the catalog set does not know about.
    #[error("unknown level `{0}`")]
    UnknownLevel(String),
    /// Free-form message, mostly used by the script parser.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed configuration or catalog JSON.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl ButtonError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    /// Builds a [`ButtonError::PlaybackFailure`] for `url`.
    pub fn playback<U: Into<String>, R: Into<String>>(url: U, reason: R) -> Self {
        Self::PlaybackFailure {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

impl From<&str> for ButtonError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for ButtonError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
