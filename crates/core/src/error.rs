/// Result alias that carries the custom [`ReplayError`] type.
pub type Result<T> = std::result::Result<T, ReplayError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// Free-form error used for conditions that do not warrant their own
    /// variant, such as poisoned locks inside shared handles.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// A session payload could not be deserialized.
    #[error("malformed session payload: {0}")]
    Payload(#[from] serde_json::Error),
    /// A channel arrived with mismatched time/value array lengths.
    #[error("channel `{name}` carries {times} timestamps but {values} values")]
    ChannelShape {
        name: String,
        times: usize,
        values: usize,
    },
}

impl ReplayError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for ReplayError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for ReplayError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
