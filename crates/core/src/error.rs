use crate::config::Anchor;

/// Result alias that carries the custom [`VisualiserError`] type.
pub type Result<T> = std::result::Result<T, VisualiserError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum VisualiserError {
    /// The caller handed over data that breaks the input contract, such as a
    /// snapshot of odd length or a zero column count.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// The configured anchor cannot be laid out. The frame is dropped whole.
    #[error("unsupported anchor mode {0:?}")]
    UnsupportedAnchor(Anchor),
    /// Configuration documents that fail to parse.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl VisualiserError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    /// Returns `true` for errors that only cost the current frame.
    pub fn is_frame_local(&self) -> bool {
        matches!(self, Self::UnsupportedAnchor(_))
    }
}

impl From<&str> for VisualiserError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for VisualiserError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
