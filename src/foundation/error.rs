/// Crate-wide result alias.
pub type SignplayResult<T> = Result<T, SignplayError>;

/// Errors surfaced by the playback engine and its collaborators.
#[derive(thiserror::Error, Debug)]
pub enum SignplayError {
    /// Invalid input or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// The sequence source could not produce a landmark sequence.
    #[error("sequence fetch failed: {0}")]
    SequenceFetch(String),

    /// The capture backend is not available on this platform.
    #[error("capture unsupported: {0}")]
    CaptureUnsupported(String),

    /// The render surface has no drawing context.
    #[error("render surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// A download was requested before any capture session was finalized.
    #[error("nothing to download")]
    NothingToDownload,

    /// Encoding or writing a capture session failed.
    #[error("capture error: {0}")]
    Capture(String),

    /// The requested command does not apply to the current playback state.
    #[error("invalid playback state: {0}")]
    State(String),

    /// Landmark or configuration data could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, usually I/O with attached context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SignplayError {
    /// Build a [`SignplayError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SignplayError::SequenceFetch`].
    pub fn sequence_fetch(msg: impl Into<String>) -> Self {
        Self::SequenceFetch(msg.into())
    }

    /// Build a [`SignplayError::CaptureUnsupported`].
    pub fn capture_unsupported(msg: impl Into<String>) -> Self {
        Self::CaptureUnsupported(msg.into())
    }

    /// Build a [`SignplayError::SurfaceUnavailable`].
    pub fn surface_unavailable(msg: impl Into<String>) -> Self {
        Self::SurfaceUnavailable(msg.into())
    }

    /// Build a [`SignplayError::Capture`].
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`SignplayError::State`].
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Build a [`SignplayError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
