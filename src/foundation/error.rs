/// Convenience result type used across reelfx.
pub type FxResult<T> = Result<T, FxError>;

/// Top-level error taxonomy for effect runs.
///
/// Cancellation is deliberately absent: a cancelled run is a normal outcome
/// ([`Outcome::Cancelled`](crate::Outcome::Cancelled)), not a failure.
#[derive(thiserror::Error, Debug)]
pub enum FxError {
    /// A parameter is missing, non-numeric, or violates an effect precondition.
    ///
    /// Raised synchronously from `configure`; the run never starts.
    #[error("configuration error: {0}")]
    Config(String),

    /// A single frame could not be decoded. Fatal to the whole run.
    #[error("decode error at frame {index}: {message}")]
    Decode {
        /// Index of the frame within its source sequence.
        index: usize,
        /// Human-readable cause.
        message: String,
    },

    /// The output assembler failed to produce an artifact.
    #[error("encode error: {0}")]
    Encode(String),

    /// The scheduler was driven out of protocol (e.g. advanced with no active run).
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FxError {
    /// Build a [`FxError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`FxError::Decode`] value for frame `index`.
    pub fn decode(index: usize, msg: impl Into<String>) -> Self {
        Self::Decode {
            index,
            message: msg.into(),
        }
    }

    /// Build a [`FxError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`FxError::Pipeline`] value.
    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline(msg.into())
    }

    /// Build a [`FxError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for errors raised before any frame was processed.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
