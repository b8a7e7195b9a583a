/// Convenience result type used across enframe.
pub type FrameResult<T> = Result<T, FrameError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Errors are reported per unit of work (one render, one batch item); the
/// engine never retries internally.
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    /// A configuration-supplied color string failed validation.
    #[error("invalid color for {field}: \"{value}\"")]
    InvalidColor {
        /// Name of the offending configuration field.
        field: &'static str,
        /// The raw color string as supplied.
        value: String,
    },

    /// A gradient stop passed string validation but is not renderable.
    #[error("gradient rejected color stops \"{start}\" and \"{end}\"")]
    GradientColor {
        /// Raw start stop value.
        start: String,
        /// Raw end stop value.
        end: String,
    },

    /// The host cannot provide a 2D drawing surface. Fatal for that render.
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// A source file could not be decoded into a usable image.
    #[error("decode error: {0}")]
    Decode(String),

    /// The drawing surface failed to produce an output blob.
    #[error("encode error: {0}")]
    Encode(String),

    /// Invalid user-provided configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Every item in a bulk batch failed.
    #[error("batch failed: all {count} items failed")]
    BatchFailed {
        /// Number of failed items.
        count: usize,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FrameError {
    /// Build a [`FrameError::InvalidColor`] value.
    pub fn invalid_color(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidColor {
            field,
            value: value.into(),
        }
    }

    /// Build a [`FrameError::GradientColor`] value.
    pub fn gradient_color(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::GradientColor {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Build a [`FrameError::SurfaceUnavailable`] value.
    pub fn surface_unavailable(msg: impl Into<String>) -> Self {
        Self::SurfaceUnavailable(msg.into())
    }

    /// Build a [`FrameError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`FrameError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`FrameError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
