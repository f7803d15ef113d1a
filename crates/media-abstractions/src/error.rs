//! Error types for format validation and media component lifecycles
//!
//! Construction-time validation failures (`FormatError`) are kept separate
//! from steady-state lifecycle and pipeline failures (`MediaError`): a
//! format descriptor is either fully valid or never observable, while a
//! running component reports operational problems through its error
//! channel and only surfaces `MediaError` for misuse of its API.

use crate::lifecycle::MediaState;
use thiserror::Error;

/// Result type alias for media component operations
pub type Result<T> = std::result::Result<T, MediaError>;

/// Validation failure raised while constructing a format descriptor
///
/// Every variant corresponds to one invariant checked exactly once, at
/// creation. A descriptor violating any of them is never constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Format id outside the allowed `0..=127` payload type range
    #[error("format id {id} is outside the allowed range 0-127")]
    IdOutOfRange {
        /// The rejected format id
        id: u16,
    },

    /// Format name empty or whitespace-only
    #[error("the format name must not be blank")]
    BlankFormatName,

    /// Clock rate for decoded samples must be greater than zero
    #[error("invalid clock rate {rate}: must be greater than 0")]
    InvalidClockRate {
        /// The rejected clock rate
        rate: u32,
    },

    /// RTP timestamp clock rate must be greater than zero
    #[error("invalid RTP clock rate {rate}: must be greater than 0")]
    InvalidRtpClockRate {
        /// The rejected RTP clock rate
        rate: u32,
    },

    /// Audio channel count must be greater than zero
    #[error("invalid channel count {channels}: must be greater than 0")]
    InvalidChannelCount {
        /// The rejected channel count
        channels: u8,
    },

    /// An empty sentinel descriptor was passed where a real format is required
    #[error("an empty format descriptor cannot be used here")]
    EmptyFormat,
}

/// Error type for source/sink lifecycle and sample pipeline operations
#[derive(Error, Debug)]
pub enum MediaError {
    /// Operation not permitted from the component's current state
    #[error("invalid transition: cannot {operation} from {from}")]
    InvalidTransition {
        /// State the component was in when the operation was attempted
        from: MediaState,
        /// Name of the attempted operation
        operation: &'static str,
    },

    /// Component has been closed; all further operations fail
    #[error("media component is closed")]
    Closed,

    /// No active format has been pinned with `set_source_format`/`set_sink_format`
    #[error("no active media format has been set")]
    NoFormatSelected,

    /// Requested format is not in the component's supported list
    #[error("format not supported: {format}")]
    FormatNotSupported {
        /// Human-readable description of the unsupported format
        format: String,
    },

    /// Format descriptor validation failure
    #[error("invalid format: {0}")]
    Format(#[from] FormatError),

    /// Sample buffer smaller than its declared dimensions require
    #[error("sample buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall {
        /// Bytes required by the declared dimensions
        needed: usize,
        /// Bytes actually present in the buffer
        actual: usize,
    },

    /// Sample buffer dimensions are not usable
    #[error("invalid sample dimensions: {width}x{height} with stride {stride}")]
    InvalidDimensions {
        /// Declared frame width in pixels
        width: u32,
        /// Declared frame height in pixels
        height: u32,
        /// Declared row stride in bytes
        stride: usize,
    },

    /// Encoding operation failed
    #[error("encoding failed: {reason}")]
    EncodingFailed {
        /// Description of the encoding failure
        reason: String,
    },

    /// Decoding operation failed
    #[error("decoding failed: {reason}")]
    DecodingFailed {
        /// Description of the decoding failure
        reason: String,
    },

    /// Underlying device or feed resource failed
    #[error("media resource failed: {reason}")]
    ResourceFailed {
        /// Description of the resource failure
        reason: String,
    },
}

impl MediaError {
    /// Create a new encoding failed error
    pub fn encoding_failed(reason: impl Into<String>) -> Self {
        Self::EncodingFailed {
            reason: reason.into(),
        }
    }

    /// Create a new decoding failed error
    pub fn decoding_failed(reason: impl Into<String>) -> Self {
        Self::DecodingFailed {
            reason: reason.into(),
        }
    }

    /// Create a new resource failure error
    pub fn resource_failed(reason: impl Into<String>) -> Self {
        Self::ResourceFailed {
            reason: reason.into(),
        }
    }

    /// Create a new format-not-supported error from any format's rtpmap form
    pub fn format_not_supported(format: impl Into<String>) -> Self {
        Self::FormatNotSupported {
            format: format.into(),
        }
    }
}
