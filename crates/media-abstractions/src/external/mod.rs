//! Externally-fed source and sink implementations
//!
//! These variants are backed by an external feed instead of a local
//! device: the transport (or an application) injects raw samples into the
//! sources and received RTP payload into the sinks, while encoding and
//! decoding go through a plugged-in codec. They are the network-fed
//! members of the interchangeable source/sink variant family and double
//! as the reference implementations of the lifecycle contracts.

mod audio;
mod text;
mod video;

pub use audio::{DecodingAudioSink, ExternalAudioSource};
pub use text::{DecodingTextSink, ExternalTextSource};
pub use video::{DecodingVideoSink, ExternalVideoSource};

use crate::error::{FormatError, MediaError, Result};
use crate::format::MediaFormat;
use crate::lifecycle::{Lifecycle, MediaState};
use std::fmt;

/// Outcome of gating a sample-delivery operation on the lifecycle state
pub(crate) enum DeliveryGate {
    /// Component is started; deliver the sample
    Deliver,
    /// Component is paused; the sample is dropped by design
    DropPaused,
}

/// Check whether a delivery operation may proceed in the current state
///
/// Delivery into a `Created` component is a caller error; after `Closed`
/// every operation fails.
pub(crate) fn gate_delivery(
    lifecycle: &Lifecycle,
    operation: &'static str,
) -> Result<DeliveryGate> {
    match lifecycle.state() {
        MediaState::Started => Ok(DeliveryGate::Deliver),
        MediaState::Paused => Ok(DeliveryGate::DropPaused),
        MediaState::Closed => Err(MediaError::Closed),
        from @ MediaState::Created => Err(MediaError::InvalidTransition { from, operation }),
    }
}

/// Validate a requested active format against the supported list
///
/// The pinned value is the caller's descriptor (it may carry session-local
/// parameters), matched against the list by negotiation identity.
pub(crate) fn select_format<F>(supported: &[F], requested: &F) -> Result<F>
where
    F: MediaFormat + Clone + fmt::Display,
{
    if requested.is_empty() {
        return Err(FormatError::EmptyFormat.into());
    }
    if supported.iter().any(|f| f.negotiation_matches(requested)) {
        Ok(requested.clone())
    } else {
        Err(MediaError::format_not_supported(requested.to_string()))
    }
}

/// Convert a millisecond duration to RTP timestamp units at `rtp_clock_rate`
pub(crate) fn duration_rtp_units(duration_ms: u32, rtp_clock_rate: u32) -> u32 {
    (u64::from(duration_ms) * u64::from(rtp_clock_rate) / 1000) as u32
}
