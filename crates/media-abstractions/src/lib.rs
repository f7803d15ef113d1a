//! # Media-Abstractions: Real-Time Media Component Contracts
//!
//! This library defines the contracts that let media producers, consumers
//! and codecs interoperate in a real-time communication stack without
//! knowing each other's concrete types. A signaling layer negotiates
//! formats, a transport layer moves RTP payload, and any mix of device,
//! test or externally-fed components plugs into both through the traits
//! defined here.
//!
//! ## Features
//!
//! - **Format descriptors**: validated, immutable audio/video/text codec
//!   descriptions with the RFC 3551 static payload table built in
//! - **Capability negotiation**: order-preserving restriction of
//!   supported-format lists against a remote peer
//! - **Source/sink contracts**: a uniform `Created -> Started <-> Paused
//!   -> Closed` lifecycle with multi-subscriber delivery channels
//! - **Zero-copy video**: borrowed frame views whose validity is enforced
//!   by the borrow checker
//! - **Codec plugins**: encoder/decoder traits with externally-fed
//!   reference implementations built on them
//!
//! ## Usage
//!
//! ```rust
//! use rtc_media_abstractions::{AudioFormat, WellKnownAudioFormat, negotiate};
//!
//! let ours = vec![
//!     AudioFormat::from_well_known(WellKnownAudioFormat::Pcmu),
//!     AudioFormat::from_well_known(WellKnownAudioFormat::Pcma),
//! ];
//!
//! // Keep only what the remote peer offered.
//! let shared = negotiate::restrict_formats(&ours, |f| f.format_id() == 8);
//! assert_eq!(shared.len(), 1);
//! assert_eq!(shared[0].rtpmap(), "PCMA/8000");
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
pub mod codec;
pub mod endpoint;
pub mod error;
pub mod events;
pub mod external;
pub mod format;
pub mod lifecycle;
pub mod sink;
pub mod source;

// Re-export the types most integrations need directly.
pub use buffer::{RawImage, VideoSample};
pub use codec::{AudioEncoder, TextEncoder, VideoEncoder};
pub use endpoint::MediaEndpoints;
pub use error::{FormatError, MediaError, Result};
pub use events::{
    AudioSinkEvents, AudioSourceEvents, EventChannel, HandlerId, TextSinkEvents, TextSourceEvents,
    VideoSinkEvents, VideoSourceEvents,
};
pub use external::{
    DecodingAudioSink, DecodingTextSink, DecodingVideoSink, ExternalAudioSource,
    ExternalTextSource, ExternalVideoSource,
};
pub use format::well_known::{WellKnownAudioFormat, WellKnownVideoFormat};
pub use format::{
    negotiate, AudioCodec, AudioFormat, AudioSamplingRate, MediaFormat, TextCodec, TextFormat,
    VideoCodec, VideoFormat, VideoPixelFormat,
};
pub use lifecycle::{Lifecycle, MediaState};
pub use sink::{AudioSink, RtpPayload, TextSink, VideoSink};
pub use source::{AudioSource, TextSource, VideoSource};

/// Version information for the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
