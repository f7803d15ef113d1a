//! Media source capability contracts
//!
//! A source produces media: from a device, an external feed or a test
//! generator. The transport layer drives its lifecycle and subscribes to
//! its delivery channels without knowing the concrete implementation.
//!
//! Lifecycle operations are asynchronous and may suspend while device or
//! encoder resources are acquired or released; a caller cancels them only
//! by issuing `close()`. On failure the source stays in its pre-call
//! state. Samples produced while `Paused` are dropped, never buffered,
//! and resuming continues from the paused point without replay.
//!
//! The active output format may be pinned in `Created` or `Paused`;
//! changing it while `Started` is rejected so in-flight samples are never
//! silently dropped.

use crate::buffer::RawImage;
use crate::error::Result;
use crate::events::{AudioSourceEvents, TextSourceEvents, VideoSourceEvents};
use crate::format::{AudioFormat, AudioSamplingRate, TextFormat, VideoFormat, VideoPixelFormat};
use crate::lifecycle::MediaState;
use async_trait::async_trait;

/// Capability contract of an audio-producing component
#[async_trait]
pub trait AudioSource: Send + Sync {
    /// Begin producing samples; valid only from `Created`
    async fn start(&mut self) -> Result<()>;

    /// Stop producing without releasing resources; valid only from `Started`
    async fn pause(&mut self) -> Result<()>;

    /// Restart production from the paused point; valid only from `Paused`
    async fn resume(&mut self) -> Result<()>;

    /// Release all resources; valid from any state, idempotent once closed
    async fn close(&mut self) -> Result<()>;

    /// Current lifecycle state
    fn state(&self) -> MediaState;

    /// Whether the source is currently paused
    fn is_paused(&self) -> bool {
        self.state() == MediaState::Paused
    }

    /// The full supported-format list; does not mutate state
    fn source_formats(&self) -> Vec<AudioFormat>;

    /// Pin the active output format
    fn set_source_format(&mut self, format: &AudioFormat) -> Result<()>;

    /// Narrow the supported-format list for future negotiation
    fn restrict_formats(&mut self, keep: &dyn Fn(&AudioFormat) -> bool);

    /// Inject an externally produced raw sample, bypassing capture but not
    /// encoding
    fn external_raw_sample(
        &mut self,
        rate: AudioSamplingRate,
        duration_ms: u32,
        pcm: &[i16],
    ) -> Result<()>;

    /// Delivery channels for subscription
    fn events(&self) -> &AudioSourceEvents;

    /// Whether anyone is listening on the encoded channel
    ///
    /// Lets the source skip its encoder for a captured frame nobody wants;
    /// purely an optimization, never correctness-affecting.
    fn has_encoded_subscribers(&self) -> bool {
        self.events().encoded.has_subscribers()
    }
}

/// Capability contract of a video-producing component
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Begin producing samples; valid only from `Created`
    async fn start(&mut self) -> Result<()>;

    /// Stop producing without releasing resources; valid only from `Started`
    async fn pause(&mut self) -> Result<()>;

    /// Restart production from the paused point; valid only from `Paused`
    async fn resume(&mut self) -> Result<()>;

    /// Release all resources; valid from any state, idempotent once closed
    async fn close(&mut self) -> Result<()>;

    /// Current lifecycle state
    fn state(&self) -> MediaState;

    /// Whether the source is currently paused
    fn is_paused(&self) -> bool {
        self.state() == MediaState::Paused
    }

    /// The full supported-format list; does not mutate state
    fn source_formats(&self) -> Vec<VideoFormat>;

    /// Pin the active output format
    fn set_source_format(&mut self, format: &VideoFormat) -> Result<()>;

    /// Narrow the supported-format list for future negotiation
    fn restrict_formats(&mut self, keep: &dyn Fn(&VideoFormat) -> bool);

    /// Inject an externally produced frame as a packed byte buffer
    fn external_raw_sample(
        &mut self,
        duration_ms: u32,
        width: u32,
        height: u32,
        pixels: &[u8],
        pixel_format: VideoPixelFormat,
    ) -> Result<()>;

    /// Inject an externally produced frame as a borrowed view (fast path)
    ///
    /// The view is only valid for the duration of this call.
    fn external_raw_image(&mut self, duration_ms: u32, image: &RawImage<'_>) -> Result<()>;

    /// Ask the encoder to make the next encoded frame a key frame
    fn force_key_frame(&mut self);

    /// Delivery channels for subscription
    fn events(&self) -> &VideoSourceEvents;

    /// Whether anyone is listening on the encoded channel
    fn has_encoded_subscribers(&self) -> bool {
        self.events().encoded.has_subscribers()
    }
}

/// Capability contract of a text-producing component
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Begin producing samples; valid only from `Created`
    async fn start(&mut self) -> Result<()>;

    /// Stop producing without releasing resources; valid only from `Started`
    async fn pause(&mut self) -> Result<()>;

    /// Restart production from the paused point; valid only from `Paused`
    async fn resume(&mut self) -> Result<()>;

    /// Release all resources; valid from any state, idempotent once closed
    async fn close(&mut self) -> Result<()>;

    /// Current lifecycle state
    fn state(&self) -> MediaState;

    /// Whether the source is currently paused
    fn is_paused(&self) -> bool {
        self.state() == MediaState::Paused
    }

    /// The full supported-format list; does not mutate state
    fn source_formats(&self) -> Vec<TextFormat>;

    /// Pin the active output format
    fn set_source_format(&mut self, format: &TextFormat) -> Result<()>;

    /// Narrow the supported-format list for future negotiation
    fn restrict_formats(&mut self, keep: &dyn Fn(&TextFormat) -> bool);

    /// Feed text to be encoded and delivered on the encoded channel
    fn send_text(&mut self, text: &str) -> Result<()>;

    /// Delivery channels for subscription
    fn events(&self) -> &TextSourceEvents;

    /// Whether anyone is listening on the encoded channel
    fn has_encoded_subscribers(&self) -> bool {
        self.events().encoded.has_subscribers()
    }
}
