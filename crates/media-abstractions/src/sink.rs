//! Media sink capability contracts
//!
//! A sink consumes received RTP payload and delivers decoded media. The
//! external packetizer/transport guarantees unduplicated but possibly
//! reordered delivery; reassembly and decode ordering for a media kind is
//! the sink's responsibility. Lifecycle semantics mirror the source side,
//! including the format-change policy (pin in `Created` or `Paused` only).

use crate::error::Result;
use crate::events::{AudioSinkEvents, TextSinkEvents, VideoSinkEvents};
use crate::format::{AudioFormat, TextFormat, VideoFormat};
use crate::lifecycle::MediaState;
use async_trait::async_trait;
use std::net::SocketAddr;

/// One received, still-encoded RTP payload
///
/// Borrowed view handed to [`got_rtp`](AudioSink::got_rtp); the payload
/// bytes are only valid for the duration of the call.
#[derive(Debug, Clone, Copy)]
pub struct RtpPayload<'a> {
    /// Address the packet arrived from
    pub remote: SocketAddr,
    /// Synchronization source of the stream
    pub ssrc: u32,
    /// RTP sequence number
    pub seqnum: u16,
    /// RTP timestamp in the format's RTP clock units
    pub timestamp: u32,
    /// Payload type carried in the RTP header
    pub payload_id: u8,
    /// RTP marker bit (end-of-frame for video)
    pub marker: bool,
    /// The encoded payload bytes
    pub payload: &'a [u8],
}

/// Capability contract of an audio-consuming component
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Begin ingesting; valid only from `Created`
    async fn start(&mut self) -> Result<()>;

    /// Stop ingesting without releasing resources; valid only from `Started`
    async fn pause(&mut self) -> Result<()>;

    /// Resume ingesting; valid only from `Paused`
    async fn resume(&mut self) -> Result<()>;

    /// Release all resources; valid from any state, idempotent once closed
    async fn close(&mut self) -> Result<()>;

    /// Current lifecycle state
    fn state(&self) -> MediaState;

    /// The full supported-format list; does not mutate state
    fn sink_formats(&self) -> Vec<AudioFormat>;

    /// Pin the format incoming payload will be decoded as
    fn set_sink_format(&mut self, format: &AudioFormat) -> Result<()>;

    /// Narrow the supported-format list for future negotiation
    fn restrict_formats(&mut self, keep: &dyn Fn(&AudioFormat) -> bool);

    /// Deliver one received RTP payload for decoding
    fn got_rtp(&mut self, packet: &RtpPayload<'_>) -> Result<()>;

    /// Delivery channels for subscription
    fn events(&self) -> &AudioSinkEvents;
}

/// Capability contract of a video-consuming component
#[async_trait]
pub trait VideoSink: Send + Sync {
    /// Begin ingesting; valid only from `Created`
    async fn start(&mut self) -> Result<()>;

    /// Stop ingesting without releasing resources; valid only from `Started`
    async fn pause(&mut self) -> Result<()>;

    /// Resume ingesting; valid only from `Paused`
    async fn resume(&mut self) -> Result<()>;

    /// Release all resources; valid from any state, idempotent once closed
    async fn close(&mut self) -> Result<()>;

    /// Current lifecycle state
    fn state(&self) -> MediaState;

    /// The full supported-format list; does not mutate state
    fn sink_formats(&self) -> Vec<VideoFormat>;

    /// Pin the format incoming payload will be decoded as
    fn set_sink_format(&mut self, format: &VideoFormat) -> Result<()>;

    /// Narrow the supported-format list for future negotiation
    fn restrict_formats(&mut self, keep: &dyn Fn(&VideoFormat) -> bool);

    /// Deliver one received RTP payload; the sink reassembles frames
    fn got_rtp(&mut self, packet: &RtpPayload<'_>) -> Result<()>;

    /// Deliver an already-reassembled encoded frame, bypassing per-packet
    /// reassembly
    fn got_frame(
        &mut self,
        remote: SocketAddr,
        timestamp: u32,
        payload: &[u8],
        format: &VideoFormat,
    ) -> Result<()>;

    /// Delivery channels for subscription
    fn events(&self) -> &VideoSinkEvents;
}

/// Capability contract of a text-consuming component
#[async_trait]
pub trait TextSink: Send + Sync {
    /// Begin ingesting; valid only from `Created`
    async fn start(&mut self) -> Result<()>;

    /// Stop ingesting without releasing resources; valid only from `Started`
    async fn pause(&mut self) -> Result<()>;

    /// Resume ingesting; valid only from `Paused`
    async fn resume(&mut self) -> Result<()>;

    /// Release all resources; valid from any state, idempotent once closed
    async fn close(&mut self) -> Result<()>;

    /// Current lifecycle state
    fn state(&self) -> MediaState;

    /// The full supported-format list; does not mutate state
    fn sink_formats(&self) -> Vec<TextFormat>;

    /// Pin the format incoming payload will be decoded as
    fn set_sink_format(&mut self, format: &TextFormat) -> Result<()>;

    /// Narrow the supported-format list for future negotiation
    fn restrict_formats(&mut self, keep: &dyn Fn(&TextFormat) -> bool);

    /// Deliver one received RTP payload for decoding
    fn got_rtp(&mut self, packet: &RtpPayload<'_>) -> Result<()>;

    /// Delivery channels for subscription
    fn events(&self) -> &TextSinkEvents;
}
