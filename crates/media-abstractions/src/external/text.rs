//! Externally-fed real-time text source and decoding text sink

use super::{gate_delivery, select_format, DeliveryGate};
use crate::codec::TextEncoder;
use crate::error::{MediaError, Result};
use crate::events::{TextSinkEvents, TextSourceEvents};
use crate::format::negotiate;
use crate::format::TextFormat;
use crate::lifecycle::{Lifecycle, MediaState};
use crate::sink::{RtpPayload, TextSink};
use crate::source::TextSource;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::warn;

/// Text source fed by an application instead of an input device
///
/// Text pushed in through [`send_text`](TextSource::send_text) is encoded
/// with the plugged-in codec and fanned out on the encoded channel. There
/// is no raw channel for text; the input string is the raw form.
pub struct ExternalTextSource {
    lifecycle: Lifecycle,
    encoder: Mutex<Box<dyn TextEncoder>>,
    formats: Vec<TextFormat>,
    active: Option<TextFormat>,
    events: TextSourceEvents,
}

impl ExternalTextSource {
    /// Create a source backed by the given codec
    pub fn new(encoder: Box<dyn TextEncoder>) -> Self {
        let formats = encoder
            .supported_formats()
            .into_iter()
            .filter(|f| !f.is_empty())
            .collect();
        Self {
            lifecycle: Lifecycle::new(),
            encoder: Mutex::new(encoder),
            formats,
            active: None,
            events: TextSourceEvents::default(),
        }
    }

    /// The currently pinned output format, if any
    pub fn active_format(&self) -> Option<&TextFormat> {
        self.active.as_ref()
    }
}

#[async_trait]
impl TextSource for ExternalTextSource {
    async fn start(&mut self) -> Result<()> {
        self.lifecycle.start()
    }

    async fn pause(&mut self) -> Result<()> {
        self.lifecycle.pause()
    }

    async fn resume(&mut self) -> Result<()> {
        self.lifecycle.resume()
    }

    async fn close(&mut self) -> Result<()> {
        self.lifecycle.close();
        Ok(())
    }

    fn state(&self) -> MediaState {
        self.lifecycle.state()
    }

    fn source_formats(&self) -> Vec<TextFormat> {
        self.formats.clone()
    }

    fn set_source_format(&mut self, format: &TextFormat) -> Result<()> {
        self.lifecycle.ensure_format_change_allowed()?;
        self.active = Some(select_format(&self.formats, format)?);
        Ok(())
    }

    fn restrict_formats(&mut self, keep: &dyn Fn(&TextFormat) -> bool) {
        self.formats = negotiate::restrict_formats(&self.formats, keep);
    }

    fn send_text(&mut self, text: &str) -> Result<()> {
        match gate_delivery(&self.lifecycle, "send text")? {
            DeliveryGate::DropPaused => return Ok(()),
            DeliveryGate::Deliver => {}
        }
        if !self.events.encoded.has_subscribers() {
            return Ok(());
        }
        let format = self.active.as_ref().ok_or(MediaError::NoFormatSelected)?;
        match self.encoder.lock().encode(text, format) {
            Ok(encoded) => {
                self.events.encoded.dispatch(|h| h(&encoded));
            }
            Err(e) => {
                warn!("text encode failed for {}: {}", format.rtpmap(), e);
                let report = e.to_string();
                self.events.error.dispatch(|h| h(&report));
            }
        }
        Ok(())
    }

    fn events(&self) -> &TextSourceEvents {
        &self.events
    }
}

/// Text sink that decodes received RTP payload through a plugged-in codec
pub struct DecodingTextSink {
    lifecycle: Lifecycle,
    decoder: Mutex<Box<dyn TextEncoder>>,
    formats: Vec<TextFormat>,
    active: Option<TextFormat>,
    events: TextSinkEvents,
}

impl DecodingTextSink {
    /// Create a sink backed by the given codec
    pub fn new(decoder: Box<dyn TextEncoder>) -> Self {
        let formats = decoder
            .supported_formats()
            .into_iter()
            .filter(|f| !f.is_empty())
            .collect();
        Self {
            lifecycle: Lifecycle::new(),
            decoder: Mutex::new(decoder),
            formats,
            active: None,
            events: TextSinkEvents::default(),
        }
    }

    /// The currently pinned decode format, if any
    pub fn active_format(&self) -> Option<&TextFormat> {
        self.active.as_ref()
    }
}

#[async_trait]
impl TextSink for DecodingTextSink {
    async fn start(&mut self) -> Result<()> {
        self.lifecycle.start()
    }

    async fn pause(&mut self) -> Result<()> {
        self.lifecycle.pause()
    }

    async fn resume(&mut self) -> Result<()> {
        self.lifecycle.resume()
    }

    async fn close(&mut self) -> Result<()> {
        self.lifecycle.close();
        Ok(())
    }

    fn state(&self) -> MediaState {
        self.lifecycle.state()
    }

    fn sink_formats(&self) -> Vec<TextFormat> {
        self.formats.clone()
    }

    fn set_sink_format(&mut self, format: &TextFormat) -> Result<()> {
        self.lifecycle.ensure_format_change_allowed()?;
        self.active = Some(select_format(&self.formats, format)?);
        Ok(())
    }

    fn restrict_formats(&mut self, keep: &dyn Fn(&TextFormat) -> bool) {
        self.formats = negotiate::restrict_formats(&self.formats, keep);
    }

    fn got_rtp(&mut self, packet: &RtpPayload<'_>) -> Result<()> {
        match gate_delivery(&self.lifecycle, "deliver rtp")? {
            DeliveryGate::DropPaused => return Ok(()),
            DeliveryGate::Deliver => {}
        }
        let format = self.active.as_ref().ok_or(MediaError::NoFormatSelected)?;

        if packet.payload_id != format.format_id() {
            warn!(
                "dropping rtp payload id {} while pinned to {}",
                packet.payload_id, format
            );
            let report = format!(
                "unexpected rtp payload id {} (expected {})",
                packet.payload_id,
                format.format_id()
            );
            self.events.error.dispatch(|h| h(&report));
            return Ok(());
        }

        match self.decoder.lock().decode(packet.payload, format) {
            Ok(text) => {
                self.events.text.dispatch(|h| h(&text));
            }
            Err(e) => {
                warn!("text decode failed for {}: {}", format.rtpmap(), e);
                let report = e.to_string();
                self.events.error.dispatch(|h| h(&report));
            }
        }
        Ok(())
    }

    fn events(&self) -> &TextSinkEvents {
        &self.events
    }
}
