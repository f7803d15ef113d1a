//! Externally-fed audio source and decoding audio sink

use super::{gate_delivery, select_format, duration_rtp_units, DeliveryGate};
use crate::codec::AudioEncoder;
use crate::error::{MediaError, Result};
use crate::events::{AudioSinkEvents, AudioSourceEvents};
use crate::format::negotiate;
use crate::format::{AudioFormat, AudioSamplingRate};
use crate::lifecycle::{Lifecycle, MediaState};
use crate::sink::{AudioSink, RtpPayload};
use crate::source::AudioSource;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::warn;

/// Audio source fed by an external producer instead of a capture device
///
/// Raw PCM is pushed in through
/// [`external_raw_sample`](AudioSource::external_raw_sample); each accepted
/// sample is fanned out on the raw channel and, when anyone is listening
/// on the encoded channel, run through the plugged-in codec and fanned out
/// there as well. The supported-format list is seeded from the codec.
pub struct ExternalAudioSource {
    lifecycle: Lifecycle,
    encoder: Mutex<Box<dyn AudioEncoder>>,
    formats: Vec<AudioFormat>,
    active: Option<AudioFormat>,
    events: AudioSourceEvents,
}

impl ExternalAudioSource {
    /// Create a source backed by the given codec
    pub fn new(encoder: Box<dyn AudioEncoder>) -> Self {
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
            events: AudioSourceEvents::default(),
        }
    }

    /// The currently pinned output format, if any
    pub fn active_format(&self) -> Option<&AudioFormat> {
        self.active.as_ref()
    }
}

#[async_trait]
impl AudioSource for ExternalAudioSource {
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

    fn source_formats(&self) -> Vec<AudioFormat> {
        self.formats.clone()
    }

    fn set_source_format(&mut self, format: &AudioFormat) -> Result<()> {
        self.lifecycle.ensure_format_change_allowed()?;
        self.active = Some(select_format(&self.formats, format)?);
        Ok(())
    }

    fn restrict_formats(&mut self, keep: &dyn Fn(&AudioFormat) -> bool) {
        self.formats = negotiate::restrict_formats(&self.formats, keep);
    }

    fn external_raw_sample(
        &mut self,
        rate: AudioSamplingRate,
        duration_ms: u32,
        pcm: &[i16],
    ) -> Result<()> {
        match gate_delivery(&self.lifecycle, "inject raw audio")? {
            DeliveryGate::DropPaused => return Ok(()),
            DeliveryGate::Deliver => {}
        }

        self.events.raw.dispatch(|h| h(rate, duration_ms, pcm));

        if !self.events.encoded.has_subscribers() {
            return Ok(());
        }
        let format = self.active.as_ref().ok_or(MediaError::NoFormatSelected)?;
        match self.encoder.lock().encode(pcm, format) {
            Ok(encoded) => {
                let duration = duration_rtp_units(duration_ms, format.rtp_clock_rate());
                self.events.encoded.dispatch(|h| h(duration, &encoded));
            }
            Err(e) => {
                // Steady-state codec failures go to the error channel; the
                // injection call itself has succeeded.
                warn!("audio encode failed for {}: {}", format.rtpmap(), e);
                let report = e.to_string();
                self.events.error.dispatch(|h| h(&report));
            }
        }
        Ok(())
    }

    fn events(&self) -> &AudioSourceEvents {
        &self.events
    }
}

/// Audio sink that decodes received RTP payload through a plugged-in codec
///
/// Decoded PCM is fanned out on the decoded channel along with the active
/// format's clock rate and channel count. Payload whose id does not match
/// the pinned format is reported on the error channel and dropped; the
/// stream keeps running.
pub struct DecodingAudioSink {
    lifecycle: Lifecycle,
    decoder: Mutex<Box<dyn AudioEncoder>>,
    formats: Vec<AudioFormat>,
    active: Option<AudioFormat>,
    events: AudioSinkEvents,
}

impl DecodingAudioSink {
    /// Create a sink backed by the given codec
    pub fn new(decoder: Box<dyn AudioEncoder>) -> Self {
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
            events: AudioSinkEvents::default(),
        }
    }

    /// The currently pinned decode format, if any
    pub fn active_format(&self) -> Option<&AudioFormat> {
        self.active.as_ref()
    }
}

#[async_trait]
impl AudioSink for DecodingAudioSink {
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

    fn sink_formats(&self) -> Vec<AudioFormat> {
        self.formats.clone()
    }

    fn set_sink_format(&mut self, format: &AudioFormat) -> Result<()> {
        self.lifecycle.ensure_format_change_allowed()?;
        self.active = Some(select_format(&self.formats, format)?);
        Ok(())
    }

    fn restrict_formats(&mut self, keep: &dyn Fn(&AudioFormat) -> bool) {
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
            Ok(pcm) => {
                self.events
                    .decoded
                    .dispatch(|h| h(&pcm, format.clock_rate(), format.channel_count()));
            }
            Err(e) => {
                warn!("audio decode failed for {}: {}", format.rtpmap(), e);
                let report = e.to_string();
                self.events.error.dispatch(|h| h(&report));
            }
        }
        Ok(())
    }

    fn events(&self) -> &AudioSinkEvents {
        &self.events
    }
}
