//! Externally-fed video source and decoding video sink

use super::{duration_rtp_units, gate_delivery, select_format, DeliveryGate};
use crate::buffer::RawImage;
use crate::codec::VideoEncoder;
use crate::error::{FormatError, MediaError, Result};
use crate::events::{VideoSinkEvents, VideoSourceEvents};
use crate::format::negotiate;
use crate::format::{VideoFormat, VideoPixelFormat};
use crate::lifecycle::{Lifecycle, MediaState};
use crate::sink::{RtpPayload, VideoSink};
use crate::source::VideoSource;
use async_trait::async_trait;
use bytes::BytesMut;
use parking_lot::Mutex;
use std::borrow::Cow;
use std::net::SocketAddr;
use tracing::{debug, warn};

/// Repack a possibly stride-padded view into tightly packed pixel bytes
///
/// The byte-form raw channel carries no stride, so its consumers expect
/// packed rows. Tightly packed buffers are borrowed as-is; padded ones
/// are copied row by row, including the chroma plane(s) of the planar
/// layouts.
fn packed_pixels<'a>(image: &RawImage<'a>) -> Cow<'a, [u8]> {
    let stride = image.stride();
    let packed = image.pixel_format().packed_stride(image.width());
    if stride == packed {
        return Cow::Borrowed(image.data());
    }

    let width = image.width() as usize;
    let height = image.height() as usize;
    let data = image.data();
    let mut out =
        Vec::with_capacity(image.pixel_format().frame_buffer_len(packed, image.height()));
    for row in data.chunks(stride).take(height) {
        out.extend_from_slice(&row[..packed]);
    }
    let chroma = &data[stride * height..];
    match image.pixel_format() {
        VideoPixelFormat::Nv12 => {
            // Interleaved UV plane: half the rows at the luma stride.
            for row in chroma.chunks(stride).take(height / 2) {
                out.extend_from_slice(&row[..width]);
            }
        }
        VideoPixelFormat::I420 => {
            // Two half-width planes, together height rows at half stride.
            for row in chroma.chunks(stride / 2).take(height) {
                let take = (width / 2).min(row.len());
                out.extend_from_slice(&row[..take]);
            }
        }
        _ => {}
    }
    Cow::Owned(out)
}

/// Video source fed by an external producer instead of a capture device
///
/// Frames are pushed in either as packed byte buffers or as borrowed
/// [`RawImage`] views. Each accepted frame is fanned out on at most one of
/// the raw channels, preferring the zero-copy one when it has subscribers,
/// and run through the plugged-in codec when the encoded channel does.
pub struct ExternalVideoSource {
    lifecycle: Lifecycle,
    encoder: Mutex<Box<dyn VideoEncoder>>,
    formats: Vec<VideoFormat>,
    active: Option<VideoFormat>,
    events: VideoSourceEvents,
}

impl ExternalVideoSource {
    /// Create a source backed by the given codec
    pub fn new(encoder: Box<dyn VideoEncoder>) -> Self {
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
            events: VideoSourceEvents::default(),
        }
    }

    /// The currently pinned output format, if any
    pub fn active_format(&self) -> Option<&VideoFormat> {
        self.active.as_ref()
    }

    fn deliver_frame(&mut self, duration_ms: u32, image: &RawImage<'_>) -> Result<()> {
        // At most one raw variant fires per frame; the zero-copy channel
        // wins when both have subscribers.
        if self.events.raw_image.has_subscribers() {
            self.events.raw_image.dispatch(|h| h(duration_ms, image));
        } else if self.events.raw.has_subscribers() {
            let pixels = packed_pixels(image);
            self.events.raw.dispatch(|h| {
                h(
                    duration_ms,
                    image.width(),
                    image.height(),
                    &pixels,
                    image.pixel_format(),
                )
            });
        }

        if !self.events.encoded.has_subscribers() {
            return Ok(());
        }
        let format = self.active.as_ref().ok_or(MediaError::NoFormatSelected)?;
        match self.encoder.lock().encode_image(image, format.codec()) {
            Ok(encoded) => {
                let duration = duration_rtp_units(duration_ms, format.clock_rate());
                self.events.encoded.dispatch(|h| h(duration, &encoded));
            }
            Err(e) => {
                warn!("video encode failed for {}: {}", format.rtpmap(), e);
                let report = e.to_string();
                self.events.error.dispatch(|h| h(&report));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl VideoSource for ExternalVideoSource {
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

    fn source_formats(&self) -> Vec<VideoFormat> {
        self.formats.clone()
    }

    fn set_source_format(&mut self, format: &VideoFormat) -> Result<()> {
        self.lifecycle.ensure_format_change_allowed()?;
        self.active = Some(select_format(&self.formats, format)?);
        Ok(())
    }

    fn restrict_formats(&mut self, keep: &dyn Fn(&VideoFormat) -> bool) {
        self.formats = negotiate::restrict_formats(&self.formats, keep);
    }

    fn external_raw_sample(
        &mut self,
        duration_ms: u32,
        width: u32,
        height: u32,
        pixels: &[u8],
        pixel_format: VideoPixelFormat,
    ) -> Result<()> {
        match gate_delivery(&self.lifecycle, "inject raw frame")? {
            DeliveryGate::DropPaused => return Ok(()),
            DeliveryGate::Deliver => {}
        }
        let image = RawImage::packed(width, height, pixel_format, pixels)?;
        self.deliver_frame(duration_ms, &image)
    }

    fn external_raw_image(&mut self, duration_ms: u32, image: &RawImage<'_>) -> Result<()> {
        match gate_delivery(&self.lifecycle, "inject raw frame")? {
            DeliveryGate::DropPaused => return Ok(()),
            DeliveryGate::Deliver => {}
        }
        self.deliver_frame(duration_ms, image)
    }

    fn force_key_frame(&mut self) {
        if self.lifecycle.is_closed() {
            return;
        }
        debug!("key frame requested");
        self.encoder.lock().force_key_frame();
    }

    fn events(&self) -> &VideoSourceEvents {
        &self.events
    }
}

/// One encoded frame being reassembled from its RTP packets
struct FrameAssembly {
    timestamp: u32,
    data: BytesMut,
}

/// Video sink that reassembles RTP payload into frames and decodes them
///
/// Packets sharing an RTP timestamp belong to one encoded frame; the
/// marker bit closes it. A timestamp change without a marker means the
/// tail of the previous frame was lost, so the partial frame is discarded
/// and reported on the error channel. Decoded frames are fanned out on at
/// most one decoded channel, preferring the zero-copy one.
pub struct DecodingVideoSink {
    lifecycle: Lifecycle,
    decoder: Mutex<Box<dyn VideoEncoder>>,
    formats: Vec<VideoFormat>,
    active: Option<VideoFormat>,
    output_pixel_format: VideoPixelFormat,
    pending: Option<FrameAssembly>,
    events: VideoSinkEvents,
}

impl DecodingVideoSink {
    /// Create a sink backed by the given codec
    ///
    /// Decoded frames are requested from the codec in `output_pixel_format`.
    pub fn new(decoder: Box<dyn VideoEncoder>, output_pixel_format: VideoPixelFormat) -> Self {
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
            output_pixel_format,
            pending: None,
            events: VideoSinkEvents::default(),
        }
    }

    /// The currently pinned decode format, if any
    pub fn active_format(&self) -> Option<&VideoFormat> {
        self.active.as_ref()
    }

    fn decode_and_dispatch(&self, encoded: &[u8], format: &VideoFormat) {
        // At most one decoded variant fires per frame; the zero-copy
        // channel wins when both have subscribers and takes the decoder's
        // borrowed-view path.
        if self.events.decoded_image.has_subscribers() {
            let result = self.decoder.lock().decode_image(
                encoded,
                self.output_pixel_format,
                format.codec(),
                &mut |image: &RawImage<'_>| self.events.decoded_image.dispatch(|h| h(image)),
            );
            if let Err(e) = result {
                warn!("video decode failed for {}: {}", format.rtpmap(), e);
                let report = e.to_string();
                self.events.error.dispatch(|h| h(&report));
            }
            return;
        }

        match self
            .decoder
            .lock()
            .decode(encoded, self.output_pixel_format, format.codec())
        {
            // A single encoded sample may complete several frames, or none.
            Ok(samples) => {
                for sample in &samples {
                    let stride = self.output_pixel_format.packed_stride(sample.width);
                    self.events.decoded.dispatch(|h| {
                        h(
                            &sample.sample,
                            sample.width,
                            sample.height,
                            stride,
                            self.output_pixel_format,
                        )
                    });
                }
            }
            Err(e) => {
                warn!("video decode failed for {}: {}", format.rtpmap(), e);
                let report = e.to_string();
                self.events.error.dispatch(|h| h(&report));
            }
        }
    }
}

#[async_trait]
impl VideoSink for DecodingVideoSink {
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
        self.pending = None;
        self.lifecycle.close();
        Ok(())
    }

    fn state(&self) -> MediaState {
        self.lifecycle.state()
    }

    fn sink_formats(&self) -> Vec<VideoFormat> {
        self.formats.clone()
    }

    fn set_sink_format(&mut self, format: &VideoFormat) -> Result<()> {
        self.lifecycle.ensure_format_change_allowed()?;
        self.active = Some(select_format(&self.formats, format)?);
        // A half-built frame from the previous format is useless now.
        self.pending = None;
        Ok(())
    }

    fn restrict_formats(&mut self, keep: &dyn Fn(&VideoFormat) -> bool) {
        self.formats = negotiate::restrict_formats(&self.formats, keep);
    }

    fn got_rtp(&mut self, packet: &RtpPayload<'_>) -> Result<()> {
        match gate_delivery(&self.lifecycle, "deliver rtp")? {
            DeliveryGate::DropPaused => return Ok(()),
            DeliveryGate::Deliver => {}
        }
        let format = self
            .active
            .as_ref()
            .ok_or(MediaError::NoFormatSelected)?
            .clone();

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

        match &mut self.pending {
            Some(frame) if frame.timestamp == packet.timestamp => {
                frame.data.extend_from_slice(packet.payload);
            }
            Some(frame) => {
                warn!(
                    "discarding incomplete frame at rtp timestamp {}",
                    frame.timestamp
                );
                let report = format!(
                    "incomplete video frame at rtp timestamp {} discarded",
                    frame.timestamp
                );
                self.events.error.dispatch(|h| h(&report));
                *frame = FrameAssembly {
                    timestamp: packet.timestamp,
                    data: BytesMut::from(packet.payload),
                };
            }
            None => {
                self.pending = Some(FrameAssembly {
                    timestamp: packet.timestamp,
                    data: BytesMut::from(packet.payload),
                });
            }
        }

        if packet.marker {
            if let Some(frame) = self.pending.take() {
                self.decode_and_dispatch(&frame.data, &format);
            }
        }
        Ok(())
    }

    fn got_frame(
        &mut self,
        _remote: SocketAddr,
        timestamp: u32,
        payload: &[u8],
        format: &VideoFormat,
    ) -> Result<()> {
        match gate_delivery(&self.lifecycle, "deliver frame")? {
            DeliveryGate::DropPaused => return Ok(()),
            DeliveryGate::Deliver => {}
        }
        if format.is_empty() {
            return Err(FormatError::EmptyFormat.into());
        }
        debug!(
            "decoding pre-assembled {} frame at rtp timestamp {}",
            format.format_name(),
            timestamp
        );
        self.decode_and_dispatch(payload, format);
        Ok(())
    }

    fn events(&self) -> &VideoSinkEvents {
        &self.events
    }
}
