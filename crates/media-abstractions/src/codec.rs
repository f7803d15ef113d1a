//! Encoder/decoder capability contracts
//!
//! These traits are consumed by the core, never implemented here: codec
//! bodies are external plugins selected at composition time. An encoder
//! advertises its supported formats so the lifecycle layer can seed a
//! component's negotiable list; any resources a codec holds are released
//! through `Drop` on every exit path.

use crate::buffer::{RawImage, VideoSample};
use crate::error::Result;
use crate::format::{AudioFormat, TextFormat, VideoCodec, VideoFormat, VideoPixelFormat};
use bytes::{BufMut, BytesMut};

/// Audio codec plugin: PCM in, encoded bytes out, and back
pub trait AudioEncoder: Send {
    /// Formats this codec can encode and decode
    fn supported_formats(&self) -> Vec<AudioFormat>;

    /// Encode 16-bit signed PCM samples to the given format
    fn encode(&mut self, pcm: &[i16], format: &AudioFormat) -> Result<Vec<u8>>;

    /// Encode into a caller-supplied growable buffer, returning bytes written
    ///
    /// The default goes through [`encode`](Self::encode); implementations
    /// on the hot path override this to avoid the intermediate allocation.
    fn encode_to_buffer(
        &mut self,
        pcm: &[i16],
        format: &AudioFormat,
        out: &mut BytesMut,
    ) -> Result<usize> {
        let encoded = self.encode(pcm, format)?;
        out.put_slice(&encoded);
        Ok(encoded.len())
    }

    /// Decode an encoded sample back to 16-bit signed PCM
    fn decode(&mut self, encoded: &[u8], format: &AudioFormat) -> Result<Vec<i16>>;
}

/// Video codec plugin
pub trait VideoEncoder: Send {
    /// Formats this codec can encode and decode
    fn supported_formats(&self) -> Vec<VideoFormat>;

    /// Encode one uncompressed frame from a packed byte buffer
    fn encode(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
        pixel_format: VideoPixelFormat,
        codec: VideoCodec,
    ) -> Result<Vec<u8>>;

    /// Encode one uncompressed frame from a borrowed view (the fast path)
    ///
    /// The default copies out of the view and delegates to
    /// [`encode`](Self::encode); stride-aware implementations override it.
    fn encode_image(&mut self, image: &RawImage<'_>, codec: VideoCodec) -> Result<Vec<u8>> {
        let pixels = image.copy_to_vec();
        self.encode(
            image.width(),
            image.height(),
            &pixels,
            image.pixel_format(),
            codec,
        )
    }

    /// Request that the next encoded frame be a key frame
    ///
    /// Advisory: the encoder honors the request at its next opportunity,
    /// with no guaranteed timing.
    fn force_key_frame(&mut self);

    /// Decode an encoded sample into zero or more reconstructed frames
    ///
    /// A single call may complete several buffered frames or none at all.
    fn decode(
        &mut self,
        encoded: &[u8],
        pixel_format: VideoPixelFormat,
        codec: VideoCodec,
    ) -> Result<Vec<VideoSample>>;

    /// Decode an encoded sample, lending each reconstructed frame as a
    /// borrowed view (the fast path)
    ///
    /// Each view is only valid for the duration of its `deliver` call.
    /// The default decodes to owned samples and lends views over them;
    /// implementations with internal frame buffers override it to skip
    /// the copy.
    fn decode_image(
        &mut self,
        encoded: &[u8],
        pixel_format: VideoPixelFormat,
        codec: VideoCodec,
        deliver: &mut dyn FnMut(&RawImage<'_>),
    ) -> Result<()> {
        for sample in self.decode(encoded, pixel_format, codec)? {
            let image =
                RawImage::packed(sample.width, sample.height, pixel_format, &sample.sample)?;
            deliver(&image);
        }
        Ok(())
    }
}

/// Real-time text codec plugin
pub trait TextEncoder: Send {
    /// Formats this codec can encode and decode
    fn supported_formats(&self) -> Vec<TextFormat>;

    /// Encode text for transmission
    fn encode(&mut self, text: &str, format: &TextFormat) -> Result<Vec<u8>>;

    /// Decode a received sample back to text
    fn decode(&mut self, encoded: &[u8], format: &TextFormat) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::well_known::WellKnownAudioFormat;

    struct Identity16;

    impl AudioEncoder for Identity16 {
        fn supported_formats(&self) -> Vec<AudioFormat> {
            vec![AudioFormat::from_well_known(WellKnownAudioFormat::Pcmu)]
        }

        fn encode(&mut self, pcm: &[i16], _format: &AudioFormat) -> Result<Vec<u8>> {
            Ok(pcm.iter().flat_map(|s| s.to_le_bytes()).collect())
        }

        fn decode(&mut self, encoded: &[u8], _format: &AudioFormat) -> Result<Vec<i16>> {
            Ok(encoded
                .chunks_exact(2)
                .map(|c| i16::from_le_bytes([c[0], c[1]]))
                .collect())
        }
    }

    #[test]
    fn test_default_encode_to_buffer_matches_encode() {
        let mut codec = Identity16;
        let format = AudioFormat::from_well_known(WellKnownAudioFormat::Pcmu);
        let pcm = [100i16, -200, 300];

        let direct = codec.encode(&pcm, &format).unwrap();

        let mut out = BytesMut::new();
        let written = codec.encode_to_buffer(&pcm, &format, &mut out).unwrap();
        assert_eq!(written, direct.len());
        assert_eq!(&out[..], &direct[..]);
    }

    struct FrameStub;

    impl VideoEncoder for FrameStub {
        fn supported_formats(&self) -> Vec<VideoFormat> {
            vec![VideoFormat::from_codec(VideoCodec::Vp8, 96).unwrap()]
        }

        fn encode(
            &mut self,
            _width: u32,
            _height: u32,
            pixels: &[u8],
            _pixel_format: VideoPixelFormat,
            _codec: VideoCodec,
        ) -> Result<Vec<u8>> {
            Ok(pixels.to_vec())
        }

        fn force_key_frame(&mut self) {}

        fn decode(
            &mut self,
            encoded: &[u8],
            _pixel_format: VideoPixelFormat,
            _codec: VideoCodec,
        ) -> Result<Vec<VideoSample>> {
            Ok(vec![VideoSample::new(4, 2, encoded.to_vec())])
        }
    }

    #[test]
    fn test_default_decode_image_lends_views() {
        let mut codec = FrameStub;
        let mut seen = Vec::new();

        codec
            .decode_image(
                &[0u8; 24],
                VideoPixelFormat::Rgb,
                VideoCodec::Vp8,
                &mut |image: &RawImage<'_>| {
                    seen.push((image.width(), image.height(), image.data().len()));
                },
            )
            .unwrap();

        assert_eq!(seen, vec![(4, 2, 24)]);
    }

    #[test]
    fn test_default_decode_image_rejects_undersized_frame() {
        let mut codec = FrameStub;
        // The stub claims 4x2 RGB but hands back too few bytes.
        let result = codec.decode_image(
            &[0u8; 5],
            VideoPixelFormat::Rgb,
            VideoCodec::Vp8,
            &mut |_: &RawImage<'_>| panic!("no view expected for a short buffer"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_encode_to_buffer_appends() {
        let mut codec = Identity16;
        let format = AudioFormat::from_well_known(WellKnownAudioFormat::Pcmu);

        let mut out = BytesMut::from(&b"hdr"[..]);
        codec.encode_to_buffer(&[1i16], &format, &mut out).unwrap();
        assert_eq!(out.len(), 3 + 2);
        assert_eq!(&out[..3], b"hdr");
    }
}
