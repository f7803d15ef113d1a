//! Sample buffers for the video delivery paths
//!
//! [`RawImage`] is the zero-copy fast path: a borrowing view over pixels
//! owned by the capture or decode backend, valid only for the duration of
//! the delivery callback it is passed to. The borrow checker enforces that
//! scope; consumers that need the pixels afterwards copy out explicitly
//! with [`RawImage::copy_to_vec`] or [`RawImage::to_video_sample`].
//!
//! [`VideoSample`] is the owning counterpart used on paths where a
//! per-frame copy is acceptable.

use crate::error::MediaError;
use crate::format::VideoPixelFormat;
use bytes::Bytes;

/// Borrowed view over one uncompressed video frame
///
/// Does not own the pixel memory; the lifetime ties the view to the
/// producing call. `stride` is the byte offset between the start of one
/// scan line and the next and may exceed the packed row width.
#[derive(Debug, Clone, Copy)]
pub struct RawImage<'a> {
    width: u32,
    height: u32,
    stride: usize,
    pixel_format: VideoPixelFormat,
    data: &'a [u8],
}

impl<'a> RawImage<'a> {
    /// Create a view over an externally owned pixel buffer
    ///
    /// Fails if the dimensions are unusable or the buffer is smaller than
    /// the dimensions and pixel layout require.
    pub fn new(
        width: u32,
        height: u32,
        stride: usize,
        pixel_format: VideoPixelFormat,
        data: &'a [u8],
    ) -> Result<Self, MediaError> {
        if width == 0 || height == 0 || stride < pixel_format.packed_stride(width) {
            return Err(MediaError::InvalidDimensions {
                width,
                height,
                stride,
            });
        }
        let needed = pixel_format.frame_buffer_len(stride, height);
        if data.len() < needed {
            return Err(MediaError::BufferTooSmall {
                needed,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            stride,
            pixel_format,
            data,
        })
    }

    /// Create a view over a tightly packed buffer (stride == packed row width)
    pub fn packed(
        width: u32,
        height: u32,
        pixel_format: VideoPixelFormat,
        data: &'a [u8],
    ) -> Result<Self, MediaError> {
        Self::new(width, height, pixel_format.packed_stride(width), pixel_format, data)
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Byte offset between the start of consecutive scan lines
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel layout of the buffer
    pub fn pixel_format(&self) -> VideoPixelFormat {
        self.pixel_format
    }

    /// The borrowed pixel bytes
    ///
    /// The slice is only valid while this view is; prefer the copy-out
    /// operations for anything that outlives the delivery callback.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Explicit copy-out of the pixel bytes
    pub fn copy_to_vec(&self) -> Vec<u8> {
        self.data.to_vec()
    }

    /// Explicit copy-out into an owning [`VideoSample`]
    pub fn to_video_sample(&self) -> VideoSample {
        VideoSample {
            width: self.width,
            height: self.height,
            sample: Bytes::copy_from_slice(self.data),
        }
    }
}

/// Owning uncompressed video frame for the non-performance-critical path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSample {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Owned pixel bytes
    pub sample: Bytes,
}

impl VideoSample {
    /// Create an owning sample from pixel bytes
    pub fn new(width: u32, height: u32, sample: impl Into<Bytes>) -> Self {
        Self {
            width,
            height,
            sample: sample.into(),
        }
    }

    /// Size of the pixel payload in bytes
    pub fn len(&self) -> usize {
        self.sample.len()
    }

    /// Whether the sample carries no pixel data
    pub fn is_empty(&self) -> bool {
        self.sample.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_image_accessors() {
        let pixels = vec![0u8; 4 * 2 * 3]; // 4x2 RGB
        let image = RawImage::packed(4, 2, VideoPixelFormat::Rgb, &pixels).unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 2);
        assert_eq!(image.stride(), 12);
        assert_eq!(image.pixel_format(), VideoPixelFormat::Rgb);
        assert_eq!(image.data().len(), 24);
    }

    #[test]
    fn test_raw_image_respects_stride_padding() {
        // 4x2 RGB with rows padded to 16 bytes.
        let pixels = vec![0u8; 16 * 2];
        let image = RawImage::new(4, 2, 16, VideoPixelFormat::Rgb, &pixels).unwrap();
        assert_eq!(image.stride(), 16);
    }

    #[test]
    fn test_raw_image_rejects_short_buffer() {
        let pixels = vec![0u8; 10];
        let err = RawImage::packed(4, 2, VideoPixelFormat::Rgb, &pixels).unwrap_err();
        assert!(matches!(
            err,
            MediaError::BufferTooSmall {
                needed: 24,
                actual: 10
            }
        ));
    }

    #[test]
    fn test_raw_image_rejects_bad_dimensions() {
        let pixels = vec![0u8; 64];
        assert!(matches!(
            RawImage::packed(0, 2, VideoPixelFormat::Rgb, &pixels),
            Err(MediaError::InvalidDimensions { .. })
        ));
        // Stride narrower than a packed row.
        assert!(matches!(
            RawImage::new(4, 2, 8, VideoPixelFormat::Rgb, &pixels),
            Err(MediaError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_planar_buffer_length() {
        // 4x4 I420: 16 luma bytes + 8 chroma bytes.
        let pixels = vec![0u8; 24];
        assert!(RawImage::packed(4, 4, VideoPixelFormat::I420, &pixels).is_ok());

        let short = vec![0u8; 16];
        assert!(RawImage::packed(4, 4, VideoPixelFormat::I420, &short).is_err());
    }

    #[test]
    fn test_copy_out_is_independent() {
        let pixels: Vec<u8> = (0..24).collect();
        let image = RawImage::packed(4, 2, VideoPixelFormat::Rgb, &pixels).unwrap();

        let copied = image.copy_to_vec();
        assert_eq!(copied, pixels);

        let sample = image.to_video_sample();
        assert_eq!(sample.width, 4);
        assert_eq!(sample.height, 2);
        assert_eq!(&sample.sample[..], &pixels[..]);
        assert_eq!(sample.len(), 24);
        assert!(!sample.is_empty());
    }
}
