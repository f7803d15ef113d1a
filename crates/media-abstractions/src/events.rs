//! Sample delivery channels
//!
//! Each source and sink exposes a small set of channels: encoded samples,
//! raw/decoded samples (with a zero-copy variant for video) and an error
//! channel. A channel is an explicit multi-subscriber registry: handlers
//! are added and removed by handle, every registered handler sees every
//! dispatched sample, and no delivery order across handlers is guaranteed.
//! There is no automatic unsubscribe.
//!
//! Delivery may happen on a thread owned by the capture/render backend,
//! concurrently with lifecycle calls made by the owner. The registries are
//! therefore lock-protected internally, but handlers must do their own
//! synchronization for anything they touch.

use crate::buffer::RawImage;
use crate::format::{AudioSamplingRate, VideoPixelFormat};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Handle identifying one subscription on one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Multi-subscriber registry for one delivery channel
pub struct EventChannel<H: ?Sized> {
    inner: RwLock<Registry<H>>,
}

struct Registry<H: ?Sized> {
    next_id: u64,
    handlers: Vec<(HandlerId, Arc<H>)>,
}

impl<H: ?Sized> EventChannel<H> {
    /// Create an empty channel
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Registry {
                next_id: 0,
                handlers: Vec::new(),
            }),
        }
    }

    /// Register a handler; it receives every sample dispatched from now on
    pub fn subscribe(&self, handler: Arc<H>) -> HandlerId {
        let mut registry = self.inner.write();
        let id = HandlerId(registry.next_id);
        registry.next_id += 1;
        registry.handlers.push((id, handler));
        id
    }

    /// Remove a previously registered handler
    ///
    /// Returns `false` if the handle was not (or no longer) registered.
    pub fn unsubscribe(&self, id: HandlerId) -> bool {
        let mut registry = self.inner.write();
        let before = registry.handlers.len();
        registry.handlers.retain(|(hid, _)| *hid != id);
        registry.handlers.len() != before
    }

    /// Whether any handler is currently registered
    pub fn has_subscribers(&self) -> bool {
        !self.inner.read().handlers.is_empty()
    }

    /// Number of currently registered handlers
    pub fn subscriber_count(&self) -> usize {
        self.inner.read().handlers.len()
    }

    /// Invoke `invoke` once per registered handler
    ///
    /// Handlers are snapshotted first and called outside the lock, so a
    /// handler may subscribe or unsubscribe from within the callback.
    pub fn dispatch(&self, invoke: impl Fn(&H)) {
        let snapshot: Vec<Arc<H>> = self
            .inner
            .read()
            .handlers
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in &snapshot {
            invoke(handler);
        }
    }
}

impl<H: ?Sized> Default for EventChannel<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized> fmt::Debug for EventChannel<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Encoded sample ready for packetization: `(duration_rtp_units, bytes)`
pub type EncodedSampleHandler = dyn Fn(u32, &[u8]) + Send + Sync;

/// Encoded text sample
pub type EncodedTextHandler = dyn Fn(&[u8]) + Send + Sync;

/// Raw audio: `(sampling_rate, duration_ms, pcm_samples)`
pub type RawAudioSampleHandler = dyn Fn(AudioSamplingRate, u32, &[i16]) + Send + Sync;

/// Raw video, byte-array form: `(duration_ms, width, height, pixels, pixel_format)`
pub type RawVideoSampleHandler = dyn Fn(u32, u32, u32, &[u8], VideoPixelFormat) + Send + Sync;

/// Raw video, zero-copy form: `(duration_ms, image)`
///
/// The [`RawImage`] borrow ends when the handler returns; copy out for
/// anything longer-lived.
pub type RawImageSampleHandler = dyn for<'a> Fn(u32, &RawImage<'a>) + Send + Sync;

/// Decoded audio delivered by a sink: `(pcm_samples, sample_rate_hz, channels)`
pub type DecodedAudioHandler = dyn Fn(&[i16], u32, u8) + Send + Sync;

/// Decoded video, byte-array form: `(pixels, width, height, stride, pixel_format)`
pub type DecodedVideoHandler = dyn Fn(&[u8], u32, u32, usize, VideoPixelFormat) + Send + Sync;

/// Decoded video, zero-copy form
pub type DecodedImageHandler = dyn for<'a> Fn(&RawImage<'a>) + Send + Sync;

/// Decoded real-time text delivered by a sink
pub type DecodedTextHandler = dyn Fn(&str) + Send + Sync;

/// Human-readable error report; does not itself end the lifecycle
pub type ErrorHandler = dyn Fn(&str) + Send + Sync;

/// Delivery channels of an audio source
#[derive(Debug, Default)]
pub struct AudioSourceEvents {
    /// Encoded samples, once per produced frame
    pub encoded: EventChannel<EncodedSampleHandler>,
    /// Uncompressed PCM samples
    pub raw: EventChannel<RawAudioSampleHandler>,
    /// Unrecoverable per-operation failures
    pub error: EventChannel<ErrorHandler>,
}

/// Delivery channels of a video source
///
/// A source offering both raw variants invokes at most one of them per
/// produced frame, never both.
#[derive(Debug, Default)]
pub struct VideoSourceEvents {
    /// Encoded samples, once per produced frame
    pub encoded: EventChannel<EncodedSampleHandler>,
    /// Uncompressed frames, byte-array form
    pub raw: EventChannel<RawVideoSampleHandler>,
    /// Uncompressed frames, zero-copy form (the fast path)
    pub raw_image: EventChannel<RawImageSampleHandler>,
    /// Unrecoverable per-operation failures
    pub error: EventChannel<ErrorHandler>,
}

/// Delivery channels of a text source
#[derive(Debug, Default)]
pub struct TextSourceEvents {
    /// Encoded text samples
    pub encoded: EventChannel<EncodedTextHandler>,
    /// Unrecoverable per-operation failures
    pub error: EventChannel<ErrorHandler>,
}

/// Delivery channels of an audio sink
#[derive(Debug, Default)]
pub struct AudioSinkEvents {
    /// Decoded PCM ready for rendering
    pub decoded: EventChannel<DecodedAudioHandler>,
    /// Unrecoverable per-operation failures
    pub error: EventChannel<ErrorHandler>,
}

/// Delivery channels of a video sink
///
/// Mirrors the source-side duality: at most one decoded variant fires per
/// frame.
#[derive(Debug, Default)]
pub struct VideoSinkEvents {
    /// Decoded frames, byte-array form
    pub decoded: EventChannel<DecodedVideoHandler>,
    /// Decoded frames, zero-copy form (the fast path)
    pub decoded_image: EventChannel<DecodedImageHandler>,
    /// Unrecoverable per-operation failures
    pub error: EventChannel<ErrorHandler>,
}

/// Delivery channels of a text sink
#[derive(Debug, Default)]
pub struct TextSinkEvents {
    /// Decoded text
    pub text: EventChannel<DecodedTextHandler>,
    /// Unrecoverable per-operation failures
    pub error: EventChannel<ErrorHandler>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_every_subscriber_sees_every_sample() {
        let channel: EventChannel<EncodedSampleHandler> = EventChannel::new();
        let count_a = Arc::new(AtomicUsize::new(0));
        let count_b = Arc::new(AtomicUsize::new(0));

        let a = Arc::clone(&count_a);
        channel.subscribe(Arc::new(move |_, _: &[u8]| {
            a.fetch_add(1, Ordering::SeqCst);
        }));
        let b = Arc::clone(&count_b);
        channel.subscribe(Arc::new(move |_, _: &[u8]| {
            b.fetch_add(1, Ordering::SeqCst);
        }));

        channel.dispatch(|h| h(160, &[1, 2, 3]));
        channel.dispatch(|h| h(160, &[4, 5, 6]));

        assert_eq!(count_a.load(Ordering::SeqCst), 2);
        assert_eq!(count_b.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribed_handler_stops_receiving() {
        let channel: EventChannel<EncodedSampleHandler> = EventChannel::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&count);
        let id = channel.subscribe(Arc::new(move |_, _: &[u8]| {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        channel.dispatch(|h| h(0, &[]));
        assert!(channel.unsubscribe(id));
        channel.dispatch(|h| h(0, &[]));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!channel.unsubscribe(id));
    }

    #[test]
    fn test_subscriber_counting() {
        let channel: EventChannel<ErrorHandler> = EventChannel::new();
        assert!(!channel.has_subscribers());
        assert_eq!(channel.subscriber_count(), 0);

        let id = channel.subscribe(Arc::new(|_: &str| {}));
        assert!(channel.has_subscribers());
        assert_eq!(channel.subscriber_count(), 1);

        channel.unsubscribe(id);
        assert!(!channel.has_subscribers());
    }

    #[test]
    fn test_dispatch_with_no_subscribers_is_noop() {
        let channel: EventChannel<ErrorHandler> = EventChannel::new();
        channel.dispatch(|h| h("nobody is listening"));
    }

    #[test]
    fn test_zero_copy_channel_borrow_scope() {
        use crate::format::VideoPixelFormat;

        let channel: EventChannel<RawImageSampleHandler> = EventChannel::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let s = Arc::clone(&seen);
        channel.subscribe(Arc::new(move |duration, image: &RawImage<'_>| {
            assert_eq!(duration, 33);
            // Persisting the pixels requires an explicit copy.
            let copied = image.copy_to_vec();
            s.fetch_add(copied.len(), Ordering::SeqCst);
        }));

        let pixels = vec![0u8; 4 * 2 * 3];
        let image = RawImage::packed(4, 2, VideoPixelFormat::Rgb, &pixels).unwrap();
        channel.dispatch(|h| h(33, &image));

        assert_eq!(seen.load(Ordering::SeqCst), 24);
    }
}
