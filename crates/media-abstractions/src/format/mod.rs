//! Media format descriptors and codec enumerations
//!
//! A format descriptor is an immutable value describing one codec
//! configuration: its wire identity (payload id and name), timing (clock
//! rates) and channel data. All invariants are checked once, at
//! construction; a descriptor violating any of them is never observable.
//! Copying a descriptor always yields a full, independent value.
//!
//! Payload ids `0..=95` are statically assigned (see [`well_known`]);
//! `96..=127` are dynamic and only meaningful together with the format
//! name, which is the negotiation key exchanged in SDP offer/answer.

pub mod negotiate;
pub mod well_known;

use crate::error::FormatError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// First payload id in the dynamic range
pub const DYNAMIC_ID_MIN: u8 = 96;
/// Last payload id in the dynamic range (and overall maximum)
pub const DYNAMIC_ID_MAX: u8 = 127;

/// Sampling rates used for raw (decoded) audio delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioSamplingRate {
    /// 8 kHz narrowband
    Rate8kHz,
    /// 16 kHz wideband
    Rate16kHz,
    /// 24 kHz
    Rate24kHz,
    /// 44.1 kHz
    Rate44_1kHz,
    /// 48 kHz
    Rate48kHz,
}

impl AudioSamplingRate {
    /// The rate value in Hz
    pub fn hz(self) -> u32 {
        match self {
            Self::Rate8kHz => 8000,
            Self::Rate16kHz => 16000,
            Self::Rate24kHz => 24000,
            Self::Rate44_1kHz => 44100,
            Self::Rate48kHz => 48000,
        }
    }

    /// Create from a Hz value, if it is one of the supported rates
    pub fn from_hz(hz: u32) -> Option<Self> {
        match hz {
            8000 => Some(Self::Rate8kHz),
            16000 => Some(Self::Rate16kHz),
            24000 => Some(Self::Rate24kHz),
            44100 => Some(Self::Rate44_1kHz),
            48000 => Some(Self::Rate48kHz),
            _ => None,
        }
    }
}

/// Pixel layouts used for raw video delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoPixelFormat {
    /// Packed RGB, 24 bits per pixel
    Rgb,
    /// Packed BGR, 24 bits per pixel
    Bgr,
    /// Packed BGRA, 32 bits per pixel
    Bgra,
    /// Planar YUV 4:2:0, 12 bits per pixel
    I420,
    /// Semi-planar YUV 4:2:0, 12 bits per pixel
    Nv12,
    /// Packed RGBA, 32 bits per pixel
    Rgba,
}

impl VideoPixelFormat {
    /// Bits required per pixel
    pub fn bits_per_pixel(self) -> u32 {
        match self {
            Self::Rgb | Self::Bgr => 24,
            Self::Bgra | Self::Rgba => 32,
            Self::I420 | Self::Nv12 => 12,
        }
    }

    /// Whether the layout stores planes rather than packed pixels
    pub fn is_planar(self) -> bool {
        matches!(self, Self::I420 | Self::Nv12)
    }

    /// Byte stride of a tightly packed row for the given width
    ///
    /// For planar layouts this is the luma plane stride.
    pub fn packed_stride(self, width: u32) -> usize {
        if self.is_planar() {
            width as usize
        } else {
            width as usize * (self.bits_per_pixel() as usize / 8)
        }
    }

    /// Total buffer length implied by a stride and height
    ///
    /// Planar 4:2:0 layouts carry half a luma plane of chroma on top of
    /// the `stride * height` luma bytes.
    pub fn frame_buffer_len(self, stride: usize, height: u32) -> usize {
        let luma = stride * height as usize;
        if self.is_planar() {
            luma + luma / 2
        } else {
            luma
        }
    }
}

macro_rules! codec_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[doc = $text]
                $variant,
            )+
            /// Codec name not in the known set
            Unknown,
        }

        impl $name {
            /// All known tags, excluding `Unknown`
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            /// Canonical codec name as used in SDP rtpmap attributes
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                    Self::Unknown => "Unknown",
                }
            }

            /// Resolve a codec tag by exact name match
            ///
            /// Unresolved names map to `Unknown`; resolution never fails.
            pub fn from_name(name: &str) -> Self {
                static TABLE: Lazy<HashMap<&'static str, $name>> = Lazy::new(|| {
                    $name::ALL.iter().map(|c| (c.name(), *c)).collect()
                });
                TABLE.get(name).copied().unwrap_or(Self::Unknown)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.name())
            }
        }
    };
}

codec_enum! {
    /// Known audio codec tags
    AudioCodec {
        Pcmu => "PCMU",
        Gsm => "GSM",
        G723 => "G723",
        Dvi4 => "DVI4",
        Lpc => "LPC",
        Pcma => "PCMA",
        G722 => "G722",
        L16 => "L16",
        Qcelp => "QCELP",
        Cn => "CN",
        Mpa => "MPA",
        G728 => "G728",
        G729 => "G729",
        Opus => "OPUS",
        PcmS16Le => "PCM_S16LE",
    }
}

codec_enum! {
    /// Known video codec tags
    VideoCodec {
        Celb => "CELB",
        Jpeg => "JPEG",
        Nv => "NV",
        H261 => "H261",
        Mpv => "MPV",
        Mp2t => "MP2T",
        H263 => "H263",
        Vp8 => "VP8",
        Vp9 => "VP9",
        H264 => "H264",
        H265 => "H265",
    }
}

codec_enum! {
    /// Known real-time text codec tags
    TextCodec {
        T140 => "T140",
        Red => "RED",
    }
}

/// Common view over the three format descriptor kinds
///
/// Used by the negotiation helpers, which are generic over the media kind.
pub trait MediaFormat {
    /// Numeric payload id in `0..=127`
    fn format_id(&self) -> u8;
    /// Codec name; the negotiation key for dynamic formats
    fn format_name(&self) -> &str;
    /// Clock rate used for decoded samples
    fn clock_rate(&self) -> u32;
    /// Opaque `a=fmtp` codec parameters, passed through verbatim
    fn parameters(&self) -> Option<&str>;
    /// Whether this is the "no format selected" sentinel
    fn is_empty(&self) -> bool;

    /// Whether the payload id falls in the dynamic range `96..=127`
    fn is_dynamic(&self) -> bool {
        self.format_id() >= DYNAMIC_ID_MIN
    }

    /// Negotiation identity check
    ///
    /// Dynamic formats match on `(format_id, format_name)` since their ids
    /// are session-local; well-known formats are globally unambiguous and
    /// match on id alone. Empty sentinels never match anything.
    fn negotiation_matches(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        if self.is_dynamic() || other.is_dynamic() {
            self.format_id() == other.format_id()
                && self
                    .format_name()
                    .eq_ignore_ascii_case(other.format_name())
        } else {
            self.format_id() == other.format_id()
        }
    }
}

fn validate_common(format_id: u8, format_name: &str, clock_rate: u32) -> Result<(), FormatError> {
    if format_id > DYNAMIC_ID_MAX {
        return Err(FormatError::IdOutOfRange {
            id: format_id as u16,
        });
    }
    if format_name.trim().is_empty() {
        return Err(FormatError::BlankFormatName);
    }
    if clock_rate == 0 {
        return Err(FormatError::InvalidClockRate { rate: clock_rate });
    }
    Ok(())
}

/// Immutable descriptor of one audio codec configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioFormat {
    codec: AudioCodec,
    format_id: u8,
    format_name: String,
    clock_rate: u32,
    rtp_clock_rate: u32,
    channel_count: u8,
    parameters: Option<String>,
    empty: bool,
}

impl AudioFormat {
    /// Default decoded-sample rate for telephony audio
    pub const DEFAULT_CLOCK_RATE: u32 = 8000;
    /// Default channel count
    pub const DEFAULT_CHANNEL_COUNT: u8 = 1;

    /// Create an audio format, validating every invariant
    ///
    /// The codec tag is resolved from `format_name` by exact name match;
    /// an unrecognized name yields [`AudioCodec::Unknown`] without failing.
    /// `rtp_clock_rate` almost always equals `clock_rate`; G722 is the
    /// historical exception (decoded at 16 kHz, wire timestamps at 8 kHz).
    pub fn new(
        format_id: u8,
        format_name: impl Into<String>,
        clock_rate: u32,
        rtp_clock_rate: u32,
        channel_count: u8,
        parameters: Option<String>,
    ) -> Result<Self, FormatError> {
        let format_name = format_name.into();
        validate_common(format_id, &format_name, clock_rate)?;
        if rtp_clock_rate == 0 {
            return Err(FormatError::InvalidRtpClockRate {
                rate: rtp_clock_rate,
            });
        }
        if channel_count == 0 {
            return Err(FormatError::InvalidChannelCount {
                channels: channel_count,
            });
        }

        let codec = AudioCodec::from_name(&format_name);
        Ok(Self {
            codec,
            format_id,
            format_name,
            clock_rate,
            rtp_clock_rate,
            channel_count,
            parameters,
            empty: false,
        })
    }

    /// Create an audio format from a known codec tag
    ///
    /// The RTP clock rate is set equal to `clock_rate`.
    pub fn from_codec(
        codec: AudioCodec,
        format_id: u8,
        clock_rate: u32,
        channel_count: u8,
    ) -> Result<Self, FormatError> {
        Self::new(
            format_id,
            codec.name(),
            clock_rate,
            clock_rate,
            channel_count,
            None,
        )
    }

    /// Copy the canonical descriptor for a well-known (RFC 3551) format
    pub fn from_well_known(wk: well_known::WellKnownAudioFormat) -> Self {
        wk.format()
    }

    /// The "no format selected" sentinel; valid as a default, never negotiable
    pub fn empty() -> Self {
        Self {
            codec: AudioCodec::Unknown,
            format_id: 0,
            format_name: String::new(),
            clock_rate: Self::DEFAULT_CLOCK_RATE,
            rtp_clock_rate: Self::DEFAULT_CLOCK_RATE,
            channel_count: Self::DEFAULT_CHANNEL_COUNT,
            parameters: None,
            empty: true,
        }
    }

    /// Resolved codec tag
    pub fn codec(&self) -> AudioCodec {
        self.codec
    }

    /// Numeric payload id
    pub fn format_id(&self) -> u8 {
        self.format_id
    }

    /// Codec name used for SDP matching
    pub fn format_name(&self) -> &str {
        &self.format_name
    }

    /// Rate of decoded samples in Hz
    pub fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    /// Rate used for RTP timestamps in Hz
    pub fn rtp_clock_rate(&self) -> u32 {
        self.rtp_clock_rate
    }

    /// Number of audio channels
    pub fn channel_count(&self) -> u8 {
        self.channel_count
    }

    /// Codec-specific `a=fmtp` parameters
    pub fn parameters(&self) -> Option<&str> {
        self.parameters.as_deref()
    }

    /// Whether this is the empty sentinel
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Whether the payload id is in the dynamic range
    pub fn is_dynamic(&self) -> bool {
        self.format_id >= DYNAMIC_ID_MIN
    }

    /// The `a=rtpmap` attribute value for this format
    ///
    /// Single-channel formats omit the channel count, matching common
    /// SDP practice: `PCMU/8000` but `OPUS/48000/2`.
    pub fn rtpmap(&self) -> String {
        if self.channel_count > 1 {
            format!(
                "{}/{}/{}",
                self.format_name, self.rtp_clock_rate, self.channel_count
            )
        } else {
            format!("{}/{}", self.format_name, self.rtp_clock_rate)
        }
    }
}

impl MediaFormat for AudioFormat {
    fn format_id(&self) -> u8 {
        self.format_id
    }
    fn format_name(&self) -> &str {
        &self.format_name
    }
    fn clock_rate(&self) -> u32 {
        self.clock_rate
    }
    fn parameters(&self) -> Option<&str> {
        self.parameters.as_deref()
    }
    fn is_empty(&self) -> bool {
        self.empty
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.empty {
            write!(f, "(empty audio format)")
        } else {
            write!(f, "{} {}", self.format_id, self.rtpmap())
        }
    }
}

/// Immutable descriptor of one video codec configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoFormat {
    codec: VideoCodec,
    format_id: u8,
    format_name: String,
    clock_rate: u32,
    parameters: Option<String>,
    empty: bool,
}

impl VideoFormat {
    /// Default RTP clock rate for video formats
    pub const DEFAULT_CLOCK_RATE: u32 = 90000;

    /// Create a video format, validating every invariant
    pub fn new(
        format_id: u8,
        format_name: impl Into<String>,
        clock_rate: u32,
        parameters: Option<String>,
    ) -> Result<Self, FormatError> {
        let format_name = format_name.into();
        validate_common(format_id, &format_name, clock_rate)?;

        let codec = VideoCodec::from_name(&format_name);
        Ok(Self {
            codec,
            format_id,
            format_name,
            clock_rate,
            parameters,
            empty: false,
        })
    }

    /// Create a video format from a known codec tag at the default clock rate
    pub fn from_codec(codec: VideoCodec, format_id: u8) -> Result<Self, FormatError> {
        Self::new(format_id, codec.name(), Self::DEFAULT_CLOCK_RATE, None)
    }

    /// Copy the canonical descriptor for a well-known (RFC 3551) format
    pub fn from_well_known(wk: well_known::WellKnownVideoFormat) -> Self {
        wk.format()
    }

    /// The "no format selected" sentinel; valid as a default, never negotiable
    pub fn empty() -> Self {
        Self {
            codec: VideoCodec::Unknown,
            format_id: 0,
            format_name: String::new(),
            clock_rate: Self::DEFAULT_CLOCK_RATE,
            parameters: None,
            empty: true,
        }
    }

    /// Resolved codec tag
    pub fn codec(&self) -> VideoCodec {
        self.codec
    }

    /// Numeric payload id
    pub fn format_id(&self) -> u8 {
        self.format_id
    }

    /// Codec name used for SDP matching
    pub fn format_name(&self) -> &str {
        &self.format_name
    }

    /// RTP clock rate in Hz
    pub fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    /// Codec-specific `a=fmtp` parameters
    pub fn parameters(&self) -> Option<&str> {
        self.parameters.as_deref()
    }

    /// Whether this is the empty sentinel
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Whether the payload id is in the dynamic range
    pub fn is_dynamic(&self) -> bool {
        self.format_id >= DYNAMIC_ID_MIN
    }

    /// The `a=rtpmap` attribute value for this format
    pub fn rtpmap(&self) -> String {
        format!("{}/{}", self.format_name, self.clock_rate)
    }
}

impl MediaFormat for VideoFormat {
    fn format_id(&self) -> u8 {
        self.format_id
    }
    fn format_name(&self) -> &str {
        &self.format_name
    }
    fn clock_rate(&self) -> u32 {
        self.clock_rate
    }
    fn parameters(&self) -> Option<&str> {
        self.parameters.as_deref()
    }
    fn is_empty(&self) -> bool {
        self.empty
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.empty {
            write!(f, "(empty video format)")
        } else {
            write!(f, "{} {}", self.format_id, self.rtpmap())
        }
    }
}

/// Immutable descriptor of one real-time text codec configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextFormat {
    codec: TextCodec,
    format_id: u8,
    format_name: String,
    clock_rate: u32,
    parameters: Option<String>,
    empty: bool,
}

impl TextFormat {
    /// Default clock rate for T.140 real-time text
    pub const DEFAULT_CLOCK_RATE: u32 = 1000;

    /// Create a text format, validating every invariant
    pub fn new(
        format_id: u8,
        format_name: impl Into<String>,
        clock_rate: u32,
        parameters: Option<String>,
    ) -> Result<Self, FormatError> {
        let format_name = format_name.into();
        validate_common(format_id, &format_name, clock_rate)?;

        let codec = TextCodec::from_name(&format_name);
        Ok(Self {
            codec,
            format_id,
            format_name,
            clock_rate,
            parameters,
            empty: false,
        })
    }

    /// Create a text format from a known codec tag at the default clock rate
    pub fn from_codec(codec: TextCodec, format_id: u8) -> Result<Self, FormatError> {
        Self::new(format_id, codec.name(), Self::DEFAULT_CLOCK_RATE, None)
    }

    /// The "no format selected" sentinel; valid as a default, never negotiable
    pub fn empty() -> Self {
        Self {
            codec: TextCodec::Unknown,
            format_id: 0,
            format_name: String::new(),
            clock_rate: Self::DEFAULT_CLOCK_RATE,
            parameters: None,
            empty: true,
        }
    }

    /// Resolved codec tag
    pub fn codec(&self) -> TextCodec {
        self.codec
    }

    /// Numeric payload id
    pub fn format_id(&self) -> u8 {
        self.format_id
    }

    /// Codec name used for SDP matching
    pub fn format_name(&self) -> &str {
        &self.format_name
    }

    /// RTP clock rate in Hz
    pub fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    /// Codec-specific `a=fmtp` parameters
    pub fn parameters(&self) -> Option<&str> {
        self.parameters.as_deref()
    }

    /// Whether this is the empty sentinel
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Whether the payload id is in the dynamic range
    pub fn is_dynamic(&self) -> bool {
        self.format_id >= DYNAMIC_ID_MIN
    }

    /// The `a=rtpmap` attribute value for this format
    pub fn rtpmap(&self) -> String {
        format!("{}/{}", self.format_name, self.clock_rate)
    }
}

impl MediaFormat for TextFormat {
    fn format_id(&self) -> u8 {
        self.format_id
    }
    fn format_name(&self) -> &str {
        &self.format_name
    }
    fn clock_rate(&self) -> u32 {
        self.clock_rate
    }
    fn parameters(&self) -> Option<&str> {
        self.parameters.as_deref()
    }
    fn is_empty(&self) -> bool {
        self.empty
    }
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.empty {
            write!(f, "(empty text format)")
        } else {
            write!(f, "{} {}", self.format_id, self.rtpmap())
        }
    }
}
