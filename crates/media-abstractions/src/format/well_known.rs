//! Well-known (statically assigned) RTP payload formats
//!
//! RFC 3551 section 6 assigns fixed payload type numbers to a closed set
//! of audio and video formats. Those numbers are wire constants referenced
//! directly by the SDP/RTP layers, so the table below must reproduce them
//! exactly. The registry is split per media kind, which makes every lookup
//! total over its enumeration: asking for the canonical descriptor of a
//! well-known format cannot fail.

use super::{AudioCodec, AudioFormat, VideoCodec, VideoFormat};
use serde::{Deserialize, Serialize};

/// Statically assigned audio payload formats (RFC 3551)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WellKnownAudioFormat {
    /// PCMU, payload type 0 (8000/1)
    Pcmu,
    /// GSM, payload type 3 (8000/1)
    Gsm,
    /// G723, payload type 4 (8000/1)
    G723,
    /// DVI4, payload type 5 (8000/1)
    Dvi4,
    /// DVI4, payload type 6 (16000/1)
    Dvi4_16k,
    /// LPC, payload type 7 (8000/1)
    Lpc,
    /// PCMA, payload type 8 (8000/1)
    Pcma,
    /// G722, payload type 9 (decoded 16000, RTP clock 8000)
    G722,
    /// L16 stereo, payload type 10 (44100/2)
    L16_2,
    /// L16 mono, payload type 11 (44100/1)
    L16,
    /// QCELP, payload type 12 (8000/1)
    Qcelp,
    /// Comfort noise, payload type 13 (8000/1)
    Cn,
    /// MPA, payload type 14 (90000)
    Mpa,
    /// G728, payload type 15 (8000/1)
    G728,
    /// DVI4, payload type 16 (11025/1)
    Dvi4_11k,
    /// DVI4, payload type 17 (22050/1)
    Dvi4_22k,
    /// G729, payload type 18 (8000/1)
    G729,
}

impl WellKnownAudioFormat {
    /// All well-known audio formats
    pub const ALL: &'static [Self] = &[
        Self::Pcmu,
        Self::Gsm,
        Self::G723,
        Self::Dvi4,
        Self::Dvi4_16k,
        Self::Lpc,
        Self::Pcma,
        Self::G722,
        Self::L16_2,
        Self::L16,
        Self::Qcelp,
        Self::Cn,
        Self::Mpa,
        Self::G728,
        Self::Dvi4_11k,
        Self::Dvi4_22k,
        Self::G729,
    ];

    /// The fixed RTP payload type number
    pub fn payload_type(self) -> u8 {
        match self {
            Self::Pcmu => 0,
            Self::Gsm => 3,
            Self::G723 => 4,
            Self::Dvi4 => 5,
            Self::Dvi4_16k => 6,
            Self::Lpc => 7,
            Self::Pcma => 8,
            Self::G722 => 9,
            Self::L16_2 => 10,
            Self::L16 => 11,
            Self::Qcelp => 12,
            Self::Cn => 13,
            Self::Mpa => 14,
            Self::G728 => 15,
            Self::Dvi4_11k => 16,
            Self::Dvi4_22k => 17,
            Self::G729 => 18,
        }
    }

    /// Translate a legacy numeric payload type back to its table entry
    pub fn from_payload_type(payload_type: u8) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|wk| wk.payload_type() == payload_type)
    }

    /// The canonical format descriptor for this table entry
    ///
    /// Pure and stable: repeated lookups return field-for-field identical
    /// values.
    pub fn format(self) -> AudioFormat {
        let (codec, clock_rate, rtp_clock_rate, channels) = match self {
            Self::Pcmu => (AudioCodec::Pcmu, 8000, 8000, 1),
            Self::Gsm => (AudioCodec::Gsm, 8000, 8000, 1),
            Self::G723 => (AudioCodec::G723, 8000, 8000, 1),
            Self::Dvi4 => (AudioCodec::Dvi4, 8000, 8000, 1),
            Self::Dvi4_16k => (AudioCodec::Dvi4, 16000, 16000, 1),
            Self::Lpc => (AudioCodec::Lpc, 8000, 8000, 1),
            Self::Pcma => (AudioCodec::Pcma, 8000, 8000, 1),
            // Historical quirk: decoded rate and wire timestamp rate differ.
            Self::G722 => (AudioCodec::G722, 16000, 8000, 1),
            Self::L16_2 => (AudioCodec::L16, 44100, 44100, 2),
            Self::L16 => (AudioCodec::L16, 44100, 44100, 1),
            Self::Qcelp => (AudioCodec::Qcelp, 8000, 8000, 1),
            Self::Cn => (AudioCodec::Cn, 8000, 8000, 1),
            Self::Mpa => (AudioCodec::Mpa, 90000, 90000, 1),
            Self::G728 => (AudioCodec::G728, 8000, 8000, 1),
            Self::Dvi4_11k => (AudioCodec::Dvi4, 11025, 11025, 1),
            Self::Dvi4_22k => (AudioCodec::Dvi4, 22050, 22050, 1),
            Self::G729 => (AudioCodec::G729, 8000, 8000, 1),
        };

        AudioFormat {
            codec,
            format_id: self.payload_type(),
            format_name: codec.name().to_string(),
            clock_rate,
            rtp_clock_rate,
            channel_count: channels,
            parameters: None,
            empty: false,
        }
    }
}

/// Statically assigned video payload formats (RFC 3551)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WellKnownVideoFormat {
    /// CelB, payload type 24 (90000)
    Celb,
    /// JPEG, payload type 26 (90000)
    Jpeg,
    /// nv, payload type 28 (90000)
    Nv,
    /// H261, payload type 31 (90000)
    H261,
    /// MPV, payload type 32 (90000)
    Mpv,
    /// MP2T, payload type 33 (90000)
    Mp2t,
    /// H263, payload type 34 (90000)
    H263,
}

impl WellKnownVideoFormat {
    /// All well-known video formats
    pub const ALL: &'static [Self] = &[
        Self::Celb,
        Self::Jpeg,
        Self::Nv,
        Self::H261,
        Self::Mpv,
        Self::Mp2t,
        Self::H263,
    ];

    /// The fixed RTP payload type number
    pub fn payload_type(self) -> u8 {
        match self {
            Self::Celb => 24,
            Self::Jpeg => 26,
            Self::Nv => 28,
            Self::H261 => 31,
            Self::Mpv => 32,
            Self::Mp2t => 33,
            Self::H263 => 34,
        }
    }

    /// Translate a legacy numeric payload type back to its table entry
    pub fn from_payload_type(payload_type: u8) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|wk| wk.payload_type() == payload_type)
    }

    /// The canonical format descriptor for this table entry
    pub fn format(self) -> VideoFormat {
        let codec = match self {
            Self::Celb => VideoCodec::Celb,
            Self::Jpeg => VideoCodec::Jpeg,
            Self::Nv => VideoCodec::Nv,
            Self::H261 => VideoCodec::H261,
            Self::Mpv => VideoCodec::Mpv,
            Self::Mp2t => VideoCodec::Mp2t,
            Self::H263 => VideoCodec::H263,
        };

        VideoFormat {
            codec,
            format_id: self.payload_type(),
            format_name: codec.name().to_string(),
            clock_rate: VideoFormat::DEFAULT_CLOCK_RATE,
            parameters: None,
            empty: false,
        }
    }
}
