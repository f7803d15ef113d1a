//! End-to-end pipeline integration tests
//!
//! Wire an externally-fed source to a decoding sink through their delivery
//! channels, the way a transport layer would, and verify that samples
//! survive the trip through encode, packetization metadata and decode.

use parking_lot::Mutex;
use rtc_media_abstractions::{
    AudioEncoder, AudioFormat, AudioSamplingRate, AudioSink, AudioSource, DecodingAudioSink,
    DecodingTextSink, DecodingVideoSink, ExternalAudioSource, ExternalTextSource,
    ExternalVideoSource, MediaEndpoints, MediaError, MediaState, Result, RtpPayload, TextCodec,
    TextEncoder, TextFormat, TextSink, TextSource, VideoCodec, VideoEncoder, VideoFormat,
    VideoPixelFormat, VideoSample, VideoSink, VideoSource, WellKnownAudioFormat,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// i16 PCM as little-endian byte pairs; enough structure to detect
/// corruption in transit.
struct PcmCodec;

impl AudioEncoder for PcmCodec {
    fn supported_formats(&self) -> Vec<AudioFormat> {
        vec![
            AudioFormat::from_well_known(WellKnownAudioFormat::Pcmu),
            AudioFormat::from_well_known(WellKnownAudioFormat::Pcma),
            AudioFormat::from_well_known(WellKnownAudioFormat::G722),
        ]
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

/// Passthrough video codec reconstructing fixed-dimension frames.
struct FrameCodec {
    width: u32,
    height: u32,
}

impl VideoEncoder for FrameCodec {
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
        Ok(vec![VideoSample::new(
            self.width,
            self.height,
            encoded.to_vec(),
        )])
    }
}

struct T140Codec;

impl TextEncoder for T140Codec {
    fn supported_formats(&self) -> Vec<TextFormat> {
        vec![TextFormat::from_codec(TextCodec::T140, 98).unwrap()]
    }

    fn encode(&mut self, text: &str, _format: &TextFormat) -> Result<Vec<u8>> {
        Ok(text.as_bytes().to_vec())
    }

    fn decode(&mut self, encoded: &[u8], _format: &TextFormat) -> Result<String> {
        String::from_utf8(encoded.to_vec()).map_err(|e| MediaError::decoding_failed(e.to_string()))
    }
}

fn remote() -> SocketAddr {
    "127.0.0.1:5004".parse().unwrap()
}

#[tokio::test]
async fn test_audio_source_to_sink_round_trip() {
    let pcmu = AudioFormat::from_well_known(WellKnownAudioFormat::Pcmu);

    let mut source = ExternalAudioSource::new(Box::new(PcmCodec));
    source.set_source_format(&pcmu).unwrap();
    let mut sink = DecodingAudioSink::new(Box::new(PcmCodec));
    sink.set_sink_format(&pcmu).unwrap();

    // Transport stand-in: collect encoded samples from the source.
    let wire: Arc<Mutex<Vec<(u32, Vec<u8>)>>> = Arc::new(Mutex::new(Vec::new()));
    let w = Arc::clone(&wire);
    source
        .events()
        .encoded
        .subscribe(Arc::new(move |duration, bytes: &[u8]| {
            w.lock().push((duration, bytes.to_vec()));
        }));

    let decoded: Arc<Mutex<Vec<i16>>> = Arc::new(Mutex::new(Vec::new()));
    let d = Arc::clone(&decoded);
    sink.events()
        .decoded
        .subscribe(Arc::new(move |pcm: &[i16], rate, channels| {
            assert_eq!(rate, 8000);
            assert_eq!(channels, 1);
            d.lock().extend_from_slice(pcm);
        }));

    source.start().await.unwrap();
    sink.start().await.unwrap();

    let pcm: Vec<i16> = (0..160).map(|i| (i * 3) as i16).collect();
    source
        .external_raw_sample(AudioSamplingRate::Rate8kHz, 20, &pcm)
        .unwrap();

    // Feed the wire into the sink as RTP.
    let captured = wire.lock().clone();
    assert_eq!(captured.len(), 1);
    let (duration, payload) = &captured[0];
    assert_eq!(*duration, 160);

    sink.got_rtp(&RtpPayload {
        remote: remote(),
        ssrc: 0xdead,
        seqnum: 1,
        timestamp: 0,
        payload_id: 0,
        marker: false,
        payload,
    })
    .unwrap();

    assert_eq!(*decoded.lock(), pcm);
}

#[tokio::test]
async fn test_g722_duration_uses_rtp_clock() {
    // G722 decodes at 16 kHz but stamps RTP at 8 kHz; the encoded channel
    // duration must follow the wire clock.
    let g722 = AudioFormat::from_well_known(WellKnownAudioFormat::G722);
    let mut source = ExternalAudioSource::new(Box::new(PcmCodec));
    source.set_source_format(&g722).unwrap();

    let duration = Arc::new(AtomicUsize::new(0));
    let du = Arc::clone(&duration);
    source
        .events()
        .encoded
        .subscribe(Arc::new(move |dur, _: &[u8]| {
            du.store(dur as usize, Ordering::SeqCst);
        }));

    source.start().await.unwrap();
    source
        .external_raw_sample(AudioSamplingRate::Rate16kHz, 20, &[0i16; 320])
        .unwrap();

    assert_eq!(duration.load(Ordering::SeqCst), 160);
}

#[tokio::test]
async fn test_video_frame_over_fragmented_rtp() {
    let vp8 = VideoFormat::from_codec(VideoCodec::Vp8, 96).unwrap();

    let mut source = ExternalVideoSource::new(Box::new(FrameCodec {
        width: 4,
        height: 4,
    }));
    source.set_source_format(&vp8).unwrap();
    let mut sink = DecodingVideoSink::new(
        Box::new(FrameCodec {
            width: 4,
            height: 4,
        }),
        VideoPixelFormat::Rgb,
    );
    sink.set_sink_format(&vp8).unwrap();

    let wire: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let w = Arc::clone(&wire);
    source
        .events()
        .encoded
        .subscribe(Arc::new(move |_, bytes: &[u8]| {
            w.lock().extend_from_slice(bytes);
        }));

    let decoded: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let d = Arc::clone(&decoded);
    sink.events()
        .decoded
        .subscribe(Arc::new(move |pixels: &[u8], w, h, _, _| {
            assert_eq!((w, h), (4, 4));
            d.lock().extend_from_slice(pixels);
        }));

    source.start().await.unwrap();
    sink.start().await.unwrap();

    let pixels: Vec<u8> = (0..48).collect();
    source
        .external_raw_sample(33, 4, 4, &pixels, VideoPixelFormat::Rgb)
        .unwrap();

    // Fragment the encoded frame into two packets sharing a timestamp.
    let encoded = wire.lock().clone();
    assert_eq!(encoded.len(), 48);
    let (first, second) = encoded.split_at(20);
    let mut packet = RtpPayload {
        remote: remote(),
        ssrc: 7,
        seqnum: 100,
        timestamp: 9000,
        payload_id: 96,
        marker: false,
        payload: first,
    };
    sink.got_rtp(&packet).unwrap();
    assert!(decoded.lock().is_empty());

    packet.seqnum = 101;
    packet.marker = true;
    packet.payload = second;
    sink.got_rtp(&packet).unwrap();

    assert_eq!(*decoded.lock(), pixels);
}

#[tokio::test]
async fn test_text_source_to_sink_round_trip() {
    let t140 = TextFormat::from_codec(TextCodec::T140, 98).unwrap();

    let mut source = ExternalTextSource::new(Box::new(T140Codec));
    source.set_source_format(&t140).unwrap();
    let mut sink = DecodingTextSink::new(Box::new(T140Codec));
    sink.set_sink_format(&t140).unwrap();

    let wire: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let w = Arc::clone(&wire);
    source
        .events()
        .encoded
        .subscribe(Arc::new(move |bytes: &[u8]| {
            w.lock().extend_from_slice(bytes);
        }));

    let received: Arc<Mutex<String>> = Arc::new(Mutex::new(String::new()));
    let r = Arc::clone(&received);
    sink.events().text.subscribe(Arc::new(move |text: &str| {
        r.lock().push_str(text);
    }));

    source.start().await.unwrap();
    sink.start().await.unwrap();

    source.send_text("live caption").unwrap();
    let payload = wire.lock().clone();
    sink.got_rtp(&RtpPayload {
        remote: remote(),
        ssrc: 3,
        seqnum: 1,
        timestamp: 0,
        payload_id: 98,
        marker: false,
        payload: &payload,
    })
    .unwrap();

    assert_eq!(received.lock().as_str(), "live caption");
}

#[tokio::test]
async fn test_paused_source_drops_frames_without_replay() {
    let pcmu = AudioFormat::from_well_known(WellKnownAudioFormat::Pcmu);
    let mut source = ExternalAudioSource::new(Box::new(PcmCodec));
    source.set_source_format(&pcmu).unwrap();

    let delivered = Arc::new(AtomicUsize::new(0));
    let de = Arc::clone(&delivered);
    source
        .events()
        .raw
        .subscribe(Arc::new(move |_, _, _: &[i16]| {
            de.fetch_add(1, Ordering::SeqCst);
        }));

    source.start().await.unwrap();
    source
        .external_raw_sample(AudioSamplingRate::Rate8kHz, 20, &[1; 160])
        .unwrap();

    source.pause().await.unwrap();
    assert_eq!(source.state(), MediaState::Paused);
    for _ in 0..5 {
        source
            .external_raw_sample(AudioSamplingRate::Rate8kHz, 20, &[2; 160])
            .unwrap();
    }

    source.resume().await.unwrap();
    source
        .external_raw_sample(AudioSamplingRate::Rate8kHz, 20, &[3; 160])
        .unwrap();

    // One before pause, one after resume; nothing buffered in between.
    assert_eq!(delivered.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_endpoints_bundle_full_session() {
    let mut endpoints = MediaEndpoints::new()
        .with_audio_source(Box::new(ExternalAudioSource::new(Box::new(PcmCodec))))
        .with_audio_sink(Box::new(DecodingAudioSink::new(Box::new(PcmCodec))))
        .with_video_source(Box::new(ExternalVideoSource::new(Box::new(FrameCodec {
            width: 4,
            height: 4,
        }))))
        .with_video_sink(Box::new(DecodingVideoSink::new(
            Box::new(FrameCodec {
                width: 4,
                height: 4,
            }),
            VideoPixelFormat::Rgb,
        )))
        .with_text_source(Box::new(ExternalTextSource::new(Box::new(T140Codec))))
        .with_text_sink(Box::new(DecodingTextSink::new(Box::new(T140Codec))));

    assert!(endpoints.has_audio());
    assert!(endpoints.has_video());
    assert!(endpoints.has_text());

    // Drive the whole bundle through its lifecycle via the trait objects.
    endpoints.audio_source_mut().unwrap().start().await.unwrap();
    endpoints.video_source_mut().unwrap().start().await.unwrap();
    endpoints.text_source_mut().unwrap().start().await.unwrap();
    endpoints.audio_sink_mut().unwrap().start().await.unwrap();

    endpoints.close_all().await.unwrap();

    assert_eq!(
        endpoints.audio_source().map(|c| c.state()),
        Some(MediaState::Closed)
    );
    assert_eq!(
        endpoints.video_sink().map(|c| c.state()),
        Some(MediaState::Closed)
    );
    assert_eq!(
        endpoints.text_source().map(|c| c.state()),
        Some(MediaState::Closed)
    );

    // Closed is terminal for every component in the bundle.
    assert!(matches!(
        endpoints.audio_source_mut().unwrap().start().await,
        Err(MediaError::Closed)
    ));
}
