//! Capability negotiation integration tests
//!
//! Exercise the offer/answer flow a signaling layer runs: restrict a
//! component's supported formats to what the remote peer advertised, pick
//! the shared format and pin it on both directions.

use rtc_media_abstractions::{
    negotiate, AudioEncoder, AudioFormat, AudioSource, DecodingAudioSink, ExternalAudioSource,
    AudioSink, MediaError, MediaFormat, Result, WellKnownAudioFormat,
};

struct MultiFormatCodec;

impl AudioEncoder for MultiFormatCodec {
    fn supported_formats(&self) -> Vec<AudioFormat> {
        vec![
            AudioFormat::from_well_known(WellKnownAudioFormat::Pcmu),
            AudioFormat::from_well_known(WellKnownAudioFormat::Pcma),
            AudioFormat::new(111, "OPUS", 48000, 48000, 2, None).unwrap(),
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

#[tokio::test]
async fn test_offer_answer_pins_shared_format() {
    let mut source = ExternalAudioSource::new(Box::new(MultiFormatCodec));
    let mut sink = DecodingAudioSink::new(Box::new(MultiFormatCodec));

    // Remote answer advertises PCMA and a dynamic opus at a different id.
    let answer = vec![
        AudioFormat::from_well_known(WellKnownAudioFormat::Pcma),
        AudioFormat::new(102, "opus", 48000, 48000, 2, None).unwrap(),
    ];

    let chosen = negotiate::first_common_format(&source.source_formats(), &answer).unwrap();
    assert_eq!(chosen.format_name(), "PCMA");

    source.restrict_formats(&|f| answer.iter().any(|a| f.negotiation_matches(a)));
    sink.restrict_formats(&|f| answer.iter().any(|a| f.negotiation_matches(a)));

    // Our OPUS at 111 does not match their opus at 102, so only PCMA is left.
    assert_eq!(source.source_formats().len(), 1);
    assert_eq!(sink.sink_formats().len(), 1);

    source.set_source_format(&chosen).unwrap();
    sink.set_sink_format(&chosen).unwrap();
    assert_eq!(source.active_format(), Some(&chosen));
    assert_eq!(sink.active_format(), Some(&chosen));
}

#[tokio::test]
async fn test_empty_intersection_leaves_component_usable() {
    let mut source = ExternalAudioSource::new(Box::new(MultiFormatCodec));

    // Remote supports nothing we do.
    let answer = vec![AudioFormat::new(97, "AMR", 8000, 8000, 1, None).unwrap()];
    assert!(negotiate::first_common_format(&source.source_formats(), &answer).is_none());

    source.restrict_formats(&|f| answer.iter().any(|a| f.negotiation_matches(a)));
    assert!(source.source_formats().is_empty());

    // The component still runs; it just cannot pin a format any more.
    source.start().await.unwrap();
    let pcmu = AudioFormat::from_well_known(WellKnownAudioFormat::Pcmu);
    source.pause().await.unwrap();
    assert!(matches!(
        source.set_source_format(&pcmu),
        Err(MediaError::FormatNotSupported { .. })
    ));
}

#[tokio::test]
async fn test_format_change_rejected_while_running() {
    let mut source = ExternalAudioSource::new(Box::new(MultiFormatCodec));
    let pcmu = AudioFormat::from_well_known(WellKnownAudioFormat::Pcmu);
    let pcma = AudioFormat::from_well_known(WellKnownAudioFormat::Pcma);

    source.set_source_format(&pcmu).unwrap();
    source.start().await.unwrap();

    assert!(matches!(
        source.set_source_format(&pcma),
        Err(MediaError::InvalidTransition { .. })
    ));
    // The previous pin is untouched by the rejected change.
    assert_eq!(source.active_format(), Some(&pcmu));

    source.pause().await.unwrap();
    source.set_source_format(&pcma).unwrap();
    assert_eq!(source.active_format(), Some(&pcma));
}
