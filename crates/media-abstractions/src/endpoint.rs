//! Aggregate handle over the media components of one session
//!
//! A call typically carries some subset of audio, video and text, each
//! with a source and a sink. [`MediaEndpoints`] bundles whichever of the
//! six exist behind their capability traits so the signaling layer can
//! hand a session's media machinery around as one value.

use crate::error::Result;
use crate::sink::{AudioSink, TextSink, VideoSink};
use crate::source::{AudioSource, TextSource, VideoSource};
use tracing::debug;

/// The media components participating in one session
///
/// Every slot is optional; an audio-only call simply leaves the video and
/// text slots empty. Slots hold trait objects, so any mix of component
/// implementations composes.
#[derive(Default)]
pub struct MediaEndpoints {
    audio_source: Option<Box<dyn AudioSource>>,
    audio_sink: Option<Box<dyn AudioSink>>,
    video_source: Option<Box<dyn VideoSource>>,
    video_sink: Option<Box<dyn VideoSink>>,
    text_source: Option<Box<dyn TextSource>>,
    text_sink: Option<Box<dyn TextSink>>,
}

impl MediaEndpoints {
    /// Create an empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an audio source
    pub fn with_audio_source(mut self, source: Box<dyn AudioSource>) -> Self {
        self.audio_source = Some(source);
        self
    }

    /// Attach an audio sink
    pub fn with_audio_sink(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.audio_sink = Some(sink);
        self
    }

    /// Attach a video source
    pub fn with_video_source(mut self, source: Box<dyn VideoSource>) -> Self {
        self.video_source = Some(source);
        self
    }

    /// Attach a video sink
    pub fn with_video_sink(mut self, sink: Box<dyn VideoSink>) -> Self {
        self.video_sink = Some(sink);
        self
    }

    /// Attach a text source
    pub fn with_text_source(mut self, source: Box<dyn TextSource>) -> Self {
        self.text_source = Some(source);
        self
    }

    /// Attach a text sink
    pub fn with_text_sink(mut self, sink: Box<dyn TextSink>) -> Self {
        self.text_sink = Some(sink);
        self
    }

    /// The audio source, if one is attached
    pub fn audio_source(&self) -> Option<&dyn AudioSource> {
        self.audio_source.as_deref()
    }

    /// Mutable access to the audio source
    pub fn audio_source_mut(&mut self) -> Option<&mut (dyn AudioSource + 'static)> {
        self.audio_source.as_deref_mut()
    }

    /// The audio sink, if one is attached
    pub fn audio_sink(&self) -> Option<&dyn AudioSink> {
        self.audio_sink.as_deref()
    }

    /// Mutable access to the audio sink
    pub fn audio_sink_mut(&mut self) -> Option<&mut (dyn AudioSink + 'static)> {
        self.audio_sink.as_deref_mut()
    }

    /// The video source, if one is attached
    pub fn video_source(&self) -> Option<&dyn VideoSource> {
        self.video_source.as_deref()
    }

    /// Mutable access to the video source
    pub fn video_source_mut(&mut self) -> Option<&mut (dyn VideoSource + 'static)> {
        self.video_source.as_deref_mut()
    }

    /// The video sink, if one is attached
    pub fn video_sink(&self) -> Option<&dyn VideoSink> {
        self.video_sink.as_deref()
    }

    /// Mutable access to the video sink
    pub fn video_sink_mut(&mut self) -> Option<&mut (dyn VideoSink + 'static)> {
        self.video_sink.as_deref_mut()
    }

    /// The text source, if one is attached
    pub fn text_source(&self) -> Option<&dyn TextSource> {
        self.text_source.as_deref()
    }

    /// Mutable access to the text source
    pub fn text_source_mut(&mut self) -> Option<&mut (dyn TextSource + 'static)> {
        self.text_source.as_deref_mut()
    }

    /// The text sink, if one is attached
    pub fn text_sink(&self) -> Option<&dyn TextSink> {
        self.text_sink.as_deref()
    }

    /// Mutable access to the text sink
    pub fn text_sink_mut(&mut self) -> Option<&mut (dyn TextSink + 'static)> {
        self.text_sink.as_deref_mut()
    }

    /// Detach and return the audio source
    pub fn take_audio_source(&mut self) -> Option<Box<dyn AudioSource>> {
        self.audio_source.take()
    }

    /// Detach and return the audio sink
    pub fn take_audio_sink(&mut self) -> Option<Box<dyn AudioSink>> {
        self.audio_sink.take()
    }

    /// Detach and return the video source
    pub fn take_video_source(&mut self) -> Option<Box<dyn VideoSource>> {
        self.video_source.take()
    }

    /// Detach and return the video sink
    pub fn take_video_sink(&mut self) -> Option<Box<dyn VideoSink>> {
        self.video_sink.take()
    }

    /// Detach and return the text source
    pub fn take_text_source(&mut self) -> Option<Box<dyn TextSource>> {
        self.text_source.take()
    }

    /// Detach and return the text sink
    pub fn take_text_sink(&mut self) -> Option<Box<dyn TextSink>> {
        self.text_sink.take()
    }

    /// Whether the session carries audio in either direction
    pub fn has_audio(&self) -> bool {
        self.audio_source.is_some() || self.audio_sink.is_some()
    }

    /// Whether the session carries video in either direction
    pub fn has_video(&self) -> bool {
        self.video_source.is_some() || self.video_sink.is_some()
    }

    /// Whether the session carries real-time text in either direction
    pub fn has_text(&self) -> bool {
        self.text_source.is_some() || self.text_sink.is_some()
    }

    /// Close every attached component
    ///
    /// All components are closed even if one of them fails; the first
    /// failure is returned afterwards.
    pub async fn close_all(&mut self) -> Result<()> {
        debug!("closing all media endpoints");
        let mut first_err = None;

        macro_rules! close_slot {
            ($slot:expr) => {
                if let Some(component) = $slot.as_mut() {
                    if let Err(e) = component.close().await {
                        first_err.get_or_insert(e);
                    }
                }
            };
        }

        close_slot!(self.audio_source);
        close_slot!(self.audio_sink);
        close_slot!(self.video_source);
        close_slot!(self.video_sink);
        close_slot!(self.text_source);
        close_slot!(self.text_sink);

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for MediaEndpoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaEndpoints")
            .field("audio_source", &self.audio_source.is_some())
            .field("audio_sink", &self.audio_sink.is_some())
            .field("video_source", &self.video_source.is_some())
            .field("video_sink", &self.video_sink.is_some())
            .field("text_source", &self.text_source.is_some())
            .field("text_sink", &self.text_sink.is_some())
            .finish()
    }
}
