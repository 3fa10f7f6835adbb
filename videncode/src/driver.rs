/*!
    The transcode loop.

    One thread, pull based: packets are read from the video container in
    file order, decoded, transformed and handed to the sink, which
    interleaves the encoded packets of both streams by time.
*/

use std::fmt;

use ffmpeg_next::{Packet, frame};

use ffmpeg_sink::{MediaSink, VideoEncodeSettings};
use ffmpeg_source::{MediaSource, Sources};
use ffmpeg_transform::{AudioConverter, FrameScaler, ScaledFrameBuffer};
use ffmpeg_types::{CodecSignal, OpenError, ReadError, StreamRole};

use crate::audio_route::{AudioRoute, AudioRouter};
use crate::cli::TranscodeJob;
use crate::config::ConfigError;
use crate::error::TranscodeError;
use crate::progress;
use crate::timeline::AudioTimeline;

/**
    Lifecycle of a [`Transcoder`].
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Sources and sink are being opened.
    Init,
    /// Packets are being read from the video container.
    Running,
    /// The video container is exhausted; decoders and encoders are flushed.
    Draining,
    /// The trailer has been written, or the run ended with an error.
    Finalized,
}

/**
    Counters of one run.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineState {
    /// True once the output was finalized after a clean end of input.
    pub closed: bool,
    /// Video frames decoded and handed to the encoder.
    pub decoded_video_frames: u64,
    /// Audio frames handed to the encoder.
    pub audio_frames: u64,
    /// True once the separate audio source ran dry.
    pub audio_exhausted: bool,
}

/**
    Outcome of a run, printed when the transcode ends.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TranscodeSummary {
    pub frames_encoded: u64,
    /// Frame count declared by the video container, if any.
    pub frames_available: Option<u64>,
    pub audio_frames: u64,
    pub closed: bool,
}

impl fmt::Display for TranscodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Successfully encoded {} out of ", self.frames_encoded)?;
        match self.frames_available {
            Some(total) => write!(f, "{total} frames"),
            None => write!(f, "? frames"),
        }
    }
}

/**
    Drives one transcode from the sources to the sink.

    Owns every resource of the run. Dropping it releases the sink first,
    then the sources.
*/
pub struct Transcoder {
    sink: MediaSink,
    settings: VideoEncodeSettings,
    scaler: FrameScaler,
    buffer: ScaledFrameBuffer,
    converter: AudioConverter,
    router: AudioRouter,
    timeline: AudioTimeline,
    frames_hint: Option<u64>,
    pipeline: PipelineState,
    state: DriverState,
    sources: Sources,
}

impl Transcoder {
    /**
        Open the sources, resolve the output geometry and open the sink.
    */
    pub fn open(job: &TranscodeJob) -> Result<Self, TranscodeError> {
        let sources = Sources::open(&job.video, job.audio.as_deref())?;

        let video_info = *sources
            .video
            .video_info()
            .ok_or_else(|| OpenError::MissingStream {
                path: job.video.clone(),
                role: StreamRole::Video,
            })?;
        let audio_info = *sources
            .active_audio_info()
            .ok_or(ConfigError::NoAudioStream)?;

        let (width, height) = job
            .config
            .resolve_output_size(video_info.width, video_info.height)?;
        let settings = job.config.video_settings(width, height);

        let sink = MediaSink::open(&job.output, &settings, &video_info, &audio_info)?;

        let encoder = sink.audio_encoder();
        let converter = AudioConverter::new(
            encoder.sample_format(),
            encoder.channel_mask(),
            encoder.sample_rate(),
        );
        let timeline = AudioTimeline::new(encoder.time_base());
        let router = AudioRouter::new(sources.audio.secondary().is_some());
        let frames_hint = sources.video.total_video_frames_hint();

        let mut transcoder = Self {
            sink,
            settings,
            scaler: FrameScaler::new(width, height),
            buffer: ScaledFrameBuffer::new(width, height),
            converter,
            router,
            timeline,
            frames_hint,
            pipeline: PipelineState::default(),
            state: DriverState::Init,
            sources,
        };
        transcoder.state = DriverState::Running;

        Ok(transcoder)
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn pipeline(&self) -> &PipelineState {
        &self.pipeline
    }

    /**
        The video encoder settings in effect, with the resolved output size.
    */
    pub fn settings(&self) -> &VideoEncodeSettings {
        &self.settings
    }

    pub fn summary(&self) -> TranscodeSummary {
        TranscodeSummary {
            frames_encoded: self.pipeline.decoded_video_frames,
            frames_available: self.frames_hint,
            audio_frames: self.pipeline.audio_frames,
            closed: self.pipeline.closed,
        }
    }

    /**
        Transcode until the video container is exhausted, then finalize the
        output.

        On error the encoders are flushed and the trailer written on a best
        effort basis before the error is returned, so whatever was encoded
        stays playable. A transcoder runs once.
    */
    pub fn run(&mut self) -> Result<TranscodeSummary, TranscodeError> {
        if self.state != DriverState::Running {
            return Err(TranscodeError::AlreadyFinished);
        }

        match self.read_loop().and_then(|()| self.drain()) {
            Ok(()) => Ok(self.summary()),
            Err(e) => {
                tracing::warn!(error = %e, "transcode failed, finalizing partial output");
                self.abort();
                Err(e)
            }
        }
    }

    fn read_loop(&mut self) -> Result<(), TranscodeError> {
        loop {
            let mut packet = Packet::empty();
            match self.sources.video.read_packet(&mut packet) {
                Ok(()) => {}
                Err(ReadError::EndOfStream) => return Ok(()),
                Err(e) => {
                    tracing::warn!(error = %e, "read failed, ending input");
                    return Ok(());
                }
            }

            match self.sources.video.role_of(&packet) {
                Some(StreamRole::Video) => {
                    self.decode_video(Some(&packet))?;
                }
                Some(StreamRole::Audio) => self.process_audio_packet(&packet)?,
                None => {
                    tracing::debug!(stream = packet.stream(), "skipping packet of unused stream");
                }
            }
        }
    }

    /**
        Decode one primary audio packet, or a packet of the separate audio
        source in its place while that source lasts.
    */
    fn process_audio_packet(&mut self, packet: &Packet) -> Result<(), TranscodeError> {
        if self.router.route() == AudioRoute::Secondary {
            let mut secondary = Packet::empty();
            let pulled = match self.sources.audio.secondary_mut() {
                Some(source) => source.next_audio_packet(&mut secondary),
                None => Err(ReadError::EndOfStream),
            };

            match pulled {
                Ok(()) => {
                    self.decode_audio(AudioRoute::Secondary, Some(&secondary))?;
                    return Ok(());
                }
                Err(e) => {
                    if self.router.mark_secondary_exhausted() {
                        if e.is_end_of_stream() {
                            tracing::debug!(
                                "audio source exhausted, switching to the video container's audio"
                            );
                        } else {
                            tracing::warn!(
                                error = %e,
                                "audio source failed, switching to the video container's audio"
                            );
                        }
                        self.pipeline.audio_exhausted = true;
                        self.decode_audio(AudioRoute::Secondary, None)?;
                    }
                }
            }
        }

        self.decode_audio(AudioRoute::Primary, Some(packet))?;
        Ok(())
    }

    /**
        Submit a video packet, or end of stream, and encode every frame the
        decoder yields. Returns true once the decoder is drained.
    */
    fn decode_video(&mut self, packet: Option<&Packet>) -> Result<bool, TranscodeError> {
        let Some(decoder) = self.sources.video.video_decoder() else {
            return Ok(true);
        };

        match packet {
            Some(packet) => decoder.send_packet(packet)?,
            None => decoder.send_eof()?,
        }

        let mut decoded = frame::Video::empty();
        loop {
            match decoder.receive_frame(&mut decoded)? {
                CodecSignal::Ready => {
                    self.scaler.scale(&decoded, &mut self.buffer)?;
                    self.buffer.frame_mut().set_pts(decoded.pts());
                    self.sink
                        .encode_and_write(StreamRole::Video, Some(&**self.buffer.frame()))?;

                    self.pipeline.decoded_video_frames += 1;
                    progress::report(self.pipeline.decoded_video_frames, self.frames_hint);
                }
                CodecSignal::NeedsInput => return Ok(false),
                CodecSignal::EndOfStream => return Ok(true),
            }
        }
    }

    /**
        Submit an audio packet, or end of stream, to the decoder of `route`
        and encode every frame it yields. Returns true once the decoder is
        drained.
    */
    fn decode_audio(
        &mut self,
        route: AudioRoute,
        packet: Option<&Packet>,
    ) -> Result<bool, TranscodeError> {
        let source: &mut MediaSource = match route {
            AudioRoute::Secondary => match self.sources.audio.secondary_mut() {
                Some(source) => source,
                None => return Ok(true),
            },
            AudioRoute::Primary => &mut self.sources.video,
        };
        let Some(decoder) = source.audio_decoder() else {
            return Ok(true);
        };

        match packet {
            Some(packet) => decoder.send_packet(packet)?,
            None => decoder.send_eof()?,
        }

        let time_base = decoder.info().time_base;
        let mut decoded = frame::Audio::empty();
        loop {
            match decoder.receive_frame(&mut decoded)? {
                CodecSignal::Ready => {
                    let converted = self.converter.convert(&mut decoded)?;
                    if converted.samples() == 0 {
                        continue;
                    }
                    let pts = self
                        .timeline
                        .stamp(converted.pts(), time_base, converted.samples());
                    encode_audio(&mut self.sink, converted, pts)?;
                    self.pipeline.audio_frames += 1;
                }
                CodecSignal::NeedsInput => return Ok(false),
                CodecSignal::EndOfStream => return Ok(true),
            }
        }
    }

    fn drain(&mut self) -> Result<(), TranscodeError> {
        self.state = DriverState::Draining;
        tracing::info!(
            video_frames = self.pipeline.decoded_video_frames,
            audio_frames = self.timeline.frames(),
            audio_end_pts = self.timeline.next_pts(),
            "end of input, draining"
        );

        self.decode_video(None)?;
        self.decode_audio(self.router.route(), None)?;

        if let Some(rest) = self.converter.flush()? {
            let time_base = self.sink.audio_encoder().time_base();
            let pts = self.timeline.stamp(None, time_base, rest.samples());
            encode_audio(&mut self.sink, rest, pts)?;
            self.pipeline.audio_frames += 1;
        }

        self.sink.flush(StreamRole::Video)?;
        self.sink.flush(StreamRole::Audio)?;
        self.sink.write_trailer()?;

        self.pipeline.closed = true;
        self.state = DriverState::Finalized;
        Ok(())
    }

    /**
        Best-effort finalization after a failed run. Failures are logged.
    */
    fn abort(&mut self) {
        for role in StreamRole::ALL {
            if let Err(e) = self.sink.flush(role) {
                tracing::warn!(%role, error = %e, "flushing encoder after failure failed");
            }
        }
        if !self.sink.is_finalized() {
            if let Err(e) = self.sink.write_trailer() {
                tracing::warn!(error = %e, "writing trailer after failure failed");
            }
        }
        self.state = DriverState::Finalized;
    }
}

fn encode_audio(
    sink: &mut MediaSink,
    mut frame: frame::Audio,
    pts: i64,
) -> Result<(), TranscodeError> {
    frame.set_pts(Some(pts));
    sink.encode_and_write(StreamRole::Audio, Some(&*frame))?;
    Ok(())
}

impl fmt::Debug for Transcoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcoder")
            .field("state", &self.state)
            .field("pipeline", &self.pipeline)
            .field("settings", &self.settings)
            .field("sink", &self.sink)
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}
