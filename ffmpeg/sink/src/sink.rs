/*!
    The output container and its encoders.
*/

use std::path::{Path, PathBuf};

use ffmpeg_next::{Frame, Packet, codec, encoder, format};

use ffmpeg_types::{
    AudioStreamInfo, CodecSignal, EncodeError, OpenError, Rational, StreamRole, VideoStreamInfo,
    WriteError,
};

use crate::config::{ContainerFormat, VideoEncodeSettings};
use crate::encoder::{AudioEncoder, Encode, VideoEncoder};

/**
    One stream of the output container.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputStream {
    /// Stream index inside the output container.
    pub index: usize,
    /// Stream time base as chosen by the muxer when the header was written.
    pub time_base: Rational,
}

/**
    Output streams by role, fixed when the sink is opened.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputStreams {
    video: OutputStream,
    audio: OutputStream,
}

impl OutputStreams {
    pub fn get(&self, role: StreamRole) -> OutputStream {
        match role {
            StreamRole::Video => self.video,
            StreamRole::Audio => self.audio,
        }
    }

    pub fn index(&self, role: StreamRole) -> usize {
        self.get(role).index
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct StreamProgress {
    packets: u64,
    drained: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SinkState {
    Writing,
    Finalized,
}

/**
    A Matroska output with one H.264 video stream and one PCM audio stream.

    Streams are created video first, so the video stream is always index 0
    and the audio stream index 1. The header is written when the sink opens;
    [`MediaSink::write_trailer`] finalizes the file and may only succeed once.
*/
pub struct MediaSink {
    path: PathBuf,
    video: VideoEncoder,
    audio: AudioEncoder,
    streams: OutputStreams,
    progress: [StreamProgress; 2],
    state: SinkState,
    // Dropped after the encoders.
    output: format::context::Output,
}

impl MediaSink {
    /**
        Create the output file, set up both encoders and write the header.

        Video frame rate and time base come from `video`; audio sample rate
        and channel layout from `audio`.
    */
    pub fn open(
        path: impl AsRef<Path>,
        settings: &VideoEncodeSettings,
        video: &VideoStreamInfo,
        audio: &AudioStreamInfo,
    ) -> Result<Self, OpenError> {
        let path = path.as_ref();

        let container =
            ContainerFormat::from_path(path).ok_or_else(|| OpenError::UnsupportedContainer {
                path: path.to_path_buf(),
            })?;

        ffmpeg_next::init().map_err(|e| OpenError::WriteOpenFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut output = format::output_as(path, container.ffmpeg_format_name()).map_err(|e| {
            OpenError::WriteOpenFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        let global_header = output
            .format()
            .flags()
            .contains(format::Flags::GLOBAL_HEADER);

        let video_codec = find_encoder(codec::Id::H264, StreamRole::Video)?;
        let (video_index, video_encoder) = {
            let mut stream = output
                .add_stream(video_codec)
                .map_err(|_| OpenError::AllocationFailed {
                    what: "video output stream",
                })?;
            let encoder = VideoEncoder::open(video_codec, settings, video, global_header)?;
            stream.set_parameters(encoder.inner());
            stream.set_time_base(ffmpeg_next::Rational::from(encoder.time_base()));
            (stream.index(), encoder)
        };

        let audio_codec = find_encoder(codec::Id::PCM_S32LE, StreamRole::Audio)?;
        let (audio_index, audio_encoder) = {
            let mut stream = output
                .add_stream(audio_codec)
                .map_err(|_| OpenError::AllocationFailed {
                    what: "audio output stream",
                })?;
            let encoder = AudioEncoder::open(audio_codec, audio, global_header)?;
            stream.set_parameters(encoder.inner());
            stream.set_time_base(ffmpeg_next::Rational::from(encoder.time_base()));
            (stream.index(), encoder)
        };

        format::context::output::dump(&output, 0, path.to_str());

        output
            .write_header()
            .map_err(|e| OpenError::HeaderWriteFailed {
                message: e.to_string(),
            })?;

        let streams = OutputStreams {
            video: output_stream(&output, video_index)?,
            audio: output_stream(&output, audio_index)?,
        };

        tracing::info!(
            path = %path.display(),
            width = settings.width,
            height = settings.height,
            crf = %settings.crf_option(),
            bitrate = settings.bitrate,
            preset = %settings.preset,
            "opened sink"
        );

        Ok(Self {
            path: path.to_path_buf(),
            video: video_encoder,
            audio: audio_encoder,
            streams,
            progress: [StreamProgress::default(); 2],
            state: SinkState::Writing,
            output,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn streams(&self) -> &OutputStreams {
        &self.streams
    }

    pub fn audio_encoder(&self) -> &AudioEncoder {
        &self.audio
    }

    /**
        Number of packets written to the stream of `role`.
    */
    pub fn packets_written(&self, role: StreamRole) -> u64 {
        self.progress[slot(role)].packets
    }

    /**
        Returns true once the trailer has been written (or attempted).
    */
    pub fn is_finalized(&self) -> bool {
        self.state == SinkState::Finalized
    }

    /**
        Encode one frame, or end of stream when `frame` is `None`, and write
        every packet the encoder produces.

        The frame's pts must be in the encoder time base: the video source's
        stream time base for video, `1/sample_rate` for audio.

        Returns true when the encoder reported end of stream.
    */
    pub fn encode_and_write(
        &mut self,
        role: StreamRole,
        frame: Option<&Frame>,
    ) -> Result<bool, EncodeError> {
        if self.state == SinkState::Finalized {
            return Err(EncodeError::SinkFinalized);
        }

        let encoder: &mut dyn Encode = match role {
            StreamRole::Video => &mut self.video,
            StreamRole::Audio => &mut self.audio,
        };

        let submitted = match frame {
            Some(frame) => encoder.codec().send_frame(frame),
            None => encoder.codec().send_eof(),
        };
        submitted.map_err(|e| EncodeError::SubmitFailed {
            role,
            message: e.to_string(),
        })?;

        let stream = self.streams.get(role);
        let progress = &mut self.progress[slot(role)];
        if frame.is_none() {
            progress.drained = true;
        }

        drain(encoder, &mut self.output, stream, progress)
    }

    /**
        Send end of stream to the encoder of `role` and write what it had
        buffered. Flushing an already drained encoder does nothing.
    */
    pub fn flush(&mut self, role: StreamRole) -> Result<(), EncodeError> {
        if self.progress[slot(role)].drained {
            return Ok(());
        }
        self.encode_and_write(role, None)?;
        Ok(())
    }

    /**
        Write the container trailer.

        Only the first call writes anything; later calls return
        [`WriteError::TrailerAlreadyWritten`]. The sink is finalized even if
        writing the trailer fails.
    */
    pub fn write_trailer(&mut self) -> Result<(), WriteError> {
        if self.state == SinkState::Finalized {
            return Err(WriteError::TrailerAlreadyWritten);
        }
        self.state = SinkState::Finalized;

        self.output
            .write_trailer()
            .map_err(|e| WriteError::TrailerFailed {
                message: e.to_string(),
            })?;

        tracing::info!(
            path = %self.path.display(),
            video_packets = self.packets_written(StreamRole::Video),
            audio_packets = self.packets_written(StreamRole::Audio),
            "trailer written"
        );

        Ok(())
    }
}

/**
    Receive packets until the encoder needs input or is fully drained.
*/
fn drain(
    encoder: &mut dyn Encode,
    output: &mut format::context::Output,
    stream: OutputStream,
    progress: &mut StreamProgress,
) -> Result<bool, EncodeError> {
    let role = encoder.role();
    let source_tb = ffmpeg_next::Rational::from(encoder.time_base());
    let destination_tb = ffmpeg_next::Rational::from(stream.time_base);

    let mut packet = Packet::empty();
    loop {
        let received = encoder.codec().receive_packet(&mut packet);
        let signal =
            CodecSignal::from_receive(received).map_err(|e| EncodeError::ReceiveFailed {
                role,
                message: e.to_string(),
            })?;

        match signal {
            CodecSignal::Ready => {
                packet.rescale_ts(source_tb, destination_tb);
                packet.set_stream(stream.index);
                packet
                    .write_interleaved(output)
                    .map_err(|e| EncodeError::MuxFailed {
                        role,
                        message: e.to_string(),
                    })?;
                progress.packets += 1;
            }
            CodecSignal::NeedsInput => return Ok(false),
            CodecSignal::EndOfStream => return Ok(true),
        }
    }
}

fn find_encoder(id: codec::Id, role: StreamRole) -> Result<codec::Codec, OpenError> {
    encoder::find(id).ok_or_else(|| OpenError::EncoderNotFound {
        role,
        codec: format!("{id:?}"),
    })
}

fn output_stream(
    output: &format::context::Output,
    index: usize,
) -> Result<OutputStream, OpenError> {
    let time_base = output
        .stream(index)
        .and_then(|stream| Rational::from_ffmpeg(stream.time_base()))
        .ok_or_else(|| OpenError::HeaderWriteFailed {
            message: format!("output stream {index} has no time base"),
        })?;
    Ok(OutputStream { index, time_base })
}

fn slot(role: StreamRole) -> usize {
    match role {
        StreamRole::Video => 0,
        StreamRole::Audio => 1,
    }
}

impl std::fmt::Debug for MediaSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSink")
            .field("path", &self.path)
            .field("streams", &self.streams)
            .field("state", &self.state)
            .field("video", &self.video)
            .field("audio", &self.audio)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(OutputStreams: Send, Sync, Copy);

#[cfg(test)]
mod tests {
    use ffmpeg_next::{format::Pixel, frame, util::channel_layout::ChannelLayoutMask};
    use ffmpeg_types::{CodecId, PixelFormat};

    use super::*;

    fn video_info() -> VideoStreamInfo {
        VideoStreamInfo {
            index: 0,
            codec: CodecId::Mpeg4,
            width: 64,
            height: 48,
            pixel_format: PixelFormat::Yuv420p,
            time_base: Rational::new(1, 25),
            frame_rate: Some(Rational::new(25, 1)),
            frame_count: Some(10),
        }
    }

    fn audio_info() -> AudioStreamInfo {
        AudioStreamInfo {
            index: 1,
            codec: CodecId::PcmS16Le,
            sample_rate: 48000,
            channels: 2,
            channel_mask: ChannelLayoutMask::STEREO.bits(),
            sample_format: None,
            time_base: Rational::new(1, 48000),
        }
    }

    fn have_h264() -> bool {
        let available = ffmpeg_next::init().is_ok() && encoder::find(codec::Id::H264).is_some();
        if !available {
            eprintln!("skipped: no H.264 encoder in the linked FFmpeg");
        }
        available
    }

    fn open_sink(dir: &tempfile::TempDir) -> MediaSink {
        let settings = VideoEncodeSettings::new(64, 48);
        MediaSink::open(dir.path().join("out.mkv"), &settings, &video_info(), &audio_info())
            .unwrap()
    }

    fn gray_frame(pts: i64) -> frame::Video {
        let mut frame = frame::Video::new(Pixel::YUV420P, 64, 48);
        for plane in 0..3 {
            frame.data_mut(plane).fill(128);
        }
        frame.set_pts(Some(pts));
        frame
    }

    #[test]
    fn rejects_non_matroska_output() {
        let dir = tempfile::tempdir().unwrap();
        let settings = VideoEncodeSettings::new(64, 48);
        let err = MediaSink::open(
            dir.path().join("out.mp4"),
            &settings,
            &video_info(),
            &audio_info(),
        )
        .unwrap_err();
        assert!(matches!(err, OpenError::UnsupportedContainer { .. }));
        assert!(!dir.path().join("out.mp4").exists());
    }

    #[test]
    fn streams_are_video_then_audio() {
        if !have_h264() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let sink = open_sink(&dir);

        assert_eq!(sink.streams().index(StreamRole::Video), 0);
        assert_eq!(sink.streams().index(StreamRole::Audio), 1);
        assert!(sink.streams().get(StreamRole::Audio).time_base.is_positive());
        assert_eq!(sink.audio_encoder().sample_rate(), 48000);
        assert_eq!(
            sink.audio_encoder().channel_mask(),
            ChannelLayoutMask::STEREO.bits()
        );
    }

    #[test]
    fn encodes_frames_and_finalizes_once() {
        if !have_h264() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let mut sink = open_sink(&dir);

        for pts in 0..5 {
            let frame = gray_frame(pts);
            sink.encode_and_write(StreamRole::Video, Some(&*frame))
                .unwrap();
        }
        sink.flush(StreamRole::Video).unwrap();
        sink.flush(StreamRole::Video).unwrap();
        sink.flush(StreamRole::Audio).unwrap();
        assert!(sink.packets_written(StreamRole::Video) >= 5);

        sink.write_trailer().unwrap();
        assert!(sink.is_finalized());
        assert!(matches!(
            sink.write_trailer(),
            Err(WriteError::TrailerAlreadyWritten)
        ));

        let size = std::fs::metadata(dir.path().join("out.mkv")).unwrap().len();
        assert!(size > 0);
    }

    #[test]
    fn encoding_after_trailer_fails() {
        if !have_h264() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let mut sink = open_sink(&dir);
        sink.write_trailer().unwrap();

        let frame = gray_frame(0);
        let err = sink
            .encode_and_write(StreamRole::Video, Some(&*frame))
            .unwrap_err();
        assert!(matches!(err, EncodeError::SinkFinalized));
    }
}
