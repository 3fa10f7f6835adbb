/*!
    A single opened input container and its decoders.
*/

use std::path::{Path, PathBuf};

use ffmpeg_next::{Packet, format::context::Input, media};

use ffmpeg_decode::{AudioDecoder, VideoDecoder};
use ffmpeg_types::{AudioStreamInfo, OpenError, ReadError, StreamRole, VideoStreamInfo};

use crate::input::open_input;

/**
    Decoder state for one stream of a source.
*/
#[derive(Debug)]
pub enum StreamContext {
    Video(VideoDecoder),
    Audio(AudioDecoder),
}

impl StreamContext {
    /**
        Index of the stream inside its container.
    */
    pub fn stream_index(&self) -> usize {
        match self {
            Self::Video(decoder) => decoder.stream_index(),
            Self::Audio(decoder) => decoder.stream_index(),
        }
    }

    pub fn role(&self) -> StreamRole {
        match self {
            Self::Video(_) => StreamRole::Video,
            Self::Audio(_) => StreamRole::Audio,
        }
    }
}

/**
    An opened input container with a decoder for every audio and video stream.

    The first-choice video stream and audio stream of the container (as picked
    by the media library) are the *primary* streams of the source; packets of
    any other stream map to no role and are skipped by the pipeline.
*/
pub struct MediaSource {
    path: PathBuf,
    role: StreamRole,
    streams: Vec<StreamContext>,
    video: Option<usize>,
    audio: Option<usize>,
    // Dropped after the decoders.
    input: Input,
}

impl MediaSource {
    /**
        Open a container and a decoder for each of its audio and video streams.

        `role` is what the caller needs from this source: a video-role source
        must contain a video stream, an audio-role source an audio stream.
    */
    pub fn open(path: impl AsRef<Path>, role: StreamRole) -> Result<Self, OpenError> {
        let path = path.as_ref();

        ffmpeg_next::init().map_err(|e| OpenError::ContainerUnreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let input = open_input(path)?;

        let mut streams = Vec::new();
        for stream in input.streams() {
            let index = stream.index();
            match stream.parameters().medium() {
                media::Type::Video => {
                    streams.push(StreamContext::Video(VideoDecoder::open(&input, index)?));
                }
                media::Type::Audio => {
                    streams.push(StreamContext::Audio(AudioDecoder::open(&input, index)?));
                }
                other => {
                    tracing::debug!(path = %path.display(), index, medium = ?other, "skipping stream");
                }
            }
        }

        if streams.is_empty() {
            return Err(OpenError::NoMediaStreams {
                path: path.to_path_buf(),
            });
        }

        let video = primary_stream(&input, &streams, StreamRole::Video);
        let audio = primary_stream(&input, &streams, StreamRole::Audio);

        let missing = match role {
            StreamRole::Video => video.is_none(),
            StreamRole::Audio => audio.is_none(),
        };
        if missing {
            return Err(OpenError::MissingStream {
                path: path.to_path_buf(),
                role,
            });
        }

        let dump_index = match role {
            StreamRole::Video => 0,
            StreamRole::Audio => 1,
        };
        ffmpeg_next::format::context::input::dump(&input, dump_index, path.to_str());

        tracing::info!(
            path = %path.display(),
            %role,
            streams = streams.len(),
            "opened source"
        );

        Ok(Self {
            path: path.to_path_buf(),
            role,
            streams,
            video,
            audio,
            input,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn role(&self) -> StreamRole {
        self.role
    }

    /**
        All decodable streams, in container order.
    */
    pub fn streams(&self) -> &[StreamContext] {
        &self.streams
    }

    /**
        Read the next packet of any stream into `packet`.
    */
    pub fn read_packet(&mut self, packet: &mut Packet) -> Result<(), ReadError> {
        match packet.read(&mut self.input) {
            Ok(()) => Ok(()),
            Err(ffmpeg_next::Error::Eof) => Err(ReadError::EndOfStream),
            Err(e) => Err(ReadError::Failed {
                message: e.to_string(),
            }),
        }
    }

    /**
        Which primary stream a packet belongs to, if any.
    */
    pub fn role_of(&self, packet: &Packet) -> Option<StreamRole> {
        let index = packet.stream();
        if self.video_info().is_some_and(|info| info.index == index) {
            Some(StreamRole::Video)
        } else if self.audio_info().is_some_and(|info| info.index == index) {
            Some(StreamRole::Audio)
        } else {
            None
        }
    }

    /**
        Read packets until one belongs to the primary audio stream.
    */
    pub fn next_audio_packet(&mut self, packet: &mut Packet) -> Result<(), ReadError> {
        loop {
            self.read_packet(packet)?;
            if self.role_of(packet) == Some(StreamRole::Audio) {
                return Ok(());
            }
        }
    }

    pub fn video_decoder(&mut self) -> Option<&mut VideoDecoder> {
        match self.video.map(|i| &mut self.streams[i]) {
            Some(StreamContext::Video(decoder)) => Some(decoder),
            _ => None,
        }
    }

    pub fn audio_decoder(&mut self) -> Option<&mut AudioDecoder> {
        match self.audio.map(|i| &mut self.streams[i]) {
            Some(StreamContext::Audio(decoder)) => Some(decoder),
            _ => None,
        }
    }

    pub fn video_info(&self) -> Option<&VideoStreamInfo> {
        match self.video.map(|i| &self.streams[i]) {
            Some(StreamContext::Video(decoder)) => Some(decoder.info()),
            _ => None,
        }
    }

    pub fn audio_info(&self) -> Option<&AudioStreamInfo> {
        match self.audio.map(|i| &self.streams[i]) {
            Some(StreamContext::Audio(decoder)) => Some(decoder.info()),
            _ => None,
        }
    }

    /**
        Number of video frames declared by the container, if it declares one.
    */
    pub fn total_video_frames_hint(&self) -> Option<u64> {
        self.video_info().and_then(|info| info.frame_count)
    }
}

/**
    Position in `streams` of the container's first-choice stream for a role.

    Falls back to the first decodable stream of that role when the library
    has no preference.
*/
fn primary_stream(input: &Input, streams: &[StreamContext], role: StreamRole) -> Option<usize> {
    let medium = match role {
        StreamRole::Video => media::Type::Video,
        StreamRole::Audio => media::Type::Audio,
    };
    let best = input.streams().best(medium).map(|stream| stream.index());

    best.and_then(|index| {
        streams
            .iter()
            .position(|s| s.role() == role && s.stream_index() == index)
    })
    .or_else(|| streams.iter().position(|s| s.role() == role))
}

impl std::fmt::Debug for MediaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSource")
            .field("path", &self.path)
            .field("role", &self.role)
            .field("streams", &self.streams)
            .finish_non_exhaustive()
    }
}
