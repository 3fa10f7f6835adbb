/*!
    Encoding and muxing for the videncode ffmpeg crates.

    This crate handles the output side of the transcode pipeline. It owns an
    H.264 video encoder, a PCM audio encoder and the Matroska container they
    write into. Frames go in, packets are rescaled from the encoder time base
    to the container stream time base and interleaved into the file.

    # Basic Usage

    ```ignore
    use ffmpeg_sink::{MediaSink, StreamRole, VideoEncodeSettings};

    let settings = VideoEncodeSettings::new(960, 540).with_crf(20.0);
    let mut sink = MediaSink::open("output.mkv", &settings, &video_info, &audio_info)?;

    for frame in scaled_frames {
        sink.encode_and_write(StreamRole::Video, Some(&frame))?;
    }

    sink.flush(StreamRole::Video)?;
    sink.flush(StreamRole::Audio)?;

    // Finalize the file (critical!)
    sink.write_trailer()?;
    ```

    # Encoding

    - **Video**: H.264, planar YUV 4:2:0, constant rate factor plus target
      bitrate, fixed GOP policy from [`X264_PARAMS`]
    - **Audio**: signed 32-bit little-endian PCM at the source sample rate

    The frame rate and time base of the video encoder are taken from the
    video source, so decoded timestamps can be passed through as they are.

    # Finalization

    Always flush both encoders and call `write_trailer()`:

    ```ignore
    sink.write_trailer()?;
    ```

    Without this:
    - Duration may be unknown to players
    - Seeking may not work
    - The last frames buffered in the encoders are lost

    The trailer is written at most once. Encoding after it fails with
    [`EncodeError::SinkFinalized`].
*/

pub use ffmpeg_types::{
    AudioStreamInfo, EncodeError, OpenError, Rational, StreamRole, VideoStreamInfo, WriteError,
};

mod config;
mod encoder;
mod sink;

pub use config::{ContainerFormat, DEFAULT_PRESET, VideoEncodeSettings, X264_PARAMS};
pub use encoder::{AudioEncoder, VideoEncoder};
pub use sink::{MediaSink, OutputStream, OutputStreams};
