/*!
    Decoder acquisition and drain for the videncode ffmpeg crates.

    This crate turns the streams of an opened input container into ready
    decoders. Each decoder owns its codec context, remembers the stream it
    belongs to, and counts the frames it has produced.

    Decoding follows the send / receive model of the media library:

    ```ignore
    decoder.send_packet(&packet)?;
    while decoder.receive_frame(&mut frame)?.is_ready() {
        // frame.pts() is the best-effort timestamp in the stream time base
    }
    ```

    [`CodecSignal::NeedsInput`] and [`CodecSignal::EndOfStream`] end the
    drain loop; they are not errors.
*/

pub use ffmpeg_types::{AudioStreamInfo, CodecSignal, DecodeError, OpenError, VideoStreamInfo};

mod audio;
mod open;
mod video;

pub use audio::AudioDecoder;
pub use video::VideoDecoder;
