/*!
    Shared types for the videncode ffmpeg crates.

    This crate is the vocabulary of the transcode pipeline: the types that cross
    crate boundaries between the source, transform, sink and driver layers. By
    default it has no dependency on FFmpeg; the `ffmpeg` feature adds
    conversions to and from `ffmpeg-next` types for the crates that need them.

    # Core Types

    - [`Rational`] - Time bases and frame rates
    - [`Pts`] - Timestamps in time_base units, with rescaling between time bases

    # Format Types

    - [`PixelFormat`] - Video pixel formats
    - [`SampleFormat`] - Audio sample formats
    - [`CodecId`] - Codec identifiers

    # Stream Information

    - [`StreamRole`] - Video or audio role of a stream
    - [`VideoStreamInfo`] and [`AudioStreamInfo`] - Decoder parameters snapshots

    # Error Handling

    One error enum per pipeline stage, see [`error`](crate::OpenError).

    # Codec Control

    - [`CodecSignal`] - Outcome of a receive call on a decoder or encoder
*/

mod codec;
mod error;
mod format;
mod rational;
mod signal;
mod stream;
mod timestamp;

#[cfg(feature = "ffmpeg")]
mod ffmpeg;

#[cfg(feature = "ffmpeg")]
pub use ffmpeg::{alloc_codec_context, channel_layout, resolve_channel_mask};

pub use codec::CodecId;
pub use error::{
    ConvertError, DecodeError, EncodeError, OpenError, ReadError, ScaleError, WriteError,
};
pub use format::{PixelFormat, SampleFormat};
pub use rational::Rational;
pub use signal::CodecSignal;
pub use stream::{AudioStreamInfo, StreamRole, VideoStreamInfo};
pub use timestamp::Pts;
