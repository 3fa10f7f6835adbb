use thiserror::Error;

use ffmpeg_types::{
    ConvertError, DecodeError, EncodeError, OpenError, ReadError, ScaleError, WriteError,
};

use crate::config::ConfigError;

/**
    Any failure of a transcode, from opening the sources to the trailer.
*/
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Open(#[from] OpenError),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Scale(#[from] ScaleError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error("transcode already ran")]
    AlreadyFinished,
}

static_assertions::assert_impl_all!(TranscodeError: Send, Sync, std::error::Error);
