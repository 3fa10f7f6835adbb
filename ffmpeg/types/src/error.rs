/*!
    Error types for the videncode ffmpeg crates.

    Each pipeline stage has its own error enum so callers can tell an open
    failure from a runtime failure without inspecting messages. Messages from
    the media library are carried as strings, which keeps this crate free of
    any FFmpeg dependency.
*/

use std::path::PathBuf;

use thiserror::Error;

use crate::StreamRole;

/**
    Errors while opening a source or building a sink.
*/
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("could not open {}: {message}", path.display())]
    ContainerUnreadable { path: PathBuf, message: String },
    #[error("could not read stream info from {}: {message}", path.display())]
    StreamInfoUnavailable { path: PathBuf, message: String },
    #[error("no {role} decoder for codec {codec}")]
    DecoderNotFound { role: StreamRole, codec: String },
    #[error("failed to allocate {what}")]
    AllocationFailed { what: &'static str },
    #[error("failed to copy {role} codec parameters: {message}")]
    ParameterCopyFailed { role: StreamRole, message: String },
    #[error("failed to open {role} decoder: {message}")]
    DecoderOpenFailed { role: StreamRole, message: String },
    #[error("{} contains no audio or video streams", path.display())]
    NoMediaStreams { path: PathBuf },
    #[error("{} has no {role} stream", path.display())]
    MissingStream { path: PathBuf, role: StreamRole },
    #[error("unsupported output container for {}", path.display())]
    UnsupportedContainer { path: PathBuf },
    #[error("could not open {} for writing: {message}", path.display())]
    WriteOpenFailed { path: PathBuf, message: String },
    #[error("no {role} encoder for codec {codec}")]
    EncoderNotFound { role: StreamRole, codec: String },
    #[error("failed to open {role} encoder: {message}")]
    EncoderOpenFailed { role: StreamRole, message: String },
    #[error("failed to write container header: {message}")]
    HeaderWriteFailed { message: String },
}

/**
    Errors while pulling packets from a source.
*/
#[derive(Debug, Error)]
pub enum ReadError {
    /// The container has no more packets. Part of control flow.
    #[error("end of stream")]
    EndOfStream,
    #[error("failed to read packet: {message}")]
    Failed { message: String },
}

impl ReadError {
    /**
        Returns true if this is the end-of-stream condition.
    */
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream)
    }
}

/**
    Errors while decoding.
*/
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to submit packet to {role} decoder: {message}")]
    SubmitFailed { role: StreamRole, message: String },
    #[error("failed to receive frame from {role} decoder: {message}")]
    ReceiveFailed { role: StreamRole, message: String },
}

/**
    Errors while rescaling video frames.
*/
#[derive(Debug, Error)]
pub enum ScaleError {
    #[error("no scaler available for input: {message}")]
    ContextUnavailable { message: String },
    #[error("scaling failed: {message}")]
    TransformFailed { message: String },
}

/**
    Errors while converting audio frames to the encoder's sample format.
*/
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("audio conversion failed: {message}")]
    Failed { message: String },
}

/**
    Errors while encoding and multiplexing.
*/
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to submit frame to {role} encoder: {message}")]
    SubmitFailed { role: StreamRole, message: String },
    #[error("failed to receive packet from {role} encoder: {message}")]
    ReceiveFailed { role: StreamRole, message: String },
    #[error("failed to write {role} packet: {message}")]
    MuxFailed { role: StreamRole, message: String },
    #[error("the output has already been finalized")]
    SinkFinalized,
}

/**
    Errors while finalizing the output container.
*/
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write container trailer: {message}")]
    TrailerFailed { message: String },
    #[error("the container trailer has already been written")]
    TrailerAlreadyWritten,
}

static_assertions::assert_impl_all!(OpenError: Send, Sync, std::error::Error);
static_assertions::assert_impl_all!(EncodeError: Send, Sync, std::error::Error);
