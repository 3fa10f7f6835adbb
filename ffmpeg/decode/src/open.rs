/*!
    Shared decoder context setup.
*/

use ffmpeg_next::{
    codec::{self, Context},
    decoder, ffi,
    format::{context::Input, stream::Stream},
};

use ffmpeg_types::{OpenError, StreamRole, alloc_codec_context};

/**
    Build a decoder context for one input stream, ready to be opened.

    Resolves the decoder by codec id, allocates a context for it, copies the
    stream's codec parameters and sets the packet time base to the stream
    time base. Video contexts additionally get the guessed frame rate.
*/
pub(crate) fn prepare_context(
    input: &Input,
    stream: &Stream,
    role: StreamRole,
) -> Result<(Context, codec::Codec), OpenError> {
    let parameters = stream.parameters();
    let id = parameters.id();

    let codec = decoder::find(id).ok_or_else(|| OpenError::DecoderNotFound {
        role,
        codec: format!("{id:?}"),
    })?;

    let mut context = alloc_codec_context(codec)?;

    context
        .set_parameters(parameters)
        .map_err(|e| OpenError::ParameterCopyFailed {
            role,
            message: e.to_string(),
        })?;

    unsafe {
        let ctx = context.as_mut_ptr();
        (*ctx).pkt_timebase = stream.time_base().into();
        if role == StreamRole::Video {
            (*ctx).framerate = ffi::av_guess_frame_rate(
                input.as_ptr() as *mut ffi::AVFormatContext,
                stream.as_ptr() as *mut ffi::AVStream,
                std::ptr::null_mut(),
            );
        }
    }

    Ok((context, codec))
}

/**
    Map an open failure to the role-tagged error.
*/
pub(crate) fn open_failed(role: StreamRole) -> impl FnOnce(ffmpeg_next::Error) -> OpenError {
    move |e| OpenError::DecoderOpenFailed {
        role,
        message: e.to_string(),
    }
}
