/*!
    Opening input containers.
*/

use std::{ffi::CString, path::Path, ptr};

use ffmpeg_next::{ffi, format::context::Input};

use ffmpeg_types::OpenError;

/**
    Open and probe an input container.

    The safe `format::input` helper folds the open and probe failures into
    one error; this keeps them apart and closes the half-open container when
    probing fails.
*/
pub(crate) fn open_input(path: &Path) -> Result<Input, OpenError> {
    let unreadable = |message: String| OpenError::ContainerUnreadable {
        path: path.to_path_buf(),
        message,
    };

    let c_path = path
        .to_str()
        .ok_or_else(|| unreadable("path is not valid UTF-8".to_string()))
        .and_then(|s| CString::new(s).map_err(|e| unreadable(e.to_string())))?;

    unsafe {
        let mut ctx: *mut ffi::AVFormatContext = ptr::null_mut();

        let ret = ffi::avformat_open_input(
            &mut ctx,
            c_path.as_ptr(),
            ptr::null_mut(),
            ptr::null_mut(),
        );
        if ret < 0 {
            return Err(unreadable(ffmpeg_next::Error::from(ret).to_string()));
        }

        let ret = ffi::avformat_find_stream_info(ctx, ptr::null_mut());
        if ret < 0 {
            ffi::avformat_close_input(&mut ctx);
            return Err(OpenError::StreamInfoUnavailable {
                path: path.to_path_buf(),
                message: ffmpeg_next::Error::from(ret).to_string(),
            });
        }

        // SAFETY: ctx is a fully opened input context; Input closes it on drop.
        Ok(Input::wrap(ctx))
    }
}
