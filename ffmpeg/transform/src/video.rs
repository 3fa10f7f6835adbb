/*!
    Video frame scaling.
*/

use ffmpeg_next::{
    ffi,
    format::Pixel,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
    util::frame::video::Video as VideoFrameFFmpeg,
};

use ffmpeg_types::ScaleError;

/// Pixel format of every scaled frame.
pub const OUTPUT_PIXEL_FORMAT: Pixel = Pixel::YUV420P;

/**
    The frame that scaled video is written into.

    Allocated once at the output geometry and reused for every frame.
*/
pub struct ScaledFrameBuffer {
    frame: VideoFrameFFmpeg,
    width: u32,
    height: u32,
}

impl ScaledFrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: VideoFrameFFmpeg::new(OUTPUT_PIXEL_FORMAT, width, height),
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /**
        The scaled frame, ready to hand to the encoder.
    */
    pub fn frame(&self) -> &VideoFrameFFmpeg {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut VideoFrameFFmpeg {
        &mut self.frame
    }
}

impl std::fmt::Debug for ScaledFrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScaledFrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pts", &self.frame.pts())
            .finish()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct InputKey {
    format: Pixel,
    width: u32,
    height: u32,
}

impl InputKey {
    fn of(frame: &VideoFrameFFmpeg) -> Self {
        Self {
            format: frame.format(),
            width: frame.width(),
            height: frame.height(),
        }
    }
}

/**
    Point-sample rescaler to a fixed output resolution.

    The scaling context is created on the first frame and rebuilt whenever
    the input geometry or pixel format changes.
*/
pub struct FrameScaler {
    width: u32,
    height: u32,
    context: Option<(InputKey, ScalingContext)>,
}

impl FrameScaler {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            context: None,
        }
    }

    /**
        Rescale `input` into `output`.

        The output frame keeps its own pts; copying timestamps is up to the
        caller.
    */
    pub fn scale(
        &mut self,
        input: &VideoFrameFFmpeg,
        output: &mut ScaledFrameBuffer,
    ) -> Result<(), ScaleError> {
        let key = InputKey::of(input);
        let (width, height) = (self.width, self.height);

        let context = match self.context.take() {
            Some((current, context)) if current == key => context,
            _ => {
                tracing::debug!(
                    input_format = ?key.format,
                    input_width = key.width,
                    input_height = key.height,
                    output_width = width,
                    output_height = height,
                    "initializing scaler"
                );
                ScalingContext::get(
                    key.format,
                    key.width,
                    key.height,
                    OUTPUT_PIXEL_FORMAT,
                    width,
                    height,
                    ScalingFlags::POINT,
                )
                .map_err(|e| ScaleError::ContextUnavailable {
                    message: format!(
                        "{:?} {}x{} -> {width}x{height}: {e}",
                        key.format, key.width, key.height
                    ),
                })?
            }
        };
        let (_, context) = self.context.insert((key, context));

        let frame = output.frame_mut();
        frame.set_width(width);
        frame.set_height(height);
        frame.set_format(OUTPUT_PIXEL_FORMAT);

        unsafe {
            // The encoder may still hold a reference to the previous picture.
            let ret = ffi::av_frame_make_writable(frame.as_mut_ptr());
            if ret < 0 {
                return Err(ScaleError::TransformFailed {
                    message: ffmpeg_next::Error::from(ret).to_string(),
                });
            }

            let src = input.as_ptr();
            let dst = frame.as_mut_ptr();
            let ret = ffi::sws_scale(
                context.as_mut_ptr(),
                (*src).data.as_ptr() as *const *const u8,
                (*src).linesize.as_ptr(),
                0,
                key.height as i32,
                (*dst).data.as_ptr(),
                (*dst).linesize.as_ptr(),
            );
            if ret < 0 {
                return Err(ScaleError::TransformFailed {
                    message: ffmpeg_next::Error::from(ret).to_string(),
                });
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for FrameScaler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScaler")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("initialized", &self.context.is_some())
            .finish()
    }
}
