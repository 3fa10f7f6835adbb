/*!
    Frame transformation for the videncode ffmpeg crates.

    This crate adapts decoded frames to what the encoders accept:
    - **Video**: point-sampled rescaling to the output resolution, always in
      planar YUV 4:2:0
    - **Audio**: sample format, channel layout and rate conversion to the PCM
      encoder's input format

    # Video Scaling

    ```ignore
    use ffmpeg_transform::{FrameScaler, ScaledFrameBuffer};

    let mut buffer = ScaledFrameBuffer::new(960, 540);
    let mut scaler = FrameScaler::new(960, 540);

    // Scaler lazily initialized on first call
    for frame in decoded_frames {
        scaler.scale(&frame, &mut buffer)?;
        // Encode buffer.frame()
    }
    ```

    # Lazy Initialization

    Both transformers lazily initialize their FFmpeg contexts on first use.
    This allows creating transformers before knowing the exact input format.
    If the input format changes mid-stream, which happens for audio when the
    pipeline switches from a separate audio file to the video container's
    own audio, the context is rebuilt.
*/

pub use ffmpeg_types::{ConvertError, ScaleError};

mod audio;
mod video;

pub use audio::AudioConverter;
pub use video::{FrameScaler, ScaledFrameBuffer};
