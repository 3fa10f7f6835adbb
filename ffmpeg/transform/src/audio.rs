/*!
    Audio sample conversion.
*/

use ffmpeg_next::{
    format::Sample,
    software::resampling::Context as ResamplingContext,
    util::{channel_layout::ChannelLayoutMask, frame::audio::Audio as AudioFrameFFmpeg},
};

use ffmpeg_types::{ConvertError, channel_layout, resolve_channel_mask};

/// Room for the samples a resampler holds back between frames.
const FLUSH_CAPACITY: usize = 8192;

#[derive(Clone, Copy, PartialEq, Eq)]
struct InputKey {
    format: Sample,
    channel_mask: u64,
    rate: u32,
}

/**
    Converts decoded audio to the PCM encoder's input format.

    Stateful: the resampler may hold back samples when rates differ, so
    frames must be converted in order and [`AudioConverter::flush`] called
    at end of stream.
*/
pub struct AudioConverter {
    format: Sample,
    channel_mask: u64,
    rate: u32,
    context: Option<(InputKey, ResamplingContext)>,
}

impl AudioConverter {
    /**
        Create a converter producing `format` samples with the given channel
        layout and sample rate.
    */
    pub fn new(format: Sample, channel_mask: u64, rate: u32) -> Self {
        Self {
            format,
            channel_mask,
            rate,
            context: None,
        }
    }

    /**
        Convert one decoded frame.

        Frames without a usable channel layout get the default layout for
        their channel count first. The returned frame carries the input pts
        unchanged; rescaling it is up to the caller.
    */
    pub fn convert(
        &mut self,
        input: &mut AudioFrameFFmpeg,
    ) -> Result<AudioFrameFFmpeg, ConvertError> {
        let (channel_mask, reported) = {
            let layout = input.ch_layout();
            (
                resolve_channel_mask(&layout),
                layout.mask().map(|mask| mask.bits()),
            )
        };
        if reported != Some(channel_mask) {
            input.set_ch_layout(channel_layout(channel_mask));
        }

        let key = InputKey {
            format: input.format(),
            channel_mask,
            rate: input.rate(),
        };

        let context = match self.context.take() {
            Some((current, context)) if current == key => context,
            _ => {
                tracing::debug!(
                    input_format = ?key.format,
                    input_layout = format_args!("{:#x}", key.channel_mask),
                    input_rate = key.rate,
                    output_format = ?self.format,
                    output_layout = format_args!("{:#x}", self.channel_mask),
                    output_rate = self.rate,
                    "initializing audio converter"
                );
                ResamplingContext::get2(
                    key.format,
                    channel_layout(key.channel_mask),
                    key.rate,
                    self.format,
                    channel_layout(self.channel_mask),
                    self.rate,
                )
                .map_err(|e| ConvertError::Failed {
                    message: format!("no resampler for input: {e}"),
                })?
            }
        };
        let (_, context) = self.context.insert((key, context));

        let mut output = AudioFrameFFmpeg::new(
            self.format,
            output_capacity(input.samples(), key.rate, self.rate),
            ChannelLayoutMask::from_bits_truncate(self.channel_mask),
        );
        context
            .run(input, &mut output)
            .map_err(|e| ConvertError::Failed {
                message: e.to_string(),
            })?;
        output.set_pts(input.pts());

        Ok(output)
    }

    /**
        Drain samples the resampler held back.

        Returns `None` when nothing was buffered.
    */
    pub fn flush(&mut self) -> Result<Option<AudioFrameFFmpeg>, ConvertError> {
        let Some((_, context)) = self.context.as_mut() else {
            return Ok(None);
        };

        let mut output = AudioFrameFFmpeg::new(
            self.format,
            FLUSH_CAPACITY,
            ChannelLayoutMask::from_bits_truncate(self.channel_mask),
        );
        context
            .flush(&mut output)
            .map_err(|e| ConvertError::Failed {
                message: e.to_string(),
            })?;

        if output.samples() == 0 {
            Ok(None)
        } else {
            Ok(Some(output))
        }
    }
}

/**
    Output frame size for `samples` input samples, with headroom for what the
    resampler held back from earlier frames.
*/
fn output_capacity(samples: usize, input_rate: u32, output_rate: u32) -> usize {
    let scaled = (samples as u64 * u64::from(output_rate)).div_ceil(u64::from(input_rate.max(1)));
    usize::try_from(scaled).unwrap_or(usize::MAX / 2) + 256
}

impl std::fmt::Debug for AudioConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioConverter")
            .field("format", &self.format)
            .field("channel_mask", &format_args!("{:#x}", self.channel_mask))
            .field("rate", &self.rate)
            .field("initialized", &self.context.is_some())
            .finish()
    }
}
