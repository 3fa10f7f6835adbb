/*!
    Video and audio encoders.
*/

use ffmpeg_next::{
    Dictionary, codec, encoder,
    format::{Pixel, Sample, sample},
};

use ffmpeg_types::{
    AudioStreamInfo, OpenError, Rational, StreamRole, VideoStreamInfo, alloc_codec_context,
    channel_layout,
};

use crate::config::{VideoEncodeSettings, X264_PARAMS};

/**
    Common view of an opened encoder, as used by the muxing loop.
*/
pub(crate) trait Encode {
    fn role(&self) -> StreamRole;

    /// Time base of the packets this encoder produces.
    fn time_base(&self) -> Rational;

    fn codec(&mut self) -> &mut encoder::Encoder;
}

/**
    H.264 video encoder.
*/
pub struct VideoEncoder {
    encoder: encoder::video::Encoder,
    time_base: Rational,
}

impl VideoEncoder {
    pub(crate) fn open(
        codec: codec::Codec,
        settings: &VideoEncodeSettings,
        source: &VideoStreamInfo,
        global_header: bool,
    ) -> Result<Self, OpenError> {
        let open_failed = |e: ffmpeg_next::Error| OpenError::EncoderOpenFailed {
            role: StreamRole::Video,
            message: e.to_string(),
        };

        let time_base = source.time_base;
        let frame_rate = source.encoder_frame_rate();

        let mut video = alloc_codec_context(codec)?
            .encoder()
            .video()
            .map_err(open_failed)?;

        video.set_width(settings.width);
        video.set_height(settings.height);
        video.set_format(Pixel::YUV420P);
        video.set_bit_rate(usize::try_from(settings.bitrate).unwrap_or(usize::MAX));
        video.set_frame_rate(Some(ffmpeg_next::Rational::from(frame_rate)));
        video.set_time_base(ffmpeg_next::Rational::from(time_base));
        if global_header {
            video.set_flags(codec::Flags::GLOBAL_HEADER);
        }

        let mut options = Dictionary::new();
        options.set("preset", &settings.preset);
        options.set("crf", &settings.crf_option());
        options.set("x264-params", X264_PARAMS);

        let encoder = video.open_as_with(codec, options).map_err(open_failed)?;

        tracing::debug!(
            width = settings.width,
            height = settings.height,
            %frame_rate,
            %time_base,
            "opened video encoder"
        );

        Ok(Self { encoder, time_base })
    }

    pub(crate) fn inner(&self) -> &encoder::video::Encoder {
        &self.encoder
    }
}

impl Encode for VideoEncoder {
    fn role(&self) -> StreamRole {
        StreamRole::Video
    }

    fn time_base(&self) -> Rational {
        self.time_base
    }

    fn codec(&mut self) -> &mut encoder::Encoder {
        &mut self.encoder
    }
}

/**
    PCM audio encoder.

    Exposes the input format it expects so decoded audio can be converted
    to match.
*/
pub struct AudioEncoder {
    encoder: encoder::audio::Encoder,
    time_base: Rational,
    format: Sample,
    channel_mask: u64,
    rate: u32,
}

impl AudioEncoder {
    pub(crate) fn open(
        codec: codec::Codec,
        source: &AudioStreamInfo,
        global_header: bool,
    ) -> Result<Self, OpenError> {
        let open_failed = |e: ffmpeg_next::Error| OpenError::EncoderOpenFailed {
            role: StreamRole::Audio,
            message: e.to_string(),
        };

        let format = codec
            .audio()
            .ok()
            .and_then(|audio| audio.formats())
            .and_then(|mut formats| formats.next())
            .unwrap_or(Sample::I32(sample::Type::Packed));
        let time_base = source.encoder_time_base();
        let rate = source.sample_rate;
        let channel_mask = source.channel_mask;

        let mut audio = alloc_codec_context(codec)?
            .encoder()
            .audio()
            .map_err(open_failed)?;

        audio.set_rate(i32::try_from(rate).unwrap_or(i32::MAX));
        audio.set_ch_layout(channel_layout(channel_mask));
        audio.set_format(format);
        audio.set_time_base(ffmpeg_next::Rational::from(time_base));
        if global_header {
            audio.set_flags(codec::Flags::GLOBAL_HEADER);
        }

        let encoder = audio.open_as(codec).map_err(open_failed)?;

        tracing::debug!(
            sample_rate = rate,
            channels = source.channels,
            channel_mask = format_args!("{channel_mask:#x}"),
            format = ?format,
            "opened audio encoder"
        );

        Ok(Self {
            encoder,
            time_base,
            format,
            channel_mask,
            rate,
        })
    }

    pub(crate) fn inner(&self) -> &encoder::audio::Encoder {
        &self.encoder
    }

    /// Sample format the encoder accepts.
    pub fn sample_format(&self) -> Sample {
        self.format
    }

    pub fn channel_mask(&self) -> u64 {
        self.channel_mask
    }

    pub fn sample_rate(&self) -> u32 {
        self.rate
    }

    /// Encoder time base, `1/sample_rate`.
    pub fn time_base(&self) -> Rational {
        self.time_base
    }
}

impl Encode for AudioEncoder {
    fn role(&self) -> StreamRole {
        StreamRole::Audio
    }

    fn time_base(&self) -> Rational {
        self.time_base
    }

    fn codec(&mut self) -> &mut encoder::Encoder {
        &mut self.encoder
    }
}

impl std::fmt::Debug for VideoEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoEncoder")
            .field("time_base", &self.time_base)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for AudioEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioEncoder")
            .field("time_base", &self.time_base)
            .field("format", &self.format)
            .field("channel_mask", &format_args!("{:#x}", self.channel_mask))
            .field("rate", &self.rate)
            .finish_non_exhaustive()
    }
}
