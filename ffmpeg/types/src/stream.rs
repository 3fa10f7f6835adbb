/*!
    Stream roles and decoder parameter snapshots.
*/

use std::fmt;

use crate::{CodecId, PixelFormat, Rational, SampleFormat};

/**
    The role a stream plays in the pipeline.

    The output container always carries one stream per role, video first.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamRole {
    Video,
    Audio,
}

impl StreamRole {
    pub const ALL: [Self; 2] = [Self::Video, Self::Audio];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for StreamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/**
    Parameters of an opened video decoder.

    Captured once when the source opens; the sink copies the time base and
    frame rate from here and never changes them afterwards.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoStreamInfo {
    /// Stream index inside the source container
    pub index: usize,
    pub codec: CodecId,
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    /// Stream time base, in which decoded frame timestamps are expressed
    pub time_base: Rational,
    /// Declared or inferred frame rate, if any could be determined
    pub frame_rate: Option<Rational>,
    /// Number of frames reported by container metadata, if known
    pub frame_count: Option<u64>,
}

impl VideoStreamInfo {
    /**
        Frame rate to give the encoder.

        Falls back to the inverse of the time base when the stream has no
        usable rate, which is exact for constant-rate AVI streams.
    */
    pub fn encoder_frame_rate(&self) -> Rational {
        match self.frame_rate {
            Some(rate) if rate.is_positive() => rate,
            _ if self.time_base.is_positive() => self.time_base.invert(),
            _ => Rational::new(25, 1),
        }
    }
}

/**
    Parameters of an opened audio decoder.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioStreamInfo {
    /// Stream index inside the source container
    pub index: usize,
    pub codec: CodecId,
    pub sample_rate: u32,
    pub channels: u16,
    /// Channel layout bit mask; never zero for a valid stream
    pub channel_mask: u64,
    /// Decoder output format, if the decoder committed to one when opened
    pub sample_format: Option<SampleFormat>,
    pub time_base: Rational,
}

impl AudioStreamInfo {
    /**
        Encoder time base, one tick per sample.
    */
    pub const fn encoder_time_base(&self) -> Rational {
        Rational::per_sample(self.sample_rate)
    }
}

static_assertions::assert_impl_all!(StreamRole: Send, Sync, Copy);
static_assertions::assert_impl_all!(VideoStreamInfo: Send, Sync, Copy);
static_assertions::assert_impl_all!(AudioStreamInfo: Send, Sync, Copy);

#[cfg(test)]
mod tests {
    use super::*;

    fn video(frame_rate: Option<Rational>, time_base: Rational) -> VideoStreamInfo {
        VideoStreamInfo {
            index: 0,
            codec: CodecId::Mpeg4,
            width: 1920,
            height: 1080,
            pixel_format: PixelFormat::Yuv420p,
            time_base,
            frame_rate,
            frame_count: Some(250),
        }
    }

    #[test]
    fn role_names() {
        assert_eq!(StreamRole::Video.to_string(), "video");
        assert_eq!(StreamRole::Audio.to_string(), "audio");
        assert_eq!(StreamRole::ALL, [StreamRole::Video, StreamRole::Audio]);
    }

    #[test]
    fn declared_frame_rate_wins() {
        let info = video(Some(Rational::new(30000, 1001)), Rational::new(1, 25));
        assert_eq!(info.encoder_frame_rate(), Rational::new(30000, 1001));
    }

    #[test]
    fn frame_rate_falls_back_to_time_base() {
        let info = video(None, Rational::new(1, 25));
        assert_eq!(info.encoder_frame_rate(), Rational::new(25, 1));

        let info = video(Some(Rational::new(0, 1)), Rational::new(1, 30));
        assert_eq!(info.encoder_frame_rate(), Rational::new(30, 1));
    }

    #[test]
    fn audio_encoder_time_base_is_per_sample() {
        let info = AudioStreamInfo {
            index: 1,
            codec: CodecId::PcmS16Le,
            sample_rate: 48000,
            channels: 2,
            channel_mask: 0b11,
            sample_format: Some(SampleFormat::S16),
            time_base: Rational::new(1, 48000),
        };
        assert_eq!(info.encoder_time_base(), Rational::new(1, 48000));
    }
}
