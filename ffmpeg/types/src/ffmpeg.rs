/*!
    Conversions between the shared types and `ffmpeg-next` types.

    Only compiled with the `ffmpeg` feature.
*/

use ffmpeg_next::util::channel_layout::{ChannelLayout, ChannelLayoutMask};
use ffmpeg_next::codec::{Codec, Context, Id};
use ffmpeg_next::ffi;
use ffmpeg_next::format::{Pixel, Sample};

use crate::{CodecId, CodecSignal, OpenError, PixelFormat, Rational, SampleFormat};

impl Rational {
    /**
        Convert from an FFmpeg rational.

        Returns `None` for a zero denominator, which FFmpeg uses for
        "unknown".
    */
    pub fn from_ffmpeg(value: ffmpeg_next::Rational) -> Option<Self> {
        Self::checked(value.numerator(), value.denominator())
    }
}

impl From<Rational> for ffmpeg_next::Rational {
    fn from(value: Rational) -> Self {
        ffmpeg_next::Rational::new(value.num, value.den)
    }
}

impl From<Pixel> for PixelFormat {
    fn from(value: Pixel) -> Self {
        match value {
            Pixel::YUV420P => Self::Yuv420p,
            Pixel::YUVJ420P => Self::Yuvj420p,
            Pixel::YUV422P => Self::Yuv422p,
            Pixel::YUV444P => Self::Yuv444p,
            Pixel::NV12 => Self::Nv12,
            Pixel::RGB24 => Self::Rgb24,
            Pixel::BGR24 => Self::Bgr24,
            _ => Self::Other,
        }
    }
}

impl SampleFormat {
    /**
        Convert from an FFmpeg sample format, ignoring packed vs planar.

        Returns `None` for `Sample::None`.
    */
    pub fn from_ffmpeg(value: Sample) -> Option<Self> {
        match value {
            Sample::None => None,
            Sample::U8(_) => Some(Self::U8),
            Sample::I16(_) => Some(Self::S16),
            Sample::I32(_) => Some(Self::S32),
            Sample::I64(_) => Some(Self::S64),
            Sample::F32(_) => Some(Self::F32),
            Sample::F64(_) => Some(Self::F64),
        }
    }
}

impl From<Id> for CodecId {
    fn from(value: Id) -> Self {
        match value {
            Id::H264 => Self::H264,
            Id::MPEG4 => Self::Mpeg4,
            Id::MSMPEG4V3 => Self::MsMpeg4V3,
            Id::MJPEG => Self::Mjpeg,
            Id::RAWVIDEO => Self::RawVideo,
            Id::PCM_S32LE => Self::PcmS32Le,
            Id::PCM_S16LE => Self::PcmS16Le,
            Id::PCM_S32BE => Self::PcmS32Be,
            Id::MP3 => Self::Mp3,
            Id::AC3 => Self::Ac3,
            _ => Self::Other,
        }
    }
}

impl CodecSignal {
    /**
        Classify the result of `receive_frame` / `receive_packet`.

        `EAGAIN` and end of file are control states and map to a signal;
        any other failure is handed back to the caller.
    */
    pub fn from_receive(
        result: Result<(), ffmpeg_next::Error>,
    ) -> Result<Self, ffmpeg_next::Error> {
        match result {
            Ok(()) => Ok(Self::Ready),
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffmpeg_next::error::EAGAIN => {
                Ok(Self::NeedsInput)
            }
            Err(ffmpeg_next::Error::Eof) => Ok(Self::EndOfStream),
            Err(e) => Err(e),
        }
    }
}

/**
    Channel layout mask for a stream or frame.

    Uses the reported layout when it is a native layout matching the channel
    count, otherwise the default layout for that many channels. Decoders, the
    audio converter and the sink all derive their layout through here.
*/
pub fn resolve_channel_mask(layout: &ChannelLayout<'_>) -> u64 {
    let channels = layout.channels();
    match layout.mask() {
        Some(mask) if !mask.is_empty() && mask.bits().count_ones() == channels => mask.bits(),
        _ => ChannelLayout::default_for_channels(channels)
            .mask()
            .map_or(0, |mask| mask.bits()),
    }
}

/**
    Native channel layout for a mask from [`resolve_channel_mask`].

    An empty or unknown mask yields stereo.
*/
pub fn channel_layout(mask: u64) -> ChannelLayout<'static> {
    ChannelLayout::from_mask(ChannelLayoutMask::from_bits_truncate(mask))
        .unwrap_or(ChannelLayout::STEREO)
}

/**
    Allocate a codec context bound to `codec`.

    Unlike `Context::new_with_codec`, a failed allocation is reported
    instead of producing a context around a null pointer.
*/
pub fn alloc_codec_context(codec: Codec) -> Result<Context, OpenError> {
    let ptr = unsafe { ffi::avcodec_alloc_context3(codec.as_ptr()) };
    if ptr.is_null() {
        return Err(OpenError::AllocationFailed {
            what: "codec context",
        });
    }
    // SAFETY: ptr is non-null and not shared; Context frees it on drop.
    Ok(unsafe { Context::wrap(ptr, None) })
}

#[cfg(test)]
mod tests {
    use ffmpeg_next::format::sample::Type;

    use super::*;

    #[test]
    fn rational_unknown_rate() {
        assert_eq!(Rational::from_ffmpeg(ffmpeg_next::Rational::new(0, 0)), None);
        assert_eq!(
            Rational::from_ffmpeg(ffmpeg_next::Rational::new(1, 1000)),
            Some(Rational::new(1, 1000))
        );
    }

    #[test]
    fn rational_into_ffmpeg() {
        let tb: ffmpeg_next::Rational = Rational::new(1, 44100).into();
        assert_eq!(tb.numerator(), 1);
        assert_eq!(tb.denominator(), 44100);
    }

    #[test]
    fn sample_formats_ignore_layout() {
        assert_eq!(
            SampleFormat::from_ffmpeg(Sample::I32(Type::Packed)),
            Some(SampleFormat::S32)
        );
        assert_eq!(
            SampleFormat::from_ffmpeg(Sample::F32(Type::Planar)),
            Some(SampleFormat::F32)
        );
        assert_eq!(SampleFormat::from_ffmpeg(Sample::None), None);
    }

    #[test]
    fn codec_ids() {
        assert_eq!(CodecId::from(Id::PCM_S32LE), CodecId::PcmS32Le);
        assert_eq!(CodecId::from(Id::VP9), CodecId::Other);
    }

    #[test]
    fn receive_results_classify() {
        use ffmpeg_next::Error;

        assert_eq!(CodecSignal::from_receive(Ok(())), Ok(CodecSignal::Ready));
        assert_eq!(
            CodecSignal::from_receive(Err(Error::Other {
                errno: ffmpeg_next::error::EAGAIN
            })),
            Ok(CodecSignal::NeedsInput)
        );
        assert_eq!(
            CodecSignal::from_receive(Err(Error::Eof)),
            Ok(CodecSignal::EndOfStream)
        );
        assert_eq!(
            CodecSignal::from_receive(Err(Error::InvalidData)),
            Err(Error::InvalidData)
        );
    }

    #[test]
    fn reported_layout_is_kept() {
        let mask = resolve_channel_mask(&ChannelLayout::STEREO);
        assert_eq!(mask, ChannelLayoutMask::STEREO.bits());
    }

    #[test]
    fn default_layouts_resolve_to_their_mask() {
        assert_eq!(
            resolve_channel_mask(&ChannelLayout::default_for_channels(1)),
            ChannelLayoutMask::MONO.bits()
        );
        assert_eq!(
            resolve_channel_mask(&ChannelLayout::default_for_channels(2)),
            ChannelLayoutMask::STEREO.bits()
        );
    }

    #[test]
    fn mask_back_to_layout() {
        let layout = channel_layout(ChannelLayoutMask::MONO.bits());
        assert_eq!(layout.channels(), 1);
        assert_eq!(channel_layout(0).channels(), 2);
    }

    #[test]
    fn pixel_formats() {
        assert_eq!(PixelFormat::from(Pixel::YUV420P), PixelFormat::Yuv420p);
        assert_eq!(PixelFormat::from(Pixel::GRAY8), PixelFormat::Other);
    }
}
