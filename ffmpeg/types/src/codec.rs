/*!
    Codec identification.
*/

use std::fmt;

/**
    Codec identifiers.

    Covers the output codecs and the source codecs commonly found in AVI and
    SoX inputs. Anything else is reported as [`CodecId::Other`].
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    // Video codecs
    /// H.264 / AVC (video output codec)
    H264,
    /// MPEG-4 Part 2 (DivX / Xvid)
    Mpeg4,
    /// Microsoft MPEG-4 v3
    MsMpeg4V3,
    /// Motion JPEG
    Mjpeg,
    /// Uncompressed video
    RawVideo,

    // Audio codecs
    /// PCM signed 32-bit little-endian (audio output codec)
    PcmS32Le,
    /// PCM signed 16-bit little-endian
    PcmS16Le,
    /// PCM signed 32-bit big-endian (SoX native files)
    PcmS32Be,
    /// MP3 (MPEG Audio Layer 3)
    Mp3,
    /// AC-3 (Dolby Digital)
    Ac3,

    /// Any codec not named above
    Other,
}

impl CodecId {
    /**
        Short codec name as printed by the media library.
    */
    pub const fn name(self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::Mpeg4 => "mpeg4",
            Self::MsMpeg4V3 => "msmpeg4v3",
            Self::Mjpeg => "mjpeg",
            Self::RawVideo => "rawvideo",
            Self::PcmS32Le => "pcm_s32le",
            Self::PcmS16Le => "pcm_s16le",
            Self::PcmS32Be => "pcm_s32be",
            Self::Mp3 => "mp3",
            Self::Ac3 => "ac3",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
