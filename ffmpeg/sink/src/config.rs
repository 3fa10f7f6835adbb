/*!
    Sink configuration types.
*/

use std::path::Path;

/// Fixed x264 GOP policy: long minimum keyframe interval, periodic intra
/// refresh instead of IDR frames, no B-frames.
pub const X264_PARAMS: &str = "keyint_min=600:intra_refresh=1:bframes=0";

/// Preset used when none is given.
pub const DEFAULT_PRESET: &str = "veryfast";

/**
    Container format for output.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerFormat {
    /// Matroska container, the only supported output.
    Matroska,
}

impl ContainerFormat {
    /**
        Pick the container for an output path by its extension.

        Returns `None` for anything but `.mkv` (case-insensitive).
    */
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if extension.eq_ignore_ascii_case(Self::Matroska.extension()) {
            Some(Self::Matroska)
        } else {
            None
        }
    }

    /**
        Get the FFmpeg format name for this container.
    */
    pub fn ffmpeg_format_name(&self) -> &'static str {
        match self {
            Self::Matroska => "matroska",
        }
    }

    /**
        Get the file extension for this container.
    */
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Matroska => "mkv",
        }
    }
}

/**
    Video encoder settings.

    Frame rate and time base are not part of the settings; they always come
    from the video source.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct VideoEncodeSettings {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Constant rate factor.
    pub crf: f64,
    /// Target bitrate in bits per second.
    pub bitrate: u64,
    /// x264 preset name.
    pub preset: String,
}

impl VideoEncodeSettings {
    /**
        Create settings for the given output size with default rate control.
    */
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            crf: 23.0,
            bitrate: 60_000,
            preset: DEFAULT_PRESET.to_string(),
        }
    }

    /**
        Set the constant rate factor.
    */
    pub fn with_crf(mut self, crf: f64) -> Self {
        self.crf = crf;
        self
    }

    /**
        Set the target bitrate.
    */
    pub fn with_bitrate(mut self, bitrate: u64) -> Self {
        self.bitrate = bitrate;
        self
    }

    /**
        Set the x264 preset.
    */
    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = preset.into();
        self
    }

    /**
        The `crf` encoder option, with two decimals.
    */
    pub fn crf_option(&self) -> String {
        format!("{:.2}", self.crf)
    }
}
