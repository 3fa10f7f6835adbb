/*!
    Encoding configuration.
*/

use ffmpeg_sink::{DEFAULT_PRESET, VideoEncodeSettings};
use thiserror::Error;

pub const DEFAULT_CRF: f64 = 23.0;
pub const MIN_CRF: f64 = 1.0;
pub const MAX_CRF: f64 = 51.0;

pub const DEFAULT_BITRATE: u64 = 60_000;
pub const MAX_BITRATE: u64 = 100_000;

/**
    Errors in the resolved configuration, detected before the sink is opened.
*/
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("resolution cannot be zero (resolved {width}x{height})")]
    ZeroResolution { width: u32, height: u32 },
    #[error("no audio stream in the video container or a separate audio input")]
    NoAudioStream,
}

/**
    Output geometry and rate control for one transcode.

    Either an explicit output resolution or a pair of scale factors applied
    to the source resolution. Scale factors win when both are non-zero.
    Immutable once built.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeConfig {
    pub output_width: u32,
    pub output_height: u32,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Constant rate factor, within `MIN_CRF..=MAX_CRF`
    pub crf: f64,
    /// Target bitrate, within `1..=MAX_BITRATE`
    pub bitrate: u64,
    pub preset: String,
}

impl Default for EncodeConfig {
    /// Source resolution, default rate control.
    fn default() -> Self {
        Self {
            output_width: 0,
            output_height: 0,
            scale_x: 1.0,
            scale_y: 1.0,
            crf: DEFAULT_CRF,
            bitrate: DEFAULT_BITRATE,
            preset: DEFAULT_PRESET.to_string(),
        }
    }
}

impl EncodeConfig {
    /**
        Encode at a fixed output resolution.
    */
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.output_width = width;
        self.output_height = height;
        self.scale_x = 0.0;
        self.scale_y = 0.0;
        self
    }

    /**
        Encode at the source resolution multiplied by `x` and `y`.
    */
    pub fn with_scale(mut self, x: f64, y: f64) -> Self {
        self.output_width = 0;
        self.output_height = 0;
        self.scale_x = x;
        self.scale_y = y;
        self
    }

    pub fn with_crf(mut self, crf: f64) -> Self {
        self.crf = normalize_crf(crf);
        self
    }

    /**
        Set the bitrate. Out of range values, including negative ones,
        fall back to the default.
    */
    pub fn with_bitrate(mut self, bitrate: i64) -> Self {
        self.bitrate = normalize_bitrate(bitrate);
        self
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = preset.into();
        self
    }

    /**
        Resolve the output resolution for a source of the given size.

        Scaled sizes are truncated. A zero width or height is an error.
    */
    pub fn resolve_output_size(
        &self,
        source_width: u32,
        source_height: u32,
    ) -> Result<(u32, u32), ConfigError> {
        let (width, height) = if self.scale_x != 0.0 && self.scale_y != 0.0 {
            (
                scale_dimension(source_width, self.scale_x),
                scale_dimension(source_height, self.scale_y),
            )
        } else {
            (self.output_width, self.output_height)
        };

        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroResolution { width, height });
        }
        Ok((width, height))
    }

    /**
        Encoder settings for the resolved output size.
    */
    pub fn video_settings(&self, width: u32, height: u32) -> VideoEncodeSettings {
        VideoEncodeSettings::new(width, height)
            .with_crf(self.crf)
            .with_bitrate(self.bitrate)
            .with_preset(self.preset.clone())
    }
}

/**
    Zero means unset and maps to the default; anything else is clamped.
*/
pub fn normalize_crf(crf: f64) -> f64 {
    if crf == 0.0 || !crf.is_finite() {
        DEFAULT_CRF
    } else {
        crf.clamp(MIN_CRF, MAX_CRF)
    }
}

pub fn normalize_bitrate(bitrate: i64) -> u64 {
    match u64::try_from(bitrate) {
        Ok(bitrate) if (1..=MAX_BITRATE).contains(&bitrate) => bitrate,
        _ => DEFAULT_BITRATE,
    }
}

// Saturating: negative or NaN products become zero.
fn scale_dimension(source: u32, factor: f64) -> u32 {
    (f64::from(source) * factor) as u32
}
