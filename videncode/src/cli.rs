/*!
    Command line parsing.

    Numeric options are parsed leniently: the longest numeric prefix of the
    argument counts and anything unparsable reads as zero, which then maps to
    the option's default.
*/

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, error::ErrorKind};
use thiserror::Error;

use crate::config::EncodeConfig;

/// Process exit status on any validation or transcode failure (-1 to the shell).
pub const EXIT_FAILURE: u8 = 255;

/**
    Exit status for a command line the parser rejected or answered itself.

    Help and version requests succeed; every other parse error is a
    validation failure.
*/
pub fn parse_exit_status(error: &clap::Error) -> u8 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => EXIT_FAILURE,
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Unsupported input format '{extension}'")]
    UnsupportedInput { extension: String },
    #[error("Invalid scale or output resolution '{value}'")]
    InvalidScale { value: String },
    #[error("No video input specified")]
    NoVideoInput,
    #[error("No video output")]
    NoOutput,
}

#[derive(Parser, Debug)]
#[command(name = "videncode")]
#[command(about = "Transcode an AVI file to H.264 and PCM in Matroska")]
pub struct Args {
    /// File input: avi (video), sox (audio)
    #[arg(short, long = "input", value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Output resolution W:H, or scale factors SX:SY
    #[arg(short, long)]
    pub scale: Option<String>,

    /// Constant rate factor (1.0 ... 51.0)
    #[arg(short, long, allow_hyphen_values = true)]
    pub crf: Option<String>,

    /// Output bitrate
    #[arg(short, long, allow_hyphen_values = true)]
    pub bitrate: Option<String>,

    /// x264 preset
    #[arg(short = 'p', long = "x264-preset")]
    pub preset: Option<String>,

    /// File output: mkv
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Log more (repeat for trace output)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/**
    A validated transcode request.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct TranscodeJob {
    pub video: PathBuf,
    pub audio: Option<PathBuf>,
    pub output: PathBuf,
    pub config: EncodeConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InputKind {
    Video,
    Audio,
}

impl InputKind {
    fn from_path(path: &Path) -> Result<Self, CliError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        if extension.eq_ignore_ascii_case("avi") {
            Ok(Self::Video)
        } else if extension.eq_ignore_ascii_case("sox") {
            Ok(Self::Audio)
        } else {
            Err(CliError::UnsupportedInput { extension })
        }
    }
}

impl Args {
    /**
        Classify the inputs and build the encode configuration.

        When an input kind is given more than once the last one is used.
    */
    pub fn into_job(self) -> Result<TranscodeJob, CliError> {
        let mut video = None;
        let mut audio = None;
        for input in self.inputs {
            match InputKind::from_path(&input)? {
                InputKind::Video => video = Some(input),
                InputKind::Audio => audio = Some(input),
            }
        }

        let mut config = EncodeConfig::default();
        if let Some(scale) = &self.scale {
            config = parse_scale(scale, config)?;
        }
        if let Some(crf) = &self.crf {
            config = config.with_crf(parse_float_prefix(crf));
        }
        if let Some(bitrate) = &self.bitrate {
            config = config.with_bitrate(parse_int_prefix(bitrate));
        }
        if let Some(preset) = self.preset {
            config = config.with_preset(preset);
        }

        let video = video.ok_or(CliError::NoVideoInput)?;
        let output = self
            .output
            .filter(|path| ffmpeg_sink::ContainerFormat::from_path(path).is_some())
            .ok_or(CliError::NoOutput)?;

        Ok(TranscodeJob {
            video,
            audio,
            output,
            config,
        })
    }
}

/**
    `W:H` as whole pixels, or `SX:SY` as scale factors when either side has
    a decimal point.
*/
fn parse_scale(value: &str, config: EncodeConfig) -> Result<EncodeConfig, CliError> {
    let invalid = || CliError::InvalidScale {
        value: value.to_string(),
    };
    let (x, y) = value.split_once(':').ok_or_else(invalid)?;
    let (x, y) = (x.trim(), y.trim());

    if x.contains('.') || y.contains('.') {
        let x = x.parse::<f64>().map_err(|_| invalid())?;
        let y = y.parse::<f64>().map_err(|_| invalid())?;
        Ok(config.with_scale(x, y))
    } else {
        let width = x.parse::<u32>().map_err(|_| invalid())?;
        let height = y.parse::<u32>().map_err(|_| invalid())?;
        Ok(config.with_resolution(width, height))
    }
}

/**
    Longest leading decimal number of `s`, or 0.0 if there is none.
*/
pub fn parse_float_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if bytes.get(end) == Some(&b'.') {
        end += 1;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
    }
    if end == digits_start || &s[digits_start..end] == "." {
        return 0.0;
    }

    // Optional exponent, only if followed by digits
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            while bytes.get(exp).is_some_and(u8::is_ascii_digit) {
                exp += 1;
            }
            end = exp;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}

/**
    Longest leading integer of `s`, or 0 if there is none. Saturates.
*/
pub fn parse_int_prefix(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(digit - b'0'));
    }
    if negative { -value } else { value }
}
