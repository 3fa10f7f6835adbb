/*!
    Single-pass transcoder from an AVI video file, with an optional separate
    audio file, to H.264 video and PCM audio in Matroska.

    # Example

    ```ignore
    use videncode::{Args, Transcoder};

    let job = Args::parse().into_job()?;
    let mut transcoder = Transcoder::open(&job)?;
    let summary = transcoder.run()?;
    println!("{summary}");
    ```
*/

pub mod audio_route;
pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod progress;
pub mod timeline;

#[cfg(test)]
#[path = "../tests/common/mod.rs"]
mod fixtures;

pub use cli::{Args, CliError, TranscodeJob};
pub use config::{ConfigError, EncodeConfig};
pub use driver::{DriverState, PipelineState, TranscodeSummary, Transcoder};
pub use error::TranscodeError;
