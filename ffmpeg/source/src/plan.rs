/*!
    The set of sources feeding one transcode.
*/

use std::path::Path;

use ffmpeg_types::{AudioStreamInfo, OpenError, StreamRole};

use crate::MediaSource;

/**
    Where the output's audio comes from.
*/
#[derive(Debug)]
pub enum AudioPlan {
    /// A separate audio source is used first; once it runs dry the video
    /// container's own audio stream takes over.
    PrimaryAndSecondaryAudio(MediaSource),
    /// Only the video container's audio stream is used.
    PrimaryAudioOnly,
}

impl AudioPlan {
    pub fn secondary(&self) -> Option<&MediaSource> {
        match self {
            Self::PrimaryAndSecondaryAudio(source) => Some(source),
            Self::PrimaryAudioOnly => None,
        }
    }

    pub fn secondary_mut(&mut self) -> Option<&mut MediaSource> {
        match self {
            Self::PrimaryAndSecondaryAudio(source) => Some(source),
            Self::PrimaryAudioOnly => None,
        }
    }
}

/**
    The mandatory video source and the audio plan.
*/
#[derive(Debug)]
pub struct Sources {
    pub video: MediaSource,
    pub audio: AudioPlan,
}

impl Sources {
    /**
        Open the video source and, if given, the separate audio source.

        A failure to open the video source is returned. A failure to open the
        audio source is logged and degrades to [`AudioPlan::PrimaryAudioOnly`].
    */
    pub fn open(video_path: &Path, audio_path: Option<&Path>) -> Result<Self, OpenError> {
        let video = MediaSource::open(video_path, StreamRole::Video)?;

        let audio = match audio_path {
            None => AudioPlan::PrimaryAudioOnly,
            Some(path) => match MediaSource::open(path, StreamRole::Audio) {
                Ok(source) => AudioPlan::PrimaryAndSecondaryAudio(source),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "audio source unavailable, using the video container's audio stream"
                    );
                    AudioPlan::PrimaryAudioOnly
                }
            },
        };

        let sources = Self { video, audio };
        tracing::info!(
            secondary = sources.audio.secondary().is_some(),
            primary_audio = sources.video.audio_info().is_some(),
            "audio plan chosen"
        );
        if sources.secondary_unreachable() {
            tracing::warn!(
                path = %video_path.display(),
                "video container has no audio stream, the separate audio source will not be read"
            );
        }

        Ok(sources)
    }

    /**
        True when a separate audio source is configured but the video
        container has no audio stream.

        The separate source is read in step with the container's audio
        packets, so in that case it never feeds the output.
    */
    pub fn secondary_unreachable(&self) -> bool {
        self.audio.secondary().is_some() && self.video.audio_info().is_none()
    }

    /**
        Parameters of the audio stream the output starts with.

        The separate audio source when there is one, otherwise the video
        container's audio stream. `None` when neither has audio.
    */
    pub fn active_audio_info(&self) -> Option<&AudioStreamInfo> {
        match &self.audio {
            AudioPlan::PrimaryAndSecondaryAudio(source) => source.audio_info(),
            AudioPlan::PrimaryAudioOnly => self.video.audio_info(),
        }
    }
}
