mod common;

use std::path::PathBuf;

use ffmpeg_next::codec;

use videncode::{
    ConfigError, DriverState, EncodeConfig, TranscodeError, TranscodeJob, Transcoder,
};

use common::{AviFixture, HEIGHT, WIDTH, encoders_available, probe, scratch, write_sox};

fn job(video: PathBuf, audio: Option<PathBuf>, output: PathBuf) -> TranscodeJob {
    TranscodeJob {
        video,
        audio,
        output,
        config: EncodeConfig::default().with_scale(0.5, 0.5),
    }
}

fn assert_monotonic(dts: &[i64]) {
    assert!(
        dts.windows(2).all(|pair| pair[0] <= pair[1]),
        "timestamps go backwards: {dts:?}"
    );
}

#[test]
fn encodes_every_frame() {
    if !encoders_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = scratch(&dir, "clip.avi");
    let output = scratch(&dir, "out.mkv");
    AviFixture::av(10).write(&input);

    let mut transcoder = Transcoder::open(&job(input, None, output.clone())).unwrap();
    assert_eq!(transcoder.state(), DriverState::Running);
    assert_eq!(transcoder.settings().width, WIDTH / 2);
    assert_eq!(transcoder.settings().height, HEIGHT / 2);

    let summary = transcoder.run().unwrap();
    assert_eq!(summary.frames_encoded, 10);
    assert_eq!(summary.frames_available, Some(10));
    assert!(summary.closed);
    assert!(summary.audio_frames > 0);
    assert_eq!(
        summary.to_string(),
        "Successfully encoded 10 out of 10 frames"
    );
    assert_eq!(transcoder.state(), DriverState::Finalized);

    let streams = probe(&output);
    assert_eq!(streams.len(), 2);
    assert_eq!(streams[0].codec, codec::Id::H264);
    assert_eq!((streams[0].width, streams[0].height), (WIDTH / 2, HEIGHT / 2));
    assert_eq!(streams[0].dts.len(), 10);
    assert_eq!(streams[1].codec, codec::Id::PCM_S32LE);
    assert!(!streams[1].dts.is_empty());
    for stream in &streams {
        assert_monotonic(&stream.dts);
    }
}

#[test]
fn runs_only_once() {
    if !encoders_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = scratch(&dir, "clip.avi");
    AviFixture::av(3).write(&input);

    let mut transcoder =
        Transcoder::open(&job(input, None, scratch(&dir, "out.mkv"))).unwrap();
    transcoder.run().unwrap();
    assert!(matches!(
        transcoder.run(),
        Err(TranscodeError::AlreadyFinished)
    ));
}

#[test]
fn separate_audio_then_container_audio() {
    if !encoders_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = scratch(&dir, "clip.avi");
    let music = scratch(&dir, "music.sox");
    let output = scratch(&dir, "out.mkv");
    AviFixture::av(20).write(&input);
    write_sox(&music, 3);

    let mut transcoder = Transcoder::open(&job(input, Some(music), output.clone())).unwrap();
    let summary = transcoder.run().unwrap();
    assert_eq!(summary.frames_encoded, 20);
    assert!(transcoder.pipeline().audio_exhausted);

    let streams = probe(&output);
    assert_eq!(streams.len(), 2);
    assert_monotonic(&streams[1].dts);
    let unique = {
        let mut dts = streams[1].dts.clone();
        dts.dedup();
        dts.len()
    };
    assert_eq!(unique, streams[1].dts.len(), "duplicate audio timestamps");
}

#[test]
fn unreadable_audio_source_falls_back() {
    if !encoders_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = scratch(&dir, "clip.avi");
    let output = scratch(&dir, "out.mkv");
    AviFixture::av(5).write(&input);

    let missing = scratch(&dir, "missing.sox");
    let mut transcoder = Transcoder::open(&job(input, Some(missing), output)).unwrap();
    let summary = transcoder.run().unwrap();
    assert_eq!(summary.frames_encoded, 5);
    assert!(summary.audio_frames > 0);
    assert!(!transcoder.pipeline().audio_exhausted);
}

#[test]
fn zero_resolution_is_rejected_before_output() {
    if !encoders_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = scratch(&dir, "clip.avi");
    let output = scratch(&dir, "out.mkv");
    AviFixture::av(2).write(&input);

    let mut job = job(input, None, output.clone());
    job.config = EncodeConfig::default().with_scale(0.01, 0.01);
    let err = Transcoder::open(&job).unwrap_err();
    assert!(matches!(
        err,
        TranscodeError::Config(ConfigError::ZeroResolution { .. })
    ));
    assert!(!output.exists());
}

#[test]
fn video_container_without_video() {
    if !encoders_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = scratch(&dir, "sound.avi");
    AviFixture::audio_only(4).write(&input);

    let err = Transcoder::open(&job(input, None, scratch(&dir, "out.mkv"))).unwrap_err();
    assert!(matches!(
        err,
        TranscodeError::Open(ffmpeg_types::OpenError::MissingStream { .. })
    ));
}

#[test]
fn no_audio_anywhere() {
    if !encoders_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = scratch(&dir, "silent.avi");
    AviFixture::video_only(4).write(&input);

    let err = Transcoder::open(&job(input, None, scratch(&dir, "out.mkv"))).unwrap_err();
    assert!(matches!(
        err,
        TranscodeError::Config(ConfigError::NoAudioStream)
    ));
}

#[test]
fn separate_audio_needs_container_audio() {
    if !encoders_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let silent = scratch(&dir, "silent.avi");
    let clip = scratch(&dir, "clip.avi");
    let music = scratch(&dir, "music.sox");
    AviFixture::video_only(4).write(&silent);
    AviFixture::av(4).write(&clip);
    write_sox(&music, 3);

    let sources = ffmpeg_source::Sources::open(&silent, Some(&music)).unwrap();
    assert!(sources.secondary_unreachable());

    let sources = ffmpeg_source::Sources::open(&clip, Some(&music)).unwrap();
    assert!(!sources.secondary_unreachable());

    let sources = ffmpeg_source::Sources::open(&silent, None).unwrap();
    assert!(!sources.secondary_unreachable());
}
