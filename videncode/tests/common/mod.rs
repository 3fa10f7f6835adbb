#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ffmpeg_next::{
    Packet, Rational, codec, encoder,
    format::{self, Pixel, Sample, sample},
    frame,
    util::channel_layout::{ChannelLayout, ChannelLayoutMask},
};

pub const WIDTH: u32 = 64;
pub const HEIGHT: u32 = 48;
pub const FPS: i32 = 25;
pub const SAMPLE_RATE: u32 = 48000;
/// Audio samples per video frame.
pub const SAMPLES_PER_FRAME: usize = (SAMPLE_RATE as usize) / (FPS as usize);

/**
    True when every encoder the tests need is compiled into the linked FFmpeg.

    Prints the missing encoders otherwise, so a skipped test shows up in the
    test output.
*/
pub fn encoders_available() -> bool {
    if ffmpeg_next::init().is_err() {
        eprintln!("skipped: FFmpeg failed to initialize");
        return false;
    }
    let missing: Vec<codec::Id> =
        [codec::Id::H264, codec::Id::MPEG4, codec::Id::PCM_S16LE, codec::Id::PCM_S32LE]
            .into_iter()
            .filter(|&id| encoder::find(id).is_none())
            .collect();
    if !missing.is_empty() {
        eprintln!("skipped: no encoder for {missing:?}");
    }
    missing.is_empty()
}

/**
    What to put in a generated AVI file.
*/
#[derive(Clone, Copy, Debug)]
pub struct AviFixture {
    pub video_frames: Option<u64>,
    pub audio_frames: Option<u64>,
}

impl AviFixture {
    pub fn av(frames: u64) -> Self {
        Self {
            video_frames: Some(frames),
            audio_frames: Some(frames),
        }
    }

    pub fn video_only(frames: u64) -> Self {
        Self {
            video_frames: Some(frames),
            audio_frames: None,
        }
    }

    pub fn audio_only(frames: u64) -> Self {
        Self {
            video_frames: None,
            audio_frames: Some(frames),
        }
    }

    /**
        Write the fixture to `path`: MPEG-4 part 2 video and 16-bit PCM
        stereo audio at 48 kHz, one audio frame per video frame.
    */
    pub fn write(&self, path: &Path) {
        let mut output = format::output_as(path, "avi").unwrap();
        let mut video = self.video_frames.map(|_| VideoTrack::add(&mut output));
        let mut audio = self.audio_frames.map(|_| {
            AudioTrack::add(
                &mut output,
                codec::Id::PCM_S16LE,
                Sample::I16(sample::Type::Packed),
            )
        });

        output.write_header().unwrap();

        let frames = self
            .video_frames
            .unwrap_or(0)
            .max(self.audio_frames.unwrap_or(0));
        for i in 0..frames {
            if let (Some(track), Some(n)) = (video.as_mut(), self.video_frames) {
                if i < n {
                    track.write(&mut output, i as i64);
                }
            }
            if let (Some(track), Some(n)) = (audio.as_mut(), self.audio_frames) {
                if i < n {
                    track.write(&mut output, i as i64);
                }
            }
        }

        if let Some(track) = video.as_mut() {
            track.finish(&mut output);
        }
        if let Some(track) = audio.as_mut() {
            track.finish(&mut output);
        }
        output.write_trailer().unwrap();
    }
}

/**
    Write a SoX file with `frames` chunks of 32-bit stereo PCM at 48 kHz.
*/
pub fn write_sox(path: &Path, frames: u64) {
    let mut output = format::output_as(path, "sox").unwrap();
    let mut track = AudioTrack::add(
        &mut output,
        codec::Id::PCM_S32LE,
        Sample::I32(sample::Type::Packed),
    );
    output.write_header().unwrap();
    for i in 0..frames {
        track.write(&mut output, i as i64);
    }
    track.finish(&mut output);
    output.write_trailer().unwrap();
}

struct VideoTrack {
    encoder: encoder::video::Encoder,
    index: usize,
}

const VIDEO_TB: Rational = Rational(1, FPS);
const AUDIO_TB: Rational = Rational(1, SAMPLE_RATE as i32);

impl VideoTrack {
    fn add(output: &mut format::context::Output) -> Self {
        let codec = encoder::find(codec::Id::MPEG4).unwrap();
        let global_header = output
            .format()
            .flags()
            .contains(format::Flags::GLOBAL_HEADER);

        let mut stream = output.add_stream(codec).unwrap();
        let mut video = codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .unwrap();
        video.set_width(WIDTH);
        video.set_height(HEIGHT);
        video.set_format(Pixel::YUV420P);
        video.set_time_base(VIDEO_TB);
        video.set_frame_rate(Some(Rational::new(FPS, 1)));
        if global_header {
            video.set_flags(codec::Flags::GLOBAL_HEADER);
        }
        let encoder = video.open_as(codec).unwrap();

        stream.set_parameters(&encoder);
        stream.set_time_base(VIDEO_TB);
        let index = stream.index();

        Self { encoder, index }
    }

    fn write(&mut self, output: &mut format::context::Output, i: i64) {
        let mut frame = frame::Video::new(Pixel::YUV420P, WIDTH, HEIGHT);
        let luma = (16 + (i * 8) % 200) as u8;
        frame.data_mut(0).fill(luma);
        frame.data_mut(1).fill(128);
        frame.data_mut(2).fill(128);
        frame.set_pts(Some(i));

        self.encoder.send_frame(&frame).unwrap();
        drain(&mut self.encoder, VIDEO_TB, output, self.index);
    }

    fn finish(&mut self, output: &mut format::context::Output) {
        self.encoder.send_eof().unwrap();
        drain(&mut self.encoder, VIDEO_TB, output, self.index);
    }
}

struct AudioTrack {
    encoder: encoder::audio::Encoder,
    format: Sample,
    index: usize,
}

impl AudioTrack {
    fn add(output: &mut format::context::Output, id: codec::Id, format: Sample) -> Self {
        let codec = encoder::find(id).unwrap();
        let mut stream = output.add_stream(codec).unwrap();
        let mut audio = codec::context::Context::new_with_codec(codec)
            .encoder()
            .audio()
            .unwrap();
        audio.set_rate(SAMPLE_RATE as i32);
        audio.set_ch_layout(ChannelLayout::STEREO);
        audio.set_format(format);
        audio.set_time_base(AUDIO_TB);
        let encoder = audio.open_as(codec).unwrap();

        stream.set_parameters(&encoder);
        stream.set_time_base(AUDIO_TB);
        let index = stream.index();

        Self {
            encoder,
            format,
            index,
        }
    }

    fn write(&mut self, output: &mut format::context::Output, i: i64) {
        let mut frame =
            frame::Audio::new(self.format, SAMPLES_PER_FRAME, ChannelLayoutMask::STEREO);
        frame.set_rate(SAMPLE_RATE);
        frame.data_mut(0).fill(0);
        frame.set_pts(Some(i * SAMPLES_PER_FRAME as i64));

        self.encoder.send_frame(&frame).unwrap();
        drain(&mut self.encoder, AUDIO_TB, output, self.index);
    }

    fn finish(&mut self, output: &mut format::context::Output) {
        self.encoder.send_eof().unwrap();
        drain(&mut self.encoder, AUDIO_TB, output, self.index);
    }
}

fn drain(
    encoder: &mut encoder::Encoder,
    encoder_tb: Rational,
    output: &mut format::context::Output,
    index: usize,
) {
    let stream_tb = output.stream(index).unwrap().time_base();
    let mut packet = Packet::empty();
    while encoder.receive_packet(&mut packet).is_ok() {
        packet.set_stream(index);
        packet.rescale_ts(encoder_tb, stream_tb);
        packet.write_interleaved(output).unwrap();
    }
}

/**
    A stream of a finished output file.
*/
#[derive(Debug)]
pub struct OutputStream {
    pub codec: codec::Id,
    pub width: u32,
    pub height: u32,
    /// Packet timestamps in file order.
    pub dts: Vec<i64>,
}

/**
    Read back every stream and packet timestamp of a media file.
*/
pub fn probe(path: &Path) -> Vec<OutputStream> {
    let mut input = format::input(path).unwrap();
    let mut streams: Vec<OutputStream> = input
        .streams()
        .map(|stream| {
            let parameters = stream.parameters();
            let context = codec::context::Context::from_parameters(parameters.clone()).unwrap();
            let (width, height) = match context.decoder().video() {
                Ok(video) => (video.width(), video.height()),
                Err(_) => (0, 0),
            };
            OutputStream {
                codec: parameters.id(),
                width,
                height,
                dts: Vec::new(),
            }
        })
        .collect();

    for (stream, packet) in input.packets() {
        if let Some(dts) = packet.dts() {
            streams[stream.index()].dts.push(dts);
        }
    }
    streams
}

pub fn scratch(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}
