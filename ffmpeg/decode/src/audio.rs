/*!
    Audio decoder implementation.
*/

use ffmpeg_next::{
    codec::decoder::Audio as AudioDecoderFFmpeg, format::context::Input,
    util::frame::audio::Audio as AudioFrameFFmpeg,
};

use ffmpeg_types::{
    AudioStreamInfo, CodecId, CodecSignal, DecodeError, OpenError, Rational, SampleFormat,
    StreamRole, resolve_channel_mask,
};

use crate::open::{open_failed, prepare_context};

const ROLE: StreamRole = StreamRole::Audio;

/**
    Audio decoder.

    Decodes packets of one audio stream into frames, stamping each frame
    with its best-effort timestamp.
*/
pub struct AudioDecoder {
    decoder: AudioDecoderFFmpeg,
    info: AudioStreamInfo,
    frames_decoded: u64,
}

impl AudioDecoder {
    /**
        Open a decoder for the audio stream at `index` of `input`.
    */
    pub fn open(input: &Input, index: usize) -> Result<Self, OpenError> {
        let stream = input.stream(index).ok_or_else(|| OpenError::DecoderOpenFailed {
            role: ROLE,
            message: format!("no stream at index {index}"),
        })?;

        let (context, codec) = prepare_context(input, &stream, ROLE)?;
        let decoder = context
            .decoder()
            .open_as(codec)
            .and_then(|opened| opened.audio())
            .map_err(open_failed(ROLE))?;

        let time_base =
            Rational::from_ffmpeg(stream.time_base()).ok_or_else(|| OpenError::DecoderOpenFailed {
                role: ROLE,
                message: "stream has no time base".to_string(),
            })?;

        let (channels, channel_mask) = {
            let layout = decoder.ch_layout();
            let channels = u16::try_from(layout.channels()).unwrap_or(0);
            (channels, resolve_channel_mask(&layout))
        };
        if decoder.rate() == 0 || channels == 0 {
            return Err(OpenError::DecoderOpenFailed {
                role: ROLE,
                message: format!(
                    "invalid audio parameters ({} Hz, {channels} channels)",
                    decoder.rate()
                ),
            });
        }

        let info = AudioStreamInfo {
            index,
            codec: CodecId::from(stream.parameters().id()),
            sample_rate: decoder.rate(),
            channels,
            channel_mask,
            sample_format: SampleFormat::from_ffmpeg(decoder.format()),
            time_base,
        };

        tracing::debug!(
            index,
            codec = %info.codec,
            sample_rate = info.sample_rate,
            channels = info.channels,
            channel_mask = format_args!("{:#x}", info.channel_mask),
            sample_format = ?info.sample_format,
            time_base = %info.time_base,
            "opened audio decoder"
        );

        Ok(Self {
            decoder,
            info,
            frames_decoded: 0,
        })
    }

    /**
        Snapshot of the decoder parameters.
    */
    pub fn info(&self) -> &AudioStreamInfo {
        &self.info
    }

    /**
        Index of the decoded stream inside its container.
    */
    pub fn stream_index(&self) -> usize {
        self.info.index
    }

    /**
        Submit one compressed packet.
    */
    pub fn send_packet(&mut self, packet: &ffmpeg_next::Packet) -> Result<(), DecodeError> {
        self.decoder
            .send_packet(packet)
            .map_err(|e| DecodeError::SubmitFailed {
                role: ROLE,
                message: e.to_string(),
            })
    }

    /**
        Signal end of stream so buffered frames can be drained.
    */
    pub fn send_eof(&mut self) -> Result<(), DecodeError> {
        self.decoder.send_eof().map_err(|e| DecodeError::SubmitFailed {
            role: ROLE,
            message: e.to_string(),
        })
    }

    /**
        Receive the next decoded frame.

        On [`CodecSignal::Ready`] the frame's pts has been set to its
        best-effort timestamp, in the stream time base.
    */
    pub fn receive_frame(&mut self, frame: &mut AudioFrameFFmpeg) -> Result<CodecSignal, DecodeError> {
        let signal = CodecSignal::from_receive(self.decoder.receive_frame(frame)).map_err(|e| {
            DecodeError::ReceiveFailed {
                role: ROLE,
                message: e.to_string(),
            }
        })?;

        if signal.is_ready() {
            frame.set_pts(frame.timestamp());
            self.frames_decoded += 1;
        }

        Ok(signal)
    }
}

impl std::fmt::Debug for AudioDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioDecoder")
            .field("info", &self.info)
            .field("frames_decoded", &self.frames_decoded)
            .finish_non_exhaustive()
    }
}
