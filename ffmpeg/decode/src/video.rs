/*!
    Video decoder implementation.
*/

use ffmpeg_next::{
    codec::decoder::Video as VideoDecoderFFmpeg, format::context::Input,
    util::frame::video::Video as VideoFrameFFmpeg,
};

use ffmpeg_types::{
    CodecId, CodecSignal, DecodeError, OpenError, Rational, StreamRole, VideoStreamInfo,
};

use crate::open::{open_failed, prepare_context};

const ROLE: StreamRole = StreamRole::Video;

/**
    Video decoder.

    Decodes packets of one video stream into frames, stamping each frame
    with its best-effort timestamp.
*/
pub struct VideoDecoder {
    decoder: VideoDecoderFFmpeg,
    info: VideoStreamInfo,
    frames_decoded: u64,
}

impl VideoDecoder {
    /**
        Open a decoder for the video stream at `index` of `input`.
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
            .and_then(|opened| opened.video())
            .map_err(open_failed(ROLE))?;

        let time_base =
            Rational::from_ffmpeg(stream.time_base()).ok_or_else(|| OpenError::DecoderOpenFailed {
                role: ROLE,
                message: "stream has no time base".to_string(),
            })?;

        let frame_rate = decoder
            .frame_rate()
            .and_then(Rational::from_ffmpeg)
            .filter(|rate| rate.is_positive());

        let frame_count = u64::try_from(stream.frames()).ok().filter(|&n| n > 0);

        let info = VideoStreamInfo {
            index,
            codec: CodecId::from(stream.parameters().id()),
            width: decoder.width(),
            height: decoder.height(),
            pixel_format: decoder.format().into(),
            time_base,
            frame_rate,
            frame_count,
        };

        tracing::debug!(
            index,
            codec = %info.codec,
            width = info.width,
            height = info.height,
            pixel_format = ?info.pixel_format,
            time_base = %info.time_base,
            frame_rate = ?info.frame_rate,
            "opened video decoder"
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
    pub fn info(&self) -> &VideoStreamInfo {
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
        best-effort timestamp.
    */
    pub fn receive_frame(&mut self, frame: &mut VideoFrameFFmpeg) -> Result<CodecSignal, DecodeError> {
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

impl std::fmt::Debug for VideoDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoDecoder")
            .field("info", &self.info)
            .field("frames_decoded", &self.frames_decoded)
            .finish_non_exhaustive()
    }
}
