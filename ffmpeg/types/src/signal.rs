/*!
    Codec control signals.
*/

/**
    Outcome of a receive call on a decoder or encoder.

    `NeedsInput` and `EndOfStream` are expected control states, not errors:
    they end an inner drain loop without aborting the pipeline.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CodecSignal {
    /// A frame (decoder) or packet (encoder) was produced.
    Ready,
    /// The codec needs more input before it can produce output.
    NeedsInput,
    /// The codec has been fully drained after end of stream.
    EndOfStream,
}

impl CodecSignal {
    /**
        Returns true if output was produced.
    */
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}
