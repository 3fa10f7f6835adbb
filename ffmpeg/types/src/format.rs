/*!
    Pixel and sample format types.
*/

/**
    Video pixel formats.

    Only the formats the pipeline reasons about are named; everything else a
    decoder may produce is carried as [`PixelFormat::Other`].
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 12bpp (the fixed output format)
    Yuv420p,
    /// Full-range planar YUV 4:2:0, 12bpp (MJPEG sources)
    Yuvj420p,
    /// Planar YUV 4:2:2, 16bpp
    Yuv422p,
    /// Planar YUV 4:4:4, 24bpp
    Yuv444p,
    /// Semi-planar YUV 4:2:0, 12bpp
    Nv12,
    /// Packed RGB, 24bpp
    Rgb24,
    /// Packed BGR, 24bpp
    Bgr24,
    /// Any other decoder output format
    Other,
}

/**
    Audio sample formats.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SampleFormat {
    /// Unsigned 8-bit integer
    U8,
    /// Signed 16-bit integer
    S16,
    /// Signed 32-bit integer
    S32,
    /// Signed 64-bit integer
    S64,
    /// 32-bit floating point
    F32,
    /// 64-bit floating point
    F64,
}
