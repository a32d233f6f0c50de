//! Error types for the pixel data decoding pipeline.

use snafu::Snafu;

use crate::handlers::DecodeError;

/// The possible failures when dispatching and decoding pixel data.
///
/// Users of this type are free to handle errors based on their variant,
/// but should not make decisions based on the display message,
/// since that is not considered part of the API
/// and may change on any new release.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// No registered handler claims support for the data set's
    /// transfer syntax and sample configuration.
    #[snafu(display("Unsupported transfer syntax `{}`", ts))]
    UnsupportedTransferSyntax { ts: String },

    /// The data set's byte order is not known,
    /// so its pixel data cannot be interpreted.
    /// Raised before any handler is consulted.
    #[snafu(display("Data set byte order is not known"))]
    AmbiguousEndianness,

    /// A required attribute is missing from the data set.
    #[snafu(display("Missing required attribute `{}`", name))]
    MissingAttribute { name: &'static str },

    /// The selected handler claimed support
    /// but failed while decoding a frame:
    /// a backend or environment defect,
    /// as opposed to a format mismatch.
    #[snafu(display("Could not decode frame {}", frame))]
    DecodeFrame { frame: u32, source: DecodeError },

    /// The decoded byte count contradicts the declared geometry.
    /// Never silently reshaped.
    #[snafu(display(
        "Decoded pixel data has {} bytes, but the declared geometry \
         ({} frame(s) of {}x{}, {} sample(s) per pixel, {} byte(s) per sample) \
         requires exactly {}",
        actual,
        frames,
        rows,
        cols,
        samples_per_pixel,
        bytes_per_sample,
        expected
    ))]
    GeometryMismatch {
        actual: usize,
        expected: usize,
        frames: u32,
        rows: u16,
        cols: u16,
        samples_per_pixel: u16,
        bytes_per_sample: u16,
    },

    /// Decoded frames disagree on sample precision or color layout.
    #[snafu(display("Decoded frames disagree on sample format"))]
    InconsistentFrames,

    /// The decoded sample precision is not representable.
    #[snafu(display("Unsupported sample precision of {} bits", bits))]
    UnsupportedPrecision { bits: u16 },

    /// The _Pixel Representation_ attribute is out of range.
    #[snafu(display("Invalid PixelRepresentation, must be 0 or 1"))]
    InvalidPixelRepresentation,

    /// Could not build an `ndarray` with the output shape.
    #[snafu(display("Invalid shape for ndarray"))]
    BuildArray { source: ndarray::ShapeError },

    /// A sample value does not fit the requested element type.
    #[snafu(display("Invalid data type for ndarray element"))]
    InvalidDataType,
}

/// Shorthand result type for pixel data decoding.
pub type Result<T, E = Error> = std::result::Result<T, E>;
