//! Pixel data handlers: the backend capability contract
//! and the built-in adapters for each codec family.
//!
//! A handler declares which transfer syntaxes and sample configurations
//! it can decode through [`supports`](PixelDataHandler::supports),
//! a pure predicate computed from static capability
//! (Cargo features decide which backend libraries are compiled in;
//! capability is never probed by trial decoding).
//! Decoding failures reported by [`decode_frame`](PixelDataHandler::decode_frame)
//! therefore always mean a runtime defect
//! (corrupt bitstream or a backend limitation discovered mid-decode),
//! never a syntax mismatch.
//!
//! Additional support can be enabled via Cargo features:
//!
//! - [`jpeg`](jpeg) provides native JPEG decoding
//!   (baseline and lossless Huffman) via `jpeg-decoder`.
//!   Requires the `jpeg` feature, enabled by default.
//! - [`jpeg2k`](jpeg2k) contains JPEG 2000 support through [OpenJPEG].
//!   Enable `openjp2` for the Rust port or `openjpeg-sys`
//!   to statically link the reference implementation.
//! - [`jpegls`](jpegls) provides JPEG-LS decoding via CharLS.
//!   Requires the `charls` feature; no JPEG-LS capability
//!   is assumed to be present by default.
//! - [`native`](native) is the pure-numeric fallback for
//!   uncompressed transfer syntaxes, always available.
//!
//! [OpenJPEG]: https://github.com/uclouvain/openjpeg

use snafu::{OptionExt, Snafu};
use std::sync::Arc;

use crate::dataset::PixelDataSource;
use crate::photometric::PhotometricInterpretation;

#[cfg(feature = "jpeg")]
pub mod jpeg;
pub mod jpeg2k;
pub mod jpegls;
pub mod native;

/// **Note:** This module is a stub.
/// Enable the `jpeg` feature to use this module.
#[cfg(not(feature = "jpeg"))]
pub mod jpeg {}

/// The possible error conditions when decoding pixel data.
///
/// Users of this type are free to handle errors based on their variant,
/// but should not make decisions based on the display message,
/// since that is not considered part of the API
/// and may change on any new release.
///
/// Handler implementers are recommended to choose
/// the most fitting error variant for the tested condition;
/// when no suitable variant is available,
/// the [`Custom`](DecodeError::Custom) variant may be used
/// through the [`whatever!`](snafu::whatever) macro.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub), module)]
pub enum DecodeError {
    /// A custom error occurred when decoding,
    /// reported as a dynamic error value with a message.
    #[snafu(whatever, display("{}", message))]
    Custom {
        /// The error message.
        message: String,
        /// The underlying error cause, if any.
        #[snafu(source(from(Box<dyn std::error::Error + Send + Sync + 'static>, Some)))]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },

    /// The requested frame is outside the data set's frame range.
    FrameRangeOutOfBounds,

    /// A required attribute is missing
    /// from the data set representing the image.
    #[snafu(display("Missing required attribute `{}`", name))]
    MissingAttribute { name: &'static str },
}

/// The result of decoding pixel data.
pub type DecodeResult<T, E = DecodeError> = Result<T, E>;

/// The decoded samples of a single frame,
/// in the backend's native sample order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// Flat sample bytes in little endian.
    pub data: Vec<u8>,

    /// The sample precision reported by the backend.
    pub bits_per_sample: u16,

    /// The color interpretation that the sample values actually carry,
    /// which may differ from the data set's declared interpretation
    /// (e.g. a JPEG backend emitting RGB for a `YBR_FULL_422` stream).
    pub interpretation: PhotometricInterpretation,

    /// Whether multi-sample data is laid out
    /// as separate sample planes rather than interleaved pixels.
    pub planar: bool,
}

/// A decoding backend for one or more codec families.
///
/// Handlers are consulted through an ordered [registry](crate::registry):
/// the first handler whose [`supports`](PixelDataHandler::supports)
/// predicate accepts the data set's configuration decodes all frames.
pub trait PixelDataHandler: std::fmt::Debug + Send + Sync {
    /// A short name for this handler, for diagnostics.
    fn name(&self) -> &'static str;

    /// Whether this handler can decode pixel data
    /// in the given transfer syntax and sample configuration.
    ///
    /// This is a pure predicate over static capability:
    /// it must not inspect pixel data, must not have side effects
    /// and must not panic.
    fn supports(
        &self,
        transfer_syntax: &str,
        photometric_interpretation: &PhotometricInterpretation,
        bits_allocated: u16,
    ) -> bool;

    /// Decode a single frame of the given data set
    /// into its native samples.
    ///
    /// It is a necessary precondition that `supports` accepted
    /// the data set's configuration;
    /// an error from this method signals a runtime failure
    /// (corrupt bitstream, backend limitation),
    /// not an unsupported transfer syntax.
    fn decode_frame(&self, src: &dyn PixelDataSource, frame: u32) -> DecodeResult<DecodedFrame>;
}

/// Alias type for a dynamically dispatched, shareable handler.
pub type DynPixelDataHandler = Arc<dyn PixelDataHandler + 'static>;

/// The compressed bytes feeding one frame's decode.
#[derive(Debug)]
pub(crate) enum FrameSource {
    /// The bytes of exactly the requested frame.
    Single(Vec<u8>),
    /// One fragment holding every frame's codestream concatenated;
    /// the adapter must skip the preceding frames itself.
    Concatenated(Vec<u8>),
}

/// The effective frame count of a data set.
///
/// An absent _Number of Frames_ implies a single frame,
/// and so does the non-conformant value 0.
pub(crate) fn frame_count(src: &dyn PixelDataSource) -> u32 {
    match src.number_of_frames() {
        Some(0) | None => 1,
        Some(n) => n,
    }
}

/// Gather the compressed bytes for the given frame
/// from the data set's encapsulated fragments.
///
/// Frames map to fragments 1:1 when the counts line up.
/// A frame spanning multiple fragments is looked up
/// through the basic offset table.
/// A single fragment holding several frames is handed over whole.
pub(crate) fn frame_source(
    src: &dyn PixelDataSource,
    frame: u32,
) -> DecodeResult<FrameSource> {
    let raw = src
        .raw_pixel_data()
        .context(decode_error::MissingAttributeSnafu { name: "PixelData" })?;

    let nr_frames = frame_count(src) as usize;
    snafu::ensure!(
        (frame as usize) < nr_frames,
        decode_error::FrameRangeOutOfBoundsSnafu
    );

    let mut fragments = raw.fragments;

    if fragments.len() == nr_frames {
        // 1:1 frame-to-fragment mapping
        return Ok(FrameSource::Single(fragments.swap_remove(frame as usize)));
    }

    if fragments.len() == 1 {
        return Ok(FrameSource::Concatenated(fragments.swap_remove(0)));
    }

    // A frame may span multiple fragments;
    // gather them by walking the basic offset table.
    let base_offset = raw.offset_table.get(frame as usize).copied();
    let base_offset = if frame == 0 {
        base_offset.unwrap_or(0) as usize
    } else {
        base_offset.context(decode_error::FrameRangeOutOfBoundsSnafu)? as usize
    };
    let next_offset = raw.offset_table.get(frame as usize + 1).copied();

    let mut offset = 0;
    let mut out = Vec::new();
    for fragment in &fragments {
        if offset >= base_offset {
            out.extend_from_slice(fragment);
        }
        // each fragment is preceded by an 8-byte item header on the wire
        offset += fragment.len() + 8;
        if let Some(next_offset) = next_offset {
            if offset >= next_offset as usize {
                break;
            }
        }
    }

    Ok(FrameSource::Single(out))
}
