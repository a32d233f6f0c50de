//! This crate contains the DICOM pixel data handlers
//! and the dispatch pipeline which drives them:
//! given a parsed data set whose pixel payload is stored
//! in one of several transfer syntaxes
//! (native, JPEG baseline, JPEG lossless, JPEG-LS, JPEG 2000),
//! it selects a capable decoding backend from an ordered
//! [handler registry](crate::registry),
//! decompresses every frame
//! and normalizes the result into a flat sample buffer
//! matching the declared geometry and color model,
//! which can then be viewed as an [`ndarray`] of the native sample type.
//!
//! Parsing of the DICOM container is out of scope:
//! data sets are consumed through the read-only
//! [`PixelDataSource`] trait.
//!
//! # Examples
//!
//! ```no_run
//! # use std::error::Error;
//! use dicom_pixel_handlers::{InMemSource, PixelDecoder};
//!
//! # fn main() -> Result<(), Box<dyn Error>> {
//! # let dataset: InMemSource = unimplemented!();
//! let decoded = dataset.decode_pixel_data()?;
//! let array = decoded.to_ndarray::<u16>()?;
//! println!("{:?}", array.shape());
//! #   Ok(())
//! # }
//! ```
//!
//! Handlers are consulted in registry order and the first one
//! claiming support wins;
//! see [`registry`] for installing or removing backends.

use byteorder::{ByteOrder, LittleEndian};
use ndarray::{Array, IxDyn};
use num_traits::NumCast;
use snafu::{ensure, OptionExt, ResultExt};
use tracing::{debug, warn};

pub mod dataset;
pub mod error;
pub mod handlers;
pub mod photometric;
pub mod registry;
pub mod uids;

mod normalize;

pub use crate::dataset::{InMemSource, PixelDataSource, RawPixelData};
pub use crate::error::{Error, Result};
pub use crate::handlers::{DecodeError, DecodedFrame, PixelDataHandler};
pub use crate::photometric::PhotometricInterpretation;
pub use crate::registry::{get_registry, set_registry, HandlerRegistry, RegistryGuard};

use crate::error::{
    AmbiguousEndiannessSnafu, BuildArraySnafu, DecodeFrameSnafu, InvalidDataTypeSnafu,
    InvalidPixelRepresentationSnafu, MissingAttributeSnafu, UnsupportedTransferSyntaxSnafu,
};
use crate::normalize::{normalize_frames, ImageGeometry};

/// An interpreted representation of the DICOM
/// _Pixel Representation_ attribute.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum PixelRepresentation {
    /// unsigned pixel data sample values
    Unsigned,
    /// signed pixel data sample values
    Signed,
}

/// Decoded pixel data:
/// a flat little endian sample buffer
/// plus the geometry and color model it satisfies.
///
/// The byte count is guaranteed to equal
/// `frames * rows * columns * samples * bytes_per_sample` exactly;
/// decoding fails rather than producing a buffer
/// which contradicts the declared dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPixelData {
    data: Vec<u8>,
    rows: u16,
    cols: u16,
    samples_per_pixel: u16,
    number_of_frames: u32,
    photometric_interpretation: PhotometricInterpretation,
    bits_allocated: u16,
    pixel_representation: PixelRepresentation,
}

impl DecodedPixelData {
    /// The raw decoded samples in little endian byte order.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The number of rows in each frame.
    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// The number of columns in each frame.
    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// The number of samples per pixel.
    pub fn samples_per_pixel(&self) -> u16 {
        self.samples_per_pixel
    }

    /// The number of decoded frames.
    pub fn number_of_frames(&self) -> u32 {
        self.number_of_frames
    }

    /// The color model of the decoded samples,
    /// after any normalization applied by the pipeline.
    pub fn photometric_interpretation(&self) -> &PhotometricInterpretation {
        &self.photometric_interpretation
    }

    /// The effective storage size of each sample in bits (8 or 16).
    pub fn bits_allocated(&self) -> u16 {
        self.bits_allocated
    }

    /// Whether the samples are signed or unsigned.
    pub fn pixel_representation(&self) -> PixelRepresentation {
        self.pixel_representation
    }

    /// The total number of bytes of the decoded samples.
    pub fn nbytes(&self) -> usize {
        self.data.len()
    }

    /// The shape of the multi-dimensional array over these samples:
    /// `[frames, rows, columns, samples]`,
    /// with the frame dimension squeezed out for single-frame images
    /// and the sample dimension squeezed out for single-sample pixels.
    pub fn shape(&self) -> Vec<usize> {
        let mut shape = Vec::with_capacity(4);
        if self.number_of_frames > 1 {
            shape.push(self.number_of_frames as usize);
        }
        shape.push(self.rows as usize);
        shape.push(self.cols as usize);
        if self.samples_per_pixel > 1 {
            shape.push(self.samples_per_pixel as usize);
        }
        shape
    }

    /// Convert the decoded pixel data into an ndarray of a given type `T`.
    ///
    /// The native sample type is determined by the effective
    /// bits allocated and pixel representation,
    /// and every sample is converted to the requested type,
    /// failing if any value does not fit.
    pub fn to_ndarray<T>(&self) -> Result<Array<T, IxDyn>>
    where
        T: NumCast,
    {
        let shape = IxDyn(&self.shape());

        let converted: Result<Vec<T>> = match (self.bits_allocated, self.pixel_representation) {
            (8, PixelRepresentation::Unsigned) => self
                .data
                .iter()
                .map(|v| T::from(*v).context(InvalidDataTypeSnafu))
                .collect(),
            (8, PixelRepresentation::Signed) => self
                .data
                .iter()
                .map(|v| T::from(*v as i8).context(InvalidDataTypeSnafu))
                .collect(),
            (16, PixelRepresentation::Unsigned) => {
                let mut buffer = vec![0_u16; self.data.len() / 2];
                LittleEndian::read_u16_into(&self.data, &mut buffer);
                buffer
                    .into_iter()
                    .map(|v| T::from(v).context(InvalidDataTypeSnafu))
                    .collect()
            }
            (16, PixelRepresentation::Signed) => {
                let mut buffer = vec![0_i16; self.data.len() / 2];
                LittleEndian::read_i16_into(&self.data, &mut buffer);
                buffer
                    .into_iter()
                    .map(|v| T::from(v).context(InvalidDataTypeSnafu))
                    .collect()
            }
            (bits, _) => crate::error::UnsupportedPrecisionSnafu { bits }.fail(),
        };

        Array::from_shape_vec(shape, converted?).context(BuildArraySnafu)
    }
}

/// Decode the pixel data of the given data set
/// using the process-wide handler registry.
///
/// The registry is re-resolved and the data re-decoded on every call;
/// results are not cached across registry changes.
pub fn decode_pixel_data(src: &dyn PixelDataSource) -> Result<DecodedPixelData> {
    decode_pixel_data_with(src, &registry::get_registry())
}

/// Decode the pixel data of the given data set
/// using an explicit handler registry.
///
/// Handlers are consulted in registry order;
/// the first one claiming support for the data set's
/// transfer syntax and sample configuration decodes all frames.
/// Neither the data set nor the registry is mutated.
pub fn decode_pixel_data_with(
    src: &dyn PixelDataSource,
    registry: &HandlerRegistry,
) -> Result<DecodedPixelData> {
    // byte order is structural, not a decode concern:
    // refuse before consulting any handler
    ensure!(src.is_little_endian().is_some(), AmbiguousEndiannessSnafu);

    let transfer_syntax = uids::trim_uid(src.transfer_syntax_uid());
    let photometric_interpretation: PhotometricInterpretation = src
        .photometric_interpretation()
        .context(MissingAttributeSnafu {
            name: "PhotometricInterpretation",
        })?
        .into();
    let bits_allocated = src.bits_allocated().context(MissingAttributeSnafu {
        name: "BitsAllocated",
    })?;

    let handler = registry
        .select(transfer_syntax, &photometric_interpretation, bits_allocated)
        .context(UnsupportedTransferSyntaxSnafu {
            ts: transfer_syntax,
        })?;
    debug!(
        "selected pixel data handler `{}` for transfer syntax {}",
        handler.name(),
        transfer_syntax
    );

    let rows = src.rows().context(MissingAttributeSnafu { name: "Rows" })?;
    let cols = src.cols().context(MissingAttributeSnafu { name: "Columns" })?;
    let samples_per_pixel = src.samples_per_pixel().context(MissingAttributeSnafu {
        name: "SamplesPerPixel",
    })?;
    let number_of_frames = match src.number_of_frames() {
        Some(0) => {
            warn!("A value of 0 for NumberOfFrames is non-conformant, assuming 1 frame");
            1
        }
        Some(n) => n,
        None => 1,
    };
    let pixel_representation = match src.pixel_representation().unwrap_or(0) {
        0 => PixelRepresentation::Unsigned,
        1 => PixelRepresentation::Signed,
        _ => return InvalidPixelRepresentationSnafu.fail(),
    };

    let mut frames = Vec::with_capacity(number_of_frames as usize);
    for frame in 0..number_of_frames {
        let decoded = handler
            .decode_frame(src, frame)
            .context(DecodeFrameSnafu { frame })?;
        frames.push(decoded);
    }

    normalize_frames(
        frames,
        ImageGeometry {
            rows,
            cols,
            samples_per_pixel,
            number_of_frames,
            photometric_interpretation,
            pixel_representation,
        },
    )
}

/// Trait for objects which can decode their own pixel data.
///
/// Implemented for every [`PixelDataSource`].
pub trait PixelDecoder {
    /// Decode this object's pixel data
    /// using the process-wide handler registry.
    fn decode_pixel_data(&self) -> Result<DecodedPixelData>;

    /// Decode this object's pixel data
    /// using an explicit handler registry.
    fn decode_pixel_data_with(&self, registry: &HandlerRegistry) -> Result<DecodedPixelData>;
}

impl<T> PixelDecoder for T
where
    T: PixelDataSource,
{
    fn decode_pixel_data(&self) -> Result<DecodedPixelData> {
        decode_pixel_data(self)
    }

    fn decode_pixel_data_with(&self, registry: &HandlerRegistry) -> Result<DecodedPixelData> {
        decode_pixel_data_with(self, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_source(data: Vec<u8>) -> InMemSource {
        InMemSource {
            rows: Some(2),
            cols: Some(2),
            pixel_data: Some(vec![data]),
            ..InMemSource::default()
        }
    }

    #[test]
    fn native_decode_end_to_end() {
        let src = gray_source(vec![10, 20, 30, 40]);
        let decoded = decode_pixel_data_with(&src, &HandlerRegistry::fallback_only()).unwrap();
        assert_eq!(decoded.shape(), vec![2, 2]);
        assert_eq!(decoded.nbytes(), 4);
        assert_eq!(decoded.data(), &[10, 20, 30, 40]);
    }

    #[test]
    fn to_ndarray_unsigned_byte() {
        let src = gray_source(vec![10, 20, 30, 40]);
        let decoded = decode_pixel_data_with(&src, &HandlerRegistry::fallback_only()).unwrap();
        let array = decoded.to_ndarray::<u8>().unwrap();
        assert_eq!(array.shape(), &[2, 2]);
        assert_eq!(array[[1, 0]], 30);
    }

    #[test]
    fn to_ndarray_signed_word() {
        let src = InMemSource {
            rows: Some(1),
            cols: Some(2),
            bits_allocated: Some(16),
            pixel_representation: Some(1),
            // -3 and 257 in little endian
            pixel_data: Some(vec![vec![0xFD, 0xFF, 0x01, 0x01]]),
            ..InMemSource::default()
        };
        let decoded = decode_pixel_data_with(&src, &HandlerRegistry::fallback_only()).unwrap();
        let array = decoded.to_ndarray::<i16>().unwrap();
        assert_eq!(array.shape(), &[1, 2]);
        assert_eq!(array[[0, 0]], -3);
        assert_eq!(array[[0, 1]], 257);
    }

    #[test]
    fn to_ndarray_narrowing_fails() {
        let src = InMemSource {
            rows: Some(1),
            cols: Some(1),
            bits_allocated: Some(16),
            pixel_data: Some(vec![vec![0xFF, 0xFF]]),
            ..InMemSource::default()
        };
        let decoded = decode_pixel_data_with(&src, &HandlerRegistry::fallback_only()).unwrap();
        assert!(matches!(
            decoded.to_ndarray::<u8>(),
            Err(Error::InvalidDataType)
        ));
    }

    #[test]
    fn shape_squeezes_singleton_dimensions() {
        let decoded = DecodedPixelData {
            data: vec![0; 12],
            rows: 2,
            cols: 2,
            samples_per_pixel: 3,
            number_of_frames: 1,
            photometric_interpretation: PhotometricInterpretation::Rgb,
            bits_allocated: 8,
            pixel_representation: PixelRepresentation::Unsigned,
        };
        assert_eq!(decoded.shape(), vec![2, 2, 3]);

        let decoded = DecodedPixelData {
            number_of_frames: 2,
            data: vec![0; 24],
            ..decoded
        };
        assert_eq!(decoded.shape(), vec![2, 2, 2, 3]);
    }
}
