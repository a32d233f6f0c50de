//! The data set abstraction consumed by the decoding pipeline.
//!
//! Parsing of the DICOM container is out of the scope of this crate:
//! callers supply a read-only view over an already parsed data set
//! through the [`PixelDataSource`] trait,
//! exposing the image metadata attributes and the raw pixel data bytes
//! (a flat buffer for native transfer syntaxes,
//! or encapsulated fragments plus a basic offset table otherwise).
//!
//! [`InMemSource`] is a plain in-memory implementation,
//! suitable for embedding callers and for tests.

use std::borrow::Cow;

/// Raw pixel data bytes as stored in a data set.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPixelData {
    /// Either a single element with the full flat buffer
    /// if the pixel data is native,
    /// or the encapsulated byte fragments.
    pub fragments: Vec<Vec<u8>>,

    /// The basic offset table for the fragments,
    /// or empty if there is none.
    pub offset_table: Vec<u32>,
}

/// A read-only view over a parsed DICOM data set,
/// carrying everything the pixel data pipeline needs.
///
/// Attribute getters return `None` when the attribute
/// is absent from the data set;
/// it is up to the pipeline to decide which ones are required.
pub trait PixelDataSource {
    /// The transfer syntax UID of the data set,
    /// possibly with trailing null padding.
    fn transfer_syntax_uid(&self) -> &str;

    /// Whether the data set is encoded in little endian byte order.
    ///
    /// `None` means that the byte order could not be determined
    /// at parsing time; decoding refuses to proceed in that case.
    fn is_little_endian(&self) -> Option<bool>;

    /// The _Rows_ attribute
    fn rows(&self) -> Option<u16>;

    /// The _Columns_ attribute
    fn cols(&self) -> Option<u16>;

    /// The _Samples Per Pixel_ attribute
    fn samples_per_pixel(&self) -> Option<u16>;

    /// The _Bits Allocated_ attribute
    fn bits_allocated(&self) -> Option<u16>;

    /// The _Bits Stored_ attribute
    fn bits_stored(&self) -> Option<u16>;

    /// The _Pixel Representation_ attribute
    /// (0 for unsigned, 1 for signed samples)
    fn pixel_representation(&self) -> Option<u16>;

    /// The _Photometric Interpretation_ attribute keyword
    fn photometric_interpretation(&self) -> Option<&str>;

    /// The _Planar Configuration_ attribute
    /// (0 for interleaved, 1 for planar sample layout)
    fn planar_configuration(&self) -> Option<u16>;

    /// The _Number of Frames_ attribute,
    /// or `None` if the attribute is absent
    /// (in which case a single frame is implied)
    fn number_of_frames(&self) -> Option<u32>;

    /// The raw pixel data bytes,
    /// or `None` if the data set has no pixel data
    fn raw_pixel_data(&self) -> Option<RawPixelData>;

    /// A single encapsulated fragment by index,
    /// where 0 is the first fragment after the basic offset table.
    ///
    /// For native pixel data, fragment 0 is the whole buffer.
    fn fragment(&self, index: usize) -> Option<Cow<'_, [u8]>>;

    /// The number of encapsulated fragments
    /// (1 for native pixel data).
    fn number_of_fragments(&self) -> Option<u32>;
}

/// An in-memory pixel data source.
///
/// Construct one via struct update syntax over [`Default`]:
///
/// ```
/// use dicom_pixel_handlers::{InMemSource, uids};
///
/// let src = InMemSource {
///     transfer_syntax_uid: uids::EXPLICIT_VR_LITTLE_ENDIAN.to_string(),
///     rows: Some(2),
///     cols: Some(2),
///     pixel_data: Some(vec![vec![0, 1, 2, 3]]),
///     ..InMemSource::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct InMemSource {
    pub transfer_syntax_uid: String,
    pub is_little_endian: Option<bool>,
    pub rows: Option<u16>,
    pub cols: Option<u16>,
    pub samples_per_pixel: Option<u16>,
    pub bits_allocated: Option<u16>,
    pub bits_stored: Option<u16>,
    pub pixel_representation: Option<u16>,
    pub photometric_interpretation: Option<String>,
    pub planar_configuration: Option<u16>,
    pub number_of_frames: Option<u32>,
    /// fragments of pixel data
    /// (exactly one element for native pixel data)
    pub pixel_data: Option<Vec<Vec<u8>>>,
    pub offset_table: Vec<u32>,
}

impl Default for InMemSource {
    fn default() -> Self {
        InMemSource {
            transfer_syntax_uid: crate::uids::EXPLICIT_VR_LITTLE_ENDIAN.to_string(),
            is_little_endian: Some(true),
            rows: None,
            cols: None,
            samples_per_pixel: Some(1),
            bits_allocated: Some(8),
            bits_stored: None,
            pixel_representation: Some(0),
            photometric_interpretation: Some("MONOCHROME2".to_string()),
            planar_configuration: None,
            number_of_frames: None,
            pixel_data: None,
            offset_table: Vec::new(),
        }
    }
}

impl PixelDataSource for InMemSource {
    fn transfer_syntax_uid(&self) -> &str {
        &self.transfer_syntax_uid
    }

    fn is_little_endian(&self) -> Option<bool> {
        self.is_little_endian
    }

    fn rows(&self) -> Option<u16> {
        self.rows
    }

    fn cols(&self) -> Option<u16> {
        self.cols
    }

    fn samples_per_pixel(&self) -> Option<u16> {
        self.samples_per_pixel
    }

    fn bits_allocated(&self) -> Option<u16> {
        self.bits_allocated
    }

    fn bits_stored(&self) -> Option<u16> {
        self.bits_stored
    }

    fn pixel_representation(&self) -> Option<u16> {
        self.pixel_representation
    }

    fn photometric_interpretation(&self) -> Option<&str> {
        self.photometric_interpretation.as_deref()
    }

    fn planar_configuration(&self) -> Option<u16> {
        self.planar_configuration
    }

    fn number_of_frames(&self) -> Option<u32> {
        self.number_of_frames
    }

    fn raw_pixel_data(&self) -> Option<RawPixelData> {
        self.pixel_data.as_ref().map(|fragments| RawPixelData {
            fragments: fragments.clone(),
            offset_table: self.offset_table.clone(),
        })
    }

    fn fragment(&self, index: usize) -> Option<Cow<'_, [u8]>> {
        self.pixel_data
            .as_ref()
            .and_then(|f| f.get(index))
            .map(|f| Cow::Borrowed(f.as_slice()))
    }

    fn number_of_fragments(&self) -> Option<u32> {
        self.pixel_data.as_ref().map(|f| f.len() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uids;

    #[test]
    fn defaults_imply_single_frame_grayscale() {
        let src = InMemSource::default();
        assert_eq!(src.transfer_syntax_uid(), uids::EXPLICIT_VR_LITTLE_ENDIAN);
        assert_eq!(src.is_little_endian(), Some(true));
        assert_eq!(src.samples_per_pixel(), Some(1));
        assert_eq!(src.number_of_frames(), None);
        assert!(src.raw_pixel_data().is_none());
    }

    #[test]
    fn fragment_access() {
        let src = InMemSource {
            pixel_data: Some(vec![vec![1, 2], vec![3, 4]]),
            ..InMemSource::default()
        };
        assert_eq!(src.number_of_fragments(), Some(2));
        assert_eq!(&*src.fragment(1).unwrap(), &[3, 4][..]);
        assert!(src.fragment(2).is_none());
    }
}
