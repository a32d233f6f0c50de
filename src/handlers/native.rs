//! The pure-numeric fallback handler for uncompressed transfer syntaxes.
//!
//! This handler never claims a compressed syntax,
//! which makes "no decode capability" scenarios deterministic:
//! a registry reduced to this handler alone
//! always reports compressed data sets as unsupported.

use snafu::OptionExt;
use std::str::FromStr;

use crate::dataset::PixelDataSource;
use crate::handlers::{decode_error, frame_count, DecodeResult, DecodedFrame, PixelDataHandler};
use crate::photometric::PhotometricInterpretation;
use crate::uids;

/// Handler for natively stored (uncompressed) pixel data.
///
/// Frames are plain slices of the flat pixel data buffer;
/// big endian sources are byte-swapped into little endian samples.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandler;

impl PixelDataHandler for NativeHandler {
    fn name(&self) -> &'static str {
        "native"
    }

    fn supports(
        &self,
        transfer_syntax: &str,
        _photometric_interpretation: &PhotometricInterpretation,
        bits_allocated: u16,
    ) -> bool {
        uids::is_native(transfer_syntax) && matches!(bits_allocated, 8 | 16)
    }

    fn decode_frame(&self, src: &dyn PixelDataSource, frame: u32) -> DecodeResult<DecodedFrame> {
        let rows = src
            .rows()
            .context(decode_error::MissingAttributeSnafu { name: "Rows" })?;
        let cols = src
            .cols()
            .context(decode_error::MissingAttributeSnafu { name: "Columns" })?;
        let samples_per_pixel =
            src.samples_per_pixel()
                .context(decode_error::MissingAttributeSnafu {
                    name: "SamplesPerPixel",
                })?;
        let bits_allocated = src
            .bits_allocated()
            .context(decode_error::MissingAttributeSnafu {
                name: "BitsAllocated",
            })?;

        let nr_frames = frame_count(src) as usize;
        snafu::ensure!(
            (frame as usize) < nr_frames,
            decode_error::FrameRangeOutOfBoundsSnafu
        );

        let bytes_per_sample = (bits_allocated / 8).max(1) as usize;
        let frame_size =
            rows as usize * cols as usize * samples_per_pixel as usize * bytes_per_sample;

        // native pixel data is a single flat buffer in fragment 0
        let buffer = src
            .fragment(0)
            .context(decode_error::MissingAttributeSnafu { name: "PixelData" })?;

        let mut data = buffer
            .get(frame_size * frame as usize..frame_size * (frame as usize + 1))
            .with_whatever_context(|| {
                format!(
                    "Native frame {} out of bounds ({} bytes available)",
                    frame,
                    buffer.len()
                )
            })?
            .to_vec();

        // when the parser left the byte order unresolved,
        // fall back to what the transfer syntax itself implies
        let big_endian = src
            .is_little_endian()
            .map(|le| !le)
            .unwrap_or_else(|| uids::is_big_endian(src.transfer_syntax_uid()));
        if bytes_per_sample == 2 && big_endian {
            for pair in data.chunks_exact_mut(2) {
                pair.swap(0, 1);
            }
        }

        let interpretation = src
            .photometric_interpretation()
            .map(|pi| {
                PhotometricInterpretation::from_str(pi)
                    .unwrap_or(PhotometricInterpretation::Monochrome2)
            })
            .unwrap_or(PhotometricInterpretation::Monochrome2);

        Ok(DecodedFrame {
            data,
            bits_per_sample: bits_allocated,
            interpretation,
            planar: src.planar_configuration().unwrap_or(0) == 1 && samples_per_pixel > 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::InMemSource;
    use crate::handlers::DecodeError;

    fn grayscale_16bit(bytes: Vec<u8>, little_endian: bool) -> InMemSource {
        InMemSource {
            transfer_syntax_uid: if little_endian {
                uids::EXPLICIT_VR_LITTLE_ENDIAN.to_string()
            } else {
                uids::EXPLICIT_VR_BIG_ENDIAN.to_string()
            },
            is_little_endian: Some(little_endian),
            rows: Some(1),
            cols: Some(2),
            bits_allocated: Some(16),
            pixel_data: Some(vec![bytes]),
            ..InMemSource::default()
        }
    }

    #[test]
    fn claims_only_native_syntaxes() {
        let pi = PhotometricInterpretation::Monochrome2;
        assert!(NativeHandler.supports(uids::IMPLICIT_VR_LITTLE_ENDIAN, &pi, 8));
        assert!(NativeHandler.supports(uids::EXPLICIT_VR_BIG_ENDIAN, &pi, 16));
        assert!(!NativeHandler.supports(uids::JPEG_BASELINE, &pi, 8));
        assert!(!NativeHandler.supports(uids::JPEG_LS_LOSSLESS, &pi, 8));
        assert!(!NativeHandler.supports(uids::JPEG_2000, &pi, 16));
    }

    #[test]
    fn slices_frames_from_flat_buffer() {
        let src = InMemSource {
            rows: Some(1),
            cols: Some(2),
            number_of_frames: Some(2),
            pixel_data: Some(vec![vec![1, 2, 3, 4]]),
            ..InMemSource::default()
        };
        let frame = NativeHandler.decode_frame(&src, 1).unwrap();
        assert_eq!(frame.data, vec![3, 4]);
        assert_eq!(frame.bits_per_sample, 8);
        assert!(!frame.planar);
    }

    #[test]
    fn swaps_big_endian_words() {
        let le = NativeHandler
            .decode_frame(&grayscale_16bit(vec![0x34, 0x12, 0x78, 0x56], true), 0)
            .unwrap();
        let be = NativeHandler
            .decode_frame(&grayscale_16bit(vec![0x12, 0x34, 0x56, 0x78], false), 0)
            .unwrap();
        assert_eq!(le.data, be.data);
    }

    #[test]
    fn byte_order_falls_back_to_transfer_syntax() {
        let mut unresolved = grayscale_16bit(vec![0x12, 0x34, 0x56, 0x78], false);
        unresolved.is_little_endian = None;
        let from_uid = NativeHandler.decode_frame(&unresolved, 0).unwrap();
        let from_flag = NativeHandler
            .decode_frame(&grayscale_16bit(vec![0x12, 0x34, 0x56, 0x78], false), 0)
            .unwrap();
        assert_eq!(from_uid.data, from_flag.data);
    }

    #[test]
    fn short_buffer_is_a_decode_failure() {
        let src = InMemSource {
            rows: Some(2),
            cols: Some(2),
            pixel_data: Some(vec![vec![0; 3]]),
            ..InMemSource::default()
        };
        assert!(matches!(
            NativeHandler.decode_frame(&src, 0),
            Err(DecodeError::Custom { .. })
        ));
    }
}
