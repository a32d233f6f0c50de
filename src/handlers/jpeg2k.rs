//! Support for JPEG 2000 image decoding.
//!
//! The actual wavelet codec is provided by [OpenJPEG]
//! behind the optional `openjp2` (Rust port)
//! or `openjpeg-sys` (static bindings) features.
//! Whether the codec is compiled in is a static property:
//! [`Jpeg2000Handler::plugin_available`] answers it directly
//! and [`supports`](crate::handlers::PixelDataHandler::supports)
//! simply declines JPEG 2000 syntaxes when the plugin is absent,
//! so dispatch falls through to other handlers
//! instead of failing at decode time.
//!
//! [OpenJPEG]: https://github.com/uclouvain/openjpeg

use crate::handlers::{DecodeResult, DecodedFrame, PixelDataHandler};
use crate::dataset::PixelDataSource;
use crate::photometric::PhotometricInterpretation;
use crate::uids;

// Check jpeg2k backend conflicts
#[cfg(all(feature = "openjp2", feature = "openjpeg-sys"))]
compile_error!(
    "feature \"openjp2\" and feature \"openjpeg-sys\" cannot be enabled at the same time"
);

/// Pixel data handler for transfer syntaxes based on JPEG 2000.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Jpeg2000Handler;

impl Jpeg2000Handler {
    /// Whether a JPEG 2000 codec was compiled into this build.
    pub fn plugin_available() -> bool {
        cfg!(any(feature = "openjp2", feature = "openjpeg-sys"))
    }
}

impl PixelDataHandler for Jpeg2000Handler {
    fn name(&self) -> &'static str {
        "jpeg2000"
    }

    fn supports(
        &self,
        transfer_syntax: &str,
        _photometric_interpretation: &PhotometricInterpretation,
        bits_allocated: u16,
    ) -> bool {
        Self::plugin_available()
            && matches!(
                uids::trim_uid(transfer_syntax),
                uids::JPEG_2000_LOSSLESS | uids::JPEG_2000
            )
            && matches!(bits_allocated, 8 | 16)
    }

    #[cfg(any(feature = "openjp2", feature = "openjpeg-sys"))]
    fn decode_frame(&self, src: &dyn PixelDataSource, frame: u32) -> DecodeResult<DecodedFrame> {
        use crate::handlers::{decode_error, frame_source, FrameSource};
        use jpeg2k::Image;
        use snafu::prelude::*;
        use tracing::warn;

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

        let frame_data = match frame_source(src, frame)? {
            FrameSource::Single(data) => data,
            FrameSource::Concatenated(_) => {
                whatever!("Cannot split JPEG 2000 frames out of a single fragment")
            }
        };

        let image = Image::from_bytes(&frame_data).whatever_context("jpeg2k decoder failure")?;

        let bytes_per_sample = (bits_allocated / 8).max(1) as usize;
        let components = image.components();
        if components.len() > samples_per_pixel as usize {
            warn!(
                "JPEG 2000 image has more components than expected ({} > {})",
                components.len(),
                samples_per_pixel
            );
        }
        let planes: Vec<&[i32]> = components.iter().map(|c| c.data()).collect();
        let data = interleave_components(&planes, samples_per_pixel as usize, bytes_per_sample);

        let interpretation = if samples_per_pixel > 1 {
            // the codec undoes any reversible/irreversible color transform
            PhotometricInterpretation::Rgb
        } else {
            PhotometricInterpretation::Monochrome2
        };

        Ok(DecodedFrame {
            data,
            bits_per_sample: bits_allocated,
            interpretation,
            planar: false,
        })
    }

    #[cfg(not(any(feature = "openjp2", feature = "openjpeg-sys")))]
    fn decode_frame(&self, _src: &dyn PixelDataSource, _frame: u32) -> DecodeResult<DecodedFrame> {
        // `supports` never claims a syntax without the plugin,
        // so dispatch cannot reach this point
        snafu::whatever!("JPEG 2000 codec is not available in this build")
    }
}

/// Interleave decoded component planes into standard sample layout,
/// truncating each sample to the effective storage size in little endian.
///
/// Excess component planes are ignored.
#[cfg_attr(
    not(any(feature = "openjp2", feature = "openjpeg-sys")),
    allow(dead_code)
)]
fn interleave_components(
    components: &[&[i32]],
    samples_per_pixel: usize,
    bytes_per_sample: usize,
) -> Vec<u8> {
    let samples_per_component = components.first().map(|c| c.len()).unwrap_or(0);
    let mut data = vec![0u8; samples_per_component * samples_per_pixel * bytes_per_sample];

    for (component_i, component) in components.iter().take(samples_per_pixel).enumerate() {
        for (i, sample) in component.iter().enumerate() {
            let offset = (i * samples_per_pixel + component_i) * bytes_per_sample;
            data[offset..offset + bytes_per_sample]
                .copy_from_slice(&sample.to_le_bytes()[..bytes_per_sample]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_follows_plugin_presence() {
        let pi = PhotometricInterpretation::Monochrome2;
        let claims_j2k = Jpeg2000Handler.supports(uids::JPEG_2000_LOSSLESS, &pi, 16)
            && Jpeg2000Handler.supports(uids::JPEG_2000, &pi, 8);
        assert_eq!(claims_j2k, Jpeg2000Handler::plugin_available());

        // other syntaxes are never claimed, plugin or not
        assert!(!Jpeg2000Handler.supports(uids::JPEG_BASELINE, &pi, 8));
        assert!(!Jpeg2000Handler.supports(uids::EXPLICIT_VR_LITTLE_ENDIAN, &pi, 8));
    }

    #[test]
    fn interleaves_a_single_component_into_words() {
        let out = interleave_components(&[&[1, 2, 300]], 1, 2);
        assert_eq!(out, vec![1, 0, 2, 0, 44, 1]);
    }

    #[test]
    fn interleaves_three_components_per_pixel() {
        let out = interleave_components(&[&[1, 2], &[3, 4], &[5, 6]], 3, 1);
        assert_eq!(out, vec![1, 3, 5, 2, 4, 6]);
    }

    #[test]
    fn excess_components_are_ignored() {
        let out = interleave_components(&[&[9, 9], &[7, 7]], 1, 1);
        assert_eq!(out, vec![9, 9]);
    }
}
