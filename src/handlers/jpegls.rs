//! Support for JPEG-LS image decoding via CharLS.
//!
//! JPEG-LS capability is never provided by the general-purpose handlers:
//! unless this handler is registered
//! (and the `charls` feature compiled in),
//! JPEG-LS data sets always fail dispatch
//! with an unsupported transfer syntax error.

use crate::dataset::PixelDataSource;
use crate::handlers::{DecodeResult, DecodedFrame, PixelDataHandler};
use crate::photometric::PhotometricInterpretation;
use crate::uids;

/// Pixel data handler for the JPEG-LS transfer syntaxes.
///
/// Not part of the default registry;
/// callers with the `charls` feature enabled
/// may register it explicitly.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JpegLsHandler;

impl JpegLsHandler {
    /// Whether a JPEG-LS codec was compiled into this build.
    pub fn plugin_available() -> bool {
        cfg!(feature = "charls")
    }
}

impl PixelDataHandler for JpegLsHandler {
    fn name(&self) -> &'static str {
        "jpeg-ls"
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
                uids::JPEG_LS_LOSSLESS | uids::JPEG_LS_LOSSY
            )
            && matches!(bits_allocated, 8 | 16)
    }

    #[cfg(feature = "charls")]
    fn decode_frame(&self, src: &dyn PixelDataSource, frame: u32) -> DecodeResult<DecodedFrame> {
        use crate::handlers::{frame_source, FrameSource};
        use charls::CharLS;
        use snafu::prelude::*;
        use std::str::FromStr;

        let frame_data = match frame_source(src, frame)? {
            FrameSource::Single(data) => data,
            FrameSource::Concatenated(_) => {
                whatever!("Cannot split JPEG-LS frames out of a single fragment")
            }
        };

        let data = CharLS::default()
            .decode(&frame_data)
            .map_err(|error| error.to_string())
            .with_whatever_context(|error| error.to_string())?;

        let samples_per_pixel = src.samples_per_pixel().unwrap_or(1);
        let bits_allocated = src.bits_allocated().unwrap_or(8);
        let interpretation = if samples_per_pixel > 1 {
            src.photometric_interpretation()
                .map(|pi| {
                    PhotometricInterpretation::from_str(pi)
                        .unwrap_or(PhotometricInterpretation::Rgb)
                })
                .unwrap_or(PhotometricInterpretation::Rgb)
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

    #[cfg(not(feature = "charls"))]
    fn decode_frame(&self, _src: &dyn PixelDataSource, _frame: u32) -> DecodeResult<DecodedFrame> {
        // `supports` never claims a syntax without the codec,
        // so dispatch cannot reach this point
        snafu::whatever!("JPEG-LS codec is not available in this build")
    }
}
