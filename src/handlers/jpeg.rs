//! Support for JPEG image decoding,
//! covering the baseline sequential (Process 1)
//! and lossless Huffman (Process 14) transfer syntaxes.
//!
//! Decoding is done in pure Rust through `jpeg-decoder`.
//! Arithmetic-coded lossless streams are not implemented by the backend
//! and surface as a decode-time failure rather than a dispatch miss,
//! since the transfer syntax itself is claimed as supported.
//!
//! Known limitation: for lossy streams with non-default
//! chroma subsampling variants the backend's YCbCr upsampling
//! may not match a reference decoder sample-for-sample.

use jpeg_decoder::{Decoder, PixelFormat};
use snafu::prelude::*;
use std::io::Cursor;

use crate::dataset::PixelDataSource;
use crate::handlers::{
    frame_source, DecodeResult, DecodedFrame, FrameSource, PixelDataHandler,
};
use crate::photometric::PhotometricInterpretation;
use crate::uids;

/// Pixel data handler for the JPEG family of transfer syntaxes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JpegHandler;

impl PixelDataHandler for JpegHandler {
    fn name(&self) -> &'static str {
        "jpeg"
    }

    fn supports(
        &self,
        transfer_syntax: &str,
        _photometric_interpretation: &PhotometricInterpretation,
        bits_allocated: u16,
    ) -> bool {
        match uids::trim_uid(transfer_syntax) {
            // baseline is 8-bit sequential DCT only
            uids::JPEG_BASELINE | uids::JPEG_EXTENDED => bits_allocated == 8,
            uids::JPEG_LOSSLESS | uids::JPEG_LOSSLESS_SV1 => matches!(bits_allocated, 8 | 16),
            _ => false,
        }
    }

    fn decode_frame(&self, src: &dyn PixelDataSource, frame: u32) -> DecodeResult<DecodedFrame> {
        match frame_source(src, frame)? {
            FrameSource::Single(data) => {
                let mut cursor = Cursor::new(data.as_slice());
                decode_codestream(&mut cursor, frame)
            }
            FrameSource::Concatenated(data) => {
                // several codestreams share one fragment:
                // walk past the preceding frames' streams
                let len = data.len() as u64;
                let mut cursor = Cursor::new(data.as_slice());
                for i in 0..frame {
                    decode_codestream(&mut cursor, i)?;
                    skip_fragment_padding(&mut cursor, len);
                }
                decode_codestream(&mut cursor, frame)
            }
        }
    }
}

/// Decode a single JPEG codestream starting at the cursor position,
/// leaving the cursor just past the consumed bytes.
fn decode_codestream(
    cursor: &mut Cursor<&[u8]>,
    frame: u32,
) -> DecodeResult<DecodedFrame> {
    let mut decoder = Decoder::new(cursor);
    let mut data = decoder
        .decode()
        .map_err(|e| Box::new(e) as Box<_>)
        .with_whatever_context(|_| format!("JPEG decoding failure on frame {}", frame))?;

    let info = decoder
        .info()
        .whatever_context("JPEG decoder reported no image info")?;

    let (bits_per_sample, interpretation) = match info.pixel_format {
        PixelFormat::L8 => (8, PhotometricInterpretation::Monochrome2),
        PixelFormat::L16 => {
            // jpeg-decoder emits 16-bit samples in big endian
            for pair in data.chunks_exact_mut(2) {
                pair.swap(0, 1);
            }
            (16, PhotometricInterpretation::Monochrome2)
        }
        // color output is always converted to RGB by the backend
        PixelFormat::RGB24 => (8, PhotometricInterpretation::Rgb),
        other => whatever!("Unsupported JPEG pixel format {:?}", other),
    };

    Ok(DecodedFrame {
        data,
        bits_per_sample,
        interpretation,
        planar: false,
    })
}

/// Position the cursor at the start of the next codestream.
///
/// Fragments should have even length
/// and some implementations pad odd-sized codestreams with one byte;
/// looking for the SOI marker distinguishes padding from data.
fn skip_fragment_padding(cursor: &mut Cursor<&[u8]>, len: u64) {
    let position = cursor.position();
    if position >= len || position % 2 == 0 {
        return;
    }
    let buf = cursor.get_ref();
    let next = (
        buf.get(position as usize + 1).copied(),
        buf.get(position as usize + 2).copied(),
    );
    if let (Some(0xFF), Some(0xD8)) = next {
        cursor.set_position(position + 1);
    }
}
