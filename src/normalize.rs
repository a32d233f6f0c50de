//! Geometry and color normalization of decoded frames.
//!
//! Backends hand over one flat sample buffer per frame,
//! in whatever order and color model their codec produces.
//! This module reconciles that output with the data set's declared
//! geometry and photometric interpretation:
//! planar layouts are interleaved,
//! YBR-family samples are converted to RGB
//! when the backend did not already do so,
//! and the total byte count is checked exactly against
//! `frames * rows * columns * samples * bytes_per_sample`.
//! A mismatch is a contradiction between declared metadata
//! and decoded data and always fails.

use snafu::ensure;
use tracing::warn;

use crate::error::{
    GeometryMismatchSnafu, InconsistentFramesSnafu, Result, UnsupportedPrecisionSnafu,
};
use crate::handlers::DecodedFrame;
use crate::photometric::PhotometricInterpretation;
use crate::{DecodedPixelData, PixelRepresentation};

/// The declared image geometry, as read from the data set.
#[derive(Debug, Clone)]
pub(crate) struct ImageGeometry {
    pub rows: u16,
    pub cols: u16,
    pub samples_per_pixel: u16,
    pub number_of_frames: u32,
    pub photometric_interpretation: PhotometricInterpretation,
    pub pixel_representation: PixelRepresentation,
}

/// Merge decoded frames into a single contiguous pixel buffer
/// matching the declared geometry.
pub(crate) fn normalize_frames(
    frames: Vec<DecodedFrame>,
    geometry: ImageGeometry,
) -> Result<DecodedPixelData> {
    ensure!(!frames.is_empty(), InconsistentFramesSnafu);

    let bits_per_sample = frames[0].bits_per_sample;
    let intrinsic = frames[0].interpretation.clone();
    ensure!(
        frames
            .iter()
            .all(|f| f.bits_per_sample == bits_per_sample && f.interpretation == intrinsic),
        InconsistentFramesSnafu
    );

    // effective storage size: samples are kept in whole bytes
    let bits_allocated = match bits_per_sample {
        1..=8 => 8,
        9..=16 => 16,
        bits => return UnsupportedPrecisionSnafu { bits }.fail(),
    };
    let bytes_per_sample = bits_allocated / 8;

    let mut data = Vec::with_capacity(frames.iter().map(|f| f.data.len()).sum());
    for frame in &frames {
        if frame.planar && geometry.samples_per_pixel > 1 {
            data.extend_from_slice(&interleave_planes(
                &frame.data,
                geometry.samples_per_pixel as usize,
                bytes_per_sample as usize,
            ));
        } else {
            data.extend_from_slice(&frame.data);
        }
    }

    // the output color model: backends which emit YBR samples
    // for a data set declaring a different full-color model
    // still owe the caller the declared-equivalent RGB samples
    let photometric_interpretation = if intrinsic.is_ybr()
        && geometry.photometric_interpretation != intrinsic
        && geometry.samples_per_pixel == 3
    {
        if bits_allocated == 8 {
            ybr_full_to_rgb(&mut data);
            PhotometricInterpretation::Rgb
        } else {
            warn!(
                "YBR to RGB conversion is only defined for 8-bit samples, \
                 passing {}-bit samples through",
                bits_allocated
            );
            intrinsic
        }
    } else {
        intrinsic
    };

    let expected = geometry.number_of_frames as usize
        * geometry.rows as usize
        * geometry.cols as usize
        * geometry.samples_per_pixel as usize
        * bytes_per_sample as usize;
    ensure!(
        data.len() == expected,
        GeometryMismatchSnafu {
            actual: data.len(),
            expected,
            frames: geometry.number_of_frames,
            rows: geometry.rows,
            cols: geometry.cols,
            samples_per_pixel: geometry.samples_per_pixel,
            bytes_per_sample,
        }
    );

    Ok(DecodedPixelData {
        data,
        rows: geometry.rows,
        cols: geometry.cols,
        samples_per_pixel: geometry.samples_per_pixel,
        number_of_frames: geometry.number_of_frames,
        photometric_interpretation,
        bits_allocated,
        pixel_representation: geometry.pixel_representation,
    })
}

/// Rearrange one frame's samples from separate planes
/// (`RRR...GGG...BBB...`) into interleaved pixels (`RGBRGB...`).
fn interleave_planes(data: &[u8], samples: usize, bytes_per_sample: usize) -> Vec<u8> {
    let plane_len = data.len() / samples;
    let pixels = plane_len / bytes_per_sample;
    let mut out = vec![0u8; data.len()];
    for pixel in 0..pixels {
        for sample in 0..samples {
            let src = sample * plane_len + pixel * bytes_per_sample;
            let dst = (pixel * samples + sample) * bytes_per_sample;
            out[dst..dst + bytes_per_sample].copy_from_slice(&data[src..src + bytes_per_sample]);
        }
    }
    out
}

/// Convert interleaved full-range YCbCr samples to RGB in place.
///
/// Uses the full-range ("JFIF") conversion matrix;
/// 4:2:2 and 4:2:0 inputs must already have their chroma upsampled.
fn ybr_full_to_rgb(data: &mut [u8]) {
    for pixel in data.chunks_exact_mut(3) {
        let y = pixel[0] as f32;
        let cb = pixel[1] as f32 - 128.0;
        let cr = pixel[2] as f32 - 128.0;

        let r = y + 1.402 * cr;
        let g = y - 0.344_136 * cb - 0.714_136 * cr;
        let b = y + 1.772 * cb;

        pixel[0] = r.round().clamp(0.0, 255.0) as u8;
        pixel[1] = g.round().clamp(0.0, 255.0) as u8;
        pixel[2] = b.round().clamp(0.0, 255.0) as u8;
    }
}
