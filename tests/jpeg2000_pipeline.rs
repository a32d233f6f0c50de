//! End-to-end decoding of JPEG 2000 data sets,
//! compiled only when an OpenJPEG-based codec is present.
//!
//! The fixtures are minimal raw codestreams assembled by hand:
//! a single tile at full resolution (no decomposition levels)
//! whose packets are all empty, so every wavelet coefficient is zero
//! and every decoded sample is the DC level shift of an 8-bit image, 128.
//! That keeps the expected output exact without binary fixture files.
#![cfg(any(feature = "openjp2", feature = "openjpeg-sys"))]

use dicom_pixel_handlers::{
    decode_pixel_data_with, uids, HandlerRegistry, InMemSource, PhotometricInterpretation,
};

/// 8x8 single-component 8-bit lossless codestream, all samples 128.
#[rustfmt::skip]
const GRAY_8X8: &[u8] = &[
    // SOC
    0xFF, 0x4F,
    // SIZ: 8x8 image, 8x8 tile, one 8-bit unsigned component
    0xFF, 0x51, 0x00, 0x29, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x08,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x08,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x01, 0x07, 0x01, 0x01,
    // COD: LRCP, 1 layer, no MCT, 0 decomposition levels,
    // 64x64 code-blocks, reversible 5/3 transform
    0xFF, 0x52, 0x00, 0x0C, 0x00, 0x00, 0x00, 0x01, 0x00,
    0x00, 0x04, 0x04, 0x00, 0x01,
    // QCD: no quantization, 2 guard bits
    0xFF, 0x5C, 0x00, 0x04, 0x40, 0x40,
    // SOT: tile 0, sole tile-part of 15 bytes
    0xFF, 0x90, 0x00, 0x0A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0F, 0x00, 0x01,
    // SOD + one empty packet
    0xFF, 0x93, 0x00,
    // EOC
    0xFF, 0xD9,
];

/// 2x2 three-component 8-bit lossless codestream, all samples 128.
#[rustfmt::skip]
const RGB_2X2: &[u8] = &[
    // SOC
    0xFF, 0x4F,
    // SIZ: 2x2 image, 2x2 tile, three 8-bit unsigned components
    0xFF, 0x51, 0x00, 0x2F, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x02,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x02,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x03, 0x07, 0x01, 0x01, 0x07, 0x01, 0x01, 0x07, 0x01, 0x01,
    // COD: LRCP, 1 layer, no MCT, 0 decomposition levels,
    // 64x64 code-blocks, reversible 5/3 transform
    0xFF, 0x52, 0x00, 0x0C, 0x00, 0x00, 0x00, 0x01, 0x00,
    0x00, 0x04, 0x04, 0x00, 0x01,
    // QCD: no quantization, 2 guard bits
    0xFF, 0x5C, 0x00, 0x04, 0x40, 0x40,
    // SOT: tile 0, sole tile-part of 17 bytes
    0xFF, 0x90, 0x00, 0x0A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x11, 0x00, 0x01,
    // SOD + one empty packet per component
    0xFF, 0x93, 0x00, 0x00, 0x00,
    // EOC
    0xFF, 0xD9,
];

fn j2k_source(codestream: &[u8], rows: u16, cols: u16, samples: u16, pi: &str) -> InMemSource {
    InMemSource {
        transfer_syntax_uid: uids::JPEG_2000_LOSSLESS.to_string(),
        rows: Some(rows),
        cols: Some(cols),
        samples_per_pixel: Some(samples),
        photometric_interpretation: Some(pi.to_string()),
        pixel_data: Some(vec![codestream.to_vec()]),
        ..InMemSource::default()
    }
}

#[test]
fn lossless_grayscale_agrees_with_native_decoding() {
    let compressed = j2k_source(GRAY_8X8, 8, 8, 1, "MONOCHROME2");
    let native = InMemSource {
        rows: Some(8),
        cols: Some(8),
        pixel_data: Some(vec![vec![128; 64]]),
        ..InMemSource::default()
    };

    let registry = HandlerRegistry::with_default_handlers();
    let from_j2k = decode_pixel_data_with(&compressed, &registry).unwrap();
    let from_native = decode_pixel_data_with(&native, &registry).unwrap();

    assert_eq!(from_j2k.shape(), vec![8, 8]);
    assert_eq!(from_j2k.data(), from_native.data());
    assert_eq!(
        from_j2k.to_ndarray::<u16>().unwrap(),
        from_native.to_ndarray::<u16>().unwrap()
    );
}

#[test]
fn lossless_color_interleaves_components() {
    let src = j2k_source(RGB_2X2, 2, 2, 3, "RGB");
    let decoded =
        decode_pixel_data_with(&src, &HandlerRegistry::with_default_handlers()).unwrap();

    assert_eq!(decoded.shape(), vec![2, 2, 3]);
    assert_eq!(
        decoded.photometric_interpretation(),
        &PhotometricInterpretation::Rgb
    );
    assert_eq!(decoded.data(), &[128u8; 12][..]);
}
