//! Transfer syntax UID constants relevant to pixel data decoding,
//! plus small helpers for UID comparison and classification.
//!
//! Only the syntaxes that this crate can be asked to decode are listed;
//! the registry itself is open to handlers claiming any other UID.

/// Implicit VR Little Endian: Default Transfer Syntax for DICOM
pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";

/// Explicit VR Little Endian
pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";

/// Explicit VR Big Endian (retired)
pub const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";

/// Deflated Explicit VR Little Endian
pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1.99";

/// JPEG Baseline (Process 1): lossy 8-bit sequential DCT
pub const JPEG_BASELINE: &str = "1.2.840.10008.1.2.4.50";

/// JPEG Extended (Process 2 & 4): lossy 8/12-bit DCT
pub const JPEG_EXTENDED: &str = "1.2.840.10008.1.2.4.51";

/// JPEG Lossless, Non-Hierarchical (Process 14)
pub const JPEG_LOSSLESS: &str = "1.2.840.10008.1.2.4.57";

/// JPEG Lossless, Non-Hierarchical, First-Order Prediction
/// (Process 14, Selection Value 1)
pub const JPEG_LOSSLESS_SV1: &str = "1.2.840.10008.1.2.4.70";

/// JPEG-LS Lossless Image Compression
pub const JPEG_LS_LOSSLESS: &str = "1.2.840.10008.1.2.4.80";

/// JPEG-LS Lossy (Near-Lossless) Image Compression
pub const JPEG_LS_LOSSY: &str = "1.2.840.10008.1.2.4.81";

/// JPEG 2000 Image Compression (Lossless Only)
pub const JPEG_2000_LOSSLESS: &str = "1.2.840.10008.1.2.4.90";

/// JPEG 2000 Image Compression (lossless or lossy)
pub const JPEG_2000: &str = "1.2.840.10008.1.2.4.91";

/// RLE Lossless
pub const RLE_LOSSLESS: &str = "1.2.840.10008.1.2.5";

/// Strip a trailing null byte from a UID,
/// which may be present due to DICOM value padding.
pub fn trim_uid(uid: &str) -> &str {
    uid.strip_suffix('\0').unwrap_or(uid).trim_end()
}

/// Whether the given transfer syntax stores pixel data
/// in its native (uncompressed) form.
pub fn is_native(uid: &str) -> bool {
    matches!(
        trim_uid(uid),
        IMPLICIT_VR_LITTLE_ENDIAN | EXPLICIT_VR_LITTLE_ENDIAN | EXPLICIT_VR_BIG_ENDIAN
    )
}

/// Whether the given transfer syntax uses big endian byte order.
pub fn is_big_endian(uid: &str) -> bool {
    trim_uid(uid) == EXPLICIT_VR_BIG_ENDIAN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_padded_uids() {
        assert_eq!(trim_uid("1.2.840.10008.1.2.4.50\0"), JPEG_BASELINE);
        assert_eq!(trim_uid("1.2.840.10008.1.2.4.50"), JPEG_BASELINE);
    }

    #[test]
    fn classifies_native_syntaxes() {
        assert!(is_native(IMPLICIT_VR_LITTLE_ENDIAN));
        assert!(is_native(EXPLICIT_VR_LITTLE_ENDIAN));
        assert!(is_native("1.2.840.10008.1.2.2\0"));
        assert!(!is_native(JPEG_BASELINE));
        assert!(!is_native(JPEG_2000_LOSSLESS));
        assert!(!is_native(DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN));
    }
}
