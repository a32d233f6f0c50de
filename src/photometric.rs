//! An interpreted representation of the DICOM
//! _Photometric Interpretation_ attribute.

use std::fmt;
use std::str::FromStr;

/// The declared color model of the decoded pixel samples.
///
/// Values not described in part 3 of the standard
/// are retained in the [`Other`](PhotometricInterpretation::Other) variant.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub enum PhotometricInterpretation {
    /// `MONOCHROME1`: single sample, minimum value is white
    Monochrome1,
    /// `MONOCHROME2`: single sample, minimum value is black
    Monochrome2,
    /// `PALETTE COLOR`: single sample, indexing a color palette
    PaletteColor,
    /// `RGB`: red, green and blue samples
    Rgb,
    /// `YBR_FULL`: luminance plus full-range chrominance
    YbrFull,
    /// `YBR_FULL_422`: luminance plus 4:2:2 subsampled chrominance
    YbrFull422,
    /// `YBR_PARTIAL_422`: partial-range luminance, 4:2:2 chrominance
    YbrPartial422,
    /// `YBR_PARTIAL_420`: partial-range luminance, 4:2:0 chrominance
    YbrPartial420,
    /// `YBR_ICT`: irreversible color transform (JPEG 2000 lossy)
    YbrIct,
    /// `YBR_RCT`: reversible color transform (JPEG 2000 lossless)
    YbrRct,
    /// Any other value
    Other(String),
}

impl PhotometricInterpretation {
    /// Whether this interpretation describes a single-sample
    /// grayscale image.
    pub fn is_monochrome(&self) -> bool {
        matches!(
            self,
            PhotometricInterpretation::Monochrome1 | PhotometricInterpretation::Monochrome2
        )
    }

    /// Whether this interpretation is part of the YCbCr ("YBR") family.
    pub fn is_ybr(&self) -> bool {
        matches!(
            self,
            PhotometricInterpretation::YbrFull
                | PhotometricInterpretation::YbrFull422
                | PhotometricInterpretation::YbrPartial422
                | PhotometricInterpretation::YbrPartial420
                | PhotometricInterpretation::YbrIct
                | PhotometricInterpretation::YbrRct
        )
    }

    /// The keyword of this interpretation as found in data sets.
    pub fn as_str(&self) -> &str {
        match self {
            PhotometricInterpretation::Monochrome1 => "MONOCHROME1",
            PhotometricInterpretation::Monochrome2 => "MONOCHROME2",
            PhotometricInterpretation::PaletteColor => "PALETTE COLOR",
            PhotometricInterpretation::Rgb => "RGB",
            PhotometricInterpretation::YbrFull => "YBR_FULL",
            PhotometricInterpretation::YbrFull422 => "YBR_FULL_422",
            PhotometricInterpretation::YbrPartial422 => "YBR_PARTIAL_422",
            PhotometricInterpretation::YbrPartial420 => "YBR_PARTIAL_420",
            PhotometricInterpretation::YbrIct => "YBR_ICT",
            PhotometricInterpretation::YbrRct => "YBR_RCT",
            PhotometricInterpretation::Other(s) => s,
        }
    }
}

impl FromStr for PhotometricInterpretation {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // attribute values may carry trailing spaces or null padding
        let s = s.trim_end_matches(|c| c == ' ' || c == '\0');
        Ok(match s {
            "MONOCHROME1" => PhotometricInterpretation::Monochrome1,
            "MONOCHROME2" => PhotometricInterpretation::Monochrome2,
            "PALETTE COLOR" => PhotometricInterpretation::PaletteColor,
            "RGB" => PhotometricInterpretation::Rgb,
            "YBR_FULL" => PhotometricInterpretation::YbrFull,
            "YBR_FULL_422" => PhotometricInterpretation::YbrFull422,
            "YBR_PARTIAL_422" => PhotometricInterpretation::YbrPartial422,
            "YBR_PARTIAL_420" => PhotometricInterpretation::YbrPartial420,
            "YBR_ICT" => PhotometricInterpretation::YbrIct,
            "YBR_RCT" => PhotometricInterpretation::YbrRct,
            _ => PhotometricInterpretation::Other(s.to_string()),
        })
    }
}

impl From<&str> for PhotometricInterpretation {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(pi) => pi,
            Err(infallible) => match infallible {},
        }
    }
}

impl fmt::Display for PhotometricInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_padded_keywords() {
        let pi: PhotometricInterpretation = "YBR_FULL_422 ".parse().unwrap();
        assert_eq!(pi, PhotometricInterpretation::YbrFull422);
        let pi: PhotometricInterpretation = "MONOCHROME2\0".parse().unwrap();
        assert_eq!(pi, PhotometricInterpretation::Monochrome2);
    }

    #[test]
    fn retains_unknown_keywords() {
        let pi: PhotometricInterpretation = "XYB".parse().unwrap();
        assert_eq!(pi, PhotometricInterpretation::Other("XYB".to_string()));
        assert_eq!(pi.as_str(), "XYB");
        assert!(!pi.is_ybr());
    }

    #[test]
    fn family_predicates() {
        assert!(PhotometricInterpretation::Monochrome1.is_monochrome());
        assert!(PhotometricInterpretation::YbrRct.is_ybr());
        assert!(!PhotometricInterpretation::Rgb.is_ybr());
    }
}
