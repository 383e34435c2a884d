//! QR code encoding and decoding
//!
//! The encoder turns a table URL into an RGB raster using the fixed table
//! style (high error correction, 10 px modules, a [`QUIET_ZONE`] module
//! border). The decoder reads generated files back so hosts can confirm each
//! image still scans with the center square blanked out.

mod decoder;
mod encoder;

pub use decoder::QrDecoder;
pub use encoder::QrEncoder;

use image::Rgb;

/// Dark module color used by the table codes (`#555555`)
pub const DARK_GRAY: Rgb<u8> = Rgb([0x55, 0x55, 0x55]);

/// Light module and quiet-zone color
pub const WHITE: Rgb<u8> = Rgb([0xFF, 0xFF, 0xFF]);

/// Quiet zone width in modules; fixed by the `qrcode` renderer for normal symbols
pub const QUIET_ZONE: u32 = 4;

/// Visual parameters for a rendered table code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrStyle {
    /// Pixels per module edge
    pub module_size: u32,
    /// Dark module color
    pub dark: Rgb<u8>,
    /// Light module and quiet-zone color
    pub light: Rgb<u8>,
    /// Side of the blank square cleared at the image center, in pixels
    pub label_box: u32,
    /// Label text color
    pub label_color: Rgb<u8>,
}

impl Default for QrStyle {
    fn default() -> Self {
        Self {
            module_size: 10,
            dark: DARK_GRAY,
            light: WHITE,
            label_box: 120,
            label_color: Rgb([0, 0, 0]),
        }
    }
}

/// A decoded QR code payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrPayload {
    /// The raw decoded data
    pub data: Vec<u8>,
    /// String representation if valid UTF-8
    pub text: Option<String>,
}

impl QrPayload {
    /// Create a new QR payload from raw bytes
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let text = String::from_utf8(data.clone()).ok();
        Self { data, text }
    }

    /// Get the payload as a string, if valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_matches_table_layout() {
        let style = QrStyle::default();
        assert_eq!(style.module_size, 10);
        assert_eq!(style.dark, Rgb([0x55, 0x55, 0x55]));
        assert_eq!(style.label_box, 120);
    }

    #[test]
    fn payload_text_requires_utf8() {
        assert_eq!(QrPayload::from_bytes(b"https://a/1".to_vec()).as_str(), Some("https://a/1"));
        assert!(QrPayload::from_bytes(vec![0xFF, 0xFE]).as_str().is_none());
    }
}
