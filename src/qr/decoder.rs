//! QR code decoder using rqrr

use crate::error::{Error, Result};
use crate::qr::QrPayload;
use image::{DynamicImage, GrayImage};
use std::path::Path;

/// Reads table codes back from rendered images
#[derive(Debug, Default)]
pub struct QrDecoder;

impl QrDecoder {
    /// Create a new QR decoder with default settings
    pub fn new() -> Self {
        Self
    }

    /// Decode the first QR code found in an image
    pub fn decode(&self, img: &DynamicImage) -> Result<QrPayload> {
        self.decode_gray(img.to_luma8())
    }

    /// Decode a PNG (or any format `image` can open) from disk and return its text
    pub fn decode_file(&self, path: &Path) -> Result<String> {
        let img = image::open(path)?;
        let payload = self.decode(&img)?;
        payload
            .text
            .ok_or_else(|| Error::QrDecode(format!("{} is not UTF-8 text", path.display())))
    }

    fn decode_gray(&self, img: GrayImage) -> Result<QrPayload> {
        let mut prepared = rqrr::PreparedImage::prepare(img);
        let grids = prepared.detect_grids();

        let grid = grids.first().ok_or(Error::NoQrCodeFound)?;

        match grid.decode() {
            Ok((meta, content)) => {
                tracing::debug!(
                    "Decoded QR: version={:?}, ecc_level={:?}, length={}",
                    meta.version,
                    meta.ecc_level,
                    content.len()
                );
                Ok(QrPayload::from_bytes(content.into_bytes()))
            }
            Err(e) => Err(Error::QrDecode(format!("Decode failed: {:?}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::QrEncoder;

    #[test]
    fn blank_image_has_no_code() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(200, 200, image::Luma([255])));
        assert!(matches!(QrDecoder::new().decode(&img), Err(Error::NoQrCodeFound)));
    }

    #[test]
    fn reads_unoccluded_table_code() {
        let url = "https://meusite.com/12";
        let img = QrEncoder::default().encode(url).unwrap();
        let payload = QrDecoder::new().decode(&DynamicImage::ImageRgb8(img)).unwrap();
        assert_eq!(payload.as_str(), Some(url));
    }
}
