//! QR code encoder

use crate::error::Result;
use crate::qr::QrStyle;
use image::{Rgb, RgbImage};
use qrcode::{EcLevel, QrCode};

/// Encodes table URLs as styled RGB rasters
#[derive(Debug, Clone, Default)]
pub struct QrEncoder {
    style: QrStyle,
}

impl QrEncoder {
    /// Create an encoder using the given style
    pub fn new(style: QrStyle) -> Self {
        Self { style }
    }

    /// Encode `data` at error correction level H.
    ///
    /// The smallest version that holds the payload is chosen automatically.
    pub fn encode(&self, data: &str) -> Result<RgbImage> {
        let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::H)?;
        tracing::trace!(version = ?code.version(), width = code.width(), "encoded QR matrix");

        let module = self.style.module_size.max(1);
        let image = code
            .render::<Rgb<u8>>()
            .dark_color(self.style.dark)
            .light_color(self.style.light)
            .quiet_zone(true)
            .module_dimensions(module, module)
            .build();

        Ok(image)
    }
}
