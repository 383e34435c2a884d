//! Center label overlay: blanks a square in the middle of a code and writes the
//! table number into it.

mod bitmap;

pub use bitmap::BitmapDigits;

use crate::error::{Error, Result};
use crate::qr::QrStyle;
use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont, point};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::fmt;
use std::path::Path;

/// Font used to draw table labels
pub enum LabelFont {
    /// Scalable font parsed from the configured file
    Outline {
        /// Parsed font data
        font: FontVec,
        /// Scale giving an em square of the configured pixel size
        scale: PxScale,
    },
    /// Built-in digits used when the configured font is unusable
    Bitmap(BitmapDigits),
}

impl LabelFont {
    /// Load and probe a scalable font.
    ///
    /// Fails with [`Error::FontLoad`] if the file cannot be read, is not a
    /// font, or has no outlines for the decimal digits.
    pub fn load(path: &Path, size_px: u32) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| Error::FontLoad(format!("{}: {e}", path.display())))?;
        let font = FontVec::try_from_vec(data)
            .map_err(|e| Error::FontLoad(format!("{}: {e}", path.display())))?;

        let missing: String = ('0'..='9')
            .filter(|&c| {
                let id = font.glyph_id(c);
                id.0 == 0 || font.outline(id).is_none()
            })
            .collect();
        if !missing.is_empty() {
            return Err(Error::FontLoad(format!(
                "{} has no outlines for digits {missing}",
                path.display()
            )));
        }

        let scale = em_scale(&font, size_px as f32);
        Ok(Self::Outline { font, scale })
    }

    /// Built-in fallback sized relative to `size_px`
    pub fn fallback(size_px: u32) -> Self {
        Self::Bitmap(BitmapDigits::for_font_size(size_px))
    }

    /// Draw `text` so that its ink bounding box is centered on (`cx`, `cy`).
    pub fn draw_centered(&self, img: &mut RgbImage, text: &str, cx: i32, cy: i32, color: Rgb<u8>) {
        match self {
            Self::Outline { font, scale } => {
                draw_outline_centered(img, font, *scale, text, cx, cy, color)
            }
            Self::Bitmap(digits) => digits.draw_centered(img, text, cx, cy, color),
        }
    }
}

impl fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outline { scale, .. } => f
                .debug_struct("Outline")
                .field("scale", &(scale.x, scale.y))
                .finish_non_exhaustive(),
            Self::Bitmap(digits) => f.debug_tuple("Bitmap").field(digits).finish(),
        }
    }
}

/// `PxScale` for which one em equals `size_px` pixels.
fn em_scale(font: &FontVec, size_px: f32) -> PxScale {
    match font.units_per_em() {
        Some(units_per_em) if units_per_em > 0.0 => {
            PxScale::from(size_px * font.height_unscaled() / units_per_em)
        }
        _ => PxScale::from(size_px),
    }
}

/// Fill the centered `style.label_box` square with the light color and draw
/// `label` in the middle of the image.
pub fn stamp_label(img: &mut RgbImage, label: &str, font: &LabelFont, style: &QrStyle) {
    let (w, h) = img.dimensions();
    clear_center(img, style.label_box, style.light);
    font.draw_centered(img, label, (w / 2) as i32, (h / 2) as i32, style.label_color);
}

/// Paint a `side x side` square centered in the image, erasing the modules under it.
pub fn clear_center(img: &mut RgbImage, side: u32, color: Rgb<u8>) {
    if side == 0 {
        return;
    }
    let (w, h) = img.dimensions();
    let left = (w.saturating_sub(side) / 2) as i32;
    let top = (h.saturating_sub(side) / 2) as i32;
    draw_filled_rect_mut(img, Rect::at(left, top).of_size(side, side), color);
}

/// Draw `text` with `draw_text_mut`, offset so its ink box is centered on (`cx`, `cy`).
fn draw_outline_centered(
    img: &mut RgbImage,
    font: &FontVec,
    scale: PxScale,
    text: &str,
    cx: i32,
    cy: i32,
    color: Rgb<u8>,
) {
    let Some(bounds) = ink_bounds(font, scale, text) else {
        return;
    };
    let x = cx - ((bounds.min.x + bounds.max.x) / 2.0).round() as i32;
    let y = cy - ((bounds.min.y + bounds.max.y) / 2.0).round() as i32;
    draw_text_mut(img, color, x, y, scale, font, text);
}

/// Union of glyph pixel bounds, relative to the origin `draw_text_mut` draws from.
///
/// Walks glyphs the same way imageproc lays them out: baseline at the ascent,
/// kerning applied only between outlined glyphs.
fn ink_bounds(font: &FontVec, scale: PxScale, text: &str) -> Option<ab_glyph::Rect> {
    let scaled = font.as_scaled(scale);
    let mut caret = 0.0f32;
    let mut previous: Option<GlyphId> = None;
    let mut bounds: Option<ab_glyph::Rect> = None;

    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
        caret += scaled.h_advance(id);
        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        if let Some(prev) = previous {
            caret += scaled.kern(id, prev);
        }
        previous = Some(id);

        let b = outlined.px_bounds();
        bounds = Some(match bounds {
            None => b,
            Some(mut acc) => {
                acc.min.x = acc.min.x.min(b.min.x);
                acc.min.y = acc.min.y.min(b.min.y);
                acc.max.x = acc.max.x.max(b.max.x);
                acc.max.y = acc.max.y.max(b.max.y);
                acc
            }
        });
    }
    bounds
}
