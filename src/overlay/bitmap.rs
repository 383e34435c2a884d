//! Built-in 5x7 digit font used when the configured font cannot be loaded.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

/// Rows top to bottom, bit 4 is the leftmost column.
const DIGITS: [[u8; 7]; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110], // 0
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // 1
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111], // 2
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110], // 3
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010], // 4
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110], // 5
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110], // 6
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000], // 7
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110], // 8
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100], // 9
];

/// Blocky digit renderer; each font dot becomes a `dot x dot` pixel square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapDigits {
    dot: u32,
}

impl BitmapDigits {
    /// Pick a dot size so the digits are roughly proportional to `font_size`.
    pub fn for_font_size(font_size: u32) -> Self {
        Self {
            dot: (font_size / 16).max(1),
        }
    }

    /// Size of one font dot in pixels
    pub fn dot(&self) -> u32 {
        self.dot
    }

    /// Width and height of the inked area for `text`.
    pub fn measure(&self, text: &str) -> (u32, u32) {
        let count = text.chars().count() as u32;
        if count == 0 {
            return (0, 0);
        }
        let width = (count * GLYPH_WIDTH + (count - 1)) * self.dot;
        (width, GLYPH_HEIGHT * self.dot)
    }

    /// Draw `text` with its ink box centered on (`cx`, `cy`). Non-digits leave a gap.
    pub fn draw_centered(&self, img: &mut RgbImage, text: &str, cx: i32, cy: i32, color: Rgb<u8>) {
        let (width, height) = self.measure(text);
        let left = cx - (width / 2) as i32;
        let top = cy - (height / 2) as i32;
        let dot = self.dot as i32;

        for (index, ch) in text.chars().enumerate() {
            let Some(rows) = ch.to_digit(10).map(|d| DIGITS[d as usize]) else {
                continue;
            };
            let glyph_left = left + index as i32 * (GLYPH_WIDTH as i32 + 1) * dot;
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let x = glyph_left + col as i32 * dot;
                    let y = top + row as i32 * dot;
                    draw_filled_rect_mut(img, Rect::at(x, y).of_size(self.dot, self.dot), color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_scales_with_font_size() {
        assert_eq!(BitmapDigits::for_font_size(80).dot(), 5);
        assert_eq!(BitmapDigits::for_font_size(4).dot(), 1);
    }

    #[test]
    fn measure_includes_one_dot_gaps() {
        let font = BitmapDigits::for_font_size(16);
        assert_eq!(font.measure("7"), (5, 7));
        assert_eq!(font.measure("12"), (11, 7));
        assert_eq!(font.measure(""), (0, 0));
    }

    #[test]
    fn one_is_drawn_around_center() {
        let white = Rgb([255, 255, 255]);
        let black = Rgb([0, 0, 0]);
        let mut img = RgbImage::from_pixel(21, 21, white);
        BitmapDigits::for_font_size(16).draw_centered(&mut img, "1", 10, 10, black);

        // Ink box is 5x7 starting at (8, 7); the stem of "1" is column 2.
        assert_eq!(*img.get_pixel(10, 7), black);
        assert_eq!(*img.get_pixel(10, 12), black);
        assert_eq!(*img.get_pixel(8, 7), white);
        assert_eq!(*img.get_pixel(0, 0), white);
    }
}
