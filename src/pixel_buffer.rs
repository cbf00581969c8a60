//! Pixel buffer in front of the LED strip
//!
//! Pixels are only changed in memory; nothing reaches the strip until
//! [`PixelBuffer::flush`] is called.

use crate::BoardError;
use smart_leds::{RGB8, SmartLedsWrite};

pub const BLACK: RGB8 = RGB8::new(0, 0, 0);
pub const WHITE: RGB8 = RGB8::new(255, 255, 255);
/// Ready indicator colour
pub const GREEN: RGB8 = RGB8::new(0, 255, 0);
/// Connecting indicator colour
pub const ORANGE: RGB8 = RGB8::new(255, 165, 0);

/// `N` pixels plus the writer that pushes them to hardware
pub struct PixelBuffer<W, const N: usize> {
    pixels: [RGB8; N],
    writer: W,
}

impl<W, const N: usize> PixelBuffer<W, N>
where
    W: SmartLedsWrite<Color = RGB8>,
{
    /// Create an all-black buffer. The strip itself is untouched until the
    /// first flush.
    pub fn new(writer: W) -> Self {
        const { assert!(N > 0, "a strip needs at least one pixel") };
        Self {
            pixels: [BLACK; N],
            writer,
        }
    }

    pub fn set_pixel(&mut self, index: usize, color: RGB8) -> Result<(), BoardError> {
        let pixel = self
            .pixels
            .get_mut(index)
            .ok_or(BoardError::PixelOutOfRange)?;
        *pixel = color;
        Ok(())
    }

    pub fn fill(&mut self, color: RGB8) {
        self.pixels.fill(color);
    }

    /// Push the buffer to the strip
    pub fn flush(&mut self) -> Result<(), BoardError> {
        self.writer
            .write(self.pixels.iter().copied())
            .map_err(|_| BoardError::LedError)
    }

    /// Clear the strip and light the first and last pixel green, then flush.
    /// On a one-pixel strip both writes land on the same pixel.
    pub fn show_ready(&mut self) -> Result<(), BoardError> {
        self.fill(BLACK);
        self.pixels[0] = GREEN;
        self.pixels[N - 1] = GREEN;
        self.flush()
    }

    /// One half of the connecting blink: pixel 0 orange when `lit`, otherwise
    /// dark. The rest of the buffer is left as it is.
    pub fn show_connecting(&mut self, lit: bool) -> Result<(), BoardError> {
        self.pixels[0] = if lit { ORANGE } else { BLACK };
        self.flush()
    }

    pub fn pixels(&self) -> &[RGB8; N] {
        &self.pixels
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingStrip;

    #[test]
    fn writes_only_reach_the_strip_on_flush() {
        let mut strip: PixelBuffer<_, 4> = PixelBuffer::new(RecordingStrip::default());
        strip.set_pixel(2, WHITE).unwrap();
        strip.fill(GREEN);
        assert!(strip.writer().frames.is_empty());

        strip.flush().unwrap();
        assert_eq!(strip.writer().frames, vec![vec![GREEN; 4]]);
    }

    #[test]
    fn rejects_pixels_past_the_end() {
        let mut strip: PixelBuffer<_, 4> = PixelBuffer::new(RecordingStrip::default());
        assert_eq!(strip.set_pixel(4, WHITE), Err(BoardError::PixelOutOfRange));
        assert_eq!(strip.pixels(), &[BLACK; 4]);
    }

    #[test]
    fn ready_indicator_lights_both_ends() {
        let mut strip: PixelBuffer<_, 5> = PixelBuffer::new(RecordingStrip::default());
        strip.fill(WHITE);
        strip.show_ready().unwrap();
        assert_eq!(strip.pixels(), &[GREEN, BLACK, BLACK, BLACK, GREEN]);
        assert_eq!(strip.writer().frames.len(), 1);
    }

    #[test]
    fn ready_indicator_on_a_single_pixel() {
        let mut strip: PixelBuffer<_, 1> = PixelBuffer::new(RecordingStrip::default());
        strip.show_ready().unwrap();
        assert_eq!(strip.pixels(), &[GREEN]);
    }

    #[test]
    fn connecting_blink_toggles_first_pixel() {
        let mut strip: PixelBuffer<_, 3> = PixelBuffer::new(RecordingStrip::default());
        strip.show_connecting(true).unwrap();
        strip.show_connecting(false).unwrap();
        let frames = &strip.writer().frames;
        assert_eq!(frames[0], vec![ORANGE, BLACK, BLACK]);
        assert_eq!(frames[1], vec![BLACK; 3]);
    }

    #[test]
    fn writer_failure_is_a_led_error() {
        let mut strip: PixelBuffer<_, 2> = PixelBuffer::new(RecordingStrip {
            fail: true,
            ..Default::default()
        });
        assert_eq!(strip.flush(), Err(BoardError::LedError));
    }
}
