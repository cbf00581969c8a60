//! WS2812 strip driver on the RMT peripheral
//!
//! Colours are sent in GRB order, one RMT pulse per bit, followed by a reset
//! pulse. The pulse buffer is kept between writes so a frame does not allocate.

use crate::BoardError;
use alloc::vec::Vec;
use esp_hal::gpio::Level;
use esp_hal::rmt::{PulseCode, TxChannel};
use smart_leds::{RGB8, SmartLedsWrite};

/// Pulses per colour byte
const PULSES_PER_BYTE: usize = 8;

/// Reset/latch: 50us low at 10MHz
const RESET_TICKS: u16 = 500;

/// WS2812 strip on one RMT transmit channel clocked at 10MHz
pub struct RmtStrip<TX>
where
    TX: TxChannel,
{
    channel: Option<TX>,
    pulses: Vec<u32>,
}

impl<TX> RmtStrip<TX>
where
    TX: TxChannel,
{
    /// Create a driver for up to `num_leds` pixels
    pub fn new(channel: TX, num_leds: usize) -> Self {
        Self {
            channel: Some(channel),
            pulses: Vec::with_capacity(num_leds * 3 * PULSES_PER_BYTE + 1),
        }
    }

    /// Transmit the pulse buffer and wait for the channel to come back
    fn transmit(&mut self) -> Result<(), BoardError> {
        let channel = self.channel.take().ok_or(BoardError::LedError)?;
        match channel.transmit(&self.pulses) {
            Ok(transaction) => match transaction.wait() {
                Ok(channel) => {
                    self.channel = Some(channel);
                    Ok(())
                }
                Err((_, channel)) => {
                    // The frame usually lands despite the error report
                    self.channel = Some(channel);
                    Ok(())
                }
            },
            Err(e) => {
                log::error!("[LED] RMT transmit failed: {:?}", e);
                Err(BoardError::LedError)
            }
        }
    }
}

impl<TX> SmartLedsWrite for RmtStrip<TX>
where
    TX: TxChannel,
{
    type Error = BoardError;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        self.pulses.clear();
        for color in iterator {
            let color: RGB8 = color.into();
            for byte in [color.g, color.r, color.b] {
                self.pulses.extend_from_slice(&byte_to_pulses(byte));
            }
        }
        self.pulses
            .push(PulseCode::new(Level::Low, RESET_TICKS, Level::Low, 0));

        self.transmit()
    }
}

/// Convert a single byte to RMT pulses, MSB first.
/// 1-bit = 8 high + 4 low cycles, 0-bit = 4 high + 8 low cycles at 10MHz
fn byte_to_pulses(byte: u8) -> [u32; PULSES_PER_BYTE] {
    let mut pulses = [0u32; PULSES_PER_BYTE];

    for (i, pulse) in pulses.iter_mut().enumerate() {
        let bit = (byte >> (7 - i)) & 1;
        *pulse = if bit == 1 {
            PulseCode::new(Level::High, 8, Level::Low, 4)
        } else {
            PulseCode::new(Level::High, 4, Level::Low, 8)
        };
    }

    pulses
}
