#![cfg_attr(not(test), no_std)]

//! EMDR lightbar firmware library
//!
//! A single cooperative loop drives a bouncing white pixel along a WS2812 strip
//! and serves a small HTTP control page from the same thread. Everything that
//! does not touch the board builds on the host, so the loop can be tested with
//! a recording strip and a scripted listener.

extern crate alloc;

pub mod animation;
pub mod http;
pub mod lightbar;
pub mod net;
pub mod page;
pub mod pixel_buffer;
pub mod scheduler;
pub mod session;
pub mod timer;

#[cfg(feature = "esp32c3")]
pub mod rmt_strip;
#[cfg(feature = "esp32c3")]
pub mod tcp_listener;
#[cfg(feature = "esp32c3")]
pub mod wifi;

/// Project version information
pub const VERSION: &str = "0.1.0";

/// Default configuration constants
pub mod config {
    /// Number of pixels on the lightbar
    pub const NUM_LEDS: usize = 59;

    /// LED data GPIO pin
    pub const LED_DATA_PIN: u8 = 2;

    /// TCP port of the control page
    pub const HTTP_PORT: u16 = 80;

    /// How often the listener is checked, independent of animation speed
    pub const NET_INTERVAL_MS: i32 = 20;

    /// Upper bound on how long one connection may stall the loop
    pub const READ_TIMEOUT_MS: u32 = 100;

    /// An open socket without a usable connection is reset after this long
    pub const STALE_SOCKET_MS: i32 = 2_000;

    /// A request is read once, into a buffer of this size
    pub const REQUEST_BUFFER_SIZE: usize = 1024;

    /// Initial animation tick interval
    pub const DEFAULT_SPEED_MS: i32 = 10;

    /// Initial cycle limit, 0 = unlimited
    pub const DEFAULT_CYCLE_LIMIT: i32 = 0;

    /// Half period of the orange blink shown while Wi-Fi associates
    pub const CONNECTING_BLINK_MS: u32 = 500;

    /// WiFi configuration
    /// Read from environment variables at compile time
    pub const WIFI_SSID: &str = env!("WIFI_SSID");
    pub const WIFI_PASSWORD: &str = env!("WIFI_PASSWORD");
}

/// Error types for the lightbar board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// WiFi connection error
    WiFiError,
    /// Network stack or listener setup error
    NetworkError,
    /// LED strip transmission error
    LedError,
    /// Pixel index outside the strip
    PixelOutOfRange,
}

impl core::fmt::Display for BoardError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BoardError::WiFiError => f.write_str("wifi connection failed"),
            BoardError::NetworkError => f.write_str("network stack error"),
            BoardError::LedError => f.write_str("led strip write failed"),
            BoardError::PixelOutOfRange => f.write_str("pixel index out of range"),
        }
    }
}

impl core::error::Error for BoardError {}
