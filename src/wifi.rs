//! WiFi module for the ESP32-C3 lightbar
//!
//! Joins the configured network in station mode and waits for a DHCP lease,
//! blinking the connecting indicator on the strip the whole time.

use crate::BoardError;
use crate::config;
use crate::pixel_buffer::PixelBuffer;
use blocking_network_stack::Stack;
use embedded_hal::delay::DelayNs;
use esp_wifi::wifi::{AuthMethod, ClientConfiguration, Configuration, WifiController};
use smart_leds::{RGB8, SmartLedsWrite};
use smoltcp::phy::Device;

/// WiFi manager for station mode
pub struct WiFiManager<'a> {
    controller: WifiController<'a>,
}

impl<'a> WiFiManager<'a> {
    pub fn new(controller: WifiController<'a>) -> Self {
        Self { controller }
    }

    /// Configure and start the radio, then ask it to associate
    pub fn start(&mut self, ssid: &str, password: &str) -> Result<(), BoardError> {
        log::info!("[WIFI] Connecting to WiFi network: {}", ssid);

        let client_config = ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| BoardError::WiFiError)?,
            password: password.try_into().map_err(|_| BoardError::WiFiError)?,
            auth_method: AuthMethod::WPA2Personal,
            ..Default::default()
        };

        self.controller
            .set_configuration(&Configuration::Client(client_config))
            .map_err(|_| BoardError::WiFiError)?;
        self.controller.start().map_err(|_| BoardError::WiFiError)?;
        self.controller.connect().map_err(|_| BoardError::WiFiError)
    }

    pub fn is_connected(&self) -> bool {
        self.controller.is_connected().unwrap_or(false)
    }

    /// Block until associated and an address is leased, blinking pixel 0
    /// orange meanwhile. Returns the leased address.
    pub fn wait_for_ip<W, const N: usize, Dev, Dl>(
        &mut self,
        stack: &Stack<'_, Dev>,
        strip: &mut PixelBuffer<W, N>,
        delay: &mut Dl,
    ) -> Result<[u8; 4], BoardError>
    where
        W: SmartLedsWrite<Color = RGB8>,
        Dev: Device,
        Dl: DelayNs,
    {
        let mut lit = true;
        while !self.is_connected() {
            blink(strip, delay, &mut lit)?;
        }
        log::info!("[WIFI] Associated, waiting for DHCP");

        loop {
            stack.work();
            if stack.is_iface_up() {
                break;
            }
            blink(strip, delay, &mut lit)?;
        }

        let ip = stack
            .get_ip_info()
            .map_err(|_| BoardError::NetworkError)?
            .ip
            .octets();
        log::info!(
            "[WIFI] Connected! IP: {}.{}.{}.{}",
            ip[0],
            ip[1],
            ip[2],
            ip[3]
        );
        Ok(ip)
    }
}

fn blink<W, const N: usize, Dl>(
    strip: &mut PixelBuffer<W, N>,
    delay: &mut Dl,
    lit: &mut bool,
) -> Result<(), BoardError>
where
    W: SmartLedsWrite<Color = RGB8>,
    Dl: DelayNs,
{
    strip.show_connecting(*lit)?;
    delay.delay_ms(config::CONNECTING_BLINK_MS);
    *lit = !*lit;
    Ok(())
}
