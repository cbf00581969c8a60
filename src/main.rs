#![no_std]
#![no_main]

use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::rmt::{Rmt, TxChannelConfig, TxChannelCreator};
use esp_hal::rng::Rng;
use esp_hal::time::{Instant, Rate};
use esp_hal::timer::timg::TimerGroup;

extern crate alloc;

// Network imports
use blocking_network_stack::Stack;
use smoltcp::iface::{SocketSet, SocketStorage};
use smoltcp::wire::DhcpOption;

// Import our library modules
use lightbar::config;
use lightbar::http::HttpServer;
use lightbar::lightbar::Lightbar;
use lightbar::rmt_strip::RmtStrip;
use lightbar::scheduler::Scheduler;
use lightbar::tcp_listener::TcpListener;
use lightbar::wifi::WiFiManager;

// Add app descriptor for espflash compatibility
esp_bootloader_esp_idf::esp_app_desc!();

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    esp_println::println!("[MAIN] Panic: {}", info);
    loop {}
}

/// Wrapping millisecond clock shared by the loop and the HTTP server
fn now_ms() -> u32 {
    Instant::now().duration_since_epoch().as_millis() as u32
}

fn smoltcp_now() -> smoltcp::time::Instant {
    smoltcp::time::Instant::from_micros(
        Instant::now().duration_since_epoch().as_micros() as i64,
    )
}

#[esp_hal::main]
fn main() -> ! {
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Initialize heap allocator for WiFi (72KB)
    esp_alloc::heap_allocator!(size: 72 * 1024);

    esp_println::logger::init_logger(log::LevelFilter::Info);
    log::info!("[MAIN] EMDR lightbar {}", lightbar::VERSION);

    // LED strip on RMT channel 0 at 10MHz
    log::info!("[LED] Setting up GPIO pin {} for LED data...", config::LED_DATA_PIN);
    let rmt = Rmt::new(peripherals.RMT, Rate::from_mhz(10)).unwrap();
    let tx_config = TxChannelConfig::default()
        .with_clk_divider(1)
        .with_idle_output_level(esp_hal::gpio::Level::Low)
        .with_idle_output(false)
        .with_carrier_modulation(false);
    let rmt_channel = rmt.channel0.configure(peripherals.GPIO2, tx_config).unwrap();
    let strip = RmtStrip::new(rmt_channel, config::NUM_LEDS);
    let mut lightbar: Lightbar<_, { config::NUM_LEDS }> = Lightbar::new(strip, now_ms());
    log::info!("[LED] Strip ready ({} pixels)", config::NUM_LEDS);

    // Initialize WiFi driver
    let timer_group0 = TimerGroup::new(peripherals.TIMG0);
    let mut rng = Rng::new(peripherals.RNG);
    let wifi_init = esp_wifi::init(timer_group0.timer0, rng, peripherals.RADIO_CLK).unwrap();
    let (wifi_controller, wifi_interfaces) =
        esp_wifi::wifi::new(&wifi_init, peripherals.WIFI).unwrap();
    let mut wifi_device = wifi_interfaces.sta;

    let iface = smoltcp::iface::Interface::new(
        smoltcp::iface::Config::new(smoltcp::wire::HardwareAddress::Ethernet(
            smoltcp::wire::EthernetAddress::from_bytes(&wifi_device.mac_address()),
        )),
        &mut wifi_device,
        smoltcp_now(),
    );

    let mut socket_set_entries: [SocketStorage; 3] = Default::default();
    let mut socket_set = SocketSet::new(&mut socket_set_entries[..]);
    let mut dhcp_socket = smoltcp::socket::dhcpv4::Socket::new();
    dhcp_socket.set_outgoing_options(&[DhcpOption {
        kind: 12,
        data: b"lightbar",
    }]);
    socket_set.add(dhcp_socket);

    let stack_now = || Instant::now().duration_since_epoch().as_millis();
    let stack = Stack::new(iface, wifi_device, socket_set, stack_now, rng.random());

    let mut wifi_manager = WiFiManager::new(wifi_controller);
    wifi_manager
        .start(config::WIFI_SSID, config::WIFI_PASSWORD)
        .unwrap();

    log::info!("[WIFI] Connecting...");
    let mut delay = Delay::new();
    let ip = wifi_manager
        .wait_for_ip(&stack, lightbar.strip_mut(), &mut delay)
        .unwrap();

    // HTTP server on a single listening socket
    let mut rx_buffer = [0u8; 1536];
    let mut tx_buffer = [0u8; 1536];
    let socket = stack.get_socket(&mut rx_buffer, &mut tx_buffer);
    let listener = TcpListener::bind(socket, config::HTTP_PORT).unwrap();
    let mut server = HttpServer::new(listener);
    log::info!(
        "[HTTP] Web server running at http://{}.{}.{}.{}/",
        ip[0],
        ip[1],
        ip[2],
        ip[3]
    );

    lightbar.show_ready().unwrap();

    let clock = now_ms;
    let mut scheduler = Scheduler::new(clock());
    let error = scheduler.run(&clock, &mut lightbar, &mut server);
    panic!("lightbar halted: {}", error);
}
