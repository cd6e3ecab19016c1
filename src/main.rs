//! YoloHome node firmware — main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    WifiAdapter   MqttAdapter   LogEventSink   │
//! │  (Sensor+Actuator)  (Network)     (Messaging)   (EventSink)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              NodeService (pure logic)                  │    │
//! │  │  Supervisor · Telemetry/Alerts · Dispatcher · Buttons  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Button ISRs ──▶ EventQueue (lock-free SPSC) ──▶ poll()        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use log::{error, info, warn};

use yolohome::adapters::device_id;
use yolohome::adapters::hardware::HardwareAdapter;
use yolohome::adapters::log_sink::LogEventSink;
use yolohome::adapters::mqtt::{MqttAdapter, MqttSettings};
use yolohome::adapters::time::Esp32TimeAdapter;
use yolohome::adapters::wifi::WifiAdapter;
use yolohome::app::model::DeviceIdentity;
use yolohome::app::service::NodeService;
use yolohome::config::NodeConfig;
use yolohome::drivers::relay::RelayBank;
use yolohome::drivers::status_led::StatusLed;
use yolohome::drivers::watchdog::Watchdog;
use yolohome::drivers::hw_init;
use yolohome::pins;
use yolohome::sensors::dht20::Dht20;
use yolohome::sensors::{SensorHub, init_climate};
use yolohome::sensors::light::LightSensor;
use yolohome::sensors::motion::MotionSensor;

#[cfg(target_os = "espidf")]
use esp_idf_hal::{
    delay::FreeRtos,
    i2c::{I2cConfig, I2cDriver},
    peripherals::Peripherals,
    rmt::{TxRmtDriver, config::TransmitConfig},
    units::Hertz,
};
#[cfg(target_os = "espidf")]
use esp_idf_svc::{eventloop::EspSystemEventLoop, nvs::EspDefaultNvsPartition, wifi::EspWifi};

#[cfg(not(target_os = "espidf"))]
use yolohome::sensors::dht20::{NoopDelay, SimDht20Bus};

/// SSID used by the simulated link when none is configured.
#[cfg(not(target_os = "espidf"))]
const SIM_SSID: &str = "yolohome-sim";

fn main() -> Result<()> {
    // ── 1. Runtime bootstrap ──────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }
    #[cfg(not(target_os = "espidf"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("YoloHome node v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration and identity ─────────────────────────
    let mut config = NodeConfig::load().map_err(|e| anyhow!("config load failed: {}", e))?;
    if config.device_id.is_empty() {
        config.device_id = device_id::device_id(&device_id::read_mac()).to_string();
        info!("Device ID derived from MAC: {}", config.device_id);
    }
    config
        .validate()
        .map_err(|e| anyhow!("invalid configuration: {}", e))?;
    let identity = DeviceIdentity::from_config(&config);

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals().context("peripheral init failed")?;
    if let Err(e) = hw_init::init_isr_service() {
        error!("ISR service init failed: {}; buttons disabled", e);
    }
    let watchdog = Watchdog::new();

    #[cfg(target_os = "espidf")]
    let (mut hw, mut wifi) = {
        let peripherals = Peripherals::take()?;
        let sysloop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;

        // SDA/SCL per pins::I2C_SDA_GPIO / pins::I2C_SCL_GPIO.
        let i2c = I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio21,
            peripherals.pins.gpio22,
            &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
        )
        .context("I2C init failed")?;
        let climate = init_climate(i2c, FreeRtos)?;

        // Data pin per pins::STATUS_LED_GPIO.
        let rmt = TxRmtDriver::new(
            peripherals.rmt.channel0,
            peripherals.pins.gpio15,
            &TransmitConfig::new().clock_divider(1),
        )
        .context("RMT init failed")?;
        let led = StatusLed::new(rmt)?;

        let esp_wifi = EspWifi::new(peripherals.modem, sysloop, Some(nvs))?;
        let wifi = WifiAdapter::new(
            esp_wifi,
            &config.wifi_ssid,
            &config.wifi_password,
            config.wifi_connect_polls,
        )
        .map_err(|e| anyhow!("WiFi setup failed: {}", e))?;

        (build_hardware(climate, led), wifi)
    };

    #[cfg(not(target_os = "espidf"))]
    let (mut hw, mut wifi) = {
        let climate = init_climate(SimDht20Bus::default(), NoopDelay)?;
        let ssid = if config.wifi_ssid.is_empty() {
            SIM_SSID
        } else {
            config.wifi_ssid.as_str()
        };
        let wifi = WifiAdapter::new(ssid, &config.wifi_password, config.wifi_connect_polls)
            .map_err(|e| anyhow!("WiFi setup failed: {}", e))?;

        (build_hardware(climate, StatusLed::new()), wifi)
    };

    // ── 4. Adapters and service ───────────────────────────────
    let mut mqtt = MqttAdapter::new(MqttSettings::from_config(&config, &identity));
    let mut sink = LogEventSink::new();
    let clock = Esp32TimeAdapter::new();

    let mut service = NodeService::new(&config, identity);
    service.start(&mut hw, &mut sink);

    let poll_period = Duration::from_millis(u64::from(config.poll_period_ms));
    let fault_backoff = Duration::from_millis(u64::from(config.fault_backoff_ms));

    info!("System ready. Entering main loop.");

    // ── 5. Main loop ──────────────────────────────────────────
    loop {
        match service.poll(clock.now(), &mut hw, &mut wifi, &mut mqtt, &mut sink) {
            Ok(()) => {}
            Err(e) if e.is_link_failure() => {
                warn!("{}", e);
            }
            Err(e) => {
                error!("Error in main loop: {}", e);
                watchdog.feed();
                std::thread::sleep(fault_backoff);
            }
        }

        watchdog.feed();
        std::thread::sleep(poll_period);
    }
}

fn build_hardware<I2C, D>(climate: Dht20<I2C, D>, led: StatusLed) -> HardwareAdapter<I2C, D>
where
    I2C: embedded_hal::i2c::I2c,
    D: embedded_hal::delay::DelayNs,
{
    let sensor_hub = SensorHub::new(
        climate,
        LightSensor::new(pins::LIGHT_ADC_CHANNEL),
        MotionSensor::new(pins::PIR_GPIO),
    );
    HardwareAdapter::new(sensor_hub, RelayBank::new(), led)
}
