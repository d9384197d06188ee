//! Beacon Firmware — Main Entry Point
//!
//! Hexagonal architecture with a three-task split:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareVitals    HardwareMotion   I2sMicrophone   BleRadio   │
//! │  (VitalSignsPort)  (MotionPort)     (CapturePort)   (RadioLink)│
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │             BeaconService (pure logic)                 │    │
//! │  │  HR · Fall · Wear · Power · AudioStreamer              │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                           │ enqueue                            │
//! │                  TelemetryScheduler ──▶ LinkPump (own task)    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Control loop and audio capture run in the main task at a 10 ms tick;
//! the link pump drains the scheduler from its own task so a slow radio
//! never back-pressures the sensors.

#![deny(unused_must_use)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use beacon::adapters::ble::BleRadio;
use beacon::adapters::hardware::{HardwareMotion, HardwareVitals};
use beacon::adapters::log_sink::LogEventSink;
use beacon::adapters::mic::{I2sMicrophone, CAPTURE_READ_SAMPLES};
use beacon::adapters::time::MonotonicClock;
use beacon::app::service::BeaconService;
use beacon::config::BeaconConfig;
use beacon::events::{drain_events, Event};
use beacon::link::{channels, LinkPump};
use beacon::power::PowerAction;
use beacon::telemetry::TelemetryScheduler;

/// Control-loop tick period.
const TICK_MS: u32 = 10;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("beacon firmware v{}", env!("CARGO_PKG_VERSION"));

    let config = BeaconConfig::default();
    let clock = MonotonicClock::new();

    if let Err(e) = beacon::drivers::hw_init::init_button() {
        // Degraded but alive: fall/heart-stop alerts still work without
        // the manual button.
        warn!("button init failed: {e}");
    }

    // ── 2. Telemetry core ─────────────────────────────────────
    let scheduler = Arc::new(TelemetryScheduler::new(config.audio_rate_quiet_pps));

    // ── 3. Radio + link pump task ─────────────────────────────
    let mut radio = match BleRadio::init() {
        Ok(r) => r,
        Err(e) => {
            // Without the radio this device has no reason to run; the
            // watchdog will reset us after the halt.
            log::error!("BLE init failed: {e} — halting");
            #[allow(clippy::empty_loop)]
            loop {}
        }
    };

    let pump_scheduler = Arc::clone(&scheduler);
    let pump_wait = config.pump_wait_ms;
    let stats_interval = config.stats_log_interval_ms;
    std::thread::Builder::new()
        .name("link_pump".into())
        .stack_size(8 * 1024)
        .spawn(move || {
            let clock = MonotonicClock::new();
            let mut pump = LinkPump::new(pump_wait, stats_interval);
            loop {
                let sent = pump.service(&pump_scheduler, &mut radio, clock.now_ms());
                if sent == 0 {
                    // Idle or disconnected — don't spin.
                    std::thread::sleep(Duration::from_millis(u64::from(pump_wait)));
                }
            }
        })?;

    // ── 4. Capture + sensor adapters ──────────────────────────
    let mut microphone = match I2sMicrophone::init(config.audio_sample_rate_hz) {
        Ok(m) => Some(m),
        Err(e) => {
            warn!("I2S init failed ({e}) — running without audio");
            None
        }
    };
    let mut vitals = HardwareVitals::new();
    let mut motion = HardwareMotion::new();
    let mut sink = LogEventSink::new();

    // ── 5. Application service ────────────────────────────────
    let mut service = BeaconService::new(&config, Arc::clone(&scheduler), clock.now_ms());
    service.start(&mut sink);

    // ── 6. Main control loop ──────────────────────────────────
    let mut capture_buf = [0i16; CAPTURE_READ_SAMPLES];
    let mut link_connected = false;
    let mut last_stats_ms = 0u32;

    loop {
        let now_ms = clock.now_ms();

        // Inbound commands from the BLE control characteristic.
        while let Some(cmd) = channels::take_command() {
            service.handle_command(cmd, now_ms, &mut sink);
        }

        // System events from ISR / BLE callback contexts.
        drain_events(|event| match event {
            Event::LinkConnected => {
                link_connected = true;
                info!("client connected");
            }
            Event::LinkDisconnected => {
                link_connected = false;
                info!("client disconnected");
            }
            other => info!("event: {other:?}"),
        });

        // Audio: pull whatever the DMA has ready and push it through the
        // compression pipeline.
        if let Some(mic) = microphone.as_mut() {
            use beacon::app::ports::AudioCapturePort;
            loop {
                match mic.read_samples(&mut capture_buf) {
                    Ok(0) => break,
                    Ok(n) => service.feed_audio(&capture_buf[..n], now_ms, &mut sink),
                    Err(e) => {
                        warn!("audio capture failed: {e}");
                        break;
                    }
                }
            }
        }

        // Periodic scheduler statistics through the event surface.
        if now_ms.wrapping_sub(last_stats_ms) >= config.stats_log_interval_ms {
            last_stats_ms = now_ms;
            use beacon::app::events::BeaconEvent;
            use beacon::app::ports::EventSink;
            sink.emit(&BeaconEvent::LinkStats(scheduler.stats()));
        }

        // Sensors, button, power.
        match service.tick(now_ms, link_connected, &mut vitals, &mut motion, &mut sink) {
            Some(PowerAction::EnterLightSleep) => {
                enter_light_sleep(&config);
                service.wake(clock.now_ms());
            }
            Some(PowerAction::EnterDeepSleep) => enter_deep_sleep(&config),
            None => {}
        }

        std::thread::sleep(Duration::from_millis(u64::from(TICK_MS)));
    }
}

/// Light sleep: button or timer wakes us, then the loop resumes.
fn enter_light_sleep(config: &BeaconConfig) {
    use esp_idf_svc::sys::*;
    info!("entering light sleep");
    unsafe {
        esp_sleep_enable_gpio_wakeup();
        gpio_wakeup_enable(
            beacon::pins::BUTTON,
            gpio_int_type_t_GPIO_INTR_LOW_LEVEL,
        );
        esp_sleep_enable_timer_wakeup(config.light_sleep_duration_us);
        esp_light_sleep_start();
    }
    info!("woke from light sleep");
}

/// Deep sleep never returns — wake is a fresh boot.
fn enter_deep_sleep(config: &BeaconConfig) -> ! {
    use esp_idf_svc::sys::*;
    info!("entering deep sleep");
    unsafe {
        esp_sleep_enable_gpio_wakeup();
        gpio_wakeup_enable(
            beacon::pins::BUTTON,
            gpio_int_type_t_GPIO_INTR_LOW_LEVEL,
        );
        esp_sleep_enable_timer_wakeup(config.wake_check_interval_us);
        esp_deep_sleep_start();
    }
}
