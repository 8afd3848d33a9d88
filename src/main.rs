//! PulseGen Firmware: Main Entry Point
//!
//! Wires the pulse engine to ESP-IDF peripherals and runs a slow breathing
//! fade across the channels.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  esp_timer (one-shot) ──▶ pwm_timer_cb ──┐                   │
//! │  GPIO edge (AC zero) ──▶ zero_cross_isr ─┼──▶ static ENGINE  │
//! │  main task (fade loop) ──▶ ENGINE.with ──┘    (SharedEngine) │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use pulsegen::adapters::esp_gpio::{EspGpioOutputs, EspZeroCrossInput};
use pulsegen::adapters::esp_timer::EspPulseTimer;
use pulsegen::{DUTY_MAX, Engine, EngineConfig, SharedEngine, pins};

const FADE_STEP: u16 = 512;
const FADE_INTERVAL: Duration = Duration::from_millis(20);

static ENGINE: SharedEngine<EspPulseTimer, EspGpioOutputs, { pins::CHANNEL_GPIOS.len() }> =
    SharedEngine::new();

unsafe extern "C" fn pwm_timer_cb(_arg: *mut core::ffi::c_void) {
    ENGINE.on_timer_expiry();
}

unsafe extern "C" fn zero_cross_isr(_arg: *mut core::ffi::c_void) {
    ENGINE.on_zero_cross();
}

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("PulseGen v{}", env!("CARGO_PKG_VERSION"));

    let timer = EspPulseTimer::new(pwm_timer_cb)?;
    let outputs = EspGpioOutputs::new(&pins::CHANNEL_GPIOS)?;
    let mut engine = Engine::new(timer, outputs, EngineConfig::default());

    for &gpio in &pins::CHANNEL_GPIOS {
        engine.create_channel(gpio, pins::CHANNELS_INVERTED, false, pins::CHANNEL_DITHERING, 0)?;
    }

    if pins::ZERO_CROSS_FITTED {
        let mut input = EspZeroCrossInput::new(zero_cross_isr);
        if let Err(e) =
            engine.enable_zero_cross(&mut input, pins::ZERO_CROSS_GPIO, pins::ZERO_CROSS_EDGE)
        {
            warn!("Zero-cross unavailable ({}), running free", e);
        }
    } else {
        warn!("No zero-cross detector fitted, running free");
    }

    // Install before starting: an expiry that finds no engine is lost.
    ENGINE.install(engine);
    ENGINE.with(Engine::start);

    let mut duty: u16 = 0;
    let mut rising = true;
    loop {
        duty = if rising {
            duty.saturating_add(FADE_STEP)
        } else {
            duty.saturating_sub(FADE_STEP)
        };
        if duty == DUTY_MAX || duty == 0 {
            rising = !rising;
        }

        ENGINE.with(|engine| {
            // Stagger the channels a quarter-ramp apart.
            engine.pause().set_duties(pins::CHANNEL_GPIOS.iter().enumerate().map(|(i, &gpio)| {
                let offset = (i as u16).wrapping_mul(DUTY_MAX / 4);
                (gpio, duty.wrapping_add(offset))
            }));
        });

        std::thread::sleep(FADE_INTERVAL);
    }
}
