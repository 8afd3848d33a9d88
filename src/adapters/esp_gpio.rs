//! GPIO adapters over raw ESP-IDF sys calls.
//!
//! - [`EspGpioOutputs`]: push-pull outputs for the dimmer channels.
//! - [`EspZeroCrossInput`]: edge interrupt for the AC zero-cross detector.

use esp_idf_svc::sys::*;
use log::{error, info};

use crate::app::ports::{EdgeInterruptPort, EdgeType, OutputPort, PinId};
use crate::error::{Error, Result};

// ── Outputs ───────────────────────────────────────────────────

/// Channel outputs.  Every pin is configured once in [`EspGpioOutputs::new`].
pub struct EspGpioOutputs;

impl EspGpioOutputs {
    pub fn new(pins: &[PinId]) -> Result<Self> {
        for &pin in pins {
            let cfg = gpio_config_t {
                pin_bit_mask: 1u64 << pin,
                mode: gpio_mode_t_GPIO_MODE_OUTPUT,
                pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
                pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
                intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
                ..Default::default()
            };
            // SAFETY: cfg is a fully initialised config for a single pin.
            check(unsafe { gpio_config(&cfg) })?;
        }
        info!("esp_gpio: {} channel outputs configured", pins.len());
        Ok(Self)
    }
}

impl OutputPort for EspGpioOutputs {
    fn set_level(&mut self, pin: PinId, high: bool) {
        // SAFETY: register write on a pin configured as output in `new`;
        // safe from ISR context.
        unsafe {
            gpio_set_level(i32::from(pin), if high { 1 } else { 0 });
        }
    }
}

// ── Zero-cross input ──────────────────────────────────────────

/// Edge-interrupt input bound to a firmware ISR.
pub struct EspZeroCrossInput {
    handler: unsafe extern "C" fn(*mut core::ffi::c_void),
}

impl EspZeroCrossInput {
    pub fn new(handler: unsafe extern "C" fn(*mut core::ffi::c_void)) -> Self {
        Self { handler }
    }
}

fn intr_type(edge: EdgeType) -> gpio_int_type_t {
    match edge {
        EdgeType::Rising => gpio_int_type_t_GPIO_INTR_POSEDGE,
        EdgeType::Falling => gpio_int_type_t_GPIO_INTR_NEGEDGE,
        EdgeType::AnyEdge => gpio_int_type_t_GPIO_INTR_ANYEDGE,
    }
}

fn check(ret: esp_err_t) -> Result<()> {
    if ret == ESP_OK as esp_err_t {
        Ok(())
    } else {
        Err(Error::GpioConfig(ret))
    }
}

impl EspZeroCrossInput {
    fn install(&self, gpio: i32, cfg: &gpio_config_t) -> Result<()> {
        // SAFETY: called from task context during setup.  The handler only
        // enters the SharedEngine critical section.
        unsafe {
            check(gpio_config(cfg))?;
            let ret = gpio_install_isr_service(0);
            // Already installed by another driver.
            if ret != ESP_ERR_INVALID_STATE as esp_err_t {
                check(ret)?;
            }
            check(gpio_isr_handler_add(gpio, Some(self.handler), core::ptr::null_mut()))?;
            check(gpio_intr_enable(gpio))
        }
    }
}

impl EdgeInterruptPort for EspZeroCrossInput {
    fn configure_edge_interrupt(&mut self, pin: PinId, edge: EdgeType) -> Result<()> {
        let gpio = i32::from(pin);
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: intr_type(edge),
            ..Default::default()
        };

        let result = self.install(gpio, &cfg);
        match result {
            Ok(()) => info!("esp_gpio: zero-cross ISR on GPIO{} ({:?})", pin, edge),
            Err(e) => error!("esp_gpio: zero-cross GPIO{} setup failed: {}", pin, e),
        }
        result
    }
}
