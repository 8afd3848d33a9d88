//! [`PulseTimer`] over ESP-IDF's esp_timer API.
//!
//! One one-shot esp_timer with 1 µs resolution.  The expiry callback is a
//! plain `extern "C"` function supplied by the firmware, which forwards to
//! [`SharedEngine::on_timer_expiry`](crate::app::shared::SharedEngine::on_timer_expiry).

use esp_idf_svc::sys::*;
use log::info;

use crate::app::ports::PulseTimer;
use crate::error::{Error, Result};

/// esp_timer counts microseconds.
const ESP_TIMER_TICKS_PER_SECOND: u32 = 1_000_000;

pub struct EspPulseTimer {
    handle: esp_timer_handle_t,
}

// SAFETY: the handle is an opaque token owned by this struct; esp_timer
// calls on it are thread- and ISR-safe.  The struct only ever lives inside
// the critical-section mutex of a SharedEngine.
unsafe impl Send for EspPulseTimer {}

impl EspPulseTimer {
    pub fn new(callback: unsafe extern "C" fn(*mut core::ffi::c_void)) -> Result<Self> {
        let args = esp_timer_create_args_t {
            callback: Some(callback),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"pulsegen\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let mut handle: esp_timer_handle_t = core::ptr::null_mut();
        // SAFETY: `args` outlives the call; `handle` is written on success.
        let ret = unsafe { esp_timer_create(&args, &mut handle) };
        if ret != ESP_OK as i32 {
            log::error!("esp_timer: create failed (rc={})", ret);
            return Err(Error::TimerInit(ret));
        }
        info!("esp_timer: pulse timer created");
        Ok(Self { handle })
    }
}

impl PulseTimer for EspPulseTimer {
    fn ticks_per_second(&self) -> u32 {
        ESP_TIMER_TICKS_PER_SECOND
    }

    fn arm(&mut self, delay_ticks: u32) {
        // SAFETY: handle is valid for the lifetime of self.  Stopping an
        // idle timer returns ESP_ERR_INVALID_STATE, which is harmless.
        unsafe {
            esp_timer_stop(self.handle);
            esp_timer_start_once(self.handle, u64::from(delay_ticks));
        }
    }

    fn stop(&mut self) {
        // SAFETY: see `arm`.
        unsafe {
            esp_timer_stop(self.handle);
        }
    }

    fn reset_counter(&mut self) {
        // esp_timer_start_once always counts from "now".
    }
}

impl Drop for EspPulseTimer {
    fn drop(&mut self) {
        // SAFETY: handle was created in `new` and is not used after drop.
        unsafe {
            esp_timer_stop(self.handle);
            esp_timer_delete(self.handle);
        }
    }
}
