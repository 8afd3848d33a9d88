//! [`OutputPort`] over `embedded-hal` output pins.
//!
//! Lets any HAL that implements `embedded_hal::digital::OutputPin` drive the
//! engine.  Pins are registered once at startup and looked up by [`PinId`].

use embedded_hal::digital::OutputPin;
use heapless::Vec;

use crate::app::ports::{OutputPort, PinId};
use crate::error::{Error, Result};

pub struct HalOutputs<P: OutputPin, const N: usize> {
    pins: Vec<(PinId, P), N>,
}

impl<P: OutputPin, const N: usize> HalOutputs<P, N> {
    pub const fn new() -> Self {
        Self { pins: Vec::new() }
    }

    /// Register `pin` under `id`.  Re-registering an id replaces the pin.
    pub fn add(&mut self, id: PinId, pin: P) -> Result<()> {
        if let Some(slot) = self.pins.iter_mut().find(|(existing, _)| *existing == id) {
            slot.1 = pin;
            return Ok(());
        }
        self.pins
            .push((id, pin))
            .map_err(|_| Error::RegistryFull { capacity: N })
    }

    pub fn get(&self, id: PinId) -> Option<&P> {
        self.pins.iter().find(|(existing, _)| *existing == id).map(|(_, p)| p)
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

impl<P: OutputPin, const N: usize> Default for HalOutputs<P, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: OutputPin, const N: usize> OutputPort for HalOutputs<P, N> {
    fn set_level(&mut self, id: PinId, high: bool) {
        let Some((_, pin)) = self.pins.iter_mut().find(|(existing, _)| *existing == id) else {
            return;
        };
        // Called from the timer ISR: a failed write cannot be reported.
        let _ = if high { pin.set_high() } else { pin.set_low() };
    }
}
