//! Engine cell shared between task and interrupt context.
//!
//! Firmware keeps the single [`Engine`] in a `static SharedEngine`; the
//! timer and zero-cross ISRs call [`SharedEngine::on_timer_expiry`] and
//! [`SharedEngine::on_zero_cross`], task code goes through
//! [`SharedEngine::with`].  Each access runs inside a critical section, so an
//! ISR never interleaves with a configuration call.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use super::engine::Engine;
use super::ports::{OutputPort, PulseTimer};

pub struct SharedEngine<T: PulseTimer, O: OutputPort, const N: usize> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Option<Engine<T, O, N>>>>,
}

impl<T: PulseTimer, O: OutputPort, const N: usize> SharedEngine<T, O, N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Hand the engine over.  Replaces (and returns) any previous one.
    pub fn install(&self, engine: Engine<T, O, N>) -> Option<Engine<T, O, N>> {
        self.inner.lock(|cell| cell.borrow_mut().replace(engine))
    }

    /// Run `f` on the engine inside a critical section.
    ///
    /// Returns `None` if no engine has been installed yet.
    pub fn with<R>(&self, f: impl FnOnce(&mut Engine<T, O, N>) -> R) -> Option<R> {
        self.inner.lock(|cell| cell.borrow_mut().as_mut().map(f))
    }

    pub fn is_installed(&self) -> bool {
        self.inner.lock(|cell| cell.borrow().is_some())
    }

    /// Timer ISR entry point.  No-op before [`install`](Self::install).
    pub fn on_timer_expiry(&self) {
        self.with(Engine::on_timer_expiry);
    }

    /// Zero-cross ISR entry point.  No-op before [`install`](Self::install).
    pub fn on_zero_cross(&self) {
        self.with(Engine::on_zero_cross);
    }
}

impl<T: PulseTimer, O: OutputPort, const N: usize> Default for SharedEngine<T, O, N> {
    fn default() -> Self {
        Self::new()
    }
}
