//! Output channels and the append-only registry that owns them.
//!
//! Channels are created once per pin and live for the rest of the program.
//! Storage is a fixed-capacity `heapless::Vec`, so the interrupt worker only
//! ever walks a contiguous slice and never touches the allocator.

use heapless::Vec;

use crate::app::ports::PinId;
use crate::config::DUTY_MAX;
use crate::dither::{self, Thresholds};
use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════
//  Channel
// ═══════════════════════════════════════════════════════════════

/// One dimmable output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pin: PinId,
    inverted: bool,
    leading: bool,
    dithering: u16,
    thresholds: Thresholds,
}

impl Channel {
    pub fn new(pin: PinId, inverted: bool, leading: bool, dithering: u16, duty: u16) -> Self {
        let mut channel = Self {
            pin,
            inverted,
            leading,
            dithering,
            thresholds: [0; crate::config::SUB_FRAMES],
        };
        channel.set_duty(duty);
        channel
    }

    pub fn pin(&self) -> PinId {
        self.pin
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn is_leading(&self) -> bool {
        self.leading
    }

    pub fn dithering(&self) -> u16 {
        self.dithering
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Threshold for sub-frame `index` (taken modulo the frame count).
    pub fn threshold(&self, index: u8) -> u16 {
        self.thresholds[index as usize % self.thresholds.len()]
    }

    /// Recompute thresholds for `duty` using the stored dithering amount.
    ///
    /// Leading-edge channels count their on-time from the far edge of the
    /// period, so the threshold is built from the complement.
    pub fn set_duty(&mut self, duty: u16) {
        let effective = if self.leading { DUTY_MAX - duty } else { duty };
        self.thresholds = dither::compute(effective, self.dithering);
    }

    /// Store a new dithering amount.  Thresholds are left untouched until
    /// the next [`set_duty`](Self::set_duty).
    pub fn set_dithering(&mut self, amount: u16) {
        self.dithering = amount;
    }

    /// Approximate nominal duty, averaged over the first four sub-frames.
    ///
    /// Lossy when dithering is active: the average of frames 0..4 sits a
    /// quarter of the dither amount above the requested duty.
    pub fn duty(&self) -> u16 {
        let sum: u32 = self.thresholds[..4].iter().map(|&t| u32::from(t)).sum();
        let average = (sum >> 2) as u16;
        if self.leading { DUTY_MAX - average } else { average }
    }

    /// Physical pin level for a logical output state.
    pub fn level(&self, active: bool) -> bool {
        active ^ self.inverted
    }
}

// ═══════════════════════════════════════════════════════════════
//  Registry
// ═══════════════════════════════════════════════════════════════

/// Append-only, pin-keyed channel storage.
#[derive(Debug, Default)]
pub struct ChannelRegistry<const N: usize> {
    channels: Vec<Channel, N>,
}

impl<const N: usize> ChannelRegistry<N> {
    pub const fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    pub fn get(&self, pin: PinId) -> Option<&Channel> {
        self.channels.iter().find(|c| c.pin == pin)
    }

    pub fn get_mut(&mut self, pin: PinId) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|c| c.pin == pin)
    }

    pub fn contains(&self, pin: PinId) -> bool {
        self.get(pin).is_some()
    }

    /// Append a channel.  Callers check [`contains`](Self::contains) first;
    /// the registry itself only enforces capacity.
    pub fn push(&mut self, channel: Channel) -> Result<()> {
        self.channels
            .push(channel)
            .map_err(|_| Error::RegistryFull { capacity: N })
    }

    pub fn as_slice(&self) -> &[Channel] {
        &self.channels
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Channel> {
        self.channels.iter()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}
