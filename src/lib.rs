//! PulseGen: interrupt-driven software PWM.
//!
//! Drives many dimmable outputs from one hardware countdown timer.  Each
//! timer expiry computes when the next transition across all channels falls
//! and re-arms the timer for exactly that instant.  Duty is dithered over
//! eight sub-frames for extra effective resolution, and the engine can
//! phase-lock to an AC zero-cross signal.
//!
//! ESP-IDF adapters and the firmware binary are gated behind the `espidf`
//! feature; everything else runs on the host for testing.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod channel;
pub mod config;
pub mod dither;
pub mod error;
pub mod pins;
pub mod scheduler;
pub mod zero_cross;

pub use app::commands::PwmAction;
pub use app::engine::{Engine, PauseGuard};
pub use app::ports::{EdgeInterruptPort, EdgeType, OutputPort, PinId, PulseTimer};
pub use app::shared::SharedEngine;
pub use channel::{Channel, ChannelRegistry};
pub use config::{DEFAULT_FREQUENCY_HZ, DUTY_MAX, EngineConfig, SUB_FRAMES};
pub use error::{Error, Result};
pub use scheduler::EngineState;
pub use zero_cross::{SyncStatus, ZeroCrossSync};
