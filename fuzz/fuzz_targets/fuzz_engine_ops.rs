//! Fuzz target: arbitrary engine operation sequences
//!
//! Decodes the input into configuration calls interleaved with timer and
//! zero-cross interrupts, and asserts that the engine never panics, never
//! asks for a zero-tick delay, and that stop() always leaves every channel
//! at its inactive level.
//!
//! cargo fuzz run fuzz_engine_ops

#![no_main]

use libfuzzer_sys::fuzz_target;
use pulsegen::{
    EdgeInterruptPort, EdgeType, Engine, EngineConfig, Error, OutputPort, PinId, PulseTimer,
};

struct FuzzTimer {
    last_delay: Option<u32>,
}

impl PulseTimer for FuzzTimer {
    fn ticks_per_second(&self) -> u32 {
        80_000_000
    }
    fn arm(&mut self, delay_ticks: u32) {
        assert!(delay_ticks >= 1, "zero-tick delay");
        self.last_delay = Some(delay_ticks);
    }
    fn stop(&mut self) {
        self.last_delay = None;
    }
    fn reset_counter(&mut self) {}
}

struct FuzzPins([bool; 16]);

impl OutputPort for FuzzPins {
    fn set_level(&mut self, pin: PinId, high: bool) {
        self.0[pin as usize % 16] = high;
    }
}

/// Accepts even pins, rejects odd ones.
struct FuzzInput;

impl EdgeInterruptPort for FuzzInput {
    fn configure_edge_interrupt(&mut self, pin: PinId, _edge: EdgeType) -> pulsegen::Result<()> {
        if pin % 2 == 0 { Ok(()) } else { Err(Error::GpioConfig(-1)) }
    }
}

fn word(data: &[u8], i: usize) -> u16 {
    u16::from_le_bytes([data.get(i).copied().unwrap_or(0), data.get(i + 1).copied().unwrap_or(0)])
}

fuzz_target!(|data: &[u8]| {
    let timer = FuzzTimer { last_delay: None };
    let mut engine: Engine<_, _, 8> = Engine::new(timer, FuzzPins([false; 16]), EngineConfig::default());

    for chunk in data.chunks(6) {
        let pin = chunk.get(1).copied().unwrap_or(0) % 16;
        match chunk[0] % 10 {
            0 => {
                let flags = chunk.get(1).copied().unwrap_or(0);
                let _ = engine.create_channel(pin, flags & 0x40 != 0, flags & 0x80 != 0, word(chunk, 2), word(chunk, 4));
            }
            1 => engine.set_duty(pin, word(chunk, 2)),
            2 => engine.set_dithering(pin, word(chunk, 2)),
            3 => {
                let _ = engine.set_frequency(word(chunk, 2));
            }
            4 => engine.start(),
            5 => engine.stop(),
            6 => {
                let _ = engine.enable_zero_cross(&mut FuzzInput, pin, EdgeType::AnyEdge);
            }
            7 => engine.on_zero_cross(),
            _ => engine.on_timer_expiry(),
        }
    }

    engine.stop();
    for channel in engine.channels() {
        let level = engine.outputs().0[channel.pin() as usize % 16];
        assert_eq!(level, channel.is_inverted(), "channel left active after stop");
    }
});
