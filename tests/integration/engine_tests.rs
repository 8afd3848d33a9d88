//! Integration tests for the engine lifecycle and channel configuration.
//!
//! Drive the engine through the public API and check the timer and pin
//! traffic it produces against the mock hardware.

use crate::mock_hw::{TimerCall, make_engine};
use pulsegen::{DUTY_MAX, Error, PwmAction};

// ── Worked example ────────────────────────────────────────────

#[test]
fn single_channel_schedule() {
    let mut engine = make_engine();
    engine.create_channel(2, false, false, 0, 30000).unwrap();
    assert_eq!(engine.max_load(), 1000);

    engine.start();
    assert_eq!(engine.timer().pending(), Some(1), "first evaluation one tick out");

    engine.on_timer_expiry();
    assert_eq!(engine.outputs().level(2), Some(true));
    assert_eq!(engine.state().progress(), 30000);
    assert_eq!(engine.timer().pending(), Some(457));

    engine.on_timer_expiry();
    assert_eq!(engine.outputs().level(2), Some(false));
    assert_eq!(engine.state().progress(), 0);
    assert_eq!(engine.timer().pending(), Some(542), "rest of the period");

    engine.on_timer_expiry();
    assert_eq!(engine.outputs().level(2), Some(true), "next sub-frame starts on");
}

#[test]
fn inverted_channel_drives_low_when_active() {
    let mut engine = make_engine();
    engine.create_channel(3, true, false, 0, 30000).unwrap();
    assert_eq!(engine.outputs().level(3), Some(true), "created at inactive level");

    engine.start();
    engine.on_timer_expiry();
    assert_eq!(engine.outputs().level(3), Some(false));
    engine.on_timer_expiry();
    assert_eq!(engine.outputs().level(3), Some(true));
}

// ── Lifecycle ─────────────────────────────────────────────────

#[test]
fn stop_drives_every_channel_inactive() {
    let mut engine = make_engine();
    engine.create_channel(1, false, false, 0, 40000).unwrap();
    engine.create_channel(2, true, false, 0, 40000).unwrap();
    engine.create_channel(3, false, true, 0, DUTY_MAX).unwrap();

    engine.start();
    engine.on_timer_expiry();
    engine.stop();

    assert!(!engine.is_running());
    assert_eq!(engine.outputs().level(1), Some(false));
    assert_eq!(engine.outputs().level(2), Some(true));
    assert_eq!(engine.outputs().level(3), Some(false));
    assert_eq!(engine.state().progress(), 0);
    assert_eq!(engine.state().sub_frame(), 0);
    assert_eq!(engine.timer().pending(), None);
}

#[test]
fn stop_on_stopped_engine_is_harmless() {
    let mut engine = make_engine();
    engine.create_channel(1, true, false, 0, 100).unwrap();
    engine.stop();
    assert_eq!(engine.outputs().level(1), Some(true));
    assert!(!engine.is_running());
}

#[test]
fn mutation_pauses_and_resumes_running_engine() {
    let mut engine = make_engine();
    engine.create_channel(1, false, false, 0, 10000).unwrap();
    engine.start();
    engine.on_timer_expiry();

    let before = engine.timer().calls.len();
    engine.set_duty(1, 20000);
    let tail = &engine.timer().calls[before..];
    assert_eq!(
        tail,
        &[TimerCall::Stop, TimerCall::ResetCounter, TimerCall::Arm(1)]
    );
    assert!(engine.is_running());
    assert_eq!(engine.state().progress(), 10000, "kept its place in the sub-frame");
    assert_eq!(engine.state().sub_frame(), 1);
    assert_eq!(engine.outputs().level(1), Some(true), "pin not forced off");
}

#[test]
fn frequent_duty_updates_still_cycle_every_sub_frame() {
    let mut engine = make_engine();
    engine.create_channel(1, false, false, 2000, 30000).unwrap();
    engine.start();
    for _ in 0..6 {
        engine.on_timer_expiry();
    }

    let mut seen = std::collections::BTreeSet::new();
    for _ in 0..40 {
        engine.set_duty(1, 30000);
        engine.on_timer_expiry();
        engine.on_timer_expiry();
        seen.insert(engine.state().sub_frame());
    }
    assert_eq!(seen.len(), 8, "sub-frames visited: {seen:?}");
}

#[test]
fn create_channel_pauses_and_resumes_running_engine() {
    let mut engine = make_engine();
    engine.create_channel(1, false, false, 0, 10000).unwrap();
    engine.start();
    engine.on_timer_expiry();

    let before = engine.timer().calls.len();
    engine.create_channel(2, false, false, 0, 20000).unwrap();
    assert_eq!(
        &engine.timer().calls[before..],
        &[TimerCall::Stop, TimerCall::ResetCounter, TimerCall::Arm(1)]
    );
    assert!(engine.is_running());
    assert_eq!(engine.outputs().level(2), Some(false), "new channel starts inactive");
}

#[test]
fn set_frequency_rewinds_running_engine() {
    let mut engine = make_engine();
    engine.create_channel(1, false, false, 0, 10000).unwrap();
    engine.start();
    engine.on_timer_expiry();
    assert_eq!(engine.outputs().level(1), Some(true));

    let before = engine.timer().calls.len();
    engine.set_frequency(100).unwrap();
    assert_eq!(
        &engine.timer().calls[before..],
        &[TimerCall::Stop, TimerCall::ResetCounter, TimerCall::Arm(1)]
    );
    assert!(engine.is_running());
    assert_eq!(engine.state().progress(), 0);
    assert_eq!(engine.state().sub_frame(), 0);
    assert_eq!(engine.outputs().level(1), Some(false));
}

#[test]
fn failed_create_on_running_engine_keeps_position() {
    let mut engine = make_engine();
    for pin in 0..8 {
        engine.create_channel(pin, false, false, 0, 10000).unwrap();
    }
    engine.start();
    engine.on_timer_expiry();

    assert_eq!(
        engine.create_channel(8, false, false, 0, 0),
        Err(Error::RegistryFull { capacity: 8 })
    );
    assert!(engine.is_running());
    assert_eq!(engine.state().progress(), 10000);
    assert_eq!(engine.channel_count(), 8);
}

#[test]
fn batched_duties_share_one_pause() {
    let mut engine = make_engine();
    engine.create_channel(1, false, false, 0, 0).unwrap();
    engine.create_channel(2, false, true, 0, 0).unwrap();
    engine.start();

    let before = engine.timer().calls.len();
    engine.pause().set_duties([(1, 10000), (2, 20000), (9, 5000)]);

    assert_eq!(
        &engine.timer().calls[before..],
        &[TimerCall::Stop, TimerCall::ResetCounter, TimerCall::Arm(1)]
    );
    assert_eq!(engine.get_duty(1), Some(10000));
    assert_eq!(engine.get_duty(2), Some(20000));
    assert_eq!(engine.get_duty(9), None);
}

#[test]
fn mutation_leaves_stopped_engine_stopped() {
    let mut engine = make_engine();
    engine.create_channel(1, false, false, 0, 10000).unwrap();
    engine.set_duty(1, 20000);
    engine.set_frequency(100).unwrap();
    assert!(!engine.is_running());
    assert!(engine.timer().arms().is_empty());
}

// ── Channel registry ──────────────────────────────────────────

#[test]
fn create_channel_is_idempotent_per_pin() {
    let mut engine = make_engine();
    engine.create_channel(1, false, false, 0, 10000).unwrap();
    engine.create_channel(1, true, true, 500, 50000).unwrap();

    assert_eq!(engine.channel_count(), 1);
    let channel = engine.channel(1).unwrap();
    assert!(!channel.is_inverted());
    assert!(!channel.is_leading());
    assert_eq!(engine.get_duty(1), Some(10000));
    assert_eq!(engine.get_dithering(1), Some(0));
}

#[test]
fn create_channel_reports_full_registry() {
    let mut engine = make_engine();
    for pin in 0..8 {
        engine.create_channel(pin, false, false, 0, 0).unwrap();
    }
    assert_eq!(
        engine.create_channel(8, false, false, 0, 0),
        Err(Error::RegistryFull { capacity: 8 })
    );
    // Re-creating an existing pin still succeeds.
    assert_eq!(engine.create_channel(3, false, false, 0, 0), Ok(()));
}

#[test]
fn unknown_pin_queries_return_none() {
    let mut engine = make_engine();
    assert_eq!(engine.get_duty(7), None);
    assert_eq!(engine.get_dithering(7), None);

    engine.set_duty(7, 1000);
    engine.set_dithering(7, 1000);
    assert_eq!(engine.channel_count(), 0);
}

#[test]
fn leading_channel_round_trips_duty() {
    let mut engine = make_engine();
    engine.create_channel(4, false, true, 0, 12000).unwrap();
    assert_eq!(engine.channel(4).unwrap().threshold(0), DUTY_MAX - 12000);
    assert_eq!(engine.get_duty(4), Some(12000));

    engine.set_duty(4, 60000);
    assert_eq!(engine.get_duty(4), Some(60000));
}

#[test]
fn dithering_applies_on_next_set_duty() {
    let mut engine = make_engine();
    engine.create_channel(1, false, false, 0, 30000).unwrap();

    engine.set_dithering(1, 2000);
    assert_eq!(engine.get_dithering(1), Some(2000));
    assert_eq!(engine.channel(1).unwrap().thresholds(), &[30000; 8]);

    engine.set_duty(1, 30000);
    assert_eq!(
        engine.channel(1).unwrap().thresholds(),
        &[32000, 31000, 30000, 29000, 28000, 29000, 30000, 31000]
    );
}

#[test]
fn dithered_channel_cycles_through_sub_frames() {
    let mut engine = make_engine();
    engine.create_channel(1, false, false, 2000, 30000).unwrap();
    engine.start();

    // Sub-frame 1: threshold 31000.
    engine.on_timer_expiry();
    assert_eq!(engine.state().sub_frame(), 1);
    assert_eq!(engine.state().progress(), 31000);
    engine.on_timer_expiry();

    // Sub-frame 2: threshold 30000.
    engine.on_timer_expiry();
    assert_eq!(engine.state().sub_frame(), 2);
    assert_eq!(engine.state().progress(), 30000);
}

// ── Frequency and actions ─────────────────────────────────────

#[test]
fn frequency_change_scales_delays() {
    let mut engine = make_engine();
    engine.create_channel(1, false, false, 0, 32768).unwrap();
    engine.set_frequency(50).unwrap();
    assert_eq!(engine.max_load(), 6100);

    engine.start();
    engine.on_timer_expiry();
    // 32768 * 6100 / 65535
    assert_eq!(engine.timer().pending(), Some(3050));
}

#[test]
fn zero_frequency_is_rejected_without_pausing() {
    let mut engine = make_engine();
    engine.start();
    let before = engine.timer().calls.len();
    assert_eq!(engine.set_frequency(0), Err(Error::InvalidFrequency(0)));
    assert_eq!(engine.timer().calls.len(), before);
}

#[test]
fn pwm_action_sets_frequency_duty_and_dithering() {
    let mut engine = make_engine();
    engine.create_channel(1, false, false, 0, 0).unwrap();

    engine
        .apply_action(&PwmAction {
            pin: 1,
            duty: 30000,
            dithering: 1000,
            frequency_hz: Some(100),
        })
        .unwrap();

    assert_eq!(engine.frequency_hz(), 100);
    assert_eq!(engine.get_dithering(1), Some(1000));
    assert_eq!(engine.channel(1).unwrap().threshold(0), 31000);

    engine
        .apply_action(&PwmAction {
            pin: 1,
            duty: 0,
            dithering: 1000,
            frequency_hz: None,
        })
        .unwrap();
    assert_eq!(engine.frequency_hz(), 100);
    assert_eq!(engine.get_duty(1), Some(0));
}
