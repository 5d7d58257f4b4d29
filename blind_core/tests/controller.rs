use std::sync::{Arc, Mutex};

use blind_core::mocks::{
    ButtonHandle, ManualClock, MemoryStore, MemoryStoreHandle, MockButtons, RelayOp, SpyRelays,
};
use blind_core::{BlindState, Controller, Motion, Timing};
use blind_traits::Persisted;

struct Rig {
    ctl: Controller,
    clock: ManualClock,
    #[allow(dead_code)]
    buttons: ButtonHandle,
    ops: Arc<Mutex<Vec<RelayOp>>>,
    store: MemoryStoreHandle,
}

fn rig_with(record: Option<Persisted>, timing: Timing) -> Rig {
    let clock = ManualClock::new();
    let relays = SpyRelays::new();
    let ops = relays.ops();
    let buttons = MockButtons::new();
    let handle = buttons.handle();
    let store = match record {
        Some(p) => MemoryStore::with_record(p),
        None => MemoryStore::new(),
    };
    let store_handle = store.handle();
    let ctl = Controller::builder()
        .with_relays(relays)
        .with_buttons(buttons)
        .with_store(store)
        .with_clock(clock.clone())
        .with_timing(timing)
        .build()
        .expect("build controller");
    Rig {
        ctl,
        clock,
        buttons: handle,
        ops,
        store: store_handle,
    }
}

fn rig() -> Rig {
    rig_with(None, Timing::default())
}

fn any_energize(ops: &Mutex<Vec<RelayOp>>) -> bool {
    ops.lock()
        .unwrap()
        .iter()
        .any(|op| matches!(op, RelayOp::Open(true) | RelayOp::Close(true)))
}

#[test]
fn move_at_target_is_a_no_op() {
    let mut r = rig();
    r.ctl.begin_move(0.0).expect("begin_move");
    assert_eq!(r.ctl.motion(), Motion::Idle);
    assert!(!any_energize(&r.ops), "relays must stay released");
}

#[test]
fn full_open_to_close_tracks_time() {
    let mut r = rig(); // 10 s per direction -> 100 ms per percent
    r.ctl.begin_move(100.0).expect("begin_move");
    assert_eq!(r.ctl.state(), BlindState::Closing);
    assert!(matches!(r.ctl.motion(), Motion::Moving(mv) if mv.duration_ms == 10_000));

    r.clock.advance_ms(5_000);
    r.ctl.tick().expect("tick");
    assert!((r.ctl.position() - 50.0).abs() < 1e-9);
    assert_eq!(r.ctl.state(), BlindState::Closing);

    r.clock.advance_ms(5_000);
    r.ctl.tick().expect("tick");
    assert_eq!(r.ctl.state(), BlindState::Idle);
    assert!((r.ctl.position() - 100.0).abs() < f64::EPSILON);
}

#[test]
fn progression_is_monotonic_until_completion() {
    let mut r = rig();
    r.ctl.begin_move(80.0).expect("begin_move");
    let mut last = r.ctl.position();
    for _ in 0..20 {
        r.clock.advance_ms(500);
        r.ctl.tick().expect("tick");
        let now = r.ctl.position();
        assert!(now >= last, "estimate ran backwards: {last} -> {now}");
        last = now;
    }
    assert_eq!(r.ctl.state(), BlindState::Idle);
    assert!((r.ctl.position() - 80.0).abs() < f64::EPSILON);
}

#[test]
fn completion_persists_exact_target() {
    let mut r = rig();
    r.ctl.begin_move(42.0).expect("begin_move");
    r.clock.advance_ms(60_000); // way past the computed duration
    r.ctl.tick().expect("tick");

    assert!((r.ctl.position() - 42.0).abs() < f64::EPSILON);
    let persisted = r.store.persisted().expect("record");
    assert!((persisted.position - 42.0).abs() < f64::EPSILON);
}

#[test]
fn completion_releases_both_relays() {
    let mut r = rig();
    r.ctl.begin_move(10.0).expect("begin_move");
    r.clock.advance_ms(2_000);
    r.ctl.tick().expect("tick");
    assert_eq!(r.ctl.state(), BlindState::Idle);

    let log = r.ops.lock().unwrap();
    let tail: Vec<_> = log.iter().rev().take(3).copied().collect();
    assert!(tail.contains(&RelayOp::Open(false)));
    assert!(tail.contains(&RelayOp::Close(false)));
}

#[test]
fn command_mid_move_overrides_from_current_estimate() {
    let mut r = rig();
    r.ctl.begin_move(100.0).expect("begin_move");
    r.clock.advance_ms(3_000);
    r.ctl.tick().expect("tick"); // at 30

    r.ctl.begin_move(10.0).expect("override");
    match r.ctl.motion() {
        Motion::Moving(mv) => {
            assert!((mv.start_position - 30.0).abs() < 1e-9);
            assert!((mv.target_position - 10.0).abs() < f64::EPSILON);
            assert_eq!(mv.duration_ms, 2_000);
        }
        other => panic!("expected Moving, got {other:?}"),
    }
    assert_eq!(r.ctl.state(), BlindState::Opening);

    r.clock.advance_ms(2_100);
    r.ctl.tick().expect("tick");
    assert_eq!(r.ctl.state(), BlindState::Idle);
    assert!((r.ctl.position() - 10.0).abs() < f64::EPSILON);
}

#[test]
fn direction_uses_per_direction_rate() {
    let mut r = rig_with(
        Some(Persisted {
            seconds_to_close: 20.0,
            seconds_to_open: 10.0,
            position: 50.0,
        }),
        Timing::default(),
    );
    // Closing 50 -> 100 at 200 ms per percent.
    r.ctl.begin_move(100.0).expect("begin_move");
    assert!(matches!(r.ctl.motion(), Motion::Moving(mv) if mv.duration_ms == 10_000));
    r.clock.advance_ms(10_000);
    r.ctl.tick().expect("tick");

    // Opening 100 -> 50 at 100 ms per percent.
    r.ctl.begin_move(50.0).expect("begin_move");
    assert!(matches!(r.ctl.motion(), Motion::Moving(mv) if mv.duration_ms == 5_000));
}

#[test]
fn restores_persisted_state_on_build() {
    let r = rig_with(
        Some(Persisted {
            seconds_to_close: 14.0,
            seconds_to_open: 12.5,
            position: 37.5,
        }),
        Timing::default(),
    );
    assert!((r.ctl.position() - 37.5).abs() < f64::EPSILON);
    let timing = r.ctl.timing();
    assert!((timing.seconds_to_open - 12.5).abs() < f64::EPSILON);
    assert!((timing.seconds_to_close - 14.0).abs() < f64::EPSILON);
}

#[test]
fn first_boot_seeds_the_store() {
    let r = rig();
    let persisted = r.store.persisted().expect("seeded record");
    assert!((persisted.seconds_to_open - 10.0).abs() < f64::EPSILON);
    assert!((persisted.seconds_to_close - 10.0).abs() < f64::EPSILON);
    assert!((persisted.position - 0.0).abs() < f64::EPSILON);
    assert_eq!(r.store.commit_count(), 1);
}

#[test]
fn rejects_non_finite_target() {
    let mut r = rig();
    let err = r.ctl.begin_move(f64::NAN).expect_err("NaN target");
    assert!(format!("{err}").contains("finite"));
    assert_eq!(r.ctl.motion(), Motion::Idle);
}

#[test]
fn out_of_range_target_is_clamped() {
    let mut r = rig();
    r.ctl.begin_move(250.0).expect("begin_move");
    assert!(matches!(r.ctl.motion(), Motion::Moving(mv) if mv.target_position == 100.0));
}

#[test]
fn clock_stall_holds_position_without_completing() {
    let mut r = rig();
    r.ctl.begin_move(100.0).expect("begin_move");
    // Time never advances: the estimate stays at the start and the move
    // stays in flight.
    for _ in 0..5 {
        r.ctl.tick().expect("tick");
    }
    assert_eq!(r.ctl.state(), BlindState::Closing);
    assert!((r.ctl.position() - 0.0).abs() < f64::EPSILON);
}
