//! Timing mutation discipline: only while idle at a physical extreme.

use blind_core::mocks::{ManualClock, MemoryStore, MemoryStoreHandle, MockButtons, SpyRelays};
use blind_core::{CommandError, Controller, Timing};
use blind_traits::Persisted;

fn rig_at(position: f64) -> (Controller, ManualClock, MemoryStoreHandle) {
    let clock = ManualClock::new();
    let store = MemoryStore::with_record(Persisted {
        seconds_to_close: 10.0,
        seconds_to_open: 10.0,
        position,
    });
    let handle = store.handle();
    let ctl = Controller::builder()
        .with_relays(SpyRelays::new())
        .with_buttons(MockButtons::new())
        .with_store(store)
        .with_clock(clock.clone())
        .with_timing(Timing::default())
        .build()
        .expect("build controller");
    (ctl, clock, handle)
}

#[test]
fn mutable_only_at_extremes() {
    let (ctl, _, _) = rig_at(0.0);
    assert!(ctl.is_calibration_mutable());
    let (ctl, _, _) = rig_at(100.0);
    assert!(ctl.is_calibration_mutable());
    let (ctl, _, _) = rig_at(50.0);
    assert!(!ctl.is_calibration_mutable());
}

#[test]
fn update_mid_travel_is_a_conflict() {
    let (mut ctl, _, store) = rig_at(50.0);
    let commits = store.commit_count();
    let err = ctl
        .set_timing(Some(12.0), None)
        .expect_err("must be rejected");
    assert_eq!(
        err.downcast_ref::<CommandError>(),
        Some(&CommandError::CalibrationLocked)
    );
    assert_eq!(store.commit_count(), commits, "nothing persisted");
    assert!((ctl.timing().seconds_to_open - 10.0).abs() < f64::EPSILON);
}

#[test]
fn update_during_move_is_a_conflict_even_at_an_extreme() {
    let (mut ctl, _, _) = rig_at(0.0);
    ctl.begin_move(100.0).expect("begin_move");
    let err = ctl
        .set_timing(None, Some(12.0))
        .expect_err("must be rejected");
    assert_eq!(
        err.downcast_ref::<CommandError>(),
        Some(&CommandError::CalibrationLocked)
    );
}

#[test]
fn update_at_extreme_persists_both_fields() {
    let (mut ctl, _, store) = rig_at(100.0);
    ctl.set_timing(Some(12.5), Some(14.0)).expect("set_timing");
    let timing = ctl.timing();
    assert!((timing.seconds_to_open - 12.5).abs() < f64::EPSILON);
    assert!((timing.seconds_to_close - 14.0).abs() < f64::EPSILON);

    let persisted = store.persisted().expect("record");
    assert!((persisted.seconds_to_open - 12.5).abs() < f64::EPSILON);
    assert!((persisted.seconds_to_close - 14.0).abs() < f64::EPSILON);
    // One batch commit for the pair of fields.
    assert_eq!(store.commit_count(), 1);
}

#[test]
fn partial_update_keeps_other_value() {
    let (mut ctl, _, _) = rig_at(0.0);
    ctl.set_timing(None, Some(22.0)).expect("set_timing");
    let timing = ctl.timing();
    assert!((timing.seconds_to_open - 10.0).abs() < f64::EPSILON);
    assert!((timing.seconds_to_close - 22.0).abs() < f64::EPSILON);
}

#[test]
fn rejects_non_positive_or_non_finite_values() {
    let (mut ctl, _, _) = rig_at(0.0);
    for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        let err = ctl.set_timing(Some(bad), None).expect_err("must reject");
        assert_eq!(
            err.downcast_ref::<CommandError>(),
            Some(&CommandError::InvalidTiming)
        );
    }
    // Timing unchanged after the rejections.
    assert!((ctl.timing().seconds_to_open - 10.0).abs() < f64::EPSILON);
}

#[test]
fn new_timing_drives_subsequent_moves() {
    let (mut ctl, clock, _) = rig_at(0.0);
    ctl.set_timing(None, Some(20.0)).expect("set_timing");
    ctl.begin_move(100.0).expect("begin_move");
    // 20 s to close -> 200 ms per percent -> half way after 10 s.
    clock.advance_ms(10_000);
    ctl.tick().expect("tick");
    assert!((ctl.position() - 50.0).abs() < 1e-9);
}
