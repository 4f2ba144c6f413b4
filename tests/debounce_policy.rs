// tests/debounce_policy.rs

use std::time::Duration;

use proptest::prelude::*;
use tokio::time::Instant;

use autobackup::session::{should_trigger, DebounceDecision, DebounceState};

const SECOND: Duration = Duration::from_secs(1);

#[test]
fn first_change_is_accepted_regardless_of_interval() {
    let launch = Instant::now();
    let now = launch + Duration::from_millis(10);

    assert!(should_trigger(now, launch, launch, Duration::from_secs(3600)));
}

#[test]
fn change_inside_interval_after_a_backup_is_suppressed() {
    let launch = Instant::now();
    let last = launch + SECOND;
    let now = launch + 3 * SECOND;

    assert!(!should_trigger(now, last, launch, 5 * SECOND));
}

#[test]
fn exact_interval_is_accepted() {
    let launch = Instant::now();
    let last = launch + SECOND;
    let now = last + 5 * SECOND;

    assert!(should_trigger(now, last, launch, 5 * SECOND));
}

#[test]
fn state_advances_on_accept_only() {
    let launch = Instant::now();
    let mut state = DebounceState::new(launch, 5 * SECOND);
    assert!(state.is_pristine());

    let t1 = launch + SECOND;
    assert_eq!(
        state.check(t1),
        DebounceDecision::Accepted { since_last: SECOND }
    );
    assert_eq!(state.last_backup_at(), t1);
    assert!(!state.is_pristine());

    let t3 = launch + 3 * SECOND;
    assert_eq!(
        state.check(t3),
        DebounceDecision::Suppressed { since_last: 2 * SECOND }
    );
    // Suppression leaves the previous trigger time alone.
    assert_eq!(state.last_backup_at(), t1);

    let t7 = launch + 7 * SECOND;
    assert!(state.check(t7).is_accepted());
    assert_eq!(state.last_backup_at(), t7);
}

#[test]
fn rapid_changes_after_first_backup_are_all_suppressed() {
    let launch = Instant::now();
    let mut state = DebounceState::new(launch, 5 * SECOND);

    assert!(state.check(launch + SECOND).is_accepted());
    for ms in [1_100u64, 1_500, 2_000, 4_000, 5_999] {
        let decision = state.check(launch + Duration::from_millis(ms));
        assert!(!decision.is_accepted(), "change at {ms}ms should be suppressed");
    }
}

proptest! {
    #[test]
    fn suppressed_iff_too_soon_and_not_first(
        last_offset_ms in 0u64..100_000,
        gap_ms in 0u64..100_000,
        interval_ms in 0u64..100_000,
    ) {
        let launch = Instant::now();
        let last = launch + Duration::from_millis(last_offset_ms);
        let now = last + Duration::from_millis(gap_ms);
        let interval = Duration::from_millis(interval_ms);

        let expected_suppressed = now - last < interval && last != launch;
        prop_assert_eq!(should_trigger(now, last, launch, interval), !expected_suppressed);
    }

    #[test]
    fn pristine_state_accepts_any_first_change(
        delay_ms in 1u64..1_000_000,
        interval_ms in 0u64..10_000_000,
    ) {
        let launch = Instant::now();
        let mut state = DebounceState::new(launch, Duration::from_millis(interval_ms));
        prop_assert!(state.check(launch + Duration::from_millis(delay_ms)).is_accepted());
    }
}
