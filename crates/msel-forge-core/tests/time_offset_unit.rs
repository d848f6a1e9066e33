// crates/msel-forge-core/tests/time_offset_unit.rs
// ============================================================================
// Module: Time Model Unit Tests
// Description: Run-tick/wall timestamps and the T+ offset wire grammar.
// Purpose: Pin the time values every record in a run is stamped with.
// ============================================================================

//! Tests for the two run clocks and the `T+HH:MM[:SS]` offset grammar.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use msel_forge_core::TimeOffset;
use msel_forge_core::Timestamp;

#[test]
fn run_clocks_start_at_tick_zero() {
    assert_eq!(Timestamp::start(), Timestamp::Tick(0));
    assert_eq!(Timestamp::Tick(7).tick(), Some(7));
    assert_eq!(Timestamp::Tick(7).wall_millis(), None);
    assert_eq!(Timestamp::Wall(1_700_000_000_000).wall_millis(), Some(1_700_000_000_000));
    assert_eq!(Timestamp::Wall(1_700_000_000_000).tick(), None);
}

#[test]
fn timestamps_serialize_with_the_clock_tag() {
    let encoded = serde_json::to_string(&Timestamp::Tick(5)).unwrap();
    assert_eq!(encoded, r#"{"clock":"tick","at":5}"#);
    let decoded: Timestamp = serde_json::from_str(r#"{"clock":"wall","at":1700}"#).unwrap();
    assert_eq!(decoded, Timestamp::Wall(1700));
}

#[test]
fn parses_both_wire_forms() {
    assert_eq!(TimeOffset::parse("T+00:06:00").unwrap().as_seconds(), 360);
    assert_eq!(TimeOffset::parse("T+00:06").unwrap().as_seconds(), 360);
    assert_eq!(TimeOffset::parse("T+01:30:15").unwrap().as_seconds(), 5415);
}

#[test]
fn rejects_malformed_offsets() {
    for raw in ["00:06:00", "T+0:06", "T+00:61", "T+00:06:61", "T+00:06:00:00", "T+aa:bb", ""] {
        assert!(TimeOffset::parse(raw).is_err(), "{raw} must be rejected");
    }
}

#[test]
fn renders_canonical_seconds_form() {
    assert_eq!(TimeOffset::from_seconds(285).to_string(), "T+00:04:45");
    assert_eq!(TimeOffset::parse("T+00:06").unwrap().to_string(), "T+00:06:00");
}

#[test]
fn ordering_follows_elapsed_seconds() {
    let early = TimeOffset::parse("T+00:04:45").unwrap();
    let late = TimeOffset::parse("T+00:06:00").unwrap();
    assert!(early < late);
    assert!(late >= late);
}

#[test]
fn serde_uses_the_wire_string() {
    let offset = TimeOffset::parse("T+02:15:30").unwrap();
    let encoded = serde_json::to_string(&offset).unwrap();
    assert_eq!(encoded, "\"T+02:15:30\"");
    let decoded: TimeOffset = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, offset);
}
