// crates/msel-forge-core/tests/proptest_time_offset.rs
// ============================================================================
// Module: Time Offset Property Tests
// Description: Round-trip and ordering properties over generated offsets.
// Purpose: Catch parser/renderer asymmetries missed by example tests.
// ============================================================================

//! Property tests for the time-offset wire format.

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
use proptest::prelude::*;

proptest! {
    #[test]
    fn render_parse_round_trip(seconds in 0u64..360_000) {
        let offset = TimeOffset::from_seconds(seconds);
        let rendered = offset.to_string();
        let parsed = TimeOffset::parse(&rendered).unwrap();
        prop_assert_eq!(parsed, offset);
    }

    #[test]
    fn ordering_matches_seconds(a in 0u64..360_000, b in 0u64..360_000) {
        let left = TimeOffset::from_seconds(a);
        let right = TimeOffset::from_seconds(b);
        prop_assert_eq!(left.cmp(&right), a.cmp(&b));
    }

    #[test]
    fn two_component_form_parses_as_minutes(hours in 0u64..100, minutes in 0u64..60) {
        let raw = format!("T+{hours:02}:{minutes:02}");
        let parsed = TimeOffset::parse(&raw).unwrap();
        prop_assert_eq!(parsed.as_seconds(), hours * 3600 + minutes * 60);
    }
}
