// crates/msel-forge-core/src/core/time.rs
// ============================================================================
// Module: MSEL Forge Time Model
// Description: Run ticks, wall timestamps, and exercise-relative time offsets.
// Purpose: Provide deterministic, replayable time values across MSEL Forge records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Two clocks appear in MSEL Forge records and neither is read from the
//! system clock inside the engine. [`Timestamp::Tick`] values are issued by
//! the controller, one per workflow-log line, so every inject, trace record,
//! and status write is ordered by run progress and a run replays bit-for-bit.
//! [`Timestamp::Wall`] values are supplied by hosts at the API boundary when
//! a scenario must anchor to real time (scheduled exercises, export
//! rendering). Exercise timelines themselves use [`TimeOffset`] values
//! relative to the scenario start (`T+HH:MM` or `T+HH:MM:SS`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde::de;
use thiserror::Error;

// ============================================================================
// SECTION: Timestamps
// ============================================================================

/// Timestamp attached to injects, trace records, and status writes.
///
/// # Invariants
/// - `Tick` values come from the controller's tick counter and are monotonic
///   within a run; the engine never generates `Wall` values itself.
/// - No cross-variant ordering is defined; a run uses one clock throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "clock", content = "at", rename_all = "snake_case")]
pub enum Timestamp {
    /// Host-supplied wall-clock instant in unix epoch milliseconds.
    Wall(i64),
    /// Controller-issued run tick (one per workflow-log line).
    Tick(u64),
}

impl Timestamp {
    /// The instant a run begins: tick zero.
    #[must_use]
    pub const fn start() -> Self {
        Self::Tick(0)
    }

    /// Returns the wall-clock milliseconds for host-supplied instants.
    #[must_use]
    pub const fn wall_millis(&self) -> Option<i64> {
        match self {
            Self::Wall(millis) => Some(*millis),
            Self::Tick(_) => None,
        }
    }

    /// Returns the run tick for controller-issued instants.
    #[must_use]
    pub const fn tick(&self) -> Option<u64> {
        match self {
            Self::Wall(_) => None,
            Self::Tick(tick) => Some(*tick),
        }
    }
}

// ============================================================================
// SECTION: Time Offsets
// ============================================================================

/// Error raised when a time offset fails the wire-format check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time offset: {0}")]
pub struct TimeOffsetError(String);

/// Exercise-relative time offset (`T+HH:MM` or `T+HH:MM:SS`).
///
/// # Invariants
/// - Stored as whole seconds since scenario start; always non-negative.
/// - Ordering follows elapsed seconds; formatting renders `T+HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOffset(u64);

impl TimeOffset {
    /// Creates an offset from whole seconds since scenario start.
    #[must_use]
    pub const fn from_seconds(seconds: u64) -> Self {
        Self(seconds)
    }

    /// Returns the offset as whole seconds since scenario start.
    #[must_use]
    pub const fn as_seconds(self) -> u64 {
        self.0
    }

    /// Returns this offset advanced by the given number of seconds.
    #[must_use]
    pub const fn advanced_by(self, seconds: u64) -> Self {
        Self(self.0.saturating_add(seconds))
    }

    /// Parses a `T+HH:MM` or `T+HH:MM:SS` offset string.
    ///
    /// # Errors
    ///
    /// Returns [`TimeOffsetError`] when the value does not match either wire
    /// form or a component is out of range.
    pub fn parse(value: &str) -> Result<Self, TimeOffsetError> {
        let reject = || TimeOffsetError(value.to_string());
        let Some(body) = value.strip_prefix("T+") else {
            return Err(reject());
        };
        let mut parts = body.split(':');
        let hours: u64 = parse_component(parts.next(), 2, u64::MAX).ok_or_else(reject)?;
        let minutes: u64 = parse_component(parts.next(), 2, 59).ok_or_else(reject)?;
        let seconds: u64 = match parts.next() {
            Some(part) => parse_component(Some(part), 2, 59).ok_or_else(reject)?,
            None => 0,
        };
        if parts.next().is_some() {
            return Err(reject());
        }
        Ok(Self(hours * 3600 + minutes * 60 + seconds))
    }
}

/// Parses one zero-padded offset component within an inclusive bound.
fn parse_component(part: Option<&str>, width: usize, max: u64) -> Option<u64> {
    let part = part?;
    if part.len() != width || !part.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    let value: u64 = part.parse().ok()?;
    if value > max {
        return None;
    }
    Some(value)
}

impl fmt::Display for TimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / 3600;
        let minutes = (self.0 % 3600) / 60;
        let seconds = self.0 % 60;
        write!(f, "T+{hours:02}:{minutes:02}:{seconds:02}")
    }
}

impl Serialize for TimeOffset {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOffset {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}
