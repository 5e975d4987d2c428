//! Half-hour slot arithmetic.
//!
//! All scheduling happens on a discrete grid of half-hour slots. Slot `n`
//! covers minutes `[n*30, (n+1)*30)` counted from midnight of day zero;
//! hours of 24 and above address the next day, so a horizon such as
//! `22:00-26:00` crosses midnight without special casing.
//!
//! # Concepts
//!
//! - [`time_to_slot`] / [`slot_to_time`]: `HH:MM` ↔ absolute slot index
//! - [`parse_time_range`]: `HH:MM-HH:MM` (hyphen or en-dash) → slot pair
//! - [`Horizon`]: half-open window of absolute slots one schedule covers

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// Minutes covered by one slot.
pub const SLOT_MINUTES: u32 = 30;

/// Converts `HH:MM` to an absolute slot index.
///
/// Hours may exceed 23 (multi-day horizons). Minutes are floored to the
/// half hour, so `08:45` addresses the same slot as `08:30`. The context
/// label names the input field in error messages.
pub fn time_to_slot(time: &str, context: &str) -> Result<usize, ScheduleError> {
    let invalid = || ScheduleError::InvalidTime {
        context: context.to_string(),
        value: time.to_string(),
    };

    let mut parts = time.split(':');
    let (hours, minutes) = match (parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(m), None) => (
            h.trim().parse::<u32>().map_err(|_| invalid())?,
            m.trim().parse::<u32>().map_err(|_| invalid())?,
        ),
        _ => return Err(invalid()),
    };

    Ok(hours as usize * 2 + (minutes / SLOT_MINUTES) as usize)
}

/// Converts an absolute slot index back to its `HH:MM` label.
///
/// Hours are not wrapped at 24: slot 48 prints as `24:00`.
pub fn slot_to_time(slot: usize) -> String {
    format!("{:02}:{:02}", slot / 2, (slot % 2) * 30)
}

/// Parses `HH:MM-HH:MM` into a pair of absolute slots.
///
/// An en-dash `–` is tried before the ASCII hyphen so ranges pasted from
/// formatted text parse the same as hand-typed ones. Exactly one separator
/// is required; both sides are trimmed.
pub fn parse_time_range(range: &str, context: &str) -> Result<(usize, usize), ScheduleError> {
    let separator = if range.contains('–') { '–' } else { '-' };
    let parts: Vec<&str> = range.split(separator).collect();
    if parts.len() != 2 {
        return Err(ScheduleError::InvalidRange {
            context: context.to_string(),
            value: range.to_string(),
        });
    }
    Ok((
        time_to_slot(parts[0].trim(), context)?,
        time_to_slot(parts[1].trim(), context)?,
    ))
}

/// Half-open window of absolute slots covered by one schedule.
///
/// Covers `[start_slot, end_slot)`; every other slot index in the crate is
/// relative to `start_slot` unless named `abs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    start_slot: usize,
    end_slot: usize,
}

impl Horizon {
    /// Parses a period string such as `08:00-17:00`.
    ///
    /// Fails when the period covers no slots; periods meant to cross
    /// midnight must use hours of 24 and above (`22:00-26:00`).
    pub fn parse(period: &str) -> Result<Self, ScheduleError> {
        let (start_slot, end_slot) = parse_time_range(period, "schedule horizon")?;
        if end_slot <= start_slot {
            return Err(ScheduleError::EmptyHorizon(period.trim().to_string()));
        }
        Ok(Self {
            start_slot,
            end_slot,
        })
    }

    /// First covered absolute slot.
    #[inline]
    pub fn start_slot(&self) -> usize {
        self.start_slot
    }

    /// First absolute slot past the horizon.
    #[inline]
    pub fn end_slot(&self) -> usize {
        self.end_slot
    }

    /// Number of slots in the horizon.
    #[inline]
    pub fn num_slots(&self) -> usize {
        self.end_slot - self.start_slot
    }

    /// Whether an absolute slot falls inside the horizon.
    #[inline]
    pub fn contains(&self, abs_slot: usize) -> bool {
        abs_slot >= self.start_slot && abs_slot < self.end_slot
    }

    /// Converts an absolute slot to a horizon-relative index.
    pub fn to_relative(&self, abs_slot: usize) -> Option<usize> {
        self.contains(abs_slot).then(|| abs_slot - self.start_slot)
    }

    /// `HH:MM` label of a horizon-relative slot.
    pub fn label(&self, rel_slot: usize) -> String {
        slot_to_time(self.start_slot + rel_slot)
    }

    /// Clamps an absolute slot range into relative coordinates.
    ///
    /// Each bound lands in `[0, num_slots]`; a range entirely outside the
    /// horizon (or reversed) clamps to an empty one.
    pub fn clamp_relative(&self, abs_start: usize, abs_end: usize) -> (usize, usize) {
        let start = abs_start
            .saturating_sub(self.start_slot)
            .min(self.num_slots());
        let end = abs_end.saturating_sub(self.start_slot).min(self.num_slots());
        (start, end)
    }
}
