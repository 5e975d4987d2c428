//! Rostering domain models.
//!
//! Core data types for describing one scheduling problem and its outcome.
//! Time is a half-hour slot grid; jobs are interned to dense ids; demand is
//! a set of (job, slot) pairs; results are grids plus structured reports.
//!
//! # Concepts
//!
//! - [`Horizon`]: half-open slot window one schedule covers
//! - [`JobTable`]: two-way code ↔ id registry, [`REST`] sentinel excluded
//! - [`DemandMap`]: parsed requirement lines as bitmaps + ordered pairs
//! - [`ScheduleReport`] / [`ScheduleGrid`]: the atomic solve outcome

mod demand;
mod job;
mod report;
mod slot;

pub use demand::DemandMap;
pub use job::{JobId, JobTable, REST, REST_LABEL};
pub use report::{
    EmployeeRow, EmployeeStats, ScheduleGrid, ScheduleReport, ScheduleStatus, SlotAssignment,
    UnfilledSlot,
};
pub use slot::{parse_time_range, slot_to_time, time_to_slot, Horizon, SLOT_MINUTES};
