//! Structural pre-checks.
//!
//! Requests that cannot possibly be satisfied are refuted here before any
//! model is built; the run comes back as `INFEASIBLE_PRE_SOLVE` with a
//! readable reason instead of burning solver budget on a dead model.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{Horizon, SLOT_MINUTES};

/// Mandatory-break window, clamped into horizon-relative slots.
///
/// Clamping never fails: a window reaching outside the horizon keeps only
/// its inside part, and a reversed or fully outside window becomes empty.
/// Whether the clamped window is still workable is [`check`]'s job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakWindow {
    start_rel: usize,
    end_rel: usize,
    min_rest_slots: usize,
}

impl BreakWindow {
    /// Clamps an absolute slot window onto the horizon.
    pub fn new(
        horizon: &Horizon,
        abs_start: usize,
        abs_end: usize,
        min_rest_slots: usize,
    ) -> Self {
        let (start_rel, end_rel) = horizon.clamp_relative(abs_start, abs_end);
        Self {
            start_rel,
            end_rel,
            min_rest_slots,
        }
    }

    /// First horizon-relative slot of the window.
    #[inline]
    pub fn start_rel(&self) -> usize {
        self.start_rel
    }

    /// First horizon-relative slot past the window.
    #[inline]
    pub fn end_rel(&self) -> usize {
        self.end_rel
    }

    /// Minimum consecutive rest slots required inside the window.
    #[inline]
    pub fn min_rest_slots(&self) -> usize {
        self.min_rest_slots
    }

    /// Slots the window spans inside the horizon.
    #[inline]
    pub fn len(&self) -> usize {
        self.end_rel.saturating_sub(self.start_rel)
    }

    /// Whether the window covers no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Absolute `HH:MM-HH:MM` label of the clamped window.
    pub fn label(&self, horizon: &Horizon) -> String {
        format!(
            "{}-{}",
            horizon.label(self.start_rel),
            horizon.label(self.end_rel)
        )
    }
}

/// Outcome of the structural pre-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Readiness {
    /// All structural checks passed.
    Ready,
    /// The request cannot be satisfied; solving would be wasted work.
    Infeasible { reason: String },
}

impl Readiness {
    /// Whether solving may proceed.
    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Failure reason, when the pre-check refuted the request.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Ready => None,
            Self::Infeasible { reason } => Some(reason),
        }
    }
}

/// Refutes requests no schedule can satisfy, without building a model.
///
/// Today that is a single check: the clamped break window must still be
/// long enough to hold the minimum rest block.
pub(crate) fn check(horizon: &Horizon, break_window: Option<&BreakWindow>) -> Readiness {
    if let Some(window) = break_window {
        if window.len() < window.min_rest_slots() {
            let reason = format!(
                "break window {} spans {} slot(s) inside the horizon, \
                 too short for {} consecutive rest slot(s) ({} minutes)",
                window.label(horizon),
                window.len(),
                window.min_rest_slots(),
                window.min_rest_slots() as u32 * SLOT_MINUTES,
            );
            warn!(%reason, "pre-check refuted the request");
            return Readiness::Infeasible { reason };
        }
    }
    Readiness::Ready
}
