//! Solve reports and schedule grids.
//!
//! The report is the atomic outcome of one scheduling run: a status, the
//! per-employee schedules, coverage bookkeeping, and, when nothing could be
//! scheduled, the reason why. Everything here is serde-serializable so a
//! transport layer can emit it without further mapping.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cp::SolveStatus;

// ================================
// Status
// ================================

/// Outcome classification of one scheduling run.
///
/// Serialized in SCREAMING_SNAKE_CASE (`INFEASIBLE_PRE_SOLVE`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    /// Solved to proven optimality.
    Optimal,
    /// Solved, but optimality was not proven within the budget.
    Feasible,
    /// The solver proved the model has no solution.
    Infeasible,
    /// The budget ran out before any solution was found.
    Unknown,
    /// The model failed structural validation.
    ModelInvalid,
    /// A structural pre-check failed; the solver never ran.
    InfeasiblePreSolve,
}

impl ScheduleStatus {
    /// Whether a schedule was produced.
    #[inline]
    pub fn is_solved(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Optimal => "OPTIMAL",
            Self::Feasible => "FEASIBLE",
            Self::Infeasible => "INFEASIBLE",
            Self::Unknown => "UNKNOWN",
            Self::ModelInvalid => "MODEL_INVALID",
            Self::InfeasiblePreSolve => "INFEASIBLE_PRE_SOLVE",
        })
    }
}

impl From<SolveStatus> for ScheduleStatus {
    fn from(status: SolveStatus) -> Self {
        match status {
            SolveStatus::Optimal => Self::Optimal,
            SolveStatus::Feasible => Self::Feasible,
            SolveStatus::Infeasible => Self::Infeasible,
            SolveStatus::Unknown => Self::Unknown,
            SolveStatus::ModelInvalid => Self::ModelInvalid,
        }
    }
}

// ================================
// Report
// ================================

/// One slot of one employee's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    /// Absolute `HH:MM` label of the slot.
    pub time: String,
    /// Job code, or `R` for rest.
    pub code: String,
}

/// Per-employee summary and slot-by-slot schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeStats {
    /// Display name (`K1`, `K2`, ...).
    pub employee: String,
    /// Slots spent working.
    pub work_slots: u32,
    /// Slots spent resting.
    pub rest_slots: u32,
    /// Slot-by-slot assignment, in horizon order.
    pub schedule: Vec<SlotAssignment>,
}

/// A demanded (job, slot) pair that no employee covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnfilledSlot {
    /// Job code of the unmet demand.
    pub job_code: String,
    /// Absolute `HH:MM` label of the slot.
    pub time: String,
    /// Why the slot stayed unfilled.
    pub reason: String,
}

/// Structured outcome of one scheduling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleReport {
    /// Run status.
    pub status: ScheduleStatus,
    /// One entry per employee; empty when nothing was scheduled.
    pub employee_stats: Vec<EmployeeStats>,
    /// Demanded pairs left uncovered, in demand order.
    pub unfilled_job_slots: Vec<UnfilledSlot>,
    /// Assigned slot totals per job code, in code order.
    pub job_assignment_counts: BTreeMap<String, u32>,
    /// Present on non-solved outcomes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infeasible_reason: Option<String>,
}

impl ScheduleReport {
    /// Creates an empty report with the given status.
    pub fn new(status: ScheduleStatus) -> Self {
        Self {
            status,
            employee_stats: Vec::new(),
            unfilled_job_slots: Vec::new(),
            job_assignment_counts: BTreeMap::new(),
            infeasible_reason: None,
        }
    }

    /// Whether the run produced a schedule covering every demanded slot.
    pub fn is_fully_covered(&self) -> bool {
        self.status.is_solved() && self.unfilled_job_slots.is_empty()
    }

    /// Assigned slot total for a job code (0 when absent).
    pub fn assignments_for(&self, job_code: &str) -> u32 {
        self.job_assignment_counts
            .get(job_code)
            .copied()
            .unwrap_or(0)
    }
}

// ================================
// Grid
// ================================

/// One employee's row of the schedule grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRow {
    /// Display name (`K1`, `K2`, ...).
    pub employee: String,
    /// One cell per horizon slot: a job code or `R`.
    pub cells: Vec<String>,
}

/// Per-employee schedule grid; empty when nothing was scheduled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleGrid {
    /// Rows in employee order.
    pub rows: Vec<EmployeeRow>,
}

impl ScheduleGrid {
    /// Number of employees in the grid.
    #[inline]
    pub fn num_employees(&self) -> usize {
        self.rows.len()
    }

    /// Whether the grid holds no schedule at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for an employee display name.
    pub fn row(&self, employee: &str) -> Option<&EmployeeRow> {
        self.rows.iter().find(|row| row.employee == employee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ScheduleStatus::InfeasiblePreSolve).unwrap();
        assert_eq!(json, "\"INFEASIBLE_PRE_SOLVE\"");
        let json = serde_json::to_string(&ScheduleStatus::ModelInvalid).unwrap();
        assert_eq!(json, "\"MODEL_INVALID\"");
        let back: ScheduleStatus = serde_json::from_str("\"OPTIMAL\"").unwrap();
        assert_eq!(back, ScheduleStatus::Optimal);
    }

    #[test]
    fn test_status_display_matches_serialization() {
        for status in [
            ScheduleStatus::Optimal,
            ScheduleStatus::Feasible,
            ScheduleStatus::Infeasible,
            ScheduleStatus::Unknown,
            ScheduleStatus::ModelInvalid,
            ScheduleStatus::InfeasiblePreSolve,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn test_is_solved() {
        assert!(ScheduleStatus::Optimal.is_solved());
        assert!(ScheduleStatus::Feasible.is_solved());
        assert!(!ScheduleStatus::Unknown.is_solved());
        assert!(!ScheduleStatus::InfeasiblePreSolve.is_solved());
    }

    #[test]
    fn test_report_helpers() {
        let mut report = ScheduleReport::new(ScheduleStatus::Optimal);
        report.job_assignment_counts.insert("A".to_string(), 8);
        assert!(report.is_fully_covered());
        assert_eq!(report.assignments_for("A"), 8);
        assert_eq!(report.assignments_for("B"), 0);

        report.unfilled_job_slots.push(UnfilledSlot {
            job_code: "A".to_string(),
            time: "08:00".to_string(),
            reason: "no suitable employee found for this job slot".to_string(),
        });
        assert!(!report.is_fully_covered());
    }

    #[test]
    fn test_report_round_trip() {
        let mut report = ScheduleReport::new(ScheduleStatus::Feasible);
        report.employee_stats.push(EmployeeStats {
            employee: "K1".to_string(),
            work_slots: 3,
            rest_slots: 1,
            schedule: vec![SlotAssignment {
                time: "08:00".to_string(),
                code: "A".to_string(),
            }],
        });
        let json = serde_json::to_string(&report).unwrap();
        // reason is omitted entirely when absent
        assert!(!json.contains("infeasible_reason"));
        let back: ScheduleReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_grid_row_lookup() {
        let grid = ScheduleGrid {
            rows: vec![EmployeeRow {
                employee: "K1".to_string(),
                cells: vec!["A".to_string(), "R".to_string()],
            }],
        };
        assert_eq!(grid.num_employees(), 1);
        assert!(grid.row("K1").is_some());
        assert!(grid.row("K9").is_none());
        assert!(ScheduleGrid::default().is_empty());
    }
}
