//! Shift scheduling pipeline.
//!
//! # Pipeline
//!
//! 1. A wall-clock [`ShiftRequest`] is validated into a [`ShiftScheduler`]:
//!    times become slots, requirement lines become a demand map, and a
//!    structural pre-check refutes hopeless requests up front.
//! 2. Labor rules are translated into a finite-domain constraint model.
//! 3. Any [`CpSolver`] backend searches the model; the solution is decoded
//!    into a [`ScheduleGrid`] and a [`ScheduleReport`].
//!
//! Solve outcomes are never `Err`: infeasibility, timeouts, and pre-check
//! failures all come back as report statuses. Errors are reserved for
//! malformed requests.
//!
//! # References
//!
//! - Pinedo, "Scheduling: Theory, Algorithms, and Systems" (2016), ch. 12
//! - Van den Bergh et al., "Personnel scheduling: a literature review" (2013)

mod builder;
mod interpret;
mod precheck;

pub use precheck::{BreakWindow, Readiness};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cp::{CpSolver, SolverConfig};
use crate::error::ScheduleError;
use crate::models::{
    parse_time_range, DemandMap, Horizon, ScheduleGrid, ScheduleReport, SLOT_MINUTES,
};

use builder::{BuildOutcome, ModelBuilder};
use interpret::{pre_solve_report, report_from_solution};

fn default_max_work_minutes() -> u32 {
    240
}

fn default_rest_minutes() -> u32 {
    30
}

// ================================
// Request
// ================================

/// Hard limits on consecutive work, in slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkRules {
    /// Longest allowed run of consecutive work slots.
    pub max_consecutive_work_slots: usize,
    /// Rest slots forced after a maximal run.
    pub rest_slots_after_work: usize,
}

/// Mandatory mid-shift break, in wall-clock terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MandatoryBreak {
    /// `HH:MM-HH:MM` window the break must fall into.
    pub window: String,
    /// Minimum uninterrupted break length in minutes.
    pub min_minutes: u32,
}

/// Declarative scheduling request, in wall-clock terms.
///
/// Durations in minutes are rounded up to whole slots during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRequest {
    /// Number of employees to schedule.
    pub employees: usize,
    /// Scheduling period, `HH:MM-HH:MM`; cross-midnight periods use hours
    /// of 24 and above (`22:00-26:00`).
    pub horizon: String,
    /// Requirement lines, `<job code> <range>[,<range>...]`.
    #[serde(default)]
    pub requirements: Vec<String>,
    /// Longest allowed run of consecutive work, in minutes.
    #[serde(default = "default_max_work_minutes")]
    pub max_consecutive_work_minutes: u32,
    /// Rest forced after a maximal run, in minutes (30 or 60).
    #[serde(default = "default_rest_minutes")]
    pub rest_after_work_minutes: u32,
    /// Mandatory mid-shift break, if any.
    #[serde(default)]
    pub mandatory_break: Option<MandatoryBreak>,
}

impl ShiftRequest {
    /// Creates a request with default work rules and no requirements.
    pub fn new(employees: usize, horizon: &str) -> Self {
        Self {
            employees,
            horizon: horizon.to_string(),
            requirements: Vec::new(),
            max_consecutive_work_minutes: default_max_work_minutes(),
            rest_after_work_minutes: default_rest_minutes(),
            mandatory_break: None,
        }
    }

    /// Adds one requirement line.
    pub fn with_requirement(mut self, line: impl Into<String>) -> Self {
        self.requirements.push(line.into());
        self
    }

    /// Adds several requirement lines.
    pub fn with_requirements<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requirements.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Sets the consecutive-work limit in minutes.
    pub fn with_max_consecutive_work(mut self, minutes: u32) -> Self {
        self.max_consecutive_work_minutes = minutes;
        self
    }

    /// Sets the forced post-work rest in minutes.
    pub fn with_rest_after_work(mut self, minutes: u32) -> Self {
        self.rest_after_work_minutes = minutes;
        self
    }

    /// Requires an uninterrupted break inside `window`.
    pub fn with_mandatory_break(mut self, window: impl Into<String>, min_minutes: u32) -> Self {
        self.mandatory_break = Some(MandatoryBreak {
            window: window.into(),
            min_minutes,
        });
        self
    }
}

// ================================
// Scheduler
// ================================

/// Validated scheduler, ready to run against any solver backend.
#[derive(Debug, Clone)]
pub struct ShiftScheduler {
    employees: usize,
    horizon: Horizon,
    demand: DemandMap,
    rules: WorkRules,
    break_window: Option<BreakWindow>,
    readiness: Readiness,
}

impl ShiftScheduler {
    /// Validates a request into a scheduler.
    ///
    /// Fails on malformed input only; requests that parse but cannot be
    /// satisfied are accepted and reported as `INFEASIBLE_PRE_SOLVE` when
    /// solved.
    pub fn new(request: &ShiftRequest) -> Result<Self, ScheduleError> {
        if request.employees == 0 {
            return Err(ScheduleError::NoEmployees);
        }
        if request.max_consecutive_work_minutes == 0 {
            return Err(ScheduleError::ZeroWorkLimit);
        }
        if !matches!(request.rest_after_work_minutes, 30 | 60) {
            return Err(ScheduleError::UnsupportedRest(
                request.rest_after_work_minutes,
            ));
        }

        let horizon = Horizon::parse(&request.horizon)?;
        let demand = DemandMap::parse(&request.requirements, &horizon)?;
        let rules = WorkRules {
            max_consecutive_work_slots: slots_for_minutes(request.max_consecutive_work_minutes),
            rest_slots_after_work: slots_for_minutes(request.rest_after_work_minutes),
        };

        let break_window = match &request.mandatory_break {
            Some(mandatory) => {
                if mandatory.min_minutes == 0 {
                    return Err(ScheduleError::ZeroBreakMinutes);
                }
                let (abs_start, abs_end) = parse_time_range(&mandatory.window, "break window")?;
                Some(BreakWindow::new(
                    &horizon,
                    abs_start,
                    abs_end,
                    slots_for_minutes(mandatory.min_minutes),
                ))
            }
            None => None,
        };

        let readiness = precheck::check(&horizon, break_window.as_ref());
        debug!(
            employees = request.employees,
            slots = horizon.num_slots(),
            jobs = demand.jobs().len(),
            demand = demand.total_demand(),
            ready = readiness.is_ready(),
            "scheduler constructed"
        );

        Ok(Self {
            employees: request.employees,
            horizon,
            demand,
            rules,
            break_window,
            readiness,
        })
    }

    /// Builds the constraint model and runs `solver` over it.
    ///
    /// Always returns a grid and report pair; failures are encoded in the
    /// report status rather than an error.
    pub fn solve<S: CpSolver>(
        &self,
        solver: &S,
        config: &SolverConfig,
    ) -> (ScheduleGrid, ScheduleReport) {
        if let Some(reason) = self.readiness.reason() {
            info!(%reason, "pre-check failed; skipping solve");
            return pre_solve_report(reason, &self.demand, &self.horizon);
        }

        let outcome = ModelBuilder::new(
            self.employees,
            &self.horizon,
            &self.demand,
            &self.rules,
            self.break_window.as_ref(),
        )
        .build();

        match outcome {
            BuildOutcome::Infeasible { reason } => {
                info!(%reason, "model construction refuted the request");
                pre_solve_report(&reason, &self.demand, &self.horizon)
            }
            BuildOutcome::Model(shift) => {
                info!(
                    int_vars = shift.model.num_int_vars(),
                    bool_vars = shift.model.num_bool_vars(),
                    constraints = shift.model.constraint_count(),
                    "model built; solving"
                );
                let solution = solver.solve(&shift.model, config);
                report_from_solution(&solution, &shift, &self.demand, &self.horizon)
            }
        }
    }

    /// Number of employees to schedule.
    #[inline]
    pub fn num_employees(&self) -> usize {
        self.employees
    }

    /// Scheduling horizon.
    #[inline]
    pub fn horizon(&self) -> &Horizon {
        &self.horizon
    }

    /// Parsed demand map.
    #[inline]
    pub fn demand(&self) -> &DemandMap {
        &self.demand
    }

    /// Work rules in slots.
    #[inline]
    pub fn rules(&self) -> WorkRules {
        self.rules
    }

    /// Clamped break window, when a mandatory break is configured.
    #[inline]
    pub fn break_window(&self) -> Option<&BreakWindow> {
        self.break_window.as_ref()
    }

    /// Outcome of the structural pre-check.
    #[inline]
    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }
}

/// Minutes rounded up to whole slots.
fn slots_for_minutes(minutes: u32) -> usize {
    (minutes as usize).div_ceil(SLOT_MINUTES as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::cp::{BacktrackSolver, CpModel, CpSolution, SolveStats, SolveStatus};
    use crate::models::ScheduleStatus;

    fn run(request: &ShiftRequest) -> (ScheduleGrid, ScheduleReport) {
        run_with_budget(request, Duration::from_secs(115))
    }

    fn run_with_budget(request: &ShiftRequest, budget: Duration) -> (ScheduleGrid, ScheduleReport) {
        let scheduler = ShiftScheduler::new(request).unwrap();
        let config = SolverConfig::new().with_time_budget(budget);
        scheduler.solve(&BacktrackSolver::new(), &config)
    }

    #[test]
    fn test_full_coverage_schedule() {
        let request = ShiftRequest::new(2, "08:00-12:00").with_requirement("A 08:00-12:00");
        let (grid, report) = run(&request);

        assert_eq!(report.status, ScheduleStatus::Optimal);
        assert!(report.is_fully_covered());
        assert!(report.infeasible_reason.is_none());
        assert_eq!(report.assignments_for("A"), 8);

        assert_eq!(grid.num_employees(), 2);
        let k1 = grid.row("K1").unwrap();
        let k2 = grid.row("K2").unwrap();
        assert_eq!(k1.cells.len(), 8);
        // every slot is covered by exactly one of the two employees
        for slot in 0..8 {
            let workers = [&k1.cells[slot], &k2.cells[slot]]
                .iter()
                .filter(|cell| cell.as_str() == "A")
                .count();
            assert_eq!(workers, 1, "slot {slot}");
        }
        // eight work slots with a spread of at most one means four each
        for stats in &report.employee_stats {
            assert_eq!(stats.work_slots, 4, "{}", stats.employee);
        }
    }

    #[test]
    fn test_no_demand_schedules_all_rest() {
        let request = ShiftRequest::new(1, "08:00-10:00");
        let (grid, report) = run(&request);

        assert_eq!(report.status, ScheduleStatus::Optimal);
        assert!(report.is_fully_covered());
        assert!(report.job_assignment_counts.is_empty());
        assert_eq!(grid.row("K1").unwrap().cells, ["R", "R", "R", "R"]);
        let stats = &report.employee_stats[0];
        assert_eq!((stats.work_slots, stats.rest_slots), (0, 4));
    }

    #[test]
    fn test_consecutive_limit_forces_rest() {
        // one employee cannot cover four slots alone when runs cap at two
        let request = ShiftRequest::new(1, "08:00-10:00")
            .with_requirement("A 08:00-10:00")
            .with_max_consecutive_work(60)
            .with_rest_after_work(30);
        let (grid, report) = run(&request);

        assert_eq!(report.status, ScheduleStatus::Optimal);
        assert_eq!(report.unfilled_job_slots.len(), 1);
        assert_eq!(report.employee_stats[0].work_slots, 3);

        let cells = &grid.row("K1").unwrap().cells;
        for start in 0..=cells.len() - 3 {
            let rests = cells[start..start + 3]
                .iter()
                .filter(|cell| cell.as_str() == "R")
                .count();
            assert!(rests >= 1, "three consecutive work slots at {start}");
        }
        // a maximal two-slot run is followed by rest, unless it ends the day
        for start in 0..cells.len() - 2 {
            if cells[start] != "R" && cells[start + 1] != "R" {
                assert_eq!(cells[start + 2], "R", "no rest after full run at {start}");
            }
        }
    }

    #[test]
    fn test_job_switch_requires_rest_between() {
        let request = ShiftRequest::new(1, "08:00-09:00")
            .with_requirements(["A 08:00-08:30", "B 08:30-09:00"]);
        let (grid, report) = run(&request);

        // adjacent slots with different jobs cannot both be covered
        assert_eq!(report.status, ScheduleStatus::Optimal);
        assert_eq!(report.unfilled_job_slots.len(), 1);
        assert_eq!(report.employee_stats[0].work_slots, 1);

        let cells = &grid.row("K1").unwrap().cells;
        assert_eq!(cells.iter().filter(|cell| cell.as_str() == "R").count(), 1);
    }

    #[test]
    fn test_mandatory_break_is_honored() {
        let request = ShiftRequest::new(1, "08:00-11:00")
            .with_requirement("A 08:00-11:00")
            .with_mandatory_break("09:00-10:30", 30);
        let (grid, report) = run(&request);

        assert_eq!(report.status, ScheduleStatus::Optimal);
        // the break costs exactly one covered slot
        assert_eq!(report.unfilled_job_slots.len(), 1);
        let stats = &report.employee_stats[0];
        assert_eq!((stats.work_slots, stats.rest_slots), (5, 1));

        let cells = &grid.row("K1").unwrap().cells;
        let rest_at = cells.iter().position(|cell| cell == "R").unwrap();
        // rest falls inside the 09:00-10:30 window (relative slots 2..5)
        assert!((2..5).contains(&rest_at), "rest at slot {rest_at}");
    }

    #[test]
    fn test_short_break_window_skips_solve() {
        let request = ShiftRequest::new(1, "08:00-12:00")
            .with_requirement("A 08:00-12:00")
            .with_mandatory_break("09:00-09:30", 60);
        let scheduler = ShiftScheduler::new(&request).unwrap();
        assert!(!scheduler.readiness().is_ready());

        let (grid, report) = scheduler.solve(&BacktrackSolver::new(), &SolverConfig::new());
        assert!(grid.is_empty());
        assert_eq!(report.status, ScheduleStatus::InfeasiblePreSolve);
        let reason = report.infeasible_reason.as_deref().unwrap();
        assert!(reason.contains("09:00-09:30"));
        assert!(report.employee_stats.is_empty());
        assert!(report.job_assignment_counts.is_empty());
        assert_eq!(report.unfilled_job_slots.len(), 8);
        for unfilled in &report.unfilled_job_slots {
            assert!(unfilled.reason.contains("solving was skipped"));
        }
    }

    #[test]
    fn test_zero_budget_reports_unknown() {
        let request = ShiftRequest::new(2, "08:00-12:00").with_requirement("A 08:00-12:00");
        let (grid, report) = run_with_budget(&request, Duration::ZERO);

        assert_eq!(report.status, ScheduleStatus::Unknown);
        assert!(grid.is_empty());
        let reason = report.infeasible_reason.as_deref().unwrap();
        assert!(reason.contains("UNKNOWN"));
        assert_eq!(report.unfilled_job_slots.len(), 8);
    }

    // Stand-in backend that returns a fixed status and no values.
    struct FixedStatusSolver(SolveStatus);

    impl CpSolver for FixedStatusSolver {
        fn solve(&self, _model: &CpModel, _config: &SolverConfig) -> CpSolution {
            CpSolution::without_values(self.0, SolveStats::default())
        }
    }

    #[test]
    fn test_solver_status_maps_into_report() {
        let request = ShiftRequest::new(1, "08:00-09:00").with_requirement("A 08:00-09:00");
        let scheduler = ShiftScheduler::new(&request).unwrap();

        let cases = [
            (SolveStatus::Infeasible, ScheduleStatus::Infeasible),
            (SolveStatus::Unknown, ScheduleStatus::Unknown),
            (SolveStatus::ModelInvalid, ScheduleStatus::ModelInvalid),
        ];
        for (solver_status, expected) in cases {
            let (grid, report) =
                scheduler.solve(&FixedStatusSolver(solver_status), &SolverConfig::new());
            assert_eq!(report.status, expected);
            assert!(grid.is_empty());
            assert!(report.infeasible_reason.is_some());
            assert_eq!(report.unfilled_job_slots.len(), 2);
        }
    }

    #[test]
    fn test_request_validation() {
        let err = ShiftScheduler::new(&ShiftRequest::new(0, "08:00-12:00")).unwrap_err();
        assert_eq!(err, ScheduleError::NoEmployees);

        let err = ShiftScheduler::new(
            &ShiftRequest::new(1, "08:00-12:00").with_max_consecutive_work(0),
        )
        .unwrap_err();
        assert_eq!(err, ScheduleError::ZeroWorkLimit);

        let err =
            ShiftScheduler::new(&ShiftRequest::new(1, "08:00-12:00").with_rest_after_work(45))
                .unwrap_err();
        assert_eq!(err, ScheduleError::UnsupportedRest(45));

        let err = ShiftScheduler::new(&ShiftRequest::new(1, "12:00-08:00")).unwrap_err();
        assert!(matches!(err, ScheduleError::EmptyHorizon(_)));

        let err = ShiftScheduler::new(&ShiftRequest::new(1, "08:00-12:00").with_requirement("A"))
            .unwrap_err();
        assert!(matches!(err, ScheduleError::MalformedRequirement { .. }));

        let err = ShiftScheduler::new(
            &ShiftRequest::new(1, "08:00-12:00").with_mandatory_break("09:00-10:00", 0),
        )
        .unwrap_err();
        assert_eq!(err, ScheduleError::ZeroBreakMinutes);

        let err = ShiftScheduler::new(
            &ShiftRequest::new(1, "08:00-12:00").with_mandatory_break("nine", 30),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::InvalidRange { .. } | ScheduleError::InvalidTime { .. }
        ));
    }

    #[test]
    fn test_minutes_round_up_to_slots() {
        let request = ShiftRequest::new(1, "08:00-12:00")
            .with_max_consecutive_work(61)
            .with_rest_after_work(60)
            .with_mandatory_break("09:00-10:30", 31);
        let scheduler = ShiftScheduler::new(&request).unwrap();

        assert_eq!(scheduler.rules().max_consecutive_work_slots, 3);
        assert_eq!(scheduler.rules().rest_slots_after_work, 2);
        assert_eq!(scheduler.break_window().unwrap().min_rest_slots(), 2);
    }

    #[test]
    fn test_employee_naming_and_grid_shape() {
        let request = ShiftRequest::new(3, "08:00-09:00");
        let (grid, report) = run(&request);

        assert_eq!(report.status, ScheduleStatus::Optimal);
        let names: Vec<&str> = grid.rows.iter().map(|row| row.employee.as_str()).collect();
        assert_eq!(names, ["K1", "K2", "K3"]);
        for row in &grid.rows {
            assert_eq!(row.cells.len(), 2);
        }
        let stat_names: Vec<&str> = report
            .employee_stats
            .iter()
            .map(|stats| stats.employee.as_str())
            .collect();
        assert_eq!(stat_names, ["K1", "K2", "K3"]);
    }

    #[test]
    fn test_request_defaults_and_serde() {
        let request = ShiftRequest::new(2, "08:00-12:00");
        assert_eq!(request.max_consecutive_work_minutes, 240);
        assert_eq!(request.rest_after_work_minutes, 30);
        assert!(request.requirements.is_empty());
        assert!(request.mandatory_break.is_none());

        // omitted fields fall back to the same defaults
        let parsed: ShiftRequest =
            serde_json::from_str(r#"{"employees": 1, "horizon": "08:00-09:00"}"#).unwrap();
        assert_eq!(parsed.max_consecutive_work_minutes, 240);
        assert_eq!(parsed.rest_after_work_minutes, 30);
        assert!(parsed.mandatory_break.is_none());
    }
}
