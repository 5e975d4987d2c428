//! Solution decoding.
//!
//! Turns a solver result back into domain terms: a per-employee grid of
//! job codes, per-employee statistics, and the list of demanded slots
//! that stayed unfilled. Failed runs produce an empty grid and a report
//! that says why.

use tracing::info;

use crate::cp::{CpSolution, SolveStatus};
use crate::models::{
    DemandMap, EmployeeRow, EmployeeStats, Horizon, JobId, ScheduleGrid, ScheduleReport,
    ScheduleStatus, SlotAssignment, UnfilledSlot, REST, REST_LABEL,
};

use super::builder::ShiftModel;

/// Display name of an employee: `K1`, `K2`, ...
pub(crate) fn employee_name(index: usize) -> String {
    format!("K{}", index + 1)
}

fn job_code(demand: &DemandMap, job: JobId) -> String {
    demand
        .jobs()
        .code_of(job)
        .map(str::to_string)
        .unwrap_or_else(|| format!("JOB_{}", job.value()))
}

/// Report for a request refuted before any solver ran.
///
/// Every demanded pair is listed as unfilled; grid and statistics stay
/// empty because no schedule exists.
pub(crate) fn pre_solve_report(
    reason: &str,
    demand: &DemandMap,
    horizon: &Horizon,
) -> (ScheduleGrid, ScheduleReport) {
    let mut report = ScheduleReport::new(ScheduleStatus::InfeasiblePreSolve);
    report.infeasible_reason = Some(reason.to_string());
    for &(job, slot) in demand.demanded_pairs() {
        report.unfilled_job_slots.push(UnfilledSlot {
            job_code: job_code(demand, job),
            time: horizon.label(slot),
            reason: "precondition not met; solving was skipped".to_string(),
        });
    }
    (ScheduleGrid::default(), report)
}

/// Decodes a solve result into a grid and report.
pub(crate) fn report_from_solution(
    solution: &CpSolution,
    shift: &ShiftModel,
    demand: &DemandMap,
    horizon: &Horizon,
) -> (ScheduleGrid, ScheduleReport) {
    let status = ScheduleStatus::from(solution.status());
    let mut report = ScheduleReport::new(status);

    if !status.is_solved() {
        report.infeasible_reason = Some(match solution.status() {
            SolveStatus::Infeasible => "solver proved the model infeasible".to_string(),
            other => format!("solving failed with status {other}"),
        });
        let reason = format!("solving failed or proved infeasible ({status})");
        for &(job, slot) in demand.demanded_pairs() {
            report.unfilled_job_slots.push(UnfilledSlot {
                job_code: job_code(demand, job),
                time: horizon.label(slot),
                reason: reason.clone(),
            });
        }
        info!(%status, "no schedule produced");
        return (ScheduleGrid::default(), report);
    }

    let mut grid = ScheduleGrid::default();
    for (employee, row) in shift.assignments.iter().enumerate() {
        let name = employee_name(employee);
        let mut cells = Vec::with_capacity(row.len());
        let mut schedule = Vec::with_capacity(row.len());
        let mut work_slots = 0u32;
        let mut rest_slots = 0u32;

        for (slot, &var) in row.iter().enumerate() {
            let value = solution.value(var).unwrap_or(REST);
            let code = if value == REST {
                rest_slots += 1;
                REST_LABEL.to_string()
            } else {
                work_slots += 1;
                let code = demand
                    .jobs()
                    .code_of_value(value)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("JOB_{value}"));
                *report.job_assignment_counts.entry(code.clone()).or_insert(0) += 1;
                code
            };
            schedule.push(SlotAssignment {
                time: horizon.label(slot),
                code: code.clone(),
            });
            cells.push(code);
        }

        report.employee_stats.push(EmployeeStats {
            employee: name.clone(),
            work_slots,
            rest_slots,
            schedule,
        });
        grid.rows.push(EmployeeRow {
            employee: name,
            cells,
        });
    }

    for &((job, slot), met) in &shift.coverage {
        if solution.bool_value(met) != Some(true) {
            report.unfilled_job_slots.push(UnfilledSlot {
                job_code: job_code(demand, job),
                time: horizon.label(slot),
                reason: "no suitable employee found for this job slot".to_string(),
            });
        }
    }

    info!(
        %status,
        objective = ?solution.objective_value(),
        unfilled = report.unfilled_job_slots.len(),
        "schedule decoded"
    );
    (grid, report)
}
