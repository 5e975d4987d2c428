//! Labor-rule translation into a constraint model.
//!
//! One assignment variable per (employee, slot) carries either [`REST`] or
//! a job value, with a paired work indicator linked through a reverse pair
//! of half-reified equalities. The labor rules then only ever talk about
//! indicators and assignment values:
//!
//! 1. no run of work longer than the limit, and a full-length run forces a
//!    rest block right after it
//! 2. adjacent work slots carry the same job
//! 3. every employee gets an uninterrupted rest block inside the break
//!    window, when one is configured
//! 4. every demanded (job, slot) pair is covered by exactly one employee,
//!    tracked by a coverage indicator
//! 5. per-employee work totals stay within one slot of each other
//!
//! Coverage indicators are soft: the objective minimizes the number left
//! unmet, so an overconstrained day degrades to partial coverage instead
//! of infeasibility.

use tracing::debug;

use crate::cp::{BoolVar, CmpOp, CpModel, IntVar, LinearExpr, Literal};
use crate::models::{DemandMap, Horizon, JobId, REST};

use super::interpret::employee_name;
use super::precheck::BreakWindow;
use super::WorkRules;

/// A built constraint model plus the handles needed to decode a solution.
pub(crate) struct ShiftModel {
    pub model: CpModel,
    /// Assignment variables, `assignments[employee][slot]`.
    pub assignments: Vec<Vec<IntVar>>,
    /// Coverage indicator per demanded (job, slot) pair, in demand order.
    pub coverage: Vec<((JobId, usize), BoolVar)>,
}

/// Result of model construction.
pub(crate) enum BuildOutcome {
    Model(ShiftModel),
    /// Construction itself refuted the request; no model to solve.
    Infeasible { reason: String },
}

/// Translates one validated request into a [`ShiftModel`].
pub(crate) struct ModelBuilder<'a> {
    employees: usize,
    num_slots: usize,
    horizon: &'a Horizon,
    demand: &'a DemandMap,
    rules: &'a WorkRules,
    break_window: Option<&'a BreakWindow>,
    model: CpModel,
    assignments: Vec<Vec<IntVar>>,
    work: Vec<Vec<BoolVar>>,
    coverage: Vec<((JobId, usize), BoolVar)>,
}

impl<'a> ModelBuilder<'a> {
    pub(crate) fn new(
        employees: usize,
        horizon: &'a Horizon,
        demand: &'a DemandMap,
        rules: &'a WorkRules,
        break_window: Option<&'a BreakWindow>,
    ) -> Self {
        Self {
            employees,
            num_slots: horizon.num_slots(),
            horizon,
            demand,
            rules,
            break_window,
            model: CpModel::new(),
            assignments: Vec::new(),
            work: Vec::new(),
            coverage: Vec::new(),
        }
    }

    pub(crate) fn build(mut self) -> BuildOutcome {
        self.declare_assignment_vars();
        self.restrict_to_demanded_jobs();
        self.add_consecutive_work_limits();
        self.add_forced_rest_after_max_run();
        self.add_job_continuity();
        if let Some(reason) = self.add_mandatory_break() {
            return BuildOutcome::Infeasible { reason };
        }
        self.add_demand_coverage();
        self.add_workload_fairness();
        self.set_objective();
        BuildOutcome::Model(ShiftModel {
            model: self.model,
            assignments: self.assignments,
            coverage: self.coverage,
        })
    }

    /// One assignment variable and one work indicator per (employee, slot),
    /// linked so the indicator is true exactly when the slot is not REST.
    fn declare_assignment_vars(&mut self) {
        let mut domain = vec![REST];
        domain.extend(self.demand.jobs().ids().map(JobId::value));

        for _ in 0..self.employees {
            let mut row = Vec::with_capacity(self.num_slots);
            let mut work_row = Vec::with_capacity(self.num_slots);
            for _ in 0..self.num_slots {
                let task = self.model.new_int_var_from_values(domain.clone());
                let working = self.model.new_bool_var();
                self.model.add_linear_only_if(
                    LinearExpr::from_var(task),
                    CmpOp::Ne,
                    REST,
                    &[working.lit()],
                );
                self.model
                    .add_linear_only_if(LinearExpr::from_var(task), CmpOp::Eq, REST, &[!working]);
                row.push(task);
                work_row.push(working);
            }
            self.assignments.push(row);
            self.work.push(work_row);
        }
        debug!(
            employees = self.employees,
            slots = self.num_slots,
            jobs = self.demand.jobs().len(),
            "declared assignment variables"
        );
    }

    /// A job may only appear in slots where it is demanded.
    fn restrict_to_demanded_jobs(&mut self) {
        for job in self.demand.jobs().ids() {
            for slot in 0..self.num_slots {
                if self.demand.is_demanded(job, slot) {
                    continue;
                }
                for employee in 0..self.employees {
                    self.model.add_linear(
                        LinearExpr::from_var(self.assignments[employee][slot]),
                        CmpOp::Ne,
                        job.value(),
                    );
                }
            }
        }
    }

    /// Every window of `max_run + 1` slots holds at most `max_run` work
    /// slots, so no run of work exceeds the limit.
    fn add_consecutive_work_limits(&mut self) {
        let max_run = self.rules.max_consecutive_work_slots;
        if self.num_slots <= max_run {
            return;
        }
        for employee in 0..self.employees {
            for start in 0..(self.num_slots - max_run) {
                let window = LinearExpr::sum_of_lits(
                    self.work[employee][start..=start + max_run].iter().copied(),
                );
                self.model.add_linear(window, CmpOp::Le, max_run as i64);
            }
        }
    }

    /// After a full-length run of work the next `rest` slots are REST.
    ///
    /// Detection uses a reverse pair: a block indicator implies the whole
    /// block works, and its negation implies some slot in the block rests.
    /// Runs that end too close to the horizon edge for the rest block to
    /// fit are exempt, so a maximal run may close out the day.
    fn add_forced_rest_after_max_run(&mut self) {
        let max_run = self.rules.max_consecutive_work_slots;
        let rest = self.rules.rest_slots_after_work;
        if self.num_slots < max_run + rest {
            return;
        }
        let last_start = self.num_slots - max_run - rest;
        for employee in 0..self.employees {
            for start in 0..=last_start {
                let block: Vec<Literal> = self.work[employee][start..start + max_run]
                    .iter()
                    .map(|working| working.lit())
                    .collect();
                let ran_full_block = self.model.new_bool_var();
                self.model
                    .add_bool_and_only_if(block.clone(), &[ran_full_block.lit()]);
                let broken: Vec<Literal> = block.iter().map(|lit| !*lit).collect();
                self.model.add_bool_or_only_if(broken, &[!ran_full_block]);
                for offset in 0..rest {
                    self.model.add_linear_only_if(
                        LinearExpr::from_var(self.assignments[employee][start + max_run + offset]),
                        CmpOp::Eq,
                        REST,
                        &[ran_full_block.lit()],
                    );
                }
            }
        }
    }

    /// Adjacent work slots of one employee carry the same job; switching
    /// jobs requires a rest in between.
    fn add_job_continuity(&mut self) {
        for employee in 0..self.employees {
            for slot in 1..self.num_slots {
                let previous = self.assignments[employee][slot - 1];
                let current = self.assignments[employee][slot];
                let both_working = [
                    self.work[employee][slot - 1].lit(),
                    self.work[employee][slot].lit(),
                ];
                self.model.add_linear_only_if(
                    LinearExpr::from_var(previous).plus_term(current, -1),
                    CmpOp::Eq,
                    0,
                    &both_working,
                );
            }
        }
    }

    /// Each employee rests for `min_rest_slots` consecutive slots starting
    /// somewhere inside the break window.
    ///
    /// One candidate indicator per feasible start, reified as the
    /// conjunction of per-slot rest indicators; at least one candidate
    /// must hold. Returns a reason instead of a model when no start fits.
    fn add_mandatory_break(&mut self) -> Option<String> {
        let window = self.break_window?;
        let min_rest = window.min_rest_slots();

        for employee in 0..self.employees {
            let mut options: Vec<Literal> = Vec::new();
            if window.len() >= min_rest {
                for start in window.start_rel()..=(window.end_rel() - min_rest) {
                    let mut resting: Vec<LinearExpr> = Vec::with_capacity(min_rest);
                    for offset in 0..min_rest {
                        let slot = start + offset;
                        let is_rest = self.model.new_bool_var();
                        self.model.add_linear_only_if(
                            LinearExpr::from_var(self.assignments[employee][slot]),
                            CmpOp::Eq,
                            REST,
                            &[is_rest.lit()],
                        );
                        self.model.add_linear_only_if(
                            LinearExpr::from_var(self.assignments[employee][slot]),
                            CmpOp::Ne,
                            REST,
                            &[!is_rest],
                        );
                        resting.push(LinearExpr::from_lit(is_rest));
                    }
                    let rested_here = self.model.new_bool_var();
                    self.model
                        .add_min_equality(LinearExpr::from_lit(rested_here), resting);
                    options.push(rested_here.lit());
                }
            }
            if options.is_empty() {
                return Some(format!(
                    "employee {} has no feasible rest start inside break window {}",
                    employee_name(employee),
                    window.label(self.horizon),
                ));
            }
            self.model.add_bool_or(options);
        }
        None
    }

    /// One coverage indicator per demanded (job, slot) pair, true exactly
    /// when one single employee works that job in that slot.
    fn add_demand_coverage(&mut self) {
        for &(job, slot) in self.demand.demanded_pairs() {
            let mut takers: Vec<Literal> = Vec::with_capacity(self.employees);
            for employee in 0..self.employees {
                let takes_job = self.model.new_bool_var();
                self.model.add_linear_only_if(
                    LinearExpr::from_var(self.assignments[employee][slot]),
                    CmpOp::Eq,
                    job.value(),
                    &[takes_job.lit()],
                );
                self.model.add_linear_only_if(
                    LinearExpr::from_var(self.assignments[employee][slot]),
                    CmpOp::Ne,
                    job.value(),
                    &[!takes_job],
                );
                takers.push(takes_job.lit());
            }
            let met = self.model.new_bool_var();
            let staffed = LinearExpr::sum_of_lits(takers);
            self.model
                .add_linear_only_if(staffed.clone(), CmpOp::Eq, 1, &[met.lit()]);
            self.model.add_linear_only_if(staffed, CmpOp::Ne, 1, &[!met]);
            self.coverage.push(((job, slot), met));
        }
        debug!(pairs = self.coverage.len(), "posted demand coverage");
    }

    /// Work totals may differ by at most one slot across employees.
    fn add_workload_fairness(&mut self) {
        let horizon_slots = self.num_slots as i64;

        let mut totals: Vec<IntVar> = Vec::with_capacity(self.employees);
        for employee in 0..self.employees {
            let total = self.model.new_int_var(0, horizon_slots);
            let worked = LinearExpr::sum_of_lits(self.work[employee].iter().copied())
                .plus_term(total, -1);
            self.model.add_linear(worked, CmpOp::Eq, 0);
            totals.push(total);
        }

        let loads: Vec<LinearExpr> = totals.iter().map(|&t| LinearExpr::from_var(t)).collect();
        let lightest = self.model.new_int_var(0, horizon_slots);
        let heaviest = self.model.new_int_var(0, horizon_slots);
        self.model
            .add_min_equality(LinearExpr::from_var(lightest), loads.clone());
        self.model
            .add_max_equality(LinearExpr::from_var(heaviest), loads);

        let spread = self.model.new_int_var(0, horizon_slots);
        self.model.add_linear(
            LinearExpr::from_var(heaviest)
                .plus_term(lightest, -1)
                .plus_term(spread, -1),
            CmpOp::Eq,
            0,
        );
        self.model
            .add_linear(LinearExpr::from_var(spread), CmpOp::Le, 1);
    }

    /// Minimize the number of unmet coverage indicators. A request without
    /// demand has nothing to optimize.
    fn set_objective(&mut self) {
        if self.coverage.is_empty() {
            return;
        }
        let unmet = LinearExpr::sum_of_lits(self.coverage.iter().map(|&(_, met)| !met));
        self.model.minimize(unmet);
    }
}
