//! Reference search backend.
//!
//! Chronological backtracking over variables in declaration order, with
//! branch-and-bound pruning when the model carries an objective. Each
//! constraint is checked as soon as its last open variable is assigned,
//! so dead branches are cut without a propagation engine.
//!
//! # Concepts
//!
//! - **Deadline**: the wall-clock budget is checked every few hundred
//!   nodes; running out downgrades the verdict to FEASIBLE or UNKNOWN.
//! - **Incumbent**: best full assignment seen so far; its objective value
//!   bounds the remaining search.
//!
//! # References
//!
//! - Rossi, van Beek & Walsh, "Handbook of Constraint Programming" (2006)

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::cp::model::{Constraint, CpModel, ModelVar};
use crate::cp::solver::{CpSolution, CpSolver, SolveStats, SolveStatus, SolverConfig};
use crate::cp::variables::{LinearExpr, Literal, Term};

/// Nodes between wall-clock checks.
const DEADLINE_CHECK_INTERVAL: u64 = 256;

/// Depth-first search with branch-and-bound pruning.
///
/// Branches in declaration order over variables and in domain order over
/// values, so the first solution of a satisfaction model is deterministic.
/// [`with_value_shuffle`](Self::with_value_shuffle) randomizes value order
/// for diversification while keeping runs reproducible.
#[derive(Debug, Clone, Default)]
pub struct BacktrackSolver {
    shuffle_seed: Option<u64>,
}

impl BacktrackSolver {
    /// Creates a solver that branches in plain domain order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shuffles each variable's value order with a seeded generator.
    pub fn with_value_shuffle(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }
}

impl CpSolver for BacktrackSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let started = Instant::now();
        if let Err(reason) = model.validate() {
            debug!(%reason, "model rejected");
            let stats = SolveStats {
                nodes: 0,
                wall_time: started.elapsed(),
            };
            return CpSolution::without_values(SolveStatus::ModelInvalid, stats);
        }
        Search::new(model, self.shuffle_seed).run(config.time_budget, started)
    }
}

/// Best full assignment found so far.
struct Incumbent {
    int_values: Vec<i64>,
    bool_values: Vec<bool>,
    objective: i64,
}

/// One in-flight search over a validated model.
struct Search<'a> {
    model: &'a CpModel,
    order: &'a [ModelVar],
    /// Candidate values per search depth; booleans branch over `[0, 1]`.
    candidates: Vec<Vec<i64>>,
    int_values: Vec<Option<i64>>,
    bool_values: Vec<Option<bool>>,
    /// Constraint indices watching each variable, one entry per pair.
    int_watchers: Vec<Vec<usize>>,
    bool_watchers: Vec<Vec<usize>>,
    /// Unassigned distinct variables left per constraint.
    open_vars: Vec<usize>,
    objective: Option<&'a LinearExpr>,
    incumbent: Option<Incumbent>,
    nodes: u64,
}

impl<'a> Search<'a> {
    fn new(model: &'a CpModel, shuffle_seed: Option<u64>) -> Self {
        let order = model.declared_vars();
        let mut candidates: Vec<Vec<i64>> = order
            .iter()
            .map(|var| match var {
                ModelVar::Int(v) => model.domain(*v).to_vec(),
                ModelVar::Bool(_) => vec![0, 1],
            })
            .collect();
        if let Some(seed) = shuffle_seed {
            let mut rng = StdRng::seed_from_u64(seed);
            for values in &mut candidates {
                values.shuffle(&mut rng);
            }
        }

        let mut int_watchers = vec![Vec::new(); model.num_int_vars()];
        let mut bool_watchers = vec![Vec::new(); model.num_bool_vars()];
        let mut open_vars = Vec::with_capacity(model.constraint_count());
        for (index, constraint) in model.constraints().iter().enumerate() {
            let mut seen: Vec<ModelVar> = Vec::new();
            constraint.for_each_var(|var| {
                if !seen.contains(&var) {
                    seen.push(var);
                }
            });
            open_vars.push(seen.len());
            for var in seen {
                match var {
                    ModelVar::Int(v) => int_watchers[v.index()].push(index),
                    ModelVar::Bool(v) => bool_watchers[v.index()].push(index),
                }
            }
        }

        Self {
            model,
            order,
            candidates,
            int_values: vec![None; model.num_int_vars()],
            bool_values: vec![None; model.num_bool_vars()],
            int_watchers,
            bool_watchers,
            open_vars,
            objective: model.objective(),
            incumbent: None,
            nodes: 0,
        }
    }

    fn run(mut self, budget: Duration, started: Instant) -> CpSolution {
        if started.elapsed() >= budget {
            return self.finish(SolveStatus::Unknown, started);
        }
        // Constraints with no variables are settled before branching.
        for (index, constraint) in self.model.constraints().iter().enumerate() {
            if self.open_vars[index] == 0 && !self.evaluate(constraint) {
                return self.finish(SolveStatus::Infeasible, started);
            }
        }

        let num_vars = self.order.len();
        let mut cursor = vec![0usize; num_vars + 1];
        let mut depth = 0usize;
        let mut out_of_time = false;

        loop {
            if depth == num_vars {
                // Full consistent assignment.
                match self.objective {
                    None => {
                        self.record_incumbent(0);
                        break;
                    }
                    Some(objective) => {
                        let value = self.expr_value(objective).unwrap_or(0);
                        let improves = self
                            .incumbent
                            .as_ref()
                            .map_or(true, |best| value < best.objective);
                        if improves {
                            debug!(objective = value, nodes = self.nodes, "incumbent improved");
                            self.record_incumbent(value);
                        }
                        if depth == 0 {
                            break;
                        }
                        depth -= 1;
                        self.unassign(depth);
                        continue;
                    }
                }
            }

            let position = cursor[depth];
            if position == self.candidates[depth].len() {
                cursor[depth] = 0;
                if depth == 0 {
                    break;
                }
                depth -= 1;
                self.unassign(depth);
                continue;
            }
            cursor[depth] = position + 1;

            self.nodes += 1;
            if self.nodes % DEADLINE_CHECK_INTERVAL == 0 && started.elapsed() >= budget {
                out_of_time = true;
                break;
            }

            let value = self.candidates[depth][position];
            if self.assign(depth, value) {
                if self.should_prune() {
                    self.unassign(depth);
                } else {
                    depth += 1;
                }
            } else {
                self.unassign(depth);
            }
        }

        let status = match (self.incumbent.is_some(), out_of_time) {
            (true, false) => SolveStatus::Optimal,
            (true, true) => SolveStatus::Feasible,
            (false, false) => SolveStatus::Infeasible,
            (false, true) => SolveStatus::Unknown,
        };
        self.finish(status, started)
    }

    /// Assigns the variable at `position`, updates watcher counters, and
    /// checks every constraint that just became fully assigned. Counters
    /// are updated even after a violation so that [`Self::unassign`] stays
    /// an exact inverse.
    fn assign(&mut self, position: usize, value: i64) -> bool {
        let (watchers_len, is_int, var_index) = match self.order[position] {
            ModelVar::Int(var) => {
                self.int_values[var.index()] = Some(value);
                (self.int_watchers[var.index()].len(), true, var.index())
            }
            ModelVar::Bool(var) => {
                self.bool_values[var.index()] = Some(value != 0);
                (self.bool_watchers[var.index()].len(), false, var.index())
            }
        };
        let mut consistent = true;
        for watcher in 0..watchers_len {
            let constraint_index = if is_int {
                self.int_watchers[var_index][watcher]
            } else {
                self.bool_watchers[var_index][watcher]
            };
            self.open_vars[constraint_index] -= 1;
            if self.open_vars[constraint_index] == 0
                && !self.evaluate(&self.model.constraints()[constraint_index])
            {
                consistent = false;
            }
        }
        consistent
    }

    fn unassign(&mut self, position: usize) {
        let (watchers_len, is_int, var_index) = match self.order[position] {
            ModelVar::Int(var) => {
                self.int_values[var.index()] = None;
                (self.int_watchers[var.index()].len(), true, var.index())
            }
            ModelVar::Bool(var) => {
                self.bool_values[var.index()] = None;
                (self.bool_watchers[var.index()].len(), false, var.index())
            }
        };
        for watcher in 0..watchers_len {
            let constraint_index = if is_int {
                self.int_watchers[var_index][watcher]
            } else {
                self.bool_watchers[var_index][watcher]
            };
            self.open_vars[constraint_index] += 1;
        }
    }

    /// Checks a fully assigned constraint.
    fn evaluate(&self, constraint: &Constraint) -> bool {
        match constraint {
            Constraint::Linear {
                expr,
                op,
                rhs,
                only_if,
            } => {
                if !self.all_hold(only_if) {
                    return true;
                }
                match self.expr_value(expr) {
                    Some(value) => op.eval(value, *rhs),
                    None => true,
                }
            }
            Constraint::BoolAnd { literals, only_if } => {
                !self.all_hold(only_if) || self.all_hold(literals)
            }
            Constraint::BoolOr { literals, only_if } => {
                !self.all_hold(only_if)
                    || literals
                        .iter()
                        .any(|lit| self.literal_holds(*lit) == Some(true))
            }
            Constraint::MinEquality { target, exprs } => {
                let best = exprs.iter().filter_map(|expr| self.expr_value(expr)).min();
                self.expr_value(target) == best
            }
            Constraint::MaxEquality { target, exprs } => {
                let best = exprs.iter().filter_map(|expr| self.expr_value(expr)).max();
                self.expr_value(target) == best
            }
        }
    }

    fn all_hold(&self, literals: &[Literal]) -> bool {
        literals
            .iter()
            .all(|lit| self.literal_holds(*lit) == Some(true))
    }

    fn literal_holds(&self, literal: Literal) -> Option<bool> {
        self.bool_values[literal.var().index()].map(|value| literal.holds_given(value))
    }

    fn expr_value(&self, expr: &LinearExpr) -> Option<i64> {
        let mut total = expr.constant();
        for &(term, coefficient) in expr.terms() {
            let value = match term {
                Term::Int(var) => self.int_values[var.index()]?,
                Term::Lit(lit) => i64::from(self.literal_holds(lit)?),
            };
            total += value * coefficient;
        }
        Some(total)
    }

    /// Whether the current partial assignment can no longer beat the
    /// incumbent.
    fn should_prune(&self) -> bool {
        let (Some(objective), Some(best)) = (self.objective, self.incumbent.as_ref()) else {
            return false;
        };
        self.objective_lower_bound(objective) >= best.objective
    }

    /// Optimistic completion of the objective: unassigned integers take
    /// the domain extreme their coefficient favors, unassigned literals
    /// contribute only negative coefficients.
    fn objective_lower_bound(&self, objective: &LinearExpr) -> i64 {
        let mut bound = objective.constant();
        for &(term, coefficient) in objective.terms() {
            bound += match term {
                Term::Int(var) => match self.int_values[var.index()] {
                    Some(value) => value * coefficient,
                    None => {
                        let domain = self.model.domain(var);
                        let extreme = if coefficient >= 0 {
                            domain.iter().min()
                        } else {
                            domain.iter().max()
                        };
                        extreme.map_or(0, |value| value * coefficient)
                    }
                },
                Term::Lit(lit) => match self.literal_holds(lit) {
                    Some(true) => coefficient,
                    Some(false) => 0,
                    None => coefficient.min(0),
                },
            };
        }
        bound
    }

    fn record_incumbent(&mut self, objective: i64) {
        self.incumbent = Some(Incumbent {
            int_values: self
                .int_values
                .iter()
                .map(|value| value.unwrap_or(0))
                .collect(),
            bool_values: self
                .bool_values
                .iter()
                .map(|value| value.unwrap_or(false))
                .collect(),
            objective,
        });
    }

    fn finish(self, status: SolveStatus, started: Instant) -> CpSolution {
        let stats = SolveStats {
            nodes: self.nodes,
            wall_time: started.elapsed(),
        };
        debug!(
            %status,
            nodes = stats.nodes,
            elapsed_ms = stats.wall_time.as_millis() as u64,
            "search finished"
        );
        match (status.has_solution(), self.incumbent) {
            (true, Some(best)) => CpSolution::with_values(
                status,
                best.int_values,
                best.bool_values,
                self.objective.map(|_| best.objective),
                stats,
            ),
            _ => CpSolution::without_values(status, stats),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::model::CmpOp;

    // Solves with the default 115 s budget; every model here is tiny.
    fn solve(model: &CpModel) -> CpSolution {
        BacktrackSolver::new().solve(model, &SolverConfig::new())
    }

    #[test]
    fn test_simple_equality() {
        let mut model = CpModel::new();
        let x = model.new_int_var(1, 3);
        model.add_linear(LinearExpr::from_var(x), CmpOp::Eq, 2);

        let solution = solve(&model);
        assert_eq!(solution.status(), SolveStatus::Optimal);
        assert_eq!(solution.value(x), Some(2));
    }

    #[test]
    fn test_infeasible_singleton() {
        let mut model = CpModel::new();
        let x = model.new_int_var_from_values(vec![1]);
        model.add_linear(LinearExpr::from_var(x), CmpOp::Ne, 1);

        let solution = solve(&model);
        assert_eq!(solution.status(), SolveStatus::Infeasible);
        assert!(!solution.is_solution_found());
        assert_eq!(solution.value(x), None);
    }

    #[test]
    fn test_minimize_respects_lower_bound() {
        let mut model = CpModel::new();
        let x = model.new_int_var(0, 5);
        model.add_linear(LinearExpr::from_var(x), CmpOp::Ge, 2);
        model.minimize(LinearExpr::from_var(x));

        let solution = solve(&model);
        assert_eq!(solution.status(), SolveStatus::Optimal);
        assert_eq!(solution.objective_value(), Some(2));
        assert_eq!(solution.value(x), Some(2));
    }

    #[test]
    fn test_minimize_literal_penalties() {
        let mut model = CpModel::new();
        let a = model.new_bool_var();
        let b = model.new_bool_var();
        model.add_bool_or(vec![a.lit(), b.lit()]);
        model.minimize(LinearExpr::sum_of_lits([a.lit(), b.lit()]));

        let solution = solve(&model);
        assert_eq!(solution.status(), SolveStatus::Optimal);
        assert_eq!(solution.objective_value(), Some(1));
    }

    #[test]
    fn test_enforcement_literal_forces_constraint() {
        let mut model = CpModel::new();
        let x = model.new_int_var(0, 3);
        let b = model.new_bool_var();
        model.add_linear_only_if(LinearExpr::from_var(x), CmpOp::Eq, 3, &[b.lit()]);
        model.add_bool_or(vec![b.lit()]);

        let solution = solve(&model);
        assert_eq!(solution.status(), SolveStatus::Optimal);
        assert_eq!(solution.value(x), Some(3));
        assert_eq!(solution.bool_value(b), Some(true));
    }

    #[test]
    fn test_false_enforcement_makes_constraint_vacuous() {
        let mut model = CpModel::new();
        let x = model.new_int_var(0, 3);
        let b = model.new_bool_var();
        model.add_linear_only_if(LinearExpr::from_var(x), CmpOp::Eq, 3, &[b.lit()]);
        model.add_bool_or(vec![!b]);

        let solution = solve(&model);
        assert_eq!(solution.status(), SolveStatus::Optimal);
        // first value in declaration order wins once the equality is off
        assert_eq!(solution.value(x), Some(0));
    }

    #[test]
    fn test_reverse_pair_encodes_iff() {
        // y <=> (a AND b), forced from both sides.
        let check = |force_a: bool, force_b: bool, expect_y: bool| {
            let mut model = CpModel::new();
            let a = model.new_bool_var();
            let b = model.new_bool_var();
            let y = model.new_bool_var();
            model.add_bool_and_only_if(vec![a.lit(), b.lit()], &[y.lit()]);
            model.add_bool_or_only_if(vec![!a, !b], &[!y]);
            model.add_bool_or(vec![if force_a { a.lit() } else { !a }]);
            model.add_bool_or(vec![if force_b { b.lit() } else { !b }]);

            let solution = solve(&model);
            assert_eq!(solution.status(), SolveStatus::Optimal);
            assert_eq!(solution.bool_value(y), Some(expect_y));
        };
        check(true, true, true);
        check(true, false, false);
        check(false, true, false);
        check(false, false, false);
    }

    #[test]
    fn test_min_max_equality() {
        let mut model = CpModel::new();
        let low = model.new_int_var(0, 10);
        let high = model.new_int_var(0, 10);
        let x = model.new_int_var_from_values(vec![2]);
        let y = model.new_int_var_from_values(vec![5]);
        let exprs = vec![LinearExpr::from_var(x), LinearExpr::from_var(y)];
        model.add_min_equality(LinearExpr::from_var(low), exprs.clone());
        model.add_max_equality(LinearExpr::from_var(high), exprs);

        let solution = solve(&model);
        assert_eq!(solution.status(), SolveStatus::Optimal);
        assert_eq!(solution.value(low), Some(2));
        assert_eq!(solution.value(high), Some(5));
    }

    #[test]
    fn test_zero_budget_returns_unknown() {
        let mut model = CpModel::new();
        model.new_int_var(0, 1);

        let config = SolverConfig::new().with_time_budget(Duration::ZERO);
        let solution = BacktrackSolver::new().solve(&model, &config);
        assert_eq!(solution.status(), SolveStatus::Unknown);
        assert_eq!(solution.stats().nodes, 0);
    }

    #[test]
    fn test_constant_contradiction_needs_no_search() {
        let mut model = CpModel::new();
        model.new_int_var(0, 100);
        model.add_linear(LinearExpr::new(), CmpOp::Eq, 1);

        let solution = solve(&model);
        assert_eq!(solution.status(), SolveStatus::Infeasible);
        assert_eq!(solution.stats().nodes, 0);
    }

    #[test]
    fn test_invalid_model_is_rejected() {
        let mut model = CpModel::new();
        model.new_int_var_from_values(Vec::new());

        let solution = solve(&model);
        assert_eq!(solution.status(), SolveStatus::ModelInvalid);
    }

    #[test]
    fn test_value_shuffle_keeps_optimum() {
        let build = || {
            let mut model = CpModel::new();
            let x = model.new_int_var(0, 5);
            model.add_linear(LinearExpr::from_var(x), CmpOp::Ge, 2);
            model.minimize(LinearExpr::from_var(x));
            model
        };
        let plain = solve(&build());
        let shuffled = BacktrackSolver::new()
            .with_value_shuffle(42)
            .solve(&build(), &SolverConfig::new());
        assert_eq!(plain.objective_value(), Some(2));
        assert_eq!(shuffled.objective_value(), Some(2));
    }

    #[test]
    fn test_first_solution_follows_declared_value_order() {
        let mut model = CpModel::new();
        let x = model.new_int_var_from_values(vec![3, 1, 2]);

        let solution = solve(&model);
        assert_eq!(solution.status(), SolveStatus::Optimal);
        assert_eq!(solution.value(x), Some(3));
    }
}
