//! Solver contract and solve results.
//!
//! Any backend that can search a [`CpModel`](crate::cp::CpModel) plugs in
//! through the [`CpSolver`] trait. Results carry a status, the decoded
//! variable values when a solution exists, and search statistics.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cp::model::CpModel;
use crate::cp::variables::{BoolVar, IntVar, Literal};

/// Default wall-clock budget for a single solve.
pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_secs(115);

/// Solve-time knobs shared by all backends.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Wall-clock budget; backends stop searching once it is spent.
    pub time_budget: Duration,
}

impl SolverConfig {
    /// Creates a config with the default time budget.
    pub fn new() -> Self {
        Self {
            time_budget: DEFAULT_TIME_BUDGET,
        }
    }

    /// Sets the wall-clock budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome classification of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    /// Best solution, proven.
    Optimal,
    /// A solution was found but optimality was not proven.
    Feasible,
    /// No solution exists.
    Infeasible,
    /// The search ended without a verdict.
    Unknown,
    /// The model failed structural validation.
    ModelInvalid,
}

impl SolveStatus {
    /// Whether a solution is available to decode.
    #[inline]
    pub fn has_solution(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Optimal => "OPTIMAL",
            Self::Feasible => "FEASIBLE",
            Self::Infeasible => "INFEASIBLE",
            Self::Unknown => "UNKNOWN",
            Self::ModelInvalid => "MODEL_INVALID",
        };
        f.write_str(name)
    }
}

/// Search statistics reported by a backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveStats {
    /// Search nodes visited.
    pub nodes: u64,
    /// Wall-clock time spent.
    pub wall_time: Duration,
}

/// Result of a solve: status, values, and statistics.
#[derive(Debug, Clone)]
pub struct CpSolution {
    status: SolveStatus,
    int_values: Vec<i64>,
    bool_values: Vec<bool>,
    objective: Option<i64>,
    stats: SolveStats,
}

impl CpSolution {
    /// Builds a result that carries no assignment.
    pub fn without_values(status: SolveStatus, stats: SolveStats) -> Self {
        Self {
            status,
            int_values: Vec::new(),
            bool_values: Vec::new(),
            objective: None,
            stats,
        }
    }

    /// Builds a result carrying a full assignment.
    pub fn with_values(
        status: SolveStatus,
        int_values: Vec<i64>,
        bool_values: Vec<bool>,
        objective: Option<i64>,
        stats: SolveStats,
    ) -> Self {
        Self {
            status,
            int_values,
            bool_values,
            objective,
            stats,
        }
    }

    /// Status of the solve.
    #[inline]
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Whether value queries will return assignments.
    #[inline]
    pub fn is_solution_found(&self) -> bool {
        self.status.has_solution()
    }

    /// Value of an integer variable, if a solution was found.
    pub fn value(&self, var: IntVar) -> Option<i64> {
        if self.is_solution_found() {
            self.int_values.get(var.index()).copied()
        } else {
            None
        }
    }

    /// Value of a boolean variable, if a solution was found.
    pub fn bool_value(&self, var: BoolVar) -> Option<bool> {
        if self.is_solution_found() {
            self.bool_values.get(var.index()).copied()
        } else {
            None
        }
    }

    /// Truth value of a literal, if a solution was found.
    pub fn literal_value(&self, literal: Literal) -> Option<bool> {
        self.bool_value(literal.var())
            .map(|value| literal.holds_given(value))
    }

    /// Objective value, if a minimizing solution was found.
    #[inline]
    pub fn objective_value(&self) -> Option<i64> {
        self.objective
    }

    /// Search statistics.
    #[inline]
    pub fn stats(&self) -> SolveStats {
        self.stats
    }
}

/// A backend able to search a finite-domain model.
pub trait CpSolver {
    /// Searches `model` within the bounds of `config`.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_and_builder() {
        assert_eq!(SolverConfig::new().time_budget, DEFAULT_TIME_BUDGET);
        let config = SolverConfig::default().with_time_budget(Duration::from_secs(5));
        assert_eq!(config.time_budget, Duration::from_secs(5));
    }

    #[test]
    fn test_status_display_matches_serde() {
        for status in [
            SolveStatus::Optimal,
            SolveStatus::Feasible,
            SolveStatus::Infeasible,
            SolveStatus::Unknown,
            SolveStatus::ModelInvalid,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn test_no_values_unless_solved() {
        let solution = CpSolution::with_values(
            SolveStatus::Infeasible,
            vec![7],
            vec![true],
            Some(7),
            SolveStats::default(),
        );
        assert!(!solution.is_solution_found());
        assert_eq!(solution.value(IntVar(0)), None);
        assert_eq!(solution.bool_value(BoolVar(0)), None);
        assert_eq!(solution.literal_value(BoolVar(0).lit()), None);
    }

    #[test]
    fn test_literal_value_respects_negation() {
        let solution = CpSolution::with_values(
            SolveStatus::Feasible,
            Vec::new(),
            vec![true, false],
            None,
            SolveStats::default(),
        );
        let a = BoolVar(0);
        let b = BoolVar(1);
        assert_eq!(solution.literal_value(a.lit()), Some(true));
        assert_eq!(solution.literal_value(!a), Some(false));
        assert_eq!(solution.literal_value(b.lit()), Some(false));
        assert_eq!(solution.literal_value(!b), Some(true));
    }
}
