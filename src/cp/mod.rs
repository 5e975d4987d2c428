//! Finite-domain constraint programming toolkit.
//!
//! A small CP layer in the CP-SAT mold: integer variables over explicit
//! finite domains, booleans wrapped in negatable [`Literal`]s, linear
//! constraints with optional enforcement literals, and reified min/max.
//! Models are solved through the [`CpSolver`] trait so search backends
//! stay swappable; [`BacktrackSolver`] is the bundled reference backend.
//!
//! # Concepts
//!
//! - **Enforcement literal**: a constraint posted "only if" some literals
//!   hold is vacuously satisfied whenever one of them is false.
//! - **Reverse pair**: posting a constraint under `lit` and its negation
//!   under `!lit` upgrades implication to equivalence.
//!
//! # References
//!
//! - Rossi, van Beek & Walsh, "Handbook of Constraint Programming" (2006)
//! - Perron & Furnon, "OR-Tools CP-SAT" (modeling conventions)

mod backtrack;
mod model;
mod solver;
mod variables;

pub use backtrack::BacktrackSolver;
pub use model::{CmpOp, Constraint, CpModel, ModelVar};
pub use solver::{
    CpSolution, CpSolver, SolveStats, SolveStatus, SolverConfig, DEFAULT_TIME_BUDGET,
};
pub use variables::{BoolVar, IntVar, LinearExpr, Literal, Term};
