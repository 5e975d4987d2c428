//! Shift rostering over half-hour slots.
//!
//! Schedules `K` employees across a wall-clock horizon split into
//! half-hour slots: requirement lines say where jobs must be staffed,
//! labor rules bound consecutive work and force breaks, and a
//! finite-domain constraint model hands the search to a pluggable solver
//! backend. Overconstrained days degrade to partial coverage instead of
//! failing: the objective minimizes unmet demand.
//!
//! # Modules
//!
//! - **`models`**: slot arithmetic, job registry, demand parsing, and the
//!   report/grid types a run produces
//! - **`cp`**: the finite-domain constraint toolkit and the bundled
//!   backtracking solver backend
//! - **`scheduler`**: request validation, rule translation, and solution
//!   decoding
//! - **`error`**: construction-time validation errors
//!
//! # Example
//!
//! ```
//! use shiftplan::cp::{BacktrackSolver, SolverConfig};
//! use shiftplan::scheduler::{ShiftRequest, ShiftScheduler};
//!
//! let request = ShiftRequest::new(2, "08:00-12:00")
//!     .with_requirement("A 08:00-12:00");
//! let scheduler = ShiftScheduler::new(&request)?;
//! let (grid, report) = scheduler.solve(&BacktrackSolver::new(), &SolverConfig::new());
//!
//! assert!(report.status.is_solved());
//! assert_eq!(grid.num_employees(), 2);
//! # Ok::<(), shiftplan::error::ScheduleError>(())
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Van den Bergh et al. (2013), "Personnel scheduling: a literature review"

pub mod cp;
pub mod error;
pub mod models;
pub mod scheduler;
