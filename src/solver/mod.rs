//! Numerical solvers
//!
//! This module provides the adaptive integration machinery that advances a
//! [`SystemModel`](crate::physics::SystemModel) through time.
//!
//! # Core Concepts
//!
//! ## The Architecture (WHAT vs HOW)
//!
//! The solver architecture separates concerns into three layers:
//!
//! 1. **Scenario** ([`Scenario`]): WHAT to solve
//!    - The system of equations (a boxed [`SystemModel`](crate::physics::SystemModel))
//!    - The initial state
//!
//! 2. **Configuration** ([`RunConfiguration`]): HOW to solve
//!    - Method selection ([`MethodKind`])
//!    - Time span, tolerances, step bounds, budgets
//!
//! 3. **Driver** ([`IntegrationDriver`]): the machinery
//!    - Accept/reject loop with weighted-RMS error control
//!    - Derivative-history management for the multistep methods
//!    - RK4 bootstrap where history is missing or invalidated
//!
//! This separation allows the same scenario to be run under every method
//! with nothing but a different [`MethodKind`], which is exactly how the
//! convergence tests and benchmarks compare them.
//!
//! # Module Organization
//!
//! - **`traits`**: [`Solver`], [`Scenario`], [`RunConfiguration`],
//!   [`SimulationResult`] and friends
//! - **`error`**: [`SolverError`]
//! - **`control`**: [`ErrorControl`], the weighted-RMS accept/reject and
//!   step-size proposal logic
//! - **`newton`**: Newton iteration for the implicit stage equations
//! - **`methods`**: the step kernels (AB2, AB4, AM2, SDIRK3, RK4)
//! - **`driver`**: [`IntegrationDriver`], the adaptive loop
//!
//! # Quick Start Example
//!
//! ```rust
//! use microgrid_rs::models::RenewableSystem;
//! use microgrid_rs::solver::{
//!     IntegrationDriver, MethodKind, RunConfiguration, Scenario, Solver,
//! };
//!
//! let model = RenewableSystem::base_case();
//! let initial = model.initial_state();
//! let scenario = Scenario::new(Box::new(model), initial);
//!
//! let config = RunConfiguration::new(MethodKind::Ab4, 0.0, 24.0)
//!     .with_tolerances(1e-8, 1e-6);
//!
//! let result = IntegrationDriver::new().solve(&scenario, &config)?;
//! println!("{} accepted steps, {} rejected", result.step_count, result.rejected_steps);
//! # Ok::<(), microgrid_rs::solver::SolverError>(())
//! ```
//!
//! # Choosing a Method
//!
//! - **AB2 / AB4**: explicit multistep, one new derivative evaluation per
//!   step. Cheapest per step; the method of choice for smooth, non-stiff
//!   trajectories. AB4 pays off when tolerances are tight.
//! - **AM2**: implicit trapezoidal rule via predictor-corrector. Better
//!   error constant than AB2 at the same order; the fixed-point corrector
//!   still limits it to non-stiff steps.
//! - **DIRK (SDIRK3)**: L-stable implicit Runge–Kutta. Pays a Newton solve
//!   per stage, but its step size near stiff boundaries is
//!   limited by accuracy, not stability. The right tool when the battery
//!   capacity gate is steep.
//!
//! # Error Handling
//!
//! [`Solver::solve`] returns `Err` only for misuse: an invalid
//! configuration or a scenario whose initial state cannot run. Runs that
//! start but stop early return `Ok` with a non-`Completed` [`RunStatus`] and
//! the partial trajectory, so a stalled run can still be inspected.

// =================================================================================================
// Module Declarations
// =================================================================================================

mod control;
mod driver;
mod error;
mod methods;
mod newton;
mod traits;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use control::ErrorControl;
pub use driver::IntegrationDriver;
pub use error::SolverError;
pub use traits::{
    MethodKind, RunConfiguration, RunStatus, Scenario, SimulationResult, Solver, StepRecord,
};

// =================================================================================================
// Helper Functions
// =================================================================================================

use nalgebra::DVector;

/// Validate a candidate state for numerical issues.
///
/// NaN arises from 0/0 or Inf − Inf, Inf from overflow; both mean the step
/// that produced this state is unusable. The driver treats a failed
/// validation as a rejection (shrinking the step usually cures overflow),
/// escalating only when the retry budget runs out.
pub(crate) fn validate_state(state: &DVector<f64>, t: f64) -> Result<(), SolverError> {
    for (i, value) in state.iter().enumerate() {
        if value.is_nan() {
            return Err(SolverError::NumericalInstability {
                t,
                detail: format!("NaN in state component {}", i),
            });
        }
        if value.is_infinite() {
            return Err(SolverError::NumericalInstability {
                t,
                detail: format!("Infinity in state component {}", i),
            });
        }
    }
    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================
