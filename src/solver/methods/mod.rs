//! Single-step kernels for the integration methods
//!
//! # Design
//!
//! Every method here computes ONE candidate step and its local error
//! estimate; the accept/reject loop, history bookkeeping and step-size
//! control live in the [driver](crate::solver::IntegrationDriver). A method
//! is therefore a pure function of:
//!
//! - the model,
//! - the current point `(t, x)`,
//! - the step size `h`,
//! - a slice of derivative history at *equally spaced* accepted points,
//!   newest first, with `history[0] = f(t, x)`.
//!
//! # Error estimates
//!
//! Each method reports the order of its error estimate through
//! `control_order()`, which the controller uses as `p` in
//! `h·safety·‖e‖^(−1/(p+1))`. This is deliberately distinct from `order()`,
//! the order of the step itself: the Adams methods estimate error by
//! comparison against a lower-order companion, so the estimate's order trails
//! the method's.
//!
//! | Method | `order()` | `control_order()` | estimate |
//! |--------|-----------|-------------------|----------|
//! | AB2    | 2         | 1                 | difference to forward Euler |
//! | AB4    | 4         | 2                 | difference to AB2 on the same history |
//! | AM2    | 2         | 2                 | Milne device, (corrector − predictor)/6 |
//! | SDIRK3 | 3         | 3                 | step doubling, (x_half − x_full)/7 |
//! | RK4    | 4         | 4                 | step doubling, (x_half − x_full)/15 |

use nalgebra::DVector;

use crate::physics::SystemModel;

mod ab2;
mod ab4;
mod am2;
mod dirk;
mod rk4;

pub(crate) use ab2::AdamsBashforth2;
pub(crate) use ab4::AdamsBashforth4;
pub(crate) use am2::AdamsMoulton2;
pub(crate) use dirk::Sdirk3;
pub(crate) use rk4::RungeKutta4;

// =================================================================================================
// Step interface
// =================================================================================================

/// Everything a method sees when taking one step.
pub(crate) struct StepContext<'a> {
    /// Current time
    pub t: f64,
    /// Current state
    pub state: &'a DVector<f64>,
    /// Step size to attempt
    pub h: f64,
    /// Derivative history at accepted points, newest first.
    /// `history[0]` is always `f(t, state)`; entries are spaced `h` apart.
    pub history: &'a [DVector<f64>],
}

/// What one attempted step produced.
pub(crate) struct StepOutcome {
    /// Candidate state at t + h
    pub state: DVector<f64>,
    /// Local error estimate for the candidate
    pub error_estimate: DVector<f64>,
    /// False when an inner iteration (fixed-point or Newton) failed to
    /// converge; the driver treats the step as rejected at maximum shrink.
    pub converged: bool,
}

impl StepOutcome {
    pub(crate) fn converged(state: DVector<f64>, error_estimate: DVector<f64>) -> Self {
        Self {
            state,
            error_estimate,
            converged: true,
        }
    }

    /// Outcome for a step whose inner iteration failed.
    pub(crate) fn diverged(dimension: usize) -> Self {
        Self {
            state: DVector::zeros(dimension),
            error_estimate: DVector::zeros(dimension),
            converged: false,
        }
    }
}

/// One integration method's step kernel.
pub(crate) trait IntegrationMethod {
    /// Nominal order of accuracy of the step
    fn order(&self) -> usize;

    /// Order of the error estimate, used by the step-size controller
    fn control_order(&self) -> usize;

    /// Derivative history entries the method needs (including `history[0]`)
    fn history_required(&self) -> usize;

    /// Attempt one step from `ctx.t` to `ctx.t + ctx.h`.
    fn step(&self, model: &dyn SystemModel, ctx: &StepContext<'_>) -> StepOutcome;
}

// =================================================================================================
// Tests
// =================================================================================================
