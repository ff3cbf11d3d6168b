//! 2-step Adams–Bashforth method
//!
//! # Mathematical Background
//!
//! Adams–Bashforth methods integrate the interpolating polynomial of
//! previously computed derivatives. With two history points the polynomial is
//! linear and the update is
//!
//! ```text
//! X_{n+1} = X_n + h·( 3/2·f_n − 1/2·f_{n−1} )
//! ```
//!
//! Local truncation error: (5/12)·h³·X'''(ξ), second order. One NEW
//! derivative evaluation per step (`f_n` is reused from the history), which
//! is what makes multistep methods cheap compared to Runge–Kutta at the same
//! order.
//!
//! # Error estimate
//!
//! The difference between the AB2 candidate and a forward Euler step from the
//! same point,
//!
//! ```text
//! e = h/2·(f_n − f_{n−1})
//! ```
//!
//! estimates the error of the *Euler* step (first order), so the controller
//! runs with `control_order() = 1`.

use nalgebra::DVector;

use crate::physics::SystemModel;
use crate::solver::methods::{IntegrationMethod, StepContext, StepOutcome};

pub(crate) struct AdamsBashforth2;

impl IntegrationMethod for AdamsBashforth2 {
    fn order(&self) -> usize {
        2
    }

    fn control_order(&self) -> usize {
        1
    }

    fn history_required(&self) -> usize {
        2
    }

    fn step(&self, _model: &dyn SystemModel, ctx: &StepContext<'_>) -> StepOutcome {
        let f_n = &ctx.history[0];
        let f_prev = &ctx.history[1];

        let increment = ctx.h * (1.5 * f_n - 0.5 * f_prev);
        let state = ctx.state + &increment;

        // Candidate minus the embedded Euler step
        let error_estimate = 0.5 * ctx.h * (f_n - f_prev);

        StepOutcome::converged(state, error_estimate)
    }
}
