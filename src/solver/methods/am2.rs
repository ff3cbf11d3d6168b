//! 2-step Adams–Moulton method (predictor-corrector)
//!
//! # Mathematical Background
//!
//! The 2-step Adams–Moulton formula is the trapezoidal rule,
//!
//! ```text
//! X_{n+1} = X_n + h/2·( f(t_{n+1}, X_{n+1}) + f_n )
//! ```
//!
//! It is implicit: `X_{n+1}` appears inside `f`. Rather than a Newton solve,
//! this implementation follows the classical predictor-corrector scheme:
//! predict with AB2, then iterate the corrector to a fixed point,
//!
//! ```text
//! X⁰     = X_n + h·( 3/2·f_n − 1/2·f_{n−1} )          (predict, AB2)
//! Xᵐ⁺¹  = X_n + h/2·( f(t_{n+1}, Xᵐ) + f_n )          (correct)
//! ```
//!
//! The fixed-point map contracts only while `h·L/2 < 1` (L the local
//! Lipschitz constant), so on stiff problems the corrector simply stops
//! converging: the step reports `converged = false` and the driver shrinks
//! `h`. That behaviour is correct and intended; the implicit method that
//! *solves* the stiffness is [SDIRK3](super::Sdirk3).
//!
//! # Error estimate
//!
//! Milne's device: predictor and corrector are both second order with known
//! error constants 5/12 and −1/12, so
//!
//! ```text
//! e ≈ (X_corrected − X_predicted) / 6
//! ```
//!
//! estimating the corrector's own error, hence `control_order() = 2`.

use nalgebra::DVector;

use crate::physics::SystemModel;
use crate::solver::methods::{IntegrationMethod, StepContext, StepOutcome};

pub(crate) struct AdamsMoulton2 {
    /// Corrector iteration cap
    max_iterations: usize,
}

impl Default for AdamsMoulton2 {
    fn default() -> Self {
        Self { max_iterations: 50 }
    }
}

impl IntegrationMethod for AdamsMoulton2 {
    fn order(&self) -> usize {
        2
    }

    fn control_order(&self) -> usize {
        2
    }

    fn history_required(&self) -> usize {
        2
    }

    fn step(&self, model: &dyn SystemModel, ctx: &StepContext<'_>) -> StepOutcome {
        let f_n = &ctx.history[0];
        let f_prev = &ctx.history[1];
        let t_next = ctx.t + ctx.h;

        // Predict (AB2)
        let predicted = ctx.state + ctx.h * (1.5 * f_n - 0.5 * f_prev);

        // Correct to a fixed point of the trapezoidal rule
        let mut current = predicted.clone();
        let mut converged = false;

        for _ in 0..self.max_iterations {
            let f_next = model.evaluate(t_next, &current);
            let next = ctx.state + 0.5 * ctx.h * (&f_next + f_n);

            let delta = (&next - &current).norm();
            current = next;

            if delta <= 1e-10 * (1.0 + current.norm()) {
                converged = true;
                break;
            }
        }

        if !converged || current.iter().any(|v| !v.is_finite()) {
            return StepOutcome::diverged(ctx.state.len());
        }

        // Milne's device
        let error_estimate = (&current - &predicted) / 6.0;

        StepOutcome::converged(current, error_estimate)
    }
}
