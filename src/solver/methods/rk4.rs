//! Classical 4th-order Runge–Kutta (multistep bootstrap)
//!
//! # Role
//!
//! The Adams methods need a derivative history at equally spaced points,
//! which does not exist at t0 and is invalidated every time the controller
//! changes the step size. RK4 fills those gaps: it is self-starting, fourth
//! order, and its steps are real trajectory steps under the same error
//! control as everything else; the bootstrap is not a lower-quality prefix.
//!
//! ```text
//! k₁ = f(t, X)
//! k₂ = f(t + h/2, X + h/2·k₁)
//! k₃ = f(t + h/2, X + h/2·k₂)
//! k₄ = f(t + h,   X + h·k₃)
//! X_{n+1} = X + h/6·(k₁ + 2k₂ + 2k₃ + k₄)
//! ```
//!
//! # Error estimate
//!
//! Step doubling with Richardson extrapolation for a fourth-order method:
//!
//! ```text
//! e ≈ (X_half − X_full) / (2⁴ − 1) = (X_half − X_full) / 15
//! ```
//!
//! with the two-half-step solution advancing the trajectory.

use nalgebra::DVector;

use crate::physics::SystemModel;
use crate::solver::methods::{IntegrationMethod, StepContext, StepOutcome};

pub(crate) struct RungeKutta4;

impl RungeKutta4 {
    /// One classical RK4 step. `f_at_x` is k₁, supplied by the caller so the
    /// doubled step reuses the evaluation.
    fn single_step(
        model: &dyn SystemModel,
        t: f64,
        x: &DVector<f64>,
        h: f64,
        f_at_x: &DVector<f64>,
    ) -> DVector<f64> {
        let k1 = f_at_x;
        let k2 = model.evaluate(t + 0.5 * h, &(x + 0.5 * h * k1));
        let k3 = model.evaluate(t + 0.5 * h, &(x + 0.5 * h * &k2));
        let k4 = model.evaluate(t + h, &(x + h * &k3));

        x + (h / 6.0) * (k1 + 2.0 * k2 + 2.0 * k3 + k4)
    }
}

impl IntegrationMethod for RungeKutta4 {
    fn order(&self) -> usize {
        4
    }

    fn control_order(&self) -> usize {
        4
    }

    fn history_required(&self) -> usize {
        0
    }

    fn step(&self, model: &dyn SystemModel, ctx: &StepContext<'_>) -> StepOutcome {
        let f0 = if ctx.history.is_empty() {
            model.evaluate(ctx.t, ctx.state)
        } else {
            ctx.history[0].clone()
        };

        let h_half = 0.5 * ctx.h;
        let t_mid = ctx.t + h_half;

        let x_full = Self::single_step(model, ctx.t, ctx.state, ctx.h, &f0);

        let x_mid = Self::single_step(model, ctx.t, ctx.state, h_half, &f0);
        let f_mid = model.evaluate(t_mid, &x_mid);
        let x_half = Self::single_step(model, t_mid, &x_mid, h_half, &f_mid);

        let error_estimate = (&x_half - &x_full) / 15.0;

        StepOutcome::converged(x_half, error_estimate)
    }
}
