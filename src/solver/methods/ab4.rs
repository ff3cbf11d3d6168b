//! 4-step Adams–Bashforth method
//!
//! # Mathematical Background
//!
//! With four history points the interpolating polynomial is cubic and the
//! update carries the classical coefficients
//!
//! ```text
//! X_{n+1} = X_n + h/24·( 55·f_n − 59·f_{n−1} + 37·f_{n−2} − 9·f_{n−3} )
//! ```
//!
//! Local truncation error: (251/720)·h⁵·X⁽⁵⁾(ξ), fourth order at ONE new
//! derivative evaluation per step, against four for RK4.
//!
//! # Error estimate
//!
//! The difference between the AB4 candidate and the AB2 candidate built from
//! the same history,
//!
//! ```text
//! e = h/24·( 19·f_n − 47·f_{n−1} + 37·f_{n−2} − 9·f_{n−3} )
//! ```
//!
//! estimates the error of the embedded AB2 step, so `control_order() = 2`.

use nalgebra::DVector;

use crate::physics::SystemModel;
use crate::solver::methods::{IntegrationMethod, StepContext, StepOutcome};

pub(crate) struct AdamsBashforth4;

impl IntegrationMethod for AdamsBashforth4 {
    fn order(&self) -> usize {
        4
    }

    fn control_order(&self) -> usize {
        2
    }

    fn history_required(&self) -> usize {
        4
    }

    fn step(&self, _model: &dyn SystemModel, ctx: &StepContext<'_>) -> StepOutcome {
        let [f0, f1, f2, f3] = [
            &ctx.history[0],
            &ctx.history[1],
            &ctx.history[2],
            &ctx.history[3],
        ];

        let increment = (ctx.h / 24.0) * (55.0 * f0 - 59.0 * f1 + 37.0 * f2 - 9.0 * f3);
        let state = ctx.state + &increment;

        // Candidate minus the embedded AB2 step on the same history
        let error_estimate = (ctx.h / 24.0) * (19.0 * f0 - 47.0 * f1 + 37.0 * f2 - 9.0 * f3);

        StepOutcome::converged(state, error_estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::methods::test_support::{exponential_history, LinearGrowth};
    use approx::assert_relative_eq;

    #[test]
    fn test_ab4_formula_on_exponential() {
        let model = LinearGrowth { lambda: -0.5 };
        let (t, h) = (2.0_f64, 0.2);
        let state = DVector::from_vec(vec![(-0.5 * t).exp()]);
        let history = exponential_history(-0.5, t, h, 4);

        let ctx = StepContext {
            t,
            state: &state,
            h,
            history: &history,
        };
        let outcome = AdamsBashforth4.step(&model, &ctx);

        let expected = state[0]
            + h / 24.0
                * (55.0 * history[0][0] - 59.0 * history[1][0] + 37.0 * history[2][0]
                    - 9.0 * history[3][0]);
        assert_relative_eq!(outcome.state[0], expected, max_relative = 1e-14);
    }

    #[test]
    fn test_ab4_error_is_distance_to_ab2() {
        let model = LinearGrowth { lambda: 1.0 };
        let state = DVector::from_vec(vec![1.0]);
        let history: Vec<_> = [1.0, 0.8, 0.7, 0.65]
            .iter()
            .map(|&f| DVector::from_vec(vec![f]))
            .collect();
        let h = 0.1;

        let ctx = StepContext {
            t: 0.0,
            state: &state,
            h,
            history: &history,
        };
        let outcome = AdamsBashforth4.step(&model, &ctx);

        let ab2 = state[0] + h * (1.5 * history[0][0] - 0.5 * history[1][0]);
        assert_relative_eq!(
            outcome.error_estimate[0],
            outcome.state[0] - ab2,
            max_relative = 1e-13
        );
    }

    #[test]
    fn test_ab4_exact_on_cubic_derivative_history() {
        // f(t) = t³ sampled on a uniform grid: the cubic interpolant is exact,
        // so AB4 reproduces ∫ t³ dt over the step to machine precision.
        let model = LinearGrowth { lambda: 0.0 }; // unused by the kernel
        let (t, h) = (1.0, 0.25);
        let state = DVector::from_vec(vec![0.0]);
        let history: Vec<_> = (0..4)
            .map(|i| {
                let ti: f64 = t - i as f64 * h;
                DVector::from_vec(vec![ti.powi(3)])
            })
            .collect();

        let ctx = StepContext {
            t,
            state: &state,
            h,
            history: &history,
        };
        let outcome = AdamsBashforth4.step(&model, &ctx);

        // ∫₁^1.25 t³ dt = (1.25⁴ − 1⁴)/4
        let exact = (1.25f64.powi(4) - 1.0) / 4.0;
        assert_relative_eq!(outcome.state[0], exact, max_relative = 1e-12);
    }
}
