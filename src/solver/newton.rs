//! Newton iteration for implicit stage equations
//!
//! The diagonally implicit stages solved here all have the form
//!
//! ```text
//! k = f(t_s, x_base + h·γ·k)
//! ```
//!
//! for the unknown stage derivative `k`. Newton's method applied to the
//! residual `r(k) = k − f(t_s, x_base + hγk)` iterates
//!
//! ```text
//! (I − hγ·J) Δk = −r(k)         J = ∂f/∂x at (t_s, x_base + hγk)
//! k ← k + Δk
//! ```
//!
//! using an LU decomposition of the Newton matrix. The Jacobian comes from
//! [`SystemModel::jacobian`], so models with an analytical Jacobian benefit
//! automatically and everything else falls back to finite differences.

use nalgebra::{DMatrix, DVector};

use crate::physics::SystemModel;

/// Iteration cap. Stage equations are locally quadratic once near the root;
/// a run that needs more iterations than this should shrink the step instead.
const MAX_ITERATIONS: usize = 25;

/// Why a stage solve failed. Both cases are handled by rejecting the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NewtonError {
    /// The Newton matrix I − hγJ could not be factored
    SingularMatrix,
    /// The iteration did not contract within [`MAX_ITERATIONS`]
    MaxIterationsExceeded,
}

/// Solve `k = f(t_stage, x_base + h_gamma·k)` for `k`, starting from `k0`.
pub(crate) fn solve_stage(
    model: &dyn SystemModel,
    t_stage: f64,
    x_base: &DVector<f64>,
    h_gamma: f64,
    k0: &DVector<f64>,
) -> Result<DVector<f64>, NewtonError> {
    let n = x_base.len();
    let identity = DMatrix::<f64>::identity(n, n);

    let mut k = k0.clone();

    for _ in 0..MAX_ITERATIONS {
        let x_stage = x_base + h_gamma * &k;
        let residual = &k - model.evaluate(t_stage, &x_stage);

        let tolerance = 1e-10 * (1.0 + k.norm());
        if residual.norm() <= tolerance {
            return Ok(k);
        }

        let jacobian = model.jacobian(t_stage, &x_stage);
        let newton_matrix = &identity - h_gamma * jacobian;

        let lu = newton_matrix.lu();
        let delta = lu
            .solve(&(-&residual))
            .ok_or(NewtonError::SingularMatrix)?;

        if delta.iter().any(|v| !v.is_finite()) {
            return Err(NewtonError::SingularMatrix);
        }

        k += delta;
    }

    // One final residual check: the cap may land exactly on convergence
    let x_stage = x_base + h_gamma * &k;
    let residual = &k - model.evaluate(t_stage, &x_stage);
    if residual.norm() <= 1e-10 * (1.0 + k.norm()) {
        Ok(k)
    } else {
        Err(NewtonError::MaxIterationsExceeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// dX/dt = −λX with analytical Jacobian
    struct Decay {
        lambda: f64,
    }

    impl SystemModel for Decay {
        fn dimension(&self) -> usize {
            1
        }
        fn evaluate(&self, _t: f64, state: &DVector<f64>) -> DVector<f64> {
            -self.lambda * state
        }
        fn jacobian(&self, _t: f64, _state: &DVector<f64>) -> DMatrix<f64> {
            DMatrix::from_element(1, 1, -self.lambda)
        }
        fn name(&self) -> &str {
            "Decay"
        }
    }

    /// dX/dt = −X² (nonlinear, finite-difference Jacobian)
    struct Quadratic;

    impl SystemModel for Quadratic {
        fn dimension(&self) -> usize {
            1
        }
        fn evaluate(&self, _t: f64, state: &DVector<f64>) -> DVector<f64> {
            DVector::from_vec(vec![-state[0] * state[0]])
        }
        fn name(&self) -> &str {
            "Quadratic"
        }
    }

    #[test]
    fn test_linear_stage_exact_solution() {
        // k = −λ(x + hγk)  ⟹  k = −λx / (1 + hγλ)
        let model = Decay { lambda: 2.0 };
        let x_base = DVector::from_vec(vec![1.0]);
        let h_gamma = 0.1;
        let k0 = model.evaluate(0.0, &x_base);

        let k = solve_stage(&model, 0.0, &x_base, h_gamma, &k0).unwrap();
        assert_relative_eq!(k[0], -2.0 / 1.2, max_relative = 1e-9);
    }

    #[test]
    fn test_stiff_stage_converges() {
        // λ·hγ = 100: far outside any explicit stability region, routine
        // for the Newton solve.
        let model = Decay { lambda: 1000.0 };
        let x_base = DVector::from_vec(vec![1.0]);
        let h_gamma = 0.1;
        let k0 = DVector::zeros(1);

        let k = solve_stage(&model, 0.0, &x_base, h_gamma, &k0).unwrap();
        assert_relative_eq!(k[0], -1000.0 / 101.0, max_relative = 1e-9);
    }

    #[test]
    fn test_nonlinear_stage_with_fd_jacobian() {
        // k = −(x + hγk)²; verify the residual, not a closed form
        let model = Quadratic;
        let x_base = DVector::from_vec(vec![2.0]);
        let h_gamma = 0.05;
        let k0 = model.evaluate(0.0, &x_base);

        let k = solve_stage(&model, 0.0, &x_base, h_gamma, &k0).unwrap();
        let x_stage = &x_base + h_gamma * &k;
        let residual = &k - model.evaluate(0.0, &x_stage);
        assert!(residual.norm() < 1e-9, "residual {}", residual.norm());
    }

    #[test]
    fn test_singular_newton_matrix_is_reported() {
        /// Jacobian = I, so with hγ = 1 the Newton matrix I − hγJ is zero
        struct PathologicalGrowth;

        impl SystemModel for PathologicalGrowth {
            fn dimension(&self) -> usize {
                1
            }
            fn evaluate(&self, _t: f64, state: &DVector<f64>) -> DVector<f64> {
                // +10 keeps the residual away from zero at the start
                DVector::from_vec(vec![state[0] + 10.0])
            }
            fn jacobian(&self, _t: f64, _state: &DVector<f64>) -> DMatrix<f64> {
                DMatrix::identity(1, 1)
            }
            fn name(&self) -> &str {
                "PathologicalGrowth"
            }
        }

        let x_base = DVector::from_vec(vec![1.0]);
        let k0 = DVector::zeros(1);
        let result = solve_stage(&PathologicalGrowth, 0.0, &x_base, 1.0, &k0);
        assert_eq!(result.unwrap_err(), NewtonError::SingularMatrix);
    }
}
