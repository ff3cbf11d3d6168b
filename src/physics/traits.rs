//! System model trait
//!
//! This module defines the core API for physical systems:
//! - `SystemModel`: trait for all right-hand-side models
//! - a central finite-difference Jacobian used when no closed form is supplied

use nalgebra::{DMatrix, DVector};

// =================================================================================================
// System Model Trait
// =================================================================================================

/// Trait for ODE system models
///
/// # Responsibility
/// Computes the right-hand side f(t, X) of dX/dt = f(t, X) at a given time and
/// state. Does NOT integrate it (that's the solver's job).
///
/// The model provides the "physics" (equations), the solver provides
/// the "numerics" (method to advance them).
///
/// # Contract
///
/// `evaluate` must be a pure function, total for all finite `t` and `state`:
/// out-of-physical-range inputs must be handled by internal saturation or
/// smoothing, never by panicking or returning non-finite values. Implicit
/// solvers call `jacobian` on states the nonlinear iteration wanders through,
/// including unphysical ones.
pub trait SystemModel: Send + Sync {
    /// Number of state components
    ///
    /// Used by the solver to allocate vectors and size the Newton matrix.
    fn dimension(&self) -> usize;

    /// Computes the derivative vector f(t, X)
    ///
    /// # Arguments
    /// * `t` - Current time
    /// * `state` - Current state vector (length = `dimension()`)
    ///
    /// # Returns
    /// dX/dt at (t, X), same length as `state`
    fn evaluate(&self, t: f64, state: &DVector<f64>) -> DVector<f64>;

    /// Computes the Jacobian ∂f/∂X at (t, X)
    ///
    /// Used by implicit methods to build the Newton matrix `I − h·a_ii·J`.
    /// The default uses central finite differences with a per-component
    /// perturbation of `ε^(1/3) · max(|x_j|, 1)`; override when a closed
    /// form is available and cheaper.
    fn jacobian(&self, t: f64, state: &DVector<f64>) -> DMatrix<f64> {
        fd_jacobian(self, t, state)
    }

    /// Name of the model (used for display and logging)
    fn name(&self) -> &str;

    /// Description of the model (optional)
    fn description(&self) -> Option<&str> {
        None
    }
}

// =================================================================================================
// Finite-Difference Jacobian
// =================================================================================================

/// Central finite-difference Jacobian approximation.
///
/// Computes `J[(i, j)] = ∂f_i/∂x_j` from two evaluations per column:
///
/// ```text
/// J[:, j] ≈ (f(t, x + h_j e_j) − f(t, x − h_j e_j)) / (2 h_j)
/// ```
///
/// Central differences are accurate to O(h²), so the perturbation scale is
/// ε^(1/3) rather than the √ε of a forward scheme.
pub(crate) fn fd_jacobian<M: SystemModel + ?Sized>(
    model: &M,
    t: f64,
    state: &DVector<f64>,
) -> DMatrix<f64> {
    let n = state.len();
    let eps_cbrt = f64::EPSILON.cbrt();
    let mut jac = DMatrix::zeros(n, n);

    for j in 0..n {
        let hj = eps_cbrt * state[j].abs().max(1.0);

        let mut forward = state.clone();
        forward[j] += hj;
        let f_plus = model.evaluate(t, &forward);

        let mut backward = state.clone();
        backward[j] -= hj;
        let f_minus = model.evaluate(t, &backward);

        let inv_2h = 1.0 / (2.0 * hj);
        for i in 0..n {
            jac[(i, j)] = (f_plus[i] - f_minus[i]) * inv_2h;
        }
    }

    jac
}

// =================================================================================================
// Tests
// =================================================================================================
