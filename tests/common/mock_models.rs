//! Mock system models for testing
//!
//! These models have known analytical solutions, making them
//! ideal for validating numerical solver accuracy.

use microgrid_rs::physics::SystemModel;
use nalgebra::{DMatrix, DVector};

// =================================================================================================
// Exponential Decay: dX/dt = -k*X
// =================================================================================================

/// Exponential decay model: dX/dt = -k·X
///
/// Analytical solution: X(t) = X₀·exp(-k·t)
///
/// Useful for testing solver accuracy since the exact solution is known,
/// and the Jacobian is constant (-k), so the implicit methods' Newton
/// iteration converges in one step.
pub struct ExponentialDecay {
    pub decay_rate: f64, // k in dX/dt = -k·X
}

impl ExponentialDecay {
    pub fn new(decay_rate: f64) -> Self {
        Self { decay_rate }
    }

    /// Compute analytical solution at time t
    pub fn analytical_solution(&self, t: f64, x0: f64) -> f64 {
        x0 * (-self.decay_rate * t).exp()
    }
}

impl SystemModel for ExponentialDecay {
    fn dimension(&self) -> usize {
        1
    }

    fn evaluate(&self, _t: f64, state: &DVector<f64>) -> DVector<f64> {
        -self.decay_rate * state
    }

    fn jacobian(&self, _t: f64, _state: &DVector<f64>) -> DMatrix<f64> {
        DMatrix::from_element(1, 1, -self.decay_rate)
    }

    fn name(&self) -> &str {
        "Exponential Decay"
    }
}

// =================================================================================================
// Constant Growth: dX/dt = c
// =================================================================================================

/// Constant growth model: dX/dt = c
///
/// Analytical solution: X(t) = X₀ + c·t
///
/// Every method in the crate is exact on this problem, so any deviation
/// beyond round-off is a wiring bug, not a truncation error.
pub struct ConstantGrowth {
    pub growth_rate: f64,
}

impl ConstantGrowth {
    pub fn new(growth_rate: f64) -> Self {
        Self { growth_rate }
    }

    /// Compute analytical solution at time t
    pub fn analytical_solution(&self, t: f64, x0: f64) -> f64 {
        x0 + self.growth_rate * t
    }
}

impl SystemModel for ConstantGrowth {
    fn dimension(&self) -> usize {
        1
    }

    fn evaluate(&self, _t: f64, _state: &DVector<f64>) -> DVector<f64> {
        DVector::from_element(1, self.growth_rate)
    }

    fn jacobian(&self, _t: f64, _state: &DVector<f64>) -> DMatrix<f64> {
        DMatrix::zeros(1, 1)
    }

    fn name(&self) -> &str {
        "Constant Growth"
    }
}

// =================================================================================================
// Stiff Relaxation: dX/dt = -λ·(X - cos t) - sin t
// =================================================================================================

/// Prothero–Robinson problem: dX/dt = -λ·(X − cos t) − sin t
///
/// Analytical solution (from X₀ = 1): X(t) = cos t, for EVERY λ. The
/// solution itself is smooth and slow; only the off-solution dynamics are
/// fast. Large λ therefore isolates stability from accuracy — exactly the
/// regime where explicit methods must crawl and L-stable ones need not.
pub struct StiffRelaxation {
    pub lambda: f64,
}

impl StiffRelaxation {
    pub fn new(lambda: f64) -> Self {
        Self { lambda }
    }

    /// Compute analytical solution at time t
    pub fn analytical_solution(&self, t: f64) -> f64 {
        t.cos()
    }
}

impl SystemModel for StiffRelaxation {
    fn dimension(&self) -> usize {
        1
    }

    fn evaluate(&self, t: f64, state: &DVector<f64>) -> DVector<f64> {
        DVector::from_element(1, -self.lambda * (state[0] - t.cos()) - t.sin())
    }

    fn jacobian(&self, _t: f64, _state: &DVector<f64>) -> DMatrix<f64> {
        DMatrix::from_element(1, 1, -self.lambda)
    }

    fn name(&self) -> &str {
        "Stiff Relaxation"
    }
}

// =================================================================================================
// Tests for Mock Models
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_decay_analytical() {
        let model = ExponentialDecay::new(0.5);

        assert!((model.analytical_solution(0.0, 1.0) - 1.0).abs() < 1e-10);

        // X(1) = exp(-0.5) ≈ 0.6065
        let x1 = model.analytical_solution(1.0, 1.0);
        assert!((x1 - 0.6065306597).abs() < 1e-6);
    }

    #[test]
    fn test_stiff_relaxation_is_on_manifold() {
        // On the exact solution X = cos t the derivative is -sin t for any λ
        let model = StiffRelaxation::new(1e6);
        let state = DVector::from_element(1, (0.3f64).cos());
        let dxdt = model.evaluate(0.3, &state);
        assert!((dxdt[0] + (0.3f64).sin()).abs() < 1e-6);
    }
}
