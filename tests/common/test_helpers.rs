//! Helper functions for integration tests

use microgrid_rs::physics::SystemModel;
use microgrid_rs::solver::{
    IntegrationDriver, MethodKind, RunConfiguration, Scenario, SimulationResult, Solver,
};
use nalgebra::DVector;

/// Run `model` from `initial` over [0, total_time] with a pinned step size.
///
/// Pinning (`h_min = h_max = h`) with wide-open tolerances turns the
/// adaptive driver into a fixed-step integrator, which is what the
/// convergence-order measurements need.
pub fn run_fixed_step(
    model: Box<dyn SystemModel>,
    initial: DVector<f64>,
    method: MethodKind,
    total_time: f64,
    steps: usize,
) -> SimulationResult {
    let h = total_time / steps as f64;
    let scenario = Scenario::new(model, initial);
    let config = RunConfiguration::new(method, 0.0, total_time)
        .with_fixed_step(h)
        .with_tolerances(1e6, 1e6)
        .with_max_steps(steps + 16);

    IntegrationDriver::new()
        .solve(&scenario, &config)
        .expect("fixed-step run must start")
}

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}

/// Assert consecutive error ratios sit inside [low, high] when the step
/// halves, printing each ratio for diagnosis.
pub fn assert_convergence_ratios(errors: &[f64], low: f64, high: f64, label: &str) {
    for i in 0..errors.len() - 1 {
        let ratio = errors[i] / errors[i + 1];
        println!("{} convergence ratio {}->{}: {}", label, i, i + 1, ratio);

        assert!(
            ratio > low && ratio < high,
            "{}: convergence ratio {} outside [{}, {}]",
            label,
            ratio,
            low,
            high
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_error() {
        assert!((relative_error(1.0, 1.0) - 0.0).abs() < 1e-10);
        assert!((relative_error(1.1, 1.0) - 0.1).abs() < 1e-10);
        assert!((relative_error(0.9, 1.0) - 0.1).abs() < 1e-10);
    }
}
