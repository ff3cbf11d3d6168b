//! Common utilities for integration tests

pub mod mock_models;
pub mod test_helpers;

// Re-export commonly used items
pub use mock_models::{ConstantGrowth, ExponentialDecay, StiffRelaxation};
pub use test_helpers::{assert_convergence_ratios, relative_error, run_fixed_step};
