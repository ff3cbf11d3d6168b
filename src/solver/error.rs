//! Solver error types
//!
//! [`SolverError`] covers *misuse*: a configuration or scenario that can never
//! produce a run. Outcomes of a run that started correctly but could not
//! finish (step limit, retry exhaustion) are NOT errors; they are reported
//! through [`RunStatus`](crate::solver::RunStatus) on the result, together
//! with the partial trajectory computed so far.

use thiserror::Error;

/// Errors raised before or during integration for conditions the caller can
/// fix.
#[derive(Debug, Error)]
pub enum SolverError {
    /// A configuration parameter is out of range or inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The scenario's initial state does not match the model dimension
    #[error("Dimension mismatch: model '{model}' has dimension {expected}, initial state has {actual}")]
    DimensionMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },

    /// The state became NaN or infinite during integration
    #[error("Numerical instability at t = {t}: {detail}")]
    NumericalInstability { t: f64, detail: String },
}
