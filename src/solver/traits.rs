//! Core solver types: scenario, configuration, result
//!
//! # Design
//!
//! The solver architecture separates three concerns:
//!
//! - [`Scenario`], WHAT to solve: a [`SystemModel`] plus its initial state
//! - [`RunConfiguration`], HOW to solve it: method selection, time span,
//!   tolerances, step bounds
//! - [`Solver`], the machinery that applies a method to a scenario and
//!   returns a [`SimulationResult`]
//!
//! # Stability Guarantee
//!
//! - `Solver` trait: STABLE since v0.1.0
//! - `MethodKind` enum: EXTENSIBLE (new variants can be added)
//! - Result structures: STABLE (fields won't be removed)

use std::collections::HashMap;

use nalgebra::DVector;

use crate::physics::SystemModel;
use crate::solver::error::SolverError;

// =================================================================================================
// Scenario (WHAT to solve)
// =================================================================================================

/// A problem definition: the model and the state it starts from.
pub struct Scenario {
    /// The system of equations
    pub model: Box<dyn SystemModel>,
    /// State at t0
    pub initial_state: DVector<f64>,
}

impl Scenario {
    pub fn new(model: Box<dyn SystemModel>, initial_state: DVector<f64>) -> Self {
        Self {
            model,
            initial_state,
        }
    }

    /// Check that the initial state matches the model dimension and holds
    /// only finite values.
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.initial_state.len() != self.model.dimension() {
            return Err(SolverError::DimensionMismatch {
                model: self.model.name().to_string(),
                expected: self.model.dimension(),
                actual: self.initial_state.len(),
            });
        }
        if self.initial_state.iter().any(|x| !x.is_finite()) {
            return Err(SolverError::InvalidConfiguration(
                "Initial state contains NaN or infinite components".to_string(),
            ));
        }
        Ok(())
    }
}

// =================================================================================================
// Method selection and run configuration (HOW to solve)
// =================================================================================================

/// The integration method a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// 2-step Adams–Bashforth (explicit, order 2)
    Ab2,
    /// 4-step Adams–Bashforth (explicit, order 4)
    Ab4,
    /// 2-step Adams–Moulton via predictor-corrector (implicit, order 2)
    Am2,
    /// 3-stage singly diagonally implicit Runge–Kutta (L-stable, order 3)
    Dirk,
}

impl MethodKind {
    /// Human-readable method name
    pub fn name(&self) -> &'static str {
        match self {
            MethodKind::Ab2 => "Adams-Bashforth 2",
            MethodKind::Ab4 => "Adams-Bashforth 4",
            MethodKind::Am2 => "Adams-Moulton 2",
            MethodKind::Dirk => "SDIRK-3",
        }
    }
}

impl std::fmt::Display for MethodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Full configuration of an adaptive integration run.
///
/// Construct with [`RunConfiguration::new`] and refine with the builder
/// methods; the defaults are reasonable for non-stiff problems at engineering
/// accuracy.
///
/// # Examples
///
/// ```rust
/// use microgrid_rs::solver::{MethodKind, RunConfiguration};
///
/// let config = RunConfiguration::new(MethodKind::Ab4, 0.0, 24.0)
///     .with_tolerances(1e-8, 1e-6)
///     .with_step_bounds(1e-8, 1.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    /// Which method integrates the trajectory
    pub method: MethodKind,
    /// Start of the time span
    pub t0: f64,
    /// End of the time span
    pub t_end: f64,
    /// First step size attempted
    pub h_initial: f64,
    /// Absolute tolerance
    pub atol: f64,
    /// Relative tolerance
    pub rtol: f64,
    /// Smallest step size the controller may propose
    pub h_min: f64,
    /// Largest step size the controller may propose
    pub h_max: f64,
    /// Upper bound on accepted steps before the run stops
    pub max_steps: usize,
    /// Rejections allowed on a single step before the run gives up
    pub max_retries: usize,
}

impl RunConfiguration {
    pub fn new(method: MethodKind, t0: f64, t_end: f64) -> Self {
        let span = t_end - t0;
        Self {
            method,
            t0,
            t_end,
            h_initial: span / 100.0,
            atol: 1e-6,
            rtol: 1e-6,
            h_min: span * 1e-12,
            h_max: span / 10.0,
            max_steps: 100_000,
            max_retries: 20,
        }
    }

    /// Set absolute and relative tolerances
    pub fn with_tolerances(mut self, atol: f64, rtol: f64) -> Self {
        self.atol = atol;
        self.rtol = rtol;
        self
    }

    /// Set the first step size to attempt
    pub fn with_initial_step(mut self, h_initial: f64) -> Self {
        self.h_initial = h_initial;
        self
    }

    /// Set the hard step-size bounds
    pub fn with_step_bounds(mut self, h_min: f64, h_max: f64) -> Self {
        self.h_min = h_min;
        self.h_max = h_max;
        self
    }

    /// Set the accepted-step budget
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set the per-step rejection budget
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Pin the step size: the controller still measures errors but may not
    /// change `h`. Pair with loose tolerances for fixed-step runs.
    pub fn with_fixed_step(mut self, h: f64) -> Self {
        self.h_initial = h;
        self.h_min = h;
        self.h_max = h;
        self
    }

    /// Validate that the parameters describe a runnable configuration.
    pub fn validate(&self) -> Result<(), SolverError> {
        if !(self.t_end > self.t0) {
            return Err(SolverError::InvalidConfiguration(format!(
                "t_end ({}) must exceed t0 ({})",
                self.t_end, self.t0
            )));
        }
        if !(self.h_initial > 0.0) {
            return Err(SolverError::InvalidConfiguration(
                "h_initial must be positive".to_string(),
            ));
        }
        if !(self.h_min > 0.0) || self.h_min > self.h_max {
            return Err(SolverError::InvalidConfiguration(format!(
                "Step bounds must satisfy 0 < h_min ({}) <= h_max ({})",
                self.h_min, self.h_max
            )));
        }
        if self.h_initial < self.h_min || self.h_initial > self.h_max {
            return Err(SolverError::InvalidConfiguration(format!(
                "h_initial ({}) must lie inside [h_min, h_max] = [{}, {}]",
                self.h_initial, self.h_min, self.h_max
            )));
        }
        if !(self.atol > 0.0) || !(self.rtol >= 0.0) {
            return Err(SolverError::InvalidConfiguration(
                "Tolerances must satisfy atol > 0, rtol >= 0".to_string(),
            ));
        }
        if self.max_steps == 0 {
            return Err(SolverError::InvalidConfiguration(
                "max_steps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// =================================================================================================
// Results
// =================================================================================================

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The trajectory reached t_end within tolerances
    Completed,
    /// The accepted-step budget ran out before t_end
    MaxStepsExceeded,
    /// A step was rejected `max_retries` times (or hit the h_min floor)
    RetryExhausted,
}

/// One accepted point of the trajectory.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Time of this point
    pub t: f64,
    /// State at this point
    pub state: DVector<f64>,
    /// Step size that produced this point (0 for the initial record)
    pub h: f64,
    /// Weighted error norm of the accepting step (0 for the initial record)
    pub error_norm: f64,
}

/// The trajectory a run produced, plus bookkeeping.
///
/// A result is returned for every run that starts, including runs that stop
/// early: `records` then holds the partial trajectory up to the point where
/// integration stopped, and [`status`](SimulationResult::status) says why.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Accepted trajectory points, in time order, starting at (t0, x0)
    pub records: Vec<StepRecord>,
    /// How the run ended
    pub status: RunStatus,
    /// Accepted steps (records minus the initial point)
    pub step_count: usize,
    /// Steps attempted and rejected by the error controller
    pub rejected_steps: usize,
    /// Free-form run metadata (method name, model name, counters)
    pub metadata: HashMap<String, String>,
}

impl SimulationResult {
    pub fn new(records: Vec<StepRecord>, status: RunStatus, rejected_steps: usize) -> Self {
        let step_count = records.len().saturating_sub(1);
        Self {
            records,
            status,
            step_count,
            rejected_steps,
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// State at the last accepted point
    pub fn final_state(&self) -> &DVector<f64> {
        &self
            .records
            .last()
            .expect("a result always holds at least the initial record")
            .state
    }

    /// Time of the last accepted point
    pub fn final_time(&self) -> f64 {
        self.records
            .last()
            .expect("a result always holds at least the initial record")
            .t
    }

    /// Number of trajectory points (including the initial one)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// =================================================================================================
// Solver trait
// =================================================================================================

/// A numerical integrator that can run a scenario under a configuration.
pub trait Solver {
    /// Integrate `scenario` over the configured time span.
    ///
    /// Returns `Err` only for misuse (invalid configuration or scenario).
    /// Runs that start but cannot finish return `Ok` with a non-`Completed`
    /// [`RunStatus`] and the partial trajectory.
    fn solve(
        &self,
        scenario: &Scenario,
        config: &RunConfiguration,
    ) -> Result<SimulationResult, SolverError>;

    /// Human-readable solver name
    fn name(&self) -> &str;
}

// =================================================================================================
// Tests
// =================================================================================================
