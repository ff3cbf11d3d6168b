//! Adaptive integration driver
//!
//! The driver owns everything the step kernels deliberately do not: the
//! accept/reject loop, derivative-history bookkeeping for the multistep
//! methods, bootstrap when that history is missing, and the final verdict on
//! how the run ended.
//!
//! # The history problem
//!
//! Adams formulas assume derivative samples on a UNIFORM grid. Two events
//! break that assumption:
//!
//! - at t0 there is no history at all;
//! - whenever the controller changes the step size, the existing samples sit
//!   at the wrong spacing.
//!
//! In both cases the driver substitutes RK4 steps (full trajectory steps
//! under the same error control, not a degraded warm-up) until the history
//! is deep enough at the current spacing, then hands back to the selected
//! Adams method. Three rules keep the handover from degenerating into a
//! flush/regrow cycle:
//!
//! - step proposals always use the *target* method's error-estimate order,
//!   even on bootstrap steps, so the handover step size is one the Adams
//!   formula can sustain;
//! - while the history is being built, step-size growth is suppressed
//!   entirely;
//! - once built, growth below a factor of 1.3 is ignored. Shrinks always
//!   pass: they exist for accuracy.
//!
//! # Failure is a status, not an error
//!
//! A run that starts but cannot finish, because the accepted-step budget
//! runs out or one step is rejected past the retry budget with the step
//! size pinned at `h_min`, still returns `Ok`: the [`SimulationResult`]
//! carries the partial trajectory and a [`RunStatus`] saying what stopped
//! it. `Err` is reserved for configurations and scenarios that could never
//! run.

use std::collections::VecDeque;

use nalgebra::DVector;

use crate::solver::control::ErrorControl;
use crate::solver::methods::{
    AdamsBashforth2, AdamsBashforth4, AdamsMoulton2, IntegrationMethod, RungeKutta4, Sdirk3,
    StepContext,
};
use crate::solver::traits::{
    MethodKind, RunConfiguration, RunStatus, Scenario, SimulationResult, Solver, StepRecord,
};
use crate::solver::{validate_state, SolverError};

/// Step-growth factor below which the driver keeps the previous step size
/// rather than flush a multistep method's history.
const GROWTH_DEADBAND: f64 = 1.3;

/// Relative tolerance for "this step size equals the history spacing".
const SPACING_TOLERANCE: f64 = 1e-9;

/// The adaptive driver. Stateless; all run state lives on the stack of
/// [`solve`](Solver::solve).
#[derive(Debug, Default)]
pub struct IntegrationDriver;

impl IntegrationDriver {
    pub fn new() -> Self {
        Self
    }

    fn kernel_for(kind: MethodKind) -> Box<dyn IntegrationMethod> {
        match kind {
            MethodKind::Ab2 => Box::new(AdamsBashforth2),
            MethodKind::Ab4 => Box::new(AdamsBashforth4),
            MethodKind::Am2 => Box::new(AdamsMoulton2::default()),
            MethodKind::Dirk => Box::new(Sdirk3),
        }
    }
}

impl Solver for IntegrationDriver {
    fn solve(
        &self,
        scenario: &Scenario,
        config: &RunConfiguration,
    ) -> Result<SimulationResult, SolverError> {
        config.validate()?;
        scenario.validate()?;

        let model = scenario.model.as_ref();
        let method = Self::kernel_for(config.method);
        let bootstrap = RungeKutta4;
        let control = ErrorControl::new(config.atol, config.rtol, config.h_min, config.h_max);

        let span = config.t_end - config.t0;
        let t_tolerance = 1e-12 * span.abs();

        let mut t = config.t0;
        let mut state = scenario.initial_state.clone();
        let mut h = config.h_initial.clamp(config.h_min, config.h_max);

        // Derivative history, newest first; history[0] is always f(t, state)
        let mut history: VecDeque<DVector<f64>> = VecDeque::with_capacity(4);
        history.push_front(model.evaluate(t, &state));
        let mut spacing: Option<f64> = None;

        let mut records = vec![StepRecord {
            t,
            state: state.clone(),
            h: 0.0,
            error_norm: 0.0,
        }];
        let mut rejected_steps = 0usize;
        let mut bootstrap_steps = 0usize;
        let mut status = RunStatus::Completed;

        log::info!(
            "{} run: t in [{}, {}], h0 = {}, atol = {}, rtol = {}",
            config.method,
            config.t0,
            config.t_end,
            h,
            config.atol,
            config.rtol
        );

        'integration: while t < config.t_end - t_tolerance {
            if records.len() - 1 >= config.max_steps {
                log::warn!(
                    "{}: step budget ({}) exhausted at t = {}",
                    config.method,
                    config.max_steps,
                    t
                );
                status = RunStatus::MaxStepsExceeded;
                break;
            }

            // Never overshoot t_end; the floor does not apply to this clamp.
            let mut h_attempt = h.min(config.t_end - t);

            let mut retries = 0usize;
            loop {
                // The multistep kernel is usable only with enough history at
                // exactly this spacing; otherwise RK4 takes the step.
                let uniform = spacing
                    .map(|s| (h_attempt - s).abs() <= SPACING_TOLERANCE * s)
                    .unwrap_or(false);
                let multistep_ready = method.history_required() <= 1
                    || (history.len() >= method.history_required() && uniform);

                let kernel: &dyn IntegrationMethod =
                    if multistep_ready { method.as_ref() } else { &bootstrap };

                let ctx = StepContext {
                    t,
                    state: &state,
                    h: h_attempt,
                    history: history.make_contiguous(),
                };
                let outcome = kernel.step(model, &ctx);

                let accepted = if !outcome.converged {
                    log::warn!(
                        "{}: inner iteration diverged at t = {}, h = {}",
                        config.method,
                        t,
                        h_attempt
                    );
                    None
                } else if validate_state(&outcome.state, t + h_attempt).is_err() {
                    log::warn!(
                        "{}: non-finite state at t = {}, h = {}",
                        config.method,
                        t,
                        h_attempt
                    );
                    None
                } else {
                    let error_norm =
                        control.error_norm(&outcome.error_estimate, &state, &outcome.state);
                    if control.accepts(error_norm) {
                        Some((outcome.state, error_norm))
                    } else {
                        log::debug!(
                            "{}: rejected step at t = {}, h = {}, error norm = {:.3e}",
                            config.method,
                            t,
                            h_attempt,
                            error_norm
                        );
                        h = control.propose_step(h_attempt, error_norm, method.control_order());
                        None
                    }
                };

                match accepted {
                    Some((new_state, error_norm)) => {
                        if !multistep_ready {
                            bootstrap_steps += 1;
                        }

                        t += h_attempt;
                        state = new_state;

                        records.push(StepRecord {
                            t,
                            state: state.clone(),
                            h: h_attempt,
                            error_norm,
                        });

                        // Extend the history if the grid stayed uniform,
                        // restart it otherwise.
                        let f_new = model.evaluate(t, &state);
                        let extends = spacing
                            .map(|s| (h_attempt - s).abs() <= SPACING_TOLERANCE * s)
                            .unwrap_or(true);
                        if extends {
                            history.push_front(f_new);
                            history.truncate(4);
                            if history.len() > 1 {
                                spacing = Some(h_attempt);
                            }
                        } else {
                            history.clear();
                            history.push_front(f_new);
                            spacing = None;
                        }

                        // Propose with the TARGET method's estimate order even
                        // on bootstrap steps, so the step size handed over is
                        // one the Adams formula can sustain.
                        let mut h_next =
                            control.propose_step(h_attempt, error_norm, method.control_order());

                        // Growth is suppressed while the history is being
                        // built (it would flush the half-built history), and
                        // marginal growth afterwards is not worth flushing a
                        // full one. Shrinks always pass: they exist for
                        // accuracy.
                        if method.history_required() > 1 && h_next > h_attempt {
                            let bootstrapping = !multistep_ready;
                            if bootstrapping || h_next < GROWTH_DEADBAND * h_attempt {
                                h_next = h_attempt;
                            }
                        }
                        h = h_next;

                        break;
                    }
                    None => {
                        rejected_steps += 1;
                        retries += 1;

                        if retries > config.max_retries {
                            log::warn!(
                                "{}: retry budget ({}) exhausted at t = {}, h = {}",
                                config.method,
                                config.max_retries,
                                t,
                                h_attempt
                            );
                            status = RunStatus::RetryExhausted;
                            break 'integration;
                        }

                        // Divergence and non-finite states carry no usable
                        // error norm; shrink as hard as the controller allows.
                        let h_shrunk = if h >= h_attempt {
                            (h_attempt * control.min_factor).max(config.h_min)
                        } else {
                            h
                        };

                        if h_shrunk >= h_attempt && h_attempt <= config.h_min * (1.0 + 1e-12) {
                            // Pinned at the floor and still failing
                            log::warn!(
                                "{}: step floor h_min = {} reached at t = {} without acceptance",
                                config.method,
                                config.h_min,
                                t
                            );
                            status = RunStatus::RetryExhausted;
                            break 'integration;
                        }

                        h = h_shrunk;
                        h_attempt = h.min(config.t_end - t);
                    }
                }
            }
        }

        let mut result = SimulationResult::new(records, status, rejected_steps);
        result.add_metadata("method", config.method.name());
        result.add_metadata("model", model.name());
        result.add_metadata("bootstrap_steps", bootstrap_steps.to_string());

        log::info!(
            "{} run finished: status = {:?}, {} accepted, {} rejected, {} bootstrap",
            config.method,
            result.status,
            result.step_count,
            result.rejected_steps,
            bootstrap_steps
        );

        Ok(result)
    }

    fn name(&self) -> &str {
        "Adaptive Integration Driver"
    }
}

// =================================================================================================
// Tests
// =================================================================================================
