//! Adaptive step-size control
//!
//! # Background
//!
//! Every method in this crate produces, alongside the candidate state, an
//! estimate of its local truncation error. The controller turns that estimate
//! into two decisions:
//!
//! 1. **Accept or reject** the step, by measuring the estimate in a weighted
//!    RMS norm against the user tolerances:
//!
//!    ```text
//!    w_i   = atol + rtol · max(|x_i|, |x_new_i|)
//!    ‖e‖   = sqrt( (1/n) · Σ (e_i / w_i)² )
//!    accept ⟺ ‖e‖ ≤ 1
//!    ```
//!
//! 2. **Propose the next step size** from the classical controller
//!
//!    ```text
//!    h_new = h · safety · ‖e‖^(−1/(p+1))
//!    ```
//!
//!    where `p` is the order of the *error estimate* (not the method's nominal
//!    order), clamped so a single step never grows by more than `max_factor`
//!    or shrinks below `min_factor`, and always kept inside `[h_min, h_max]`.
//!
//! The weighted norm means `accept` is tolerance-relative: a component sitting
//! at 1e6 is allowed 1e6·rtol of error, a component near zero is allowed atol.

use nalgebra::DVector;

/// Step-size controller shared by all methods.
#[derive(Debug, Clone)]
pub struct ErrorControl {
    /// Absolute tolerance
    pub atol: f64,
    /// Relative tolerance
    pub rtol: f64,
    /// Safety factor applied to every proposal (0.9)
    pub safety: f64,
    /// Largest allowed shrink per rejection (0.2)
    pub min_factor: f64,
    /// Largest allowed growth per acceptance (5.0)
    pub max_factor: f64,
    /// Hard lower bound on the step size
    pub h_min: f64,
    /// Hard upper bound on the step size
    pub h_max: f64,
}

impl ErrorControl {
    pub fn new(atol: f64, rtol: f64, h_min: f64, h_max: f64) -> Self {
        Self {
            atol,
            rtol,
            safety: 0.9,
            min_factor: 0.2,
            max_factor: 5.0,
            h_min,
            h_max,
        }
    }

    /// Weighted RMS norm of the error estimate.
    ///
    /// A value ≤ 1 means the step satisfies the tolerances.
    pub fn error_norm(
        &self,
        error: &DVector<f64>,
        state: &DVector<f64>,
        state_new: &DVector<f64>,
    ) -> f64 {
        let n = error.len() as f64;
        let sum_sq: f64 = error
            .iter()
            .zip(state.iter().zip(state_new.iter()))
            .map(|(e, (x, x_new))| {
                let w = self.atol + self.rtol * x.abs().max(x_new.abs());
                (e / w) * (e / w)
            })
            .sum();
        (sum_sq / n).sqrt()
    }

    /// Whether a step with this error norm satisfies the tolerances.
    pub fn accepts(&self, error_norm: f64) -> bool {
        error_norm <= 1.0
    }

    /// Step size to use next, given the current step and its error norm.
    ///
    /// `control_order` is the order of the error estimate the norm was
    /// computed from. A norm of zero (or subnormal) proposes maximum growth.
    pub fn propose_step(&self, h: f64, error_norm: f64, control_order: usize) -> f64 {
        let factor = if error_norm < f64::MIN_POSITIVE {
            self.max_factor
        } else {
            let exponent = -1.0 / (control_order as f64 + 1.0);
            (self.safety * error_norm.powf(exponent)).clamp(self.min_factor, self.max_factor)
        };
        (h * factor).clamp(self.h_min, self.h_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn control() -> ErrorControl {
        ErrorControl::new(1e-6, 1e-3, 1e-10, 10.0)
    }

    #[test]
    fn test_error_norm_exact_value() {
        let ctrl = ErrorControl::new(1e-2, 0.0, 1e-10, 10.0);
        // With rtol = 0 every weight is atol = 1e-2; e = (1e-2, 2e-2)
        // scaled: (1, 2) → norm = sqrt((1 + 4)/2)
        let error = DVector::from_vec(vec![1e-2, 2e-2]);
        let state = DVector::from_vec(vec![5.0, 5.0]);
        let norm = ctrl.error_norm(&error, &state, &state);
        assert_relative_eq!(norm, (2.5f64).sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn test_error_norm_uses_larger_state_magnitude() {
        let ctrl = ErrorControl::new(0.0, 1e-3, 1e-10, 10.0);
        let error = DVector::from_vec(vec![1.0]);
        let small = DVector::from_vec(vec![10.0]);
        let large = DVector::from_vec(vec![1000.0]);
        // Weight comes from max(|x|, |x_new|) = 1000 regardless of argument order
        let a = ctrl.error_norm(&error, &small, &large);
        let b = ctrl.error_norm(&error, &large, &small);
        assert_relative_eq!(a, 1.0, max_relative = 1e-12);
        assert_relative_eq!(a, b, max_relative = 1e-15);
    }

    #[test]
    fn test_accept_boundary() {
        let ctrl = control();
        assert!(ctrl.accepts(0.5));
        assert!(ctrl.accepts(1.0));
        assert!(!ctrl.accepts(1.0 + 1e-12));
    }

    #[test]
    fn test_propose_step_formula() {
        let ctrl = control();
        // err_norm = 1, order 1: factor = 0.9 · 1 = 0.9
        assert_relative_eq!(ctrl.propose_step(0.1, 1.0, 1), 0.09, max_relative = 1e-12);
        // err_norm = 16, order 1: factor = 0.9 / 4 = 0.225
        assert_relative_eq!(ctrl.propose_step(0.1, 16.0, 1), 0.0225, max_relative = 1e-12);
    }

    #[test]
    fn test_propose_step_growth_clamp() {
        let ctrl = control();
        // Tiny error would ask for enormous growth; clamped at max_factor
        assert_relative_eq!(ctrl.propose_step(0.1, 1e-12, 2), 0.5, max_relative = 1e-12);
        // Exactly zero error: maximum growth, no powf on zero
        assert_relative_eq!(ctrl.propose_step(0.1, 0.0, 2), 0.5, max_relative = 1e-12);
    }

    #[test]
    fn test_propose_step_shrink_clamp() {
        let ctrl = control();
        // Huge error would ask for near-zero step; clamped at min_factor
        assert_relative_eq!(ctrl.propose_step(0.1, 1e12, 2), 0.02, max_relative = 1e-12);
    }

    #[test]
    fn test_propose_step_respects_bounds() {
        let ctrl = ErrorControl::new(1e-6, 1e-3, 0.05, 0.2);
        // Growth capped by h_max
        assert_relative_eq!(ctrl.propose_step(0.1, 1e-12, 2), 0.2, max_relative = 1e-12);
        // Shrink floored at h_min
        assert_relative_eq!(ctrl.propose_step(0.1, 1e12, 2), 0.05, max_relative = 1e-12);
    }

    #[test]
    fn test_higher_control_order_shrinks_less() {
        let ctrl = control();
        // Same error norm: a higher-order estimate reacts less aggressively
        let h1 = ctrl.propose_step(0.1, 10.0, 1);
        let h4 = ctrl.propose_step(0.1, 10.0, 4);
        assert!(h4 > h1);
    }
}
