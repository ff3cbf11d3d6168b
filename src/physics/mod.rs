//! System models
//!
//! This module provides the trait every physical system implements.
//! A system model encapsulates the right-hand side f(t, X) of an ODE
//! system dX/dt = f(t, X) and, for implicit solvers, its Jacobian.
//!
//! # Core Concepts
//!
//! - **System Model**: computes f(t, X) at a given time and state
//! - **State vector**: a `DVector<f64>` whose length is fixed by the model
//! - **Jacobian**: the linearization ∂f/∂X used by implicit methods
//!
//! # Architecture
//!
//! System models are **separate from numerical solvers**:
//! - The model provides the **equations** (physics)
//! - The solver provides the **method** to integrate them (numerics)
//!
//! This separation allows:
//! - Same model with different methods (AB2, AB4, AM2, DIRK)
//! - Same method with different models (renewable system, test problems)
//!
//! # Implementing a New System Model
//!
//! ```rust
//! use microgrid_rs::physics::SystemModel;
//! use nalgebra::DVector;
//!
//! /// Exponential decay: dy/dt = -k·y
//! struct Decay {
//!     k: f64,
//! }
//!
//! impl SystemModel for Decay {
//!     fn dimension(&self) -> usize {
//!         1
//!     }
//!
//!     fn evaluate(&self, _t: f64, state: &DVector<f64>) -> DVector<f64> {
//!         state * -self.k
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Exponential Decay"
//!     }
//! }
//! ```
//!
//! The Jacobian has a finite-difference default; models with a cheap closed
//! form can override [`SystemModel::jacobian`].

// module declaration
pub mod traits;

// re-export commonly used types for convenience
pub use traits::SystemModel;
