//! microgrid-rs: Renewable-Energy System Simulation Framework
//!
//! Simulates a four-state model of a renewable-energy installation (solar
//! generation, wind generation, battery storage, grid balancing) and integrates
//! it forward in time with a family of numerical ODE methods, so their accuracy
//! and stability can be compared — in particular near the stiff regime created
//! by battery capacity saturation.
//!
//! # Architecture
//!
//! microgrid-rs is built on two core principles:
//!
//! 1. **Separation of Physics and Numerics**
//!    - System models define equations (what to solve)
//!    - Numerical methods provide integrators (how to solve)
//!
//! 2. **Extensibility and Type Safety**
//!    - Trait-based design for easy extension
//!    - Explicit, immutable run configuration, no ambient state
//!
//! # Quick Start
//!
//! ```rust
//! use microgrid_rs::models::RenewableSystem;
//! use microgrid_rs::solver::{
//!     IntegrationDriver, MethodKind, RunConfiguration, RunStatus, Scenario, Solver,
//! };
//!
//! fn main() -> Result<(), microgrid_rs::solver::SolverError> {
//!     // 1. Build the physical system (base-case parameters)
//!     let model = RenewableSystem::base_case();
//!     let initial = model.initial_state();
//!     let scenario = Scenario::new(Box::new(model), initial);
//!
//!     // 2. Configure a run: which method, over which interval
//!     let config = RunConfiguration::new(MethodKind::Dirk, 0.0, 24.0)
//!         .with_tolerances(1e-6, 1e-6);
//!
//!     // 3. Integrate
//!     let result = IntegrationDriver::new().solve(&scenario, &config)?;
//!     assert_eq!(result.status, RunStatus::Completed);
//!
//!     // 4. Access the trajectory
//!     println!("{} accepted steps, {} rejected", result.step_count, result.rejected_steps);
//!     println!("final state: {}", result.final_state());
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`physics`]: the [`SystemModel`](physics::SystemModel) trait (equations)
//! - [`models`]: the renewable-energy system and its forcing profiles
//! - [`solver`]: integration methods, error control, and the driver

// Core modules
pub mod physics;

pub mod models;
pub mod solver;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use microgrid_rs::prelude::*;
    //! ```
    pub use crate::models::{ForcingProfile, RenewableParams, RenewableSystem};
    pub use crate::physics::SystemModel;
    pub use crate::solver::{
        IntegrationDriver, MethodKind, RunConfiguration, RunStatus, Scenario, SimulationResult,
        Solver, SolverError,
    };
}
