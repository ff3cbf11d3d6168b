//! Physical models for renewable-energy simulation
//!
//! All models implement the [`SystemModel`](crate::physics::SystemModel) trait.
//! The solver calls `evaluate` at each time step; models are responsible for
//! the physics (generation, storage, demand coupling), the solver for the time
//! integration.
//!
//! # Available Models
//!
//! ## [`RenewableSystem`]: four-state installation model
//!
//! - X₁ solar generation, X₂ wind generation: first-order tracking of the
//!   forced generation profiles, saturated by installed capacity.
//! - X₃ battery charge: fed by excess generation, drained by demand shortfall,
//!   limited by a *smooth* capacity gate whose steepness is the tunable
//!   source of stiffness in the system.
//! - X₄ grid draw: cumulative energy imported to cover whatever the local
//!   system cannot, softly clamped to the grid connection limit.
//!
//! # Forcing
//!
//! Exogenous forcing (solar irradiance, wind speed, electricity demand) is a
//! [`ForcingProfile`], a parametric function of time built from constants and
//! sinusoids. The presets on [`RenewableSystem`] assemble the diurnal profiles
//! of the three named scenarios (base case, high variability, stiff case).

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod profiles;
pub mod renewable;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use profiles::ForcingProfile;
pub use renewable::{RenewableParams, RenewableSystem};
