//! Configuration types for neural_voxfield.
//!
//! This module provides Burn-style configuration structs for the tensor field
//! bridge and the plane voting head.

mod field;
mod voting;

pub use field::FieldConfig;
pub use voting::VotingPlaneConfig;
