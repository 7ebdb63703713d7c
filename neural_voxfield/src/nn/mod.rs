//! Neural network modules.
//!
//! - [`VotingPlaneModule`]: per-seed plane votes for three axis families

mod voting;

pub use voting::{
    AxisVotes, PlaneAxis, PlaneBranch, PlaneVotes, VotingPlaneModule, NUM_OFFSETS,
};
