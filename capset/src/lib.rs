//! Cap constructions over GF(2)^n
//!
//! This crate maintains a set of points of the binary vector space of
//! dimension `dim` in which no four distinct points XOR to zero:
//! - `cap`: the `CapSet` tracker (add/remove/query, completion, resize)
//! - `exclusion`: the exclusion index mapping values to the odd-length
//!   combinations of selected points that XOR to them
//! - `combinations`: k-subset enumeration used to maintain the index
//! - `construct`: randomized greedy construction, one point per step
//! - `rank`: affine rank of a point set by Gauss-Jordan elimination mod 2

pub mod cap;
pub mod combinations;
pub mod construct;
pub mod error;
pub mod exclusion;
pub mod rank;

pub use cap::{CapSet, Tracking, MAX_DIM};
pub use construct::Step;
pub use error::CapError;
pub use exclusion::{Combination, ExclusionIndex};
pub use rank::{affine_rank, Gf2Matrix};
