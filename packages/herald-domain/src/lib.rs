//! Pure clustering math: vector helpers, candidate scoring, the merge decision, and centroid
//! folding. Nothing in this crate touches storage or the network.

pub mod centroid;
pub mod decision;
pub mod policy;
pub mod ranking;
pub mod vector;

pub use centroid::DimensionMismatch;
pub use decision::{DecisionReason, MergeDecision, Verdict};
pub use policy::ClusterPolicy;
pub use ranking::MatchCandidate;
