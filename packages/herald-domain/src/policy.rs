use herald_config::Clustering;

use crate::vector;

/// Numeric knobs shared by the ranker and the merge decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterPolicy {
	pub candidate_limit: u32,
	pub high_similarity_threshold: f32,
	pub separability_threshold: f32,
	pub recency_decay_per_hour: f32,
	pub similarity_weight: f32,
	pub recency_weight: f32,
	pub epsilon: f32,
}
impl ClusterPolicy {
	pub fn from_config(cfg: &Clustering) -> Self {
		Self {
			candidate_limit: cfg.candidate_limit,
			high_similarity_threshold: cfg.high_similarity_threshold,
			separability_threshold: cfg.separability_threshold,
			recency_decay_per_hour: cfg.recency_decay_per_hour,
			similarity_weight: cfg.similarity_weight,
			recency_weight: cfg.recency_weight,
			epsilon: vector::EPSILON,
		}
	}
}
impl Default for ClusterPolicy {
	fn default() -> Self {
		Self::from_config(&Clustering::default())
	}
}
