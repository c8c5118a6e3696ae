use serde::Serialize;

use crate::{policy::ClusterPolicy, ranking::MatchCandidate};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
	/// No stored issue came back from the similarity search.
	ColdStart,
	LowSimilarity,
	/// The runner-up is absent or has no positive similarity.
	DominantBest,
	HighSeparability,
	LowSeparability,
}
impl DecisionReason {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::ColdStart => "cold_start",
			Self::LowSimilarity => "low_similarity",
			Self::DominantBest => "dominant_best",
			Self::HighSeparability => "high_separability",
			Self::LowSeparability => "low_separability",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
	New,
	Merge { issue_id: i64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MergeDecision {
	pub verdict: Verdict,
	pub reason: DecisionReason,
	/// Present only when the margin test actually ran.
	pub separability: Option<f32>,
}
impl MergeDecision {
	pub fn target_issue_id(&self) -> Option<i64> {
		match self.verdict {
			Verdict::New => None,
			Verdict::Merge { issue_id } => Some(issue_id),
		}
	}

	fn new_issue(reason: DecisionReason, separability: Option<f32>) -> Self {
		Self { verdict: Verdict::New, reason, separability }
	}

	fn merge(issue_id: i64, reason: DecisionReason, separability: Option<f32>) -> Self {
		Self { verdict: Verdict::Merge { issue_id }, reason, separability }
	}
}

/// Relative margin between the best candidate and the runner-up, in `[-1, 1]`. Positive values
/// mean the best candidate is closer.
pub fn separability(best_similarity: f32, neighbor_similarity: f32, epsilon: f32) -> f32 {
	let a = 1.0 - best_similarity;
	let b = 1.0 - neighbor_similarity;
	let denominator = a.max(b);

	if denominator < epsilon {
		return 0.0;
	}

	(b - a) / denominator
}

/// Two-gate merge rule: an absolute similarity floor on the best candidate, then a separability
/// margin against the runner-up.
pub fn resolve_target(
	best: Option<&MatchCandidate>,
	neighbor_similarity: Option<f32>,
	policy: &ClusterPolicy,
) -> MergeDecision {
	let Some(best) = best else {
		return MergeDecision::new_issue(DecisionReason::ColdStart, None);
	};

	if best.similarity < policy.high_similarity_threshold {
		return MergeDecision::new_issue(DecisionReason::LowSimilarity, None);
	}

	let neighbor = neighbor_similarity.unwrap_or(0.0);

	if neighbor < policy.epsilon {
		return MergeDecision::merge(best.issue_id, DecisionReason::DominantBest, None);
	}

	let margin = separability(best.similarity, neighbor, policy.epsilon);

	if margin > policy.separability_threshold {
		MergeDecision::merge(best.issue_id, DecisionReason::HighSeparability, Some(margin))
	} else {
		MergeDecision::new_issue(DecisionReason::LowSeparability, Some(margin))
	}
}

/// Runs [`resolve_target`] over a best-first candidate list.
pub fn decide(candidates: &[MatchCandidate], policy: &ClusterPolicy) -> MergeDecision {
	resolve_target(
		candidates.first(),
		candidates.get(1).map(|candidate| candidate.similarity),
		policy,
	)
}
