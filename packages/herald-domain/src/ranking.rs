use serde::Serialize;
use time::OffsetDateTime;

use crate::{policy::ClusterPolicy, vector};

const SECONDS_PER_HOUR: f64 = 3_600.0;

/// An issue considered as a merge target for one article.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchCandidate {
	pub issue_id: i64,
	pub title: String,
	/// Similarity blended with recency. Informational only; ordering uses `similarity`.
	pub score: f32,
	pub similarity: f32,
}

pub fn hours_since(updated_at: OffsetDateTime, now: OffsetDateTime) -> f64 {
	((now - updated_at).as_seconds_f64() / SECONDS_PER_HOUR).max(0.0)
}

pub fn recency_weight(
	policy: &ClusterPolicy,
	updated_at: OffsetDateTime,
	now: OffsetDateTime,
) -> f32 {
	(-f64::from(policy.recency_decay_per_hour) * hours_since(updated_at, now)).exp() as f32
}

pub fn score_candidate(
	policy: &ClusterPolicy,
	issue_id: i64,
	title: &str,
	query: &[f32],
	centroid: &[f32],
	updated_at: OffsetDateTime,
	now: OffsetDateTime,
) -> MatchCandidate {
	let similarity = vector::dot(query, centroid);
	let score = policy.similarity_weight * similarity
		+ policy.recency_weight * recency_weight(policy, updated_at, now);

	MatchCandidate { issue_id, title: title.to_string(), score, similarity }
}

/// Best-first by raw similarity. The sort is stable, so ties keep the search order.
pub fn sort_by_similarity(candidates: &mut [MatchCandidate]) {
	candidates.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
}

#[cfg(test)]
mod tests {
	use time::Duration;

	use super::*;

	#[test]
	fn future_updates_count_as_fresh() {
		let now = OffsetDateTime::now_utc();
		let policy = ClusterPolicy::default();

		assert_eq!(hours_since(now + Duration::hours(3), now), 0.0);
		assert!((recency_weight(&policy, now + Duration::hours(3), now) - 1.0).abs() < 1e-6);
	}
}
