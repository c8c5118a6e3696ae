use std::sync::Arc;

use time::OffsetDateTime;

use crate::{
	ArticleStore, ClusterStore, EmbeddingProvider, Error, IssueEmbeddingStore, IssueLocks,
	IssueStore, Result,
};
use herald_config::Config;
use herald_domain::{ClusterPolicy, MatchCandidate, Verdict, centroid, decision, ranking, vector};
use herald_storage::models::{Article, PLACEHOLDER_SUMMARY};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClusterOutcome {
	Merged { issue_id: i64 },
	Created { issue_id: i64 },
}
impl ClusterOutcome {
	pub fn issue_id(&self) -> i64 {
		match self {
			Self::Merged { issue_id } | Self::Created { issue_id } => *issue_id,
		}
	}
}

/// Totals for one batch. `processed` counts every article attempted, so it equals
/// `merged + created + failed`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClusterReport {
	pub processed: usize,
	pub merged: usize,
	pub created: usize,
	pub failed: usize,
}

pub struct ClusterService {
	policy: ClusterPolicy,
	vector_dim: usize,
	isolate_failures: bool,
	embedding: Arc<dyn EmbeddingProvider>,
	store: Arc<dyn ClusterStore>,
	locks: IssueLocks,
}
impl ClusterService {
	pub fn new(
		cfg: &Config,
		embedding: Arc<dyn EmbeddingProvider>,
		store: Arc<dyn ClusterStore>,
	) -> Self {
		Self::with_policy(
			ClusterPolicy::from_config(&cfg.clustering),
			cfg.storage.vector_dim as usize,
			embedding,
			store,
		)
		.isolate_failures(cfg.clustering.isolate_failures)
	}

	pub fn with_policy(
		policy: ClusterPolicy,
		vector_dim: usize,
		embedding: Arc<dyn EmbeddingProvider>,
		store: Arc<dyn ClusterStore>,
	) -> Self {
		Self {
			policy,
			vector_dim,
			isolate_failures: false,
			embedding,
			store,
			locks: IssueLocks::new(),
		}
	}

	/// Keep going after a failed article instead of aborting the batch.
	pub fn isolate_failures(mut self, isolate: bool) -> Self {
		self.isolate_failures = isolate;

		self
	}

	pub fn policy(&self) -> &ClusterPolicy {
		&self.policy
	}

	pub fn store(&self) -> &dyn ClusterStore {
		self.store.as_ref()
	}

	/// Embeds `article`, assigns it to an existing issue or a new one, and records the
	/// assignment on the article row.
	pub async fn cluster(&self, article: &Article) -> Result<ClusterOutcome> {
		let mut vec = self.embedding.generate(&article.title, &article.content).await?;

		self.check_vector(&vec)?;
		vector::normalize(&mut vec);

		let now = OffsetDateTime::now_utc();
		let candidates = self.find_best_cluster(&vec, now).await?;
		let decision = decision::decide(&candidates, &self.policy);
		let best = candidates.first();

		tracing::info!(
			article_id = article.id,
			title = %article.title,
			reason = decision.reason.as_str(),
			best_issue_id = ?best.map(|candidate| candidate.issue_id),
			best_similarity = ?best.map(|candidate| candidate.similarity),
			neighbor_similarity = ?candidates.get(1).map(|candidate| candidate.similarity),
			separability = ?decision.separability,
			"Cluster decision."
		);

		let outcome = match decision.verdict {
			Verdict::Merge { issue_id } => {
				self.update_cluster(issue_id, &vec).await?;

				ClusterOutcome::Merged { issue_id }
			},
			Verdict::New => {
				let issue_id = self
					.store
					.create_issue_with_embedding(&article.title, PLACEHOLDER_SUMMARY, &vec, now)
					.await?;

				ClusterOutcome::Created { issue_id }
			},
		};

		self.store.reassign(article.id, outcome.issue_id()).await?;

		Ok(outcome)
	}

	/// Candidate issues for a unit-norm `vec`, best-first by raw similarity. Each candidate
	/// also carries the recency-blended score as of `now`.
	pub async fn find_best_cluster(
		&self,
		vec: &[f32],
		now: OffsetDateTime,
	) -> Result<Vec<MatchCandidate>> {
		let ids = self.store.find_nearest(vec, self.policy.candidate_limit).await?;
		let mut candidates = Vec::with_capacity(ids.len());

		for issue_id in ids {
			let issue = self.store.get_issue(issue_id).await?;
			let centroid = self.store.get_embedding(issue_id).await?;

			candidates.push(ranking::score_candidate(
				&self.policy,
				issue_id,
				&issue.title,
				vec,
				&centroid,
				issue.updated_at,
				now,
			));
		}

		ranking::sort_by_similarity(&mut candidates);

		Ok(candidates)
	}

	/// Folds `vec` into the centroid of `issue_id` and bumps its article count.
	pub async fn update_cluster(&self, issue_id: i64, vec: &[f32]) -> Result<()> {
		let _guard = self.locks.lock(issue_id).await;
		let issue = self.store.get_issue(issue_id).await?;
		let current = self.store.get_embedding(issue_id).await?;
		let next = centroid::fold(&current, issue.article_count, vec)?;

		self.store.fold_into_issue(issue_id, &next, OffsetDateTime::now_utc()).await?;

		tracing::debug!(issue_id, article_count = issue.article_count + 1, "Centroid updated.");

		Ok(())
	}

	/// Clusters every unassigned article in id order, one at a time.
	pub async fn run(&self) -> Result<ClusterReport> {
		let articles = self.store.list_unassigned().await?;
		let mut report = ClusterReport::default();

		for article in &articles {
			report.processed += 1;

			match self.cluster(article).await {
				Ok(ClusterOutcome::Merged { .. }) => report.merged += 1,
				Ok(ClusterOutcome::Created { .. }) => report.created += 1,
				Err(err) if self.isolate_failures => {
					report.failed += 1;

					tracing::warn!(
						article_id = article.id,
						error = %err,
						"Clustering failed. Article left unassigned."
					);
				},
				Err(err) => return Err(err),
			}
		}

		tracing::info!(
			processed = report.processed,
			merged = report.merged,
			created = report.created,
			failed = report.failed,
			"Clustering batch finished."
		);

		Ok(report)
	}

	fn check_vector(&self, vec: &[f32]) -> Result<()> {
		if vec.is_empty() {
			return Err(Error::validation("Embedding vector is empty."));
		}
		if vec.len() != self.vector_dim {
			return Err(Error::validation(format!(
				"Embedding vector has {} dimensions, expected {}.",
				vec.len(),
				self.vector_dim
			)));
		}
		if vec.iter().any(|value| !value.is_finite()) {
			return Err(Error::validation("Embedding vector contains a non-finite value."));
		}

		Ok(())
	}
}
