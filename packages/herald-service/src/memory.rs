use std::{
	collections::BTreeMap,
	sync::{Mutex, MutexGuard, PoisonError},
};

use time::OffsetDateTime;

use crate::{
	ArticleStore, BoxFuture, ClusterStore, Error, IssueEmbeddingStore, IssueStore, Result,
};
use herald_domain::vector;
use herald_storage::models::{Article, Issue, NewArticle, UNASSIGNED_ISSUE_ID};

/// Process-local [`ClusterStore`]. Similarity search is a brute-force scan with exact inner
/// products, which makes it the reference backend for tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
	state: Mutex<State>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Snapshot of every stored article, ascending by id.
	pub fn articles(&self) -> Vec<Article> {
		self.state().articles.values().cloned().collect()
	}

	fn state(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

#[derive(Default)]
struct State {
	last_issue_id: i64,
	last_article_id: i64,
	issues: BTreeMap<i64, Issue>,
	articles: BTreeMap<i64, Article>,
	embeddings: BTreeMap<i64, Vec<f32>>,
}
impl State {
	fn issue_mut(&mut self, issue_id: i64) -> Result<&mut Issue> {
		self.issues.get_mut(&issue_id).ok_or_else(|| Error::not_found(format!("issue {issue_id}")))
	}

	fn embedding_mut(&mut self, issue_id: i64) -> Result<&mut Vec<f32>> {
		self.embeddings
			.get_mut(&issue_id)
			.ok_or_else(|| Error::not_found(format!("issue embedding {issue_id}")))
	}

	/// Both rows are checked before either is touched.
	fn fold_into(&mut self, issue_id: i64, vec: &[f32], now: OffsetDateTime) -> Result<()> {
		self.embedding_mut(issue_id)?;

		let issue = self.issue_mut(issue_id)?;

		issue.article_count += 1;
		issue.updated_at = now;

		self.embeddings.insert(issue_id, vec.to_vec());

		Ok(())
	}
}

impl IssueStore for MemoryStore {
	fn create_issue<'a>(
		&'a self,
		title: &'a str,
		summary: &'a str,
		article_count: i32,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<i64>> {
		let result = if article_count < 1 {
			Err(Error::validation("Issue article_count must be at least one."))
		} else {
			let mut state = self.state();

			state.last_issue_id += 1;

			let id = state.last_issue_id;

			state.issues.insert(id, Issue {
				id,
				title: title.to_string(),
				summary: summary.to_string(),
				article_count,
				created_at: now,
				updated_at: now,
			});

			Ok(id)
		};

		Box::pin(async move { result })
	}

	fn get_issue<'a>(&'a self, issue_id: i64) -> BoxFuture<'a, Result<Issue>> {
		let result = self.state().issue_mut(issue_id).map(|issue| issue.clone());

		Box::pin(async move { result })
	}

	fn increment_and_touch<'a>(
		&'a self,
		issue_id: i64,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<()>> {
		let result = self.state().issue_mut(issue_id).map(|issue| {
			issue.article_count += 1;
			issue.updated_at = now;
		});

		Box::pin(async move { result })
	}

	fn list_issues<'a>(&'a self) -> BoxFuture<'a, Result<Vec<Issue>>> {
		let mut issues: Vec<_> = self.state().issues.values().cloned().collect();

		issues.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));

		Box::pin(async move { Ok(issues) })
	}
}

impl ArticleStore for MemoryStore {
	fn list_unassigned<'a>(&'a self) -> BoxFuture<'a, Result<Vec<Article>>> {
		let articles: Vec<Article> = self
			.state()
			.articles
			.values()
			.filter(|article| article.issue_id == UNASSIGNED_ISSUE_ID)
			.cloned()
			.collect();

		Box::pin(async move { Ok(articles) })
	}

	fn reassign<'a>(&'a self, article_id: i64, issue_id: i64) -> BoxFuture<'a, Result<()>> {
		let result = match self.state().articles.get_mut(&article_id) {
			Some(article) => {
				article.issue_id = issue_id;

				Ok(())
			},
			None => Err(Error::not_found(format!("article {article_id}"))),
		};

		Box::pin(async move { result })
	}

	fn create_article<'a>(&'a self, article: &'a NewArticle) -> BoxFuture<'a, Result<i64>> {
		let mut state = self.state();

		state.last_article_id += 1;

		let id = state.last_article_id;

		state.articles.insert(id, Article {
			id,
			title: article.title.clone(),
			content: article.content.clone(),
			source: article.source.clone(),
			url: article.url.clone(),
			published_at: article.published_at,
			issue_id: UNASSIGNED_ISSUE_ID,
			created_at: OffsetDateTime::now_utc(),
		});
		drop(state);

		Box::pin(async move { Ok(id) })
	}
}

impl IssueEmbeddingStore for MemoryStore {
	fn create_embedding<'a>(
		&'a self,
		issue_id: i64,
		vec: &'a [f32],
	) -> BoxFuture<'a, Result<()>> {
		let mut state = self.state();
		let result = if !state.issues.contains_key(&issue_id) {
			Err(Error::not_found(format!("issue {issue_id}")))
		} else if state.embeddings.contains_key(&issue_id) {
			Err(Error::validation(format!("Issue {issue_id} already has an embedding.")))
		} else {
			state.embeddings.insert(issue_id, vec.to_vec());

			Ok(())
		};

		drop(state);

		Box::pin(async move { result })
	}

	fn find_nearest<'a>(&'a self, query: &'a [f32], limit: u32) -> BoxFuture<'a, Result<Vec<i64>>> {
		let mut scored: Vec<(i64, f32)> = self
			.state()
			.embeddings
			.iter()
			.map(|(issue_id, centroid)| (*issue_id, vector::dot(query, centroid)))
			.collect();

		scored.sort_by(|a, b| b.1.total_cmp(&a.1));
		scored.truncate(limit as usize);

		let ids: Vec<i64> = scored.into_iter().map(|(issue_id, _)| issue_id).collect();

		Box::pin(async move { Ok(ids) })
	}

	fn get_embedding<'a>(&'a self, issue_id: i64) -> BoxFuture<'a, Result<Vec<f32>>> {
		let result = self.state().embedding_mut(issue_id).map(|vec| vec.clone());

		Box::pin(async move { result })
	}

	fn update_embedding<'a>(
		&'a self,
		issue_id: i64,
		vec: &'a [f32],
	) -> BoxFuture<'a, Result<()>> {
		let result = self.state().embedding_mut(issue_id).map(|current| {
			*current = vec.to_vec();
		});

		Box::pin(async move { result })
	}
}

impl ClusterStore for MemoryStore {
	fn fold_into_issue<'a>(
		&'a self,
		issue_id: i64,
		vec: &'a [f32],
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<()>> {
		let result = self.state().fold_into(issue_id, vec, now);

		Box::pin(async move { result })
	}
}
