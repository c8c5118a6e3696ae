use time::OffsetDateTime;

use crate::{BoxFuture, Result};
use herald_storage::{
	articles,
	db::Db,
	issue_embeddings, issues,
	models::{Article, Issue, NewArticle, UNASSIGNED_ISSUE_ID},
};

pub trait IssueStore
where
	Self: Send + Sync,
{
	fn create_issue<'a>(
		&'a self,
		title: &'a str,
		summary: &'a str,
		article_count: i32,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<i64>>;

	fn get_issue<'a>(&'a self, issue_id: i64) -> BoxFuture<'a, Result<Issue>>;

	fn increment_and_touch<'a>(
		&'a self,
		issue_id: i64,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<()>>;

	/// Most recently updated first, ties broken by descending id.
	fn list_issues<'a>(&'a self) -> BoxFuture<'a, Result<Vec<Issue>>>;
}

pub trait ArticleStore
where
	Self: Send + Sync,
{
	/// Articles with no issue yet, ascending by id.
	fn list_unassigned<'a>(&'a self) -> BoxFuture<'a, Result<Vec<Article>>>;

	fn reassign<'a>(&'a self, article_id: i64, issue_id: i64) -> BoxFuture<'a, Result<()>>;

	fn create_article<'a>(&'a self, article: &'a NewArticle) -> BoxFuture<'a, Result<i64>>;
}

pub trait IssueEmbeddingStore
where
	Self: Send + Sync,
{
	fn create_embedding<'a>(&'a self, issue_id: i64, vec: &'a [f32])
	-> BoxFuture<'a, Result<()>>;

	/// Up to `limit` issue ids, closest centroid first.
	fn find_nearest<'a>(&'a self, query: &'a [f32], limit: u32) -> BoxFuture<'a, Result<Vec<i64>>>;

	fn get_embedding<'a>(&'a self, issue_id: i64) -> BoxFuture<'a, Result<Vec<f32>>>;

	fn update_embedding<'a>(&'a self, issue_id: i64, vec: &'a [f32])
	-> BoxFuture<'a, Result<()>>;
}

/// Everything the cluster driver needs from persistence.
pub trait ClusterStore
where
	Self: IssueStore + ArticleStore + IssueEmbeddingStore,
{
	/// Creates a single-article issue seeded with `vec` as its centroid.
	fn create_issue_with_embedding<'a>(
		&'a self,
		title: &'a str,
		summary: &'a str,
		vec: &'a [f32],
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<i64>> {
		Box::pin(async move {
			let issue_id = self.create_issue(title, summary, 1, now).await?;

			self.create_embedding(issue_id, vec).await?;

			Ok(issue_id)
		})
	}

	/// Replaces the centroid of `issue_id` with `vec` and counts one more article on it.
	fn fold_into_issue<'a>(
		&'a self,
		issue_id: i64,
		vec: &'a [f32],
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			self.update_embedding(issue_id, vec).await?;
			self.increment_and_touch(issue_id, now).await
		})
	}
}

/// Postgres + pgvector backend.
pub struct PgStore {
	db: Db,
}
impl PgStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	pub fn db(&self) -> &Db {
		&self.db
	}
}

impl IssueStore for PgStore {
	fn create_issue<'a>(
		&'a self,
		title: &'a str,
		summary: &'a str,
		article_count: i32,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<i64>> {
		Box::pin(async move {
			Ok(issues::insert_issue(&self.db, title, summary, article_count, now).await?)
		})
	}

	fn get_issue<'a>(&'a self, issue_id: i64) -> BoxFuture<'a, Result<Issue>> {
		Box::pin(async move { Ok(issues::find_by_id(&self.db, issue_id).await?) })
	}

	fn increment_and_touch<'a>(
		&'a self,
		issue_id: i64,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { Ok(issues::increment_and_touch(&self.db, issue_id, now).await?) })
	}

	fn list_issues<'a>(&'a self) -> BoxFuture<'a, Result<Vec<Issue>>> {
		Box::pin(async move { Ok(issues::list_all(&self.db).await?) })
	}
}

impl ArticleStore for PgStore {
	fn list_unassigned<'a>(&'a self) -> BoxFuture<'a, Result<Vec<Article>>> {
		Box::pin(async move {
			Ok(articles::list_by_issue_id(&self.db, UNASSIGNED_ISSUE_ID).await?)
		})
	}

	fn reassign<'a>(&'a self, article_id: i64, issue_id: i64) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			Ok(articles::update_issue_id(&self.db, article_id, issue_id).await?)
		})
	}

	fn create_article<'a>(&'a self, article: &'a NewArticle) -> BoxFuture<'a, Result<i64>> {
		Box::pin(async move { Ok(articles::insert_article(&self.db, article).await?) })
	}
}

impl IssueEmbeddingStore for PgStore {
	fn create_embedding<'a>(
		&'a self,
		issue_id: i64,
		vec: &'a [f32],
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			Ok(issue_embeddings::insert_embedding(&self.db, issue_id, vec).await?)
		})
	}

	fn find_nearest<'a>(&'a self, query: &'a [f32], limit: u32) -> BoxFuture<'a, Result<Vec<i64>>> {
		Box::pin(async move { Ok(issue_embeddings::find_nearest(&self.db, query, limit).await?) })
	}

	fn get_embedding<'a>(&'a self, issue_id: i64) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(async move {
			let embedding = issue_embeddings::find_by_issue_id(&self.db, issue_id).await?;

			Ok(embedding.vec)
		})
	}

	fn update_embedding<'a>(
		&'a self,
		issue_id: i64,
		vec: &'a [f32],
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			Ok(issue_embeddings::update_embedding(&self.db, issue_id, vec).await?)
		})
	}
}

impl ClusterStore for PgStore {
	/// Issue row and centroid are written in one transaction, so a crash never leaves an issue
	/// without an embedding.
	fn create_issue_with_embedding<'a>(
		&'a self,
		title: &'a str,
		summary: &'a str,
		vec: &'a [f32],
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<i64>> {
		Box::pin(async move {
			let mut tx = self.db.pool.begin().await?;
			let issue_id = issues::insert_issue_tx(&mut tx, title, summary, 1, now).await?;

			issue_embeddings::insert_embedding_tx(&mut tx, issue_id, vec).await?;
			tx.commit().await?;

			Ok(issue_id)
		})
	}

	/// Count and centroid move together, so `article_count` always matches the number of
	/// articles folded into the stored vector.
	fn fold_into_issue<'a>(
		&'a self,
		issue_id: i64,
		vec: &'a [f32],
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut tx = self.db.pool.begin().await?;

			issues::increment_and_touch_tx(&mut tx, issue_id, now).await?;
			issue_embeddings::update_embedding_tx(&mut tx, issue_id, vec).await?;
			tx.commit().await?;

			Ok(())
		})
	}
}
