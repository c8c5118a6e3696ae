use crate::{
	Error, Result,
	db::Db,
	models::{Article, NewArticle},
};

pub async fn insert_article(db: &Db, article: &NewArticle) -> Result<i64> {
	let id: i64 = sqlx::query_scalar(
		"\
INSERT INTO articles (title, content, source, url, published_at)
VALUES ($1, $2, $3, $4, $5)
RETURNING id",
	)
	.bind(article.title.as_str())
	.bind(article.content.as_str())
	.bind(article.source.as_str())
	.bind(article.url.as_str())
	.bind(article.published_at)
	.fetch_one(&db.pool)
	.await?;

	Ok(id)
}

/// Articles currently assigned to `issue_id`, oldest first.
pub async fn list_by_issue_id(db: &Db, issue_id: i64) -> Result<Vec<Article>> {
	let rows = sqlx::query_as::<_, Article>(
		"\
SELECT id, title, content, source, url, published_at, issue_id, created_at
FROM articles
WHERE issue_id = $1
ORDER BY id ASC",
	)
	.bind(issue_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn update_issue_id(db: &Db, article_id: i64, issue_id: i64) -> Result<()> {
	let result = sqlx::query("UPDATE articles SET issue_id = $1 WHERE id = $2")
		.bind(issue_id)
		.bind(article_id)
		.execute(&db.pool)
		.await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!("article {article_id}")));
	}

	Ok(())
}
