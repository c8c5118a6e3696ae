use sqlx::{Executor, Postgres, Transaction};
use time::OffsetDateTime;

use crate::{Error, Result, db::Db, models::Issue};

pub async fn insert_issue(
	db: &Db,
	title: &str,
	summary: &str,
	article_count: i32,
	now: OffsetDateTime,
) -> Result<i64> {
	insert_issue_exec(&db.pool, title, summary, article_count, now).await
}

pub async fn insert_issue_tx(
	tx: &mut Transaction<'_, Postgres>,
	title: &str,
	summary: &str,
	article_count: i32,
	now: OffsetDateTime,
) -> Result<i64> {
	insert_issue_exec(&mut **tx, title, summary, article_count, now).await
}

pub async fn find_by_id(db: &Db, issue_id: i64) -> Result<Issue> {
	sqlx::query_as::<_, Issue>(
		"\
SELECT id, title, summary, article_count, created_at, updated_at
FROM issues
WHERE id = $1",
	)
	.bind(issue_id)
	.fetch_optional(&db.pool)
	.await?
	.ok_or_else(|| Error::NotFound(format!("issue {issue_id}")))
}

/// Records one more merged article and moves `updated_at` to `now`.
pub async fn increment_and_touch(db: &Db, issue_id: i64, now: OffsetDateTime) -> Result<()> {
	increment_and_touch_exec(&db.pool, issue_id, now).await
}

pub async fn increment_and_touch_tx(
	tx: &mut Transaction<'_, Postgres>,
	issue_id: i64,
	now: OffsetDateTime,
) -> Result<()> {
	increment_and_touch_exec(&mut **tx, issue_id, now).await
}

/// Every issue, most recently updated first.
pub async fn list_all(db: &Db) -> Result<Vec<Issue>> {
	let rows = sqlx::query_as::<_, Issue>(
		"\
SELECT id, title, summary, article_count, created_at, updated_at
FROM issues
ORDER BY updated_at DESC, id DESC",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

async fn insert_issue_exec<'e, E>(
	executor: E,
	title: &str,
	summary: &str,
	article_count: i32,
	now: OffsetDateTime,
) -> Result<i64>
where
	E: Executor<'e, Database = Postgres>,
{
	if article_count < 1 {
		return Err(Error::InvalidArgument("Issue article_count must be at least one.".to_string()));
	}

	let id: i64 = sqlx::query_scalar(
		"\
INSERT INTO issues (title, summary, article_count, created_at, updated_at)
VALUES ($1, $2, $3, $4, $4)
RETURNING id",
	)
	.bind(title)
	.bind(summary)
	.bind(article_count)
	.bind(now)
	.fetch_one(executor)
	.await?;

	Ok(id)
}

async fn increment_and_touch_exec<'e, E>(
	executor: E,
	issue_id: i64,
	now: OffsetDateTime,
) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	let result = sqlx::query(
		"\
UPDATE issues
SET
	article_count = article_count + 1,
	updated_at = $1
WHERE id = $2",
	)
	.bind(now)
	.bind(issue_id)
	.execute(executor)
	.await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!("issue {issue_id}")));
	}

	Ok(())
}
