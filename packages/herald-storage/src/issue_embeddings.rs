use sqlx::{Executor, Postgres, Transaction};

use crate::{Error, Result, db::Db, models::IssueEmbedding, vector};

pub async fn insert_embedding(db: &Db, issue_id: i64, vec: &[f32]) -> Result<()> {
	insert_embedding_exec(&db.pool, issue_id, vec).await
}

pub async fn insert_embedding_tx(
	tx: &mut Transaction<'_, Postgres>,
	issue_id: i64,
	vec: &[f32],
) -> Result<()> {
	insert_embedding_exec(&mut **tx, issue_id, vec).await
}

/// Issue ids ordered by cosine distance to `query`, closest first.
pub async fn find_nearest(db: &Db, query: &[f32], limit: u32) -> Result<Vec<i64>> {
	let query_text = vector::to_pg_literal(query)?;
	let ids: Vec<i64> = sqlx::query_scalar(
		"\
SELECT issue_id
FROM issue_embeddings
ORDER BY vec <=> $1::text::vector ASC
LIMIT $2",
	)
	.bind(query_text)
	.bind(i64::from(limit))
	.fetch_all(&db.pool)
	.await?;

	Ok(ids)
}

pub async fn find_by_issue_id(db: &Db, issue_id: i64) -> Result<IssueEmbedding> {
	let row: Option<(i64, String)> = sqlx::query_as(
		"\
SELECT issue_id, vec::text
FROM issue_embeddings
WHERE issue_id = $1",
	)
	.bind(issue_id)
	.fetch_optional(&db.pool)
	.await?;
	let Some((issue_id, text)) = row else {
		return Err(Error::NotFound(format!("issue embedding {issue_id}")));
	};

	Ok(IssueEmbedding { issue_id, vec: vector::parse_pg_literal(&text)? })
}

/// Overwrites the stored centroid.
pub async fn update_embedding(db: &Db, issue_id: i64, vec: &[f32]) -> Result<()> {
	update_embedding_exec(&db.pool, issue_id, vec).await
}

pub async fn update_embedding_tx(
	tx: &mut Transaction<'_, Postgres>,
	issue_id: i64,
	vec: &[f32],
) -> Result<()> {
	update_embedding_exec(&mut **tx, issue_id, vec).await
}

async fn insert_embedding_exec<'e, E>(executor: E, issue_id: i64, vec: &[f32]) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	let vec_text = vector::to_pg_literal(vec)?;

	sqlx::query(
		"\
INSERT INTO issue_embeddings (issue_id, vec)
VALUES ($1, $2::text::vector)",
	)
	.bind(issue_id)
	.bind(vec_text)
	.execute(executor)
	.await?;

	Ok(())
}

async fn update_embedding_exec<'e, E>(executor: E, issue_id: i64, vec: &[f32]) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	let vec_text = vector::to_pg_literal(vec)?;
	let result = sqlx::query(
		"\
UPDATE issue_embeddings
SET
	vec = $1::text::vector,
	updated_at = now()
WHERE issue_id = $2",
	)
	.bind(vec_text)
	.bind(issue_id)
	.execute(executor)
	.await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!("issue embedding {issue_id}")));
	}

	Ok(())
}
