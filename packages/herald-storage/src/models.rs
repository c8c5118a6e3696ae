use time::OffsetDateTime;

/// `articles.issue_id` value for articles not yet folded into an issue.
pub const UNASSIGNED_ISSUE_ID: i64 = 0;

/// Summary stored on freshly created issues until something summarizes them.
pub const PLACEHOLDER_SUMMARY: &str = "not yet summary";

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Article {
	pub id: i64,
	pub title: String,
	pub content: String,
	pub source: String,
	pub url: String,
	pub published_at: OffsetDateTime,
	pub issue_id: i64,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug)]
pub struct NewArticle {
	pub title: String,
	pub content: String,
	pub source: String,
	pub url: String,
	pub published_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Issue {
	pub id: i64,
	pub title: String,
	pub summary: String,
	pub article_count: i32,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug)]
pub struct IssueEmbedding {
	pub issue_id: i64,
	pub vec: Vec<f32>,
}
