use std::sync::Arc;

use crate::{ArticleStore, ClusterReport, ClusterService, IssueStore, Result};
use herald_feed::{CrawlItem, FeedSource, RssFetcher};
use herald_storage::models::{Issue, NewArticle};

#[derive(Debug)]
pub struct PipelineReport {
	pub scraped: usize,
	pub saved: usize,
	pub clustered: ClusterReport,
	/// Every issue after clustering, most recently updated first.
	pub issues: Vec<Issue>,
}

/// One ingestion round: fetch every feed, store the items as unassigned articles, cluster the
/// backlog, then read back the issue list.
pub async fn run_pipeline(
	fetcher: Arc<RssFetcher>,
	sources: Vec<FeedSource>,
	workers: usize,
	service: &ClusterService,
) -> Result<PipelineReport> {
	let items = herald_feed::fetch_all(fetcher, sources, workers).await;
	let scraped = items.len();
	let saved = save_items(service.store(), items).await?;
	let clustered = service.run().await?;
	let issues = service.store().list_issues().await?;

	tracing::info!(
		scraped,
		saved,
		merged = clustered.merged,
		created = clustered.created,
		failed = clustered.failed,
		issues = issues.len(),
		"Pipeline finished."
	);

	Ok(PipelineReport { scraped, saved, clustered, issues })
}

pub async fn save_items<S>(store: &S, items: Vec<CrawlItem>) -> Result<usize>
where
	S: ArticleStore + ?Sized,
{
	let mut saved = 0;

	for item in items {
		let article = NewArticle {
			title: item.title,
			content: item.content,
			source: item.source,
			url: item.url,
			published_at: item.published_at,
		};

		store.create_article(&article).await?;

		saved += 1;
	}

	Ok(saved)
}
