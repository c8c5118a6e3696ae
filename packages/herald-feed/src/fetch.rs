use std::{sync::Arc, time::Duration};

use reqwest::Client;
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc2822};
use tokio::{sync::Semaphore, task::JoinSet};

use crate::{
	Result,
	rss::{self, RssEntry},
};
use herald_config::Ingest;

const VIDEO_SEGMENT: &str = "/video";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedSource {
	pub reference: String,
	pub category: String,
	pub url: String,
}
impl FeedSource {
	/// `reference/category`, the source label stored with every article.
	pub fn name(&self) -> String {
		format!("{}/{}", self.reference, self.category)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct CrawlItem {
	pub title: String,
	pub content: String,
	pub source: String,
	pub url: String,
	pub published_at: OffsetDateTime,
}

pub struct RssFetcher {
	client: Client,
	count: usize,
}
impl RssFetcher {
	pub fn new(cfg: &Ingest) -> Result<Self> {
		let client = Client::builder()
			.user_agent(cfg.user_agent.as_str())
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.build()?;

		Ok(Self { client, count: cfg.count as usize })
	}

	pub async fn fetch(&self, source: &FeedSource) -> Result<Vec<CrawlItem>> {
		let body = self
			.client
			.get(source.url.as_str())
			.send()
			.await?
			.error_for_status()?
			.text()
			.await?;
		let entries = rss::parse_rss(&body)?;
		let limit = if self.count == 0 { entries.len() } else { self.count };
		let name = source.name();
		let items: Vec<_> = entries
			.into_iter()
			.take(limit)
			.filter_map(|entry| to_crawl_item(entry, &name))
			.collect();

		tracing::debug!(source = %name, items = items.len(), "Feed fetched.");

		Ok(items)
	}
}

/// Every configured feed, ordered by reference then category.
pub fn sources(cfg: &Ingest) -> Vec<FeedSource> {
	cfg.rss
		.iter()
		.flat_map(|(reference, categories)| {
			categories.iter().map(move |(category, url)| FeedSource {
				reference: reference.clone(),
				category: category.clone(),
				url: url.clone(),
			})
		})
		.collect()
}

/// Fetches every source with at most `workers` requests in flight (zero means one per source).
/// A failing source is logged and contributes nothing. Items keep the order of `sources`.
pub async fn fetch_all(
	fetcher: Arc<RssFetcher>,
	sources: Vec<FeedSource>,
	workers: usize,
) -> Vec<CrawlItem> {
	if sources.is_empty() {
		return Vec::new();
	}

	let permits = if workers == 0 { sources.len() } else { workers.min(sources.len()) };
	let semaphore = Arc::new(Semaphore::new(permits));
	let mut tasks = JoinSet::new();

	for (index, source) in sources.into_iter().enumerate() {
		let fetcher = Arc::clone(&fetcher);
		let semaphore = Arc::clone(&semaphore);

		tasks.spawn(async move {
			let _permit = semaphore.acquire_owned().await;
			let result = fetcher.fetch(&source).await;

			(index, source, result)
		});
	}

	let mut batches = Vec::new();

	while let Some(joined) = tasks.join_next().await {
		match joined {
			Ok((index, _, Ok(items))) => batches.push((index, items)),
			Ok((_, source, Err(err))) => {
				tracing::warn!(
					source = %source.name(),
					url = %source.url,
					error = %err,
					"Feed fetch failed."
				);
			},
			Err(err) => {
				tracing::error!(error = %err, "Feed task aborted.");
			},
		}
	}

	batches.sort_by_key(|(index, _)| *index);

	batches.into_iter().flat_map(|(_, items)| items).collect()
}

fn to_crawl_item(entry: RssEntry, source: &str) -> Option<CrawlItem> {
	if entry.link.contains(VIDEO_SEGMENT) {
		return None;
	}

	let published_at = match OffsetDateTime::parse(entry.pub_date.trim(), &Rfc2822) {
		Ok(published_at) => published_at.to_offset(UtcOffset::UTC),
		Err(err) => {
			tracing::debug!(
				link = %entry.link,
				error = %err,
				"Skipping entry with unparsable pubDate."
			);

			return None;
		},
	};
	let content = rss::strip_html(&entry.description);

	if content.is_empty() {
		return None;
	}

	Some(CrawlItem {
		title: entry.title,
		content,
		source: source.to_string(),
		url: entry.link,
		published_at,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entry(link: &str, pub_date: &str, description: &str) -> RssEntry {
		RssEntry {
			title: "Rates rise".to_string(),
			link: link.to_string(),
			pub_date: pub_date.to_string(),
			description: description.to_string(),
		}
	}

	#[test]
	fn converts_publication_date_to_utc() {
		let item = to_crawl_item(
			entry("https://example.com/a", "Tue, 14 Oct 2025 09:30:00 +0900", "<p>Body</p>"),
			"wire/economy",
		)
		.expect("Entry should be kept.");

		assert_eq!(item.content, "Body");
		assert_eq!(item.source, "wire/economy");
		assert_eq!(item.published_at.offset(), UtcOffset::UTC);
		assert_eq!(item.published_at.hour(), 0);
		assert_eq!(item.published_at.minute(), 30);
	}

	#[test]
	fn skips_video_links_bad_dates_and_empty_bodies() {
		let date = "Tue, 14 Oct 2025 09:30:00 +0900";

		assert!(to_crawl_item(entry("https://example.com/video/1", date, "Body"), "s").is_none());
		assert!(to_crawl_item(entry("https://example.com/a", "yesterday", "Body"), "s").is_none());
		assert!(to_crawl_item(entry("https://example.com/a", date, "<img src=x>"), "s").is_none());
	}

	#[test]
	fn sources_are_sorted_by_reference_then_category() {
		let mut cfg = Ingest::default();

		cfg.rss.entry("wire".to_string()).or_default().insert(
			"politics".to_string(),
			"https://wire.example.com/politics.xml".to_string(),
		);
		cfg.rss.entry("daily".to_string()).or_default().insert(
			"economy".to_string(),
			"https://daily.example.com/economy.xml".to_string(),
		);
		cfg.rss.entry("daily".to_string()).or_default().insert(
			"culture".to_string(),
			"https://daily.example.com/culture.xml".to_string(),
		);

		let names: Vec<_> = sources(&cfg).iter().map(FeedSource::name).collect();

		assert_eq!(names, vec!["daily/culture", "daily/economy", "wire/politics"]);
	}
}
