use std::{future::IntoFuture, sync::Arc};

use axum::{Router, http::StatusCode, routing};
use tokio::{net::TcpListener, sync::oneshot};

use herald_config::Ingest;
use herald_feed::{FeedSource, RssFetcher};

const POLITICS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
	<channel>
		<title>Politics</title>
		<item>
			<title>Budget passes</title>
			<link>https://news.example.com/article/1</link>
			<pubDate>Tue, 14 Oct 2025 09:30:00 +0900</pubDate>
			<description><![CDATA[<p>The assembly passed the budget.</p>]]></description>
		</item>
		<item>
			<title>Budget explained</title>
			<link>https://news.example.com/video/2</link>
			<pubDate>Tue, 14 Oct 2025 09:40:00 +0900</pubDate>
			<description>Watch the briefing.</description>
		</item>
		<item>
			<title>Opposition responds</title>
			<link>https://news.example.com/article/3</link>
			<pubDate>not a date</pubDate>
			<description>The opposition criticized the budget.</description>
		</item>
		<item>
			<title>Vote tally</title>
			<link>https://news.example.com/article/4</link>
			<pubDate>Tue, 14 Oct 2025 10:00:00 +0900</pubDate>
			<description>The vote passed 180 to 95.</description>
		</item>
	</channel>
</rss>"#;

async fn start_feed_server() -> (String, oneshot::Sender<()>) {
	let app = Router::new()
		.route("/politics.xml", routing::get(|| async { POLITICS_FEED }))
		.route("/broken.xml", routing::get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind feed server.");
	let addr = listener.local_addr().expect("Failed to read feed server address.");
	let (tx, rx) = oneshot::channel();
	let server = axum::serve(listener, app).with_graceful_shutdown(async move {
		let _ = rx.await;
	});

	tokio::spawn(async move {
		let _ = server.into_future().await;
	});

	(format!("http://{addr}"), tx)
}

fn ingest(count: u32) -> Ingest {
	Ingest { count, timeout_ms: 5_000, ..Ingest::default() }
}

fn source(base: &str, category: &str) -> FeedSource {
	FeedSource {
		reference: "wire".to_string(),
		category: category.to_string(),
		url: format!("{base}/{category}.xml"),
	}
}

#[tokio::test]
async fn fetch_keeps_dated_article_entries() {
	let (base, shutdown) = start_feed_server().await;
	let fetcher = RssFetcher::new(&ingest(0)).expect("Failed to build fetcher.");
	let items = fetcher.fetch(&source(&base, "politics")).await.expect("Fetch failed.");
	let titles: Vec<_> = items.iter().map(|item| item.title.as_str()).collect();

	assert_eq!(titles, vec!["Budget passes", "Vote tally"]);
	assert_eq!(items[0].content, "The assembly passed the budget.");
	assert_eq!(items[0].source, "wire/politics");

	let _ = shutdown.send(());
}

#[tokio::test]
async fn count_limits_entries_before_filtering() {
	let (base, shutdown) = start_feed_server().await;
	let fetcher = RssFetcher::new(&ingest(3)).expect("Failed to build fetcher.");
	let items = fetcher.fetch(&source(&base, "politics")).await.expect("Fetch failed.");

	assert_eq!(items.len(), 1);
	assert_eq!(items[0].title, "Budget passes");

	let _ = shutdown.send(());
}

#[tokio::test]
async fn fetch_all_skips_failing_sources() {
	let (base, shutdown) = start_feed_server().await;
	let fetcher = Arc::new(RssFetcher::new(&ingest(0)).expect("Failed to build fetcher."));
	let sources = vec![source(&base, "broken"), source(&base, "politics")];
	let items = herald_feed::fetch_all(fetcher, sources, 1).await;

	assert_eq!(items.len(), 2);
	assert!(items.iter().all(|item| item.source == "wire/politics"));

	let _ = shutdown.send(());
}
