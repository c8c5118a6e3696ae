use std::{collections::HashMap, future::IntoFuture, sync::Arc};

use axum::{Router, http::StatusCode, routing};
use time::OffsetDateTime;
use tokio::{net::TcpListener, sync::oneshot};

use herald_config::Ingest;
use herald_domain::ClusterPolicy;
use herald_feed::{FeedSource, RssFetcher};
use herald_service::{
	BoxFuture, ClusterReport, ClusterService, EmbeddingProvider, Error, MemoryStore, Result,
	pipeline,
};

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
	<channel>
		<title>Wire</title>
		<item>
			<title>Budget passes</title>
			<link>https://news.example.com/article/1</link>
			<pubDate>Tue, 14 Oct 2025 09:30:00 +0900</pubDate>
			<description>The assembly passed the budget.</description>
		</item>
		<item>
			<title>Budget reaction</title>
			<link>https://news.example.com/article/2</link>
			<pubDate>Tue, 14 Oct 2025 10:30:00 +0900</pubDate>
			<description>Markets welcomed the budget.</description>
		</item>
		<item>
			<title>Storm hits coast</title>
			<link>https://news.example.com/article/3</link>
			<pubDate>Tue, 14 Oct 2025 11:30:00 +0900</pubDate>
			<description>A storm reached the coast overnight.</description>
		</item>
	</channel>
</rss>"#;

struct TitleEmbedding {
	vectors: HashMap<&'static str, Vec<f32>>,
}
impl EmbeddingProvider for TitleEmbedding {
	fn generate<'a>(
		&'a self,
		title: &'a str,
		_content: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		let result = self
			.vectors
			.get(title)
			.cloned()
			.ok_or_else(|| Error::Provider { message: format!("No vector for {title}.") });

		Box::pin(async move { result })
	}
}

async fn start_feed_server() -> (String, oneshot::Sender<()>) {
	let app = Router::new()
		.route("/wire.xml", routing::get(|| async { FEED }))
		.route("/down.xml", routing::get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
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

#[tokio::test]
async fn pipeline_saves_and_clusters_fetched_items() {
	let (base, shutdown) = start_feed_server().await;
	let store = Arc::new(MemoryStore::new());
	let embedding = TitleEmbedding {
		vectors: HashMap::from([
			("Budget passes", vec![1.0, 0.0, 0.0]),
			("Budget reaction", vec![0.98, 0.2, 0.0]),
			("Storm hits coast", vec![0.0, 0.0, 1.0]),
		]),
	};
	let service = ClusterService::with_policy(
		ClusterPolicy::default(),
		3,
		Arc::new(embedding),
		store.clone(),
	);
	let fetcher = Arc::new(
		RssFetcher::new(&Ingest { count: 0, timeout_ms: 5_000, ..Ingest::default() })
			.expect("Failed to build fetcher."),
	);
	let sources = vec![
		FeedSource {
			reference: "wire".to_string(),
			category: "down".to_string(),
			url: format!("{base}/down.xml"),
		},
		FeedSource {
			reference: "wire".to_string(),
			category: "politics".to_string(),
			url: format!("{base}/wire.xml"),
		},
	];
	let report =
		pipeline::run_pipeline(fetcher, sources, 2, &service).await.expect("Pipeline failed.");

	assert_eq!(report.scraped, 3);
	assert_eq!(report.saved, 3);
	assert_eq!(report.clustered, ClusterReport { processed: 3, merged: 1, created: 2, failed: 0 });
	assert_eq!(report.issues.len(), 2);

	let articles = store.articles();

	assert!(articles.iter().all(|article| article.source == "wire/politics"));
	assert_eq!(articles.iter().map(|article| article.issue_id).collect::<Vec<_>>(), vec![1, 1, 2]);
	assert!(articles[0].published_at < OffsetDateTime::now_utc());

	let _ = shutdown.send(());
}
