use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_USER_AGENT: &str = "herald-rss/0.1";

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub clustering: Clustering,
	#[serde(default)]
	pub ingest: Ingest,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	/// Dimensionality of every stored issue centroid.
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Merge policy knobs. Every field falls back to the reference value when omitted.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Clustering {
	/// Top-K issue ids requested from the similarity search.
	pub candidate_limit: u32,
	/// Minimum cosine similarity of the best candidate before a merge is considered.
	pub high_similarity_threshold: f32,
	/// Minimum relative margin between the best candidate and the runner-up.
	pub separability_threshold: f32,
	/// Exponential decay constant for the recency weight, per hour.
	pub recency_decay_per_hour: f32,
	pub similarity_weight: f32,
	pub recency_weight: f32,
	/// Keep clustering the rest of a batch when one article fails.
	pub isolate_failures: bool,
}
impl Default for Clustering {
	fn default() -> Self {
		Self {
			candidate_limit: 20,
			high_similarity_threshold: 0.73,
			separability_threshold: 0.1,
			recency_decay_per_hour: 0.1,
			similarity_weight: 0.8,
			recency_weight: 0.2,
			isolate_failures: false,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ingest {
	/// Items taken from each feed. Zero takes every item.
	pub count: u32,
	/// Feeds fetched concurrently. Zero fetches every feed at once.
	pub workers: u32,
	pub timeout_ms: u64,
	pub user_agent: String,
	/// `reference -> category -> feed url`.
	pub rss: BTreeMap<String, BTreeMap<String, String>>,
}
impl Default for Ingest {
	fn default() -> Self {
		Self {
			count: 3,
			workers: 8,
			timeout_ms: 30_000,
			user_agent: DEFAULT_USER_AGENT.to_string(),
			rss: BTreeMap::new(),
		}
	}
}
