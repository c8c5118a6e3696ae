mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Clustering, Config, DEFAULT_USER_AGENT, EmbeddingProviderConfig, Ingest, Postgres, Providers,
	Service, Storage,
};

use std::{fs, path::Path};

const WEIGHT_SUM_TOLERANCE: f32 = 1e-6;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::Read { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config =
		toml::from_str(&raw).map_err(|err| Error::Parse { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::validation("service.log_level must be non-empty."));
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::validation("storage.postgres.dsn must be non-empty."));
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::validation("storage.postgres.pool_max_conns must be greater than zero."));
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::validation(
			"providers.embedding.dimensions must be greater than zero.",
		));
	}
	if cfg.providers.embedding.dimensions != cfg.storage.vector_dim {
		return Err(Error::validation(
			"providers.embedding.dimensions must match storage.vector_dim.",
		));
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::validation("providers.embedding.api_key must be non-empty."));
	}

	validate_clustering(&cfg.clustering)?;

	for (reference, categories) in &cfg.ingest.rss {
		if categories.is_empty() {
			return Err(Error::validation(format!(
				"ingest.rss.{reference} must list at least one category."
			)));
		}

		for (category, url) in categories {
			if url.trim().is_empty() {
				return Err(Error::validation(format!(
					"ingest.rss.{reference}.{category} must be a non-empty url."
				)));
			}
		}
	}

	Ok(())
}

fn validate_clustering(clustering: &Clustering) -> Result<()> {
	if clustering.candidate_limit == 0 {
		return Err(Error::validation("clustering.candidate_limit must be greater than zero."));
	}

	for (label, value) in [
		("clustering.high_similarity_threshold", clustering.high_similarity_threshold),
		("clustering.separability_threshold", clustering.separability_threshold),
		("clustering.recency_decay_per_hour", clustering.recency_decay_per_hour),
		("clustering.similarity_weight", clustering.similarity_weight),
		("clustering.recency_weight", clustering.recency_weight),
	] {
		if !value.is_finite() {
			return Err(Error::validation(format!("{label} must be a finite number.")));
		}
	}

	// Cosine similarity and separability both live in [-1, 1].
	if !(-1.0..=1.0).contains(&clustering.high_similarity_threshold) {
		return Err(Error::validation(
			"clustering.high_similarity_threshold must be in the range -1.0-1.0.",
		));
	}
	if !(-1.0..=1.0).contains(&clustering.separability_threshold) {
		return Err(Error::validation(
			"clustering.separability_threshold must be in the range -1.0-1.0.",
		));
	}
	if clustering.recency_decay_per_hour < 0.0 {
		return Err(Error::validation("clustering.recency_decay_per_hour must be zero or greater."));
	}

	for (label, weight) in [
		("clustering.similarity_weight", clustering.similarity_weight),
		("clustering.recency_weight", clustering.recency_weight),
	] {
		if !(0.0..=1.0).contains(&weight) {
			return Err(Error::validation(format!("{label} must be in the range 0.0-1.0.")));
		}
	}

	if (clustering.similarity_weight + clustering.recency_weight - 1.0).abs()
		> WEIGHT_SUM_TOLERANCE
	{
		return Err(Error::validation(
			"clustering.similarity_weight and clustering.recency_weight must sum to 1.0.",
		));
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.ingest.user_agent.trim().is_empty() {
		cfg.ingest.user_agent = DEFAULT_USER_AGENT.to_string();
	}

	cfg.providers.embedding.api_base =
		cfg.providers.embedding.api_base.trim_end_matches('/').to_string();
}
