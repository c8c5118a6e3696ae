use crate::{BoxFuture, Error, Result};
use herald_config::EmbeddingProviderConfig;
use herald_providers::EmbeddingClient;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	/// Embeds one article. The vector is returned as produced, without normalization.
	fn generate<'a>(&'a self, title: &'a str, content: &'a str)
	-> BoxFuture<'a, Result<Vec<f32>>>;
}

/// [`EmbeddingProvider`] backed by an OpenAI-compatible HTTP endpoint. Failures are reported
/// as [`Error::Provider`] prefixed with the configured `provider_id`.
pub struct HttpEmbedding {
	provider_id: String,
	client: EmbeddingClient,
}
impl HttpEmbedding {
	pub fn new(cfg: &EmbeddingProviderConfig) -> Result<Self> {
		let client = EmbeddingClient::new(cfg)?;

		tracing::info!(
			provider_id = %cfg.provider_id,
			model = %cfg.model,
			dimensions = cfg.dimensions,
			"Embedding provider ready."
		);

		Ok(Self { provider_id: cfg.provider_id.clone(), client })
	}

	pub fn provider_id(&self) -> &str {
		&self.provider_id
	}
}

impl EmbeddingProvider for HttpEmbedding {
	fn generate<'a>(
		&'a self,
		title: &'a str,
		content: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(async move {
			self.client.embed_article(title, content).await.map_err(|err| Error::Provider {
				message: format!("{}: {err}", self.provider_id),
			})
		})
	}
}
