//! Clustering driver: turns unassigned articles into issues through pluggable storage and
//! embedding backends.

pub mod cluster;
pub mod embedding;
pub mod locks;
pub mod memory;
pub mod pipeline;
pub mod store;

mod error;

use std::{future::Future, pin::Pin};

pub use cluster::{ClusterOutcome, ClusterReport, ClusterService};
pub use embedding::{EmbeddingProvider, HttpEmbedding};
pub use error::{Error, Result};
pub use locks::IssueLocks;
pub use memory::MemoryStore;
pub use pipeline::{PipelineReport, run_pipeline};
pub use store::{ArticleStore, ClusterStore, IssueEmbeddingStore, IssueStore, PgStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
