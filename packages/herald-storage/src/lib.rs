pub mod articles;
pub mod db;
pub mod issue_embeddings;
pub mod issues;
pub mod models;
pub mod schema;
pub mod vector;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
