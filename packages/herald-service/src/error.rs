use herald_domain::DimensionMismatch;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Validation error: {message}")]
	Validation { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
}
impl Error {
	pub(crate) fn validation(message: impl Into<String>) -> Self {
		Self::Validation { message: message.into() }
	}

	pub(crate) fn not_found(message: impl Into<String>) -> Self {
		Self::NotFound { message: message.into() }
	}
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<herald_storage::Error> for Error {
	fn from(err: herald_storage::Error) -> Self {
		match err {
			herald_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			herald_storage::Error::InvalidArgument(message) => Self::Validation { message },
			herald_storage::Error::NotFound(message) => Self::NotFound { message },
		}
	}
}

impl From<herald_providers::Error> for Error {
	fn from(err: herald_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<DimensionMismatch> for Error {
	fn from(err: DimensionMismatch) -> Self {
		Self::Validation { message: err.to_string() }
	}
}
