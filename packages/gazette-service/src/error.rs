pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Index error: {message}")]
	Index { message: String },
}
impl From<gazette_storage::Error> for Error {
	fn from(err: gazette_storage::Error) -> Self {
		match err {
			gazette_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			gazette_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			gazette_storage::Error::NotFound(message) => Self::NotFound { message },
			gazette_storage::Error::Qdrant(inner) => Self::Index { message: inner.to_string() },
		}
	}
}

impl From<gazette_providers::Error> for Error {
	fn from(err: gazette_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
