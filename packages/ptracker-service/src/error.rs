use uuid::Uuid;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Invariant violation: {message}")]
	InvariantViolation { message: String },
	#[error("Link mismatch: {message}")]
	LinkMismatch { message: String, ids: Vec<Uuid> },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String, ids: Vec<Uuid> },
	#[error("Extraction failed: {message}")]
	Extraction { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<ptracker_storage::Error> for Error {
	fn from(err: ptracker_storage::Error) -> Self {
		match err {
			ptracker_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			ptracker_storage::Error::InvalidArgument(message) => Self::Storage { message },
			ptracker_storage::Error::NotFound(message) => Self::NotFound { message },
		}
	}
}

impl From<ptracker_providers::Error> for Error {
	fn from(err: ptracker_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
