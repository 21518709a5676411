pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Storage(#[from] ptracker_storage::Error),
	#[error(transparent)]
	Service(#[from] ptracker_service::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
}
