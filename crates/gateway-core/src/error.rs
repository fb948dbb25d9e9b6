use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenMapError {
	#[error("token map handle not found or expired")]
	HandleNotFound,
	#[error("backend store error: {0}")]
	Backend(String),
	#[error("encryption failure: {0}")]
	Crypto(String),
}

#[derive(Debug, Error)]
pub enum PolicyError {
	#[error("policy document has no default decision and no route matched")]
	NoMatchingRoute,
	#[error("policy document references unknown category {0:?} in a route")]
	UnknownCategory(String),
}

#[derive(Debug, Error)]
pub enum DetokenizeError {
	#[error("caller is not authorized to detokenize this handle")]
	Unauthorized,
	#[error(transparent)]
	TokenMap(#[from] TokenMapError),
}
