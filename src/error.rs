//! Client-level error types shared across token exchanges and tile requests.

// self
use crate::{_prelude::*, response::ResponseBody};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem raised before any I/O happens.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Remote endpoint answered with a non-success status.
	#[error("Remote endpoint responded with HTTP {status}.")]
	Status {
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// Response payload, kept for callers that inspect error documents.
		body: ResponseBody,
	},
	/// Response payload does not match the requested type.
	#[error("Response payload could not be decoded.")]
	Decode {
		/// Structured decoding failure with the offending field path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

impl Error {
	/// Stable label for the failure class, used by span fields and metric labels.
	pub const fn class(&self) -> &'static str {
		match self {
			Error::Config(_) => "config",
			Error::Transport(_) => "transport",
			Error::Status { .. } => "status",
			Error::Decode { .. } => "decode",
		}
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Request payload could not be serialized.
	#[error("Request payload could not be serialized.")]
	EncodeBody(#[source] serde_json::Error),

	/// Logical server has neither a configured base URL nor an override.
	#[error("No base URL is configured for server `{server}` and `{variable}` is unset.")]
	UnknownServer {
		/// Logical server name.
		server: String,
		/// Environment variable consulted for the override.
		variable: String,
	},
	/// Target URL cannot be parsed.
	#[error("URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending URL.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Tile instance URL does not end with a known collection suffix.
	#[error("Could not derive the extended-properties URL from tile instance URL `{url}`.")]
	ExtendedPropertiesUrl {
		/// Tile instance URL.
		url: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the remote endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the remote endpoint.")]
	Io(#[from] std::io::Error),
	/// Transport failed without a structured error.
	#[error("HTTP client error occurred while calling the remote endpoint: {message}.")]
	Other {
		/// Transport-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
