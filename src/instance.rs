//! Tile instance model and URL derivation helpers.

// self
use crate::{
	_prelude::*,
	auth::{self, TokenSecret},
	error::ConfigError,
};

const DATA_SUFFIX: &str = "/data";
const ACTIVITIES_SUFFIX: &str = "/activities";
const EXTENDED_PROPERTIES_SUFFIX: &str = "/extprops";

/// A deployed tile's callback endpoint paired with its current bearer credential.
///
/// Instances are owned and persisted by the host application; the client only reads them.
/// Unknown fields are ignored when deserializing host records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileInstance {
	/// Data or activity push URL registered for the tile.
	pub url: String,
	/// Bearer token presented on every call for this instance.
	pub access_token: TokenSecret,
}
impl TileInstance {
	/// Creates a new instance from its push URL and access token.
	pub fn new(url: impl Into<String>, access_token: impl Into<TokenSecret>) -> Self {
		Self { url: url.into(), access_token: access_token.into() }
	}

	/// `Authorization` header value for this instance.
	pub fn bearer_authorization(&self) -> String {
		auth::bearer_authorization(&self.access_token)
	}

	/// Derives the extended-properties URL by replacing a trailing `/data` or `/activities`
	/// segment with `/extprops`.
	pub fn extended_properties_url(&self) -> Result<String, ConfigError> {
		[DATA_SUFFIX, ACTIVITIES_SUFFIX]
			.into_iter()
			.find_map(|suffix| self.url.strip_suffix(suffix))
			.filter(|prefix| !prefix.is_empty())
			.map(|prefix| format!("{prefix}{EXTENDED_PROPERTIES_SUFFIX}"))
			.ok_or_else(|| ConfigError::ExtendedPropertiesUrl { url: self.url.clone() })
	}
}
