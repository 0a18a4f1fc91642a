//! Endpoint resolution and process-wide client configuration.
//!
//! Logical servers (for example `public`, the identity broker) map to base URLs through a
//! [`ServerConfig`]. Each server can be overridden with an environment variable named
//! `<namespace>_<server>`; with the default namespace the broker override is
//! `jive_jiveid_servers_public=http://localhost:4000`. Overrides are read from an
//! [`Environment`] snapshot so resolution stays a pure function of its inputs.

// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Namespace prefixed to server names when looking up environment overrides.
pub const DEFAULT_NAMESPACE: &str = "jive_jiveid_servers";
/// Logical name of the public identity broker.
pub const PUBLIC_SERVER: &str = "public";
/// Built-in base URL of the public identity broker.
pub const PUBLIC_SERVER_URL: &str = "https://jive-id-public.jiveon.com";

/// Static mapping from logical server names to base URLs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
	/// Prefix of the override variable (`<namespace>_<server>`).
	#[serde(default = "default_namespace")]
	pub namespace: String,
	/// Configured base URLs keyed by logical server name.
	#[serde(default)]
	pub servers: BTreeMap<String, String>,
}
impl ServerConfig {
	/// Creates an empty configuration under the provided namespace.
	pub fn new(namespace: impl Into<String>) -> Self {
		Self { namespace: namespace.into(), servers: BTreeMap::new() }
	}

	/// Registers or replaces the base URL for a logical server.
	pub fn with_server(mut self, name: impl Into<String>, base_url: impl Into<String>) -> Self {
		self.servers.insert(name.into(), base_url.into());

		self
	}

	/// Name of the environment variable that overrides `server`.
	pub fn override_variable(&self, server: &str) -> String {
		format!("{}_{server}", self.namespace)
	}

	/// Resolves the base URL for `server`, preferring a non-empty environment override.
	pub fn base_url<'a>(
		&'a self,
		server: &str,
		env: &'a Environment,
	) -> Result<&'a str, ConfigError> {
		let variable = self.override_variable(server);

		if let Some(value) = env.get(&variable).filter(|value| !value.is_empty()) {
			return Ok(value);
		}

		self.servers
			.get(server)
			.map(String::as_str)
			.ok_or_else(|| ConfigError::UnknownServer { server: server.to_owned(), variable })
	}

	/// Resolves `server` and appends `path` verbatim.
	pub fn url(&self, server: &str, path: &str, env: &Environment) -> Result<String, ConfigError> {
		Ok(format!("{}{path}", self.base_url(server, env)?))
	}
}
impl Default for ServerConfig {
	fn default() -> Self {
		Self::new(DEFAULT_NAMESPACE).with_server(PUBLIC_SERVER, PUBLIC_SERVER_URL)
	}
}

fn default_namespace() -> String {
	DEFAULT_NAMESPACE.into()
}

/// Immutable snapshot of environment variables consulted for endpoint overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Environment(BTreeMap<String, String>);
impl Environment {
	/// Captures the current process environment, skipping entries that are not valid UTF-8.
	pub fn capture() -> Self {
		std::env::vars_os()
			.filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
			.collect()
	}

	/// Returns a copy of the snapshot with `key` set to `value`.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.insert(key.into(), value.into());

		self
	}

	/// Looks up a variable in the snapshot.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}
}
impl<K, V> FromIterator<(K, V)> for Environment
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
	}
}

/// Process-wide identity of the client application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
	/// OAuth client identifier, also sent as `X-Client-Id` on extended-properties calls.
	pub client_id: String,
	/// Client secret used for direct instance token exchanges.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_secret: Option<TokenSecret>,
}
impl ClientConfig {
	/// Creates a configuration without a client secret.
	pub fn new(client_id: impl Into<String>) -> Self {
		Self { client_id: client_id.into(), client_secret: None }
	}

	/// Sets or replaces the client secret.
	pub fn with_client_secret(mut self, secret: impl Into<TokenSecret>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn default_config_targets_public_broker() {
		let config = ServerConfig::default();
		let url = config
			.url(PUBLIC_SERVER, "/v1/oauth2/token", &Environment::default())
			.expect("Public server should resolve without overrides.");

		assert_eq!(url, "https://jive-id-public.jiveon.com/v1/oauth2/token");
		assert_eq!(config.override_variable(PUBLIC_SERVER), "jive_jiveid_servers_public");
	}

	#[test]
	fn override_wins_verbatim() {
		let env = Environment::default().with("jive_jiveid_servers_public", "http://myjive:4000");
		let url = ServerConfig::default()
			.url(PUBLIC_SERVER, "/path", &env)
			.expect("Override should resolve.");

		assert_eq!(url, "http://myjive:4000/path");
	}

	#[test]
	fn override_resolves_unconfigured_server() {
		let env: Environment =
			[("acme_staging", "https://staging.acme.test/")].into_iter().collect();
		let url = ServerConfig::new("acme")
			.url("staging", "v1", &env)
			.expect("Override should resolve an unconfigured server.");

		assert_eq!(url, "https://staging.acme.test/v1");
	}

	#[test]
	fn empty_override_falls_back_to_config() {
		let env = Environment::default().with("jive_jiveid_servers_public", "");
		let config = ServerConfig::default();
		let base = config.base_url(PUBLIC_SERVER, &env).expect("Configured URL should be used.");

		assert_eq!(base, PUBLIC_SERVER_URL);
	}

	#[test]
	fn unknown_server_is_a_config_error() {
		let err = ServerConfig::default()
			.url("private", "/x", &Environment::default())
			.expect_err("Unconfigured servers must not resolve.");

		match err {
			ConfigError::UnknownServer { server, variable } => {
				assert_eq!(server, "private");
				assert_eq!(variable, "jive_jiveid_servers_private");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn server_config_deserializes_with_default_namespace() {
		let config: ServerConfig =
			serde_json::from_str(r#"{"servers":{"public":"https://broker.example.com"}}"#)
				.expect("Server config should parse.");

		assert_eq!(config.namespace, DEFAULT_NAMESPACE);
		assert_eq!(
			config.servers.get("public").map(String::as_str),
			Some("https://broker.example.com")
		);
	}

	#[test]
	fn client_config_uses_camel_case() {
		let config: ClientConfig =
			serde_json::from_str(r#"{"clientId":"abc","clientSecret":"shh"}"#)
				.expect("Client config should parse.");

		assert_eq!(config.client_id, "abc");
		assert_eq!(config.client_secret.as_ref().map(TokenSecret::expose), Some("shh"));
	}
}
