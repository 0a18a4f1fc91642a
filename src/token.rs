//! OAuth 2.0 token exchange requests and responses.
//!
//! A token exchange runs in one of two shapes. Without an instance URL the request is brokered:
//! the identity broker holds the trust relationship, so the client posts a JSON body and never
//! sends its secret. With an instance URL the client talks to the instance directly, posting a
//! form-encoded body authenticated with HTTP Basic credentials.

// crates.io
use oauth2::{AuthorizationCode, ClientSecret, RefreshToken};
use serde::ser::Serializer;
// self
use crate::{_prelude::*, config::ClientConfig, obs::CallKind};

/// Broker path that accepts JSON token requests.
pub const BROKER_TOKEN_PATH: &str = "/v1/oauth2/token";
/// Instance path that accepts form-encoded token requests.
pub const INSTANCE_TOKEN_PATH: &str = "/oauth2/token";

/// Grant presented to the token endpoint; exactly one credential travels per request.
#[derive(Clone, Debug)]
pub enum Grant {
	/// `grant_type=authorization_code` with the `code` field.
	AuthorizationCode(AuthorizationCode),
	/// `grant_type=refresh_token` with the `refresh_token` field.
	RefreshToken(RefreshToken),
}
impl Grant {
	/// Wraps an authorization code.
	pub fn authorization_code(code: impl Into<String>) -> Self {
		Self::AuthorizationCode(AuthorizationCode::new(code.into()))
	}

	/// Wraps a refresh token.
	pub fn refresh_token(token: impl Into<String>) -> Self {
		Self::RefreshToken(RefreshToken::new(token.into()))
	}

	/// Wire value of the `grant_type` field.
	pub const fn grant_type(&self) -> &'static str {
		match self {
			Self::AuthorizationCode(_) => "authorization_code",
			Self::RefreshToken(_) => "refresh_token",
		}
	}

	/// Name of the field carrying the credential.
	pub const fn credential_field(&self) -> &'static str {
		match self {
			Self::AuthorizationCode(_) => "code",
			Self::RefreshToken(_) => "refresh_token",
		}
	}

	fn credential(&self) -> &str {
		match self {
			Self::AuthorizationCode(code) => code.secret(),
			Self::RefreshToken(token) => token.secret(),
		}
	}

	pub(crate) const fn call_kind(&self) -> CallKind {
		match self {
			Self::AuthorizationCode(_) => CallKind::TokenExchange,
			Self::RefreshToken(_) => CallKind::TokenRefresh,
		}
	}
}

/// Token endpoint payload `{ client_id, code | refresh_token, grant_type }`.
#[derive(Clone, Copy, Debug)]
pub struct AccessTokenRequest<'a> {
	/// OAuth client identifier.
	pub client_id: &'a str,
	/// Grant being exchanged.
	pub grant: &'a Grant,
}
impl<'a> AccessTokenRequest<'a> {
	/// Creates a payload for `client_id` and `grant`.
	pub fn new(client_id: &'a str, grant: &'a Grant) -> Self {
		Self { client_id, grant }
	}

	/// Field/value pairs in wire order.
	pub fn pairs(&self) -> [(&'static str, &'a str); 3] {
		[
			("client_id", self.client_id),
			(self.grant.credential_field(), self.grant.credential()),
			("grant_type", self.grant.grant_type()),
		]
	}

	/// Encodes the payload as `application/x-www-form-urlencoded`.
	pub fn to_form(&self) -> String {
		url::form_urlencoded::Serializer::new(String::new()).extend_pairs(self.pairs()).finish()
	}
}
impl Serialize for AccessTokenRequest<'_> {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_map(self.pairs())
	}
}

/// Caller options selecting how a token exchange is routed.
#[derive(Clone, Debug)]
pub struct TokenExchangeOptions {
	/// OAuth client identifier.
	pub client_id: String,
	/// Client secret; only sent on direct instance exchanges.
	pub client_secret: Option<ClientSecret>,
	/// Instance base URL; when unset the exchange goes through the identity broker.
	pub jive_url: Option<String>,
}
impl TokenExchangeOptions {
	/// Creates brokered options for `client_id`.
	pub fn new(client_id: impl Into<String>) -> Self {
		Self { client_id: client_id.into(), client_secret: None, jive_url: None }
	}

	/// Seeds the client identifier and secret from the process-wide configuration.
	pub fn from_client_config(config: &ClientConfig) -> Self {
		Self {
			client_id: config.client_id.clone(),
			client_secret: config
				.client_secret
				.as_ref()
				.map(|secret| ClientSecret::new(secret.expose().to_owned())),
			jive_url: None,
		}
	}

	/// Sets or replaces the client secret.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(ClientSecret::new(secret.into()));

		self
	}

	/// Routes the exchange directly to the instance at `jive_url`.
	pub fn with_jive_url(mut self, jive_url: impl Into<String>) -> Self {
		self.jive_url = Some(jive_url.into());

		self
	}

	/// Whether the exchange goes through the identity broker.
	pub fn is_brokered(&self) -> bool {
		self.jive_url.is_none()
	}
}

/// Typed view of a token endpoint payload.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AccessTokenResponse {
	/// Newly issued access token.
	pub access_token: String,
	/// Rotated or original refresh token, when returned.
	#[serde(default)]
	pub refresh_token: Option<String>,
	/// Token type, normally `bearer`.
	#[serde(default)]
	pub token_type: Option<String>,
	/// Lifetime of the access token in seconds.
	#[serde(default)]
	pub expires_in: Option<u64>,
	/// Granted scope string.
	#[serde(default)]
	pub scope: Option<String>,
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn code_grant_serializes_code_only() {
		let grant = Grant::authorization_code("abc");
		let value = serde_json::to_value(AccessTokenRequest::new("client", &grant))
			.expect("Token request should serialize.");

		assert_eq!(
			value,
			json!({ "client_id": "client", "code": "abc", "grant_type": "authorization_code" })
		);
	}

	#[test]
	fn refresh_grant_serializes_refresh_token_only() {
		let grant = Grant::refresh_token("r-1");
		let value = serde_json::to_value(AccessTokenRequest::new("client", &grant))
			.expect("Token request should serialize.");

		assert_eq!(
			value,
			json!({ "client_id": "client", "refresh_token": "r-1", "grant_type": "refresh_token" })
		);
		assert!(value.get("code").is_none());
	}

	#[test]
	fn form_encoding_escapes_values() {
		let grant = Grant::authorization_code("a b&c");
		let form = AccessTokenRequest::new("client/1", &grant).to_form();

		assert_eq!(form, "client_id=client%2F1&code=a+b%26c&grant_type=authorization_code");
	}

	#[test]
	fn options_from_client_config_copy_secret() {
		let config = ClientConfig::new("client").with_client_secret("shh");
		let options = TokenExchangeOptions::from_client_config(&config);

		assert!(options.is_brokered());
		assert_eq!(
			options.client_secret.as_ref().map(|secret| secret.secret().as_str()),
			Some("shh")
		);
		assert!(!options.with_jive_url("https://jive.example.com").is_brokered());
	}

	#[test]
	fn access_token_response_tolerates_missing_fields() {
		let response: AccessTokenResponse =
			serde_json::from_value(json!({ "access_token": "a", "expires_in": 3600 }))
				.expect("Minimal token payload should parse.");

		assert_eq!(response.access_token, "a");
		assert_eq!(response.expires_in, Some(3600));
		assert!(response.refresh_token.is_none());
	}
}
