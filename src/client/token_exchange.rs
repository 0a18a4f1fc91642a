//! Authorization-code and refresh-token exchanges, brokered or direct.
//!
//! [`TileClient::exchange_token`] builds the request for either route; the
//! `*_with` adapters layer success/failure callbacks on top of the async API. Each adapter
//! consumes its callbacks, so exactly one of them fires and it fires at most once. Failures
//! without a failure callback are logged instead of being dropped silently.

// crates.io
use oauth2::http::{
	Method,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth,
	client::{APPLICATION_JSON, PreparedCall, TileClient, build_request, json_body},
	config::PUBLIC_SERVER,
	http::TileHttpClient,
	obs,
	response::TileResponse,
	token::{
		AccessTokenRequest, BROKER_TOKEN_PATH, Grant, INSTANCE_TOKEN_PATH, TokenExchangeOptions,
	},
};

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

impl<C> TileClient<C>
where
	C: TileHttpClient,
{
	/// Builds a token request for `grant`.
	///
	/// Without [`TokenExchangeOptions::jive_url`] the JSON payload goes to the identity broker's
	/// `/v1/oauth2/token` and no secret is sent. Otherwise the form payload goes to
	/// `<jive_url>/oauth2/token` with HTTP Basic client credentials.
	pub fn exchange_token(
		&self,
		options: &TokenExchangeOptions,
		grant: &Grant,
	) -> Result<PreparedCall<'_, C>> {
		let payload = AccessTokenRequest::new(&options.client_id, grant);
		let request = match &options.jive_url {
			None => {
				let url = self.servers.url(PUBLIC_SERVER, BROKER_TOKEN_PATH, &self.environment)?;

				build_request(
					Method::POST,
					&url,
					vec![(CONTENT_TYPE, APPLICATION_JSON.into())],
					json_body(&payload)?,
				)?
			},
			Some(jive_url) => {
				let url = format!("{jive_url}{INSTANCE_TOKEN_PATH}");
				let authorization = auth::basic_authorization(
					&options.client_id,
					options.client_secret.as_ref().map(|secret| secret.secret().as_str()),
				);

				build_request(
					Method::POST,
					&url,
					vec![(CONTENT_TYPE, FORM_URLENCODED.into()), (AUTHORIZATION, authorization)],
					payload.to_form().into_bytes(),
				)?
			},
		};

		Ok(PreparedCall::new(self, grant.call_kind(), "exchange_token", request))
	}

	/// Exchanges an authorization code for an access token.
	pub fn request_access_token(
		&self,
		options: &TokenExchangeOptions,
		code: impl Into<String>,
	) -> Result<PreparedCall<'_, C>> {
		self.exchange_token(options, &Grant::authorization_code(code))
	}

	/// Exchanges a refresh token for a new access token.
	pub fn refresh_access_token(
		&self,
		options: &TokenExchangeOptions,
		refresh_token: impl Into<String>,
	) -> Result<PreparedCall<'_, C>> {
		self.exchange_token(options, &Grant::refresh_token(refresh_token))
	}

	/// Callback form of [`TileClient::request_access_token`].
	pub async fn request_access_token_with<S, F>(
		&self,
		options: &TokenExchangeOptions,
		code: impl Into<String>,
		on_success: S,
		on_failure: Option<F>,
	) where
		S: FnOnce(TileResponse),
		F: FnOnce(Error),
	{
		let grant = Grant::authorization_code(code);

		settle(
			self.send_exchange(options, &grant).await,
			on_success,
			on_failure,
			"Error requesting access token!",
		);
	}

	/// Callback form of [`TileClient::refresh_access_token`].
	pub async fn refresh_access_token_with<S, F>(
		&self,
		options: &TokenExchangeOptions,
		refresh_token: impl Into<String>,
		on_success: S,
		on_failure: Option<F>,
	) where
		S: FnOnce(TileResponse),
		F: FnOnce(Error),
	{
		let grant = Grant::refresh_token(refresh_token);

		settle(
			self.send_exchange(options, &grant).await,
			on_success,
			on_failure,
			"Error requesting refresh token!",
		);
	}

	async fn send_exchange(
		&self,
		options: &TokenExchangeOptions,
		grant: &Grant,
	) -> Result<TileResponse> {
		self.exchange_token(options, grant)?.send().await
	}
}

/// Routes `result` to exactly one callback; unhandled failures are logged under `context`.
pub fn settle<T, S, F>(
	result: Result<T>,
	on_success: S,
	on_failure: Option<F>,
	context: &'static str,
) where
	S: FnOnce(T),
	F: FnOnce(Error),
{
	match result {
		Ok(value) => on_success(value),
		Err(err) => match on_failure {
			Some(on_failure) => on_failure(err),
			None => obs::log_unhandled_failure(context, &err),
		},
	}
}
