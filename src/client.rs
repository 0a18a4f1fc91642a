//! Tile client that issues token exchanges and bearer-authenticated tile calls.
//!
//! Every operation runs in two phases. Building the call is synchronous and returns a
//! [`PreparedCall`]; configuration problems such as an unresolvable broker, an invalid URL, or a
//! tile URL without a known suffix surface there, before any I/O. Awaiting the prepared call
//! performs exactly one round trip with no retry.

pub mod token_exchange;

pub use token_exchange::*;

// std
use std::future::IntoFuture;
// crates.io
use oauth2::{
	AsyncHttpClient, HttpRequest,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderName},
	},
};
// self
use crate::{
	_prelude::*,
	config::{ClientConfig, Environment, ServerConfig},
	error::ConfigError,
	http::{self, TileHttpClient},
	instance::TileInstance,
	obs::{self, CallKind},
	response::TileResponse,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

const APPLICATION_JSON: &str = "application/json";
const X_CLIENT_ID: &str = "x-client-id";

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestTileClient = TileClient<ReqwestHttpClient>;

/// Issues token exchanges and tile calls over a shared transport.
///
/// The client owns read-only configuration (server map, environment snapshot, client identity)
/// and never mutates the tile instances it is handed.
pub struct TileClient<C>
where
	C: TileHttpClient,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Logical server map used to locate the identity broker.
	pub servers: Arc<ServerConfig>,
	/// Environment snapshot consulted for server overrides.
	pub environment: Arc<Environment>,
	/// Process-wide client identity.
	pub client_config: Arc<ClientConfig>,
}
impl<C> TileClient<C>
where
	C: TileHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(
		servers: ServerConfig,
		environment: Environment,
		client_config: ClientConfig,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			servers: Arc::new(servers),
			environment: Arc::new(environment),
			client_config: Arc::new(client_config),
		}
	}

	/// Replaces the tile data with a `PUT` to the instance URL.
	///
	/// The URL is validated but sent exactly as written; no host or path normalization happens
	/// before the request reaches the transport.
	pub fn push_data<T>(&self, instance: &TileInstance, data: &T) -> Result<PreparedCall<'_, C>>
	where
		T: ?Sized + Serialize,
	{
		self.tile_push(Method::PUT, instance, &instance.url, data, "push_data")
	}

	/// Posts an activity to the instance URL.
	pub fn push_activity<T>(
		&self,
		instance: &TileInstance,
		activity: &T,
	) -> Result<PreparedCall<'_, C>>
	where
		T: ?Sized + Serialize,
	{
		self.tile_push(Method::POST, instance, &instance.url, activity, "push_activity")
	}

	/// Posts a comment to `comment_url` using the instance's credential.
	pub fn push_comment<T>(
		&self,
		instance: &TileInstance,
		comment: &T,
		comment_url: &str,
	) -> Result<PreparedCall<'_, C>>
	where
		T: ?Sized + Serialize,
	{
		self.tile_push(Method::POST, instance, comment_url, comment, "push_comment")
	}

	/// Issues a bearer-authenticated `GET` and returns the payload as received.
	pub fn tile_fetch(&self, instance: &TileInstance, url: &str) -> Result<PreparedCall<'_, C>> {
		let request = build_request(Method::GET, url, tile_headers(instance), Vec::new())?;

		Ok(PreparedCall::new(self, CallKind::Fetch, "tile_fetch", request))
	}

	/// Issues a bearer-authenticated `GET`, stripping the security sentinel before parsing JSON.
	///
	/// A payload that is still not JSON once unguarded is returned as raw text.
	pub fn get_with_tile_instance_auth(
		&self,
		instance: &TileInstance,
		url: &str,
	) -> Result<PreparedCall<'_, C>> {
		let request = build_request(Method::GET, url, tile_headers(instance), Vec::new())?;

		Ok(PreparedCall::new(self, CallKind::Fetch, "get_with_tile_instance_auth", request)
			.unguarded())
	}

	/// Reads the instance's extended properties.
	pub fn fetch_extended_properties(
		&self,
		instance: &TileInstance,
	) -> Result<PreparedCall<'_, C>> {
		let url = instance.extended_properties_url()?;
		let headers = self.extended_properties_headers(instance);
		let request = build_request(Method::GET, &url, headers, Vec::new())?;

		Ok(PreparedCall::new(
			self,
			CallKind::ExtendedProperties,
			"fetch_extended_properties",
			request,
		))
	}

	/// Stores extended properties for the instance.
	pub fn push_extended_properties<T>(
		&self,
		instance: &TileInstance,
		props: &T,
	) -> Result<PreparedCall<'_, C>>
	where
		T: ?Sized + Serialize,
	{
		let url = instance.extended_properties_url()?;
		let mut headers = self.extended_properties_headers(instance);

		headers.push((CONTENT_TYPE, APPLICATION_JSON.into()));

		let request = build_request(Method::POST, &url, headers, json_body(props)?)?;

		Ok(PreparedCall::new(
			self,
			CallKind::ExtendedProperties,
			"push_extended_properties",
			request,
		))
	}

	/// Deletes the instance's extended properties.
	pub fn remove_extended_properties(
		&self,
		instance: &TileInstance,
	) -> Result<PreparedCall<'_, C>> {
		let url = instance.extended_properties_url()?;
		let request = build_request(
			Method::DELETE,
			&url,
			self.extended_properties_headers(instance),
			Vec::new(),
		)?;

		Ok(PreparedCall::new(
			self,
			CallKind::ExtendedProperties,
			"remove_extended_properties",
			request,
		))
	}

	fn tile_push<T>(
		&self,
		method: Method,
		instance: &TileInstance,
		url: &str,
		payload: &T,
		stage: &'static str,
	) -> Result<PreparedCall<'_, C>>
	where
		T: ?Sized + Serialize,
	{
		let request = build_request(method, url, tile_headers(instance), json_body(payload)?)?;

		Ok(PreparedCall::new(self, CallKind::Push, stage, request))
	}

	fn extended_properties_headers(&self, instance: &TileInstance) -> Vec<(HeaderName, String)> {
		vec![
			(HeaderName::from_static(X_CLIENT_ID), self.client_config.client_id.clone()),
			(AUTHORIZATION, instance.bearer_authorization()),
		]
	}
}
#[cfg(feature = "reqwest")]
impl TileClient<ReqwestHttpClient> {
	/// Creates a client backed by a default reqwest transport.
	pub fn new(
		servers: ServerConfig,
		environment: Environment,
		client_config: ClientConfig,
	) -> Self {
		Self::with_http_client(servers, environment, client_config, ReqwestHttpClient::default())
	}

	/// Creates a client with the built-in server map and a snapshot of the process environment.
	pub fn from_env(client_config: ClientConfig) -> Self {
		Self::new(ServerConfig::default(), Environment::capture(), client_config)
	}
}
impl<C> Clone for TileClient<C>
where
	C: TileHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: Arc::clone(&self.http_client),
			servers: Arc::clone(&self.servers),
			environment: Arc::clone(&self.environment),
			client_config: Arc::clone(&self.client_config),
		}
	}
}
impl<C> Debug for TileClient<C>
where
	C: TileHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TileClient")
			.field("servers", &self.servers)
			.field("client_id", &self.client_config.client_id)
			.field("client_secret_set", &self.client_config.client_secret.is_some())
			.finish()
	}
}

/// A fully built request awaiting dispatch.
///
/// Await it (or call [`PreparedCall::send`]) to perform the round trip; inspect it with
/// [`PreparedCall::request`] beforehand.
pub struct PreparedCall<'a, C>
where
	C: TileHttpClient,
{
	client: &'a TileClient<C>,
	kind: CallKind,
	stage: &'static str,
	request: HttpRequest,
	unguard: bool,
}
impl<'a, C> PreparedCall<'a, C>
where
	C: TileHttpClient,
{
	fn new(
		client: &'a TileClient<C>,
		kind: CallKind,
		stage: &'static str,
		request: HttpRequest,
	) -> Self {
		Self { client, kind, stage, request, unguard: false }
	}

	fn unguarded(mut self) -> Self {
		self.unguard = true;

		self
	}

	/// Request that will be sent.
	pub fn request(&self) -> &HttpRequest {
		&self.request
	}

	/// Call kind used for spans and metrics.
	pub fn kind(&self) -> CallKind {
		self.kind
	}

	/// Sends the request and converts the response; non-2xx statuses become [`Error::Status`].
	pub async fn send(self) -> Result<TileResponse> {
		let Self { client, kind, stage, request, unguard } = self;

		obs::observe(kind, stage, async move {
			let handle = client.http_client.handle();
			let response = handle.call(request).await.map_err(http::map_transport_error)?;
			let response = TileResponse::from_http(response)?;

			Ok(if unguard { response.unguard() } else { response })
		})
		.await
	}
}
impl<'a, C> IntoFuture for PreparedCall<'a, C>
where
	C: TileHttpClient,
{
	type IntoFuture = Pin<Box<dyn Future<Output = Result<TileResponse>> + 'a + Send>>;
	type Output = Result<TileResponse>;

	fn into_future(self) -> Self::IntoFuture {
		Box::pin(self.send())
	}
}
impl<C> Debug for PreparedCall<'_, C>
where
	C: TileHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PreparedCall")
			.field("kind", &self.kind)
			.field("stage", &self.stage)
			.field("method", self.request.method())
			.field("uri", self.request.uri())
			.finish()
	}
}

fn tile_headers(instance: &TileInstance) -> Vec<(HeaderName, String)> {
	vec![
		(CONTENT_TYPE, APPLICATION_JSON.into()),
		(ACCEPT, APPLICATION_JSON.into()),
		(AUTHORIZATION, instance.bearer_authorization()),
	]
}

fn json_body<T>(payload: &T) -> Result<Vec<u8>>
where
	T: ?Sized + Serialize,
{
	Ok(serde_json::to_vec(payload).map_err(ConfigError::EncodeBody)?)
}

fn build_request(
	method: Method,
	url: &str,
	headers: Vec<(HeaderName, String)>,
	body: Vec<u8>,
) -> Result<HttpRequest> {
	// Validated only; the caller's URL is sent as written.
	Url::parse(url).map_err(|source| ConfigError::InvalidUrl { url: url.to_owned(), source })?;

	let mut builder = Request::builder().method(method).uri(url);

	for (name, value) in headers {
		builder = builder.header(name, value);
	}

	Ok(builder.body(body).map_err(ConfigError::from)?)
}
