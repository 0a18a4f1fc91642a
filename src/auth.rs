//! Credential models and `Authorization` header helpers.

mod secret;

pub use secret::*;

// crates.io
use base64::{Engine, prelude::BASE64_STANDARD};

/// Formats an `Authorization: Bearer` value from a tile access token.
pub fn bearer_authorization(token: &TokenSecret) -> String {
	format!("Bearer {}", token.expose())
}

/// Formats an `Authorization: Basic` value; a missing secret encodes as an empty password.
pub fn basic_authorization(client_id: &str, client_secret: Option<&str>) -> String {
	let credentials = format!("{client_id}:{}", client_secret.unwrap_or_default());

	format!("Basic {}", BASE64_STANDARD.encode(credentials))
}
