//! Response values produced by tile and token endpoint calls.

// crates.io
use oauth2::HttpResponse;
use serde::de::DeserializeOwned;
// self
use crate::_prelude::*;

/// Prefix the remote service emits ahead of JSON payloads to defeat cross-site script inclusion.
pub const SECURITY_SENTINEL: &str = "throw 'allowIllegalResourceCall is false.';\n";

/// Decoded response payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResponseBody {
	/// The endpoint returned no payload.
	Empty,
	/// Payload that is not valid JSON, kept as text.
	Raw(String),
	/// Payload parsed as JSON.
	Json(serde_json::Value),
}
impl ResponseBody {
	/// Decodes raw bytes; invalid UTF-8 sequences are replaced rather than rejected.
	pub fn from_bytes(bytes: Vec<u8>) -> Self {
		let text = String::from_utf8(bytes)
			.unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned());

		Self::from_text(text)
	}

	/// Parses `text` as JSON, falling back to [`ResponseBody::Raw`] without surfacing the error.
	pub fn from_text(text: String) -> Self {
		if text.is_empty() {
			return Self::Empty;
		}

		match serde_json::from_str(&text) {
			Ok(value) => Self::Json(value),
			Err(_) => Self::Raw(text),
		}
	}

	/// Strips [`SECURITY_SENTINEL`] when it leads a raw payload and re-parses the remainder.
	///
	/// Payloads that do not start with the exact sentinel are returned untouched.
	pub fn unguard(self) -> Self {
		match self {
			Self::Raw(text) => match text.strip_prefix(SECURITY_SENTINEL) {
				Some(rest) => Self::from_text(rest.to_owned()),
				None => Self::Raw(text),
			},
			other => other,
		}
	}

	/// Returns the parsed JSON payload, if any.
	pub fn as_json(&self) -> Option<&serde_json::Value> {
		match self {
			Self::Json(value) => Some(value),
			_ => None,
		}
	}

	/// Returns the raw text payload, if any.
	pub fn as_raw(&self) -> Option<&str> {
		match self {
			Self::Raw(text) => Some(text),
			_ => None,
		}
	}

	/// Whether the endpoint returned no payload.
	pub fn is_empty(&self) -> bool {
		matches!(self, Self::Empty)
	}
}

/// Successful (2xx) response returned by the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileResponse {
	/// HTTP status code.
	pub status: u16,
	/// Decoded payload.
	pub body: ResponseBody,
}
impl TileResponse {
	/// Converts a transport response, rejecting non-success statuses with [`Error::Status`].
	pub fn from_http(response: HttpResponse) -> Result<Self> {
		let status = response.status();
		let body = ResponseBody::from_bytes(response.into_body());

		if !status.is_success() {
			return Err(Error::Status { status: status.as_u16(), body });
		}

		Ok(Self { status: status.as_u16(), body })
	}

	/// Returns the response with its body passed through [`ResponseBody::unguard`].
	pub fn unguard(self) -> Self {
		Self { status: self.status, body: self.body.unguard() }
	}

	/// Deserializes the payload into `T`, reporting the failing field path on mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let result = match &self.body {
			ResponseBody::Json(value) => serde_path_to_error::deserialize(value),
			ResponseBody::Raw(text) =>
				serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_str(text)),
			ResponseBody::Empty =>
				serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_str("")),
		};

		result.map_err(|source| Error::Decode { source })
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::StatusCode;
	use serde_json::json;
	// self
	use super::*;

	fn http_response(status: u16, body: &str) -> HttpResponse {
		let mut response = HttpResponse::new(body.as_bytes().to_vec());

		*response.status_mut() = StatusCode::from_u16(status).expect("Status should be valid.");

		response
	}

	#[test]
	fn sentinel_prefixed_json_is_parsed() {
		let body = ResponseBody::from_text(format!("{SECURITY_SENTINEL}{{\"a\":1}}")).unguard();

		assert_eq!(body, ResponseBody::Json(json!({ "a": 1 })));
	}

	#[test]
	fn non_json_without_sentinel_stays_raw() {
		let body = ResponseBody::from_text("<html>nope</html>".into()).unguard();

		assert_eq!(body.as_raw(), Some("<html>nope</html>"));
	}

	#[test]
	fn sentinel_must_match_at_offset_zero() {
		let text = format!(" {SECURITY_SENTINEL}{{\"a\":1}}");
		let body = ResponseBody::from_text(text.clone()).unguard();

		assert_eq!(body, ResponseBody::Raw(text));
	}

	#[test]
	fn stripped_non_json_remainder_stays_raw() {
		let body = ResponseBody::from_text(format!("{SECURITY_SENTINEL}not json")).unguard();

		assert_eq!(body, ResponseBody::Raw("not json".into()));
	}

	#[test]
	fn empty_payload_is_empty() {
		assert!(ResponseBody::from_bytes(Vec::new()).is_empty());
		assert!(ResponseBody::from_text(SECURITY_SENTINEL.into()).unguard().is_empty());
	}

	#[test]
	fn non_success_status_becomes_error() {
		let err = TileResponse::from_http(http_response(403, "{\"error\":\"forbidden\"}"))
			.expect_err("HTTP 403 must be rejected.");

		match err {
			Error::Status { status, body } => {
				assert_eq!(status, 403);
				assert_eq!(body, ResponseBody::Json(json!({ "error": "forbidden" })));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn typed_decode_reports_field_path() {
		#[derive(Debug, Deserialize)]
		struct Payload {
			#[allow(dead_code)]
			count: u32,
		}

		let response = TileResponse::from_http(http_response(200, "{\"count\":\"many\"}"))
			.expect("HTTP 200 should be accepted.");
		let err = response.json::<Payload>().expect_err("String count must not decode.");

		match err {
			Error::Decode { source } => assert_eq!(source.path().to_string(), "count"),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
