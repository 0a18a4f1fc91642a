//! Optional observability helpers for client calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `tile_client.call` with the `call` (kind)
//!   and `stage` (operation) fields, and to log failures nobody handled.
//!   Settled spans carry the HTTP `status` (when one arrived) and the failure `error` class.
//! - Enable `metrics` to increment the `tile_client_call_total` counter for every
//!   attempt/success/failure, labeled by `call`, `outcome` and `error`, plus
//!   `tile_client_http_status_total` for non-success statuses.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Call kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Authorization code exchange.
	TokenExchange,
	/// Refresh token exchange.
	TokenRefresh,
	/// Data, activity, or comment push.
	Push,
	/// Authenticated fetch against a tile URL.
	Fetch,
	/// Extended-properties fetch, push, or removal.
	ExtendedProperties,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::TokenExchange => "token_exchange",
			CallKind::TokenRefresh => "token_refresh",
			CallKind::Push => "push",
			CallKind::Fetch => "fetch",
			CallKind::ExtendedProperties => "extended_properties",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a client call.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}

	/// Outcome of a settled call.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => CallOutcome::Success,
			Err(_) => CallOutcome::Failure,
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside a call span, recording the attempt and the settled result.
pub(crate) async fn observe<Fut, T>(kind: CallKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = CallSpan::new(kind, stage);

	record_call_attempt(kind);

	let result = span.instrument(fut).await;

	span.record_result(&result);
	record_call_result(kind, &result);

	result
}
