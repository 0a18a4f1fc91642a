// self
use crate::{
	_prelude::*,
	obs::{CallKind, CallOutcome},
};

/// Counts a dispatched call before its request leaves the process.
pub fn record_call_attempt(kind: CallKind) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"tile_client_call_total",
			"call" => kind.as_str(),
			"outcome" => CallOutcome::Attempt.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = kind;
	}
}

/// Counts the settled result of a call.
///
/// Failures are labeled with their [`Error::class`]; HTTP status failures also feed the
/// `tile_client_http_status_total` counter so rejected tokens (401) and outages (5xx) can be told
/// apart without parsing logs.
pub fn record_call_result<T>(kind: CallKind, result: &Result<T>) {
	#[cfg(feature = "metrics")]
	{
		let outcome = CallOutcome::of(result);
		let error = result.as_ref().err().map_or("none", Error::class);

		metrics::counter!(
			"tile_client_call_total",
			"call" => kind.as_str(),
			"outcome" => outcome.as_str(),
			"error" => error
		)
		.increment(1);

		if let Err(Error::Status { status, .. }) = result {
			metrics::counter!(
				"tile_client_http_status_total",
				"call" => kind.as_str(),
				"status" => status.to_string()
			)
			.increment(1);
		}
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, result);
	}
}
