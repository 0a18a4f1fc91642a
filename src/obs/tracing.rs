// self
use crate::{_prelude::*, obs::CallKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by client calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"tile_client.call",
				call = kind.as_str(),
				stage,
				status = tracing::field::Empty,
				error = tracing::field::Empty
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Records the settled result on the span: the HTTP status when one was received and the
	/// [`Error::class`] of a failure.
	pub fn record_result<T>(&self, result: &Result<T>) {
		#[cfg(feature = "tracing")]
		{
			if let Err(error) = result {
				if let Error::Status { status, .. } = error {
					self.span.record("status", *status);
				}

				self.span.record("error", error.class());
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = result;
		}
	}
}

/// Logs a failure that reached no caller-supplied handler.
pub fn log_unhandled_failure(context: &'static str, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::error!(error = %error, "{context}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (context, error);
	}
}
