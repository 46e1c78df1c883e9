//! Request execution pipeline.
//!
//! One asynchronous operation goes in, exactly one [`ExecutionResult`] comes
//! out: the body on success, the server's domain error when it sent a
//! readable one, or a [`FaultKind`] for everything else. Cancellation is the
//! only thing that escapes, as `Err(Cancelled)`.

use std::future::Future;

use tokio_util::sync::CancellationToken;

pub mod error_body;
pub mod fault;
pub mod transport;

pub use error_body::{DecodeError, ErrorBodyDecoder, ErrorCodec, ErrorResponse, JsonCodec, StructuredError};
pub use fault::{FaultKind, classify};
pub use transport::{Cancelled, HttpStatusError, TransportOutcome, execute};

/// Outcome of a request as seen by the rest of the application.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult<R> {
    Success(R),
    ExpectedError(StructuredError),
    UnexpectedFailure(FaultKind),
}

impl<R> ExecutionResult<R> {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success(_))
    }

    pub fn data(self) -> Option<R> {
        match self {
            ExecutionResult::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn map<T>(self, f: impl FnOnce(R) -> T) -> ExecutionResult<T> {
        match self {
            ExecutionResult::Success(data) => ExecutionResult::Success(f(data)),
            ExecutionResult::ExpectedError(err) => ExecutionResult::ExpectedError(err),
            ExecutionResult::UnexpectedFailure(kind) => ExecutionResult::UnexpectedFailure(kind),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestExecutor<C = JsonCodec> {
    decoder: ErrorBodyDecoder<C>,
}

impl<C: ErrorCodec> RequestExecutor<C> {
    pub fn new(codec: C) -> Self {
        Self { decoder: ErrorBodyDecoder::new(codec) }
    }

    /// Run `operation` once and assemble its result. No retries.
    pub async fn run<R, F>(&self, operation: F) -> Result<ExecutionResult<R>, Cancelled>
    where
        F: Future<Output = anyhow::Result<R>>,
    {
        let result = match execute(operation).await? {
            TransportOutcome::Success(body) => ExecutionResult::Success(body),
            TransportOutcome::HttpFault { status, raw_body } => {
                self.assemble_http_fault(status, raw_body.as_deref())
            }
            TransportOutcome::NonHttpFault(kind) => ExecutionResult::UnexpectedFailure(kind),
        };

        match &result {
            ExecutionResult::Success(_) => tracing::debug!("request succeeded"),
            ExecutionResult::ExpectedError(err) => tracing::warn!(
                server_message = err.message.as_deref().unwrap_or("-"),
                code = err.code.as_deref().unwrap_or("-"),
                "request returned a server error"
            ),
            ExecutionResult::UnexpectedFailure(kind) => {
                tracing::warn!(%kind, "request failed")
            }
        }

        Ok(result)
    }

    /// Like [`run`](Self::run), but gives up as soon as `cancel` fires.
    ///
    /// The in-flight operation is dropped on cancellation.
    pub async fn run_cancellable<R, F>(
        &self,
        cancel: &CancellationToken,
        operation: F,
    ) -> Result<ExecutionResult<R>, Cancelled>
    where
        F: Future<Output = anyhow::Result<R>>,
    {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("request cancelled");
                Err(Cancelled)
            }
            result = self.run(operation) => result,
        }
    }

    fn assemble_http_fault<R>(&self, status: u16, raw_body: Option<&str>) -> ExecutionResult<R> {
        match self.decoder.decode(raw_body) {
            Ok(err) => ExecutionResult::ExpectedError(err),
            Err(e) => {
                tracing::warn!(status, error = %e, "could not decode server error body");
                ExecutionResult::UnexpectedFailure(FaultKind::ServerError)
            }
        }
    }
}
