use std::future::Future;

use thiserror::Error;

use super::fault::{FaultKind, classify};

/// Raised by an operation when the server answered with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("server responded with HTTP {status}")]
pub struct HttpStatusError {
    pub status: u16,
    /// Raw error body; `None` when the server sent nothing.
    pub body: Option<String>,
}

impl HttpStatusError {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let body = if body.trim().is_empty() { None } else { Some(body) };
        Self { status, body }
    }

    pub fn without_body(status: u16) -> Self {
        Self { status, body: None }
    }
}

/// Cooperative cancellation of an in-flight request.
///
/// Never turned into a result value; it always travels back to the caller as
/// an `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("request was cancelled")]
pub struct Cancelled;

/// What happened at the transport level for a single invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportOutcome<R> {
    Success(R),
    HttpFault { status: u16, raw_body: Option<String> },
    NonHttpFault(FaultKind),
}

/// Await `operation` once and sort its outcome.
pub async fn execute<R, F>(operation: F) -> Result<TransportOutcome<R>, Cancelled>
where
    F: Future<Output = anyhow::Result<R>>,
{
    match operation.await {
        Ok(body) => Ok(TransportOutcome::Success(body)),
        Err(err) => outcome_from_error(err),
    }
}

fn outcome_from_error<R>(err: anyhow::Error) -> Result<TransportOutcome<R>, Cancelled> {
    if err.chain().any(|cause| cause.is::<Cancelled>()) {
        return Err(Cancelled);
    }

    if let Some(http) = err.chain().find_map(|cause| cause.downcast_ref::<HttpStatusError>()) {
        return Ok(TransportOutcome::HttpFault { status: http.status, raw_body: http.body.clone() });
    }

    // `error_for_status()` style failures carry the status but not the body.
    if let Some(status) = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<reqwest::Error>())
        .find(|e| e.is_status())
        .and_then(reqwest::Error::status)
    {
        return Ok(TransportOutcome::HttpFault { status: status.as_u16(), raw_body: None });
    }

    let kind = classify(&err);
    tracing::debug!(%kind, error = %format!("{err:#}"), "request failed before an HTTP response");
    Ok(TransportOutcome::NonHttpFault(kind))
}
