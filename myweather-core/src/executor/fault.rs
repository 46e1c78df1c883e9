use std::io;

/// Application-level kind of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    Io,
    Timeout,
    Deserialization,
    Unknown,
    /// The server reported an error, but its body could not be decoded.
    ServerError,
}

impl FaultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultKind::Io => "io",
            FaultKind::Timeout => "timeout",
            FaultKind::Deserialization => "deserialization",
            FaultKind::Unknown => "unknown",
            FaultKind::ServerError => "server_error",
        }
    }

    pub const fn all() -> &'static [FaultKind] {
        &[
            FaultKind::Io,
            FaultKind::Timeout,
            FaultKind::Deserialization,
            FaultKind::Unknown,
            FaultKind::ServerError,
        ]
    }

    /// Short text suitable for showing to the end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            FaultKind::Io => "No internet connection. Check your network settings.",
            FaultKind::Timeout => "The server took too long to respond. Check your connection speed.",
            FaultKind::Deserialization => "Could not process the data received from the server.",
            FaultKind::Unknown => "An unexpected error occurred.",
            FaultKind::ServerError => "The server reported an error that could not be read.",
        }
    }
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map an operation error into a [`FaultKind`].
///
/// The source chain is walked from the outermost error inwards and the first
/// recognised cause decides the kind. Errors with no recognised cause are
/// `Unknown`. This never yields [`FaultKind::ServerError`].
pub fn classify(err: &anyhow::Error) -> FaultKind {
    err.chain().find_map(classify_cause).unwrap_or(FaultKind::Unknown)
}

fn classify_cause(cause: &(dyn std::error::Error + 'static)) -> Option<FaultKind> {
    if let Some(e) = cause.downcast_ref::<reqwest::Error>() {
        if e.is_timeout() {
            return Some(FaultKind::Timeout);
        }
        // reqwest also tags a body stream cut short as a decode error; only a
        // failed JSON conversion counts as deserialization.
        if e.is_decode() {
            return Some(if has_json_source(e) { FaultKind::Deserialization } else { FaultKind::Io });
        }
        if e.is_connect() || e.is_request() || e.is_body() {
            return Some(FaultKind::Io);
        }
        return None;
    }

    if let Some(e) = cause.downcast_ref::<io::Error>() {
        return Some(match e.kind() {
            io::ErrorKind::TimedOut => FaultKind::Timeout,
            _ => FaultKind::Io,
        });
    }

    if cause.is::<tokio::time::error::Elapsed>() {
        return Some(FaultKind::Timeout);
    }

    if let Some(e) = cause.downcast_ref::<serde_json::Error>() {
        return Some(match e.classify() {
            serde_json::error::Category::Io => FaultKind::Io,
            _ => FaultKind::Deserialization,
        });
    }

    None
}

fn has_json_source(err: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if cause.is::<serde_json::Error>() {
            return true;
        }
        source = cause.source();
    }
    false
}
