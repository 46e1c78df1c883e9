use serde::Deserialize;
use thiserror::Error;

/// Domain error reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredError {
    pub message: Option<String>,
    pub code: Option<String>,
}

impl StructuredError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self { message: Some(message.into()), code: Some(code.into()) }
    }
}

/// Wire form of an error body.
///
/// Example JSON:
/// {"message": "No matching location found.", "error_code": "1006"}
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorResponse {
    pub message: Option<String>,
    #[serde(rename = "error_code")]
    pub code: Option<String>,
}

impl From<ErrorResponse> for StructuredError {
    fn from(value: ErrorResponse) -> Self {
        Self { message: value.message, code: value.code }
    }
}

#[derive(Debug, Error)]
#[error("failed to decode server error body: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Codec used to turn an error body into an [`ErrorResponse`].
pub trait ErrorCodec: Send + Sync + std::fmt::Debug {
    fn decode_error(&self, text: &str) -> Result<ErrorResponse, DecodeError>;
}

/// serde_json backed codec. Unknown keys are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl ErrorCodec for JsonCodec {
    fn decode_error(&self, text: &str) -> Result<ErrorResponse, DecodeError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ErrorBodyDecoder<C = JsonCodec> {
    codec: C,
}

impl<C: ErrorCodec> ErrorBodyDecoder<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    /// Decode a raw error body.
    ///
    /// A missing or blank body is not an error: it yields an empty
    /// [`StructuredError`].
    pub fn decode(&self, raw_body: Option<&str>) -> Result<StructuredError, DecodeError> {
        match raw_body {
            None => Ok(StructuredError::default()),
            Some(text) if text.trim().is_empty() => Ok(StructuredError::default()),
            Some(text) => self.codec.decode_error(text).map(StructuredError::from),
        }
    }
}
