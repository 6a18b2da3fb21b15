use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::{transport::HttpResponse, ClientError, ErrorResponse, Result};

/// Pass 2xx bodies through untouched; everything else becomes
/// `UnexpectedStatus`. The rejected body is logged, never returned.
pub fn classify(response: HttpResponse) -> Result<Vec<u8>> {
    let HttpResponse { status, body } = response;
    if (200..300).contains(&status) {
        return Ok(body);
    }

    match serde_json::from_slice::<ErrorResponse>(&body) {
        Ok(error) => tracing::warn!(
            status,
            code = error.code,
            error_message = %error.message,
            body = %String::from_utf8_lossy(&body),
            "request rejected by the API"
        ),
        Err(_) => tracing::warn!(
            status,
            body = %String::from_utf8_lossy(&body),
            "request failed with unexpected status"
        ),
    }
    Err(ClientError::UnexpectedStatus(status))
}

/// Decode a success body into `T`, keeping serde's error details when the
/// payload does not match the expected shape.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|err| match err.classify() {
        Category::Syntax | Category::Data | Category::Eof => {
            tracing::debug!(error = %err, "response did not match the expected shape");
            ClientError::DecodingFailure(err)
        }
        Category::Io => ClientError::GenericFailure(err.to_string()),
    })
}
