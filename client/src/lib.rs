pub use crate::responses::*;

pub mod body;
pub mod config;
pub mod http;
pub mod request;
pub mod response;
pub mod responses;
pub mod transport;

mod api;

pub use crate::body::Attachment;
pub use crate::config::{ClientConfig, ClientProperties, Credential};
pub use crate::http::Client;
pub use crate::request::{HttpMethod, RequestSpec};
pub use crate::transport::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};

/// Every failure the request engine can report. Nothing else leaves the crate.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),
    #[error("invalid or unreachable response")]
    InvalidResponse,
    #[error("failed to encode request headers: {0}")]
    HeaderEncodingFailure(String),
    #[error("failed to encode request body: {0}")]
    BodyEncodingFailure(String),
    #[error("failed to decode response: {0}")]
    DecodingFailure(serde_json::Error),
    #[error("request failed: {0}")]
    GenericFailure(String),
}

impl ClientError {
    /// The HTTP status carried by an `UnexpectedStatus` failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::UnexpectedStatus(code) => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
