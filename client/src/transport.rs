use futures::future::BoxFuture;
use reqwest::header::HeaderMap;
use url::Url;

use crate::{request::HttpMethod, ClientError, Result};

/// A fully built request, ready for the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Sends a request and hands back the raw status and body.
///
/// Implementations report every transport fault as
/// [`ClientError::InvalidResponse`] and never retry.
pub trait HttpClient: Send + Sync {
    fn request(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse>>;
}

/// Default transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    inner: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

impl HttpClient for ReqwestHttpClient {
    fn request(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse>> {
        Box::pin(async move {
            let HttpRequest {
                method,
                url,
                headers,
                body,
            } = request;

            let mut builder = self.inner.request(method.into(), url.clone()).headers(headers);
            if let Some(body) = body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|err| {
                tracing::error!(%method, %url, error = %err, "request could not be sent");
                ClientError::InvalidResponse
            })?;

            let status = response.status().as_u16();
            let body = response.bytes().await.map_err(|err| {
                tracing::error!(
                    %method,
                    %url,
                    status,
                    error = %err,
                    "response body could not be read"
                );
                ClientError::InvalidResponse
            })?;

            Ok(HttpResponse {
                status,
                body: body.to_vec(),
            })
        })
    }
}
