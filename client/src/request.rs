use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, ORIGIN, USER_AGENT,
};
use serde::Serialize;
use url::Url;

use crate::{
    body::{encode_body, Attachment},
    config::{ClientConfig, Credential},
    transport::HttpRequest,
    ClientError, Result,
};

static HEADER_SEC_FETCH_MODE: &'static str = "sec-fetch-mode";
static HEADER_SEC_FETCH_SITE: &'static str = "sec-fetch-site";
static HEADER_SEC_FETCH_DEST: &'static str = "sec-fetch-dest";
static HEADER_LOCALE: &'static str = "x-discord-locale";
static HEADER_DEBUG_OPTIONS: &'static str = "x-debug-options";
static HEADER_SUPER_PROPERTIES: &'static str = "x-super-properties";
static HEADER_AUDIT_LOG_REASON: &'static str = "x-audit-log-reason";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    GET,
    POST,
    PATCH,
    DELETE,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::POST => reqwest::Method::POST,
            HttpMethod::PATCH => reqwest::Method::PATCH,
            HttpMethod::DELETE => reqwest::Method::DELETE,
        }
    }
}

/// Everything needed to issue one API call. Built once, consumed by
/// [`crate::Client::send`] or [`crate::Client::execute`].
#[derive(Debug, Clone)]
pub struct RequestSpec {
    method: HttpMethod,
    path: String,
    query: Vec<(String, String)>,
    attachments: Vec<Attachment>,
    body: Option<Vec<u8>>,
    audit_log_reason: Option<String>,
}

impl RequestSpec {
    pub fn new<S: Into<String>>(method: HttpMethod, path: S) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            attachments: Vec::new(),
            body: None,
            audit_log_reason: None,
        }
    }

    pub fn get<S: Into<String>>(path: S) -> Self {
        Self::new(HttpMethod::GET, path)
    }

    pub fn post<S: Into<String>>(path: S) -> Self {
        Self::new(HttpMethod::POST, path)
    }

    pub fn patch<S: Into<String>>(path: S) -> Self {
        Self::new(HttpMethod::PATCH, path)
    }

    pub fn delete<S: Into<String>>(path: S) -> Self {
        Self::new(HttpMethod::DELETE, path)
    }

    /// Append a query pair. Pairs are sent in insertion order.
    pub fn query<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn attachments<I: IntoIterator<Item = Attachment>>(mut self, attachments: I) -> Self {
        self.attachments.extend(attachments);
        self
    }

    /// Use already JSON-encoded bytes as the payload.
    pub fn body(mut self, bytes: Vec<u8>) -> Self {
        self.body = Some(bytes);
        self
    }

    /// JSON-encode `payload` now, so an unencodable payload fails before any
    /// network traffic.
    pub fn json<P: Serialize + ?Sized>(self, payload: &P) -> Result<Self> {
        let bytes = serde_json::to_vec(payload)
            .map_err(|err| ClientError::BodyEncodingFailure(err.to_string()))?;
        Ok(self.body(bytes))
    }

    pub fn audit_log_reason<S: Into<String>>(mut self, reason: S) -> Self {
        self.audit_log_reason = Some(reason.into());
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn attachment_list(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

/// `<rest_url>/<path>?<query>`, with query pairs in the order given.
pub fn build_url(rest_url: &str, path: &str, query: &[(String, String)]) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        rest_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let mut url = Url::parse(&joined)
        .map_err(|err| ClientError::GenericFailure(format!("invalid URL {}: {}", joined, err)))?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<()> {
    let value = HeaderValue::from_str(value).map_err(|err| {
        ClientError::HeaderEncodingFailure(format!("invalid value for {}: {}", name, err))
    })?;
    headers.insert(name, value);
    Ok(())
}

/// The fixed header set every request carries, content type excluded.
pub fn build_headers(config: &ClientConfig, credential: &Credential) -> Result<HeaderMap> {
    let super_properties = config
        .client_properties
        .to_json()
        .map_err(|err| ClientError::HeaderEncodingFailure(format!("super properties: {}", err)))?;

    let mut headers = HeaderMap::new();
    insert_header(&mut headers, AUTHORIZATION, &credential.authorization())?;
    insert_header(&mut headers, ORIGIN, &config.web_origin)?;
    insert_header(&mut headers, USER_AGENT, &config.user_agent)?;
    insert_header(&mut headers, HeaderName::from_static(HEADER_SEC_FETCH_MODE), "cors")?;
    insert_header(&mut headers, HeaderName::from_static(HEADER_SEC_FETCH_SITE), "same-origin")?;
    insert_header(&mut headers, HeaderName::from_static(HEADER_SEC_FETCH_DEST), "empty")?;
    insert_header(&mut headers, HeaderName::from_static(HEADER_LOCALE), &config.locale)?;
    insert_header(
        &mut headers,
        HeaderName::from_static(HEADER_DEBUG_OPTIONS),
        &config.debug_options,
    )?;
    insert_header(
        &mut headers,
        HeaderName::from_static(HEADER_SUPER_PROPERTIES),
        &STANDARD.encode(super_properties),
    )?;
    Ok(headers)
}

/// Assemble the request for `spec`.
///
/// # Panics
///
/// When no credential has been set. That is a setup bug in the caller, not a
/// runtime condition, so it is never reported as a `ClientError`.
pub async fn build_request(
    config: &ClientConfig,
    credential: Option<&Credential>,
    spec: &RequestSpec,
) -> Result<HttpRequest> {
    let credential = match credential {
        Some(credential) => credential,
        None => panic!(
            "no credential set before {} {}; call Client::with_credential first",
            spec.method, spec.path
        ),
    };

    let url = build_url(&config.rest_url, &spec.path, &spec.query)?;
    let mut headers = build_headers(config, credential)?;

    if let Some(reason) = &spec.audit_log_reason {
        insert_header(
            &mut headers,
            HeaderName::from_static(HEADER_AUDIT_LOG_REASON),
            &urlencoding::encode(reason),
        )?;
    }

    let body = encode_body(spec.body.as_deref(), &spec.attachments).await?;
    let body = match body {
        Some(encoded) => {
            insert_header(&mut headers, CONTENT_TYPE, &encoded.content_type)?;
            Some(encoded.bytes)
        }
        None => None,
    };

    Ok(HttpRequest {
        method: spec.method,
        url,
        headers,
        body,
    })
}
