use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::{
    body::Attachment,
    config::{ClientConfig, Credential},
    request::{build_request, RequestSpec},
    response::{classify, decode},
    transport::{HttpClient, ReqwestHttpClient},
    Result,
};

/// A session against the REST API: configuration, credential and transport,
/// all read-only once requests start. Clones share the transport.
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    credential: Option<Credential>,
    transport: Arc<dyn HttpClient>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            credential: None,
            transport: Arc::new(ReqwestHttpClient::new()),
        }
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn with_transport<H: HttpClient + 'static>(mut self, transport: H) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Build, send and classify. Returns the raw success body.
    ///
    /// # Panics
    ///
    /// If no credential was set; see [`build_request`].
    pub async fn request_raw(&self, spec: &RequestSpec) -> Result<Vec<u8>> {
        let request = build_request(&self.config, self.credential.as_ref(), spec).await?;
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            attachments = spec.attachment_list().len(),
            "dispatching request"
        );
        let response = self.transport.request(request).await?;
        classify(response)
    }

    /// Run `spec` and decode the success body as `T`.
    pub async fn send<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T> {
        let bytes = self.request_raw(&spec).await?;
        decode(&bytes)
    }

    /// Run `spec` for its side effect. The success body is discarded, failures
    /// are returned like any other call.
    pub async fn execute(&self, spec: RequestSpec) -> Result<()> {
        self.request_raw(&spec).await.map(|_| ())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let spec = query
            .iter()
            .fold(RequestSpec::get(path), |spec, (key, value)| spec.query(*key, value));
        self.send(spec).await
    }

    pub async fn post<P, T>(
        &self,
        path: &str,
        payload: &P,
        attachments: Vec<Attachment>,
    ) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let spec = RequestSpec::post(path).json(payload)?.attachments(attachments);
        self.send(spec).await
    }

    pub async fn patch<P, T>(&self, path: &str, payload: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(RequestSpec::patch(path).json(payload)?).await
    }

    pub async fn post_empty<P: Serialize + ?Sized>(&self, path: &str, payload: &P) -> Result<()> {
        self.execute(RequestSpec::post(path).json(payload)?).await
    }

    pub async fn patch_empty<P: Serialize + ?Sized>(&self, path: &str, payload: &P) -> Result<()> {
        self.execute(RequestSpec::patch(path).json(payload)?).await
    }

    pub async fn delete_empty(&self, path: &str) -> Result<()> {
        self.execute(RequestSpec::delete(path)).await
    }
}
