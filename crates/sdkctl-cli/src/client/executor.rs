//! Request execution against the cluster.
//!
//! # Design
//! - `QueryExecutor` is the per-invocation session: it owns the trust,
//!   credential, and endpoint caches and the lazily built HTTP client.
//! - `execute` never classifies; `query` runs classification exactly once.

use std::borrow::Cow;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use sdkctl_config::HostConfig;
use url::Url;

use crate::client::classify::{Classification, ResponseCheck, classify, classify_transport};
use crate::client::credentials::CredentialResolver;
use crate::client::endpoint::{EndpointBuilder, Scope, cosmos_media_types};
use crate::client::error::QueryError;
use crate::client::trust::{TrustResolver, apply_trust};

const JSON_CONTENT_TYPE: &str = "application/json";

/// A logical request, independent of the cluster it will be sent to.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    method: Method,
    scope: Scope,
    path: String,
    query: Option<String>,
    body: Option<Vec<u8>>,
    accept: Option<String>,
    content_type: Option<String>,
}

impl QueryRequest {
    /// Request with no body or query string.
    #[must_use]
    pub fn new(method: Method, scope: Scope, path: impl Into<String>) -> Self {
        Self {
            method,
            scope,
            path: path.into(),
            query: None,
            body: None,
            accept: None,
            content_type: None,
        }
    }

    /// `GET` request.
    #[must_use]
    pub fn get(scope: Scope, path: impl Into<String>) -> Self {
        Self::new(Method::GET, scope, path)
    }

    /// `POST` request.
    #[must_use]
    pub fn post(scope: Scope, path: impl Into<String>) -> Self {
        Self::new(Method::POST, scope, path)
    }

    /// Attach an already encoded query string. Empty strings are ignored.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = (!query.is_empty()).then_some(query);
        self
    }

    /// Attach a JSON payload.
    #[must_use]
    pub fn with_json(mut self, payload: Vec<u8>) -> Self {
        self.body = Some(payload);
        if self.content_type.is_none() && !self.scope.is_package() {
            self.content_type = Some(JSON_CONTENT_TYPE.to_string());
        }
        self
    }

    /// Override the `Accept` header.
    #[must_use]
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Override the `Content-Type` header.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Scope the path is resolved in.
    #[must_use]
    pub const fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Logical path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    fn media_types(&self) -> (Option<String>, Option<String>) {
        if self.scope.is_package() {
            let (accept, content_type) = cosmos_media_types(&self.path);
            (
                Some(self.accept.clone().unwrap_or(accept)),
                Some(self.content_type.clone().unwrap_or(content_type)),
            )
        } else {
            (self.accept.clone(), self.content_type.clone())
        }
    }
}

/// A completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct QueryResponse {
    /// Response status.
    pub status: StatusCode,
    /// Raw response body.
    pub body: Vec<u8>,
    /// Method of the originating request.
    pub method: Method,
    /// Absolute URL of the originating request.
    pub url: Url,
}

impl QueryResponse {
    /// Body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Per-invocation session that builds, sends, and classifies requests.
pub struct QueryExecutor {
    host: Arc<dyn HostConfig>,
    trust: TrustResolver,
    credentials: CredentialResolver,
    endpoints: EndpointBuilder,
    client: OnceCell<Client>,
    service_name: String,
    module_name: String,
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("QueryExecutor")
            .field("trust", &self.trust)
            .field("endpoints", &self.endpoints)
            .field("service_name", &self.service_name)
            .field("module_name", &self.module_name)
            .finish_non_exhaustive()
    }
}

impl QueryExecutor {
    /// Assemble a session from its resolvers.
    #[must_use]
    pub fn new(
        host: Arc<dyn HostConfig>,
        trust: TrustResolver,
        credentials: CredentialResolver,
        endpoints: EndpointBuilder,
    ) -> Self {
        Self {
            host,
            trust,
            credentials,
            endpoints,
            client: OnceCell::new(),
            service_name: String::new(),
            module_name: String::new(),
        }
    }

    /// Set the service and module names used in paths and hints.
    #[must_use]
    pub fn with_names(
        mut self,
        service_name: impl Into<String>,
        module_name: impl Into<String>,
    ) -> Self {
        self.service_name = service_name.into();
        self.module_name = module_name.into();
        self
    }

    /// Name of the service requests are scoped to.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Name of the package module, used in remediation hints.
    #[must_use]
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Scope for the configured service.
    #[must_use]
    pub fn service_scope(&self) -> Scope {
        Scope::Service(self.service_name.clone())
    }

    fn client(&self) -> Result<&Client, QueryError> {
        self.client.get_or_try_init(|| {
            let state = self.trust.resolve(self.host.as_ref());
            apply_trust(&state, Client::builder())?
                .build()
                .map_err(QueryError::ClientBuild)
        })
    }

    /// Send `request` and return the raw response without classifying it.
    ///
    /// # Errors
    ///
    /// Returns configuration, certificate, and transport failures.
    pub async fn execute(&self, request: &QueryRequest) -> Result<QueryResponse, QueryError> {
        let url = self.endpoints.build(
            self.host.as_ref(),
            &request.scope,
            &request.path,
            request.query.as_deref(),
        )?;
        let client = self.client()?;
        let credentials = self.credentials.resolve(self.host.as_ref());

        let mut builder = client.request(request.method.clone(), url.clone());
        if let Some(value) = credentials.header_value() {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (accept, content_type) = request.media_types();
        if let Some(accept) = accept {
            builder = builder.header(ACCEPT, accept);
        }
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        match &request.body {
            Some(body) if !body.is_empty() => {
                tracing::debug!(
                    method = %request.method,
                    %url,
                    bytes = body.len(),
                    payload = %String::from_utf8_lossy(body),
                    "HTTP query"
                );
                builder = builder.body(body.clone());
            }
            _ => tracing::debug!(method = %request.method, %url, "HTTP query"),
        }

        let response = builder
            .send()
            .await
            .map_err(|err| transport_error(&request.method, &url, &err))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| transport_error(&request.method, &url, &err))?
            .to_vec();
        tracing::debug!(%status, bytes = body.len(), "HTTP response");

        Ok(QueryResponse {
            status,
            body,
            method: request.method.clone(),
            url,
        })
    }

    /// Send `request`, classify the response, and return the body on success.
    ///
    /// # Errors
    ///
    /// Returns the failures of [`QueryExecutor::execute`] plus every
    /// non-success classification.
    pub async fn query(
        &self,
        request: &QueryRequest,
        check: Option<&dyn ResponseCheck>,
    ) -> Result<Vec<u8>, QueryError> {
        let response = self.execute(request).await?;
        match classify(&response, &request.scope, check) {
            Classification::Success => Ok(response.body),
            other => Err(QueryError::from_classification(
                other,
                &response,
                &self.service_name,
                &self.module_name,
            )),
        }
    }
}

fn transport_error(method: &Method, url: &Url, err: &reqwest::Error) -> QueryError {
    let detail = describe_chain(err);
    match classify_transport(err) {
        Some(Classification::TlsUntrusted) => QueryError::CertificateUntrusted {
            method: method.clone(),
            url: url.clone(),
            detail,
        },
        _ => QueryError::Transport {
            method: method.clone(),
            url: url.clone(),
            detail,
        },
    }
}

fn describe_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut detail = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        let text = source.to_string();
        if !detail.contains(&text) {
            detail.push_str(": ");
            detail.push_str(&text);
        }
        current = source.source();
    }
    detail
}
