//! Target URL construction for service and package registry requests.
//!
//! # Design
//! - The cluster base is resolved once, normalized to a fixed point, and reused.
//! - The logical path replaces whatever path the base URL carried.

use once_cell::sync::OnceCell;
use sdkctl_config::{
    HostConfig,
    keys::{COSMOS_URL, DCOS_URL, DCOS_URL_HINT},
    optional_value, required_value,
};
use url::Url;

use crate::client::error::QueryError;

/// How a logical path is scoped on the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Scheduler API of the named service.
    Service(String),
    /// Package registry ("Cosmos") service API.
    Package,
}

impl Scope {
    /// Whether requests in this scope speak the package registry protocol.
    #[must_use]
    pub const fn is_package(&self) -> bool {
        matches!(self, Self::Package)
    }
}

/// Composes absolute URLs from a scope and a logical path.
#[derive(Debug, Default)]
pub struct EndpointBuilder {
    url_override: Option<String>,
    cosmos_override: Option<String>,
    base: OnceCell<Url>,
    cosmos_base: OnceCell<Option<Url>>,
}

impl EndpointBuilder {
    /// Builder with optional cluster and registry URL overrides.
    #[must_use]
    pub fn new(url_override: Option<String>, cosmos_override: Option<String>) -> Self {
        let non_blank = |value: String| (!value.trim().is_empty()).then(|| value.trim().to_string());
        Self {
            url_override: url_override.and_then(non_blank),
            cosmos_override: cosmos_override.and_then(non_blank),
            base: OnceCell::new(),
            cosmos_base: OnceCell::new(),
        }
    }

    /// Build the absolute URL for `path` in `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Config`] when no cluster URL is configured and
    /// [`QueryError::InvalidUrl`] when a configured URL does not parse.
    pub fn build(
        &self,
        host: &dyn HostConfig,
        scope: &Scope,
        path: &str,
        query: Option<&str>,
    ) -> Result<Url, QueryError> {
        let (mut url, joined) = match scope {
            Scope::Service(name) => (
                self.cluster_base(host)?.clone(),
                join_path(&["service", name, path]),
            ),
            Scope::Package => match self.cosmos_base(host)? {
                Some(base) => (base.clone(), join_path(&["service", path])),
                None => (
                    self.cluster_base(host)?.clone(),
                    join_path(&["cosmos", "service", path]),
                ),
            },
        };
        url.set_path(&joined);
        url.set_query(query.filter(|query| !query.is_empty()));
        url.set_fragment(None);
        Ok(url)
    }

    /// The normalized cluster base URL.
    ///
    /// # Errors
    ///
    /// See [`EndpointBuilder::build`].
    pub fn cluster_base(&self, host: &dyn HostConfig) -> Result<&Url, QueryError> {
        self.base.get_or_try_init(|| {
            let raw = match &self.url_override {
                Some(value) => value.clone(),
                None => required_value(host, DCOS_URL, "DC/OS Cluster URL", DCOS_URL_HINT)?,
            };
            let normalized = normalize_base(&raw);
            tracing::debug!(url = normalized, "resolved cluster URL");
            parse_url(normalized)
        })
    }

    fn cosmos_base(&self, host: &dyn HostConfig) -> Result<Option<&Url>, QueryError> {
        self.cosmos_base
            .get_or_try_init(|| {
                self.cosmos_override
                    .clone()
                    .or_else(|| optional_value(host, COSMOS_URL))
                    .map(|raw| parse_url(normalize_base(&raw)))
                    .transpose()
            })
            .map(Option::as_ref)
    }
}

/// Strip one trailing `#/` left over from a copy-pasted dashboard URL.
#[must_use]
pub fn trim_dashboard_suffix(url: &str) -> &str {
    url.strip_suffix("#/").unwrap_or(url)
}

/// Apply [`trim_dashboard_suffix`] until nothing changes.
#[must_use]
pub fn normalize_base(url: &str) -> &str {
    let mut current = url;
    loop {
        let next = trim_dashboard_suffix(current);
        if next.len() == current.len() {
            return current;
        }
        current = next;
    }
}

/// `Accept` and `Content-Type` values for a package registry call on `path`.
#[must_use]
pub fn cosmos_media_types(path: &str) -> (String, String) {
    let name = path.trim_matches('/').replace('/', ".");
    (
        format!("application/vnd.dcos.service.{name}-response+json;charset=utf-8;version=v1"),
        format!("application/vnd.dcos.service.{name}-request+json;charset=utf-8;version=v1"),
    )
}

fn join_path(segments: &[&str]) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in segments.iter().flat_map(|segment| segment.split('/')) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

fn parse_url(input: &str) -> Result<Url, QueryError> {
    Url::parse(input).map_err(|cause| QueryError::InvalidUrl {
        input: input.to_string(),
        cause,
    })
}
