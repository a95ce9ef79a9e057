//! Error taxonomy for cluster queries.

use std::io;
use std::path::PathBuf;

use reqwest::{Method, StatusCode};
use sdkctl_config::ConfigError;
use thiserror::Error;
use url::Url;

use crate::client::classify::{Classification, StructuredError};
use crate::client::executor::QueryResponse;

/// Terminal failures of a cluster query, each carrying its remediation text.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The cluster rejected the token.
    #[error("Got 401 Unauthorized response from {url}\n- Bad auth token? Run 'dcos auth login' to log in.")]
    Unauthorized {
        /// Request URL.
        url: Url,
    },
    /// The service is unknown or still starting.
    #[error(
        "HTTP {method} Query for {url} failed: {status}\n\
         - Did you provide the correct service name? Currently using '{service}', \
         specify a different name with '--name=<name>'.\n\
         - Was the service recently installed or updated? It may still be initializing, \
         wait a bit and try again."
    )]
    ServiceUnavailable {
        /// Request method.
        method: Method,
        /// Request URL.
        url: Url,
        /// Response status.
        status: StatusCode,
        /// Service name in use.
        service: String,
    },
    /// Any other unsuccessful status.
    #[error("HTTP {method} Query for {url} failed: {status}{}", response_suffix(body))]
    Http {
        /// Request method.
        method: Method,
        /// Request URL.
        url: Url,
        /// Response status.
        status: StatusCode,
        /// Response body as text.
        body: String,
    },
    /// The TLS handshake rejected a certificate from an unknown authority.
    #[error(
        "HTTP {method} Query for {url} failed: {detail}\n\
         - Is someone intercepting the connection to steal your credentials?\n\
         - Is the cluster CA certificate configured correctly? Check 'dcos config show core.ssl_verify'.\n\
         - To ignore the unvalidated certificate and force your command (INSECURE), use --force-insecure"
    )]
    CertificateUntrusted {
        /// Request method.
        method: Method,
        /// Request URL.
        url: Url,
        /// Transport error text.
        detail: String,
    },
    /// DNS, connection, or other transport failure.
    #[error(
        "HTTP {method} Query for {url} failed: {detail}\n\
         - Is 'core.dcos_url' set correctly? Check 'dcos config show core.dcos_url'.\n\
         - Is 'core.dcos_acs_token' set correctly? Run 'dcos auth login' to log in."
    )]
    Transport {
        /// Request method.
        method: Method,
        /// Request URL.
        url: Url,
        /// Transport error text.
        detail: String,
    },
    /// The configured CA bundle could not be loaded.
    #[error("Unable to read from CA certificate file {}: {cause}", path.display())]
    CertificateRead {
        /// Bundle path.
        path: PathBuf,
        /// Underlying I/O or parse failure.
        cause: io::Error,
    },
    /// A decoded package registry error.
    #[error("{}", error.describe(service, module))]
    Structured {
        /// Decoded error.
        error: StructuredError,
        /// Service name in use.
        service: String,
        /// Module name in use.
        module: String,
    },
    /// Failure described by a custom response check.
    #[error("{0}")]
    Rejected(String),
    /// Required host configuration is missing.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A configured URL does not parse.
    #[error("Unable to parse DC/OS Cluster URL '{input}': {cause}")]
    InvalidUrl {
        /// Raw configured value.
        input: String,
        /// Parser failure.
        cause: url::ParseError,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),
}

impl QueryError {
    /// Convert a non-success classification into an error for `response`.
    #[must_use]
    pub fn from_classification(
        classification: Classification,
        response: &QueryResponse,
        service: &str,
        module: &str,
    ) -> Self {
        match classification {
            Classification::Unauthorized => Self::Unauthorized {
                url: response.url.clone(),
            },
            Classification::ServiceUnavailable => Self::ServiceUnavailable {
                method: response.method.clone(),
                url: response.url.clone(),
                status: response.status,
                service: service.to_string(),
            },
            Classification::TlsUntrusted => Self::CertificateUntrusted {
                method: response.method.clone(),
                url: response.url.clone(),
                detail: response.status.to_string(),
            },
            Classification::Structured(error) => Self::Structured {
                error,
                service: service.to_string(),
                module: module.to_string(),
            },
            Classification::Rejected(message) => Self::Rejected(message),
            Classification::Success | Classification::GenericHttpError => Self::Http {
                method: response.method.clone(),
                url: response.url.clone(),
                status: response.status,
                body: response.text().trim_end().to_string(),
            },
        }
    }

    /// Whether the failure stems from operator input rather than the cluster.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        match self {
            Self::Structured { error, .. } => error.is_validation(),
            _ => false,
        }
    }
}

fn response_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!("\nResponse: {body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: StatusCode, body: &str) -> QueryResponse {
        QueryResponse {
            status,
            body: body.as_bytes().to_vec(),
            method: Method::POST,
            url: Url::parse("https://cluster.example/cosmos/service/describe")
                .expect("static URL parses"),
        }
    }

    #[test]
    fn generic_error_includes_body() {
        let body = r#"{"type":"unhandled_exception","message":"App is locked"}"#;
        let err = QueryError::from_classification(
            Classification::GenericHttpError,
            &response(StatusCode::INTERNAL_SERVER_ERROR, &format!("{body}\n")),
            "hello-world",
            "hello-world",
        );
        assert_eq!(
            err.to_string(),
            format!(
                "HTTP POST Query for https://cluster.example/cosmos/service/describe failed: \
                 500 Internal Server Error\nResponse: {body}"
            )
        );
    }

    #[test]
    fn generic_error_without_body_is_one_line() {
        let err = QueryError::from_classification(
            Classification::GenericHttpError,
            &response(StatusCode::SERVICE_UNAVAILABLE, ""),
            "svc",
            "svc",
        );
        assert!(!err.to_string().contains('\n'));
    }

    #[test]
    fn service_unavailable_names_service() {
        let err = QueryError::from_classification(
            Classification::ServiceUnavailable,
            &response(StatusCode::BAD_GATEWAY, ""),
            "kafka-dev",
            "kafka",
        );
        let message = err.to_string();
        assert!(message.contains("failed: 502 Bad Gateway\n"));
        assert!(message.contains("Currently using 'kafka-dev'"));
        assert!(!err.is_validation());
    }

    #[test]
    fn structured_validation_errors_are_flagged() {
        let err = QueryError::from_classification(
            Classification::Structured(StructuredError::BadVersionUpdate {
                requested: "v9".into(),
                valid: Vec::new(),
            }),
            &response(StatusCode::BAD_REQUEST, ""),
            "hello-world",
            "hello-world",
        );
        assert!(err.is_validation());
        assert!(err.to_string().contains("\"v9\""));
    }

    #[test]
    fn rejected_carries_message_verbatim() {
        let err = QueryError::from_classification(
            Classification::Rejected("Plan, phase, and/or step does not exist.".into()),
            &response(StatusCode::NOT_FOUND, "Element not found"),
            "svc",
            "svc",
        );
        assert_eq!(err.to_string(), "Plan, phase, and/or step does not exist.");
    }
}
