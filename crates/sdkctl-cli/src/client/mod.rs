//! Query engine shared by every command, plus the CLI-level error type.
//!
//! Layout: `trust.rs` (TLS policy), `credentials.rs` (auth token),
//! `endpoint.rs` (URL construction), `executor.rs` (session and HTTP calls),
//! `classify.rs` (response classification and registry error schemas),
//! `error.rs` (`QueryError`).

pub mod classify;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod executor;
pub mod trust;

use std::fmt::{self, Display, Formatter};

pub use classify::{
    Classification, ResponseCheck, SchemaFailure, StructuredError, classify, classify_transport,
    format_version_list,
};
pub use credentials::{CredentialResolver, Credentials};
pub use endpoint::{EndpointBuilder, Scope, cosmos_media_types, normalize_base, trim_dashboard_suffix};
pub use error::QueryError;
pub use executor::{QueryExecutor, QueryRequest, QueryResponse};
pub use trust::{TrustResolver, TrustState, apply_trust};

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<QueryError> for CliError {
    fn from(error: QueryError) -> Self {
        if error.is_validation() {
            Self::validation(error.to_string())
        } else {
            Self::failure(error)
        }
    }
}

/// Application context passed to command handlers.
#[derive(Debug)]
pub(crate) struct AppContext {
    pub(crate) executor: QueryExecutor,
}

impl AppContext {
    pub(crate) fn service_name(&self) -> &str {
        self.executor.service_name()
    }

    pub(crate) fn module_name(&self) -> &str {
        self.executor.module_name()
    }

    pub(crate) fn service_scope(&self) -> Scope {
        self.executor.service_scope()
    }
}
