//! Response classification and package registry error schemas.
//!
//! # Design
//! - `classify` returns a closed `Classification`; a caller-supplied
//!   `ResponseCheck` runs first and may short-circuit the default table.
//! - Registry 400 bodies are decoded with one schema per known `type` and fall
//!   back to `Unrecognized` for anything else.

use std::error::Error as StdError;
use std::io;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::client::endpoint::Scope;
use crate::client::executor::QueryResponse;

/// Message for registry endpoints missing on older clusters.
pub const ENTERPRISE_REQUIRED: &str = "This command requires Enterprise DC/OS 1.10 or newer.";

/// Outcome of inspecting a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// 2xx, or accepted by a custom check.
    Success,
    /// 401 from the cluster.
    Unauthorized,
    /// Wrong service name or scheduler still starting.
    ServiceUnavailable,
    /// Any other failure status.
    GenericHttpError,
    /// The cluster certificate was issued by an unknown authority.
    TlsUntrusted,
    /// Decoded package registry error.
    Structured(StructuredError),
    /// Failure described by a custom check.
    Rejected(String),
}

/// Per-call hook evaluated before the default classification table.
pub trait ResponseCheck: Send + Sync {
    /// Return `Some` to decide the outcome, `None` to defer to the default table.
    fn check(&self, response: &QueryResponse) -> Option<Classification>;
}

impl<F> ResponseCheck for F
where
    F: Fn(&QueryResponse) -> Option<Classification> + Send + Sync,
{
    fn check(&self, response: &QueryResponse) -> Option<Classification> {
        self(response)
    }
}

/// Classify `response` for a request made in `scope`.
#[must_use]
pub fn classify(
    response: &QueryResponse,
    scope: &Scope,
    custom: Option<&dyn ResponseCheck>,
) -> Classification {
    if let Some(decision) = custom.and_then(|check| check.check(response)) {
        return decision;
    }

    let status = response.status;
    if status == StatusCode::UNAUTHORIZED {
        return Classification::Unauthorized;
    }
    if scope.is_package() {
        if status == StatusCode::BAD_REQUEST {
            return parse_registry_error(&response.body)
                .map_or(Classification::GenericHttpError, Classification::Structured);
        }
        if status == StatusCode::NOT_FOUND {
            return Classification::Rejected(ENTERPRISE_REQUIRED.to_string());
        }
        if !status.is_success() {
            return Classification::GenericHttpError;
        }
    }
    if matches!(
        status,
        StatusCode::NOT_FOUND | StatusCode::INTERNAL_SERVER_ERROR | StatusCode::BAD_GATEWAY
    ) {
        return Classification::ServiceUnavailable;
    }
    if status.is_success() {
        Classification::Success
    } else {
        Classification::GenericHttpError
    }
}

/// Classify a failed exchange that never produced a response.
///
/// Returns `Some(TlsUntrusted)` when the handshake rejected the server
/// certificate because its issuer is unknown.
#[must_use]
pub fn classify_transport(error: &(dyn StdError + 'static)) -> Option<Classification> {
    is_unknown_issuer(error).then_some(Classification::TlsUntrusted)
}

fn is_unknown_issuer(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(err) = current {
        if rustls_unknown_issuer(err) {
            return true;
        }
        // io::Error::source skips the wrapped error itself.
        if let Some(inner) = err.downcast_ref::<io::Error>().and_then(io::Error::get_ref) {
            if rustls_unknown_issuer(inner) {
                return true;
            }
        }
        current = err.source();
    }
    format!("{error:?}").contains("UnknownIssuer")
}

fn rustls_unknown_issuer(error: &(dyn StdError + 'static)) -> bool {
    matches!(
        error.downcast_ref::<rustls::Error>(),
        Some(rustls::Error::InvalidCertificate(
            rustls::CertificateError::UnknownIssuer
        ))
    )
}

/// A package registry error decoded from a 400 body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuredError {
    /// `MarathonAppNotFound`.
    AppNotFound,
    /// `BadVersionUpdate`.
    BadVersionUpdate {
        /// Version the operator asked for.
        requested: String,
        /// Versions the registry would accept.
        valid: Vec<String>,
    },
    /// `JsonSchemaMismatch`.
    SchemaMismatch {
        /// One entry per failed validation.
        failures: Vec<SchemaFailure>,
    },
    /// `AppIdChanged`.
    AppIdChanged {
        /// Installed app id.
        old: String,
        /// App id the new options would produce.
        new: String,
    },
    /// Any other registry error type.
    Unrecognized {
        /// Value of the `type` field.
        kind: String,
        /// Value of the `message` field.
        message: String,
    },
}

/// A single options validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFailure {
    /// JSON pointer into the submitted options.
    pub pointer: String,
    /// Validator message.
    pub message: String,
}

impl StructuredError {
    /// Render the operator-facing message.
    #[must_use]
    pub fn describe(&self, service: &str, module: &str) -> String {
        match self {
            Self::AppNotFound => format!(
                "Unable to find the service named '{service}'.\n\
                 Possible causes:\n\
                 - Did you provide the correct service name? Specify a service name with \
                 '--name=<name>', or with 'dcos config set {module}.service_name <name>'.\n\
                 - Was the service recently installed or updated? It may still be initializing, \
                 wait a bit and try again."
            ),
            Self::BadVersionUpdate { requested, valid } => {
                let header =
                    format!("Unable to update {service} to requested version: \"{requested}\"");
                if valid.is_empty() {
                    format!("{header}\nNo valid package versions to update to.")
                } else {
                    format!(
                        "{header}\nValid package versions are: {}",
                        format_version_list(valid)
                    )
                }
            }
            Self::SchemaMismatch { failures } => format!(
                "Unable to update {service} to requested configuration: \
                 options JSON failed validation.\n\n{}",
                render_failure_table(failures)
            ),
            Self::AppIdChanged { old, new } => format!(
                "Could not update service name from \"{old}\" to \"{new}\".\n\
                 The service name cannot be changed once installed. \
                 Ensure service.name is set to \"{old}\" in options JSON."
            ),
            Self::Unrecognized { kind, message } => {
                format!("Could not execute command: {message} ({kind})")
            }
        }
    }

    /// Whether the operator's input, rather than the cluster, is at fault.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::BadVersionUpdate { .. } | Self::SchemaMismatch { .. } | Self::AppIdChanged { .. }
        )
    }
}

/// Render versions as `["a", "b"]`.
#[must_use]
pub fn format_version_list(versions: &[String]) -> String {
    let quoted: Vec<String> = versions.iter().map(|version| format!("\"{version}\"")).collect();
    format!("[{}]", quoted.join(", "))
}

fn render_failure_table(failures: &[SchemaFailure]) -> String {
    const FIELD: &str = "Field";
    const ERROR: &str = "Error";
    let width = failures
        .iter()
        .map(|failure| failure.pointer.chars().count())
        .chain(std::iter::once(FIELD.len()))
        .max()
        .unwrap_or(FIELD.len());

    let row = |field: &str, error: &str| format!("{field:<width$} {error}").trim_end().to_string();
    let mut lines = vec![row(FIELD, ERROR), row("-----", "-----")];
    lines.extend(
        failures
            .iter()
            .map(|failure| row(&failure.pointer, &failure.message)),
    );
    lines.join("\n")
}

#[derive(Deserialize)]
struct RegistryErrorBody {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BadVersionData {
    #[serde(default)]
    update_version: String,
    #[serde(default)]
    valid_versions: Vec<String>,
}

#[derive(Deserialize)]
struct SchemaMismatchData {
    #[serde(default)]
    errors: Vec<SchemaErrorBody>,
}

#[derive(Deserialize)]
struct SchemaErrorBody {
    #[serde(default)]
    instance: InstanceBody,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize, Default)]
struct InstanceBody {
    #[serde(default)]
    pointer: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppIdChangedData {
    old_app_id: String,
    new_app_id: String,
}

fn parse_registry_error(body: &[u8]) -> Option<StructuredError> {
    let parsed: RegistryErrorBody = serde_json::from_slice(body).ok()?;
    let unrecognized = || StructuredError::Unrecognized {
        kind: parsed.kind.clone(),
        message: parsed.message.clone(),
    };
    let decoded = match parsed.kind.as_str() {
        "MarathonAppNotFound" => Some(StructuredError::AppNotFound),
        "BadVersionUpdate" => serde_json::from_value::<BadVersionData>(parsed.data.clone())
            .ok()
            .map(|data| StructuredError::BadVersionUpdate {
                requested: data.update_version,
                valid: data.valid_versions,
            }),
        "JsonSchemaMismatch" => serde_json::from_value::<SchemaMismatchData>(parsed.data.clone())
            .ok()
            .map(|data| StructuredError::SchemaMismatch {
                failures: data
                    .errors
                    .into_iter()
                    .map(|error| SchemaFailure {
                        pointer: error.instance.pointer,
                        message: error.message,
                    })
                    .collect(),
            }),
        "AppIdChanged" => serde_json::from_value::<AppIdChangedData>(parsed.data.clone())
            .ok()
            .map(|data| StructuredError::AppIdChanged {
                old: data.old_app_id,
                new: data.new_app_id,
            }),
        _ => None,
    };
    Some(decoded.unwrap_or_else(unrecognized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use sdkctl_test_support::fixtures;

    fn response(status: u16, body: &str) -> QueryResponse {
        QueryResponse {
            status: StatusCode::from_u16(status).expect("valid status code"),
            body: body.as_bytes().to_vec(),
            method: Method::POST,
            url: url::Url::parse("https://cluster.example/cosmos/service/update")
                .expect("static URL parses"),
        }
    }

    fn service() -> Scope {
        Scope::Service("hello-world".into())
    }

    #[test]
    fn default_table_for_service_scope() {
        let cases = [
            (200, Classification::Success),
            (204, Classification::Success),
            (401, Classification::Unauthorized),
            (404, Classification::ServiceUnavailable),
            (500, Classification::ServiceUnavailable),
            (502, Classification::ServiceUnavailable),
            (400, Classification::GenericHttpError),
            (503, Classification::GenericHttpError),
            (302, Classification::GenericHttpError),
        ];
        for (status, expected) in cases {
            assert_eq!(
                classify(&response(status, ""), &service(), None),
                expected,
                "status {status}"
            );
        }
    }

    #[test]
    fn package_scope_special_cases() {
        assert_eq!(
            classify(&response(404, ""), &Scope::Package, None),
            Classification::Rejected(ENTERPRISE_REQUIRED.to_string())
        );
        assert_eq!(
            classify(&response(500, "{}"), &Scope::Package, None),
            Classification::GenericHttpError
        );
        assert_eq!(
            classify(&response(401, ""), &Scope::Package, None),
            Classification::Unauthorized
        );
        assert_eq!(
            classify(&response(400, "not json"), &Scope::Package, None),
            Classification::GenericHttpError
        );
    }

    #[test]
    fn custom_check_short_circuits() {
        let check = |response: &QueryResponse| {
            (response.status == StatusCode::ALREADY_REPORTED)
                .then(|| Classification::Rejected("already done".into()))
        };
        assert_eq!(
            classify(&response(208, ""), &service(), Some(&check)),
            Classification::Rejected("already done".into())
        );
        assert_eq!(
            classify(&response(200, ""), &service(), Some(&check)),
            Classification::Success
        );
    }

    #[test]
    fn bad_version_lists_valid_versions() {
        let Classification::Structured(error) = classify(
            &response(400, fixtures::COSMOS_BAD_VERSION),
            &Scope::Package,
            None,
        ) else {
            panic!("expected a structured error");
        };
        assert!(error.is_validation());
        assert_eq!(
            error.describe("hello-world", "hello-world"),
            "Unable to update hello-world to requested version: \"not-a-valid\"\n\
             Valid package versions are: [\"v0.8\", \"v0.9\", \"v1.1\", \"v2.0\"]"
        );
    }

    #[test]
    fn bad_version_without_candidates() {
        let Classification::Structured(error) = classify(
            &response(400, fixtures::COSMOS_BAD_VERSION_NO_VERSIONS),
            &Scope::Package,
            None,
        ) else {
            panic!("expected a structured error");
        };
        assert!(
            error
                .describe("hello-world", "hello-world")
                .ends_with("\nNo valid package versions to update to.")
        );
    }

    #[test]
    fn schema_mismatch_renders_table() {
        let Classification::Structured(error) = classify(
            &response(400, fixtures::COSMOS_SCHEMA_MISMATCH),
            &Scope::Package,
            None,
        ) else {
            panic!("expected a structured error");
        };
        let expected = "Unable to update hello-world to requested configuration: \
                        options JSON failed validation.\n\
                        \n\
                        Field        Error\n\
                        -----        -----\n\
                        /nodes/count numeric instance is lower than the required minimum \
                        (minimum: 3, found: 2)\n\
                        /nodes/cpus  instance type (string) does not match any allowed \
                        primitive type";
        assert_eq!(error.describe("hello-world", "hello-world"), expected);
    }

    #[test]
    fn short_pointers_keep_header_width() {
        let table = render_failure_table(&[SchemaFailure {
            pointer: "/a".into(),
            message: "bad".into(),
        }]);
        assert_eq!(table, "Field Error\n----- -----\n/a    bad");
    }

    #[test]
    fn app_not_found_and_renamed_messages() {
        let Classification::Structured(not_found) = classify(
            &response(400, fixtures::COSMOS_APP_NOT_FOUND),
            &Scope::Package,
            None,
        ) else {
            panic!("expected a structured error");
        };
        assert!(!not_found.is_validation());
        let message = not_found.describe("hello-world-1", "hello-world");
        assert!(message.starts_with("Unable to find the service named 'hello-world-1'.\n"));
        assert!(message.contains("'dcos config set hello-world.service_name <name>'"));

        let Classification::Structured(renamed) = classify(
            &response(400, fixtures::COSMOS_APP_ID_CHANGED),
            &Scope::Package,
            None,
        ) else {
            panic!("expected a structured error");
        };
        assert_eq!(
            renamed.describe("hello-world", "hello-world"),
            "Could not update service name from \"/hello-world2\" to \"/hello-world\".\n\
             The service name cannot be changed once installed. \
             Ensure service.name is set to \"/hello-world2\" in options JSON."
        );
    }

    #[test]
    fn unknown_types_are_unrecognized() {
        let Classification::Structured(error) = classify(
            &response(400, fixtures::COSMOS_GENERIC_ERROR),
            &Scope::Package,
            None,
        ) else {
            panic!("expected a structured error");
        };
        assert_eq!(
            error.describe("hello-world", "hello-world"),
            "Could not execute command: This an example of a generic Cosmos error response. \
             (GenericErrorType)"
        );
    }

    #[test]
    fn malformed_known_type_falls_back_to_unrecognized() {
        let body = r#"{"type":"AppIdChanged","message":"renamed","data":null}"#;
        assert_eq!(
            classify(&response(400, body), &Scope::Package, None),
            Classification::Structured(StructuredError::Unrecognized {
                kind: "AppIdChanged".into(),
                message: "renamed".into(),
            })
        );
    }

    #[test]
    fn unknown_issuer_is_found_inside_io_errors() {
        let tls = rustls::Error::InvalidCertificate(rustls::CertificateError::UnknownIssuer);
        let wrapped = io::Error::new(io::ErrorKind::InvalidData, tls);
        assert_eq!(
            classify_transport(&wrapped),
            Some(Classification::TlsUntrusted)
        );

        let other = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        assert_eq!(classify_transport(&other), None);
    }

    #[test]
    fn version_list_formatting() {
        assert_eq!(format_version_list(&[]), "[]");
        assert_eq!(
            format_version_list(&["v0.8".into(), "v0.9".into()]),
            "[\"v0.8\", \"v0.9\"]"
        );
    }
}
