//! Canned response bodies captured from a running scheduler and package registry.

use anyhow::{Context, Result};
use serde_json::Value;

/// Plan with a single serial phase, one step complete.
pub const PLAN_SINGLE_PHASE: &str = include_str!("../fixtures/plan-single-phase.json");
/// Plan with a serial phase followed by a parallel phase.
pub const PLAN_MULTI_PHASE: &str = include_str!("../fixtures/plan-multi-phase.json");
/// Plan carrying a non-empty `errors` list.
pub const PLAN_WITH_ERRORS: &str = include_str!("../fixtures/plan-with-errors.json");
/// Pod status for two pods with two instances each.
pub const POD_STATUS: &str = include_str!("../fixtures/pod-status.json");
/// Registry describe response with resolved options and version lists.
pub const COSMOS_DESCRIBE: &str = include_str!("../fixtures/cosmos-describe.json");
/// Registry describe response without options and with empty version lists.
pub const COSMOS_DESCRIBE_NO_VERSIONS: &str =
    include_str!("../fixtures/cosmos-describe-no-versions.json");
/// `BadVersionUpdate` error listing valid versions.
pub const COSMOS_BAD_VERSION: &str = include_str!("../fixtures/cosmos-bad-version.json");
/// `BadVersionUpdate` error with no valid versions.
pub const COSMOS_BAD_VERSION_NO_VERSIONS: &str =
    include_str!("../fixtures/cosmos-bad-version-no-versions.json");
/// `JsonSchemaMismatch` error with two failures.
pub const COSMOS_SCHEMA_MISMATCH: &str = include_str!("../fixtures/cosmos-schema-mismatch.json");
/// `MarathonAppNotFound` error.
pub const COSMOS_APP_NOT_FOUND: &str = include_str!("../fixtures/cosmos-app-not-found.json");
/// `AppIdChanged` error raised when an update renames the service.
pub const COSMOS_APP_ID_CHANGED: &str = include_str!("../fixtures/cosmos-app-id-changed.json");
/// Error of a type the client does not special-case.
pub const COSMOS_GENERIC_ERROR: &str = include_str!("../fixtures/cosmos-generic-error.json");
/// Self-signed P-256 CA certificate in PEM form.
pub const TEST_CA_PEM: &str = include_str!("../fixtures/test-ca.pem");

/// Parse a fixture into a JSON value.
///
/// # Errors
///
/// Returns an error when the fixture is not valid JSON.
pub fn json(fixture: &str) -> Result<Value> {
    serde_json::from_str(fixture).context("fixture is not valid JSON")
}
