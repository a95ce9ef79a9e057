//! Package registry commands: describe and update.
//!
//! # Design
//! - Every call goes through [`Scope::Package`], so registry media types and
//!   structured error decoding apply.
//! - Option files are read and validated locally before any request is sent.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cli::{DEFAULT_PLAN, UpdateStartArgs, UpdateStatusArgs};
use crate::client::{AppContext, CliError, CliResult, QueryRequest, Scope, format_version_list};
use crate::commands::fetch;
use crate::commands::plan::plan_status_text;
use crate::output::{PlanTreeStyle, pretty_value};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DescribeRequest<'a> {
    app_id: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DescribeResponse {
    package: PackageDefinition,
    upgrades_to: Vec<String>,
    downgrades_to: Vec<String>,
    resolved_options: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PackageDefinition {
    version: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    app_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    package_version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<Value>,
    replace: bool,
}

pub(crate) async fn handle_describe(ctx: &AppContext) -> CliResult<()> {
    println!("{}", describe_text(ctx).await?);
    Ok(())
}

pub(crate) async fn handle_update_package_versions(ctx: &AppContext) -> CliResult<()> {
    println!("{}", package_versions_text(ctx).await?);
    Ok(())
}

pub(crate) async fn handle_update_start(ctx: &AppContext, args: UpdateStartArgs) -> CliResult<()> {
    let text = start_update(
        ctx,
        args.options.as_deref(),
        args.package_version.as_deref(),
        args.replace,
    )
    .await?;
    println!("{text}");
    Ok(())
}

pub(crate) async fn handle_update_status(
    ctx: &AppContext,
    args: UpdateStatusArgs,
) -> CliResult<()> {
    let text = plan_status_text(ctx, DEFAULT_PLAN, args.json, PlanTreeStyle::Compact).await?;
    println!("{text}");
    Ok(())
}

async fn describe(ctx: &AppContext) -> CliResult<DescribeResponse> {
    let payload = serde_json::to_vec(&DescribeRequest {
        app_id: ctx.service_name(),
    })
    .map_err(CliError::failure)?;
    let request = QueryRequest::post(Scope::Package, "describe").with_json(payload);
    let body = fetch(ctx, &request, None).await?;
    serde_json::from_slice(&body)
        .context("failed to parse describe response")
        .map_err(CliError::failure)
}

async fn describe_text(ctx: &AppContext) -> CliResult<String> {
    let described = describe(ctx).await?;
    match described.resolved_options {
        Some(options) if !options.is_null() => Ok(pretty_value(&options)),
        _ => Ok(format!(
            "Package configuration is not available for service {}.\n\
             This command is only available for packages installed with \
             Enterprise DC/OS 1.10 or newer.",
            ctx.service_name()
        )),
    }
}

async fn package_versions_text(ctx: &AppContext) -> CliResult<String> {
    let described = describe(ctx).await?;
    let current = described.package.version.unwrap_or_default();
    let downgrades = if described.downgrades_to.is_empty() {
        "No valid package downgrade versions.".to_string()
    } else {
        format!(
            "Package can be downgraded to: {}",
            format_version_list(&described.downgrades_to)
        )
    };
    let upgrades = if described.upgrades_to.is_empty() {
        "No valid package upgrade versions.".to_string()
    } else {
        format!(
            "Package can be upgraded to: {}",
            format_version_list(&described.upgrades_to)
        )
    };
    Ok(format!(
        "Current package version is: \"{current}\"\n{downgrades}\n{upgrades}"
    ))
}

async fn start_update(
    ctx: &AppContext,
    options_path: Option<&Path>,
    package_version: Option<&str>,
    replace: bool,
) -> CliResult<String> {
    let options = options_path.map(load_options).transpose()?;
    let payload = serde_json::to_vec(&UpdateRequest {
        app_id: ctx.service_name(),
        package_version: package_version.filter(|version| !version.is_empty()),
        options,
        replace,
    })
    .map_err(CliError::failure)?;

    tracing::info!(
        service = ctx.service_name(),
        package_version,
        replace,
        "starting service update"
    );
    let request = QueryRequest::post(Scope::Package, "update").with_json(payload);
    fetch(ctx, &request, None).await?;

    Ok(format!(
        "Update started. Please use `dcos {} --name={} update status` to view progress.",
        ctx.module_name(),
        ctx.service_name()
    ))
}

/// Read and parse an options file, reporting failures as operator errors.
fn load_options(path: &Path) -> CliResult<Value> {
    let content = fs::read(path).map_err(|err| {
        CliError::validation(format!(
            "Failed to load specified options file {}: {err}",
            path.display()
        ))
    })?;
    serde_json::from_slice(&content).map_err(|err| {
        CliError::validation(format!(
            "Failed to parse JSON in specified options file {}: {err}\nContent ({} bytes): {}",
            path.display(),
            content.len(),
            String::from_utf8_lossy(&content)
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{AUTH_HEADER, context_for, named_context_for};
    use anyhow::{Result, anyhow};
    use httpmock::prelude::*;
    use sdkctl_test_support::{files, fixtures};
    use serde_json::json;

    const DESCRIBE_ACCEPT: &str =
        "application/vnd.dcos.service.describe-response+json;charset=utf-8;version=v1";
    const UPDATE_CONTENT_TYPE: &str =
        "application/vnd.dcos.service.update-request+json;charset=utf-8;version=v1";

    fn cli_err(err: CliError) -> anyhow::Error {
        anyhow!(err.display_message())
    }

    #[tokio::test]
    async fn describe_prints_resolved_options() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/cosmos/service/describe")
                .header("authorization", AUTH_HEADER)
                .header("accept", DESCRIBE_ACCEPT)
                .json_body(json!({"appId": "hello-world"}));
            then.status(200).body(fixtures::COSMOS_DESCRIBE);
        });

        let ctx = context_for(&server);
        let text = describe_text(&ctx).await.map_err(cli_err)?;

        mock.assert();
        let expected = fixtures::json(fixtures::COSMOS_DESCRIBE)?
            .get("resolvedOptions")
            .cloned()
            .ok_or_else(|| anyhow!("fixture has resolvedOptions"))?;
        assert_eq!(serde_json::from_str::<Value>(&text)?, expected);
        assert!(text.starts_with("{\n  \"hello\": {\n    \"count\": 1,"));
        Ok(())
    }

    #[tokio::test]
    async fn describe_without_options_explains_why() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/cosmos/service/describe");
            then.status(200).body(fixtures::COSMOS_DESCRIBE_NO_VERSIONS);
        });

        let ctx = context_for(&server);
        let text = describe_text(&ctx).await.map_err(cli_err)?;

        assert_eq!(
            text,
            "Package configuration is not available for service hello-world.\n\
             This command is only available for packages installed with Enterprise DC/OS 1.10 or newer."
        );
        Ok(())
    }

    #[tokio::test]
    async fn package_versions_list_both_directions() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/cosmos/service/describe");
            then.status(200).body(fixtures::COSMOS_DESCRIBE);
        });

        let ctx = context_for(&server);
        let text = package_versions_text(&ctx).await.map_err(cli_err)?;

        assert_eq!(
            text,
            "Current package version is: \"v1.0\"\n\
             Package can be downgraded to: [\"v0.8\", \"v0.9\"]\n\
             Package can be upgraded to: [\"v1.1\", \"v2.0\"]"
        );
        Ok(())
    }

    #[tokio::test]
    async fn package_versions_without_candidates() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/cosmos/service/describe");
            then.status(200).body(fixtures::COSMOS_DESCRIBE_NO_VERSIONS);
        });

        let ctx = context_for(&server);
        let text = package_versions_text(&ctx).await.map_err(cli_err)?;

        assert_eq!(
            text,
            "Current package version is: \"v1.0\"\n\
             No valid package downgrade versions.\n\
             No valid package upgrade versions."
        );
        Ok(())
    }

    #[tokio::test]
    async fn update_sends_options_and_version() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/cosmos/service/update")
                .header("content-type", UPDATE_CONTENT_TYPE)
                .json_body(json!({
                    "appId": "hello-world",
                    "packageVersion": "stub-universe",
                    "options": {"service": {"name": "hello-world"}},
                    "replace": false
                }));
            then.status(200).json_body(json!({"marathonDeploymentId": "1234"}));
        });

        let options = files::temp_file_with(r#"{"service": {"name": "hello-world"}}"#)?;
        let ctx = context_for(&server);
        let text = start_update(&ctx, Some(options.path()), Some("stub-universe"), false)
            .await
            .map_err(cli_err)?;

        mock.assert();
        assert_eq!(
            text,
            "Update started. Please use `dcos hello-world --name=hello-world update status` to view progress."
        );
        Ok(())
    }

    #[tokio::test]
    async fn replace_only_update_omits_optional_fields() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/cosmos/service/update")
                .json_body(json!({"appId": "kafka-dev", "replace": true}));
            then.status(200).body("{}");
        });

        let ctx = named_context_for(&server, "kafka-dev", "kafka");
        let text = start_update(&ctx, None, None, true).await.map_err(cli_err)?;

        mock.assert();
        assert!(text.contains("`dcos kafka --name=kafka-dev update status`"));
        Ok(())
    }

    #[tokio::test]
    async fn bad_version_is_a_validation_error() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/cosmos/service/update");
            then.status(400).body(fixtures::COSMOS_BAD_VERSION);
        });

        let ctx = context_for(&server);
        let err = start_update(&ctx, None, Some("not-a-valid"), false)
            .await
            .expect_err("bad version must fail");

        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("\"not-a-valid\""));
        Ok(())
    }

    #[tokio::test]
    async fn registry_404_requires_enterprise() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/cosmos/service/describe");
            then.status(404);
        });

        let ctx = context_for(&server);
        let err = describe_text(&ctx).await.expect_err("404 must fail");

        assert_eq!(err.exit_code(), 3);
        assert_eq!(
            err.display_message(),
            "This command requires Enterprise DC/OS 1.10 or newer."
        );
        Ok(())
    }

    #[tokio::test]
    async fn update_status_renders_deploy_plan() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/service/hello-world/v1/plans/deploy");
            then.status(417).body(fixtures::PLAN_SINGLE_PHASE);
        });

        let ctx = context_for(&server);
        let text = plan_status_text(&ctx, DEFAULT_PLAN, false, PlanTreeStyle::Compact)
            .await
            .map_err(cli_err)?;

        assert!(text.starts_with("deploy (IN_PROGRESS)\n└─ Deployment (IN_PROGRESS)"));
        Ok(())
    }

    #[test]
    fn missing_options_file_is_reported() -> Result<()> {
        let (_dir, path) = files::missing_path()?;
        let err = load_options(&path).expect_err("missing file must fail");

        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().starts_with(&format!(
            "Failed to load specified options file {}: ",
            path.display()
        )));
        Ok(())
    }

    #[test]
    fn malformed_options_file_echoes_content() -> Result<()> {
        let file = files::temp_file_with("{\"service\": ")?;
        let err = load_options(file.path()).expect_err("truncated JSON must fail");

        let message = err.display_message();
        assert_eq!(err.exit_code(), 2);
        assert!(message.starts_with(&format!(
            "Failed to parse JSON in specified options file {}: ",
            file.path().display()
        )));
        assert!(message.ends_with("\nContent (12 bytes): {\"service\": "));
        Ok(())
    }
}
