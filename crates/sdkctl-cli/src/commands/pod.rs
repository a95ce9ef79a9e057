//! Pod commands.

use anyhow::Context;

use crate::cli::{PodNameArgs, PodStatusArgs};
use crate::client::{AppContext, CliError, CliResult, QueryRequest};
use crate::commands::{fetch, fetch_service_json};
use crate::output::{pretty_json, render_pod_tree, render_single_pod_tree};

pub(crate) async fn handle_pod_list(ctx: &AppContext) -> CliResult<()> {
    println!("{}", fetch_service_json(ctx, "v1/pod").await?);
    Ok(())
}

pub(crate) async fn handle_pod_status(ctx: &AppContext, args: PodStatusArgs) -> CliResult<()> {
    println!("{}", pod_status_text(ctx, args.pod.as_deref(), args.json).await?);
    Ok(())
}

pub(crate) async fn handle_pod_info(ctx: &AppContext, args: PodNameArgs) -> CliResult<()> {
    println!("{}", fetch_service_json(ctx, &format!("v1/pod/{}/info", args.pod)).await?);
    Ok(())
}

pub(crate) async fn handle_pod_restart(ctx: &AppContext, args: PodNameArgs) -> CliResult<()> {
    println!("{}", pod_action(ctx, &args.pod, "restart").await?);
    Ok(())
}

pub(crate) async fn handle_pod_replace(ctx: &AppContext, args: PodNameArgs) -> CliResult<()> {
    println!("{}", pod_action(ctx, &args.pod, "replace").await?);
    Ok(())
}

async fn pod_status_text(ctx: &AppContext, pod: Option<&str>, raw_json: bool) -> CliResult<String> {
    let path = pod.map_or_else(
        || "v1/pod/status".to_string(),
        |pod| format!("v1/pod/{pod}/status"),
    );
    let request = QueryRequest::get(ctx.service_scope(), path);
    let body = fetch(ctx, &request, None).await?;
    if raw_json {
        return Ok(pretty_json(&body));
    }
    let tree = match pod {
        Some(pod) => render_single_pod_tree(&body)
            .with_context(|| format!("failed to parse status of pod '{pod}'")),
        None => render_pod_tree(&body).context("failed to parse pod status"),
    };
    tree.map_err(CliError::failure)
}

async fn pod_action(ctx: &AppContext, pod: &str, action: &str) -> CliResult<String> {
    tracing::info!(pod, action, "requesting pod action");
    let request = QueryRequest::post(ctx.service_scope(), format!("v1/pod/{pod}/{action}"));
    let body = fetch(ctx, &request, None).await?;
    Ok(pretty_json(&body))
}
