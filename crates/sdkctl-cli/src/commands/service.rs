//! Read-only service queries: endpoints, scheduler state, and configurations.

use crate::cli::{ConfigShowArgs, EndpointsArgs, StatePropertyArgs};
use crate::client::{AppContext, CliResult};
use crate::commands::fetch_service_json;

pub(crate) async fn handle_endpoints(ctx: &AppContext, args: EndpointsArgs) -> CliResult<()> {
    println!("{}", endpoints_text(ctx, args.name.as_deref()).await?);
    Ok(())
}

pub(crate) async fn handle_state_framework_id(ctx: &AppContext) -> CliResult<()> {
    println!("{}", fetch_service_json(ctx, "v1/state/frameworkId").await?);
    Ok(())
}

pub(crate) async fn handle_state_properties(ctx: &AppContext) -> CliResult<()> {
    println!("{}", fetch_service_json(ctx, "v1/state/properties").await?);
    Ok(())
}

pub(crate) async fn handle_state_property(
    ctx: &AppContext,
    args: StatePropertyArgs,
) -> CliResult<()> {
    let path = format!("v1/state/properties/{}", args.name);
    println!("{}", fetch_service_json(ctx, &path).await?);
    Ok(())
}

pub(crate) async fn handle_config_list(ctx: &AppContext) -> CliResult<()> {
    println!("{}", fetch_service_json(ctx, "v1/configurations").await?);
    Ok(())
}

pub(crate) async fn handle_config_show(ctx: &AppContext, args: ConfigShowArgs) -> CliResult<()> {
    let path = format!("v1/configurations/{}", args.id);
    println!("{}", fetch_service_json(ctx, &path).await?);
    Ok(())
}

pub(crate) async fn handle_config_target(ctx: &AppContext) -> CliResult<()> {
    println!("{}", fetch_service_json(ctx, "v1/configurations/target").await?);
    Ok(())
}

pub(crate) async fn handle_config_target_id(ctx: &AppContext) -> CliResult<()> {
    println!("{}", fetch_service_json(ctx, "v1/configurations/targetId").await?);
    Ok(())
}

async fn endpoints_text(ctx: &AppContext, name: Option<&str>) -> CliResult<String> {
    let path = name.map_or_else(
        || "v1/endpoints".to_string(),
        |name| format!("v1/endpoints/{name}"),
    );
    fetch_service_json(ctx, &path).await
}
