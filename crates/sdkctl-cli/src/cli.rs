//! Command-line interface for operating SDK services on a DC/OS cluster.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use sdkctl_config::keys::{AUTH_TOKEN_ENV, CLUSTER_URL_ENV};
use sdkctl_config::{DcosCliConfig, HostConfig, first_env};
use sdkctl_telemetry::{LogFormat, LoggingConfig, init_logging};

use crate::client::{
    AppContext, CliResult, CredentialResolver, EndpointBuilder, QueryExecutor, TrustResolver,
};
use crate::commands::package::{
    handle_describe, handle_update_package_versions, handle_update_start, handle_update_status,
};
use crate::commands::plan::{
    handle_plan_force_complete, handle_plan_force_restart, handle_plan_list, handle_plan_pause,
    handle_plan_resume, handle_plan_start, handle_plan_status, handle_plan_stop,
};
use crate::commands::pod::{
    handle_pod_info, handle_pod_list, handle_pod_replace, handle_pod_restart, handle_pod_status,
};
use crate::commands::service::{
    handle_config_list, handle_config_show, handle_config_target, handle_config_target_id,
    handle_endpoints, handle_state_framework_id, handle_state_properties, handle_state_property,
};

const DEFAULT_MODULE: &str = "hello-world";
pub(crate) const DEFAULT_PLAN: &str = "deploy";

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();

    let logging = LoggingConfig::for_verbosity(cli.verbose, cli.log_format);
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }

    let ctx = build_context(&cli, Arc::new(DcosCliConfig::new()));
    match dispatch(cli.command, &ctx).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

fn build_context(cli: &Cli, host: Arc<dyn HostConfig>) -> AppContext {
    build_context_with(cli, host, first_env)
}

fn build_context_with<F>(cli: &Cli, host: Arc<dyn HostConfig>, env: F) -> AppContext
where
    F: Fn(&[&str]) -> Option<String>,
{
    let service_name = cli
        .name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| cli.module.clone());
    let token = cli
        .custom_auth_token
        .clone()
        .or_else(|| env(&AUTH_TOKEN_ENV));
    let cluster_url = cli
        .custom_dcos_url
        .clone()
        .or_else(|| env(&CLUSTER_URL_ENV));

    tracing::debug!(
        service = %service_name,
        module = %cli.module,
        force_insecure = cli.force_insecure,
        "building query session"
    );

    let executor = QueryExecutor::new(
        host,
        TrustResolver::new(cli.force_insecure, cli.custom_cert_path.clone()),
        CredentialResolver::new(token),
        EndpointBuilder::new(cluster_url, cli.custom_cosmos_url.clone()),
    )
    .with_names(service_name, cli.module.clone());

    AppContext { executor }
}

async fn dispatch(command: Command, ctx: &AppContext) -> CliResult<()> {
    match command {
        Command::Plan(plan) => match plan {
            PlanCommand::List => handle_plan_list(ctx).await,
            PlanCommand::Status(args) => handle_plan_status(ctx, args).await,
            PlanCommand::Start(args) => handle_plan_start(ctx, args).await,
            PlanCommand::Stop(args) => handle_plan_stop(ctx, args).await,
            PlanCommand::Pause(args) => handle_plan_pause(ctx, args).await,
            PlanCommand::Resume(args) => handle_plan_resume(ctx, args).await,
            PlanCommand::ForceComplete(args) => handle_plan_force_complete(ctx, args).await,
            PlanCommand::ForceRestart(args) => handle_plan_force_restart(ctx, args).await,
        },
        Command::Pod(pod) => match pod {
            PodCommand::List => handle_pod_list(ctx).await,
            PodCommand::Status(args) => handle_pod_status(ctx, args).await,
            PodCommand::Info(args) => handle_pod_info(ctx, args).await,
            PodCommand::Restart(args) => handle_pod_restart(ctx, args).await,
            PodCommand::Replace(args) => handle_pod_replace(ctx, args).await,
        },
        Command::Endpoints(args) => handle_endpoints(ctx, args).await,
        Command::State(state) => match state {
            StateCommand::FrameworkId => handle_state_framework_id(ctx).await,
            StateCommand::Properties => handle_state_properties(ctx).await,
            StateCommand::Property(args) => handle_state_property(ctx, args).await,
        },
        Command::Config(config) => match config {
            ConfigCommand::List => handle_config_list(ctx).await,
            ConfigCommand::Show(args) => handle_config_show(ctx, args).await,
            ConfigCommand::Target => handle_config_target(ctx).await,
            ConfigCommand::TargetId => handle_config_target_id(ctx).await,
        },
        Command::Describe => handle_describe(ctx).await,
        Command::Update(update) => match update {
            UpdateCommand::PackageVersions => handle_update_package_versions(ctx).await,
            UpdateCommand::Start(args) => handle_update_start(ctx, args).await,
            UpdateCommand::Status(args) => handle_update_status(ctx, args).await,
        },
    }
}

#[derive(Parser)]
#[command(name = "sdkctl", about = "Operate SDK services running on a DC/OS cluster")]
pub(crate) struct Cli {
    /// Package module the service was installed from.
    #[arg(long, global = true, env = "SDKCTL_MODULE", default_value = DEFAULT_MODULE)]
    pub(crate) module: String,
    /// Name of the service instance to query; defaults to the module name.
    #[arg(long, global = true)]
    pub(crate) name: Option<String>,
    /// Log HTTP queries and responses to stderr.
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,
    /// Skip certificate validation (INSECURE).
    #[arg(long, global = true)]
    pub(crate) force_insecure: bool,
    /// Auth token to use instead of `core.dcos_acs_token`.
    #[arg(long, global = true)]
    pub(crate) custom_auth_token: Option<String>,
    /// Cluster URL to use instead of `core.dcos_url`.
    #[arg(long, global = true)]
    pub(crate) custom_dcos_url: Option<String>,
    /// CA bundle to validate the cluster certificate against.
    #[arg(long, global = true)]
    pub(crate) custom_cert_path: Option<PathBuf>,
    /// Package registry URL to use instead of `package.cosmos_url`.
    #[arg(long, global = true)]
    pub(crate) custom_cosmos_url: Option<String>,
    /// Diagnostic log format (pretty or json).
    #[arg(
        long,
        global = true,
        env = "SDKCTL_LOG_FORMAT",
        default_value = "pretty",
        value_parser = parse_log_format
    )]
    pub(crate) log_format: LogFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Query and control deployment plans.
    #[command(subcommand)]
    Plan(PlanCommand),
    /// Query and control pods.
    #[command(subcommand)]
    Pod(PodCommand),
    /// List service endpoints.
    Endpoints(EndpointsArgs),
    /// Inspect persisted scheduler state.
    #[command(subcommand)]
    State(StateCommand),
    /// Inspect service configurations.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Show the options the service was installed or updated with.
    Describe,
    /// Update the service configuration or package version.
    #[command(subcommand)]
    Update(UpdateCommand),
}

#[derive(Subcommand)]
pub(crate) enum PlanCommand {
    /// List plan names.
    List,
    /// Show a plan's status tree.
    Status(PlanStatusArgs),
    /// Start a plan, optionally with parameters.
    Start(PlanStartArgs),
    /// Stop a running plan.
    Stop(PlanNameArgs),
    /// Pause a plan or one of its phases.
    Pause(PlanPhaseArgs),
    /// Resume a paused plan or phase.
    Resume(PlanPhaseArgs),
    /// Mark a step complete without running it.
    ForceComplete(PlanStepArgs),
    /// Restart a plan, phase, or step.
    ForceRestart(PlanRestartArgs),
}

#[derive(Args)]
pub(crate) struct PlanStatusArgs {
    #[arg(default_value = DEFAULT_PLAN)]
    pub(crate) plan: String,
    /// Print the raw JSON response.
    #[arg(long)]
    pub(crate) json: bool,
    /// Include plan and phase strategies in the tree.
    #[arg(long)]
    pub(crate) strategy: bool,
}

#[derive(Args)]
pub(crate) struct PlanStartArgs {
    pub(crate) plan: String,
    /// Plan parameter as NAME=VALUE; repeatable.
    #[arg(short = 'p', long = "params", value_name = "NAME=VALUE")]
    pub(crate) params: Vec<String>,
}

#[derive(Args)]
pub(crate) struct PlanNameArgs {
    pub(crate) plan: String,
}

#[derive(Args)]
pub(crate) struct PlanPhaseArgs {
    #[arg(default_value = DEFAULT_PLAN)]
    pub(crate) plan: String,
    pub(crate) phase: Option<String>,
}

#[derive(Args)]
pub(crate) struct PlanStepArgs {
    pub(crate) plan: String,
    pub(crate) phase: String,
    pub(crate) step: String,
}

#[derive(Args)]
pub(crate) struct PlanRestartArgs {
    pub(crate) plan: String,
    pub(crate) phase: Option<String>,
    pub(crate) step: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum PodCommand {
    /// List pod instance names.
    List,
    /// Show the status tree of all pods or one pod.
    Status(PodStatusArgs),
    /// Show the full task info of a pod.
    Info(PodNameArgs),
    /// Restart a pod in place.
    Restart(PodNameArgs),
    /// Replace a pod, discarding its persistent state.
    Replace(PodNameArgs),
}

#[derive(Args)]
pub(crate) struct PodStatusArgs {
    pub(crate) pod: Option<String>,
    /// Print the raw JSON response.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args)]
pub(crate) struct PodNameArgs {
    pub(crate) pod: String,
}

#[derive(Args)]
pub(crate) struct EndpointsArgs {
    pub(crate) name: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum StateCommand {
    /// Show the registered framework id.
    FrameworkId,
    /// List stored property keys.
    Properties,
    /// Show one stored property.
    Property(StatePropertyArgs),
}

#[derive(Args)]
pub(crate) struct StatePropertyArgs {
    pub(crate) name: String,
}

#[derive(Subcommand)]
pub(crate) enum ConfigCommand {
    /// List configuration ids.
    List,
    /// Show one configuration.
    Show(ConfigShowArgs),
    /// Show the target configuration.
    Target,
    /// Show the target configuration id.
    TargetId,
}

#[derive(Args)]
pub(crate) struct ConfigShowArgs {
    pub(crate) id: String,
}

#[derive(Subcommand)]
pub(crate) enum UpdateCommand {
    /// Show the versions the package can move to.
    PackageVersions,
    /// Start an update.
    Start(UpdateStartArgs),
    /// Show the progress of an update.
    Status(UpdateStatusArgs),
}

#[derive(Args)]
pub(crate) struct UpdateStartArgs {
    /// JSON file with the new options.
    #[arg(long)]
    pub(crate) options: Option<PathBuf>,
    /// Package version to move to.
    #[arg(long)]
    pub(crate) package_version: Option<String>,
    /// Replace the stored options instead of merging into them.
    #[arg(long)]
    pub(crate) replace: bool,
}

#[derive(Args)]
pub(crate) struct UpdateStatusArgs {
    /// Print the raw JSON response.
    #[arg(long)]
    pub(crate) json: bool,
}

fn parse_log_format(input: &str) -> Result<LogFormat, String> {
    input.parse()
}
