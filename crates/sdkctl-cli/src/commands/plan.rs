//! Plan commands.

use std::collections::BTreeMap;

use anyhow::Context;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::cli::{
    PlanNameArgs, PlanPhaseArgs, PlanRestartArgs, PlanStartArgs, PlanStatusArgs, PlanStepArgs,
};
use crate::client::{
    AppContext, Classification, CliError, CliResult, QueryRequest, QueryResponse, ResponseCheck,
};
use crate::commands::{fetch, fetch_service_json};
use crate::output::{PlanTreeStyle, pretty_json, render_plan_tree};

const ELEMENT_NOT_FOUND: &str = "Element not found";
const MISSING_ELEMENT: &str = "Plan, phase, and/or step does not exist.";
const ALREADY_REPORTED: &str =
    "Cannot execute command. Command has already been issued or the plan has completed.";
const EXPECTATION_FAILED: &str = "plan endpoint returned HTTP status code 417";
const BAD_PARAMETER: &str = "Must have one variable name and one variable value per definition";

/// Response check shared by every plan endpoint.
///
/// A 417 carries a plan that cannot proceed; `plan status` still renders it.
#[derive(Debug, Clone, Copy)]
struct PlanCheck {
    tolerate_expectation_failed: bool,
}

impl PlanCheck {
    const STATUS: Self = Self {
        tolerate_expectation_failed: true,
    };
    const MUTATION: Self = Self {
        tolerate_expectation_failed: false,
    };
}

impl ResponseCheck for PlanCheck {
    fn check(&self, response: &QueryResponse) -> Option<Classification> {
        match response.status {
            StatusCode::NOT_FOUND if response.text().trim_end() == ELEMENT_NOT_FOUND => {
                Some(Classification::Rejected(MISSING_ELEMENT.to_string()))
            }
            StatusCode::ALREADY_REPORTED => {
                Some(Classification::Rejected(ALREADY_REPORTED.to_string()))
            }
            StatusCode::EXPECTATION_FAILED if self.tolerate_expectation_failed => {
                Some(Classification::Success)
            }
            StatusCode::EXPECTATION_FAILED => {
                Some(Classification::Rejected(EXPECTATION_FAILED.to_string()))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct MutationBody {
    #[serde(default)]
    message: String,
}

pub(crate) async fn handle_plan_list(ctx: &AppContext) -> CliResult<()> {
    println!("{}", fetch_service_json(ctx, "v1/plans").await?);
    Ok(())
}

pub(crate) async fn handle_plan_status(ctx: &AppContext, args: PlanStatusArgs) -> CliResult<()> {
    let style = if args.strategy {
        PlanTreeStyle::WithStrategy
    } else {
        PlanTreeStyle::Compact
    };
    println!("{}", plan_status_text(ctx, &args.plan, args.json, style).await?);
    Ok(())
}

pub(crate) async fn handle_plan_start(ctx: &AppContext, args: PlanStartArgs) -> CliResult<()> {
    println!("{}", start_plan(ctx, &args.plan, &args.params).await?);
    Ok(())
}

pub(crate) async fn handle_plan_stop(ctx: &AppContext, args: PlanNameArgs) -> CliResult<()> {
    let request = QueryRequest::post(ctx.service_scope(), plan_path(&args.plan, Some("stop")));
    let body = fetch(ctx, &request, Some(&PlanCheck::MUTATION)).await?;
    println!("{}", pretty_json(&body));
    Ok(())
}

pub(crate) async fn handle_plan_pause(ctx: &AppContext, args: PlanPhaseArgs) -> CliResult<()> {
    let target = PlanTarget::new(&args.plan, args.phase.as_deref(), None);
    println!("{}", mutate_plan(ctx, &target, "interrupt", "paused").await?);
    Ok(())
}

pub(crate) async fn handle_plan_resume(ctx: &AppContext, args: PlanPhaseArgs) -> CliResult<()> {
    let target = PlanTarget::new(&args.plan, args.phase.as_deref(), None);
    println!("{}", mutate_plan(ctx, &target, "continue", "resumed").await?);
    Ok(())
}

pub(crate) async fn handle_plan_force_complete(
    ctx: &AppContext,
    args: PlanStepArgs,
) -> CliResult<()> {
    let target = PlanTarget::new(&args.plan, Some(&args.phase), Some(&args.step));
    let text = mutate_plan(ctx, &target, "forceComplete", "forced to complete").await?;
    println!("{text}");
    Ok(())
}

pub(crate) async fn handle_plan_force_restart(
    ctx: &AppContext,
    args: PlanRestartArgs,
) -> CliResult<()> {
    let target = PlanTarget::new(&args.plan, args.phase.as_deref(), args.step.as_deref());
    println!("{}", mutate_plan(ctx, &target, "restart", "restarted").await?);
    Ok(())
}

pub(crate) async fn plan_status_text(
    ctx: &AppContext,
    plan: &str,
    raw_json: bool,
    style: PlanTreeStyle,
) -> CliResult<String> {
    let request = QueryRequest::get(ctx.service_scope(), plan_path(plan, None));
    let body = fetch(ctx, &request, Some(&PlanCheck::STATUS)).await?;
    if raw_json {
        return Ok(pretty_json(&body));
    }
    render_plan_tree(plan, &body, style)
        .with_context(|| format!("failed to parse status of plan '{plan}'"))
        .map_err(CliError::failure)
}

async fn start_plan(ctx: &AppContext, plan: &str, params: &[String]) -> CliResult<String> {
    let payload = parameter_payload(params)?;
    let request = QueryRequest::post(ctx.service_scope(), plan_path(plan, Some("start")))
        .with_json(payload);
    let body = fetch(ctx, &request, Some(&PlanCheck::MUTATION)).await?;
    Ok(pretty_json(&body))
}

async fn mutate_plan(
    ctx: &AppContext,
    target: &PlanTarget<'_>,
    action: &str,
    verb: &str,
) -> CliResult<String> {
    let request = QueryRequest::post(ctx.service_scope(), plan_path(target.plan, Some(action)))
        .with_query(target.query());
    let body = fetch(ctx, &request, Some(&PlanCheck::MUTATION)).await?;
    let accepted = serde_json::from_slice::<MutationBody>(&body)
        .map(|parsed| !parsed.message.is_empty())
        .unwrap_or(false);
    if !accepted {
        tracing::debug!(action, "plan mutation response carried no message");
    }
    Ok(target.outcome(accepted, verb))
}

fn plan_path(plan: &str, action: Option<&str>) -> String {
    action.map_or_else(
        || format!("v1/plans/{plan}"),
        |action| format!("v1/plans/{plan}/{action}"),
    )
}

/// Build the `/start` body from `NAME=VALUE` pairs; later names win.
fn parameter_payload(params: &[String]) -> CliResult<Vec<u8>> {
    let mut pairs = BTreeMap::new();
    for param in params {
        let (name, value) = param
            .split_once('=')
            .ok_or_else(|| CliError::validation(BAD_PARAMETER))?;
        pairs.insert(name, value);
    }
    serde_json::to_vec(&pairs).map_err(CliError::failure)
}

/// The plan element a mutation addresses.
#[derive(Debug)]
struct PlanTarget<'a> {
    plan: &'a str,
    phase: Option<&'a str>,
    step: Option<&'a str>,
}

impl<'a> PlanTarget<'a> {
    fn new(plan: &'a str, phase: Option<&'a str>, step: Option<&'a str>) -> Self {
        let present = |value: Option<&'a str>| value.filter(|text| !text.is_empty());
        Self {
            plan,
            phase: present(phase),
            step: present(step),
        }
    }

    fn query(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(phase) = self.phase {
            query.append_pair("phase", phase);
        }
        if let Some(step) = self.step {
            query.append_pair("step", step);
        }
        query.finish()
    }

    fn outcome(&self, accepted: bool, verb: &str) -> String {
        let result = if accepted { "has been" } else { "could not be" };
        match (self.phase, self.step) {
            (_, Some(step)) => format!(
                "\"{}\" plan: step \"{step}\" in phase \"{}\" {result} {verb}.",
                self.plan,
                self.phase.unwrap_or_default()
            ),
            (Some(phase), None) => {
                format!("\"{}\" plan: phase \"{phase}\" {result} {verb}.", self.plan)
            }
            (None, None) => format!("\"{}\" plan {result} {verb}.", self.plan),
        }
    }
}
