//! Plan status trees.

use serde::Deserialize;
use serde_json::Value;

use crate::output::tree::{StatusNode, UNKNOWN_VALUE, join_lines, render_tree};

/// How plan and phase nodes are labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanTreeStyle {
    /// `name (status)` at every level.
    #[default]
    Compact,
    /// Plan and phases also carry `(<strategy> strategy)`.
    WithStrategy,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PlanBody {
    status: Option<Value>,
    strategy: Option<Value>,
    phases: Option<Vec<PhaseBody>>,
    errors: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PhaseBody {
    name: Option<Value>,
    status: Option<Value>,
    strategy: Option<Value>,
    steps: Option<Vec<StepBody>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StepBody {
    name: Option<Value>,
    status: Option<Value>,
}

/// Render the plan in `body` as a tree rooted at `plan_name`.
///
/// # Errors
///
/// Returns an error when `body` is not a JSON plan object.
pub fn render_plan_tree(
    plan_name: &str,
    body: &[u8],
    style: PlanTreeStyle,
) -> Result<String, serde_json::Error> {
    let plan: PlanBody = serde_json::from_slice(body)?;

    let phases = plan
        .phases
        .unwrap_or_default()
        .into_iter()
        .map(|phase| {
            let steps = phase
                .steps
                .unwrap_or_default()
                .into_iter()
                .map(|step| {
                    StatusNode::new(field_text(step.name)).with_status(field_text(step.status))
                })
                .collect();
            let node = StatusNode::new(field_text(phase.name));
            with_style(node, phase.strategy, style)
                .with_status(field_text(phase.status))
                .with_children(steps)
        })
        .collect();

    let root = with_style(StatusNode::new(plan_name), plan.strategy, style)
        .with_status(field_text(plan.status))
        .with_children(phases);

    let mut lines = render_tree(&root);
    let errors = plan.errors.unwrap_or_default();
    if !errors.is_empty() {
        lines.push(String::new());
        lines.push("Errors:".to_string());
        lines.extend(errors.into_iter().map(|error| format!("- {}", value_text(error))));
    }
    Ok(join_lines(&lines))
}

fn with_style(node: StatusNode, strategy: Option<Value>, style: PlanTreeStyle) -> StatusNode {
    match style {
        PlanTreeStyle::Compact => node,
        PlanTreeStyle::WithStrategy => node.with_strategy(field_text(strategy)),
    }
}

/// Display text for an optional JSON field, or [`UNKNOWN_VALUE`].
pub(crate) fn field_text(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => UNKNOWN_VALUE.to_string(),
        Some(Value::String(text)) if text.is_empty() => UNKNOWN_VALUE.to_string(),
        Some(other) => value_text(other),
    }
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
