//! Pod status trees.

use serde::Deserialize;
use serde_json::Value;

use crate::output::plan::field_text;
use crate::output::tree::{StatusNode, join_lines, render_tree};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServicePodsBody {
    service: Option<Value>,
    pods: Option<Vec<PodBody>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PodBody {
    name: Option<Value>,
    instances: Option<Vec<InstanceBody>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InstanceBody {
    name: Option<Value>,
    tasks: Option<Vec<TaskBody>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TaskBody {
    name: Option<Value>,
    status: Option<Value>,
}

/// Render `service -> pod -> instance -> task` for a whole service.
///
/// # Errors
///
/// Returns an error when `body` is not a JSON pod status object.
pub fn render_pod_tree(body: &[u8]) -> Result<String, serde_json::Error> {
    let status: ServicePodsBody = serde_json::from_slice(body)?;
    let pods = status
        .pods
        .unwrap_or_default()
        .into_iter()
        .map(pod_node)
        .collect();
    let root = StatusNode::new(field_text(status.service)).with_children(pods);
    Ok(join_lines(&render_tree(&root)))
}

/// Render `pod -> instance -> task` for a single pod.
///
/// # Errors
///
/// Returns an error when `body` is not a JSON pod object.
pub fn render_single_pod_tree(body: &[u8]) -> Result<String, serde_json::Error> {
    let pod: PodBody = serde_json::from_slice(body)?;
    Ok(join_lines(&render_tree(&pod_node(pod))))
}

fn pod_node(pod: PodBody) -> StatusNode {
    let instances = pod
        .instances
        .unwrap_or_default()
        .into_iter()
        .map(|instance| {
            let tasks = instance
                .tasks
                .unwrap_or_default()
                .into_iter()
                .map(|task| {
                    StatusNode::new(field_text(task.name)).with_status(field_text(task.status))
                })
                .collect();
            StatusNode::new(field_text(instance.name)).with_children(tasks)
        })
        .collect();
    StatusNode::new(field_text(pod.name)).with_children(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use sdkctl_test_support::fixtures;

    #[test]
    fn service_tree_nests_pods_instances_and_tasks() -> Result<()> {
        let expected = [
            "hello-world",
            "├─ hello",
            "│  ├─ hello-0",
            "│  │  └─ hello-0-server (RUNNING)",
            "│  └─ hello-1",
            "│     └─ hello-1-server (RUNNING)",
            "└─ world",
            "   ├─ world-0",
            "   │  ├─ world-0-init (FINISHED)",
            "   │  └─ world-0-server (RUNNING)",
            "   └─ world-1",
            "      ├─ world-1-init (FINISHED)",
            "      └─ world-1-server (STARTING)",
        ]
        .join("\n");
        assert_eq!(render_pod_tree(fixtures::POD_STATUS.as_bytes())?, expected);
        Ok(())
    }

    #[test]
    fn single_pod_uses_pod_name_as_root() -> Result<()> {
        let body = br#"{"name":"world","instances":[{"name":"world-0","tasks":[{"name":"world-0-server","status":"RUNNING"}]}]}"#;
        assert_eq!(
            render_single_pod_tree(body)?,
            "world\n└─ world-0\n   └─ world-0-server (RUNNING)"
        );
        Ok(())
    }

    #[test]
    fn empty_status_renders_placeholder_root() -> Result<()> {
        assert_eq!(render_pod_tree(b"{}")?, "<UNKNOWN>");
        Ok(())
    }

    #[test]
    fn tasks_without_status_render_placeholder() -> Result<()> {
        let body = br#"{"service":"svc","pods":[{"name":"p","instances":[{"name":"p-0","tasks":[{"name":"p-0-t"}]}]}]}"#;
        assert_eq!(
            render_pod_tree(body)?,
            "svc\n└─ p\n   └─ p-0\n      └─ p-0-t (<UNKNOWN>)"
        );
        Ok(())
    }
}
