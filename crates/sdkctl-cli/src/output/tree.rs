//! Box-drawn status trees.
//!
//! Rendering is a pure transform from a `StatusNode` to lines; nothing is
//! retained between calls.

/// Placeholder for a missing, empty, or null field.
pub const UNKNOWN_VALUE: &str = "<UNKNOWN>";

const BRANCH: &str = "├─ ";
const LAST_BRANCH: &str = "└─ ";
const CONTINUATION: &str = "│  ";
const LAST_CONTINUATION: &str = "   ";

/// One node of a status tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusNode {
    /// Display name.
    pub name: String,
    /// Strategy shown as `(<strategy> strategy)`, when rendered.
    pub strategy: Option<String>,
    /// Status shown as `(<status>)`, when rendered.
    pub status: Option<String>,
    /// Ordered children.
    pub children: Vec<Self>,
}

impl StatusNode {
    /// Leaf with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attach a status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Attach a strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    /// Replace the children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }

    /// `name [(<strategy> strategy)] [(<status>)]`.
    #[must_use]
    pub fn label(&self) -> String {
        let mut label = self.name.clone();
        if let Some(strategy) = &self.strategy {
            label.push_str(&format!(" ({strategy} strategy)"));
        }
        if let Some(status) = &self.status {
            label.push_str(&format!(" ({status})"));
        }
        label
    }
}

/// Render `root` and its descendants, one line per node.
#[must_use]
pub fn render_tree(root: &StatusNode) -> Vec<String> {
    let mut lines = vec![root.label()];
    lines.extend(render_children(&root.children, ""));
    lines
}

/// Render a sibling list under `prefix`.
#[must_use]
pub fn render_children(children: &[StatusNode], prefix: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for (index, child) in children.iter().enumerate() {
        let last = index + 1 == children.len();
        let (branch, continuation) = if last {
            (LAST_BRANCH, LAST_CONTINUATION)
        } else {
            (BRANCH, CONTINUATION)
        };
        lines.push(format!("{prefix}{branch}{}", child.label()));
        lines.extend(render_children(
            &child.children,
            &format!("{prefix}{continuation}"),
        ));
    }
    lines
}

/// Join lines and drop trailing newlines.
#[must_use]
pub fn join_lines(lines: &[String]) -> String {
    lines.join("\n").trim_end_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_combine_optional_parts() {
        assert_eq!(StatusNode::new("hello-0").label(), "hello-0");
        assert_eq!(
            StatusNode::new("deploy").with_status("COMPLETE").label(),
            "deploy (COMPLETE)"
        );
        assert_eq!(
            StatusNode::new("deploy")
                .with_strategy("serial")
                .with_status("COMPLETE")
                .label(),
            "deploy (serial strategy) (COMPLETE)"
        );
    }

    #[test]
    fn nested_siblings_use_continuation_prefixes() {
        let root = StatusNode::new("root").with_children(vec![
            StatusNode::new("a").with_children(vec![StatusNode::new("a1"), StatusNode::new("a2")]),
            StatusNode::new("b").with_children(vec![StatusNode::new("b1")]),
        ]);
        assert_eq!(
            join_lines(&render_tree(&root)),
            "root\n├─ a\n│  ├─ a1\n│  └─ a2\n└─ b\n   └─ b1"
        );
    }

    #[test]
    fn trailing_blank_lines_are_dropped() {
        let lines = vec!["root".to_string(), String::new(), String::new()];
        assert_eq!(join_lines(&lines), "root");
    }
}
