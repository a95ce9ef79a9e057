//! Renderers for command output.
//!
//! Layout: `tree.rs` (box-drawn tree primitives), `plan.rs` (plan trees),
//! `pod.rs` (pod trees), `json.rs` (pretty JSON).

pub mod json;
pub mod plan;
pub mod pod;
pub mod tree;

pub use json::{pretty_json, pretty_value};
pub use plan::{PlanTreeStyle, render_plan_tree};
pub use pod::{render_pod_tree, render_single_pod_tree};
pub use tree::{StatusNode, UNKNOWN_VALUE, join_lines, render_children, render_tree};
