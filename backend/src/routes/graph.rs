use serde::{Deserialize, Serialize};

use crate::api::CourseId;

/// A course in a prerequisite graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: CourseId,
    pub label: String,
    pub is_root: bool,
}

/// Directed edge `from` (the prerequisite) `to` (the course that requires it).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: CourseId,
    pub to: CourseId,
}

/// Deduplicated prerequisite graph rooted at one course.
///
/// Nodes are listed in visit order (root first); edges in depth-first
/// discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl PrerequisiteGraph {
    pub fn node_ids(&self) -> Vec<&CourseId> {
        self.nodes.iter().map(|n| &n.id).collect()
    }

    pub fn root(&self) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.is_root)
    }
}

/// Route function name constant
pub const GET_PREREQUISITE_GRAPH: &str = "get_prerequisite_graph";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_serializes_camel_case() {
        let node = GraphNode {
            id: CourseId::new("CS225"),
            label: "CS225".to_string(),
            is_root: true,
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["id"], "CS225");
        assert_eq!(json["label"], "CS225");
        assert_eq!(json["isRoot"], true);
    }

    #[test]
    fn test_edge_shape() {
        let edge = GraphEdge {
            from: CourseId::new("CS125"),
            to: CourseId::new("CS225"),
        };
        let json = serde_json::to_string(&edge).unwrap();
        assert_eq!(json, r#"{"from":"CS125","to":"CS225"}"#);
    }

    #[test]
    fn test_root_lookup() {
        let graph = PrerequisiteGraph {
            nodes: vec![
                GraphNode {
                    id: CourseId::new("CS225"),
                    label: "CS225".to_string(),
                    is_root: true,
                },
                GraphNode {
                    id: CourseId::new("CS125"),
                    label: "CS125".to_string(),
                    is_root: false,
                },
            ],
            edges: vec![],
        };
        assert_eq!(graph.root().map(|n| n.id.as_str()), Some("CS225"));
        assert_eq!(graph.node_ids().len(), 2);
    }
}
