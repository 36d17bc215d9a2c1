// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON scene descriptions.
//!
//! ```json
//! {
//!   "viewport": { "x1": 0, "y1": 0, "x2": 400, "y2": 300 },
//!   "nodes": [
//!     { "id": "a", "position": { "x": 0, "y": 0 } },
//!     { "id": "label", "classes": ["label"], "size": { "width": 40, "height": 12 } }
//!   ],
//!   "edges": [ { "source": "a", "target": "label" } ]
//! }
//! ```
use std::collections::BTreeMap;

use automove_core::GraphHost;
use automove_geom::{BoundingBox, Position, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::{GraphError, MemoryGraph};

/// Errors raised while reading or building a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The text is not a valid scene document.
    #[error("malformed scene: {0}")]
    Json(#[from] serde_json::Error),
    /// An edge names a node the scene does not declare.
    #[error("edge `{edge}` references unknown node `{node}`")]
    UnknownEndpoint {
        /// Key of the offending edge.
        edge: String,
        /// The missing node key.
        node: String,
    },
    /// The graph rejected a node or edge (e.g. a duplicate id).
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// One node of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneNode {
    /// Unique node key.
    pub id: String,
    /// Initial position (origin when absent).
    #[serde(default)]
    pub position: Position,
    /// Rendered size; the graph default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// Class names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    /// String data, visible to `[key = value]` selectors.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

/// One edge of a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneEdge {
    /// Unique edge key; `"{source}-{target}"` (with a `#n` suffix on clashes)
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Source node key.
    pub source: String,
    /// Target node key.
    pub target: String,
}

/// A whole graph as loaded from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    /// Visible extent; the graph default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<BoundingBox>,
    /// Nodes in creation order.
    #[serde(default)]
    pub nodes: Vec<SceneNode>,
    /// Edges in creation order.
    #[serde(default)]
    pub edges: Vec<SceneEdge>,
}

impl Scene {
    /// Parses a scene document.
    ///
    /// # Errors
    /// [`SceneError::Json`] if the document is malformed.
    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Builds a fresh [`MemoryGraph`] holding this scene.
    ///
    /// # Errors
    /// [`SceneError::UnknownEndpoint`] for dangling edges and
    /// [`SceneError::Graph`] for duplicate keys.
    pub fn build(&self) -> Result<MemoryGraph, SceneError> {
        let mut graph = MemoryGraph::new();
        if let Some(viewport) = self.viewport {
            graph.set_extent(viewport);
        }
        for node in &self.nodes {
            let id = graph.add_node(&node.id, node.position)?;
            if let Some(size) = node.size {
                graph.set_size(id, size)?;
            }
            for class in &node.classes {
                graph.add_class(id, class)?;
            }
            for (key, value) in &node.data {
                graph.set_data(id, key, value)?;
            }
        }
        for edge in &self.edges {
            let key = match &edge.id {
                Some(id) => id.clone(),
                None => fresh_edge_key(&graph, &edge.source, &edge.target),
            };
            let resolve = |node: &str| {
                graph
                    .resolve_node(node)
                    .ok_or_else(|| SceneError::UnknownEndpoint {
                        edge: key.clone(),
                        node: node.to_owned(),
                    })
            };
            let source = resolve(&edge.source)?;
            let target = resolve(&edge.target)?;
            graph.add_edge(&key, source, target)?;
        }
        Ok(graph)
    }
}

fn fresh_edge_key(graph: &MemoryGraph, source: &str, target: &str) -> String {
    let base = format!("{source}-{target}");
    if graph.edge_id(&base).is_none() {
        return base;
    }
    let mut n = 1u64;
    loop {
        let candidate = format!("{base}#{n}");
        if graph.edge_id(&candidate).is_none() {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parallel_edges_get_distinct_generated_keys() {
        let scene = Scene::from_json(
            r#"{ "nodes": [{ "id": "a" }, { "id": "b" }],
                 "edges": [{ "source": "a", "target": "b" }, { "source": "a", "target": "b" }] }"#,
        )
        .unwrap();
        let graph = scene.build().unwrap();
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.edge_id("a-b").is_some());
        assert!(graph.edge_id("a-b#1").is_some());
    }

    #[test]
    fn dangling_edges_are_reported_with_their_key() {
        let scene = Scene::from_json(
            r#"{ "nodes": [{ "id": "a" }], "edges": [{ "id": "e", "source": "a", "target": "zz" }] }"#,
        )
        .unwrap();
        let err = scene.build().unwrap_err();
        assert!(matches!(
            err,
            SceneError::UnknownEndpoint { ref edge, ref node } if edge == "e" && node == "zz"
        ));
    }
}
