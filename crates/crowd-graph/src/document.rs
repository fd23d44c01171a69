//! Serializable graph documents.
//!
//! A document is the on-disk shape of a [`Graph`]. Loading goes through the
//! regular `Graph` mutators so a document can never bypass authoring checks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::NodeKind;
use crate::error::GraphError;
use crate::model::{Graph, GraphKind, Literal, NodeId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub name: String,
    pub kind: GraphKind,
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
    #[serde(default)]
    pub links: Vec<LinkDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub params: BTreeMap<String, Literal>,
}

/// `from`/`to` are `(node name, socket index)` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDocument {
    pub from: (String, usize),
    pub to: (String, usize),
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("link refers to unknown node {0:?}")]
    UnknownNodeName(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("invalid graph json: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphDocument {
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn into_graph(self) -> Result<Graph, DocumentError> {
        let mut graph = Graph::new(self.name, self.kind);
        let mut ids: BTreeMap<String, NodeId> = BTreeMap::new();

        for node in self.nodes {
            let id = graph.add_named_node(node.kind, node.name.clone())?;
            for (param, value) in node.params {
                graph.set_param(id, &param, value)?;
            }
            ids.insert(node.name, id);
        }

        let lookup = |name: &str| {
            ids.get(name)
                .copied()
                .ok_or_else(|| DocumentError::UnknownNodeName(name.to_string()))
        };
        for link in self.links {
            let from = lookup(&link.from.0)?;
            let to = lookup(&link.to.0)?;
            graph.connect(from, link.from.1, to, link.to.1)?;
        }

        Ok(graph)
    }
}

impl From<&Graph> for GraphDocument {
    fn from(graph: &Graph) -> Self {
        let names: BTreeMap<NodeId, String> = graph
            .nodes()
            .iter()
            .map(|n| (n.id(), n.name().to_string()))
            .collect();

        Self {
            name: graph.name().to_string(),
            kind: graph.kind(),
            nodes: graph
                .nodes()
                .iter()
                .map(|n| NodeDocument {
                    name: n.name().to_string(),
                    kind: n.kind(),
                    params: n.params().clone(),
                })
                .collect(),
            links: graph
                .links()
                .iter()
                .map(|l| LinkDocument {
                    from: (names[&l.from.node].clone(), l.from.index),
                    to: (names[&l.to.node].clone(), l.to.index),
                })
                .collect(),
        }
    }
}
