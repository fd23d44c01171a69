use core::fmt;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::catalog::{NodeKind, ParamDefault, SocketSpec};
use crate::error::GraphError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GraphKind {
    Brain,
    Generation,
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphKind::Brain => f.write_str("brain"),
            GraphKind::Generation => f.write_str("generation"),
        }
    }
}

/// Node identifier. Ids follow creation order and are never reused within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkId(pub u32);

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f32),
    Text(String),
}

impl Literal {
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Literal::Float(v) => Some(*v),
            Literal::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Literal::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Text(v) => Some(v),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Text(_) => "text",
        }
    }
}

impl From<ParamDefault> for Literal {
    fn from(value: ParamDefault) -> Self {
        match value {
            ParamDefault::Float(v) => Literal::Float(v),
            ParamDefault::Int(v) => Literal::Int(v),
            ParamDefault::Bool(v) => Literal::Bool(v),
            ParamDefault::Text(v) => Literal::Text(v.to_string()),
        }
    }
}

impl From<f32> for Literal {
    fn from(value: f32) -> Self {
        Literal::Float(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(value as f32)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Int(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Int(value.into())
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Text(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Text(value)
    }
}

/// One end of a link: a socket index on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SocketRef {
    pub node: NodeId,
    pub index: usize,
}

impl SocketRef {
    pub fn new(node: NodeId, index: usize) -> Self {
        Self { node, index }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub id: LinkId,
    pub from: SocketRef,
    pub to: SocketRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    name: String,
    params: BTreeMap<String, Literal>,
}

impl Node {
    fn new(id: NodeId, kind: NodeKind, name: String) -> Self {
        let params = kind
            .params()
            .iter()
            .map(|p| (p.name.to_string(), Literal::from(p.default)))
            .collect();
        Self {
            id,
            kind,
            name,
            params,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &'static [SocketSpec] {
        self.kind.inputs()
    }

    pub fn outputs(&self) -> &'static [SocketSpec] {
        self.kind.outputs()
    }

    pub fn params(&self) -> &BTreeMap<String, Literal> {
        &self.params
    }

    /// Every catalog param is present from construction, so lookups of known
    /// names always succeed.
    pub fn param(&self, name: &str) -> Option<&Literal> {
        self.params.get(name)
    }
}

/// An authored node graph.
///
/// Mutations keep the structural invariants (sockets exist, inputs take one
/// link, nodes match the graph kind). Type compatibility and cycles are left to
/// [`crate::compile`].
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    name: String,
    kind: GraphKind,
    nodes: Vec<Node>,
    links: Vec<Link>,
    next_node: u32,
    next_link: u32,
}

impl Graph {
    pub fn new(name: impl Into<String>, kind: GraphKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nodes: Vec::new(),
            links: Vec::new(),
            next_node: 0,
            next_link: 0,
        }
    }

    pub fn brain(name: impl Into<String>) -> Self {
        Self::new(name, GraphKind::Brain)
    }

    pub fn generation(name: impl Into<String>) -> Self {
        Self::new(name, GraphKind::Generation)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Add a node named after its kind ("Generate", "Generate.001", ...).
    pub fn add_node(&mut self, kind: NodeKind) -> Result<NodeId, GraphError> {
        let name = self.unique_name(kind.name());
        self.add_named_node(kind, name)
    }

    pub fn add_named_node(
        &mut self,
        kind: NodeKind,
        name: impl Into<String>,
    ) -> Result<NodeId, GraphError> {
        if kind.graph_kind() != self.kind {
            return Err(GraphError::WrongGraphKind {
                node: kind,
                graph: self.kind,
            });
        }
        let name = name.into();
        if self.node_by_name(&name).is_some() {
            return Err(GraphError::DuplicateName(name));
        }
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.push(Node::new(id, kind, name));
        Ok(id)
    }

    /// Remove a node together with every link touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, GraphError> {
        let index = self.index_of(id).ok_or(GraphError::UnknownNode(id))?;
        self.links.retain(|l| l.from.node != id && l.to.node != id);
        Ok(self.nodes.remove(index))
    }

    pub fn set_param(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<Literal>,
    ) -> Result<(), GraphError> {
        let index = self.index_of(id).ok_or(GraphError::UnknownNode(id))?;
        let node = &mut self.nodes[index];
        let spec = node.kind.param(name).ok_or_else(|| GraphError::UnknownParam {
            kind: node.kind,
            name: name.to_string(),
        })?;

        let value = value.into();
        let value = match (spec.default, value) {
            (ParamDefault::Float(_), Literal::Int(v)) => Literal::Float(v as f32),
            (ParamDefault::Float(_), v @ Literal::Float(_))
            | (ParamDefault::Int(_), v @ Literal::Int(_))
            | (ParamDefault::Bool(_), v @ Literal::Bool(_))
            | (ParamDefault::Text(_), v @ Literal::Text(_)) => v,
            (default, v) => {
                return Err(GraphError::ParamType {
                    kind: node.kind,
                    name: name.to_string(),
                    expected: Literal::from(default).type_name(),
                    found: v.type_name(),
                })
            }
        };
        node.params.insert(name.to_string(), value);
        Ok(())
    }

    /// Connect output socket `from` to input socket `to`.
    pub fn add_link(&mut self, from: SocketRef, to: SocketRef) -> Result<LinkId, GraphError> {
        let source = self.node(from.node).ok_or(GraphError::UnknownNode(from.node))?;
        if from.index >= source.outputs().len() {
            return Err(GraphError::NoSuchOutput(from));
        }
        let target = self.node(to.node).ok_or(GraphError::UnknownNode(to.node))?;
        if to.index >= target.inputs().len() {
            return Err(GraphError::NoSuchInput(to));
        }
        if self.incoming(to).is_some() {
            return Err(GraphError::InputOccupied(to));
        }

        let id = LinkId(self.next_link);
        self.next_link += 1;
        self.links.push(Link { id, from, to });
        Ok(id)
    }

    /// Shorthand for `add_link` between socket indices of two nodes.
    pub fn connect(
        &mut self,
        from: NodeId,
        output: usize,
        to: NodeId,
        input: usize,
    ) -> Result<LinkId, GraphError> {
        self.add_link(SocketRef::new(from, output), SocketRef::new(to, input))
    }

    pub fn remove_link(&mut self, id: LinkId) -> Result<Link, GraphError> {
        let index = self
            .links
            .iter()
            .position(|l| l.id == id)
            .ok_or(GraphError::UnknownLink(id))?;
        Ok(self.links.remove(index))
    }

    /// The link feeding input socket `to`, if any.
    pub fn incoming(&self, to: SocketRef) -> Option<&Link> {
        self.links.iter().find(|l| l.to == to)
    }

    fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.binary_search_by_key(&id, |n| n.id).ok()
    }

    fn unique_name(&self, base: &str) -> String {
        if self.node_by_name(base).is_none() {
            return base.to_string();
        }
        (1u32..)
            .map(|i| format!("{base}.{i:03}"))
            .find(|candidate| self.node_by_name(candidate).is_none())
            .unwrap_or_else(|| base.to_string())
    }
}
