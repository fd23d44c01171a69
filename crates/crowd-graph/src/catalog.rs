//! The fixed node catalog: per-kind sockets and parameter tables.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::model::GraphKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataType {
    Scalar,
    ObjectRef,
    AgentSet,
}

impl DataType {
    /// Whether an output of type `self` may feed an input of type `input`.
    pub fn feeds(self, input: DataType) -> bool {
        self == input || (self == DataType::ObjectRef && input == DataType::AgentSet)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Scalar => "scalar",
            DataType::ObjectRef => "object-reference",
            DataType::AgentSet => "agent-set",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SocketSpec {
    pub name: &'static str,
    pub data_type: DataType,
    /// Literal used when nothing is linked. `None` makes the input required.
    pub default: Option<f32>,
}

impl SocketSpec {
    const fn required(name: &'static str, data_type: DataType) -> Self {
        Self {
            name,
            data_type,
            default: None,
        }
    }

    const fn scalar(name: &'static str, default: f32) -> Self {
        Self {
            name,
            data_type: DataType::Scalar,
            default: Some(default),
        }
    }

    const fn output(name: &'static str, data_type: DataType) -> Self {
        Self::required(name, data_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDefault {
    Float(f32),
    Int(i64),
    Bool(bool),
    Text(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: ParamDefault,
}

const fn param(name: &'static str, default: ParamDefault) -> ParamSpec {
    ParamSpec { name, default }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeKind {
    // Brain graphs.
    Input,
    Math,
    Map,
    Logic,
    Noise,
    Previous,
    Accumulate,
    Output,
    BlackboardWrite,
    // Generation graphs.
    ObjectInput,
    Template,
    RandomPosition,
    Formation,
    Offset,
    Generate,
}

use DataType::{AgentSet, ObjectRef, Scalar};
use ParamDefault::{Bool, Float, Int, Text};

const SCALAR_OUT: &[SocketSpec] = &[SocketSpec::output("value", Scalar)];
const SET_IN: &[SocketSpec] = &[SocketSpec::required("agents", AgentSet)];
const SET_OUT: &[SocketSpec] = &[SocketSpec::output("agents", AgentSet)];
const BINARY_IN: &[SocketSpec] = &[SocketSpec::scalar("a", 0.0), SocketSpec::scalar("b", 0.0)];
const REQUIRED_VALUE_IN: &[SocketSpec] = &[SocketSpec::required("value", Scalar)];
const VALUE_IN: &[SocketSpec] = &[SocketSpec::scalar("value", 0.0)];
const OBJECT_IN: &[SocketSpec] = &[SocketSpec::required("object", ObjectRef)];
const OBJECT_OUT: &[SocketSpec] = &[SocketSpec::output("object", ObjectRef)];

const INPUT_PARAMS: &[ParamSpec] = &[
    param("InputSource", Text("CONSTANT")),
    param("Constant", Float(0.0)),
    param("Key", Text("")),
    param("Axis", Text("X")),
    param("Min", Float(0.0)),
    param("Max", Float(1.0)),
];
const MATH_PARAMS: &[ParamSpec] = &[param("Operation", Text("ADD"))];
const MAP_PARAMS: &[ParamSpec] = &[
    param("InMin", Float(0.0)),
    param("InMax", Float(1.0)),
    param("OutMin", Float(0.0)),
    param("OutMax", Float(1.0)),
    param("Clamp", Bool(true)),
];
const LOGIC_PARAMS: &[ParamSpec] = &[param("Operation", Text("AND"))];
const NOISE_PARAMS: &[ParamSpec] = &[param("Amount", Float(1.0))];
const PREVIOUS_PARAMS: &[ParamSpec] = &[param("Initial", Float(0.0))];
const ACCUMULATE_PARAMS: &[ParamSpec] = &[param("Rate", Float(1.0)), param("Initial", Float(0.0))];
const OUTPUT_PARAMS: &[ParamSpec] = &[param("Output", Text("PY"))];
const BLACKBOARD_WRITE_PARAMS: &[ParamSpec] = &[param("Key", Text(""))];
const OBJECT_INPUT_PARAMS: &[ParamSpec] = &[param("inputObject", Text(""))];
const TEMPLATE_PARAMS: &[ParamSpec] = &[param("brainType", Text(""))];
const RANDOM_POSITION_PARAMS: &[ParamSpec] = &[
    param("noToPlace", Int(1)),
    param("radius", Float(10.0)),
    param("seed", Int(0)),
];
const FORMATION_PARAMS: &[ParamSpec] = &[
    param("noToPlace", Int(1)),
    param("columns", Int(1)),
    param("spacing", Float(1.0)),
];
const OFFSET_PARAMS: &[ParamSpec] = &[
    param("x", Float(0.0)),
    param("y", Float(0.0)),
    param("z", Float(0.0)),
    param("rotation", Float(0.0)),
];

impl NodeKind {
    pub const ALL: [NodeKind; 15] = [
        NodeKind::Input,
        NodeKind::Math,
        NodeKind::Map,
        NodeKind::Logic,
        NodeKind::Noise,
        NodeKind::Previous,
        NodeKind::Accumulate,
        NodeKind::Output,
        NodeKind::BlackboardWrite,
        NodeKind::ObjectInput,
        NodeKind::Template,
        NodeKind::RandomPosition,
        NodeKind::Formation,
        NodeKind::Offset,
        NodeKind::Generate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Input => "Input",
            NodeKind::Math => "Math",
            NodeKind::Map => "Map",
            NodeKind::Logic => "Logic",
            NodeKind::Noise => "Noise",
            NodeKind::Previous => "Previous",
            NodeKind::Accumulate => "Accumulate",
            NodeKind::Output => "Output",
            NodeKind::BlackboardWrite => "BlackboardWrite",
            NodeKind::ObjectInput => "ObjectInput",
            NodeKind::Template => "Template",
            NodeKind::RandomPosition => "RandomPosition",
            NodeKind::Formation => "Formation",
            NodeKind::Offset => "Offset",
            NodeKind::Generate => "Generate",
        }
    }

    pub fn graph_kind(self) -> GraphKind {
        match self {
            NodeKind::Input
            | NodeKind::Math
            | NodeKind::Map
            | NodeKind::Logic
            | NodeKind::Noise
            | NodeKind::Previous
            | NodeKind::Accumulate
            | NodeKind::Output
            | NodeKind::BlackboardWrite => GraphKind::Brain,
            NodeKind::ObjectInput
            | NodeKind::Template
            | NodeKind::RandomPosition
            | NodeKind::Formation
            | NodeKind::Offset
            | NodeKind::Generate => GraphKind::Generation,
        }
    }

    /// Kinds available in graphs of `kind`, in catalog order.
    pub fn for_graph(kind: GraphKind) -> impl Iterator<Item = NodeKind> {
        Self::ALL.into_iter().filter(move |k| k.graph_kind() == kind)
    }

    /// Sinks anchor the plan: only nodes feeding a sink are evaluated.
    pub fn is_sink(self) -> bool {
        matches!(
            self,
            NodeKind::Output | NodeKind::BlackboardWrite | NodeKind::Generate
        )
    }

    /// Kinds carrying per-agent values from one frame to the next.
    pub fn is_stateful(self) -> bool {
        matches!(self, NodeKind::Previous | NodeKind::Accumulate)
    }

    pub fn inputs(self) -> &'static [SocketSpec] {
        match self {
            NodeKind::Input | NodeKind::ObjectInput => &[],
            NodeKind::Math | NodeKind::Logic => BINARY_IN,
            NodeKind::Map | NodeKind::Noise | NodeKind::Accumulate => VALUE_IN,
            NodeKind::Previous | NodeKind::Output | NodeKind::BlackboardWrite => {
                REQUIRED_VALUE_IN
            }
            NodeKind::Template => OBJECT_IN,
            NodeKind::RandomPosition
            | NodeKind::Formation
            | NodeKind::Offset
            | NodeKind::Generate => SET_IN,
        }
    }

    pub fn outputs(self) -> &'static [SocketSpec] {
        match self {
            NodeKind::Input
            | NodeKind::Math
            | NodeKind::Map
            | NodeKind::Logic
            | NodeKind::Noise
            | NodeKind::Previous
            | NodeKind::Accumulate => SCALAR_OUT,
            NodeKind::Output | NodeKind::BlackboardWrite | NodeKind::Generate => &[],
            NodeKind::ObjectInput => OBJECT_OUT,
            NodeKind::Template
            | NodeKind::RandomPosition
            | NodeKind::Formation
            | NodeKind::Offset => SET_OUT,
        }
    }

    pub fn params(self) -> &'static [ParamSpec] {
        match self {
            NodeKind::Input => INPUT_PARAMS,
            NodeKind::Math => MATH_PARAMS,
            NodeKind::Map => MAP_PARAMS,
            NodeKind::Logic => LOGIC_PARAMS,
            NodeKind::Noise => NOISE_PARAMS,
            NodeKind::Previous => PREVIOUS_PARAMS,
            NodeKind::Accumulate => ACCUMULATE_PARAMS,
            NodeKind::Output => OUTPUT_PARAMS,
            NodeKind::BlackboardWrite => BLACKBOARD_WRITE_PARAMS,
            NodeKind::ObjectInput => OBJECT_INPUT_PARAMS,
            NodeKind::Template => TEMPLATE_PARAMS,
            NodeKind::RandomPosition => RANDOM_POSITION_PARAMS,
            NodeKind::Formation => FORMATION_PARAMS,
            NodeKind::Offset => OFFSET_PARAMS,
            NodeKind::Generate => &[],
        }
    }

    pub fn param(self, name: &str) -> Option<&'static ParamSpec> {
        self.params().iter().find(|p| p.name == name)
    }

    pub fn from_name(name: &str) -> Option<NodeKind> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
