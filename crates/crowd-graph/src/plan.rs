//! Compiled, immutable evaluation plans.

use crowd_core::{ObjectRef, Vec3};

use crate::catalog::NodeKind;
use crate::error::CompileError;
use crate::model::{GraphKind, Literal, Node, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn pick(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputOp {
    Constant(f32),
    Frame,
    Random { min: f32, max: f32 },
    Position(Axis),
    Rotation(Axis),
    Blackboard(String),
    AgentId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
    Not,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputChannel {
    Px,
    Py,
    Pz,
    Rx,
    Ry,
    Rz,
    Animation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapRange {
    pub in_min: f32,
    pub in_max: f32,
    pub out_min: f32,
    pub out_max: f32,
    pub clamp: bool,
}

/// What a plan step computes, with its parameters already validated and typed.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOp {
    Input(InputOp),
    Math(MathOp),
    Map(MapRange),
    Logic(LogicOp),
    Noise { amount: f32 },
    Previous { initial: f32 },
    Accumulate { rate: f32, initial: f32 },
    Output(OutputChannel),
    BlackboardWrite { key: String },
    ObjectInput { object: ObjectRef },
    Template { brain: String },
    // Counts stay signed: non-positive counts are a generation error, not a compile error.
    RandomPosition { count: i64, radius: f32, seed: i64 },
    Formation { count: i64, columns: i64, spacing: f32 },
    Offset { translation: Vec3, rotation: f32 },
    Generate,
}

impl StepOp {
    pub(crate) fn resolve(node: &Node) -> Result<Self, CompileError> {
        let p = ParamReader { node };
        let op = match node.kind() {
            NodeKind::Input => StepOp::Input(match p.text("InputSource")?.as_str() {
                "CONSTANT" => InputOp::Constant(p.float("Constant")?),
                "FRAME" => InputOp::Frame,
                "RANDOM" => InputOp::Random {
                    min: p.float("Min")?,
                    max: p.float("Max")?,
                },
                "POSITION" => InputOp::Position(p.axis("Axis")?),
                "ROTATION" => InputOp::Rotation(p.axis("Axis")?),
                "BLACKBOARD" => InputOp::Blackboard(p.non_empty("Key")?),
                "AGENT_ID" => InputOp::AgentId,
                other => return Err(p.invalid("InputSource", format!("unknown source {other:?}"))),
            }),
            NodeKind::Math => StepOp::Math(match p.text("Operation")?.as_str() {
                "ADD" => MathOp::Add,
                "SUB" => MathOp::Sub,
                "MUL" => MathOp::Mul,
                "DIV" => MathOp::Div,
                "MIN" => MathOp::Min,
                "MAX" => MathOp::Max,
                "POW" => MathOp::Pow,
                other => return Err(p.invalid("Operation", format!("unknown operation {other:?}"))),
            }),
            NodeKind::Map => StepOp::Map(MapRange {
                in_min: p.float("InMin")?,
                in_max: p.float("InMax")?,
                out_min: p.float("OutMin")?,
                out_max: p.float("OutMax")?,
                clamp: p.boolean("Clamp")?,
            }),
            NodeKind::Logic => StepOp::Logic(match p.text("Operation")?.as_str() {
                "AND" => LogicOp::And,
                "OR" => LogicOp::Or,
                "NOT" => LogicOp::Not,
                "XOR" => LogicOp::Xor,
                other => return Err(p.invalid("Operation", format!("unknown operation {other:?}"))),
            }),
            NodeKind::Noise => StepOp::Noise {
                amount: p.float("Amount")?,
            },
            NodeKind::Previous => StepOp::Previous {
                initial: p.float("Initial")?,
            },
            NodeKind::Accumulate => StepOp::Accumulate {
                rate: p.float("Rate")?,
                initial: p.float("Initial")?,
            },
            NodeKind::Output => StepOp::Output(match p.text("Output")?.as_str() {
                "PX" => OutputChannel::Px,
                "PY" => OutputChannel::Py,
                "PZ" => OutputChannel::Pz,
                "RX" => OutputChannel::Rx,
                "RY" => OutputChannel::Ry,
                "RZ" => OutputChannel::Rz,
                "ANIMATION" => OutputChannel::Animation,
                other => return Err(p.invalid("Output", format!("unknown channel {other:?}"))),
            }),
            NodeKind::BlackboardWrite => StepOp::BlackboardWrite {
                key: p.non_empty("Key")?,
            },
            NodeKind::ObjectInput => StepOp::ObjectInput {
                object: ObjectRef::new(p.non_empty("inputObject")?),
            },
            NodeKind::Template => StepOp::Template {
                brain: p.non_empty("brainType")?,
            },
            NodeKind::RandomPosition => StepOp::RandomPosition {
                count: p.int("noToPlace")?,
                radius: p.float("radius")?,
                seed: p.int("seed")?,
            },
            NodeKind::Formation => StepOp::Formation {
                count: p.int("noToPlace")?,
                columns: p.int("columns")?,
                spacing: p.float("spacing")?,
            },
            NodeKind::Offset => StepOp::Offset {
                translation: Vec3::new(p.float("x")?, p.float("y")?, p.float("z")?),
                rotation: p.float("rotation")?,
            },
            NodeKind::Generate => StepOp::Generate,
        };
        Ok(op)
    }
}

struct ParamReader<'a> {
    node: &'a Node,
}

impl ParamReader<'_> {
    fn get(&self, name: &'static str) -> Result<&Literal, CompileError> {
        self.node
            .param(name)
            .ok_or_else(|| self.invalid(name, "missing".to_string()))
    }

    fn float(&self, name: &'static str) -> Result<f32, CompileError> {
        let value = self
            .get(name)?
            .as_f32()
            .ok_or_else(|| self.invalid(name, "expected a number".to_string()))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.invalid(name, format!("{value} is not finite")))
        }
    }

    fn int(&self, name: &'static str) -> Result<i64, CompileError> {
        self.get(name)?
            .as_i64()
            .ok_or_else(|| self.invalid(name, "expected an integer".to_string()))
    }

    fn boolean(&self, name: &'static str) -> Result<bool, CompileError> {
        self.get(name)?
            .as_bool()
            .ok_or_else(|| self.invalid(name, "expected a bool".to_string()))
    }

    fn text(&self, name: &'static str) -> Result<String, CompileError> {
        self.get(name)?
            .as_str()
            .map(|s| s.trim().to_ascii_uppercase())
            .ok_or_else(|| self.invalid(name, "expected text".to_string()))
    }

    /// Text kept verbatim (names and keys are case sensitive).
    fn non_empty(&self, name: &'static str) -> Result<String, CompileError> {
        match self.get(name)?.as_str() {
            Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
            Some(_) => Err(self.invalid(name, "must not be empty".to_string())),
            None => Err(self.invalid(name, "expected text".to_string())),
        }
    }

    fn axis(&self, name: &'static str) -> Result<Axis, CompileError> {
        match self.text(name)?.as_str() {
            "X" => Ok(Axis::X),
            "Y" => Ok(Axis::Y),
            "Z" => Ok(Axis::Z),
            other => Err(self.invalid(name, format!("unknown axis {other:?}"))),
        }
    }

    fn invalid(&self, param: &'static str, reason: String) -> CompileError {
        CompileError::InvalidParam {
            node: self.node.id(),
            param,
            reason,
        }
    }
}

/// Where a step input gets its value from.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    /// Output socket `output` of step `step`. The step comes earlier in the
    /// plan, except for inputs of stateful steps, which are read once the
    /// whole plan has run.
    Step { step: usize, output: usize },
    Literal(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanStep {
    pub node: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub op: StepOp,
    pub inputs: Vec<InputSource>,
}

/// Topologically ordered steps of a validated graph.
///
/// Plans are immutable; share them between agents behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationPlan {
    pub(crate) graph: String,
    pub(crate) kind: GraphKind,
    pub(crate) steps: Vec<PlanStep>,
    pub(crate) sinks: Vec<usize>,
    pub(crate) stateful: Vec<usize>,
    pub(crate) pruned: Vec<NodeId>,
}

impl EvaluationPlan {
    pub fn graph_name(&self) -> &str {
        &self.graph
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> &PlanStep {
        &self.steps[index]
    }

    /// Indices of sink steps (Output, BlackboardWrite, Generate) in plan order.
    pub fn sinks(&self) -> &[usize] {
        &self.sinks
    }

    /// Indices of steps carrying state across frames.
    pub fn stateful_steps(&self) -> &[usize] {
        &self.stateful
    }

    /// Nodes left out of the plan because no sink depends on them.
    pub fn pruned(&self) -> &[NodeId] {
        &self.pruned
    }

    pub fn order(&self) -> Vec<NodeId> {
        self.steps.iter().map(|s| s.node).collect()
    }

    pub fn step_of(&self, node: NodeId) -> Option<usize> {
        self.steps.iter().position(|s| s.node == node)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
