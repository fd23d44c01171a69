use std::sync::Arc;

use crowd_core::{AgentId, BlackboardRead, DeterministicRng, FrameContext, Transform};
use crowd_graph::{
    EvaluationPlan, GraphKind, InputOp, InputSource, LogicOp, MapRange, MathOp, StepOp,
};

use crate::error::{InstantiateError, NodeEvaluationError, NodeEvaluationKind};
use crate::outputs::BrainOutputs;

/// The part of an agent a brain may observe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentView {
    pub id: AgentId,
    pub transform: Transform,
}

/// Per-agent runtime for one brain plan: the plan plus the agent's persistent node state.
#[derive(Debug, Clone)]
pub struct BrainContext {
    plan: Arc<EvaluationPlan>,
    /// Step index -> state slot.
    slots: Vec<Option<usize>>,
    state: Vec<f32>,
    initial: Vec<f32>,
    values: Vec<f32>,
}

impl BrainContext {
    pub fn instantiate(plan: Arc<EvaluationPlan>) -> Result<Self, InstantiateError> {
        if plan.kind() != GraphKind::Brain {
            return Err(InstantiateError::NotABrain {
                graph: plan.graph_name().to_string(),
                kind: plan.kind(),
            });
        }

        let mut slots = vec![None; plan.len()];
        let mut initial = Vec::with_capacity(plan.stateful_steps().len());
        for &index in plan.stateful_steps() {
            let value = match plan.step(index).op {
                StepOp::Previous { initial: value } | StepOp::Accumulate { initial: value, .. } => {
                    value
                }
                _ => 0.0,
            };
            slots[index] = Some(initial.len());
            initial.push(value);
        }
        tracing::trace!(
            graph = plan.graph_name(),
            steps = plan.len(),
            state_slots = initial.len(),
            "brain context instantiated"
        );

        Ok(Self {
            values: vec![0.0; plan.len()],
            state: initial.clone(),
            initial,
            slots,
            plan,
        })
    }

    pub fn plan(&self) -> &Arc<EvaluationPlan> {
        &self.plan
    }

    /// Persistent values of the stateful steps, in plan order.
    pub fn state(&self) -> &[f32] {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state.copy_from_slice(&self.initial);
    }

    /// Evaluate the plan once for `agent` at `frame`.
    ///
    /// State is only committed when every step succeeds, so a failed frame
    /// leaves the context exactly as it was.
    pub fn step(
        &mut self,
        frame: &FrameContext,
        agent: &AgentView,
        blackboard: &dyn BlackboardRead,
    ) -> Result<BrainOutputs, NodeEvaluationError> {
        let mut next_state = self.state.clone();
        let mut outputs = BrainOutputs::default();

        for (index, step) in self.plan.steps().iter().enumerate() {
            let values = &self.values;
            let input = |socket: usize| match step.inputs.get(socket) {
                Some(InputSource::Step { step, .. }) => values[*step],
                Some(InputSource::Literal(value)) => *value,
                None => 0.0,
            };
            let fail = |kind| NodeEvaluationError {
                node: step.node,
                frame: frame.frame,
                agent: agent.id,
                kind,
            };

            let value = match &step.op {
                StepOp::Input(source) => match source {
                    InputOp::Constant(value) => *value,
                    InputOp::Frame => frame.frame as f32,
                    InputOp::Random { min, max } => frame
                        .rng_for_agent(agent.id, index as u64)
                        .next_f32_range(*min, *max),
                    InputOp::Position(axis) => axis.pick(agent.transform.position),
                    InputOp::Rotation(axis) => axis.pick(agent.transform.rotation),
                    InputOp::Blackboard(key) => blackboard.read(key).unwrap_or(0.0),
                    InputOp::AgentId => agent.id.stable_id() as f32,
                },
                StepOp::Math(op) => math(*op, input(0), input(1)).map_err(fail)?,
                StepOp::Map(range) => map(range, input(0)).map_err(fail)?,
                StepOp::Logic(op) => logic(*op, input(0), input(1)),
                StepOp::Noise { amount } => {
                    let mut rng = frame.rng_for_agent(agent.id, index as u64);
                    input(0) + rng.next_f32_range(-amount, *amount)
                }
                // Stateful steps emit what the previous frame stored; their
                // inputs are read after the walk.
                StepOp::Previous { .. } | StepOp::Accumulate { .. } => {
                    self.slots[index].map_or(0.0, |slot| self.state[slot])
                }
                StepOp::Output(channel) => {
                    let value = input(0);
                    outputs.emit(*channel, value);
                    value
                }
                StepOp::BlackboardWrite { key } => {
                    let value = input(0);
                    outputs.writes.push((key.clone(), value));
                    value
                }
                // Generation steps never appear in brain plans (checked at instantiate).
                StepOp::ObjectInput { .. }
                | StepOp::Template { .. }
                | StepOp::RandomPosition { .. }
                | StepOp::Formation { .. }
                | StepOp::Offset { .. }
                | StepOp::Generate => 0.0,
            };

            if !value.is_finite() {
                return Err(fail(NodeEvaluationKind::NonFinite));
            }
            self.values[index] = value;
        }

        for &index in self.plan.stateful_steps() {
            let Some(slot) = self.slots[index] else {
                continue;
            };
            let step = self.plan.step(index);
            let input = match step.inputs.first() {
                Some(InputSource::Step { step, .. }) => self.values[*step],
                Some(InputSource::Literal(value)) => *value,
                None => 0.0,
            };
            let stored = match step.op {
                StepOp::Accumulate { rate, .. } => {
                    self.state[slot] + input * rate * frame.dt_seconds
                }
                _ => input,
            };
            if !stored.is_finite() {
                return Err(NodeEvaluationError {
                    node: step.node,
                    frame: frame.frame,
                    agent: agent.id,
                    kind: NodeEvaluationKind::NonFinite,
                });
            }
            next_state[slot] = stored;
        }

        self.state = next_state;
        Ok(outputs)
    }
}

fn math(op: MathOp, a: f32, b: f32) -> Result<f32, NodeEvaluationKind> {
    Ok(match op {
        MathOp::Add => a + b,
        MathOp::Sub => a - b,
        MathOp::Mul => a * b,
        MathOp::Div if b == 0.0 => return Err(NodeEvaluationKind::DivisionByZero),
        MathOp::Div => a / b,
        MathOp::Min => a.min(b),
        MathOp::Max => a.max(b),
        MathOp::Pow => a.powf(b),
    })
}

fn map(range: &MapRange, value: f32) -> Result<f32, NodeEvaluationKind> {
    let width = range.in_max - range.in_min;
    if width == 0.0 {
        return Err(NodeEvaluationKind::DegenerateRange);
    }
    let mut t = (value - range.in_min) / width;
    if range.clamp {
        t = t.clamp(0.0, 1.0);
    }
    Ok(range.out_min + t * (range.out_max - range.out_min))
}

/// Fuzzy logic over `[0, 1]` truth values.
fn logic(op: LogicOp, a: f32, b: f32) -> f32 {
    match op {
        LogicOp::And => a.min(b),
        LogicOp::Or => a.max(b),
        LogicOp::Not => 1.0 - a,
        LogicOp::Xor => (a - b).abs(),
    }
}
