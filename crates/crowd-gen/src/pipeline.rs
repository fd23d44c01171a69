use std::collections::BTreeSet;

use crowd_core::{Agent, AgentId, ObjectRef, SceneView, TemplateBinding, Transform};
use crowd_graph::{EvaluationPlan, GraphKind, InputSource, NodeId, PlanStep, StepOp};

use crate::error::GenerationError;
use crate::placement;

/// Transforms flowing between generation nodes, plus what they were instanced from.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSet {
    /// Brain bound by the nearest upstream Template node.
    pub brain: Option<String>,
    pub source: ObjectRef,
    pub transforms: Vec<Transform>,
}

#[derive(Debug, Clone)]
enum Value {
    Object(ObjectRef, Transform),
    Set(AgentSet),
}

impl Value {
    /// Object references promote to a one-element set at the object.
    fn into_set(self) -> AgentSet {
        match self {
            Value::Object(source, transform) => AgentSet {
                brain: None,
                source,
                transforms: vec![transform],
            },
            Value::Set(set) => set,
        }
    }
}

/// Evaluate every Generate node of `plan` once.
///
/// Agent ids are assigned from 0, in plan order of the Generate nodes and then
/// in placement order within each set.
pub fn generate(
    plan: &EvaluationPlan,
    scene: &dyn SceneView,
    seed: u64,
) -> Result<Vec<Agent>, GenerationError> {
    check_kind(plan)?;
    let wanted = vec![true; plan.len()];
    run(plan, &wanted, scene, seed)
}

/// Evaluate only the Generate node `node` and what it depends on.
pub fn generate_from(
    plan: &EvaluationPlan,
    node: NodeId,
    scene: &dyn SceneView,
    seed: u64,
) -> Result<Vec<Agent>, GenerationError> {
    check_kind(plan)?;
    let target = plan
        .step_of(node)
        .filter(|&i| plan.step(i).op == StepOp::Generate)
        .ok_or(GenerationError::NotAGenerateNode { node })?;

    let mut wanted = vec![false; plan.len()];
    let mut stack = vec![target];
    while let Some(index) = stack.pop() {
        if std::mem::replace(&mut wanted[index], true) {
            continue;
        }
        for input in &plan.step(index).inputs {
            if let InputSource::Step { step, .. } = input {
                stack.push(*step);
            }
        }
    }
    run(plan, &wanted, scene, seed)
}

fn check_kind(plan: &EvaluationPlan) -> Result<(), GenerationError> {
    if plan.kind() == GraphKind::Generation {
        Ok(())
    } else {
        Err(GenerationError::WrongGraphKind {
            graph: plan.graph_name().to_string(),
            kind: plan.kind(),
        })
    }
}

fn run(
    plan: &EvaluationPlan,
    wanted: &[bool],
    scene: &dyn SceneView,
    seed: u64,
) -> Result<Vec<Agent>, GenerationError> {
    let mut values: Vec<Option<Value>> = vec![None; plan.len()];
    let mut agents = Vec::new();
    let mut objects = BTreeSet::new();

    for (index, step) in plan.steps().iter().enumerate() {
        if !wanted[index] {
            continue;
        }
        let node = step.node;
        let value = match &step.op {
            StepOp::ObjectInput { object } => {
                let transform = scene
                    .resolve(object)
                    .ok_or_else(|| GenerationError::UnknownObject {
                        node,
                        name: object.clone(),
                    })?;
                Value::Object(object.clone(), transform)
            }
            StepOp::Template { brain } => {
                let mut set = upstream(&values, step)?;
                set.brain = Some(brain.clone());
                Value::Set(set)
            }
            StepOp::RandomPosition {
                count,
                radius,
                seed: node_seed,
            } => {
                let count = positive(node, "noToPlace", *count)?;
                if *radius < 0.0 {
                    return Err(invalid(node, format!("radius {radius} is negative")));
                }
                let mut set = upstream(&values, step)?;
                within_limit(node, set.transforms.len(), count)?;
                let mut rng = placement::placement_rng(seed, *node_seed, node.0);
                set.transforms = set
                    .transforms
                    .iter()
                    .flat_map(|center| placement::random_in_disc(center, count, *radius, &mut rng))
                    .collect();
                Value::Set(set)
            }
            StepOp::Formation {
                count,
                columns,
                spacing,
            } => {
                let count = positive(node, "noToPlace", *count)?;
                let columns = positive(node, "columns", *columns)?;
                if *spacing < 0.0 {
                    return Err(invalid(node, format!("spacing {spacing} is negative")));
                }
                let mut set = upstream(&values, step)?;
                within_limit(node, set.transforms.len(), count)?;
                set.transforms = set
                    .transforms
                    .iter()
                    .flat_map(|center| placement::grid(center, count, columns, *spacing))
                    .collect();
                Value::Set(set)
            }
            StepOp::Offset {
                translation,
                rotation,
            } => {
                let mut set = upstream(&values, step)?;
                for transform in &mut set.transforms {
                    *transform = placement::offset(transform, *translation, *rotation);
                }
                Value::Set(set)
            }
            StepOp::Generate => {
                let set = upstream(&values, step)?;
                let brain = set
                    .brain
                    .ok_or(GenerationError::MissingTemplate { node })?;
                objects.insert(set.source.clone());
                let first = agents.len() as u64;
                agents.extend(set.transforms.into_iter().enumerate().map(|(i, transform)| {
                    Agent::new(
                        AgentId(first + i as u64),
                        transform,
                        TemplateBinding {
                            brain: brain.clone(),
                            source: set.source.clone(),
                        },
                    )
                }));
                continue;
            }
            // Brain steps never appear in generation plans.
            _ => continue,
        };
        values[index] = Some(value);
    }

    tracing::debug!(
        graph = plan.graph_name(),
        agents = agents.len(),
        sources = objects.len(),
        "generation finished"
    );
    Ok(agents)
}

fn upstream(values: &[Option<Value>], step: &PlanStep) -> Result<AgentSet, GenerationError> {
    match step.inputs.first() {
        Some(InputSource::Step { step: from, .. }) => values[*from]
            .clone()
            .map(Value::into_set)
            .ok_or(GenerationError::UnresolvedInput { node: step.node }),
        _ => Err(GenerationError::UnresolvedInput { node: step.node }),
    }
}

fn positive(node: NodeId, param: &str, value: i64) -> Result<usize, GenerationError> {
    match usize::try_from(value) {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(node, format!("{param} must be positive, got {value}"))),
    }
}

/// Every incoming transform fans out into `count` placements.
fn within_limit(node: NodeId, incoming: usize, count: usize) -> Result<(), GenerationError> {
    let total = incoming.saturating_mul(count);
    if total > placement::MAX_PLACEMENTS {
        return Err(invalid(
            node,
            format!(
                "{incoming} x {count} placements exceed the limit of {}",
                placement::MAX_PLACEMENTS
            ),
        ));
    }
    Ok(())
}

fn invalid(node: NodeId, reason: String) -> GenerationError {
    GenerationError::InvalidPlacement { node, reason }
}
