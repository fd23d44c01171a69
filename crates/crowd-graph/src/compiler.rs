use core::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use crate::error::CompileError;
use crate::model::{Graph, Link, NodeId, SocketRef};
use crate::plan::{EvaluationPlan, InputSource, PlanStep, StepOp};

/// Validate `graph` and order it into an [`EvaluationPlan`].
///
/// Checks run over every node, including ones no sink depends on, so authoring
/// mistakes surface even in unused parts of a graph. The emitted plan only
/// contains nodes that feed a sink.
pub fn compile(graph: &Graph) -> Result<EvaluationPlan, CompileError> {
    let nodes = graph.nodes();

    if !nodes.iter().any(|n| n.kind().is_sink()) {
        return Err(CompileError::NoSinks {
            graph: graph.name().to_string(),
            kind: graph.kind(),
        });
    }

    for link in graph.links() {
        let (Some(from), Some(to)) = (graph.node(link.from.node), graph.node(link.to.node)) else {
            continue;
        };
        let output = from.outputs()[link.from.index];
        let input = to.inputs()[link.to.index];
        if !output.data_type.feeds(input.data_type) {
            return Err(CompileError::TypeMismatch {
                link: link.id,
                node: to.id(),
                socket: input.name,
                expected: input.data_type,
                found: output.data_type,
            });
        }
    }

    for node in nodes {
        for (index, socket) in node.inputs().iter().enumerate() {
            let linked = graph.incoming(SocketRef::new(node.id(), index)).is_some();
            if !linked && socket.default.is_none() {
                return Err(CompileError::UnresolvedInput {
                    node: node.id(),
                    socket: socket.name,
                });
            }
        }
    }

    let ops = nodes
        .iter()
        .map(|n| StepOp::resolve(n).map(|op| (n.id(), op)))
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    let order = topological_order(graph)?;
    let live = live_nodes(graph);

    let placed: Vec<NodeId> = order.iter().copied().filter(|id| live.contains(id)).collect();
    let step_of: BTreeMap<NodeId, usize> =
        placed.iter().enumerate().map(|(index, &id)| (id, index)).collect();

    let mut steps = Vec::with_capacity(placed.len());
    for id in placed {
        let Some(node) = graph.node(id) else {
            continue;
        };
        let inputs = node
            .inputs()
            .iter()
            .enumerate()
            .map(|(index, socket)| {
                let source = graph
                    .incoming(SocketRef::new(id, index))
                    .and_then(|link| step_of.get(&link.from.node).map(|&step| (step, link)));
                match source {
                    // Upstream of a live node is live, so it always has a step.
                    Some((step, link)) => InputSource::Step {
                        step,
                        output: link.from.index,
                    },
                    None => InputSource::Literal(socket.default.unwrap_or_default()),
                }
            })
            .collect();

        steps.push(PlanStep {
            node: id,
            name: node.name().to_string(),
            kind: node.kind(),
            op: ops[&id].clone(),
            inputs,
        });
    }

    let sinks = indices_where(&steps, |s| s.kind.is_sink());
    let stateful = indices_where(&steps, |s| s.kind.is_stateful());
    let pruned: Vec<NodeId> = order.into_iter().filter(|id| !live.contains(id)).collect();

    tracing::debug!(
        graph = graph.name(),
        kind = %graph.kind(),
        steps = steps.len(),
        pruned = pruned.len(),
        "compiled graph"
    );

    Ok(EvaluationPlan {
        graph: graph.name().to_string(),
        kind: graph.kind(),
        steps,
        sinks,
        stateful,
        pruned,
    })
}

/// Whether `link` is a same-frame dependency. Inputs of stateful nodes are
/// only read after the whole plan has run, so they never order the plan.
fn orders(graph: &Graph, link: &Link) -> bool {
    graph
        .node(link.to.node)
        .is_some_and(|node| !node.kind().is_stateful())
}

/// Kahn's algorithm with a min-heap on node id, so ties always resolve in
/// creation order and recompiling an unchanged graph yields the same plan.
fn topological_order(graph: &Graph) -> Result<Vec<NodeId>, CompileError> {
    let mut in_degree: BTreeMap<NodeId, usize> =
        graph.nodes().iter().map(|n| (n.id(), 0)).collect();
    let mut downstream: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();

    for link in graph.links().iter().filter(|l| orders(graph, l)) {
        downstream.entry(link.from.node).or_default().push(link.to.node);
        if let Some(degree) = in_degree.get_mut(&link.to.node) {
            *degree += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<NodeId>> = in_degree
        .iter()
        .filter(|(_, &degree)| degree == 0)
        .map(|(&id, _)| Reverse(id))
        .collect();

    let mut order = Vec::with_capacity(in_degree.len());
    while let Some(Reverse(id)) = ready.pop() {
        order.push(id);
        for next in downstream.get(&id).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(next) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse(*next));
                }
            }
        }
    }

    if order.len() != in_degree.len() {
        let stuck: BTreeSet<NodeId> = in_degree
            .into_iter()
            .filter(|(_, degree)| *degree > 0)
            .map(|(id, _)| id)
            .collect();
        return Err(CompileError::Cycle {
            graph: graph.name().to_string(),
            nodes: on_cycle(&stuck, &downstream),
        });
    }

    Ok(order)
}

/// The nodes of `stuck` that can reach themselves. Kahn leaves everything
/// downstream of a cycle unplaced too; those are not part of the loop.
fn on_cycle(stuck: &BTreeSet<NodeId>, downstream: &BTreeMap<NodeId, Vec<NodeId>>) -> Vec<NodeId> {
    let successors = move |id: NodeId| {
        downstream
            .get(&id)
            .into_iter()
            .flatten()
            .copied()
            .filter(move |next| stuck.contains(next))
    };

    stuck
        .iter()
        .copied()
        .filter(|&start| {
            let mut seen = BTreeSet::new();
            let mut stack: Vec<NodeId> = successors(start).collect();
            while let Some(id) = stack.pop() {
                if id == start {
                    return true;
                }
                if seen.insert(id) {
                    stack.extend(successors(id));
                }
            }
            false
        })
        .collect()
}

/// Nodes from which some sink is reachable (sinks included).
fn live_nodes(graph: &Graph) -> BTreeSet<NodeId> {
    let mut upstream: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
    for link in graph.links() {
        upstream.entry(link.to.node).or_default().push(link.from.node);
    }

    let mut live = BTreeSet::new();
    let mut stack: Vec<NodeId> = graph
        .nodes()
        .iter()
        .filter(|n| n.kind().is_sink())
        .map(|n| n.id())
        .collect();

    while let Some(id) = stack.pop() {
        if live.insert(id) {
            stack.extend(upstream.get(&id).into_iter().flatten().copied());
        }
    }
    live
}

fn indices_where(steps: &[PlanStep], pred: impl Fn(&PlanStep) -> bool) -> Vec<usize> {
    steps
        .iter()
        .enumerate()
        .filter(|(_, s)| pred(s))
        .map(|(i, _)| i)
        .collect()
}
