use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crowd_brain::{AgentView, BrainContext, BrainOutputs, NodeEvaluationError};
use crowd_core::{Agent, AgentId, FrameContext, FrameRange, SceneSink, SceneView};
use crowd_gen::generate;
use crowd_graph::{compile, EvaluationPlan, Graph};
use crowd_sync::{SyncManager, WriteOrigin};
use rayon::prelude::*;

use crate::config::SimConfig;
use crate::error::{StartError, TickError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Running,
}

/// Cooperative cancellation for a running simulation.
///
/// The flag is checked between frames, so evaluations already in flight
/// always finish.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn request_stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.requested.store(false, Ordering::SeqCst);
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub evaluated: usize,
    pub failures: Vec<NodeEvaluationError>,
    /// Blackboard keys published at the end of the frame.
    pub committed: usize,
    pub elapsed: Duration,
    pub over_budget: bool,
}

/// Present only while running; dropping it is how `stop` discards state.
#[derive(Debug)]
struct RunState {
    range: FrameRange,
    frame: u64,
    sync: SyncManager,
    /// Parallel to `Simulation::agents`.
    brains: Vec<BrainContext>,
}

enum Outcome {
    Skipped,
    Evaluated(BrainOutputs),
    Failed(NodeEvaluationError),
}

/// Owns the registered graphs, the generated agents and, while running, the
/// simulation state. Host scenes are reached through `S`.
pub struct Simulation<S> {
    config: SimConfig,
    brains: BTreeMap<String, Graph>,
    generation: Option<Graph>,
    scene: S,
    agents: Vec<Agent>,
    state: Option<RunState>,
    stop: StopHandle,
}

impl<S> Simulation<S>
where
    S: SceneView + SceneSink,
{
    pub fn new(config: SimConfig, scene: S) -> Self {
        Self {
            config,
            brains: BTreeMap::new(),
            generation: None,
            scene,
            agents: Vec::new(),
            state: None,
            stop: StopHandle::default(),
        }
    }

    /// Register a brain graph under its own name, replacing any previous one.
    pub fn add_brain(&mut self, graph: Graph) {
        self.brains.insert(graph.name().to_string(), graph);
    }

    pub fn set_generation(&mut self, graph: Graph) {
        self.generation = Some(graph);
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Agents of the last start. They outlive `stop`.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn state(&self) -> ClockState {
        if self.state.is_some() {
            ClockState::Running
        } else {
            ClockState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.is_some()
    }

    /// Frame the next `tick` will simulate.
    pub fn current_frame(&self) -> Option<u64> {
        self.state.as_ref().map(|s| s.frame)
    }

    /// Read a committed blackboard value of the running simulation.
    pub fn blackboard(&self, key: &str) -> Option<f32> {
        self.state.as_ref().and_then(|s| s.sync.read(key))
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Compile every graph, generate agents and build the run state.
    ///
    /// Nothing is mutated unless every step succeeds.
    pub fn start(&mut self, range: FrameRange) -> Result<(), StartError> {
        if self.state.is_some() {
            return Err(StartError::ConcurrentStart);
        }
        if !range.is_valid() {
            return Err(StartError::InvalidFrameRange {
                start: range.start,
                end: range.end,
            });
        }

        let generation = self
            .generation
            .as_ref()
            .ok_or(StartError::NoGenerationGraph)?;
        let plan = compile_graph(generation)?;
        let agents = generate(&plan, &self.scene, self.config.seed)?;

        let mut plans: BTreeMap<&str, Arc<EvaluationPlan>> = BTreeMap::new();
        let mut brains = Vec::with_capacity(agents.len());
        for agent in &agents {
            let plan = match plans.get(agent.brain()) {
                Some(plan) => plan.clone(),
                None => {
                    let graph =
                        self.brains
                            .get(agent.brain())
                            .ok_or_else(|| StartError::UnknownBrain {
                                name: agent.brain().to_string(),
                            })?;
                    let plan = Arc::new(compile_graph(graph)?);
                    plans.insert(graph.name(), plan.clone());
                    plan
                }
            };
            brains.push(BrainContext::instantiate(plan)?);
        }

        let sync = SyncManager::new();
        for (key, value) in &self.config.blackboard {
            sync.seed(key, *value)?;
        }

        tracing::info!(
            start = range.start,
            end = range.end,
            agents = agents.len(),
            brains = plans.len(),
            "simulation started"
        );

        for agent in &agents {
            self.scene.apply(agent);
        }
        self.stop.clear();
        self.agents = agents;
        self.state = Some(RunState {
            range,
            frame: range.start,
            sync,
            brains,
        });
        Ok(())
    }

    /// Take an agent out of the simulation. It keeps its last transform, is
    /// skipped by every later tick and is dropped from the host scene.
    ///
    /// Returns `false` when no live agent has this id.
    pub fn remove_agent(&mut self, id: AgentId) -> bool {
        let Some(agent) = self.agents.iter_mut().find(|a| a.id == id && a.alive) else {
            return false;
        };
        agent.alive = false;
        self.scene.remove(id);
        tracing::debug!(agent = %id, frame = ?self.current_frame(), "agent removed");
        true
    }

    /// Simulate the current frame. Ticking the last frame of the range stops
    /// the simulation.
    pub fn tick(&mut self) -> Result<FrameReport, TickError> {
        let Some(state) = self.state.as_mut() else {
            return Err(TickError::NotRunning);
        };
        let frame = state.frame;
        if self.stop.is_requested() {
            self.stop();
            return Err(TickError::Cancelled { frame });
        }

        let began = Instant::now();
        let ctx = FrameContext::new(frame, self.config.dt_seconds, self.config.seed);
        state.sync.begin_frame(frame)?;

        let sync = &state.sync;
        let evaluate = |(agent, brain): (&mut Agent, &mut BrainContext)| {
            if !agent.alive {
                return Outcome::Skipped;
            }
            agent.evaluations += 1;
            let view = AgentView {
                id: agent.id,
                transform: agent.transform,
            };
            match brain.step(&ctx, &view, sync) {
                Ok(outputs) => {
                    outputs.apply(&mut agent.transform);
                    if outputs.animation.is_some() {
                        agent.animation = outputs.animation;
                    }
                    Outcome::Evaluated(outputs)
                }
                Err(err) => {
                    agent.last_failed_frame = Some(frame);
                    tracing::warn!(
                        agent = %agent.id,
                        node = %err.node,
                        frame,
                        kind = %err.kind,
                        "brain evaluation failed"
                    );
                    Outcome::Failed(err)
                }
            }
        };

        let outcomes: Vec<Outcome> = if self.config.parallel {
            self.agents
                .par_iter_mut()
                .zip(state.brains.par_iter_mut())
                .map(&evaluate)
                .collect()
        } else {
            self.agents
                .iter_mut()
                .zip(state.brains.iter_mut())
                .map(&evaluate)
                .collect()
        };

        let mut evaluated = 0;
        let mut failures = Vec::new();
        for (agent, outcome) in self.agents.iter().zip(outcomes) {
            match outcome {
                Outcome::Skipped => {}
                Outcome::Evaluated(outputs) => {
                    evaluated += 1;
                    stage_writes(sync, agent.id, outputs.writes);
                }
                Outcome::Failed(err) => {
                    evaluated += 1;
                    failures.push(err);
                }
            }
        }

        let committed = state.sync.end_frame(frame)?;
        for agent in self.agents.iter().filter(|a| a.alive) {
            self.scene.apply(agent);
        }

        let elapsed = began.elapsed();
        let budget = Duration::from_millis(self.config.frame_budget_ms);
        let over_budget = self.config.frame_budget_ms > 0 && elapsed > budget;
        if over_budget {
            tracing::warn!(
                frame,
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = self.config.frame_budget_ms,
                "frame over budget"
            );
        }

        if frame >= state.range.end {
            self.stop();
        } else {
            state.frame = frame + 1;
        }

        Ok(FrameReport {
            frame,
            evaluated,
            failures,
            committed,
            elapsed,
            over_budget,
        })
    }

    /// Tick until the range is exhausted or a stop is requested.
    pub fn run_to_end(&mut self) -> Result<Vec<FrameReport>, TickError> {
        let mut reports = Vec::new();
        while self.is_running() {
            match self.tick() {
                Ok(report) => reports.push(report),
                Err(TickError::Cancelled { .. }) => break,
                Err(err) => return Err(err),
            }
        }
        Ok(reports)
    }

    /// Discard the run state. Generated agents are kept.
    pub fn stop(&mut self) {
        if let Some(state) = self.state.take() {
            tracing::info!(
                frame = state.frame,
                agents = self.agents.len(),
                "simulation stopped"
            );
        }
    }
}

fn compile_graph(graph: &Graph) -> Result<EvaluationPlan, StartError> {
    compile(graph).map_err(|source| StartError::Compile {
        graph: graph.name().to_string(),
        source,
    })
}

fn stage_writes(sync: &SyncManager, agent: AgentId, writes: Vec<(String, f32)>) {
    for (sequence, (key, value)) in writes.into_iter().enumerate() {
        sync.write_from(WriteOrigin::agent(agent, sequence as u32), &key, value);
    }
}
