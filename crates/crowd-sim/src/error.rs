use crowd_brain::InstantiateError;
use crowd_gen::GenerationError;
use crowd_graph::CompileError;
use crowd_sync::SyncError;
use thiserror::Error;

/// Why `start` refused to run. The simulation is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("simulation is already running")]
    ConcurrentStart,

    #[error("invalid frame range {start}..={end}")]
    InvalidFrameRange { start: u64, end: u64 },

    #[error("no generation graph is set")]
    NoGenerationGraph,

    #[error("graph {graph:?} does not compile: {source}")]
    Compile {
        graph: String,
        #[source]
        source: CompileError,
    },

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("agents use brain {name:?}, which is not registered")]
    UnknownBrain { name: String },

    #[error(transparent)]
    NotABrain(#[from] InstantiateError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickError {
    #[error("simulation is not running")]
    NotRunning,

    #[error("simulation was cancelled before frame {frame}")]
    Cancelled { frame: u64 },

    #[error(transparent)]
    Sync(#[from] SyncError),
}
