//! The simulation clock.
//!
//! [`Simulation`] ties the other crates together: it compiles the registered
//! graphs, generates agents once at [`Simulation::start`], and advances them
//! one frame per [`Simulation::tick`], publishing blackboard writes and agent
//! transforms at each frame boundary.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod error;

pub use clock::{ClockState, FrameReport, Simulation, StopHandle};
pub use config::SimConfig;
pub use diagnostics::{capabilities, Capabilities};
pub use error::{StartError, TickError};
