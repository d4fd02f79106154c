//! Execution module.
//!
//! This module handles running convolutions: the engine, the controller
//! that owns pause/resume/cancel, and progress delivery.

pub mod controller;
pub mod engine;
pub mod progress;

pub use controller::{ExecutionController, ExecutionState};
pub use engine::{ConvolutionEngine, Strategy};
pub use progress::{ChannelSink, ProgressSink};
