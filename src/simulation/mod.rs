// src/simulation/mod.rs
//! Simulation system
//!
//! Per-tick motion for every scene variant, strikes and their scheduling,
//! and the fixed-timestep loop that drives both.

pub mod driver;
pub mod motion;
pub mod strike;

pub use driver::{FrameInput, FrameLoop, FrameSink, LoopHandle, TickOutcome};
pub use motion::{policy_for, DriftMotion, FloatMotion, MotionPolicy, ShowcaseMotion, StepContext};
pub use strike::{strike_object, StrikeImpulse, StrikeScheduler, StrikeTimeline};
