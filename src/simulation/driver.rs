//! # Render Loop Driver
//!
//! A cooperative loop invoked once per display frame. Each invocation
//! accumulates the elapsed time into fixed simulation steps, applies the
//! display toggles, then hands the scene to a [`FrameSink`] for drawing.
//!
//! The loop keeps being rescheduled until its [`LoopHandle`] is cancelled.
//! Cancellation is checked before any work, so a cancelled loop never
//! touches the scene again.

use std::{cell::Cell, rc::Rc};

use cgmath::{Vector3, Zero};
use rand::Rng;

use super::{
    motion::{policy_for, MotionPolicy, StepContext},
    strike::{strike_object, StrikeScheduler},
};
use crate::{
    config::DisplayToggles,
    scene::{object::ObjectId, scene::Scene, SceneVariant},
};

/// Shared cancellation flag for one scheduled loop
#[derive(Debug, Clone, Default)]
pub struct LoopHandle(Rc<Cell<bool>>);

impl LoopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops all future ticks. Calling it again has no further effect.
    pub fn cancel(&self) {
        if !self.0.replace(true) {
            log::debug!("Render loop cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The loop ran and wants another frame
    Rescheduled,
    Cancelled,
}

/// Receives the scene once per tick, after the simulation has completed
pub trait FrameSink {
    fn draw(&mut self, scene: &Scene);
}

/// Pointer state sampled by the driver at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Pointer in normalized device coordinates
    pub pointer: (f32, f32),
    /// Object held by a drag
    pub held: Option<ObjectId>,
    pub button_down: bool,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            pointer: (0.0, 0.0),
            held: None,
            button_down: false,
        }
    }
}

pub struct FrameLoop {
    policy: Box<dyn MotionPolicy>,
    handle: LoopHandle,
    scheduler: StrikeScheduler,
    accumulated_time: f32,
    last_time: Option<f32>,
    elapsed: f32,
    steps: u64,
}

impl FrameLoop {
    pub const FIXED_STEP: f32 = 1.0 / 60.0;
    /// Longest frame gap fed to the simulation; longer stalls are dropped
    pub const MAX_DELTA: f32 = 0.25;
    pub const CAMERA_SMOOTHING: f32 = 0.03;
    pub const ORBIT_RADIUS: f32 = 20.0;
    pub const ORBIT_RATE: f32 = 0.1;

    pub fn new(variant: SceneVariant) -> Self {
        let policy = policy_for(variant);
        log::debug!("Render loop using {} motion", policy.name());
        Self {
            policy,
            handle: LoopHandle::new(),
            scheduler: StrikeScheduler::new(),
            accumulated_time: 0.0,
            last_time: None,
            elapsed: 0.0,
            steps: 0,
        }
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn scheduler(&self) -> &StrikeScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut StrikeScheduler {
        &mut self.scheduler
    }

    /// Simulated seconds since the loop started
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Fixed steps run so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// One display frame at absolute time `now` (seconds)
    pub fn tick<R: Rng>(
        &mut self,
        now: f32,
        scene: &mut Scene,
        toggles: &DisplayToggles,
        input: &FrameInput,
        rng: &mut R,
        sink: &mut dyn FrameSink,
    ) -> TickOutcome {
        if self.handle.is_cancelled() {
            return TickOutcome::Cancelled;
        }

        let delta = match self.last_time {
            None => Self::FIXED_STEP,
            Some(last) => (now - last).clamp(0.0, Self::MAX_DELTA),
        };
        self.last_time = Some(now);

        self.accumulated_time += delta;
        while self.accumulated_time >= Self::FIXED_STEP {
            self.step(scene, toggles, input, rng);
            self.accumulated_time -= Self::FIXED_STEP;
        }

        apply_toggles(scene, toggles);
        sink.draw(scene);
        TickOutcome::Rescheduled
    }

    /// One fixed simulation step over every object and effect
    pub fn step<R: Rng>(
        &mut self,
        scene: &mut Scene,
        toggles: &DisplayToggles,
        input: &FrameInput,
        rng: &mut R,
    ) {
        self.elapsed += Self::FIXED_STEP;
        self.steps += 1;

        self.scheduler.set_auto(
            toggles.auto_strike && scene.variant() == SceneVariant::Showcase,
            self.elapsed,
        );
        for index in self.scheduler.poll(self.elapsed, scene.objects.len(), rng) {
            strike_object(scene, index, rng);
        }

        scene.clock += Self::FIXED_STEP * toggles.animation_speed;
        let time = scene.clock;
        for (index, object) in scene.objects.iter_mut().enumerate() {
            let ctx = StepContext {
                index,
                time,
                auto_rotate: toggles.auto_rotate,
                held: input.held,
            };
            self.policy.step(object, &ctx);
        }

        scene.bursts.retain_mut(|burst| burst.advance());
        if let Some(field) = scene.ambient_field.as_mut() {
            field.advance();
        }

        match scene.variant() {
            SceneVariant::Drift => {
                let (x, y) = input.pointer;
                scene
                    .camera
                    .drift_toward((x * 3.0, -y * 2.0 + 2.0), Self::CAMERA_SMOOTHING);
                scene.camera.look_at(Vector3::zero());
            }
            SceneVariant::Float if toggles.auto_rotate && !input.button_down => {
                scene.camera.orbit(time * Self::ORBIT_RATE, Self::ORBIT_RADIUS);
                scene.camera.look_at(Vector3::zero());
            }
            _ => {}
        }
    }
}

fn apply_toggles(scene: &mut Scene, toggles: &DisplayToggles) {
    let wireframe = toggles.render_mode.is_wireframe();
    if scene.wireframe() != wireframe {
        log::debug!("Render mode: wireframe={wireframe}");
        scene.set_wireframe(wireframe);
    }
    scene.set_key_light_intensity(toggles.light_intensity);
}
