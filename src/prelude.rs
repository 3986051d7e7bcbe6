//! # Prelude
//!
//! Commonly used types in one import:
//!
//! ```rust
//! use strike_scene::prelude::*;
//!
//! let mut allocator = TrackingAllocator::new();
//! let mut manager = LifecycleManager::new(SceneVariant::Showcase, Some(7));
//! let toggles = DisplayToggles::default();
//!
//! assert!(manager.activate(Some(MountTarget::new(800, 600)), &mut allocator, &toggles).unwrap());
//! assert_eq!(manager.strike(StrikeCommand::Index(0)), 1);
//! manager.deactivate(&mut allocator);
//! assert_eq!(allocator.live(), 0);
//! ```

pub use crate::app::StrikeSceneApp;
pub use crate::config::{DisplayToggles, RenderMode, SceneConfig};
pub use crate::error::{ConfigError, SceneError};

pub use crate::gfx::camera::PerspectiveCamera;
pub use crate::gfx::geometry::GeometryData;
pub use crate::gfx::resources::{MaterialDesc, ResourceAllocator, Shading, TrackingAllocator};

pub use crate::interaction::{CursorHint, PointerController};
pub use crate::lifecycle::{HostEvent, LifecycleManager, MountTarget, StrikeCommand};
pub use crate::scene::{ObjectKind, Scene, SceneBuilder, SceneObject, SceneVariant};
pub use crate::simulation::{FrameLoop, FrameSink, LoopHandle, MotionPolicy, TickOutcome};

pub use cgmath::{InnerSpace, Vector3, Zero};
