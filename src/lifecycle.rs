//! # Lifecycle Manager
//!
//! Owns the single live [`SceneSession`] for a mounted view. Activation
//! builds the scene, registers input listeners and starts the render loop.
//! Deactivation runs the same steps in reverse: the loop is cancelled first,
//! listeners are removed, then every GPU handle is released exactly once.
//!
//! Regeneration swaps the object population only; camera, lights, listeners
//! and the running loop are left untouched.

use rand::{rngs::StdRng, SeedableRng};

use crate::{
    config::DisplayToggles,
    error::SceneError,
    gfx::resources::ResourceAllocator,
    interaction::{normalize_pointer, CursorHint, PointerController},
    scene::{builder::SceneBuilder, scene::Scene, SceneVariant},
    simulation::{
        driver::{FrameLoop, FrameSink, LoopHandle, TickOutcome},
        strike::{strike_object, StrikeImpulse},
    },
};

/// Rectangular drawing surface the view is mounted on, in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountTarget {
    pub width: u32,
    pub height: u32,
}

impl MountTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    PointerMove,
    PointerDown,
    PointerUp,
    Resize,
}

impl ListenerKind {
    pub const ALL: [ListenerKind; 4] = [
        ListenerKind::PointerMove,
        ListenerKind::PointerDown,
        ListenerKind::PointerUp,
        ListenerKind::Resize,
    ];
}

/// Input listeners a session has registered with its host
#[derive(Debug, Default)]
pub struct ListenerSet {
    registered: Vec<ListenerKind>,
}

impl ListenerSet {
    pub fn register_all(&mut self) {
        for kind in ListenerKind::ALL {
            if !self.registered.contains(&kind) {
                self.registered.push(kind);
            }
        }
    }

    pub fn remove_all(&mut self) -> usize {
        let removed = self.registered.len();
        self.registered.clear();
        removed
    }

    pub fn is_registered(&self, kind: ListenerKind) -> bool {
        self.registered.contains(&kind)
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }
}

/// Host input, in physical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    PointerMove { x: f64, y: f64 },
    PointerDown { x: f64, y: f64 },
    PointerUp,
    Resize { width: u32, height: u32 },
}

impl HostEvent {
    fn listener(&self) -> ListenerKind {
        match self {
            HostEvent::PointerMove { .. } => ListenerKind::PointerMove,
            HostEvent::PointerDown { .. } => ListenerKind::PointerDown,
            HostEvent::PointerUp => ListenerKind::PointerUp,
            HostEvent::Resize { .. } => ListenerKind::Resize,
        }
    }
}

/// Discrete strike commands from buttons or keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeCommand {
    Index(usize),
    Selected,
    Random,
    All,
}

/// Everything that lives exactly as long as one activation
pub struct SceneSession {
    pub scene: Scene,
    pub frame_loop: FrameLoop,
    pub pointer: PointerController,
    listeners: ListenerSet,
    rng: StdRng,
    surface: MountTarget,
}

impl SceneSession {
    pub fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    pub fn surface(&self) -> MountTarget {
        self.surface
    }
}

pub struct LifecycleManager {
    variant: SceneVariant,
    seed: Option<u64>,
    session: Option<SceneSession>,
}

impl LifecycleManager {
    pub fn new(variant: SceneVariant, seed: Option<u64>) -> Self {
        Self {
            variant,
            seed,
            session: None,
        }
    }

    pub fn variant(&self) -> SceneVariant {
        self.variant
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&SceneSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut SceneSession> {
        self.session.as_mut()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.session.as_ref().map(|s| &s.scene)
    }

    pub fn loop_handle(&self) -> Option<LoopHandle> {
        self.session.as_ref().map(|s| s.frame_loop.handle())
    }

    /// Builds the scene and starts the loop. Returns `Ok(false)` without
    /// doing anything when there is no mount target yet or a session is
    /// already running.
    pub fn activate(
        &mut self,
        mount: Option<MountTarget>,
        allocator: &mut dyn ResourceAllocator,
        toggles: &DisplayToggles,
    ) -> Result<bool, SceneError> {
        let Some(surface) = mount else {
            log::debug!("No mount target yet; activation deferred");
            return Ok(false);
        };
        if self.session.is_some() {
            log::warn!("Activation ignored: a {:?} session is already live", self.variant);
            return Ok(false);
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let count = match self.variant {
            SceneVariant::Float => Some(toggles.object_count),
            _ => None,
        };
        let mut scene = SceneBuilder::new(self.variant, &mut rng).build(allocator, count, surface.aspect())?;
        scene.set_wireframe(toggles.render_mode.is_wireframe());

        let mut listeners = ListenerSet::default();
        listeners.register_all();

        log::info!(
            "Activated {} with {} objects on {}x{}",
            self.variant.title(),
            scene.objects.len(),
            surface.width,
            surface.height
        );
        self.session = Some(SceneSession {
            scene,
            frame_loop: FrameLoop::new(self.variant),
            pointer: PointerController::new(),
            listeners,
            rng,
            surface,
        });
        Ok(true)
    }

    /// Cancels the loop, removes listeners and releases every resource.
    /// Returns how many handles were released; a second call releases none.
    pub fn deactivate(&mut self, allocator: &mut dyn ResourceAllocator) -> usize {
        let Some(mut session) = self.session.take() else {
            return 0;
        };

        session.frame_loop.handle().cancel();
        let listeners = session.listeners.remove_all();
        let released = session.scene.release_all(allocator);

        log::info!(
            "Deactivated {}: removed {listeners} listeners, released {released} handles",
            self.variant.title()
        );
        released
    }

    /// Deactivates, switches variant and activates again on the same mount
    pub fn switch_variant(
        &mut self,
        variant: SceneVariant,
        allocator: &mut dyn ResourceAllocator,
        toggles: &DisplayToggles,
    ) -> Result<bool, SceneError> {
        let mount = self.session.as_ref().map(|s| s.surface);
        self.deactivate(allocator);
        self.variant = variant;
        self.activate(mount, allocator, toggles)
    }

    /// Replaces the object population with a fresh one. The new objects are
    /// built before the old ones are released, so a failed build leaves the
    /// scene as it was. Returns the number of handles released.
    pub fn regenerate(
        &mut self,
        count: Option<usize>,
        allocator: &mut dyn ResourceAllocator,
    ) -> Result<usize, SceneError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(0);
        };

        let objects = SceneBuilder::new(self.variant, &mut session.rng).build_objects(allocator, count)?;
        let released = session.scene.replace_objects(objects, allocator);
        session.pointer.reset();
        session.frame_loop.scheduler_mut().clear();

        log::info!(
            "Regenerated {} objects, released {released} handles",
            session.scene.objects.len()
        );
        Ok(released)
    }

    /// Routes a host event to the session; events for listeners that are
    /// not registered are dropped
    pub fn dispatch(&mut self, event: HostEvent) -> Option<CursorHint> {
        let session = self.session.as_mut()?;
        if !session.listeners.is_registered(event.listener()) {
            return None;
        }

        let MountTarget { width, height } = session.surface;
        match event {
            HostEvent::PointerMove { x, y } => {
                let pointer = normalize_pointer(x, y, width, height);
                Some(session.pointer.on_move(pointer, &mut session.scene))
            }
            HostEvent::PointerDown { x, y } => {
                let pointer = normalize_pointer(x, y, width, height);
                session.pointer.on_down(pointer, &mut session.scene, &mut session.rng);
                Some(session.pointer.cursor())
            }
            HostEvent::PointerUp => {
                session.pointer.on_up(&mut session.scene, &mut session.rng);
                Some(session.pointer.cursor())
            }
            HostEvent::Resize { width, height } => {
                if width > 0 && height > 0 {
                    session.surface = MountTarget::new(width, height);
                    session.scene.camera.resize(width, height);
                }
                None
            }
        }
    }

    /// Runs one frame; an inactive manager reports `Cancelled`
    pub fn tick(&mut self, now: f32, toggles: &DisplayToggles, sink: &mut dyn FrameSink) -> TickOutcome {
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Cancelled;
        };
        let input = session.pointer.frame_input();
        session
            .frame_loop
            .tick(now, &mut session.scene, toggles, &input, &mut session.rng, sink)
    }

    /// Applies a strike command. Returns how many objects were struck or
    /// queued.
    pub fn strike(&mut self, command: StrikeCommand) -> usize {
        use rand::Rng;

        let Some(session) = self.session.as_mut() else {
            return 0;
        };
        let count = session.scene.objects.len();
        if count == 0 {
            return 0;
        }

        let index = match command {
            StrikeCommand::Index(index) => index,
            StrikeCommand::Selected => {
                match session.pointer.selected().and_then(|id| session.scene.objects.index_of(id)) {
                    Some(index) => index,
                    None => return 0,
                }
            }
            StrikeCommand::Random => session.rng.random_range(0..count),
            StrikeCommand::All => {
                return match self.variant {
                    SceneVariant::Showcase => {
                        let now = session.frame_loop.elapsed();
                        session.frame_loop.scheduler_mut().schedule_all(now, count);
                        count
                    }
                    SceneVariant::Drift => {
                        let impulse = StrikeImpulse::default();
                        for object in session.scene.objects.iter_mut() {
                            impulse.apply(object, &mut session.rng);
                        }
                        count
                    }
                    SceneVariant::Float => 0,
                };
            }
        };

        usize::from(strike_object(&mut session.scene, index, &mut session.rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gfx::{
            geometry::GeometryData,
            resources::{GeometryHandle, MaterialDesc, MaterialHandle, TrackingAllocator},
        },
        scene::object::ObjectId,
    };
    use std::collections::HashSet;

    struct NullSink;

    impl FrameSink for NullSink {
        fn draw(&mut self, _scene: &Scene) {}
    }

    /// Counts releases that happen while the watched loop is still running
    struct CancelWatcher {
        inner: TrackingAllocator,
        watched: Option<LoopHandle>,
        released_while_running: usize,
    }

    impl CancelWatcher {
        fn new() -> Self {
            Self {
                inner: TrackingAllocator::new(),
                watched: None,
                released_while_running: 0,
            }
        }

        fn check(&mut self) {
            if self.watched.as_ref().is_some_and(|h| !h.is_cancelled()) {
                self.released_while_running += 1;
            }
        }
    }

    impl ResourceAllocator for CancelWatcher {
        fn create_geometry(&mut self, data: &GeometryData) -> Result<GeometryHandle, SceneError> {
            self.inner.create_geometry(data)
        }

        fn create_material(&mut self, desc: &MaterialDesc) -> Result<MaterialHandle, SceneError> {
            self.inner.create_material(desc)
        }

        fn release_geometry(&mut self, handle: GeometryHandle) {
            self.check();
            self.inner.release_geometry(handle);
        }

        fn release_material(&mut self, handle: MaterialHandle) {
            self.check();
            self.inner.release_material(handle);
        }
    }

    fn mount() -> Option<MountTarget> {
        Some(MountTarget::new(800, 600))
    }

    #[test]
    fn test_missing_mount_is_a_no_op() {
        let mut allocator = TrackingAllocator::new();
        let mut manager = LifecycleManager::new(SceneVariant::Drift, Some(1));

        assert!(!manager.activate(None, &mut allocator, &DisplayToggles::default()).unwrap());
        assert!(!manager.is_active());
        assert_eq!(allocator.created(), 0);
        assert_eq!(manager.tick(0.0, &DisplayToggles::default(), &mut NullSink), TickOutcome::Cancelled);
    }

    #[test]
    fn test_activate_registers_listeners() {
        let mut allocator = TrackingAllocator::new();
        let mut manager = LifecycleManager::new(SceneVariant::Drift, Some(2));
        assert!(manager.activate(mount(), &mut allocator, &DisplayToggles::default()).unwrap());

        let session = manager.session().unwrap();
        assert_eq!(session.listeners().len(), ListenerKind::ALL.len());
        assert_eq!(session.scene.objects.len(), 12);
        assert!(allocator.live() > 0);

        // A second activation does not build a second scene
        let live = allocator.live();
        assert!(!manager.activate(mount(), &mut allocator, &DisplayToggles::default()).unwrap());
        assert_eq!(allocator.live(), live);
    }

    #[test]
    fn test_cancel_precedes_disposal() {
        let mut allocator = CancelWatcher::new();
        let mut manager = LifecycleManager::new(SceneVariant::Showcase, Some(3));
        manager.activate(mount(), &mut allocator, &DisplayToggles::default()).unwrap();
        let handle = manager.loop_handle().unwrap();
        allocator.watched = Some(handle.clone());

        let released = manager.deactivate(&mut allocator);

        assert!(released > 0);
        assert!(handle.is_cancelled());
        assert_eq!(allocator.released_while_running, 0);
        assert_eq!(allocator.inner.live(), 0);
    }

    #[test]
    fn test_double_deactivate_is_harmless() {
        let mut allocator = TrackingAllocator::new();
        let mut manager = LifecycleManager::new(SceneVariant::Float, Some(4));
        manager.activate(mount(), &mut allocator, &DisplayToggles::default()).unwrap();
        let handle = manager.loop_handle().unwrap();

        assert!(manager.deactivate(&mut allocator) > 0);
        assert_eq!(manager.deactivate(&mut allocator), 0);
        assert_eq!(allocator.live(), 0);
        assert_eq!(allocator.created(), allocator.released());
        assert!(handle.is_cancelled());
        assert!(manager.dispatch(HostEvent::PointerUp).is_none());
    }

    #[test]
    fn test_regenerate_swaps_objects_only() {
        let mut allocator = TrackingAllocator::new();
        let mut manager = LifecycleManager::new(SceneVariant::Float, Some(5));
        manager.activate(mount(), &mut allocator, &DisplayToggles::default()).unwrap();

        let (camera, lights_ptr, lights, old_ids, old_live) = {
            let scene = manager.scene().unwrap();
            let ids: HashSet<ObjectId> = scene.objects.iter().map(|o| o.id()).collect();
            (scene.camera.clone(), scene.lights.as_ptr(), scene.lights.clone(), ids, allocator.live())
        };
        let handle = manager.loop_handle().unwrap();

        let released = manager.regenerate(Some(13), &mut allocator).unwrap();

        let scene = manager.scene().unwrap();
        assert_eq!(scene.objects.len(), 13);
        assert_eq!(released, old_live - 2);
        assert!(scene.objects.iter().all(|o| !old_ids.contains(&o.id())));
        assert_eq!(scene.camera, camera);
        assert_eq!(scene.lights.as_ptr(), lights_ptr);
        assert_eq!(scene.lights, lights);
        assert!(!handle.is_cancelled());
        assert_eq!(manager.session().unwrap().listeners().len(), 4);
        // Ground plane stays: one geometry plus one material
        assert_eq!(allocator.live(), 2 + 13 * 2);
    }

    #[test]
    fn test_dispatch_routes_pointer_and_resize() {
        let mut allocator = TrackingAllocator::new();
        let mut manager = LifecycleManager::new(SceneVariant::Showcase, Some(6));
        manager.activate(mount(), &mut allocator, &DisplayToggles::default()).unwrap();

        // Screen center looks at the middle showcase object
        manager.dispatch(HostEvent::PointerDown { x: 400.0, y: 300.0 });
        manager.dispatch(HostEvent::PointerUp);
        let scene = manager.scene().unwrap();
        assert!(scene.objects.at(2).unwrap().is_struck());

        manager.dispatch(HostEvent::Resize { width: 1000, height: 500 });
        let session = manager.session().unwrap();
        assert_eq!(session.surface(), MountTarget::new(1000, 500));
        assert_eq!(session.scene.camera.aspect, 2.0);
    }

    #[test]
    fn test_strike_commands() {
        let mut allocator = TrackingAllocator::new();
        let mut manager = LifecycleManager::new(SceneVariant::Showcase, Some(7));
        manager.activate(mount(), &mut allocator, &DisplayToggles::default()).unwrap();

        assert_eq!(manager.strike(StrikeCommand::Index(0)), 1);
        assert_eq!(manager.strike(StrikeCommand::Index(0)), 0);
        assert_eq!(manager.strike(StrikeCommand::Selected), 0);
        assert_eq!(manager.strike(StrikeCommand::All), 5);
        assert_eq!(manager.session().unwrap().frame_loop.scheduler().pending(), 5);
    }
}
