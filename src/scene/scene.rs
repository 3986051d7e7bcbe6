use super::{
    object::{RenderPart, SceneObject},
    particles::{ImpactBurst, ParticleField, ParticleSprite},
    registry::ObjectRegistry,
    Environment, Light, LightKind, SceneVariant,
};
use crate::gfx::{camera::PerspectiveCamera, resources::ResourceAllocator};

/// The full set of renderable state for one view.
///
/// Exactly one `Scene` is live per mounted view. It owns every GPU handle
/// reachable from it, and [`Scene::release_all`] gives all of them back.
#[derive(Debug)]
pub struct Scene {
    variant: SceneVariant,
    pub objects: ObjectRegistry,
    pub camera: PerspectiveCamera,
    pub lights: Vec<Light>,
    pub environment: Environment,
    pub ambient_field: Option<ParticleField>,
    pub bursts: Vec<ImpactBurst>,
    pub ground: Option<RenderPart>,
    /// Scene time in seconds, already scaled by the animation speed
    pub clock: f32,
    wireframe: bool,
}

impl Scene {
    pub fn new(
        variant: SceneVariant,
        camera: PerspectiveCamera,
        lights: Vec<Light>,
        environment: Environment,
    ) -> Self {
        Self {
            variant,
            objects: ObjectRegistry::new(),
            camera,
            lights,
            environment,
            ambient_field: None,
            bursts: Vec::new(),
            ground: None,
            clock: 0.0,
            wireframe: false,
        }
    }

    pub fn variant(&self) -> SceneVariant {
        self.variant
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    /// Applies the render mode to every object material
    pub fn set_wireframe(&mut self, wireframe: bool) {
        self.wireframe = wireframe;
        for object in self.objects.iter_mut() {
            object.set_wireframe(wireframe);
        }
    }

    /// Sets the intensity of the key (first directional) light
    pub fn set_key_light_intensity(&mut self, intensity: f32) {
        if let Some(light) = self
            .lights
            .iter_mut()
            .find(|l| matches!(l.kind, LightKind::Directional { .. }))
        {
            light.intensity = intensity;
        }
    }

    /// Swaps the registry's objects for `replacement`, releasing every old
    /// object exactly once. Camera, lights and particles are left alone.
    pub fn replace_objects(
        &mut self,
        replacement: Vec<SceneObject>,
        allocator: &mut dyn ResourceAllocator,
    ) -> usize {
        let released = self.release_objects(allocator);
        for mut object in replacement {
            object.set_wireframe(self.wireframe);
            self.objects.add(object);
        }
        released
    }

    pub fn release_objects(&mut self, allocator: &mut dyn ResourceAllocator) -> usize {
        self.objects
            .drain()
            .into_iter()
            .map(|mut object| object.release(allocator))
            .sum()
    }

    /// Releases objects and the ground; calling it again releases nothing
    pub fn release_all(&mut self, allocator: &mut dyn ResourceAllocator) -> usize {
        let mut released = self.release_objects(allocator);
        if let Some(mut ground) = self.ground.take() {
            released += ground.release(allocator);
        }
        self.bursts.clear();
        released
    }

    pub fn sprites(&self) -> impl Iterator<Item = ParticleSprite> + '_ {
        self.ambient_field
            .iter()
            .flat_map(|field| field.sprites())
            .chain(self.bursts.iter().flat_map(|burst| burst.sprites()))
    }
}
