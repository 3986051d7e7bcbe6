//! # Pointer Interaction
//!
//! Turns pointer move/down/up events into hover feedback, strikes and
//! free-drag on the live scene. Each handler runs to completion between
//! ticks, so the render loop never observes a half-applied event.
//!
//! | Variant  | Hover                      | Pointer down          | Drag                 |
//! |----------|----------------------------|-----------------------|----------------------|
//! | Drift    | scale 1.2, kind tint       | random impulse        | -                    |
//! | Float    | selection and cursor only  | grab, yellow tint     | follows the pointer  |
//! | Showcase | selection and cursor only  | strike timeline       | -                    |

use cgmath::Vector3;
use rand::Rng;

use crate::{
    gfx::picking::{ObjectPicker, Ray},
    scene::{
        builder::random_surface,
        object::{Highlight, ObjectId},
        scene::Scene,
        SceneVariant,
    },
    simulation::{
        driver::FrameInput,
        strike::{strike_object, StrikeImpulse},
    },
};

/// Cursor style requested from the host window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    /// Something under the pointer can be struck or grabbed
    Pointer,
    Grabbing,
}

/// Maps a window position in physical pixels to normalized device coordinates
/// (x right, y up, both in [-1, 1])
pub fn normalize_pointer(x: f64, y: f64, width: u32, height: u32) -> (f32, f32) {
    let width = width.max(1) as f64;
    let height = height.max(1) as f64;
    (
        ((x / width) * 2.0 - 1.0) as f32,
        (-(y / height) * 2.0 + 1.0) as f32,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    object: ObjectId,
    /// Ray distance to the grab point when the drag started
    distance: f32,
    /// Object position relative to the grab point
    offset: Vector3<f32>,
}

#[derive(Debug)]
pub struct PointerController {
    picker: ObjectPicker,
    pointer: (f32, f32),
    selected: Option<ObjectId>,
    drag: Option<Drag>,
    button_down: bool,
    cursor: CursorHint,
    impulse: StrikeImpulse,
    pub hover_scale: f32,
    /// Lowest height a dragged object may be pulled to
    pub min_drag_height: f32,
}

impl Default for PointerController {
    fn default() -> Self {
        Self {
            picker: ObjectPicker::new(),
            pointer: (0.0, 0.0),
            selected: None,
            drag: None,
            button_down: false,
            cursor: CursorHint::Default,
            impulse: StrikeImpulse::default(),
            hover_scale: 1.2,
            min_drag_height: -2.0,
        }
    }
}

impl PointerController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer(&self) -> (f32, f32) {
        self.pointer
    }

    pub fn selected(&self) -> Option<ObjectId> {
        self.selected
    }

    pub fn dragging(&self) -> Option<ObjectId> {
        self.drag.map(|d| d.object)
    }

    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    /// Pointer state for the next tick
    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            pointer: self.pointer,
            held: self.dragging(),
            button_down: self.button_down,
        }
    }

    pub fn on_move(&mut self, pointer: (f32, f32), scene: &mut Scene) -> CursorHint {
        self.pointer = pointer;
        let ray = Ray::from_camera(pointer, &scene.camera);

        if let Some(drag) = self.drag {
            self.follow(drag, &ray, scene);
            self.cursor = CursorHint::Grabbing;
            return self.cursor;
        }
        if self.button_down {
            return self.cursor;
        }

        let hit = self.picker.pick(&ray, &scene.objects).map(|result| result.object);
        self.selected = hit;

        if scene.variant() == SceneVariant::Drift {
            for object in scene.objects.iter_mut() {
                object.target_scale = object.base_scale;
                if object.highlight() != Highlight::None {
                    object.set_highlight(Highlight::None);
                }
            }
            if let Some(object) = hit.and_then(|id| scene.objects.get_mut(id)) {
                object.target_scale = self.hover_scale;
                object.set_highlight(Highlight::Hover);
            }
        }

        self.cursor = if hit.is_some() {
            CursorHint::Pointer
        } else {
            CursorHint::Default
        };
        self.cursor
    }

    /// Returns the object hit, if any
    pub fn on_down<R: Rng>(
        &mut self,
        pointer: (f32, f32),
        scene: &mut Scene,
        rng: &mut R,
    ) -> Option<ObjectId> {
        self.pointer = pointer;
        self.button_down = true;
        let ray = Ray::from_camera(pointer, &scene.camera);
        let hit = self.picker.pick(&ray, &scene.objects)?;

        let index = scene.objects.index_of(hit.object)?;
        match scene.variant() {
            SceneVariant::Drift => {
                if let Some(object) = scene.objects.at_mut(index) {
                    self.impulse.apply(object, rng);
                }
            }
            SceneVariant::Float => {
                if let Some(object) = scene.objects.at_mut(index) {
                    object.set_highlight(Highlight::Drag);
                    self.drag = Some(Drag {
                        object: hit.object,
                        distance: hit.distance,
                        offset: object.transform.position - hit.intersection_point,
                    });
                    self.cursor = CursorHint::Grabbing;
                }
            }
            SceneVariant::Showcase => {
                strike_object(scene, index, rng);
            }
        }

        log::debug!("Pointer down on {}", hit.object);
        self.selected = Some(hit.object);
        Some(hit.object)
    }

    pub fn on_up<R: Rng>(&mut self, scene: &mut Scene, rng: &mut R) {
        self.button_down = false;
        self.selected = None;

        if let Some(drag) = self.drag.take() {
            // The float motion pulls the object back to its rest position
            if let Some(object) = scene.objects.get_mut(drag.object) {
                object.restyle(random_surface(rng));
                log::debug!("Released {} at {:?}", drag.object, object.transform.position);
            }
            self.cursor = CursorHint::Pointer;
        }
    }

    /// Forgets any selection or drag, e.g. after the objects were replaced
    pub fn reset(&mut self) {
        self.selected = None;
        self.drag = None;
        self.button_down = false;
        self.cursor = CursorHint::Default;
    }

    fn follow(&self, drag: Drag, ray: &Ray, scene: &mut Scene) {
        let Some(object) = scene.objects.get_mut(drag.object) else {
            return;
        };
        let grab_point = match self.picker.pick_single(ray, object) {
            Some(hit) => hit.intersection_point,
            None => ray.point_at(drag.distance),
        };
        let mut position = grab_point + drag.offset;
        position.y = position.y.max(self.min_drag_height);
        object.transform.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gfx::{
            camera::PerspectiveCamera,
            geometry::{generate_box, generate_torus},
            resources::{MaterialDesc, TrackingAllocator},
        },
        scene::{
            object::{ObjectKind, PrimitiveShape, RenderPart, SceneObject, Transform},
            Environment,
        },
    };
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    /// Five unit boxes at x = -4, -2, 0, 2, 4 seen head-on from z = 10
    fn row(variant: SceneVariant, allocator: &mut TrackingAllocator) -> Scene {
        let camera = PerspectiveCamera::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, 0.0), 60.0, 1.0);
        let environment = Environment { background: [0.0; 3], fog: None };
        let mut scene = Scene::new(variant, camera, Vec::new(), environment);
        for i in 0..5 {
            let part = RenderPart::allocate(allocator, &generate_box(1.0, 1.0, 1.0), MaterialDesc::default()).unwrap();
            let position = Vector3::new(i as f32 * 2.0 - 4.0, 0.0, 0.0);
            scene.objects.add(SceneObject::new(
                ObjectKind::Primitive(PrimitiveShape::Box),
                Transform::at(position),
                vec![part],
            ));
        }
        scene
    }

    #[test]
    fn test_normalize_pointer() {
        assert_eq!(normalize_pointer(0.0, 0.0, 800, 600), (-1.0, 1.0));
        assert_eq!(normalize_pointer(400.0, 300.0, 800, 600), (0.0, 0.0));
        assert_eq!(normalize_pointer(800.0, 600.0, 800, 600), (1.0, -1.0));
    }

    #[test]
    fn test_pointer_down_changes_only_hit_object() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut allocator = TrackingAllocator::new();
        let mut scene = row(SceneVariant::Drift, &mut allocator);
        let before: Vec<_> = scene
            .objects
            .iter()
            .map(|o| (o.energy(), o.velocity, o.target_scale))
            .collect();

        let mut controller = PointerController::new();
        let hit = controller.on_down((0.0, 0.0), &mut scene, &mut rng);
        assert_eq!(hit, scene.objects.at(2).map(|o| o.id()));

        for (i, object) in scene.objects.iter().enumerate() {
            let state = (object.energy(), object.velocity, object.target_scale);
            if i == 2 {
                assert_relative_eq!(object.energy(), 0.5);
                assert_ne!(object.velocity, before[i].1);
                assert_relative_eq!(object.target_scale, 1.5);
                assert_eq!(object.highlight(), Highlight::Strike);
            } else {
                assert_eq!(state, before[i]);
                assert_eq!(object.highlight(), Highlight::None);
            }
        }
    }

    #[test]
    fn test_hover_is_deterministic_and_exclusive() {
        let mut allocator = TrackingAllocator::new();
        let mut scene = row(SceneVariant::Drift, &mut allocator);
        let mut controller = PointerController::new();

        let first = controller.on_move((0.0, 0.0), &mut scene);
        let selected = controller.selected();
        for _ in 0..10 {
            assert_eq!(controller.on_move((0.0, 0.0), &mut scene), first);
            assert_eq!(controller.selected(), selected);
        }
        assert_eq!(first, CursorHint::Pointer);
        assert_eq!(selected, scene.objects.at(2).map(|o| o.id()));

        let hovered: Vec<_> = scene
            .objects
            .iter()
            .filter(|o| o.highlight() == Highlight::Hover)
            .map(|o| o.id())
            .collect();
        assert_eq!(hovered, vec![selected.unwrap()]);
        assert_relative_eq!(scene.objects.at(2).unwrap().target_scale, 1.2);
    }

    #[test]
    fn test_miss_clears_hover_state() {
        let mut allocator = TrackingAllocator::new();
        let mut scene = row(SceneVariant::Drift, &mut allocator);
        let mut controller = PointerController::new();

        controller.on_move((0.0, 0.0), &mut scene);
        let cursor = controller.on_move((0.0, 0.9), &mut scene);

        assert_eq!(cursor, CursorHint::Default);
        assert_eq!(controller.selected(), None);
        for object in scene.objects.iter() {
            assert_eq!(object.highlight(), Highlight::None);
            assert_relative_eq!(object.target_scale, object.base_scale);
        }
    }

    #[test]
    fn test_float_hover_leaves_objects_alone() {
        let mut allocator = TrackingAllocator::new();
        let mut scene = row(SceneVariant::Float, &mut allocator);
        let mut controller = PointerController::new();

        assert_eq!(controller.on_move((0.0, 0.0), &mut scene), CursorHint::Pointer);
        assert_eq!(controller.selected(), scene.objects.at(2).map(|o| o.id()));
        for object in scene.objects.iter() {
            assert_eq!(object.highlight(), Highlight::None);
            assert_relative_eq!(object.target_scale, object.base_scale);
        }
    }

    #[test]
    fn test_rotated_bar_only_hit_on_its_geometry() {
        let mut rng = StdRng::seed_from_u64(15);
        let mut allocator = TrackingAllocator::new();
        let camera = PerspectiveCamera::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, 0.0), 60.0, 1.0);
        let environment = Environment { background: [0.0; 3], fog: None };
        let mut scene = Scene::new(SceneVariant::Drift, camera, Vec::new(), environment);

        let part = RenderPart::allocate(&mut allocator, &generate_box(2.5, 0.5, 0.5), MaterialDesc::default()).unwrap();
        let mut transform = Transform::at(Vector3::new(0.0, 0.0, 0.0));
        transform.rotation.z = std::f32::consts::FRAC_PI_4;
        let bar = scene.objects.add(SceneObject::new(ObjectKind::Cross, transform, vec![part]));

        // (0.9, 0, 0) sits inside the bar's world box but 0.64 away from its axis
        let beside = project(&scene, Vector3::new(0.9, 0.0, 0.0));
        let mut controller = PointerController::new();
        assert_eq!(controller.on_move(beside, &mut scene), CursorHint::Default);
        assert_eq!(controller.on_down(beside, &mut scene, &mut rng), None);
        controller.on_up(&mut scene, &mut rng);
        assert_relative_eq!(scene.objects.get(bar).unwrap().energy(), 0.0);

        let on_axis = project(&scene, Vector3::new(0.6, 0.6, 0.0));
        assert_eq!(controller.on_down(on_axis, &mut scene, &mut rng), Some(bar));
    }

    #[test]
    fn test_pointer_through_torus_hole_misses() {
        let mut allocator = TrackingAllocator::new();
        let camera = PerspectiveCamera::new(Vector3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, 0.0), 60.0, 1.0);
        let environment = Environment { background: [0.0; 3], fog: None };
        let mut scene = Scene::new(SceneVariant::Drift, camera, Vec::new(), environment);

        let part = RenderPart::allocate(&mut allocator, &generate_torus(0.6, 0.2, 16, 48), MaterialDesc::default()).unwrap();
        // The ring lies in the XY plane, hole facing the camera
        let transform = Transform::at(Vector3::new(0.0, 0.0, 0.0));
        scene.objects.add(SceneObject::new(ObjectKind::Primitive(PrimitiveShape::Torus), transform, vec![part]));

        let mut controller = PointerController::new();
        assert_eq!(controller.on_move((0.0, 0.0), &mut scene), CursorHint::Default);
        let rim = project(&scene, Vector3::new(0.6, 0.0, 0.0));
        assert_eq!(controller.on_move(rim, &mut scene), CursorHint::Pointer);
    }

    /// Pointer coordinates that put `point` under the cursor
    fn project(scene: &Scene, point: Vector3<f32>) -> (f32, f32) {
        let clip = scene.camera.projection_matrix() * scene.camera.view_matrix() * point.extend(1.0);
        (clip.x / clip.w, clip.y / clip.w)
    }

    #[test]
    fn test_showcase_hover_only_selects() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut allocator = TrackingAllocator::new();
        let mut scene = row(SceneVariant::Showcase, &mut allocator);
        let mut controller = PointerController::new();

        assert_eq!(controller.on_move((0.0, 0.0), &mut scene), CursorHint::Pointer);
        assert!(scene.objects.iter().all(|o| o.highlight() == Highlight::None));

        controller.on_down((0.0, 0.0), &mut scene, &mut rng);
        assert!(scene.objects.at(2).unwrap().is_struck());
        assert!(!scene.objects.at(1).unwrap().is_struck());
    }

    #[test]
    fn test_drag_is_clamped_and_released_to_rest_position() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut allocator = TrackingAllocator::new();
        let mut scene = row(SceneVariant::Float, &mut allocator);
        let mut controller = PointerController::new();

        let held = controller.on_down((0.0, 0.0), &mut scene, &mut rng).unwrap();
        let rest = scene.objects.get(held).unwrap().original_position;
        assert_eq!(controller.dragging(), Some(held));
        assert_eq!(controller.frame_input().held, Some(held));
        assert_eq!(scene.objects.get(held).unwrap().highlight(), Highlight::Drag);

        controller.on_move((0.0, -0.9), &mut scene);
        let dropped = scene.objects.get(held).unwrap().transform.position;
        assert_eq!(dropped.y, -2.0);

        controller.on_up(&mut scene, &mut rng);
        let object = scene.objects.get(held).unwrap();
        assert_eq!(controller.dragging(), None);
        assert_eq!(object.original_position, rest);
        assert_ne!(object.original_position, dropped);
        assert_eq!(object.highlight(), Highlight::None);
        assert_ne!(object.parts()[0].surface.color, crate::gfx::resources::hex_color(0xffff00));
    }

    #[test]
    fn test_drag_keeps_grab_offset() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut allocator = TrackingAllocator::new();
        let mut scene = row(SceneVariant::Float, &mut allocator);
        let mut controller = PointerController::new();

        let held = controller.on_down((0.0, 0.0), &mut scene, &mut rng).unwrap();
        for _ in 0..5 {
            controller.on_move((0.0, 0.0), &mut scene);
        }
        let position = scene.objects.get(held).unwrap().transform.position;
        assert_relative_eq!(position.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(position.z, 0.0, epsilon = 1e-4);
    }
}
