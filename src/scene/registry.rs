//! # Object Registry
//!
//! Ordered, stable-identity collection of [`SceneObject`]s with an O(1)
//! lookup from render node to owning object for hit-test resolution.

use std::collections::HashMap;

use super::object::{NodeHandle, ObjectId, SceneObject};

#[derive(Debug, Default)]
pub struct ObjectRegistry {
    objects: Vec<SceneObject>,
    node_owners: HashMap<NodeHandle, ObjectId>,
    next_object: u64,
    next_node: u64,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a fresh identity to `object` and its parts, then appends it
    pub fn add(&mut self, mut object: SceneObject) -> ObjectId {
        self.next_object += 1;
        let id = ObjectId(self.next_object);
        object.set_id(id);

        for part in object.parts_mut() {
            self.next_node += 1;
            let node = NodeHandle(self.next_node);
            part.set_node(node);
            self.node_owners.insert(node, id);
        }

        self.objects.push(object);
        id
    }

    /// Removes the object with `id`, keeping every other identity and the
    /// insertion order intact. The caller releases the returned object.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.index_of(id)?;
        let object = self.objects.remove(index);
        for part in object.parts() {
            self.node_owners.remove(&part.node());
        }
        Some(object)
    }

    /// Empties the registry, handing every object back for release.
    /// Identities keep counting up so none is reused this session.
    pub fn drain(&mut self) -> Vec<SceneObject> {
        self.node_owners.clear();
        std::mem::take(&mut self.objects)
    }

    pub fn owner_of(&self, node: NodeHandle) -> Option<ObjectId> {
        self.node_owners.get(&node).copied()
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id() == id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    pub fn at(&self, index: usize) -> Option<&SceneObject> {
        self.objects.get(index)
    }

    pub fn at_mut(&mut self, index: usize) -> Option<&mut SceneObject> {
        self.objects.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gfx::{
            geometry::generate_box,
            resources::{MaterialDesc, TrackingAllocator},
        },
        scene::object::{ObjectKind, PrimitiveShape, RenderPart, Transform},
    };

    fn object(allocator: &mut TrackingAllocator, parts: usize) -> SceneObject {
        let parts = (0..parts)
            .map(|_| {
                RenderPart::allocate(allocator, &generate_box(1.0, 1.0, 1.0), MaterialDesc::default())
                    .unwrap()
            })
            .collect();
        SceneObject::new(ObjectKind::Primitive(PrimitiveShape::Box), Transform::default(), parts)
    }

    #[test]
    fn test_insertion_order_and_node_lookup() {
        let mut allocator = TrackingAllocator::new();
        let mut registry = ObjectRegistry::new();
        let a = registry.add(object(&mut allocator, 1));
        let b = registry.add(object(&mut allocator, 3));

        let ids: Vec<_> = registry.iter().map(|o| o.id()).collect();
        assert_eq!(ids, vec![a, b]);

        for part in registry.get(b).unwrap().parts() {
            assert_eq!(registry.owner_of(part.node()), Some(b));
        }
    }

    #[test]
    fn test_remove_keeps_other_identities() {
        let mut allocator = TrackingAllocator::new();
        let mut registry = ObjectRegistry::new();
        let a = registry.add(object(&mut allocator, 1));
        let b = registry.add(object(&mut allocator, 1));
        let c = registry.add(object(&mut allocator, 1));

        let mut removed = registry.remove(b).unwrap();
        let removed_node = removed.parts()[0].node();
        removed.release(&mut allocator);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.index_of(a), Some(0));
        assert_eq!(registry.index_of(c), Some(1));
        assert_eq!(registry.owner_of(removed_node), None);
        assert!(registry.remove(b).is_none());
    }

    #[test]
    fn test_identities_not_reused_after_drain() {
        let mut allocator = TrackingAllocator::new();
        let mut registry = ObjectRegistry::new();
        let first = registry.add(object(&mut allocator, 1));
        for mut old in registry.drain() {
            old.release(&mut allocator);
        }
        let second = registry.add(object(&mut allocator, 1));
        assert_ne!(first, second);
        assert!(registry.get(first).is_none());
    }
}
