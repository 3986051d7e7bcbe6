use std::collections::HashSet;

use super::{GeometryHandle, MaterialDesc, MaterialHandle, ResourceAllocator};
use crate::{error::SceneError, gfx::geometry::GeometryData};

/// Allocator without a GPU behind it.
///
/// Records every live handle and panics on a double release or on releasing a
/// handle it never issued, which turns lifecycle bugs into test failures.
#[derive(Debug, Default)]
pub struct TrackingAllocator {
    next: u64,
    live_geometries: HashSet<GeometryHandle>,
    live_materials: HashSet<MaterialHandle>,
    created: usize,
    released: usize,
    /// When set, the next geometry allocation fails
    pub fail_next_geometry: bool,
}

impl TrackingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_geometries(&self) -> usize {
        self.live_geometries.len()
    }

    pub fn live_materials(&self) -> usize {
        self.live_materials.len()
    }

    pub fn live(&self) -> usize {
        self.live_geometries() + self.live_materials()
    }

    pub fn created(&self) -> usize {
        self.created
    }

    pub fn released(&self) -> usize {
        self.released
    }

    pub fn is_live_geometry(&self, handle: GeometryHandle) -> bool {
        self.live_geometries.contains(&handle)
    }

    fn next_raw(&mut self) -> u64 {
        self.next += 1;
        self.created += 1;
        self.next
    }
}

impl ResourceAllocator for TrackingAllocator {
    fn create_geometry(&mut self, data: &GeometryData) -> Result<GeometryHandle, SceneError> {
        if self.fail_next_geometry {
            self.fail_next_geometry = false;
            return Err(SceneError::Allocation {
                kind: "geometry",
                reason: format!("refused {} vertices", data.vertex_count()),
            });
        }
        let handle = GeometryHandle(self.next_raw());
        self.live_geometries.insert(handle);
        Ok(handle)
    }

    fn create_material(&mut self, _desc: &MaterialDesc) -> Result<MaterialHandle, SceneError> {
        let handle = MaterialHandle(self.next_raw());
        self.live_materials.insert(handle);
        Ok(handle)
    }

    fn release_geometry(&mut self, handle: GeometryHandle) {
        assert!(
            self.live_geometries.remove(&handle),
            "geometry {handle:?} released twice or never allocated"
        );
        self.released += 1;
    }

    fn release_material(&mut self, handle: MaterialHandle) {
        assert!(
            self.live_materials.remove(&handle),
            "material {handle:?} released twice or never allocated"
        );
        self.released += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_box;

    #[test]
    fn test_counts_live_handles() {
        let mut allocator = TrackingAllocator::new();
        let geometry = allocator.create_geometry(&generate_box(1.0, 1.0, 1.0)).unwrap();
        let material = allocator.create_material(&MaterialDesc::default()).unwrap();
        assert_eq!(allocator.live(), 2);

        allocator.release_geometry(geometry);
        allocator.release_material(material);
        assert_eq!(allocator.live(), 0);
        assert_eq!(allocator.created(), allocator.released());
    }

    #[test]
    #[should_panic(expected = "released twice")]
    fn test_double_release_panics() {
        let mut allocator = TrackingAllocator::new();
        let geometry = allocator.create_geometry(&generate_box(1.0, 1.0, 1.0)).unwrap();
        allocator.release_geometry(geometry);
        allocator.release_geometry(geometry);
    }
}
