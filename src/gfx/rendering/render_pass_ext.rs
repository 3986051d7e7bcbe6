//! Render pass extensions for drawing scene meshes.

use wgpu::*;

/// Uploaded mesh buffers for one geometry handle
pub struct GpuMesh {
    pub vertex_buffer: Buffer,
    pub index_buffer: Buffer,
    pub index_count: u32,
}

/// Extension trait for RenderPass to draw a mesh with its surface bindings
pub trait DrawMesh {
    /// Binds `surface` at group 1 and issues one indexed draw
    fn draw_mesh(&mut self, mesh: &GpuMesh, surface: &BindGroup);
}

impl DrawMesh for RenderPass<'_> {
    fn draw_mesh(&mut self, mesh: &GpuMesh, surface: &BindGroup) {
        self.set_bind_group(1, surface, &[]);
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}
