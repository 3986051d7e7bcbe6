//! Y-up perspective camera shared by all scene variants.
//!
//! Scenes never hand control of the camera to the user directly: it is either
//! eased toward a pointer-derived goal, orbited around the origin, or left
//! where the scene placed it.

use cgmath::{perspective, Deg, EuclideanSpace, Matrix4, Point3, Vector3};

use super::camera_utils::{Camera, CameraUniform, OPENGL_TO_WGPU_MATRIX};

#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub fovy: Deg<f32>,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera for PerspectiveCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * self.projection_matrix() * self.view_matrix()
    }
}

impl PerspectiveCamera {
    pub fn new(position: Vector3<f32>, target: Vector3<f32>, fovy_degrees: f32, aspect: f32) -> Self {
        Self {
            position,
            target,
            up: Vector3::unit_y(),
            fovy: Deg(fovy_degrees),
            aspect,
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            Point3::from_vec(self.position),
            Point3::from_vec(self.target),
            self.up,
        )
    }

    /// GL-convention projection (depth in [-1, 1]); picking unprojects with this
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform::from_camera(self, self.position.into())
    }

    /// Keeps the projection in step with the surface. Zero-height surfaces
    /// (minimized windows) leave the aspect unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn look_at(&mut self, target: Vector3<f32>) {
        self.target = target;
    }

    /// Eases the camera's x and y toward `goal` by `smoothing` per call,
    /// leaving depth untouched
    pub fn drift_toward(&mut self, goal: (f32, f32), smoothing: f32) {
        self.position.x += (goal.0 - self.position.x) * smoothing;
        self.position.y += (goal.1 - self.position.y) * smoothing;
    }

    /// Places the camera on a horizontal circle around the Y axis at its current height
    pub fn orbit(&mut self, angle: f32, radius: f32) {
        self.position.x = angle.sin() * radius;
        self.position.z = angle.cos() * radius;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::Zero;

    #[test]
    fn test_resize_updates_aspect() {
        let mut camera = PerspectiveCamera::new(Vector3::new(0.0, 5.0, 10.0), Vector3::zero(), 75.0, 1.0);
        camera.resize(1600, 800);
        assert_relative_eq!(camera.aspect, 2.0);

        camera.resize(1600, 0);
        assert_relative_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn test_drift_converges_without_touching_depth() {
        let mut camera = PerspectiveCamera::new(Vector3::new(0.0, 2.0, 10.0), Vector3::zero(), 75.0, 1.0);
        for _ in 0..500 {
            camera.drift_toward((3.0, -1.0), 0.03);
        }
        assert_relative_eq!(camera.position.x, 3.0, epsilon = 1e-4);
        assert_relative_eq!(camera.position.y, -1.0, epsilon = 1e-4);
        assert_relative_eq!(camera.position.z, 10.0);
    }

    #[test]
    fn test_orbit_keeps_radius_and_height() {
        let mut camera = PerspectiveCamera::new(Vector3::new(0.0, 5.0, 15.0), Vector3::zero(), 75.0, 1.0);
        camera.orbit(1.3, 20.0);
        let planar = (camera.position.x.powi(2) + camera.position.z.powi(2)).sqrt();
        assert_relative_eq!(planar, 20.0, epsilon = 1e-4);
        assert_relative_eq!(camera.position.y, 5.0);
    }
}
