use tess_math::{Aabb3, DMat4, Point3, Vector3};

/// A perspective camera looking at a target point.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub eye: Point3,    // camera position
    pub target: Point3, // look-at target
    pub up: Vector3,
    pub fov_y: f64,  // vertical FOV in radians
    pub aspect: f64, // width/height
    pub near: f64,
    pub far: f64,
}

impl Camera {
    /// Closest allowed eye-to-target distance.
    pub const MIN_DISTANCE: f64 = 0.01;
    /// Farthest allowed eye-to-target distance.
    pub const MAX_DISTANCE: f64 = 100.0;

    pub fn new(
        eye: Point3,
        target: Point3,
        up: Vector3,
        fov_y: f64,
        aspect: f64,
        near: f64,
        far: f64,
    ) -> Self {
        Self {
            eye,
            target,
            up,
            fov_y,
            aspect,
            near,
            far,
        }
    }

    /// Eye-to-target distance.
    pub fn distance(&self) -> f64 {
        (self.target - self.eye).length()
    }

    /// World to camera space; the camera looks down `-z`.
    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// OpenGL-style perspective projection (`-1..1` depth).
    pub fn projection_matrix(&self) -> DMat4 {
        DMat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> DMat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Move the eye toward (`delta > 0`) or away from the target, keeping
    /// the distance within `MIN_DISTANCE..=MAX_DISTANCE`.
    pub fn zoom(&mut self, delta: f64) {
        let offset = self.eye - self.target;
        let distance = offset.length();
        if distance == 0.0 {
            return;
        }
        let clamped = (distance - delta).clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
        self.eye = self.target + offset * (clamped / distance);
    }

    /// Aim at the centre of `aabb` from far enough away to see all of it.
    pub fn fit_to_aabb(&mut self, aabb: &Aabb3) {
        let center = aabb.center();
        let max_dim = aabb.max_extent();
        let distance = (max_dim / (2.0 * (self.fov_y / 2.0).tan()) * 1.5)
            .clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);

        let mut view_dir = (self.target - self.eye).normalize_or_zero();
        if view_dir == Vector3::ZERO {
            view_dir = -Vector3::Z;
        }
        self.target = center;
        self.eye = center - view_dir * distance;
    }

    /// World-space size of `pixels` screen pixels at the target distance,
    /// for a viewport `viewport_height` pixels tall.
    ///
    /// Passing this as the tessellation resolution keeps on-screen triangle
    /// error roughly constant while zooming.
    pub fn resolution(&self, viewport_height: u32, pixels: f64) -> f64 {
        let visible_height = 2.0 * self.distance() * (self.fov_y / 2.0).tan();
        pixels * visible_height / f64::from(viewport_height.max(1))
    }
}

impl Default for Camera {
    /// Eye at (0, 0, 5) looking at the origin, 45 degree FOV, 16:9 aspect.
    fn default() -> Self {
        Self {
            eye: Point3::new(0.0, 0.0, 5.0),
            target: Point3::ZERO,
            up: Vector3::Y,
            fov_y: std::f64::consts::FRAC_PI_4,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }
}
