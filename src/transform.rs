//! Model transforms and a look-at camera.
//!
//! [`Transform::matrix`] always composes `translation * rotation * scale`, so a
//! vertex is scaled in the object's local frame first, then rotated about the
//! local origin, then moved into place.

use serde::{Deserialize, Serialize};

use crate::math::{Matrix4, Vector3};

/// Position, orientation and size of an object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub translation: Vector3,
    /// Rotation axis, need not be normalized.
    pub rotation_axis: Vector3,
    /// Rotation angle in degrees.
    pub rotation_angle: f32,
    pub scale: Vector3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vector3::ZERO,
            rotation_axis: Vector3::Z,
            rotation_angle: 0.0,
            scale: Vector3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vector3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, angle: f32, axis: Vector3) -> Self {
        self.rotation_angle = angle;
        self.rotation_axis = axis;
        self
    }

    pub fn with_scale(mut self, scale: Vector3) -> Self {
        self.scale = scale;
        self
    }

    /// The model matrix, built as identity, translate, rotate, scale.
    pub fn matrix(&self) -> Matrix4 {
        let mut model = Matrix4::IDENTITY;
        model.translate(self.translation);
        if self.rotation_angle != 0.0 {
            model.rotate(self.rotation_angle, self.rotation_axis);
        }
        model.scale(self.scale);
        model
    }
}

/// A perspective camera looking from `eye` at `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub eye: Vector3,
    pub target: Vector3,
    pub up: Vector3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vector3::new(0.0, 0.0, 10.0),
            target: Vector3::ZERO,
            up: Vector3::Y,
            fov: 60.0,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn view(&self) -> Matrix4 {
        Matrix4::look_at(self.eye, self.target, self.up)
    }

    pub fn projection(&self) -> Matrix4 {
        Matrix4::perspective(self.fov, self.aspect_ratio, self.near, self.far)
    }

    pub fn view_projection(&self) -> Matrix4 {
        self.projection() * self.view()
    }

    /// Updates the aspect ratio after a resize. Zero-sized viewports are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        assert_eq!(Transform::default().matrix(), Matrix4::IDENTITY);
    }

    #[test]
    fn test_scale_rotate_translate_order() {
        let transform = Transform::from_translation(Vector3::new(5.0, 0.0, 0.0))
            .with_rotation(90.0, Vector3::Z)
            .with_scale(Vector3::splat(2.0));

        // (1, 0, 0) -> scaled (2, 0, 0) -> rotated (0, 2, 0) -> moved (5, 2, 0)
        let p = transform.matrix().transform_point(Vector3::X);
        assert!(p.abs_diff_eq(Vector3::new(5.0, 2.0, 0.0), 1e-5), "{p:?}");
    }

    #[test]
    fn test_camera() {
        let mut camera = Camera::default();
        camera.set_viewport(800, 400);
        assert_eq!(camera.aspect_ratio, 2.0);
        camera.set_viewport(0, 400);
        assert_eq!(camera.aspect_ratio, 2.0);

        let target_in_view = camera.view().transform_point(camera.target);
        assert!(target_in_view.abs_diff_eq(Vector3::new(0.0, 0.0, -10.0), 1e-5));

        let clip = camera.view_projection() * camera.target.extend(1.0);
        let ndc_z = clip.z / clip.w;
        assert!(ndc_z > -1.0 && ndc_z < 1.0);
        assert!(clip.x.abs() < 1e-5 && clip.y.abs() < 1e-5);
    }
}
