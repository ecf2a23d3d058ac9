//! 4x4 transformation matrices.
//!
//! [`Matrix4`] stores its 16 elements row-major (`elements[col + row * 4]`) and
//! follows the column-vector convention: `A * B` applied to a vector applies `B`
//! first, then `A`. Every builder in this module uses that convention, so they
//! can be freely composed by multiplying into an accumulator.
//!
//! Angles are in degrees throughout.

use std::ops::{Mul, MulAssign};

use bytemuck::{Pod, Zeroable};

use super::{Vector3, Vector4};

/// A 4x4 `f32` matrix, row-major storage with a column view.
///
/// The default value is the zero matrix, use [`Matrix4::IDENTITY`] or
/// [`Matrix4::diagonal`] for a usable starting point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Matrix4 {
    pub elements: [f32; 16],
}

impl Matrix4 {
    pub const ZERO: Self = Self { elements: [0.0; 16] };
    pub const IDENTITY: Self = Self::diagonal(1.0);

    /// A matrix with `value` on the diagonal and zero everywhere else.
    pub const fn diagonal(value: f32) -> Self {
        let mut elements = [0.0; 16];
        elements[0] = value;
        elements[5] = value;
        elements[10] = value;
        elements[15] = value;
        Self { elements }
    }

    /// Builds a matrix from four rows.
    pub fn from_rows(rows: [Vector4; 4]) -> Self {
        let mut elements = [0.0; 16];
        for (row, values) in rows.iter().enumerate() {
            elements[row * 4..row * 4 + 4].copy_from_slice(&values.to_array());
        }
        Self { elements }
    }

    /// Builds a matrix from four columns.
    pub fn from_columns(columns: [Vector4; 4]) -> Self {
        Self::from_rows(columns).transpose()
    }

    /// Builds a matrix from column-major data, as produced by [`Matrix4::to_cols_array`].
    pub fn from_cols_array(data: &[f32; 16]) -> Self {
        Self { elements: *data }.transpose()
    }

    /// Returns the elements in column-major order.
    pub fn to_cols_array(&self) -> [f32; 16] {
        self.transpose().elements
    }

    /// Element at `row`, `col`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.elements[col + row * 4]
    }

    /// Sets the element at `row`, `col`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.elements[col + row * 4] = value;
    }

    pub fn row(&self, row: usize) -> Vector4 {
        Vector4::new(
            self.get(row, 0),
            self.get(row, 1),
            self.get(row, 2),
            self.get(row, 3),
        )
    }

    pub fn column(&self, col: usize) -> Vector4 {
        Vector4::new(
            self.get(0, col),
            self.get(1, col),
            self.get(2, col),
            self.get(3, col),
        )
    }

    pub fn set_column(&mut self, col: usize, value: Vector4) {
        for (row, v) in value.to_array().into_iter().enumerate() {
            self.set(row, col, v);
        }
    }

    pub fn transpose(&self) -> Self {
        let mut result = Self::ZERO;
        for row in 0..4 {
            for col in 0..4 {
                result.set(col, row, self.get(row, col));
            }
        }
        result
    }

    /// Returns `self * right`; `right` is the inner transform.
    pub fn mul_mat4(&self, right: &Matrix4) -> Matrix4 {
        let mut result = Self::ZERO;
        for row in 0..4 {
            for col in 0..4 {
                let mut sum = 0.0;
                for e in 0..4 {
                    sum += self.get(row, e) * right.get(e, col);
                }
                result.set(row, col, sum);
            }
        }
        result
    }

    /// Transforms a column vector.
    pub fn mul_vec4(&self, v: Vector4) -> Vector4 {
        Vector4::new(
            self.row(0).dot(v),
            self.row(1).dot(v),
            self.row(2).dot(v),
            self.row(3).dot(v),
        )
    }

    /// Transforms a point (`w = 1`), dropping the resulting `w`.
    pub fn transform_point(&self, p: Vector3) -> Vector3 {
        self.mul_vec4(p.extend(1.0)).truncate()
    }

    /// Returns `true` if every element differs from `other` by at most `epsilon`.
    pub fn abs_diff_eq(&self, other: &Matrix4, epsilon: f32) -> bool {
        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }

    /// A translation by `t`.
    pub fn translation(t: Vector3) -> Self {
        let mut result = Self::IDENTITY;
        result.set(0, 3, t.x);
        result.set(1, 3, t.y);
        result.set(2, 3, t.z);
        result
    }

    /// A counter-clockwise rotation of `angle` degrees around `axis`
    /// (Rodrigues' formula). `axis` does not need to be normalized.
    pub fn rotation(angle: f32, axis: Vector3) -> Self {
        let axis = axis.normalize();
        let (s, c) = angle.to_radians().sin_cos();
        let omc = 1.0 - c;
        let Vector3 { x, y, z } = axis;

        Self::from_rows([
            Vector4::new(x * x * omc + c, x * y * omc - z * s, x * z * omc + y * s, 0.0),
            Vector4::new(y * x * omc + z * s, y * y * omc + c, y * z * omc - x * s, 0.0),
            Vector4::new(x * z * omc - y * s, y * z * omc + x * s, z * z * omc + c, 0.0),
            Vector4::new(0.0, 0.0, 0.0, 1.0),
        ])
    }

    /// A rotation whose angle in degrees is the magnitude of `scaled_axis` and
    /// whose axis is its direction. A zero vector is a rotation by zero degrees.
    ///
    /// Prefer [`Matrix4::rotation`]; this form couples angle and axis into one value.
    pub fn rotation_scaled_axis(scaled_axis: Vector3) -> Self {
        let angle = scaled_axis.magnitude();
        if angle == 0.0 {
            return Self::IDENTITY;
        }
        Self::rotation(angle, scaled_axis)
    }

    /// A non-uniform scale by `s`.
    pub fn scaling(s: Vector3) -> Self {
        let mut result = Self::IDENTITY;
        result.set(0, 0, s.x);
        result.set(1, 1, s.y);
        result.set(2, 2, s.z);
        result
    }

    /// Right-handed orthographic projection into the OpenGL clip volume (z in `[-1, 1]`).
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let mut result = Self::IDENTITY;
        result.set(0, 0, 2.0 / (right - left));
        result.set(1, 1, 2.0 / (top - bottom));
        result.set(2, 2, 2.0 / (near - far));

        result.set(0, 3, (left + right) / (left - right));
        result.set(1, 3, (bottom + top) / (bottom - top));
        result.set(2, 3, (far + near) / (near - far));
        result
    }

    /// Right-handed perspective projection into the OpenGL clip volume.
    /// `fov` is the vertical field of view in degrees.
    pub fn perspective(fov: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        let q = 1.0 / (0.5 * fov).to_radians().tan();
        let a = q / aspect_ratio;
        let b = (near + far) / (near - far);
        let c = (2.0 * near * far) / (near - far);

        let mut result = Self::ZERO;
        result.set(0, 0, a);
        result.set(1, 1, q);
        result.set(2, 2, b);
        result.set(2, 3, c);
        result.set(3, 2, -1.0);
        result
    }

    /// Right-handed view matrix looking from `eye` towards `target`.
    ///
    /// `up` must not be parallel to the view direction.
    pub fn look_at(eye: Vector3, target: Vector3, up: Vector3) -> Self {
        let f = (target - eye).normalize();
        let s = f.cross(up.normalize()).normalize();
        let u = s.cross(f);

        let basis = Self::from_rows([
            s.extend(0.0),
            u.extend(0.0),
            (-f).extend(0.0),
            Vector4::new(0.0, 0.0, 0.0, 1.0),
        ]);
        basis * Self::translation(-eye)
    }

    /// Post-multiplies a translation: `self = self * translation(t)`.
    pub fn translate(&mut self, t: Vector3) -> &mut Self {
        *self *= Self::translation(t);
        self
    }

    /// Post-multiplies a rotation: `self = self * rotation(angle, axis)`.
    pub fn rotate(&mut self, angle: f32, axis: Vector3) -> &mut Self {
        *self *= Self::rotation(angle, axis);
        self
    }

    /// Post-multiplies a scale: `self = self * scaling(s)`.
    pub fn scale(&mut self, s: Vector3) -> &mut Self {
        *self *= Self::scaling(s);
        self
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        self.mul_mat4(&rhs)
    }
}

impl MulAssign for Matrix4 {
    fn mul_assign(&mut self, rhs: Matrix4) {
        *self = self.mul_mat4(&rhs);
    }
}

impl Mul<Vector4> for Matrix4 {
    type Output = Vector4;

    fn mul(self, rhs: Vector4) -> Vector4 {
        self.mul_vec4(rhs)
    }
}

impl From<glam::Mat4> for Matrix4 {
    fn from(m: glam::Mat4) -> Self {
        Self::from_cols_array(&m.to_cols_array())
    }
}

impl From<Matrix4> for glam::Mat4 {
    fn from(m: Matrix4) -> Self {
        glam::Mat4::from_cols_array(&m.to_cols_array())
    }
}
