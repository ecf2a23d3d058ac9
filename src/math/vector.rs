//! Two, three and four component `f32` vectors.
//!
//! All arithmetic operators are component-wise. Nothing here validates
//! finiteness, so dividing by zero or normalizing a zero vector produces
//! NaN/Inf components exactly like plain IEEE arithmetic would.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Implements the component-wise operators and the shared helpers for a vector type.
macro_rules! impl_vector {
    ($name:ident, $glam:ty, $($field:ident),+) => {
        impl $name {
            /// All components set to zero.
            pub const ZERO: Self = Self { $($field: 0.0),+ };
            /// All components set to one.
            pub const ONE: Self = Self { $($field: 1.0),+ };

            /// Creates a vector with every component set to `value`.
            pub const fn splat(value: f32) -> Self {
                Self { $($field: value),+ }
            }

            /// Dot product.
            pub fn dot(self, other: Self) -> f32 {
                0.0 $(+ self.$field * other.$field)+
            }

            /// Euclidean length, `sqrt(sum(v_i^2))`.
            pub fn magnitude(self) -> f32 {
                self.dot(self).sqrt()
            }

            /// Returns `self / self.magnitude()`.
            ///
            /// A zero vector yields NaN components; callers must not normalize one.
            pub fn normalize(self) -> Self {
                self / self.magnitude()
            }

            /// Normalizes the vector in place. Same caveats as [`Self::normalize`].
            pub fn normalized(&mut self) {
                *self = self.normalize();
            }

            /// Returns `true` if every component differs from `other` by at most `epsilon`.
            pub fn abs_diff_eq(self, other: Self, epsilon: f32) -> bool {
                true $(&& (self.$field - other.$field).abs() <= epsilon)+
            }
        }

        impl Add for $name {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self { $($field: self.$field + rhs.$field),+ }
            }
        }

        impl Sub for $name {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self { $($field: self.$field - rhs.$field),+ }
            }
        }

        impl Mul for $name {
            type Output = Self;

            fn mul(self, rhs: Self) -> Self {
                Self { $($field: self.$field * rhs.$field),+ }
            }
        }

        impl Div for $name {
            type Output = Self;

            fn div(self, rhs: Self) -> Self {
                Self { $($field: self.$field / rhs.$field),+ }
            }
        }

        impl Mul<f32> for $name {
            type Output = Self;

            fn mul(self, rhs: f32) -> Self {
                Self { $($field: self.$field * rhs),+ }
            }
        }

        impl Mul<$name> for f32 {
            type Output = $name;

            fn mul(self, rhs: $name) -> $name {
                rhs * self
            }
        }

        impl Div<f32> for $name {
            type Output = Self;

            fn div(self, rhs: f32) -> Self {
                Self { $($field: self.$field / rhs),+ }
            }
        }

        impl Neg for $name {
            type Output = Self;

            fn neg(self) -> Self {
                Self { $($field: -self.$field),+ }
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                $(self.$field += rhs.$field;)+
            }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                $(self.$field -= rhs.$field;)+
            }
        }

        impl MulAssign for $name {
            fn mul_assign(&mut self, rhs: Self) {
                $(self.$field *= rhs.$field;)+
            }
        }

        impl DivAssign for $name {
            fn div_assign(&mut self, rhs: Self) {
                $(self.$field /= rhs.$field;)+
            }
        }

        impl MulAssign<f32> for $name {
            fn mul_assign(&mut self, rhs: f32) {
                $(self.$field *= rhs;)+
            }
        }

        impl DivAssign<f32> for $name {
            fn div_assign(&mut self, rhs: f32) {
                $(self.$field /= rhs;)+
            }
        }

        impl From<$glam> for $name {
            fn from(v: $glam) -> Self {
                Self { $($field: v.$field),+ }
            }
        }

        impl From<$name> for $glam {
            fn from(v: $name) -> Self {
                <$glam>::new($(v.$field),+)
            }
        }
    };
}

/// A two component vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

/// A three component vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// A four component vector. Also used as one column of a [`super::Matrix4`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl_vector!(Vector2, glam::Vec2, x, y);
impl_vector!(Vector3, glam::Vec3, x, y, z);
impl_vector!(Vector4, glam::Vec4, x, y, z, w);

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Vector3 {
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Right-handed cross product.
    pub fn cross(self, right: Self) -> Self {
        Self {
            x: self.y * right.z - self.z * right.y,
            y: self.z * right.x - self.x * right.z,
            z: self.x * right.y - self.y * right.x,
        }
    }

    /// Extends the vector with a `w` component.
    pub const fn extend(self, w: f32) -> Vector4 {
        Vector4::new(self.x, self.y, self.z, w)
    }
}

impl Vector4 {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Drops the `w` component.
    pub const fn truncate(self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    pub(crate) const fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}
