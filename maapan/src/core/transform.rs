//! Rigid transforms between volume and world frames.

use glam::Quat;
use serde::{Deserialize, Serialize};

use super::Point;

/// Rigid transform `T_world_local`: maps local volume coordinates to world coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Rotation from local to world frame.
    pub rotation: Quat,
    /// Translation of the local origin in the world frame.
    pub translation: Point,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Identity transform.
    pub const IDENTITY: Transform = Transform {
        rotation: Quat::IDENTITY,
        translation: Point::ZERO,
    };

    /// Create a transform from rotation and translation.
    pub fn new(rotation: Quat, translation: Point) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Pure translation.
    pub fn from_translation(translation: Point) -> Self {
        Self::new(Quat::IDENTITY, translation)
    }

    /// Map a local point into the world frame.
    #[inline]
    pub fn to_world(&self, local: Point) -> Point {
        self.rotation * local + self.translation
    }

    /// Map a world point into the local frame.
    #[inline]
    pub fn to_local(&self, world: Point) -> Point {
        self.rotation.inverse() * (world - self.translation)
    }

    /// Check whether this is the identity (cheap path for un-moved volumes).
    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}
