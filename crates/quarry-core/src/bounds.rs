//! Axis-aligned extents of vertex data

use glam::Vec3;
use serde::Serialize;
use std::fmt;

/// Axis-aligned bounding box computed from vertex positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Compute bounds from a set of positions, `None` when empty
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Bounds {
            min: *first,
            max: *first,
        };
        for p in rest {
            bounds.min = bounds.min.min(*p);
            bounds.max = bounds.max.max(*p);
        }
        Some(bounds)
    }

    /// Size along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Merge with another bounds to get the union
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.size();
        write!(
            f,
            "{:.2} x {:.2} x {:.2} (min [{:.2}, {:.2}, {:.2}], max [{:.2}, {:.2}, {:.2}])",
            s.x, s.y, s.z,
            self.min.x, self.min.y, self.min.z,
            self.max.x, self.max.y, self.max.z,
        )
    }
}
