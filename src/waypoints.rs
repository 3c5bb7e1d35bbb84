use bevy_ecs::component::Component;
use bevy_math::Vec3;
use bevy_reflect::{FromReflect, Reflect};
use bevy_transform::prelude::Transform;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WaypointError {
    #[error("no waypoint at index {index} (route has {count})")]
    Index { index: usize, count: usize },
    #[error("cannot target waypoint {index}, valid targets are 0..{count}")]
    OutOfRange { index: usize, count: usize },
}

/// Ordered list of points an agent loops through.
///
/// Points are stored relative to `frame`, so moving the frame moves the whole
/// route. With the default identity frame the points are world positions.
#[derive(Debug, Default, Clone, Component, Reflect, FromReflect)]
pub struct WaypointSet {
    points: Vec<Vec3>,
    frame: Transform,
}

impl WaypointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        Self {
            points: points.into_iter().collect(),
            frame: Transform::IDENTITY,
        }
    }

    pub fn with_frame(mut self, frame: Transform) -> Self {
        self.frame = frame;
        self
    }

    #[inline(always)]
    pub fn frame(&self) -> &Transform {
        &self.frame
    }

    pub fn set_frame(&mut self, frame: Transform) {
        self.frame = frame;
    }

    #[inline(always)]
    pub fn count(&self) -> usize {
        self.points.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// World position of waypoint `index`.
    pub fn position_at(&self, index: usize) -> Result<Vec3, WaypointError> {
        self.points
            .get(index)
            .map(|local| self.frame.transform_point(*local))
            .ok_or(WaypointError::Index {
                index,
                count: self.count(),
            })
    }

    /// Point `index` in the frame's local space.
    pub fn local_at(&self, index: usize) -> Result<Vec3, WaypointError> {
        self.points
            .get(index)
            .copied()
            .ok_or(WaypointError::Index {
                index,
                count: self.count(),
            })
    }

    pub fn append(&mut self, local: Vec3) {
        self.points.push(local);
    }

    pub fn insert(&mut self, index: usize, local: Vec3) -> Result<(), WaypointError> {
        if index > self.count() {
            return Err(WaypointError::Index {
                index,
                count: self.count(),
            });
        }
        self.points.insert(index, local);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Vec3, WaypointError> {
        if index >= self.count() {
            return Err(WaypointError::Index {
                index,
                count: self.count(),
            });
        }
        Ok(self.points.remove(index))
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// World positions in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.points.iter().map(|local| self.frame.transform_point(*local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_position_at_bounds() {
        let set = WaypointSet::from_points([Vec3::ZERO, Vec3::X]);
        assert_eq!(set.count(), 2);
        assert_eq!(set.position_at(1), Ok(Vec3::X));
        assert_eq!(
            set.position_at(2),
            Err(WaypointError::Index { index: 2, count: 2 })
        );
        assert!(WaypointSet::new().position_at(0).is_err());
    }

    #[test]
    pub fn test_frame_offsets_points() {
        let set = WaypointSet::from_points([Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)])
            .with_frame(Transform::from_xyz(10.0, 5.0, 0.0));
        assert_eq!(set.position_at(0).unwrap(), Vec3::new(10.0, 5.0, 0.0));
        assert_eq!(set.position_at(1).unwrap(), Vec3::new(11.0, 5.0, 0.0));
        assert_eq!(set.local_at(1).unwrap(), Vec3::X);

        let world: Vec<Vec3> = set.iter().collect();
        assert_eq!(world, vec![Vec3::new(10.0, 5.0, 0.0), Vec3::new(11.0, 5.0, 0.0)]);
    }

    #[test]
    pub fn test_scaled_frame() {
        let set = WaypointSet::from_points([Vec3::new(1.0, 2.0, 0.0)])
            .with_frame(Transform::from_xyz(1.0, 0.0, 0.0).with_scale(Vec3::splat(2.0)));
        assert_eq!(set.position_at(0).unwrap(), Vec3::new(3.0, 4.0, 0.0));
        assert_eq!(set.iter().next(), Some(Vec3::new(3.0, 4.0, 0.0)));
    }

    #[test]
    pub fn test_insert_remove_clear() {
        let mut set = WaypointSet::new();
        set.append(Vec3::X);
        set.append(Vec3::Z);
        set.insert(1, Vec3::Y).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Vec3::X, Vec3::Y, Vec3::Z]);

        set.insert(3, Vec3::ONE).unwrap();
        assert_eq!(set.count(), 4);
        assert!(set.insert(9, Vec3::ONE).is_err());

        assert_eq!(set.remove(0), Ok(Vec3::X));
        assert!(set.remove(3).is_err());

        set.clear();
        assert!(set.is_empty());
    }
}
