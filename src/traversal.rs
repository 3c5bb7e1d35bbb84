use bevy_math::Vec3;
use bevy_reflect::{FromReflect, Reflect};

use crate::{WaypointError, WaypointSet};

/// Where an agent is in its loop over a [`WaypointSet`].
///
/// `index` is the waypoint being travelled to. While dwelling it already names
/// the next waypoint, travel towards it resumes once `now >= until`.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, FromReflect)]
pub enum TraversalState {
    Traveling { index: usize },
    Dwelling { index: usize, until: f64 },
}

impl Default for TraversalState {
    fn default() -> Self {
        Self::Traveling { index: 0 }
    }
}

/// Result of a single [`advance`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub position: Vec3,
    pub state: TraversalState,
    /// Waypoint reached during this step, if any.
    pub arrived: Option<usize>,
}

impl TraversalState {
    #[inline(always)]
    pub fn current_index(&self) -> usize {
        match *self {
            Self::Traveling { index } | Self::Dwelling { index, .. } => index,
        }
    }

    #[inline(always)]
    pub fn dwell_until(&self) -> f64 {
        match *self {
            Self::Traveling { .. } => f64::NEG_INFINITY,
            Self::Dwelling { until, .. } => until,
        }
    }

    #[inline(always)]
    pub fn is_dwelling_at(&self, now: f64) -> bool {
        now < self.dwell_until()
    }

    /// Index actually travelled to with `count` waypoints. Covers both the
    /// wrap sentinel (`index == count`) and a set that shrank underneath us.
    #[inline(always)]
    pub fn resolved_index(&self, count: usize) -> usize {
        let index = self.current_index();
        if index >= count {
            0
        } else {
            index
        }
    }

    /// Point the agent at waypoint `index` and drop any pending dwell.
    pub fn set_target(&mut self, index: usize, count: usize) -> Result<(), WaypointError> {
        if index >= count {
            return Err(WaypointError::OutOfRange { index, count });
        }
        *self = Self::Traveling { index };
        Ok(())
    }

    /// Move on to the waypoint after the current one, wrapping at the end.
    pub fn skip(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        *self = Self::Traveling {
            index: (self.resolved_index(count) + 1) % count,
        };
    }
}

/// Advance one agent by one tick.
///
/// Movement is clamped to the remaining distance, so a step either lands
/// exactly on the target or stops short of it. Landing on it counts as arrival
/// and starts the dwell; the following waypoint becomes the target.
pub fn advance(
    state: TraversalState,
    waypoints: &WaypointSet,
    position: Vec3,
    delta: f32,
    now: f64,
    speed: f32,
    dwell_duration: f32,
) -> Step {
    let unchanged = Step {
        position,
        state,
        arrived: None,
    };

    let count = waypoints.count();
    if count == 0 || state.is_dwelling_at(now) {
        return unchanged;
    }

    let index = state.resolved_index(count);
    let target = match waypoints.position_at(index) {
        Ok(target) => target,
        Err(_) => return unchanged,
    };

    let budget = speed * delta;
    let budget = if budget.is_finite() { budget.max(0.0) } else { 0.0 };
    let to_target = target - position;
    let dist = to_target.length();

    if budget >= dist {
        let next = (index + 1) % count;
        Step {
            position: target,
            state: TraversalState::Dwelling {
                index: next,
                until: now + f64::from(dwell_duration.max(0.0)),
            },
            arrived: Some(index),
        }
    } else {
        Step {
            position: position + to_target / dist * budget,
            state: TraversalState::Traveling { index },
            arrived: None,
        }
    }
}

/// Distance from `position` to the waypoint `state` is heading for.
pub fn distance_to_target(
    state: &TraversalState,
    waypoints: &WaypointSet,
    position: Vec3,
) -> Option<f32> {
    if waypoints.is_empty() {
        return None;
    }
    waypoints
        .position_at(state.resolved_index(waypoints.count()))
        .ok()
        .map(|target| target.distance(position))
}

pub fn is_near_target(
    state: &TraversalState,
    waypoints: &WaypointSet,
    position: Vec3,
    radius: f32,
) -> bool {
    distance_to_target(state, waypoints, position)
        .map(|dist| dist <= radius)
        .unwrap_or(false)
}
