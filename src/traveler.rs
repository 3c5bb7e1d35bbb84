use bevy_ecs::{
    component::Component,
    entity::Entity,
    event::EventWriter,
    query::{Added, With, Without},
    system::{Commands, Query, Res},
};
use bevy_reflect::{FromReflect, Reflect};
use bevy_time::Time;
use bevy_transform::prelude::Transform;
use bevy_utils::tracing::{debug, info, warn};

use crate::{advance, TraversalState, WaypointError, WaypointSet};

/// Agent looping over the waypoints held by `route`.
#[derive(Debug, Reflect, FromReflect, Component, Clone)]
pub struct WaypointTraveler {
    pub route: Entity,
    pub speed: f32,
    pub dwell_duration: f32,
    pub state: TraversalState,
}

impl WaypointTraveler {
    pub fn new(route: Entity, speed: f32) -> Self {
        Self {
            route,
            speed,
            dwell_duration: 1.0,
            state: TraversalState::default(),
        }
    }

    pub fn with_dwell(mut self, dwell_duration: f32) -> Self {
        self.dwell_duration = dwell_duration;
        self
    }

    pub fn set_target(&mut self, index: usize, waypoints: &WaypointSet) -> Result<(), WaypointError> {
        if let Err(err) = self.state.set_target(index, waypoints.count()) {
            warn!("Traveler not retargeted: {}", err);
            return Err(err);
        }
        info!("Traveler retargeted to waypoint {}", index);
        Ok(())
    }
}

/// Travelers carrying this are frozen in place.
#[derive(Debug, Component, Reflect, FromReflect)]
pub struct TravelingPaused;

/// The traveler's route entity has no [`WaypointSet`].
#[derive(Debug, Component, Reflect, FromReflect)]
pub struct NoRoute;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaypointReached {
    pub traveler: Entity,
    pub route: Entity,
    pub waypoint: usize,
}

pub(crate) fn activate_travelers(
    mut new_travelers_query: Query<(Entity, &mut WaypointTraveler), Added<WaypointTraveler>>,
) {
    for (entity, mut traveler) in new_travelers_query.iter_mut() {
        traveler.state = TraversalState::default();
        info!("Traveler {:?} activated on route {:?}", entity, traveler.route);
    }
}

pub(crate) fn check_routes(
    travelers_query: Query<(Entity, &WaypointTraveler, Option<&NoRoute>)>,
    routes: Query<(), With<WaypointSet>>,
    mut commands: Commands,
) {
    for (entity, traveler, no_route) in travelers_query.iter() {
        let has_route = routes.get(traveler.route).is_ok();
        match (has_route, no_route.is_some()) {
            (false, false) => {
                info!("No route found for traveler {:?}", entity);
                commands.entity(entity).insert(NoRoute);
            }
            (true, true) => {
                commands.entity(entity).remove::<NoRoute>();
            }
            _ => {}
        }
    }
}

pub(crate) fn move_travelers(
    mut moving_travelers_query: Query<
        (Entity, &mut Transform, &mut WaypointTraveler),
        (Without<TravelingPaused>, Without<NoRoute>),
    >,
    routes: Query<&WaypointSet>,
    time: Res<Time>,
    mut reached: EventWriter<WaypointReached>,
) {
    let delta = time.delta_seconds();
    let now = time.elapsed_seconds_f64();

    for (entity, mut transform, mut traveler) in moving_travelers_query.iter_mut() {
        let waypoints = match routes.get(traveler.route) {
            Ok(waypoints) => waypoints,
            Err(_) => continue,
        };

        let step = advance(
            traveler.state,
            waypoints,
            transform.translation,
            delta,
            now,
            traveler.speed,
            traveler.dwell_duration,
        );

        if step.position != transform.translation {
            transform.translation = step.position;
        }
        if step.state != traveler.state {
            traveler.state = step.state;
        }

        if let Some(waypoint) = step.arrived {
            debug!("Traveler {:?} reached waypoint {}", entity, waypoint);
            reached.send(WaypointReached {
                traveler: entity,
                route: traveler.route,
                waypoint,
            });
        }
    }
}
