use bevy_ecs::{
    component::Component,
    entity::Entity,
    query::{Changed, With},
    system::{Commands, Query, RemovedComponents},
};
use bevy_math::Vec3;
use bevy_reflect::{FromReflect, Reflect};
use bevy_transform::prelude::Transform;
use bevy_utils::{tracing::debug, HashSet};

use crate::WaypointSet;

/// Append a waypoint. Without a position it lands on the route's own origin.
pub fn add_waypoint(waypoints: &mut WaypointSet, position: Option<Vec3>) {
    waypoints.append(position.unwrap_or(Vec3::ZERO));
}

/// Remove every waypoint. The route's markers go with them on the next
/// [`sync_waypoint_markers`] run.
pub fn clear_waypoints(waypoints: &mut WaypointSet) {
    waypoints.clear();
}

/// Placeholder entity standing at one waypoint of a route.
#[derive(Debug, Component, Reflect, FromReflect)]
pub struct WaypointMarker {
    pub route: Entity,
    pub index: usize,
}

/// Markers owned by a route, in waypoint order.
#[derive(Debug, Default, Component)]
pub struct WaypointMarkers(pub Vec<Entity>);

pub(crate) fn sync_waypoint_markers(
    changed_routes: Query<(Entity, &WaypointSet, Option<&WaypointMarkers>), Changed<WaypointSet>>,
    live_markers: Query<(), With<WaypointMarker>>,
    mut commands: Commands,
) {
    for (route, waypoints, markers) in changed_routes.iter() {
        if let Some(markers) = markers {
            for marker in &markers.0 {
                if live_markers.get(*marker).is_ok() {
                    commands.entity(*marker).despawn();
                }
            }
        }

        let spawned: Vec<Entity> = waypoints
            .iter()
            .enumerate()
            .map(|(index, position)| {
                commands
                    .spawn((
                        WaypointMarker { route, index },
                        Transform::from_translation(position),
                    ))
                    .id()
            })
            .collect();

        debug!("Route {:?} now has {} markers", route, spawned.len());
        commands.entity(route).insert(WaypointMarkers(spawned));
    }
}

/// Despawn the markers of routes that lost their [`WaypointSet`], including
/// routes that were despawned outright.
pub(crate) fn release_orphaned_markers(
    removed_sets: RemovedComponents<WaypointSet>,
    markers: Query<(Entity, &WaypointMarker)>,
    routes: Query<Option<&WaypointSet>, With<WaypointMarkers>>,
    mut commands: Commands,
) {
    let removed: HashSet<Entity> = removed_sets.iter().collect();
    if removed.is_empty() {
        return;
    }

    for route in removed.iter() {
        // A set inserted again in the same frame is resynced instead.
        if let Ok(None) = routes.get(*route) {
            commands.entity(*route).remove::<WaypointMarkers>();
        }
    }

    let mut released = 0;
    for (entity, marker) in markers.iter() {
        if removed.contains(&marker.route) && !matches!(routes.get(marker.route), Ok(Some(_))) {
            commands.entity(entity).despawn();
            released += 1;
        }
    }
    debug!("Released {} markers from {} removed routes", released, removed.len());
}

#[cfg(test)]
mod tests {
    use bevy_app::App;

    use super::*;
    use crate::WaypointPlugin;

    #[test]
    pub fn test_add_defaults_to_origin() {
        let mut waypoints = WaypointSet::new().with_frame(Transform::from_xyz(2.0, 0.0, 0.0));
        add_waypoint(&mut waypoints, None);
        add_waypoint(&mut waypoints, Some(Vec3::new(0.0, 3.0, 0.0)));

        assert_eq!(waypoints.position_at(0).unwrap(), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(waypoints.position_at(1).unwrap(), Vec3::new(2.0, 3.0, 0.0));

        clear_waypoints(&mut waypoints);
        assert!(waypoints.is_empty());
    }

    fn marker_count(app: &mut App) -> usize {
        app.world
            .query_filtered::<Entity, With<WaypointMarker>>()
            .iter(&app.world)
            .count()
    }

    #[test]
    pub fn test_markers_follow_route() {
        let mut app = App::new();
        app.add_plugin(WaypointPlugin::new());

        let route = app
            .world
            .spawn(WaypointSet::from_points([Vec3::ZERO, Vec3::X, Vec3::Y]))
            .id();
        app.update();
        assert_eq!(marker_count(&mut app), 3);

        let markers = &app.world.get::<WaypointMarkers>(route).unwrap().0;
        let marker = app.world.get::<WaypointMarker>(markers[1]).unwrap();
        assert_eq!(marker.route, route);
        assert_eq!(marker.index, 1);
        let transform = app.world.get::<Transform>(markers[1]).unwrap();
        assert_eq!(transform.translation, Vec3::X);

        add_waypoint(
            &mut app.world.get_mut::<WaypointSet>(route).unwrap(),
            None,
        );
        app.update();
        assert_eq!(marker_count(&mut app), 4);

        clear_waypoints(&mut app.world.get_mut::<WaypointSet>(route).unwrap());
        app.update();
        assert_eq!(marker_count(&mut app), 0);
        assert!(app.world.get::<WaypointMarkers>(route).unwrap().0.is_empty());
    }

    #[test]
    pub fn test_markers_released_with_route() {
        let mut app = App::new();
        app.add_plugin(WaypointPlugin::new());

        let route = app
            .world
            .spawn(WaypointSet::from_points([Vec3::ZERO, Vec3::X, Vec3::Y]))
            .id();
        let kept = app
            .world
            .spawn(WaypointSet::from_points([Vec3::Z]))
            .id();
        app.update();
        assert_eq!(marker_count(&mut app), 4);

        app.world.despawn(route);
        app.update();
        assert_eq!(marker_count(&mut app), 1);

        app.world.entity_mut(kept).remove::<WaypointSet>();
        app.update();
        assert_eq!(marker_count(&mut app), 0);
        assert!(app.world.get::<WaypointMarkers>(kept).is_none());
    }

    #[test]
    pub fn test_despawned_marker_does_not_break_resync() {
        let mut app = App::new();
        app.add_plugin(WaypointPlugin::new());

        let route = app
            .world
            .spawn(WaypointSet::from_points([Vec3::ZERO, Vec3::X]))
            .id();
        app.update();

        let first = app.world.get::<WaypointMarkers>(route).unwrap().0[0];
        app.world.despawn(first);
        add_waypoint(&mut app.world.get_mut::<WaypointSet>(route).unwrap(), None);
        app.update();
        assert_eq!(marker_count(&mut app), 3);
    }
}
