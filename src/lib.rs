mod authoring;
mod debug;
mod traversal;
mod traveler;
mod waypoints;

use bevy_app::{App, Plugin};
use bevy_ecs::schedule::IntoSystemDescriptor;
use bevy_time::Time;

pub use authoring::{add_waypoint, clear_waypoints, WaypointMarker, WaypointMarkers};
use authoring::{release_orphaned_markers, sync_waypoint_markers};
use debug::draw_waypoint_debug;
pub use debug::{
    render_debug, DebugColor, DebugDraw, DebugPrimitive, DebugPrimitives, WaypointDebug,
    MAX_POINT_SIZE,
};
pub use traversal::{advance, distance_to_target, is_near_target, Step, TraversalState};
use traveler::{activate_travelers, check_routes, move_travelers};
pub use traveler::{NoRoute, TravelingPaused, WaypointReached, WaypointTraveler};
pub use waypoints::{WaypointError, WaypointSet};

#[derive(Clone, Copy)]
pub struct WaypointPlugin {
    pub debug: bool,
    pub marker_sync: bool,
}

impl Default for WaypointPlugin {
    fn default() -> Self {
        Self {
            debug: true,
            marker_sync: true,
        }
    }
}

impl WaypointPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_marker_sync(mut self, marker_sync: bool) -> Self {
        self.marker_sync = marker_sync;
        self
    }
}

impl Plugin for WaypointPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Time>()
            .add_event::<WaypointReached>()
            .add_system(activate_travelers.label("activate_travelers"))
            .add_system(
                check_routes
                    .label("check_routes")
                    .after("activate_travelers"),
            )
            .add_system(move_travelers.after("check_routes"))
            .register_type::<WaypointSet>()
            .register_type::<WaypointTraveler>()
            .register_type::<TraversalState>()
            .register_type::<TravelingPaused>()
            .register_type::<NoRoute>()
            .register_type::<WaypointMarker>()
            .register_type::<WaypointDebug>()
            .register_type::<DebugColor>();

        if self.marker_sync {
            app.add_system(sync_waypoint_markers)
                .add_system(release_orphaned_markers);
        }

        if self.debug {
            app.init_resource::<DebugPrimitives>()
                .add_system(draw_waypoint_debug);
        }
    }
}
