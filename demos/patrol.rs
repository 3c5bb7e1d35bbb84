use bevy::{
    prelude::{App, Camera2dBundle, Color, EventReader, Vec2, Vec3},
    sprite::{Sprite, SpriteBundle},
    DefaultPlugins,
};
use bevy_ecs::system::{Commands, Res};
use bevy_inspector_egui::quick::WorldInspectorPlugin;
use bevy_transform::prelude::Transform;
use bevy_waypoints::{
    add_waypoint, DebugColor, DebugPrimitive, DebugPrimitives, WaypointDebug, WaypointPlugin,
    WaypointReached, WaypointSet, WaypointTraveler,
};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugin(WorldInspectorPlugin)
        .add_plugin(WaypointPlugin::new())
        .add_startup_system(setup)
        .add_system(log_arrivals)
        .add_system(report_debug_shapes)
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());

    let mut route = WaypointSet::new().with_frame(Transform::from_xyz(-160.0, -160.0, 0.0));
    add_waypoint(&mut route, None);
    add_waypoint(&mut route, Some(Vec3::new(320.0, 0.0, 0.0)));
    add_waypoint(&mut route, Some(Vec3::new(320.0, 320.0, 0.0)));
    add_waypoint(&mut route, Some(Vec3::new(0.0, 320.0, 0.0)));

    let route = commands
        .spawn((
            route,
            WaypointDebug::default()
                .with_colors(DebugColor::BLUE, DebugColor::WHITE)
                .with_point_size(8.0),
        ))
        .id();

    for (speed, dwell, color) in [(120.0, 1.0, Color::ORANGE), (60.0, 0.0, Color::CYAN)] {
        commands
            .spawn(SpriteBundle {
                sprite: Sprite {
                    color,
                    custom_size: Some(Vec2::splat(16.0)),
                    ..Default::default()
                },
                transform: Transform::from_xyz(0.0, 0.0, 0.0),
                ..Default::default()
            })
            .insert(WaypointTraveler::new(route, speed).with_dwell(dwell));
    }
}

fn log_arrivals(mut reached: EventReader<WaypointReached>) {
    for event in reached.iter() {
        bevy::log::info!("{:?} reached waypoint {}", event.traveler, event.waypoint);
    }
}

fn report_debug_shapes(primitives: Res<DebugPrimitives>) {
    // A renderer would draw these; the demo only counts them.
    let lines = primitives
        .0
        .iter()
        .filter(|p| matches!(p, DebugPrimitive::Line { .. }))
        .count();
    bevy::log::trace!("{} debug lines this frame", lines);
}
