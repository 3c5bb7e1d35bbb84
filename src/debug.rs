use bevy_ecs::{
    component::Component,
    system::{Query, ResMut, Resource},
};
use bevy_math::Vec3;
use bevy_reflect::{FromReflect, Reflect};

use crate::WaypointSet;

pub const MAX_POINT_SIZE: f32 = 20.0;

/// Linear RGBA color for debug output.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, FromReflect)]
pub struct DebugColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl DebugColor {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

impl Default for DebugColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Surface debug shapes are drawn onto.
pub trait DebugDraw {
    fn sphere(&mut self, center: Vec3, radius: f32, color: DebugColor);
    fn line(&mut self, start: Vec3, end: Vec3, color: DebugColor);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebugPrimitive {
    Sphere {
        center: Vec3,
        radius: f32,
        color: DebugColor,
    },
    Line {
        start: Vec3,
        end: Vec3,
        color: DebugColor,
    },
}

/// Shapes collected during a frame, for the host renderer to drain.
#[derive(Debug, Default, Resource)]
pub struct DebugPrimitives(pub Vec<DebugPrimitive>);

impl DebugPrimitives {
    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn drain(&mut self) -> impl Iterator<Item = DebugPrimitive> + '_ {
        self.0.drain(..)
    }
}

impl DebugDraw for DebugPrimitives {
    fn sphere(&mut self, center: Vec3, radius: f32, color: DebugColor) {
        self.0.push(DebugPrimitive::Sphere {
            center,
            radius,
            color,
        });
    }

    fn line(&mut self, start: Vec3, end: Vec3, color: DebugColor) {
        self.0.push(DebugPrimitive::Line { start, end, color });
    }
}

/// Per-route debug settings.
#[derive(Debug, Clone, Component, Reflect, FromReflect)]
pub struct WaypointDebug {
    pub enabled: bool,
    pub point_color: DebugColor,
    pub line_color: DebugColor,
    pub point_size: f32,
    pub close_loop: bool,
}

impl Default for WaypointDebug {
    fn default() -> Self {
        Self {
            enabled: true,
            point_color: DebugColor::WHITE,
            line_color: DebugColor::WHITE,
            point_size: 0.2,
            close_loop: true,
        }
    }
}

impl WaypointDebug {
    pub fn with_colors(mut self, point_color: DebugColor, line_color: DebugColor) -> Self {
        self.point_color = point_color;
        self.line_color = line_color;
        self
    }

    pub fn with_point_size(mut self, point_size: f32) -> Self {
        self.point_size = point_size;
        self
    }

    pub fn with_close_loop(mut self, close_loop: bool) -> Self {
        self.close_loop = close_loop;
        self
    }

    pub fn draw(&self, waypoints: &WaypointSet, out: &mut impl DebugDraw) {
        render_debug(
            waypoints,
            self.point_color,
            self.line_color,
            self.point_size,
            self.enabled,
            self.close_loop,
            out,
        );
    }
}

/// Draw a sphere on every waypoint and the legs between them in order.
pub fn render_debug(
    waypoints: &WaypointSet,
    point_color: DebugColor,
    line_color: DebugColor,
    point_size: f32,
    enabled: bool,
    close_loop: bool,
    out: &mut impl DebugDraw,
) {
    if !enabled || waypoints.is_empty() {
        return;
    }

    let radius = point_size.clamp(0.0, MAX_POINT_SIZE);
    for point in waypoints.iter() {
        out.sphere(point, radius, point_color);
    }

    let points: Vec<Vec3> = waypoints.iter().collect();
    for leg in points.windows(2) {
        out.line(leg[0], leg[1], line_color);
    }

    if close_loop && points.len() >= 2 {
        out.line(points[points.len() - 1], points[0], line_color);
    }
}

pub(crate) fn draw_waypoint_debug(
    routes: Query<(&WaypointSet, &WaypointDebug)>,
    mut primitives: ResMut<DebugPrimitives>,
) {
    primitives.clear();
    for (waypoints, settings) in routes.iter() {
        settings.draw(waypoints, &mut *primitives);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> WaypointSet {
        WaypointSet::from_points([Vec3::ZERO, Vec3::X, Vec3::Y])
    }

    fn lines(primitives: &DebugPrimitives) -> Vec<(Vec3, Vec3)> {
        primitives
            .0
            .iter()
            .filter_map(|p| match p {
                DebugPrimitive::Line { start, end, .. } => Some((*start, *end)),
                _ => None,
            })
            .collect()
    }

    #[test]
    pub fn test_points_and_closed_loop() {
        let mut out = DebugPrimitives::default();
        WaypointDebug::default()
            .with_colors(DebugColor::BLUE, DebugColor::WHITE)
            .draw(&triangle(), &mut out);

        let spheres = out
            .0
            .iter()
            .filter(|p| matches!(p, DebugPrimitive::Sphere { color, radius, .. } if *color == DebugColor::BLUE && *radius == 0.2))
            .count();
        assert_eq!(spheres, 3);
        assert_eq!(
            lines(&out),
            vec![(Vec3::ZERO, Vec3::X), (Vec3::X, Vec3::Y), (Vec3::Y, Vec3::ZERO)]
        );
    }

    #[test]
    pub fn test_open_loop_and_single_point() {
        let mut out = DebugPrimitives::default();
        WaypointDebug::default()
            .with_close_loop(false)
            .draw(&triangle(), &mut out);
        assert_eq!(lines(&out).len(), 2);

        out.clear();
        WaypointDebug::default().draw(&WaypointSet::from_points([Vec3::ONE]), &mut out);
        assert_eq!(out.0.len(), 1);
        assert!(lines(&out).is_empty());
    }

    #[test]
    pub fn test_disabled_and_size_clamp() {
        let mut out = DebugPrimitives::default();
        let settings = WaypointDebug {
            enabled: false,
            ..Default::default()
        };
        settings.draw(&triangle(), &mut out);
        assert!(out.0.is_empty());

        WaypointDebug::default()
            .with_point_size(100.0)
            .draw(&triangle(), &mut out);
        assert!(out.drain().all(|p| match p {
            DebugPrimitive::Sphere { radius, .. } => radius == MAX_POINT_SIZE,
            DebugPrimitive::Line { .. } => true,
        }));
        assert!(out.0.is_empty());
    }
}
