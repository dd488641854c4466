//! Renderer-facing view helpers
//!
//! Projection of vehicle-frame points into a 2D view, missing-sensor
//! field-of-view wedges, and the [`Scene`] snapshot handed to renderers.

use contracts::{
    AltitudeValue, CartesianPoint, Frame, MonitorBlueprint, MountGeometry, SensorId,
    ViewOrientation,
};
use nalgebra::{Rotation3, Vector3};
use serde::Serialize;

/// Arc resolution of a field-of-view wedge
const DEFAULT_ARC_SEGMENTS: usize = 12;

/// A point in view coordinates: `u` horizontal, `v` vertical (meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewPoint {
    pub u: f64,
    pub v: f64,
}

impl ViewPoint {
    #[inline]
    pub fn within(&self, half_extent: f64) -> bool {
        self.u.abs() <= half_extent && self.v.abs() <= half_extent
    }
}

/// Project a vehicle-frame point.
///
/// Top-down plots `(y, x)`; side-on plots `(x, z)`.
#[inline]
pub fn project(point: &CartesianPoint, view: ViewOrientation) -> ViewPoint {
    match view {
        ViewOrientation::TopDown => ViewPoint {
            u: point.y,
            v: point.x,
        },
        ViewOrientation::SideOn => ViewPoint {
            u: point.x,
            v: point.z,
        },
    }
}

/// Field-of-view wedge of one sensor, in vehicle coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct FovWedge {
    pub sensor: SensorId,
    /// Apex first, then the arc from `-fov/2` to `+fov/2`
    pub vertices: Vec<CartesianPoint>,
}

impl FovWedge {
    pub fn from_mount(mount: &MountGeometry) -> Self {
        Self::with_segments(mount, DEFAULT_ARC_SEGMENTS)
    }

    pub fn with_segments(mount: &MountGeometry, segments: usize) -> Self {
        let segments = segments.max(1);
        let apex = Vector3::new(mount.x, mount.y, mount.z);
        let rotation = Rotation3::from_euler_angles(
            0.0,
            mount.pitch_deg.to_radians(),
            mount.yaw_deg.to_radians(),
        );
        let half_fov = mount.fov_deg.to_radians() / 2.0;
        let step = 2.0 * half_fov / segments as f64;

        let mut vertices = Vec::with_capacity(segments + 2);
        vertices.push(CartesianPoint::new(apex.x, apex.y, apex.z));
        for i in 0..=segments {
            let theta = -half_fov + step * i as f64;
            let local = Vector3::new(theta.cos(), theta.sin(), 0.0) * mount.range_m;
            let p = apex + rotation * local;
            vertices.push(CartesianPoint::new(p.x, p.y, p.z));
        }

        Self {
            sensor: mount.sensor,
            vertices,
        }
    }

    pub fn project(&self, view: ViewOrientation) -> ProjectedWedge {
        ProjectedWedge {
            sensor: self.sensor,
            polygon: self.vertices.iter().map(|p| project(p, view)).collect(),
        }
    }
}

/// Wedge polygon in view coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedWedge {
    pub sensor: SensorId,
    pub polygon: Vec<ViewPoint>,
}

/// Ground band of the side-on view: `v` in `[top, bottom]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroundBand {
    pub top: f64,
    pub bottom: f64,
}

/// Everything a renderer needs for one redraw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub generation: u64,
    pub frame_id: u64,
    pub view: ViewOrientation,
    pub plot_size_m: f64,
    /// Points inside the plot bounds
    pub points: Vec<ViewPoint>,
    /// Points outside `±plot_size_m`
    pub clipped: usize,
    pub altitude_m: f64,
    pub ground: Option<GroundBand>,
    pub missing_sensors: Vec<SensorId>,
    pub wedges: Vec<ProjectedWedge>,
}

/// Builds [`Scene`]s from frames, holding the display configuration
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    view: ViewOrientation,
    plot_size_m: f64,
    wedges: Vec<FovWedge>,
}

impl SceneBuilder {
    pub fn new(view: ViewOrientation, plot_size_m: f64, mounts: &[MountGeometry]) -> Self {
        Self {
            view,
            plot_size_m,
            wedges: mounts.iter().map(FovWedge::from_mount).collect(),
        }
    }

    pub fn from_blueprint(blueprint: &MonitorBlueprint) -> Self {
        Self::new(
            blueprint.display.view,
            blueprint.display.plot_size_m,
            &blueprint.sensors.mounts,
        )
    }

    pub fn view(&self) -> ViewOrientation {
        self.view
    }

    pub fn build(&self, generation: u64, frame: &Frame, altitude: AltitudeValue) -> Scene {
        let mut points = Vec::with_capacity(frame.points.len());
        let mut clipped = 0;
        for point in &frame.points {
            let projected = project(point, self.view);
            if projected.within(self.plot_size_m) {
                points.push(projected);
            } else {
                clipped += 1;
            }
        }

        // Sensors without a mount entry are reported but not drawn.
        let wedges = self
            .wedges
            .iter()
            .filter(|w| frame.is_missing(w.sensor))
            .map(|w| w.project(self.view))
            .collect();

        let ground = match self.view {
            ViewOrientation::SideOn if altitude.meters < self.plot_size_m => Some(GroundBand {
                top: altitude.meters,
                bottom: self.plot_size_m,
            }),
            _ => None,
        };

        Scene {
            generation,
            frame_id: frame.frame_id,
            view: self.view,
            plot_size_m: self.plot_size_m,
            points,
            clipped,
            altitude_m: altitude.meters,
            ground,
            missing_sensors: frame.missing_sensors.iter().copied().collect(),
            wedges,
        }
    }
}
