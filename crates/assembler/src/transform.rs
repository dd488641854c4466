//! Spherical -> Cartesian conversion

use contracts::{CartesianPoint, SphericalReading};

/// Convert `(yaw°, pitch°, distance m)` into the vehicle body frame.
///
/// `z = -d·sin(pitch)`, `h = d·cos(pitch)`, `x = h·cos(yaw)`, `y = h·sin(yaw)`.
/// Mount offsets are not applied; decoder angles are already vehicle-relative.
#[inline]
pub fn spherical_to_cartesian(yaw_deg: f64, pitch_deg: f64, distance_m: f64) -> CartesianPoint {
    let (sin_pitch, cos_pitch) = pitch_deg.to_radians().sin_cos();
    let (sin_yaw, cos_yaw) = yaw_deg.to_radians().sin_cos();
    let horizontal = distance_m * cos_pitch;
    CartesianPoint::new(horizontal * cos_yaw, horizontal * sin_yaw, -distance_m * sin_pitch)
}

/// [`spherical_to_cartesian`] applied to a reading
#[inline]
pub fn reading_to_point(reading: &SphericalReading) -> CartesianPoint {
    spherical_to_cartesian(reading.yaw_deg, reading.pitch_deg, reading.distance_m)
}
