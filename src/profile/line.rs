// seisgrid/src/profile/line.rs

//! Great-circle profile lines on a spherical Earth.
//!
//! Points are `(longitude, latitude)` pairs in degrees. Sampled longitudes stay on the
//! branch of the start point, so a line crossing the antimeridian keeps increasing past
//! 180 instead of wrapping.

use super::errors::LineError;
use derive_builder::Builder;
use libm::{asin, atan2, cos, sin, sqrt};
use ndarray::Array1;

const ANTIPODAL_TOLERANCE: f64 = 1e-12;
// Keeps rounding in the arc length from adding a near-empty extra segment.
const STEP_TOLERANCE: f64 = 1e-9;
const MAX_SEGMENTS: f64 = 1e7;

fn unit_vector((lon, lat): (f64, f64)) -> [f64; 3] {
    let (lon, lat) = (lon.to_radians(), lat.to_radians());
    [cos(lat) * cos(lon), cos(lat) * sin(lon), sin(lat)]
}

fn to_lonlat(v: [f64; 3]) -> (f64, f64) {
    let lat = asin(v[2].clamp(-1., 1.));
    let lon = atan2(v[1], v[0]);
    (lon.to_degrees(), lat.to_degrees())
}

/// Shifts `lon` by whole turns to lie within 180 degrees of `reference`.
fn unwrap_longitude(lon: f64, reference: f64) -> f64 {
    lon - 360. * ((lon - reference) / 360.).round()
}

/// Central angle between two points, in radians.
pub fn central_angle(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (u, v) = (unit_vector(a), unit_vector(b));
    let cross = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let sin_angle = sqrt(cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]);
    let cos_angle = u[0] * v[0] + u[1] * v[1] + u[2] * v[2];
    atan2(sin_angle, cos_angle)
}

fn check_endpoints(start: (f64, f64), end: (f64, f64)) -> Result<f64, LineError> {
    let angle = central_angle(start, end);
    if angle == 0. {
        return Err(LineError::DegenerateLine(start.0, start.1));
    }
    if sin(angle).abs() < ANTIPODAL_TOLERANCE {
        return Err(LineError::AntipodalLine(start.0, start.1, end.0, end.1));
    }
    Ok(angle)
}

/// The point `length` degrees of arc from `start`, heading along the great circle
/// through `end`.
pub fn extend_line(
    start: (f64, f64),
    end: (f64, f64),
    length: f64,
) -> Result<(f64, f64), LineError> {
    check_endpoints(start, end)?;
    let (lon1, lat1) = (start.0.to_radians(), start.1.to_radians());
    let (lon2, lat2) = (end.0.to_radians(), end.1.to_radians());
    let dlon = lon2 - lon1;
    let azimuth = atan2(
        sin(dlon) * cos(lat2),
        cos(lat1) * sin(lat2) - sin(lat1) * cos(lat2) * cos(dlon),
    );
    let delta = length.to_radians();
    let sin_lat = sin(lat1) * cos(delta) + cos(lat1) * sin(delta) * cos(azimuth);
    let lat = asin(sin_lat.clamp(-1., 1.));
    let lon = lon1
        + atan2(
            sin(azimuth) * sin(delta) * cos(lat1),
            cos(delta) - sin(lat1) * sin(lat),
        );
    Ok((unwrap_longitude(lon.to_degrees(), start.0), lat.to_degrees()))
}

/// Evenly spaced points from `start` to `end`, both included, at most `step` degrees apart.
pub fn great_circle_points(
    start: (f64, f64),
    end: (f64, f64),
    step: f64,
) -> Result<(Array1<f64>, Array1<f64>), LineError> {
    if !(step > 0.) {
        return Err(LineError::InvalidStep(step));
    }
    let angle = check_endpoints(start, end)?;
    let segments = (angle.to_degrees() / step - STEP_TOLERANCE).ceil();
    if !segments.is_finite() || segments > MAX_SEGMENTS {
        return Err(LineError::InvalidStep(step));
    }
    let segments = (segments as usize).max(1);
    let (a, b) = (unit_vector(start), unit_vector(end));
    let sin_angle = sin(angle);
    let mut lons = Array1::zeros(segments + 1);
    let mut lats = Array1::zeros(segments + 1);
    let mut previous = start.0;
    for n in 0..=segments {
        let f = n as f64 / segments as f64;
        let wa = sin((1. - f) * angle) / sin_angle;
        let wb = sin(f * angle) / sin_angle;
        let (lon, lat) = to_lonlat([
            wa * a[0] + wb * b[0],
            wa * a[1] + wb * b[1],
            wa * a[2] + wb * b[2],
        ]);
        let lon = unwrap_longitude(lon, previous);
        lons[n] = lon;
        lats[n] = lat;
        previous = lon;
    }
    lons[0] = start.0;
    lats[0] = start.1;
    lons[segments] = unwrap_longitude(end.0, lons[segments - 1]);
    lats[segments] = end.1;
    Ok((lons, lats))
}

/// A profile line, optionally stretched to a fixed arc length from its start.
#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct LineSpec {
    start: (f64, f64),
    end: (f64, f64),
    /// Sampling interval in degrees of arc.
    #[builder(default = "0.02")]
    step: f64,
    /// Arc length in degrees; the end point is moved to match when set.
    #[builder(default, setter(strip_option))]
    length: Option<f64>,
}

impl LineSpecBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(step) = self.step {
            if !(step > 0.) {
                return Err(format!("step must be > 0, but got {}", step));
            }
        }
        if let Some(Some(length)) = self.length {
            if !(length > 0.) {
                return Err(format!("length must be > 0, but got {}", length));
            }
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start == end {
                return Err(format!("start and end coincide at {:?}", start));
            }
        }
        Ok(())
    }
}

impl LineSpec {
    pub fn start(&self) -> (f64, f64) {
        self.start
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// The end point after applying `length`, if any.
    pub fn end(&self) -> Result<(f64, f64), LineError> {
        match self.length {
            Some(length) => extend_line(self.start, self.end, length),
            None => Ok(self.end),
        }
    }

    pub fn arc_length(&self) -> Result<f64, LineError> {
        Ok(central_angle(self.start, self.end()?).to_degrees())
    }

    /// Paired longitude and latitude samples, ready for `model_interp` or `topo_interp`.
    pub fn profile(&self) -> Result<(Array1<f64>, Array1<f64>), LineError> {
        great_circle_points(self.start, self.end()?, self.step)
    }
}
