use libm::{cos, sin};
use ndarray::{Array, ArrayView, Dimension, Zip};
use thiserror::Error;

/// Mean Earth radius used for all normalisations, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Geographic position to Earth-radius-normalised geocentric Cartesian coordinates.
///
/// The radius is `(R - depth) / R`. Latitude becomes colatitude `90 - lat`, and
/// longitude is the azimuth. Inputs are in degrees and kilometres.
pub fn geocentric_xyz(latitude: f64, longitude: f64, depth: f64) -> [f64; 3] {
    let r = (EARTH_RADIUS_KM - depth) / EARTH_RADIUS_KM;
    let theta = (90. - latitude).to_radians();
    let phi = longitude.to_radians();
    let h = r * sin(theta);
    [h * cos(phi), h * sin(phi), r * cos(theta)]
}

/// Element-wise [`geocentric_xyz`] over arrays of any (matching) shape.
///
/// Works on broadcast views, so a full grid of nodes can be converted without first
/// materialising per-node latitude, longitude and depth arrays.
pub fn latlondep_to_xyz<D: Dimension>(
    latitude: ArrayView<f64, D>,
    longitude: ArrayView<f64, D>,
    depth: ArrayView<f64, D>,
) -> Result<(Array<f64, D>, Array<f64, D>, Array<f64, D>), CoordError> {
    if latitude.shape() != longitude.shape() || latitude.shape() != depth.shape() {
        return Err(CoordError::ShapeMismatch(
            latitude.shape().to_vec(),
            longitude.shape().to_vec(),
            depth.shape().to_vec(),
        ));
    }
    let dim = latitude.raw_dim();
    let mut x = Array::zeros(dim.clone());
    let mut y = Array::zeros(dim.clone());
    let mut z = Array::zeros(dim);
    Zip::from(&mut x)
        .and(&mut y)
        .and(&mut z)
        .and(latitude)
        .and(longitude)
        .and(depth)
        .par_for_each(|x, y, z, &lat, &lon, &dep| {
            let [gx, gy, gz] = geocentric_xyz(lat, lon, dep);
            *x = gx;
            *y = gy;
            *z = gz;
        });
    Ok((x, y, z))
}

#[derive(Error, Debug)]
pub enum CoordError {
    #[error("latitude, longitude and depth must share one shape, but got {0:?}, {1:?} and {2:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>, Vec<usize>),
}
