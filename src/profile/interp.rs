// seisgrid/src/profile/interp.rs

use super::errors::ResampleError;
use crate::grid::{Axis as GridAxis, AxisName, RegularGrid2, RegularGrid3};
use log::debug;
use ndarray::{
    s, stack, Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Axis, DataMut, Dimension,
};
use rayon::prelude::*;

fn locate(axis: &GridAxis, name: AxisName, value: f64) -> Result<(usize, f64), ResampleError> {
    axis.locate(value).ok_or(ResampleError::OutOfDomain {
        axis: name,
        value,
        min: axis.min(),
        max: axis.max(),
    })
}

/// Lower-node and upper-node weights for a cell fraction.
fn weights(t: f64) -> [(usize, f64); 2] {
    [(0, 1. - t), (1, t)]
}

impl RegularGrid3 {
    /// Trilinear interpolation at one point.
    ///
    /// Corners with zero weight are skipped, so a NaN node only spreads into cells it
    /// actually touches and node coordinates return stored values exactly.
    pub fn interpolate(&self, lon: f64, lat: f64, dep: f64) -> Result<f64, ResampleError> {
        let (i, tx) = locate(self.longitude(), AxisName::Longitude, lon)?;
        let (j, ty) = locate(self.latitude(), AxisName::Latitude, lat)?;
        let (k, tz) = locate(self.depth(), AxisName::Depth, dep)?;
        let data = self.data();
        let mut value = 0.;
        for (di, wx) in weights(tx) {
            for (dj, wy) in weights(ty) {
                for (dk, wz) in weights(tz) {
                    let w = wx * wy * wz;
                    if w != 0. {
                        value += w * data[[i + di, j + dj, k + dk]];
                    }
                }
            }
        }
        Ok(value)
    }

    /// Interpolates every row `(lon, lat, dep)` of an `(n, 3)` array in parallel.
    pub fn interpolate_batch(&self, points: ArrayView2<f64>) -> Result<Array1<f64>, ResampleError> {
        if points.ncols() != 3 {
            return Err(ResampleError::ShapeMismatch(format!(
                "query points must have 3 columns, but got {}",
                points.ncols()
            )));
        }
        let values = points
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|point| self.interpolate(point[0], point[1], point[2]))
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(Array1::from_vec(values))
    }
}

impl RegularGrid2 {
    /// Bilinear interpolation at one point.
    pub fn interpolate(&self, lon: f64, lat: f64) -> Result<f64, ResampleError> {
        let (i, tx) = locate(self.longitude(), AxisName::Longitude, lon)?;
        let (j, ty) = locate(self.latitude(), AxisName::Latitude, lat)?;
        let data = self.data();
        let mut value = 0.;
        for (di, wx) in weights(tx) {
            for (dj, wy) in weights(ty) {
                let w = wx * wy;
                if w != 0. {
                    value += w * data[[i + di, j + dj]];
                }
            }
        }
        Ok(value)
    }

    /// Interpolates every row `(lon, lat)` of an `(n, 2)` array in parallel.
    pub fn interpolate_batch(&self, points: ArrayView2<f64>) -> Result<Array1<f64>, ResampleError> {
        if points.ncols() != 2 {
            return Err(ResampleError::ShapeMismatch(format!(
                "query points must have 2 columns, but got {}",
                points.ncols()
            )));
        }
        let values = points
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|point| self.interpolate(point[0], point[1]))
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(Array1::from_vec(values))
    }
}

fn check_paired(lons: &ArrayView1<f64>, lats: &ArrayView1<f64>) -> Result<(), ResampleError> {
    if lons.len() != lats.len() {
        return Err(ResampleError::ShapeMismatch(format!(
            "longitude and latitude sequences must pair up, but got {} and {} values",
            lons.len(),
            lats.len()
        )));
    }
    Ok(())
}

/// Vertical cross-section along a profile.
///
/// `out[[i, j]]` is the field at `(lons[i], lats[i], deps[j])`. The full `N × M` query set
/// is built by broadcasting and interpolated in one batch.
pub fn model_interp(
    grid: &RegularGrid3,
    lons: ArrayView1<f64>,
    lats: ArrayView1<f64>,
    deps: ArrayView1<f64>,
) -> Result<Array2<f64>, ResampleError> {
    check_paired(&lons, &lats)?;
    let (n, m) = (lons.len(), deps.len());
    let mut points = Array2::zeros((n * m, 3));
    {
        let mut queries = points.view_mut().into_shape((n, m, 3))?;
        queries
            .slice_mut(s![.., .., 0])
            .assign(&lons.insert_axis(Axis(1)));
        queries
            .slice_mut(s![.., .., 1])
            .assign(&lats.insert_axis(Axis(1)));
        queries
            .slice_mut(s![.., .., 2])
            .assign(&deps.insert_axis(Axis(0)));
    }
    debug!("Interpolating cross-section of {} positions x {} depths", n, m);
    let values = grid.interpolate_batch(points.view())?;
    Ok(values.into_shape((n, m))?)
}

/// Elevation (or any 2-D field) along a profile.
pub fn topo_interp(
    grid: &RegularGrid2,
    lons: ArrayView1<f64>,
    lats: ArrayView1<f64>,
) -> Result<Array1<f64>, ResampleError> {
    check_paired(&lons, &lats)?;
    let points = stack(Axis(1), &[lons.view(), lats.view()])?;
    grid.interpolate_batch(points.view())
}

/// Horizontal map at a fixed depth, with shape `(lons.len(), lats.len())`.
pub fn depth_slice(
    grid: &RegularGrid3,
    depth: f64,
    lons: ArrayView1<f64>,
    lats: ArrayView1<f64>,
) -> Result<Array2<f64>, ResampleError> {
    let (n, m) = (lons.len(), lats.len());
    let mut points = Array2::from_elem((n * m, 3), depth);
    {
        let mut queries = points.view_mut().into_shape((n, m, 3))?;
        queries
            .slice_mut(s![.., .., 0])
            .assign(&lons.insert_axis(Axis(1)));
        queries
            .slice_mut(s![.., .., 1])
            .assign(&lats.insert_axis(Axis(0)));
    }
    debug!("Interpolating depth slice at {} km on {} x {} nodes", depth, n, m);
    let values = grid.interpolate_batch(points.view())?;
    Ok(values.into_shape((n, m))?)
}

/// Replaces values strictly above `threshold` with NaN, e.g. the `9e6` fill of kernel volumes.
pub fn mask_above<S, D>(array: &mut ArrayBase<S, D>, threshold: f64)
where
    S: DataMut<Elem = f64>,
    D: Dimension,
{
    array.mapv_inplace(|v| if v > threshold { f64::NAN } else { v });
}
