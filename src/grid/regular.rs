// seisgrid/src/grid/regular.rs

use super::axis::Axis;
use super::errors::GridError;
use ndarray::{Array2, Array3};

/// Longitude × latitude × depth node geometry, without data.
#[derive(Clone, Debug, PartialEq)]
pub struct GridAxes3 {
    pub longitude: Axis,
    pub latitude: Axis,
    pub depth: Axis,
}

impl GridAxes3 {
    pub fn new(longitude: Axis, latitude: Axis, depth: Axis) -> Self {
        Self {
            longitude,
            latitude,
            depth,
        }
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.longitude.len(), self.latitude.len(), self.depth.len())
    }

    pub fn node_count(&self) -> usize {
        let (nlon, nlat, ndep) = self.shape();
        nlon * nlat * ndep
    }
}

/// A scalar field sampled on a [`GridAxes3`]. Immutable once built.
#[derive(Clone, Debug)]
pub struct RegularGrid3 {
    axes: GridAxes3,
    data: Array3<f64>,
}

impl RegularGrid3 {
    pub fn new(axes: GridAxes3, data: Array3<f64>) -> Result<Self, GridError> {
        let (nlon, nlat, ndep) = axes.shape();
        if data.dim() != (nlon, nlat, ndep) {
            return Err(GridError::ShapeMismatch {
                data: data.shape().to_vec(),
                axes: vec![nlon, nlat, ndep],
            });
        }
        Ok(Self { axes, data })
    }

    pub fn axes(&self) -> &GridAxes3 {
        &self.axes
    }

    pub fn longitude(&self) -> &Axis {
        &self.axes.longitude
    }

    pub fn latitude(&self) -> &Axis {
        &self.axes.latitude
    }

    pub fn depth(&self) -> &Axis {
        &self.axes.depth
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    pub fn into_data(self) -> Array3<f64> {
        self.data
    }
}

/// A scalar field on a longitude × latitude plane, e.g. topography.
#[derive(Clone, Debug)]
pub struct RegularGrid2 {
    longitude: Axis,
    latitude: Axis,
    data: Array2<f64>,
}

impl RegularGrid2 {
    pub fn new(longitude: Axis, latitude: Axis, data: Array2<f64>) -> Result<Self, GridError> {
        let expected = (longitude.len(), latitude.len());
        if data.dim() != expected {
            return Err(GridError::ShapeMismatch {
                data: data.shape().to_vec(),
                axes: vec![expected.0, expected.1],
            });
        }
        Ok(Self {
            longitude,
            latitude,
            data,
        })
    }

    /// Builds from a latitude-major array, the row layout GMT grids use.
    pub fn from_lat_major(
        longitude: Axis,
        latitude: Axis,
        data: Array2<f64>,
    ) -> Result<Self, GridError> {
        Self::new(longitude, latitude, data.reversed_axes())
    }

    pub fn longitude(&self) -> &Axis {
        &self.longitude
    }

    pub fn latitude(&self) -> &Axis {
        &self.latitude
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }
}
