// seisgrid/src/psf/kernel.rs

use super::sources::PointSource;
use crate::coords::EARTH_RADIUS_KM;
use libm::exp;
use log::trace;
use ndarray::{ArrayView3, ArrayViewMut3, Axis, Zip};
use rayon::prelude::*;
use thiserror::Error;

/// Squared, radius-normalised distance beyond which a source contributes nothing.
// Inherited tuning constant of the resolution tests; needs domain review before changing.
pub const KERNEL_CUTOFF: f64 = 10.0;

/// Accumulates point-source contributions into a field, node by node.
///
/// `x`, `y` and `z` hold the normalised geocentric coordinates of every node and must
/// share the field's shape. Implementations add into `field` and never reset it.
pub trait Accumulate: Sync {
    fn accumulate(
        &self,
        field: ArrayViewMut3<f64>,
        x: ArrayView3<f64>,
        y: ArrayView3<f64>,
        z: ArrayView3<f64>,
        sources: &[PointSource],
    ) -> Result<(), KernelError>;
}

/// Gaussian falloff `amplitude * exp(-d2)` truncated at [`KERNEL_CUTOFF`].
#[derive(Clone, Copy, Debug, Default)]
pub struct GaussianKernel;

impl GaussianKernel {
    /// `d2 = 0.5 * |g - s|^2 / (radius / R)^2`
    pub fn distance_sq(source: &PointSource, gx: f64, gy: f64, gz: f64) -> f64 {
        let scale = source.radius / EARTH_RADIUS_KM;
        let dx = source.x - gx;
        let dy = source.y - gy;
        let dz = source.z - gz;
        0.5 * (dx * dx + dy * dy + dz * dz) / (scale * scale)
    }

    pub fn contribution(source: &PointSource, gx: f64, gy: f64, gz: f64) -> f64 {
        let d2 = Self::distance_sq(source, gx, gy, gz);
        if d2 < KERNEL_CUTOFF {
            source.amplitude * exp(-d2)
        } else {
            0.
        }
    }
}

impl Accumulate for GaussianKernel {
    fn accumulate(
        &self,
        mut field: ArrayViewMut3<f64>,
        x: ArrayView3<f64>,
        y: ArrayView3<f64>,
        z: ArrayView3<f64>,
        sources: &[PointSource],
    ) -> Result<(), KernelError> {
        for (name, shape) in [("x", x.shape()), ("y", y.shape()), ("z", z.shape())] {
            if shape != field.shape() {
                return Err(KernelError::ShapeMismatch(
                    name,
                    shape.to_vec(),
                    field.shape().to_vec(),
                ));
            }
        }
        if sources.is_empty() {
            return Ok(());
        }
        // Each worker owns one longitude slab of the output; coordinates are read-only.
        field
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(ilon, mut slab)| {
                Zip::from(&mut slab)
                    .and(x.index_axis(Axis(0), ilon))
                    .and(y.index_axis(Axis(0), ilon))
                    .and(z.index_axis(Axis(0), ilon))
                    .for_each(|node, &gx, &gy, &gz| {
                        *node += sources
                            .iter()
                            .map(|source| Self::contribution(source, gx, gy, gz))
                            .sum::<f64>();
                    });
                trace!("Accumulated longitude slab {}", ilon);
            });
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum KernelError {
    #[error("{0} coordinates have shape {1:?} but the field has shape {2:?}")]
    ShapeMismatch(&'static str, Vec<usize>, Vec<usize>),
}
