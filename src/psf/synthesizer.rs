// seisgrid/src/psf/synthesizer.rs

use super::errors::PsfError;
use super::kernel::{Accumulate, GaussianKernel};
use super::sources::{read_source_list, to_point_sources, PointSource};
use crate::cache::{ArrayStore, CacheError};
use crate::coords::latlondep_to_xyz;
use crate::grid::{GridAxes3, GridError, RegularGrid3};
use humantime::format_duration;
use log::{debug, info, warn};
use ndarray::{Array3, Axis, Ix3};
use std::path::Path;
use std::time::Instant;

pub const DEFAULT_CACHE_NAME: &str = "psf_cache";

static DEFAULT_ACCUMULATOR: GaussianKernel = GaussianKernel;

/// What happened to the cache during a synthesis.
#[derive(Debug)]
pub enum CacheStatus {
    /// The field was read from the store; nothing was computed.
    Hit,
    /// The field was computed and stored.
    Stored,
    /// The field was computed but could not be stored.
    StoreFailed(CacheError),
}

#[derive(Debug)]
pub struct Synthesis {
    pub field: Array3<f64>,
    pub cache: CacheStatus,
}

impl Synthesis {
    pub fn was_cached(&self) -> bool {
        matches!(self.cache, CacheStatus::Hit)
    }

    /// Wraps the field as a grid so it can be fed to the profile resampler.
    pub fn into_grid(self, axes: GridAxes3) -> Result<RegularGrid3, GridError> {
        RegularGrid3::new(axes, self.field)
    }
}

pub struct PsfSynthesizer<'a> {
    store: &'a dyn ArrayStore,
    cache_name: String,
    accumulator: &'a dyn Accumulate,
    force_recompute: bool,
}

impl<'a> PsfSynthesizer<'a> {
    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    /// Returns the cached field for `cache_name` if present, otherwise computes and stores it.
    pub fn synthesize(
        &self,
        axes: &GridAxes3,
        sources: &[PointSource],
    ) -> Result<Synthesis, PsfError> {
        if let Some(field) = self.cached_field(axes) {
            return Ok(Synthesis {
                field,
                cache: CacheStatus::Hit,
            });
        }
        self.synthesize_missing(axes, sources)
    }

    /// Like [`Self::synthesize`], but only reads the source list on a cache miss.
    pub fn synthesize_from_path<P: AsRef<Path>>(
        &self,
        axes: &GridAxes3,
        source_list: P,
    ) -> Result<Synthesis, PsfError> {
        if let Some(field) = self.cached_field(axes) {
            return Ok(Synthesis {
                field,
                cache: CacheStatus::Hit,
            });
        }
        debug!("Reading source list {}", source_list.as_ref().display());
        let records = read_source_list(source_list)?;
        let sources = to_point_sources(&records);
        self.synthesize_missing(axes, &sources)
    }

    fn synthesize_missing(
        &self,
        axes: &GridAxes3,
        sources: &[PointSource],
    ) -> Result<Synthesis, PsfError> {
        info!(
            "Begin PSF synthesis of {} sources on a {:?} grid",
            sources.len(),
            axes.shape()
        );
        let field = self.compute(axes, sources)?;
        let cache = self.store_field(&field);
        Ok(Synthesis { field, cache })
    }

    fn cached_field(&self, axes: &GridAxes3) -> Option<Array3<f64>> {
        if self.force_recompute {
            debug!("Skipping cache lookup for {}", self.cache_name);
            return None;
        }
        let array = match self.store.load(&self.cache_name) {
            Ok(Some(array)) => array,
            Ok(None) => {
                debug!("Cache miss for {}", self.cache_name);
                return None;
            }
            Err(e) => {
                warn!(
                    "Could not read cache entry {}, recomputing: {}",
                    self.cache_name, e
                );
                return None;
            }
        };
        match array.into_dimensionality::<Ix3>() {
            Ok(field) if field.dim() == axes.shape() => {
                debug!("Cache hit for {}", self.cache_name);
                Some(field)
            }
            Ok(field) => {
                warn!(
                    "Cache entry {} has shape {:?} but the grid is {:?}, recomputing",
                    self.cache_name,
                    field.dim(),
                    axes.shape()
                );
                None
            }
            Err(e) => {
                warn!(
                    "Cache entry {} is not a 3-D array, recomputing: {}",
                    self.cache_name, e
                );
                None
            }
        }
    }

    fn store_field(&self, field: &Array3<f64>) -> CacheStatus {
        match self.store.save(&self.cache_name, field.view().into_dyn()) {
            Ok(()) => {
                debug!("Stored cache entry {}", self.cache_name);
                CacheStatus::Stored
            }
            Err(e) => {
                warn!("Could not store cache entry {}: {}", self.cache_name, e);
                CacheStatus::StoreFailed(e)
            }
        }
    }

    /// Computes the field without touching the cache.
    pub fn compute(
        &self,
        axes: &GridAxes3,
        sources: &[PointSource],
    ) -> Result<Array3<f64>, PsfError> {
        let now = Instant::now();
        let shape = axes.shape();
        let lon = axes
            .longitude
            .values()
            .view()
            .insert_axis(Axis(1))
            .insert_axis(Axis(2));
        let lat = axes
            .latitude
            .values()
            .view()
            .insert_axis(Axis(0))
            .insert_axis(Axis(2));
        let dep = axes
            .depth
            .values()
            .view()
            .insert_axis(Axis(0))
            .insert_axis(Axis(0));
        let lon_nodes = lon
            .broadcast(shape)
            .ok_or(PsfError::BroadcastError(axes.longitude.len(), shape))?;
        let lat_nodes = lat
            .broadcast(shape)
            .ok_or(PsfError::BroadcastError(axes.latitude.len(), shape))?;
        let dep_nodes = dep
            .broadcast(shape)
            .ok_or(PsfError::BroadcastError(axes.depth.len(), shape))?;
        let (x, y, z) = latlondep_to_xyz(lat_nodes, lon_nodes, dep_nodes)?;
        debug!("Converted {} grid nodes to geocentric coordinates", axes.node_count());

        // A canonical source order makes the sum at every node independent of list order.
        let mut ordered = sources.to_vec();
        ordered.sort_by(|a, b| {
            a.x.total_cmp(&b.x)
                .then(a.y.total_cmp(&b.y))
                .then(a.z.total_cmp(&b.z))
                .then(a.radius.total_cmp(&b.radius))
                .then(a.amplitude.total_cmp(&b.amplitude))
        });

        let mut field = Array3::zeros(shape);
        self.accumulator
            .accumulate(field.view_mut(), x.view(), y.view(), z.view(), &ordered)?;
        info!(
            "Took {} to synthesize PSF field over {} nodes",
            format_duration(now.elapsed()),
            axes.node_count()
        );
        Ok(field)
    }
}

#[derive(Default)]
pub struct PsfSynthesizerBuilder<'a> {
    store: Option<&'a dyn ArrayStore>,
    cache_name: Option<&'a str>,
    accumulator: Option<&'a dyn Accumulate>,
    force_recompute: Option<bool>,
}

impl<'a> PsfSynthesizerBuilder<'a> {
    pub fn build(&self) -> Result<PsfSynthesizer<'a>, PsfError> {
        let store = self
            .store
            .ok_or_else(|| PsfError::UninitializedFieldError("store".to_string()))?;
        let cache_name = self.cache_name.unwrap_or(DEFAULT_CACHE_NAME);
        if cache_name.is_empty() {
            return Err(PsfError::EmptyCacheName);
        }
        store.validate_name(cache_name)?;
        let accumulator = self.accumulator.unwrap_or(&DEFAULT_ACCUMULATOR);
        Ok(PsfSynthesizer {
            store,
            cache_name: cache_name.to_string(),
            accumulator,
            force_recompute: self.force_recompute.unwrap_or(false),
        })
    }

    pub fn store(&mut self, store: &'a dyn ArrayStore) -> &mut Self {
        self.store = Some(store);
        self
    }

    pub fn cache_name(&mut self, cache_name: &'a str) -> &mut Self {
        self.cache_name = Some(cache_name);
        self
    }

    pub fn accumulator(&mut self, accumulator: &'a dyn Accumulate) -> &mut Self {
        self.accumulator = Some(accumulator);
        self
    }

    pub fn force_recompute(&mut self, force_recompute: bool) -> &mut Self {
        self.force_recompute = Some(force_recompute);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryStore, NpyDirStore};
    use crate::coords::EARTH_RADIUS_KM;
    use crate::grid::Axis as GridAxis;
    use crate::profile::model_interp;
    use crate::psf::kernel::KernelError;
    use crate::psf::sources::SourceRecord;
    use ndarray::{array, ArrayD, ArrayView3, ArrayViewD, ArrayViewMut3};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingKernel {
        calls: AtomicUsize,
    }

    impl CountingKernel {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Accumulate for CountingKernel {
        fn accumulate(
            &self,
            field: ArrayViewMut3<f64>,
            x: ArrayView3<f64>,
            y: ArrayView3<f64>,
            z: ArrayView3<f64>,
            sources: &[PointSource],
        ) -> Result<(), KernelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            GaussianKernel.accumulate(field, x, y, z, sources)
        }
    }

    struct ReadOnlyStore;

    impl ArrayStore for ReadOnlyStore {
        fn load(&self, _name: &str) -> Result<Option<ArrayD<f64>>, CacheError> {
            Ok(None)
        }

        fn save(&self, _name: &str, _array: ArrayViewD<f64>) -> Result<(), CacheError> {
            Err(CacheError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    fn test_axes() -> GridAxes3 {
        GridAxes3::new(
            GridAxis::linspace(100., 110., 6).unwrap(),
            GridAxis::linspace(25., 35., 5).unwrap(),
            GridAxis::linspace(0., 800., 9).unwrap(),
        )
    }

    fn test_sources() -> Vec<PointSource> {
        let records = [
            (102., 28., 200., 300., 0.01),
            (105., 30., 400., 250., -0.01),
            (108., 33., 600., 400., 0.02),
            (105., 30., 400., 250., 0.005),
        ];
        records
            .iter()
            .map(|&(longitude, latitude, depth, radius, amplitude)| {
                PointSource::from(&SourceRecord {
                    longitude,
                    latitude,
                    depth,
                    radius,
                    amplitude,
                })
            })
            .collect()
    }

    #[test]
    fn test_zero_sources_gives_zero_field() {
        let store = MemoryStore::new();
        let synthesizer = PsfSynthesizerBuilder::default().store(&store).build().unwrap();
        let result = synthesizer.synthesize(&test_axes(), &[]).unwrap();
        assert_eq!(result.field.dim(), (6, 5, 9));
        assert!(result.field.iter().all(|&v| v == 0.));
        assert!(matches!(result.cache, CacheStatus::Stored));
        assert!(store.contains(DEFAULT_CACHE_NAME));
    }

    #[test]
    fn test_source_at_earth_centre() {
        let store = MemoryStore::new();
        let synthesizer = PsfSynthesizerBuilder::default().store(&store).build().unwrap();
        let axes = GridAxes3::new(
            GridAxis::try_from(vec![0., 10.]).unwrap(),
            GridAxis::try_from(vec![0., 10.]).unwrap(),
            GridAxis::try_from(vec![0., EARTH_RADIUS_KM]).unwrap(),
        );
        let source = PointSource::new([0., 0., 0.], 100., 2.);
        let field = synthesizer.synthesize(&axes, &[source]).unwrap().field;
        for i in 0..2 {
            for j in 0..2 {
                assert_eq!(field[[i, j, 1]], 2.);
                assert_eq!(field[[i, j, 0]], 0.);
            }
        }
    }

    #[test]
    fn test_source_order_invariance() {
        let store = MemoryStore::new();
        let synthesizer = PsfSynthesizerBuilder::default()
            .store(&store)
            .force_recompute(true)
            .build()
            .unwrap();
        let sources = test_sources();
        let mut reversed = sources.clone();
        reversed.reverse();
        let mut rotated = sources.clone();
        rotated.rotate_left(1);
        let forward = synthesizer.compute(&test_axes(), &sources).unwrap();
        assert!(forward.iter().any(|&v| v != 0.));
        assert_eq!(forward, synthesizer.compute(&test_axes(), &reversed).unwrap());
        assert_eq!(forward, synthesizer.compute(&test_axes(), &rotated).unwrap());
    }

    #[test]
    fn test_matches_direct_sum() {
        let store = MemoryStore::new();
        let synthesizer = PsfSynthesizerBuilder::default().store(&store).build().unwrap();
        let axes = test_axes();
        let sources = test_sources();
        let field = synthesizer.synthesize(&axes, &sources).unwrap().field;
        let (i, j, k) = (2, 2, 4);
        let [gx, gy, gz] = crate::coords::geocentric_xyz(
            axes.latitude.values()[j],
            axes.longitude.values()[i],
            axes.depth.values()[k],
        );
        let expected: f64 = sources
            .iter()
            .map(|s| GaussianKernel::contribution(s, gx, gy, gz))
            .sum();
        assert!((field[[i, j, k]] - expected).abs() < 1e-15);
    }

    #[test]
    fn test_second_call_uses_cache() {
        crate::_setup_pretty_env_logger_default();
        let dir = tempfile::tempdir().unwrap();
        let store = NpyDirStore::new(dir.path());
        let kernel = CountingKernel::new();
        let synthesizer = PsfSynthesizerBuilder::default()
            .store(&store)
            .accumulator(&kernel)
            .build()
            .unwrap();
        let first = synthesizer.synthesize(&test_axes(), &test_sources()).unwrap();
        assert!(matches!(first.cache, CacheStatus::Stored));
        let second = synthesizer.synthesize(&test_axes(), &test_sources()).unwrap();
        assert!(second.was_cached());
        assert_eq!(kernel.calls(), 1);
        assert_eq!(first.field, second.field);
        assert!(dir.path().join("psf_cache.npy").is_file());
    }

    #[test]
    fn test_prefilled_cache_is_returned_without_compute() {
        let store = MemoryStore::new();
        let cached = Array3::from_elem((6, 5, 9), 0.25);
        store.save(DEFAULT_CACHE_NAME, cached.view().into_dyn()).unwrap();
        let kernel = CountingKernel::new();
        let synthesizer = PsfSynthesizerBuilder::default()
            .store(&store)
            .accumulator(&kernel)
            .build()
            .unwrap();
        let result = synthesizer.synthesize(&test_axes(), &test_sources()).unwrap();
        assert!(result.was_cached());
        assert_eq!(result.field, cached);
        assert_eq!(kernel.calls(), 0);
    }

    #[test]
    fn test_force_recompute_skips_cache() {
        let store = MemoryStore::new();
        let kernel = CountingKernel::new();
        let mut builder = PsfSynthesizerBuilder::default();
        builder.store(&store).accumulator(&kernel).force_recompute(true);
        let synthesizer = builder.build().unwrap();
        synthesizer.synthesize(&test_axes(), &test_sources()).unwrap();
        let again = synthesizer.synthesize(&test_axes(), &test_sources()).unwrap();
        assert!(!again.was_cached());
        assert_eq!(kernel.calls(), 2);
    }

    #[test]
    fn test_unreadable_cache_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("psf_cache.npy"), b"garbage").unwrap();
        let store = NpyDirStore::new(dir.path());
        let kernel = CountingKernel::new();
        let synthesizer = PsfSynthesizerBuilder::default()
            .store(&store)
            .accumulator(&kernel)
            .build()
            .unwrap();
        let result = synthesizer.synthesize(&test_axes(), &test_sources()).unwrap();
        assert_eq!(kernel.calls(), 1);
        assert!(matches!(result.cache, CacheStatus::Stored));
        assert!(store.load("psf_cache").unwrap().is_some());
    }

    #[test]
    fn test_cached_shape_mismatch_recomputes() {
        let store = MemoryStore::new();
        store
            .save("psf_cache", Array3::<f64>::zeros((2, 2, 2)).into_dyn().view())
            .unwrap();
        let kernel = CountingKernel::new();
        let synthesizer = PsfSynthesizerBuilder::default()
            .store(&store)
            .accumulator(&kernel)
            .build()
            .unwrap();
        let result = synthesizer.synthesize(&test_axes(), &test_sources()).unwrap();
        assert_eq!(kernel.calls(), 1);
        assert_eq!(result.field.dim(), (6, 5, 9));
    }

    #[test]
    fn test_store_failure_still_returns_field() {
        let store = ReadOnlyStore;
        let synthesizer = PsfSynthesizerBuilder::default().store(&store).build().unwrap();
        let result = synthesizer.synthesize(&test_axes(), &test_sources()).unwrap();
        assert!(matches!(
            result.cache,
            CacheStatus::StoreFailed(CacheError::IoError(_))
        ));
        assert!(result.field.iter().any(|&v| v != 0.));
    }

    #[test]
    fn test_from_path_malformed_list() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("psf_list.txt");
        fs::write(&list, "105 30 400 250 0.01\n105 30 oops 250 0.01\n").unwrap();
        let store = MemoryStore::new();
        let kernel = CountingKernel::new();
        let synthesizer = PsfSynthesizerBuilder::default()
            .store(&store)
            .accumulator(&kernel)
            .build()
            .unwrap();
        let result = synthesizer.synthesize_from_path(&test_axes(), &list);
        assert!(matches!(result, Err(PsfError::SourceListError(_))));
        assert_eq!(kernel.calls(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_from_path_hit_does_not_read_list() {
        let store = MemoryStore::new();
        let synthesizer = PsfSynthesizerBuilder::default()
            .store(&store)
            .cache_name("psf_run_a")
            .build()
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("psf_list.txt");
        fs::write(&list, "102 28 200 300 0.01\n").unwrap();
        let first = synthesizer.synthesize_from_path(&test_axes(), &list).unwrap();
        fs::remove_file(&list).unwrap();
        let second = synthesizer.synthesize_from_path(&test_axes(), &list).unwrap();
        assert!(second.was_cached());
        assert_eq!(first.field, second.field);
        assert!(store.contains("psf_run_a"));
    }

    #[test]
    fn test_builder_requires_store() {
        let result = PsfSynthesizerBuilder::default().build();
        assert!(matches!(result, Err(PsfError::UninitializedFieldError(_))));
        let store = MemoryStore::new();
        let result = PsfSynthesizerBuilder::default()
            .store(&store)
            .cache_name("")
            .build();
        assert!(matches!(result, Err(PsfError::EmptyCacheName)));
    }

    #[test]
    fn test_builder_rejects_name_the_store_cannot_hold() {
        let dir = tempfile::tempdir().unwrap();
        let store = NpyDirStore::new(dir.path());
        for name in ["a/b", "..", "../psf_cache"] {
            let result = PsfSynthesizerBuilder::default()
                .store(&store)
                .cache_name(name)
                .build();
            assert!(
                matches!(result, Err(PsfError::CacheError(CacheError::InvalidName(_)))),
                "{:?} should be rejected",
                name
            );
        }
        let memory = MemoryStore::new();
        assert!(PsfSynthesizerBuilder::default()
            .store(&memory)
            .cache_name("a/b")
            .build()
            .is_ok());
    }

    #[test]
    fn test_field_feeds_profile_resampler() {
        let store = MemoryStore::new();
        let synthesizer = PsfSynthesizerBuilder::default().store(&store).build().unwrap();
        let axes = test_axes();
        let synthesis = synthesizer.synthesize(&axes, &test_sources()).unwrap();
        let expected = synthesis.field[[3, 2, 4]];
        let grid = synthesis.into_grid(axes).unwrap();
        let section = model_interp(
            &grid,
            array![106.].view(),
            array![30.].view(),
            array![400.].view(),
        )
        .unwrap();
        assert!((section[[0, 0]] - expected).abs() < 1e-15);
    }
}
