// seisgrid/src/cache/npy.rs

use super::errors::CacheError;
use super::ArrayStore;
use log::debug;
use ndarray::{ArrayD, ArrayViewD, IxDyn, ShapeBuilder};
use npyz::{NpyFile, Order, WriteOptions, WriterBuilder};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, ErrorKind};
use std::path::{Component, Path, PathBuf};

/// Stores each entry as `<root>/<name>.npy`.
#[derive(Clone, Debug)]
pub struct NpyDirStore {
    root: PathBuf,
}

impl NpyDirStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry_path(&self, name: &str) -> Result<PathBuf, CacheError> {
        validate_name(name)?;
        Ok(self.root.join(format!("{}.npy", name)))
    }
}

fn validate_name(name: &str) -> Result<(), CacheError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(CacheError::InvalidName(name.to_string())),
    }
}

impl ArrayStore for NpyDirStore {
    fn load(&self, name: &str) -> Result<Option<ArrayD<f64>>, CacheError> {
        let path = self.entry_path(name)?;
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No cache entry at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let npy = NpyFile::new(BufReader::new(file))?;
        let shape: Vec<usize> = npy.shape().iter().map(|&len| len as usize).collect();
        let fortran = matches!(npy.order(), Order::Fortran);
        let values: Vec<f64> = npy.into_vec()?;
        let array = if fortran {
            ArrayD::from_shape_vec(IxDyn(&shape).f(), values)
        } else {
            ArrayD::from_shape_vec(IxDyn(&shape), values)
        }
        .map_err(|e| CacheError::InvalidEntry(path.display().to_string(), e.to_string()))?;
        debug!("Loaded cache entry {} with shape {:?}", path.display(), shape);
        Ok(Some(array))
    }

    fn validate_name(&self, name: &str) -> Result<(), CacheError> {
        validate_name(name)
    }

    fn save(&self, name: &str, array: ArrayViewD<f64>) -> Result<(), CacheError> {
        let path = self.entry_path(name)?;
        fs::create_dir_all(&self.root)?;
        // Write beside the target and rename, so a reader never sees a partial entry.
        let partial = self.root.join(format!("{}.npy.tmp", name));
        let written = write_npy(&partial, &array).and_then(|()| fs::rename(&partial, &path));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&partial) {
                debug!("Could not remove {}: {}", partial.display(), cleanup);
            }
            return Err(e.into());
        }
        debug!("Saved cache entry {} with shape {:?}", path.display(), array.shape());
        Ok(())
    }
}

fn write_npy(path: &Path, array: &ArrayViewD<f64>) -> io::Result<()> {
    let shape: Vec<u64> = array.shape().iter().map(|&len| len as u64).collect();
    let file = BufWriter::new(File::create(path)?);
    let mut writer = WriteOptions::new()
        .default_dtype()
        .shape(&shape)
        .writer(file)
        .begin_nd()?;
    writer.extend(array.iter().copied())?;
    writer.finish()
}
