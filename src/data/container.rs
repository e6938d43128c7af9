use std::path::{Path, PathBuf};

use hdf5::Dataset;
use indexmap::IndexMap;
use ndarray::{ArrayD, IxDyn};

use crate::error::{Result, Sr3dError};

/// A dataset read from an HDF5 file. Eight-byte types keep double precision.
#[derive(Debug, Clone)]
pub enum H5Array {
	F32(ArrayD<f32>),
	F64(ArrayD<f64>),
}

impl H5Array {
	pub fn shape(&self) -> &[usize] {
		match self {
			H5Array::F32(arr) => arr.shape(),
			H5Array::F64(arr) => arr.shape(),
		}
	}

	pub fn len(&self) -> usize {
		self.shape().first().copied().unwrap_or(0)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn into_f32(self) -> ArrayD<f32> {
		match self {
			H5Array::F32(arr) => arr,
			H5Array::F64(arr) => arr.mapv(|v| v as f32),
		}
	}

	pub fn into_f64(self) -> ArrayD<f64> {
		match self {
			H5Array::F32(arr) => arr.mapv(f64::from),
			H5Array::F64(arr) => arr,
		}
	}

	/// (min, max, mean) over every element, `None` for an empty array.
	pub fn summary(&self) -> Option<(f64, f64, f64)> {
		match self {
			H5Array::F32(arr) => summarise(arr.iter().map(|&v| f64::from(v)), arr.len()),
			H5Array::F64(arr) => summarise(arr.iter().copied(), arr.len()),
		}
	}
}

fn summarise(values: impl Iterator<Item = f64>, count: usize) -> Option<(f64, f64, f64)> {
	if count == 0 {
		return None;
	}
	let (min, max, sum) = values.fold((f64::INFINITY, f64::NEG_INFINITY, 0.0), |(min, max, sum), v| {
		(min.min(v), max.max(v), sum + v)
	});
	Some((min, max, sum / count as f64))
}

/// In-memory mirror of every dataset at the root of an HDF5 file.
///
/// Keys keep the file's member order so iteration is deterministic.
#[derive(Debug, Clone)]
pub struct H5Container {
	path: PathBuf,
	arrays: IndexMap<String, H5Array>,
}

impl H5Container {
	pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		if !path.exists() {
			return Err(Sr3dError::FileNotFound(path.to_path_buf()));
		}

		let file = hdf5::File::open(path)?;
		let mut arrays = IndexMap::new();
		for dataset in file.datasets()? {
			let name = dataset.name();
			let key = name.trim_start_matches('/').to_string();
			arrays.insert(key, read_dataset(&dataset)?);
		}

		Ok(Self {
			path: path.to_path_buf(),
			arrays,
		})
	}

	pub fn from_arrays(path: impl Into<PathBuf>, arrays: IndexMap<String, H5Array>) -> Self {
		Self {
			path: path.into(),
			arrays,
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn len(&self) -> usize {
		self.arrays.len()
	}

	pub fn is_empty(&self) -> bool {
		self.arrays.is_empty()
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.arrays.keys().map(|k| k.as_str())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &H5Array)> {
		self.arrays.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn get(&self, key: &str) -> Option<&H5Array> {
		self.arrays.get(key)
	}

	pub fn require(&self, key: &str) -> Result<&H5Array> {
		self.arrays.get(key).ok_or_else(|| self.missing(key))
	}

	/// Removes `key` from the mirror, failing if it is absent.
	pub fn take(&mut self, key: &str) -> Result<H5Array> {
		match self.arrays.shift_remove(key) {
			Some(array) => Ok(array),
			None => Err(self.missing(key)),
		}
	}

	fn missing(&self, key: &str) -> Sr3dError {
		Sr3dError::MissingKey {
			path: self.path.clone(),
			key: key.to_string(),
		}
	}
}

fn read_dataset(dataset: &Dataset) -> Result<H5Array> {
	let wide = dataset.dtype()?.size() >= 8;
	let array = if wide {
		H5Array::F64(dataset.read_dyn::<f64>()?)
	} else {
		H5Array::F32(dataset.read_dyn::<f32>()?)
	};

	// Scalars come back zero-dimensional; give them a leading axis.
	Ok(match array {
		H5Array::F32(arr) if arr.ndim() == 0 => H5Array::F32(arr.into_shape(IxDyn(&[1]))?),
		H5Array::F64(arr) if arr.ndim() == 0 => H5Array::F64(arr.into_shape(IxDyn(&[1]))?),
		other => other,
	})
}
