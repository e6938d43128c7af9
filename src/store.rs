use std::path::{Path, PathBuf};

use hdf5::{Dataset, Extent, File, SimpleExtents};
use ndarray::{s, ArrayView1, ArrayView4, Axis};

use crate::constants::data::{DATA_KEY, HZ_KEY};
use crate::constants::store::HZ_CHUNK;
use crate::error::{Result, Sr3dError};

/// Append-only HDF5 file of fixed-shape prediction volumes and their frequencies.
pub struct Hdf5Store {
	path: PathBuf,
	file: File,
	data: Dataset,
	hz: Dataset,
	volume_shape: [usize; 4],
	len: usize,
}

impl Hdf5Store {
	/// Create (or truncate) `path` with empty, growable `data` and `hz` datasets.
	pub fn create<P: AsRef<Path>>(path: P, volume_shape: [usize; 4]) -> Result<Self> {
		let path = path.as_ref();
		let file = File::create(path)?;
		let [d, h, w, c] = volume_shape;

		let data_extents = SimpleExtents::new(vec![
			Extent::resizable(0),
			Extent::fixed(d),
			Extent::fixed(h),
			Extent::fixed(w),
			Extent::fixed(c),
		]);
		let data = file
			.new_dataset::<f32>()
			.shape(data_extents)
			.chunk([1, d, h, w, c])
			.create(DATA_KEY)?;

		let hz = file
			.new_dataset::<f64>()
			.shape((0..,))
			.chunk((HZ_CHUNK,))
			.create(HZ_KEY)?;

		Ok(Self {
			path: path.to_path_buf(),
			file,
			data,
			hz,
			volume_shape,
			len: 0,
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn volume_shape(&self) -> [usize; 4] {
		self.volume_shape
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Grow both datasets by one entry.
	pub fn append(&mut self, volume: ArrayView4<f32>, hz: f64) -> Result<()> {
		if volume.shape() != &self.volume_shape[..] {
			return Err(Sr3dError::shape_mismatch(&self.volume_shape, volume.shape()));
		}
		let [d, h, w, c] = self.volume_shape;
		let next = self.len + 1;

		self.data.resize((next, d, h, w, c))?;
		self.data
			.write_slice(volume.insert_axis(Axis(0)), s![self.len..next, .., .., .., ..])?;

		let hz_values = [hz];
		self.hz.resize((next,))?;
		self.hz.write_slice(ArrayView1::from(&hz_values[..]), s![self.len..next])?;

		self.len = next;
		Ok(())
	}

	pub fn flush(&self) -> Result<()> {
		self.file.flush()?;
		Ok(())
	}
}
