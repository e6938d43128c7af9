use ndarray::{stack, Array4, Array5, ArrayView4, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::dataset::{LrHrDataset, VolumeItem};
use crate::error::{Result, Sr3dError};

/// Stacked samples: `B C D H W` volumes with their frequencies and dataset indices.
#[derive(Debug, Clone)]
pub struct Batch {
	pub lr: Array5<f32>,
	pub hr: Option<Array5<f32>>,
	pub hz: Vec<f64>,
	pub indices: Vec<usize>,
}

impl Batch {
	pub fn from_items(items: Vec<VolumeItem>, indices: Vec<usize>) -> Result<Self> {
		let first = items
			.first()
			.ok_or_else(|| Sr3dError::InvalidParameter("Cannot build an empty batch".into()))?;

		let lr_views: Vec<ArrayView4<f32>> = items.iter().map(|item| item.lr.view()).collect();
		let lr = stack_volumes(&lr_views, first.lr.shape())?;

		let hr = if first.hr.is_some() {
			let hr_views = items
				.iter()
				.map(|item| {
					item.hr
						.as_ref()
						.map(|hr| hr.view())
						.ok_or_else(|| Sr3dError::InvalidParameter("Batch mixes samples with and without HR".into()))
				})
				.collect::<Result<Vec<_>>>()?;
			let hr_shape = hr_views[0].shape().to_vec();
			Some(stack_volumes(&hr_views, &hr_shape)?)
		} else {
			None
		};

		Ok(Self {
			lr,
			hr,
			hz: items.iter().map(|item| item.hz).collect(),
			indices,
		})
	}

	pub fn len(&self) -> usize {
		self.lr.len_of(Axis(0))
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn lr_sample(&self, i: usize) -> Array4<f32> {
		self.lr.index_axis(Axis(0), i).to_owned()
	}
}

fn stack_volumes(views: &[ArrayView4<f32>], expected: &[usize]) -> Result<Array5<f32>> {
	if let Some(bad) = views.iter().find(|v| v.shape() != expected) {
		return Err(Sr3dError::shape_mismatch(expected, bad.shape()));
	}
	Ok(stack(Axis(0), views)?)
}

/// Iterates an `LrHrDataset` in batches, optionally shuffled.
pub struct DataLoader<'a> {
	dataset: &'a LrHrDataset,
	batch_size: usize,
	order: Vec<usize>,
	rng: StdRng,
}

impl<'a> DataLoader<'a> {
	pub fn new(dataset: &'a LrHrDataset, batch_size: usize, shuffle: bool) -> Result<Self> {
		Self::with_rng(dataset, batch_size, shuffle, StdRng::from_entropy())
	}

	pub fn seeded(dataset: &'a LrHrDataset, batch_size: usize, shuffle: bool, seed: u64) -> Result<Self> {
		Self::with_rng(dataset, batch_size, shuffle, StdRng::seed_from_u64(seed))
	}

	fn with_rng(dataset: &'a LrHrDataset, batch_size: usize, shuffle: bool, mut rng: StdRng) -> Result<Self> {
		if batch_size == 0 {
			return Err(Sr3dError::InvalidParameter("Batch size must be greater than 0".into()));
		}
		let mut order: Vec<usize> = (0..dataset.len()).collect();
		if shuffle {
			order.shuffle(&mut rng);
		}
		Ok(Self {
			dataset,
			batch_size,
			order,
			rng,
		})
	}

	pub fn from_config(dataset: &'a LrHrDataset) -> Result<Self> {
		let config = dataset.config();
		Self::new(dataset, config.batch_size, config.shuffle)
	}

	pub fn dataset(&self) -> &LrHrDataset {
		self.dataset
	}

	/// Number of batches, counting a trailing short one.
	pub fn len(&self) -> usize {
		(self.order.len() + self.batch_size - 1) / self.batch_size
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	pub fn iter(&mut self) -> BatchIter<'_, 'a> {
		BatchIter { loader: self, position: 0 }
	}
}

pub struct BatchIter<'l, 'a> {
	loader: &'l mut DataLoader<'a>,
	position: usize,
}

impl<'l, 'a> Iterator for BatchIter<'l, 'a> {
	type Item = Result<Batch>;

	fn next(&mut self) -> Option<Self::Item> {
		let loader = &mut *self.loader;
		if self.position >= loader.order.len() {
			return None;
		}
		let end = (self.position + loader.batch_size).min(loader.order.len());
		let indices = loader.order[self.position..end].to_vec();
		self.position = end;

		let items = indices
			.iter()
			.map(|&index| loader.dataset.get_with_rng(index, &mut loader.rng))
			.collect::<Result<Vec<_>>>();
		Some(items.and_then(|items| Batch::from_items(items, indices)))
	}
}
