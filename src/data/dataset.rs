use std::path::Path;

use ndarray::{Array1, Array4, Array5, Axis, Ix5};
use rand::Rng;
use tracing::{debug, info, info_span, Span};

use crate::config::{DatasetConfig, Phase};
use crate::constants::data::{CHANNELS, DATA_KEY, HZ_KEY, INPUT_NORM_BIAS};
use crate::data::augment::{augment_pair, reverse_channels};
use crate::data::container::H5Container;
use crate::error::{Result, Sr3dError};

/// One sample as handed to a model: channel-first volumes plus the sample's frequency.
#[derive(Debug, Clone)]
pub struct VolumeItem {
	pub lr: Array4<f32>,
	pub hr: Option<Array4<f32>>,
	pub hz: f64,
}

/// Paired LR/HR volume stacks read once from HDF5 and served by index.
///
/// Three-channel stacks are reordered to `N D H W C` with reversed channels at load;
/// `get` reverses the last axis again when it has three entries and moves it to the front.
/// The load-time check looks at axis 1 of the stack while the per-item check looks at the
/// item's last axis, so stacks with other channel counts do not round-trip.
pub struct LrHrDataset {
	config: DatasetConfig,
	lr: Array5<f32>,
	hr: Option<Array5<f32>>,
	hz: Array1<f64>,
	span: Span,
}

impl LrHrDataset {
	pub fn new(config: DatasetConfig, parent: &Span) -> Result<Self> {
		config.validate()?;
		let span = info_span!(parent: parent, "dataset", name = %config.name);
		let (lr, hr, hz) = span.in_scope(|| load_pair(&config))?;

		Ok(Self {
			config,
			lr,
			hr,
			hz,
			span,
		})
	}

	pub fn config(&self) -> &DatasetConfig {
		&self.config
	}

	pub fn name(&self) -> &str {
		&self.config.name
	}

	pub fn need_hr(&self) -> bool {
		self.hr.is_some()
	}

	pub fn len(&self) -> usize {
		self.lr.len_of(Axis(0))
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn span(&self) -> &Span {
		&self.span
	}

	pub fn get(&self, index: usize) -> Result<VolumeItem> {
		self.get_with_rng(index, &mut rand::thread_rng())
	}

	pub fn get_with_rng<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> Result<VolumeItem> {
		if index >= self.len() {
			return Err(Sr3dError::IndexOutOfRange { index, len: self.len() });
		}

		let lr = self.lr.index_axis(Axis(0), index).to_owned();
		let hr = self.hr.as_ref().map(|hr| hr.index_axis(Axis(0), index).to_owned());

		let (lr, hr) = if self.config.phase == Phase::Train {
			augment_pair(lr, hr, self.config.use_flip, self.config.use_rot, rng)
		} else {
			(lr, hr)
		};

		Ok(VolumeItem {
			lr: to_channel_first(lr),
			hr: hr.map(to_channel_first),
			hz: self.hz[index],
		})
	}
}

/// Reverse a three-channel stack's channels and move them last: `N C D H W -> N D H W C`.
pub fn canonicalize_channels(stack: Array5<f32>) -> Array5<f32> {
	if stack.len_of(Axis(1)) != CHANNELS {
		return stack;
	}
	stack
		.select(Axis(1), &[2, 1, 0])
		.permuted_axes([0, 2, 3, 4, 1])
		.as_standard_layout()
		.into_owned()
}

fn to_channel_first(volume: Array4<f32>) -> Array4<f32> {
	reverse_channels(volume)
		.permuted_axes([3, 0, 1, 2])
		.as_standard_layout()
		.into_owned()
}

fn load_pair(config: &DatasetConfig) -> Result<(Array5<f32>, Option<Array5<f32>>, Array1<f64>)> {
	let hr_container = match &config.dataroot_hr {
		Some(path) => Some(load_container(path)?),
		None => None,
	};
	let mut lr_container = load_container(&config.dataroot_lr)?;

	let mut lr = take_stack(&mut lr_container)?;
	lr.mapv_inplace(|v| v - INPUT_NORM_BIAS);
	let lr = canonicalize_channels(lr);

	let hz = lr_container.take(HZ_KEY)?.into_f64();
	let hz: Array1<f64> = hz.iter().copied().collect();
	if hz.len() < lr.len_of(Axis(0)) {
		return Err(Sr3dError::shape_mismatch(&[lr.len_of(Axis(0))], &[hz.len()]));
	}

	let hr = match hr_container {
		Some(mut container) => {
			let hr = canonicalize_channels(take_stack(&mut container)?);
			let (hr_count, lr_count) = (hr.len_of(Axis(0)), lr.len_of(Axis(0)));
			if hr_count != lr_count {
				return Err(Sr3dError::SampleCountMismatch { hr: hr_count, lr: lr_count });
			}
			Some(hr)
		}
		None => None,
	};

	debug!(lr_shape = ?lr.shape(), hr_shape = ?hr.as_ref().map(|h| h.shape().to_vec()), "Loaded volume stacks");
	Ok((lr, hr, hz))
}

fn load_container(path: &Path) -> Result<H5Container> {
	info!("Read hdf5: {}", path.display());
	let container = H5Container::open(path)?;
	if container.is_empty() {
		return Err(Sr3dError::EmptyContainer(path.to_path_buf()));
	}
	debug!(keys = ?container.keys().collect::<Vec<_>>(), "Container keys");
	Ok(container)
}

fn take_stack(container: &mut H5Container) -> Result<Array5<f32>> {
	let data = container.take(DATA_KEY)?.into_f32();
	let shape = data.shape().to_vec();
	data.into_dimensionality::<Ix5>().map_err(|_| {
		Sr3dError::InvalidParameter(format!(
			"'{}' in {} must be 5-dimensional, got shape {:?}",
			DATA_KEY,
			container.path().display(),
			shape
		))
	})
}
