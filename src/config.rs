use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{loader, model, store};
use crate::error::{Result, Sr3dError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
	Train,
	Test,
}

impl Phase {
	pub fn from_str(s: &str) -> Result<Self> {
		match s.to_lowercase().as_str() {
			"train" => Ok(Phase::Train),
			"test" | "val" => Ok(Phase::Test),
			_ => Err(Sr3dError::InvalidParameter(format!("Unknown phase: {}", s))),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
	Nearest,
	Trilinear,
}

impl Interpolation {
	pub fn from_str(s: &str) -> Result<Self> {
		match s.to_lowercase().as_str() {
			"nearest" => Ok(Interpolation::Nearest),
			"trilinear" => Ok(Interpolation::Trilinear),
			_ => Err(Sr3dError::InvalidParameter(format!("Unknown interpolation: {}", s))),
		}
	}
}

/// Everything `LrHrDataset` and its loader read from the options file.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
	pub name: String,
	pub dataroot_lr: PathBuf,
	pub dataroot_hr: Option<PathBuf>,
	pub phase: Phase,
	pub use_flip: bool,
	pub use_rot: bool,
	pub lr_size: usize,
	pub batch_size: usize,
	pub shuffle: bool,
}

impl Default for DatasetConfig {
	fn default() -> Self {
		Self {
			name: "test".into(),
			dataroot_lr: PathBuf::new(),
			dataroot_hr: None,
			phase: Phase::Test,
			use_flip: false,
			use_rot: false,
			lr_size: loader::DEFAULT_LR_SIZE,
			batch_size: loader::DEFAULT_BATCH_SIZE,
			shuffle: false,
		}
	}
}

impl DatasetConfig {
	pub fn builder() -> DatasetConfigBuilder {
		DatasetConfigBuilder::default()
	}

	pub fn need_hr(&self) -> bool {
		self.dataroot_hr.is_some()
	}

	pub fn validate(&self) -> Result<()> {
		if self.dataroot_lr.as_os_str().is_empty() {
			return Err(Sr3dError::InvalidParameter(format!(
				"Dataset '{}' has no LR data root",
				self.name
			)));
		}
		if self.batch_size == 0 {
			return Err(Sr3dError::InvalidParameter(format!(
				"Batch size ({}) must be greater than 0",
				self.batch_size
			)));
		}
		if self.name.is_empty() {
			return Err(Sr3dError::InvalidParameter("Dataset name must not be empty".into()));
		}
		Ok(())
	}
}

#[derive(Default)]
pub struct DatasetConfigBuilder {
	name: Option<String>,
	dataroot_lr: Option<PathBuf>,
	dataroot_hr: Option<PathBuf>,
	phase: Option<Phase>,
	use_flip: Option<bool>,
	use_rot: Option<bool>,
	lr_size: Option<usize>,
	batch_size: Option<usize>,
	shuffle: Option<bool>,
}

impl DatasetConfigBuilder {
	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn dataroot_lr(mut self, path: impl Into<PathBuf>) -> Self {
		self.dataroot_lr = Some(path.into());
		self
	}

	pub fn dataroot_hr(mut self, path: impl Into<PathBuf>) -> Self {
		self.dataroot_hr = Some(path.into());
		self
	}

	pub fn phase(mut self, phase: Phase) -> Self {
		self.phase = Some(phase);
		self
	}

	pub fn use_flip(mut self, use_flip: bool) -> Self {
		self.use_flip = Some(use_flip);
		self
	}

	pub fn use_rot(mut self, use_rot: bool) -> Self {
		self.use_rot = Some(use_rot);
		self
	}

	pub fn lr_size(mut self, size: usize) -> Self {
		self.lr_size = Some(size);
		self
	}

	pub fn batch_size(mut self, size: usize) -> Self {
		self.batch_size = Some(size);
		self
	}

	pub fn shuffle(mut self, shuffle: bool) -> Self {
		self.shuffle = Some(shuffle);
		self
	}

	pub fn build(self) -> DatasetConfig {
		let defaults = DatasetConfig::default();
		DatasetConfig {
			name: self.name.unwrap_or(defaults.name),
			dataroot_lr: self.dataroot_lr.unwrap_or(defaults.dataroot_lr),
			dataroot_hr: self.dataroot_hr,
			phase: self.phase.unwrap_or(defaults.phase),
			use_flip: self.use_flip.unwrap_or(defaults.use_flip),
			use_rot: self.use_rot.unwrap_or(defaults.use_rot),
			lr_size: self.lr_size.unwrap_or(defaults.lr_size),
			batch_size: self.batch_size.unwrap_or(defaults.batch_size),
			shuffle: self.shuffle.unwrap_or(defaults.shuffle),
		}
	}
}

/// A full evaluation run: output locations, model settings and the datasets to test, in order.
#[derive(Debug, Clone)]
pub struct TestConfig {
	pub results_root: PathBuf,
	pub log_dir: Option<PathBuf>,
	pub suffix: Option<String>,
	pub scale: usize,
	pub interpolation: Interpolation,
	pub volume_shape: [usize; 4],
	pub show_progress: bool,
	pub datasets: Vec<DatasetConfig>,
}

impl Default for TestConfig {
	fn default() -> Self {
		Self {
			results_root: PathBuf::from("results"),
			log_dir: None,
			suffix: None,
			scale: model::DEFAULT_SCALE,
			interpolation: Interpolation::Trilinear,
			volume_shape: store::DEFAULT_VOLUME_SHAPE,
			show_progress: true,
			datasets: Vec::new(),
		}
	}
}

impl TestConfig {
	pub fn validate(&self) -> Result<()> {
		if self.scale == 0 {
			return Err(Sr3dError::InvalidParameter("Scale must be greater than 0".into()));
		}
		if self.volume_shape.iter().any(|&d| d == 0) {
			return Err(Sr3dError::InvalidParameter(format!(
				"Volume shape {:?} must not contain zero-sized axes",
				self.volume_shape
			)));
		}
		if self.datasets.is_empty() {
			return Err(Sr3dError::InvalidParameter("No datasets configured".into()));
		}
		for dataset in &self.datasets {
			dataset.validate()?;
		}
		Ok(())
	}
}
