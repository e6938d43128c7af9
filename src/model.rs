use std::fmt;

use indexmap::IndexMap;
use ndarray::{Array5, Axis};

use crate::config::Interpolation;
use crate::constants::data::INPUT_NORM_BIAS;
use crate::data::Batch;
use crate::error::{Result, Sr3dError};

/// Named output tensors (`B C D H W`) of one inference step, with the batch's frequencies.
#[derive(Debug, Clone, Default)]
pub struct Visuals {
	pub tensors: IndexMap<String, Array5<f32>>,
	pub hz: Vec<f64>,
}

impl Visuals {
	pub fn get(&self, name: &str) -> Option<&Array5<f32>> {
		self.tensors.get(name)
	}

	pub fn insert(&mut self, name: impl Into<String>, tensor: Array5<f32>) {
		self.tensors.insert(name.into(), tensor);
	}

	/// Outputs whose name contains `SR`, in insertion order.
	pub fn sr_keys(&self) -> Vec<&str> {
		self.keys_containing("SR")
	}

	/// Outputs whose name contains `LR`, in insertion order.
	pub fn lr_keys(&self) -> Vec<&str> {
		self.keys_containing("LR")
	}

	pub fn ground_truth(&self) -> Option<&Array5<f32>> {
		self.get("HR")
	}

	fn keys_containing(&self, needle: &str) -> Vec<&str> {
		self.tensors.keys().map(|k| k.as_str()).filter(|k| k.contains(needle)).collect()
	}
}

/// The inference surface the test driver needs from a network.
pub trait SrModel {
	fn name(&self) -> &str;

	fn feed_data(&mut self, batch: &Batch, need_hr: bool) -> Result<()>;

	/// Run inference on the last fed batch.
	fn test(&mut self) -> Result<()>;

	fn current_visuals(&self, need_hr: bool) -> Result<Visuals>;
}

/// Upsamples the LR input by a fixed factor without learned weights.
///
/// Input bias is added back so outputs live in the same range as the HR targets.
pub struct InterpolationModel {
	scale: usize,
	mode: Interpolation,
	bias: f32,
	display: String,
	lr: Option<Array5<f32>>,
	hr: Option<Array5<f32>>,
	sr: Option<Array5<f32>>,
	hz: Vec<f64>,
}

impl InterpolationModel {
	pub fn new(scale: usize, mode: Interpolation) -> Result<Self> {
		if scale == 0 {
			return Err(Sr3dError::InvalidParameter("Scale must be greater than 0".into()));
		}
		let display = match mode {
			Interpolation::Nearest => format!("nearest x{}", scale),
			Interpolation::Trilinear => format!("trilinear x{}", scale),
		};
		Ok(Self {
			scale,
			mode,
			bias: INPUT_NORM_BIAS,
			display,
			lr: None,
			hr: None,
			sr: None,
			hz: Vec::new(),
		})
	}

	pub fn with_bias(mut self, bias: f32) -> Self {
		self.bias = bias;
		self
	}

	pub fn scale(&self) -> usize {
		self.scale
	}
}

impl SrModel for InterpolationModel {
	fn name(&self) -> &str {
		&self.display
	}

	fn feed_data(&mut self, batch: &Batch, need_hr: bool) -> Result<()> {
		self.lr = Some(batch.lr.clone());
		self.hr = if need_hr {
			Some(batch.hr.clone().ok_or_else(|| Sr3dError::Model("HR requested but batch has none".into()))?)
		} else {
			None
		};
		self.hz = batch.hz.clone();
		self.sr = None;
		Ok(())
	}

	fn test(&mut self) -> Result<()> {
		let lr = self.lr.as_ref().ok_or_else(|| Sr3dError::Model("test() called before feed_data()".into()))?;
		let mut sr = upsample(lr, self.scale, self.mode);
		sr.mapv_inplace(|v| v + self.bias);
		self.sr = Some(sr);
		Ok(())
	}

	fn current_visuals(&self, need_hr: bool) -> Result<Visuals> {
		let lr = self.lr.as_ref().ok_or_else(|| Sr3dError::Model("No batch has been fed".into()))?;
		let sr = self.sr.as_ref().ok_or_else(|| Sr3dError::Model("test() has not run".into()))?;

		let mut visuals = Visuals {
			tensors: IndexMap::new(),
			hz: self.hz.clone(),
		};
		visuals.insert("LR", lr.mapv(|v| v + self.bias));
		visuals.insert("SR", sr.clone());
		if need_hr {
			let hr = self.hr.as_ref().ok_or_else(|| Sr3dError::Model("No HR was fed".into()))?;
			visuals.insert("HR", hr.clone());
		}
		Ok(visuals)
	}
}

impl fmt::Display for InterpolationModel {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.display)
	}
}

/// Upsample the three spatial axes of a `B C D H W` tensor by `scale`.
pub fn upsample(input: &Array5<f32>, scale: usize, mode: Interpolation) -> Array5<f32> {
	let depth = upsample_axis(input, 2, scale, mode);
	let height = upsample_axis(&depth, 3, scale, mode);
	upsample_axis(&height, 4, scale, mode)
}

fn upsample_axis(input: &Array5<f32>, axis: usize, scale: usize, mode: Interpolation) -> Array5<f32> {
	let n_in = input.len_of(Axis(axis));
	let n_out = n_in * scale;
	let taps: Vec<(usize, usize, f32)> = (0..n_out).map(|o| source_tap(o, n_in, scale, mode)).collect();

	let mut shape = input.raw_dim();
	shape[axis] = n_out;
	let mut output = Array5::zeros(shape);
	if n_in == 0 {
		return output;
	}

	for (src, mut dst) in input.lanes(Axis(axis)).into_iter().zip(output.lanes_mut(Axis(axis))) {
		for (o, &(i0, i1, w)) in taps.iter().enumerate() {
			dst[o] = src[i0] * (1.0 - w) + src[i1] * w;
		}
	}
	output
}

// Half-pixel centres, clamped at the edges.
fn source_tap(o: usize, n_in: usize, scale: usize, mode: Interpolation) -> (usize, usize, f32) {
	let last = n_in.saturating_sub(1);
	match mode {
		Interpolation::Nearest => {
			let i = (o / scale).min(last);
			(i, i, 0.0)
		}
		Interpolation::Trilinear => {
			let src = ((o as f32 + 0.5) / scale as f32 - 0.5).max(0.0);
			let i0 = (src.floor() as usize).min(last);
			let i1 = (i0 + 1).min(last);
			(i0, i1, src - i0 as f32)
		}
	}
}
