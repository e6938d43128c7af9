use indexmap::IndexMap;
use ndarray::{ArrayView4, Zip};
use serde::Serialize;

use crate::constants::psnr as psnr_constants;
use crate::error::{Result, Sr3dError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeMetrics {
	pub mse: f64,
	pub rmse: f64,
	pub psnr: f64,
}

/// Compares a predicted `D H W C` volume against its reference.
///
/// PSNR uses the dynamic range of the reference as its peak, or 1.0 when the reference is
/// constant. Identical volumes give a PSNR of `+inf`.
pub fn calculate_mse_rmse_psnr(predicted: ArrayView4<f32>, reference: ArrayView4<f32>) -> Result<VolumeMetrics> {
	if predicted.shape() != reference.shape() {
		return Err(Sr3dError::shape_mismatch(reference.shape(), predicted.shape()));
	}
	if reference.is_empty() {
		return Err(Sr3dError::InvalidParameter("Cannot compare empty volumes".into()));
	}

	let mut squared_error = 0.0f64;
	Zip::from(&predicted).and(&reference).for_each(|&p, &r| {
		let diff = f64::from(p) - f64::from(r);
		squared_error += diff * diff;
	});
	let mse = squared_error / reference.len() as f64;
	let rmse = mse.sqrt();

	let (min, max) = reference
		.iter()
		.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
			(min.min(f64::from(v)), max.max(f64::from(v)))
		});
	let peak = if max > min { max - min } else { psnr_constants::CONSTANT_REFERENCE_PEAK };

	let psnr = if mse == 0.0 {
		f64::INFINITY
	} else {
		psnr_constants::LOG10_MULTIPLIER * (peak * peak / mse).log10()
	};

	Ok(VolumeMetrics { mse, rmse, psnr })
}

/// Per-sample values recorded for one output name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricRecord {
	pub mse: Vec<f64>,
	pub rmse: Vec<f64>,
	pub psnr: Vec<f64>,
}

impl MetricRecord {
	pub fn push(&mut self, metrics: VolumeMetrics) {
		self.mse.push(metrics.mse);
		self.rmse.push(metrics.rmse);
		self.psnr.push(metrics.psnr);
	}

	pub fn len(&self) -> usize {
		self.mse.len()
	}

	pub fn is_empty(&self) -> bool {
		self.mse.is_empty()
	}

	pub fn average(&self) -> Option<VolumeMetrics> {
		if self.is_empty() {
			return None;
		}
		let n = self.len() as f64;
		Some(VolumeMetrics {
			mse: self.mse.iter().sum::<f64>() / n,
			rmse: self.rmse.iter().sum::<f64>() / n,
			psnr: self.psnr.iter().sum::<f64>() / n,
		})
	}
}

/// Metrics collected over one test pass, keyed by output name in first-seen order.
#[derive(Debug, Clone)]
pub struct MetricAccumulator {
	label: String,
	records: IndexMap<String, MetricRecord>,
}

impl MetricAccumulator {
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			records: IndexMap::new(),
		}
	}

	pub fn push(&mut self, output: &str, metrics: VolumeMetrics) {
		self.records.entry(output.to_string()).or_default().push(metrics);
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.values().all(|r| r.is_empty())
	}

	pub fn records(&self) -> &IndexMap<String, MetricRecord> {
		&self.records
	}

	pub fn samples(&self, output: &str) -> Option<&MetricRecord> {
		self.records.get(output)
	}

	pub fn averages(&self) -> Result<IndexMap<String, VolumeMetrics>> {
		if self.is_empty() {
			return Err(Sr3dError::NoComparisons(self.label.clone()));
		}
		self.records
			.iter()
			.map(|(name, record)| {
				record
					.average()
					.map(|avg| (name.clone(), avg))
					.ok_or_else(|| Sr3dError::NoComparisons(format!("{}/{}", self.label, name)))
			})
			.collect()
	}
}
