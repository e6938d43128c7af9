use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Utc;
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::Array4;
use serde::Serialize;
use tracing::{debug, info, info_span, Span};

use crate::config::TestConfig;
use crate::constants::store::{METRICS_SUFFIX, PREDICTION_SUFFIX};
use crate::data::{DataLoader, LrHrDataset};
use crate::error::{Result, Sr3dError};
use crate::metrics::{calculate_mse_rmse_psnr, MetricAccumulator, MetricRecord, VolumeMetrics};
use crate::model::{SrModel, Visuals};
use crate::render::save_slice_comparison;
use crate::store::Hdf5Store;
use crate::tensor::batch_to_volumes;
use crate::utils::{create_dir_all, sample_name, slice_image_path, write_json};

/// What one dataset pass produced.
#[derive(Debug)]
pub struct DatasetReport {
	pub name: String,
	pub samples: usize,
	pub inference_time: Duration,
	pub store_path: PathBuf,
	pub metrics_path: Option<PathBuf>,
	pub averages: Option<IndexMap<String, VolumeMetrics>>,
	pub accumulator: MetricAccumulator,
}

#[derive(Serialize)]
struct MetricsFile<'a> {
	dataset: &'a str,
	model: &'a str,
	timestamp: String,
	samples: usize,
	inference_seconds: f64,
	averages: &'a IndexMap<String, VolumeMetrics>,
	per_sample: &'a IndexMap<String, MetricRecord>,
}

/// Runs one evaluation pass over every configured dataset.
pub struct Tester {
	config: TestConfig,
	span: Span,
}

impl Tester {
	pub fn new(config: TestConfig, parent: &Span) -> Result<Self> {
		config.validate()?;
		let span = info_span!(parent: parent, "test", results_root = %config.results_root.display());
		Ok(Self { config, span })
	}

	pub fn config(&self) -> &TestConfig {
		&self.config
	}

	pub fn run<M: SrModel + ?Sized>(&self, model: &mut M) -> Result<Vec<DatasetReport>> {
		let _enter = self.span.enter();

		let datasets = self
			.config
			.datasets
			.iter()
			.map(|dataset_config| {
				let dataset = LrHrDataset::new(dataset_config.clone(), &self.span)?;
				info!("Number of test images in [{}]: {}", dataset.name(), dataset.len());
				Ok(dataset)
			})
			.collect::<Result<Vec<_>>>()?;

		info!("Model [{}] is created.", model.name());

		datasets.iter().map(|dataset| self.test_dataset(dataset, model)).collect()
	}

	fn test_dataset<M: SrModel + ?Sized>(&self, dataset: &LrHrDataset, model: &mut M) -> Result<DatasetReport> {
		let name = dataset.name();
		info!("Testing [{}]...", name);

		let dataset_dir = self.config.results_root.join(name);
		create_dir_all(&dataset_dir)?;
		let store_path = dataset_dir.join(format!("{}{}", name, PREDICTION_SUFFIX));
		let mut store = Hdf5Store::create(&store_path, self.config.volume_shape)?;

		let need_hr = dataset.config().need_hr();
		let slice = dataset.config().lr_size / 2;
		let suffix = self.config.suffix.as_deref();
		let mut accumulator = MetricAccumulator::new(name);
		let mut inference_time = Duration::ZERO;
		let mut sample_index = 0usize;

		let mut loader = DataLoader::from_config(dataset)?;
		let progress = self.progress_bar(loader.len() as u64)?;

		for batch in loader.iter() {
			let batch = batch?;

			let start = Instant::now();
			model.feed_data(&batch, need_hr)?;
			model.test()?;
			let elapsed = start.elapsed();
			inference_time += elapsed;
			debug!(elapsed_ms = elapsed.as_millis() as u64, batch = batch.len(), "Inference finished");

			let visuals = model.current_visuals(need_hr)?;
			let sr_volumes = split_visuals(&visuals, &visuals.sr_keys(), batch.len())?;
			let lr_volumes = split_visuals(&visuals, &visuals.lr_keys(), batch.len())?;
			let gt_volumes = if need_hr {
				let gt = visuals.ground_truth().ok_or_else(|| Sr3dError::MissingVisual("HR".into()))?;
				Some(checked_volumes("HR", batch_to_volumes(gt), batch.len())?)
			} else {
				None
			};

			for (i, &hz) in batch.hz.iter().enumerate() {
				let img_name = sample_name(sample_index, hz);

				for volumes in sr_volumes.values() {
					store.append(volumes[i].view(), hz)?;
				}
				if !sr_volumes.is_empty() {
					let sr_panels: Vec<_> = sr_volumes.iter().map(|(k, v)| (k.as_str(), v[i].view())).collect();
					let lr_panels: Vec<_> = lr_volumes.iter().map(|(k, v)| (k.as_str(), v[i].view())).collect();
					save_slice_comparison(
						slice_image_path(&dataset_dir, &img_name, suffix),
						&sr_panels,
						&lr_panels,
						gt_volumes.as_ref().map(|gt| gt[i].view()),
						slice,
						self.config.scale,
					)?;
				}

				match &gt_volumes {
					Some(gt) => {
						for (sr_key, volumes) in &sr_volumes {
							let reference = comparison_volumes(sr_key, &lr_volumes, gt)?;
							let metrics = calculate_mse_rmse_psnr(volumes[i].view(), reference[i].view())?;
							info!(
								"{:20} - MSE: {:.6}; RMSE: {:.6}; PSNR: {:.6} dB.",
								img_name, metrics.mse, metrics.rmse, metrics.psnr
							);
							accumulator.push(sr_key, metrics);
						}
					}
					None => info!("{}", img_name),
				}
				sample_index += 1;
			}
			progress.inc(1);
		}
		progress.finish_and_clear();
		store.flush()?;

		info!("Total inference time for [{}]: {:.4}s", name, inference_time.as_secs_f64());

		let (averages, metrics_path) = if need_hr {
			let averages = accumulator.averages()?;
			for (output, avg) in &averages {
				info!(
					"----Average PSNR results for {} {}----\n\tMSE: {:.6}; RMSE: {:.6}; PSNR: {:.6} dB.\n",
					name, output, avg.mse, avg.rmse, avg.psnr
				);
			}
			let metrics_path = dataset_dir.join(format!("{}{}", name, METRICS_SUFFIX));
			write_json(
				&metrics_path,
				&MetricsFile {
					dataset: name,
					model: model.name(),
					timestamp: Utc::now().to_rfc3339(),
					samples: sample_index,
					inference_seconds: inference_time.as_secs_f64(),
					averages: &averages,
					per_sample: accumulator.records(),
				},
			)?;
			(Some(averages), Some(metrics_path))
		} else {
			(None, None)
		};

		Ok(DatasetReport {
			name: name.to_string(),
			samples: sample_index,
			inference_time,
			store_path,
			metrics_path,
			averages,
			accumulator,
		})
	}

	fn progress_bar(&self, len: u64) -> Result<ProgressBar> {
		if !self.config.show_progress {
			return Ok(ProgressBar::hidden());
		}
		let bar = ProgressBar::new(len);
		bar.set_style(
			ProgressStyle::default_bar()
				.template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
				.map_err(|e| Sr3dError::InvalidParameter(format!("Bad progress template: {}", e)))?
				.progress_chars("#>-"),
		);
		Ok(bar)
	}
}

/// Per-sample `D H W C` volumes for each named visual.
fn split_visuals(visuals: &Visuals, keys: &[&str], batch_len: usize) -> Result<IndexMap<String, Vec<Array4<f32>>>> {
	keys.iter()
		.map(|&key| {
			let tensor = visuals.get(key).ok_or_else(|| Sr3dError::MissingVisual(key.to_string()))?;
			Ok((key.to_string(), checked_volumes(key, batch_to_volumes(tensor), batch_len)?))
		})
		.collect()
}

fn checked_volumes(key: &str, volumes: Vec<Array4<f32>>, batch_len: usize) -> Result<Vec<Array4<f32>>> {
	if volumes.len() != batch_len {
		return Err(Sr3dError::Model(format!(
			"Visual '{}' holds {} samples for a batch of {}",
			key,
			volumes.len(),
			batch_len
		)));
	}
	Ok(volumes)
}

/// Scale-tagged outputs (`SRx2`) compare against the LR visual of the same tag (`LRx2`),
/// everything else against the ground truth.
fn comparison_volumes<'a>(
	sr_key: &str,
	lr_volumes: &'a IndexMap<String, Vec<Array4<f32>>>,
	gt: &'a [Array4<f32>],
) -> Result<&'a [Array4<f32>]> {
	if !sr_key.contains('x') {
		return Ok(gt);
	}
	let tag = sr_key.replace("SR", "");
	lr_volumes
		.iter()
		.find(|(lr_key, _)| lr_key.contains(&tag))
		.map(|(_, volumes)| volumes.as_slice())
		.ok_or_else(|| Sr3dError::MissingVisual(format!("LR{}", tag)))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn volumes(n: usize, value: f32) -> Vec<Array4<f32>> {
		vec![Array4::from_elem((1, 1, 1, 1), value); n]
	}

	#[test]
	fn test_scale_tagged_output_uses_matching_lr() {
		let mut lr = IndexMap::new();
		lr.insert("LR".to_string(), volumes(1, 0.0));
		lr.insert("LRx2".to_string(), volumes(1, 2.0));
		let gt = volumes(1, 9.0);

		let reference = comparison_volumes("SRx2", &lr, &gt).unwrap();
		assert_eq!(reference[0][[0, 0, 0, 0]], 2.0);

		let reference = comparison_volumes("SR", &lr, &gt).unwrap();
		assert_eq!(reference[0][[0, 0, 0, 0]], 9.0);
	}

	#[test]
	fn test_missing_scale_tagged_lr() {
		let lr = IndexMap::new();
		let gt = volumes(1, 9.0);
		let err = comparison_volumes("SRx4", &lr, &gt).unwrap_err();
		assert!(matches!(err, Sr3dError::MissingVisual(ref key) if key == "LRx4"));
	}

	#[test]
	fn test_sample_count_checked() {
		assert!(checked_volumes("SR", volumes(1, 0.0), 2).is_err());
		assert!(checked_volumes("SR", volumes(2, 0.0), 2).is_ok());
	}
}
