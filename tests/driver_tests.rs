use ndarray::Array5;
use sr3d::config::{DatasetConfig, Interpolation, TestConfig};
use sr3d::data::Batch;
use sr3d::model::{upsample, InterpolationModel, SrModel, Visuals};
use sr3d::{Sr3dError, Tester};
use tempfile::TempDir;
use tracing::Span;

#[path = "test_helpers.rs"]
mod test_helpers;
use test_helpers::*;

fn test_config(results_root: &std::path::Path, dataset: DatasetConfig, volume_shape: [usize; 4]) -> TestConfig {
    TestConfig {
        results_root: results_root.to_path_buf(),
        volume_shape,
        show_progress: false,
        datasets: vec![dataset],
        ..TestConfig::default()
    }
}

#[test]
fn test_end_to_end_with_ground_truth() {
    let dir = TempDir::new().unwrap();
    let lr = write_stack(&dir.path().join("lr.h5"), &ramp_stack(2, 3, 10, 240.0), Some(&[100.0, 200.0]));
    let hr = write_stack(&dir.path().join("hr.h5"), &ramp_stack(2, 3, 40, 3.0), None);
    let results = dir.path().join("results");

    let dataset = DatasetConfig::builder().name("vol").dataroot_lr(lr).dataroot_hr(hr).build();
    let tester = assert_ok(Tester::new(test_config(&results, dataset, [40, 40, 40, 3]), &Span::none()), "building tester");
    let mut model = assert_ok(InterpolationModel::new(4, Interpolation::Trilinear), "building model");

    let reports = assert_ok(tester.run(&mut model), "running tester");
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.name, "vol");
    assert_eq!(report.samples, 2);

    let averages = assert_some(report.averages.as_ref(), "averages");
    let sr = assert_some(averages.get("SR"), "SR average");
    assert!(sr.mse >= 0.0);
    assert!((sr.rmse - sr.mse.sqrt()).abs() < 1e-9);
    assert_eq!(assert_some(report.accumulator.samples("SR"), "SR samples").len(), 2);

    let store = assert_ok(hdf5::File::open(&report.store_path), "opening prediction store");
    assert_eq!(assert_ok(store.dataset("data"), "data").shape(), vec![2, 40, 40, 40, 3]);
    let hz = assert_ok(assert_ok(store.dataset("hz"), "hz").read_raw::<f64>(), "reading hz");
    assert_eq!(hz, vec![100.0, 200.0]);

    let metrics_path = assert_some(report.metrics_path.as_ref(), "metrics path");
    let json: serde_json::Value =
        assert_ok(serde_json::from_str(&std::fs::read_to_string(metrics_path).unwrap()), "parsing metrics");
    assert_eq!(json["dataset"], "vol");
    assert_eq!(json["samples"], 2);
    assert!(json["averages"]["SR"]["mse"].is_number());

    assert!(results.join("vol").join("0_100hz.png").exists());
    assert!(results.join("vol").join("1_200hz.png").exists());
}

#[test]
fn test_lr_only_dataset_skips_metrics() {
    let dir = TempDir::new().unwrap();
    let lr = write_stack(&dir.path().join("lr.h5"), &ramp_stack(1, 3, 4, 240.0), Some(&[1500.0]));
    let results = dir.path().join("results");

    let dataset = DatasetConfig::builder().name("blind").dataroot_lr(lr).build();
    let mut config = test_config(&results, dataset, [8, 8, 8, 3]);
    config.suffix = Some("_x2".to_string());
    let tester = assert_ok(Tester::new(config, &Span::none()), "building tester");
    let mut model = assert_ok(InterpolationModel::new(2, Interpolation::Nearest), "building model");

    let reports = assert_ok(tester.run(&mut model), "running tester");
    assert!(reports[0].averages.is_none());
    assert!(reports[0].metrics_path.is_none());
    assert!(reports[0].accumulator.is_empty());
    assert!(results.join("blind").join("0_1.5khz_x2.png").exists());
}

#[test]
fn test_wrong_output_shape_is_fatal() {
    let dir = TempDir::new().unwrap();
    let lr = write_stack(&dir.path().join("lr.h5"), &ramp_stack(1, 3, 4, 240.0), Some(&[1.0]));
    let dataset = DatasetConfig::builder().dataroot_lr(lr).build();
    let tester = assert_ok(
        Tester::new(test_config(&dir.path().join("results"), dataset, [40, 40, 40, 3]), &Span::none()),
        "building tester",
    );
    let mut model = assert_ok(InterpolationModel::new(2, Interpolation::Nearest), "building model");

    let err = assert_err(tester.run(&mut model), "mismatched volume shape");
    assert!(matches!(err, Sr3dError::ShapeMismatch { .. }));
}

#[test]
fn test_missing_dataset_file_fails_before_testing() {
    let dir = TempDir::new().unwrap();
    let results = dir.path().join("results");
    let dataset = DatasetConfig::builder().name("ghost").dataroot_lr(dir.path().join("ghost.h5")).build();
    let tester = assert_ok(Tester::new(test_config(&results, dataset, [8, 8, 8, 3]), &Span::none()), "building tester");
    let mut model = assert_ok(InterpolationModel::new(2, Interpolation::Nearest), "building model");

    assert!(tester.run(&mut model).is_err());
    assert!(!results.join("ghost").exists());
}

#[test]
fn test_ground_truth_without_samples_is_fatal() {
    let dir = TempDir::new().unwrap();
    let lr = write_stack(&dir.path().join("lr.h5"), &ramp_stack(0, 3, 4, 240.0), Some(&[]));
    let hr = write_stack(&dir.path().join("hr.h5"), &ramp_stack(0, 3, 8, 0.0), None);

    let dataset = DatasetConfig::builder().name("hollow").dataroot_lr(lr).dataroot_hr(hr).build();
    let tester = assert_ok(
        Tester::new(test_config(&dir.path().join("results"), dataset, [8, 8, 8, 3]), &Span::none()),
        "building tester",
    );
    let mut model = assert_ok(InterpolationModel::new(2, Interpolation::Nearest), "building model");

    let err = assert_err(tester.run(&mut model), "averaging over no samples");
    assert!(matches!(err, Sr3dError::NoComparisons(ref name) if name == "hollow"));
}

/// Emits a second, scale-tagged output pair alongside the plain one.
struct TwoScaleModel {
    batch: Option<Batch>,
    sr: Option<Array5<f32>>,
}

impl SrModel for TwoScaleModel {
    fn name(&self) -> &str {
        "two-scale"
    }

    fn feed_data(&mut self, batch: &Batch, _need_hr: bool) -> sr3d::Result<()> {
        self.batch = Some(batch.clone());
        Ok(())
    }

    fn test(&mut self) -> sr3d::Result<()> {
        let batch = self.batch.as_ref().ok_or_else(|| Sr3dError::Model("no batch".into()))?;
        self.sr = Some(upsample(&batch.lr, 2, Interpolation::Nearest));
        Ok(())
    }

    fn current_visuals(&self, need_hr: bool) -> sr3d::Result<Visuals> {
        let batch = self.batch.as_ref().ok_or_else(|| Sr3dError::Model("no batch".into()))?;
        let sr = self.sr.clone().ok_or_else(|| Sr3dError::Model("no output".into()))?;

        let mut visuals = Visuals::default();
        visuals.hz = batch.hz.clone();
        visuals.insert("LR", batch.lr.clone());
        visuals.insert("LRx2", sr.clone());
        visuals.insert("SR", sr.clone());
        visuals.insert("SRx2", sr);
        if need_hr {
            let hr = batch.hr.clone().ok_or_else(|| Sr3dError::Model("no HR".into()))?;
            visuals.insert("HR", hr);
        }
        Ok(visuals)
    }
}

#[test]
fn test_scale_tagged_outputs_compare_against_matching_lr() {
    let dir = TempDir::new().unwrap();
    let lr = write_stack(&dir.path().join("lr.h5"), &ramp_stack(2, 3, 4, 240.0), Some(&[10.0, 20.0]));
    let hr = write_stack(&dir.path().join("hr.h5"), &ramp_stack(2, 3, 8, 0.0), None);
    let results = dir.path().join("results");

    let dataset = DatasetConfig::builder()
        .name("tagged")
        .dataroot_lr(lr)
        .dataroot_hr(hr)
        .batch_size(2)
        .build();
    let tester = assert_ok(Tester::new(test_config(&results, dataset, [8, 8, 8, 3]), &Span::none()), "building tester");
    let mut model = TwoScaleModel { batch: None, sr: None };

    let reports = assert_ok(tester.run(&mut model), "running tester");
    let averages = assert_some(reports[0].averages.as_ref(), "averages");

    let tagged = assert_some(averages.get("SRx2"), "SRx2 average");
    assert_eq!(tagged.mse, 0.0);
    assert!(tagged.psnr.is_infinite());

    let plain = assert_some(averages.get("SR"), "SR average");
    assert!(plain.mse > 0.0);

    // every SR output is stored, two per sample
    let store = assert_ok(hdf5::File::open(&reports[0].store_path), "opening prediction store");
    assert_eq!(assert_ok(store.dataset("data"), "data").shape()[0], 4);
}
