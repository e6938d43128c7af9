use crate::config::TestConfig;
use crate::config_file::TestOptionsFile;
use crate::driver::Tester;
use crate::error::{Result, Sr3dError};
use crate::logging::{self, LogConfig};
use crate::model::InterpolationModel;
use clap::ArgMatches;
use std::path::PathBuf;
use tracing::{error, info, info_span, Level};

/// Runs the test pass. Failures are logged here, before the `test.log` writer shuts down.
pub fn test(app_m: &ArgMatches) -> Result<()> {
	let (options_path, config, log_config) = match prepare(app_m) {
		Ok(prepared) => prepared,
		Err(err) => {
			logging::init_simple_logger();
			error!("Error: {}", err);
			return Err(err);
		}
	};

	let guard = match logging::init_logging(log_config) {
		Ok(guard) => guard,
		Err(e) => {
			logging::init_simple_logger();
			let err = Sr3dError::InvalidParameter(format!("Failed to initialise logging: {}", e));
			error!("Error: {}", err);
			return Err(err);
		}
	};

	let result = run(options_path, config);
	if let Err(err) = &result {
		error!("Error: {}", err);
	}
	drop(guard);
	result
}

fn prepare<'a>(app_m: &'a ArgMatches) -> Result<(&'a str, TestConfig, LogConfig)> {
	let options_path = app_m
		.value_of("OPTIONS_FILE")
		.ok_or_else(|| Sr3dError::InvalidParameter("No options file given".to_string()))?;

	let mut options = TestOptionsFile::from_file(options_path)?;
	apply_overrides(&mut options, app_m)?;
	let config = options.to_test_config()?;

	let level = match app_m.value_of("LOG_LEVEL") {
		Some(level) => level
			.parse::<Level>()
			.map_err(|_| Sr3dError::InvalidParameter(format!("Unknown log level: {}", level)))?,
		None => Level::INFO,
	};
	let log_config = LogConfig {
		level,
		log_directory: config.log_dir.clone(),
		..LogConfig::default()
	};
	Ok((options_path, config, log_config))
}

fn run(options_path: &str, config: TestConfig) -> Result<()> {
	info!("Loaded options from: {}", options_path);
	info!("{:#?}", config);

	let root = info_span!("sr3d");
	let mut model = InterpolationModel::new(config.scale, config.interpolation)?;
	let tester = Tester::new(config, &root)?;
	let reports = tester.run(&mut model)?;

	for report in &reports {
		info!(
			"[{}] {} samples, predictions in {}",
			report.name,
			report.samples,
			report.store_path.display()
		);
	}
	Ok(())
}

fn apply_overrides(options: &mut TestOptionsFile, app_m: &ArgMatches) -> Result<()> {
	if let Some(root) = app_m.value_of("RESULTS_ROOT") {
		options.run.results_root = PathBuf::from(root);
	}
	if let Some(suffix) = app_m.value_of("SUFFIX") {
		options.suffix = Some(suffix.to_string());
	}
	if let Some(scale) = app_m.value_of("SCALE") {
		options.model.scale = scale
			.parse::<usize>()
			.map_err(|_| Sr3dError::InvalidParameter("scale must be a positive integer".to_string()))?;
	}
	if let Some(interpolation) = app_m.value_of("INTERPOLATION") {
		options.model.interpolation = interpolation.to_string();
	}
	if app_m.is_present("NO_PROGRESS") {
		options.run.show_progress = false;
	}
	Ok(())
}
