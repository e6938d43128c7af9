pub mod data {
	/// Empirical mean of the low-resolution training stack, subtracted on load.
	pub const INPUT_NORM_BIAS: f32 = 236.17393;
	pub const CHANNELS: usize = 3;
	pub const DATA_KEY: &str = "data";
	pub const HZ_KEY: &str = "hz";
	pub const AUGMENT_PROBABILITY: f64 = 0.5;
}

pub mod loader {
	pub const DEFAULT_BATCH_SIZE: usize = 1;
	pub const DEFAULT_LR_SIZE: usize = 10;
}

pub mod model {
	pub const DEFAULT_SCALE: usize = 4;
}

pub mod store {
	pub const DEFAULT_VOLUME_SHAPE: [usize; 4] = [40, 40, 40, 3];
	pub const HZ_CHUNK: usize = 64;
	pub const PREDICTION_SUFFIX: &str = "_CNNPredict.h5";
	pub const METRICS_SUFFIX: &str = "_metrics.json";
}

pub mod psnr {
	pub const LOG10_MULTIPLIER: f64 = 10.0;
	pub const CONSTANT_REFERENCE_PEAK: f64 = 1.0;
}

pub mod file {
	pub const PNG_EXTENSION: &str = ".png";
	pub const LOG_FILE_NAME: &str = "test.log";
	pub const HZ_UNIT: &str = "hz";
}
