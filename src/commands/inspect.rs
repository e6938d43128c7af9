use crate::data::H5Container;
use crate::error::{Result, Sr3dError};
use clap::ArgMatches;
use tracing::info;

pub fn inspect(app_m: &ArgMatches) -> Result<()> {
	let path = app_m
		.value_of("H5_FILE")
		.ok_or_else(|| Sr3dError::InvalidParameter("No HDF5 file given".to_string()))?;

	let container = H5Container::open(path)?;
	info!("{}: {} datasets", path, container.len());
	for (key, array) in container.iter() {
		match array.summary() {
			Some((min, max, mean)) => info!(
				"  {:10} shape {:?}  min {:.6}  max {:.6}  mean {:.6}",
				key,
				array.shape(),
				min,
				max,
				mean
			),
			None => info!("  {:10} shape {:?}  (empty)", key, array.shape()),
		}
	}
	Ok(())
}
