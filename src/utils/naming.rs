use std::path::{Path, PathBuf};

use crate::constants::file::{HZ_UNIT, PNG_EXTENSION};

const PREFIXES: [&str; 17] = [
	"y", "z", "a", "f", "p", "n", "u", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];
const UNIT_PREFIX_INDEX: i32 = 8;
const SIGNIFICANT_DIGITS: i32 = 4;

/// Engineering notation with an SI prefix, e.g. `1500.0, "hz"` -> `"1.5khz"`.
pub fn format_quantity(value: f64, unit: &str) -> String {
	if value == 0.0 || !value.is_finite() {
		return format!("{}{}", value, unit);
	}

	let magnitude = value.abs().log10().floor() as i32;
	let factor = 10f64.powi(SIGNIFICANT_DIGITS - 1 - magnitude);
	let rounded = (value * factor).round() / factor;

	let exp3 = ((rounded.abs().log10() / 3.0).floor() as i32).clamp(-UNIT_PREFIX_INDEX, UNIT_PREFIX_INDEX);
	let scaled = rounded / 10f64.powi(exp3 * 3);
	let decimals = (SIGNIFICANT_DIGITS - 1 - scaled.abs().log10().floor() as i32).max(0) as usize;

	let mut digits = format!("{:.*}", decimals, scaled);
	if digits.contains('.') {
		digits = digits.trim_end_matches('0').trim_end_matches('.').to_string();
	}
	format!("{}{}{}", digits, PREFIXES[(exp3 + UNIT_PREFIX_INDEX) as usize], unit)
}

/// `"{index}_{hz}"`, the stem shared by every artefact of one sample.
pub fn sample_name(index: usize, hz: f64) -> String {
	format!("{}_{}", index, format_quantity(hz, HZ_UNIT))
}

pub fn slice_image_path(dir: &Path, name: &str, suffix: Option<&str>) -> PathBuf {
	dir.join(format!("{}{}{}", name, suffix.unwrap_or(""), PNG_EXTENSION))
}
