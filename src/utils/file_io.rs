use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{Result, Sr3dError};

pub fn create_dir_all<P: AsRef<Path>>(path: P) -> Result<()> {
	fs::create_dir_all(path)?;
	Ok(())
}

pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
	let contents = serde_json::to_string_pretty(value)
		.map_err(|e| Sr3dError::Serialization(format!("Failed to serialize to JSON: {}", e)))?;
	fs::write(path, contents)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn test_write_json_creates_file() {
		let dir = TempDir::new().unwrap();
		let nested = dir.path().join("a").join("b");
		create_dir_all(&nested).unwrap();
		let path = nested.join("values.json");
		write_json(&path, &vec![1, 2, 3]).unwrap();
		assert_eq!(fs::read_to_string(&path).unwrap().split_whitespace().collect::<String>(), "[1,2,3]");
	}
}
