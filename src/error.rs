use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Sr3dError {
	#[error("IO error: {0}")]
	Io(#[from] io::Error),
	#[error("HDF5 error: {0}")]
	Hdf5(#[from] hdf5::Error),
	#[error("Image processing error: {0}")]
	Image(#[from] image::ImageError),
	#[error("Parse error: {0}")]
	Parse(String),
	#[error("Serialization error: {0}")]
	Serialization(String),
	#[error("Invalid parameter: {0}")]
	InvalidParameter(String),
	#[error("File not found: {}", .0.display())]
	FileNotFound(PathBuf),
	#[error("Container is empty: {}", .0.display())]
	EmptyContainer(PathBuf),
	#[error("Missing key '{key}' in {}", .path.display())]
	MissingKey { path: PathBuf, key: String },
	#[error("HR and LR datasets have different number of samples - {hr}, {lr}")]
	SampleCountMismatch { hr: usize, lr: usize },
	#[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
	ShapeMismatch { expected: Vec<usize>, actual: Vec<usize> },
	#[error("Index {index} out of range for dataset of length {len}")]
	IndexOutOfRange { index: usize, len: usize },
	#[error("No visual named '{0}' to compare against")]
	MissingVisual(String),
	#[error("No samples were compared for dataset '{0}'")]
	NoComparisons(String),
	#[error("Model error: {0}")]
	Model(String),
}

impl Sr3dError {
	pub fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
		Sr3dError::ShapeMismatch {
			expected: expected.to_vec(),
			actual: actual.to_vec(),
		}
	}
}

impl From<ndarray::ShapeError> for Sr3dError {
	fn from(err: ndarray::ShapeError) -> Self {
		Sr3dError::InvalidParameter(format!("array shape error: {}", err))
	}
}

pub type Result<T> = std::result::Result<T, Sr3dError>;
