//! Test helper functions for result-based assertions and HDF5 fixtures
#![allow(dead_code)]

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array5};

/// Assert that a Result is Ok and return the unwrapped value.
pub fn assert_ok<T, E: Debug>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok result for {}, but got error: {:?}", context, err),
    }
}

/// Assert that a Result is Err and return the error.
pub fn assert_err<T, E>(result: Result<T, E>, context: &str) -> E {
    match result {
        Err(err) => err,
        Ok(_) => panic!("Expected Err result for {}, but got Ok", context),
    }
}

/// Assert that an Option is Some and return the unwrapped value.
pub fn assert_some<T>(option: Option<T>, context: &str) -> T {
    match option {
        Some(value) => value,
        None => panic!("Expected Some value for {}, but got None", context),
    }
}

/// Write a `data` stack (and optionally `hz`) to a new HDF5 file.
pub fn write_stack(path: &Path, data: &Array5<f32>, hz: Option<&[f64]>) -> PathBuf {
    let file = assert_ok(hdf5::File::create(path), "creating fixture file");
    let ds = assert_ok(
        file.new_dataset::<f32>().shape(data.shape().to_vec()).create("data"),
        "creating data dataset",
    );
    if !data.is_empty() {
        assert_ok(ds.write(data), "writing data dataset");
    }
    if let Some(hz) = hz {
        let hz = Array1::from(hz.to_vec());
        let ds = assert_ok(file.new_dataset::<f64>().shape(vec![hz.len()]).create("hz"), "creating hz dataset");
        if !hz.is_empty() {
            assert_ok(ds.write(&hz), "writing hz dataset");
        }
    }
    path.to_path_buf()
}

/// Deterministic, non-constant stack of shape `N C S S S`.
pub fn ramp_stack(n: usize, c: usize, size: usize, offset: f32) -> Array5<f32> {
    Array5::from_shape_fn((n, c, size, size, size), |(i, ch, d, h, w)| {
        offset + (i * 7 + ch * 3 + d * 5 + h * 2 + w) as f32 * 0.25
    })
}
