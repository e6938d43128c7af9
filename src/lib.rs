//! Evaluation harness for 3D volumetric super-resolution.
//!
//! Paired low/high resolution stacks are read from HDF5 containers, run through an
//! [`SrModel`](model::SrModel), and scored with MSE, RMSE and PSNR. Predictions are
//! appended to an extendable HDF5 store and one slice comparison PNG is written per sample.

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_file;
pub mod constants;
pub mod data;
pub mod driver;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod render;
pub mod store;
pub mod tensor;
pub mod utils;

pub use config::{DatasetConfig, Interpolation, Phase, TestConfig};
pub use data::{Batch, DataLoader, H5Array, H5Container, LrHrDataset, VolumeItem};
pub use driver::{DatasetReport, Tester};
pub use error::{Result, Sr3dError};
pub use metrics::{calculate_mse_rmse_psnr, MetricAccumulator, VolumeMetrics};
pub use model::{InterpolationModel, SrModel, Visuals};
pub use store::Hdf5Store;
