pub mod augment;
pub mod container;
pub mod dataset;
pub mod loader;

pub use self::container::{H5Array, H5Container};
pub use self::dataset::{LrHrDataset, VolumeItem};
pub use self::loader::{Batch, DataLoader};
