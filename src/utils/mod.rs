pub mod file_io;
pub mod naming;

pub use self::file_io::{create_dir_all, write_json};
pub use self::naming::{format_quantity, sample_name, slice_image_path};
