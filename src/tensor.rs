use ndarray::{Array4, Array5, ArrayView4, Axis};

use crate::data::augment::reverse_channels;

/// Turn a `C D H W` output tensor into a `D H W C` volume, reversing three-channel order.
pub fn tensor_to_volume(tensor: ArrayView4<f32>) -> Array4<f32> {
	let volume = tensor.permuted_axes([1, 2, 3, 0]).as_standard_layout().into_owned();
	reverse_channels(volume)
}

/// Split a `B C D H W` batch tensor into per-sample `D H W C` volumes.
pub fn batch_to_volumes(batch: &Array5<f32>) -> Vec<Array4<f32>> {
	batch.axis_iter(Axis(0)).map(tensor_to_volume).collect()
}
