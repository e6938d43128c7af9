use ndarray::{Array4, Axis};
use rand::Rng;

use crate::constants::data::{AUGMENT_PROBABILITY, CHANNELS};

/// The random choices made for one augmentation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AugmentDraw {
	pub hflip: bool,
	pub vflip: bool,
	pub rot90: bool,
}

impl AugmentDraw {
	pub fn sample<R: Rng + ?Sized>(use_flip: bool, use_rot: bool, rng: &mut R) -> Self {
		Self {
			hflip: use_flip && rng.gen_bool(AUGMENT_PROBABILITY),
			vflip: use_rot && rng.gen_bool(AUGMENT_PROBABILITY),
			rot90: use_rot && rng.gen_bool(AUGMENT_PROBABILITY),
		}
	}

	pub fn is_identity(&self) -> bool {
		!(self.hflip || self.vflip || self.rot90)
	}

	pub fn apply(&self, volume: Array4<f32>) -> Array4<f32> {
		if self.is_identity() {
			return volume;
		}
		let mut volume = volume;
		if self.hflip {
			volume.invert_axis(Axis(1));
		}
		if self.vflip {
			volume.invert_axis(Axis(0));
		}
		if self.rot90 {
			volume.swap_axes(0, 1);
		}
		volume.as_standard_layout().into_owned()
	}
}

/// Flip and rotate a paired LR/HR sample with one shared draw.
///
/// With both flags off the RNG is never consulted and the volumes come back untouched.
pub fn augment_pair<R: Rng + ?Sized>(
	lr: Array4<f32>,
	hr: Option<Array4<f32>>,
	use_flip: bool,
	use_rot: bool,
	rng: &mut R,
) -> (Array4<f32>, Option<Array4<f32>>) {
	if !use_flip && !use_rot {
		return (lr, hr);
	}
	let draw = AugmentDraw::sample(use_flip, use_rot, rng);
	(draw.apply(lr), hr.map(|v| draw.apply(v)))
}

/// Reverse the last axis when it holds exactly three channels.
pub fn reverse_channels(volume: Array4<f32>) -> Array4<f32> {
	if volume.shape()[3] != CHANNELS {
		return volume;
	}
	let mut volume = volume;
	volume.invert_axis(Axis(3));
	volume.as_standard_layout().into_owned()
}
