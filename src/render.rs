use std::path::Path;

use image::{imageops, Rgb, RgbImage};
use ndarray::{ArrayView2, ArrayView3, ArrayView4, Axis};

use crate::error::{Result, Sr3dError};

const PANEL_GAP: u32 = 2;

/// Save the axial slice of every LR, SR and ground-truth volume side by side as one PNG.
///
/// `slice` is an LR depth index; other panels sample the same relative depth. Panels are
/// nearest-upscaled to the tallest one and min-max normalised independently.
pub fn save_slice_comparison<'a, P: AsRef<Path>>(
	path: P,
	sr: &[(&str, ArrayView4<'a, f32>)],
	lr: &[(&str, ArrayView4<'a, f32>)],
	gt: Option<ArrayView4<'a, f32>>,
	slice: usize,
	scale: usize,
) -> Result<()> {
	let volumes: Vec<ArrayView4<'a, f32>> = lr
		.iter()
		.map(|(_, v)| *v)
		.chain(sr.iter().map(|(_, v)| *v))
		.chain(gt)
		.collect();
	if volumes.is_empty() {
		return Err(Sr3dError::InvalidParameter("Nothing to render".into()));
	}
	if let Some(empty) = volumes.iter().find(|v| v.is_empty()) {
		return Err(Sr3dError::InvalidParameter(format!(
			"Cannot render an empty volume of shape {:?}",
			empty.shape()
		)));
	}

	let max_depth = volumes.iter().map(|v| v.len_of(Axis(0))).max().unwrap_or(1);
	let lr_depth = lr
		.first()
		.map(|(_, v)| v.len_of(Axis(0)))
		.unwrap_or_else(|| (max_depth / scale.max(1)).max(1));
	let slice = if slice < lr_depth { slice } else { lr_depth / 2 };

	let panels: Vec<RgbImage> = volumes
		.iter()
		.map(|volume| {
			let depth = volume.len_of(Axis(0));
			let index = (slice * depth / lr_depth).min(depth - 1);
			slice_to_image(volume.index_axis(Axis(0), index))
		})
		.collect();

	let height = panels.iter().map(|p| p.height()).max().unwrap_or(1);
	let panels: Vec<RgbImage> = panels
		.into_iter()
		.map(|panel| {
			let factor = (height / panel.height()).max(1);
			if factor == 1 {
				panel
			} else {
				imageops::resize(
					&panel,
					panel.width() * factor,
					panel.height() * factor,
					imageops::FilterType::Nearest,
				)
			}
		})
		.collect();

	let width = panels.iter().map(|p| p.width()).sum::<u32>() + PANEL_GAP * (panels.len() as u32 - 1);
	let height = panels.iter().map(|p| p.height()).max().unwrap_or(1);
	let mut canvas = RgbImage::new(width, height);
	let mut x = 0i64;
	for panel in &panels {
		imageops::replace(&mut canvas, panel, x, 0);
		x += i64::from(panel.width() + PANEL_GAP);
	}

	canvas.save(path)?;
	Ok(())
}

/// `H W C` slice to an 8-bit image: first three channels as RGB, otherwise channel 0 as grey.
fn slice_to_image(slice: ArrayView3<f32>) -> RgbImage {
	let (height, width, channels) = slice.dim();
	let (min, max) = slice.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &v| {
		(min.min(v), max.max(v))
	});
	let range = if max > min { max - min } else { 1.0 };
	let to_byte = |v: f32| (((v - min) / range) * 255.0).round().max(0.0).min(255.0) as u8;

	let pick = |plane: ArrayView2<f32>, y: usize, x: usize| to_byte(plane[[y, x]]);
	let planes: Vec<ArrayView2<f32>> = if channels >= 3 {
		(0..3).map(|c| slice.index_axis(Axis(2), c)).collect()
	} else {
		vec![slice.index_axis(Axis(2), 0); 3]
	};

	RgbImage::from_fn(width as u32, height as u32, |x, y| {
		let (x, y) = (x as usize, y as usize);
		Rgb([
			pick(planes[0], y, x),
			pick(planes[1], y, x),
			pick(planes[2], y, x),
		])
	})
}
