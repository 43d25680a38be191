//! Geometric parameters of an image item.

use crate::common::*;

/// The geometric transform the image stage applied to one item.
///
/// Boxes are mapped by cropping at `crop_offset`, multiplying by `scale`
/// and mirroring horizontally within `output_size` if `flip` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageParams {
    pub scale: f32,
    /// The (x, y) offset of the crop window in source pixels.
    pub crop_offset: [f32; 2],
    pub flip: bool,
    pub output_size: Size<usize>,
}

impl ImageParams {
    /// Params of a plain resize without cropping or flipping.
    pub fn new(scale: f32, output_size: Size<usize>) -> Self {
        Self {
            scale,
            crop_offset: [0.0, 0.0],
            flip: false,
            output_size,
        }
    }

    /// The box transform from source to output image coordinates.
    pub fn transform(&self) -> Result<Transform<f32>> {
        let Self {
            scale,
            crop_offset: [crop_x, crop_y],
            flip,
            ref output_size,
        } = *self;

        ensure!(
            scale.is_finite() && scale > 0.0,
            "image scale must be positive, but get {}",
            scale
        );
        ensure!(
            output_size.w() > 0 && output_size.h() > 0,
            "output image size must be positive, but get {:?}",
            output_size
        );

        let crop = Transform::translate(-crop_x, -crop_y);
        let transform = &Transform::scale(scale) * &crop;
        let transform = if flip {
            &Transform::hflip(output_size.w() as f32) * &transform
        } else {
            transform
        };
        Ok(transform)
    }
}
