//! The per-item record passed through the pipeline stages.

use crate::{common::*, sampler::AnchorLabel, target::Target};

/// A ground truth box with its class index.
pub type GroundTruth = Label<XYXY<f32>, usize>;

/// The decoded data item.
///
/// The extractor fills the image size and the source boxes. The transformer
/// fills the remaining fields, which the loader copies out.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// The source image size in pixels.
    pub image_size: Size<usize>,
    /// The number of image channels.
    pub depth: usize,
    /// Ground truth boxes in source image coordinates.
    pub boxes: Vec<GroundTruth>,

    /// Ground truth boxes in output image coordinates.
    pub gt_boxes: Vec<GroundTruth>,
    /// Labels of all lattice anchors.
    pub labels: Vec<AnchorLabel>,
    /// Regression targets of all lattice anchors, zero except on foreground.
    pub bbox_targets: Vec<Target>,
    /// Lattice indices of sampled anchors in ascending order.
    pub anchor_index: Vec<usize>,
    pub image_scale: f32,
    pub output_image_size: Size<usize>,
}

impl Decoded {
    pub fn new(image_size: Size<usize>, depth: usize, boxes: Vec<GroundTruth>) -> Self {
        Self {
            image_size,
            depth,
            boxes,
            gt_boxes: vec![],
            labels: vec![],
            bbox_targets: vec![],
            anchor_index: vec![],
            image_scale: 1.0,
            output_image_size: image_size,
        }
    }

    pub fn num_foreground(&self) -> usize {
        self.count_label(AnchorLabel::Foreground)
    }

    pub fn num_background(&self) -> usize {
        self.count_label(AnchorLabel::Background)
    }

    fn count_label(&self, target: AnchorLabel) -> usize {
        self.labels.iter().filter(|&&label| label == target).count()
    }
}
