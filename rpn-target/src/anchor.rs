//! Anchor lattice generation.

use crate::{common::*, config::Config};

/// The full set of reference anchors for a configuration.
///
/// The lattice covers the largest supported image. The anchor at
/// `cell * num_base_anchors + base_index` is the base anchor `base_index`
/// translated to the grid cell `cell`, where cells are numbered row-major
/// and the base anchors ratio-major then scale-major.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorLattice {
    base_anchors: Vec<XYXY<f32>>,
    anchors: Vec<XYXY<f32>>,
    grid_size: usize,
    stride: f64,
}

impl AnchorLattice {
    /// Build the lattice. It only depends on the configuration, never on image content.
    pub fn generate(config: &Config) -> Self {
        let base_anchors = base_anchors(config.base_size(), config.ratios(), config.scales());
        let grid_size = config.grid_size();
        let stride = config.feature_stride();

        let anchors: Vec<XYXY<f32>> = iproduct!(0..grid_size, 0..grid_size)
            .flat_map(|(row, col)| {
                let shift = Transform::translate(
                    (col as f64 * stride) as f32,
                    (row as f64 * stride) as f32,
                );
                base_anchors.iter().map(move |anchor| &shift * anchor)
            })
            .collect();
        debug_assert_eq!(anchors.len(), config.total_anchors());

        info!(
            "generated {} anchors on a {}x{} grid with stride {}",
            anchors.len(),
            grid_size,
            grid_size,
            stride
        );

        Self {
            base_anchors,
            anchors,
            grid_size,
            stride,
        }
    }

    pub fn base_anchors(&self) -> &[XYXY<f32>] {
        &self.base_anchors
    }

    pub fn anchors(&self) -> &[XYXY<f32>] {
        &self.anchors
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn stride(&self) -> f64 {
        self.stride
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Get the lattice index of a base anchor at a grid cell.
    pub fn index_of(&self, row: usize, col: usize, base_index: usize) -> usize {
        (row * self.grid_size + col) * self.base_anchors.len() + base_index
    }

    /// Indices of anchors lying within the image, in lattice order.
    pub fn inside_image_bounds(&self, width: usize, height: usize) -> Vec<usize> {
        inside_image_bounds(width, height, &self.anchors)
    }
}

/// Indices of anchors whose four corners lie within `[0, width] x [0, height]`, in ascending order.
pub fn inside_image_bounds(width: usize, height: usize, anchors: &[XYXY<f32>]) -> Vec<usize> {
    let width = width as f32;
    let height = height as f32;
    anchors
        .iter()
        .enumerate()
        .filter(|(_, anchor)| anchor.is_inside(width, height))
        .map(|(index, _)| index)
        .collect()
}

/// Enumerate anchors over aspect ratios and scales wrt the reference
/// window `(0, 0, base_size, base_size)`.
///
/// For each ratio, the window area is kept and the width and height are
/// rounded to whole pixels. Each ratio window is then enlarged by every
/// scale about the same center.
pub fn base_anchors(base_size: usize, ratios: &[f64], scales: &[f64]) -> Vec<XYXY<f32>> {
    let base_size = base_size as f64;
    let reference = CxCyWH::from_xywh([0.0, 0.0, base_size, base_size]);
    let [cx, cy, w, h] = reference.cxcywh();
    let area = w * h;

    iproduct!(ratios, scales)
        .map(|(&ratio, &scale)| {
            let ratio_w = (area / ratio).sqrt().round();
            let ratio_h = (ratio_w * ratio).round();
            let anchor: XYXY<f64> =
                CxCyWH::from_cxcywh([cx, cy, ratio_w * scale, ratio_h * scale]).into();
            anchor.cast::<f32>()
        })
        .collect()
}
