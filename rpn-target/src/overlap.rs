//! Pairwise IoU between anchors and ground truth boxes.

use crate::common::*;
use ndarray::ArrayView1;

/// The IoU matrix with one row per anchor and one column per ground truth box.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapMatrix {
    overlaps: Array2<f32>,
}

impl OverlapMatrix {
    pub fn compute<A, G>(anchors: &[A], gt_boxes: &[G]) -> Self
    where
        A: Rect<Type = f32>,
        G: Rect<Type = f32>,
    {
        let overlaps = Array2::from_shape_fn((anchors.len(), gt_boxes.len()), |(row, col)| {
            anchors[row].iou_with(&gt_boxes[col])
        });
        Self { overlaps }
    }

    /// Wrap a precomputed matrix.
    pub fn from_array(overlaps: Array2<f32>) -> Self {
        Self { overlaps }
    }

    pub fn num_anchors(&self) -> usize {
        self.overlaps.nrows()
    }

    pub fn num_gt_boxes(&self) -> usize {
        self.overlaps.ncols()
    }

    pub fn get(&self, anchor_index: usize, gt_index: usize) -> f32 {
        self.overlaps[[anchor_index, gt_index]]
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.overlaps.view()
    }

    /// The best matching ground truth box and its IoU for each anchor.
    ///
    /// Ties go to the lowest box index. It is `None` for every anchor if there are no boxes.
    pub fn anchor_argmax(&self) -> Vec<Option<(usize, f32)>> {
        self.overlaps.rows().into_iter().map(argmax).collect()
    }

    /// The best matching anchor and its IoU for each ground truth box.
    ///
    /// Ties go to the lowest anchor index. It is `None` for every box if there are no anchors.
    pub fn gt_argmax(&self) -> Vec<Option<(usize, f32)>> {
        self.overlaps.columns().into_iter().map(argmax).collect()
    }
}

fn argmax(values: ArrayView1<'_, f32>) -> Option<(usize, f32)> {
    values
        .iter()
        .enumerate()
        .fold(None, |best, (index, &value)| match best {
            Some((_, best_value)) if best_value >= value => best,
            _ => Some((index, value)),
        })
}
