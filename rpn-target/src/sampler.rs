//! Anchor labeling and balanced subsampling.

use crate::{common::*, config::Config, overlap::OverlapMatrix};
use rand::seq::index;

/// The training label of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorLabel {
    Ignore,
    Background,
    Foreground,
}

impl AnchorLabel {
    /// The value written to label buffers.
    pub fn value(&self) -> i32 {
        match self {
            Self::Ignore => -1,
            Self::Background => 0,
            Self::Foreground => 1,
        }
    }
}

/// An anchor retained by the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampledAnchor {
    /// The row index in the overlap matrix.
    pub index: usize,
    pub label: AnchorLabel,
    /// The best matching ground truth box. It is set on foreground anchors.
    pub gt_index: Option<usize>,
}

/// Assigns labels to anchors and keeps a class balanced subset.
///
/// The sampler owns its random stream, so each worker needs its own instance.
#[derive(Debug, Clone)]
pub struct Sampler {
    negative_overlap: f32,
    positive_overlap: f32,
    num_foreground: usize,
    rois_per_image: usize,
    rng: StdRng,
}

impl Sampler {
    pub fn new(config: &Config) -> Self {
        Self::with_seed(config, config.random_seed())
    }

    pub fn with_seed(config: &Config, seed: u64) -> Self {
        Self {
            negative_overlap: config.negative_overlap(),
            positive_overlap: config.positive_overlap(),
            num_foreground: config.num_foreground(),
            rois_per_image: config.rois_per_image(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Label every anchor in the overlap matrix.
    ///
    /// An anchor is background if its best IoU is below `negative_overlap` and
    /// foreground if it reaches `positive_overlap`. The best anchor of each
    /// ground truth box is foreground regardless of the thresholds, even at
    /// zero overlap. Without ground truth boxes every anchor is background.
    pub fn label(&self, overlaps: &OverlapMatrix) -> Vec<AnchorLabel> {
        self.label_and_match(overlaps)
            .into_iter()
            .map(|(label, _)| label)
            .collect()
    }

    /// Label anchors and pair each with the box a foreground anchor regresses to.
    fn label_and_match(&self, overlaps: &OverlapMatrix) -> Vec<(AnchorLabel, Option<usize>)> {
        let num_anchors = overlaps.num_anchors();
        if overlaps.num_gt_boxes() == 0 {
            return vec![(AnchorLabel::Background, None); num_anchors];
        }

        let anchor_argmax = overlaps.anchor_argmax();
        let mut labeled: Vec<_> = anchor_argmax
            .iter()
            .map(|&best| {
                let (gt_index, iou) = match best {
                    Some(best) => best,
                    None => return (AnchorLabel::Background, None),
                };
                let label = if iou >= self.positive_overlap {
                    AnchorLabel::Foreground
                } else if iou < self.negative_overlap {
                    AnchorLabel::Background
                } else {
                    AnchorLabel::Ignore
                };
                (label, Some(gt_index))
            })
            .collect();

        // an anchor overlapping nothing regresses to the first box forcing it
        let mut forced_at_zero = vec![false; num_anchors];

        overlaps
            .gt_argmax()
            .into_iter()
            .enumerate()
            .for_each(|(gt_index, best)| match best {
                Some((row, _)) => {
                    let (label, matched) = &mut labeled[row];
                    *label = AnchorLabel::Foreground;

                    let max_overlap = anchor_argmax[row].map_or(0.0, |(_, iou)| iou);
                    if max_overlap <= 0.0 && !forced_at_zero[row] {
                        debug!(
                            "ground truth box {} overlaps no anchor, forcing anchor {}",
                            gt_index, row
                        );
                        forced_at_zero[row] = true;
                        *matched = Some(gt_index);
                    }
                }
                None => debug!("ground truth box {} has no anchor to match", gt_index),
            });

        labeled
    }

    /// Reduce the labeled anchors to at most `rois_per_image`, of which at most
    /// `foreground_fraction` are foreground. Dropped anchors become ignored.
    pub fn subsample(&mut self, labels: &mut [AnchorLabel]) {
        let num_foreground =
            self.disable_excess(labels, AnchorLabel::Foreground, self.num_foreground);
        let max_background = self.rois_per_image - num_foreground;
        self.disable_excess(labels, AnchorLabel::Background, max_background);
    }

    /// Label, subsample and collect the retained anchors in row order.
    pub fn sample(&mut self, overlaps: &OverlapMatrix) -> Vec<SampledAnchor> {
        let (mut labels, matched): (Vec<_>, Vec<_>) =
            self.label_and_match(overlaps).into_iter().unzip();
        self.subsample(&mut labels);

        labels
            .into_iter()
            .zip(matched)
            .enumerate()
            .filter_map(|(index, (label, matched))| {
                let gt_index = match label {
                    AnchorLabel::Ignore => return None,
                    AnchorLabel::Background => None,
                    AnchorLabel::Foreground => matched,
                };
                Some(SampledAnchor {
                    index,
                    label,
                    gt_index,
                })
            })
            .collect()
    }

    /// Keep at most `max_count` anchors with the given label, chosen uniformly.
    /// Returns the number of kept anchors.
    fn disable_excess(
        &mut self,
        labels: &mut [AnchorLabel],
        target: AnchorLabel,
        max_count: usize,
    ) -> usize {
        let candidates: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &label)| label == target)
            .map(|(index, _)| index)
            .collect();

        if candidates.len() <= max_count {
            return candidates.len();
        }

        let num_disabled = candidates.len() - max_count;
        index::sample(&mut self.rng, candidates.len(), num_disabled)
            .into_iter()
            .for_each(|nth| labels[candidates[nth]] = AnchorLabel::Ignore);

        max_count
    }
}
