use crate::{
    anchor::AnchorLattice,
    common::*,
    config::Config,
    decoded::{Decoded, GroundTruth},
    etl::Transformer,
    overlap::OverlapMatrix,
    params::ImageParams,
    sampler::{AnchorLabel, Sampler},
    target::{self, Target},
};

/// Computes anchor labels and regression targets for a decoded item.
///
/// The lattice is shared read-only. The sampler random stream is owned,
/// hence each worker must hold its own transformer.
#[derive(Debug, Clone)]
pub struct LocalizationTransformer {
    config: Arc<Config>,
    lattice: Arc<AnchorLattice>,
    sampler: Sampler,
}

impl LocalizationTransformer {
    pub fn new(config: Arc<Config>, lattice: Arc<AnchorLattice>) -> Self {
        let seed = config.random_seed();
        Self::with_seed(config, lattice, seed)
    }

    /// Create a transformer with its own random seed, typically one per worker.
    pub fn with_seed(config: Arc<Config>, lattice: Arc<AnchorLattice>, seed: u64) -> Self {
        assert_eq!(
            lattice.len(),
            config.total_anchors(),
            "the lattice does not belong to the configuration"
        );
        let sampler = Sampler::with_seed(&config, seed);

        Self {
            config,
            lattice,
            sampler,
        }
    }

    pub fn lattice(&self) -> &AnchorLattice {
        &self.lattice
    }

    /// Map source boxes to the output image, dropping empty boxes and
    /// boxes beyond `max_gt_boxes` in input order.
    fn transform_boxes(
        &self,
        params: &ImageParams,
        boxes: &[GroundTruth],
    ) -> Result<Vec<GroundTruth>> {
        let transform = params.transform()?;
        let [width, height] = params.output_size.wh();
        let max_gt_boxes = self.config.max_gt_boxes();

        let visible: Vec<GroundTruth> = boxes
            .iter()
            .filter_map(|gt| (&transform * gt).clip(width as f32, height as f32))
            .collect();

        let num_empty = boxes.len() - visible.len();
        if num_empty > 0 {
            debug!("dropped {} boxes outside of the output image", num_empty);
        }
        if visible.len() > max_gt_boxes {
            warn!(
                "dropped {} boxes beyond max_gt_boxes {}",
                visible.len() - max_gt_boxes,
                max_gt_boxes
            );
        }

        Ok(visible.into_iter().take(max_gt_boxes).collect())
    }
}

impl Transformer for LocalizationTransformer {
    type Item = Decoded;
    type Params = ImageParams;

    fn transform(&mut self, params: &ImageParams, mut decoded: Decoded) -> Result<Decoded> {
        let gt_boxes = self.transform_boxes(params, &decoded.boxes)?;
        let [width, height] = params.output_size.wh();

        let anchors = self.lattice.anchors();
        let inside_indices = self.lattice.inside_image_bounds(width, height);
        let inside_anchors: Vec<XYXY<f32>> = inside_indices
            .iter()
            .map(|&index| anchors[index])
            .collect();
        let gt_rects: Vec<XYXY<f32>> = gt_boxes.iter().map(|gt| gt.rect).collect();

        let overlaps = OverlapMatrix::compute(&inside_anchors, &gt_rects);
        let sampled = self.sampler.sample(&overlaps);

        let total_anchors = self.config.total_anchors();
        let mut labels = vec![AnchorLabel::Ignore; total_anchors];
        let mut bbox_targets = vec![Target::default(); total_anchors];
        let anchor_index: Vec<usize> = sampled
            .iter()
            .map(|sample| {
                let index = inside_indices[sample.index];
                labels[index] = sample.label;

                if let Some(gt_index) = sample.gt_index {
                    bbox_targets[index] = target::encode(&anchors[index], &gt_rects[gt_index]);
                }

                index
            })
            .collect();
        assert_eq!(labels.len(), anchors.len());

        debug!(
            "sampled {} anchors out of {} inside the image",
            anchor_index.len(),
            inside_indices.len()
        );

        decoded.gt_boxes = gt_boxes;
        decoded.labels = labels;
        decoded.bbox_targets = bbox_targets;
        decoded.anchor_index = anchor_index;
        decoded.image_scale = params.scale;
        decoded.output_image_size = params.output_size;

        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigInit;

    fn setup() -> (Arc<Config>, Arc<AnchorLattice>) {
        setup_with_overlaps(0.3, 0.7)
    }

    fn setup_with_overlaps(
        negative_overlap: f64,
        positive_overlap: f64,
    ) -> (Arc<Config>, Arc<AnchorLattice>) {
        let config = ConfigInit {
            ratios: vec![r64(1.0)],
            scales: vec![r64(1.0)],
            max_gt_boxes: 2,
            negative_overlap: r64(negative_overlap),
            positive_overlap: r64(positive_overlap),
            ..ConfigInit::new(32, ["object"])
        }
        .build()
        .unwrap();
        let lattice = AnchorLattice::generate(&config);
        (Arc::new(config), Arc::new(lattice))
    }

    fn decoded(rects: &[[f32; 4]]) -> Decoded {
        let boxes = rects
            .iter()
            .map(|&xyxy| Label::new(XYXY::from_xyxy(xyxy), 0))
            .collect();
        Decoded::new(Size::from_wh([32, 32]), 3, boxes)
    }

    #[test]
    fn transform_caps_and_clips_boxes() -> Result<()> {
        let (config, lattice) = setup();
        let mut transformer = LocalizationTransformer::new(config, lattice);

        let params = ImageParams::new(1.0, Size::from_wh([32, 32]));
        let item = decoded(&[
            [40.0, 0.0, 50.0, 10.0],  // outside
            [20.0, 20.0, 40.0, 40.0], // partially outside
            [0.0, 0.0, 16.0, 16.0],
            [0.0, 0.0, 8.0, 8.0], // beyond max_gt_boxes
        ]);
        let out = transformer.transform(&params, item)?;

        let rects: Vec<_> = out.gt_boxes.iter().map(|gt| gt.rect.xyxy()).collect();
        assert_eq!(rects, vec![[20.0, 20.0, 32.0, 32.0], [0.0, 0.0, 16.0, 16.0]]);
        assert_eq!(out.boxes.len(), 4);
        Ok(())
    }

    #[test]
    fn transform_scaled_and_flipped() -> Result<()> {
        let (config, lattice) = setup();
        let mut transformer = LocalizationTransformer::new(config, lattice);

        // a 64 px image downscaled by half, the box lands on the top right cell after flipping
        let params = ImageParams {
            scale: 0.5,
            crop_offset: [0.0, 0.0],
            flip: true,
            output_size: Size::from_wh([32, 32]),
        };
        let item = decoded(&[[0.0, 0.0, 32.0, 32.0]]);
        let out = transformer.transform(&params, item)?;

        assert_eq!(out.gt_boxes[0].rect.xyxy(), [16.0, 0.0, 32.0, 16.0]);
        assert_eq!(out.image_scale, 0.5);
        assert_eq!(out.labels[1], AnchorLabel::Foreground);
        assert_eq!(out.bbox_targets[1], Target::default());
        assert_eq!(out.num_foreground(), 1);
        assert_eq!(out.num_background(), 3);
        Ok(())
    }

    #[test]
    fn transform_outside_anchors_are_ignored() -> Result<()> {
        let (config, lattice) = setup();
        let mut transformer = LocalizationTransformer::new(config, lattice);

        let params = ImageParams::new(1.0, Size::from_wh([20, 32]));
        let out = transformer.transform(&params, decoded(&[]))?;

        assert_eq!(
            out.labels,
            vec![
                AnchorLabel::Background,
                AnchorLabel::Ignore,
                AnchorLabel::Background,
                AnchorLabel::Ignore,
            ]
        );
        assert_eq!(out.anchor_index, vec![0, 2]);
        assert_eq!(out.output_image_size, Size::from_wh([20, 32]));
        Ok(())
    }

    #[test]
    fn transform_without_boxes_is_all_background() -> Result<()> {
        for (negative_overlap, positive_overlap) in [(0.0, 0.5), (0.0, 0.0)] {
            let (config, lattice) = setup_with_overlaps(negative_overlap, positive_overlap);
            let mut transformer = LocalizationTransformer::new(config, lattice);

            let params = ImageParams::new(1.0, Size::from_wh([32, 32]));
            let out = transformer.transform(&params, decoded(&[]))?;

            assert_eq!(out.labels, vec![AnchorLabel::Background; 4]);
            assert_eq!(out.num_foreground(), 0);
            assert_eq!(out.num_background(), 4);
            assert!(out.bbox_targets.iter().all(|t| *t == Target::default()));
        }
        Ok(())
    }

    #[test]
    fn transform_forces_anchor_for_unreachable_box() -> Result<()> {
        let (config, lattice) = setup();
        let mut transformer = LocalizationTransformer::new(config, lattice.clone());

        // only the top left anchor fits, and it does not touch the box
        let params = ImageParams::new(1.0, Size::from_wh([24, 24]));
        let out = transformer.transform(&params, decoded(&[[18.0, 18.0, 24.0, 24.0]]))?;

        assert_eq!(out.anchor_index, vec![0]);
        assert_eq!(out.labels[0], AnchorLabel::Foreground);
        assert_eq!(out.num_foreground(), 1);
        assert_eq!(
            out.bbox_targets[0],
            target::encode(&lattice.anchors()[0], &out.gt_boxes[0].rect)
        );
        Ok(())
    }
}
