use crate::{
    buffer::{BufferSpec, OutputBuffers, OutputLayout},
    common::*,
    config::Config,
    decoded::Decoded,
    etl::Loader,
    sampler::AnchorLabel,
};

/// Copies a transformed item into caller owned buffers.
#[derive(Debug, Clone)]
pub struct LocalizationLoader {
    layout: OutputLayout,
}

impl LocalizationLoader {
    pub fn new(config: &Config) -> Self {
        Self {
            layout: OutputLayout {
                total_anchors: config.total_anchors(),
                rois_per_image: config.rois_per_image(),
                max_gt_boxes: config.max_gt_boxes(),
            },
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// The buffers the caller must allocate for each item.
    pub fn buffer_specs(&self) -> Vec<BufferSpec> {
        self.layout.specs()
    }
}

impl Loader for LocalizationLoader {
    type Item = Decoded;
    type Buffers<'a> = OutputBuffers<'a>;

    fn load(&self, buffers: &mut OutputBuffers<'_>, item: &Decoded) -> Result<()> {
        let OutputLayout { total_anchors, .. } = self.layout;
        buffers.check(&self.layout)?;
        ensure!(
            item.labels.len() == total_anchors && item.bbox_targets.len() == total_anchors,
            "the item is not transformed for {} anchors",
            total_anchors
        );

        let is_foreground = |label: &AnchorLabel| *label == AnchorLabel::Foreground;

        buffers
            .labels
            .write(item.labels.iter().map(|label| label.value()))?;
        buffers.labels_mask.write(
            item.labels
                .iter()
                .map(|&label| (label != AnchorLabel::Ignore) as i32),
        )?;
        buffers.bbox_targets.write(
            item.bbox_targets
                .iter()
                .flat_map(|target| target.to_array()),
        )?;
        buffers.bbox_targets_mask.write(item.labels.iter().flat_map(|label| {
            let value = if is_foreground(label) { 1.0 } else { 0.0 };
            [value; 4]
        }))?;
        buffers
            .anchor_index
            .write(item.anchor_index.iter().map(|&index| index as i32))
            .context("more anchors are sampled than rois_per_image")?;

        let [width, height] = item.output_image_size.wh();
        buffers.image_shape.write([width as i32, height as i32])?;
        buffers
            .gt_boxes
            .write(item.gt_boxes.iter().flat_map(|gt| gt.rect.xyxy()))
            .context("more boxes than max_gt_boxes")?;
        buffers.num_gt_boxes.write([item.gt_boxes.len() as i32])?;
        buffers
            .gt_classes
            .write(item.gt_boxes.iter().map(|gt| gt.class as i32))?;
        buffers
            .gt_difficult
            .write(item.gt_boxes.iter().map(|gt| gt.difficult as i32))?;
        buffers.image_scale.write([item.image_scale])?;

        Ok(())
    }
}
