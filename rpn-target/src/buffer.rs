//! Typed views of caller owned output buffers.

use crate::common::*;

/// The element type of an output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    I32,
    F32,
}

/// Types that can be stored in an output buffer.
pub trait Element
where
    Self: Copy + Default + Debug,
{
    const KIND: ElementKind;
}

impl Element for i32 {
    const KIND: ElementKind = ElementKind::I32;
}

impl Element for f32 {
    const KIND: ElementKind = ElementKind::F32;
}

/// The name, length and element type of an output buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BufferSpec {
    pub name: &'static str,
    pub len: usize,
    pub kind: ElementKind,
}

/// The sizes every output buffer is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputLayout {
    pub total_anchors: usize,
    pub rois_per_image: usize,
    pub max_gt_boxes: usize,
}

impl OutputLayout {
    /// Buffer specs in the order the loader fills them.
    pub fn specs(&self) -> Vec<BufferSpec> {
        let Self {
            total_anchors,
            rois_per_image,
            max_gt_boxes,
        } = *self;

        let spec = |name, len, kind| BufferSpec { name, len, kind };
        vec![
            spec("labels", total_anchors, ElementKind::I32),
            spec("labels_mask", total_anchors, ElementKind::I32),
            spec("bbox_targets", total_anchors * 4, ElementKind::F32),
            spec("bbox_targets_mask", total_anchors * 4, ElementKind::F32),
            spec("anchor_index", rois_per_image, ElementKind::I32),
            spec("image_shape", 2, ElementKind::I32),
            spec("gt_boxes", max_gt_boxes * 4, ElementKind::F32),
            spec("num_gt_boxes", 1, ElementKind::I32),
            spec("gt_classes", max_gt_boxes, ElementKind::I32),
            spec("gt_difficult", max_gt_boxes, ElementKind::I32),
            spec("image_scale", 1, ElementKind::F32),
        ]
    }
}

/// A mutable view of a caller owned buffer.
#[derive(Debug)]
pub struct BufferView<'a, T>
where
    T: Element,
{
    data: &'a mut [T],
}

impl<'a, T> BufferView<'a, T>
where
    T: Element,
{
    pub fn new(data: &'a mut [T]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &*self.data
    }

    /// Check the view against a spec.
    pub fn check(&self, spec: &BufferSpec) -> Result<()> {
        ensure!(
            T::KIND == spec.kind,
            "buffer '{}' expects {:?} elements, but get {:?}",
            spec.name,
            spec.kind,
            T::KIND
        );
        ensure!(
            self.data.len() == spec.len,
            "buffer '{}' expects length {}, but get {}",
            spec.name,
            spec.len,
            self.data.len()
        );
        Ok(())
    }

    /// Copy values to the front of the buffer and zero the rest.
    ///
    /// Returns the number of copied values.
    pub fn write<I>(&mut self, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
    {
        let mut values = values.into_iter();
        let mut count = 0;

        for (slot, value) in self.data.iter_mut().zip(&mut values) {
            *slot = value;
            count += 1;
        }
        ensure!(
            values.next().is_none(),
            "too many values for a buffer of length {}",
            self.data.len()
        );

        self.data[count..]
            .iter_mut()
            .for_each(|slot| *slot = T::default());
        Ok(count)
    }
}

/// Views of all output buffers of one item.
#[derive(Debug)]
pub struct OutputBuffers<'a> {
    pub labels: BufferView<'a, i32>,
    pub labels_mask: BufferView<'a, i32>,
    pub bbox_targets: BufferView<'a, f32>,
    pub bbox_targets_mask: BufferView<'a, f32>,
    pub anchor_index: BufferView<'a, i32>,
    pub image_shape: BufferView<'a, i32>,
    pub gt_boxes: BufferView<'a, f32>,
    pub num_gt_boxes: BufferView<'a, i32>,
    pub gt_classes: BufferView<'a, i32>,
    pub gt_difficult: BufferView<'a, i32>,
    pub image_scale: BufferView<'a, f32>,
}

impl<'a> OutputBuffers<'a> {
    /// Check every view against the layout.
    pub fn check(&self, layout: &OutputLayout) -> Result<()> {
        let specs = layout.specs();
        let [
            labels,
            labels_mask,
            bbox_targets,
            bbox_targets_mask,
            anchor_index,
            image_shape,
            gt_boxes,
            num_gt_boxes,
            gt_classes,
            gt_difficult,
            image_scale,
        ] = <&[BufferSpec; 11]>::try_from(specs.as_slice())?;

        self.labels.check(labels)?;
        self.labels_mask.check(labels_mask)?;
        self.bbox_targets.check(bbox_targets)?;
        self.bbox_targets_mask.check(bbox_targets_mask)?;
        self.anchor_index.check(anchor_index)?;
        self.image_shape.check(image_shape)?;
        self.gt_boxes.check(gt_boxes)?;
        self.num_gt_boxes.check(num_gt_boxes)?;
        self.gt_classes.check(gt_classes)?;
        self.gt_difficult.check(gt_difficult)?;
        self.image_scale.check(image_scale)?;
        Ok(())
    }
}

/// Owned storage for the output buffers of one item.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputArrays {
    pub labels: Vec<i32>,
    pub labels_mask: Vec<i32>,
    pub bbox_targets: Vec<f32>,
    pub bbox_targets_mask: Vec<f32>,
    pub anchor_index: Vec<i32>,
    pub image_shape: Vec<i32>,
    pub gt_boxes: Vec<f32>,
    pub num_gt_boxes: Vec<i32>,
    pub gt_classes: Vec<i32>,
    pub gt_difficult: Vec<i32>,
    pub image_scale: Vec<f32>,
}

impl OutputArrays {
    pub fn new(layout: &OutputLayout) -> Self {
        let OutputLayout {
            total_anchors,
            rois_per_image,
            max_gt_boxes,
        } = *layout;

        Self {
            labels: vec![0; total_anchors],
            labels_mask: vec![0; total_anchors],
            bbox_targets: vec![0.0; total_anchors * 4],
            bbox_targets_mask: vec![0.0; total_anchors * 4],
            anchor_index: vec![0; rois_per_image],
            image_shape: vec![0; 2],
            gt_boxes: vec![0.0; max_gt_boxes * 4],
            num_gt_boxes: vec![0; 1],
            gt_classes: vec![0; max_gt_boxes],
            gt_difficult: vec![0; max_gt_boxes],
            image_scale: vec![0.0; 1],
        }
    }

    pub fn views(&mut self) -> OutputBuffers<'_> {
        OutputBuffers {
            labels: BufferView::new(&mut self.labels),
            labels_mask: BufferView::new(&mut self.labels_mask),
            bbox_targets: BufferView::new(&mut self.bbox_targets),
            bbox_targets_mask: BufferView::new(&mut self.bbox_targets_mask),
            anchor_index: BufferView::new(&mut self.anchor_index),
            image_shape: BufferView::new(&mut self.image_shape),
            gt_boxes: BufferView::new(&mut self.gt_boxes),
            num_gt_boxes: BufferView::new(&mut self.num_gt_boxes),
            gt_classes: BufferView::new(&mut self.gt_classes),
            gt_difficult: BufferView::new(&mut self.gt_difficult),
            image_scale: BufferView::new(&mut self.image_scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_write_pads_with_zeros() -> Result<()> {
        let mut data = vec![7; 5];
        let mut view = BufferView::new(&mut data);
        assert_eq!(view.write([1, 2])?, 2);
        assert_eq!(view.as_slice(), &[1, 2, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn view_write_overflow() {
        let mut data = vec![0.0f32; 2];
        let mut view = BufferView::new(&mut data);
        assert!(view.write([1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn arrays_match_layout() -> Result<()> {
        let layout = OutputLayout {
            total_anchors: 36,
            rois_per_image: 8,
            max_gt_boxes: 3,
        };
        let mut arrays = OutputArrays::new(&layout);
        let views = arrays.views();
        views.check(&layout)?;

        let other = OutputLayout {
            max_gt_boxes: 4,
            ..layout
        };
        assert!(views.check(&other).is_err());
        Ok(())
    }

    #[test]
    fn view_check_kind() {
        let spec = BufferSpec {
            name: "labels",
            len: 2,
            kind: ElementKind::I32,
        };
        let mut data = vec![0.0f32; 2];
        assert!(BufferView::new(&mut data).check(&spec).is_err());

        let mut data = vec![0i32; 2];
        assert!(BufferView::new(&mut data).check(&spec).is_ok());
    }
}
