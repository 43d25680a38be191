//! Ground truth object labels.

use bbox::{Rect, RectNum, Transform, XYXY};
use num_traits::Num;
use std::ops::Mul;

/// An annotated object: its rect, class index and annotation flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label<R, C>
where
    R: Rect,
{
    pub rect: R,
    pub class: C,
    /// The object is marked hard to recognize.
    pub difficult: bool,
    /// The object is partially outside the image or occluded.
    pub truncated: bool,
}

impl<R, C> Label<R, C>
where
    R: Rect,
{
    pub fn new(rect: R, class: C) -> Self {
        Self {
            rect,
            class,
            difficult: false,
            truncated: false,
        }
    }
}

impl<T, C> Label<XYXY<T>, C>
where
    T: Copy + Num + PartialOrd,
{
    /// Clip the rect to the image. Returns `None` if nothing is left.
    pub fn clip(&self, width: T, height: T) -> Option<Self>
    where
        C: Copy,
    {
        let rect = self.rect.clip(width, height);
        (!rect.is_degenerate()).then(|| Self {
            rect,
            class: self.class,
            difficult: self.difficult,
            truncated: self.truncated,
        })
    }
}

impl<'a, T, C> Mul<&'a Label<XYXY<T>, C>> for &'a Transform<T>
where
    T: Copy + Num + PartialOrd,
    C: Copy,
{
    type Output = Label<XYXY<T>, C>;

    fn mul(self, rhs: &'a Label<XYXY<T>, C>) -> Self::Output {
        Label {
            rect: self * &rhs.rect,
            class: rhs.class,
            difficult: rhs.difficult,
            truncated: rhs.truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_transform_keeps_flags() {
        let label = Label {
            rect: XYXY::from_xyxy([1.0, 2.0, 3.0, 4.0]),
            class: 5usize,
            difficult: true,
            truncated: false,
        };
        let out = &Transform::scale(2.0) * &label;
        assert_eq!(out.rect.xyxy(), [2.0, 4.0, 6.0, 8.0]);
        assert_eq!(out.class, 5);
        assert!(out.difficult);
    }

    #[test]
    fn label_clip_drops_empty() {
        let label = Label::new(XYXY::from_xyxy([20.0, 0.0, 30.0, 4.0]), 0usize);
        assert!(label.clip(16.0, 16.0).is_none());

        let label = Label::new(XYXY::from_xyxy([10.0, 0.0, 30.0, 4.0]), 0usize);
        let clipped = label.clip(16.0, 16.0).unwrap();
        assert_eq!(clipped.rect.xyxy(), [10.0, 0.0, 16.0, 4.0]);
    }
}
