//! Bounding box regression targets.
//!
//! A target describes a box relative to an anchor:
//! `dx = (cx' - cx) / w`, `dy = (cy' - cy) / h`, `dw = ln(w' / w)`, `dh = ln(h' / h)`.

use crate::common::*;
use num_traits::Float;

/// The regression delta of a box wrt an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Target<T = f32> {
    pub dx: T,
    pub dy: T,
    pub dw: T,
    pub dh: T,
}

impl<T> Target<T>
where
    T: Copy,
{
    pub fn to_array(&self) -> [T; 4] {
        [self.dx, self.dy, self.dw, self.dh]
    }
}

/// Compute the target that maps `anchor` onto `gt`.
///
/// # Panics
/// Both rects must have positive width and height.
pub fn encode<T, A, G>(anchor: &A, gt: &G) -> Target<T>
where
    T: Float,
    A: Rect<Type = T> + Debug,
    G: Rect<Type = T> + Debug,
{
    assert!(
        !anchor.is_degenerate(),
        "cannot encode wrt a degenerate anchor {:?}",
        anchor
    );
    assert!(!gt.is_degenerate(), "cannot encode a degenerate box {:?}", gt);

    let [cx, cy, w, h] = anchor.cxcywh();
    let [gt_cx, gt_cy, gt_w, gt_h] = gt.cxcywh();

    Target {
        dx: (gt_cx - cx) / w,
        dy: (gt_cy - cy) / h,
        dw: (gt_w / w).ln(),
        dh: (gt_h / h).ln(),
    }
}

/// Apply the target to `anchor`. It is the inverse of [encode].
pub fn decode<T, A>(anchor: &A, target: &Target<T>) -> XYXY<T>
where
    T: Float,
    A: Rect<Type = T>,
{
    let [cx, cy, w, h] = anchor.cxcywh();
    let Target { dx, dy, dw, dh } = *target;

    CxCyWH::from_cxcywh([dx * w + cx, dy * h + cy, dw.exp() * w, dh.exp() * h]).into()
}
