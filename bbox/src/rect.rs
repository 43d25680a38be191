use super::XYXY;
use crate::common::*;

/// The generic axis-aligned rectangle.
///
/// The x axis grows to the right and the y axis grows downwards, so
/// `(x1, y1)` is the top-left corner and `(x2, y2)` the bottom-right one.
pub trait Rect {
    type Type;

    fn x1(&self) -> Self::Type;
    fn y1(&self) -> Self::Type;
    fn x2(&self) -> Self::Type;
    fn y2(&self) -> Self::Type;
    fn cx(&self) -> Self::Type;
    fn cy(&self) -> Self::Type;
    fn w(&self) -> Self::Type;
    fn h(&self) -> Self::Type;

    fn try_from_xyxy(xyxy: [Self::Type; 4]) -> Result<Self>
    where
        Self: Sized;

    fn try_from_xywh(xywh: [Self::Type; 4]) -> Result<Self>
    where
        Self: Sized;

    fn try_from_cxcywh(cxcywh: [Self::Type; 4]) -> Result<Self>
    where
        Self: Sized;
}

pub trait RectNum: Rect
where
    Self::Type: Num + PartialOrd,
{
    fn from_xyxy(xyxy: [Self::Type; 4]) -> Self
    where
        Self: Sized,
    {
        Self::try_from_xyxy(xyxy).unwrap()
    }

    fn from_xywh(xywh: [Self::Type; 4]) -> Self
    where
        Self: Sized,
    {
        Self::try_from_xywh(xywh).unwrap()
    }

    fn from_cxcywh(cxcywh: [Self::Type; 4]) -> Self
    where
        Self: Sized,
    {
        Self::try_from_cxcywh(cxcywh).unwrap()
    }

    fn xyxy(&self) -> [Self::Type; 4] {
        [self.x1(), self.y1(), self.x2(), self.y2()]
    }

    fn cxcywh(&self) -> [Self::Type; 4] {
        [self.cx(), self.cy(), self.w(), self.h()]
    }

    fn wh(&self) -> [Self::Type; 2] {
        [self.w(), self.h()]
    }

    fn area(&self) -> Self::Type {
        self.w() * self.h()
    }

    /// Returns true if the rect has zero width or zero height.
    fn is_degenerate(&self) -> bool {
        let zero = Self::Type::zero();
        self.w() <= zero || self.h() <= zero
    }

    /// Checks if all four corners lie within `[0, width] x [0, height]`.
    fn is_inside(&self, width: Self::Type, height: Self::Type) -> bool {
        let zero = Self::Type::zero();
        self.x1() >= zero && self.y1() >= zero && self.x2() <= width && self.y2() <= height
    }
}

pub trait RectFloat: RectNum
where
    Self::Type: Float,
{
    fn intersect_with<R>(&self, other: &R) -> Option<XYXY<Self::Type>>
    where
        R: Rect<Type = Self::Type>,
    {
        let x1 = self.x1().max(other.x1());
        let y1 = self.y1().max(other.y1());
        let x2 = self.x2().min(other.x2());
        let y2 = self.y2().min(other.y2());
        (x2 > x1 && y2 > y1).then(|| XYXY::from_xyxy([x1, y1, x2, y2]))
    }

    fn intersection_area_with<R>(&self, other: &R) -> Self::Type
    where
        R: Rect<Type = Self::Type>,
    {
        self.intersect_with(other)
            .map(|rect| rect.area())
            .unwrap_or_else(Self::Type::zero)
    }

    fn union_area_with<R>(&self, other: &R) -> Self::Type
    where
        R: Rect<Type = Self::Type>,
    {
        self.area() + other.area() - self.intersection_area_with(other)
    }

    /// Intersection over union. It is zero if either rect is degenerate.
    fn iou_with<R>(&self, other: &R) -> Self::Type
    where
        R: Rect<Type = Self::Type>,
    {
        let zero = Self::Type::zero();
        let area_a = self.area();
        let area_b = other.area();
        if area_a <= zero || area_b <= zero {
            return zero;
        }

        let inter_area = self.intersection_area_with(other);
        inter_area / (area_a + area_b - inter_area)
    }
}

impl<T> RectNum for T
where
    T: Rect,
    T::Type: Num + PartialOrd,
{
}

impl<T> RectFloat for T
where
    T: Rect,
    T::Type: Float,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::prelude::*;

    fn random_rect(rng: &mut StdRng) -> XYXY<f32> {
        let x1 = rng.gen_range(0.0..100.0);
        let y1 = rng.gen_range(0.0..100.0);
        let w = rng.gen_range(1.0..50.0);
        let h = rng.gen_range(1.0..50.0);
        XYXY::from_xywh([x1, y1, w, h])
    }

    #[test]
    fn rect_iou_simple() {
        let a = XYXY::from_xyxy([0.0, 0.0, 2.0, 2.0]);
        let b = XYXY::from_xyxy([1.0, 0.0, 3.0, 2.0]);
        assert_abs_diff_eq!(a.intersection_area_with(&b), 2.0);
        assert_abs_diff_eq!(a.union_area_with(&b), 6.0);
        assert_abs_diff_eq!(a.iou_with(&b), 1.0 / 3.0);
    }

    #[test]
    fn rect_iou_disjoint() {
        let a = XYXY::from_xyxy([0.0, 0.0, 2.0, 2.0]);
        let b = XYXY::from_xyxy([2.0, 2.0, 3.0, 3.0]);
        assert!(a.intersect_with(&b).is_none());
        assert_eq!(a.iou_with(&b), 0.0);
    }

    #[test]
    fn rect_iou_degenerate() {
        let a = XYXY::from_xyxy([1.0, 1.0, 1.0, 5.0]);
        assert!(a.is_degenerate());
        assert_eq!(a.iou_with(&a), 0.0);

        let b = XYXY::from_xyxy([0.0, 0.0, 4.0, 4.0]);
        assert_eq!(a.iou_with(&b), 0.0);
        assert_eq!(b.iou_with(&a), 0.0);
    }

    #[test]
    fn rect_iou_symmetric_and_reflexive() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1000 {
            let a = random_rect(&mut rng);
            let b = random_rect(&mut rng);
            let ab = a.iou_with(&b);
            assert_eq!(ab, b.iou_with(&a));
            assert!((0.0..=1.0).contains(&ab));
            assert_eq!(a.iou_with(&a), 1.0);
        }
    }

    #[test]
    fn rect_inside_bounds() {
        let rect = XYXY::from_xyxy([0.0, 0.0, 16.0, 16.0]);
        assert!(rect.is_inside(16.0, 16.0));
        assert!(!rect.is_inside(15.0, 16.0));

        let rect = XYXY::from_xyxy([-0.5, 0.0, 4.0, 4.0]);
        assert!(!rect.is_inside(16.0, 16.0));
    }
}
