use super::{CxCyWH, Rect};
use crate::{common::*, Transform};

/// Bounding box in corner (x1, y1, x2, y2) format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XYXY<T> {
    pub(crate) x1: T,
    pub(crate) y1: T,
    pub(crate) x2: T,
    pub(crate) y2: T,
}

impl<T> XYXY<T> {
    pub fn try_cast<V>(self) -> Option<XYXY<V>>
    where
        T: ToPrimitive,
        V: NumCast,
    {
        Some(XYXY {
            x1: V::from(self.x1)?,
            y1: V::from(self.y1)?,
            x2: V::from(self.x2)?,
            y2: V::from(self.y2)?,
        })
    }

    pub fn cast<V>(self) -> XYXY<V>
    where
        T: ToPrimitive,
        V: NumCast,
    {
        self.try_cast().unwrap()
    }
}

impl<T> XYXY<T>
where
    T: Copy + Num + PartialOrd,
{
    /// Apply the transform. Corners are reordered when the transform mirrors an axis.
    pub fn transform(&self, transform: &Transform<T>) -> Self {
        let xa = self.x1 * transform.sx + transform.tx;
        let xb = self.x2 * transform.sx + transform.tx;
        let ya = self.y1 * transform.sy + transform.ty;
        let yb = self.y2 * transform.sy + transform.ty;
        let (x1, x2) = if xa <= xb { (xa, xb) } else { (xb, xa) };
        let (y1, y2) = if ya <= yb { (ya, yb) } else { (yb, ya) };
        XYXY { x1, y1, x2, y2 }
    }

    /// Clip the corners to `[0, width] x [0, height]`.
    pub fn clip(&self, width: T, height: T) -> Self {
        let zero = T::zero();
        let clamp = |value: T, max: T| {
            if value < zero {
                zero
            } else if value > max {
                max
            } else {
                value
            }
        };

        XYXY {
            x1: clamp(self.x1, width),
            y1: clamp(self.y1, height),
            x2: clamp(self.x2, width),
            y2: clamp(self.y2, height),
        }
    }
}

impl<T> Rect for XYXY<T>
where
    T: Copy + Num + PartialOrd,
{
    type Type = T;

    fn x1(&self) -> Self::Type {
        self.x1
    }

    fn y1(&self) -> Self::Type {
        self.y1
    }

    fn x2(&self) -> Self::Type {
        self.x2
    }

    fn y2(&self) -> Self::Type {
        self.y2
    }

    fn cx(&self) -> Self::Type {
        let two = T::one() + T::one();
        self.x1 + self.w() / two
    }

    fn cy(&self) -> Self::Type {
        let two = T::one() + T::one();
        self.y1 + self.h() / two
    }

    fn w(&self) -> Self::Type {
        self.x2 - self.x1
    }

    fn h(&self) -> Self::Type {
        self.y2 - self.y1
    }

    fn try_from_xyxy(xyxy: [Self::Type; 4]) -> Result<Self> {
        let [x1, y1, x2, y2] = xyxy;
        ensure!(x2 >= x1 && y2 >= y1, "x1 <= x2 and y1 <= y2 must hold");
        Ok(Self { x1, y1, x2, y2 })
    }

    fn try_from_xywh(xywh: [Self::Type; 4]) -> Result<Self> {
        let [x1, y1, w, h] = xywh;
        Self::try_from_xyxy([x1, y1, x1 + w, y1 + h])
    }

    fn try_from_cxcywh(cxcywh: [Self::Type; 4]) -> Result<Self> {
        let [cx, cy, w, h] = cxcywh;
        let zero = T::zero();
        ensure!(w >= zero && h >= zero, "w and h must be non-negative");

        let two = T::one() + T::one();
        Ok(Self {
            x1: cx - w / two,
            y1: cy - h / two,
            x2: cx + w / two,
            y2: cy + h / two,
        })
    }
}

impl<T> From<CxCyWH<T>> for XYXY<T>
where
    T: Copy + Num,
{
    fn from(from: CxCyWH<T>) -> Self {
        Self::from(&from)
    }
}

impl<T> From<&CxCyWH<T>> for XYXY<T>
where
    T: Copy + Num,
{
    fn from(from: &CxCyWH<T>) -> Self {
        let two = T::one() + T::one();
        let CxCyWH { cx, cy, w, h } = *from;
        Self {
            x1: cx - w / two,
            y1: cy - h / two,
            x2: cx + w / two,
            y2: cy + h / two,
        }
    }
}
