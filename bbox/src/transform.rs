use super::XYXY;
use crate::common::*;

/// Axis-aligned affine transform `x' = x * sx + tx`, `y' = y * sy + ty`.
///
/// A negative scale mirrors the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transform<T> {
    pub sx: T,
    pub sy: T,
    pub tx: T,
    pub ty: T,
}

impl<T> Transform<T>
where
    T: Copy + Num + PartialOrd,
{
    pub fn scale(scale: T) -> Self {
        Self {
            sx: scale,
            sy: scale,
            tx: T::zero(),
            ty: T::zero(),
        }
    }

    pub fn translate(tx: T, ty: T) -> Self {
        Self {
            sx: T::one(),
            sy: T::one(),
            tx,
            ty,
        }
    }
}

impl<T> Transform<T>
where
    T: Copy + Num + PartialOrd + Neg<Output = T>,
{
    /// Mirror horizontally within an image of the given width.
    pub fn hflip(width: T) -> Self {
        Self {
            sx: -T::one(),
            sy: T::one(),
            tx: width,
            ty: T::zero(),
        }
    }
}

impl<T> Mul<&XYXY<T>> for &Transform<T>
where
    T: Copy + Num + PartialOrd,
{
    type Output = XYXY<T>;

    fn mul(self, rhs: &XYXY<T>) -> Self::Output {
        rhs.transform(self)
    }
}

/// Composition. `&a * &b` applies `b` first.
impl<T> Mul<&Transform<T>> for &Transform<T>
where
    T: Copy + Num,
{
    type Output = Transform<T>;

    fn mul(self, rhs: &Transform<T>) -> Self::Output {
        Transform {
            sx: self.sx * rhs.sx,
            sy: self.sy * rhs.sy,
            tx: rhs.tx * self.sx + self.tx,
            ty: rhs.ty * self.sy + self.ty,
        }
    }
}
