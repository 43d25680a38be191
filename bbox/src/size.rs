use crate::common::*;

/// Image or rect size in width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size<T> {
    w: T,
    h: T,
}

impl<T> Size<T>
where
    T: Num + PartialOrd + Copy,
{
    pub fn try_from_wh(wh: [T; 2]) -> Result<Self> {
        let [w, h] = wh;
        let zero = T::zero();
        ensure!(
            w >= zero && h >= zero,
            "width and height parameters must be non-negative"
        );
        Ok(Self { w, h })
    }

    pub fn from_wh(wh: [T; 2]) -> Self {
        Self::try_from_wh(wh).unwrap()
    }

    pub fn w(&self) -> T {
        self.w
    }

    pub fn h(&self) -> T {
        self.h
    }

    pub fn wh(&self) -> [T; 2] {
        [self.w, self.h]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_reject_negative() {
        assert!(Size::try_from_wh([-1, 2]).is_err());
    }
}
