use std::cmp::Ordering;

/// `f32` with a total order. NaN sorts below every other value and equals
/// itself
#[derive(Debug, Copy, Clone)]
#[repr(transparent)]
pub(crate) struct OrdFloat32(f32);

impl From<f32> for OrdFloat32 {
    #[inline(always)]
    fn from(value: f32) -> Self {
        OrdFloat32(value)
    }
}

impl Ord for OrdFloat32 {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal),
        }
    }
}

impl PartialOrd for OrdFloat32 {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OrdFloat32 {
    #[inline]
    fn eq(&self, other: &OrdFloat32) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrdFloat32 {}

#[cfg(test)]
mod tests {
    use super::*;

    fn of(v: f32) -> OrdFloat32 {
        v.into()
    }

    #[test]
    fn test_ordfloat32_finite() {
        assert!(of(2.0) > of(1.0));
        assert!(of(1.0) < of(2.0));
        assert!(of(1.0) >= of(1.0));
        assert_eq!(of(0.0), of(-0.0));
    }

    #[test]
    fn test_ordfloat32_nan_is_lowest() {
        assert!(of(f32::NAN) < of(1.0));
        assert!(of(f32::NAN) < of(f32::NEG_INFINITY));
        assert!(of(f32::INFINITY) > of(f32::NAN));
        assert!(!(of(f32::NAN) > of(f32::NAN)));
        assert_eq!(of(f32::NAN), of(f32::NAN));
    }

    #[test]
    fn test_ordfloat32_infinities() {
        assert!(of(f32::INFINITY) > of(1.0));
        assert!(of(f32::NEG_INFINITY) < of(1.0));
        assert_eq!(of(f32::INFINITY).cmp(&of(f32::INFINITY)), Ordering::Equal);
    }

    #[test]
    fn test_ordfloat32_sorts_slices() {
        let mut v = vec![of(3.0), of(f32::NAN), of(-1.0), of(2.5)];
        v.sort();
        let got: Vec<f32> = v.iter().skip(1).map(|f| f.0).collect();
        assert!(v[0].0.is_nan());
        assert_eq!(got, vec![-1.0, 2.5, 3.0]);
    }
}
