use std::fmt::Display;

use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

/// Complex number leaf. Arithmetic lives elsewhere; the hasher only needs the
/// two components.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    #[inline]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    #[inline]
    pub fn is_real(&self) -> bool {
        self.im == 0.0
    }

    /// Bit patterns of both components, see `canonical_bits`
    #[inline]
    pub fn canonical_bits(&self) -> (u64, u64) {
        (canonical_bits(self.re), canonical_bits(self.im))
    }
}

impl Display for Complex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.im.is_sign_negative() {
            write!(f, "{}{}i", self.re, self.im)
        } else {
            write!(f, "{}+{}i", self.re, self.im)
        }
    }
}

/// The bits a float contributes to a hash. Both zeros share one pattern and
/// so do all NaNs, so numerically equal floats never land in different buckets.
#[inline]
pub(crate) fn canonical_bits(x: f64) -> u64 {
    if x == 0.0 {
        0
    } else if x.is_nan() {
        f64::NAN.to_bits()
    } else {
        x.to_bits()
    }
}

/// Reduces `num/den` to lowest terms with a positive denominator.
/// Returns `None` for a zero denominator, which has no canonical form.
pub(crate) fn reduce(num: &BigInt, den: &BigInt) -> Option<(BigInt, BigInt)> {
    if den.is_zero() {
        return None;
    }
    let gcd = num.gcd(den);
    let (mut num, mut den) = if gcd.is_one() || gcd.is_zero() {
        (num.clone(), den.clone())
    } else {
        (num / &gcd, den / &gcd)
    };
    if den.sign() == Sign::Minus {
        num = -num;
        den = den.abs();
    }
    Some((num, den))
}

/// Narrows an arbitrary-precision integer to a fixnum when it fits
#[inline]
pub(crate) fn to_fixnum(n: &BigInt) -> Option<i64> {
    n.to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduce_lowest_terms() {
        let (n, d) = reduce(&BigInt::from(2), &BigInt::from(4)).unwrap();
        assert_eq!((n, d), (BigInt::from(1), BigInt::from(2)));

        let (n, d) = reduce(&BigInt::from(3), &BigInt::from(-6)).unwrap();
        assert_eq!((n, d), (BigInt::from(-1), BigInt::from(2)));

        let (n, d) = reduce(&BigInt::from(0), &BigInt::from(5)).unwrap();
        assert_eq!((n, d), (BigInt::from(0), BigInt::from(1)));

        assert!(reduce(&BigInt::from(1), &BigInt::from(0)).is_none());
    }

    #[test]
    fn float_bits() {
        assert_eq!(canonical_bits(0.0), canonical_bits(-0.0));
        assert_eq!(canonical_bits(f64::NAN), canonical_bits(-f64::NAN));
        assert_ne!(canonical_bits(1.0), canonical_bits(-1.0));
    }

    #[test]
    fn fixnum_range() {
        assert_eq!(to_fixnum(&BigInt::from(i64::MAX)), Some(i64::MAX));
        assert_eq!(to_fixnum(&(BigInt::from(i64::MAX) + 1)), None);
    }
}
