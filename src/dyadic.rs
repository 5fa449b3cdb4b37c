//! Dyadic fractions: rationals whose denominator is a power of two.
//!
//! A value is stored as `num * 2^(-den_exp)` in canonical form: `num` is odd
//! unless the value is zero, in which case `den_exp` is zero as well. Every
//! operation renormalizes, so structural equality is value equality and the
//! type can serve as a hash key.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Shl, Shr, Sub};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};

use crate::real::{real_from_bigint, with_prec, Real};
use dashu_int::IBig;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Dyadic {
    num: BigInt,
    den_exp: u32,
}

impl Dyadic {
    pub fn new(num: BigInt, den_exp: u32) -> Self {
        Dyadic { num, den_exp }.normalized()
    }

    pub fn from_int(num: BigInt) -> Self {
        Dyadic { num, den_exp: 0 }
    }

    /// The value 1/2.
    pub fn half() -> Self {
        Dyadic {
            num: BigInt::from(1),
            den_exp: 1,
        }
    }

    pub fn is_integer(&self) -> bool {
        self.den_exp == 0
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    pub fn num(&self) -> &BigInt {
        &self.num
    }

    pub fn den_exp(&self) -> u32 {
        self.den_exp
    }

    pub fn sign(&self) -> i32 {
        if self.num.is_negative() {
            -1
        } else if self.num.is_zero() {
            0
        } else {
            1
        }
    }

    pub fn to_real(&self) -> Real {
        let scale = Real::from_parts(IBig::ONE, -(self.den_exp as isize));
        with_prec(real_from_bigint(&self.num) * scale)
    }

    fn normalized(mut self) -> Self {
        if self.num.is_zero() {
            self.den_exp = 0;
            return self;
        }
        while self.den_exp > 0 && self.num.is_even() {
            self.num >>= 1usize;
            self.den_exp -= 1;
        }
        self
    }

    /// Numerators over the common denominator `2^max(e1, e2)`.
    fn aligned(&self, rhs: &Dyadic) -> (BigInt, BigInt, u32) {
        let e = self.den_exp.max(rhs.den_exp);
        let l = &self.num << (e - self.den_exp) as usize;
        let r = &rhs.num << (e - rhs.den_exp) as usize;
        (l, r, e)
    }
}

impl From<i32> for Dyadic {
    fn from(v: i32) -> Self {
        Dyadic::from_int(BigInt::from(v))
    }
}

impl From<BigInt> for Dyadic {
    fn from(v: BigInt) -> Self {
        Dyadic::from_int(v)
    }
}

impl Neg for Dyadic {
    type Output = Dyadic;
    fn neg(self) -> Dyadic {
        Dyadic {
            num: -self.num,
            den_exp: self.den_exp,
        }
    }
}

impl Add for Dyadic {
    type Output = Dyadic;
    fn add(self, rhs: Dyadic) -> Dyadic {
        let (l, r, e) = self.aligned(&rhs);
        Dyadic::new(l + r, e)
    }
}

impl Sub for Dyadic {
    type Output = Dyadic;
    fn sub(self, rhs: Dyadic) -> Dyadic {
        let (l, r, e) = self.aligned(&rhs);
        Dyadic::new(l - r, e)
    }
}

impl Mul for Dyadic {
    type Output = Dyadic;
    fn mul(self, rhs: Dyadic) -> Dyadic {
        Dyadic::new(self.num * rhs.num, self.den_exp + rhs.den_exp)
    }
}

/// Multiplication by `2^n`.
impl Shl<u32> for Dyadic {
    type Output = Dyadic;
    fn shl(self, n: u32) -> Dyadic {
        Dyadic::new(self.num << n as usize, self.den_exp)
    }
}

/// Division by `2^n`.
impl Shr<u32> for Dyadic {
    type Output = Dyadic;
    fn shr(self, n: u32) -> Dyadic {
        Dyadic::new(self.num, self.den_exp + n)
    }
}

impl PartialOrd for Dyadic {
    fn partial_cmp(&self, other: &Dyadic) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dyadic {
    fn cmp(&self, other: &Dyadic) -> Ordering {
        let (l, r, _) = self.aligned(other);
        l.cmp(&r)
    }
}

impl fmt::Display for Dyadic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/2^{}", self.num, self.den_exp)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::real::to_f64;

    fn d(num: i64, den_exp: u32) -> Dyadic {
        Dyadic::new(BigInt::from(num), den_exp)
    }

    #[test]
    fn test_canonical_form() {
        let x = d(12, 4);
        assert_eq!(*x.num(), BigInt::from(3));
        assert_eq!(x.den_exp(), 2);
        let z = d(0, 7);
        assert_eq!(z.den_exp(), 0);
        assert!(z.is_zero());
    }

    #[test]
    fn test_arithmetic() {
        // 3/4 + 1/2 = 5/4, 3/4 * 1/2 = 3/8
        assert_eq!(d(3, 2) + d(1, 1), d(5, 2));
        assert_eq!(d(3, 2) - d(1, 1), d(1, 2));
        assert_eq!(d(3, 2) * d(1, 1), d(3, 3));
        assert_eq!(-d(3, 2), d(-3, 2));
        assert_eq!(d(3, 2) + (-d(3, 2)), d(0, 0));
    }

    #[test]
    fn test_shifts() {
        assert_eq!(d(3, 2) << 2, d(3, 0));
        assert_eq!(d(3, 2) << 3, d(6, 0));
        assert_eq!(d(3, 0) >> 2, d(3, 2));
        assert_eq!(d(6, 0) >> 1, d(3, 0));
    }

    #[test]
    fn test_ordering() {
        assert!(d(1, 1) < d(3, 2));
        assert!(d(-1, 0) < d(-1, 1));
        assert!(d(5, 3) == d(5, 3));
        assert!(d(1, 4) > d(1, 5));
    }

    #[test]
    fn test_to_real() {
        assert_eq!(to_f64(&d(3, 2).to_real()), 0.75);
        assert_eq!(to_f64(&d(-7, 3).to_real()), -0.875);
    }
}
