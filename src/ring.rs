//! The exact ring tower.
//!
//! All arithmetic on this tower is closed and exact; equality is structural.
//! The building blocks are parametric constructors over a base ring:
//!
//! - [`SqrtRing<R>`] — `a + b*sqrt(2)`, giving `Z2 = Z[sqrt 2]` and
//!   `D2 = D[sqrt 2]` over dyadic fractions,
//! - [`ComplexRing<R>`] — `a + b*i`, giving `CZ2` and `CD2`,
//! - [`OmegaRing<R>`] — `x0 + x1*w + x2*w^2 + x3*w^3` with `w = exp(i pi/4)`
//!   (so `w^4 = -1`), giving `ZOmega = Z[w]` and `DOmega = D[w]`.
//!
//! Two Galois maps are first-class: the complex conjugate `adj` (negates the
//! imaginary direction, `w -> w^-1`) and the sqrt-2 conjugate `adj2`
//! (`sqrt 2 -> -sqrt 2`, on omega coefficients the sign flip of the odd
//! indices). Norms: `N(a + b sqrt 2) = a^2 - 2 b^2` in `SqrtRing`,
//! `N(z) = (z z^adj) * (z z^adj)^adj2` in `OmegaRing` (a rational integer).
//!
//! Comparison of `a + b sqrt 2` against zero is pure sign analysis on
//! `a^2` versus `2 b^2`; no floating point is involved, which the boundary
//! tests of the grid enumerators rely on.
//!
//! The module also carries the Euclidean machinery used by the Diophantine
//! solver: `pow_ring`, `mod_pow`, the Euclidean gcd on both `Z2` and
//! `ZOmega`, and Cipolla's modular square root.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::dyadic::Dyadic;
use crate::real::{real_from_bigint, real_from_i64, Real, SQRT2};

/// Minimal capability bound for a coefficient ring.
pub trait Ring:
    Clone
    + fmt::Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    fn zero() -> Self;
    fn one() -> Self;
    fn two() -> Self {
        Self::one() + Self::one()
    }
}

/// An ordered ring; the default `sign` is derived from the ordering.
pub trait RealRing: Ring + PartialOrd {
    fn sign(&self) -> i32 {
        if *self < Self::zero() {
            -1
        } else if Self::zero() < *self {
            1
        } else {
            0
        }
    }
}

/// Lossy cast into the float backend, for bounding boxes only.
pub trait ToReal {
    fn to_real(&self) -> Real;
}

impl Ring for BigInt {
    fn zero() -> Self {
        Zero::zero()
    }
    fn one() -> Self {
        One::one()
    }
}
impl RealRing for BigInt {}
impl ToReal for BigInt {
    fn to_real(&self) -> Real {
        real_from_bigint(self)
    }
}

impl Ring for Dyadic {
    fn zero() -> Self {
        Dyadic::from_int(Zero::zero())
    }
    fn one() -> Self {
        Dyadic::from_int(One::one())
    }
}
impl RealRing for Dyadic {}
impl ToReal for Dyadic {
    fn to_real(&self) -> Real {
        Dyadic::to_real(self)
    }
}

impl Ring for Real {
    fn zero() -> Self {
        real_from_i64(0)
    }
    fn one() -> Self {
        real_from_i64(1)
    }
}
impl RealRing for Real {}

// ---------------------------------------------------------------------------
// SqrtRing
// ---------------------------------------------------------------------------

/// `int + sqrt * sqrt(2)` over a base ring.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SqrtRing<R> {
    int: R,
    sqrt: R,
}

pub type Z2 = SqrtRing<BigInt>;
pub type D2 = SqrtRing<Dyadic>;

impl<R: Ring> SqrtRing<R> {
    pub fn new(int: R, sqrt: R) -> Self {
        SqrtRing { int, sqrt }
    }

    pub fn from_ring(int: R) -> Self {
        SqrtRing::new(int, R::zero())
    }

    pub fn zero() -> Self {
        SqrtRing::from_ring(R::zero())
    }

    pub fn one() -> Self {
        SqrtRing::from_ring(R::one())
    }

    pub fn int(&self) -> &R {
        &self.int
    }

    pub fn sqrt(&self) -> &R {
        &self.sqrt
    }

    /// `N(a + b sqrt 2) = a^2 - 2 b^2`.
    pub fn norm(&self) -> R {
        self.int.clone() * self.int.clone() - R::two() * self.sqrt.clone() * self.sqrt.clone()
    }

    /// The sqrt-2 conjugate `a - b sqrt 2`.
    pub fn adj2(&self) -> Self {
        SqrtRing::new(self.int.clone(), -self.sqrt.clone())
    }
}

impl Z2 {
    pub fn sqrt2() -> Z2 {
        Z2::new(Zero::zero(), One::one())
    }

    /// `lambda = 1 + sqrt 2`, the fundamental unit.
    pub fn lambda() -> Z2 {
        Z2::new(One::one(), One::one())
    }

    /// `1/lambda = -1 + sqrt 2`.
    pub fn inv_lambda() -> Z2 {
        Z2::new(BigInt::from(-1), One::one())
    }
}

impl D2 {
    pub fn sqrt2() -> D2 {
        D2::new(Dyadic::from(0), Dyadic::from(1))
    }

    /// `1/sqrt 2 = (1/2) sqrt 2`.
    pub fn inv_sqrt2() -> D2 {
        D2::new(Dyadic::from(0), Dyadic::half())
    }

    /// Exact division by `sqrt 2`: `(a + b sqrt 2)/sqrt 2 = b + (a/2) sqrt 2`.
    pub fn div_by_sqrt2(&self) -> D2 {
        D2::new(self.sqrt.clone(), self.int.clone() >> 1)
    }

    /// Largest denominator exponent over the two coordinates.
    pub fn den_exp(&self) -> u32 {
        self.int.den_exp().max(self.sqrt.den_exp())
    }
}

impl<R: Ring + ToReal> ToReal for SqrtRing<R> {
    fn to_real(&self) -> Real {
        self.int.to_real() + self.sqrt.to_real() * &*SQRT2
    }
}

impl<R: Ring> Neg for SqrtRing<R> {
    type Output = Self;
    fn neg(self) -> Self {
        SqrtRing::new(-self.int, -self.sqrt)
    }
}

impl<R: Ring> Add for SqrtRing<R> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        SqrtRing::new(self.int + rhs.int, self.sqrt + rhs.sqrt)
    }
}

impl<R: Ring> Sub for SqrtRing<R> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        SqrtRing::new(self.int - rhs.int, self.sqrt - rhs.sqrt)
    }
}

impl<R: Ring> Mul for SqrtRing<R> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        // (a + b s)(c + d s) = (ac + 2bd) + (ad + bc) s with s^2 = 2
        let a = self.int.clone() * rhs.int.clone()
            + R::two() * self.sqrt.clone() * rhs.sqrt.clone();
        let b = self.int * rhs.sqrt + self.sqrt * rhs.int;
        SqrtRing::new(a, b)
    }
}

/// Sign of `a + b sqrt 2` without leaving the base ring: when the two terms
/// disagree in sign the comparison reduces to `a^2` against `2 b^2`.
fn sqrt_is_positive<R: RealRing>(a: &R, b: &R, include_zero: bool) -> bool {
    let a_sign = a.sign();
    let b_sign = b.sign();
    if a_sign < 0 {
        if b_sign <= 0 {
            false
        } else {
            R::two() * b.clone() * b.clone() > a.clone() * a.clone()
        }
    } else if a_sign == 0 {
        match b_sign {
            s if s < 0 => false,
            0 => include_zero,
            _ => true,
        }
    } else if b_sign < 0 {
        a.clone() * a.clone() > R::two() * b.clone() * b.clone()
    } else {
        true
    }
}

impl<R: Ring> Ring for SqrtRing<R> {
    fn zero() -> Self {
        SqrtRing::zero()
    }
    fn one() -> Self {
        SqrtRing::one()
    }
}

impl<R: RealRing> PartialOrd for SqrtRing<R> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        if self == other {
            return Some(std::cmp::Ordering::Equal);
        }
        let a = other.int.clone() - self.int.clone();
        let b = other.sqrt.clone() - self.sqrt.clone();
        if sqrt_is_positive(&a, &b, false) {
            Some(std::cmp::Ordering::Less)
        } else {
            Some(std::cmp::Ordering::Greater)
        }
    }
}

impl<R: Ring + fmt::Display> fmt::Display for SqrtRing<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {} sqrt2", self.int, self.sqrt)
    }
}

// ---------------------------------------------------------------------------
// ComplexRing
// ---------------------------------------------------------------------------

/// `re + im * i` over a base ring.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComplexRing<R> {
    re: R,
    im: R,
}

pub type CZ2 = ComplexRing<Z2>;
pub type CD2 = ComplexRing<D2>;

impl<R: Ring> ComplexRing<R> {
    pub fn new(re: R, im: R) -> Self {
        ComplexRing { re, im }
    }

    pub fn from_ring(re: R) -> Self {
        ComplexRing::new(re, R::zero())
    }

    pub fn zero() -> Self {
        ComplexRing::from_ring(R::zero())
    }

    pub fn one() -> Self {
        ComplexRing::from_ring(R::one())
    }

    pub fn re(&self) -> &R {
        &self.re
    }

    pub fn im(&self) -> &R {
        &self.im
    }

    pub fn is_real(&self) -> bool {
        self.im == R::zero()
    }

    /// `|z|^2 = re^2 + im^2`, a value of the base ring.
    pub fn norm(&self) -> R {
        self.re.clone() * self.re.clone() + self.im.clone() * self.im.clone()
    }

    /// Complex conjugate.
    pub fn adj(&self) -> Self {
        ComplexRing::new(self.re.clone(), -self.im.clone())
    }
}

impl CD2 {
    /// `omega = exp(i pi/4) = (1 + i)/sqrt 2`.
    pub fn omega() -> CD2 {
        CD2::new(D2::inv_sqrt2(), D2::inv_sqrt2())
    }

    /// `omega^3 = (-1 + i)/sqrt 2`.
    pub fn omega3() -> CD2 {
        CD2::new(-D2::inv_sqrt2(), D2::inv_sqrt2())
    }

    /// `delta = 1 + omega`, the prime above 2.
    pub fn delta() -> CD2 {
        CD2::one() + CD2::omega()
    }

    pub fn imag() -> CD2 {
        CD2::new(D2::zero(), D2::one())
    }
}

impl<R: Ring> Neg for ComplexRing<R> {
    type Output = Self;
    fn neg(self) -> Self {
        ComplexRing::new(-self.re, -self.im)
    }
}

impl<R: Ring> Add for ComplexRing<R> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        ComplexRing::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl<R: Ring> Sub for ComplexRing<R> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        ComplexRing::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl<R: Ring> Mul for ComplexRing<R> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let re = self.re.clone() * rhs.re.clone() - self.im.clone() * rhs.im.clone();
        let im = self.re * rhs.im + self.im * rhs.re;
        ComplexRing::new(re, im)
    }
}

impl<R: Ring> Ring for ComplexRing<R> {
    fn zero() -> Self {
        ComplexRing::zero()
    }
    fn one() -> Self {
        ComplexRing::one()
    }
}

impl<R: Ring + fmt::Display> fmt::Display for ComplexRing<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + ({}) i", self.re, self.im)
    }
}

// ---------------------------------------------------------------------------
// OmegaRing
// ---------------------------------------------------------------------------

/// `x0 + x1 w + x2 w^2 + x3 w^3` with `w = exp(i pi/4)`, `w^4 = -1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OmegaRing<R> {
    x: [R; 4],
}

pub type ZOmega = OmegaRing<BigInt>;
pub type DOmega = OmegaRing<Dyadic>;

impl<R: Ring> OmegaRing<R> {
    pub fn new(x0: R, x1: R, x2: R, x3: R) -> Self {
        OmegaRing { x: [x0, x1, x2, x3] }
    }

    pub fn from_ring(x0: R) -> Self {
        OmegaRing::new(x0, R::zero(), R::zero(), R::zero())
    }

    pub fn zero() -> Self {
        OmegaRing::from_ring(R::zero())
    }

    pub fn one() -> Self {
        OmegaRing::from_ring(R::one())
    }

    pub fn get(&self, idx: usize) -> &R {
        &self.x[idx]
    }

    /// Complex conjugate; on coefficients `(x0, -x3, -x2, -x1)`.
    pub fn adj(&self) -> Self {
        OmegaRing::new(
            self.x[0].clone(),
            -self.x[3].clone(),
            -self.x[2].clone(),
            -self.x[1].clone(),
        )
    }

    /// sqrt-2 conjugate (`w -> -w`): sign flip of the odd coefficients.
    pub fn adj2(&self) -> Self {
        OmegaRing::new(
            self.x[0].clone(),
            -self.x[1].clone(),
            self.x[2].clone(),
            -self.x[3].clone(),
        )
    }

    /// `N(z) = (z z^adj) ((z z^adj)^adj2)`, a value of the base ring.
    pub fn norm(&self) -> R {
        let t = self.clone() * self.adj();
        let n = t.clone() * t.adj2();
        n.x[0].clone()
    }
}

impl ZOmega {
    pub fn omega() -> ZOmega {
        ZOmega::new(Zero::zero(), One::one(), Zero::zero(), Zero::zero())
    }

    pub fn imag() -> ZOmega {
        ZOmega::new(Zero::zero(), Zero::zero(), One::one(), Zero::zero())
    }

    /// `sqrt 2 = w - w^3`.
    pub fn sqrt2() -> ZOmega {
        ZOmega::new(Zero::zero(), One::one(), Zero::zero(), BigInt::from(-1))
    }
}

impl<R: Ring> Neg for OmegaRing<R> {
    type Output = Self;
    fn neg(self) -> Self {
        let [a, b, c, d] = self.x;
        OmegaRing::new(-a, -b, -c, -d)
    }
}

impl<R: Ring> Add for OmegaRing<R> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        let [a, b, c, d] = self.x;
        let [e, f, g, h] = rhs.x;
        OmegaRing::new(a + e, b + f, c + g, d + h)
    }
}

impl<R: Ring> Sub for OmegaRing<R> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        let [a, b, c, d] = self.x;
        let [e, f, g, h] = rhs.x;
        OmegaRing::new(a - e, b - f, c - g, d - h)
    }
}

impl<R: Ring> Mul for OmegaRing<R> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        // w^(k+l) folded through w^4 = -1.
        let l = &self.x;
        let r = &rhs.x;
        let a = l[0].clone() * r[0].clone()
            - l[1].clone() * r[3].clone()
            - l[2].clone() * r[2].clone()
            - l[3].clone() * r[1].clone();
        let b = l[0].clone() * r[1].clone() + l[1].clone() * r[0].clone()
            - l[2].clone() * r[3].clone()
            - l[3].clone() * r[2].clone();
        let c = l[0].clone() * r[2].clone()
            + l[1].clone() * r[1].clone()
            + l[2].clone() * r[0].clone()
            - l[3].clone() * r[3].clone();
        let d = l[0].clone() * r[3].clone()
            + l[1].clone() * r[2].clone()
            + l[2].clone() * r[1].clone()
            + l[3].clone() * r[0].clone();
        OmegaRing::new(a, b, c, d)
    }
}

impl<R: Ring> Ring for OmegaRing<R> {
    fn zero() -> Self {
        OmegaRing::zero()
    }
    fn one() -> Self {
        OmegaRing::one()
    }
}

impl<R: Ring + fmt::Display> fmt::Display for OmegaRing<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "omega[{}, {}, {}, {}]",
            self.x[0], self.x[1], self.x[2], self.x[3]
        )
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn z2_to_d2(x: &Z2) -> D2 {
    D2::new(
        Dyadic::from_int(x.int().clone()),
        Dyadic::from_int(x.sqrt().clone()),
    )
}

/// Embed `Z[w]` into `D[sqrt 2] + i D[sqrt 2]` via
/// `w = (1 + i)/sqrt 2`, `w^3 = (-1 + i)/sqrt 2`:
/// `re = x0 + (x1 - x3)/sqrt 2`, `im = x2 + (x1 + x3)/sqrt 2`.
pub fn zomega_to_cd2(x: &ZOmega) -> CD2 {
    let re = D2::new(
        Dyadic::from_int(x.get(0).clone()),
        Dyadic::new(x.get(1) - x.get(3), 1),
    );
    let im = D2::new(
        Dyadic::from_int(x.get(2).clone()),
        Dyadic::new(x.get(1) + x.get(3), 1),
    );
    CD2::new(re, im)
}

/// Same embedding for dyadic coefficients.
pub fn domega_to_cd2(x: &DOmega) -> CD2 {
    let re = D2::new(
        x.get(0).clone(),
        (x.get(1).clone() - x.get(3).clone()) >> 1,
    );
    let im = D2::new(
        x.get(2).clone(),
        (x.get(1).clone() + x.get(3).clone()) >> 1,
    );
    CD2::new(re, im)
}

pub fn cd2_from_z2(x: &Z2) -> CD2 {
    CD2::from_ring(z2_to_d2(x))
}

/// Exact division of both components by `sqrt(2)^e`: whole powers of two as
/// denominator-exponent shifts, plus one `div_by_sqrt2` when `e` is odd.
pub fn cd2_div_sqrt2_pow(p: &CD2, e: u32) -> CD2 {
    let half = e / 2;
    let shift = |x: &D2| D2::new(x.int().clone() >> half, x.sqrt().clone() >> half);
    let mut re = shift(p.re());
    let mut im = shift(p.im());
    if e % 2 == 1 {
        re = re.div_by_sqrt2();
        im = im.div_by_sqrt2();
    }
    CD2::new(re, im)
}

// ---------------------------------------------------------------------------
// Euclidean machinery
// ---------------------------------------------------------------------------

/// `x^e` by binary exponentiation; `e` must be non-negative.
pub fn pow_ring<R: Ring>(x: R, e: &BigInt) -> R {
    debug_assert!(!e.is_negative(), "exponent must be non-negative");
    let mut ret = R::one();
    let mut sq = x;
    let mut e = e.clone();
    while e.is_positive() {
        if e.is_odd() {
            ret = ret * sq.clone();
        }
        sq = sq.clone() * sq.clone();
        e >>= 1usize;
    }
    ret
}

/// `x^exp mod modulus` with the base reduced into `[0, modulus)` first.
pub fn mod_pow(x: &BigInt, exp: &BigInt, modulus: &BigInt) -> BigInt {
    let base = x.mod_floor(modulus);
    base.modpow(exp, modulus)
}

/// Nearest integer to `num/den`, computed as `(num + den/2) div den` with the
/// floor correction for negative remainders.
fn round_div(num: &BigInt, den: &BigInt) -> BigInt {
    let two = BigInt::from(2);
    let t = num + den / &two;
    let (q, r) = t.div_rem(den);
    if r.is_negative() {
        q - BigInt::from(1)
    } else {
        q
    }
}

/// Euclidean gcd in `Z[sqrt 2]`. The quotient step divides in `Q[sqrt 2]` by
/// `lhs * rhs^adj2 / N(rhs)` and rounds both coordinates.
pub fn euclid_gcd_z2(lhs: &Z2, rhs: &Z2) -> Z2 {
    let (mut a, mut b) = if lhs.norm().abs() >= rhs.norm().abs() {
        (lhs.clone(), rhs.clone())
    } else {
        (rhs.clone(), lhs.clone())
    };
    while b != Z2::zero() {
        let den = b.norm();
        let num = a.clone() * b.adj2();
        let x = round_div(num.int(), &den);
        let y = round_div(num.sqrt(), &den);
        let r = a - Z2::new(x, y) * b.clone();
        a = b;
        b = r;
    }
    a
}

/// Euclidean gcd in `Z[w]`. The rounding step uses
/// `lhs * rhs^adj * ((rhs rhs^adj)^adj2) / N(rhs)`; the denominator is a
/// rational integer.
pub fn euclid_gcd_zomega(lhs: &ZOmega, rhs: &ZOmega) -> ZOmega {
    let (mut a, mut b) = if lhs.norm().abs() >= rhs.norm().abs() {
        (lhs.clone(), rhs.clone())
    } else {
        (rhs.clone(), lhs.clone())
    };
    while b != ZOmega::zero() {
        let den = b.norm();
        let num = a.clone() * b.adj() * (b.clone() * b.adj()).adj2();
        let q = ZOmega::new(
            round_div(num.get(0), &den),
            round_div(num.get(1), &den),
            round_div(num.get(2), &den),
            round_div(num.get(3), &den),
        );
        let r = a - q * b.clone();
        a = b;
        b = r;
    }
    a
}

/// Modular exponentiation of `x + y sqrt(s)` in `Z[sqrt s]/(p)`.
fn ext_mod_pow(
    x: &BigInt,
    y: &BigInt,
    s: &BigInt,
    exp: &BigInt,
    p: &BigInt,
) -> (BigInt, BigInt) {
    let mul = |li: &BigInt, ls: &BigInt, ri: &BigInt, rs: &BigInt| {
        (
            (li * ri + s * ls * rs).mod_floor(p),
            (li * rs + ls * ri).mod_floor(p),
        )
    };
    let mut ret = (BigInt::from(1), BigInt::from(0));
    let mut pow = (x.mod_floor(p), y.mod_floor(p));
    let mut e = exp.clone();
    while e.is_positive() {
        if e.is_odd() {
            ret = mul(&ret.0, &ret.1, &pow.0, &pow.1);
        }
        pow = mul(&pow.0, &pow.1, &pow.0, &pow.1);
        e >>= 1usize;
    }
    ret
}

/// Cipolla's algorithm: a solution of `x^2 = a (mod p)` for prime `p` and
/// `0 <= a < p`, or `None` when `a` is not a quadratic residue.
pub fn sqrt_mod(a: &BigInt, p: &BigInt) -> Option<BigInt> {
    if *p == BigInt::from(2) {
        return Some(a.clone());
    }
    if a.is_zero() {
        return Some(BigInt::from(0));
    }
    let one = BigInt::from(1);
    let euler = (p - &one) / BigInt::from(2);
    if mod_pow(a, &euler, p) != one {
        return None;
    }
    // Find b with b^2 - a a non-residue, then
    // x = (b + sqrt(b^2 - a))^((p+1)/2) in Z[sqrt(b^2 - a)]/(p).
    let mut b = BigInt::from(0);
    loop {
        let d = (&b * &b + p - a).mod_floor(p);
        if mod_pow(&d, &euler, p) != one {
            break;
        }
        b += &one;
    }
    let d = (&b * &b + p - a).mod_floor(p);
    let exp = (p + &one) / BigInt::from(2);
    Some(ext_mod_pow(&b, &one, &d, &exp, p).0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn z2(a: i64, b: i64) -> Z2 {
        Z2::new(BigInt::from(a), BigInt::from(b))
    }

    fn big(v: i64) -> BigInt {
        BigInt::from(v)
    }

    #[test]
    fn test_z2_algebra() {
        let x = z2(3, -2);
        let y = z2(-1, 5);
        assert_eq!(x.clone() + (-x.clone()), Z2::zero());
        assert_eq!(x.clone() * Z2::one(), x);
        // N(xy) = N(x) N(y)
        assert_eq!((x.clone() * y.clone()).norm(), x.norm() * y.norm());
        // lambda * (1/lambda) = 1
        assert_eq!(Z2::lambda() * Z2::inv_lambda(), Z2::one());
    }

    #[test]
    fn test_sqrt_ring_ordering() {
        // 1 + sqrt2 > 2, 3 - 2 sqrt2 > 0, 2 - 2 sqrt2 < 0
        assert!(z2(1, 1) > z2(2, 0));
        assert!(z2(3, -2) > Z2::zero());
        assert!(z2(2, -2) < Z2::zero());
        assert!(z2(0, 1) > z2(1, 0));
        assert!(z2(0, 0) >= Z2::zero());
    }

    #[test]
    fn test_zomega_conjugations() {
        let x = ZOmega::new(big(2), big(-3), big(5), big(7));
        let y = ZOmega::new(big(-1), big(4), big(0), big(2));
        // (x y)^adj = y^adj x^adj
        assert_eq!((x.clone() * y.clone()).adj(), y.adj() * x.adj());
        // adj2 is an involution
        assert_eq!(x.adj2().adj2(), x);
        // w^4 = -1
        let w = ZOmega::omega();
        let w4 = w.clone() * w.clone() * w.clone() * w.clone();
        assert_eq!(w4, -ZOmega::one());
        // w * w^adj = 1
        assert_eq!(w.clone() * w.adj(), ZOmega::one());
        // (w - w^3)^2 = 2
        let s = ZOmega::sqrt2();
        assert_eq!(s.clone() * s, ZOmega::from_ring(big(2)));
    }

    #[test]
    fn test_zomega_norm_is_rational_integer() {
        let x = ZOmega::new(big(2), big(-3), big(5), big(7));
        let t = x.clone() * x.adj();
        let n = t.clone() * t.adj2();
        assert_eq!(*n.get(1), BigInt::from(0));
        assert_eq!(*n.get(2), BigInt::from(0));
        assert_eq!(*n.get(3), BigInt::from(0));
        assert_eq!(x.norm(), *n.get(0));
    }

    #[test]
    fn test_pow_ring() {
        for (e, want) in [(0i64, 1i64), (1, 10), (2, 100), (3, 1000), (6, 1000000)] {
            assert_eq!(pow_ring(big(10), &big(e)), big(want));
        }
        assert_eq!(pow_ring(Z2::lambda(), &big(2)), z2(3, 2));
    }

    #[test]
    fn test_mod_pow() {
        for (e, want) in [(0, 1), (1, 3), (2, 2), (3, 6), (4, 4), (5, 5), (6, 1)] {
            assert_eq!(mod_pow(&big(10), &big(e), &big(7)), big(want));
        }
        // Large exponents: 10^(6k + r) = 10^r (mod 7)
        let base = BigInt::from(60_000_000_000_000i64);
        for (r, want) in [(0, 1), (1, 3), (2, 2), (3, 6), (4, 4), (5, 5), (6, 1)] {
            assert_eq!(mod_pow(&big(10), &(&base + big(r)), &big(7)), big(want));
        }
    }

    #[test]
    fn test_sqrt_mod() {
        // primes with p mod 8 = 1, where 2 is a residue
        for p in [17i64, 41, 73] {
            assert_eq!(p % 8, 1);
            let x = sqrt_mod(&big(2), &big(p)).unwrap();
            assert_eq!((&x * &x).mod_floor(&big(p)), big(2));
        }
        // 2 is a non-residue mod 5
        assert_eq!(sqrt_mod(&big(2), &big(5)), None);
        // p = 2 and a = 0 short-circuits
        assert_eq!(sqrt_mod(&big(1), &big(2)), Some(big(1)));
        assert_eq!(sqrt_mod(&big(0), &big(7)), Some(big(0)));
    }

    #[test]
    fn test_euclid_gcd_z2_splits_primes() {
        // For p mod 8 in {1, 7}, gcd(p, r + sqrt2) with r^2 = 2 (mod p)
        // is a prime factor of norm +-p.
        for p in [17i64, 41, 73, 7, 23, 31] {
            assert!(p % 8 == 1 || p % 8 == 7);
            let r = sqrt_mod(&big(2), &big(p)).unwrap();
            let g = euclid_gcd_z2(&Z2::from_ring(big(p)), &Z2::new(r, big(1)));
            assert_eq!(g.norm().abs(), big(p), "p = {}", p);
        }
    }

    #[test]
    fn test_euclid_gcd_zomega_splits_primes() {
        // p mod 8 = 5: u^2 = -1 (mod p), gcd(p, u + i) has gcd * gcd^adj = p.
        for p in [13i64, 29, 37] {
            assert_eq!(p % 8, 5);
            let u = sqrt_mod(&(big(p) - big(1)), &big(p)).unwrap();
            let g = euclid_gcd_zomega(
                &ZOmega::from_ring(big(p)),
                &ZOmega::new(u, Zero::zero(), One::one(), Zero::zero()),
            );
            let m = g.clone() * g.adj();
            assert_eq!(m, ZOmega::from_ring(big(p)), "p = {}", p);
        }
        // p mod 8 = 3: u^2 = -2 (mod p), gcd(p, u + i sqrt2).
        for p in [11i64, 19, 43] {
            assert_eq!(p % 8, 3);
            let u = sqrt_mod(&(big(p) - big(2)), &big(p)).unwrap();
            let g = euclid_gcd_zomega(
                &ZOmega::from_ring(big(p)),
                &ZOmega::new(u, One::one(), Zero::zero(), One::one()),
            );
            let m = g.clone() * g.adj();
            assert_eq!(m, ZOmega::from_ring(big(p)), "p = {}", p);
        }
    }

    #[test]
    fn test_gcd_norm_bound() {
        let x = z2(41, 0);
        let r = sqrt_mod(&big(2), &big(41)).unwrap();
        let y = Z2::new(r, big(1));
        let g = euclid_gcd_z2(&x, &y);
        assert!(g.norm().abs() <= x.norm().abs().min(y.norm().abs()));
    }

    #[test]
    fn test_conversions() {
        // i = w^2 embeds as (0, 1)
        let i = zomega_to_cd2(&ZOmega::imag());
        assert_eq!(i, CD2::imag());
        // w embeds as omega
        let w = zomega_to_cd2(&ZOmega::omega());
        assert_eq!(w, CD2::omega());
        // sqrt2 embeds as the real sqrt2
        let s = zomega_to_cd2(&ZOmega::sqrt2());
        assert_eq!(s, CD2::from_ring(D2::sqrt2()));
        // omega * omega3 relation: w * w^3 = w^4 = -1
        assert_eq!(CD2::omega() * CD2::omega3(), -CD2::one());
    }

    #[test]
    fn test_cz2_algebra() {
        let x = CZ2::new(z2(1, 2), z2(-3, 1));
        assert_eq!(x.clone() * CZ2::one(), x);
        assert_eq!(x.clone() + (-x.clone()), CZ2::zero());
        let by_hand = x.re().clone() * x.re().clone() + x.im().clone() * x.im().clone();
        assert_eq!(x.norm(), by_hand);
    }
}
