//! High-precision real arithmetic backend.
//!
//! Everything float-valued in this crate goes through the [`Real`] type: a
//! binary floating-point number with a 1728-bit significand. The width is
//! chosen so that a target precision of `10^-d` survives the `log`, `sqrt`
//! and `pow` chains of the grid solver for `d` up to roughly 500 decimal
//! digits.
//!
//! The exact kernel works in `num-bigint` integers; this module owns the only
//! conversions between that world and the float world (`floor`/`ceil` to
//! `BigInt` and back). Transcendentals not provided by the backend (pi, sine,
//! cosine, real powers) are computed here by classic series with guard bits
//! and rounded back to working precision.

use dashu_base::SquareRoot;
use dashu_float::round::mode::HalfEven;
use dashu_float::FBig;
use dashu_int::{IBig, UBig};
use num_bigint::{BigInt, Sign};
use once_cell::sync::Lazy;

/// Arbitrary-precision binary float at [`PRECISION_BITS`] significand bits.
pub type Real = FBig<HalfEven>;

/// Significand width of every [`Real`] in the crate.
pub const PRECISION_BITS: usize = 1728;

/// Guard bits used while summing series, dropped on the final rounding.
const GUARD_BITS: usize = 64;

/// Round (or pad) a float to the crate-wide working precision.
pub fn with_prec(x: Real) -> Real {
    x.with_precision(PRECISION_BITS).value()
}

pub fn real_from_i64(v: i64) -> Real {
    with_prec(FBig::from(v))
}

pub fn real_from_bigint(v: &BigInt) -> Real {
    with_prec(FBig::from(bigint_to_ibig(v)))
}

/// Exact rational `num / den` rounded once to working precision.
pub fn real_from_ratio(num: i64, den: i64) -> Real {
    real_from_i64(num) / real_from_i64(den)
}

pub fn abs_real(x: Real) -> Real {
    if x < real_from_i64(0) {
        -x
    } else {
        x
    }
}

pub fn bigint_to_ibig(v: &BigInt) -> IBig {
    let (sign, bytes) = v.to_bytes_le();
    let mag = IBig::from(UBig::from_le_bytes(&bytes));
    match sign {
        Sign::Minus => -mag,
        _ => mag,
    }
}

pub fn ibig_to_bigint(v: &IBig) -> BigInt {
    let (sign, mag) = v.clone().into_parts();
    let b = BigInt::from_bytes_le(Sign::Plus, &mag.to_le_bytes());
    match sign {
        dashu_base::Sign::Negative => -b,
        dashu_base::Sign::Positive => b,
    }
}

/// Largest integer not above `x`, exactly.
pub fn floor_bigint(x: &Real) -> BigInt {
    ibig_to_bigint(&x.clone().floor().to_int().value())
}

/// Smallest integer not below `x`, exactly.
pub fn ceil_bigint(x: &Real) -> BigInt {
    ibig_to_bigint(&x.clone().ceil().to_int().value())
}

pub fn to_f64(x: &Real) -> f64 {
    x.to_f64().value()
}

pub fn sqrt_real(x: &Real) -> Real {
    x.clone().sqrt()
}

/// `(sin x, cos x)` in one call.
pub fn sin_cos_of(x: &Real) -> (Real, Real) {
    (sin(x), cos(x))
}

/// `base^exp` for a non-negative integer exponent by repeated squaring.
/// Valid for negative bases, unlike [`pow_real`].
pub fn pow_int(base: &Real, mut exp: u32) -> Real {
    let mut ret = real_from_i64(1);
    let mut sq = base.clone();
    while exp > 0 {
        if exp & 1 == 1 {
            ret = ret * &sq;
        }
        sq = sq.clone() * &sq;
        exp >>= 1;
    }
    ret
}

/// `base^exp` for a positive base and arbitrary real exponent.
pub fn pow_real(base: &Real, exp: &Real) -> Real {
    (exp.clone() * base.clone().ln()).exp()
}

/// `lambda^exp` where lambda = 1 + sqrt(2).
pub fn lambda_pow(exp: &Real) -> Real {
    (exp.clone() * &*LN_LAMBDA).exp()
}

/// Machine epsilon of the backend, `2^(1 - PRECISION_BITS)`.
pub static EPSILON: Lazy<Real> =
    Lazy::new(|| with_prec(Real::from_parts(IBig::ONE, 1 - PRECISION_BITS as isize)));

pub static PI: Lazy<Real> = Lazy::new(compute_pi);

pub static SQRT2: Lazy<Real> = Lazy::new(|| real_from_i64(2).sqrt());

pub static INV_SQRT2: Lazy<Real> = Lazy::new(|| real_from_i64(1) / &*SQRT2);

/// `2 * sqrt(2)`, the spacing factor of the one-dimensional grid enumeration.
pub static SQRT8: Lazy<Real> = Lazy::new(|| real_from_i64(8).sqrt());

pub static INV_SQRT8: Lazy<Real> = Lazy::new(|| real_from_i64(1) / &*SQRT8);

/// The silver ratio `lambda = 1 + sqrt(2)`, fundamental unit of Z[sqrt 2].
pub static LAMBDA: Lazy<Real> = Lazy::new(|| real_from_i64(1) + &*SQRT2);

/// `1/lambda = sqrt(2) - 1`.
pub static INV_LAMBDA: Lazy<Real> = Lazy::new(|| &*SQRT2 - real_from_i64(1));

pub static INV_LN2: Lazy<Real> = Lazy::new(|| real_from_i64(1) / real_from_i64(2).ln());

static LN_LAMBDA: Lazy<Real> = Lazy::new(|| LAMBDA.clone().ln());

pub static INV_LN_LAMBDA: Lazy<Real> = Lazy::new(|| real_from_i64(1) / &*LN_LAMBDA);

fn work_prec(x: Real) -> Real {
    x.with_precision(PRECISION_BITS + GUARD_BITS).value()
}

/// Smallest magnitude worth adding into a guarded series.
fn series_cutoff() -> Real {
    Real::from_parts(IBig::ONE, -((PRECISION_BITS + GUARD_BITS / 2) as isize))
}

/// `arctan(1/x)` for an integer `x > 1`, by the alternating Gregory series.
fn atan_recip(x: i64) -> Real {
    let x2 = work_prec(FBig::from(x * x));
    let mut term = work_prec(FBig::from(1)) / work_prec(FBig::from(x));
    let mut sum = term.clone();
    let cutoff = series_cutoff();
    let mut k: i64 = 1;
    loop {
        term = term / &x2;
        let add = term.clone() / FBig::from(2 * k + 1);
        if add < cutoff {
            break;
        }
        if k % 2 == 1 {
            sum = sum - add;
        } else {
            sum = sum + add;
        }
        k += 1;
    }
    sum
}

/// Machin's formula: `pi = 16 arctan(1/5) - 4 arctan(1/239)`.
fn compute_pi() -> Real {
    with_prec(FBig::from(16) * atan_recip(5) - FBig::from(4) * atan_recip(239))
}

/// Reduce `x` into `[0, 2 pi)`.
fn range_reduce(x: &Real) -> Real {
    let two_pi = work_prec(PI.clone() * FBig::from(2));
    let k = (work_prec(x.clone()) / &two_pi).floor();
    work_prec(x.clone()) - k * two_pi
}

pub fn sin(x: &Real) -> Real {
    let r = range_reduce(x);
    let r2 = r.clone() * &r;
    // sin r = r - r^3/3! + r^5/5! - ...; `mag` holds the unsigned term.
    let mut mag = r.clone();
    let mut sum = r;
    let cutoff = series_cutoff();
    let mut k: i64 = 1;
    loop {
        mag = mag * &r2 / FBig::from(2 * k * (2 * k + 1));
        if mag < cutoff {
            break;
        }
        if k % 2 == 1 {
            sum = sum - mag.clone();
        } else {
            sum = sum + mag.clone();
        }
        k += 1;
    }
    with_prec(sum)
}

pub fn cos(x: &Real) -> Real {
    let r = range_reduce(x);
    let r2 = r.clone() * &r;
    // cos r = 1 - r^2/2! + r^4/4! - ...
    let mut mag = work_prec(FBig::from(1));
    let mut sum = mag.clone();
    let cutoff = series_cutoff();
    let mut k: i64 = 1;
    loop {
        mag = mag * &r2 / FBig::from(2 * k * (2 * k - 1));
        if mag < cutoff {
            break;
        }
        if k % 2 == 1 {
            sum = sum - mag.clone();
        } else {
            sum = sum + mag.clone();
        }
        k += 1;
    }
    with_prec(sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &Real, b: f64) {
        let d = to_f64(a) - b;
        assert!(d.abs() < 1e-12, "{} != {}", to_f64(a), b);
    }

    #[test]
    fn test_pi_value() {
        close(&PI, std::f64::consts::PI);
    }

    #[test]
    fn test_trig_values() {
        let third = &*PI / real_from_i64(3);
        close(&cos(&third), 0.5);
        close(&sin(&third), 0.75f64.sqrt());
        close(&sin(&(PI.clone() * real_from_i64(2))), 0.0);
        let neg = -(&*PI / real_from_i64(6));
        close(&sin(&neg), -0.5);
    }

    #[test]
    fn test_trig_identity_high_precision() {
        // sin^2 + cos^2 = 1 far below double precision.
        let x = real_from_ratio(355, 452);
        let s = sin(&x);
        let c = cos(&x);
        let one = real_from_i64(1);
        let err = abs_real((s.clone() * &s + c.clone() * &c) - one);
        assert!(err < pow_int(&real_from_ratio(1, 2), 1600));
    }

    #[test]
    fn test_floor_ceil() {
        let x = real_from_ratio(-7, 2);
        assert_eq!(floor_bigint(&x), BigInt::from(-4));
        assert_eq!(ceil_bigint(&x), BigInt::from(-3));
        let y = real_from_i64(5);
        assert_eq!(floor_bigint(&y), BigInt::from(5));
        assert_eq!(ceil_bigint(&y), BigInt::from(5));
    }

    #[test]
    fn test_bigint_roundtrip() {
        let v: BigInt = BigInt::from(-123456789) * BigInt::from(987654321i64).pow(3);
        assert_eq!(ibig_to_bigint(&bigint_to_ibig(&v)), v);
        let z = BigInt::from(0);
        assert_eq!(ibig_to_bigint(&bigint_to_ibig(&z)), z);
    }

    #[test]
    fn test_pow_helpers() {
        close(&pow_int(&real_from_i64(-2), 3), -8.0);
        close(&pow_int(&real_from_i64(3), 0), 1.0);
        let l = lambda_pow(&real_from_i64(2));
        close(&l, (1.0 + 2f64.sqrt()).powi(2));
        let r = pow_real(&real_from_i64(2), &real_from_ratio(1, 2));
        close(&r, 2f64.sqrt());
    }

    #[test]
    fn test_constants() {
        close(&SQRT2, 2f64.sqrt());
        close(&(&*LAMBDA * &*INV_LAMBDA), 1.0);
        close(&SQRT8, 8f64.sqrt());
    }
}
