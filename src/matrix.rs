//! Fixed 2x2 matrices and 2-vectors over any ring of the tower.
//!
//! Row-major storage. The inverse is only defined for matrices with
//! determinant +-1 (every grid operator and every exact unitary qualifies);
//! anything else is a programmer error and aborts. `adj2` applies the sqrt-2
//! conjugate elementwise, which turns a grid operator for one ellipse of a
//! pair into the operator for its companion.

use std::fmt;
use std::ops::{Mul, Neg};

use once_cell::sync::Lazy;

use crate::real::Real;
use crate::ring::{Ring, ToReal, CD2, D2};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Matrix2<R> {
    m: [R; 4],
}

pub type MD2 = Matrix2<D2>;
pub type MCD2 = Matrix2<CD2>;
pub type RealMatrix = Matrix2<Real>;

impl<R: Ring> Matrix2<R> {
    pub fn new(a: R, b: R, c: R, d: R) -> Self {
        Matrix2 { m: [a, b, c, d] }
    }

    pub fn identity() -> Self {
        Matrix2::new(R::one(), R::zero(), R::zero(), R::one())
    }

    pub fn get(&self, row: usize, col: usize) -> &R {
        &self.m[2 * row + col]
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> &mut R {
        &mut self.m[2 * row + col]
    }

    pub fn det(&self) -> R {
        self.get(0, 0).clone() * self.get(1, 1).clone()
            - self.get(0, 1).clone() * self.get(1, 0).clone()
    }

    pub fn transpose(&self) -> Self {
        Matrix2::new(
            self.get(0, 0).clone(),
            self.get(1, 0).clone(),
            self.get(0, 1).clone(),
            self.get(1, 1).clone(),
        )
    }

    /// Inverse of a matrix with determinant +-1.
    ///
    /// # Panics
    ///
    /// Panics when the determinant is anything else; such a matrix reaching
    /// this call means an invariant upstream is broken.
    pub fn inv(&self) -> Self {
        let det = self.det();
        let adjugate = Matrix2::new(
            self.get(1, 1).clone(),
            -self.get(0, 1).clone(),
            -self.get(1, 0).clone(),
            self.get(0, 0).clone(),
        );
        if det == R::one() {
            adjugate
        } else if det == -R::one() {
            -adjugate
        } else {
            panic!("inverse of a matrix whose determinant is not +-1");
        }
    }

    pub fn mul_from_left(&mut self, lhs: &Self) {
        *self = lhs.clone() * self.clone();
    }
}

impl<R: Ring> Neg for Matrix2<R> {
    type Output = Self;
    fn neg(self) -> Self {
        let [a, b, c, d] = self.m;
        Matrix2::new(-a, -b, -c, -d)
    }
}

impl<R: Ring> Mul for Matrix2<R> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let a = self.get(0, 0).clone() * rhs.get(0, 0).clone()
            + self.get(0, 1).clone() * rhs.get(1, 0).clone();
        let b = self.get(0, 0).clone() * rhs.get(0, 1).clone()
            + self.get(0, 1).clone() * rhs.get(1, 1).clone();
        let c = self.get(1, 0).clone() * rhs.get(0, 0).clone()
            + self.get(1, 1).clone() * rhs.get(1, 0).clone();
        let d = self.get(1, 0).clone() * rhs.get(0, 1).clone()
            + self.get(1, 1).clone() * rhs.get(1, 1).clone();
        Matrix2::new(a, b, c, d)
    }
}

impl<R: Ring + fmt::Display> fmt::Display for Matrix2<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}; {}, {}]",
            self.get(0, 0),
            self.get(0, 1),
            self.get(1, 0),
            self.get(1, 1)
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Vector2<R> {
    v: [R; 2],
}

pub type RealVector = Vector2<Real>;

impl<R: Ring> Vector2<R> {
    pub fn new(x: R, y: R) -> Self {
        Vector2 { v: [x, y] }
    }

    pub fn x(&self) -> &R {
        &self.v[0]
    }

    pub fn y(&self) -> &R {
        &self.v[1]
    }
}

impl<R: Ring> Neg for Vector2<R> {
    type Output = Self;
    fn neg(self) -> Self {
        let [x, y] = self.v;
        Vector2::new(-x, -y)
    }
}

impl<R: Ring> std::ops::Add for Vector2<R> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        let [x, y] = self.v;
        let [a, b] = rhs.v;
        Vector2::new(x + a, y + b)
    }
}

impl<R: Ring> std::ops::Sub for Vector2<R> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        let [x, y] = self.v;
        let [a, b] = rhs.v;
        Vector2::new(x - a, y - b)
    }
}

/// Scalar multiple `v * s`.
impl<R: Ring> Mul<R> for Vector2<R> {
    type Output = Self;
    fn mul(self, s: R) -> Self {
        let [x, y] = self.v;
        Vector2::new(x * s.clone(), y * s)
    }
}

/// Matrix-vector product.
impl<R: Ring> Mul<Vector2<R>> for Matrix2<R> {
    type Output = Vector2<R>;
    fn mul(self, v: Vector2<R>) -> Vector2<R> {
        Vector2::new(
            self.get(0, 0).clone() * v.x().clone() + self.get(0, 1).clone() * v.y().clone(),
            self.get(1, 0).clone() * v.x().clone() + self.get(1, 1).clone() * v.y().clone(),
        )
    }
}

/// Elementwise sqrt-2 conjugation of a grid operator.
pub fn adj2(m: &MD2) -> MD2 {
    MD2::new(
        m.get(0, 0).adj2(),
        m.get(0, 1).adj2(),
        m.get(1, 0).adj2(),
        m.get(1, 1).adj2(),
    )
}

/// Float cast of one complex entry as a `(re, im)` pair; the complex analog
/// of [`to_real_matrix`] for checks and diagnostics.
pub fn to_real_pair(x: &CD2) -> (Real, Real) {
    (x.re().to_real(), x.im().to_real())
}

/// Float cast for bounding-box work; never used on a correctness-critical path.
pub fn to_real_matrix(m: &MD2) -> RealMatrix {
    RealMatrix::new(
        m.get(0, 0).to_real(),
        m.get(0, 1).to_real(),
        m.get(1, 0).to_real(),
        m.get(1, 1).to_real(),
    )
}

/// Exact matrices of the eight gate generators (and `T^dag`).
///
/// `W = omega * I` carries the global phase; `H` is normalized by `1/sqrt 2`
/// so every entry stays inside `D[omega]`.
pub mod mcd2 {
    use super::*;

    fn re(x: D2) -> CD2 {
        CD2::from_ring(x)
    }

    pub static I: Lazy<MCD2> = Lazy::new(MCD2::identity);

    pub static H: Lazy<MCD2> = Lazy::new(|| {
        let h = re(D2::inv_sqrt2());
        MCD2::new(h.clone(), h.clone(), h.clone(), -h)
    });

    pub static S: Lazy<MCD2> = Lazy::new(|| {
        MCD2::new(CD2::one(), CD2::zero(), CD2::zero(), CD2::imag())
    });

    pub static T: Lazy<MCD2> = Lazy::new(|| {
        MCD2::new(CD2::one(), CD2::zero(), CD2::zero(), CD2::omega())
    });

    pub static T_DAG: Lazy<MCD2> = Lazy::new(|| {
        MCD2::new(
            CD2::one(),
            CD2::zero(),
            CD2::zero(),
            CD2::new(D2::inv_sqrt2(), -D2::inv_sqrt2()),
        )
    });

    pub static X: Lazy<MCD2> = Lazy::new(|| {
        MCD2::new(CD2::zero(), CD2::one(), CD2::one(), CD2::zero())
    });

    pub static Y: Lazy<MCD2> = Lazy::new(|| {
        MCD2::new(CD2::zero(), -CD2::imag(), CD2::imag(), CD2::zero())
    });

    pub static Z: Lazy<MCD2> = Lazy::new(|| {
        MCD2::new(CD2::one(), CD2::zero(), CD2::zero(), -CD2::one())
    });

    pub static W: Lazy<MCD2> = Lazy::new(|| {
        MCD2::new(CD2::omega(), CD2::zero(), CD2::zero(), CD2::omega())
    });

    /// `H * T^dag * H`, the step of the sde descent.
    pub static STEP: Lazy<MCD2> =
        Lazy::new(|| H.clone() * T_DAG.clone() * H.clone());
}

#[cfg(test)]
mod tests {
    use super::mcd2;
    use super::*;
    use crate::dyadic::Dyadic;
    use num_bigint::BigInt;

    #[test]
    fn test_basic_multiplication() {
        let x = Matrix2::new(
            BigInt::from(1),
            BigInt::from(2),
            BigInt::from(3),
            BigInt::from(4),
        );
        let y = Matrix2::new(
            BigInt::from(2),
            BigInt::from(0),
            BigInt::from(0),
            BigInt::from(2),
        );
        let z = x * y;
        assert_eq!(*z.get(0, 0), BigInt::from(2));
        assert_eq!(*z.get(0, 1), BigInt::from(4));
        assert_eq!(*z.get(1, 0), BigInt::from(6));
        assert_eq!(*z.get(1, 1), BigInt::from(8));
    }

    #[test]
    fn test_special_inverse() {
        let m = Matrix2::new(
            BigInt::from(2),
            BigInt::from(1),
            BigInt::from(1),
            BigInt::from(1),
        );
        assert_eq!(m.det(), BigInt::from(1));
        assert_eq!(m.clone() * m.inv(), Matrix2::identity());
        let n = Matrix2::new(
            BigInt::from(0),
            BigInt::from(1),
            BigInt::from(1),
            BigInt::from(0),
        );
        assert_eq!(n.det(), BigInt::from(-1));
        assert_eq!(n.clone() * n.inv(), Matrix2::identity());
    }

    #[test]
    #[should_panic]
    fn test_non_special_inverse_panics() {
        let m = Matrix2::new(
            BigInt::from(2),
            BigInt::from(0),
            BigInt::from(0),
            BigInt::from(2),
        );
        let _ = m.inv();
    }

    /// Product of the gate matrices named in `word`, optionally inverted
    /// atom by atom.
    fn word_matrix(word: &str, inverse: bool) -> MCD2 {
        let mut ret = MCD2::identity();
        for c in word.chars() {
            let next = match c {
                'T' => {
                    if inverse {
                        mcd2::T_DAG.clone()
                    } else {
                        mcd2::T.clone()
                    }
                }
                'S' => {
                    if inverse {
                        mcd2::S.clone() * mcd2::S.clone() * mcd2::S.clone()
                    } else {
                        mcd2::S.clone()
                    }
                }
                'H' => mcd2::H.clone(),
                'X' => mcd2::X.clone(),
                _ => unreachable!("unexpected atom {c}"),
            };
            ret = ret * next;
        }
        ret
    }

    #[test]
    fn test_gate_matrix_relations() {
        assert_eq!(mcd2::T.clone() * mcd2::T_DAG.clone(), *mcd2::I);
        assert_eq!(mcd2::T_DAG.clone() * mcd2::T.clone(), *mcd2::I);
        assert_eq!(mcd2::H.clone() * mcd2::H.clone(), *mcd2::I);
        assert_eq!(mcd2::X.clone() * mcd2::X.clone(), *mcd2::I);
        assert_eq!(mcd2::Y.clone() * mcd2::Y.clone(), *mcd2::I);
        assert_eq!(mcd2::Z.clone() * mcd2::Z.clone(), *mcd2::I);
        assert_eq!(mcd2::S.clone() * mcd2::S.clone(), *mcd2::Z);
        assert_eq!(mcd2::T.clone() * mcd2::T.clone(), *mcd2::S);
    }

    #[test]
    fn test_word_inverses() {
        let input = "THTTTHTTTHTHTTHTHTT";
        let reverse: String = input.chars().rev().collect();
        assert_eq!(word_matrix(input, true) * word_matrix(&reverse, false), *mcd2::I);
        assert_eq!(word_matrix(&reverse, true) * word_matrix(input, false), *mcd2::I);
        assert_eq!(word_matrix(input, false) * word_matrix(&reverse, true), *mcd2::I);
        assert_eq!(word_matrix(&reverse, false) * word_matrix(input, true), *mcd2::I);
    }

    #[test]
    fn test_adj2_distributes() {
        let lambda = D2::new(Dyadic::from(1), Dyadic::from(1));
        let half_sqrt = D2::inv_sqrt2();
        let m = MD2::new(lambda.clone(), half_sqrt.clone(), -half_sqrt, lambda);
        let square = m.clone() * m.clone();
        assert_eq!(adj2(&square), adj2(&m) * adj2(&m));
    }
}
