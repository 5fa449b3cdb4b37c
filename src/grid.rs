//! Grid-problem solvers.
//!
//! Three layers, following Ross-Selinger (arXiv:1403.2975):
//!
//! - [`OneDimGridSolver`] finds every `a + b sqrt2` in `Z[sqrt 2]` whose
//!   value lies in `[x0, x1]` while its sqrt-2 conjugate lies in `[y0, y1]`.
//!   The interval is first normalized into `[1/lambda, 1)` width by unit
//!   scaling, which makes the candidate count per `b` at most one.
//! - [`GridOperatorSearch`] reduces a rotated ellipse pair to bounded skew by
//!   composing unit grid operations `{Shift(n), R, K, A(n), B(n), Z, X}`,
//!   then rebuilds the accumulated operator exactly in `GL2(D[sqrt 2])`.
//! - [`TwoDimGridSolver`] covers the epsilon region of a rotation with a
//!   rectangle ellipse, pairs it with the unit disk, uprights both with a
//!   grid operator, and enumerates candidate points level by level over the
//!   scaled lattice `(1/sqrt 2)^k (Z[omega] + omega Z[omega])`.
//!
//! Solutions are emitted exactly (in `Z2`/`CD2`); floats only steer the
//! search and pad interval tests by one machine epsilon.

use log::debug;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::dyadic::Dyadic;
use crate::geometry::{to_exponent_format, BBox, Ellipse};
use crate::matrix::{adj2, to_real_matrix, RealVector, MD2};
use crate::real::{
    ceil_bigint, floor_bigint, lambda_pow, pow_int, real_from_bigint, real_from_i64,
    real_from_ratio, sin_cos_of, sqrt_real, Real, EPSILON, INV_LAMBDA, INV_LN2, INV_SQRT2,
    INV_SQRT8, LAMBDA, SQRT2,
};
use crate::ring::{cd2_div_sqrt2_pow, pow_ring, z2_to_d2, ToReal, CD2, D2, Z2};

// ---------------------------------------------------------------------------
// One-dimensional solver
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Conversion {
    Lambda,
    InvLambda,
}

struct Problem {
    x0: Real,
    x1: Real,
    y0: Real,
    y1: Real,
    history: Vec<Conversion>,
}

impl Problem {
    /// Scale the target interval by `lambda`; the conjugate interval scales
    /// by `-1/lambda`, which flips its orientation.
    fn do_lambda(&mut self) {
        self.x0 = self.x0.clone() * &*LAMBDA;
        self.x1 = self.x1.clone() * &*LAMBDA;
        self.y0 = self.y0.clone() * -INV_LAMBDA.clone();
        self.y1 = self.y1.clone() * -INV_LAMBDA.clone();
        std::mem::swap(&mut self.y0, &mut self.y1);
        if self.history.last() == Some(&Conversion::InvLambda) {
            self.history.pop();
        } else {
            self.history.push(Conversion::Lambda);
        }
    }

    fn do_inv_lambda(&mut self) {
        self.x0 = self.x0.clone() * &*INV_LAMBDA;
        self.x1 = self.x1.clone() * &*INV_LAMBDA;
        self.y0 = self.y0.clone() * -LAMBDA.clone();
        self.y1 = self.y1.clone() * -LAMBDA.clone();
        std::mem::swap(&mut self.y0, &mut self.y1);
        if self.history.last() == Some(&Conversion::Lambda) {
            self.history.pop();
        } else {
            self.history.push(Conversion::InvLambda);
        }
    }

    fn is_valid(&self, a: &Real, b: &Real) -> bool {
        // Boundary solutions are legitimate; pad by one machine epsilon.
        let eps = &*EPSILON;
        let t = SQRT2.clone() * b;
        let plus = a.clone() + &t;
        let minus = a.clone() - &t;
        self.x0.clone() - eps <= plus
            && plus <= self.x1.clone() + eps
            && self.y0.clone() - eps <= minus
            && minus <= self.y1.clone() + eps
    }
}

/// Enumerates `alpha` in `Z[sqrt 2]` with `alpha` in `[x0, x1]` and
/// `alpha^adj2` in `[y0, y1]`.
pub struct OneDimGridSolver {
    problem: Problem,
    solutions: Vec<Z2>,
}

impl OneDimGridSolver {
    pub fn new(x0: Real, x1: Real, y0: Real, y1: Real) -> Self {
        debug_assert!(x0 < x1, "x interval must not be empty");
        debug_assert!(y0 < y1, "y interval must not be empty");
        OneDimGridSolver {
            problem: Problem {
                x0,
                x1,
                y0,
                y1,
                history: Vec::new(),
            },
            solutions: Vec::new(),
        }
    }

    pub fn solutions(&self) -> &[Z2] {
        &self.solutions
    }

    pub fn enumerate_all_solutions(&mut self) {
        let one = real_from_i64(1);
        while self.problem.x1.clone() - &self.problem.x0 >= one {
            self.problem.do_inv_lambda();
        }
        while self.problem.x1.clone() - &self.problem.x0 < *INV_LAMBDA {
            self.problem.do_lambda();
        }

        let min_b = floor_bigint(&((self.problem.x0.clone() - &self.problem.y1) * &*INV_SQRT8));
        let max_b = ceil_bigint(&((self.problem.x1.clone() - &self.problem.y0) * &*INV_SQRT8));
        let mut b = min_b;
        while b <= max_b {
            let bf = real_from_bigint(&b);
            let a = floor_bigint(&(self.problem.x1.clone() - bf.clone() * &*SQRT2));
            if self.problem.is_valid(&real_from_bigint(&a), &bf) {
                self.solutions.push(Z2::new(a, b.clone()));
            }
            b += BigInt::from(1);
        }

        // Undo the unit scaling on the collected solutions.
        while let Some(last) = self.problem.history.last().copied() {
            match last {
                Conversion::Lambda => {
                    self.problem.do_inv_lambda();
                    for s in &mut self.solutions {
                        *s = s.clone() * Z2::inv_lambda();
                    }
                }
                Conversion::InvLambda => {
                    self.problem.do_lambda();
                    for s in &mut self.solutions {
                        *s = s.clone() * Z2::lambda();
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Grid-operator search
// ---------------------------------------------------------------------------

fn sinh_lambda(x: &Real) -> Real {
    (lambda_pow(x) - lambda_pow(&-x.clone())) / real_from_i64(2)
}

fn cosh_lambda(x: &Real) -> Real {
    (lambda_pow(x) + lambda_pow(&-x.clone())) / real_from_i64(2)
}

#[derive(Clone, Debug)]
enum UnitOp {
    Shift(BigInt),
    R,
    K,
    A(BigInt),
    B(BigInt),
    Z,
    X,
}

impl UnitOp {
    /// Exact matrix of an operation; `Shift` is diagonal in `Z2` units and
    /// handled separately.
    fn matrix(&self) -> MD2 {
        let hs = D2::inv_sqrt2();
        let one = D2::one();
        let zero = D2::zero();
        match self {
            UnitOp::R => MD2::new(hs.clone(), -hs.clone(), hs.clone(), hs),
            UnitOp::K => MD2::new(
                hs.clone() - one.clone(),
                -hs.clone(),
                hs.clone() + one,
                hs,
            ),
            UnitOp::A(n) => MD2::new(
                one.clone(),
                D2::from_ring(Dyadic::from_int(BigInt::from(-2) * n)),
                zero,
                one,
            ),
            UnitOp::B(n) => MD2::new(
                one.clone(),
                D2::new(Dyadic::from_int(BigInt::zero()), Dyadic::from_int(n.clone())),
                zero,
                one,
            ),
            UnitOp::Z => MD2::new(one.clone(), zero.clone(), zero, -one),
            UnitOp::X => MD2::new(zero.clone(), one.clone(), one, zero),
            UnitOp::Shift(_) => unreachable!("Shift has no single MD2 matrix"),
        }
    }
}

/// Skewed ellipse pair in exponent coordinates: `e_i^2 - b_i^2 = 1`.
struct PairState {
    e1: Real,
    b1: Real,
    z1: Real,
    e2: Real,
    b2: Real,
    z2: Real,
}

impl PairState {
    fn skew(&self) -> Real {
        self.b1.clone() * &self.b1 + self.b2.clone() * &self.b2
    }

    fn bias(&self) -> Real {
        self.z2.clone() - &self.z1
    }
}

/// Reduces an ellipse pair to `skew <= 15` and reports the accumulated grid
/// operator.
pub struct GridOperatorSearch {
    state: PairState,
    history: Vec<Vec<UnitOp>>,
}

impl GridOperatorSearch {
    pub fn from_pair(el1: &Ellipse, el2: &Ellipse) -> Self {
        let (e1, z1) = el1.exponent_format();
        let (e2, z2) = el2.exponent_format();
        GridOperatorSearch {
            state: PairState {
                e1,
                b1: el1.b().clone(),
                z1,
                e2,
                b2: el2.b().clone(),
                z2,
            },
            history: Vec::new(),
        }
    }

    pub fn find(&mut self) {
        let threshold = real_from_i64(15);
        while self.state.skew() > threshold {
            self.step();
        }
    }

    /// Accumulated operator, rebuilt exactly from the recorded history in
    /// reverse. `Shift(n)` contributes the diagonal `(lambda^n, lambda^-n)`.
    pub fn grid_operator(&self) -> MD2 {
        let mut ret = MD2::identity();
        for ops in self.history.iter().rev() {
            for op in ops.iter().rev() {
                match op {
                    UnitOp::Shift(n) => {
                        let (x, y) = if !n.is_negative() {
                            (pow_ring(Z2::lambda(), n), pow_ring(Z2::inv_lambda(), n))
                        } else {
                            let m = -n.clone();
                            (pow_ring(Z2::inv_lambda(), &m), pow_ring(Z2::lambda(), &m))
                        };
                        *ret.get_mut(0, 0) = ret.get(0, 0).clone() * z2_to_d2(&x);
                        *ret.get_mut(1, 1) = ret.get(1, 1).clone() * z2_to_d2(&y);
                    }
                    _ => ret.mul_from_left(&op.matrix()),
                }
            }
        }
        ret
    }

    fn step(&mut self) {
        let m08 = real_from_ratio(-4, 5);
        let m02 = real_from_ratio(-1, 5);
        let p03 = real_from_ratio(3, 10);
        let p08 = real_from_ratio(4, 5);

        self.history.push(Vec::new());

        self.shift();
        self.flip_z();
        self.flip_x();

        // Invariants here: |bias| <= 1, b2 >= 0, z1 + z2 >= 0.
        let zero = real_from_i64(0);
        let z1 = self.state.z1.clone();
        let z2 = self.state.z2.clone();
        if self.state.b1 >= zero {
            if m08 <= z1 && z1 <= p08 && m08 <= z2 && z2 <= p08 {
                self.op_r();
            } else if z1 <= p03 && p08 <= z2 {
                self.op_k();
            } else if p03 <= z1 && p03 <= z2 {
                self.op_a();
            } else if p08 <= z1 && z2 <= p03 {
                self.op_k();
            } else {
                unreachable!("ellipse-pair region dispatch is not exhaustive (b1 >= 0)");
            }
        } else if m08 <= z1 && z1 <= p08 && m08 <= z2 && z2 <= p08 {
            self.op_r();
        } else if m02 <= z1 && m02 <= z2 {
            self.op_b();
        } else {
            unreachable!("ellipse-pair region dispatch is not exhaustive (b1 < 0)");
        }
    }

    fn op_r(&mut self) {
        {
            let b = self.state.e1.clone() * sinh_lambda(&self.state.z1);
            let cosh = self.state.e1.clone() * cosh_lambda(&self.state.z1);
            let x = cosh.clone() + &self.state.b1;
            let y = cosh - &self.state.b1;
            let (e, z) = to_exponent_format(&x, &y);
            self.state.e1 = e;
            self.state.z1 = z;
            self.state.b1 = b;
        }
        {
            let b = self.state.e2.clone() * sinh_lambda(&self.state.z2);
            let cosh = self.state.e2.clone() * cosh_lambda(&self.state.z2);
            let x = cosh.clone() + &self.state.b2;
            let y = cosh - &self.state.b2;
            let (e, z) = to_exponent_format(&x, &y);
            self.state.e2 = e;
            self.state.z2 = z;
            self.state.b2 = b;
        }
        self.record(UnitOp::R);
    }

    fn op_k(&mut self) {
        let one = real_from_i64(1);
        let two = real_from_i64(2);
        {
            let b = self.state.e1.clone() * cosh_lambda(&(self.state.z1.clone() + &one))
                - SQRT2.clone() * &self.state.b1;
            let x = self.state.e1.clone() * cosh_lambda(&(self.state.z1.clone() + &two))
                - &self.state.b1;
            let y = self.state.e1.clone() * cosh_lambda(&self.state.z1) - &self.state.b1;
            let (e, z) = to_exponent_format(&x, &y);
            self.state.e1 = e;
            self.state.z1 = z;
            self.state.b1 = b;
        }
        {
            let b = SQRT2.clone() * &self.state.b2
                - self.state.e2.clone() * cosh_lambda(&(self.state.z2.clone() - &one));
            let x = self.state.e2.clone() * cosh_lambda(&(self.state.z2.clone() - &two))
                - &self.state.b2;
            let y = self.state.e2.clone() * cosh_lambda(&self.state.z2) - &self.state.b2;
            let (e, z) = to_exponent_format(&x, &y);
            self.state.e2 = e;
            self.state.z2 = z;
            self.state.b2 = b;
        }
        self.record(UnitOp::K);
    }

    fn op_a(&mut self) {
        let z_min = if self.state.z1 < self.state.z2 {
            self.state.z1.clone()
        } else {
            self.state.z2.clone()
        };
        let n = floor_bigint(&(lambda_pow(&z_min) / real_from_i64(2))).max(BigInt::from(1));
        let m = real_from_bigint(&n);
        let two = real_from_i64(2);
        let four = real_from_i64(4);
        {
            let x = self.state.e1.clone() * lambda_pow(&-self.state.z1.clone());
            let b = self.state.b1.clone() - two.clone() * &m * &x;
            let y = four.clone() * &m * &m * &x - four.clone() * &m * &self.state.b1
                + self.state.e1.clone() * lambda_pow(&self.state.z1);
            let (e, z) = to_exponent_format(&x, &y);
            self.state.e1 = e;
            self.state.z1 = z;
            self.state.b1 = b;
        }
        {
            let x = self.state.e2.clone() * lambda_pow(&-self.state.z2.clone());
            let b = self.state.b2.clone() - two * &m * &x;
            let y = four.clone() * &m * &m * &x - four * &m * &self.state.b2
                + self.state.e2.clone() * lambda_pow(&self.state.z2);
            let (e, z) = to_exponent_format(&x, &y);
            self.state.e2 = e;
            self.state.z2 = z;
            self.state.b2 = b;
        }
        self.record(UnitOp::A(n));
    }

    fn op_b(&mut self) {
        let z_min = if self.state.z1 < self.state.z2 {
            self.state.z1.clone()
        } else {
            self.state.z2.clone()
        };
        let n = floor_bigint(&(lambda_pow(&z_min) / &*SQRT2)).max(BigInt::from(1));
        let m = real_from_bigint(&n);
        let two = real_from_i64(2);
        {
            let x = self.state.e1.clone() * lambda_pow(&-self.state.z1.clone());
            let b = self.state.b1.clone() + SQRT2.clone() * &m * &x;
            let y = two.clone() * &m * &m * &x
                + two.clone() * SQRT2.clone() * &m * &self.state.b1
                + self.state.e1.clone() * lambda_pow(&self.state.z1);
            let (e, z) = to_exponent_format(&x, &y);
            self.state.e1 = e;
            self.state.z1 = z;
            self.state.b1 = b;
        }
        {
            let x = self.state.e2.clone() * lambda_pow(&-self.state.z2.clone());
            let b = self.state.b2.clone() - SQRT2.clone() * &m * &x;
            let y = two.clone() * &m * &m * &x - two * SQRT2.clone() * &m * &self.state.b2
                + self.state.e2.clone() * lambda_pow(&self.state.z2);
            let (e, z) = to_exponent_format(&x, &y);
            self.state.e2 = e;
            self.state.z2 = z;
            self.state.b2 = b;
        }
        self.record(UnitOp::B(n));
    }

    /// Normalize the bias into `[-1, 1]` by shifting both exponents.
    fn shift(&mut self) {
        let one = real_from_i64(1);
        let bias = self.state.bias();
        if bias < -one.clone() || one < bias {
            let n = floor_bigint(&((one - bias) / real_from_i64(2)));
            let nf = real_from_bigint(&n);
            self.state.z1 = self.state.z1.clone() - &nf;
            self.state.z2 = self.state.z2.clone() + &nf;
            if n.is_odd() {
                self.state.b2 = -self.state.b2.clone();
            }
            self.record(UnitOp::Shift(n));
        }
        debug_assert!({
            let b = self.state.bias();
            real_from_i64(-1) <= b && b <= real_from_i64(1)
        });
    }

    fn flip_z(&mut self) {
        if self.state.b2 < real_from_i64(0) {
            self.state.b1 = -self.state.b1.clone();
            self.state.b2 = -self.state.b2.clone();
            self.record(UnitOp::Z);
        }
    }

    fn flip_x(&mut self) {
        if self.state.z1.clone() + &self.state.z2 < real_from_i64(0) {
            self.state.z1 = -self.state.z1.clone();
            self.state.z2 = -self.state.z2.clone();
            self.record(UnitOp::X);
        }
    }

    fn record(&mut self, op: UnitOp) {
        self.history
            .last_mut()
            .expect("record called outside a step")
            .push(op);
    }
}

// ---------------------------------------------------------------------------
// Two-dimensional solver
// ---------------------------------------------------------------------------

/// Level-by-level enumerator of candidate points `u` for the rotation
/// approximation problem at angle `theta` (the caller passes `-theta/2`) and
/// tolerance `epsilon`.
pub struct TwoDimGridSolver {
    cos: Real,
    sin: Real,
    bbox1: BBox,
    bbox2: BBox,
    inv_g1: MD2,
    inv_g2: MD2,
    level: u32,
    solutions: Vec<CD2>,
}

impl TwoDimGridSolver {
    pub fn new(theta: &Real, epsilon: &Real) -> Self {
        let (sin, cos) = sin_cos_of(theta);
        let eps_sq = epsilon.clone() * epsilon;
        let one = real_from_i64(1);

        // Rectangle covering the circular cap of the unit disk around angle
        // theta, with radial half-thickness t = eps * sqrt(1 - eps/4).
        let v1 = RealVector::new(cos.clone(), sin.clone());
        let v2 = RealVector::new(sin.clone(), -cos.clone());
        let t = epsilon.clone() * sqrt_real(&(one.clone() - epsilon.clone() / real_from_i64(4)));
        let inner = one - eps_sq / real_from_i64(2);
        let orig_el1 = Ellipse::from_rectangle(
            v1.clone() * inner.clone() - v2.clone() * t.clone(),
            v1.clone() * inner + v2.clone() * t.clone(),
            v1.clone() + v2.clone() * t.clone(),
            v1.clone() - v2 * t,
        );
        let orig_el2 = Ellipse::from_circle(
            RealVector::new(real_from_i64(0), real_from_i64(0)),
            real_from_i64(1),
        );

        let mut search = GridOperatorSearch::from_pair(&orig_el1, &orig_el2);
        search.find();

        // The search yields the mapped->original operator; its adj2 serves
        // the conjugate side.
        let inv_g1 = search.grid_operator();
        let inv_g2 = adj2(&inv_g1);
        let g1 = inv_g1.inv();

        let mapped_center = to_real_matrix(&g1) * orig_el1.center().clone();
        let x1 = to_real_matrix(&inv_g1);
        let x2 = to_real_matrix(&inv_g2);
        let y1 = x1.transpose() * orig_el1.matrix() * x1;
        let y2 = x2.transpose() * orig_el2.matrix() * x2;
        let el1 = Ellipse::new(
            mapped_center,
            orig_el1.scale().clone(),
            y1.get(0, 0).clone(),
            y1.get(0, 1).clone(),
            y1.get(1, 1).clone(),
        );
        let el2 = Ellipse::new(
            RealVector::new(real_from_i64(0), real_from_i64(0)),
            orig_el2.scale().clone(),
            y2.get(0, 0).clone(),
            y2.get(0, 1).clone(),
            y2.get(1, 1).clone(),
        );

        TwoDimGridSolver {
            cos,
            sin,
            bbox1: el1.bbox(),
            bbox2: el2.bbox(),
            inv_g1,
            inv_g2,
            level: 0,
            solutions: Vec::new(),
        }
    }

    pub fn solutions(&self) -> &[CD2] {
        &self.solutions
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Estimate the starting level from the bounding-box areas, then advance
    /// until some level yields candidates.
    pub fn enumerate_all_solutions(&mut self) {
        let thresh = LAMBDA.clone() * &*LAMBDA;
        let wx = self.bbox1.x_width() * self.bbox2.x_width();
        let wy = self.bbox1.y_width() * self.bbox2.y_width();
        let width = if wx > wy { wx } else { wy };
        let est = floor_bigint(&((thresh / width).ln() * &*INV_LN2)).max(BigInt::zero());
        self.level = est.to_u32().expect("initial search level out of range");

        while self.solutions.is_empty() {
            self.level += 1;
            self.solutions.clear();
            self.solve();
        }
    }

    pub fn enumerate_next_level(&mut self) {
        self.level += 1;
        self.solutions.clear();
        self.solve();
    }

    fn solve(&mut self) {
        // Plain lattice, then its omega coset.
        self.solve_case(false);
        self.solve_case(true);
        debug!(
            "grid level {}: {} candidate points",
            self.level,
            self.solutions.len()
        );
    }

    fn solve_case(&mut self, omega_coset: bool) {
        let mut bbox1 = self.bbox1.clone();
        let mut bbox2 = self.bbox2.clone();
        bbox1.rescale(&pow_int(&SQRT2, self.level));
        // The conjugate lattice scales by (-sqrt 2)^k.
        bbox2.rescale(&pow_int(&-SQRT2.clone(), self.level));
        if omega_coset {
            bbox1.translate(&RealVector::new(
                -INV_SQRT2.clone(),
                -INV_SQRT2.clone(),
            ));
            bbox2.translate(&RealVector::new(INV_SQRT2.clone(), INV_SQRT2.clone()));
        }

        let mut x_solver = OneDimGridSolver::new(
            bbox1.x_min.clone(),
            bbox1.x_max.clone(),
            bbox2.x_min.clone(),
            bbox2.x_max.clone(),
        );
        let mut y_solver = OneDimGridSolver::new(
            bbox1.y_min.clone(),
            bbox1.y_max.clone(),
            bbox2.y_min.clone(),
            bbox2.y_max.clone(),
        );
        x_solver.enumerate_all_solutions();
        y_solver.enumerate_all_solutions();

        let one_d2 = D2::one();
        let one = real_from_i64(1);
        for x in x_solver.solutions() {
            for y in y_solver.solutions() {
                let mut p1 = CD2::new(z2_to_d2(x), z2_to_d2(y));
                let mut p2 = CD2::new(z2_to_d2(&x.adj2()), z2_to_d2(&y.adj2()));
                if omega_coset {
                    p1 = p1 + CD2::omega();
                    p2 = p2 - CD2::omega();
                }
                p1 = cd2_div_sqrt2_pow(&p1, self.level);
                p2 = cd2_div_sqrt2_pow(&p2, self.level);
                if self.level % 2 == 1 {
                    p2 = -p2;
                }
                let p1 = apply(&self.inv_g1, &p1);
                let p2 = apply(&self.inv_g2, &p2);

                let dot = p1.re().to_real() * &self.cos + p1.im().to_real() * &self.sin;
                let valid = p1.norm() <= one_d2 && dot <= one && p2.norm() <= one_d2;
                if valid {
                    self.solutions.push(p1);
                }
            }
        }
    }
}

fn apply(m: &MD2, p: &CD2) -> CD2 {
    let re = m.get(0, 0).clone() * p.re().clone() + m.get(0, 1).clone() * p.im().clone();
    let im = m.get(1, 0).clone() * p.re().clone() + m.get(1, 1).clone() * p.im().clone();
    CD2::new(re, im)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::real::{to_f64, PI};
    use crate::ring::ToReal;

    fn run_one_dim(x0: f64, x1: f64, y0: f64, y1: f64) {
        let mut solver = OneDimGridSolver::new(
            Real::try_from(x0).unwrap(),
            Real::try_from(x1).unwrap(),
            Real::try_from(y0).unwrap(),
            Real::try_from(y1).unwrap(),
        );
        solver.enumerate_all_solutions();
        assert!(!solver.solutions().is_empty());
        for s in solver.solutions() {
            let v = to_f64(&s.to_real());
            let c = to_f64(&s.adj2().to_real());
            assert!(x0 - 1e-9 <= v && v <= x1 + 1e-9, "{} not in [{}, {}]", v, x0, x1);
            assert!(y0 - 1e-9 <= c && c <= y1 + 1e-9, "{} not in [{}, {}]", c, y0, y1);
        }
    }

    #[test]
    fn test_one_dim_grid() {
        let s = 2f64.sqrt();
        run_one_dim(0.0, 1.1 + s, 0.0, 1.1 + s);
        run_one_dim(1.0, 2.1 + s, 0.0, 1.1 + s);
        run_one_dim(0.0, 1.1 + s, 1.0, 28.1 + s);
        run_one_dim(1.0, 2.1 + s, 1.0, 2.1 + s);
    }

    #[test]
    fn test_one_dim_solutions_are_exact() {
        // lambda = 1 + sqrt2 lies in [2.41, 2.42] with conjugate in [-0.42, -0.41].
        let mut solver = OneDimGridSolver::new(
            Real::try_from(2.41).unwrap(),
            Real::try_from(2.42).unwrap(),
            Real::try_from(-0.42).unwrap(),
            Real::try_from(-0.41).unwrap(),
        );
        solver.enumerate_all_solutions();
        assert!(solver
            .solutions()
            .iter()
            .any(|s| *s == Z2::lambda()));
    }

    #[test]
    fn test_two_dim_grid_smoke() {
        let theta = &*PI / real_from_i64(128);
        let epsilon = Real::try_from(1e-6).unwrap();
        let mut solver = TwoDimGridSolver::new(&theta, &epsilon);
        solver.enumerate_all_solutions();
        assert!(!solver.solutions().is_empty());
        for u in solver.solutions() {
            // Inside the unit disk, exactly.
            assert!(u.norm() <= D2::one());
            // And inside the conjugate disk.
            let conj = CD2::new(u.re().adj2(), u.im().adj2());
            assert!(conj.norm() <= D2::one());
        }
    }
}
