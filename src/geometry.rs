//! Float-side geometry: bounding boxes and ellipses in quadratic form.
//!
//! An ellipse is `(x - c)^T D (x - c) <= s^2` with `det D = 1`. The diagonal
//! of `D` also travels in "exponent format" `(e, z)` with
//! `a = e lambda^-z`, `d = e lambda^z`, which is the coordinate system the
//! grid-operator search works in.

use crate::matrix::{RealMatrix, RealVector};
use crate::real::{
    lambda_pow, real_from_i64, real_from_ratio, Real, INV_LN_LAMBDA,
};

use dashu_base::SquareRoot;

#[derive(Clone, Debug)]
pub struct BBox {
    pub x_min: Real,
    pub x_max: Real,
    pub y_min: Real,
    pub y_max: Real,
}

impl BBox {
    pub fn x_width(&self) -> Real {
        self.x_max.clone() - &self.x_min
    }

    pub fn y_width(&self) -> Real {
        self.y_max.clone() - &self.y_min
    }

    pub fn translate(&mut self, v: &RealVector) {
        self.x_min = self.x_min.clone() + v.x();
        self.x_max = self.x_max.clone() + v.x();
        self.y_min = self.y_min.clone() + v.y();
        self.y_max = self.y_max.clone() + v.y();
    }

    /// Scale about the origin; a negative factor swaps the bounds.
    pub fn rescale(&mut self, s: &Real) {
        self.x_min = self.x_min.clone() * s;
        self.x_max = self.x_max.clone() * s;
        self.y_min = self.y_min.clone() * s;
        self.y_max = self.y_max.clone() * s;
        if *s < real_from_i64(0) {
            std::mem::swap(&mut self.x_min, &mut self.x_max);
            std::mem::swap(&mut self.y_min, &mut self.y_max);
        }
    }
}

/// `(a, d) -> (e, z)` with `e = sqrt(a d)` and `z = log_lambda(d / e)`.
pub fn to_exponent_format(a: &Real, d: &Real) -> (Real, Real) {
    let e = (a.clone() * d).sqrt();
    let z = (d.clone() / &e).ln() * &*INV_LN_LAMBDA;
    (e, z)
}

/// Inverse of [`to_exponent_format`].
pub fn to_normal_format(e: &Real, z: &Real) -> (Real, Real) {
    (e.clone() * lambda_pow(&-z.clone()), e.clone() * lambda_pow(z))
}

#[derive(Clone, Debug)]
pub struct Ellipse {
    center: RealVector,
    scale: Real,
    a: Real,
    b: Real,
    d: Real,
}

impl Ellipse {
    pub fn new(center: RealVector, scale: Real, a: Real, b: Real, d: Real) -> Self {
        Ellipse {
            center,
            scale,
            a,
            b,
            d,
        }
    }

    pub fn from_circle(center: RealVector, radius: Real) -> Self {
        Ellipse::new(
            center,
            radius,
            real_from_i64(1),
            real_from_i64(0),
            real_from_i64(1),
        )
    }

    /// Tightest ellipse of a rectangle given its four corners, either
    /// chirality. The first edge fixes the rotation; the scale is
    /// `sqrt(width * height / 2)`.
    pub fn from_rectangle(a: RealVector, b: RealVector, c: RealVector, d: RealVector) -> Self {
        let quarter = real_from_ratio(1, 4);
        let center = (a.clone() + b.clone() + c.clone() + d) * quarter;

        let a = a - center.clone();
        let b = b - center.clone();
        let c = c - center.clone();

        // Rotating by -theta uprights the rectangle; the tangent along the
        // first edge recovers theta.
        let edge = b.clone() - a;
        let edge_len = norm2(&edge).sqrt();
        let tangent = edge * (real_from_i64(1) / &edge_len);
        let cos = tangent.x().clone();
        let sin = -tangent.y().clone();
        let width = edge_len;
        let height = norm2(&(c - b)).sqrt();
        let sqrt2 = crate::real::SQRT2.clone();
        let x = width / &sqrt2;
        let y = height / &sqrt2;

        let scale = (x.clone() * &y).sqrt();

        let diag = RealMatrix::new(
            y.clone() / &x,
            real_from_i64(0),
            real_from_i64(0),
            x / &y,
        );
        let rotate = RealMatrix::new(cos.clone(), -sin.clone(), sin, cos);
        let dmat = rotate.transpose() * diag * rotate;
        Ellipse::new(
            center,
            scale,
            dmat.get(0, 0).clone(),
            dmat.get(0, 1).clone(),
            dmat.get(1, 1).clone(),
        )
    }

    pub fn center(&self) -> &RealVector {
        &self.center
    }

    pub fn scale(&self) -> &Real {
        &self.scale
    }

    pub fn a(&self) -> &Real {
        &self.a
    }

    pub fn b(&self) -> &Real {
        &self.b
    }

    pub fn d(&self) -> &Real {
        &self.d
    }

    pub fn matrix(&self) -> RealMatrix {
        RealMatrix::new(
            self.a.clone(),
            self.b.clone(),
            self.b.clone(),
            self.d.clone(),
        )
    }

    pub fn exponent_format(&self) -> (Real, Real) {
        to_exponent_format(&self.a, &self.d)
    }

    /// Axis-aligned bounding box: `c +- (s sqrt d, s sqrt a)`.
    pub fn bbox(&self) -> BBox {
        let x = self.scale.clone() * self.d.clone().sqrt();
        let y = self.scale.clone() * self.a.clone().sqrt();
        BBox {
            x_min: self.center.x().clone() - &x,
            x_max: self.center.x().clone() + &x,
            y_min: self.center.y().clone() - &y,
            y_max: self.center.y().clone() + &y,
        }
    }
}

fn norm2(v: &RealVector) -> Real {
    v.x().clone() * v.x() + v.y().clone() * v.y()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::real::{abs_real, to_f64, EPSILON};

    fn vec(x: f64, y: f64) -> RealVector {
        RealVector::new(Real::try_from(x).unwrap(), Real::try_from(y).unwrap())
    }

    fn assert_close(lhs: &Real, rhs: f64) {
        let r = Real::try_from(rhs).unwrap();
        assert!(
            abs_real(lhs.clone() - r) < Real::try_from(f64::EPSILON).unwrap(),
            "lhs = {}, rhs = {}",
            to_f64(lhs),
            rhs
        );
    }

    #[test]
    fn test_from_rectangle_clockwise() {
        // 5 x^2 - 6 xy + 5 y^2 = 8 about (1.5, 1.5)
        let e = Ellipse::from_rectangle(vec(1.0, 0.0), vec(0.0, 1.0), vec(2.0, 3.0), vec(3.0, 2.0));
        assert_close(e.scale(), 2f64.sqrt());
        assert_close(e.center().x(), 1.5);
        assert_close(e.center().y(), 1.5);
        assert_close(e.a(), 1.25);
        assert_close(e.b(), -0.75);
        assert_close(e.d(), 1.25);
        let (ef, zf) = e.exponent_format();
        assert_close(&ef, 1.25);
        assert_close(&zf, 0.0);
        // det D = 1
        let det = e.a().clone() * e.d() - e.b().clone() * e.b();
        assert_close(&det, 1.0);
        let bbox = e.bbox();
        let half = 10f64.sqrt() / 2.0;
        assert_close(&bbox.x_min, 1.5 - half);
        assert_close(&bbox.x_max, 1.5 + half);
        assert_close(&bbox.y_min, 1.5 - half);
        assert_close(&bbox.y_max, 1.5 + half);
    }

    #[test]
    fn test_from_rectangle_anticlockwise() {
        let e = Ellipse::from_rectangle(vec(0.0, 1.0), vec(1.0, 0.0), vec(3.0, 2.0), vec(2.0, 3.0));
        assert_close(e.scale(), 2f64.sqrt());
        assert_close(e.a(), 1.25);
        assert_close(e.b(), -0.75);
        assert_close(e.d(), 1.25);
    }

    #[test]
    fn test_from_circle() {
        let e = Ellipse::from_circle(vec(1.0, -5.0), Real::try_from(10.0).unwrap());
        assert_close(e.scale(), 10.0);
        assert_close(e.a(), 1.0);
        assert_close(e.b(), 0.0);
        assert_close(e.d(), 1.0);
        let bbox = e.bbox();
        assert_close(&bbox.x_min, -9.0);
        assert_close(&bbox.x_max, 11.0);
        assert_close(&bbox.y_min, -15.0);
        assert_close(&bbox.y_max, -5.0);
    }

    #[test]
    fn test_exponent_format_roundtrip() {
        let a = Real::try_from(0.37).unwrap();
        let d = real_from_i64(1) / &a;
        let (e, z) = to_exponent_format(&a, &d);
        let (a2, d2) = to_normal_format(&e, &z);
        assert!(abs_real(a2 - &a) < EPSILON.clone() * real_from_i64(1000));
        assert!(abs_real(d2 - &d) < EPSILON.clone() * real_from_i64(1000));
    }

    #[test]
    fn test_bbox_rescale_negative() {
        let mut bb = BBox {
            x_min: real_from_i64(-1),
            x_max: real_from_i64(2),
            y_min: real_from_i64(0),
            y_max: real_from_i64(3),
        };
        bb.rescale(&real_from_i64(-2));
        assert_close(&bb.x_min, -4.0);
        assert_close(&bb.x_max, 2.0);
        assert_close(&bb.y_min, -6.0);
        assert_close(&bb.y_max, 0.0);
        assert_close(&bb.x_width(), 6.0);
    }
}
