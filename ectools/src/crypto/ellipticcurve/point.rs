/*
 * Copyright (c) 2023, Tobias Müller <git@tsmr.eu>
 *
 */

use std::fmt;

use ibig::{ibig, IBig};

use super::{math, Curve};
use crate::utils::error::EcError;

/// An affine point on `curve`, or the point at infinity.
///
/// Every operation returns a new point, operands are never modified.
#[derive(Clone, Debug)]
pub struct Point<'c> {
    curve: &'c Curve,
    // None is the point at infinity
    coords: Option<(IBig, IBig)>,
}

impl<'c> Point<'c> {
    /// Creates the point (x, y), failing if it is not on the curve.
    pub fn new(curve: &'c Curve, x: IBig, y: IBig) -> Result<Self, EcError> {
        if !curve.contains(&x, &y) {
            return Err(EcError::PointNotOnCurve);
        }
        Ok(Self::from_trusted(curve, x, y))
    }

    pub(crate) fn from_trusted(curve: &'c Curve, x: IBig, y: IBig) -> Self {
        Self {
            curve,
            coords: Some((x, y)),
        }
    }

    pub fn identity(curve: &'c Curve) -> Self {
        Self {
            curve,
            coords: None,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.coords.is_none()
    }

    pub fn curve(&self) -> &'c Curve {
        self.curve
    }

    pub fn x(&self) -> Option<&IBig> {
        self.coords.as_ref().map(|(x, _)| x)
    }

    pub fn y(&self) -> Option<&IBig> {
        self.coords.as_ref().map(|(_, y)| y)
    }

    pub fn on_curve(&self) -> bool {
        match &self.coords {
            None => true,
            Some((x, y)) => self.curve.contains(x, y),
        }
    }

    pub fn equals(&self, other: &Point) -> bool {
        if self.curve != other.curve {
            return false;
        }
        self.coords == other.coords
    }

    /// Checks whether `other` is `-self`. Both points must be on the same curve.
    pub fn is_negation(&self, other: &Point<'c>) -> Result<bool, EcError> {
        self.same_curve(other)?;
        Ok(match (&self.coords, &other.coords) {
            (None, None) => true,
            (Some((x1, y1)), Some((x2, y2))) => {
                x1 == x2 && math::rem_euclid(&(y1 + y2), self.curve.p()) == ibig!(0)
            }
            _ => false,
        })
    }

    pub fn negate(&self) -> Result<Point<'c>, EcError> {
        let (x, y) = match &self.coords {
            None => return Ok(Point::identity(self.curve)),
            Some(c) => c,
        };
        let y = math::rem_euclid(&-y, self.curve.p());
        Point::from_trusted(self.curve, x.clone(), y).checked("negated point not on curve")
    }

    pub fn add(&self, other: &Point<'c>) -> Result<Point<'c>, EcError> {
        self.same_curve(other)?;

        let ((x1, y1), (x2, y2)) = match (&self.coords, &other.coords) {
            (None, _) => return Ok(other.clone()),
            (_, None) => return Ok(self.clone()),
            (Some(a), Some(b)) => (a, b),
        };

        if self.equals(other) {
            return self.double();
        }
        if self.is_negation(other)? {
            return Ok(Point::identity(self.curve));
        }
        // Two distinct points on the curve sharing x are always negations
        if x1 == x2 {
            log::error!("add: points share x but are not negations: {self} + {other}");
            return Err(EcError::Internal("points with same x but not negations"));
        }

        let p = self.curve.p();
        let denominator = math::inv(&(x2 - x1), p)
            .ok_or(EcError::Internal("x2 - x1 has no inverse modulo p"))?;
        let lambda = math::rem_euclid(&((y2 - y1) * denominator), p);

        let x = math::rem_euclid(&(lambda.pow(2) - x1 - x2), p);
        let y = math::rem_euclid(&(&lambda * (x1 - &x) - y1), p);

        Point::from_trusted(self.curve, x, y).checked("added point not on curve")
    }

    pub fn double(&self) -> Result<Point<'c>, EcError> {
        let (x, y) = match &self.coords {
            None => return Ok(Point::identity(self.curve)),
            Some(c) => c,
        };
        // the tangent is vertical, (x, 0) has order two
        if *y == ibig!(0) {
            return Ok(Point::identity(self.curve));
        }

        let p = self.curve.p();
        let left = ibig!(3) * x.pow(2) + self.curve.a();
        let right = math::inv(&(ibig!(2) * y), p)
            .ok_or(EcError::Internal("2y has no inverse modulo p"))?;
        let lambda = math::rem_euclid(&(left * right), p);

        let nx = math::rem_euclid(&(lambda.pow(2) - ibig!(2) * x), p);
        let ny = math::rem_euclid(&(&lambda * (x - &nx) - y), p);

        Point::from_trusted(self.curve, nx, ny).checked("doubled point not on curve")
    }

    /// Scalar multiplication `k * self`.
    ///
    /// The multiples `2^i * self` with `2^i <= k` are computed once, then
    /// the largest cached multiple that still fits into the remaining
    /// scalar is added until `k` is reached.
    ///
    /// `0 * P` is the point at infinity and `-k * P` is `k * (-P)`.
    pub fn multiply(&self, k: &IBig) -> Result<Point<'c>, EcError> {
        if self.is_identity() || *k == ibig!(0) {
            return Ok(Point::identity(self.curve));
        }
        if *k < ibig!(0) {
            return self.negate()?.multiply(&-k);
        }

        let mut cache = vec![(ibig!(1), self.clone())];
        let mut power = ibig!(2);
        let mut q = self.clone();
        while power <= *k {
            q = q.double()?;
            cache.push((power.clone(), q.clone()));
            power = &power << 1;
        }
        log::trace!("multiply: cached {} multiples", cache.len());

        let mut remaining = k.clone();
        let mut result = Point::identity(self.curve);
        for (factor, multiple) in cache.iter().rev() {
            if *factor <= remaining {
                result = result.add(multiple)?;
                remaining -= factor;
            }
        }
        if remaining != ibig!(0) {
            return Err(EcError::Internal("scalar not fully decomposed"));
        }

        result.checked("multiplied point not on curve")
    }

    fn same_curve(&self, other: &Point) -> Result<(), EcError> {
        if self.curve == other.curve {
            Ok(())
        } else {
            Err(EcError::CurveMismatch)
        }
    }

    fn checked(self, what: &'static str) -> Result<Self, EcError> {
        if self.on_curve() {
            Ok(self)
        } else {
            log::error!("{what}: {self} on {}", self.curve.name());
            Err(EcError::Internal(what))
        }
    }
}

impl PartialEq for Point<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for Point<'_> {}

impl fmt::Display for Point<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.coords {
            None => write!(f, "Infinity"),
            Some((x, y)) => write!(f, "({x}, {y})"),
        }
    }
}
