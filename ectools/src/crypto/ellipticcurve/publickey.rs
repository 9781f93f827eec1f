/*
 * Copyright (c) 2023, Tobias Müller <git@tsmr.eu>
 *
 */

use ibig::IBig;

use super::{ecdsa, Curve, Point, PrivateKey, Signature};
use crate::utils::error::EcError;

/// A point `E` of the group generated by the curve's base point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey<'c> {
    point: Point<'c>,
}

impl<'c> PublicKey<'c> {
    /// Accepts `point` only if it is a finite point on the curve and
    /// `n * point` is the point at infinity.
    pub fn new(point: Point<'c>) -> Result<Self, EcError> {
        if point.is_identity() {
            return Err(EcError::InvalidPublicKey("point at infinity"));
        }
        if !point.on_curve() {
            return Err(EcError::PointNotOnCurve);
        }
        if !point.multiply(point.curve().n())?.is_identity() {
            return Err(EcError::InvalidPublicKey("point not in the group generated by g"));
        }
        Ok(Self { point })
    }

    /// `point` is `d * G` for a valid scalar `d`, so it is already in the group.
    pub(crate) fn derived(point: Point<'c>) -> Result<Self, EcError> {
        if point.is_identity() {
            return Err(EcError::Internal("d * g is the point at infinity"));
        }
        Ok(Self { point })
    }

    pub fn point(&self) -> &Point<'c> {
        &self.point
    }

    pub fn curve(&self) -> &'c Curve {
        self.point.curve()
    }

    /// Checks `E == d * G`.
    pub fn matches(&self, privkey: &PrivateKey<'_>) -> bool {
        matches!(privkey.public_key(), Ok(pubkey) if pubkey.point == self.point)
    }

    pub fn verify<H>(&self, sign: &Signature, message: &[u8], hash: H) -> bool
    where
        H: Fn(&[u8]) -> Vec<u8>,
    {
        ecdsa::verify(self, sign, message, hash)
    }
}

impl PublicKey<'static> {
    /// Builds the key `(x, y)` on the registered curve called `curve`.
    pub fn from_coordinates(curve: &str, x: IBig, y: IBig) -> Result<Self, EcError> {
        let curve = Curve::by_name(curve)?;
        Self::new(Point::new(curve, x, y)?)
    }
}
