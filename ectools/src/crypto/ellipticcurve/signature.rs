/*
 * Copyright (c) 2023, Tobias Müller <git@tsmr.eu>
 *
 */

use ibig::IBig;

use super::Curve;

/// A raw ECDSA signature `(r, s)`.
///
/// Encoding it into a container format (DER, fixed-width bytes, ...) is left
/// to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    r: IBig,
    s: IBig,
}

impl Signature {
    pub fn new(r: IBig, s: IBig) -> Self {
        Self { r, s }
    }

    pub fn r(&self) -> &IBig {
        &self.r
    }

    pub fn s(&self) -> &IBig {
        &self.s
    }

    pub fn into_parts(self) -> (IBig, IBig) {
        (self.r, self.s)
    }

    /// `s <= n / 2`
    pub fn is_low_s(&self, curve: &Curve) -> bool {
        self.s <= curve.n() >> 1
    }

    /// Both `(r, s)` and `(r, n - s)` verify for the same message and key.
    /// This returns the variant with the smaller `s`.
    pub fn normalize_s(self, curve: &Curve) -> Self {
        if self.is_low_s(curve) {
            self
        } else {
            Self {
                s: curve.n() - self.s,
                r: self.r,
            }
        }
    }
}
