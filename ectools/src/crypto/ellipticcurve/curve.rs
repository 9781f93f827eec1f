/*
 * Copyright (c) 2023, Tobias Müller <git@tsmr.eu>
 *
 */

use ibig::{ibig, IBig};
use once_cell::sync::Lazy;

use super::{math, Point};
use crate::utils::error::EcError;

/// A short Weierstrass curve `y^2 = x^3 + ax + b` over the prime field `p`
/// together with a generator `g` of prime order `n`.
///
/// Curves are immutable. The named ones live in a process-wide registry and
/// are handed out as `&'static Curve`, points and keys only borrow them.
#[derive(Clone, Debug)]
pub struct Curve {
    name: String,
    p: IBig,  // finite field
    a: IBig,  // used in equation
    b: IBig,  // used in equation
    gx: IBig, // base point
    gy: IBig,
    n: IBig, // order of the base point
    prime_order: bool,
}

struct Entry {
    names: &'static [&'static str],
    curve: Curve,
}

static REGISTRY: Lazy<Vec<Entry>> = Lazy::new(|| {
    vec![
        Entry {
            names: &["prime256v1", "secp256r1", "P-256"],
            curve: prime256v1(),
        },
        Entry {
            names: &["secp256k1"],
            curve: secp256k1(),
        },
    ]
});

// https://neuromancer.sk/std/x962/prime256v1
fn prime256v1() -> Curve {
    Curve {
        name: "prime256v1".to_string(),
        p: ibig!(_ffffffff00000001000000000000000000000000ffffffffffffffffffffffff base 16),
        a: ibig!(_ffffffff00000001000000000000000000000000fffffffffffffffffffffffc base 16),
        b: ibig!(_5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b base 16),
        gx: ibig!(_6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296 base 16),
        gy: ibig!(_4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5 base 16),
        n: ibig!(_ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551 base 16),
        prime_order: true,
    }
}

// https://neuromancer.sk/std/secg/secp256k1
fn secp256k1() -> Curve {
    Curve {
        name: "secp256k1".to_string(),
        p: ibig!(_fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f base 16),
        a: ibig!(0),
        b: ibig!(7),
        gx: ibig!(_79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798 base 16),
        gy: ibig!(_483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8 base 16),
        n: ibig!(_fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141 base 16),
        prime_order: true,
    }
}

impl Curve {
    /// Looks up a named curve in the registry. Aliases such as `secp256r1`
    /// resolve to the same instance as their canonical name.
    pub fn by_name(name: &str) -> Result<&'static Curve, EcError> {
        REGISTRY
            .iter()
            .find(|e| e.names.iter().any(|n| *n == name))
            .map(|e| &e.curve)
            .ok_or_else(|| EcError::UnsupportedCurve(name.to_string()))
    }

    /// Canonical names of all registered curves.
    pub fn supported() -> impl Iterator<Item = &'static str> {
        REGISTRY.iter().map(|e| e.names[0])
    }

    pub fn secp256r1() -> &'static Curve {
        &REGISTRY[0].curve
    }

    pub fn secp256k1() -> &'static Curve {
        &REGISTRY[1].curve
    }

    /// Builds and validates an ad-hoc curve.
    ///
    /// `p` must be prime, the curve non-singular, the generator on it and
    /// `n` the exact order of the generator. A composite `n` is accepted for
    /// group arithmetic, signing requires a prime order.
    pub fn new(
        name: impl Into<String>,
        p: IBig,
        a: IBig,
        b: IBig,
        g: (IBig, IBig),
        n: IBig,
    ) -> Result<Curve, EcError> {
        if p <= ibig!(3) {
            return Err(EcError::InvalidCurve("field modulus too small"));
        }
        if !math::is_probable_prime(&p) {
            return Err(EcError::InvalidCurve("field modulus is not prime"));
        }
        if n <= ibig!(1) {
            return Err(EcError::InvalidCurve("order too small"));
        }
        let curve = Curve {
            name: name.into(),
            a: math::rem_euclid(&a, &p),
            b: math::rem_euclid(&b, &p),
            p,
            gx: g.0,
            gy: g.1,
            prime_order: math::is_probable_prime(&n),
            n,
        };
        if curve.is_singular() {
            return Err(EcError::InvalidCurve("singular curve"));
        }
        if !curve.contains(&curve.gx, &curve.gy) {
            return Err(EcError::InvalidCurve("generator not on curve"));
        }
        curve.check_order()?;
        Ok(curve)
    }

    /// `n * g = O` and `(n / q) * g != O` for every prime factor `q` of `n`.
    fn check_order(&self) -> Result<(), EcError> {
        let g = self.generator();
        let times = |k: &IBig| {
            g.multiply(k)
                .map_err(|_| EcError::InvalidCurve("group law failed on the generator"))
        };
        if !times(&self.n)?.is_identity() {
            return Err(EcError::InvalidCurve("n * g is not the point at infinity"));
        }
        let factors = math::prime_factors(&self.n)
            .ok_or(EcError::InvalidCurve("order cannot be factored"))?;
        for q in factors {
            if times(&(&self.n / &q))?.is_identity() {
                return Err(EcError::InvalidCurve("n is not the order of g"));
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn p(&self) -> &IBig {
        &self.p
    }
    pub fn a(&self) -> &IBig {
        &self.a
    }
    pub fn b(&self) -> &IBig {
        &self.b
    }
    pub fn n(&self) -> &IBig {
        &self.n
    }

    /// Whether `n` is prime, which ECDSA needs to invert nonces.
    pub fn has_prime_order(&self) -> bool {
        self.prime_order
    }

    pub fn generator(&self) -> Point<'_> {
        Point::from_trusted(self, self.gx.clone(), self.gy.clone())
    }

    pub fn identity(&self) -> Point<'_> {
        Point::identity(self)
    }

    /// Bit length of the group order, used to truncate message digests.
    pub fn order_bits(&self) -> usize {
        math::bit_len(&self.n)
    }

    /// `4a^3 + 27b^2 mod p`
    pub fn discriminant(&self) -> IBig {
        let v = ibig!(4) * self.a.pow(3) + ibig!(27) * self.b.pow(2);
        math::rem_euclid(&v, &self.p)
    }

    pub fn is_singular(&self) -> bool {
        self.discriminant() == ibig!(0)
    }

    /// Verify if the point (x, y) is on the curve.
    ///
    /// ```ignore
    /// # use ectools::Curve;
    /// # use ibig::ibig;
    /// let curve = Curve::secp256r1();
    /// assert_eq!(curve.contains(&ibig!(10), &ibig!(10)), false);
    /// ```
    pub fn contains(&self, x: &IBig, y: &IBig) -> bool {
        let zero = ibig!(0);
        if *x < zero || *y < zero || *x >= self.p || *y >= self.p {
            return false;
        }
        let left = math::rem_euclid(&y.pow(2), &self.p);
        let right = math::rem_euclid(&(x.pow(3) + &self.a * x + &self.b), &self.p);
        left == right
    }
}

/// Curves compare by their parameters, the name is not part of the identity.
impl PartialEq for Curve {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
            || (self.p == other.p
                && self.a == other.a
                && self.b == other.b
                && self.gx == other.gx
                && self.gy == other.gy
                && self.n == other.n)
    }
}

impl Eq for Curve {}
