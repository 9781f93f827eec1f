/*
 * Copyright (c) 2023, Tobias Müller <git@tsmr.eu>
 *
 */

use ibig::{ibig, IBig};
use rand_core::TryCryptoRng;

use crate::rand::{self, OsRng};
use crate::utils::{bytes, error::EcError};

use super::{math, PrivateKey, PublicKey, Signature};

/// Interprets a digest as an integer. Digests wider than `n` keep only
/// their leftmost `bit_len(n)` bits.
pub fn hash_to_integer(digest: &[u8], n: &IBig) -> IBig {
    let h = bytes::to_ibig_be(digest);
    let digest_bits = digest.len() * 8;
    let order_bits = math::bit_len(n);
    if digest_bits > order_bits {
        h >> (digest_bits - order_bits)
    } else {
        h
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignOptions {
    /// Number of nonces drawn before giving up.
    pub max_attempts: u32,
    /// Replace `s` by `n - s` when `s > n / 2`.
    pub low_s: bool,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            max_attempts: 64,
            low_s: false,
        }
    }
}

/// An ECDSA signer owning its source of nonces.
pub struct Ecdsa<R> {
    rng: R,
    options: SignOptions,
}

impl Ecdsa<OsRng> {
    /// Signs with nonces from the operating system.
    pub fn os() -> Self {
        Self::with_rng(OsRng)
    }
}

impl<R: TryCryptoRng> Ecdsa<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            options: SignOptions::default(),
        }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.options.max_attempts = attempts;
        self
    }

    pub fn low_s(mut self, enabled: bool) -> Self {
        self.options.low_s = enabled;
        self
    }

    pub fn sign<H>(
        &mut self,
        privkey: &PrivateKey<'_>,
        message: &[u8],
        hash: H,
    ) -> Result<Signature, EcError>
    where
        H: Fn(&[u8]) -> Vec<u8>,
    {
        sign_digest(&mut self.rng, &self.options, privkey, &hash(message))
    }
}

/// Signs an already hashed message.
///
/// Every attempt draws a fresh nonce `k`, an attempt is discarded when it
/// yields `r = 0` or `s = 0`.
pub(crate) fn sign_digest<R>(
    rng: &mut R,
    options: &SignOptions,
    privkey: &PrivateKey<'_>,
    digest: &[u8],
) -> Result<Signature, EcError>
where
    R: TryCryptoRng + ?Sized,
{
    let curve = privkey.curve();
    if !curve.has_prime_order() {
        return Err(EcError::InvalidCurve("group order is not prime"));
    }
    let n = curve.n();
    let d = privkey.secret();
    let msg = hash_to_integer(digest, n);
    let g = curve.generator();

    for attempt in 1..=options.max_attempts {
        // 1. Select a cryptographically secure random number in [1, n - 1]
        let k = rand::random_scalar(rng, n)?;

        // 2. k * G
        let p = g.multiply(&k)?;
        let x = p
            .x()
            .ok_or(EcError::Internal("nonce multiple is the point at infinity"))?;

        // 3. r = p.x mod n, if r == 0, again
        let r = math::rem_euclid(x, n);
        if r == ibig!(0) {
            log::debug!("ecdsa: attempt {attempt} gave r = 0, drawing a new nonce");
            continue;
        }

        // 4. s = ( (msg + r * d) * inv(k) ) mod n, if s == 0, again
        let k_inv = math::inv(&k, n).ok_or(EcError::Internal("nonce not invertible modulo n"))?;
        let s = math::rem_euclid(&((&msg + &r * d) * k_inv), n);
        if s == ibig!(0) {
            log::debug!("ecdsa: attempt {attempt} gave s = 0, drawing a new nonce");
            continue;
        }

        let sign = Signature::new(r, s);
        return Ok(if options.low_s {
            sign.normalize_s(curve)
        } else {
            sign
        });
    }

    log::error!(
        "ecdsa: no usable nonce after {} attempts",
        options.max_attempts
    );
    Err(EcError::Internal("nonce attempts exhausted"))
}

/// Verifies `sign` over `message`. Both `s` and `n - s` are accepted.
///
/// Never fails loudly: any malformed key or signature simply does not verify.
pub fn verify<H>(pubkey: &PublicKey<'_>, sign: &Signature, message: &[u8], hash: H) -> bool
where
    H: Fn(&[u8]) -> Vec<u8>,
{
    match check(pubkey, sign, &hash(message)) {
        Ok(valid) => valid,
        Err(e) => {
            log::debug!("ecdsa: verification aborted: {e}");
            false
        }
    }
}

/// Like [`verify`], but additionally rejects signatures with `s > n / 2`.
pub fn verify_strict<H>(pubkey: &PublicKey<'_>, sign: &Signature, message: &[u8], hash: H) -> bool
where
    H: Fn(&[u8]) -> Vec<u8>,
{
    if !sign.is_low_s(pubkey.curve()) {
        log::debug!("ecdsa: rejecting high s");
        return false;
    }
    verify(pubkey, sign, message, hash)
}

fn check(pubkey: &PublicKey<'_>, sign: &Signature, digest: &[u8]) -> Result<bool, EcError> {
    let curve = pubkey.curve();
    let n = curve.n();
    let e = pubkey.point();

    // Check Public Key
    if e.is_identity() || !e.on_curve() {
        log::debug!("ecdsa: public key is infinity or not on curve");
        return Ok(false);
    }
    if !e.multiply(n)?.is_identity() {
        log::debug!("ecdsa: n * public key is not infinity");
        return Ok(false);
    }

    // Check Signature
    let one = ibig!(1);
    if sign.r() < &one || sign.r() >= n || sign.s() < &one || sign.s() >= n {
        log::debug!("ecdsa: r or s out of range");
        return Ok(false);
    }

    let z = hash_to_integer(digest, n);
    let w = match math::inv(sign.s(), n) {
        Some(w) => w,
        None => return Ok(false),
    };
    let u1 = math::rem_euclid(&(z * &w), n);
    let u2 = math::rem_euclid(&(sign.r() * &w), n);

    let res = curve.generator().multiply(&u1)?.add(&e.multiply(&u2)?)?;
    let x = match res.x() {
        Some(x) => math::rem_euclid(x, n),
        None => {
            log::debug!("ecdsa: u1 * G + u2 * E is infinity");
            return Ok(false);
        }
    };

    Ok(x == *sign.r())
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use ibig::{ibig, IBig};
    use rand_core::{TryCryptoRng, TryRngCore};

    use super::{hash_to_integer, verify, verify_strict, Ecdsa};
    use crate::crypto::ellipticcurve::{Curve, PrivateKey, Signature};
    use crate::hash::{sha256, sha384, sha512};
    use crate::rand::testing::ReplayRng;
    use crate::utils::{bytes, error::EcError};

    const MESSAGE: &[u8] = b"Message for ECDSA signing";

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // https://learnmeabitcoin.com/technical/cryptography/elliptic-curve/ecdsa/
    fn vector_key() -> PrivateKey<'static> {
        PrivateKey::new(
            Curve::secp256k1(),
            ibig!(_d9a4b9a99984eadea545b42efe7cd1eb101d2e55b30d35eb7a79fc216c087c57 base 16),
        )
        .unwrap()
    }

    fn vector_r() -> IBig {
        ibig!(_89383775124345383949639009137714586387472647985584917903906909455303659871882 base 10)
    }

    fn vector_s_low() -> IBig {
        ibig!(_7439227374782059477889960317890800744771556402344980569214821196768403835101 base 10)
    }

    fn vector_s_high() -> IBig {
        ibig!(_108352861862534135945681024690797107108066007876729923813390341944749757659236 base 10)
    }

    // the nonce is drawn from [0, n - 2] and incremented
    fn vector_nonce() -> ReplayRng {
        ReplayRng::new(
            bytes::from_hex("93001ea19e5261a5b00428ec478d49d11df2e0b1ac5378e507e3c6c1359e0723")
                .unwrap(),
        )
    }

    // y^2 = x^3 + 2x + 25 over F_1009 has prime order 991, 1 * (0, 5) has r = 0
    fn toy_curve() -> Curve {
        Curve::new("toy1009", ibig!(1009), ibig!(2), ibig!(25), (ibig!(0), ibig!(5)), ibig!(991))
            .unwrap()
    }

    struct BrokenRng;

    impl TryRngCore for BrokenRng {
        type Error = std::io::Error;

        fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
            Err(std::io::Error::new(ErrorKind::Other, "entropy source unavailable"))
        }
        fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
            Err(std::io::Error::new(ErrorKind::Other, "entropy source unavailable"))
        }
        fn try_fill_bytes(&mut self, _dst: &mut [u8]) -> Result<(), Self::Error> {
            Err(std::io::Error::new(ErrorKind::Other, "entropy source unavailable"))
        }
    }

    impl TryCryptoRng for BrokenRng {}

    #[test]
    fn test_hash_to_integer() {
        let n = ibig!(255);
        assert_eq!(hash_to_integer(&[0x12, 0x34], &n), ibig!(18));
        assert_eq!(hash_to_integer(&[0x12], &n), ibig!(18));
        // 9 bits of order keep the top 9 bits of the digest
        assert_eq!(hash_to_integer(&[0xff, 0x80], &ibig!(256)), ibig!(511));

        let curve = Curve::secp256k1();
        assert_eq!(
            hash_to_integer(&sha256(MESSAGE), curve.n()),
            ibig!(_de2d515297cad600f0365ef2be0f6d7e2ea3e757c7a9c8b3cdf49d8483670b1c base 16)
        );
        let long = sha512(MESSAGE);
        assert_eq!(
            hash_to_integer(&long, curve.n()),
            bytes::to_ibig_be(&long[..32])
        );
    }

    #[test]
    fn test_sign_vector() {
        init_logger();
        let privkey = vector_key();
        let mut ecdsa = Ecdsa::with_rng(vector_nonce());
        let sign = ecdsa.sign(&privkey, MESSAGE, sha256).unwrap();

        assert_eq!(sign.r(), &vector_r());
        assert!(*sign.s() == vector_s_low() || *sign.s() == vector_s_high());
    }

    #[test]
    fn test_sign_vector_low_s() {
        let privkey = vector_key();
        let mut ecdsa = Ecdsa::with_rng(vector_nonce()).low_s(true);
        let sign = ecdsa.sign(&privkey, MESSAGE, sha256).unwrap();
        assert_eq!(sign, Signature::new(vector_r(), vector_s_low()));
    }

    #[test]
    fn test_verify_vector() {
        let pubkey = vector_key().public_key().unwrap();
        assert!(verify(&pubkey, &Signature::new(vector_r(), vector_s_low()), MESSAGE, sha256));
        assert!(verify(&pubkey, &Signature::new(vector_r(), vector_s_high()), MESSAGE, sha256));
    }

    #[test]
    fn test_verify_strict() {
        let pubkey = vector_key().public_key().unwrap();
        let low = Signature::new(vector_r(), vector_s_low());
        let high = Signature::new(vector_r(), vector_s_high());
        assert!(verify_strict(&pubkey, &low, MESSAGE, sha256));
        assert!(!verify_strict(&pubkey, &high, MESSAGE, sha256));
    }

    #[test]
    fn test_sign_and_verify() {
        init_logger();
        let hashes: [fn(&[u8]) -> Vec<u8>; 3] = [sha256, sha384, sha512];
        for curve in [Curve::secp256r1(), Curve::secp256k1()] {
            let privkey = PrivateKey::generate(curve).unwrap();
            let pubkey = privkey.public_key().unwrap();
            let mut ecdsa = Ecdsa::os();
            for hash in hashes {
                let sign = ecdsa.sign(&privkey, MESSAGE, hash).unwrap();
                assert!(verify(&pubkey, &sign, MESSAGE, hash));
            }
        }
    }

    #[test]
    fn test_sign_with_any_hash() {
        // the message itself is the "digest", long enough to be truncated
        let identity = |m: &[u8]| m.to_vec();
        let privkey = PrivateKey::generate(Curve::secp256r1()).unwrap();
        let pubkey = privkey.public_key().unwrap();
        let message = [0xa5u8; 40];
        let sign = Ecdsa::os().sign(&privkey, &message, identity).unwrap();
        assert!(verify(&pubkey, &sign, &message, identity));
    }

    #[test]
    fn test_tampering() {
        let privkey = PrivateKey::generate(Curve::secp256k1()).unwrap();
        let pubkey = privkey.public_key().unwrap();
        let sign = Ecdsa::os().sign(&privkey, MESSAGE, sha256).unwrap();
        assert!(verify(&pubkey, &sign, MESSAGE, sha256));

        let mut message = MESSAGE.to_vec();
        message[3] ^= 0x01;
        assert!(!verify(&pubkey, &sign, &message, sha256));

        let (r, s) = sign.clone().into_parts();
        let tampered_r = Signature::new(&r + ibig!(1), s.clone());
        assert!(!verify(&pubkey, &tampered_r, MESSAGE, sha256));
        let tampered_s = Signature::new(r, &s + ibig!(4));
        assert!(!verify(&pubkey, &tampered_s, MESSAGE, sha256));

        // a different hash function is a different message
        assert!(!verify(&pubkey, &sign, MESSAGE, sha384));

        let other = PrivateKey::generate(Curve::secp256k1()).unwrap();
        assert!(!verify(&other.public_key().unwrap(), &sign, MESSAGE, sha256));
    }

    #[test]
    fn test_verify_rejects_out_of_range() {
        let curve = Curve::secp256k1();
        let pubkey = vector_key().public_key().unwrap();
        let n = curve.n().clone();
        for (r, s) in [
            (ibig!(0), vector_s_low()),
            (vector_r(), ibig!(0)),
            (n.clone(), vector_s_low()),
            (vector_r(), n.clone()),
            (vector_r() + &n, vector_s_low()),
            (vector_r(), vector_s_low() + &n),
            (-vector_r(), vector_s_low()),
        ] {
            assert!(!verify(&pubkey, &Signature::new(r, s), MESSAGE, sha256));
        }
    }

    #[test]
    fn test_retry_on_zero_r() {
        init_logger();
        let curve = toy_curve();
        let privkey = PrivateKey::new(&curve, ibig!(7)).unwrap();
        // k = 1 gives r = 0, k = 2 gives r = 444
        let mut ecdsa = Ecdsa::with_rng(ReplayRng::new(vec![0x00, 0x00, 0x00, 0x01]));
        let sign = ecdsa.sign(&privkey, b"retry", sha256).unwrap();
        assert_eq!(sign, Signature::new(ibig!(444), ibig!(576)));

        let pubkey = privkey.public_key().unwrap();
        assert!(verify(&pubkey, &sign, b"retry", sha256));
    }

    #[test]
    fn test_retry_on_zero_s() {
        init_logger();
        let curve = toy_curve();
        let privkey = PrivateKey::new(&curve, ibig!(7)).unwrap();
        let digest = |m: &[u8]| m.to_vec();
        // k = 2 gives r = 444 and s = 0, k = 3 gives (42, 53)
        let mut ecdsa = Ecdsa::with_rng(ReplayRng::new(vec![0x00, 0x01, 0x00, 0x02]));
        let sign = ecdsa.sign(&privkey, &[0xd6, 0x00], digest).unwrap();
        assert_eq!(sign, Signature::new(ibig!(42), ibig!(53)));

        let pubkey = privkey.public_key().unwrap();
        assert!(verify(&pubkey, &sign, &[0xd6, 0x00], digest));
    }

    #[test]
    fn test_sign_needs_prime_order() {
        // y^2 = x^3 + 7 over F_17, (15, 13) has order 18
        let curve =
            Curve::new("toy17", ibig!(17), ibig!(0), ibig!(7), (ibig!(15), ibig!(13)), ibig!(18))
                .unwrap();
        let privkey = PrivateKey::new(&curve, ibig!(5)).unwrap();
        let err = Ecdsa::os().sign(&privkey, MESSAGE, sha256).unwrap_err();
        assert_eq!(err, EcError::InvalidCurve("group order is not prime"));
        assert!(!err.is_internal());
    }

    #[test]
    fn test_attempts_exhausted() {
        let curve = toy_curve();
        let privkey = PrivateKey::new(&curve, ibig!(7)).unwrap();
        // always k = 1
        let mut ecdsa = Ecdsa::with_rng(ReplayRng::new(vec![0x00])).max_attempts(5);
        let err = ecdsa.sign(&privkey, b"retry", sha256).unwrap_err();
        assert!(err.is_internal());

        let mut ecdsa = Ecdsa::os().max_attempts(0);
        assert_eq!(
            ecdsa.sign(&vector_key(), MESSAGE, sha256),
            Err(EcError::Internal("nonce attempts exhausted"))
        );
    }

    #[test]
    fn test_rng_failure() {
        let mut ecdsa = Ecdsa::with_rng(BrokenRng);
        let err = ecdsa.sign(&vector_key(), MESSAGE, sha256).unwrap_err();
        assert_eq!(err, EcError::Rng("entropy source unavailable".to_string()));
    }

    #[test]
    fn test_fresh_nonce_per_signature() {
        let privkey = vector_key();
        let mut ecdsa = Ecdsa::os();
        let a = ecdsa.sign(&privkey, MESSAGE, sha256).unwrap();
        let b = ecdsa.sign(&privkey, MESSAGE, sha256).unwrap();
        assert_ne!(a.r(), b.r());
    }
}
