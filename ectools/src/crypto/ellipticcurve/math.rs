/*
 * Copyright (c) 2023, Tobias Müller <git@tsmr.eu>
 *
 */

use ibig::{ibig, IBig, UBig};

/// Calculates the modular inverse of `x` with respect to `n` using the Extended Euclidean Algorithm.
/// Returns `None` if `x` and `n` are not coprime (this includes `x ≡ 0`).
///
/// ```ignore
/// # use ibig::{ibig, IBig};
/// # use ectools::crypto::ellipticcurve::math::inv;
/// let x = ibig!(5);
/// let n = ibig!(11);
///
/// assert_eq!(inv(&x, &n), Some(ibig!(9)));
/// ```
pub fn inv(x: &IBig, n: &IBig) -> Option<IBig> {
    let mut low = rem_euclid(x, n);
    if low == ibig!(0) {
        return None;
    }

    let mut lm = ibig!(1);
    let mut hm = ibig!(0);
    let mut high = n.clone();

    while low > ibig!(1) {
        let r = &high / &low;
        let nm = &hm - &lm * &r;
        let nw = &high - &low * &r;
        high = low;
        hm = lm;
        low = nw;
        lm = nm;
    }

    // gcd(x, n) > 1
    if low == ibig!(0) {
        return None;
    }

    Some(rem_euclid(&lm, n))
}

/// Calculates the modulus, always returning a value in `[0, |v|)`.
///
/// ```ignore
/// # use ibig::{ibig, IBig};
/// # use ectools::crypto::ellipticcurve::math::rem_euclid;
/// assert_eq!(rem_euclid(&ibig!(12), &ibig!(11)), ibig!(1));
/// assert_eq!(rem_euclid(&ibig!(-1), &ibig!(11)), ibig!(10));
/// ```
pub fn rem_euclid(x: &IBig, v: &IBig) -> IBig {
    let r = x % v;
    if r < ibig!(0) {
        if *v < ibig!(0) {
            r - v
        } else {
            r + v
        }
    } else {
        r
    }
}

/// Number of significant bits of a non-negative integer, `0` for zero and negative values.
pub fn bit_len(x: &IBig) -> usize {
    match <UBig as TryFrom<IBig>>::try_from(x.clone()) {
        Ok(x) => x.bit_len(),
        Err(_) => 0,
    }
}

/// `base^exp mod m` by square-and-multiply, `exp` must be non-negative.
pub fn pow_mod(base: &IBig, exp: &IBig, m: &IBig) -> IBig {
    let two = ibig!(2);
    let mut result = ibig!(1);
    let mut b = rem_euclid(base, m);
    let mut e = exp.clone();
    while e > ibig!(0) {
        if rem_euclid(&e, &two) == ibig!(1) {
            result = rem_euclid(&(&result * &b), m);
        }
        b = rem_euclid(&(&b * &b), m);
        e = e >> 1;
    }
    rem_euclid(&result, m)
}

const WITNESSES: [u32; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Miller-Rabin with the first twelve primes as witnesses.
///
/// Exact below 3.3 * 10^24, a strong probable-prime test above.
pub fn is_probable_prime(n: &IBig) -> bool {
    if *n < ibig!(2) {
        return false;
    }
    for q in WITNESSES {
        let q = IBig::from(q);
        if *n == q {
            return true;
        }
        if rem_euclid(n, &q) == ibig!(0) {
            return false;
        }
    }

    let one = ibig!(1);
    let n1 = n - &one;
    let mut d = n1.clone();
    let mut s = 0;
    while rem_euclid(&d, &ibig!(2)) == ibig!(0) {
        d = d >> 1;
        s += 1;
    }

    'witness: for a in WITNESSES {
        let mut x = pow_mod(&IBig::from(a), &d, n);
        if x == one || x == n1 {
            continue;
        }
        for _ in 1..s {
            x = rem_euclid(&(&x * &x), n);
            if x == n1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

const TRIAL_DIVISION_LIMIT: u32 = 1 << 20;

/// Distinct prime factors of `n > 1` in ascending order.
///
/// Returns `None` when a composite cofactor is left after trial division
/// up to 2^20.
pub fn prime_factors(n: &IBig) -> Option<Vec<IBig>> {
    if is_probable_prime(n) {
        return Some(vec![n.clone()]);
    }
    let mut factors = vec![];
    let mut rest = n.clone();
    let mut d = ibig!(2);
    while &d * &d <= rest {
        if d > IBig::from(TRIAL_DIVISION_LIMIT) {
            break;
        }
        if rem_euclid(&rest, &d) == ibig!(0) {
            factors.push(d.clone());
            while rem_euclid(&rest, &d) == ibig!(0) {
                rest = &rest / &d;
            }
        }
        d += ibig!(1);
    }
    if rest > ibig!(1) {
        if &d * &d <= rest && !is_probable_prime(&rest) {
            return None;
        }
        factors.push(rest);
    }
    Some(factors)
}
