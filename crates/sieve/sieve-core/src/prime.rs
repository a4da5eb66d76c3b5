//! Primality testing.
//!
//! Every implementation is a pure, total function over `i32`: anything below
//! 2 (zero, negatives, the sentinel) is simply "not prime". Callers upstream
//! already filter the reserved values, but a stray negative must never panic.

/// A primality test the worker pool can be built around.
pub trait PrimalityTest: Send + Sync {
    fn is_prime(&self, n: i32) -> bool;
}

/// Odd trial division up to `sqrt(n)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrialDivision;

impl PrimalityTest for TrialDivision {
    #[inline]
    fn is_prime(&self, n: i32) -> bool {
        is_prime(n)
    }
}

/// O(sqrt n) trial division: 2 is the only even prime, then odd divisors from
/// 3 while `d * d <= n`.
#[inline]
pub fn is_prime(n: i32) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let n = n as u64;
    let mut d = 3u64;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Deterministic Miller-Rabin. Witnesses 2, 7 and 61 are exact for every
/// n < 4_759_123_141, which covers the whole positive `i32` range.
#[derive(Debug, Default, Clone, Copy)]
pub struct MillerRabin;

const WITNESSES: [u64; 3] = [2, 7, 61];

// n < 2^31, so every product below stays under 2^62.
#[inline(always)]
fn pow_mod(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut acc = 1u64;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = acc * base % m;
        }
        base = base * base % m;
        exp >>= 1;
    }
    acc
}

impl PrimalityTest for MillerRabin {
    fn is_prime(&self, n: i32) -> bool {
        if n < 2 {
            return false;
        }
        let n = n as u64;
        for p in [2u64, 3, 5, 7, 11, 13, 61] {
            if n == p {
                return true;
            }
            if n % p == 0 {
                return false;
            }
        }

        let s = (n - 1).trailing_zeros();
        let d = (n - 1) >> s;

        'witness: for a in WITNESSES {
            let mut x = pow_mod(a, d, n);
            if x == 1 || x == n - 1 {
                continue;
            }
            for _ in 1..s {
                x = x * x % n;
                if x == n - 1 {
                    continue 'witness;
                }
            }
            return false;
        }
        true
    }
}
