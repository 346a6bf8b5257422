use super::BfvError;

/// Computes `base^exp mod modulus` by square-and-multiply.
pub fn mod_pow(base: u64, mut exp: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let modulus = modulus as u128;
    let mut base = base as u128 % modulus;
    let mut result = 1u128;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % modulus;
        }
        exp >>= 1;
        base = base * base % modulus;
    }
    result as u64
}

pub fn mul_mod(lhs: u64, rhs: u64, modulus: u64) -> u64 {
    ((lhs as u128 * rhs as u128) % modulus as u128) as u64
}

pub fn add_mod(lhs: u64, rhs: u64, modulus: u64) -> u64 {
    ((lhs as u128 + rhs as u128) % modulus as u128) as u64
}

pub fn sub_mod(lhs: u64, rhs: u64, modulus: u64) -> u64 {
    ((lhs as u128 + modulus as u128 - rhs as u128 % modulus as u128) % modulus as u128) as u64
}

/// Maps a signed integer into `[0, modulus)`.
pub fn reduce_signed(value: i128, modulus: u64) -> u64 {
    value.rem_euclid(modulus as i128) as u64
}

/// Inverse of `a` modulo `m` via the extended Euclidean algorithm, normalized into `[0, m)`.
pub fn mod_inverse(a: i64, m: u64) -> Result<u64, BfvError> {
    let normalized = reduce_signed(a as i128, m) as i128;

    let (mut old_r, mut r) = (normalized, m as i128);
    let (mut old_s, mut s) = (1i128, 0i128);
    while r != 0 {
        let quotient = old_r / r;
        (old_r, r) = (r, old_r - quotient * r);
        (old_s, s) = (s, old_s - quotient * s);
    }

    if old_r != 1 {
        return Err(BfvError::NotInvertible { value: a, modulus: m });
    }
    Ok(reduce_signed(old_s, m))
}

/// Generator candidates tried before giving up. For prime moduli a working candidate is among the
/// first few; composite moduli may have no root of the requested order at all.
pub const MAX_ROOT_CANDIDATES: u64 = 1 << 12;

/// Finds the primitive `order`-th root of unity modulo `modulus` derived from the smallest
/// working generator candidate `g = 2, 3, ...`, trying at most [`MAX_ROOT_CANDIDATES`] of them.
pub fn root_of_unity(order: u64, modulus: u64) -> Result<u64, BfvError> {
    if order == 0 || modulus < 2 || (modulus - 1) % order != 0 {
        return Err(BfvError::NoRootOfUnityExists { order, modulus });
    }

    let cofactor = (modulus - 1) / order;
    for g in (2..modulus).take(MAX_ROOT_CANDIDATES as usize) {
        let candidate = mod_pow(g, cofactor, modulus);
        if mod_pow(candidate, order, modulus) != 1 {
            continue;
        }
        if has_exact_order(candidate, order, modulus) {
            return Ok(candidate);
        }
    }

    Err(BfvError::RootNotFound { order, modulus })
}

fn has_exact_order(candidate: u64, order: u64, modulus: u64) -> bool {
    let mut power = 1;
    for _ in 1..order {
        power = mul_mod(power, candidate, modulus);
        if power == 1 {
            return false;
        }
    }
    true
}

pub fn gcd(a: i64, b: i64) -> u64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use crate::bfv::BfvError;

    use super::{gcd, mod_inverse, mod_pow, root_of_unity};

    #[test]
    fn mod_pow_small_values() {
        assert_eq!(mod_pow(3, 4, 17), 81 % 17);
        assert_eq!(mod_pow(2, 0, 17), 1);
        assert_eq!(mod_pow(5, 3, 1), 0);
        assert_eq!(mod_pow(0, 5, 7), 0);
    }

    #[test]
    fn mod_pow_does_not_overflow() {
        let q = 8_000_000_000_000;
        assert_eq!(mod_pow(q - 1, 2, q), 1);
    }

    #[test]
    fn mod_inverse_of_coprime_values() {
        let mut rng = rand::thread_rng();
        for m in [17u64, 97, 7681, 32768] {
            for _ in 0..50 {
                let a = rng.gen_range(1..m);
                if gcd(a as i64, m as i64) != 1 {
                    continue;
                }
                let inverse = mod_inverse(a as i64, m).unwrap();
                assert!(inverse < m);
                assert_eq!((a as u128 * inverse as u128 % m as u128) as u64, 1);
            }
        }
    }

    #[test]
    fn mod_inverse_of_negative_value() {
        let inverse = mod_inverse(-3, 17).unwrap();
        assert_eq!((14 * inverse) % 17, 1);
    }

    #[test]
    fn mod_inverse_not_invertible() {
        assert!(matches!(
            mod_inverse(4, 32768),
            Err(BfvError::NotInvertible { .. })
        ));
        assert!(matches!(
            mod_inverse(0, 17),
            Err(BfvError::NotInvertible { .. })
        ));
    }

    #[test]
    fn root_of_unity_is_primitive() {
        for (order, modulus) in [(16u64, 17u64), (8, 17), (32, 97), (16, 7681), (2048, 12289)] {
            let root = root_of_unity(order, modulus).unwrap();
            assert_eq!(mod_pow(root, order, modulus), 1);
            for i in 1..order {
                assert_ne!(mod_pow(root, i, modulus), 1, "order {} mod {}", order, modulus);
            }
        }
    }

    #[test]
    fn root_of_unity_picks_lowest_generator() {
        // 2 has order 8 modulo 17, so the search has to move on to g = 3.
        assert_eq!(root_of_unity(16, 17).unwrap(), 3);
        // 2^2 = 4 only has order 4, 3^2 = 9 has order 8.
        assert_eq!(root_of_unity(8, 17).unwrap(), 9);
    }

    #[test]
    fn root_of_unity_requires_divisibility() {
        assert!(matches!(
            root_of_unity(16, 32768),
            Err(BfvError::NoRootOfUnityExists {
                order: 16,
                modulus: 32768
            })
        ));
    }

    #[test]
    fn root_of_unity_gives_up_on_composite_modulus() {
        // 1000121 * 1000249 = 1 mod 16, but both factors are 9 mod 16, so the largest power-of-two
        // element order is 8.
        assert!(matches!(
            root_of_unity(16, 1_000_370_030_129),
            Err(BfvError::RootNotFound { order: 16, .. })
        ));
    }

    #[test]
    fn gcd_uses_absolute_values() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(-12, 18), 6);
        assert_eq!(gcd(7, 0), 7);
        assert_eq!(gcd(0, 0), 0);
    }
}
