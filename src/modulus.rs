//! Modulus descriptors.
//!
//! A [`Modulus`] holds a prime modulus `q` (as `N` 64-bit limbs, least
//! significant first) along with the derived constants that Montgomery
//! arithmetic needs. All these values are computed at compile time by
//! [`Modulus::new()`]; a field is then defined by a marker type which
//! implements [`FieldParams`]:
//!
//! ```ignore
//! #[derive(Clone, Copy, Debug)]
//! pub struct MyField;
//! impl FieldParams<4> for MyField {
//!     const MODULUS: Modulus<4> = Modulus::new([ ... ]);
//! }
//! pub type GFmy = Element<MyField, 4>;
//! ```
//!
//! The modulus must be odd, and its top limb must be non-zero (i.e. the
//! limb count must be minimal). It is assumed, but not verified, that
//! the modulus is prime; inversion, square roots and the Legendre
//! symbol rely on it.
//!
//! Square roots use Tonelli-Shanks, which needs a primitive `2^s`-th
//! root of unity, where `2^s` is the largest power of two that divides
//! `q-1`. When `q = 3 mod 4` (`s = 1`), that root is `-1` and nothing
//! else is needed. Otherwise, the root must be supplied with
//! [`Modulus::with_two_adic_root()`], which checks its order at
//! compile time.

use core::fmt::Debug;

use crate::backend::umull_add2;

/// Read-only description of a modulus and its Montgomery constants.
#[derive(Clone, Copy, Debug)]
pub struct Modulus<const N: usize> {
    /// The modulus `q`.
    pub q: [u64; N],
    /// `-1/q mod 2^64`.
    pub q_inv0: u64,
    /// `R = 2^(64*N) mod q` (Montgomery representation of 1).
    pub r: [u64; N],
    /// `R^2 mod q` (Montgomery representation of `R`).
    pub r2: [u64; N],
    /// `q - 2` (exponent for inversion).
    pub qm2: [u64; N],
    /// `(q - 1)/2` (exponent for the Legendre symbol).
    pub qm1h: [u64; N],
    /// Largest `s` such that `2^s` divides `q - 1`.
    pub two_adicity: u32,
    /// `(t - 1)/2`, with `t = (q - 1)/2^s` (odd).
    pub sqrt_exp: [u64; N],
    /// A primitive `2^s`-th root of unity (normal representation, not
    /// Montgomery). Zero if `s > 1` and no root was provided.
    pub two_adic_root: [u64; N],
    /// Modulus length, in bits.
    pub bitlen: usize,
    /// Length of encoded values, in bytes.
    pub enc_len: usize,
}

/// Binding of a marker type to a modulus.
pub trait FieldParams<const N: usize>: Copy + Clone + Debug + 'static {
    const MODULUS: Modulus<N>;
}

impl<const N: usize> Modulus<N> {

    /// Compute all constants for modulus `q`. This is meant to be used
    /// in const context; invalid moduli make compilation fail.
    pub const fn new(q: [u64; N]) -> Self {
        assert!(N >= 2, "modulus must use at least two limbs");
        assert!((q[0] & 1) == 1, "modulus must be odd");
        assert!(q[N - 1] != 0, "top limb of modulus must be non-zero");

        let bitlen = ((N - 1) << 6) + 64 - (q[N - 1].leading_zeros() as usize);

        // q is odd and greater than 2^64, hence q - 2 does not wrap.
        let mut qm2 = q;
        let mut bb = 2;
        let mut i = 0;
        while i < N {
            let (d, b) = sbb(qm2[i], 0, bb);
            qm2[i] = d;
            bb = b;
            i += 1;
        }

        // Trailing zeros of q - 1 (q is odd, so this is q with its low
        // bit cleared; q > 2^64, hence it is not zero).
        let mut two_adicity = 0;
        let mut i = 0;
        let mut w = q[0] & !1;
        while w == 0 {
            two_adicity += 64;
            i += 1;
            w = q[i];
        }
        two_adicity += w.trailing_zeros();

        // With s = 1, -1 is the primitive square root of unity.
        let mut two_adic_root = [0u64; N];
        if two_adicity == 1 {
            two_adic_root = q;
            two_adic_root[0] -= 1;
        }

        // Since q is odd, floor(q/2^k) = floor((q-1)/2^k) for k >= 1.
        Self {
            q,
            q_inv0: ninv64(q[0]),
            r: pow2mod(q, N << 6, bitlen),
            r2: pow2mod(q, N << 7, bitlen),
            qm2,
            qm1h: shr(q, 1),
            two_adicity,
            sqrt_exp: shr(q, two_adicity + 1),
            two_adic_root,
            bitlen,
            enc_len: (bitlen + 7) >> 3,
        }
    }

    /// Set the primitive `2^s`-th root of unity used for square roots
    /// (normal representation, 64-bit limbs, little-endian order). The
    /// order of the root is verified; a wrong root makes compilation
    /// fail when used in const context.
    pub const fn with_two_adic_root(self, g: [u64; N]) -> Self {
        // In Montgomery representation, -1 is q - R.
        let mut m1 = [0u64; N];
        let mut bb = 0;
        let mut i = 0;
        while i < N {
            let (d, b) = sbb(self.q[i], self.r[i], bb);
            m1[i] = d;
            bb = b;
            i += 1;
        }

        // g^(2^(s-1)) must be -1.
        let mut x = self.mont_mul(g, self.r2);
        let mut k = 1;
        while k < self.two_adicity {
            x = self.mont_mul(x, x);
            k += 1;
        }
        let mut i = 0;
        while i < N {
            assert!(x[i] == m1[i], "not a primitive 2^s-th root of unity");
            i += 1;
        }

        let mut m = self;
        m.two_adic_root = g;
        m
    }

    /// Montgomery multiplication: return `a*b/R mod q`, fully reduced.
    /// Operand `b` must be lower than `q`; `a` may be any `N`-limb
    /// value. This function is meant for const contexts; it is
    /// constant-time, but slower than the backend implementations.
    pub const fn mont_mul(&self, a: [u64; N], b: [u64; N]) -> [u64; N] {
        let mut d = [0u64; N];
        let mut dh = 0u64;
        let mut j = 0;
        while j < N {
            let f = a[0].wrapping_mul(b[j]).wrapping_add(d[0])
                .wrapping_mul(self.q_inv0);
            let mut cc1 = 0;
            let mut cc2 = 0;
            let mut i = 0;
            while i < N {
                let (z, hi) = umull_add2(a[i], b[j], d[i], cc1);
                cc1 = hi;
                let (z, hi) = umull_add2(self.q[i], f, z, cc2);
                cc2 = hi;
                if i > 0 {
                    d[i - 1] = z;
                }
                i += 1;
            }
            let z = (dh as u128) + (cc1 as u128) + (cc2 as u128);
            d[N - 1] = z as u64;
            dh = (z >> 64) as u64;
            j += 1;
        }

        // Result is lower than 2*q; subtract q if it fits.
        let mut t = [0u64; N];
        let mut bb = 0;
        let mut i = 0;
        while i < N {
            let (w, b) = sbb(d[i], self.q[i], bb);
            t[i] = w;
            bb = b;
            i += 1;
        }
        let m = (dh | (bb ^ 1)).wrapping_neg();
        let mut i = 0;
        while i < N {
            d[i] ^= m & (d[i] ^ t[i]);
            i += 1;
        }
        d
    }
}

// =====================================================================
// Support functions for compile-time computation of constants.

// Return -1/x mod 2^64. It is assumed that x is odd.
const fn ninv64(x: u64) -> u64 {
    let y = 2u64.wrapping_sub(x);
    let y = y.wrapping_mul(2u64.wrapping_sub(y.wrapping_mul(x)));
    let y = y.wrapping_mul(2u64.wrapping_sub(y.wrapping_mul(x)));
    let y = y.wrapping_mul(2u64.wrapping_sub(y.wrapping_mul(x)));
    let y = y.wrapping_mul(2u64.wrapping_sub(y.wrapping_mul(x)));
    let y = y.wrapping_mul(2u64.wrapping_sub(y.wrapping_mul(x)));
    y.wrapping_neg()
}

// Right shift by k bits (k < 64*N).
const fn shr<const N: usize>(x: [u64; N], k: u32) -> [u64; N] {
    let ls = (k >> 6) as usize;
    let bs = k & 63;
    let mut d = [0u64; N];
    let mut i = 0;
    while i + ls < N {
        let mut w = x[i + ls] >> bs;
        if bs > 0 && i + ls + 1 < N {
            w |= x[i + ls + 1] << (64 - bs);
        }
        d[i] = w;
        i += 1;
    }
    d
}

// Sub-with-borrow (borrow is a full word, 0 or 1 on output).
const fn sbb(x: u64, y: u64, cc: u64) -> (u64, u64) {
    let z = (x as u128).wrapping_sub(y as u128).wrapping_sub(cc as u128);
    (z as u64, ((z >> 64) as u64) & 1)
}

// Compute 2^n mod q, using repeated modular doublings; bitlen is the
// bit length of q.
const fn pow2mod<const N: usize>(q: [u64; N], n: usize, bitlen: usize)
    -> [u64; N]
{
    let mut d = [0u64; N];
    if n < bitlen {
        d[n >> 6] = 1u64 << (n & 63);
        return d;
    }

    // 2^(bitlen-1) < q since q is odd.
    d[(bitlen - 1) >> 6] = 1u64 << ((bitlen - 1) & 63);
    let mut k = bitlen - 1;
    while k < n {
        // d <- 2*d, with top bit in dh.
        let mut dh = 0;
        let mut i = 0;
        while i < N {
            let w = d[i];
            d[i] = (w << 1) | dh;
            dh = w >> 63;
            i += 1;
        }

        // Subtract q; keep the result if there was no borrow, or if
        // the borrow is absorbed by the top bit.
        let mut t = [0u64; N];
        let mut bb = 0;
        let mut i = 0;
        while i < N {
            let (w, b) = sbb(d[i], q[i], bb);
            t[i] = w;
            bb = b;
            i += 1;
        }
        if bb == 0 || dh != 0 {
            d = t;
        }
        k += 1;
    }
    d
}

#[cfg(all(test, feature = "omnes"))]
mod tests {

    use super::{FieldParams, Modulus};
    use crate::field::{Bls12_381, Bls24_315, Bw6_633};
    use num_bigint::{BigInt, Sign};

    fn to_big<const N: usize>(x: &[u64; N]) -> BigInt {
        let mut buf = [0u8; 128];
        for i in 0..N {
            buf[(i << 3)..((i + 1) << 3)].copy_from_slice(&x[i].to_le_bytes());
        }
        BigInt::from_bytes_le(Sign::Plus, &buf[..(N << 3)])
    }

    fn check_modulus<const N: usize>(m: &Modulus<N>, bitlen: usize) {
        let zq = to_big(&m.q);
        assert!(m.bitlen == bitlen);
        assert!(zq.bits() as usize == bitlen);
        assert!(m.enc_len == (bitlen + 7) >> 3);
        assert!(m.q[0].wrapping_mul(m.q_inv0) == 0xFFFFFFFFFFFFFFFF);

        let zr = (BigInt::from(1u32) << (64 * N)) % &zq;
        assert!(to_big(&m.r) == zr);
        assert!(to_big(&m.r2) == (&zr * &zr) % &zq);
        assert!(to_big(&m.qm2) == &zq - 2u32);
        assert!(to_big(&m.qm1h) == (&zq - 1u32) >> 1);

        let s = m.two_adicity as usize;
        let zt = (&zq - 1u32) >> s;
        assert!(zt.bit(0));
        assert!(to_big(&m.sqrt_exp) == (&zt - 1u32) >> 1);
        assert!((zt << s) + 1u32 == zq);
    }

    // Check that the root has order exactly 2^s.
    fn check_root<const N: usize>(m: &Modulus<N>) {
        let zq = to_big(&m.q);
        let zg = to_big(&m.two_adic_root);
        let ze = BigInt::from(1u32) << (m.two_adicity - 1);
        assert!(zg.modpow(&ze, &zq) == &zq - 1u32);
    }

    #[test]
    fn constants() {
        check_modulus(&Bls24_315::MODULUS, 315);
        check_modulus(&Bls12_381::MODULUS, 381);
        check_modulus(&Bw6_633::MODULUS, 633);
    }

    #[test]
    fn two_adic_roots() {
        assert!(Bls24_315::MODULUS.two_adicity == 20);
        assert!(Bls12_381::MODULUS.two_adicity == 1);
        assert!(Bw6_633::MODULUS.two_adicity == 2);
        check_root(&Bls24_315::MODULUS);
        check_root(&Bls12_381::MODULUS);
        check_root(&Bw6_633::MODULUS);
    }

    fn mont_mul_inner<const N: usize>(m: &Modulus<N>) {
        let zq = to_big(&m.q);
        let zr = BigInt::from(1u32) << (64 * N);
        let zri = zr.modpow(&(&zq - 2u32), &zq);
        let mut a = [0u64; N];
        let mut b = [0u64; N];
        for i in 0..N {
            a[i] = 0xFFFFFFFFFFFFFFFF;
        }
        let one = {
            let mut d = [0u64; N];
            d[0] = 1;
            d
        };

        // Non-reduced first operand.
        let c = m.mont_mul(a, m.r2);
        assert!(to_big(&c) == to_big(&a) % &zq);
        assert!(m.mont_mul(m.r, one) == one);
        assert!(m.mont_mul(a, b) == [0u64; N]);

        for k in 0..20u64 {
            for i in 0..N {
                a[i] = (k + 1).wrapping_mul(0x9E3779B97F4A7C15)
                    .rotate_left((7 * i) as u32);
                b[i] = a[i] ^ 0x5555555555555555;
            }
            b[N - 1] >>= 8;
            let zc = (to_big(&a) * to_big(&b) * &zri) % &zq;
            assert!(to_big(&m.mont_mul(a, b)) == zc);
        }
    }

    #[test]
    fn mont_mul() {
        mont_mul_inner(&Bls24_315::MODULUS);
        mont_mul_inner(&Bls12_381::MODULUS);
        mont_mul_inner(&Bw6_633::MODULUS);
        mont_mul_inner(&Modulus::new([0xFFFFFFFFFFFFFFC5, 0xFFFFFFFFFFFFFFFF]));
    }

    #[test]
    #[should_panic]
    fn wrong_two_adic_root() {
        // 1 is a root of unity, but not a primitive one.
        let _ = Bls24_315::MODULUS.with_two_adic_root([1, 0, 0, 0, 0]);
    }

    #[test]
    fn small_modulus() {
        // 2^64 + 13 (not prime, but fine for the constants).
        const M: Modulus<2> = Modulus::new([13, 1]);
        check_modulus(&M, 65);

        // Modulus with no spare top bit.
        const M2: Modulus<2> = Modulus::new([
            0xFFFFFFFFFFFFFFC5, 0xFFFFFFFFFFFFFFFF ]);
        check_modulus(&M2, 128);
        assert!(M2.two_adicity == 2);

        // q - 1 = 2^66 * 3
        const M3: Modulus<2> = Modulus::new([1, 12]);
        assert!(M3.two_adicity == 66);
        assert!(M3.sqrt_exp == [1, 0]);
        assert!(M3.two_adic_root == [0, 0]);
    }
}
