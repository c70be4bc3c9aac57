//! Core Montgomery operations over raw limb arrays.
//!
//! This module defines the operation set on which field elements are
//! built. All functions work on values represented as `[u64; N]` (64-bit
//! limbs, least significant limb first), in Montgomery representation,
//! with a modulus described by a [`Modulus`] structure. The following
//! properties apply:
//!
//!  - Inputs are assumed to be canonical, i.e. numerically lower than
//!    the modulus. This is NOT verified; a non-canonical input yields an
//!    unspecified (but in-range and non-crashing) result.
//!
//!  - Every function runs in time which depends only on `N`, not on
//!    the values of the operands. No branch is taken on data-dependent
//!    carries or borrows; conditional selections use masks.
//!
//!  - There are two implementations of every operation: [`Portable`],
//!    which uses only plain integer arithmetic, and (on x86-64) [`Adx`],
//!    which uses the `mulx`, `adcx` and `adox` opcodes. Both yield
//!    exactly the same results. The free functions of this module
//!    ([`mul()`], [`reduce()`], [`from_mont()`], [`mul_by3()`],
//!    [`mul_by5()`], [`mul_by13()`], [`butterfly()`], [`add()`] and
//!    [`sub()`]) use [`Backend::get()`] to select the implementation;
//!    the choice is made once per process (see [`probe`]).

use crate::modulus::Modulus;

pub mod probe;

mod portable;
pub use portable::Portable;

#[cfg(target_arch = "x86_64")]
mod adx;

#[cfg(target_arch = "x86_64")]
pub use adx::Adx;

// Carrying addition and subtraction should use u64::carrying_add()
// and u64::borrowing_sub(), but these functions are currently only
// experimental.

// Add with carry; carry is 0 or 1.
// (x, y, c_in) -> x + y + c_in mod 2^64, c_out
#[inline(always)]
pub(crate) const fn addcarry_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    let z = (x as u128).wrapping_add(y as u128).wrapping_add(c as u128);
    (z as u64, (z >> 64) as u8)
}

// Subtract with borrow; borrow is 0 or 1.
// (x, y, c_in) -> x - y - c_in mod 2^64, c_out
#[inline(always)]
pub(crate) const fn subborrow_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    let z = (x as u128).wrapping_sub(y as u128).wrapping_sub(c as u128);
    (z as u64, (z >> 127) as u8)
}

// Compute x*y+z over 128 bits, returned as two 64-bit words (lo, hi)
#[inline(always)]
pub(crate) const fn umull_add(x: u64, y: u64, z: u64) -> (u64, u64) {
    let t = ((x as u128) * (y as u128)).wrapping_add(z as u128);
    (t as u64, (t >> 64) as u64)
}

// Compute x*y+z1+z2 over 128 bits, returned as two 64-bit words (lo, hi)
#[inline(always)]
pub(crate) const fn umull_add2(x: u64, y: u64, z1: u64, z2: u64) -> (u64, u64) {
    let t = ((x as u128) * (y as u128))
        .wrapping_add(z1 as u128).wrapping_add(z2 as u128);
    (t as u64, (t >> 64) as u64)
}

// Constant-time selection: for each limb, d[i] is replaced with a[i]
// if mm is 0xFFFFFFFFFFFFFFFF, or kept unchanged if mm is 0.
#[inline(always)]
pub(crate) fn ccopy<const N: usize>(d: &mut [u64; N], a: &[u64; N], mm: u64) {
    for i in 0..N {
        d[i] ^= mm & (d[i] ^ a[i]);
    }
}

/// Strategy interface for the core Montgomery operations.
///
/// Implementations MUST be output-identical for all canonical inputs.
/// All methods are constant-time.
pub trait MontBackend: Copy {

    /// Set `d` to `a*b/R mod q` (Montgomery multiplication).
    ///
    /// Operand `b` must be canonical. Operand `a` may be any `N`-limb
    /// value; the output is always canonical.
    fn mul<const N: usize>(self, d: &mut [u64; N],
        a: &[u64; N], b: &[u64; N], m: &Modulus<N>);

    /// Replace `d` with `d - q` if `d >= q`. The input must be lower
    /// than `2*q`.
    fn reduce<const N: usize>(self, d: &mut [u64; N], m: &Modulus<N>);

    /// Convert `d` from Montgomery to canonical representation (i.e.
    /// set it to `d/R mod q`).
    fn from_mont<const N: usize>(self, d: &mut [u64; N], m: &Modulus<N>);

    /// Set `d` to `a + b mod q`.
    fn add<const N: usize>(self, d: &mut [u64; N],
        a: &[u64; N], b: &[u64; N], m: &Modulus<N>);

    /// Set `d` to `a - b mod q`.
    fn sub<const N: usize>(self, d: &mut [u64; N],
        a: &[u64; N], b: &[u64; N], m: &Modulus<N>);

    /// Multiply `x` by 3 (in place).
    fn mul_by3<const N: usize>(self, x: &mut [u64; N], m: &Modulus<N>);

    /// Multiply `x` by 5 (in place).
    fn mul_by5<const N: usize>(self, x: &mut [u64; N], m: &Modulus<N>);

    /// Multiply `x` by 13 (in place).
    fn mul_by13<const N: usize>(self, x: &mut [u64; N], m: &Modulus<N>);

    /// Set `(a, b)` to `(a + b, a - b)` (both modulo q).
    fn butterfly<const N: usize>(self,
        a: &mut [u64; N], b: &mut [u64; N], m: &Modulus<N>);
}

/// Runtime-selected implementation of the core operations.
#[derive(Clone, Copy, Debug)]
pub enum Backend {
    Portable(Portable),
    #[cfg(target_arch = "x86_64")]
    Adx(Adx),
}

impl Backend {

    /// Get the implementation to use on the current CPU. The underlying
    /// capability probe is evaluated only once per process.
    #[cfg(target_arch = "x86_64")]
    #[inline(always)]
    pub fn get() -> Self {
        match Adx::detect() {
            Some(x) => Backend::Adx(x),
            None => Backend::Portable(Portable),
        }
    }

    /// Get the implementation to use on the current CPU. The underlying
    /// capability probe is evaluated only once per process.
    #[cfg(not(target_arch = "x86_64"))]
    #[inline(always)]
    pub fn get() -> Self {
        Backend::Portable(Portable)
    }

    /// Return `true` if this is the carry-chain accelerated implementation.
    pub fn is_accelerated(self) -> bool {
        match self {
            Backend::Portable(_) => false,
            #[cfg(target_arch = "x86_64")]
            Backend::Adx(_) => true,
        }
    }
}

// Forward a trait method to the selected implementation.
macro_rules! dispatch {
    ($self:ident, $b:ident => $call:expr) => {
        match $self {
            Backend::Portable($b) => $call,
            #[cfg(target_arch = "x86_64")]
            Backend::Adx($b) => $call,
        }
    }
}

impl MontBackend for Backend {

    #[inline]
    fn mul<const N: usize>(self, d: &mut [u64; N],
        a: &[u64; N], b: &[u64; N], m: &Modulus<N>)
    {
        dispatch!(self, x => x.mul(d, a, b, m))
    }

    #[inline]
    fn reduce<const N: usize>(self, d: &mut [u64; N], m: &Modulus<N>) {
        dispatch!(self, x => x.reduce(d, m))
    }

    #[inline]
    fn from_mont<const N: usize>(self, d: &mut [u64; N], m: &Modulus<N>) {
        dispatch!(self, x => x.from_mont(d, m))
    }

    #[inline]
    fn add<const N: usize>(self, d: &mut [u64; N],
        a: &[u64; N], b: &[u64; N], m: &Modulus<N>)
    {
        dispatch!(self, x => x.add(d, a, b, m))
    }

    #[inline]
    fn sub<const N: usize>(self, d: &mut [u64; N],
        a: &[u64; N], b: &[u64; N], m: &Modulus<N>)
    {
        dispatch!(self, x => x.sub(d, a, b, m))
    }

    #[inline]
    fn mul_by3<const N: usize>(self, x: &mut [u64; N], m: &Modulus<N>) {
        dispatch!(self, y => y.mul_by3(x, m))
    }

    #[inline]
    fn mul_by5<const N: usize>(self, x: &mut [u64; N], m: &Modulus<N>) {
        dispatch!(self, y => y.mul_by5(x, m))
    }

    #[inline]
    fn mul_by13<const N: usize>(self, x: &mut [u64; N], m: &Modulus<N>) {
        dispatch!(self, y => y.mul_by13(x, m))
    }

    #[inline]
    fn butterfly<const N: usize>(self,
        a: &mut [u64; N], b: &mut [u64; N], m: &Modulus<N>)
    {
        dispatch!(self, x => x.butterfly(a, b, m))
    }
}

/// Montgomery multiplication: `d <- a*b/R mod q`.
#[inline]
pub fn mul<const N: usize>(d: &mut [u64; N],
    a: &[u64; N], b: &[u64; N], m: &Modulus<N>)
{
    Backend::get().mul(d, a, b, m)
}

/// Conditional subtraction of the modulus (input must be lower than `2*q`).
#[inline]
pub fn reduce<const N: usize>(d: &mut [u64; N], m: &Modulus<N>) {
    Backend::get().reduce(d, m)
}

/// Conversion out of Montgomery representation: `d <- d/R mod q`.
#[inline]
pub fn from_mont<const N: usize>(d: &mut [u64; N], m: &Modulus<N>) {
    Backend::get().from_mont(d, m)
}

/// Modular addition: `d <- a + b mod q`.
#[inline]
pub fn add<const N: usize>(d: &mut [u64; N],
    a: &[u64; N], b: &[u64; N], m: &Modulus<N>)
{
    Backend::get().add(d, a, b, m)
}

/// Modular subtraction: `d <- a - b mod q`.
#[inline]
pub fn sub<const N: usize>(d: &mut [u64; N],
    a: &[u64; N], b: &[u64; N], m: &Modulus<N>)
{
    Backend::get().sub(d, a, b, m)
}

/// `x <- 3*x mod q`
#[inline]
pub fn mul_by3<const N: usize>(x: &mut [u64; N], m: &Modulus<N>) {
    Backend::get().mul_by3(x, m)
}

/// `x <- 5*x mod q`
#[inline]
pub fn mul_by5<const N: usize>(x: &mut [u64; N], m: &Modulus<N>) {
    Backend::get().mul_by5(x, m)
}

/// `x <- 13*x mod q`
#[inline]
pub fn mul_by13<const N: usize>(x: &mut [u64; N], m: &Modulus<N>) {
    Backend::get().mul_by13(x, m)
}

/// `(a, b) <- (a + b mod q, a - b mod q)`
#[inline]
pub fn butterfly<const N: usize>(a: &mut [u64; N], b: &mut [u64; N],
    m: &Modulus<N>)
{
    Backend::get().butterfly(a, b, m)
}

#[cfg(all(test, feature = "omnes"))]
mod tests {

    use super::{Backend, MontBackend, Portable};
    use crate::field::{Bls12_381, Bls24_315, Bw6_633};
    use crate::modulus::{FieldParams, Modulus};
    use num_bigint::{BigInt, Sign};
    use sha2::{Sha512, Digest};

    fn to_big<const N: usize>(x: &[u64; N]) -> BigInt {
        let mut buf = [0u8; 128];
        for i in 0..N {
            buf[(i << 3)..((i + 1) << 3)].copy_from_slice(&x[i].to_le_bytes());
        }
        BigInt::from_bytes_le(Sign::Plus, &buf[..(N << 3)])
    }

    fn from_big<const N: usize>(z: &BigInt) -> [u64; N] {
        let (_, bb) = z.to_bytes_le();
        let mut d = [0u64; N];
        for (i, b) in bb.iter().enumerate() {
            d[i >> 3] |= (*b as u64) << ((i & 7) << 3);
        }
        d
    }

    // Pseudo-random canonical value (deterministic, from a counter).
    fn mkrnd<const N: usize>(m: &Modulus<N>, bx: u64) -> [u64; N] {
        let mut sh = Sha512::new();
        let mut d = [0u64; N];
        let mut j = 0;
        while j < N {
            sh.update((bx + ((j as u64) << 40)).to_le_bytes());
            let v = sh.finalize_reset();
            for k in 0..8 {
                if j + k < N {
                    let mut w = [0u8; 8];
                    w.copy_from_slice(&v[(k << 3)..((k + 1) << 3)]);
                    d[j + k] = u64::from_le_bytes(w);
                }
            }
            j += 8;
        }
        let zq = to_big(&m.q);
        from_big(&(to_big(&d) % &zq))
    }

    fn minus_one<const N: usize>(m: &Modulus<N>) -> [u64; N] {
        let mut d = m.q;
        d[0] -= 1;
        d
    }

    fn check_mul<B: MontBackend, const N: usize>(bk: B, m: &Modulus<N>) {
        let zq = to_big(&m.q);
        let zri = {
            // R^-1 mod q, computed as R^(q-2) mod q.
            let zr = BigInt::from(1u32) << (64 * N);
            zr.modpow(&(&zq - 2u32), &zq)
        };
        let mut vv = [[0u64; N]; 4];
        vv[1][0] = 1;
        vv[2] = minus_one(m);
        vv[3] = m.r;
        for i in 0..(vv.len() + 200) {
            let a = if i < vv.len() { vv[i] } else { mkrnd(m, 2 * i as u64) };
            for j in 0..(vv.len() + 2) {
                let b = if j < vv.len() {
                    vv[j]
                } else {
                    mkrnd(m, (2 * i + 1) as u64 + ((j as u64) << 20))
                };
                let mut d = [0u64; N];
                bk.mul(&mut d, &a, &b, m);
                let zd = (to_big(&a) * to_big(&b) * &zri) % &zq;
                assert!(to_big(&d) == zd);
            }
        }
    }

    fn check_reduce<B: MontBackend, const N: usize>(bk: B, m: &Modulus<N>) {
        let zq = to_big(&m.q);
        for i in 0..300 {
            // v = a + b over plain integers, in [0, 2q); all shipped
            // moduli leave spare top bits, so this fits in N limbs.
            let a = mkrnd(m, 3 * i);
            let b = if i == 0 { minus_one(m) } else { mkrnd(m, 3 * i + 1) };
            let v = from_big::<N>(&(to_big(&a) + to_big(&b)));
            let mut d = v;
            bk.reduce(&mut d, m);
            assert!(to_big(&d) == (to_big(&v) % &zq));
            let mut e = d;
            bk.reduce(&mut e, m);
            assert!(e == d);
        }
        let mut d = m.q;
        bk.reduce(&mut d, m);
        assert!(d == [0u64; N]);
    }

    fn check_from_mont<B: MontBackend, const N: usize>(bk: B, m: &Modulus<N>) {
        let mut one = [0u64; N];
        one[0] = 1;
        for i in 0..300 {
            let x = mkrnd(m, 5 * i);
            let mut d1 = x;
            bk.from_mont(&mut d1, m);
            let mut d2 = [0u64; N];
            bk.mul(&mut d2, &x, &one, m);
            assert!(d1 == d2);
        }
        let mut d = m.r;
        bk.from_mont(&mut d, m);
        assert!(d == one);
    }

    fn check_small<B: MontBackend, const N: usize>(bk: B, m: &Modulus<N>) {
        let mut vv = [[0u64; N]; 2];
        vv[1] = minus_one(m);
        for i in 0..(vv.len() + 300) {
            let x = if i < vv.len() { vv[i] } else { mkrnd(m, 7 * i as u64) };

            // Oracle: repeated modular additions.
            let mut k3 = x;
            for _ in 0..2 {
                let t = k3;
                bk.add(&mut k3, &t, &x, m);
            }
            let mut k5 = k3;
            for _ in 0..2 {
                let t = k5;
                bk.add(&mut k5, &t, &x, m);
            }
            let mut k13 = k5;
            for _ in 0..8 {
                let t = k13;
                bk.add(&mut k13, &t, &x, m);
            }

            let mut y = x;
            bk.mul_by3(&mut y, m);
            assert!(y == k3);
            let mut y = x;
            bk.mul_by5(&mut y, m);
            assert!(y == k5);
            let mut y = x;
            bk.mul_by13(&mut y, m);
            assert!(y == k13);
        }
    }

    fn check_butterfly<B: MontBackend, const N: usize>(bk: B, m: &Modulus<N>) {
        let zq = to_big(&m.q);
        for i in 0..300 {
            let a = if i == 0 { [0u64; N] } else { mkrnd(m, 11 * i) };
            let b = if i == 1 { minus_one(m) } else { mkrnd(m, 11 * i + 1) };
            let mut x = a;
            let mut y = b;
            bk.butterfly(&mut x, &mut y, m);
            let za = to_big(&a);
            let zb = to_big(&b);
            assert!(to_big(&x) == (&za + &zb) % &zq);
            let zd = if za >= zb { &za - &zb } else { &za + &zq - &zb };
            assert!(to_big(&y) == zd);
            assert!(to_big(&x) < zq && to_big(&y) < zq);

            let mut s = [0u64; N];
            bk.add(&mut s, &a, &b, m);
            assert!(s == x);
            let mut s = [0u64; N];
            bk.sub(&mut s, &a, &b, m);
            assert!(s == y);
        }
    }

    fn check_backend<B: MontBackend, const N: usize>(bk: B, m: &Modulus<N>) {
        check_mul(bk, m);
        check_reduce(bk, m);
        check_from_mont(bk, m);
        check_small(bk, m);
        check_butterfly(bk, m);
    }

    #[test]
    fn portable_ops() {
        check_backend(Portable, &Bls24_315::MODULUS);
        check_backend(Portable, &Bls12_381::MODULUS);
        check_backend(Portable, &Bw6_633::MODULUS);
    }

    #[test]
    fn dispatched_ops() {
        let bk = Backend::get();
        check_backend(bk, &Bls24_315::MODULUS);
        check_backend(bk, &Bls12_381::MODULUS);
        check_backend(bk, &Bw6_633::MODULUS);
    }

    // Both implementations must agree on every operation.
    fn check_same<const N: usize>(m: &Modulus<N>) {
        let bk = Backend::get();
        if !bk.is_accelerated() {
            return;
        }
        let pp = Portable;
        for i in 0..1000 {
            let a = mkrnd(m, 13 * i);
            let b = mkrnd(m, 13 * i + 1);

            let mut d1 = [0u64; N];
            let mut d2 = [0u64; N];
            bk.mul(&mut d1, &a, &b, m);
            pp.mul(&mut d2, &a, &b, m);
            assert!(d1 == d2);

            // Non-canonical first operand (conversion into Montgomery).
            let mut w = [0u64; N];
            for j in 0..N {
                w[j] = a[j] ^ b[j].rotate_left(17) ^ 0xFFFF0000FFFF0000;
            }
            bk.mul(&mut d1, &w, &m.r2, m);
            pp.mul(&mut d2, &w, &m.r2, m);
            assert!(d1 == d2);

            let (mut d1, mut d2) = (a, a);
            bk.from_mont(&mut d1, m);
            pp.from_mont(&mut d2, m);
            assert!(d1 == d2);

            let (mut d1, mut d2) = (a, a);
            bk.mul_by3(&mut d1, m);
            pp.mul_by3(&mut d2, m);
            assert!(d1 == d2);
            bk.mul_by5(&mut d1, m);
            pp.mul_by5(&mut d2, m);
            assert!(d1 == d2);
            bk.mul_by13(&mut d1, m);
            pp.mul_by13(&mut d2, m);
            assert!(d1 == d2);

            let (mut x1, mut y1) = (a, b);
            let (mut x2, mut y2) = (a, b);
            bk.butterfly(&mut x1, &mut y1, m);
            pp.butterfly(&mut x2, &mut y2, m);
            assert!(x1 == x2 && y1 == y2);

            let mut s1 = [0u64; N];
            let mut s2 = [0u64; N];
            bk.add(&mut s1, &a, &b, m);
            pp.add(&mut s2, &a, &b, m);
            assert!(s1 == s2);
            bk.sub(&mut s1, &a, &b, m);
            pp.sub(&mut s2, &a, &b, m);
            assert!(s1 == s2);
        }
    }

    #[test]
    fn accelerated_matches_portable() {
        check_same(&Bls24_315::MODULUS);
        check_same(&Bls12_381::MODULUS);
        check_same(&Bw6_633::MODULUS);
    }

    #[test]
    fn mul_boundaries() {
        fn check<const N: usize>(m: &Modulus<N>) {
            let zq = to_big(&m.q);
            let mut d = [0u64; N];
            let b = mkrnd(m, 77);
            super::mul(&mut d, &[0u64; N], &b, m);
            assert!(d == [0u64; N]);
            super::mul(&mut d, &b, &[0u64; N], m);
            assert!(d == [0u64; N]);

            // (q-1)*(q-1)/R = 1/R mod q
            let qm1 = minus_one(m);
            super::mul(&mut d, &qm1, &qm1, m);
            let zr = BigInt::from(1u32) << (64 * N);
            let zri = zr.modpow(&(&zq - 2u32), &zq);
            assert!(to_big(&d) == zri);
        }
        check(&Bls24_315::MODULUS);
        check(&Bls12_381::MODULUS);
        check(&Bw6_633::MODULUS);
    }
}
