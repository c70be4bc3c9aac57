use super::{addcarry_u64, subborrow_u64, umull_add, umull_add2, ccopy, MontBackend};
use crate::modulus::Modulus;

/// Portable implementation of the core operations.
///
/// Only plain 64-bit operations are used (with 128-bit intermediates for
/// products and carries); this implementation is available on all
/// targets, and serves as reference for the accelerated one.
#[derive(Clone, Copy, Debug)]
pub struct Portable;

// Conditionally subtract the modulus from d + cc*2^(64*N). That value
// MUST be lower than 2*q. The extra top bit cc is needed for sums and
// doublings when the modulus is close to 2^(64*N).
#[inline(always)]
fn reduce_carry<const N: usize>(d: &mut [u64; N], cc: u8, q: &[u64; N]) {
    let mut t = [0u64; N];
    let mut bb = 0;
    for i in 0..N {
        (t[i], bb) = subborrow_u64(d[i], q[i], bb);
    }

    // The subtraction result is correct unless it borrowed without
    // an extra top bit to absorb it; in that case, the source value
    // was already lower than q.
    let mm = (cc as u64).wrapping_sub(bb as u64);
    ccopy(&mut t, d, mm);
    *d = t;
}

// d <- 2*d mod q
#[inline(always)]
fn set_dbl<const N: usize>(d: &mut [u64; N], q: &[u64; N]) {
    let mut cc = 0;
    for i in 0..N {
        (d[i], cc) = addcarry_u64(d[i], d[i], cc);
    }
    reduce_carry(d, cc, q);
}

// d <- d + a mod q
#[inline(always)]
fn set_add<const N: usize>(d: &mut [u64; N], a: &[u64; N], q: &[u64; N]) {
    let mut cc = 0;
    for i in 0..N {
        (d[i], cc) = addcarry_u64(d[i], a[i], cc);
    }
    reduce_carry(d, cc, q);
}

// d <- a - b mod q
#[inline(always)]
fn sub_into<const N: usize>(d: &mut [u64; N],
    a: &[u64; N], b: &[u64; N], q: &[u64; N])
{
    let mut bb = 0;
    for i in 0..N {
        (d[i], bb) = subborrow_u64(a[i], b[i], bb);
    }
    let mm = (bb as u64).wrapping_neg();
    let mut cc = 0;
    for i in 0..N {
        (d[i], cc) = addcarry_u64(d[i], mm & q[i], cc);
    }
}

impl MontBackend for Portable {

    fn mul<const N: usize>(self, d: &mut [u64; N],
        a: &[u64; N], b: &[u64; N], m: &Modulus<N>)
    {
        let q = &m.q;
        let mut t = [0u64; N];

        // Combined muls + reduction. Two carry chains are maintained:
        // cc1 for the multiply-accumulate of a*b[i], cc2 for the
        // addition of g*q. Top bit of the accumulator is in cch.
        let mut cch = 0;
        for i in 0..N {
            let f = b[i];
            let (lo, mut cc1) = umull_add(f, a[0], t[0]);
            let g = lo.wrapping_mul(m.q_inv0);
            let (_, mut cc2) = umull_add(g, q[0], lo);
            for j in 1..N {
                let (x, hi1) = umull_add2(f, a[j], t[j], cc1);
                cc1 = hi1;
                let (x, hi2) = umull_add2(g, q[j], x, cc2);
                cc2 = hi2;
                t[j - 1] = x;
            }
            let (x, ee) = addcarry_u64(cc1, cc2, cch);
            t[N - 1] = x;
            cch = ee;
        }

        // Accumulator is lower than 2*q; final conditional subtraction.
        reduce_carry(&mut t, cch, q);
        *d = t;
    }

    #[inline]
    fn reduce<const N: usize>(self, d: &mut [u64; N], m: &Modulus<N>) {
        reduce_carry(d, 0, &m.q);
    }

    fn from_mont<const N: usize>(self, d: &mut [u64; N], m: &Modulus<N>) {
        let q = &m.q;

        // Each round adds f*q so that the low limb becomes zero, then
        // shifts by one limb. The value stays below 2^(64*N) and the
        // result is at most q.
        for _ in 0..N {
            let f = d[0].wrapping_mul(m.q_inv0);
            let (_, mut cc) = umull_add(f, q[0], d[0]);
            for i in 1..N {
                let (x, hi) = umull_add2(f, q[i], d[i], cc);
                d[i - 1] = x;
                cc = hi;
            }
            d[N - 1] = cc;
        }
        reduce_carry(d, 0, q);
    }

    #[inline]
    fn add<const N: usize>(self, d: &mut [u64; N],
        a: &[u64; N], b: &[u64; N], m: &Modulus<N>)
    {
        let mut t = *a;
        set_add(&mut t, b, &m.q);
        *d = t;
    }

    #[inline]
    fn sub<const N: usize>(self, d: &mut [u64; N],
        a: &[u64; N], b: &[u64; N], m: &Modulus<N>)
    {
        let mut t = [0u64; N];
        sub_into(&mut t, a, b, &m.q);
        *d = t;
    }

    fn mul_by3<const N: usize>(self, x: &mut [u64; N], m: &Modulus<N>) {
        let q = &m.q;
        let x1 = *x;
        set_dbl(x, q);
        set_add(x, &x1, q);
    }

    fn mul_by5<const N: usize>(self, x: &mut [u64; N], m: &Modulus<N>) {
        let q = &m.q;
        let x1 = *x;
        set_dbl(x, q);
        set_dbl(x, q);
        set_add(x, &x1, q);
    }

    fn mul_by13<const N: usize>(self, x: &mut [u64; N], m: &Modulus<N>) {
        let q = &m.q;
        let x1 = *x;
        set_dbl(x, q);
        set_dbl(x, q);
        let x4 = *x;
        set_dbl(x, q);
        set_add(x, &x4, q);
        set_add(x, &x1, q);
    }

    fn butterfly<const N: usize>(self,
        a: &mut [u64; N], b: &mut [u64; N], m: &Modulus<N>)
    {
        let q = &m.q;
        let x = *a;
        let y = *b;

        let mut s = [0u64; N];
        let mut cc = 0;
        for i in 0..N {
            (s[i], cc) = addcarry_u64(x[i], y[i], cc);
        }
        let mut t = [0u64; N];
        sub_into(&mut t, &x, &y, q);
        reduce_carry(&mut s, cc, q);

        *a = s;
        *b = t;
    }
}
