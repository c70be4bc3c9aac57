use core::arch::x86_64::{_addcarryx_u64, _mulx_u64, _subborrow_u64};

use super::{ccopy, probe, MontBackend};
use crate::modulus::Modulus;

/// Carry-chain accelerated implementation of the core operations
/// (x86-64 with ADX and BMI2).
///
/// Products are computed with `mulx`, which does not modify the flags,
/// so that the low and high halves of the partial products can be
/// accumulated along two independent carry chains (`adcx` and `adox`).
/// An instance can only be obtained through [`Adx::detect()`], which
/// guarantees that the CPU supports the required opcodes.
#[derive(Clone, Copy, Debug)]
pub struct Adx(());

impl Adx {

    /// Return an instance if the current CPU supports ADX and BMI2,
    /// `None` otherwise (or if the `portable` feature is set).
    #[inline(always)]
    pub fn detect() -> Option<Self> {
        if probe::carry_chain_ext() {
            Some(Adx(()))
        } else {
            None
        }
    }
}

// Add with carry; carry is 0 or 1.
#[inline]
#[target_feature(enable = "adx")]
unsafe fn adcx(x: u64, y: u64, c: u8) -> (u64, u8) {
    let mut d = 0u64;
    let cc = _addcarryx_u64(c, x, y, &mut d);
    (d, cc)
}

// Subtract with borrow; borrow is 0 or 1.
#[inline]
#[target_feature(enable = "adx")]
unsafe fn sbb(x: u64, y: u64, c: u8) -> (u64, u8) {
    let mut d = 0u64;
    let cc = _subborrow_u64(c, x, y, &mut d);
    (d, cc)
}

// Full product x*y, as (lo, hi). Flags are not modified.
#[inline]
#[target_feature(enable = "bmi2")]
unsafe fn mulx(x: u64, y: u64) -> (u64, u64) {
    let mut hi = 0u64;
    let lo = _mulx_u64(x, y, &mut hi);
    (lo, hi)
}

// Conditionally subtract the modulus from d + cc*2^(64*N) (which must
// be lower than 2*q).
#[inline]
#[target_feature(enable = "adx,bmi2")]
unsafe fn reduce_carry<const N: usize>(d: &mut [u64; N], cc: u8, q: &[u64; N]) {
    let mut t = [0u64; N];
    let mut bb = 0;
    for i in 0..N {
        (t[i], bb) = sbb(d[i], q[i], bb);
    }
    let mm = (cc as u64).wrapping_sub(bb as u64);
    ccopy(&mut t, d, mm);
    *d = t;
}

// d <- 2*d mod q
#[inline]
#[target_feature(enable = "adx,bmi2")]
unsafe fn set_dbl<const N: usize>(d: &mut [u64; N], q: &[u64; N]) {
    let mut cc = 0;
    for i in 0..N {
        (d[i], cc) = adcx(d[i], d[i], cc);
    }
    reduce_carry(d, cc, q);
}

// d <- d + a mod q
#[inline]
#[target_feature(enable = "adx,bmi2")]
unsafe fn set_add<const N: usize>(d: &mut [u64; N], a: &[u64; N], q: &[u64; N]) {
    let mut cc = 0;
    for i in 0..N {
        (d[i], cc) = adcx(d[i], a[i], cc);
    }
    reduce_carry(d, cc, q);
}

// d <- a - b mod q
#[inline]
#[target_feature(enable = "adx,bmi2")]
unsafe fn sub_into<const N: usize>(d: &mut [u64; N],
    a: &[u64; N], b: &[u64; N], q: &[u64; N])
{
    let mut bb = 0;
    for i in 0..N {
        (d[i], bb) = sbb(a[i], b[i], bb);
    }
    let mm = (bb as u64).wrapping_neg();
    let mut cc = 0;
    for i in 0..N {
        (d[i], cc) = adcx(d[i], mm & q[i], cc);
    }
}

// Add f*y to the N+1-word value (t, th). Low halves of the partial
// products go along one carry chain (c1), high halves along the other
// (c2). Returned value is the carry out of the top word (0, 1 or 2).
#[inline]
#[target_feature(enable = "adx,bmi2")]
unsafe fn muladd_row<const N: usize>(t: &mut [u64; N], th: &mut u64,
    y: &[u64; N], f: u64) -> u64
{
    let mut c1 = 0;
    let mut c2 = 0;
    let mut hp = 0u64;
    for j in 0..N {
        let (lo, hi) = mulx(y[j], f);
        (t[j], c1) = adcx(t[j], lo, c1);
        (t[j], c2) = adcx(t[j], hp, c2);
        hp = hi;
    }
    (*th, c1) = adcx(*th, hp, c1);
    (*th, c2) = adcx(*th, 0, c2);
    (c1 as u64) + (c2 as u64)
}

#[target_feature(enable = "adx,bmi2")]
unsafe fn mul_adx<const N: usize>(d: &mut [u64; N],
    a: &[u64; N], b: &[u64; N], m: &Modulus<N>)
{
    let q = &m.q;

    // Accumulator is (t, th), with th = 0 or 1 between rounds; th2
    // receives the transient overflow within a round.
    let mut t = [0u64; N];
    let mut th = 0u64;
    for i in 0..N {
        let mut th2 = muladd_row(&mut t, &mut th, a, b[i]);
        let g = t[0].wrapping_mul(m.q_inv0);
        th2 += muladd_row(&mut t, &mut th, q, g);

        // Low limb is now zero; shift down by one limb.
        for j in 1..N {
            t[j - 1] = t[j];
        }
        t[N - 1] = th;
        th = th2;
    }

    reduce_carry(&mut t, th as u8, q);
    *d = t;
}

#[target_feature(enable = "adx,bmi2")]
unsafe fn from_mont_adx<const N: usize>(d: &mut [u64; N], m: &Modulus<N>) {
    let q = &m.q;
    for _ in 0..N {
        let g = d[0].wrapping_mul(m.q_inv0);
        let mut c1 = 0;
        let mut c2 = 0;
        let mut hp = 0u64;
        for j in 0..N {
            let (lo, hi) = mulx(q[j], g);
            (d[j], c1) = adcx(d[j], lo, c1);
            (d[j], c2) = adcx(d[j], hp, c2);
            hp = hi;
        }

        // d + g*q < 2^(64*(N+1)): the top word cannot overflow.
        let (top, _) = adcx(hp, 0, c1);
        let (top, _) = adcx(top, 0, c2);
        for j in 1..N {
            d[j - 1] = d[j];
        }
        d[N - 1] = top;
    }
    reduce_carry(d, 0, q);
}

#[target_feature(enable = "adx,bmi2")]
unsafe fn mul_by3_adx<const N: usize>(x: &mut [u64; N], q: &[u64; N]) {
    let x1 = *x;
    set_dbl(x, q);
    set_add(x, &x1, q);
}

#[target_feature(enable = "adx,bmi2")]
unsafe fn mul_by5_adx<const N: usize>(x: &mut [u64; N], q: &[u64; N]) {
    let x1 = *x;
    set_dbl(x, q);
    set_dbl(x, q);
    set_add(x, &x1, q);
}

#[target_feature(enable = "adx,bmi2")]
unsafe fn mul_by13_adx<const N: usize>(x: &mut [u64; N], q: &[u64; N]) {
    let x1 = *x;
    set_dbl(x, q);
    set_dbl(x, q);
    let x4 = *x;
    set_dbl(x, q);
    set_add(x, &x4, q);
    set_add(x, &x1, q);
}

#[target_feature(enable = "adx,bmi2")]
unsafe fn butterfly_adx<const N: usize>(a: &mut [u64; N], b: &mut [u64; N],
    q: &[u64; N])
{
    let x = *a;
    let y = *b;

    let mut s = [0u64; N];
    let mut cc = 0;
    for i in 0..N {
        (s[i], cc) = adcx(x[i], y[i], cc);
    }
    let mut t = [0u64; N];
    sub_into(&mut t, &x, &y, q);
    reduce_carry(&mut s, cc, q);

    *a = s;
    *b = t;
}

// All methods below call target_feature functions. This is sound
// because an Adx instance exists only if the CPU supports ADX and BMI2.
impl MontBackend for Adx {

    #[inline]
    fn mul<const N: usize>(self, d: &mut [u64; N],
        a: &[u64; N], b: &[u64; N], m: &Modulus<N>)
    {
        unsafe { mul_adx(d, a, b, m) }
    }

    #[inline]
    fn reduce<const N: usize>(self, d: &mut [u64; N], m: &Modulus<N>) {
        unsafe { reduce_carry(d, 0, &m.q) }
    }

    #[inline]
    fn from_mont<const N: usize>(self, d: &mut [u64; N], m: &Modulus<N>) {
        unsafe { from_mont_adx(d, m) }
    }

    #[inline]
    fn add<const N: usize>(self, d: &mut [u64; N],
        a: &[u64; N], b: &[u64; N], m: &Modulus<N>)
    {
        let mut t = *a;
        unsafe { set_add(&mut t, b, &m.q) }
        *d = t;
    }

    #[inline]
    fn sub<const N: usize>(self, d: &mut [u64; N],
        a: &[u64; N], b: &[u64; N], m: &Modulus<N>)
    {
        let mut t = [0u64; N];
        unsafe { sub_into(&mut t, a, b, &m.q) }
        *d = t;
    }

    #[inline]
    fn mul_by3<const N: usize>(self, x: &mut [u64; N], m: &Modulus<N>) {
        unsafe { mul_by3_adx(x, &m.q) }
    }

    #[inline]
    fn mul_by5<const N: usize>(self, x: &mut [u64; N], m: &Modulus<N>) {
        unsafe { mul_by5_adx(x, &m.q) }
    }

    #[inline]
    fn mul_by13<const N: usize>(self, x: &mut [u64; N], m: &Modulus<N>) {
        unsafe { mul_by13_adx(x, &m.q) }
    }

    #[inline]
    fn butterfly<const N: usize>(self,
        a: &mut [u64; N], b: &mut [u64; N], m: &Modulus<N>)
    {
        unsafe { butterfly_adx(a, b, &m.q) }
    }
}
