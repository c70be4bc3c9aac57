//! Field elements.
//!
//! `Element<P, N>` is an element of the prime field defined by the
//! parameter type `P` (see [`FieldParams`]), with `N` 64-bit limbs. The
//! value is kept in Montgomery representation (`x*R mod q`, with
//! `R = 2^(64*N)`), always fully reduced. All core computations are
//! delegated to the functions of the [`backend`](crate::backend) module,
//! and thus use the accelerated implementation when available.
//!
//! All operations are constant-time, except those which are explicitly
//! documented as depending on public data only (`pow_pub()`, the
//! length checks in decoding functions).

use core::marker::PhantomData;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::backend::{self, addcarry_u64, subborrow_u64};
use crate::hash::ExpandMsgXmd;
use crate::modulus::FieldParams;
use crate::{CryptoRng, RngCore};

/// An element of the field defined by `P`.
#[derive(Clone, Copy, Debug)]
pub struct Element<P: FieldParams<N>, const N: usize>([u64; N], PhantomData<P>);

// Compute a - b (as integers, assuming a >= b), at compile time.
const fn const_sub<const N: usize>(a: [u64; N], b: [u64; N]) -> [u64; N] {
    let mut d = [0u64; N];
    let mut cc = 0;
    let mut i = 0;
    while i < N {
        let (w, ee) = subborrow_u64(a[i], b[i], cc);
        d[i] = w;
        cc = ee;
        i += 1;
    }
    d
}

impl<P: FieldParams<N>, const N: usize> Element<P, N> {

    // Element encoded length, in bytes.
    pub const ENC_LEN: usize = P::MODULUS.enc_len;

    // Modulus (little-endian order, 64-bit limbs).
    pub const MODULUS: [u64; N] = P::MODULUS.q;

    pub const ZERO: Self = Self([0u64; N], PhantomData);
    pub const ONE: Self = Self(P::MODULUS.r, PhantomData);
    pub const MINUS_ONE: Self = Self(
        const_sub(P::MODULUS.q, P::MODULUS.r), PhantomData);

    // The element of value R; a multiplication by this element is a
    // shift by 64*N bits.
    const RR: Self = Self(P::MODULUS.r2, PhantomData);

    /// Create an element from its Montgomery representation (64-bit
    /// limbs, little-endian order). The provided value MUST be lower
    /// than the modulus; this is not verified.
    #[inline(always)]
    pub const fn from_montgomery_limbs(x: [u64; N]) -> Self {
        Self(x, PhantomData)
    }

    /// Get the Montgomery representation of this element (64-bit limbs,
    /// little-endian order).
    #[inline(always)]
    pub fn montgomery_limbs(self) -> [u64; N] {
        self.0
    }

    // Create an element from its 64-bit limbs, provided in little-endian
    // order (least significant limb first). This function can be used
    // in constant expressions; at runtime, it is slower than
    // from_w64le() (but still constant-time).
    //
    // Note: if the value is numerically larger than the modulus, then
    // it is implicitly reduced.
    pub const fn w64le(x: [u64; N]) -> Self {
        Self(P::MODULUS.mont_mul(x, P::MODULUS.r2), PhantomData)
    }

    // Create an element from its 64-bit limbs, provided in big-endian
    // order (most significant limb first). Like w64le(), this can be
    // used in constant expressions.
    pub const fn w64be(x: [u64; N]) -> Self {
        let mut y = [0u64; N];
        let mut i = 0;
        while i < N {
            y[i] = x[N - 1 - i];
            i += 1;
        }
        Self::w64le(y)
    }

    // Create an element from its 64-bit limbs, provided in little-endian
    // order (least significant limb first).
    //
    // Note: if the value is numerically larger than the modulus, then
    // it is implicitly reduced.
    #[inline(always)]
    pub fn from_w64le(x: [u64; N]) -> Self {
        let mut r = Self(x, PhantomData);
        r.set_mul(&Self::RR);
        r
    }

    // Create an element from its 64-bit limbs, provided in big-endian
    // order (most significant limb first).
    //
    // Note: if the value is numerically larger than the modulus, then
    // it is implicitly reduced.
    #[inline(always)]
    pub fn from_w64be(x: [u64; N]) -> Self {
        let mut y = [0u64; N];
        for i in 0..N {
            y[i] = x[N - 1 - i];
        }
        Self::from_w64le(y)
    }

    // 2^64, as a field element.
    #[inline(always)]
    fn t64() -> Self {
        let mut d = [0u64; N];
        d[1] = 1;
        Self::from_w64le(d)
    }

    // Create an element by converting the provided integer (implicitly
    // reduced modulo the field order).
    #[inline(always)]
    pub fn from_i32(x: i32) -> Self {
        let mut d = [0u64; N];
        d[0] = x as u64;
        let mut r = Self::from_w64le(d);
        r.set_cond(&(r - Self::t64()), (x >> 31) as u32);
        r
    }

    // Create an element by converting the provided integer (implicitly
    // reduced modulo the field order).
    #[inline(always)]
    pub fn from_u32(x: u32) -> Self {
        let mut d = [0u64; N];
        d[0] = x as u64;
        Self::from_w64le(d)
    }

    // Create an element by converting the provided integer (implicitly
    // reduced modulo the field order).
    #[inline(always)]
    pub fn from_i64(x: i64) -> Self {
        let mut d = [0u64; N];
        d[0] = x as u64;
        let mut r = Self::from_w64le(d);
        r.set_cond(&(r - Self::t64()), (x >> 63) as u32);
        r
    }

    // Create an element by converting the provided integer (implicitly
    // reduced modulo the field order).
    #[inline(always)]
    pub fn from_u64(x: u64) -> Self {
        let mut d = [0u64; N];
        d[0] = x;
        Self::from_w64le(d)
    }

    // Create an element by converting the provided integer (implicitly
    // reduced modulo the field order).
    #[inline(always)]
    pub fn from_u128(x: u128) -> Self {
        let mut d = [0u64; N];
        d[0] = x as u64;
        d[1] = (x >> 64) as u64;
        Self::from_w64le(d)
    }

    // Create an element by converting the provided integer (implicitly
    // reduced modulo the field order).
    #[inline(always)]
    pub fn from_i128(x: i128) -> Self {
        let mut r = Self::from_u128(x as u128);
        r.set_cond(&(r - Self::t64().square()), (x >> 127) as u32);
        r
    }

    /// Get the value of this element as an integer in the `0` to `q-1`
    /// range (64-bit limbs, little-endian order).
    #[inline(always)]
    pub fn to_w64le(self) -> [u64; N] {
        let mut d = self.0;
        backend::from_mont(&mut d, &P::MODULUS);
        d
    }

    #[inline(always)]
    fn set_add(&mut self, rhs: &Self) {
        let a = self.0;
        backend::add(&mut self.0, &a, &rhs.0, &P::MODULUS);
    }

    #[inline(always)]
    fn set_sub(&mut self, rhs: &Self) {
        let a = self.0;
        backend::sub(&mut self.0, &a, &rhs.0, &P::MODULUS);
    }

    // Negate this element.
    #[inline(always)]
    pub fn set_neg(&mut self) {
        let a = self.0;
        backend::sub(&mut self.0, &[0u64; N], &a, &P::MODULUS);
    }

    #[inline(always)]
    fn set_mul(&mut self, rhs: &Self) {
        let a = self.0;
        backend::mul(&mut self.0, &a, &rhs.0, &P::MODULUS);
    }

    #[inline]
    pub fn set_cond(&mut self, a: &Self, ctl: u32) {
        let cw = ((ctl as i32) as i64) as u64;
        for i in 0..N {
            self.0[i] ^= cw & (self.0[i] ^ a.0[i]);
        }
    }

    #[inline]
    pub fn select(a0: &Self, a1: &Self, ctl: u32) -> Self {
        let mut r = *a0;
        r.set_cond(a1, ctl);
        r
    }

    #[inline]
    pub fn cswap(a: &mut Self, b: &mut Self, ctl: u32) {
        let cw = ((ctl as i32) as i64) as u64;
        for i in 0..N {
            let t = cw & (a.0[i] ^ b.0[i]);
            a.0[i] ^= t;
            b.0[i] ^= t;
        }
    }

    /// Square this value.
    #[inline(always)]
    pub fn set_square(&mut self) {
        let a = self.0;
        backend::mul(&mut self.0, &a, &a, &P::MODULUS);
    }

    /// Compute the square of this value.
    #[inline(always)]
    pub fn square(self) -> Self {
        let mut r = self;
        r.set_square();
        r
    }

    /// Square this value `n` times.
    #[inline(always)]
    pub fn set_xsquare(&mut self, n: u32) {
        for _ in 0..n {
            self.set_square();
        }
    }

    /// Square this value `n` times.
    #[inline(always)]
    pub fn xsquare(self, n: u32) -> Self {
        let mut r = self;
        r.set_xsquare(n);
        r
    }

    /// Halve this value.
    #[inline]
    pub fn set_half(&mut self) {
        let q = &P::MODULUS.q;
        let m = (self.0[0] & 1).wrapping_neg();
        let (mut dd, mut cc) = addcarry_u64(self.0[0], m & q[0], 0);
        dd >>= 1;
        for i in 1..N {
            let (x, ee) = addcarry_u64(self.0[i], m & q[i], cc);
            cc = ee;
            self.0[i - 1] = dd | (x << 63);
            dd = x >> 1;
        }
        self.0[N - 1] = dd | ((cc as u64) << 63);
    }

    /// Compute the half of this value.
    #[inline(always)]
    pub fn half(self) -> Self {
        let mut r = self;
        r.set_half();
        r
    }

    #[inline(always)]
    pub fn set_mul2(&mut self) {
        let a = self.0;
        backend::add(&mut self.0, &a, &a, &P::MODULUS);
    }

    #[inline(always)]
    pub fn mul2(self) -> Self {
        let mut r = self;
        r.set_mul2();
        r
    }

    #[inline(always)]
    pub fn set_mul3(&mut self) {
        backend::mul_by3(&mut self.0, &P::MODULUS);
    }

    #[inline(always)]
    pub fn mul3(self) -> Self {
        let mut r = self;
        r.set_mul3();
        r
    }

    #[inline(always)]
    pub fn set_mul5(&mut self) {
        backend::mul_by5(&mut self.0, &P::MODULUS);
    }

    #[inline(always)]
    pub fn mul5(self) -> Self {
        let mut r = self;
        r.set_mul5();
        r
    }

    #[inline(always)]
    pub fn set_mul13(&mut self) {
        backend::mul_by13(&mut self.0, &P::MODULUS);
    }

    #[inline(always)]
    pub fn mul13(self) -> Self {
        let mut r = self;
        r.set_mul13();
        r
    }

    /// Replace `(a, b)` with `(a + b, a - b)`.
    #[inline(always)]
    pub fn butterfly(a: &mut Self, b: &mut Self) {
        backend::butterfly(&mut a.0, &mut b.0, &P::MODULUS);
    }

    // Raise this value to the provided exponent (unsigned integer,
    // 64-bit limbs in little-endian order, any number of limbs). The
    // exponent is considered public: execution time and memory access
    // pattern depend on its value (but not on this element's value).
    // A zero exponent yields one.
    pub fn set_pow_pub(&mut self, e: &[u64]) {
        // Make a 4-bit window; win[i] contains x^(i+1)
        let mut win = [Self::ZERO; 15];
        win[0] = *self;
        for i in 1..8 {
            let j = i * 2;
            win[j - 1] = win[i - 1].square();
            win[j] = win[j - 1] * win[0];
        }

        // Explore 4-bit chunks of the exponent, high to low. Skip leading
        // chunks of value 0.
        let mut z = false;
        for i in (0..e.len()).rev() {
            let ew = e[i];
            for j in (0..16).rev() {
                if z {
                    self.set_xsquare(4);
                }
                let c = ((ew >> (j << 2)) & 0x0F) as usize;
                if c != 0 {
                    if z {
                        self.set_mul(&win[c - 1]);
                    } else {
                        z = true;
                        *self = win[c - 1];
                    }
                }
            }
        }
        if !z {
            *self = Self::ONE;
        }
    }

    #[inline(always)]
    pub fn pow_pub(self, e: &[u64]) -> Self {
        let mut r = self;
        r.set_pow_pub(e);
        r
    }

    // Invert this value (Fermat's little theorem: x^(q-2)). If this
    // value is zero, then it remains zero. The exponent depends only on
    // the modulus, hence this is constant-time.
    #[inline]
    pub fn set_invert(&mut self) {
        self.set_pow_pub(&P::MODULUS.qm2);
    }

    #[inline(always)]
    pub fn invert(self) -> Self {
        let mut r = self;
        r.set_invert();
        r
    }

    // Divide this value by y. If y is zero, then this sets this value to
    // zero.
    #[inline]
    fn set_div(&mut self, y: &Self) {
        let r = y.invert();
        self.set_mul(&r);
    }

    // Perform a batch inversion of some elements. All elements of the
    // slice are replaced with their respective inverses (elements of
    // value zero are kept unchanged).
    pub fn batch_invert(xx: &mut [Self]) {
        // We use Montgomery's trick:
        //   1/u = v*(1/(u*v))
        //   1/v = u*(1/(u*v))
        // Applied recursively on n elements, this computes an
        // inversion with a single inversion in the field, and
        // 3*(n-1) multiplications. We use fixed-size sub-batches of
        // elements so that we may use stack allocation.
        const SUBLEN: usize = 64;

        let n = xx.len();
        let mut i = 0;
        while i < n {
            let blen = if (n - i) > SUBLEN { SUBLEN } else { n - i };
            let mut tt = [Self::ZERO; SUBLEN];
            tt[0] = xx[i];
            let zz0 = tt[0].iszero();
            tt[0].set_cond(&Self::ONE, zz0);
            for j in 1..blen {
                tt[j] = xx[i + j];
                tt[j].set_cond(&Self::ONE, tt[j].iszero());
                tt[j] *= tt[j - 1];
            }
            let mut k = tt[blen - 1].invert();
            for j in (1..blen).rev() {
                let mut x = xx[i + j];
                let zz = x.iszero();
                x.set_cond(&Self::ONE, zz);
                xx[i + j].set_cond(&(k * tt[j - 1]), !zz);
                k *= x;
            }
            xx[i].set_cond(&k, !zz0);
            i += blen;
        }
    }

    /// Legendre symbol on this value. Return value is:
    ///   0   if this value is zero
    ///  +1   if this value is a non-zero quadratic residue
    ///  -1   if this value is not a quadratic residue
    pub fn legendre(self) -> i32 {
        // Euler's criterion: x^((q-1)/2) is 1 or -1 (or 0, if x = 0).
        let t = self.pow_pub(&P::MODULUS.qm1h);
        let r = 1u32.wrapping_sub(t.equals(Self::MINUS_ONE) & 2);
        (r & !self.iszero()) as i32
    }

    // Set this value to its square root. Returned value is 0xFFFFFFFF
    // if the operation succeeded (value was indeed a quadratic residue),
    // 0 otherwise (value was not a quadratic residue). In the latter case,
    // this value is set to zero as well.
    // When this operation succeeds, the returned square root is the one
    // whose least significant bit is 0 (when normalized in 0..q-1).
    //
    // This operation returns unspecified results if the modulus is not
    // prime. If q = 1 mod 4 and the modulus was not given a 2-adic root
    // of unity, then this function panics.
    pub fn set_sqrt(&mut self) -> u32 {
        let m = &P::MODULUS;
        let x = *self;

        // Tonelli-Shanks, with a fixed number of iterations and
        // squarings (these depend only on the modulus). With q-1 = t*2^s:
        //   z <- x^((t+1)/2)
        //   u <- x^t
        //   c <- primitive 2^s-th root of unity
        // Then z^2 = u*x, and u has order dividing 2^(s-1) when x is a
        // square. Each step removes the top bit of the order of u.
        // For s = 1, this is simply z = x^((q+1)/4).
        let mut z = x.pow_pub(&m.sqrt_exp);
        let mut u = z.square() * x;
        z *= x;
        if m.two_adicity > 1 {
            let mut c = Self::from_w64le(m.two_adic_root);
            assert!(c.iszero() == 0, "no 2-adic root of unity for this modulus");
            for i in (2..=m.two_adicity).rev() {
                let b = u.xsquare(i - 2);
                let e = b.equals(Self::ONE);
                z.set_cond(&(z * c), !e);
                c.set_square();
                u.set_cond(&(u * c), !e);
            }
        }

        // Normalize square root so that its least significant bit is 0.
        let lsb = ((z.to_w64le()[0] as u32) & 1).wrapping_neg();
        z.set_cond(&-z, lsb);

        let r = z.square().equals(x);
        z.set_cond(&Self::ZERO, !r);
        *self = z;
        r
    }

    #[inline(always)]
    pub fn sqrt(self) -> (Self, u32) {
        let mut x = self;
        let r = x.set_sqrt();
        (x, r)
    }

    // Equality check (constant-time): returned value is 0xFFFFFFFF on
    // equality, 0 otherwise.
    #[inline]
    pub fn equals(self, rhs: Self) -> u32 {
        let mut r = 0;
        for i in 0..N {
            r |= self.0[i] ^ rhs.0[i];
        }
        ((r | r.wrapping_neg()) >> 63).wrapping_sub(1) as u32
    }

    // Compare this value with zero (constant-time): returned value
    // is 0xFFFFFFFF if this element is zero, 0 otherwise.
    #[inline]
    pub fn iszero(self) -> u32 {
        let mut r = 0;
        for i in 0..N {
            r |= self.0[i];
        }
        ((r | r.wrapping_neg()) >> 63).wrapping_sub(1) as u32
    }

    /// Encode this value into bytes (unsigned little-endian encoding
    /// of the value, normalized to `0..q-1`, with the same size as
    /// the modulus). The destination slice MUST have length exactly
    /// `Self::ENC_LEN`.
    pub fn encode(self, buf: &mut [u8]) {
        assert!(buf.len() == Self::ENC_LEN);
        let x = self.to_w64le();
        for i in 0..N {
            let j = i << 3;
            let k = core::cmp::min(8, Self::ENC_LEN - j);
            buf[j..(j + k)].copy_from_slice(&x[i].to_le_bytes()[..k]);
        }
    }

    // Decode up to 8*N bytes from the provided slice, into an integer
    // value, with unsigned little-endian convention. The value is stored
    // as-is, unreduced and not converted to Montgomery representation.
    fn set_decode_raw(&mut self, buf: &[u8]) {
        let n = buf.len();
        for i in 0..N {
            let j = i << 3;
            let mut tmp = [0u8; 8];
            if j < n {
                let k = core::cmp::min(8, n - j);
                tmp[..k].copy_from_slice(&buf[j..(j + k)]);
            }
            self.0[i] = u64::from_le_bytes(tmp);
        }
    }

    // Decode a value from bytes. If the provided slice length
    // matches the modulus length exactly (`Self::ENC_LEN`), _and_
    // the unsigned little-endian interpretation of these bytes is
    // an integer in the 0 to q-1 range, then this value is set to
    // that integer, and 0xFFFFFFFF is returned. Otherwise (wrong length,
    // or value not lower than the modulus), this value is set to zero,
    // and 0x00000000 is returned.
    pub fn set_decode_ct(&mut self, buf: &[u8]) -> u32 {
        if buf.len() != Self::ENC_LEN {
            // We cannot hide from side-channels the length of the
            // input slice, so we can return early here.
            *self = Self::ZERO;
            return 0;
        }
        self.set_decode_raw(buf);

        // Subtracting the modulus must yield a borrow; otherwise, this
        // is a non-canonical input.
        let q = &P::MODULUS.q;
        let mut cc = 0;
        for i in 0..N {
            (_, cc) = subborrow_u64(self.0[i], q[i], cc);
        }
        let r = (cc as u32).wrapping_neg();
        self.set_cond(&Self::ZERO, !r);

        // Convert to Montgomery representation.
        self.set_mul(&Self::RR);
        r
    }

    #[inline(always)]
    pub fn decode_ct(buf: &[u8]) -> (Self, u32) {
        let mut x = Self::ZERO;
        let r = x.set_decode_ct(buf);
        (x, r)
    }

    // Decode a value from bytes (same rules as `decode_ct()`, but
    // failure is reported with `None`). Side-channel analysis may reveal
    // to outsiders whether the decoding succeeded or not.
    #[inline(always)]
    pub fn decode(buf: &[u8]) -> Option<Self> {
        let (x, r) = Self::decode_ct(buf);
        if r != 0 {
            Some(x)
        } else {
            None
        }
    }

    // Decode a value from bytes. The source bytes are interpreted as
    // the unsigned little-endian representation of an integer, which
    // is then reduced modulo the field modulus. This function cannot
    // fail.
    pub fn set_decode_reduce(&mut self, buf: &[u8]) {
        let n = buf.len();
        if n == 0 {
            *self = Self::ZERO;
            return;
        }

        // Chunks of 8*N bytes are processed in high-to-low order. For
        // each new chunk, the raw chunk value is added to the current
        // value, which is then multiplied by R; the Montgomery
        // multiplication accepts an unreduced operand and outputs a
        // reduced value, so it suffices to subtract the modulus on a
        // non-zero carry.
        let chunk_len = N << 3;
        let mut j = n - (n % chunk_len);
        if j == n {
            j -= chunk_len;
        }
        self.set_decode_raw(&buf[j..]);
        self.set_mul(&Self::RR);

        let q = &P::MODULUS.q;
        while j >= chunk_len {
            j -= chunk_len;

            let mut x = Self::ZERO;
            x.set_decode_raw(&buf[j..(j + chunk_len)]);

            let mut cc = 0;
            for i in 0..N {
                (self.0[i], cc) = addcarry_u64(self.0[i], x.0[i], cc);
            }
            let m = (cc as u64).wrapping_neg();
            let mut bb = 0;
            for i in 0..N {
                (self.0[i], bb) = subborrow_u64(self.0[i], m & q[i], bb);
            }

            self.set_mul(&Self::RR);
        }
    }

    #[inline(always)]
    pub fn decode_reduce(buf: &[u8]) -> Self {
        let mut r = Self::ZERO;
        r.set_decode_reduce(buf);
        r
    }

    /// Hash a message into field elements (`hash_to_field` from RFC
    /// 9380, with `expand_message_xmd` over SHA-256). All slots of
    /// `out` are filled; each element is obtained from `ENC_LEN + 16`
    /// bytes, interpreted with the big-endian convention and reduced
    /// modulo `q`.
    ///
    /// The domain separation tag must not be longer than 255 bytes,
    /// and the total output must not exceed 255 SHA-256 blocks;
    /// otherwise, this function panics.
    pub fn hash_to_field(msg: &[u8], dst: &[u8], out: &mut [Self]) {
        let len = Self::ENC_LEN + 16;
        let mut buf = [0u8; 256];
        assert!(len <= buf.len());
        let mut xmd = ExpandMsgXmd::new(msg, dst, out.len() * len);
        for x in out.iter_mut() {
            let v = &mut buf[..len];
            xmd.read(v);
            v.reverse();
            x.set_decode_reduce(v);
        }
    }

    /// Get a random element, from the provided random source. The
    /// element is obtained by reducing a random `128*N`-bit integer,
    /// so that the bias is negligible.
    pub fn random<T: CryptoRng + RngCore>(rng: &mut T) -> Self {
        let mut lo = [0u64; N];
        let mut hi = [0u64; N];
        for i in 0..N {
            lo[i] = rng.next_u64();
        }
        for i in 0..N {
            hi[i] = rng.next_u64();
        }
        Self::from_w64le(hi) * Self::RR + Self::from_w64le(lo)
    }
}

// ========================================================================
// Implementations of all the traits needed to use the simple operators
// (+, *, /...) on field element instances, with or without references.

macro_rules! impl_binop {
    ($optr:ident, $opfn:ident, $asgtr:ident, $asgfn:ident, $setfn:ident) => {
        impl<P: FieldParams<N>, const N: usize> $optr<Element<P, N>>
            for Element<P, N>
        {
            type Output = Element<P, N>;

            #[inline(always)]
            fn $opfn(self, other: Element<P, N>) -> Element<P, N> {
                let mut r = self;
                r.$setfn(&other);
                r
            }
        }

        impl<P: FieldParams<N>, const N: usize> $optr<&Element<P, N>>
            for Element<P, N>
        {
            type Output = Element<P, N>;

            #[inline(always)]
            fn $opfn(self, other: &Element<P, N>) -> Element<P, N> {
                let mut r = self;
                r.$setfn(other);
                r
            }
        }

        impl<P: FieldParams<N>, const N: usize> $optr<Element<P, N>>
            for &Element<P, N>
        {
            type Output = Element<P, N>;

            #[inline(always)]
            fn $opfn(self, other: Element<P, N>) -> Element<P, N> {
                let mut r = *self;
                r.$setfn(&other);
                r
            }
        }

        impl<P: FieldParams<N>, const N: usize> $optr<&Element<P, N>>
            for &Element<P, N>
        {
            type Output = Element<P, N>;

            #[inline(always)]
            fn $opfn(self, other: &Element<P, N>) -> Element<P, N> {
                let mut r = *self;
                r.$setfn(other);
                r
            }
        }

        impl<P: FieldParams<N>, const N: usize> $asgtr<Element<P, N>>
            for Element<P, N>
        {
            #[inline(always)]
            fn $asgfn(&mut self, other: Element<P, N>) {
                self.$setfn(&other);
            }
        }

        impl<P: FieldParams<N>, const N: usize> $asgtr<&Element<P, N>>
            for Element<P, N>
        {
            #[inline(always)]
            fn $asgfn(&mut self, other: &Element<P, N>) {
                self.$setfn(other);
            }
        }
    }
}

impl_binop!(Add, add, AddAssign, add_assign, set_add);
impl_binop!(Sub, sub, SubAssign, sub_assign, set_sub);
impl_binop!(Mul, mul, MulAssign, mul_assign, set_mul);
impl_binop!(Div, div, DivAssign, div_assign, set_div);

impl<P: FieldParams<N>, const N: usize> Neg for Element<P, N> {
    type Output = Element<P, N>;

    #[inline(always)]
    fn neg(self) -> Element<P, N> {
        let mut r = self;
        r.set_neg();
        r
    }
}

impl<P: FieldParams<N>, const N: usize> Neg for &Element<P, N> {
    type Output = Element<P, N>;

    #[inline(always)]
    fn neg(self) -> Element<P, N> {
        let mut r = *self;
        r.set_neg();
        r
    }
}
