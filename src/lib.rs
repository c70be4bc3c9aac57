//! Montfp is a Rust library for constant-time arithmetic in some fixed
//! prime fields, using Montgomery representation.
//!
//! The fields are the base fields of a few pairing-friendly curves:
//! BLS24-315 (5 limbs of 64 bits), BLS12-381 (6 limbs) and BW6-633 (10
//! limbs). All code is generic over the limb count, and a new field can
//! be defined by providing its modulus (see the `modulus` module); all
//! constants are then computed at compile time.
//!
//! The core operations (Montgomery multiplication, modular reduction,
//! conversion out of Montgomery representation, multiplication by small
//! constants, FFT butterfly) are implemented in `backend`, which contains
//! a portable implementation and, on x86-64, an implementation that uses
//! the ADX and BMI2 extensions (`mulx`, `adcx`, `adox`). The latter is
//! selected automatically when the CPU supports it; the detection is
//! performed only once. Both implementations return the same values.
//!
//! # Usage
//!
//! The library is `no_std` and never allocates. By default, it compiles
//! against the standard library, which is used only for runtime CPU
//! feature detection; without it, the accelerated implementation is
//! used only if the target features are enabled at compile time (e.g.
//! with `-C target-cpu=native` on a recent x86 CPU). The `portable`
//! feature disables the accelerated implementation altogether.
//!
//! # Conventions
//!
//! All implemented functions should be strictly constant-time, unless
//! explicitly documented otherwise (functions whose execution time may
//! depend on a public value have "pub" in their name). In order to avoid
//! unwanted side-channel leaks, Booleans are avoided. All functions that
//! return or use a potentially secret Boolean value use the `u32` type;
//! the convention is that 0xFFFFFFFF means "true", and 0x00000000 means
//! "false". No other value shall be used, for they would lead to
//! unpredictable results. Similarly, the `Eq` or `PartialEq` traits are
//! not implemented.
//!
//! Field elements are used with the usual operators (e.g. `+`);
//! appropriate traits are defined so that structure types and pointers to
//! structure types can be used more or less interchangeably. Functions
//! that modify the object on which they are called tend to have a name in
//! `set_*()` (e.g. `x.set_square()` squares `x` in place, while
//! `x.square()` leaves `x` unmodified and returns the square).

#![no_std]

#[cfg(feature = "std")]
#[macro_use]
extern crate std;

pub use rand_core::{CryptoRng, RngCore, Error as RngError};

pub mod backend;
pub mod modulus;
pub mod element;
pub mod field;

mod hash;
