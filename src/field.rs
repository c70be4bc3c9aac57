//! Finite fields.
//!
//! This module defines the base fields of a few pairing-friendly curves.
//! These are merely specializations of the generic [`Element`] type,
//! each with its own marker type holding the modulus:
//!
//!  - `GFbls24_315`: base field of BLS24-315 (5 limbs, 315 bits).
//!  - `GFbls12_381`: base field of BLS12-381 (6 limbs, 381 bits).
//!  - `GFbw6_633`: base field of BW6-633 (10 limbs, 633 bits).
//!
//! For BLS24-315 and BW6-633, `q = 1 mod 4`, and the modulus comes with
//! a primitive `2^s`-th root of unity for square roots (`13^t` and
//! `2^t`, respectively, with `t` the odd part of `q - 1`).
//!
//! [`Element`]: crate::element::Element

#[allow(unused_imports)]
use crate::element::Element;
#[allow(unused_imports)]
use crate::modulus::{FieldParams, Modulus};

/// Parameters for the base field of BLS24-315.
#[cfg(feature = "bls24_315")]
#[derive(Clone, Copy, Debug)]
pub struct Bls24_315;

#[cfg(feature = "bls24_315")]
impl FieldParams<5> for Bls24_315 {
    const MODULUS: Modulus<5> = Modulus::new([
        0x6FE802FF40300001,
        0x421EE5DA52BDE502,
        0xDEC1D01AA27A1AE0,
        0xD3F7498BE97C5EAF,
        0x04C23A02B586D650,
    ]).with_two_adic_root([
        0x282FC3517AFEB931,
        0x584A3A78AF390FBD,
        0xA8F03567F049DDA5,
        0x3CB12686B61F0C42,
        0x0099283E6AFD85DA,
    ]);
}

/// Base field of BLS24-315.
#[cfg(feature = "bls24_315")]
#[allow(non_camel_case_types)]
pub type GFbls24_315 = Element<Bls24_315, 5>;

/// Parameters for the base field of BLS12-381.
#[cfg(feature = "bls12_381")]
#[derive(Clone, Copy, Debug)]
pub struct Bls12_381;

#[cfg(feature = "bls12_381")]
impl FieldParams<6> for Bls12_381 {
    const MODULUS: Modulus<6> = Modulus::new([
        0xB9FEFFFFFFFFAAAB,
        0x1EABFFFEB153FFFF,
        0x6730D2A0F6B0F624,
        0x64774B84F38512BF,
        0x4B1BA7B6434BACD7,
        0x1A0111EA397FE69A,
    ]);
}

/// Base field of BLS12-381.
#[cfg(feature = "bls12_381")]
#[allow(non_camel_case_types)]
pub type GFbls12_381 = Element<Bls12_381, 6>;

/// Parameters for the base field of BW6-633.
#[cfg(feature = "bw6_633")]
#[derive(Clone, Copy, Debug)]
pub struct Bw6_633;

#[cfg(feature = "bw6_633")]
impl FieldParams<10> for Bw6_633 {
    const MODULUS: Modulus<10> = Modulus::new([
        0xD74916EA4570000D,
        0x3D369BD31147F73C,
        0xD7B5CE7AB839C225,
        0x7E0E8850EDBDA407,
        0xB8DA9F5E83F57C49,
        0x8152A6C0FADEA490,
        0x4E59769AD9BBDA2F,
        0xA8FCD8C75D79D2C7,
        0xFC1A174F01D72AB5,
        0x0126633CC0F35F63,
    ]).with_two_adic_root([
        0x2E522E9CB5A36FAF,
        0x837F113E3A8AF804,
        0xD593FE26B06BF3F9,
        0x9FAEEBBFF5577894,
        0x6E7743E6CC65F921,
        0x0C21FFA1FF316E4E,
        0xC7FB644C6AA360A7,
        0xEF7AC0C6BCF8F412,
        0x7E0DAA2A9EBDA7B7,
        0x004B8904739F0F93,
    ]);
}

/// Base field of BW6-633.
#[cfg(feature = "bw6_633")]
#[allow(non_camel_case_types)]
pub type GFbw6_633 = Element<Bw6_633, 10>;
