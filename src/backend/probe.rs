//! Detection of the carry-chain multiply extension.
//!
//! On x86-64, the accelerated implementation needs both the ADX
//! (`adcx`/`adox`) and BMI2 (`mulx`) extensions. When the `std` feature
//! is enabled, availability is checked at runtime with CPUID; otherwise,
//! the compile-time target features decide. The `portable` feature
//! disables the accelerated path unconditionally.
//!
//! The outcome is computed on first use and cached for the lifetime of
//! the process. Concurrent first calls may run the detection more than
//! once; they all store the same value.

use core::sync::atomic::{AtomicU8, Ordering};

const UNKNOWN: u8 = 0;
const ABSENT: u8 = 1;
const PRESENT: u8 = 2;

static CARRY_CHAIN_EXT: AtomicU8 = AtomicU8::new(UNKNOWN);

/// Returns `true` if the current CPU supports the carry-chain multiply
/// extension used by the accelerated implementation (and that
/// implementation has not been disabled at compile time).
#[inline]
pub fn carry_chain_ext() -> bool {
    match CARRY_CHAIN_EXT.load(Ordering::Relaxed) {
        ABSENT => false,
        PRESENT => true,
        _ => {
            let r = detect();
            CARRY_CHAIN_EXT.store(if r { PRESENT } else { ABSENT },
                Ordering::Relaxed);
            r
        }
    }
}

#[cfg(all(
    not(feature = "portable"),
    target_arch = "x86_64",
    feature = "std"))]
fn detect() -> bool {
    std::is_x86_feature_detected!("adx")
        && std::is_x86_feature_detected!("bmi2")
}

#[cfg(all(
    not(feature = "portable"),
    target_arch = "x86_64",
    not(feature = "std")))]
fn detect() -> bool {
    cfg!(all(target_feature = "adx", target_feature = "bmi2"))
}

#[cfg(any(
    feature = "portable",
    not(target_arch = "x86_64")))]
fn detect() -> bool {
    false
}

#[cfg(test)]
mod tests {

    use super::carry_chain_ext;

    #[test]
    fn probe_is_stable() {
        let r = carry_chain_ext();
        for _ in 0..10 {
            assert!(carry_chain_ext() == r);
        }
        #[cfg(any(feature = "portable", not(target_arch = "x86_64")))]
        assert!(!r);
    }
}
