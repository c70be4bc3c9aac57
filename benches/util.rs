#[cfg(target_arch = "x86_64")]
pub fn core_cycles() -> u64 {
    use core::arch::x86_64::{_mm_lfence, _rdtsc};
    unsafe {
        _mm_lfence();
        _rdtsc()
    }
}

#[cfg(target_arch = "aarch64")]
pub fn core_cycles() -> u64 {
    use core::arch::asm;
    let mut x: u64;
    unsafe {
        asm!("dsb sy", "mrs {}, pmccntr_el0", out(reg) x);
    }
    x
}

// Run `f` (which performs `ops` operations) 30 times; the first 20 runs
// are warm-up. Returned value is the median cost of one operation over
// the last 10 runs, in cycles.
pub fn median_cycles<F: FnMut()>(ops: usize, mut f: F) -> f64 {
    let mut tt = [0; 10];
    for i in 0..30 {
        let begin = core_cycles();
        f();
        let end = core_cycles();
        if i >= 20 {
            tt[i - 20] = end.wrapping_sub(begin);
        }
    }
    tt.sort();
    (tt[4] as f64) / (ops as f64)
}
