use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// `numerator / denominator` as a fraction clamped to `0..=1`.
/// A zero denominator yields zero.
#[inline]
pub fn ratio(numerator: u32, denominator: u32) -> Fixed64 {
    if denominator == 0 {
        return Fixed64::ZERO;
    }
    if numerator >= denominator {
        return Fixed64::ONE;
    }
    // Both operands may exceed the integer range of Q32.32, so divide in
    // raw bits: (n << 32) / d fits because n < d.
    let bits = ((numerator as u64) << 32) / denominator as u64;
    Fixed64::from_bits(bits as i64)
}
