//! Fixed-width bit helpers
//!
//! The hardware is described in terms of signal slices (`y[15:8]`,
//! `product[27:12]`, 10-bit counters). These helpers make each slice and
//! sign extension an explicit, typed operation instead of ad hoc casts.

/// Mask for a 10-bit counter
pub const MASK_10: u16 = 0x03FF;

/// Extract bits `hi..=lo` of `value`, right-aligned
///
/// `hi` must be `>= lo` and `< 32`.
#[inline]
pub const fn slice(value: u32, hi: u32, lo: u32) -> u32 {
    let width = hi - lo + 1;
    let mask = if width >= 32 { u32::MAX } else { (1u32 << width) - 1 };
    (value >> lo) & mask
}

/// Sign-extend the low `bits` bits of `value` to an `i32`
///
/// `bits` must be in `1..=32`.
#[inline]
pub const fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

/// Sign-extend bits 15..8 of a 16-bit word (`sext(v[15:8])`)
///
/// Equivalent to an arithmetic shift right by 8, spelled out as a slice so
/// the oscillator reads like the hardware description it mirrors.
#[inline]
pub const fn high_byte_signed(value: i16) -> i16 {
    sign_extend(slice(value as u16 as u32, 15, 8), 8) as i16
}

/// 16-bit add returning the sum and the carry out of bit 15 (bit 16 of the
/// 17-bit result)
#[inline]
pub const fn add_with_carry(a: u16, b: u16) -> (u16, bool) {
    a.overflowing_add(b)
}

/// Bits 27..12 of a 32-bit signed product, reinterpreted as `i16`
///
/// Drops the 12 fractional bits and everything above bit 27; no rounding,
/// no saturation.
#[inline]
pub const fn product_bits_27_12(product: i32) -> i16 {
    slice(product as u32, 27, 12) as u16 as i16
}

/// Increment a 10-bit counter with wraparound
#[inline]
pub const fn inc_10(value: u16) -> u16 {
    value.wrapping_add(1) & MASK_10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice() {
        assert_eq!(slice(0xABCD, 15, 8), 0xAB);
        assert_eq!(slice(0xABCD, 7, 0), 0xCD);
        assert_eq!(slice(0xFFFF_FFFF, 31, 0), 0xFFFF_FFFF);
        assert_eq!(slice(0b1011_0000, 7, 4), 0b1011);
    }

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0x7F, 8), 127);
        assert_eq!(sign_extend(0x80, 8), -128);
        assert_eq!(sign_extend(0xFF, 8), -1);
        assert_eq!(sign_extend(0x3FF, 10), -1);
        assert_eq!(sign_extend(0x1FF, 10), 511);
    }

    #[test]
    fn test_high_byte_signed() {
        assert_eq!(high_byte_signed(0x7C00), 0x7C);
        assert_eq!(high_byte_signed(0x00FF), 0);
        assert_eq!(high_byte_signed(-1), -1);
        assert_eq!(high_byte_signed(-256), -1);
        assert_eq!(high_byte_signed(-257), -2);
        assert_eq!(high_byte_signed(i16::MIN), -128);
        // Matches an arithmetic shift for every input
        for v in (i16::MIN..=i16::MAX).step_by(97) {
            assert_eq!(high_byte_signed(v), v >> 8, "value {v}");
        }
    }

    #[test]
    fn test_add_with_carry() {
        assert_eq!(add_with_carry(0xFFFF, 1), (0, true));
        assert_eq!(add_with_carry(0x8000, 0x8000), (0, true));
        assert_eq!(add_with_carry(0x7FFF, 0x8000), (0xFFFF, false));
        assert_eq!(add_with_carry(0xF000, 0x2000), (0x1000, true));
    }

    #[test]
    fn test_product_bits_27_12() {
        assert_eq!(product_bits_27_12(0x1000), 1);
        assert_eq!(product_bits_27_12(0x0FFF), 0);
        assert_eq!(product_bits_27_12(-0x1000), -1);
        // No rounding: -1 >> 12 stays -1
        assert_eq!(product_bits_27_12(-1), -1);
        // Bits above 27 are dropped
        assert_eq!(product_bits_27_12(0x1000_1000), 1);
        assert_eq!(product_bits_27_12(0x0800_0000), i16::MIN);
        // Full-scale sine times full-scale volume wraps rather than saturating
        assert_eq!(product_bits_27_12(0x7C00 * 0x7FFF), ((0x7C00 * 0x7FFF) >> 12) as i16);
    }

    #[test]
    fn test_inc_10_wraps() {
        assert_eq!(inc_10(0), 1);
        assert_eq!(inc_10(1022), 1023);
        assert_eq!(inc_10(1023), 0);
    }
}
