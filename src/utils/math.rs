//! Checked arithmetic and wide fixed-point calculations.
//!
//! This module provides safe arithmetic operations with overflow protection.
//! Engine quantities are u128 at an 18-decimal scale, so products like
//! `collateral_value * PRECISION` can exceed 128 bits at realistic
//! magnitudes. `mul_div` computes `(a * b) / c` exactly through a 256-bit
//! intermediate held as two 128-bit halves.

use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// SAFE ARITHMETIC OPERATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Safe addition with overflow check
pub fn safe_add(a: u128, b: u128) -> Result<u128> {
    a.checked_add(b).ok_or(Error::Overflow {
        operation: format!("{} + {}", a, b),
    })
}

/// Safe multiplication with overflow check
pub fn safe_mul(a: u128, b: u128) -> Result<u128> {
    a.checked_mul(b).ok_or(Error::Overflow {
        operation: format!("{} * {}", a, b),
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// WIDE MULTIPLY-DIVIDE
// ═══════════════════════════════════════════════════════════════════════════════

const LIMB_MASK: u128 = (1u128 << 64) - 1;

/// Full 256-bit product of two u128 values, as (high, low) halves.
fn wide_mul(a: u128, b: u128) -> (u128, u128) {
    let (a_hi, a_lo) = (a >> 64, a & LIMB_MASK);
    let (b_hi, b_lo) = (b >> 64, b & LIMB_MASK);

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    // Middle column: at most three 64-bit terms, fits in u128.
    let mid = (ll >> 64) + (lh & LIMB_MASK) + (hl & LIMB_MASK);
    let lo = (mid << 64) | (ll & LIMB_MASK);
    let hi = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (hi, lo)
}

/// Divide the 256-bit value (hi, lo) by `divisor`.
///
/// Requires `hi < divisor`, which guarantees the quotient fits in u128.
fn div_wide(hi: u128, lo: u128, divisor: u128) -> u128 {
    debug_assert!(divisor > 0);
    debug_assert!(hi < divisor);

    // Binary long division over the low 128 bits. The remainder stays
    // below the divisor, so doubling it overflows at most into one carry
    // bit, which always forces a subtraction.
    let mut rem = hi;
    let mut quotient = 0u128;
    for i in (0..128).rev() {
        let bit = (lo >> i) & 1;
        let carry = rem >> 127;
        rem = (rem << 1) | bit;
        quotient <<= 1;
        if carry == 1 || rem >= divisor {
            rem = rem.wrapping_sub(divisor);
            quotient |= 1;
        }
    }
    quotient
}

/// Computes `(a * b) / c` exactly, with a 256-bit intermediate product.
///
/// Fails with `DivisionByZero` when `c` is zero and with `Overflow` when
/// the quotient itself does not fit in u128.
pub fn mul_div(a: u128, b: u128, c: u128) -> Result<u128> {
    if c == 0 {
        return Err(Error::DivisionByZero {
            operation: format!("({} * {}) / 0", a, b),
        });
    }
    let (hi, lo) = wide_mul(a, b);
    if hi == 0 {
        return Ok(lo / c);
    }
    // Quotient >= 2^128 exactly when the high half reaches the divisor.
    if hi >= c {
        return Err(Error::Overflow {
            operation: format!("({} * {}) / {}", a, b, c),
        });
    }
    Ok(div_wide(hi, lo, c))
}
