use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// Every reservoir level, capacity and transfer amount is a `Fixed64`, so
/// two runs from the same scenario and seed agree bit for bit.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only for initialization, never in sim loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display, never in sim loop.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Checked addition that returns None on overflow.
#[inline]
pub fn checked_add_64(a: Fixed64, b: Fixed64) -> Option<Fixed64> {
    a.checked_add(b)
}

/// Checked division for Fixed64 that returns None on zero divisor.
#[inline]
pub fn checked_div_64(a: Fixed64, b: Fixed64) -> Option<Fixed64> {
    a.checked_div(b)
}

/// Per-tick share of an amount spread evenly over `ticks` ticks.
///
/// Returns zero for a zero-length period instead of dividing by zero.
#[inline]
pub fn per_tick(amount: Fixed64, ticks: Ticks) -> Fixed64 {
    if ticks == 0 {
        return Fixed64::ZERO;
    }
    checked_div_64(amount, Fixed64::from_num(ticks)).unwrap_or(Fixed64::ZERO)
}
