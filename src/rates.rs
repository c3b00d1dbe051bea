use rust_decimal::{Decimal, MathematicalOps};

use crate::decimal::Rate;

/// 360-day commercial year used everywhere in this crate
pub const YEAR_BASIS_DAYS: u32 = 360;

/// fixed 30-day month under the 30/360 approximation
pub const MONTH_DAYS: u32 = 30;

/// convert an annual effective rate (TEA) into the equivalent effective rate
/// for a period of `period_days` on a 360-day year:
/// `r = (1 + TEA)^(period_days/360) - 1`
///
/// A zero or negative TEA yields `r <= 0`; callers must treat that as the
/// degenerate straight-line case rather than divide by it.
pub fn effective_for_days(annual: Rate, period_days: u32) -> Rate {
    let base = Decimal::ONE + annual.as_decimal();
    if base <= Decimal::ZERO {
        // a TEA at or below -100% has no compounding interpretation
        return Rate::from_decimal(-Decimal::ONE);
    }

    let exponent = Decimal::from(period_days) / Decimal::from(YEAR_BASIS_DAYS);
    Rate::from_decimal(base.powd(exponent) - Decimal::ONE)
}

/// equivalent monthly effective rate for an annual effective rate
pub fn monthly_effective(annual: Rate) -> Rate {
    effective_for_days(annual, MONTH_DAYS)
}
