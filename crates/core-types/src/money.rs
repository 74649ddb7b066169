//! Funding arithmetic.
//!
//! Funding columns come straight from user data, so totals saturate at
//! `Decimal::MAX` instead of panicking on overflow.

use rust_decimal::Decimal;

/// Sums funding amounts, saturating at the bounds of `Decimal`.
pub fn sum_funding<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}
