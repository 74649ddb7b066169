use chrono::{Datelike, Utc};
use configuration::{ReturnWeights, RiskWeights};
use core_types::Record;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Return score given to entities with neither funding nor valuation data.
pub const RETURN_SCORE_FLOOR: f64 = 10.0;

const MAX_ROUNDS_FACTOR: f64 = 40.0;
const YOUNG_COMPANY_FACTOR: f64 = 30.0;
const MATURING_COMPANY_FACTOR: f64 = 15.0;
const MAX_RANK_FACTOR: f64 = 30.0;
const RANK_DIVISOR: f64 = 10_000.0;
const LOG_SCALE: f64 = 20.0;

pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Risk score in `[0, 100]` using the current calendar year for company age.
pub fn risk_score(record: &Record, weights: &RiskWeights) -> f64 {
    risk_score_at(record, weights, current_year())
}

/// Risk score in `[0, 100]` relative to an explicit reference year.
///
/// More funding rounds and a younger company raise the score; a good (small)
/// CB rank also adds to it, decaying to nothing past rank 300,000.
pub fn risk_score_at(record: &Record, weights: &RiskWeights, year: i32) -> f64 {
    let mut score = 0.0;

    if record.num_funding_rounds > 0 {
        let rounds = (f64::from(record.num_funding_rounds) * 10.0).min(MAX_ROUNDS_FACTOR);
        score += rounds * weights.funding_rounds;
    }

    // An unknown founding year (0) makes the company look ancient, so it adds nothing.
    let age = year.saturating_sub(record.founded_year);
    let age_factor = if age < 5 {
        YOUNG_COMPANY_FACTOR
    } else if age < 10 {
        MATURING_COMPANY_FACTOR
    } else {
        0.0
    };
    score += age_factor * weights.company_age;

    if record.rank > 0 {
        let rank = (MAX_RANK_FACTOR - record.rank as f64 / RANK_DIVISOR).max(0.0);
        score += rank * weights.cb_rank;
    }

    score.clamp(0.0, 100.0)
}

/// Return score in `[0, 100]` from log-scaled funding and valuation.
///
/// If both inputs are missing the score is `RETURN_SCORE_FLOOR`, not 0.
pub fn return_score(record: &Record, weights: &ReturnWeights) -> f64 {
    let funding = record.total_funding_usd;
    let valuation = record.post_money_valuation_usd;

    if funding <= Decimal::ZERO && valuation <= Decimal::ZERO {
        return RETURN_SCORE_FLOOR;
    }

    let mut score = 0.0;
    if funding > Decimal::ZERO {
        score += log_factor(funding) * weights.total_funding;
    }
    if valuation > Decimal::ZERO {
        score += log_factor(valuation) * weights.valuation;
    }

    score.clamp(0.0, 100.0)
}

fn log_factor(amount: Decimal) -> f64 {
    let value = amount.to_f64().unwrap_or(0.0);
    if value <= 0.0 {
        return 0.0;
    }
    (value.log10() * LOG_SCALE).clamp(0.0, 100.0)
}
