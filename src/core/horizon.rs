use chrono::{Datelike, Local};

use super::error::LoanError;
use super::types::LoanPlan;

pub fn current_year() -> i32 {
    Local::now().year()
}

/// Years left before write-off for a loan whose repayments began in `start_year`.
///
/// A horizon of zero or less is reported as [`LoanError::HorizonExhausted`] so callers can
/// tell an already written-off loan apart from an unknown plan.
pub fn years_remaining(
    plan: &LoanPlan,
    start_year: i32,
    current_year: i32,
) -> Result<u32, LoanError> {
    let years_since_start = i64::from(current_year) - i64::from(start_year);
    let remaining = i64::from(plan.write_off_years) - years_since_start;
    if remaining <= 0 {
        return Err(LoanError::HorizonExhausted {
            years: remaining.max(0),
        });
    }
    u32::try_from(remaining).map_err(|_| LoanError::invalid("startYear", "too far in the future"))
}
