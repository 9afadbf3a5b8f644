use super::types::{LoanPlan, SimulationInput, SimulationResult};

/// Balances at or below this are treated as fully settled.
pub const PAYOFF_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, Copy)]
struct MonthStep {
    interest: f64,
    payment: f64,
    closing_balance: f64,
}

impl MonthStep {
    fn interest_portion(self) -> f64 {
        self.interest.min(self.payment)
    }

    fn principal_portion(self) -> f64 {
        self.payment - self.interest_portion()
    }
}

#[derive(Debug, Default)]
struct LoanLedger {
    total_paid: f64,
    interest_paid: f64,
    principal_paid: f64,
    months_paid: u32,
    first_settled_month: Option<u32>,
}

impl LoanLedger {
    fn record(&mut self, month: u32, step: MonthStep) {
        self.total_paid += step.payment;
        self.interest_paid += step.interest_portion();
        self.principal_paid += step.principal_portion();
        self.months_paid = month;
        if self.first_settled_month.is_none() && step.closing_balance <= PAYOFF_EPSILON {
            self.first_settled_month = Some(month);
        }
    }
}

/// Income-contingent repayment: a fixed share of salary above the plan threshold.
pub fn monthly_mandatory_payment(salary: f64, plan: &LoanPlan) -> f64 {
    if salary <= plan.threshold {
        return 0.0;
    }
    (salary - plan.threshold) * plan.repayment_rate / 12.0
}

/// Whole months simulated for `years_left`; a fractional final month is dropped.
pub fn horizon_months(years_left: f64) -> u32 {
    let months = (years_left * 12.0).floor();
    if months.is_finite() && months > 0.0 {
        months as u32
    } else {
        0
    }
}

fn step_month(balance: f64, monthly_rate: f64, scheduled_payment: f64) -> MonthStep {
    let interest = balance * monthly_rate;
    let payment = scheduled_payment.min(balance + interest);
    MonthStep {
        interest,
        payment,
        closing_balance: balance + interest - payment,
    }
}

/// Projects the loan month by month over `floor(years_left * 12)` months.
///
/// Payments stop as soon as the balance reaches zero. The result's `months_to_payoff`
/// always echoes the full horizon; `payoff_month` carries the month the loan cleared.
pub fn simulate(input: &SimulationInput<'_>) -> SimulationResult {
    let plan = input.plan;
    let mandatory = monthly_mandatory_payment(input.salary, plan);
    let total_monthly = mandatory + input.extra_monthly;
    let monthly_rate = plan.interest_rate / 12.0;

    let mut remaining = input.balance;
    let mut ledger = LoanLedger::default();
    for month in 1..=horizon_months(input.years_left) {
        if remaining <= 0.0 {
            break;
        }
        let step = step_month(remaining, monthly_rate, total_monthly);
        remaining = step.closing_balance;
        ledger.record(month, step);
    }

    let net_impact_on_balance = input.balance - remaining;
    let paid_off = remaining <= PAYOFF_EPSILON;
    let (final_balance, written_off, payoff_month, extra_payment_portion) = if paid_off {
        (
            0.0,
            false,
            Some(ledger.first_settled_month.unwrap_or(0)),
            input.extra_monthly * f64::from(ledger.months_paid),
        )
    } else {
        // An unpaid loan reports extra over the full horizon, fractional month included.
        (
            remaining.max(0.0),
            input.years_left >= f64::from(plan.write_off_years),
            None,
            input.extra_monthly * input.years_left * 12.0,
        )
    };

    SimulationResult {
        months_to_payoff: input.years_left * 12.0,
        total_paid: ledger.total_paid,
        final_balance,
        written_off,
        monthly_payment: total_monthly,
        years_left: input.years_left,
        interest_paid: ledger.interest_paid,
        principal_paid: ledger.principal_paid,
        mandatory_payment_portion: mandatory,
        extra_payment_portion,
        net_impact_on_balance,
        payoff_month,
    }
}
