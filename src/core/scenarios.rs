use super::engine::{monthly_mandatory_payment, simulate};
use super::types::{CustomResult, ScenarioResult, SimulationInput, SimulationResult};

/// Extra monthly amounts compared against the mandatory-only baseline, in presentation order.
pub const EXTRA_PAYMENT_MENU: [f64; 4] = [50.0, 100.0, 200.0, 500.0];

/// Runs the fixed extra-payment menu. `input.extra_monthly` is ignored; the baseline always
/// uses the mandatory payment alone.
pub fn extra_payment_scenarios(input: &SimulationInput<'_>) -> Vec<ScenarioResult> {
    let baseline = simulate(&input.with_extra(0.0));
    scenarios_against(input, &baseline, &EXTRA_PAYMENT_MENU)
}

pub fn scenarios_against(
    input: &SimulationInput<'_>,
    baseline: &SimulationResult,
    extras: &[f64],
) -> Vec<ScenarioResult> {
    let mandatory = monthly_mandatory_payment(input.salary, input.plan);
    let mut scenarios = Vec::with_capacity(extras.len());
    for &extra in extras {
        if mandatory + extra <= 0.0 {
            continue;
        }
        let result = simulate(&input.with_extra(extra));
        scenarios.push(build_scenario(extra, &result, baseline));
    }
    scenarios
}

fn build_scenario(
    extra: f64,
    result: &SimulationResult,
    baseline: &SimulationResult,
) -> ScenarioResult {
    let savings = baseline.total_paid - result.total_paid;
    match result.payoff_month {
        Some(month) => ScenarioResult {
            extra_amount: extra,
            years_to_payoff: f64::from(month) / 12.0,
            total_paid: result.total_paid,
            interest_paid: result.interest_paid,
            principal_paid: result.principal_paid,
            extra_payments_total: extra * f64::from(month),
            savings,
            paid_off: true,
            net_impact_on_balance: result.net_impact_on_balance,
            payoff_month: Some(month),
        },
        None => ScenarioResult {
            extra_amount: extra,
            years_to_payoff: result.years_left,
            total_paid: result.total_paid,
            interest_paid: result.interest_paid,
            principal_paid: result.principal_paid,
            extra_payments_total: result.extra_payment_portion,
            savings,
            paid_off: false,
            net_impact_on_balance: result.net_impact_on_balance,
            payoff_month: None,
        },
    }
}

/// Evaluates a user-chosen extra amount outside the fixed menu.
pub fn evaluate_custom_payment(
    input: &SimulationInput<'_>,
    extra: f64,
    baseline: &SimulationResult,
) -> CustomResult {
    let result = simulate(&input.with_extra(extra));
    let early_payoff = result.paid_off();
    let years_to_payoff = result.payoff_month.map(|month| f64::from(month) / 12.0);
    let savings = early_payoff.then(|| baseline.total_paid - result.total_paid);
    CustomResult {
        result,
        early_payoff,
        years_to_payoff,
        savings,
    }
}
