mod calculator;
mod engine;
mod error;
mod horizon;
mod plans;
mod scenarios;
mod types;

pub use calculator::LoanCalculator;
pub use engine::{PAYOFF_EPSILON, horizon_months, monthly_mandatory_payment, simulate};
pub use error::LoanError;
pub use horizon::{current_year, years_remaining};
pub use plans::PlanRegistry;
pub use scenarios::{
    EXTRA_PAYMENT_MENU, evaluate_custom_payment, extra_payment_scenarios, scenarios_against,
};
pub use types::{
    CalculationReport, CustomResult, LoanPlan, LoanRequest, PlanId, ScenarioResult,
    SimulationInput, SimulationResult, TimeSpec,
};
