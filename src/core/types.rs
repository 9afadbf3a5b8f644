use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::LoanError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PlanId {
    Plan1,
    Plan2,
    Plan4,
    Plan5,
    Postgraduate,
}

impl PlanId {
    pub const ALL: [PlanId; 5] = [
        PlanId::Plan1,
        PlanId::Plan2,
        PlanId::Plan4,
        PlanId::Plan5,
        PlanId::Postgraduate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PlanId::Plan1 => "1",
            PlanId::Plan2 => "2",
            PlanId::Plan4 => "4",
            PlanId::Plan5 => "5",
            PlanId::Postgraduate => "postgraduate",
        }
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanId {
    type Err = LoanError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "1" => Ok(PlanId::Plan1),
            "2" => Ok(PlanId::Plan2),
            "4" => Ok(PlanId::Plan4),
            "5" => Ok(PlanId::Plan5),
            "postgraduate" => Ok(PlanId::Postgraduate),
            other => Err(LoanError::UnknownPlan(other.to_string())),
        }
    }
}

impl TryFrom<String> for PlanId {
    type Error = LoanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PlanId> for String {
    fn from(value: PlanId) -> Self {
        value.as_str().to_string()
    }
}

/// Parameters of one repayment regime. Rates are annual fractions.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanPlan {
    pub threshold: f64,
    pub interest_rate: f64,
    pub write_off_years: u32,
    pub repayment_rate: f64,
}

#[derive(Copy, Clone, Debug)]
pub struct SimulationInput<'a> {
    pub balance: f64,
    pub salary: f64,
    pub plan: &'a LoanPlan,
    pub years_left: f64,
    pub extra_monthly: f64,
}

impl<'a> SimulationInput<'a> {
    pub fn new(balance: f64, salary: f64, plan: &'a LoanPlan, years_left: f64) -> Self {
        Self {
            balance,
            salary,
            plan,
            years_left,
            extra_monthly: 0.0,
        }
    }

    pub fn with_extra(self, extra_monthly: f64) -> Self {
        Self {
            extra_monthly,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    /// Full simulated horizon (`years_left * 12`), not the month the loan cleared.
    pub months_to_payoff: f64,
    pub total_paid: f64,
    pub final_balance: f64,
    pub written_off: bool,
    pub monthly_payment: f64,
    pub years_left: f64,
    pub interest_paid: f64,
    pub principal_paid: f64,
    pub mandatory_payment_portion: f64,
    pub extra_payment_portion: f64,
    pub net_impact_on_balance: f64,
    /// First month (1-based) at which the balance fell to the payoff epsilon.
    pub payoff_month: Option<u32>,
}

impl SimulationResult {
    pub fn paid_off(&self) -> bool {
        self.payoff_month.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub extra_amount: f64,
    pub years_to_payoff: f64,
    pub total_paid: f64,
    pub interest_paid: f64,
    pub principal_paid: f64,
    pub extra_payments_total: f64,
    pub savings: f64,
    pub paid_off: bool,
    pub net_impact_on_balance: f64,
    pub payoff_month: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomResult {
    #[serde(flatten)]
    pub result: SimulationResult,
    pub early_payoff: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_to_payoff: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings: Option<f64>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TimeSpec {
    YearsLeft(f64),
    StartYear(i32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoanRequest {
    pub plan: PlanId,
    pub balance: f64,
    pub salary: f64,
    pub time: TimeSpec,
    pub extra_payment: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationReport {
    pub result: SimulationResult,
    pub plan_details: LoanPlan,
    pub years_left: f64,
    pub scenarios: Vec<ScenarioResult>,
    pub custom_result: Option<CustomResult>,
}
