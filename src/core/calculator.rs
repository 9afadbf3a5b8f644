use log::debug;

use super::engine::simulate;
use super::error::LoanError;
use super::horizon::{current_year, years_remaining};
use super::plans::PlanRegistry;
use super::scenarios::{evaluate_custom_payment, extra_payment_scenarios};
use super::types::{
    CalculationReport, LoanPlan, LoanRequest, PlanId, SimulationInput, SimulationResult, TimeSpec,
};

/// Entry point tying the plan table to the simulator and scenario generator.
#[derive(Debug, Clone, Default)]
pub struct LoanCalculator {
    registry: PlanRegistry,
}

impl LoanCalculator {
    pub fn new(registry: PlanRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PlanRegistry {
        &self.registry
    }

    pub fn plan(&self, id: PlanId) -> Result<&LoanPlan, LoanError> {
        self.registry
            .lookup(id)
            .ok_or_else(|| LoanError::UnknownPlan(id.to_string()))
    }

    pub fn years_remaining(
        &self,
        id: PlanId,
        start_year: i32,
        current_year: i32,
    ) -> Result<u32, LoanError> {
        years_remaining(self.plan(id)?, start_year, current_year)
    }

    pub fn simulate(
        &self,
        id: PlanId,
        balance: f64,
        salary: f64,
        years_left: f64,
        extra_monthly: f64,
    ) -> Result<SimulationResult, LoanError> {
        let plan = self.plan(id)?;
        let input = SimulationInput::new(balance, salary, plan, years_left).with_extra(extra_monthly);
        Ok(simulate(&input))
    }

    pub fn calculate(&self, request: &LoanRequest) -> Result<CalculationReport, LoanError> {
        self.calculate_at(request, current_year())
    }

    /// Same as [`LoanCalculator::calculate`] with an explicit calendar year.
    pub fn calculate_at(
        &self,
        request: &LoanRequest,
        current_year: i32,
    ) -> Result<CalculationReport, LoanError> {
        let plan = self.plan(request.plan)?;
        let years_left = match request.time {
            TimeSpec::YearsLeft(years) => years,
            TimeSpec::StartYear(start_year) => {
                f64::from(years_remaining(plan, start_year, current_year)?)
            }
        };

        let input = SimulationInput::new(request.balance, request.salary, plan, years_left);
        let result = simulate(&input);
        let scenarios = extra_payment_scenarios(&input);
        let custom_result = request
            .extra_payment
            .filter(|extra| *extra != 0.0)
            .map(|extra| evaluate_custom_payment(&input, extra, &result));

        debug!(
            "plan {} over {years_left} years: paid {:.2}, final balance {:.2}, written off {}",
            request.plan, result.total_paid, result.final_balance, result.written_off
        );

        Ok(CalculationReport {
            result,
            plan_details: *plan,
            years_left,
            scenarios,
            custom_result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(time: TimeSpec) -> LoanRequest {
        LoanRequest {
            plan: PlanId::Plan2,
            balance: 45_000.0,
            salary: 38_000.0,
            time,
            extra_payment: None,
        }
    }

    #[test]
    fn report_carries_plan_details_and_menu_scenarios() {
        let calculator = LoanCalculator::default();
        let report = calculator
            .calculate_at(&request(TimeSpec::YearsLeft(30.0)), 2025)
            .expect("valid request");

        assert_eq!(report.years_left, 30.0);
        assert_eq!(report.plan_details.threshold, 27_295.0);
        assert_eq!(report.scenarios.len(), 4);
        assert!(report.custom_result.is_none());
        assert_eq!(report.result.years_left, 30.0);
    }

    #[test]
    fn start_year_resolves_against_given_calendar_year() {
        let calculator = LoanCalculator::default();
        let report = calculator
            .calculate_at(&request(TimeSpec::StartYear(2020)), 2025)
            .expect("valid request");

        assert_eq!(report.years_left, 25.0);
        assert_eq!(report.result.months_to_payoff, 300.0);
    }

    #[test]
    fn exhausted_horizon_is_distinct_from_unknown_plan() {
        let calculator = LoanCalculator::default();
        let err = calculator
            .calculate_at(&request(TimeSpec::StartYear(1990)), 2025)
            .expect_err("past write-off");
        assert_eq!(err, LoanError::HorizonExhausted { years: 0 });
    }

    #[test]
    fn plan_missing_from_table_propagates_as_unknown_plan() {
        let calculator = LoanCalculator::new(PlanRegistry::from_plans(Vec::<(PlanId, LoanPlan)>::new()));
        let err = calculator
            .calculate_at(&request(TimeSpec::YearsLeft(10.0)), 2025)
            .expect_err("no plans");
        assert!(matches!(err, LoanError::UnknownPlan(ref id) if id == "2"));

        assert!(calculator.simulate(PlanId::Plan2, 1.0, 1.0, 1.0, 0.0).is_err());
        assert!(calculator.years_remaining(PlanId::Plan2, 2020, 2025).is_err());
    }

    #[test]
    fn custom_extra_is_evaluated_when_non_zero() {
        let calculator = LoanCalculator::default();
        let mut with_extra = request(TimeSpec::YearsLeft(30.0));
        with_extra.extra_payment = Some(250.0);
        let report = calculator.calculate_at(&with_extra, 2025).expect("valid");
        let custom = report.custom_result.expect("custom result");
        assert!(custom.early_payoff);
        assert!(custom.savings.is_some());

        let mut zero_extra = request(TimeSpec::YearsLeft(30.0));
        zero_extra.extra_payment = Some(0.0);
        let report = calculator.calculate_at(&zero_extra, 2025).expect("valid");
        assert!(report.custom_result.is_none());
    }

    #[test]
    fn alternate_table_drives_the_simulation() {
        let registry = PlanRegistry::from_plans([(
            PlanId::Plan5,
            LoanPlan {
                threshold: 0.0,
                interest_rate: 0.0,
                write_off_years: 40,
                repayment_rate: 0.12,
            },
        )]);
        let calculator = LoanCalculator::new(registry);
        let result = calculator
            .simulate(PlanId::Plan5, 1_200.0, 12_000.0, 2.0, 0.0)
            .expect("plan present");
        assert_eq!(result.payoff_month, Some(10));
    }
}
