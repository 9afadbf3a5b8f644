use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::error::LoanError;
use super::types::{LoanPlan, PlanId};

/// Read-only table of repayment plans, built once and shared by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRegistry {
    plans: BTreeMap<PlanId, LoanPlan>,
}

impl PlanRegistry {
    /// UK thresholds and rates for the 2024/25 tax year.
    pub fn uk_2024_25() -> Self {
        Self::from_plans([
            (
                PlanId::Plan1,
                LoanPlan {
                    threshold: 22_015.0,
                    interest_rate: 0.075,
                    write_off_years: 25,
                    repayment_rate: 0.09,
                },
            ),
            (
                PlanId::Plan2,
                LoanPlan {
                    threshold: 27_295.0,
                    interest_rate: 0.075,
                    write_off_years: 30,
                    repayment_rate: 0.09,
                },
            ),
            (
                PlanId::Plan4,
                LoanPlan {
                    threshold: 27_660.0,
                    interest_rate: 0.075,
                    write_off_years: 30,
                    repayment_rate: 0.09,
                },
            ),
            (
                PlanId::Plan5,
                LoanPlan {
                    threshold: 25_000.0,
                    interest_rate: 0.075,
                    write_off_years: 40,
                    repayment_rate: 0.09,
                },
            ),
            (
                PlanId::Postgraduate,
                LoanPlan {
                    threshold: 21_000.0,
                    interest_rate: 0.075,
                    write_off_years: 30,
                    repayment_rate: 0.06,
                },
            ),
        ])
    }

    pub fn from_plans(plans: impl IntoIterator<Item = (PlanId, LoanPlan)>) -> Self {
        Self {
            plans: plans.into_iter().collect(),
        }
    }

    /// Parses a table keyed by plan identifier, e.g. `{"1": {"threshold": ...}}`.
    pub fn from_json(json: &str) -> Result<Self, LoanError> {
        let plans: BTreeMap<PlanId, LoanPlan> =
            serde_json::from_str(json).map_err(|e| LoanError::PlanTable(e.to_string()))?;
        if plans.is_empty() {
            return Err(LoanError::PlanTable("table has no plans".to_string()));
        }
        for (id, plan) in &plans {
            validate_plan(*id, plan)?;
        }
        Ok(Self { plans })
    }

    pub fn from_json_file(path: &Path) -> Result<Self, LoanError> {
        let json = fs::read_to_string(path)
            .map_err(|e| LoanError::PlanTable(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn lookup(&self, id: PlanId) -> Option<&LoanPlan> {
        self.plans.get(&id)
    }

    /// Looks up a raw identifier such as `"2"` or `"postgraduate"`.
    pub fn resolve(&self, raw: &str) -> Option<&LoanPlan> {
        raw.parse::<PlanId>().ok().and_then(|id| self.lookup(id))
    }

    pub fn plans(&self) -> &BTreeMap<PlanId, LoanPlan> {
        &self.plans
    }
}

impl Default for PlanRegistry {
    fn default() -> Self {
        Self::uk_2024_25()
    }
}

fn validate_plan(id: PlanId, plan: &LoanPlan) -> Result<(), LoanError> {
    if !plan.threshold.is_finite() || plan.threshold < 0.0 {
        return Err(LoanError::PlanTable(format!("plan {id}: threshold must be >= 0")));
    }
    if !plan.interest_rate.is_finite() || plan.interest_rate < 0.0 {
        return Err(LoanError::PlanTable(format!(
            "plan {id}: interestRate must be >= 0"
        )));
    }
    if !(0.0..=1.0).contains(&plan.repayment_rate) {
        return Err(LoanError::PlanTable(format!(
            "plan {id}: repaymentRate must be between 0 and 1"
        )));
    }
    if plan.write_off_years == 0 {
        return Err(LoanError::PlanTable(format!(
            "plan {id}: writeOffYears must be > 0"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_2024_25_constants() {
        let registry = PlanRegistry::default();

        let plan1 = registry.lookup(PlanId::Plan1).expect("plan 1");
        assert_eq!(plan1.threshold, 22_015.0);
        assert_eq!(plan1.write_off_years, 25);
        assert_eq!(plan1.repayment_rate, 0.09);

        let plan5 = registry.lookup(PlanId::Plan5).expect("plan 5");
        assert_eq!(plan5.threshold, 25_000.0);
        assert_eq!(plan5.write_off_years, 40);

        let pg = registry.lookup(PlanId::Postgraduate).expect("postgraduate");
        assert_eq!(pg.threshold, 21_000.0);
        assert_eq!(pg.repayment_rate, 0.06);
        assert_eq!(pg.write_off_years, 30);

        for id in PlanId::ALL {
            assert_eq!(registry.lookup(id).map(|p| p.interest_rate), Some(0.075));
        }
    }

    #[test]
    fn unknown_identifiers_resolve_to_nothing() {
        let registry = PlanRegistry::default();
        assert!(registry.resolve("3").is_none());
        assert!(registry.resolve("undergraduate").is_none());
        assert!(registry.resolve("").is_none());
        assert_eq!(
            registry.resolve("4").map(|p| p.threshold),
            Some(27_660.0)
        );
        assert!(registry.resolve("postgraduate").is_some());
    }

    #[test]
    fn partial_table_reports_missing_plan_as_absent() {
        let registry = PlanRegistry::from_plans([(
            PlanId::Plan2,
            LoanPlan {
                threshold: 10_000.0,
                interest_rate: 0.0,
                write_off_years: 5,
                repayment_rate: 0.1,
            },
        )]);
        assert!(registry.lookup(PlanId::Plan1).is_none());
        assert_eq!(registry.lookup(PlanId::Plan2).map(|p| p.threshold), Some(10_000.0));
    }

    #[test]
    fn from_json_parses_keyed_table() {
        let json = r#"{
          "1": {"threshold": 24990, "interestRate": 0.043, "writeOffYears": 25, "repaymentRate": 0.09},
          "postgraduate": {"threshold": 21000, "interestRate": 0.073, "writeOffYears": 30, "repaymentRate": 0.06}
        }"#;
        let registry = PlanRegistry::from_json(json).expect("table should parse");
        assert_eq!(registry.plans().len(), 2);
        assert_eq!(
            registry.lookup(PlanId::Plan1).map(|p| p.interest_rate),
            Some(0.043)
        );
        assert!(registry.lookup(PlanId::Plan2).is_none());
    }

    #[test]
    fn from_json_rejects_unknown_plan_keys_and_bad_rates() {
        let unknown = r#"{"3": {"threshold": 1, "interestRate": 0.01, "writeOffYears": 5, "repaymentRate": 0.09}}"#;
        assert!(matches!(
            PlanRegistry::from_json(unknown),
            Err(LoanError::PlanTable(_))
        ));

        let bad_rate = r#"{"2": {"threshold": 1, "interestRate": 0.01, "writeOffYears": 5, "repaymentRate": 1.5}}"#;
        let err = PlanRegistry::from_json(bad_rate).expect_err("must reject repayment rate");
        assert!(err.to_string().contains("repaymentRate"));

        assert!(PlanRegistry::from_json("{}").is_err());
    }
}
