//! System configuration: defaults, validation and editing.
//!
//! [`SystemConfig`] is owned by the application layer and handed to
//! the calculator as an immutable snapshot.  Edits go through the
//! methods below so that configuration errors are caught where they
//! are made and hourly costs are re-derived whenever a salary or the
//! work settings change.

use crate::error::{CostError, Result};
use crate::models::{
    ImpactMultipliers, JobRole, PerceivedImpact, Phase, PhaseMultipliers, RoleCategory, Seniority,
    SystemConfig, WorkSettings,
};
use crate::rates::hourly_cost;
use std::collections::{BTreeMap, HashSet};

fn default_role(
    id: &str,
    name: &str,
    level: Seniority,
    category: RoleCategory,
    (min, max, average): (f64, f64, f64),
    settings: &WorkSettings,
) -> JobRole {
    JobRole {
        id: id.to_string(),
        name: name.to_string(),
        level,
        category,
        salary_min: min,
        salary_max: max,
        market_average: average,
        salary_paid: None,
        // The built-in work settings are always valid.
        hourly_cost: hourly_cost(average, settings).unwrap_or_default(),
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        use RoleCategory::*;
        use Seniority::*;

        let settings = WorkSettings::default();
        let bands = [
            ("dev-junior", "Desenvolvedor", Junior, Developer, (4000.0, 6000.0, 5000.0)),
            ("dev-pleno", "Desenvolvedor", Pleno, Developer, (7000.0, 10000.0, 8500.0)),
            ("dev-senior", "Desenvolvedor", Senior, Developer, (12000.0, 18000.0, 15000.0)),
            ("qa-junior", "QA", Junior, Qa, (3500.0, 5500.0, 4500.0)),
            ("qa-pleno", "QA", Pleno, Qa, (6000.0, 9000.0, 7500.0)),
            ("qa-senior", "QA", Senior, Qa, (10000.0, 15000.0, 12500.0)),
            ("po-junior", "Product Owner", Junior, ProductOwner, (5000.0, 8000.0, 6500.0)),
            ("po-pleno", "Product Owner", Pleno, ProductOwner, (8000.0, 12000.0, 10000.0)),
            ("po-senior", "Product Owner", Senior, ProductOwner, (13000.0, 20000.0, 16500.0)),
            ("suporte-junior", "Suporte", Junior, Support, (3000.0, 4500.0, 3750.0)),
            ("suporte-pleno", "Suporte", Pleno, Support, (4500.0, 7000.0, 5750.0)),
            ("suporte-senior", "Suporte", Senior, Support, (7000.0, 12000.0, 9500.0)),
        ];
        let job_roles = bands
            .into_iter()
            .map(|(id, name, level, category, band)| default_role(id, name, level, category, band, &settings))
            .collect();

        SystemConfig {
            work_settings: settings,
            job_roles,
            phase_multipliers: PhaseMultipliers::default(),
            impact_multipliers: ImpactMultipliers::default(),
        }
    }
}

impl SystemConfig {
    /// Checks every invariant the calculator relies on.
    ///
    /// Phase multipliers that do not increase across the lifecycle are
    /// accepted, but savings may then turn negative, so a warning is
    /// logged.
    pub fn validate(&self) -> Result<()> {
        self.work_settings.validate()?;

        for phase in Phase::ALL {
            let value = self.phase_multipliers.get(phase);
            if !value.is_finite() || value <= 0.0 {
                return Err(CostError::InvalidPhaseMultiplier { phase, value });
            }
        }
        if !self.phase_multipliers.is_monotonic() {
            tracing::warn!(
                multipliers = ?self.phase_multipliers,
                "phase multipliers do not increase across the lifecycle"
            );
        }

        for impact in PerceivedImpact::ALL {
            let value = self.impact_multipliers.get(impact);
            if !value.is_finite() || value < 0.0 {
                return Err(CostError::InvalidImpactMultiplier { impact, value });
            }
        }

        let mut seen = HashSet::new();
        for role in &self.job_roles {
            if !seen.insert(role.id.as_str()) {
                return Err(CostError::DuplicateRole(role.id.clone()));
            }
            for salary in [role.salary_min, role.salary_max, role.market_average]
                .into_iter()
                .chain(role.salary_paid)
            {
                if !salary.is_finite() || salary < 0.0 {
                    return Err(CostError::InvalidSalary(salary));
                }
            }
            if role.salary_min > role.salary_max {
                return Err(CostError::InvalidSalaryBand {
                    role: role.id.clone(),
                    min: role.salary_min,
                    max: role.salary_max,
                });
            }
        }
        Ok(())
    }

    /// Re-derives the hourly cost of every role from the current work
    /// settings.
    pub fn refresh_hourly_costs(&mut self) -> Result<()> {
        let settings = self.work_settings;
        for role in &mut self.job_roles {
            role.refresh_hourly_cost(&settings)?;
        }
        Ok(())
    }

    pub fn role(&self, role_id: &str) -> Option<&JobRole> {
        self.job_roles.iter().find(|r| r.id == role_id)
    }

    fn role_mut(&mut self, role_id: &str) -> Result<&mut JobRole> {
        self.job_roles
            .iter_mut()
            .find(|r| r.id == role_id)
            .ok_or_else(|| CostError::UnknownRole(role_id.to_string()))
    }

    /// Hourly rate currently in effect for a role, by the salary
    /// precedence rule.
    pub fn resolve_rate(&self, role_id: &str) -> Result<f64> {
        let role = self
            .role(role_id)
            .ok_or_else(|| CostError::UnknownRole(role_id.to_string()))?;
        hourly_cost(role.effective_salary(), &self.work_settings)
    }

    pub fn set_work_settings(&mut self, settings: WorkSettings) -> Result<()> {
        settings.validate()?;
        self.work_settings = settings;
        self.refresh_hourly_costs()
    }

    pub fn set_market_average(&mut self, role_id: &str, amount: f64) -> Result<()> {
        let settings = self.work_settings;
        let role = self.role_mut(role_id)?;
        hourly_cost(amount, &settings)?;
        role.market_average = amount;
        role.refresh_hourly_cost(&settings).map(|_| ())
    }

    /// Sets or clears the salary actually paid for a role.
    pub fn set_salary_paid(&mut self, role_id: &str, amount: Option<f64>) -> Result<()> {
        let settings = self.work_settings;
        let role = self.role_mut(role_id)?;
        if let Some(value) = amount {
            hourly_cost(value, &settings)?;
        }
        role.salary_paid = amount;
        role.refresh_hourly_cost(&settings).map(|_| ())
    }

    pub fn set_phase_multiplier(&mut self, phase: Phase, value: f64) -> Result<()> {
        if !value.is_finite() || value <= 0.0 {
            return Err(CostError::InvalidPhaseMultiplier { phase, value });
        }
        self.phase_multipliers.set(phase, value);
        Ok(())
    }

    pub fn set_impact_multiplier(&mut self, impact: PerceivedImpact, value: f64) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(CostError::InvalidImpactMultiplier { impact, value });
        }
        self.impact_multipliers.set(impact, value);
        Ok(())
    }

    /// Roles grouped by category, each group in configuration order.
    pub fn roles_by_category(&self) -> BTreeMap<RoleCategory, Vec<&JobRole>> {
        let mut groups: BTreeMap<RoleCategory, Vec<&JobRole>> = BTreeMap::new();
        for role in &self.job_roles {
            groups.entry(role.category).or_default().push(role);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SystemConfig::default();
        config.validate().unwrap();
        assert_eq!(config.job_roles.len(), 12);
        assert_eq!(config.phase_multipliers.production, 30.0);
        assert_eq!(config.impact_multipliers.none, 0.0);
    }

    #[test]
    fn test_default_hourly_costs_are_derived() {
        let config = SystemConfig::default();
        let role = config.role("dev-pleno").unwrap();
        assert!((role.hourly_cost - 8500.0 / 176.0).abs() < 1e-9);
        assert!((role.hourly_cost - 48.30).abs() < 0.01);
    }

    #[test]
    fn test_validate_rejects_zero_production_multiplier() {
        let mut config = SystemConfig::default();
        config.phase_multipliers.production = 0.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            CostError::InvalidPhaseMultiplier {
                phase: Phase::Production,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_accepts_non_monotonic_multipliers() {
        let mut config = SystemConfig::default();
        config.phase_multipliers.staging = 40.0;
        assert!(!config.phase_multipliers.is_monotonic());
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_work_settings() {
        let mut config = SystemConfig::default();
        config.work_settings.days_per_month = 0.0;
        assert!(matches!(
            config.validate().unwrap_err(),
            CostError::InvalidWorkSettings { .. }
        ));
    }

    #[test]
    fn test_validate_rejects_negative_impact_and_duplicate_roles() {
        let mut config = SystemConfig::default();
        config.impact_multipliers.frustration = -0.5;
        assert!(matches!(
            config.validate().unwrap_err(),
            CostError::InvalidImpactMultiplier { .. }
        ));

        let mut config = SystemConfig::default();
        let duplicate = config.job_roles[0].clone();
        config.job_roles.push(duplicate);
        assert!(matches!(config.validate().unwrap_err(), CostError::DuplicateRole(_)));
    }

    #[test]
    fn test_validate_rejects_inverted_salary_band() {
        let mut config = SystemConfig::default();
        config.job_roles[0].salary_min = 99999.0;
        assert!(matches!(
            config.validate().unwrap_err(),
            CostError::InvalidSalaryBand { .. }
        ));
    }

    #[test]
    fn test_salary_override_changes_rate() {
        let mut config = SystemConfig::default();
        config.set_salary_paid("qa-senior", Some(17600.0)).unwrap();
        assert_eq!(config.resolve_rate("qa-senior").unwrap(), 100.0);
        assert_eq!(config.role("qa-senior").unwrap().hourly_cost, 100.0);

        config.set_salary_paid("qa-senior", None).unwrap();
        assert!((config.resolve_rate("qa-senior").unwrap() - 12500.0 / 176.0).abs() < 1e-9);
    }

    #[test]
    fn test_work_settings_change_refreshes_every_role() {
        let mut config = SystemConfig::default();
        config
            .set_work_settings(WorkSettings {
                hours_per_day: 6.0,
                days_per_month: 20.0,
            })
            .unwrap();
        for role in &config.job_roles {
            assert!((role.hourly_cost - role.effective_salary() / 120.0).abs() < 1e-9);
        }

        let before = config.clone();
        assert!(config
            .set_work_settings(WorkSettings {
                hours_per_day: -1.0,
                days_per_month: 20.0,
            })
            .is_err());
        assert_eq!(config, before);
    }

    #[test]
    fn test_market_average_edit_refreshes_role() {
        let mut config = SystemConfig::default();
        config.set_market_average("dev-junior", 8800.0).unwrap();
        assert_eq!(config.role("dev-junior").unwrap().hourly_cost, 50.0);
        assert!(matches!(
            config.set_market_average("nope", 1.0).unwrap_err(),
            CostError::UnknownRole(_)
        ));
    }

    #[test]
    fn test_multiplier_edits_are_validated() {
        let mut config = SystemConfig::default();
        config.set_phase_multiplier(Phase::Staging, 12.0).unwrap();
        assert_eq!(config.phase_multipliers.staging, 12.0);
        assert!(config.set_phase_multiplier(Phase::Production, 0.0).is_err());
        assert!(config.set_impact_multiplier(PerceivedImpact::Reputational, -1.0).is_err());
        config.set_impact_multiplier(PerceivedImpact::Reputational, 2.0).unwrap();
        assert_eq!(config.impact_multipliers.reputational, 2.0);
    }

    #[test]
    fn test_roles_grouped_by_category() {
        let config = SystemConfig::default();
        let groups = config.roles_by_category();
        assert_eq!(groups.len(), 4);
        let devs: Vec<&str> = groups[&RoleCategory::Developer].iter().map(|r| r.id.as_str()).collect();
        assert_eq!(devs, vec!["dev-junior", "dev-pleno", "dev-senior"]);
    }
}
