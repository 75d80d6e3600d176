//! Hourly rate resolution.
//!
//! A role's hourly cost is never an independent source of truth.  It
//! is derived from one monthly salary figure (the salary actually paid
//! when set, the market average otherwise) divided by the number of
//! hours worked in a month.  Every change to salaries or to the
//! [`WorkSettings`] must go through this module so the derivation stays
//! in one place.

use crate::error::{CostError, Result};
use crate::models::{JobRole, WorkSettings};

impl WorkSettings {
    /// Hours worked in a month.
    pub fn monthly_hours(&self) -> f64 {
        self.hours_per_day * self.days_per_month
    }

    /// Rejects non-positive or non-finite work-time figures, which
    /// would otherwise produce an infinite or negative hourly rate.
    pub fn validate(&self) -> Result<()> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(self.hours_per_day) && valid(self.days_per_month) {
            Ok(())
        } else {
            Err(CostError::InvalidWorkSettings {
                hours_per_day: self.hours_per_day,
                days_per_month: self.days_per_month,
            })
        }
    }
}

/// Converts a monthly salary into an hourly cost:
/// `salary / (hours_per_day * days_per_month)`.
pub fn hourly_cost(monthly_salary: f64, settings: &WorkSettings) -> Result<f64> {
    settings.validate()?;
    if !monthly_salary.is_finite() || monthly_salary < 0.0 {
        return Err(CostError::InvalidSalary(monthly_salary));
    }
    Ok(monthly_salary / settings.monthly_hours())
}

impl JobRole {
    /// The salary figure the hourly cost derives from: the override
    /// when one is set (and non-zero), otherwise the market average.
    pub fn effective_salary(&self) -> f64 {
        match self.salary_paid {
            Some(paid) if paid > 0.0 => paid,
            _ => self.market_average,
        }
    }

    /// Re-derives `hourly_cost` from the precedence rule and the given
    /// settings.  The stored value is left untouched on error.
    pub fn refresh_hourly_cost(&mut self, settings: &WorkSettings) -> Result<f64> {
        let rate = hourly_cost(self.effective_salary(), settings)?;
        self.hourly_cost = rate;
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RoleCategory, Seniority};

    fn role(market_average: f64, salary_paid: Option<f64>) -> JobRole {
        JobRole {
            id: "dev-pleno".into(),
            name: "Desenvolvedor".into(),
            level: Seniority::Pleno,
            category: RoleCategory::Developer,
            salary_min: 7000.0,
            salary_max: 10000.0,
            market_average,
            salary_paid,
            hourly_cost: 0.0,
        }
    }

    #[test]
    fn test_hourly_cost_divides_by_monthly_hours() {
        let settings = WorkSettings {
            hours_per_day: 8.0,
            days_per_month: 20.0,
        };
        assert_eq!(hourly_cost(8000.0, &settings).unwrap(), 50.0);
        assert_eq!(hourly_cost(0.0, &settings).unwrap(), 0.0);
    }

    #[test]
    fn test_hourly_cost_rejects_non_positive_settings() {
        for (hours, days) in [(0.0, 22.0), (8.0, 0.0), (-8.0, 22.0), (f64::NAN, 22.0)] {
            let settings = WorkSettings {
                hours_per_day: hours,
                days_per_month: days,
            };
            let err = hourly_cost(5000.0, &settings).unwrap_err();
            assert!(matches!(err, CostError::InvalidWorkSettings { .. }));
        }
    }

    #[test]
    fn test_hourly_cost_rejects_negative_salary() {
        let err = hourly_cost(-1.0, &WorkSettings::default()).unwrap_err();
        assert!(matches!(err, CostError::InvalidSalary(_)));
    }

    #[test]
    fn test_effective_salary_prefers_override() {
        assert_eq!(role(8500.0, Some(9200.0)).effective_salary(), 9200.0);
        assert_eq!(role(8500.0, None).effective_salary(), 8500.0);
        assert_eq!(role(8500.0, Some(0.0)).effective_salary(), 8500.0);
    }

    #[test]
    fn test_refresh_hourly_cost_follows_settings() {
        let mut r = role(8800.0, None);
        let settings = WorkSettings {
            hours_per_day: 8.0,
            days_per_month: 22.0,
        };
        assert_eq!(r.refresh_hourly_cost(&settings).unwrap(), 50.0);
        assert_eq!(r.hourly_cost, 50.0);

        let bad = WorkSettings {
            hours_per_day: 0.0,
            days_per_month: 22.0,
        };
        assert!(r.refresh_hourly_cost(&bad).is_err());
        assert_eq!(r.hourly_cost, 50.0);
    }
}
