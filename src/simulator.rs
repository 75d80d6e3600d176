//! Defect drafts: assembling a submission and turning it into a
//! recorded [`Defect`].
//!
//! A [`DefectDraft`] is what a user fills in before asking for a cost
//! simulation.  Role-hours entries capture the hourly rate in effect
//! when the role is added, so later configuration edits do not
//! rewrite the cost of defects already on record.

use crate::engine::compute_cost;
use crate::error::{CostError, Result};
use crate::models::{
    CostBreakdown, Defect, DefectInput, PerceivedImpact, Phase, RoleHoursEntry, Severity, SystemConfig,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefectDraft {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "horasTotais", skip_serializing_if = "Option::is_none")]
    pub total_hours: Option<f64>,
    #[serde(rename = "severidade", skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(rename = "percepcaoImpacto", skip_serializing_if = "Option::is_none")]
    pub perceived_impact: Option<PerceivedImpact>,
    #[serde(rename = "modulo")]
    pub module: String,
    #[serde(rename = "horasPorCargo")]
    pub role_hours: Vec<RoleHoursEntry>,
}

impl DefectDraft {
    pub fn new(title: impl Into<String>, perceived_impact: PerceivedImpact) -> Self {
        Self {
            title: title.into(),
            perceived_impact: Some(perceived_impact),
            ..Self::default()
        }
    }

    /// Adds one hour of work for `role_id`.  A role not yet on the
    /// draft is added with the rate currently resolved for it; a role
    /// already present keeps its captured rate.
    pub fn add_role(&mut self, config: &SystemConfig, role_id: &str) -> Result<()> {
        if let Some(entry) = self.role_hours.iter_mut().find(|e| e.role_id == role_id) {
            entry.hours += 1.0;
            return Ok(());
        }
        let role = config
            .role(role_id)
            .ok_or_else(|| CostError::UnknownRole(role_id.to_string()))?;
        let hourly_cost = config.resolve_rate(role_id)?;
        self.role_hours.push(RoleHoursEntry {
            role_id: role.id.clone(),
            role_name: role.name.clone(),
            role_level: role.level,
            hours: 1.0,
            hourly_cost,
        });
        Ok(())
    }

    pub fn set_hours(&mut self, role_id: &str, hours: f64) -> Result<()> {
        let entry = self
            .role_hours
            .iter_mut()
            .find(|e| e.role_id == role_id)
            .ok_or_else(|| CostError::UnknownRole(role_id.to_string()))?;
        entry.hours = hours;
        Ok(())
    }

    /// Removes a role from the draft.  Returns whether it was present.
    pub fn remove_role(&mut self, role_id: &str) -> bool {
        let before = self.role_hours.len();
        self.role_hours.retain(|e| e.role_id != role_id);
        self.role_hours.len() != before
    }

    /// Re-resolves every entry against `config`: the role name, level
    /// and hourly rate come from the configuration, never from the
    /// submitter.  Fails on a role the configuration does not define.
    pub fn resolve_roles(&mut self, config: &SystemConfig) -> Result<()> {
        for entry in &mut self.role_hours {
            let role = config
                .role(&entry.role_id)
                .ok_or_else(|| CostError::UnknownRole(entry.role_id.clone()))?;
            entry.hourly_cost = config.resolve_rate(&entry.role_id)?;
            entry.role_name = role.name.clone();
            entry.role_level = role.level;
        }
        Ok(())
    }

    /// Sum of hours over every role on the draft.
    pub fn hours_worked(&self) -> f64 {
        self.role_hours.iter().map(|e| e.hours).sum()
    }

    /// Checks the draft is complete and converts it into calculator
    /// input.  Drafts are always recorded as found in production.
    pub fn to_input(&self) -> Result<DefectInput> {
        if self.title.trim().is_empty() {
            return Err(CostError::MissingTitle);
        }
        let perceived_impact = self.perceived_impact.ok_or(CostError::MissingImpact)?;
        if self.role_hours.is_empty() {
            return Err(CostError::NoRoleHours);
        }
        if let Some(entry) = self
            .role_hours
            .iter()
            .find(|e| !e.hours.is_finite() || e.hours < 0.0)
        {
            return Err(CostError::InvalidHours {
                role: entry.role_id.clone(),
                hours: entry.hours,
            });
        }
        if self.hours_worked() == 0.0 {
            return Err(CostError::NoRoleHours);
        }
        Ok(DefectInput {
            title: self.title.clone(),
            total_hours: self.total_hours.unwrap_or(0.0),
            severity: self.severity.unwrap_or_default(),
            perceived_impact,
            phase_found: Phase::Production,
            module: self.module.clone(),
            role_hours: self.role_hours.clone(),
        })
    }

    /// Computes the cost breakdown of the draft without recording it.
    pub fn simulate(&self, config: &SystemConfig) -> Result<CostBreakdown> {
        let input = self.to_input()?;
        Ok(compute_cost(
            input,
            &config.phase_multipliers,
            &config.impact_multipliers,
        ))
    }
}

impl Defect {
    /// Records a breakdown under a fresh id, stamped with the current
    /// time.
    pub fn from_breakdown(breakdown: CostBreakdown) -> Self {
        Defect {
            id: Uuid::new_v4().to_string(),
            breakdown,
            created_at: Utc::now(),
        }
    }
}
