//! Sample defects used to populate an empty ledger, so a fresh
//! dashboard has something to show.
//!
//! Costs are computed from the given configuration rather than stored
//! as literals; only the effort, the classification and the creation
//! date are fixed.

use crate::engine::compute_cost;
use crate::models::{
    Defect, DefectInput, PerceivedImpact, Phase, RoleHoursEntry, Severity, SystemConfig,
};
use chrono::{TimeZone, Utc};

struct Sample {
    id: &'static str,
    title: &'static str,
    severity: Severity,
    impact: PerceivedImpact,
    phase: Phase,
    module: &'static str,
    effort: &'static [(&'static str, f64)],
    created: (i32, u32, u32, u32, u32),
}

const SAMPLES: &[Sample] = &[
    Sample {
        id: "sample-1",
        title: "Bug no login de usuários",
        severity: Severity::High,
        impact: PerceivedImpact::Frustration,
        phase: Phase::Production,
        module: "Autenticação",
        effort: &[("dev-senior", 34.0), ("po-senior", 3.0)],
        created: (2024, 9, 15, 10, 0),
    },
    Sample {
        id: "sample-2",
        title: "Erro no processamento de pagamentos",
        severity: Severity::Critical,
        impact: PerceivedImpact::Reputational,
        phase: Phase::Test,
        module: "Pagamentos",
        effort: &[("dev-pleno", 20.0), ("qa-senior", 6.0), ("po-pleno", 2.0)],
        created: (2024, 9, 20, 15, 30),
    },
    Sample {
        id: "sample-3",
        title: "Interface não responsiva em mobile",
        severity: Severity::Medium,
        impact: PerceivedImpact::MildIrritation,
        phase: Phase::Staging,
        module: "Interface",
        effort: &[("dev-junior", 12.0), ("qa-pleno", 3.0)],
        created: (2024, 9, 18, 9, 15),
    },
];

/// Builds the sample defects against `config`.  Effort on roles the
/// configuration does not define is skipped.
pub fn sample_defects(config: &SystemConfig) -> Vec<Defect> {
    SAMPLES
        .iter()
        .map(|sample| {
            let role_hours: Vec<RoleHoursEntry> = sample
                .effort
                .iter()
                .filter_map(|(role_id, hours)| {
                    let role = config.role(role_id)?;
                    let hourly_cost = config.resolve_rate(role_id).ok()?;
                    Some(RoleHoursEntry {
                        role_id: role.id.clone(),
                        role_name: role.name.clone(),
                        role_level: role.level,
                        hours: *hours,
                        hourly_cost,
                    })
                })
                .collect();
            let input = DefectInput {
                title: sample.title.to_string(),
                total_hours: role_hours.iter().map(|e| e.hours).sum(),
                severity: sample.severity,
                perceived_impact: sample.impact,
                phase_found: sample.phase,
                module: sample.module.to_string(),
                role_hours,
            };
            let (y, mo, d, h, mi) = sample.created;
            Defect {
                id: sample.id.to_string(),
                breakdown: compute_cost(input, &config.phase_multipliers, &config.impact_multipliers),
                created_at: Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).single().unwrap_or_else(Utc::now),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_follow_configuration() {
        let config = SystemConfig::default();
        let samples = sample_defects(&config);
        assert_eq!(samples.len(), 3);

        let login = &samples[0].breakdown;
        assert_eq!(login.input.total_hours, 37.0);
        let expected = 34.0 * 15000.0 / 176.0 + 3.0 * 16500.0 / 176.0;
        assert!((login.technical_cost - expected).abs() < 1e-9);
        assert!((login.phase_costs.production - login.technical_cost).abs() < 1e-9);
        assert_eq!(samples[1].created_at.to_rfc3339(), "2024-09-20T15:30:00+00:00");
    }

    #[test]
    fn test_unknown_sample_roles_are_skipped() {
        let mut config = SystemConfig::default();
        config.job_roles.retain(|r| r.id != "po-senior");
        let samples = sample_defects(&config);
        assert_eq!(samples[0].breakdown.input.role_hours.len(), 1);
    }
}
