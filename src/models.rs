//! Data models for the Defect Cost Engine.
//!
//! The `models` module defines the serialisable structs and enums
//! describing job roles, working-time settings, phase and impact
//! multipliers, and defects together with their cost breakdown.  All
//! types derive `Serialize` and `Deserialize` so they can be persisted
//! in a key-value store or transmitted over HTTP.  The wire names are
//! the Portuguese identifiers used by the dashboard front end
//! (`titulo`, `custoTecnico`, `producao`, ...), while the Rust field
//! names are English.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seniority level of a job role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seniority {
    Junior,
    Pleno,
    Senior,
}

/// Job function a role belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoleCategory {
    #[serde(rename = "desenvolvedor")]
    Developer,
    #[serde(rename = "qa")]
    Qa,
    #[serde(rename = "po")]
    ProductOwner,
    #[serde(rename = "suporte")]
    Support,
}

/// Severity assigned to a defect.  Informational only; it never
/// enters the cost arithmetic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "baixa")]
    Low,
    #[default]
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    High,
    #[serde(rename = "critica")]
    Critical,
}

/// How the defect was perceived by the business or its customers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerceivedImpact {
    #[default]
    #[serde(rename = "sem_impacto")]
    None,
    #[serde(rename = "irritacao_leve")]
    MildIrritation,
    #[serde(rename = "frustracao")]
    Frustration,
    #[serde(rename = "reputacional")]
    Reputational,
}

impl PerceivedImpact {
    pub const ALL: [PerceivedImpact; 4] = [
        PerceivedImpact::None,
        PerceivedImpact::MildIrritation,
        PerceivedImpact::Frustration,
        PerceivedImpact::Reputational,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PerceivedImpact::None => "sem_impacto",
            PerceivedImpact::MildIrritation => "irritacao_leve",
            PerceivedImpact::Frustration => "frustracao",
            PerceivedImpact::Reputational => "reputacional",
        }
    }
}

impl fmt::Display for PerceivedImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery lifecycle phase in which a defect can be discovered.
///
/// Variants are declared from earliest to latest so the derived
/// ordering matches the lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "desenvolvimento")]
    Development,
    #[serde(rename = "teste")]
    Test,
    #[serde(rename = "homologacao")]
    Staging,
    #[default]
    #[serde(rename = "producao")]
    Production,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Development, Phase::Test, Phase::Staging, Phase::Production];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Development => "desenvolvimento",
            Phase::Test => "teste",
            Phase::Staging => "homologacao",
            Phase::Production => "producao",
        }
    }

    /// Phases strictly earlier than `self`, in lifecycle order.
    pub fn earlier(self) -> impl Iterator<Item = Phase> {
        Phase::ALL.into_iter().filter(move |p| *p < self)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labelled pay grade.
///
/// `hourly_cost` is derived: it is always recomputable from the salary
/// precedence rule (see [`JobRole::effective_salary`]) and the current
/// [`WorkSettings`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRole {
    /// Stable identifier such as `"dev-pleno"`.  Role-hours entries
    /// refer to roles by this id.
    pub id: String,
    /// Display name of the job function, e.g. `"Desenvolvedor"`.  The
    /// same name is shared by every seniority level of a function.
    pub name: String,
    /// Seniority of this pay grade.
    pub level: Seniority,
    /// Job function the role belongs to, used to group roles for
    /// display.
    pub category: RoleCategory,
    /// Lower bound of the monthly salary band.  Informational only.
    #[serde(rename = "salarioMinimo")]
    pub salary_min: f64,
    /// Upper bound of the monthly salary band.  Informational only.
    #[serde(rename = "salarioMaximo")]
    pub salary_max: f64,
    /// Market-average monthly salary for this grade.
    #[serde(rename = "mediaMercado")]
    pub market_average: f64,
    /// Salary the organisation actually pays, overriding the market
    /// average when present.
    #[serde(rename = "salarioPraticado", default, skip_serializing_if = "Option::is_none")]
    pub salary_paid: Option<f64>,
    /// Hourly cost derived from the effective salary and the work
    /// settings.  Recomputed on every salary or settings change; any
    /// value sent by a client is overwritten on save.
    #[serde(rename = "custoHora", default)]
    pub hourly_cost: f64,
}

/// Working-time assumptions used to turn a monthly salary into an
/// hourly rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkSettings {
    /// Hours worked per day.  Must be positive.
    #[serde(rename = "horasPorDia")]
    pub hours_per_day: f64,
    /// Days worked per month.  Must be positive.
    #[serde(rename = "diasPorMes")]
    pub days_per_month: f64,
}

impl Default for WorkSettings {
    fn default() -> Self {
        Self {
            hours_per_day: 8.0,
            days_per_month: 22.0,
        }
    }
}

/// How much more expensive a fix is in each phase relative to
/// development.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseMultipliers {
    #[serde(rename = "desenvolvimento")]
    pub development: f64,
    #[serde(rename = "teste")]
    pub test: f64,
    #[serde(rename = "homologacao")]
    pub staging: f64,
    #[serde(rename = "producao")]
    pub production: f64,
}

impl Default for PhaseMultipliers {
    fn default() -> Self {
        Self {
            development: 1.0,
            test: 5.0,
            staging: 10.0,
            production: 30.0,
        }
    }
}

impl PhaseMultipliers {
    pub fn get(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Development => self.development,
            Phase::Test => self.test,
            Phase::Staging => self.staging,
            Phase::Production => self.production,
        }
    }

    pub fn set(&mut self, phase: Phase, value: f64) {
        match phase {
            Phase::Development => self.development = value,
            Phase::Test => self.test = value,
            Phase::Staging => self.staging = value,
            Phase::Production => self.production = value,
        }
    }

    /// True when every multiplier is at least as large as the one of
    /// the phase before it.
    pub fn is_monotonic(&self) -> bool {
        Phase::ALL.windows(2).all(|w| self.get(w[0]) <= self.get(w[1]))
    }
}

/// Multiplier applied to the technical cost for each perceived impact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactMultipliers {
    /// Kept for wire compatibility.  The calculator never applies it:
    /// a defect without impact has no impact cost.
    #[serde(rename = "sem_impacto")]
    pub none: f64,
    #[serde(rename = "irritacao_leve")]
    pub mild_irritation: f64,
    #[serde(rename = "frustracao")]
    pub frustration: f64,
    #[serde(rename = "reputacional")]
    pub reputational: f64,
}

impl Default for ImpactMultipliers {
    fn default() -> Self {
        Self {
            none: 0.0,
            mild_irritation: 1.1,
            frustration: 1.2,
            reputational: 1.3,
        }
    }
}

impl ImpactMultipliers {
    pub fn get(&self, impact: PerceivedImpact) -> f64 {
        match impact {
            PerceivedImpact::None => self.none,
            PerceivedImpact::MildIrritation => self.mild_irritation,
            PerceivedImpact::Frustration => self.frustration,
            PerceivedImpact::Reputational => self.reputational,
        }
    }

    pub fn set(&mut self, impact: PerceivedImpact, value: f64) {
        match impact {
            PerceivedImpact::None => self.none = value,
            PerceivedImpact::MildIrritation => self.mild_irritation = value,
            PerceivedImpact::Frustration => self.frustration = value,
            PerceivedImpact::Reputational => self.reputational = value,
        }
    }
}

/// One line item of effort spent on a defect.
///
/// The hourly cost is captured when the entry is created and is never
/// recomputed afterwards, so stored defects keep the rates that were in
/// effect at the time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleHoursEntry {
    /// Id of the [`JobRole`] that did the work.
    #[serde(rename = "roleId")]
    pub role_id: String,
    /// Role name copied from the configuration when the entry was
    /// created, so renaming a role does not alter recorded defects.
    #[serde(rename = "roleName")]
    pub role_name: String,
    /// Seniority copied from the configuration alongside the name.
    #[serde(rename = "roleLevel")]
    pub role_level: Seniority,
    /// Hours this role spent on the defect.  Fractions are allowed.
    pub hours: f64,
    /// Hourly rate in effect when the entry was created.
    #[serde(rename = "custoHora")]
    pub hourly_cost: f64,
}

impl RoleHoursEntry {
    pub fn cost(&self) -> f64 {
        self.hours * self.hourly_cost
    }
}

/// Input to the cost calculator.
///
/// Every field is optional on the wire; absent fields take the values
/// of [`DefectInput::default`]: empty title and module, zero total
/// hours, medium severity, no perceived impact, discovered in
/// production, and no role-hours entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefectInput {
    #[serde(rename = "titulo")]
    pub title: String,
    /// Display-only hint; the calculator ignores it.
    #[serde(rename = "horasTotais")]
    pub total_hours: f64,
    #[serde(rename = "severidade")]
    pub severity: Severity,
    #[serde(rename = "percepcaoImpacto")]
    pub perceived_impact: PerceivedImpact,
    #[serde(rename = "ambienteEncontrado")]
    pub phase_found: Phase,
    #[serde(rename = "modulo")]
    pub module: String,
    #[serde(rename = "horasPorCargo")]
    pub role_hours: Vec<RoleHoursEntry>,
}

/// Projected cost of fixing the defect in each phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseCosts {
    #[serde(rename = "desenvolvimento")]
    pub development: f64,
    #[serde(rename = "teste")]
    pub test: f64,
    #[serde(rename = "homologacao")]
    pub staging: f64,
    #[serde(rename = "producao")]
    pub production: f64,
}

impl PhaseCosts {
    pub fn get(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Development => self.development,
            Phase::Test => self.test,
            Phase::Staging => self.staging,
            Phase::Production => self.production,
        }
    }

    pub fn from_fn(mut f: impl FnMut(Phase) -> f64) -> Self {
        Self {
            development: f(Phase::Development),
            test: f(Phase::Test),
            staging: f(Phase::Staging),
            production: f(Phase::Production),
        }
    }

    /// Element-wise sum, used when aggregating many defects.
    pub fn add(&self, other: &PhaseCosts) -> PhaseCosts {
        PhaseCosts::from_fn(|p| self.get(p) + other.get(p))
    }
}

/// Savings had the defect been caught in an earlier phase.  Production
/// has no entry: nothing is later than it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Savings {
    #[serde(rename = "desenvolvimento", default, skip_serializing_if = "Option::is_none")]
    pub development: Option<f64>,
    #[serde(rename = "teste", default, skip_serializing_if = "Option::is_none")]
    pub test: Option<f64>,
    #[serde(rename = "homologacao", default, skip_serializing_if = "Option::is_none")]
    pub staging: Option<f64>,
}

impl Savings {
    pub fn get(&self, phase: Phase) -> Option<f64> {
        match phase {
            Phase::Development => self.development,
            Phase::Test => self.test,
            Phase::Staging => self.staging,
            Phase::Production => None,
        }
    }

    /// Records a saving.  Production is ignored.
    pub fn set(&mut self, phase: Phase, value: f64) {
        match phase {
            Phase::Development => self.development = Some(value),
            Phase::Test => self.test = Some(value),
            Phase::Staging => self.staging = Some(value),
            Phase::Production => {}
        }
    }
}

/// Result of a cost computation: the input echoed back together with
/// every derived figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    #[serde(flatten)]
    pub input: DefectInput,
    /// Sum of hours times hourly rate over every role-hours entry.
    #[serde(rename = "custoTecnico")]
    pub technical_cost: f64,
    /// Always equal to `technical_cost`.
    #[serde(rename = "custoPago")]
    pub paid_cost: f64,
    #[serde(rename = "custoComImpacto")]
    pub impact_cost: f64,
    #[serde(rename = "custoPorFase")]
    pub phase_costs: PhaseCosts,
    #[serde(rename = "economias")]
    pub savings: Savings,
    #[serde(rename = "economiaPotencial")]
    pub potential_savings: f64,
}

/// A persisted defect: a cost breakdown plus identity and creation
/// time.  Defects are never edited once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defect {
    pub id: String,
    #[serde(flatten)]
    pub breakdown: CostBreakdown,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Process-wide configuration, edited and persisted as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(rename = "workSettings")]
    pub work_settings: WorkSettings,
    #[serde(rename = "jobRoles")]
    pub job_roles: Vec<JobRole>,
    #[serde(rename = "phaseMultipliers")]
    pub phase_multipliers: PhaseMultipliers,
    #[serde(rename = "impactMultipliers")]
    pub impact_multipliers: ImpactMultipliers,
}
