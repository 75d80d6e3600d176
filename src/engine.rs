//! Defect cost computation engine.
//!
//! The `engine` module turns a [`DefectInput`] into a
//! [`CostBreakdown`].  The technical and impact-adjusted costs are
//! fixed arithmetic; how the technical cost is spread across the
//! lifecycle phases is delegated to an implementation of the
//! [`PhaseProjection`] trait.  [`compute_cost`] uses
//! [`BackwardFromProduction`], which treats every tracked defect as
//! found in production.  Batches of inputs are computed in parallel
//! with [`rayon`].
//!
//! Every function here is pure: configuration is passed in by
//! reference and never mutated.

use crate::models::{
    CostBreakdown, DefectInput, ImpactMultipliers, PerceivedImpact, Phase, PhaseCosts,
    PhaseMultipliers, Savings,
};
use rayon::prelude::*;

/// Per-phase figures derived from a technical cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub phase_costs: PhaseCosts,
    pub savings: Savings,
    pub potential_savings: f64,
}

/// Spreads a technical cost across the lifecycle phases.
///
/// Projections must be thread-safe (`Send + Sync`) because batches are
/// computed concurrently.
pub trait PhaseProjection: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Projects `technical_cost`, spent on a defect discovered in
    /// `found`, onto every phase.
    fn project(&self, technical_cost: f64, found: Phase, multipliers: &PhaseMultipliers) -> Projection;
}

/// The technical cost already carries the production multiplier.  The
/// development baseline is `technical / production` and every phase
/// costs `baseline * multiplier[phase]`, whatever phase the defect was
/// reported in.
///
/// With multipliers increasing across the lifecycle the projection is
/// monotonic, `phase_costs.production == technical_cost`, and every
/// saving is non-negative.  Otherwise savings are reported unclamped
/// and may be negative.  A production multiplier of zero yields
/// non-finite figures; configuration validation rejects it.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackwardFromProduction;

impl PhaseProjection for BackwardFromProduction {
    fn name(&self) -> &str {
        "backward-from-production"
    }

    fn project(&self, technical_cost: f64, _found: Phase, multipliers: &PhaseMultipliers) -> Projection {
        let baseline = technical_cost / multipliers.production;
        let phase_costs = PhaseCosts::from_fn(|p| baseline * multipliers.get(p));
        let mut savings = Savings::default();
        for phase in Phase::Production.earlier() {
            savings.set(phase, technical_cost - phase_costs.get(phase));
        }
        Projection {
            phase_costs,
            savings,
            potential_savings: technical_cost - phase_costs.development,
        }
    }
}

/// Like [`BackwardFromProduction`] but anchored on the phase the defect
/// was actually found in: the baseline is `technical / multiplier[found]`
/// and savings are only reported for phases earlier than `found`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelativeToDiscovered;

impl PhaseProjection for RelativeToDiscovered {
    fn name(&self) -> &str {
        "relative-to-discovered"
    }

    fn project(&self, technical_cost: f64, found: Phase, multipliers: &PhaseMultipliers) -> Projection {
        let baseline = technical_cost / multipliers.get(found);
        let phase_costs = PhaseCosts::from_fn(|p| baseline * multipliers.get(p));
        let mut savings = Savings::default();
        for phase in found.earlier() {
            savings.set(phase, technical_cost - phase_costs.get(phase));
        }
        Projection {
            phase_costs,
            savings,
            potential_savings: technical_cost - phase_costs.development,
        }
    }
}

/// Treats the technical cost as the development baseline and multiplies
/// it forward: `cost[phase] = technical * multiplier[phase]`.  Potential
/// savings compare the found phase against development and are clamped
/// at zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardFromBaseline;

impl PhaseProjection for ForwardFromBaseline {
    fn name(&self) -> &str {
        "forward-from-baseline"
    }

    fn project(&self, technical_cost: f64, found: Phase, multipliers: &PhaseMultipliers) -> Projection {
        let phase_costs = PhaseCosts::from_fn(|p| technical_cost * multipliers.get(p));
        let mut savings = Savings::default();
        for phase in found.earlier() {
            savings.set(phase, technical_cost - phase_costs.get(phase));
        }
        Projection {
            phase_costs,
            savings,
            potential_savings: (phase_costs.get(found) - phase_costs.development).max(0.0),
        }
    }
}

/// Sum of `hours * hourly_cost` over every role-hours entry.
pub fn technical_cost(input: &DefectInput) -> f64 {
    input.role_hours.iter().map(|entry| entry.cost()).sum()
}

/// Technical cost scaled by the impact multiplier.  A defect without
/// perceived impact has no impact cost, whatever the configured
/// multiplier says.
pub fn impact_cost(technical_cost: f64, impact: PerceivedImpact, multipliers: &ImpactMultipliers) -> f64 {
    match impact {
        PerceivedImpact::None => 0.0,
        other => technical_cost * multipliers.get(other),
    }
}

/// Computes the full cost breakdown of a defect, deriving every phase
/// backward from production.
pub fn compute_cost(
    input: DefectInput,
    phase_multipliers: &PhaseMultipliers,
    impact_multipliers: &ImpactMultipliers,
) -> CostBreakdown {
    compute_cost_with(&BackwardFromProduction, input, phase_multipliers, impact_multipliers)
}

/// Computes the full cost breakdown using the given projection model.
pub fn compute_cost_with(
    projection: &dyn PhaseProjection,
    input: DefectInput,
    phase_multipliers: &PhaseMultipliers,
    impact_multipliers: &ImpactMultipliers,
) -> CostBreakdown {
    let technical = technical_cost(&input);
    let impact = impact_cost(technical, input.perceived_impact, impact_multipliers);
    let Projection {
        phase_costs,
        savings,
        potential_savings,
    } = projection.project(technical, input.phase_found, phase_multipliers);
    tracing::trace!(
        model = projection.name(),
        technical,
        impact,
        potential_savings,
        "computed defect cost"
    );
    CostBreakdown {
        input,
        technical_cost: technical,
        paid_cost: technical,
        impact_cost: impact,
        phase_costs,
        savings,
        potential_savings,
    }
}

/// Computes many defects in parallel.  Output order matches input
/// order.
pub fn compute_batch(
    inputs: Vec<DefectInput>,
    phase_multipliers: &PhaseMultipliers,
    impact_multipliers: &ImpactMultipliers,
) -> Vec<CostBreakdown> {
    inputs
        .into_par_iter()
        .map(|input| compute_cost(input, phase_multipliers, impact_multipliers))
        .collect()
}
