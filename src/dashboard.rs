//! Aggregations over recorded defects for the dashboard.

use crate::models::{Defect, Phase, PhaseCosts, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Months shown in the cost trend.
pub const TREND_MONTHS: usize = 6;

/// Narrows the defects a summary covers.  `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefectFilter {
    #[serde(rename = "ambiente", skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    #[serde(rename = "severidade", skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(rename = "modulo", skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

impl DefectFilter {
    pub fn matches(&self, defect: &Defect) -> bool {
        let input = &defect.breakdown.input;
        self.phase.map_or(true, |p| input.phase_found == p)
            && self.severity.map_or(true, |s| input.severity == s)
            && self.module.as_deref().map_or(true, |m| input.module == m)
    }

    pub fn apply<'a>(&self, defects: &'a [Defect]) -> Vec<&'a Defect> {
        defects.iter().filter(|d| self.matches(d)).collect()
    }
}

/// Impact-adjusted cost recorded in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCost {
    /// `YYYY-MM`.
    #[serde(rename = "mes")]
    pub month: String,
    #[serde(rename = "custo")]
    pub cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(rename = "quantidade")]
    pub count: usize,
    #[serde(rename = "totalCustoPago")]
    pub total_paid: f64,
    #[serde(rename = "totalCustoComImpacto")]
    pub total_with_impact: f64,
    #[serde(rename = "totalCustoPorFase")]
    pub total_per_phase: PhaseCosts,
    #[serde(rename = "totalEconomiaPotencial")]
    pub total_potential_savings: f64,
    /// Oldest first, at most [`TREND_MONTHS`] entries.
    #[serde(rename = "tendenciaMensal")]
    pub monthly_trend: Vec<MonthlyCost>,
}

/// Distinct non-empty module labels, in first-seen order.
pub fn modules(defects: &[Defect]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for defect in defects {
        let module = &defect.breakdown.input.module;
        if !module.is_empty() && !seen.contains(module) {
            seen.push(module.clone());
        }
    }
    seen
}

pub fn summarize(defects: &[Defect], filter: &DefectFilter) -> DashboardSummary {
    let selected = filter.apply(defects);

    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();
    for defect in &selected {
        *by_month
            .entry(defect.created_at.format("%Y-%m").to_string())
            .or_default() += defect.breakdown.impact_cost;
    }
    let skip = by_month.len().saturating_sub(TREND_MONTHS);
    let monthly_trend = by_month
        .into_iter()
        .skip(skip)
        .map(|(month, cost)| MonthlyCost { month, cost })
        .collect();

    DashboardSummary {
        count: selected.len(),
        total_paid: selected.iter().map(|d| d.breakdown.paid_cost).sum(),
        total_with_impact: selected.iter().map(|d| d.breakdown.impact_cost).sum(),
        total_per_phase: selected
            .iter()
            .fold(PhaseCosts::default(), |acc, d| acc.add(&d.breakdown.phase_costs)),
        total_potential_savings: selected.iter().map(|d| d.breakdown.potential_savings).sum(),
        monthly_trend,
    }
}
