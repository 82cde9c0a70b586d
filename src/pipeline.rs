// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Growth Governor - Evaluation Pipeline

use serde::Serialize;

use crate::funnel::evaluate_funnel_with;
use crate::governor::{evaluate_economics_with, GovernorError};
use crate::thresholds::Thresholds;
use crate::types::{DiagnosticianResult, GovernorResult, WeekRecord};

/// Both layers of the diagnosis for one week series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub economics: GovernorResult,
    pub funnel: DiagnosticianResult,
}

/// calculator → governor → diagnostician. Fails only when no week has data.
pub fn diagnose(weeks: &[WeekRecord]) -> Result<Diagnosis, GovernorError> {
    diagnose_with(weeks, &Thresholds::default())
}

pub fn diagnose_with(weeks: &[WeekRecord], thresholds: &Thresholds) -> Result<Diagnosis, GovernorError> {
    let economics = evaluate_economics_with(weeks, thresholds)?;
    let funnel = evaluate_funnel_with(&economics, thresholds);
    Ok(Diagnosis { economics, funnel })
}
