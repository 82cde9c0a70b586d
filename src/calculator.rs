// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Growth Governor - Derived Metrics

use crate::types::{DerivedWeek, WeekRecord};

/// `actual / forecast × 100`. Undefined when either side is missing or the
/// forecast is exactly zero ("not comparable").
pub fn plan_vs_actual(actual: Option<f64>, forecast: Option<f64>) -> Option<f64> {
    match (actual, forecast) {
        (Some(a), Some(f)) if f != 0.0 => Some(a / f * 100.0),
        _ => None,
    }
}

/// Per-customer value; only defined for a strictly positive count.
fn per_customer(total: Option<f64>, count: Option<f64>) -> Option<f64> {
    match (total, count) {
        (Some(t), Some(c)) if c > 0.0 => Some(t / c),
        _ => None,
    }
}

pub fn derive_week(week: &WeekRecord) -> DerivedWeek {
    let cac_aov_gap = match (week.cac_actual, week.aov_actual) {
        (Some(cac), Some(aov)) => Some(cac - aov),
        _ => None,
    };
    let click_session_ratio = match (week.meta_clicks, week.shopify_sessions) {
        (Some(clicks), Some(sessions)) if sessions > 0.0 => Some(clicks / sessions),
        _ => None,
    };

    DerivedWeek {
        cm_pva: plan_vs_actual(week.cm_actual, week.cm_forecast),
        count_pva: plan_vs_actual(week.count_actual, week.count_forecast),
        aov_pva: plan_vs_actual(week.aov_actual, week.aov_forecast),
        cac_pva: plan_vs_actual(week.cac_actual, week.cac_forecast),
        unit_cm_actual: per_customer(week.cm_actual, week.count_actual),
        unit_cm_forecast: per_customer(week.cm_forecast, week.count_forecast),
        cac_aov_gap,
        click_session_ratio,
        record: week.clone(),
    }
}

/// Derive every week, preserving input (chronological) order.
pub fn derive_weeks(weeks: &[WeekRecord]) -> Vec<DerivedWeek> {
    weeks.iter().map(derive_week).collect()
}
