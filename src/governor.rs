// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Growth Governor - Economic Governor
//
// Classifies the latest observed week into a verdict (unit economics vs
// acquisition volume), decides whether spend may scale, flags CM "mirages"
// and names the single biggest dollar leak.

use crate::calculator::derive_weeks;
use crate::money::{currency, currency_opt, percent_opt};
use crate::thresholds::Thresholds;
use crate::types::{
    BiggestLeak, DerivedWeek, GovernorResult, LeakKind, MirageCheck, ScalePermission, Verdict,
    WeekRecord,
};

// ─── Errors ─────────────────────────────────────────────────────────────────

/// Raised when the governor is invoked without a single observed week.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GovernorError {
    #[error("insufficient data: no week has ad spend, contribution margin or new-customer count")]
    InsufficientData,
}

// ─── Attribution Caveats ────────────────────────────────────────────────────

/// Emitted with every verdict, whatever the data says.
pub const ATTRIBUTION_WARNINGS: [&str; 3] = [
    "Platform-reported conversions are modeled and tend to over-credit paid media; reconcile against store orders before acting on them.",
    "New-customer counts depend on the store's first-order attribution; returning buyers counted as new will flatter CAC.",
    "Contribution margin for the latest week is provisional until refunds, returns and chargebacks settle.",
];

// ─── Entry Points ───────────────────────────────────────────────────────────

/// Precondition for [`evaluate_economics`]: at least one observed week.
pub fn has_weeks_with_data(weeks: &[WeekRecord]) -> bool {
    weeks.iter().any(WeekRecord::has_data)
}

pub fn evaluate_economics(weeks: &[WeekRecord]) -> Result<GovernorResult, GovernorError> {
    evaluate_economics_with(weeks, &Thresholds::default())
}

pub fn evaluate_economics_with(
    weeks: &[WeekRecord],
    thresholds: &Thresholds,
) -> Result<GovernorResult, GovernorError> {
    let derived = derive_weeks(weeks);

    // Unfilled future weeks are skipped; the last observed week anchors everything.
    let with_data: Vec<usize> = derived
        .iter()
        .enumerate()
        .filter(|(_, w)| w.record.has_data())
        .map(|(i, _)| i)
        .collect();
    let (&anchor_index, earlier) = with_data
        .split_last()
        .ok_or(GovernorError::InsufficientData)?;
    let anchor = derived[anchor_index].clone();
    let prior = earlier.last().map(|&i| derived[i].clone());

    let volume_signal = volume_signal(&derived, &with_data, thresholds.volume_window);
    let volume_problem = volume_signal.map_or(false, |v| v < thresholds.volume_problem_pva);
    let cm_problem = unit_economics_problem(&anchor, thresholds);

    tracing::debug!(
        anchor = anchor_index,
        weeks_with_data = with_data.len(),
        volume_signal = ?volume_signal,
        unit_cm_actual = ?anchor.unit_cm_actual,
        unit_cm_forecast = ?anchor.unit_cm_forecast,
        cac_aov_gap = ?anchor.cac_aov_gap,
        "economic signals evaluated"
    );

    let verdict = Verdict::from_signals(cm_problem, volume_problem);
    let (scale_permission, scale_reason) =
        scale_decision(&anchor, cm_problem, volume_problem, volume_signal);
    let mirage = detect_mirage(&anchor, thresholds);
    let biggest_leak = biggest_leak(&anchor);

    tracing::info!(
        week = %anchor.record.display_label(),
        verdict = verdict.label(),
        permission = scale_permission.label(),
        mirage = mirage.detected,
        "governor verdict"
    );

    Ok(GovernorResult {
        verdict,
        cm_problem,
        volume_problem,
        volume_signal,
        scale_permission,
        scale_reason,
        warnings: ATTRIBUTION_WARNINGS.iter().map(|w| w.to_string()).collect(),
        mirage,
        biggest_leak,
        anchor_index,
        anchor,
        prior,
        weeks: derived,
    })
}

// ─── Signals ────────────────────────────────────────────────────────────────

/// Mean countPva over the trailing `window` observed weeks, skipping
/// weeks where it is undefined.
fn volume_signal(derived: &[DerivedWeek], with_data: &[usize], window: usize) -> Option<f64> {
    let start = with_data.len().saturating_sub(window);
    let values: Vec<f64> = with_data[start..]
        .iter()
        .filter_map(|&i| derived[i].count_pva)
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// A forecast of exactly zero unit CM is treated as non-negative, so any
/// actual loss is a problem.
fn unit_economics_problem(anchor: &DerivedWeek, thresholds: &Thresholds) -> bool {
    let unit_cm_breach = match (anchor.unit_cm_actual, anchor.unit_cm_forecast) {
        (Some(actual), Some(forecast)) if forecast < 0.0 => {
            actual < forecast * thresholds.cm_loss_multiplier
        }
        (Some(actual), _) => actual < 0.0,
        _ => false,
    };
    let paying_more_than_worth = anchor.cac_aov_gap.map_or(false, |gap| gap > 0.0);
    unit_cm_breach || paying_more_than_worth
}

fn signed_gap(gap: Option<f64>) -> String {
    match gap {
        Some(g) if g > 0.0 => format!("CAC exceeds AOV by {}", currency(g)),
        Some(g) => format!("AOV exceeds CAC by {}", currency(-g)),
        None => "CAC/AOV gap unknown".to_string(),
    }
}

fn scale_decision(
    anchor: &DerivedWeek,
    cm_problem: bool,
    volume_problem: bool,
    volume_signal: Option<f64>,
) -> (ScalePermission, String) {
    let unit_actual = currency_opt(anchor.unit_cm_actual);
    let unit_plan = currency_opt(anchor.unit_cm_forecast);

    if cm_problem {
        let consequence = match anchor.unit_cm_actual {
            Some(unit) if unit < 0.0 => "More spend would multiply the loss on every customer acquired.",
            _ => "The first order does not pay back acquisition, so scaling would lean on repeat purchases that are not in this plan. Close the CAC/AOV gap first.",
        };
        let reason = format!(
            "Unit CM is {} per new customer against a plan of {}; {}. {}",
            unit_actual,
            unit_plan,
            signed_gap(anchor.cac_aov_gap),
            consequence,
        );
        (ScalePermission::Denied, reason)
    } else if volume_problem {
        let reason = format!(
            "Unit economics hold ({} per customer vs plan {}), but new-customer volume is running at {} of plan. Scaling is allowed; the constraint is acquisition volume.",
            unit_actual,
            unit_plan,
            percent_opt(volume_signal),
        );
        (ScalePermission::Allowed, reason)
    } else {
        let reason = format!(
            "Unit economics ({} per customer vs plan {}) and volume are on plan. Scaling is allowed while CAC stays below AOV.",
            unit_actual, unit_plan,
        );
        (ScalePermission::Allowed, reason)
    }
}

// ─── Mirage ─────────────────────────────────────────────────────────────────

/// Total CM can beat plan simply because fewer (loss-making) customers were
/// bought. That outperformance is a mirage when volume badly under-delivers.
fn detect_mirage(anchor: &DerivedWeek, thresholds: &Thresholds) -> MirageCheck {
    let cm_at_forecast_volume = match (anchor.unit_cm_actual, anchor.record.count_forecast) {
        (Some(unit), Some(count)) => Some(unit * count),
        _ => None,
    };
    let detected = matches!(
        (anchor.cm_pva, anchor.count_pva),
        (Some(cm), Some(count)) if cm > thresholds.mirage_cm_pva && count < thresholds.mirage_count_pva
    );

    let explanation = detected.then(|| {
        format!(
            "Total CM is at {} of plan while new customers are at only {}. The CM beat comes from acquiring fewer customers, not better economics: at forecast volume this unit CM would total {} against a plan of {}.",
            percent_opt(anchor.cm_pva),
            percent_opt(anchor.count_pva),
            currency_opt(cm_at_forecast_volume),
            currency_opt(anchor.record.cm_forecast),
        )
    });

    MirageCheck {
        detected,
        explanation,
        cm_at_forecast_volume,
    }
}

// ─── Biggest Leak ───────────────────────────────────────────────────────────

/// Larger of CAC overspend and AOV shortfall in weekly dollars. Candidates
/// are checked in order and CAC wins a tie. Only positive gaps count as leaks.
pub fn biggest_leak(week: &DerivedWeek) -> Option<BiggestLeak> {
    let r = &week.record;
    let count = r.count_actual?;
    let cac_overspend = match (r.cac_actual, r.cac_forecast) {
        (Some(actual), Some(plan)) => Some(actual - plan),
        _ => None,
    };
    let aov_shortfall = match (r.aov_forecast, r.aov_actual) {
        (Some(plan), Some(actual)) => Some(plan - actual),
        _ => None,
    };

    [
        (LeakKind::CacOverspend, cac_overspend),
        (LeakKind::AovShortfall, aov_shortfall),
    ]
    .into_iter()
    .filter_map(|(kind, gap)| {
        gap.filter(|g| *g > 0.0).map(|g| BiggestLeak {
            kind,
            per_customer: g,
            per_week: g * count,
        })
    })
    .fold(None, |best: Option<BiggestLeak>, candidate| match best {
        Some(b) if b.per_week >= candidate.per_week => Some(b),
        _ => Some(candidate),
    })
}

// ─── Tests ──────────────────────────────────────────────────────────────────
