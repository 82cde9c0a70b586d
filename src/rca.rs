// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Growth Governor - Root-Cause Synthesis

//! Turns the funnel checkpoints into one root-cause narrative.
//!
//! Only the funnel-specific checkpoints (2 attention, 3 click integrity,
//! 4 conversion) take part; steps 1, 5 and 6 restate the economics the
//! governor already judged.

use crate::types::{FunnelStep, RcaKind, RcaSummary, StepStatus, Verdict};

/// Funnel checkpoints considered for root cause, in priority order.
pub const FUNNEL_STEPS: [u8; 3] = [2, 3, 4];

struct Buckets<'a> {
    failed: Vec<&'a FunnelStep>,
    warning: Vec<&'a FunnelStep>,
    no_data: Vec<&'a FunnelStep>,
    relevant: usize,
}

fn partition(steps: &[FunnelStep]) -> Buckets<'_> {
    let mut buckets = Buckets {
        failed: Vec::new(),
        warning: Vec::new(),
        no_data: Vec::new(),
        relevant: 0,
    };
    for step in steps.iter().filter(|s| FUNNEL_STEPS.contains(&s.step)) {
        buckets.relevant += 1;
        match step.status {
            StepStatus::Fail => buckets.failed.push(step),
            StepStatus::Warning => buckets.warning.push(step),
            StepStatus::NoData => buckets.no_data.push(step),
            StepStatus::Pass => {}
        }
    }
    buckets
}

pub fn synthesize(steps: &[FunnelStep], verdict: Verdict) -> RcaSummary {
    let buckets = partition(steps);

    if buckets.no_data.len() == buckets.relevant {
        return collect_data(&buckets.no_data);
    }

    // First failure wins, then first warning.
    let primary = match buckets.failed.first().or_else(|| buckets.warning.first()) {
        Some(step) => *step,
        None => return healthy_funnel(verdict),
    };

    // Failures before warnings, step order within each.
    let mut others: Vec<&FunnelStep> = steps
        .iter()
        .filter(|s| FUNNEL_STEPS.contains(&s.step) && s.step != primary.step && s.status.is_unhealthy())
        .collect();
    others.sort_by_key(|s| std::cmp::Reverse(s.status.severity()));
    let other_issues = (!others.is_empty()).then(|| {
        let listed = others
            .iter()
            .map(|s| format!("Step {} {} ({})", s.step, s.title, s.status.label()))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Also unhealthy: {}. Fix the primary cause first, then re-check these.",
            listed
        )
    });

    breakdown(primary, other_issues)
}

// ─── Collect Data ───────────────────────────────────────────────────────────

fn unlocking_inputs(step: u8) -> &'static str {
    match step {
        2 => "CPM, CTR and frequency from Ads Manager",
        3 => "Meta link clicks and store sessions",
        4 => "store conversion rate",
        _ => "primary sheet fields",
    }
}

fn collect_data(missing: &[&FunnelStep]) -> RcaSummary {
    let inputs = missing
        .iter()
        .map(|s| format!("{} (unlocks step {})", unlocking_inputs(s.step), s.step))
        .collect::<Vec<_>>()
        .join("; ");

    RcaSummary {
        kind: RcaKind::CollectData,
        primary_step: None,
        headline: "Collect funnel data before diagnosing".to_string(),
        action: format!("Enter this week's secondary metrics: {}.", inputs),
        root_cause: "Unknown: no funnel checkpoint has data for the latest week.".to_string(),
        discussion: "The economic verdict stands on primary data alone, but without attention, click and conversion numbers the break cannot be localised to a funnel stage.".to_string(),
        remedy: "Pull the figures for the same week the verdict was anchored on, then re-run the diagnosis.".to_string(),
        anti_pattern: Some("Guessing at creative or landing-page changes before the funnel has been measured.".to_string()),
        other_issues: None,
    }
}

// ─── Healthy Funnel ─────────────────────────────────────────────────────────

fn healthy_funnel(verdict: Verdict) -> RcaSummary {
    let root_cause = match verdict {
        Verdict::Neither => "None: the funnel and the economics are both healthy.".to_string(),
        v => format!(
            "The funnel checkpoints are healthy, so the {} lies in primary data: pricing, margin, COGS or offer economics rather than the funnel.",
            v.label().to_lowercase()
        ),
    };

    RcaSummary {
        kind: RcaKind::HealthyFunnel,
        primary_step: None,
        headline: "Funnel is healthy".to_string(),
        action: match verdict {
            Verdict::Neither => "Hold course; keep monitoring weekly.".to_string(),
            _ => "Audit the primary sheet: AOV, gross margin, discounting and CAC targets.".to_string(),
        },
        root_cause,
        discussion: "Attention, click integrity and conversion are within range for the checkpoints that have data.".to_string(),
        remedy: "Work on offer, pricing and margin levers; media changes will not fix an economics problem that the funnel does not show.".to_string(),
        anti_pattern: None,
        other_issues: None,
    }
}

// ─── Breakdown ──────────────────────────────────────────────────────────────

fn breakdown(primary: &FunnelStep, other_issues: Option<String>) -> RcaSummary {
    let (headline, action, root_cause, discussion, remedy, anti_pattern) = match primary.step {
        2 => (
            "Attention is the break",
            "Refresh creative and widen or rotate audiences this week.",
            "Ads are expensive to show, are not earning clicks, or are being shown to the same people too often.",
            "Weak attention raises the cost of every downstream step; CAC climbs even when the site converts well.",
            "Launch new hooks and formats, cap frequency, and expand audiences that are saturated.",
            "Raising budget on fatigued creative to force volume.",
        ),
        3 => (
            "Clicks are not reaching the store",
            "Audit tracking and the landing page path from ad click to first page view.",
            "Paid clicks are being lost between the ad and the store: slow or broken landing pages, redirects, or mis-configured tracking.",
            "Every lost click is paid for and never has a chance to convert, so CAC inflates without any creative or offer problem.",
            "Check page speed on mobile, remove redirects, verify UTM and pixel setup, and compare platform clicks with analytics sessions per ad.",
            "Optimising creative for more clicks while the click-to-session path is leaking.",
        ),
        4 => (
            "On-site conversion is the break",
            "Run an on-site conversion audit: product page, cart and checkout.",
            "Visitors arrive but do not buy: offer, price presentation, trust signals or checkout friction.",
            "Traffic quality looks fine upstream, so the loss happens on the site itself.",
            "Test offer and product-page changes, simplify checkout, and check mobile usability and shipping costs.",
            "Buying more traffic to compensate for a site that does not convert.",
        ),
        _ => (
            "Funnel issue",
            "Review the flagged checkpoint.",
            "A funnel checkpoint is unhealthy.",
            "",
            "Address the flagged metric.",
            "",
        ),
    };

    RcaSummary {
        kind: RcaKind::Breakdown,
        primary_step: Some(primary.step),
        headline: format!("{} ({})", headline, primary.status.label()),
        action: action.to_string(),
        root_cause: format!("{} Evidence: {}", root_cause, primary.finding),
        discussion: discussion.to_string(),
        remedy: remedy.to_string(),
        anti_pattern: (!anti_pattern.is_empty()).then(|| anti_pattern.to_string()),
        other_issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataSource;

    fn step(n: u8, status: StepStatus) -> FunnelStep {
        FunnelStep {
            step: n,
            title: "t",
            status,
            finding: format!("finding {}", n),
            source: DataSource::Secondary,
            caution: None,
        }
    }

    fn steps(s2: StepStatus, s3: StepStatus, s4: StepStatus) -> Vec<FunnelStep> {
        vec![
            step(1, StepStatus::Fail),
            step(2, s2),
            step(3, s3),
            step(4, s4),
            step(5, StepStatus::Fail),
            step(6, StepStatus::Fail),
        ]
    }

    #[test]
    fn all_no_data_asks_for_data() {
        let rca = synthesize(
            &steps(StepStatus::NoData, StepStatus::NoData, StepStatus::NoData),
            Verdict::Both,
        );
        assert_eq!(rca.kind, RcaKind::CollectData);
        assert!(rca.action.contains("unlocks step 2"));
        assert!(rca.action.contains("unlocks step 4"));
    }

    #[test]
    fn economic_steps_do_not_count() {
        // Steps 1, 5, 6 failing alone must not produce a breakdown.
        let rca = synthesize(
            &steps(StepStatus::Pass, StepStatus::NoData, StepStatus::Pass),
            Verdict::CmProblem,
        );
        assert_eq!(rca.kind, RcaKind::HealthyFunnel);
        assert!(rca.root_cause.contains("primary data"));
    }

    #[test]
    fn first_failure_beats_earlier_warning() {
        let rca = synthesize(
            &steps(StepStatus::Warning, StepStatus::Pass, StepStatus::Fail),
            Verdict::Both,
        );
        assert_eq!(rca.kind, RcaKind::Breakdown);
        assert_eq!(rca.primary_step, Some(4));
        assert!(rca.action.contains("conversion audit"));
        let others = rca.other_issues.unwrap();
        assert!(others.contains("Step 2"));
        assert!(!others.contains("Step 4"));
    }

    #[test]
    fn first_warning_when_nothing_fails() {
        let rca = synthesize(
            &steps(StepStatus::Pass, StepStatus::Warning, StepStatus::Warning),
            Verdict::Neither,
        );
        assert_eq!(rca.primary_step, Some(3));
        assert!(rca.action.contains("tracking"));
        assert!(rca.root_cause.contains("finding 3"));
        assert!(rca.other_issues.unwrap().contains("Step 4"));
    }

    #[test]
    fn other_issues_list_failures_before_warnings() {
        let rca = synthesize(
            &steps(StepStatus::Warning, StepStatus::Fail, StepStatus::Fail),
            Verdict::Neither,
        );
        assert_eq!(rca.primary_step, Some(3));
        assert_eq!(
            rca.other_issues.as_deref(),
            Some("Also unhealthy: Step 4 t (FAIL), Step 2 t (WARNING). Fix the primary cause first, then re-check these.")
        );
    }

    #[test]
    fn single_unhealthy_step_has_no_other_issues() {
        let rca = synthesize(
            &steps(StepStatus::Fail, StepStatus::Pass, StepStatus::NoData),
            Verdict::VolumeProblem,
        );
        assert_eq!(rca.primary_step, Some(2));
        assert!(rca.other_issues.is_none());
        assert!(rca.anti_pattern.is_some());
    }
}
