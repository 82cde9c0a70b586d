// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Growth Governor - Funnel Diagnostician
//
// Six ordered checkpoints, each a small table of (predicate, status,
// finding) rules where the first matching rule decides. Steps 2-4 read
// directional platform data; 1, 5 and 6 read the primary sheet.

use crate::governor::biggest_leak;
use crate::money::{count, currency, currency_opt, percent, points, ratio};
use crate::rca::synthesize;
use crate::thresholds::Thresholds;
use crate::types::{
    AllowedScope, BiggestLeak, DataSource, DerivedWeek, DiagnosticianResult, FunnelStep,
    GovernorResult, ScalePermission, StepStatus, Verdict,
};

pub const SPEND_ORDERS: &str = "Spend → Orders Reality";
pub const ATTENTION: &str = "Attention Quality";
pub const CLICK_SESSION: &str = "Click → Session Integrity";
pub const CONVERSION: &str = "Conversion Mechanics";
pub const NEW_CUSTOMERS: &str = "New-Customer Reality";
pub const CASH_LEAK: &str = "Cash & CM Leak";

const DIRECTIONAL_CAUTION: &str =
    "Ad-platform figures are directional; confirm against store analytics before acting.";

// ─── Rule Tables ────────────────────────────────────────────────────────────

/// One rule of a checkpoint.
struct Rule<T> {
    applies: fn(&T, &Thresholds) -> bool,
    status: StepStatus,
    finding: fn(&T, &Thresholds) -> String,
}

/// First matching rule wins. Tables end in a catch-all, so the fallback
/// only fires for an empty table.
fn first_match<T>(rules: &[Rule<T>], input: &T, t: &Thresholds) -> (StepStatus, String) {
    rules
        .iter()
        .find(|rule| (rule.applies)(input, t))
        .map(|rule| (rule.status, (rule.finding)(input, t)))
        .unwrap_or((StepStatus::NoData, String::new()))
}

fn no_data(step: u8, title: &'static str, source: DataSource, finding: &str) -> FunnelStep {
    FunnelStep {
        step,
        title,
        status: StepStatus::NoData,
        finding: finding.to_string(),
        source,
        caution: None,
    }
}

// ─── Entry Points ───────────────────────────────────────────────────────────

pub fn evaluate_funnel(governor: &GovernorResult) -> DiagnosticianResult {
    evaluate_funnel_with(governor, &Thresholds::default())
}

pub fn evaluate_funnel_with(governor: &GovernorResult, t: &Thresholds) -> DiagnosticianResult {
    let week = &governor.anchor;
    let prior = governor.prior.as_ref();

    let steps = vec![
        spend_orders_step(week, prior, t),
        attention_step(week, t),
        click_session_step(week, t),
        conversion_step(week, prior, t),
        new_customer_step(week, t),
        cash_leak_step(week, t),
    ];

    for step in &steps {
        tracing::debug!(step = step.step, status = step.status.label(), "funnel checkpoint");
    }

    let rca = synthesize(&steps, governor.verdict);
    tracing::info!(rca = ?rca.kind, primary_step = ?rca.primary_step, "funnel diagnosis");

    DiagnosticianResult {
        scope: allowed_scope(governor.verdict),
        steps,
        rca,
    }
}

/// What kind of work the verdict permits; depends on nothing but the verdict.
pub fn allowed_scope(verdict: Verdict) -> AllowedScope {
    if verdict.has_cm_problem() {
        AllowedScope {
            permission: ScalePermission::LeakHuntOnly,
            description: "Leak-hunting only: fix unit economics before adding any spend. Use the checkpoints below to find where money leaks.".to_string(),
        }
    } else if verdict.has_volume_problem() {
        AllowedScope {
            permission: ScalePermission::Allowed,
            description: "Volume growth allowed: unit economics hold, so the work is acquiring more new customers at the current CAC.".to_string(),
        }
    } else {
        AllowedScope {
            permission: ScalePermission::Allowed,
            description: "No issues flagged: economics and volume are on plan.".to_string(),
        }
    }
}

// ─── Step 1: Spend → Orders ─────────────────────────────────────────────────

struct SpendOrders {
    spend: f64,
    orders: f64,
    /// (spend % change, orders % change) against the prior week.
    change: Option<(f64, f64)>,
    cac: Option<f64>,
    aov: Option<f64>,
}

impl SpendOrders {
    fn gap(&self) -> Option<f64> {
        self.change.map(|(spend, orders)| spend - orders)
    }
}

fn pct_change(current: f64, previous: f64) -> Option<f64> {
    (previous != 0.0).then(|| (current - previous) / previous * 100.0)
}

fn describe_change(s: &SpendOrders) -> String {
    match s.change {
        Some((spend, orders)) => format!(
            "Spend moved {} while orders moved {}",
            signed_percent(spend),
            signed_percent(orders)
        ),
        None => String::new(),
    }
}

fn signed_percent(v: f64) -> String {
    if v > 0.0 { format!("+{}", percent(v)) } else { percent(v) }
}

const SPEND_ORDER_RULES: &[Rule<SpendOrders>] = &[
    Rule {
        applies: |s, t| {
            matches!(s.change, Some((spend, orders)) if spend > 0.0 && orders <= 0.0)
                && s.gap().map_or(false, |g| g > t.spend_order_gap_points)
        },
        status: StepStatus::Fail,
        finding: |s, _| {
            format!(
                "{}: the extra spend bought no extra orders.",
                describe_change(s)
            )
        },
    },
    Rule {
        applies: |s, t| s.gap().map_or(false, |g| g > t.spend_order_gap_points),
        status: StepStatus::Warning,
        finding: |s, t| {
            format!(
                "{}: spend is outpacing orders by more than {} points.",
                describe_change(s),
                t.spend_order_gap_points
            )
        },
    },
    Rule {
        applies: |s, _| s.change.is_some(),
        status: StepStatus::Pass,
        finding: |s, _| format!("{}: orders are keeping pace with spend.", describe_change(s)),
    },
    Rule {
        applies: |s, _| matches!((s.cac, s.aov), (Some(cac), Some(aov)) if cac > aov),
        status: StepStatus::Fail,
        finding: |s, _| {
            format!(
                "CAC {} exceeds AOV {}: each order costs more to acquire than it brings in.",
                currency_opt(s.cac),
                currency_opt(s.aov)
            )
        },
    },
    Rule {
        applies: |s, _| s.cac.is_some() && s.aov.is_some(),
        status: StepStatus::Pass,
        finding: |s, _| {
            format!(
                "CAC {} is below AOV {}.",
                currency_opt(s.cac),
                currency_opt(s.aov)
            )
        },
    },
    Rule {
        applies: |_, _| true,
        status: StepStatus::Pass,
        finding: |s, _| {
            format!(
                "{} of spend produced {} orders; CAC and AOV are not both known.",
                currency(s.spend),
                count(s.orders)
            )
        },
    },
];

fn spend_orders_step(week: &DerivedWeek, prior: Option<&DerivedWeek>, t: &Thresholds) -> FunnelStep {
    let r = &week.record;
    let (Some(spend), Some(orders)) = (r.ad_spend, r.count_actual) else {
        return no_data(1, SPEND_ORDERS, DataSource::Primary, "Ad spend or new-customer count missing for this week.");
    };

    let change = prior.and_then(|p| match (p.record.ad_spend, p.record.count_actual) {
        (Some(prev_spend), Some(prev_orders)) => {
            Some((pct_change(spend, prev_spend)?, pct_change(orders, prev_orders)?))
        }
        _ => None,
    });

    let input = SpendOrders {
        spend,
        orders,
        change,
        cac: r.cac_actual,
        aov: r.aov_actual,
    };
    let (status, finding) = first_match(SPEND_ORDER_RULES, &input, t);

    FunnelStep {
        step: 1,
        title: SPEND_ORDERS,
        status,
        finding,
        source: DataSource::Primary,
        caution: change.is_none().then(|| {
            "No comparable prior week: static CAC vs AOV check only.".to_string()
        }),
    }
}

// ─── Step 2: Attention ──────────────────────────────────────────────────────

const CPM_RULES: &[Rule<f64>] = &[
    Rule {
        applies: |v, t| *v > t.cpm_warning,
        status: StepStatus::Warning,
        finding: |v, t| format!("CPM {} is elevated (above {})", currency(*v), currency(t.cpm_warning)),
    },
    Rule {
        applies: |_, _| true,
        status: StepStatus::Pass,
        finding: |v, _| format!("CPM {} is healthy", currency(*v)),
    },
];

const CTR_RULES: &[Rule<f64>] = &[
    Rule {
        applies: |v, t| *v < t.ctr_fail,
        status: StepStatus::Fail,
        finding: |v, t| format!("CTR {}% is weak (below {}%): the creative is not stopping the scroll", ratio(*v), ratio(t.ctr_fail)),
    },
    Rule {
        applies: |v, t| *v < t.ctr_warning,
        status: StepStatus::Warning,
        finding: |v, t| format!("CTR {}% is soft (below {}%)", ratio(*v), ratio(t.ctr_warning)),
    },
    Rule {
        applies: |_, _| true,
        status: StepStatus::Pass,
        finding: |v, _| format!("CTR {}% is healthy", ratio(*v)),
    },
];

const FREQUENCY_RULES: &[Rule<f64>] = &[
    Rule {
        applies: |v, t| *v > t.frequency_fail,
        status: StepStatus::Fail,
        finding: |v, t| format!("Frequency {} is saturated (above {}): the audience is fatigued", ratio(*v), ratio(t.frequency_fail)),
    },
    Rule {
        applies: |v, t| *v > t.frequency_warning,
        status: StepStatus::Warning,
        finding: |v, t| format!("Frequency {} is elevated (above {})", ratio(*v), ratio(t.frequency_warning)),
    },
    Rule {
        applies: |_, _| true,
        status: StepStatus::Pass,
        finding: |v, _| format!("Frequency {} is healthy", ratio(*v)),
    },
];

fn attention_step(week: &DerivedWeek, t: &Thresholds) -> FunnelStep {
    let r = &week.record;
    let metrics: [(Option<f64>, &[Rule<f64>]); 3] = [
        (r.cpm, CPM_RULES),
        (r.ctr, CTR_RULES),
        (r.frequency, FREQUENCY_RULES),
    ];

    let evaluated: Vec<(StepStatus, String)> = metrics
        .iter()
        .filter_map(|(value, rules)| value.map(|v| first_match(rules, &v, t)))
        .collect();
    if evaluated.is_empty() {
        return no_data(2, ATTENTION, DataSource::Secondary, "CPM, CTR and frequency all missing.");
    }

    let status = evaluated
        .iter()
        .fold(StepStatus::NoData, |worst, (s, _)| worst.worst(*s));
    let finding = evaluated
        .into_iter()
        .map(|(_, f)| f)
        .collect::<Vec<_>>()
        .join("; ")
        + ".";

    FunnelStep {
        step: 2,
        title: ATTENTION,
        status,
        finding,
        source: DataSource::Secondary,
        caution: Some(DIRECTIONAL_CAUTION.to_string()),
    }
}

// ─── Step 3: Click → Session ────────────────────────────────────────────────

struct ClickSession {
    clicks: f64,
    sessions: f64,
    ratio: f64,
}

impl ClickSession {
    /// Share of paid clicks that never became a session.
    fn lost_pct(&self) -> f64 {
        (1.0 - 1.0 / self.ratio) * 100.0
    }
}

const CLICK_SESSION_RULES: &[Rule<ClickSession>] = &[
    Rule {
        applies: |c, t| c.ratio > t.click_session_fail,
        status: StepStatus::Fail,
        finding: |c, _| {
            format!(
                "Major click leakage: {} Meta clicks produced {} sessions (ratio {}); about {} of paid clicks never load the store.",
                count(c.clicks),
                count(c.sessions),
                ratio(c.ratio),
                percent(c.lost_pct())
            )
        },
    },
    Rule {
        applies: |c, t| c.ratio > t.click_session_warning,
        status: StepStatus::Warning,
        finding: |c, _| {
            format!(
                "Moderate click loss: {} Meta clicks produced {} sessions (ratio {}).",
                count(c.clicks),
                count(c.sessions),
                ratio(c.ratio)
            )
        },
    },
    Rule {
        applies: |_, _| true,
        status: StepStatus::Pass,
        finding: |c, _| {
            format!(
                "Clicks and sessions reconcile: {} clicks, {} sessions (ratio {}).",
                count(c.clicks),
                count(c.sessions),
                ratio(c.ratio)
            )
        },
    },
];

fn click_session_step(week: &DerivedWeek, t: &Thresholds) -> FunnelStep {
    let r = &week.record;
    let (Some(clicks), Some(sessions)) = (r.meta_clicks, r.shopify_sessions) else {
        return no_data(3, CLICK_SESSION, DataSource::Secondary, "Meta clicks or store sessions missing.");
    };
    let Some(click_ratio) = week.click_session_ratio else {
        return no_data(3, CLICK_SESSION, DataSource::Secondary, "Store sessions are zero; the click/session ratio is undefined.");
    };

    let input = ClickSession { clicks, sessions, ratio: click_ratio };
    let (status, finding) = first_match(CLICK_SESSION_RULES, &input, t);

    FunnelStep {
        step: 3,
        title: CLICK_SESSION,
        status,
        finding,
        source: DataSource::Secondary,
        caution: Some("Clicks and sessions are counted by different systems; small gaps are normal.".to_string()),
    }
}

// ─── Step 4: Conversion ─────────────────────────────────────────────────────

const CVR_RULES: &[Rule<f64>] = &[
    Rule {
        applies: |v, t| *v < t.cvr_fail,
        status: StepStatus::Fail,
        finding: |v, t| format!("CVR {}% is below {}%: the site is not converting paid traffic", ratio(*v), ratio(t.cvr_fail)),
    },
    Rule {
        applies: |v, t| *v < t.cvr_warning,
        status: StepStatus::Warning,
        finding: |v, t| format!("CVR {}% is soft (below {}%)", ratio(*v), ratio(t.cvr_warning)),
    },
    Rule {
        applies: |_, _| true,
        status: StepStatus::Pass,
        finding: |v, _| format!("CVR {}% is healthy", ratio(*v)),
    },
];

fn conversion_step(week: &DerivedWeek, prior: Option<&DerivedWeek>, t: &Thresholds) -> FunnelStep {
    let Some(cvr) = week.record.cvr else {
        return no_data(4, CONVERSION, DataSource::Secondary, "Conversion rate missing.");
    };

    let (status, mut finding) = first_match(CVR_RULES, &cvr, t);
    match prior.and_then(|p| p.record.cvr) {
        Some(prev) => finding.push_str(&format!(" ({} vs prior week).", points(cvr - prev))),
        None => finding.push('.'),
    }

    FunnelStep {
        step: 4,
        title: CONVERSION,
        status,
        finding,
        source: DataSource::Secondary,
        caution: Some(DIRECTIONAL_CAUTION.to_string()),
    }
}

// ─── Step 5: New Customers ──────────────────────────────────────────────────

struct NewCustomers {
    actual: f64,
    forecast: f64,
    pva: f64,
}

fn new_customer_summary(n: &NewCustomers) -> String {
    format!(
        "{} new customers against a plan of {} ({})",
        count(n.actual),
        count(n.forecast),
        percent(n.pva)
    )
}

const NEW_CUSTOMER_RULES: &[Rule<NewCustomers>] = &[
    Rule {
        applies: |n, t| n.pva >= t.count_pass_pva,
        status: StepStatus::Pass,
        finding: |n, _| format!("{}: volume is on track.", new_customer_summary(n)),
    },
    Rule {
        applies: |n, t| n.pva >= t.count_warning_pva,
        status: StepStatus::Warning,
        finding: |n, _| format!("{}: volume is under plan.", new_customer_summary(n)),
    },
    Rule {
        applies: |_, _| true,
        status: StepStatus::Fail,
        finding: |n, _| format!("{}: acquisition volume has collapsed.", new_customer_summary(n)),
    },
];

fn new_customer_step(week: &DerivedWeek, t: &Thresholds) -> FunnelStep {
    let r = &week.record;
    let (Some(actual), Some(forecast)) = (r.count_actual, r.count_forecast) else {
        return no_data(5, NEW_CUSTOMERS, DataSource::Primary, "New-customer actual or forecast missing.");
    };
    let Some(pva) = week.count_pva else {
        return no_data(5, NEW_CUSTOMERS, DataSource::Primary, "New-customer forecast is zero; volume is not comparable to plan.");
    };

    let (status, finding) = first_match(NEW_CUSTOMER_RULES, &NewCustomers { actual, forecast, pva }, t);

    FunnelStep {
        step: 5,
        title: NEW_CUSTOMERS,
        status,
        finding,
        source: DataSource::Primary,
        caution: None,
    }
}

// ─── Step 6: Cash & CM Leak ─────────────────────────────────────────────────

struct CashLeak {
    unit_cm: f64,
    aov: f64,
    cac: f64,
    aov_plan: Option<f64>,
    cac_plan: Option<f64>,
    leak: Option<BiggestLeak>,
}

fn plan_gap(actual: f64, plan: Option<f64>) -> String {
    match plan {
        Some(p) => {
            let gap = actual - p;
            let sign = if gap > 0.0 { "+" } else { "" };
            format!("{} vs plan {} ({}{})", currency(actual), currency(p), sign, currency(gap))
        }
        None => format!("{} (no plan)", currency(actual)),
    }
}

fn leak_summary(c: &CashLeak) -> String {
    let gaps = format!("AOV {}; CAC {}", plan_gap(c.aov, c.aov_plan), plan_gap(c.cac, c.cac_plan));
    match &c.leak {
        Some(leak) => format!(
            "{}. Biggest leak: {} of {} per customer, {} this week.",
            gaps,
            leak.kind.label(),
            currency(leak.per_customer),
            currency(leak.per_week)
        ),
        None => format!("{}. No dollar leak against plan.", gaps),
    }
}

const CASH_LEAK_RULES: &[Rule<CashLeak>] = &[
    Rule {
        applies: |c, _| c.unit_cm >= 0.0,
        status: StepStatus::Pass,
        finding: |c, _| format!("Unit CM {} per new customer is positive. {}", currency(c.unit_cm), leak_summary(c)),
    },
    Rule {
        applies: |c, t| c.unit_cm > t.unit_cm_fail,
        status: StepStatus::Warning,
        finding: |c, _| format!("Unit CM {} per new customer is a contained loss. {}", currency(c.unit_cm), leak_summary(c)),
    },
    Rule {
        applies: |_, _| true,
        status: StepStatus::Fail,
        finding: |c, _| format!("Unit CM {} per new customer is a deep loss. {}", currency(c.unit_cm), leak_summary(c)),
    },
];

fn cash_leak_step(week: &DerivedWeek, t: &Thresholds) -> FunnelStep {
    let r = &week.record;
    let (Some(aov), Some(cac), Some(_cm)) = (r.aov_actual, r.cac_actual, r.cm_actual) else {
        return no_data(6, CASH_LEAK, DataSource::Primary, "AOV, CAC or contribution margin missing.");
    };
    let Some(unit_cm) = week.unit_cm_actual else {
        return no_data(6, CASH_LEAK, DataSource::Primary, "No new customers recorded; unit CM is undefined.");
    };

    let input = CashLeak {
        unit_cm,
        aov,
        cac,
        aov_plan: r.aov_forecast,
        cac_plan: r.cac_forecast,
        leak: biggest_leak(week),
    };
    let (status, finding) = first_match(CASH_LEAK_RULES, &input, t);

    FunnelStep {
        step: 6,
        title: CASH_LEAK,
        status,
        finding,
        source: DataSource::Primary,
        caution: None,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
