// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Growth Governor - Type Definitions

use serde::{Deserialize, Serialize};

// ─── Week Record ────────────────────────────────────────────────────────────

/// One calendar week of inputs. `None` means "not yet known", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeekRecord {
    pub label: Option<String>,
    pub index: Option<u32>,

    // Primary (single source of truth, read-only to diagnostics)
    pub ad_spend: Option<f64>,
    pub cm_forecast: Option<f64>,
    pub cm_actual: Option<f64>,
    pub count_forecast: Option<f64>,
    pub count_actual: Option<f64>,
    pub aov_forecast: Option<f64>,
    pub aov_actual: Option<f64>,
    pub cac_forecast: Option<f64>,
    pub cac_actual: Option<f64>,

    // Secondary (directional, editable post-hoc)
    pub cpm: Option<f64>,
    pub ctr: Option<f64>,
    pub cpc: Option<f64>,
    pub frequency: Option<f64>,
    pub meta_clicks: Option<f64>,
    pub shopify_sessions: Option<f64>,
    pub cvr: Option<f64>,
}

impl WeekRecord {
    /// A week counts as observed once spend, CM or new-customer count is known.
    pub fn has_data(&self) -> bool {
        self.ad_spend.is_some() || self.cm_actual.is_some() || self.count_actual.is_some()
    }

    pub fn display_label(&self) -> String {
        match (&self.label, self.index) {
            (Some(label), _) => label.clone(),
            (None, Some(i)) => format!("Week {}", i + 1),
            (None, None) => "Unlabelled week".to_string(),
        }
    }
}

// ─── Derived Week ───────────────────────────────────────────────────────────

/// A `WeekRecord` plus its computed ratios. Never stored; rebuilt on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedWeek {
    #[serde(flatten)]
    pub record: WeekRecord,
    pub cm_pva: Option<f64>,
    pub count_pva: Option<f64>,
    pub aov_pva: Option<f64>,
    pub cac_pva: Option<f64>,
    pub unit_cm_actual: Option<f64>,
    pub unit_cm_forecast: Option<f64>,
    pub cac_aov_gap: Option<f64>,
    pub click_session_ratio: Option<f64>,
}

// ─── Verdict ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    CmProblem,
    VolumeProblem,
    Both,
    Neither,
}

impl Verdict {
    /// Both wins over either single signal.
    pub fn from_signals(cm_problem: bool, volume_problem: bool) -> Self {
        match (cm_problem, volume_problem) {
            (true, true) => Self::Both,
            (true, false) => Self::CmProblem,
            (false, true) => Self::VolumeProblem,
            (false, false) => Self::Neither,
        }
    }

    pub fn has_cm_problem(&self) -> bool {
        matches!(self, Self::CmProblem | Self::Both)
    }

    pub fn has_volume_problem(&self) -> bool {
        matches!(self, Self::VolumeProblem | Self::Both)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CmProblem => "CM PROBLEM",
            Self::VolumeProblem => "VOLUME PROBLEM",
            Self::Both => "CM + VOLUME PROBLEM",
            Self::Neither => "NO PROBLEM FLAGGED",
        }
    }
}

// ─── Scale Permission ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScalePermission {
    Denied,
    LeakHuntOnly,
    Allowed,
}

impl ScalePermission {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Denied => "SCALE DENIED",
            Self::LeakHuntOnly => "LEAK HUNT ONLY",
            Self::Allowed => "SCALE ALLOWED",
        }
    }
}

// ─── Biggest Leak ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LeakKind {
    CacOverspend,
    AovShortfall,
}

impl LeakKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CacOverspend => "CAC overspend",
            Self::AovShortfall => "AOV shortfall",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiggestLeak {
    pub kind: LeakKind,
    pub per_customer: f64,
    pub per_week: f64,
}

// ─── Mirage ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MirageCheck {
    pub detected: bool,
    pub explanation: Option<String>,
    /// Total CM had forecast volume been delivered at the actual unit CM.
    pub cm_at_forecast_volume: Option<f64>,
}

// ─── GovernorResult ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernorResult {
    pub verdict: Verdict,
    pub cm_problem: bool,
    pub volume_problem: bool,
    /// Mean countPva over the trailing window; `None` when nothing was comparable.
    pub volume_signal: Option<f64>,
    pub scale_permission: ScalePermission,
    pub scale_reason: String,
    pub warnings: Vec<String>,
    pub mirage: MirageCheck,
    pub biggest_leak: Option<BiggestLeak>,
    /// Position of the anchor week within `weeks`.
    pub anchor_index: usize,
    pub anchor: DerivedWeek,
    /// The week-with-data immediately before the anchor.
    pub prior: Option<DerivedWeek>,
    pub weeks: Vec<DerivedWeek>,
}

// ─── Funnel Steps ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pass,
    Fail,
    Warning,
    NoData,
}

impl StepStatus {
    /// Ordering used when several metrics feed one step: higher is worse.
    pub fn severity(&self) -> u8 {
        match self {
            Self::NoData => 0,
            Self::Pass => 1,
            Self::Warning => 2,
            Self::Fail => 3,
        }
    }

    pub fn worst(self, other: Self) -> Self {
        if other.severity() > self.severity() { other } else { self }
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, Self::Fail | Self::Warning)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Warning => "WARNING",
            Self::NoData => "NO DATA",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Store/finance sheet: the source of truth.
    Primary,
    /// Ad-platform or analytics numbers: directional only.
    Secondary,
}

impl DataSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStep {
    pub step: u8,
    pub title: &'static str,
    pub status: StepStatus,
    pub finding: String,
    pub source: DataSource,
    pub caution: Option<String>,
}

// ─── Diagnostician Output ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedScope {
    pub permission: ScalePermission,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RcaKind {
    CollectData,
    HealthyFunnel,
    Breakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RcaSummary {
    pub kind: RcaKind,
    pub primary_step: Option<u8>,
    pub headline: String,
    pub action: String,
    pub root_cause: String,
    pub discussion: String,
    pub remedy: String,
    pub anti_pattern: Option<String>,
    /// Present when more than one funnel checkpoint is unhealthy.
    pub other_issues: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticianResult {
    pub scope: AllowedScope,
    pub steps: Vec<FunnelStep>,
    pub rca: RcaSummary,
}
