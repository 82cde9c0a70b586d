// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Growth Governor - Diagnostic Thresholds

//! Every numeric cut-off used by the governor and the funnel checkpoints.
//!
//! The defaults are the production calibration. Callers may override any
//! subset through JSON; missing keys keep their default.

use serde::{Deserialize, Serialize};

/// Weeks-with-data averaged for the volume signal.
pub const VOLUME_WINDOW: usize = 3;
/// Mean countPva below this is a volume problem.
pub const VOLUME_PROBLEM_PVA: f64 = 70.0;
/// A planned loss per customer may run this many times deeper before it is a problem.
pub const CM_LOSS_MULTIPLIER: f64 = 2.0;

pub const MIRAGE_CM_PVA: f64 = 95.0;
pub const MIRAGE_COUNT_PVA: f64 = 50.0;

pub const SPEND_ORDER_GAP_POINTS: f64 = 15.0;

pub const CPM_WARNING: f64 = 30.0;
pub const CTR_FAIL: f64 = 1.0;
pub const CTR_WARNING: f64 = 1.5;
pub const FREQUENCY_FAIL: f64 = 3.0;
pub const FREQUENCY_WARNING: f64 = 2.0;

pub const CLICK_SESSION_FAIL: f64 = 1.5;
pub const CLICK_SESSION_WARNING: f64 = 1.2;

pub const CVR_FAIL: f64 = 1.5;
pub const CVR_WARNING: f64 = 2.5;

pub const COUNT_PASS_PVA: f64 = 85.0;
pub const COUNT_WARNING_PVA: f64 = 50.0;

/// Unit CM above this (but negative) is a warning rather than a fail.
pub const UNIT_CM_FAIL: f64 = -50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Thresholds {
    pub volume_window: usize,
    pub volume_problem_pva: f64,
    pub cm_loss_multiplier: f64,
    pub mirage_cm_pva: f64,
    pub mirage_count_pva: f64,
    pub spend_order_gap_points: f64,
    pub cpm_warning: f64,
    pub ctr_fail: f64,
    pub ctr_warning: f64,
    pub frequency_fail: f64,
    pub frequency_warning: f64,
    pub click_session_fail: f64,
    pub click_session_warning: f64,
    pub cvr_fail: f64,
    pub cvr_warning: f64,
    pub count_pass_pva: f64,
    pub count_warning_pva: f64,
    pub unit_cm_fail: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            volume_window: VOLUME_WINDOW,
            volume_problem_pva: VOLUME_PROBLEM_PVA,
            cm_loss_multiplier: CM_LOSS_MULTIPLIER,
            mirage_cm_pva: MIRAGE_CM_PVA,
            mirage_count_pva: MIRAGE_COUNT_PVA,
            spend_order_gap_points: SPEND_ORDER_GAP_POINTS,
            cpm_warning: CPM_WARNING,
            ctr_fail: CTR_FAIL,
            ctr_warning: CTR_WARNING,
            frequency_fail: FREQUENCY_FAIL,
            frequency_warning: FREQUENCY_WARNING,
            click_session_fail: CLICK_SESSION_FAIL,
            click_session_warning: CLICK_SESSION_WARNING,
            cvr_fail: CVR_FAIL,
            cvr_warning: CVR_WARNING,
            count_pass_pva: COUNT_PASS_PVA,
            count_warning_pva: COUNT_WARNING_PVA,
            unit_cm_fail: UNIT_CM_FAIL,
        }
    }
}

impl Thresholds {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let t = Thresholds::from_json(r#"{ "cpmWarning": 40.0, "volumeWindow": 4 }"#).unwrap();
        assert_eq!(t.cpm_warning, 40.0);
        assert_eq!(t.volume_window, 4);
        assert_eq!(t.ctr_fail, CTR_FAIL);
        assert_eq!(t.unit_cm_fail, UNIT_CM_FAIL);
    }

    #[test]
    fn empty_json_is_default() {
        assert_eq!(Thresholds::from_json("{}").unwrap(), Thresholds::default());
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(Thresholds::from_json(r#"{ "cvrFail": "low" }"#).is_err());
    }
}
