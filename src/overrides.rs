// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Growth Governor - Secondary Input Overrides

//! Key-value cache of hand-entered secondary metrics, keyed by week label.
//!
//! Secondary numbers (CPM, CTR, sessions, ...) are often typed in after the
//! primary sheet has been exported. They live here, serialised as one JSON
//! object, and are layered onto the week records just before evaluation.
//! Primary fields are never touched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::WeekRecord;

#[derive(Debug, thiserror::Error)]
pub enum OverrideError {
    #[error("invalid overrides JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode overrides: {0}")]
    Encode(#[source] serde_json::Error),
}

/// The editable subset of a week.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SecondaryMetrics {
    pub cpm: Option<f64>,
    pub ctr: Option<f64>,
    pub cpc: Option<f64>,
    pub frequency: Option<f64>,
    pub meta_clicks: Option<f64>,
    pub shopify_sessions: Option<f64>,
    pub cvr: Option<f64>,
}

impl SecondaryMetrics {
    pub fn of(week: &WeekRecord) -> Self {
        Self {
            cpm: week.cpm,
            ctr: week.ctr,
            cpc: week.cpc,
            frequency: week.frequency,
            meta_clicks: week.meta_clicks,
            shopify_sessions: week.shopify_sessions,
            cvr: week.cvr,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Copy every present value onto `week`; absent values leave the week alone.
    fn overlay(&self, week: &mut WeekRecord) {
        let pairs = [
            (self.cpm, &mut week.cpm),
            (self.ctr, &mut week.ctr),
            (self.cpc, &mut week.cpc),
            (self.frequency, &mut week.frequency),
            (self.meta_clicks, &mut week.meta_clicks),
            (self.shopify_sessions, &mut week.shopify_sessions),
            (self.cvr, &mut week.cvr),
        ];
        for (value, slot) in pairs {
            if value.is_some() {
                *slot = value;
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecondaryOverrides {
    entries: BTreeMap<String, SecondaryMetrics>,
}

impl SecondaryOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, OverrideError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(OverrideError::Decode)
    }

    pub fn to_json(&self) -> Result<String, OverrideError> {
        serde_json::to_string(self).map_err(OverrideError::Encode)
    }

    /// Store metrics for a week; an empty entry removes the key.
    pub fn set(&mut self, label: impl Into<String>, metrics: SecondaryMetrics) {
        let label = label.into();
        if metrics.is_empty() {
            self.remove(&label);
        } else {
            self.entries.insert(label, metrics);
        }
    }

    pub fn get(&self, label: &str) -> Option<&SecondaryMetrics> {
        self.entries.get(label)
    }

    /// Drop a week's edits, returning what was stored.
    pub fn remove(&mut self, label: &str) -> Option<SecondaryMetrics> {
        self.entries.remove(label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// New week records with overrides layered on; the input is not modified.
    pub fn apply(&self, weeks: &[WeekRecord]) -> Vec<WeekRecord> {
        weeks
            .iter()
            .map(|week| {
                let mut merged = week.clone();
                if let Some(metrics) = self.entries.get(&week.display_label()) {
                    metrics.overlay(&mut merged);
                }
                merged
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week(label: &str) -> WeekRecord {
        WeekRecord {
            label: Some(label.to_string()),
            ad_spend: Some(1000.0),
            cm_actual: Some(200.0),
            cpm: Some(20.0),
            ctr: Some(1.8),
            ..Default::default()
        }
    }

    #[test]
    fn apply_overlays_only_present_secondary_values() {
        let mut overrides = SecondaryOverrides::new();
        overrides.set(
            "W2",
            SecondaryMetrics { cpm: Some(42.0), cvr: Some(2.2), ..Default::default() },
        );
        let weeks = vec![week("W1"), week("W2")];
        let merged = overrides.apply(&weeks);

        assert_eq!(merged[0], weeks[0]);
        assert_eq!(merged[1].cpm, Some(42.0));
        assert_eq!(merged[1].cvr, Some(2.2));
        assert_eq!(merged[1].ctr, Some(1.8));
        assert_eq!(merged[1].ad_spend, Some(1000.0));
        assert_eq!(merged[1].cm_actual, Some(200.0));
        // input untouched
        assert_eq!(weeks[1].cpm, Some(20.0));
    }

    #[test]
    fn json_roundtrip_is_a_plain_object() {
        let mut overrides = SecondaryOverrides::new();
        overrides.set(
            "W1",
            SecondaryMetrics { meta_clicks: Some(1000.0), shopify_sessions: Some(640.0), ..Default::default() },
        );
        let json = overrides.to_json().unwrap();
        assert!(json.starts_with('{'));
        assert_eq!(SecondaryOverrides::from_json(&json).unwrap(), overrides);
    }

    #[test]
    fn snapshot_of_week_restores_edits() {
        let original = week("W1");
        let mut overrides = SecondaryOverrides::new();
        overrides.set("W1", SecondaryMetrics::of(&original));

        let mut wiped = original.clone();
        wiped.cpm = None;
        wiped.ctr = None;
        assert_eq!(overrides.apply(&[wiped]), vec![original]);
    }

    #[test]
    fn empty_entry_removes_key() {
        let mut overrides = SecondaryOverrides::new();
        overrides.set("W1", SecondaryMetrics { cpm: Some(10.0), ..Default::default() });
        assert_eq!(overrides.len(), 1);
        overrides.set("W1", SecondaryMetrics::default());
        assert!(overrides.is_empty());
    }

    #[test]
    fn remove_returns_stored_edits() {
        let mut overrides = SecondaryOverrides::new();
        let metrics = SecondaryMetrics { ctr: Some(1.1), ..Default::default() };
        overrides.set("W1", metrics.clone());
        overrides.set("W2", SecondaryMetrics { cvr: Some(2.0), ..Default::default() });

        assert_eq!(overrides.remove("W1"), Some(metrics));
        assert_eq!(overrides.remove("W1"), None);
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides.apply(&[week("W1")])[0].ctr, Some(1.8));
    }

    #[test]
    fn decode_errors_and_blank_input() {
        assert!(matches!(
            SecondaryOverrides::from_json("{not json"),
            Err(OverrideError::Decode(_))
        ));
        assert!(SecondaryOverrides::from_json("  ").unwrap().is_empty());
        let parsed =
            SecondaryOverrides::from_json(r#"{"Week 1": {"metaClicks": 900, "shopifySessions": 800}}"#)
                .unwrap();
        assert_eq!(parsed.get("Week 1").unwrap().meta_clicks, Some(900.0));
    }

    #[test]
    fn unlabelled_weeks_key_by_position() {
        let mut overrides = SecondaryOverrides::new();
        overrides.set("Week 2", SecondaryMetrics { cvr: Some(3.0), ..Default::default() });
        let weeks = vec![
            WeekRecord { index: Some(0), ..Default::default() },
            WeekRecord { index: Some(1), ..Default::default() },
        ];
        let merged = overrides.apply(&weeks);
        assert_eq!(merged[0].cvr, None);
        assert_eq!(merged[1].cvr, Some(3.0));
    }
}
