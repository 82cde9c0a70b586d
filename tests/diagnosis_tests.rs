#[cfg(test)]
mod tests {
    use growth_governor::ingest::parse_week_table_str;
    use growth_governor::overrides::{SecondaryMetrics, SecondaryOverrides};
    use growth_governor::*;

    fn week(label: &str) -> WeekRecord {
        WeekRecord {
            label: Some(label.to_string()),
            ad_spend: Some(1000.0),
            cm_forecast: Some(400.0),
            cm_actual: Some(420.0),
            count_forecast: Some(20.0),
            count_actual: Some(20.0),
            aov_forecast: Some(110.0),
            aov_actual: Some(115.0),
            cac_forecast: Some(55.0),
            cac_actual: Some(50.0),
            cpm: Some(22.0),
            ctr: Some(1.8),
            frequency: Some(1.6),
            meta_clicks: Some(1100.0),
            shopify_sessions: Some(1000.0),
            cvr: Some(3.0),
            ..Default::default()
        }
    }

    // ========== Derived Metrics ==========

    #[test]
    fn test_plan_vs_actual_definition() {
        for (actual, forecast) in [(0.0, 5.0), (-3.0, 4.0), (7.5, -2.5), (12.0, 0.1)] {
            assert_eq!(
                plan_vs_actual(Some(actual), Some(forecast)),
                Some(100.0 * actual / forecast)
            );
        }
        assert_eq!(plan_vs_actual(Some(12.0), Some(0.0)), None);
        assert_eq!(plan_vs_actual(Some(12.0), None), None);
    }

    // ========== Spec Scenarios ==========

    #[test]
    fn test_scenario_a_both_denied() {
        let weeks = vec![WeekRecord {
            ad_spend: Some(100.0),
            cm_actual: Some(-50.0),
            cm_forecast: Some(-10.0),
            count_actual: Some(10.0),
            count_forecast: Some(20.0),
            aov_actual: Some(50.0),
            aov_forecast: Some(80.0),
            cac_actual: Some(90.0),
            cac_forecast: Some(70.0),
            ..Default::default()
        }];
        let out = evaluate_economics(&weeks).unwrap();
        assert_eq!(out.anchor.unit_cm_actual, Some(-5.0));
        assert_eq!(out.anchor.count_pva, Some(50.0));
        assert_eq!(out.verdict, Verdict::Both);
        assert_eq!(out.scale_permission, ScalePermission::Denied);

        let funnel = evaluate_funnel(&out);
        assert_eq!(funnel.scope.permission, ScalePermission::LeakHuntOnly);
        assert_eq!(funnel.rca.kind, RcaKind::CollectData);
    }

    #[test]
    fn test_scenario_b_cac_above_aov_denies_scale() {
        let mut w = week("W1");
        w.cac_actual = Some(120.0);
        w.aov_actual = Some(100.0);
        w.cm_actual = Some(100.0); // unit CM 5
        w.cm_forecast = Some(40.0); // unit CM 2
        let out = evaluate_economics(&[w]).unwrap();
        assert!(out.cm_problem);
        assert_eq!(out.verdict, Verdict::CmProblem);
        assert_eq!(out.scale_permission, ScalePermission::Denied);
    }

    #[test]
    fn test_scenario_c_and_d_funnel_steps() {
        let mut w = week("W1");
        w.cpm = Some(35.0);
        w.ctr = Some(2.0);
        w.frequency = Some(1.5);
        w.meta_clicks = Some(1000.0);
        w.shopify_sessions = Some(500.0);
        let d = diagnose(&[w]).unwrap();

        let attention = &d.funnel.steps[1];
        assert_eq!(attention.step, 2);
        assert_eq!(attention.status, StepStatus::Warning);
        assert!(attention.finding.contains("elevated"));
        assert!(attention.finding.contains("CTR 2.00% is healthy"));
        assert!(attention.finding.contains("Frequency 1.50 is healthy"));

        let clicks = &d.funnel.steps[2];
        assert_eq!(clicks.status, StepStatus::Fail);
        assert!(clicks.finding.contains("Major click leakage"));

        // Failure at step 3 outranks the earlier warning at step 2.
        assert_eq!(d.funnel.rca.primary_step, Some(3));
        assert!(d.funnel.rca.other_issues.as_deref().unwrap_or("").contains("Step 2"));
    }

    #[test]
    fn test_scenario_e_no_primary_data() {
        let weeks = vec![
            WeekRecord { cpm: Some(30.0), cvr: Some(2.0), ..Default::default() },
            WeekRecord::default(),
        ];
        assert!(!has_weeks_with_data(&weeks));
        assert_eq!(diagnose(&weeks), Err(GovernorError::InsufficientData));
    }

    // ========== Pipeline Properties ==========

    #[test]
    fn test_idempotent_evaluation() {
        let weeks = vec![week("W1"), week("W2"), week("W3")];
        let first = diagnose(&weeks).unwrap();
        let second = diagnose(&weeks).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_anchor_is_last_week_with_data() {
        let mut weeks = vec![week("W1"), week("W2")];
        for i in 3..=8 {
            weeks.push(WeekRecord { label: Some(format!("W{}", i)), ..Default::default() });
        }
        let out = evaluate_economics(&weeks).unwrap();
        assert_eq!(out.anchor_index, 1);
        assert_eq!(out.anchor.record.label.as_deref(), Some("W2"));
        assert_eq!(out.prior.unwrap().record.label.as_deref(), Some("W1"));
    }

    #[test]
    fn test_verdict_priority_both() {
        let mut w = week("W1");
        w.cm_actual = Some(-200.0); // unit CM -20 with a positive plan
        w.count_actual = Some(10.0);
        let out = evaluate_economics(&[w]).unwrap();
        assert!(out.cm_problem && out.volume_problem);
        assert_eq!(out.verdict, Verdict::Both);
    }

    #[test]
    fn test_healthy_business() {
        let weeks = vec![week("W1"), week("W2")];
        let d = diagnose(&weeks).unwrap();
        assert_eq!(d.economics.verdict, Verdict::Neither);
        assert_eq!(d.economics.scale_permission, ScalePermission::Allowed);
        assert_eq!(d.economics.warnings.len(), 3);
        assert_eq!(d.funnel.steps.len(), 6);
        for (i, step) in d.funnel.steps.iter().enumerate() {
            assert_eq!(step.step as usize, i + 1);
            assert_eq!(step.status, StepStatus::Pass, "step {} not passing: {}", step.step, step.finding);
        }
        assert_eq!(d.funnel.rca.kind, RcaKind::HealthyFunnel);
    }

    #[test]
    fn test_custom_thresholds_change_outcome() {
        let mut w = week("W1");
        w.cpm = Some(35.0);
        let strict = diagnose(&[w.clone()]).unwrap();
        assert_eq!(strict.funnel.steps[1].status, StepStatus::Warning);

        let relaxed = Thresholds { cpm_warning: 40.0, ..Thresholds::default() };
        let d = diagnose_with(&[w], &relaxed).unwrap();
        assert_eq!(d.funnel.steps[1].status, StepStatus::Pass);
    }

    // ========== Ingest + Overrides ==========

    #[test]
    fn test_csv_to_diagnosis_with_overrides() {
        let csv = "\
Week,Ad Spend,CM Forecast,CM Actual,New Customers Forecast,New Customers Actual,AOV Forecast,AOV Actual,CAC Forecast,CAC Actual,Meta Clicks,Sessions
W1,$1000,$400,$420,20,20,$110,$115,$55,$50,1100,1000
W2,$1300,$400,$380,20,20,$110,$112,$55,$65,1200,1050
W3,,,,,,,,,,,
";
        let weeks = parse_week_table_str(csv).unwrap();
        let before = diagnose(&weeks).unwrap();
        assert_eq!(before.economics.anchor.record.label.as_deref(), Some("W2"));
        // +30% spend with flat orders
        assert_eq!(before.funnel.steps[0].status, StepStatus::Fail);
        assert_eq!(before.funnel.steps[3].status, StepStatus::NoData);

        let mut overrides = SecondaryOverrides::new();
        overrides.set("W2", SecondaryMetrics { cvr: Some(1.2), ..Default::default() });
        let json = overrides.to_json().unwrap();
        let merged = SecondaryOverrides::from_json(&json).unwrap().apply(&weeks);

        let after = diagnose(&merged).unwrap();
        // Secondary edits never move the economic verdict.
        assert_eq!(after.economics.verdict, before.economics.verdict);
        assert_eq!(after.economics.scale_reason, before.economics.scale_reason);
        assert_eq!(after.economics.anchor.record.cac_actual, Some(65.0));
        assert_eq!(after.funnel.steps[3].status, StepStatus::Fail);
        assert_eq!(after.funnel.rca.primary_step, Some(4));
    }
}
