// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Growth Governor - Plain-Text Report

use std::fmt::Write;

use crate::money::{currency, currency_opt, percent_opt};
use crate::pipeline::Diagnosis;
use crate::types::FunnelStep;

fn write_step(output: &mut String, step: &FunnelStep) {
    let _ = writeln!(
        output,
        "  {}. {:<28} [{}] ({})",
        step.step,
        step.title,
        step.status.label(),
        step.source.label()
    );
    let _ = writeln!(output, "     {}", step.finding);
    if let Some(caution) = &step.caution {
        let _ = writeln!(output, "     caution: {}", caution);
    }
}

pub fn render_text(diagnosis: &Diagnosis) -> String {
    let econ = &diagnosis.economics;
    let funnel = &diagnosis.funnel;
    let anchor = &econ.anchor;
    let mut output = String::new();

    let _ = writeln!(output, "# Growth Governor Diagnosis");
    let _ = writeln!(
        output,
        "Anchor week: {} ({} of {} weeks)",
        anchor.record.display_label(),
        econ.anchor_index + 1,
        econ.weeks.len()
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Economic Verdict");
    let _ = writeln!(output, "Verdict:    {}", econ.verdict.label());
    let _ = writeln!(output, "Permission: {}", econ.scale_permission.label());
    let _ = writeln!(output, "Reason:     {}", econ.scale_reason);
    let _ = writeln!(
        output,
        "Unit CM:    {} actual vs {} plan | CM {} of plan | volume {} of plan (trailing)",
        currency_opt(anchor.unit_cm_actual),
        currency_opt(anchor.unit_cm_forecast),
        percent_opt(anchor.cm_pva),
        percent_opt(econ.volume_signal),
    );
    match &econ.biggest_leak {
        Some(leak) => {
            let _ = writeln!(
                output,
                "Biggest leak: {} of {} per customer ({} this week)",
                leak.kind.label(),
                currency(leak.per_customer),
                currency(leak.per_week)
            );
        }
        None => {
            let _ = writeln!(output, "Biggest leak: none against plan");
        }
    }
    if let Some(explanation) = &econ.mirage.explanation {
        let _ = writeln!(output, "MIRAGE: {}", explanation);
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Attribution Caveats");
    for warning in &econ.warnings {
        let _ = writeln!(output, "- {}", warning);
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Funnel Diagnosis");
    let _ = writeln!(output, "Scope: {}", funnel.scope.description);
    for step in &funnel.steps {
        write_step(&mut output, step);
    }
    let _ = writeln!(output);

    let rca = &funnel.rca;
    let _ = writeln!(output, "## Root Cause: {}", rca.headline);
    let _ = writeln!(output, "Action:     {}", rca.action);
    let _ = writeln!(output, "Root cause: {}", rca.root_cause);
    let _ = writeln!(output, "Discussion: {}", rca.discussion);
    let _ = writeln!(output, "Remedy:     {}", rca.remedy);
    if let Some(anti) = &rca.anti_pattern {
        let _ = writeln!(output, "Avoid:      {}", anti);
    }
    if let Some(others) = &rca.other_issues {
        let _ = writeln!(output, "Note:       {}", others);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::diagnose;
    use crate::types::WeekRecord;

    #[test]
    fn report_contains_every_section() {
        let week = WeekRecord {
            label: Some("Mar 3".into()),
            ad_spend: Some(100.0),
            cm_actual: Some(-50.0),
            cm_forecast: Some(-10.0),
            count_actual: Some(10.0),
            count_forecast: Some(20.0),
            aov_actual: Some(50.0),
            aov_forecast: Some(80.0),
            cac_actual: Some(90.0),
            cac_forecast: Some(70.0),
            meta_clicks: Some(1000.0),
            shopify_sessions: Some(500.0),
            ..Default::default()
        };
        let text = render_text(&diagnose(&[week]).unwrap());
        assert!(text.contains("Anchor week: Mar 3 (1 of 1 weeks)"));
        assert!(text.contains("CM + VOLUME PROBLEM"));
        assert!(text.contains("SCALE DENIED"));
        assert!(text.contains("AOV shortfall of $30.00 per customer ($300.00 this week)"));
        assert!(text.contains("## Attribution Caveats"));
        assert!(text.contains("Major click leakage"));
        assert!(text.contains("## Root Cause: Clicks are not reaching the store (FAIL)"));
    }
}
