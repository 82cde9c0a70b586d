// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Growth Governor - Unit-economics and funnel diagnosis engine

pub mod types;
pub mod calculator;
pub mod thresholds;
pub mod money;
pub mod governor;
pub mod funnel;
pub mod rca;
pub mod pipeline;

// I/O collaborators around the engine
pub mod ingest;
pub mod overrides;
pub mod report;

pub use types::*;
pub use calculator::{derive_weeks, plan_vs_actual};
pub use governor::{evaluate_economics, evaluate_economics_with, has_weeks_with_data, GovernorError};
pub use funnel::{evaluate_funnel, evaluate_funnel_with};
pub use pipeline::{diagnose, diagnose_with, Diagnosis};
pub use thresholds::Thresholds;

use serde::Serialize;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

fn console_warn(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    log(msg);
    tracing::warn!("{}", msg);
}

fn install_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// Results go out as plain JS objects. The default serializer turns
/// flattened structs (`DerivedWeek`) into `Map`s, which hides every field
/// from property access on the JS side.
fn to_js<T: Serialize>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

/// Precondition check for the UI: false means "insufficient data".
#[wasm_bindgen(js_name = hasWeeksWithData)]
pub fn has_weeks_with_data_js(weeks: JsValue) -> bool {
    serde_wasm_bindgen::from_value::<Vec<WeekRecord>>(weeks)
        .map(|w| has_weeks_with_data(&w))
        .unwrap_or(false)
}

/// Run the full diagnosis with default thresholds. Returns `null` when the
/// input is malformed or no week has data.
#[wasm_bindgen]
pub fn evaluate(weeks: JsValue) -> JsValue {
    evaluate_with_thresholds(weeks, JsValue::UNDEFINED)
}

#[wasm_bindgen(js_name = evaluateWith)]
pub fn evaluate_with_thresholds(weeks: JsValue, thresholds: JsValue) -> JsValue {
    install_panic_hook();

    let weeks: Vec<WeekRecord> = match serde_wasm_bindgen::from_value(weeks) {
        Ok(w) => w,
        Err(e) => {
            console_warn(&format!("invalid week records: {}", e));
            return JsValue::NULL;
        }
    };
    let thresholds: Thresholds = if thresholds.is_undefined() || thresholds.is_null() {
        Thresholds::default()
    } else {
        match serde_wasm_bindgen::from_value(thresholds) {
            Ok(t) => t,
            Err(e) => {
                console_warn(&format!("invalid thresholds, using defaults: {}", e));
                Thresholds::default()
            }
        }
    };

    match diagnose_with(&weeks, &thresholds) {
        Ok(diagnosis) => to_js(&diagnosis),
        Err(e) => {
            console_warn(&e.to_string());
            JsValue::NULL
        }
    }
}

#[wasm_bindgen(js_name = parseTable)]
pub fn parse_table(csv: &str) -> JsValue {
    install_panic_hook();
    match ingest::parse_week_table_str(csv) {
        Ok(weeks) => to_js(&weeks),
        Err(e) => {
            console_warn(&e.to_string());
            JsValue::NULL
        }
    }
}

/// Layer the cached secondary inputs (a localStorage JSON string) onto weeks.
#[wasm_bindgen(js_name = applyOverrides)]
pub fn apply_overrides(weeks: JsValue, overrides_json: &str) -> JsValue {
    install_panic_hook();
    let weeks: Vec<WeekRecord> = match serde_wasm_bindgen::from_value(weeks) {
        Ok(w) => w,
        Err(e) => {
            console_warn(&format!("invalid week records: {}", e));
            return JsValue::NULL;
        }
    };
    match overrides::SecondaryOverrides::from_json(overrides_json) {
        Ok(o) => to_js(&o.apply(&weeks)),
        Err(e) => {
            console_warn(&e.to_string());
            JsValue::NULL
        }
    }
}
