// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Growth Governor - Week Table Ingest

//! Reads a CSV export of the weekly performance sheet into `WeekRecord`s.
//!
//! Headers are matched loosely (case, spacing and punctuation are ignored,
//! common aliases accepted) and cells tolerate the formatting a spreadsheet
//! export produces: currency symbols, thousands separators, percent signs,
//! accounting-style negatives and placeholder dashes.

use std::io;

use crate::types::WeekRecord;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read week table: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}, column '{column}': cannot parse '{value}' as a number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("week table has no recognised columns")]
    NoKnownColumns,

    #[error("week table has more than {} rows", u32::MAX)]
    TooManyRows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Label,
    AdSpend,
    CmForecast,
    CmActual,
    CountForecast,
    CountActual,
    AovForecast,
    AovActual,
    CacForecast,
    CacActual,
    Cpm,
    Ctr,
    Cpc,
    Frequency,
    MetaClicks,
    ShopifySessions,
    Cvr,
}

fn normalize(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn column_for(header: &str) -> Option<Column> {
    let column = match normalize(header).as_str() {
        "week" | "label" | "weeklabel" | "weekof" | "weekstarting" => Column::Label,
        "adspend" | "spend" | "metaspend" | "adspendactual" => Column::AdSpend,
        "cmforecast" | "cmplan" | "contributionmarginforecast" => Column::CmForecast,
        "cmactual" | "cm" | "contributionmarginactual" | "contributionmargin" => Column::CmActual,
        "countforecast" | "newcustomersforecast" | "newcustomerforecast" | "ncforecast" => {
            Column::CountForecast
        }
        "countactual" | "newcustomersactual" | "newcustomeractual" | "newcustomers" | "ncactual" => {
            Column::CountActual
        }
        "aovforecast" | "aovplan" => Column::AovForecast,
        "aovactual" | "aov" => Column::AovActual,
        "cacforecast" | "cacplan" => Column::CacForecast,
        "cacactual" | "cac" => Column::CacActual,
        "cpm" => Column::Cpm,
        "ctr" | "linkctr" => Column::Ctr,
        "cpc" | "linkcpc" => Column::Cpc,
        "frequency" | "freq" => Column::Frequency,
        "metaclicks" | "linkclicks" | "clicks" => Column::MetaClicks,
        "shopifysessions" | "sessions" => Column::ShopifySessions,
        "cvr" | "conversionrate" => Column::Cvr,
        _ => return None,
    };
    Some(column)
}

const PLACEHOLDERS: &[&str] = &["-", "—", "–", "n/a", "na", "#div/0!", "#n/a"];

/// `Ok(None)` for blank or placeholder cells, `Err(())` for text that is
/// not a number.
fn parse_cell(raw: &str) -> Result<Option<f64>, ()> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || PLACEHOLDERS.contains(&trimmed.to_ascii_lowercase().as_str()) {
        return Ok(None);
    }

    let (negative, body) = match trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };
    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%' | ' '))
        .collect();
    let value: f64 = cleaned.parse().map_err(|_| ())?;
    if !value.is_finite() {
        return Err(());
    }
    Ok(Some(if negative { -value } else { value }))
}

fn assign(week: &mut WeekRecord, column: Column, value: Option<f64>) {
    let slot = match column {
        Column::Label => return,
        Column::AdSpend => &mut week.ad_spend,
        Column::CmForecast => &mut week.cm_forecast,
        Column::CmActual => &mut week.cm_actual,
        Column::CountForecast => &mut week.count_forecast,
        Column::CountActual => &mut week.count_actual,
        Column::AovForecast => &mut week.aov_forecast,
        Column::AovActual => &mut week.aov_actual,
        Column::CacForecast => &mut week.cac_forecast,
        Column::CacActual => &mut week.cac_actual,
        Column::Cpm => &mut week.cpm,
        Column::Ctr => &mut week.ctr,
        Column::Cpc => &mut week.cpc,
        Column::Frequency => &mut week.frequency,
        Column::MetaClicks => &mut week.meta_clicks,
        Column::ShopifySessions => &mut week.shopify_sessions,
        Column::Cvr => &mut week.cvr,
    };
    *slot = value;
}

fn row_index(row: usize) -> Result<u32, IngestError> {
    u32::try_from(row).map_err(|_| IngestError::TooManyRows)
}

/// Parse a week table. Rows keep their order; `index` is the row position.
pub fn parse_week_table<R: io::Read>(reader: R) -> Result<Vec<WeekRecord>, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns: Vec<Option<Column>> = headers.iter().map(column_for).collect();
    if columns.iter().all(Option::is_none) {
        return Err(IngestError::NoKnownColumns);
    }

    let mut weeks = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let mut week = WeekRecord {
            index: Some(row_index(row)?),
            ..Default::default()
        };

        for (col, cell) in record.iter().enumerate() {
            match columns.get(col).copied().flatten() {
                Some(Column::Label) => {
                    if !cell.is_empty() {
                        week.label = Some(cell.to_string());
                    }
                }
                Some(column) => {
                    let value = parse_cell(cell).map_err(|_| IngestError::InvalidNumber {
                        row: row + 1,
                        column: headers.get(col).unwrap_or_default().to_string(),
                        value: cell.to_string(),
                    })?;
                    assign(&mut week, column, value);
                }
                None => {}
            }
        }
        weeks.push(week);
    }

    tracing::debug!(rows = weeks.len(), "week table parsed");
    Ok(weeks)
}

pub fn parse_week_table_str(csv: &str) -> Result<Vec<WeekRecord>, IngestError> {
    parse_week_table(csv.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_index_rejects_positions_past_u32() {
        assert_eq!(row_index(0).unwrap(), 0);
        assert_eq!(row_index(u32::MAX as usize).unwrap(), u32::MAX);
        #[cfg(target_pointer_width = "64")]
        assert!(matches!(row_index(u32::MAX as usize + 1), Err(IngestError::TooManyRows)));
    }

    const SHEET: &str = "\
Week,Ad Spend,CM Forecast,CM Actual,New Customers Forecast,New Customers Actual,AOV Forecast,AOV Actual,CAC Forecast,CAC Actual,CPM,CTR %,Sessions,Notes
Jan 6,\"$1,200.00\",$400,$380,20,19,$110,$104,$55,$63,$28.50,1.9%,1450,launch
Jan 13,\"$1,500\",$400,($120),20,12,$110,$96,$55,$125,—,1.2%,,
Jan 20,,,,,,,,,,,,,
";

    #[test]
    fn parses_spreadsheet_formatting() {
        let weeks = parse_week_table_str(SHEET).unwrap();
        assert_eq!(weeks.len(), 3);

        let w1 = &weeks[0];
        assert_eq!(w1.label.as_deref(), Some("Jan 6"));
        assert_eq!(w1.index, Some(0));
        assert_eq!(w1.ad_spend, Some(1200.0));
        assert_eq!(w1.cm_actual, Some(380.0));
        assert_eq!(w1.count_actual, Some(19.0));
        assert_eq!(w1.cpm, Some(28.5));
        assert_eq!(w1.ctr, Some(1.9));
        assert_eq!(w1.shopify_sessions, Some(1450.0));

        let w2 = &weeks[1];
        assert_eq!(w2.cm_actual, Some(-120.0));
        assert_eq!(w2.cpm, None);
        assert_eq!(w2.shopify_sessions, None);

        let w3 = &weeks[2];
        assert!(!w3.has_data());
        assert_eq!(w3.label.as_deref(), Some("Jan 20"));
    }

    #[test]
    fn header_aliases_are_loose() {
        assert_eq!(column_for("  CAC (actual) "), Some(Column::CacActual));
        assert_eq!(column_for("Link CTR"), Some(Column::Ctr));
        assert_eq!(column_for("shopify_sessions"), Some(Column::ShopifySessions));
        assert_eq!(column_for("Notes"), None);
    }

    #[test]
    fn invalid_number_names_the_cell() {
        let err = parse_week_table_str("Week,Ad Spend\nW1,lots\n").unwrap_err();
        match err {
            IngestError::InvalidNumber { row, column, value } => {
                assert_eq!(row, 1);
                assert_eq!(column, "Ad Spend");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_columns_only_is_an_error() {
        assert!(matches!(
            parse_week_table_str("foo,bar\n1,2\n"),
            Err(IngestError::NoKnownColumns)
        ));
    }

    #[test]
    fn placeholder_cells_are_missing_not_zero() {
        assert_eq!(parse_cell("n/a"), Ok(None));
        assert_eq!(parse_cell("#DIV/0!"), Ok(None));
        assert_eq!(parse_cell("0"), Ok(Some(0.0)));
        assert_eq!(parse_cell("(1,000)"), Ok(Some(-1000.0)));
        assert!(parse_cell("NaN").is_err());
    }
}
