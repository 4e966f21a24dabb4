//! Presentation assembler: merged history/forecast table, KPIs, CSV export.

use common::PopulationGroup;
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, instrument};

use crate::error::{ComputeError, Result};
use crate::forecast::ForecastOutput;
use crate::types::{AggregatedRow, Month};

/// Column order of the exported CSV.
pub const CSV_HEADER: [&str; 6] = [
    "month",
    "population_group",
    "kind",
    "value",
    "lower_bound",
    "upper_bound",
];

/// Whether a presentation row was observed or predicted.
///
/// Historical sorts before Forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RowKind {
    Historical,
    Forecast,
}

impl RowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowKind::Historical => "historical",
            RowKind::Forecast => "forecast",
        }
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the merged table. Bounds are only set on forecast rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationRow {
    pub month: Month,
    pub population_group: PopulationGroup,
    pub kind: RowKind,
    pub value: f64,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
}

impl PresentationRow {
    pub fn historical(row: &AggregatedRow) -> Self {
        Self {
            month: row.month,
            population_group: row.population_group,
            kind: RowKind::Historical,
            value: row.value,
            lower_bound: None,
            upper_bound: None,
        }
    }

    fn sort_key(&self) -> (Month, PopulationGroup, RowKind) {
        (self.month, self.population_group, self.kind)
    }
}

/// Merges the aggregated history with forecasts.
///
/// Forecasts contribute only their future months, the fitted history is left
/// out. Rows are ordered by month, then group, historical first.
#[instrument(skip_all, fields(history = history.len(), forecasts = forecasts.len()))]
pub fn merge_views(history: &[AggregatedRow], forecasts: &[ForecastOutput]) -> Vec<PresentationRow> {
    let mut rows: Vec<PresentationRow> = history.iter().map(PresentationRow::historical).collect();

    for forecast in forecasts {
        rows.extend(forecast.future_rows().map(|row| PresentationRow {
            month: row.month,
            population_group: forecast.population_group,
            kind: RowKind::Forecast,
            value: row.predicted,
            lower_bound: Some(row.lower_bound),
            upper_bound: Some(row.upper_bound),
        }));
    }

    rows.sort_by_key(PresentationRow::sort_key);
    debug!("Merged view has {} rows", rows.len());
    rows
}

/// A KPI value located in time and group.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiValue {
    pub value: f64,
    pub month: Month,
    pub population_group: PopulationGroup,
}

/// Summary figures of the dashboard. Every field is empty for empty input.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KpiSummary {
    pub overall_average: Option<f64>,
    pub peak: Option<KpiValue>,
    pub latest_forecast: Option<KpiValue>,
}

/// Computes the KPIs over the aggregated history and the selected forecast.
///
/// The peak is the first maximum in series order. The latest forecast is the
/// furthest forecast month.
pub fn summarize(history: &[AggregatedRow], latest_forecast: Option<&ForecastOutput>) -> KpiSummary {
    let overall_average = if history.is_empty() {
        None
    } else {
        Some(history.iter().map(|row| row.value).sum::<f64>() / history.len() as f64)
    };

    let mut peak: Option<&AggregatedRow> = None;
    for row in history {
        match peak {
            Some(best) if row.value.total_cmp(&best.value) != Ordering::Greater => {}
            _ => peak = Some(row),
        }
    }

    let latest_forecast = latest_forecast.and_then(|forecast| {
        forecast.latest().map(|row| KpiValue {
            value: row.predicted,
            month: row.month,
            population_group: forecast.population_group,
        })
    });

    KpiSummary {
        overall_average,
        peak: peak.map(|row| KpiValue {
            value: row.value,
            month: row.month,
            population_group: row.population_group,
        }),
        latest_forecast,
    }
}

/// Serializes merged rows to CSV text with a header line.
///
/// Months are written as the first day (`YYYY-MM-DD`); bounds of historical
/// rows are empty. Empty input gives the header only.
pub fn export_csv(rows: &[PresentationRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for row in rows {
        writer.write_record([
            row.month.first_day().format("%Y-%m-%d").to_string(),
            row.population_group.label().to_string(),
            row.kind.as_str().to_string(),
            row.value.to_string(),
            row.lower_bound.map(|v| v.to_string()).unwrap_or_default(),
            row.upper_bound.map(|v| v.to_string()).unwrap_or_default(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ComputeError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ComputeError::Export(e.to_string()))
}
