//! One full recomputation pass of the dashboard.

use common::PopulationGroup;
use sea_orm::DatabaseConnection;
use tracing::{info, instrument, warn};

use crate::aggregate::{aggregate, groups_present};
use crate::error::Result;
use crate::forecast::{ComparativeOutput, ForecastOutput, Forecaster, Horizon, forecast_all_groups, forecast_group};
use crate::loader::RecordSource;
use crate::present::{KpiSummary, PresentationRow, merge_views, summarize};
use crate::types::{AggregatedRow, AggregatedSeries, Record, StateFilter};

/// Selection driving a recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DashboardParams {
    pub filter: StateFilter,
    pub horizon: Horizon,
    /// Group forecast individually; the first group present when unset
    pub group: Option<PopulationGroup>,
}

impl DashboardParams {
    pub fn new(filter: StateFilter, horizon: Horizon, group: Option<PopulationGroup>) -> Self {
        Self { filter, horizon, group }
    }
}

/// The individual forecast, or why there is none.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastState {
    Ready(ForecastOutput),
    Unavailable {
        population_group: Option<PopulationGroup>,
        reason: String,
    },
}

impl ForecastState {
    pub fn output(&self) -> Option<&ForecastOutput> {
        match self {
            ForecastState::Ready(output) => Some(output),
            ForecastState::Unavailable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub params: DashboardParams,
    pub series: AggregatedSeries,
    pub kpis: KpiSummary,
    pub forecast: ForecastState,
    pub comparative: ComparativeOutput,
    /// History merged with the individual forecast
    pub rows: Vec<PresentationRow>,
}

/// Loads the selected records and recomputes every view.
///
/// Store failures abort the pass. Forecast failures only mark the forecast
/// section unavailable.
#[instrument(skip(source, forecaster, db))]
pub async fn compute_dashboard<S>(
    source: &S,
    forecaster: &dyn Forecaster,
    db: &DatabaseConnection,
    params: &DashboardParams,
) -> Result<Dashboard>
where
    S: RecordSource + ?Sized + Sync,
{
    let records = source.load_records(db, &params.filter).await?;
    build_dashboard(forecaster, &records, params)
}

/// The synchronous part of [`compute_dashboard`], for already loaded records.
pub fn build_dashboard(forecaster: &dyn Forecaster, records: &[Record], params: &DashboardParams) -> Result<Dashboard> {
    let series = aggregate(records)?;

    // Each group is fitted once; the individual forecast is taken from the comparison
    let comparative = forecast_all_groups(forecaster, &series, params.horizon)?;

    let selected = params.group.or_else(|| groups_present(&series).first().copied());
    let forecast = match selected {
        None => ForecastState::Unavailable {
            population_group: None,
            reason: "No data for the selected states".to_string(),
        },
        Some(group) => selected_forecast(forecaster, &series, &comparative, group, params.horizon)?,
    };

    let kpis = summarize(&series, forecast.output());
    let rows = merge_views(&series, forecast.output().map(std::slice::from_ref).unwrap_or_default());

    info!(
        "Dashboard recomputed: {} records, {} buckets, {} comparative forecasts",
        records.len(),
        series.len(),
        comparative.forecasts.len()
    );

    Ok(Dashboard {
        params: params.clone(),
        series,
        kpis,
        forecast,
        comparative,
        rows,
    })
}

fn selected_forecast(
    forecaster: &dyn Forecaster,
    series: &[AggregatedRow],
    comparative: &ComparativeOutput,
    group: PopulationGroup,
    horizon: Horizon,
) -> Result<ForecastState> {
    if let Some(output) = comparative.forecasts.iter().find(|f| f.population_group == group) {
        return Ok(ForecastState::Ready(output.clone()));
    }

    let reason = match comparative.skipped.iter().find(|(skipped, _)| *skipped == group) {
        Some((_, reason)) => reason.clone(),
        // Not in the series at all
        None => match forecast_group(forecaster, series, group, horizon) {
            Ok(output) => return Ok(ForecastState::Ready(output)),
            Err(err) if err.is_forecast_only() => err.to_string(),
            Err(err) => return Err(err),
        },
    };

    warn!("Forecast unavailable for {}: {}", group, reason);
    Ok(ForecastState::Unavailable {
        population_group: Some(group),
        reason,
    })
}
