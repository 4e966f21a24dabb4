//! Monthly aggregation of records per population group.

use common::PopulationGroup;
use polars::prelude::*;
use tracing::{debug, instrument};

use crate::error::{ComputeError, Result};
use crate::types::{AggregatedRow, AggregatedSeries, Month, Record};

const PERIOD: &str = "period";
const GROUP: &str = "group";
const VALUE: &str = "value";

/// Builds the (period, group, value) frame the aggregation runs on.
///
/// Months become their dense integer index and groups their canonical
/// ordinal, so sorting the frame numerically gives the display order.
pub(crate) fn records_frame<I>(rows: I) -> Result<DataFrame>
where
    I: IntoIterator<Item = (Month, PopulationGroup, f64)>,
{
    let mut periods = Vec::new();
    let mut groups = Vec::new();
    let mut values = Vec::new();

    for (month, group, value) in rows {
        periods.push(month.index());
        groups.push(group.ordinal());
        values.push(value);
    }

    let df = DataFrame::new(vec![
        Series::new(PERIOD.into(), periods).into(),
        Series::new(GROUP.into(), groups).into(),
        Series::new(VALUE.into(), values).into(),
    ])?;

    Ok(df)
}

/// Groups records by (month, population group) and averages their values.
///
/// The output has one row per bucket present in the input, ordered by month
/// and then by canonical group order. Empty input yields an empty series.
#[instrument(skip(records), fields(num_records = records.len()))]
pub fn aggregate(records: &[Record]) -> Result<AggregatedSeries> {
    if records.is_empty() {
        debug!("No records to aggregate");
        return Ok(Vec::new());
    }

    let df = records_frame(
        records
            .iter()
            .map(|r| (r.month, r.population_group, r.value)),
    )?;

    let grouped = df
        .lazy()
        .group_by([col(PERIOD), col(GROUP)])
        .agg([col(VALUE).mean()])
        .sort([PERIOD, GROUP], SortMultipleOptions::default())
        .collect()?;

    let series = frame_to_series(&grouped)?;
    debug!("Aggregated {} records into {} buckets", records.len(), series.len());
    Ok(series)
}

/// Aggregates an already aggregated series again, treating each row as a
/// single observation. For a one-row-per-bucket series this is the identity.
pub fn reaggregate(series: &[AggregatedRow]) -> Result<AggregatedSeries> {
    let records: Vec<Record> = series
        .iter()
        .map(|row| Record::new(String::new(), row.month, row.population_group, row.value))
        .collect();
    aggregate(&records)
}

fn frame_to_series(df: &DataFrame) -> Result<AggregatedSeries> {
    let periods = df.column(PERIOD)?.as_materialized_series().i32()?;
    let groups = df.column(GROUP)?.as_materialized_series().u32()?;
    let values = df.column(VALUE)?.as_materialized_series().f64()?;

    let mut series = Vec::with_capacity(df.height());
    for ((period, group), value) in periods.into_iter().zip(groups.into_iter()).zip(values.into_iter()) {
        let (Some(period), Some(group), Some(value)) = (period, group, value) else {
            return Err(ComputeError::DataFrame("Null value in aggregated frame".to_string()));
        };
        let month = Month::from_index(period)
            .ok_or_else(|| ComputeError::DataFrame(format!("Invalid period index {}", period)))?;
        let group = PopulationGroup::from_ordinal(group)
            .ok_or_else(|| ComputeError::DataFrame(format!("Invalid group ordinal {}", group)))?;
        series.push(AggregatedRow::new(month, group, value));
    }

    Ok(series)
}

/// Rows of a single population group, in month order.
pub fn series_for_group(series: &[AggregatedRow], group: PopulationGroup) -> Vec<AggregatedRow> {
    series
        .iter()
        .filter(|row| row.population_group == group)
        .cloned()
        .collect()
}

/// Population groups present in the series, canonical order.
pub fn groups_present(series: &[AggregatedRow]) -> Vec<PopulationGroup> {
    let mut groups: Vec<PopulationGroup> = series.iter().map(|row| row.population_group).collect();
    groups.sort();
    groups.dedup();
    groups
}
