//! Historical insights over cleaned records: date range, peaks, per-group
//! and per-state statistics, growth.

use common::PopulationGroup;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fmt::Write;
use tracing::{debug, instrument};

use crate::error::{ComputeError, Result};
use crate::types::{Month, Record};

const STATE: &str = "state";
const GROUP: &str = "group";
const VALUE: &str = "value";
const MEAN: &str = "mean";
const MIN: &str = "min";
const MAX: &str = "max";
const STD: &str = "std";
const COUNT: &str = "count";

/// Number of states listed in the top and bottom tables.
pub const STATE_TABLE_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct PeakRecord {
    pub value: f64,
    pub state: String,
    pub population_group: PopulationGroup,
    pub month: Month,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub population_group: PopulationGroup,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation, undefined below two records
    pub std_dev: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateStats {
    pub state: String,
    pub mean: f64,
    pub record_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateGrowth {
    pub state: String,
    /// Percent change from the first to the last record
    pub growth: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    pub first_month: Month,
    pub last_month: Month,
    pub total_records: usize,
    pub overall_average: f64,
    pub peak: PeakRecord,
    /// Sorted by mean, highest first
    pub groups: Vec<GroupStats>,
    /// Highest means first
    pub top_states: Vec<StateStats>,
    /// Lowest means first
    pub bottom_states: Vec<StateStats>,
    pub overall_growth: f64,
    pub most_improved_state: Option<StateGrowth>,
}

/// Computes the insights report. Returns `None` when there are no records.
#[instrument(skip(records), fields(num_records = records.len()))]
pub fn compute_insights(records: &[Record]) -> Result<Option<Insights>> {
    let (Some(first), Some(last)) = (
        records.iter().map(|r| r.month).min(),
        records.iter().map(|r| r.month).max(),
    ) else {
        debug!("No records, skipping insights");
        return Ok(None);
    };

    let total_records = records.len();
    let overall_average = records.iter().map(|r| r.value).sum::<f64>() / total_records as f64;

    let mut peak = &records[0];
    for record in &records[1..] {
        if record.value > peak.value {
            peak = record;
        }
    }

    let frame = insights_frame(records)?;
    let mut groups = group_statistics(&frame)?;
    groups.sort_by(|a, b| b.mean.total_cmp(&a.mean));

    let mut states = state_statistics(&frame)?;
    states.sort_by(|a, b| b.mean.total_cmp(&a.mean).then_with(|| a.state.cmp(&b.state)));
    let top_states: Vec<StateStats> = states.iter().take(STATE_TABLE_SIZE).cloned().collect();
    let bottom_states: Vec<StateStats> = states.iter().rev().take(STATE_TABLE_SIZE).cloned().collect();

    let insights = Insights {
        first_month: first,
        last_month: last,
        total_records,
        overall_average,
        peak: PeakRecord {
            value: peak.value,
            state: peak.state.clone(),
            population_group: peak.population_group,
            month: peak.month,
        },
        groups,
        top_states,
        bottom_states,
        overall_growth: overall_growth(records, first, last),
        most_improved_state: most_improved_state(records),
    };

    debug!(
        "Insights over {} records from {} to {}",
        insights.total_records, insights.first_month, insights.last_month
    );
    Ok(Some(insights))
}

fn insights_frame(records: &[Record]) -> Result<DataFrame> {
    let states: Vec<&str> = records.iter().map(|r| r.state.as_str()).collect();
    let groups: Vec<u32> = records.iter().map(|r| r.population_group.ordinal()).collect();
    let values: Vec<f64> = records.iter().map(|r| r.value).collect();

    let df = DataFrame::new(vec![
        Series::new(STATE.into(), states).into(),
        Series::new(GROUP.into(), groups).into(),
        Series::new(VALUE.into(), values).into(),
    ])?;
    Ok(df)
}

fn group_statistics(frame: &DataFrame) -> Result<Vec<GroupStats>> {
    let df = frame
        .clone()
        .lazy()
        .group_by([col(GROUP)])
        .agg([
            col(VALUE).mean().alias(MEAN),
            col(VALUE).min().alias(MIN),
            col(VALUE).max().alias(MAX),
            col(VALUE).std(1).alias(STD),
            col(VALUE).count().cast(DataType::UInt32).alias(COUNT),
        ])
        .sort([GROUP], SortMultipleOptions::default())
        .collect()?;

    let groups = df.column(GROUP)?.as_materialized_series().u32()?;
    let means = df.column(MEAN)?.as_materialized_series().f64()?;
    let mins = df.column(MIN)?.as_materialized_series().f64()?;
    let maxs = df.column(MAX)?.as_materialized_series().f64()?;
    let stds = df.column(STD)?.as_materialized_series().f64()?;
    let counts = df.column(COUNT)?.as_materialized_series().u32()?;

    let mut stats = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let (Some(group), Some(mean), Some(min), Some(max), Some(count)) =
            (groups.get(i), means.get(i), mins.get(i), maxs.get(i), counts.get(i))
        else {
            return Err(ComputeError::DataFrame(format!("Null group statistic at row {}", i)));
        };
        let population_group = PopulationGroup::from_ordinal(group)
            .ok_or_else(|| ComputeError::DataFrame(format!("Invalid group ordinal {}", group)))?;
        let std_dev = if count < 2 {
            None
        } else {
            stds.get(i).filter(|v| v.is_finite())
        };

        stats.push(GroupStats {
            population_group,
            mean,
            min,
            max,
            std_dev,
        });
    }

    Ok(stats)
}

fn state_statistics(frame: &DataFrame) -> Result<Vec<StateStats>> {
    let df = frame
        .clone()
        .lazy()
        .group_by([col(STATE)])
        .agg([
            col(VALUE).mean().alias(MEAN),
            col(VALUE).count().cast(DataType::UInt32).alias(COUNT),
        ])
        .collect()?;

    let states = df.column(STATE)?.as_materialized_series().str()?;
    let means = df.column(MEAN)?.as_materialized_series().f64()?;
    let counts = df.column(COUNT)?.as_materialized_series().u32()?;

    let mut stats = Vec::with_capacity(df.height());
    for ((state, mean), count) in states.into_iter().zip(means.into_iter()).zip(counts.into_iter()) {
        let (Some(state), Some(mean), Some(record_count)) = (state, mean, count) else {
            return Err(ComputeError::DataFrame("Null state statistic".to_string()));
        };
        stats.push(StateStats {
            state: state.to_string(),
            mean,
            record_count,
        });
    }

    Ok(stats)
}

fn mean_in_month(records: &[Record], month: Month) -> Option<f64> {
    let values: Vec<f64> = records.iter().filter(|r| r.month == month).map(|r| r.value).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Percent change of the all-record mean from the first to the last month.
/// Zero when the first month averages zero.
fn overall_growth(records: &[Record], first: Month, last: Month) -> f64 {
    match (mean_in_month(records, first), mean_in_month(records, last)) {
        (Some(start), Some(end)) if start != 0.0 => (end - start) / start * 100.0,
        _ => 0.0,
    }
}

/// The state whose last record grew the most over its first one.
///
/// States need at least two records and a non-zero first value. Ties go to
/// the alphabetically first state.
fn most_improved_state(records: &[Record]) -> Option<StateGrowth> {
    let mut by_state: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for record in records {
        by_state.entry(record.state.as_str()).or_default().push(record);
    }

    let mut best: Option<StateGrowth> = None;
    for (state, mut rows) in by_state {
        if rows.len() < 2 {
            continue;
        }
        rows.sort_by_key(|r| r.month);
        let first = rows[0].value;
        let last = rows[rows.len() - 1].value;
        if first == 0.0 {
            continue;
        }

        let growth = (last - first) / first * 100.0;
        if best.as_ref().is_none_or(|b| growth > b.growth) {
            best = Some(StateGrowth {
                state: state.to_string(),
                growth,
            });
        }
    }

    best
}

/// Renders the insights as a markdown report.
pub fn render_markdown(insights: &Insights) -> Result<String> {
    let mut out = String::new();
    write_markdown(&mut out, insights)
        .map_err(|e| ComputeError::Export(format!("Failed to render insights report: {}", e)))?;
    Ok(out)
}

fn write_markdown(out: &mut String, insights: &Insights) -> std::fmt::Result {
    writeln!(out, "# WLA Historical Insights")?;
    writeln!(out)?;
    writeln!(out, "## Key Findings")?;
    writeln!(out)?;
    writeln!(
        out,
        "- **Date range:** {} to {}",
        insights.first_month, insights.last_month
    )?;
    writeln!(out, "- **Total records:** {}", insights.total_records)?;
    writeln!(out, "- **Overall average WLA:** {:.2}", insights.overall_average)?;
    writeln!(
        out,
        "- **Peak WLA:** {:.2} ({}, {}, {})",
        insights.peak.value, insights.peak.state, insights.peak.population_group, insights.peak.month
    )?;
    writeln!(out, "- **Overall growth:** {:+.2}%", insights.overall_growth)?;
    match &insights.most_improved_state {
        Some(best) => writeln!(out, "- **Most improved state:** {} ({:+.2}%)", best.state, best.growth)?,
        None => writeln!(out, "- **Most improved state:** n/a")?,
    }

    writeln!(out)?;
    writeln!(out, "## Population Groups")?;
    writeln!(out)?;
    writeln!(out, "| Group | Mean | Min | Max | Std Dev |")?;
    writeln!(out, "|---|---:|---:|---:|---:|")?;
    for group in &insights.groups {
        let std_dev = group
            .std_dev
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "n/a".to_string());
        writeln!(
            out,
            "| {} | {:.2} | {:.2} | {:.2} | {} |",
            group.population_group, group.mean, group.min, group.max, std_dev
        )?;
    }

    for (title, states) in [
        ("Top States", &insights.top_states),
        ("Bottom States", &insights.bottom_states),
    ] {
        writeln!(out)?;
        writeln!(out, "## {}", title)?;
        writeln!(out)?;
        writeln!(out, "| State | Mean | Records |")?;
        writeln!(out, "|---|---:|---:|")?;
        for state in states {
            writeln!(out, "| {} | {:.2} | {} |", state.state, state.mean, state.record_count)?;
        }
    }

    Ok(())
}
