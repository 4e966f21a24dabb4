//! Forecast adapter: turns an aggregated group series into the two-column
//! input a forecasting model needs, runs the model, and shapes its output.

pub mod ets;
pub mod linear;

use common::PopulationGroup;
use tracing::{debug, info, instrument, warn};

use crate::aggregate::{groups_present, series_for_group};
use crate::error::{ComputeError, Result};
use crate::types::{AggregatedRow, Month};

pub use ets::EtsForecaster;
pub use linear::LinearTrendForecaster;

/// Minimum number of distinct historical months needed to forecast.
pub const MIN_HISTORY: usize = 2;

/// Number of future months to forecast, always within [`Horizon::MIN`, `Horizon::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Horizon(u32);

impl Horizon {
    pub const MIN: u32 = 3;
    pub const MAX: u32 = 36;
    pub const DEFAULT: u32 = 12;

    pub fn new(months: u32) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&months) {
            Ok(Horizon(months))
        } else {
            Err(ComputeError::InvalidHorizon(months))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Horizon(Self::DEFAULT)
    }
}

/// Gap-free monthly (month, value) series of one population group.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastInput {
    population_group: PopulationGroup,
    points: Vec<(Month, f64)>,
    interpolated: usize,
}

impl ForecastInput {
    /// Projects the rows of `group` out of an aggregated series.
    ///
    /// Months missing between the first and last observation are filled by
    /// linear interpolation between their neighbours.
    pub fn from_series(series: &[AggregatedRow], group: PopulationGroup) -> Result<Self> {
        let mut rows = series_for_group(series, group);
        rows.sort_by(|a, b| a.month.cmp(&b.month));
        rows.dedup_by(|a, b| a.month == b.month);

        if rows.len() < MIN_HISTORY {
            return Err(ComputeError::InsufficientHistory {
                group,
                periods: rows.len(),
                required: MIN_HISTORY,
            });
        }

        let mut points = Vec::with_capacity(rows.len());
        let mut interpolated = 0;
        for pair in rows.windows(2) {
            let (start, end) = (&pair[0], &pair[1]);
            points.push((start.month, start.value));

            let gap = start.month.months_until(end.month);
            for step in 1..gap {
                let fraction = step as f64 / gap as f64;
                let month = start
                    .month
                    .add_months(step as u32)
                    .ok_or_else(|| ComputeError::Runtime(format!("Month overflow after {}", start.month)))?;
                points.push((month, start.value + (end.value - start.value) * fraction));
                interpolated += 1;
            }
        }
        if let Some(last) = rows.last() {
            points.push((last.month, last.value));
        }

        if interpolated > 0 {
            debug!("Interpolated {} missing month(s) for {}", interpolated, group);
        }

        Ok(Self {
            population_group: group,
            points,
            interpolated,
        })
    }

    pub fn population_group(&self) -> PopulationGroup {
        self.population_group
    }

    pub fn points(&self) -> &[(Month, f64)] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, value)| *value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of months filled in by interpolation.
    pub fn interpolated(&self) -> usize {
        self.interpolated
    }

    pub fn first_month(&self) -> Option<Month> {
        self.points.first().map(|(month, _)| *month)
    }

    pub fn last_month(&self) -> Option<Month> {
        self.points.last().map(|(month, _)| *month)
    }
}

/// Point prediction with its interval.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub month: Month,
    pub predicted: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Point predictions with interval bounds, as returned by a model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bands {
    pub point: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Bands {
    /// Builds bands from a point forecast and optional (lower, upper) intervals.
    ///
    /// Without intervals the bounds collapse onto the point forecast.
    pub fn new(point: Vec<f64>, intervals: Option<(Vec<f64>, Vec<f64>)>) -> Self {
        let (lower, upper) = intervals.unwrap_or_else(|| (point.clone(), point.clone()));
        Self { point, lower, upper }
    }

    pub fn len(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    fn is_consistent(&self) -> bool {
        self.lower.len() == self.point.len() && self.upper.len() == self.point.len()
    }
}

/// Fitted history plus `horizon` future months for one population group.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOutput {
    pub population_group: PopulationGroup,
    pub model: String,
    pub horizon: Horizon,
    pub last_historical_month: Month,
    pub rows: Vec<ForecastRow>,
}

impl ForecastOutput {
    /// Lays model bands out on the month axis of `input`.
    ///
    /// `in_sample` must cover every input month and `future` exactly
    /// `horizon` months.
    pub fn from_bands(
        input: &ForecastInput,
        horizon: Horizon,
        model: &str,
        in_sample: Bands,
        future: Bands,
    ) -> Result<Self> {
        if in_sample.len() != input.len() || !in_sample.is_consistent() {
            return Err(ComputeError::ForecastComputation(format!(
                "{} returned {} in-sample values for {} months",
                model,
                in_sample.len(),
                input.len()
            )));
        }
        if future.len() != horizon.get() as usize || !future.is_consistent() {
            return Err(ComputeError::ForecastComputation(format!(
                "{} returned {} future values for a horizon of {}",
                model,
                future.len(),
                horizon.get()
            )));
        }

        let last_historical_month = input
            .last_month()
            .ok_or_else(|| ComputeError::ForecastComputation("Empty forecast input".to_string()))?;

        let mut rows = Vec::with_capacity(input.len() + future.len());
        for (i, (month, _)) in input.points().iter().enumerate() {
            rows.push(ForecastRow {
                month: *month,
                predicted: in_sample.point[i],
                lower_bound: in_sample.lower[i],
                upper_bound: in_sample.upper[i],
            });
        }
        for i in 0..future.len() {
            let month = last_historical_month.add_months(i as u32 + 1).ok_or_else(|| {
                ComputeError::ForecastComputation(format!("Month overflow after {}", last_historical_month))
            })?;
            rows.push(ForecastRow {
                month,
                predicted: future.point[i],
                lower_bound: future.lower[i],
                upper_bound: future.upper[i],
            });
        }

        Ok(Self {
            population_group: input.population_group(),
            model: model.to_string(),
            horizon,
            last_historical_month,
            rows,
        })
    }

    /// Rows strictly after the last historical month.
    pub fn future_rows(&self) -> impl Iterator<Item = &ForecastRow> {
        let last = self.last_historical_month;
        self.rows.iter().filter(move |row| row.month > last)
    }

    pub fn is_future(&self, row: &ForecastRow) -> bool {
        row.month > self.last_historical_month
    }

    /// Furthest forecast month.
    pub fn latest(&self) -> Option<&ForecastRow> {
        self.rows.last()
    }
}

/// A time-series model that fits a series and extends it.
///
/// Implementations return the in-sample fit for every input month followed
/// by exactly `horizon` monthly predictions.
pub trait Forecaster: Send + Sync {
    fn name(&self) -> &'static str;

    fn fit_predict(&self, input: &ForecastInput, horizon: Horizon) -> Result<ForecastOutput>;
}

/// Uses exponential smoothing when there is enough history and falls back
/// to a linear trend otherwise, or when smoothing fails to fit.
#[derive(Debug, Clone)]
pub struct AutoForecaster {
    ets: EtsForecaster,
    linear: LinearTrendForecaster,
    min_ets_points: usize,
}

impl AutoForecaster {
    /// A year of monthly history.
    pub const MIN_ETS_POINTS: usize = 12;

    pub fn new(ets: EtsForecaster, linear: LinearTrendForecaster, min_ets_points: usize) -> Self {
        Self {
            ets,
            linear,
            min_ets_points,
        }
    }
}

impl Default for AutoForecaster {
    fn default() -> Self {
        Self::new(
            EtsForecaster::default(),
            LinearTrendForecaster::default(),
            Self::MIN_ETS_POINTS,
        )
    }
}

impl Forecaster for AutoForecaster {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn fit_predict(&self, input: &ForecastInput, horizon: Horizon) -> Result<ForecastOutput> {
        if input.len() < self.min_ets_points {
            debug!(
                "{} months of history for {}, using {}",
                input.len(),
                input.population_group(),
                self.linear.name()
            );
            return self.linear.fit_predict(input, horizon);
        }

        match self.ets.fit_predict(input, horizon) {
            Ok(output) => Ok(output),
            Err(err) => {
                warn!(
                    "ETS failed for {} ({}), falling back to {}",
                    input.population_group(),
                    err,
                    self.linear.name()
                );
                self.linear.fit_predict(input, horizon)
            }
        }
    }
}

/// Forecasts a single population group of an aggregated series.
#[instrument(skip(forecaster, series), fields(model = forecaster.name()))]
pub fn forecast_group(
    forecaster: &dyn Forecaster,
    series: &[AggregatedRow],
    group: PopulationGroup,
    horizon: Horizon,
) -> Result<ForecastOutput> {
    let input = ForecastInput::from_series(series, group)?;
    let output = forecaster.fit_predict(&input, horizon)?;
    info!(
        "Forecast for {} fitted with {} over {} months",
        group,
        output.model,
        input.len()
    );
    Ok(output)
}

/// Forecasts for every group present, aligned on a shared month axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComparativeOutput {
    /// Sorted union of the months of all forecasts
    pub months: Vec<Month>,
    pub forecasts: Vec<ForecastOutput>,
    /// Groups that could not be forecast, with the reason
    pub skipped: Vec<(PopulationGroup, String)>,
}

impl ComparativeOutput {
    /// Predicted value of `group` at `month`, if that forecast covers it.
    pub fn value_at(&self, group: PopulationGroup, month: Month) -> Option<f64> {
        self.forecasts
            .iter()
            .find(|f| f.population_group == group)
            .and_then(|f| f.rows.iter().find(|row| row.month == month))
            .map(|row| row.predicted)
    }
}

/// Runs the forecast for each population group in the series.
///
/// Groups with too little history, or whose model fails, are reported in
/// `skipped` instead of failing the whole comparison.
#[instrument(skip(forecaster, series), fields(model = forecaster.name()))]
pub fn forecast_all_groups(
    forecaster: &dyn Forecaster,
    series: &[AggregatedRow],
    horizon: Horizon,
) -> Result<ComparativeOutput> {
    let mut comparative = ComparativeOutput::default();

    for group in groups_present(series) {
        match forecast_group(forecaster, series, group, horizon) {
            Ok(output) => comparative.forecasts.push(output),
            Err(err) if err.is_forecast_only() => {
                debug!("Skipping {} in comparative forecast: {}", group, err);
                comparative.skipped.push((group, err.to_string()));
            }
            Err(err) => return Err(err),
        }
    }

    let mut months: Vec<Month> = comparative
        .forecasts
        .iter()
        .flat_map(|f| f.rows.iter().map(|row| row.month))
        .collect();
    months.sort();
    months.dedup();
    comparative.months = months;

    Ok(comparative)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32) -> Month {
        Month::new(year, month).unwrap()
    }

    fn urban_series(values: &[f64]) -> Vec<AggregatedRow> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| AggregatedRow::new(month(2022, 1).add_months(i as u32).unwrap(), PopulationGroup::Urban, *v))
            .collect()
    }

    #[test]
    fn test_horizon_bounds() {
        assert!(Horizon::new(3).is_ok());
        assert!(Horizon::new(36).is_ok());
        assert!(matches!(Horizon::new(2), Err(ComputeError::InvalidHorizon(2))));
        assert!(matches!(Horizon::new(37), Err(ComputeError::InvalidHorizon(37))));
        assert_eq!(Horizon::default().get(), 12);
    }

    #[test]
    fn test_input_requires_two_periods() {
        let series = urban_series(&[10.0]);
        let err = ForecastInput::from_series(&series, PopulationGroup::Urban).unwrap_err();
        assert!(matches!(
            err,
            ComputeError::InsufficientHistory { periods: 1, required: 2, .. }
        ));

        let err = ForecastInput::from_series(&series, PopulationGroup::Rural).unwrap_err();
        assert!(matches!(err, ComputeError::InsufficientHistory { periods: 0, .. }));
    }

    #[test]
    fn test_input_fills_gaps() {
        let series = vec![
            AggregatedRow::new(month(2023, 1), PopulationGroup::Rural, 10.0),
            AggregatedRow::new(month(2023, 4), PopulationGroup::Rural, 40.0),
            AggregatedRow::new(month(2023, 2), PopulationGroup::Urban, 99.0),
        ];

        let input = ForecastInput::from_series(&series, PopulationGroup::Rural).unwrap();
        assert_eq!(input.len(), 4);
        assert_eq!(input.interpolated(), 2);
        assert_eq!(input.points()[1].0, month(2023, 2));
        assert!((input.points()[1].1 - 20.0).abs() < 1e-9);
        assert_eq!(input.points()[2].0, month(2023, 3));
        assert!((input.points()[2].1 - 30.0).abs() < 1e-9);
        assert_eq!(input.last_month(), Some(month(2023, 4)));
    }

    #[test]
    fn test_future_count_equals_horizon() {
        let series = urban_series(&[10.0, 12.0, 13.0, 15.0]);
        let forecaster = AutoForecaster::default();

        for months in [3, 12, 36] {
            let horizon = Horizon::new(months).unwrap();
            let output = forecast_group(&forecaster, &series, PopulationGroup::Urban, horizon).unwrap();

            assert_eq!(output.future_rows().count(), months as usize);
            assert_eq!(output.rows.len(), 4 + months as usize);
            assert_eq!(output.last_historical_month, month(2022, 4));
            assert_eq!(
                output.latest().unwrap().month,
                month(2022, 4).add_months(months).unwrap()
            );
        }
    }

    #[test]
    fn test_auto_uses_ets_with_enough_history() {
        let values: Vec<f64> = (0..36)
            .map(|i| 50.0 + i as f64 * 0.8 + (i as f64 * 0.9).sin() * 3.0)
            .collect();
        let series = urban_series(&values);
        let horizon = Horizon::new(6).unwrap();

        let output = forecast_group(&AutoForecaster::default(), &series, PopulationGroup::Urban, horizon).unwrap();

        // ETS may fall back to the linear model, but the shape is fixed
        assert_eq!(output.future_rows().count(), 6);
        assert!(output.rows.iter().all(|row| row.predicted.is_finite()));
    }

    #[test]
    fn test_from_bands_rejects_wrong_lengths() {
        let input = ForecastInput::from_series(&urban_series(&[1.0, 2.0]), PopulationGroup::Urban).unwrap();
        let horizon = Horizon::new(3).unwrap();

        let err = ForecastOutput::from_bands(
            &input,
            horizon,
            "test",
            Bands::new(vec![1.0, 2.0], None),
            Bands::new(vec![3.0, 4.0], None),
        )
        .unwrap_err();
        assert!(matches!(err, ComputeError::ForecastComputation(_)));
    }

    #[test]
    fn test_forecast_all_groups_skips_short_series() {
        let mut series = urban_series(&[10.0, 11.0, 12.0]);
        series.push(AggregatedRow::new(month(2022, 1), PopulationGroup::Rural, 4.0));
        series.sort_by(|a, b| a.month.cmp(&b.month).then(a.population_group.cmp(&b.population_group)));

        let horizon = Horizon::new(3).unwrap();
        let comparative = forecast_all_groups(&AutoForecaster::default(), &series, horizon).unwrap();

        assert_eq!(comparative.forecasts.len(), 1);
        assert_eq!(comparative.forecasts[0].population_group, PopulationGroup::Urban);
        assert_eq!(comparative.skipped.len(), 1);
        assert_eq!(comparative.skipped[0].0, PopulationGroup::Rural);
        // 3 historical + 3 future months
        assert_eq!(comparative.months.len(), 6);
        assert!(comparative.value_at(PopulationGroup::Urban, month(2022, 6)).is_some());
        assert!(comparative.value_at(PopulationGroup::Rural, month(2022, 1)).is_none());
    }

    #[test]
    fn test_forecast_all_groups_empty_series() {
        let comparative = forecast_all_groups(&AutoForecaster::default(), &[], Horizon::default()).unwrap();
        assert!(comparative.forecasts.is_empty());
        assert!(comparative.months.is_empty());
    }
}
