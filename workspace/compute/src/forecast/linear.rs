use statrs::distribution::{ContinuousCDF, StudentsT};

use super::{Bands, ForecastInput, ForecastOutput, Forecaster, Horizon};
use crate::error::{ComputeError, Result};

/// Ordinary least squares line through the history.
///
/// Fits `y = intercept + slope * t` with `t` the month offset and builds
/// prediction intervals from the residual standard error and Student's t.
/// Works from two points upwards; with two points the band has zero width.
#[derive(Debug, Clone)]
pub struct LinearTrendForecaster {
    level: f64,
}

impl LinearTrendForecaster {
    pub fn new(level: f64) -> Self {
        Self { level }
    }
}

impl Default for LinearTrendForecaster {
    fn default() -> Self {
        Self::new(0.95)
    }
}

/// Coefficients of a fitted line plus what the interval needs.
struct LineFit {
    intercept: f64,
    slope: f64,
    n: f64,
    x_mean: f64,
    sum_sq_dev: f64,
    residual_se: f64,
}

impl LineFit {
    fn fit(values: &[f64]) -> Option<Self> {
        let n = values.len();
        if n < 2 {
            return None;
        }

        let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let x_mean = xs.iter().sum::<f64>() / n as f64;
        let y_mean = values.iter().sum::<f64>() / n as f64;

        let sum_sq_dev: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
        let covariance: f64 = xs
            .iter()
            .zip(values)
            .map(|(x, y)| (x - x_mean) * (y - y_mean))
            .sum();

        let slope = covariance / sum_sq_dev;
        let intercept = y_mean - slope * x_mean;

        let residual_se = if n > 2 {
            let ssr: f64 = xs
                .iter()
                .zip(values)
                .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
                .sum();
            (ssr / (n - 2) as f64).sqrt()
        } else {
            0.0
        };

        Some(Self {
            intercept,
            slope,
            n: n as f64,
            x_mean,
            sum_sq_dev,
            residual_se,
        })
    }

    fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Half width of the prediction interval at `x`.
    fn margin(&self, x: f64, t_value: f64) -> f64 {
        if self.residual_se < 1e-10 {
            return 0.0;
        }
        let leverage = 1.0 + 1.0 / self.n + (x - self.x_mean).powi(2) / self.sum_sq_dev;
        t_value * self.residual_se * leverage.sqrt()
    }
}

impl Forecaster for LinearTrendForecaster {
    fn name(&self) -> &'static str {
        "linear_trend"
    }

    fn fit_predict(&self, input: &ForecastInput, horizon: Horizon) -> Result<ForecastOutput> {
        let values = input.values();
        let fit = LineFit::fit(&values).ok_or_else(|| {
            ComputeError::ForecastComputation(format!("Linear trend needs 2 points, got {}", values.len()))
        })?;

        let t_value = if values.len() > 2 {
            let dist = StudentsT::new(0.0, 1.0, (values.len() - 2) as f64)
                .map_err(|e| ComputeError::ForecastComputation(format!("Invalid t distribution: {}", e)))?;
            dist.inverse_cdf(0.5 + self.level / 2.0)
        } else {
            0.0
        };

        let band = |xs: std::ops::Range<usize>| {
            let mut bands = Bands::default();
            for i in xs {
                let x = i as f64;
                let predicted = fit.predict(x);
                let margin = fit.margin(x, t_value);
                bands.point.push(predicted);
                bands.lower.push(predicted - margin);
                bands.upper.push(predicted + margin);
            }
            bands
        };

        let n = values.len();
        let in_sample = band(0..n);
        let future = band(n..n + horizon.get() as usize);

        ForecastOutput::from_bands(input, horizon, self.name(), in_sample, future)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AggregatedRow, Month};
    use common::PopulationGroup;

    fn input(values: &[f64]) -> ForecastInput {
        let start = Month::new(2023, 1).unwrap();
        let series: Vec<AggregatedRow> = values
            .iter()
            .enumerate()
            .map(|(i, v)| AggregatedRow::new(start.add_months(i as u32).unwrap(), PopulationGroup::Rural, *v))
            .collect();
        ForecastInput::from_series(&series, PopulationGroup::Rural).unwrap()
    }

    #[test]
    fn test_perfect_line_extends_exactly() {
        let output = LinearTrendForecaster::default()
            .fit_predict(&input(&[10.0, 20.0]), Horizon::new(3).unwrap())
            .unwrap();

        assert_eq!(output.model, "linear_trend");
        let predicted: Vec<f64> = output.rows.iter().map(|r| r.predicted).collect();
        let expected = [10.0, 20.0, 30.0, 40.0, 50.0];
        for (p, e) in predicted.iter().zip(expected) {
            assert!((p - e).abs() < 1e-9, "{} != {}", p, e);
        }
        // Two points fit perfectly: zero-width band
        assert!(output.rows.iter().all(|r| r.lower_bound == r.predicted && r.upper_bound == r.predicted));
    }

    #[test]
    fn test_noisy_series_has_widening_band() {
        let output = LinearTrendForecaster::default()
            .fit_predict(&input(&[10.0, 14.0, 11.0, 16.0, 13.0, 18.0]), Horizon::new(6).unwrap())
            .unwrap();

        let future: Vec<_> = output.future_rows().collect();
        assert_eq!(future.len(), 6);
        let first_width = future[0].upper_bound - future[0].lower_bound;
        let last_width = future[5].upper_bound - future[5].lower_bound;
        assert!(first_width > 0.0);
        assert!(last_width > first_width);
        assert!(future.iter().all(|r| r.lower_bound <= r.predicted && r.predicted <= r.upper_bound));
    }
}
