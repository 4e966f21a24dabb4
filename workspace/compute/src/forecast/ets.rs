use augurs::ets::AutoETS;
use augurs::prelude::*;

use super::{Bands, ForecastInput, ForecastOutput, Forecaster, Horizon};
use crate::error::{ComputeError, Result};

/// Non-seasonal automatic exponential smoothing.
///
/// The model with the best information criterion is selected among the
/// error/trend combinations; history months get the in-sample fit.
#[derive(Debug, Clone)]
pub struct EtsForecaster {
    /// Prediction interval level, e.g. 0.95
    level: f64,
}

impl EtsForecaster {
    pub fn new(level: f64) -> Self {
        Self { level }
    }
}

impl Default for EtsForecaster {
    fn default() -> Self {
        Self::new(0.95)
    }
}

impl Forecaster for EtsForecaster {
    fn name(&self) -> &'static str {
        "ets"
    }

    fn fit_predict(&self, input: &ForecastInput, horizon: Horizon) -> Result<ForecastOutput> {
        let values = input.values();

        let model = AutoETS::non_seasonal();
        let fitted = model
            .fit(&values)
            .map_err(|e| ComputeError::ForecastComputation(format!("ETS model fitting failed: {}", e)))?;

        let in_sample = fitted
            .predict_in_sample(self.level)
            .map_err(|e| ComputeError::ForecastComputation(format!("ETS in-sample prediction failed: {}", e)))?;
        let forecast = fitted
            .predict(horizon.get() as usize, self.level)
            .map_err(|e| ComputeError::ForecastComputation(format!("ETS prediction failed: {}", e)))?;

        ForecastOutput::from_bands(
            input,
            horizon,
            self.name(),
            Bands::new(in_sample.point, in_sample.intervals.map(|i| (i.lower, i.upper))),
            Bands::new(forecast.point, forecast.intervals.map(|i| (i.lower, i.upper))),
        )
    }
}
