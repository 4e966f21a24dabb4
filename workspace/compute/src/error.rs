use common::PopulationGroup;
use thiserror::Error;
use tracing::error;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// The store is unreachable or the query failed
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Not enough distinct months to fit a forecast
    #[error("Insufficient history for {group}: {periods} period(s), at least {required} required")]
    InsufficientHistory {
        group: PopulationGroup,
        periods: usize,
        required: usize,
    },

    /// Forecast horizon outside the accepted range
    #[error("Invalid horizon {0}: must be between {min} and {max} months", min = crate::forecast::Horizon::MIN, max = crate::forecast::Horizon::MAX)]
    InvalidHorizon(u32),

    /// Error from Polars DataFrame operations
    #[error("DataFrame error: {0}")]
    DataFrame(String),

    /// Error from Polars Series operations
    #[error("Series error: {0}")]
    Series(String),

    /// Error from forecast computation
    #[error("Forecast computation error: {0}")]
    ForecastComputation(String),

    /// Error while serializing an export
    #[error("Export error: {0}")]
    Export(String),

    /// Runtime error for unexpected situations
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl From<sea_orm::DbErr> for ComputeError {
    fn from(error: sea_orm::DbErr) -> Self {
        let err = ComputeError::DataUnavailable(error.to_string());
        error!(?err, "Database error");
        err
    }
}

// Implement From<polars::error::PolarsError> for ComputeError
impl From<polars::error::PolarsError> for ComputeError {
    fn from(error: polars::error::PolarsError) -> Self {
        let compute_error = match error {
            polars::error::PolarsError::NoData(_) => {
                let err = ComputeError::DataFrame(format!("No data: {}", error));
                error!(?err, "DataFrame error: No data");
                err
            }
            polars::error::PolarsError::ShapeMismatch(_) => {
                let err = ComputeError::DataFrame(format!("Shape mismatch: {}", error));
                error!(?err, "DataFrame error: Shape mismatch");
                err
            }
            polars::error::PolarsError::SchemaMismatch(_) => {
                let err = ComputeError::DataFrame(format!("Schema mismatch: {}", error));
                error!(?err, "DataFrame error: Schema mismatch");
                err
            }
            polars::error::PolarsError::ComputeError(_) => {
                let err = ComputeError::DataFrame(format!("Compute error: {}", error));
                error!(?err, "DataFrame error: Compute error");
                err
            }
            _ => {
                let err = ComputeError::Series(format!("Series error: {}", error));
                error!(?err, "Series error");
                err
            }
        };
        compute_error
    }
}

impl From<csv::Error> for ComputeError {
    fn from(error: csv::Error) -> Self {
        ComputeError::Export(error.to_string())
    }
}

impl ComputeError {
    /// True for errors that only affect the forecast section of a view.
    pub fn is_forecast_only(&self) -> bool {
        matches!(
            self,
            ComputeError::InsufficientHistory { .. } | ComputeError::ForecastComputation(_)
        )
    }
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
