//! Conversions from the compute pipeline's domain types to transport types.

use common::{
    ComparativeForecast, DashboardView, ForecastPoint, ForecastSection, GroupForecast, GroupStatistics,
    HistoricalInsights, KpiSummary, LatestForecast, PeakRecord, PeakValue, SkippedGroup, StateGrowth,
    StateStatistics, TrendPoint, TrendSeries,
};
use compute::dashboard::{Dashboard, ForecastState};
use compute::forecast::{ComparativeOutput, ForecastOutput};
use compute::insights::{self, Insights};
use compute::present;
use compute::types::{AggregatedRow, StateFilter};

pub fn convert_trend_series(filter: &StateFilter, series: &[AggregatedRow]) -> TrendSeries {
    let points = series
        .iter()
        .map(|row| TrendPoint::new(row.month.first_day(), row.population_group, row.value))
        .collect();
    TrendSeries::new(filter.states().to_vec(), points)
}

pub fn convert_group_forecast(output: &ForecastOutput) -> GroupForecast {
    GroupForecast {
        population_group: output.population_group,
        model: output.model.clone(),
        horizon: output.horizon.get(),
        last_historical_month: output.last_historical_month.first_day(),
        points: output
            .rows
            .iter()
            .map(|row| ForecastPoint {
                month: row.month.first_day(),
                predicted: row.predicted,
                lower_bound: row.lower_bound,
                upper_bound: row.upper_bound,
                is_future: output.is_future(row),
            })
            .collect(),
    }
}

pub fn convert_comparative(comparative: &ComparativeOutput) -> ComparativeForecast {
    ComparativeForecast {
        months: comparative.months.iter().map(|m| m.first_day()).collect(),
        series: comparative.forecasts.iter().map(convert_group_forecast).collect(),
        skipped: comparative
            .skipped
            .iter()
            .map(|(group, reason)| SkippedGroup {
                population_group: *group,
                reason: reason.clone(),
            })
            .collect(),
    }
}

pub fn convert_kpis(kpis: &present::KpiSummary) -> KpiSummary {
    KpiSummary {
        overall_average: kpis.overall_average,
        peak: kpis.peak.as_ref().map(|peak| PeakValue {
            value: peak.value,
            month: peak.month.first_day(),
            population_group: peak.population_group,
        }),
        latest_forecast: kpis.latest_forecast.as_ref().map(|latest| LatestForecast {
            value: latest.value,
            month: latest.month.first_day(),
            population_group: latest.population_group,
        }),
    }
}

pub fn convert_forecast_state(state: &ForecastState) -> ForecastSection {
    match state {
        ForecastState::Ready(output) => ForecastSection::Ready {
            forecast: convert_group_forecast(output),
        },
        ForecastState::Unavailable {
            population_group,
            reason,
        } => ForecastSection::Unavailable {
            population_group: *population_group,
            reason: reason.clone(),
        },
    }
}

pub fn convert_dashboard(dashboard: &Dashboard) -> DashboardView {
    DashboardView {
        horizon: dashboard.params.horizon.get(),
        trends: convert_trend_series(&dashboard.params.filter, &dashboard.series),
        kpis: convert_kpis(&dashboard.kpis),
        forecast: convert_forecast_state(&dashboard.forecast),
        comparative: convert_comparative(&dashboard.comparative),
    }
}

fn convert_state_stats(stats: &[insights::StateStats]) -> Vec<StateStatistics> {
    stats
        .iter()
        .map(|s| StateStatistics {
            state: s.state.clone(),
            mean: s.mean,
            record_count: s.record_count,
        })
        .collect()
}

pub fn convert_insights(insights: &Insights) -> HistoricalInsights {
    HistoricalInsights {
        first_month: insights.first_month.first_day(),
        last_month: insights.last_month.first_day(),
        total_records: insights.total_records as u32,
        overall_average: insights.overall_average,
        peak: PeakRecord {
            value: insights.peak.value,
            state: insights.peak.state.clone(),
            population_group: insights.peak.population_group,
            month: insights.peak.month.first_day(),
        },
        groups: insights
            .groups
            .iter()
            .map(|g| GroupStatistics {
                population_group: g.population_group,
                mean: g.mean,
                min: g.min,
                max: g.max,
                std_dev: g.std_dev,
            })
            .collect(),
        top_states: convert_state_stats(&insights.top_states),
        bottom_states: convert_state_stats(&insights.bottom_states),
        overall_growth: insights.overall_growth,
        most_improved_state: insights.most_improved_state.as_ref().map(|best| StateGrowth {
            state: best.state.clone(),
            growth: best.growth,
        }),
    }
}
