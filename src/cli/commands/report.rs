use anyhow::{Context, Result};
use compute::insights::{compute_insights, render_markdown};
use compute::loader::{DatabaseRecordSource, RecordSource};
use compute::types::StateFilter;
use sea_orm::{Database, DatabaseConnection};
use std::path::Path;
use tracing::{info, warn};

/// Builds the markdown insights report for the selected states.
pub async fn build_report(db: &DatabaseConnection, filter: &StateFilter) -> Result<String> {
    let records = DatabaseRecordSource::new()
        .load_records(db, filter)
        .await
        .context("Failed to load WLA records")?;

    match compute_insights(&records).context("Failed to compute insights")? {
        Some(insights) => Ok(render_markdown(&insights)?),
        None => {
            warn!("No records for {:?}, writing an empty report", filter);
            Ok("# WLA Historical Insights\n\nNo data for the selected states.\n".to_string())
        }
    }
}

pub async fn report(database_url: &str, states: Option<&str>, output: Option<&Path>) -> Result<()> {
    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;

    let filter = states.map(StateFilter::parse_list).unwrap_or_default();
    let report = build_report(&db, &filter).await?;

    match output {
        Some(path) => {
            std::fs::write(path, &report).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => print!("{}", report),
    }

    Ok(())
}
