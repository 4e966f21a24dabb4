use anyhow::{Context, Result};
use chrono::NaiveDate;
use model::entities::master_data;
use sea_orm::{Database, EntityTrait, Set, TransactionTrait};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Columns every import file must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = ["state", "month", "pop_group", "avg"];

/// Rows inserted per statement.
const INSERT_BATCH_SIZE: usize = 500;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Line {line}: cannot parse month '{value}' (expected YYYY-MM-DD, YYYY-MM or DD-MM-YYYY)")]
    InvalidMonth { line: u64, value: String },
}

/// A row ready for `master_data`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub state: String,
    pub month: NaiveDate,
    pub pop_group: String,
    pub avg: Option<f64>,
}

/// Lowercases a header and turns spaces and dashes into underscores.
fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

fn parse_month(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d-%m-%Y"))
        .ok()
}

/// Parses an import file. Values that are not numbers become `None`.
pub fn parse_csv<R: Read>(reader: R) -> std::result::Result<Vec<ImportRow>, ImportError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    let mut positions = [0usize; 4];
    for (slot, column) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == column)
            .ok_or(ImportError::MissingColumn(column))?;
    }
    let [state_idx, month_idx, group_idx, avg_idx] = positions;
    debug!("Import columns: {:?}", headers);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let field = |idx: usize| record.get(idx).unwrap_or_default();

        let month = parse_month(field(month_idx)).ok_or_else(|| ImportError::InvalidMonth {
            line,
            value: field(month_idx).to_string(),
        })?;

        let avg = match field(avg_idx).parse::<f64>() {
            Ok(value) => Some(value),
            Err(_) => {
                trace!(line, value = field(avg_idx), "Unparseable avg stored as NULL");
                None
            }
        };

        rows.push(ImportRow {
            state: field(state_idx).to_string(),
            month,
            pop_group: field(group_idx).to_string(),
            avg,
        });
    }

    Ok(rows)
}

/// Appends the rows of a CSV file to `master_data`, in one transaction.
pub async fn import_csv(csv_path: &Path, database_url: &str) -> Result<()> {
    info!("Importing WLA records from {}", csv_path.display());

    let file = File::open(csv_path).with_context(|| format!("Failed to open {}", csv_path.display()))?;
    let rows = parse_csv(file).with_context(|| format!("Failed to parse {}", csv_path.display()))?;

    let missing = rows.iter().filter(|r| r.avg.is_none()).count();
    if missing > 0 {
        warn!("{} row(s) without a numeric avg will be ignored by the dashboard", missing);
    }

    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;
    let inserted = insert_rows(&db, rows).await?;

    info!("Imported {} rows into master_data", inserted);
    Ok(())
}

pub async fn insert_rows(db: &sea_orm::DatabaseConnection, rows: Vec<ImportRow>) -> Result<usize> {
    let total = rows.len();
    let txn = db.begin().await?;

    for batch in rows.chunks(INSERT_BATCH_SIZE) {
        let models = batch.iter().map(|row| master_data::ActiveModel {
            state: Set(row.state.clone()),
            month: Set(row.month),
            pop_group: Set(row.pop_group.clone()),
            avg: Set(row.avg),
            ..Default::default()
        });
        master_data::Entity::insert_many(models)
            .exec(&txn)
            .await
            .context("Failed to insert master_data rows")?;
        debug!("Inserted batch of {} rows", batch.len());
    }

    txn.commit().await?;
    Ok(total)
}
