//! Shared fixtures for tests that need a migrated database.

use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use model::entities::master_data;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, DbErr, Set};

use crate::types::{Month, Record};
use common::PopulationGroup;

pub async fn setup_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Inserts a raw `master_data` row, exactly as given.
pub async fn insert_row(
    db: &DatabaseConnection,
    state: &str,
    month: NaiveDate,
    pop_group: &str,
    avg: Option<f64>,
) -> master_data::Model {
    master_data::ActiveModel {
        state: Set(state.to_string()),
        month: Set(month),
        pop_group: Set(pop_group.to_string()),
        avg: Set(avg),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert master_data row")
}

pub fn month(year: i32, month: u32) -> Month {
    Month::new(year, month).expect("valid month")
}

/// One record per value for a state and group, in consecutive months from `start`.
pub fn monthly_records(
    state: &str,
    group: PopulationGroup,
    start: Month,
    values: &[f64],
) -> Vec<Record> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            Record::new(
                state,
                start.add_months(i as u32).expect("month in range"),
                group,
                *value,
            )
        })
        .collect()
}
