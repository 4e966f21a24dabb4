//! Loading cleaned records from the store.

pub mod cache;

use async_trait::async_trait;
use common::PopulationGroup;
use model::entities::master_data;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::{debug, info, instrument, trace};

use crate::error::Result;
use crate::types::{Month, Record, StateFilter, normalize_state};

/// A source of cleaned WLA records.
///
/// Implementations return records whose state is selected by the filter, with
/// normalized state names and population groups, sorted by month.
#[async_trait]
pub trait RecordSource {
    async fn load_records(&self, db: &DatabaseConnection, filter: &StateFilter) -> Result<Vec<Record>>;
}

/// Reads records from the `master_data` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatabaseRecordSource;

impl DatabaseRecordSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RecordSource for DatabaseRecordSource {
    #[instrument(skip(self, db), fields(states = filter.states().len()))]
    async fn load_records(&self, db: &DatabaseConnection, filter: &StateFilter) -> Result<Vec<Record>> {
        // States are matched after cleaning; SQL TRIM/LOWER disagree with normalize_state
        let rows = master_data::Entity::find()
            .filter(master_data::Column::Avg.is_not_null())
            .order_by_asc(master_data::Column::Month)
            .order_by_asc(master_data::Column::Id)
            .all(db)
            .await?;
        debug!("Fetched {} raw rows from master_data", rows.len());

        let total = rows.len();
        let records: Vec<Record> = rows
            .into_iter()
            .filter_map(clean_row)
            .filter(|record| filter.matches(&record.state))
            .collect();

        info!("Loaded {} of {} rows", records.len(), total);
        Ok(records)
    }
}

/// Turns a raw row into a record, or drops it when it cannot be used.
fn clean_row(row: master_data::Model) -> Option<Record> {
    let Some(population_group) = PopulationGroup::from_label(&row.pop_group) else {
        debug!(id = row.id, pop_group = %row.pop_group, "Dropping row with unknown population group");
        return None;
    };

    let value = match row.avg {
        Some(value) if value.is_finite() && value >= 0.0 => value,
        other => {
            trace!(id = row.id, value = ?other, "Dropping row with unusable value");
            return None;
        }
    };

    let state = normalize_state(&row.state);
    if state.is_empty() {
        trace!(id = row.id, "Dropping row without state");
        return None;
    }

    Some(Record::new(state, Month::from_date(row.month), population_group, value))
}

/// Distinct normalized state names, sorted.
#[instrument(skip(db))]
pub async fn list_states(db: &DatabaseConnection) -> Result<Vec<String>> {
    let raw_states: Vec<String> = master_data::Entity::find()
        .select_only()
        .column(master_data::Column::State)
        .distinct()
        .into_tuple::<String>()
        .all(db)
        .await?;

    let mut states: Vec<String> = raw_states
        .iter()
        .map(|s| normalize_state(s))
        .filter(|s| !s.is_empty())
        .collect();
    states.sort();
    states.dedup();

    debug!("Found {} distinct states", states.len());
    Ok(states)
}

/// A fixed set of records, filtered in memory.
///
/// Useful when the records come from somewhere other than the database, such
/// as an ad-hoc CSV file.
#[derive(Debug, Clone, Default)]
pub struct StaticRecordSource {
    records: Vec<Record>,
}

impl StaticRecordSource {
    pub fn new(mut records: Vec<Record>) -> Self {
        records.sort_by(|a, b| a.month.cmp(&b.month));
        Self { records }
    }
}

#[async_trait]
impl RecordSource for StaticRecordSource {
    async fn load_records(&self, _db: &DatabaseConnection, filter: &StateFilter) -> Result<Vec<Record>> {
        Ok(self
            .records
            .iter()
            .filter(|record| filter.matches(&record.state))
            .cloned()
            .collect())
    }
}
