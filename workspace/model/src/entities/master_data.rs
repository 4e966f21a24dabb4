use sea_orm::entity::prelude::*;

/// One monthly WLA observation for a state and population group.
///
/// Columns mirror the spreadsheet the data is imported from. `pop_group` is the
/// raw label (`"Urban"`, `"S - Urban"`, `"Rural"` and spelling variants) and
/// `avg` is nullable because imports coerce unparseable cells to NULL.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "master_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub state: String,
    /// Observation date; only year and month are meaningful.
    pub month: Date,
    pub pop_group: String,
    /// The WLA measure for the bucket.
    pub avg: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
