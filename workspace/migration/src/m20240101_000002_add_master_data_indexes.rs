use sea_orm_migration::prelude::*;

use crate::entity_iden::EntityIden;
use model::entities::{master_data, prelude::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

const STATE_MONTH_INDEX: &str = "idx_master_data_state_month";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Covers the distinct state listing and per-state month scans
        manager
            .create_index(
                Index::create()
                    .name(STATE_MONTH_INDEX)
                    .table(MasterData::table())
                    .col(MasterData::column(master_data::Column::State))
                    .col(MasterData::column(master_data::Column::Month))
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(STATE_MONTH_INDEX)
                    .table(MasterData::table())
                    .to_owned(),
            )
            .await
    }
}
