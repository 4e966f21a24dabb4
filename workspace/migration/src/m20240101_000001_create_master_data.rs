use sea_orm_migration::prelude::*;

use crate::entity_iden::EntityIden;
use model::entities::{master_data, prelude::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MasterData::table())
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MasterData::column(master_data::Column::Id))
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MasterData::column(master_data::Column::State))
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MasterData::column(master_data::Column::Month))
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MasterData::column(master_data::Column::PopGroup))
                            .string()
                            .not_null(),
                    )
                    // Nullable: imports coerce bad cells to NULL instead of failing
                    .col(ColumnDef::new(MasterData::column(master_data::Column::Avg)).double())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MasterData::table()).to_owned())
            .await
    }
}
