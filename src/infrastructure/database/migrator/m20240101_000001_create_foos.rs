//! Create foos table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Foos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Foos::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Foos::OrgId).string().not_null())
                    .col(ColumnDef::new(Foos::Namespace).string().not_null())
                    .col(ColumnDef::new(Foos::Name).string().not_null())
                    .col(ColumnDef::new(Foos::SearchName).string().not_null())
                    .col(
                        ColumnDef::new(Foos::Version)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Foos::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Foos::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Every listing is scoped by org + namespace
        manager
            .create_index(
                Index::create()
                    .name("idx_foos_org_namespace")
                    .table(Foos::Table)
                    .col(Foos::OrgId)
                    .col(Foos::Namespace)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Foos::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Foos {
    Table,
    Id,
    OrgId,
    Namespace,
    Name,
    SearchName,
    Version,
    CreatedAt,
    UpdatedAt,
}
