//! Create candidate table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Candidate::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Candidate::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Candidate::FullName)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Candidate::Image).string_len(512))
                    .col(ColumnDef::new(Candidate::BirthDate).date())
                    .col(ColumnDef::new(Candidate::Degree).string_len(256))
                    .col(ColumnDef::new(Candidate::Position).string_len(256))
                    .col(ColumnDef::new(Candidate::Bio).text())
                    .col(ColumnDef::new(Candidate::ElectedTerm).string_len(64))
                    .col(
                        ColumnDef::new(Candidate::Imported)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Candidate::ExternalId).big_integer())
                    .col(
                        ColumnDef::new(Candidate::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index on external_id for roster re-imports
        manager
            .create_index(
                Index::create()
                    .name("idx_candidate_external_id")
                    .table(Candidate::Table)
                    .col(Candidate::ExternalId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Candidate::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Candidate {
    Table,
    Id,
    FullName,
    Image,
    BirthDate,
    Degree,
    Position,
    Bio,
    ElectedTerm,
    Imported,
    ExternalId,
    CreatedAt,
}
