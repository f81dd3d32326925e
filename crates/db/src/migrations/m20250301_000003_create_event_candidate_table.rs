//! Create `event_candidate` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventCandidate::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventCandidate::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EventCandidate::EventId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventCandidate::CandidateId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventCandidate::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(EventCandidate::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(EventCandidate::GroupLabel).string_len(64))
                    .col(ColumnDef::new(EventCandidate::TimerStartedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(EventCandidate::ParticipantCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_candidate_event")
                            .from(EventCandidate::Table, EventCandidate::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_candidate_candidate")
                            .from(EventCandidate::Table, EventCandidate::CandidateId)
                            .to(Candidate::Table, Candidate::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index on event_id
        manager
            .create_index(
                Index::create()
                    .name("idx_event_candidate_event_id")
                    .table(EventCandidate::Table)
                    .col(EventCandidate::EventId)
                    .to_owned(),
            )
            .await?;

        // One join row per candidate per event
        manager
            .create_index(
                Index::create()
                    .name("idx_event_candidate_unique")
                    .table(EventCandidate::Table)
                    .col(EventCandidate::EventId)
                    .col(EventCandidate::CandidateId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventCandidate::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EventCandidate {
    Table,
    Id,
    EventId,
    CandidateId,
    SortOrder,
    Status,
    GroupLabel,
    TimerStartedAt,
    ParticipantCount,
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
}

#[derive(Iden)]
enum Candidate {
    Table,
    Id,
}
