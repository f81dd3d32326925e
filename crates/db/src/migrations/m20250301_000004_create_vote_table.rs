//! Create vote table.
//!
//! The composite unique index on (event, candidate, address, device) is
//! what rejects a racing duplicate vote insert; vote admission maps that
//! violation to an already-voted outcome instead of an error.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vote::EventId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Vote::EventCandidateId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Vote::CandidateId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::VoterAddr).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Vote::VoterDevice)
                            .string_len(128)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Vote::Choice).string_len(8).not_null())
                    .col(ColumnDef::new(Vote::Nonce).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Vote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_event")
                            .from(Vote::Table, Vote::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_event_candidate")
                            .from(Vote::Table, Vote::EventCandidateId)
                            .to(EventCandidate::Table, EventCandidate::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_candidate")
                            .from(Vote::Table, Vote::CandidateId)
                            .to(Candidate::Table, Candidate::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index on event_id for tallies
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_event_id")
                    .table(Vote::Table)
                    .col(Vote::EventId)
                    .to_owned(),
            )
            .await?;

        // Index on (event_id, candidate_id) for per-candidate tallies
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_event_candidate")
                    .table(Vote::Table)
                    .col(Vote::EventId)
                    .col(Vote::CandidateId)
                    .to_owned(),
            )
            .await?;

        // At most one vote per (event, candidate, voter identity)
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_unique_identity")
                    .table(Vote::Table)
                    .col(Vote::EventId)
                    .col(Vote::CandidateId)
                    .col(Vote::VoterAddr)
                    .col(Vote::VoterDevice)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Vote {
    Table,
    Id,
    EventId,
    EventCandidateId,
    CandidateId,
    VoterAddr,
    VoterDevice,
    Choice,
    Nonce,
    CreatedAt,
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
}

#[derive(Iden)]
enum EventCandidate {
    Table,
    Id,
}

#[derive(Iden)]
enum Candidate {
    Table,
    Id,
}
