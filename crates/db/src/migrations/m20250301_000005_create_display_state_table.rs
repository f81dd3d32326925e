//! Create `display_state` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DisplayState::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DisplayState::EventId)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DisplayState::CurrentCandidateId).string_len(32))
                    .col(ColumnDef::new(DisplayState::CountdownUntil).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_display_state_event")
                            .from(DisplayState::Table, DisplayState::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DisplayState::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum DisplayState {
    Table,
    EventId,
    CurrentCandidateId,
    CountdownUntil,
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
}
