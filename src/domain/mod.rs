pub mod board;
pub mod card;
pub mod filter;
pub mod triage;

pub use board::{
    clear_done, column_cards, delete_task, move_task, reorder_within_column, BoardState,
    ColumnLists, CURRENT_SCHEMA_VERSION,
};
pub use card::{
    create_task, edit_task, CardColor, CardId, CardInput, CardPatch, ColumnId, Priority,
    TaskCard,
};
pub use filter::{tag_options, visible_cards, BoardFilters};
pub use triage::{
    backlog_promotion_missing_fields, BacklogCandidate, MissingField, MissingFields,
    TriageAction,
};
