use crate::domain::card::{
    create_task, edit_task, CardId, CardInput, CardPatch, ColumnId, Priority, TaskCard,
};
use crate::domain::filter::{self, BoardFilters};
use crate::domain::triage::{
    backlog_promotion_missing_fields, requires_triage, BacklogCandidate, TriageAction,
};
use crate::error::{BoardError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Schema version written with every saved board
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Cards split per column, each list keeping its manual ranking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLists([Vec<TaskCard>; 4]);

impl ColumnLists {
    /// Splits a flat card list by column, preserving relative order
    pub fn partition(cards: &[TaskCard]) -> Self {
        let mut lists = Self::default();
        for card in cards {
            lists.0[card.column_id.index()].push(card.clone());
        }
        lists
    }

    pub fn column(&self, column: ColumnId) -> &[TaskCard] {
        &self.0[column.index()]
    }

    /// Removes the card with `id`, searching columns in board order
    pub fn take(&mut self, id: &CardId) -> Option<TaskCard> {
        for list in self.0.iter_mut() {
            if let Some(pos) = list.iter().position(|card| &card.id == id) {
                return Some(list.remove(pos));
            }
        }
        None
    }

    /// Inserts into `column`, clamping `index` to the column length.
    /// Returns the index actually used.
    pub fn insert(&mut self, column: ColumnId, index: usize, card: TaskCard) -> usize {
        let list = &mut self.0[column.index()];
        let bounded = index.min(list.len());
        list.insert(bounded, card);
        bounded
    }

    /// Concatenates the columns back in board order
    pub fn flatten(self) -> Vec<TaskCard> {
        self.0.into_iter().flatten().collect()
    }
}

/// Moves a card to `target_index` within `target_column`.
///
/// The moved card gets the new column and `updated_at = now`; every other
/// card is untouched. The result is ordered column by column in board order.
/// An unknown id leaves the list as it was.
pub fn move_task(
    cards: &[TaskCard],
    task_id: &CardId,
    target_column: ColumnId,
    target_index: usize,
    now: DateTime<Utc>,
) -> Vec<TaskCard> {
    let mut lists = ColumnLists::partition(cards);

    let Some(mut moving) = lists.take(task_id) else {
        return cards.to_vec();
    };

    moving.column_id = target_column;
    moving.updated_at = now;
    let landed = lists.insert(target_column, target_index, moving);
    debug!(task_id = %task_id, column = target_column.as_str(), index = landed, "move_task");

    lists.flatten()
}

/// Same-column drag: only the position of the card changes
pub fn reorder_within_column(
    cards: &[TaskCard],
    task_id: &CardId,
    new_index: usize,
    now: DateTime<Utc>,
) -> Vec<TaskCard> {
    match cards.iter().find(|card| &card.id == task_id) {
        Some(card) => move_task(cards, task_id, card.column_id, new_index, now),
        None => cards.to_vec(),
    }
}

pub fn delete_task(cards: &[TaskCard], task_id: &CardId) -> Vec<TaskCard> {
    cards
        .iter()
        .filter(|card| &card.id != task_id)
        .cloned()
        .collect()
}

/// Removes every card in Done
pub fn clear_done(cards: &[TaskCard]) -> Vec<TaskCard> {
    cards
        .iter()
        .filter(|card| card.column_id != ColumnId::Done)
        .cloned()
        .collect()
}

pub fn column_cards(cards: &[TaskCard], column: ColumnId) -> Vec<TaskCard> {
    cards
        .iter()
        .filter(|card| card.column_id == column)
        .cloned()
        .collect()
}

/// Immutable board snapshot; every transition returns a new one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub version: u32,
    pub cards: Vec<TaskCard>,
    #[serde(flatten)]
    pub filters: BoardFilters,
}

impl Default for BoardState {
    fn default() -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            cards: Vec::new(),
            filters: BoardFilters::default(),
        }
    }
}

impl BoardState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn find_card(&self, id: &CardId) -> Option<&TaskCard> {
        self.cards.iter().find(|card| &card.id == id)
    }

    fn with_cards(&self, cards: Vec<TaskCard>) -> Self {
        Self {
            version: self.version,
            cards,
            filters: self.filters.clone(),
        }
    }

    fn with_filters(&self, filters: BoardFilters) -> Self {
        Self {
            version: self.version,
            cards: self.cards.clone(),
            filters,
        }
    }

    /// Creates a card and appends it to the board.
    ///
    /// Cards created outside Backlog must already carry the triage fields.
    pub fn add_card(&self, input: CardInput, now: DateTime<Utc>, id: CardId) -> Result<Self> {
        let card = create_task(input, now, id)?;
        if card.column_id != ColumnId::Backlog {
            check_triage(BacklogCandidate::from(&card), TriageAction::Save)?;
        }

        let mut cards = self.cards.clone();
        cards.push(card);
        Ok(self.with_cards(cards))
    }

    /// Edits a card in place. The edited card must pass triage when it ends
    /// up outside Backlog.
    pub fn update_card(&self, id: &CardId, patch: CardPatch, now: DateTime<Utc>) -> Result<Self> {
        let current = self
            .find_card(id)
            .ok_or_else(|| BoardError::CardNotFound(id.to_string()))?;

        let edited = edit_task(current, patch, now)?;
        if edited.column_id != ColumnId::Backlog {
            check_triage(BacklogCandidate::from(&edited), TriageAction::Save)?;
        }

        let cards = self
            .cards
            .iter()
            .map(|card| {
                if &card.id == id {
                    edited.clone()
                } else {
                    card.clone()
                }
            })
            .collect();
        Ok(self.with_cards(cards))
    }

    pub fn remove_card(&self, id: &CardId) -> Self {
        self.with_cards(delete_task(&self.cards, id))
    }

    pub fn clear_done(&self) -> Self {
        self.with_cards(clear_done(&self.cards))
    }

    /// Drag-and-drop move, gated when the card leaves Backlog
    pub fn move_card(
        &self,
        id: &CardId,
        target_column: ColumnId,
        target_index: usize,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let card = self
            .find_card(id)
            .ok_or_else(|| BoardError::CardNotFound(id.to_string()))?;

        if requires_triage(card.column_id, target_column) {
            check_triage(BacklogCandidate::from(card), TriageAction::Move)?;
        }

        Ok(self.with_cards(move_task(
            &self.cards,
            id,
            target_column,
            target_index,
            now,
        )))
    }

    pub fn reorder_card(&self, id: &CardId, new_index: usize, now: DateTime<Utc>) -> Self {
        self.with_cards(reorder_within_column(&self.cards, id, new_index, now))
    }

    pub fn with_search_query(&self, query: impl Into<String>) -> Self {
        self.with_filters(BoardFilters {
            search_query: query.into(),
            ..self.filters.clone()
        })
    }

    /// Sets or clears the tag filter; an empty tag clears it
    pub fn with_filter_tag(&self, tag: Option<String>) -> Self {
        self.with_filters(BoardFilters {
            filter_tag: tag.filter(|t| !t.is_empty()),
            ..self.filters.clone()
        })
    }

    pub fn with_filter_priority(&self, priority: Option<Priority>) -> Self {
        self.with_filters(BoardFilters {
            filter_priority: priority,
            ..self.filters.clone()
        })
    }

    pub fn visible_cards(&self) -> Vec<TaskCard> {
        filter::visible_cards(&self.cards, &self.filters)
    }

    pub fn tag_options(&self) -> Vec<String> {
        filter::tag_options(&self.cards)
    }

    pub fn column_cards(&self, column: ColumnId) -> Vec<TaskCard> {
        column_cards(&self.cards, column)
    }

    /// Number of visible cards per column, in board order
    pub fn visible_counts(&self) -> [(ColumnId, usize); 4] {
        let visible = ColumnLists::partition(&self.visible_cards());
        ColumnId::ALL.map(|column| (column, visible.column(column).len()))
    }
}

fn check_triage(candidate: BacklogCandidate<'_>, action: TriageAction) -> Result<()> {
    let missing = backlog_promotion_missing_fields(candidate);

    if missing.is_empty() {
        return Ok(());
    }

    debug!(%action, %missing, "triage rejected");
    Err(BoardError::IncompleteTriage { action, missing })
}
