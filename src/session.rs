//! The single mutable owner of the board.
//!
//! Transitions are pure functions on [`BoardState`]; the session swaps in the
//! new snapshot and schedules a debounced write.

use crate::{
    config::BoardConfig,
    domain::{
        board::BoardState,
        card::{CardId, CardInput, CardPatch, ColumnId, Priority},
    },
    error::Result,
    storage::{BoardRepository, KeyValueStore, LoadOrigin, LoadWarning},
};
use chrono::Utc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Coalesces bursts of changes into one write after a quiet period
#[derive(Debug, Clone)]
pub struct SaveDebouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl SaveDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Records a change, pushing the deadline out to `now + delay`
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }
}

pub struct BoardSession<S> {
    repository: BoardRepository<S>,
    config: BoardConfig,
    state: BoardState,
    origin: LoadOrigin,
    warning: Option<LoadWarning>,
    debouncer: SaveDebouncer,
}

impl<S: KeyValueStore> BoardSession<S> {
    /// Loads the stored board once
    pub async fn open(store: S, config: BoardConfig) -> Result<Self> {
        let repository = BoardRepository::new(store, &config)?;
        let outcome = repository.load().await?;
        let debouncer = SaveDebouncer::new(config.save_debounce());

        Ok(Self {
            repository,
            config,
            state: outcome.state,
            origin: outcome.origin,
            warning: outcome.warning,
            debouncer,
        })
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn origin(&self) -> LoadOrigin {
        self.origin
    }

    pub fn repository(&self) -> &BoardRepository<S> {
        &self.repository
    }

    /// The reset warning from load, until dismissed
    pub fn warning(&self) -> Option<LoadWarning> {
        self.warning
    }

    pub fn dismiss_warning(&mut self) {
        self.warning = None;
    }

    /// A blank draft with the configured defaults
    pub fn draft(&self, title: impl Into<String>) -> CardInput {
        self.config.card_input(title)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Swaps in `next` and schedules a save when it differs
    fn commit(&mut self, next: BoardState) {
        if next != self.state {
            self.state = next;
            self.debouncer.touch(Instant::now());
        }
    }

    pub fn create_card(&mut self, input: CardInput) -> Result<CardId> {
        let id = CardId::generate();
        let next = self.state.add_card(input, Utc::now(), id.clone())?;
        self.commit(next);
        Ok(id)
    }

    pub fn update_card(&mut self, id: &CardId, patch: CardPatch) -> Result<()> {
        let next = self.state.update_card(id, patch, Utc::now())?;
        self.commit(next);
        Ok(())
    }

    pub fn delete_card(&mut self, id: &CardId) {
        let next = self.state.remove_card(id);
        self.commit(next);
    }

    pub fn clear_done(&mut self) {
        let next = self.state.clear_done();
        self.commit(next);
    }

    pub fn move_card(&mut self, id: &CardId, column: ColumnId, index: usize) -> Result<()> {
        let next = self.state.move_card(id, column, index, Utc::now())?;
        self.commit(next);
        Ok(())
    }

    pub fn reorder_card(&mut self, id: &CardId, index: usize) {
        let next = self.state.reorder_card(id, index, Utc::now());
        self.commit(next);
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        let next = self.state.with_search_query(query);
        self.commit(next);
    }

    pub fn set_filter_tag(&mut self, tag: Option<String>) {
        let next = self.state.with_filter_tag(tag);
        self.commit(next);
    }

    pub fn set_filter_priority(&mut self, priority: Option<Priority>) {
        let next = self.state.with_filter_priority(priority);
        self.commit(next);
    }

    /// Writes the board if the debounce period has elapsed.
    /// Returns whether a write happened.
    pub async fn flush_if_due(&mut self) -> Result<bool> {
        if !self.debouncer.is_due(Instant::now()) {
            return Ok(false);
        }
        self.flush().await?;
        Ok(true)
    }

    /// Sleeps until the pending deadline, then writes. No-op when clean.
    pub async fn wait_and_flush(&mut self) -> Result<()> {
        if let Some(deadline) = self.debouncer.deadline() {
            tokio::time::sleep_until(deadline).await;
            self.flush().await?;
        }
        Ok(())
    }

    /// Writes the board now, regardless of the debounce state
    pub async fn flush(&mut self) -> Result<()> {
        self.repository.save(&self.state).await?;
        self.debouncer.clear();
        debug!(cards = self.state.cards.len(), "flushed board");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoardError;
    use crate::storage::MemoryStore;

    const CURRENT: &str = "kanban.backlog.v2";

    async fn open_empty() -> BoardSession<MemoryStore> {
        BoardSession::open(MemoryStore::new(), BoardConfig::default())
            .await
            .unwrap()
    }

    #[test]
    fn test_debouncer_pushes_deadline() {
        let start = Instant::now();
        let mut debouncer = SaveDebouncer::new(Duration::from_millis(300));
        assert!(!debouncer.is_due(start));

        debouncer.touch(start);
        assert!(!debouncer.is_due(start + Duration::from_millis(299)));

        debouncer.touch(start + Duration::from_millis(200));
        assert!(!debouncer.is_due(start + Duration::from_millis(300)));
        assert!(debouncer.is_due(start + Duration::from_millis(500)));

        debouncer.clear();
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_changes_are_saved_after_quiet_period() {
        let mut session = open_empty().await;

        let input = session.draft("First");
        session.create_card(input).unwrap();
        session.set_search_query("fir");
        assert!(session.has_unsaved_changes());
        assert!(!session.flush_if_due().await.unwrap());
        assert!(session.repository().store().get(CURRENT).await.unwrap().is_none());

        tokio::time::advance(Duration::from_millis(300)).await;
        assert!(session.flush_if_due().await.unwrap());
        assert!(!session.has_unsaved_changes());

        let stored = session.repository().load().await.unwrap();
        assert_eq!(&stored.state, session.state());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_and_flush_writes_once() {
        let mut session = open_empty().await;
        let input = session.draft("Task");
        let id = session.create_card(input).unwrap();
        session.delete_card(&id);

        session.wait_and_flush().await.unwrap();
        assert!(!session.has_unsaved_changes());
        assert!(session.repository().store().get(CURRENT).await.unwrap().is_some());

        // Nothing pending: returns immediately
        session.wait_and_flush().await.unwrap();
    }

    #[tokio::test]
    async fn test_unchanged_state_does_not_schedule_save() {
        let mut session = open_empty().await;
        session.delete_card(&CardId::new("missing"));
        session.set_filter_priority(None);
        assert!(!session.has_unsaved_changes());
    }

    #[tokio::test]
    async fn test_rejected_move_leaves_state_untouched() {
        let mut session = open_empty().await;
        let input = session.draft("Untriaged");
        let id = session.create_card(input).unwrap();
        let before = session.state().clone();

        let err = session.move_card(&id, ColumnId::Todo, 0).unwrap_err();
        assert!(matches!(err, BoardError::IncompleteTriage { .. }));
        assert_eq!(session.state(), &before);

        session
            .update_card(
                &id,
                CardPatch {
                    project_tag: Some("app".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        session.move_card(&id, ColumnId::Todo, 0).unwrap();
        assert_eq!(session.state().cards[0].column_id, ColumnId::Todo);

        session.move_card(&id, ColumnId::Done, 0).unwrap();
        session.clear_done();
        assert!(session.state().cards.is_empty());
    }

    #[tokio::test]
    async fn test_open_surfaces_reset_warning() {
        let store = MemoryStore::new();
        store.set(CURRENT, "{not-json").await.unwrap();

        let mut session = BoardSession::open(store, BoardConfig::default())
            .await
            .unwrap();
        assert_eq!(session.origin(), LoadOrigin::Reset);
        assert_eq!(session.warning(), Some(LoadWarning::Corrupted));

        session.dismiss_warning();
        assert_eq!(session.warning(), None);
    }

    #[tokio::test]
    async fn test_filters_and_reorder() {
        let mut session = open_empty().await;
        let a = session
            .create_card(session.draft("Alpha").with_project_tag("App"))
            .unwrap();
        session
            .create_card(session.draft("Beta").with_project_tag("infra"))
            .unwrap();

        session.reorder_card(&a, 1);
        assert_eq!(session.state().cards[1].id, a);

        session.set_filter_tag(Some("app".to_string()));
        let visible = session.state().visible_cards();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, a);
        assert_eq!(session.state().tag_options(), vec!["App", "infra"]);

        session.flush().await.unwrap();
        assert!(!session.has_unsaved_changes());
    }
}
