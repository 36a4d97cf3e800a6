//! Backlog promotion policy.
//!
//! A card may only leave Backlog once it has a title, a project tag and a
//! priority. The same fields are required when a draft is saved directly
//! into any other column.

use crate::domain::card::{CardInput, ColumnId, Priority, TaskCard};
use std::fmt;

/// A field the triage gate found missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Title,
    ProjectTag,
    Priority,
}

impl MissingField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::ProjectTag => "project tag",
            Self::Priority => "priority",
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered list of missing fields, rendered as "a, b and c"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingFields(Vec<MissingField>);

impl MissingFields {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> &[MissingField] {
        &self.0
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|f| f.as_str()).collect()
    }
}

impl From<Vec<MissingField>> for MissingFields {
    fn from(fields: Vec<MissingField>) -> Self {
        Self(fields)
    }
}

impl fmt::Display for MissingFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.split_last() {
            None => Ok(()),
            Some((last, [])) => write!(f, "{}", last),
            Some((last, rest)) => {
                let head: Vec<&str> = rest.iter().map(|m| m.as_str()).collect();
                write!(f, "{} and {}", head.join(", "), last)
            }
        }
    }
}

/// What the user was doing when the gate rejected the card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageAction {
    /// Dragging a card out of Backlog
    Move,
    /// Saving a draft into a column other than Backlog
    Save,
}

impl fmt::Display for TriageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move => f.write_str("moving out of Backlog"),
            Self::Save => f.write_str("saving outside Backlog"),
        }
    }
}

/// The fields the gate inspects. `priority` is `None` when the caller
/// could not map its input onto a known priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacklogCandidate<'a> {
    pub title: &'a str,
    pub project_tag: Option<&'a str>,
    pub priority: Option<Priority>,
}

impl<'a> From<&'a TaskCard> for BacklogCandidate<'a> {
    fn from(card: &'a TaskCard) -> Self {
        Self {
            title: &card.title,
            project_tag: card.project_tag.as_deref(),
            priority: Some(card.priority),
        }
    }
}

impl<'a> From<&'a CardInput> for BacklogCandidate<'a> {
    fn from(input: &'a CardInput) -> Self {
        Self {
            title: &input.title,
            project_tag: input.project_tag.as_deref(),
            priority: Some(input.priority),
        }
    }
}

/// Returns the fields still needed before promotion, in the order
/// title, project tag, priority.
pub fn backlog_promotion_missing_fields(candidate: BacklogCandidate<'_>) -> MissingFields {
    let mut missing = Vec::new();

    if candidate.title.trim().is_empty() {
        missing.push(MissingField::Title);
    }

    if candidate.project_tag.map_or(true, |t| t.trim().is_empty()) {
        missing.push(MissingField::ProjectTag);
    }

    if candidate.priority.is_none() {
        missing.push(MissingField::Priority);
    }

    MissingFields(missing)
}

/// True when moving from `from` to `to` has to pass the gate
pub fn requires_triage(from: ColumnId, to: ColumnId) -> bool {
    from == ColumnId::Backlog && to != ColumnId::Backlog
}
