use crate::error::{BoardError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

pub const TITLE_MAX_LENGTH: usize = 120;
pub const DESCRIPTION_MAX_LENGTH: usize = 500;
pub const PROJECT_TAG_MAX_LENGTH: usize = 40;

/// Unique identifier for a card
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Workflow stage a card sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnId {
    Backlog,
    Todo,
    InProgress,
    Done,
}

impl ColumnId {
    /// Every column, in board order
    pub const ALL: [ColumnId; 4] = [
        ColumnId::Backlog,
        ColumnId::Todo,
        ColumnId::InProgress,
        ColumnId::Done,
    ];

    /// Position of the column in board order
    pub fn index(self) -> usize {
        match self {
            Self::Backlog => 0,
            Self::Todo => 1,
            Self::InProgress => 2,
            Self::Done => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    /// Hint shown when the column has no cards
    pub fn empty_hint(self) -> &'static str {
        match self {
            Self::Backlog => "Capture new work here before triage.",
            Self::Todo => "No tasks yet. Add one to get started.",
            Self::InProgress => "Nothing in progress right now.",
            Self::Done => "Finished tasks appear here.",
        }
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ColumnId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "backlog" => Ok(Self::Backlog),
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(format!(
                "Invalid column '{}'. Valid columns: backlog, todo, in_progress, done",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!(
                "Invalid priority '{}'. Valid priorities: low, medium, high",
                s
            )),
        }
    }
}

/// Sticky-note color of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardColor {
    Yellow,
    Blue,
    Green,
    Pink,
    Orange,
}

impl CardColor {
    pub const ALL: [CardColor; 5] = [
        CardColor::Yellow,
        CardColor::Blue,
        CardColor::Green,
        CardColor::Pink,
        CardColor::Orange,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Pink => "pink",
            Self::Orange => "orange",
        }
    }
}

impl fmt::Display for CardColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CardColor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yellow" => Ok(Self::Yellow),
            "blue" => Ok(Self::Blue),
            "green" => Ok(Self::Green),
            "pink" => Ok(Self::Pink),
            "orange" => Ok(Self::Orange),
            _ => Err(format!(
                "Invalid color '{}'. Valid colors: yellow, blue, green, pink, orange",
                s
            )),
        }
    }
}

/// A task card on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCard {
    pub id: CardId,
    pub title: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "absent_or_value"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "absent_or_value"
    )]
    pub project_tag: Option<String>,
    pub priority: Priority,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "absent_or_value"
    )]
    pub due_date: Option<NaiveDate>,
    pub color: CardColor,
    pub column_id: ColumnId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional card fields are either left out or hold a value; an explicit
/// `null` is rejected.
pub(crate) fn absent_or_value<'de, D, T>(
    deserializer: D,
) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Fields supplied when creating a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardInput {
    pub title: String,
    pub description: Option<String>,
    pub project_tag: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub color: CardColor,
    pub column_id: ColumnId,
}

impl CardInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            project_tag: None,
            priority: Priority::Medium,
            due_date: None,
            color: CardColor::Yellow,
            column_id: ColumnId::Backlog,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_project_tag(mut self, tag: impl Into<String>) -> Self {
        self.project_tag = Some(tag.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_color(mut self, color: CardColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn in_column(mut self, column_id: ColumnId) -> Self {
        self.column_id = column_id;
        self
    }
}

/// Partial update for a card. `None` keeps the current value.
///
/// An empty (after trim) description or project tag clears the field;
/// `due_date: Some(None)` clears the due date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_tag: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub color: Option<CardColor>,
    pub column_id: Option<ColumnId>,
}

impl From<CardInput> for CardPatch {
    fn from(input: CardInput) -> Self {
        Self {
            title: Some(input.title),
            description: Some(input.description.unwrap_or_default()),
            project_tag: Some(input.project_tag.unwrap_or_default()),
            priority: Some(input.priority),
            due_date: Some(input.due_date),
            color: Some(input.color),
            column_id: Some(input.column_id),
        }
    }
}

fn normalize_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(BoardError::EmptyTitle);
    }
    check_length("title", trimmed, TITLE_MAX_LENGTH)?;
    Ok(trimmed.to_string())
}

/// Trims an optional text field, dropping it when nothing is left
fn normalize_optional(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => {
            check_length(field, v, max)?;
            Ok(Some(v.to_string()))
        }
        _ => Ok(None),
    }
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(BoardError::FieldTooLong { field, max });
    }
    Ok(())
}

/// Creates a card from user input, stamping both timestamps with `now`
pub fn create_task(input: CardInput, now: DateTime<Utc>, id: CardId) -> Result<TaskCard> {
    Ok(TaskCard {
        id,
        title: normalize_title(&input.title)?,
        description: normalize_optional(
            "description",
            input.description.as_deref(),
            DESCRIPTION_MAX_LENGTH,
        )?,
        project_tag: normalize_optional(
            "project tag",
            input.project_tag.as_deref(),
            PROJECT_TAG_MAX_LENGTH,
        )?,
        priority: input.priority,
        due_date: input.due_date,
        color: input.color,
        column_id: input.column_id,
        created_at: now,
        updated_at: now,
    })
}

/// Applies the provided fields of `patch` and refreshes `updated_at`.
/// Identity and creation time never change.
pub fn edit_task(card: &TaskCard, patch: CardPatch, now: DateTime<Utc>) -> Result<TaskCard> {
    let title = match patch.title {
        Some(title) => normalize_title(&title)?,
        None => card.title.clone(),
    };
    let description = match patch.description {
        Some(d) => {
            normalize_optional("description", Some(d.as_str()), DESCRIPTION_MAX_LENGTH)?
        }
        None => card.description.clone(),
    };
    let project_tag = match patch.project_tag {
        Some(t) => {
            normalize_optional("project tag", Some(t.as_str()), PROJECT_TAG_MAX_LENGTH)?
        }
        None => card.project_tag.clone(),
    };

    Ok(TaskCard {
        id: card.id.clone(),
        title,
        description,
        project_tag,
        priority: patch.priority.unwrap_or(card.priority),
        due_date: patch.due_date.unwrap_or(card.due_date),
        color: patch.color.unwrap_or(card.color),
        column_id: patch.column_id.unwrap_or(card.column_id),
        created_at: card.created_at,
        updated_at: now,
    })
}
