//! Versioned board payloads.
//!
//! Each [`SchemaStep`] knows the key its payload lives under and how to turn
//! that payload into a current [`BoardState`]. Steps are tried newest first.

use crate::config::BoardConfig;
use crate::domain::board::{BoardState, CURRENT_SCHEMA_VERSION};
use crate::domain::card::{absent_or_value, CardColor, CardId, ColumnId, Priority, TaskCard};
use crate::domain::filter::BoardFilters;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::Error as _;
use serde::Deserialize;
use serde_json::Value;

pub const LEGACY_SCHEMA_VERSION: u32 = 1;

/// Validates a parsed payload and upgrades it to the current shape
pub type DecodeFn = fn(Value) -> Result<BoardState, serde_json::Error>;

#[derive(Debug, Clone)]
pub struct SchemaStep {
    pub version: u32,
    pub key: String,
    pub decode: DecodeFn,
}

impl SchemaStep {
    pub fn is_current(&self) -> bool {
        self.version == CURRENT_SCHEMA_VERSION
    }
}

/// Ordered chain of schema steps, newest version first
#[derive(Debug, Clone)]
pub struct SchemaChain {
    steps: Vec<SchemaStep>,
}

impl SchemaChain {
    pub fn new(mut steps: Vec<SchemaStep>) -> Self {
        steps.sort_by(|a, b| b.version.cmp(&a.version));
        Self { steps }
    }

    /// The v2 (current) and v1 (pre-Backlog) schemas at the configured keys
    pub fn from_config(config: &BoardConfig) -> Self {
        Self::new(vec![
            SchemaStep {
                version: CURRENT_SCHEMA_VERSION,
                key: config.storage_key.clone(),
                decode: decode_current,
            },
            SchemaStep {
                version: LEGACY_SCHEMA_VERSION,
                key: config.legacy_storage_key.clone(),
                decode: decode_legacy,
            },
        ])
    }

    pub fn steps(&self) -> &[SchemaStep] {
        &self.steps
    }

    pub fn current(&self) -> Option<&SchemaStep> {
        self.steps.iter().find(|step| step.is_current())
    }
}

fn check_version(found: u32, expected: u32) -> Result<(), serde_json::Error> {
    if found != expected {
        return Err(serde_json::Error::custom(format!(
            "expected schema version {}, found {}",
            expected, found
        )));
    }
    Ok(())
}

pub fn decode_current(value: Value) -> Result<BoardState, serde_json::Error> {
    let state: BoardState = serde_json::from_value(value)?;
    check_version(state.version, CURRENT_SCHEMA_VERSION)?;
    Ok(state)
}

/// Columns that existed before Backlog was introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum LegacyColumnId {
    Todo,
    InProgress,
    Done,
}

impl From<LegacyColumnId> for ColumnId {
    fn from(column: LegacyColumnId) -> Self {
        match column {
            LegacyColumnId::Todo => ColumnId::Todo,
            LegacyColumnId::InProgress => ColumnId::InProgress,
            LegacyColumnId::Done => ColumnId::Done,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyTaskCard {
    id: CardId,
    title: String,
    #[serde(default, deserialize_with = "absent_or_value")]
    description: Option<String>,
    #[serde(default, deserialize_with = "absent_or_value")]
    project_tag: Option<String>,
    priority: Priority,
    #[serde(default, deserialize_with = "absent_or_value")]
    due_date: Option<NaiveDate>,
    color: CardColor,
    column_id: LegacyColumnId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LegacyTaskCard> for TaskCard {
    fn from(card: LegacyTaskCard) -> Self {
        Self {
            id: card.id,
            title: card.title,
            description: card.description,
            project_tag: card.project_tag,
            priority: card.priority,
            due_date: card.due_date,
            color: card.color,
            column_id: card.column_id.into(),
            created_at: card.created_at,
            updated_at: card.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LegacyBoardState {
    version: u32,
    cards: Vec<LegacyTaskCard>,
    #[serde(flatten)]
    filters: BoardFilters,
}

/// Card fields are unchanged between v1 and v2, so migration is a copy
/// with a version bump.
pub fn decode_legacy(value: Value) -> Result<BoardState, serde_json::Error> {
    let legacy: LegacyBoardState = serde_json::from_value(value)?;
    check_version(legacy.version, LEGACY_SCHEMA_VERSION)?;

    Ok(BoardState {
        version: CURRENT_SCHEMA_VERSION,
        cards: legacy.cards.into_iter().map(TaskCard::from).collect(),
        filters: legacy.filters,
    })
}
