use crate::{
    config::BoardConfig,
    domain::board::BoardState,
    error::Result,
    storage::{schema::SchemaChain, validate_key, KeyValueStore},
};
use std::fmt;
use tracing::{debug, info, warn};

/// Why a stored board was discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadWarning {
    /// Parsed, but the shape did not match the schema for its key
    Invalid,
    /// Not parseable as JSON at all
    Corrupted,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => f.write_str("Stored board data was invalid and has been reset."),
            Self::Corrupted => f.write_str("Stored board data was corrupted and has been reset."),
        }
    }
}

/// Where the loaded board came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Nothing stored under any known key
    NoData,
    /// Current-version payload, used as-is
    Current,
    /// Older payload, upgraded and rewritten under the current key
    Migrated { from_version: u32 },
    /// Stored payload was unusable; board reset to empty
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub state: BoardState,
    pub origin: LoadOrigin,
    pub warning: Option<LoadWarning>,
}

impl LoadOutcome {
    fn empty(origin: LoadOrigin, warning: Option<LoadWarning>) -> Self {
        Self {
            state: BoardState::empty(),
            origin,
            warning,
        }
    }
}

/// Loads and saves the board through a [`KeyValueStore`]
pub struct BoardRepository<S> {
    store: S,
    chain: SchemaChain,
    current_key: String,
}

impl<S: KeyValueStore> BoardRepository<S> {
    pub fn new(store: S, config: &BoardConfig) -> Result<Self> {
        config.validate()?;
        validate_key(&config.storage_key)?;
        validate_key(&config.legacy_storage_key)?;

        Ok(Self {
            store,
            chain: SchemaChain::from_config(config),
            current_key: config.storage_key.clone(),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the board, migrating or resetting as needed.
    ///
    /// The newest key with a stored value decides the outcome; older keys are
    /// only consulted when newer ones are absent. Malformed data never fails
    /// the load, it yields an empty board and a warning. Store I/O errors do
    /// propagate.
    pub async fn load(&self) -> Result<LoadOutcome> {
        for step in self.chain.steps() {
            let raw = match self.store.get(&step.key).await? {
                Some(raw) if !raw.trim().is_empty() => raw,
                _ => continue,
            };

            let value: serde_json::Value = match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    warn!(key = %step.key, error = %e, "stored board is not valid JSON, resetting");
                    return Ok(LoadOutcome::empty(
                        LoadOrigin::Reset,
                        Some(LoadWarning::Corrupted),
                    ));
                }
            };

            let state = match (step.decode)(value) {
                Ok(state) => state,
                Err(e) => {
                    warn!(key = %step.key, version = step.version, error = %e, "stored board failed validation, resetting");
                    return Ok(LoadOutcome::empty(
                        LoadOrigin::Reset,
                        Some(LoadWarning::Invalid),
                    ));
                }
            };

            if step.is_current() {
                debug!(key = %step.key, cards = state.cards.len(), "loaded board");
                return Ok(LoadOutcome {
                    state,
                    origin: LoadOrigin::Current,
                    warning: None,
                });
            }

            self.save(&state).await?;
            self.store.remove(&step.key).await?;
            info!(
                from_version = step.version,
                from_key = %step.key,
                to_key = %self.current_key,
                cards = state.cards.len(),
                "migrated stored board"
            );
            return Ok(LoadOutcome {
                state,
                origin: LoadOrigin::Migrated {
                    from_version: step.version,
                },
                warning: None,
            });
        }

        debug!("no stored board, starting empty");
        Ok(LoadOutcome::empty(LoadOrigin::NoData, None))
    }

    /// Overwrites the current key with `state`
    pub async fn save(&self, state: &BoardState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.store.set(&self.current_key, &json).await?;
        debug!(key = %self.current_key, cards = state.cards.len(), "saved board");
        Ok(())
    }
}
