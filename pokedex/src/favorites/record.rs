//! Favorite records and change events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{StorageError, StorageResult};

/// One persisted favorite.
///
/// Records are created and deleted, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    /// Store-assigned surrogate key, strictly increasing in insertion order
    pub id: i64,
    /// Catalog id of the favorited Pokémon (unique across records)
    pub pokemon_id: u32,
    /// When the record was created
    pub added_at: DateTime<Utc>,
}

/// A change to the persisted favorites set.
///
/// Emitted only when a mutation actually changed what is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FavoriteEvent {
    /// The id became a favorite
    Added(u32),
    /// The id stopped being a favorite
    Removed(u32),
}

impl FavoriteEvent {
    /// The Pokémon id the event refers to.
    #[must_use]
    pub fn pokemon_id(&self) -> u32 {
        match self {
            Self::Added(id) | Self::Removed(id) => *id,
        }
    }
}

/// Sort records most recent first, ties broken by surrogate key descending.
pub(crate) fn sort_most_recent_first(records: &mut [FavoriteRecord]) {
    records.sort_by(|a, b| b.added_at.cmp(&a.added_at).then(b.id.cmp(&a.id)));
}

/// Reject ids that cannot name a catalog entry.
///
/// # Errors
/// Returns `StorageError::Validation` for id 0.
pub fn validate_pokemon_id(pokemon_id: u32) -> StorageResult<()> {
    if pokemon_id == 0 {
        return Err(StorageError::validation("pokemon id must be positive"));
    }
    Ok(())
}
