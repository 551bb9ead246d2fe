//! The member-name ↔ member-ID table used by hardware dispatch.

use bimap::BiMap;
use serde::{Deserialize, Serialize};
use silica_common::{InternalError, SilicaResult};

/// A bidirectional map from fully qualified member names to the small
/// positive integer IDs generated hardware dispatches on.
///
/// ID 0 is reserved and never assigned; IDs are otherwise arbitrary but
/// stable within one compilation run. Tables are constructed fresh per
/// run — there is no shared empty instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberIdTable {
    ids: BiMap<String, u32>,
    next_id: u32,
}

impl MemberIdTable {
    /// Creates an empty table whose first assigned ID will be 1.
    pub fn new() -> Self {
        Self {
            ids: BiMap::new(),
            next_id: 1,
        }
    }

    /// Registers a member, returning its ID. Registering the same name
    /// again returns the existing ID.
    pub fn register(&mut self, name: impl Into<String>) -> u32 {
        let name = name.into();
        if let Some(&id) = self.ids.get_by_left(&name) {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(name, id);
        id
    }

    /// Looks up the ID of a registered member.
    ///
    /// Failing the lookup is a configuration bug, not a recoverable
    /// runtime condition.
    pub fn id_for(&self, name: &str) -> SilicaResult<u32> {
        self.ids.get_by_left(name).copied().ok_or_else(|| {
            InternalError::new(format!("member '{name}' was never registered for dispatch"))
        })
    }

    /// Looks up the member name behind an ID.
    pub fn name_for(&self, id: u32) -> SilicaResult<&str> {
        self.ids.get_by_right(&id).map(String::as_str).ok_or_else(|| {
            InternalError::new(format!("member ID {id} was never registered for dispatch"))
        })
    }

    /// Whether the named member is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_left(name)
    }

    /// Iterates over `(name, id)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.ids.iter().map(|(name, &id)| (name.as_str(), id))
    }

    /// The number of registered members.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no members are registered.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for MemberIdTable {
    fn default() -> Self {
        Self::new()
    }
}
