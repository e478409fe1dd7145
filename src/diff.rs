//! Key reconciliation between a source locale and a target locale
//!
//! The source file decides which keys exist. Keys only the target has are
//! deleted, keys only the source has must be translated.

use crate::PhraseMap;

/// Keys to remove from and add to a target locale
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDiff {
    /// In target but not in source, in target order
    pub to_delete: Vec<String>,
    /// In source but not in target, in source order
    pub to_add: Vec<String>,
}

impl KeyDiff {
    /// Nothing to do for this pair
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_add.is_empty()
    }
}

pub fn reconcile_keys(source: &PhraseMap, target: &PhraseMap) -> KeyDiff {
    let to_delete = target
        .keys()
        .filter(|key| !source.contains_key(*key))
        .cloned()
        .collect();

    let to_add = source
        .keys()
        .filter(|key| !target.contains_key(*key))
        .cloned()
        .collect();

    KeyDiff { to_delete, to_add }
}
