//! Lookup over server-scoped collections.

/// A member of a [`Collection`], addressable by a primary identifier and
/// optionally by a resource-specific secondary key.
pub trait Keyed {
    /// Primary identifier.
    fn key(&self) -> &str;

    /// Whether `key` matches this member's secondary key (a disk mount
    /// path, a public IP's internal address).
    fn matches_secondary(&self, _key: &str) -> bool {
        false
    }
}

/// An ordered set of resources owned by a parent.
///
/// Members keep insertion order; every lookup walks them in that order.
pub trait Collection {
    type Item: Keyed;

    /// Members in insertion order.
    fn members(&self) -> &[Self::Item];

    /// Exact lookup: primary identifier first, then secondary key.
    ///
    /// When the key is ambiguous the first match wins. Members released
    /// through a collection's `delete` are still returned until the caller
    /// `prune`s them.
    fn get(&self, key: &str) -> Option<&Self::Item> {
        let members = self.members();
        members
            .iter()
            .find(|m| m.key() == key)
            .or_else(|| members.iter().find(|m| m.matches_secondary(key)))
    }

    /// Case-insensitive substring search on the primary identifier.
    fn search(&self, key: &str) -> Vec<&Self::Item> {
        let needle = key.to_lowercase();
        self.members()
            .iter()
            .filter(|m| m.key().to_lowercase().contains(&needle))
            .collect()
    }

    fn len(&self) -> usize {
        self.members().len()
    }

    fn is_empty(&self) -> bool {
        self.members().is_empty()
    }

    /// Position of the member `get` would return.
    fn position(&self, key: &str) -> Option<usize> {
        let members = self.members();
        members
            .iter()
            .position(|m| m.key() == key)
            .or_else(|| members.iter().position(|m| m.matches_secondary(key)))
    }
}
