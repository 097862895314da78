//! Id-keyed storage for registered callbacks.
//!
//! Hooks and widgets are stored under host-assigned integer handles that
//! increase monotonically and are never reused. Iteration follows the key
//! order, which is therefore registration order.

use std::collections::BTreeMap;

/// Macro to define a newtype handle wrapper around `u32`.
macro_rules! define_handle {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }
    };
}

pub(crate) use define_handle;

/// A registered callback and the plugin that owns it.
#[derive(Debug, Clone)]
pub struct ArenaEntry<T> {
    /// Slug of the owning plugin.
    pub owner: String,
    /// The callback object.
    pub callback: T,
}

/// Outcome of removing an entry on behalf of a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// The entry existed and was removed.
    Removed,
    /// No entry with that id exists (already removed or never issued).
    Missing,
    /// The entry belongs to another plugin and was left in place.
    Foreign {
        /// Actual owner of the entry.
        owner: String,
    },
}

/// Bounded, id-keyed callback storage.
#[derive(Debug)]
pub struct CallbackArena<T> {
    /// Live entries keyed by handle.
    entries: BTreeMap<u32, ArenaEntry<T>>,
    /// Next handle to issue.
    next_id: u32,
    /// Maximum number of live entries.
    capacity: usize,
}

impl<T: Clone> CallbackArena<T> {
    /// Creates an empty arena holding at most `capacity` live entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 0,
            capacity,
        }
    }

    /// Inserts a callback and returns its handle, or `None` when full or
    /// when the handle space is exhausted.
    pub fn insert(&mut self, owner: &str, callback: T) -> Option<u32> {
        if self.entries.len() >= self.capacity {
            return None;
        }

        let id = self.next_id;
        self.next_id = self.next_id.checked_add(1)?;

        self.entries.insert(
            id,
            ArenaEntry {
                owner: owner.to_string(),
                callback,
            },
        );
        Some(id)
    }

    /// Removes `id` if `caller` owns it.
    pub fn remove(&mut self, id: u32, caller: &str) -> Removal {
        match self.entries.get(&id) {
            None => Removal::Missing,
            Some(entry) if entry.owner != caller => Removal::Foreign {
                owner: entry.owner.clone(),
            },
            Some(_) => {
                self.entries.remove(&id);
                Removal::Removed
            }
        }
    }

    /// Removes every entry owned by `owner` and returns how many were removed.
    pub fn remove_owner(&mut self, owner: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.owner != owner);
        before - self.entries.len()
    }

    /// Returns whether `id` is live.
    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    /// Returns the owner of `id`, if live.
    pub fn owner_of(&self, id: u32) -> Option<&str> {
        self.entries.get(&id).map(|e| e.owner.as_str())
    }

    /// Clones the live entries in registration order.
    pub fn snapshot(&self) -> Vec<(u32, ArenaEntry<T>)> {
        self.entries
            .iter()
            .map(|(id, entry)| (*id, entry.clone()))
            .collect()
    }

    /// Number of live entries owned by `owner`.
    pub fn count_owned(&self, owner: &str) -> usize {
        self.entries.values().filter(|e| e.owner == owner).count()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of live entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_never_reused() {
        let mut arena = CallbackArena::new(2);
        let a = arena.insert("p", 'a').unwrap();
        let b = arena.insert("p", 'b').unwrap();
        assert_eq!((a, b), (0, 1));

        assert_eq!(arena.remove(a, "p"), Removal::Removed);
        let c = arena.insert("p", 'c').unwrap();
        assert_eq!(c, 2);
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut arena = CallbackArena::new(1);
        assert!(arena.insert("p", 1).is_some());
        assert!(arena.insert("q", 2).is_none());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_remove_checks_owner() {
        let mut arena = CallbackArena::new(4);
        let id = arena.insert("owner", ()).unwrap();
        assert_eq!(
            arena.remove(id, "intruder"),
            Removal::Foreign {
                owner: "owner".to_string()
            }
        );
        assert!(arena.contains(id));
        assert_eq!(arena.remove(id, "owner"), Removal::Removed);
        assert_eq!(arena.remove(id, "owner"), Removal::Missing);
    }

    #[test]
    fn test_snapshot_is_registration_ordered() {
        let mut arena = CallbackArena::new(8);
        for (owner, value) in [("a", 10), ("b", 20), ("a", 30)] {
            arena.insert(owner, value);
        }
        let order: Vec<i32> = arena.snapshot().into_iter().map(|(_, e)| e.callback).collect();
        assert_eq!(order, vec![10, 20, 30]);

        assert_eq!(arena.remove_owner("a"), 2);
        assert_eq!(arena.count_owned("b"), 1);
    }
}
